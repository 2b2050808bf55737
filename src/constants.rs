pub const APP_NAME: &str = "botkeep";

pub mod auth {

    pub const DEFAULT_TOKEN_TTL_MINUTES: u64 = 60;

    pub const TOKEN_TYPE: &str = "bearer";

    pub const BEARER_CHALLENGE: &str = "Bearer";

    pub const INVALID_CREDENTIALS: &str = "Could not validate credentials";

    pub const INCORRECT_LOGIN: &str = "Incorrect username or password";

    /// Length of the random signing secret generated when none is configured.
    pub const GENERATED_SECRET_BYTES: usize = 32;
}

pub mod limits {

    pub const MAX_BOT_ID_LEN: usize = 128;

    pub const MAX_LOGIN_LEN: usize = 64;
}

pub mod env {

    pub const DB_CONN: &str = "DB_CONN";

    pub const JWT_SECRET: &str = "JWT_SECRET";

    pub const PORT: &str = "BOTKEEP_PORT";
}
