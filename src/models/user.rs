use serde::{Deserialize, Serialize};

/// A stored account. `password` holds the Argon2 PHC string, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub password: String,
}
