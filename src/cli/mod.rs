//! CLI module - Command-line interface for botkeep
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand};

/// botkeep - bot registry behind bearer-token auth
#[derive(Parser)]
#[command(name = "botkeep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Create default config file
    Init,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user who can log in and own bots
    Add {
        /// Login name
        login: String,

        /// Plaintext password; stored as an Argon2id hash
        #[arg(long)]
        password: String,
    },
}
