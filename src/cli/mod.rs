//! CLI module - Command-line interface for qrlink
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// qrlink - QR code redirect service
/// Short codes with editable destinations and scan statistics
#[derive(Parser)]
#[command(name = "qrlink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Create a user account
    CreateUser {
        /// Login email
        #[arg(long)]
        email: String,
        /// Initial password
        #[arg(long)]
        password: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// `admin` or `user`
        #[arg(long, default_value = "user")]
        role: String,
    },

    /// List user accounts
    #[command(alias = "users")]
    ListUsers,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
