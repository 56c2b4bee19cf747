//! CLI module - Command-line interface for Quartermaster
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Quartermaster - Military equipment store management
/// Loan requests, stock tracking and handovers for base departments
#[derive(Parser)]
#[command(name = "quartermaster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API together with the background scheduler
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Create a default config file in the current directory
    Init,

    /// Recount stock counters from units and open loans
    Sync {
        /// Only sync this item type
        #[arg(long = "item-type")]
        item_type: Option<i32>,
    },

    /// Record an inventory snapshot for every item type
    Snapshot,

    /// Mark handed-over requests past their return date as overdue
    Overdue,

    /// Wipe all data and recreate the default accounts
    Reset {
        /// Confirmation phrase from config.toml
        #[arg(long)]
        phrase: String,
        /// Confirmation code from config.toml
        #[arg(long)]
        code: String,
    },

    /// Print a storefront link token for a user
    Token {
        /// User ID
        user_id: i32,
    },
}

pub use commands::*;
