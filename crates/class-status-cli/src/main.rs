//! `class-status` CLI: answer free/busy questions from a data file.
//!
//! ## Usage
//!
//! ```sh
//! # Is ana in class right now?
//! class-status check --data campus.json --user ana
//!
//! # At a specific local time
//! class-status check --data campus.json --user ana --at 2026-03-16T11:00
//!
//! # Status of everyone ana follows, as JSON
//! class-status friends --data campus.json --user ana
//!
//! # Validate image-extraction output and print the blocks it describes
//! class-status rows -i extracted.txt
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use class_status::{
    friend_statuses, parse_rows, resolve, Clock, FixedClock, MemoryStore, Seed, SystemClock,
    UserId,
};
use std::io::{self, Read};

#[derive(Parser)]
#[command(
    name = "class-status",
    version,
    about = "Who is free and who is in class"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print "Free" or "In Class" for one user
    Check {
        /// JSON data file with users, schedules and friendships
        #[arg(short, long)]
        data: String,
        /// Username to check
        #[arg(short, long)]
        user: String,
        /// Local time to check (YYYY-MM-DDTHH:MM[:SS]); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Print the status of everyone a user follows as JSON
    Friends {
        /// JSON data file with users, schedules and friendships
        #[arg(short, long)]
        data: String,
        /// Username whose friends to list
        #[arg(short, long)]
        user: String,
        /// Local time to check (YYYY-MM-DDTHH:MM[:SS]); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Validate schedule rows from the extraction service and print them as blocks
    Rows {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { data, user, at } => {
            let (store, user_id) = load(&data, &user)?;
            let now = clock(at.as_deref())?.now();
            let verdict = resolve(&store, user_id, now)
                .with_context(|| format!("Failed to resolve status for {user}"))?;
            println!("{}", verdict.status());
        }
        Commands::Friends { data, user, at } => {
            let (store, user_id) = load(&data, &user)?;
            let now = clock(at.as_deref())?.now();
            let statuses = friend_statuses(&store, &store, &store, user_id, now)
                .with_context(|| format!("Failed to list friends of {user}"))?;
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        Commands::Rows { input } => {
            let text = read_input(input.as_deref())?;
            let blocks = parse_rows(&text).context("Invalid schedule rows")?;
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
    }

    Ok(())
}

/// Load the data file into a fresh store and look up `username`.
fn load(path: &str, username: &str) -> Result<(MemoryStore, UserId)> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
    let seed = Seed::from_json(&text)
        .with_context(|| format!("Failed to parse data file: {}", path))?;

    let store = MemoryStore::new();
    let ids = store.load_seed(&seed).context("Failed to load data file")?;
    let user_id = ids
        .get(username)
        .copied()
        .with_context(|| format!("Unknown user: '{}'", username))?;
    Ok((store, user_id))
}

/// Fixed clock for `--at`, the system clock otherwise.
fn clock(at: Option<&str>) -> Result<Box<dyn Clock>> {
    match at {
        Some(raw) => Ok(Box::new(FixedClock(parse_instant(raw)?))),
        None => Ok(Box::new(SystemClock)),
    }
}

fn parse_instant(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .with_context(|| format!("Invalid --at value: '{}' (expected YYYY-MM-DDTHH:MM)", raw))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_accepts_minutes_or_seconds() {
        assert_eq!(
            parse_instant("2026-03-16T11:00").unwrap(),
            parse_instant("2026-03-16T11:00:00").unwrap()
        );
        assert!(parse_instant("11:00").is_err());
    }
}
