use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use habit_core::Frequency;

#[derive(Debug, Parser)]
#[command(name = "habits", version, about = "Track daily, weekly and monthly habits")]
pub struct Cli {
    /// JSON file holding the habit list (overrides HABIT_DB_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Pretend today is this date (overrides HABIT_TODAY).
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show every habit with its streak.
    List,
    /// Create a habit.
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "day")]
        frequency: Frequency,
        /// Defaults to 1 per day, 3 per week or 8 per month.
        #[arg(long)]
        goal: Option<u32>,
        #[arg(long, default_value = "")]
        unit: String,
    },
    /// Change a habit's name, description, cadence, goal or unit.
    Edit {
        /// Habit id or exact name.
        habit: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        frequency: Option<Frequency>,
        #[arg(long)]
        goal: Option<u32>,
        #[arg(long)]
        unit: Option<String>,
    },
    /// Mark or unmark a day; defaults to today.
    Toggle {
        habit: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
    },
    /// Whether a day is marked; defaults to today.
    Check {
        habit: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
    },
    /// Detail card with stats and a month calendar.
    Show {
        habit: String,
        #[arg(long, value_name = "YYYY-MM")]
        month: Option<String>,
        /// Step back one month per flag (`--prev --prev`).
        #[arg(long, action = ArgAction::Count, conflicts_with = "next")]
        prev: u8,
        #[arg(long, action = ArgAction::Count)]
        next: u8,
    },
    /// Overall progress for today.
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_frequency() {
        let cli = Cli::try_parse_from([
            "habits",
            "--today",
            "2025-06-23",
            "add",
            "Read",
            "--frequency",
            "week",
        ])
        .unwrap();
        assert_eq!(cli.today.as_deref(), Some("2025-06-23"));
        assert_eq!(
            cli.command,
            Some(Command::Add {
                name: "Read".into(),
                description: String::new(),
                frequency: Frequency::Week,
                goal: None,
                unit: String::new(),
            })
        );
    }

    #[test]
    fn counts_month_steps() {
        let cli = Cli::try_parse_from(["habits", "show", "1", "--prev", "--prev"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Show {
                habit: "1".into(),
                month: None,
                prev: 2,
                next: 0,
            })
        );
        assert!(Cli::try_parse_from(["habits", "show", "1", "--prev", "--next"]).is_err());
    }

    #[test]
    fn rejects_unknown_frequency() {
        assert!(Cli::try_parse_from(["habits", "add", "Read", "--frequency", "yearly"]).is_err());
    }
}
