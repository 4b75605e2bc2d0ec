//! Eventweek CLI
//!
//! Admin command-line interface for the week-partitioned event store:
//! - Inspect weeks, the index and single events
//! - Validate or rebuild the index
//! - Migrate data between backends

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use eventweek::config::{Config, LoggingConfig};
use eventweek::storage::{
    migrate, open_backend, BackendKind, EventStore, EventsIndex, WeekKey, WeeklyEvents,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "eventweek")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Week-partitioned event store administration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the key of the current week
    CurrentWeek,

    /// Show the events stored under a week
    Week {
        /// Week key (YYYY-MM-DD)
        week: String,
    },

    /// Show the week index
    Index,

    /// Find an event by slug
    Find {
        slug: String,
    },

    /// Compare the index against stored weeks
    Validate,

    /// Recompute the whole index from stored weeks
    RebuildIndex,

    /// Copy every week and the index into another backend
    Migrate {
        /// Destination backend (file or relational)
        #[arg(long)]
        to: BackendKind,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_tracing(&config.logging);

    let json = cli.format.eq_ignore_ascii_case("json");

    match cli.command {
        Commands::Config { output } => {
            let template = eventweek::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &template)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", template),
            }
        }

        Commands::Migrate { to } => {
            let source_config = config.storage.backend_config();
            if source_config.kind == to {
                bail!("source and destination are both the {} backend", to);
            }

            let mut target_config = source_config.clone();
            target_config.kind = to;

            let source = open_backend(&source_config)?;
            let target = open_backend(&target_config)?;
            let report = migrate(source.as_ref(), target.as_ref())?;

            println!(
                "Migrated {} weeks ({} events) from {} to {}",
                report.weeks, report.events, source_config.kind, to
            );
        }

        command => {
            let store = EventStore::open(&config.storage.backend_config())
                .context("failed to open event store")?;
            run_store_command(&store, command, json)?;
        }
    }

    Ok(())
}

fn run_store_command(store: &EventStore, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::CurrentWeek => println!("{}", store.current_week()),

        Commands::Week { week } => {
            let key: WeekKey = week.parse()?;
            let weekly = store.read_week(key)?;
            if json {
                print_json(&weekly)?;
            } else {
                print_week(&weekly);
            }
        }

        Commands::Index => {
            let index = store.read_index()?;
            if json {
                print_json(&index)?;
            } else {
                print_index(&index);
            }
        }

        Commands::Find { slug } => match store.find_by_slug(&slug)? {
            Some((event, week)) => {
                if json {
                    print_json(&serde_json::json!({ "event": event, "weekStart": week }))?;
                } else {
                    println!("{} ({})", event.title, event.slug);
                    println!("  id:    {}", event.id);
                    println!("  week:  {}", week);
                    println!("  start: {}", event.start_date_time.to_rfc3339());
                    println!("  city:  {}", event.city);
                    println!("  genre: {}", event.genre);
                }
            }
            None => bail!("no event with slug '{}'", slug),
        },

        Commands::Validate => {
            let issues = store.validate_index()?;
            if issues.is_empty() {
                println!("Index is consistent with stored weeks");
            } else {
                for issue in &issues {
                    println!("{}", issue);
                }
                bail!("{} index issue(s) found", issues.len());
            }
        }

        Commands::RebuildIndex => {
            let index = store.rebuild_index()?;
            println!(
                "Rebuilt index: {} weeks, {} events",
                index.weeks.len(),
                index.total_events()
            );
        }

        // handled in main before a store is opened
        Commands::Migrate { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    // CLI output goes to stdout, so logs stay quiet unless asked for
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eventweek=warn".into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_week(weekly: &WeeklyEvents) {
    if weekly.is_empty() {
        println!("No events in week {}", weekly.week_start_date);
        return;
    }

    println!(
        "{:<20} | {:<28} | {:<12} | {:<10} | {}",
        "Start", "Title", "City", "Genre", "Slug"
    );
    println!("{}", "-".repeat(100));

    for event in &weekly.events {
        let start = event.start_date_time.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<20} | {:<28} | {:<12} | {:<10} | {}",
            start,
            truncate(&event.title, 28),
            truncate(&event.city, 12),
            event.genre,
            event.slug
        );
    }

    for sponsor in &weekly.sponsors {
        println!("sponsor {}: {}", sponsor.placement.as_str(), sponsor.event_id);
    }
}

fn print_index(index: &EventsIndex) {
    if index.is_empty() {
        println!("Index is empty");
        return;
    }

    println!(
        "{:<12} | {:>6} | {:<30} | {}",
        "Week", "Events", "Cities", "Genres"
    );
    println!("{}", "-".repeat(80));

    for week in &index.weeks {
        println!(
            "{:<12} | {:>6} | {:<30} | {}",
            week.start_date,
            week.event_count,
            truncate(&week.cities.join(", "), 30),
            week.genres.join(", ")
        );
    }
    println!(
        "\n{} weeks, {} events",
        index.weeks.len(),
        index.total_events()
    );
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_migrate_target() {
        let cli = Cli::parse_from(["eventweek", "migrate", "--to", "sqlite"]);
        match cli.command {
            Commands::Migrate { to } => assert_eq!(to, BackendKind::Relational),
            _ => panic!("expected migrate"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["eventweek", "week", "2025-09-08", "--format", "json"]);
        assert_eq!(cli.format, "json");
        assert!(matches!(cli.command, Commands::Week { ref week } if week == "2025-09-08"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("San Juan", 12), "San Juan");
        assert_eq!(truncate("Old San Juan Waterfront", 8), "Old San…");
    }
}
