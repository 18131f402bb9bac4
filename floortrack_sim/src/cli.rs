use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Floortrack: dead-reckoning routes on a floor plan, driven from
/// scripted walks or recorded sensor logs.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = crate::logging::DEFAULT_FILTER)]
    pub log: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Synthesise sensor streams for one or more scenarios and track them.
    Simulate {
        /// A scenario TOML file, or a directory searched for `*.toml`.
        #[arg(short, long, default_value = "assets/scenarios")]
        scenario: PathBuf,

        /// Also write each generated stream as a JSON-lines event log here.
        #[arg(long)]
        record: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Feed a recorded JSON-lines event log through a session.
    Replay {
        /// The event log to replay.
        log_file: PathBuf,

        /// Scenario whose `[engine]` and `[map]` sections configure the session.
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Map the route is stored under. Overrides the scenario's `map.id`.
        #[arg(long)]
        map_id: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Write an editable example scenario.
    Init {
        #[arg(default_value = "assets/scenarios/square.toml")]
        path: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Directory routes are saved to, one JSON file per map.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Print the final route snapshot as JSON on stdout.
    #[arg(long, default_value_t = false)]
    pub print: bool,
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
    fn replay_arguments_parse() {
        let cli = Cli::parse_from([
            "floortrack",
            "replay",
            "walk.jsonl",
            "--map-id",
            "lobby",
            "--out",
            "routes",
            "--print",
        ]);
        match cli.command {
            Command::Replay {
                log_file,
                scenario,
                map_id,
                output,
            } => {
                assert_eq!(log_file, PathBuf::from("walk.jsonl"));
                assert_eq!(scenario, None);
                assert_eq!(map_id.as_deref(), Some("lobby"));
                assert_eq!(output.out, Some(PathBuf::from("routes")));
                assert!(output.print);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
