//! CLI command definitions and subcommands

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

/// prc - prompt router client
#[derive(Debug, Parser)]
#[command(
    name = "prc",
    version,
    about = "Submit prompts to the multi-LLM prompt router and watch them progress"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Router base URL, overrides `server.base-url` from the config file
    #[arg(short = 'u', long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit one prompt and follow it until it finishes
    Ask {
        /// Prompt text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },

    /// Interactive prompt loop (default)
    Repl,

    /// Show the status of an existing session
    Status {
        /// Session ID returned when the prompt was submitted
        session_id: String,

        /// Keep polling until the session finishes
        #[arg(short, long)]
        watch: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

impl Command {
    /// Reject flag combinations clap cannot express
    pub fn validate(&self) -> eyre::Result<()> {
        debug!(command = ?self, "Command::validate: called");
        if let Command::Status {
            watch: true,
            format: OutputFormat::Json,
            ..
        } = self
        {
            eyre::bail!("--watch cannot be combined with --format json");
        }
        Ok(())
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptrouter")
        .join("logs")
        .join("prc.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Output format for the status command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use text or json", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["prc"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::try_parse_from(["prc", "-u", "http://router:8000", "ask", "What", "is", "2+2?"]).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://router:8000"));
        match cli.command {
            Some(Command::Ask { prompt }) => assert_eq!(prompt.join(" "), "What is 2+2?"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ask_requires_prompt() {
        assert!(Cli::try_parse_from(["prc", "ask"]).is_err());
    }

    #[test]
    fn test_status_flags() {
        let cli = Cli::try_parse_from(["prc", "status", "abc123", "--watch", "--format", "json"]).unwrap();
        match cli.command {
            Some(Command::Status {
                session_id,
                watch,
                format,
            }) => {
                assert_eq!(session_id, "abc123");
                assert!(watch);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_watch_rejects_json_format() {
        let cli = Cli::try_parse_from(["prc", "status", "abc123", "--watch", "--format", "json"]).unwrap();
        assert!(cli.command.unwrap().validate().is_err());

        let cli = Cli::try_parse_from(["prc", "status", "abc123", "--watch"]).unwrap();
        assert!(cli.command.unwrap().validate().is_ok());

        let cli = Cli::try_parse_from(["prc", "status", "abc123", "--format", "json"]).unwrap();
        assert!(cli.command.unwrap().validate().is_ok());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_log_path() {
        assert!(get_log_path().ends_with("promptrouter/logs/prc.log"));
    }
}
