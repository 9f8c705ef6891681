use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "envfile",
    about = "Persist environment variables across independent process invocations",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/envfile/logs/envfile.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to envfile.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply the persisted environment, optionally running a command with it
    Apply {
        /// Command to run with the applied environment
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// Merge variables into the persisted environment and apply the result
    Merge {
        /// Assignments in KEY=VALUE form
        assignments: Vec<String>,

        /// Read assignments from a file (one KEY=VALUE per line)
        #[arg(long, short = 'f')]
        from_file: Option<PathBuf>,

        /// Read KEY=VALUE lines from stdin
        #[arg(long)]
        from_env_list: bool,

        /// Command to run with the merged environment
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// Show the persisted environment
    Show {
        /// Print only the value of this variable
        key: Option<String>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print the persisted environment as shell export statements
    Export,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_parses_assignments_and_command() {
        let cli = Cli::try_parse_from(["envfile", "merge", "A=1", "B=2", "--", "sh", "-c", "echo $A"]).unwrap();
        match cli.command {
            Commands::Merge {
                assignments,
                command,
                from_file,
                from_env_list,
            } => {
                assert_eq!(assignments, vec!["A=1", "B=2"]);
                assert_eq!(command, vec!["sh", "-c", "echo $A"]);
                assert!(from_file.is_none());
                assert!(!from_env_list);
            }
            _ => panic!("expected merge"),
        }
    }

    #[test]
    fn test_apply_without_command() {
        let cli = Cli::try_parse_from(["envfile", "apply"]).unwrap();
        assert!(matches!(cli.command, Commands::Apply { command } if command.is_empty()));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["envfile", "show", "-v", "-o", "json"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Show { key: None, format: Some(OutputFormat::Json) }));
    }

    #[test]
    fn test_resolve_explicit_format() {
        assert_eq!(OutputFormat::resolve(Some(OutputFormat::Yaml)), OutputFormat::Yaml);
    }
}
