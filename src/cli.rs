//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// ReviewHub - curated product review catalog with an outbound link resolver
#[derive(Parser)]
#[command(name = "reviewhub")]
#[command(version)]
#[command(about = "Curated product review catalog with an in-app aware link resolver", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Print an Argon2 hash for `auth.admin_password`
    HashPassword {
        /// Password to hash
        password: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["reviewhub"]);
        assert_eq!(cli.config, "config.toml");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_config_generate() {
        let cli = Cli::parse_from(["reviewhub", "--config", "x.toml", "config", "generate", "out.toml", "--force"]);
        assert_eq!(cli.config, "x.toml");
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommands::Generate {
                    output_path: Some("out.toml".to_string()),
                    force: true,
                }
            })
        );
    }

    #[test]
    fn test_hash_password() {
        let cli = Cli::parse_from(["reviewhub", "hash-password", "s3cret"]);
        assert_eq!(
            cli.command,
            Some(Commands::HashPassword {
                password: "s3cret".to_string()
            })
        );
    }
}
