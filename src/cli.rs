//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// AffiliateAura - affiliate link tracking and partnership service
#[derive(Parser)]
#[command(name = "affiliateaura")]
#[command(version)]
#[command(about = "Affiliate link tracking and partnership service", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands (no subcommand starts the server)
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve,

    /// Print a sample configuration file
    GenerateConfig {
        /// Write to this path instead of stdout
        output_path: Option<String>,
    },

    /// Issue a session token for a user
    IssueToken {
        /// User email (token subject)
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_server() {
        let cli = Cli::parse_from(["affiliateaura"]);
        assert_eq!(cli.config, "config.toml");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_issue_token() {
        let cli = Cli::parse_from([
            "affiliateaura",
            "--config",
            "/etc/aa.toml",
            "issue-token",
            "--email",
            "jane@example.com",
        ]);
        assert_eq!(cli.config, "/etc/aa.toml");
        match cli.command {
            Some(Commands::IssueToken { email, name }) => {
                assert_eq!(email, "jane@example.com");
                assert!(name.is_none());
            }
            _ => panic!("expected issue-token"),
        }
    }
}
