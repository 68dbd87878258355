//! Command-line interface parsing for the umapyoi binary
//!
//! Global flags map onto [`ServiceConfig`]; each subcommand maps onto one
//! [`crate::service::CharacterService`] operation.

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{RateLimit, ServiceConfig, DEFAULT_API_BASE_URL, DEFAULT_WIKI_BASE_URL};

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("Invalid height range: minimum {min} is above maximum {max}")]
    InvalidHeightRange { min: u32, max: u32 },

    #[error("Invalid {0}: value cannot be empty")]
    Empty(&'static str),
}

/// Umapyoi character lookups with local caching and wiki enrichment
#[derive(Parser, Debug)]
#[command(name = "umapyoi")]
#[command(about = "Umapyoi character lookups with local caching and wiki enrichment")]
#[command(version)]
pub struct Cli {
    /// Base URL of the Umapyoi API
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE_URL, global = true)]
    pub api_url: String,

    /// Base URL of the wiki used for enrichment
    #[arg(long, value_name = "URL", default_value = DEFAULT_WIKI_BASE_URL, global = true)]
    pub wiki_url: String,

    /// Maximum requests per second for bulk fetch and search (0 disables the pause)
    #[arg(long, value_name = "N", default_value_t = 10, global = true)]
    pub rps: u32,

    /// Skip wiki enrichment
    #[arg(long, global = true)]
    pub no_enrich: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch one character by game id
    Get {
        id: u32,
        /// Print the wiki-enriched character instead of the raw record
        #[arg(long)]
        domain: bool,
        /// Print a one-line summary instead of JSON
        #[arg(long, conflicts_with = "domain")]
        summary: bool,
    },

    /// Fetch several characters, one at a time
    Bulk {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u32>,
        /// Fetch through the worker pool instead of the rate-limited loop
        #[arg(long)]
        concurrent: bool,
    },

    /// Search characters by name (exact match first, then partial)
    Search { term: String },

    /// Artwork URLs for a character
    Images { id: u32 },

    /// Characters whose birthday is today
    Birthdays,

    /// Every character's id and name
    List,

    /// Every character id
    Ids,

    /// The popular seed characters
    Popular {
        /// Enrich, rank by rarity and print one line per character
        #[arg(long)]
        ranked: bool,
    },

    /// Popular characters within a height range in centimeters
    Height { min: u32, max: u32 },

    /// Popular characters matching a type (speed, stamina, power, guts, intelligence)
    Type { label: String },

    /// Check that the API is reachable
    Ping,
}

impl Cli {
    /// Rejects argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), CliError> {
        match &self.command {
            Command::Height { min, max } if min > max => Err(CliError::InvalidHeightRange {
                min: *min,
                max: *max,
            }),
            Command::Search { term } if term.trim().is_empty() => {
                Err(CliError::Empty("search term"))
            }
            Command::Type { label } if label.trim().is_empty() => Err(CliError::Empty("type")),
            _ => Ok(()),
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            enrichment_enabled: !self.no_enrich,
            ..ServiceConfig::default()
        }
        .with_api_base_url(&self.api_url)
        .with_wiki_base_url(&self.wiki_url)
        .with_rate_limit(RateLimit::per_second(self.rps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("umapyoi").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_get_with_defaults() {
        let cli = parse(&["get", "1001"]);

        assert_eq!(
            cli.command,
            Command::Get {
                id: 1001,
                domain: false,
                summary: false
            }
        );
        assert_eq!(cli.api_url, DEFAULT_API_BASE_URL);
        assert_eq!(cli.rps, 10);
        assert!(!cli.no_enrich);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["bulk", "1001", "1002", "--rps", "0", "--no-enrich"]);

        assert_eq!(
            cli.command,
            Command::Bulk {
                ids: vec![1001, 1002],
                concurrent: false
            }
        );
        let config = cli.service_config();
        assert!(!config.enrichment_enabled);
        assert_eq!(config.rate_limit.max_requests_per_second, 0);
    }

    #[test]
    fn test_service_config_uses_urls() {
        let cli = parse(&[
            "--api-url",
            "http://localhost:8080",
            "--wiki-url",
            "http://localhost:9090",
            "ping",
        ]);
        let config = cli.service_config();

        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.wiki.base_url, "http://localhost:9090");
        assert!(config.enrichment_enabled);
    }

    #[test]
    fn test_summary_conflicts_with_domain() {
        let cli = parse(&["get", "1001", "--summary"]);
        assert_eq!(
            cli.command,
            Command::Get {
                id: 1001,
                domain: false,
                summary: true
            }
        );
        assert!(
            Cli::try_parse_from(["umapyoi", "get", "1001", "--summary", "--domain"]).is_err()
        );
        assert_eq!(
            parse(&["popular", "--ranked"]).command,
            Command::Popular { ranked: true }
        );
    }

    #[test]
    fn test_bulk_requires_ids() {
        assert!(Cli::try_parse_from(["umapyoi", "bulk"]).is_err());
        assert!(Cli::try_parse_from(["umapyoi", "get", "abc"]).is_err());
    }

    #[test]
    fn test_validate_height_range() {
        assert_eq!(parse(&["height", "150", "170"]).validate(), Ok(()));
        assert_eq!(
            parse(&["height", "170", "150"]).validate(),
            Err(CliError::InvalidHeightRange { min: 170, max: 150 })
        );
    }

    #[test]
    fn test_validate_rejects_blank_search() {
        assert_eq!(
            parse(&["search", "  "]).validate(),
            Err(CliError::Empty("search term"))
        );
        assert_eq!(parse(&["type", ""]).validate(), Err(CliError::Empty("type")));
        assert_eq!(parse(&["search", "Special Week"]).validate(), Ok(()));
    }
}
