//! CLI command definitions.

use clap::{Args, Subcommand};
use fetch_cache::{CacheQueryOptions, Request};

#[derive(Subcommand)]
pub enum Commands {
    /// List cache names
    List,

    /// Check whether a cache exists
    Has {
        /// Cache name
        name: String,
    },

    /// Delete a cache and all its entries
    Delete {
        /// Cache name
        name: String,
    },

    /// List the stored URLs of a cache
    Keys {
        /// Cache name
        cache: String,

        /// Only list keys matching this URL
        url: Option<String>,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Look up a URL and print the stored response
    Match {
        /// Request URL
        url: String,

        /// Search only this cache
        #[arg(short, long)]
        cache: Option<String>,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Fetch URLs and store the responses
    Add {
        /// Cache name
        cache: String,

        /// URLs to fetch
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Remove stored entries for a URL
    Remove {
        /// Cache name
        cache: String,

        /// Request URL
        url: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Options shared by lookup commands.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Request method of the lookup
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Ignore the query string when comparing URLs
    #[arg(long)]
    pub ignore_search: bool,

    /// Match even when the request method is not GET
    #[arg(long)]
    pub ignore_method: bool,
}

impl QueryArgs {
    pub fn options(&self) -> CacheQueryOptions {
        CacheQueryOptions::default()
            .ignore_search(self.ignore_search)
            .ignore_method(self.ignore_method)
    }

    pub fn request(&self, url: &str) -> Request {
        Request::new(&self.method, url)
    }
}

impl Default for QueryArgs {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            ignore_search: false,
            ignore_method: false,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}
