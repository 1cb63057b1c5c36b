//! Command-line interface.
//!
//! Every command is best effort: lookups that come back empty are reported
//! and the process still exits cleanly. Only an unusable configuration is
//! fatal.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// javshelf - local catalog cache for javbus-api
#[derive(Parser, Debug)]
#[command(name = "javshelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path of the JSON config document
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the catalog API, e.g. http://localhost:8922/api
    #[arg(long, global = true, value_name = "URL")]
    pub api: Option<String>,

    /// SQLite database file or connection URL
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web API
    #[command(alias = "web")]
    Serve {
        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Fetch an actor profile
    Star {
        /// Actor id
        id: String,
    },

    /// Fetch a movie and its credited actors
    Movie {
        /// Movie id, e.g. ABP-123
        id: String,
    },

    /// Search actors by name
    #[command(alias = "s")]
    Search {
        /// Name or part of a name
        #[arg(required = true)]
        keyword: Vec<String>,
        /// Remote search pages to walk on a cache miss
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// List every movie of an actor
    StarMovies {
        /// Actor id
        id: String,
        /// Remote listing pages to walk on a cache miss
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Delete expired cache records
    #[command(alias = "purge")]
    Clean,

    /// Show the detail-site id and candidate pages for a code
    Normalize {
        /// Raw code, e.g. "abp 123"
        id: String,
    },

    /// Show recent search keywords
    #[command(alias = "h")]
    History {
        /// Number of entries to show
        #[arg(default_value = "10")]
        limit: u64,
    },

    /// Create the default config file
    Init,
}

impl Cli {
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        Config::resolve_path(self.config.as_deref())
    }

    /// Loads the config document and applies the command-line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(&self.config_path())?;

        if let Some(api) = self.api.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            config.api_url = api.to_string();
        }

        if let Some(db) = self.db.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            config.general.database_path = database_url(db);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Plain file paths become `sqlite:` URLs; URLs pass through.
fn database_url(db: &str) -> String {
    if db.starts_with("sqlite:") || db.contains("://") {
        db.to_string()
    } else {
        format!("sqlite:{db}")
    }
}

pub use commands::*;
