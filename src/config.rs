use clap::Parser;
use std::path::PathBuf;

pub const PORT: u16 = 105;
pub const MAX_BATCH_SIZE: usize = 64 * 1024;

/// Server configuration, read from the command line or from `RUSTPH_*` environment variables.
#[derive(Parser, Debug, Clone)]
#[command(name = "rustph", version, about)]
pub struct Config {
    /// The address to listen on
    #[arg(long, env = "RUSTPH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// The port to listen on
    #[arg(short, long, env = "RUSTPH_PORT", default_value_t = PORT)]
    pub port: u16,

    /// JSON file holding the directory entries
    #[arg(short, long, env = "RUSTPH_ENTRIES", default_value = "entries.json")]
    pub entries: PathBuf,

    /// Text file answered verbatim to `status`
    #[arg(long, env = "RUSTPH_STATUS_FILE")]
    pub status_file: Option<PathBuf>,

    /// Text file answered verbatim to `siteinfo`
    #[arg(long, env = "RUSTPH_SITEINFO_FILE")]
    pub siteinfo_file: Option<PathBuf>,

    /// Minimum number of seconds between two reloads of the entries
    #[arg(long, env = "RUSTPH_RELOAD_COOLDOWN", default_value_t = 60)]
    pub reload_cooldown: u64,

    /// Fields returned with every explicit return list
    #[arg(
        long,
        env = "RUSTPH_ALWAYS_FIELDS",
        value_delimiter = ',',
        default_value = "name"
    )]
    pub always_fields: Vec<String>,

    /// Fields advertised as indexed lookups
    #[arg(
        long,
        env = "RUSTPH_SEARCH_FIELDS",
        value_delimiter = ',',
        default_value = "name,species,affiliation,universe"
    )]
    pub search_fields: Vec<String>,

    /// Fields that an explicit return list may request
    #[arg(
        long,
        env = "RUSTPH_FILTERABLE_FIELDS",
        value_delimiter = ',',
        default_value = "name,sex,species,affiliation,universe,site,email,discord"
    )]
    pub filterable_fields: Vec<String>,

    /// Largest batch of unterminated input accepted from a client, in bytes
    #[arg(long, env = "RUSTPH_MAX_BATCH_SIZE", default_value_t = MAX_BATCH_SIZE)]
    pub max_batch_size: usize,
}
