//! Command-line arguments.
//!
//! ```bash
//! ksl search "mountain bike" -M 500 --city Provo
//! ksl notify "mountain bike" "kayak" --email me@gmail.com -t 15 -C 1500 -S seen.json
//! ```

use crate::scraper::DEFAULT_WORKERS;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ksl", version, about = "Query KSL classifieds and get notified of new ads")]
pub struct Cli {
    /// File to log output to, defaults to stderr
    #[arg(short = 'l', long, global = true)]
    pub logfile: Option<PathBuf>,

    /// Choose level: trace, debug, info, warn, error
    #[arg(long, default_value = "info", global = true)]
    pub loglevel: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print current listings for one or more search terms
    Search(SearchArgs),
    /// Periodically search and email new listings
    Notify(NotifyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Terms to search on KSL classifieds. Use quotes for multiword searches
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Include listings more broadly related to your search terms
    #[arg(short = 'x', long)]
    pub expand_search: bool,

    /// Category to apply to search results
    #[arg(short = 'c', long)]
    pub category: Option<String>,

    /// Subcategory to apply to search results
    #[arg(short = 'u', long = "subcategory")]
    pub sub_category: Option<String>,

    /// Minimum dollar amount to include in search results
    #[arg(short = 'm', long, default_value = "0", allow_hyphen_values = true)]
    pub min_price: String,

    /// Maximum dollar amount to include in search results
    #[arg(short = 'M', long, default_value = "0", allow_hyphen_values = true)]
    pub max_price: String,

    /// ZIP code around which to center search results
    #[arg(short = 'z', long)]
    pub zip: Option<String>,

    /// City around which to center search results
    #[arg(long)]
    pub city: Option<String>,

    /// State (abbr, like UT) around which to center search results
    #[arg(long)]
    pub state: Option<String>,

    /// Maximum distance in miles from ZIP code center
    #[arg(short = 'd', long)]
    pub miles: Option<String>,

    /// Sort oldest to newest instead of newest to oldest
    #[arg(short = 'r', long)]
    pub reverse: bool,

    /// Include sold items as well as active items
    #[arg(short = 's', long)]
    pub sold: bool,

    /// Number of concurrent page fetches
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,
}

#[derive(Args, Debug, Clone)]
pub struct NotifyArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Email address to send from. Also the receiver unless --to-email is given
    #[arg(long)]
    pub email: String,

    /// Password for the sending account
    #[arg(long, env = "KSL_NOTIFY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// SMTP server:port, unneeded for gmail, outlook, hotmail, msn, yahoo, or comcast
    #[arg(long)]
    pub smtpserver: Option<String>,

    /// Send through the Brevo API instead of SMTP
    #[arg(long, env = "BREVO_API_KEY", hide_env_values = true)]
    pub brevo_api_key: Option<String>,

    /// Email address to send matches to. Defaults to --email
    #[arg(long)]
    pub to_email: Option<String>,

    /// Email address to send failure reports to. Defaults to --email
    #[arg(long)]
    pub exception_email: Option<String>,

    /// Minutes to wait between searches
    #[arg(short = 't', long, default_value_t = 10)]
    pub time: u64,

    /// Lines to include from each listing's description. All when omitted
    #[arg(short = 'H', long)]
    pub head: Option<usize>,

    /// Characters allowed per message; extra listings go into more messages
    #[arg(short = 'C', long)]
    pub char_limit: Option<usize>,

    /// Leave listing links out of messages
    #[arg(short = 'X', long)]
    pub exclude_links: bool,

    /// Load seen listings from a JSON file of search term to listing links
    #[arg(short = 'L', long)]
    pub load: Option<PathBuf>,

    /// Save seen listings to a JSON file after every search
    #[arg(short = 'S', long)]
    pub save: Option<PathBuf>,

    /// Repeated failed searches before emailing a failure report
    #[arg(short = 'e', long, default_value_t = 5)]
    pub email_exceptions: u32,

    /// Run a single search cycle and exit
    #[arg(long)]
    pub once: bool,
}
