use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Search endpoint (overrides BOOKSEARCH_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Search(SearchArgs),
    Browse(BrowseArgs),
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Field to match: all, title, author, subject, isbn.
    #[arg(long, default_value = "all")]
    pub scope: String,

    /// Language code (e.g. eng, fre) or `all`.
    #[arg(long, default_value = "all")]
    pub language: String,

    /// Earliest first publish year.
    #[arg(long)]
    pub year_from: Option<u32>,

    /// Latest first publish year.
    #[arg(long)]
    pub year_to: Option<u32>,

    /// Only books readable online.
    #[arg(long)]
    pub free_to_read: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Query text.
    #[arg(long, default_value = "")]
    pub query: String,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Result page (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// Initial query text.
    #[arg(long)]
    pub query: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,
}
