use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "card-search",
    about = "Compile and run card catalog search queries",
    version,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Keyword registry file (.yaml, .yml or .json). Defaults to $CARD_SEARCH_REGISTRY,
    /// then to the built-in card registry
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Pick which subcommand to use
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the parsed query as JSON
    Parse(ParseArgs),
    /// Print the SQLite WHERE clause and bind values for a query
    Sql(QueryArgs),
    /// Run a query against a JSON catalog file
    Filter(FilterArgs),
    /// Run a query against a SQLite database
    Sqlite(SqliteArgs),
    /// List the keywords of the registry
    Keywords,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Search query, e.g. 'color:red level>=2 -trait:avatar'
    pub query: String,
}

#[derive(Args)]
pub struct ParseArgs {
    /// Search query
    pub query: String,

    /// Resolve negated groups before printing
    #[arg(long)]
    pub normalized: bool,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Search query
    pub query: String,

    /// JSON file holding an array of card objects
    #[arg(long)]
    pub catalog: PathBuf,
}

#[derive(Args)]
pub struct SqliteArgs {
    /// Search query
    pub query: String,

    /// SQLite database file
    #[arg(long)]
    pub database: PathBuf,

    /// Table holding the cards. Registry columns are resolved against it
    #[arg(long, default_value = "card")]
    pub table: String,

    /// Column to print for every matching row
    #[arg(long, default_value = "name")]
    pub select: String,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
