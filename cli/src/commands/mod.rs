mod keywords;
mod query;

use crate::argparse::Commands;
use card_search::Registry;
pub use keywords::handle_keywords_command;
pub use query::{
    handle_filter_command, handle_parse_command, handle_sql_command, handle_sqlite_command,
};

pub async fn handle_command(command: Commands, registry: &Registry) -> anyhow::Result<()> {
    match command {
        Commands::Parse(args) => handle_parse_command(args, registry),
        Commands::Sql(args) => handle_sql_command(args, registry),
        Commands::Filter(args) => handle_filter_command(args, registry),
        Commands::Sqlite(args) => handle_sqlite_command(args, registry).await,
        Commands::Keywords => handle_keywords_command(registry),
    }
}
