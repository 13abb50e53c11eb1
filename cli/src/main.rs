mod argparse;
mod commands;
mod utils;

use argparse::parse_args;
use card_search_cli::config::RegistrySource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = parse_args();
    utils::init_logger(cli.verbose);

    let registry = RegistrySource::from_env(cli.registry).load()?;

    commands::handle_command(cli.command, &registry).await
}
