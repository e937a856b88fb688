mod cli;
mod error;
mod filter;
mod fmt;
mod loader;
mod lookup;
mod models;
mod reports;
mod series;
mod settings;

use clap::Parser;

use cli::{Cli, Commands, DashboardArgs, Session};
use error::Result;

fn run(cli: Cli) -> Result<()> {
    // Settings commands never need the ledger.
    if let Some(Commands::Config { command }) = &cli.command {
        return cli::config::dispatch(command);
    }

    let session = Session::open(cli.file.as_deref())?;
    match &cli.command {
        None => cli::report::dashboard(&session, &DashboardArgs::default()),
        Some(Commands::Status) => cli::status::run(&session),
        Some(Commands::Categories) => cli::categories::list(&session),
        Some(Commands::Report { command }) => cli::report::dispatch(command, &session),
        Some(Commands::Transactions(args)) => cli::transactions::run(&session, args),
        Some(Commands::Export { lookup, output }) => {
            cli::export::run(&session, lookup, output.as_deref())
        }
        Some(Commands::Config { command }) => cli::config::dispatch(command),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
