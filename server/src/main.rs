use clap::ArgAction;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use log::warn;

fn main() {
    let args = CliArgs::parse();
    let dotenv_result = dotenv();

    let env = env_logger::Env::new().filter_or(
        "RUST_LOG",
        match args.global_opts.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    );
    env_logger::Builder::from_env(env).init();
    if dotenv_result.is_err() {
        warn!("Could not read .env file: {}", dotenv_result.unwrap_err());
    }

    let result = match args.command {
        Command::Serve => programme_server::web::serve(),
        Command::Migrate => programme_server::cli::database_migration::run_migrations()
            .map_err(|e| programme_server::cli_error::CliError::DatabaseMigrationError(e.to_string())),
        Command::CheckMigrations => {
            programme_server::cli::database_migration::check_migration_state().map_err(|e| {
                programme_server::cli_error::CliError::DatabaseMigrationRequired {
                    missing_migrations: vec![e.to_string()],
                }
            })
        }
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}

/// Programme management backend for a volunteer-run cinema
#[derive(Debug, Parser)]
#[clap(name = "programme-server", version)]
pub struct CliArgs {
    #[clap(flatten)]
    global_opts: GlobalOpts,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the programme management web API
    Serve,
    /// Apply pending database schema migrations
    Migrate,
    /// Check whether database schema migrations are pending
    CheckMigrations,
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// Verbosity level (can be specified multiple times)
    #[clap(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,
}
