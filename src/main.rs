use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "baler")]
#[command(about = "Package an application workspace with its dependencies for offline deployment")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive the application, or vendor its dependencies in place
    Archive {
        /// Install dependencies into the live workspace instead of archiving
        #[arg(long, conflicts_with = "no_local")]
        local: bool,
        /// Undo a previous --local install
        #[arg(long)]
        no_local: bool,
        /// Extra top-level directory to leave out of the archive (repeatable)
        #[arg(short = 'e', long)]
        exclude: Vec<String>,
    },
    /// Configure site-wide settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Set the directory dependencies are installed into while packaging
    SetGemDir {
        /// Path to the install directory (`~` is expanded)
        path: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("baler=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Archive {
            local,
            no_local,
            exclude,
        } => cli::archive::run(cli::archive::ArchiveOptions {
            local,
            no_local,
            exclude,
        }),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::SetGemDir { path } => cli::config::set_gem_dir(path),
        }
        .map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n{}", baler::core::format_error_with_help(&e));
            ExitCode::FAILURE
        }
    }
}
