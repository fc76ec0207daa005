use anyhow::Result;
use clap::Parser;
use scrumdinger::cli::{
    handle_add_command, handle_edit_command, handle_history_command, handle_list_command,
    handle_remove_command, handle_run_command, handle_seed_command, Cli, CliCommand,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("Scrumdinger {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(CliCommand::List) | None => handle_list_command(),
        Some(CliCommand::Add(args)) => handle_add_command(args),
        Some(CliCommand::Edit(args)) => handle_edit_command(args),
        Some(CliCommand::Remove(args)) => handle_remove_command(args),
        Some(CliCommand::Run(args)) => handle_run_command(args).await,
        Some(CliCommand::History(args)) => handle_history_command(args),
        Some(CliCommand::Seed) => handle_seed_command(),
    }
}
