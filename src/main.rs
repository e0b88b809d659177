use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod dashboard;
mod error;
mod lectures;
mod llm;
mod storage;
mod transcription;
mod upload;

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::handle_command(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
