use clap::Parser;

mod cli;
mod commands;
pub mod exit_codes;

use cli::args::Cli;
use commands::dispatch::dispatch;

const ENV_LOG_LEVEL: &str = "QAAGENT_LOG_LEVEL";

fn init_tracing() {
    if std::env::var("RUST_LOG").is_err() {
        let level = std::env::var(ENV_LOG_LEVEL).unwrap_or_else(|_| "info".to_string());
        std::env::set_var("RUST_LOG", level);
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            e.kind.exit_code()
        }
    };
    std::process::exit(code);
}
