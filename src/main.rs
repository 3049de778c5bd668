use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use pasvftpd::config::Config;
use pasvftpd::core_cli::Cli;
use pasvftpd::server;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_filter = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    // Load configuration from the TOML file, if one was given
    let config = match args.config.as_deref() {
        Some(path) => Config::load_from_file(path)?,
        None => {
            info!("No configuration file given, using defaults.");
            Config::default()
        }
    };

    // Run the FTP server
    server::run(config).await
}
