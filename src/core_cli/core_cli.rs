use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "pasvftpd", about = "A minimal passive-mode FTP server.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
