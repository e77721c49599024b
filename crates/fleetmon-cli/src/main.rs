use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod prompt;
mod rc_file;
mod render;

use fleetmon_services::{Fetcher, SshConnector};
use render::Renderer;

#[derive(Parser)]
#[command(name = "fleetmon")]
#[command(about = "GPU and storage dashboard for an ssh server fleet", long_about = None)]
struct Cli {
    /// Shell rc file to scan for ssh aliases (defaults to ~/.zshrc)
    #[arg(long)]
    rc_file: Option<PathBuf>,

    /// Connect and command timeout in seconds
    #[arg(short, long, default_value = "10")]
    timeout: u64,

    /// Number of poll cycles to run; 0 polls until interrupted
    #[arg(short, long, default_value = "1")]
    count: u64,

    /// Seconds to wait between poll cycles
    #[arg(short, long, default_value = "60")]
    interval: u64,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let rc_path = match cli.rc_file {
        Some(path) => path,
        None => rc_file::default_rc_path()?,
    };
    let targets = rc_file::load_targets(&rc_path)?;

    let secret = prompt::read_password("Enter server password")?;

    let connector = SshConnector::new(Duration::from_secs(cli.timeout));
    let fetcher = Fetcher::new(connector);

    let mut cycle = 0u64;
    loop {
        cycle += 1;
        let reports = fetcher.poll_all(&targets, &secret);

        match cli.output.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&reports)?),
            _ => Renderer::new(io::stdout().lock()).dashboard(&reports)?,
        }

        if cli.count != 0 && cycle >= cli.count {
            break;
        }
        thread::sleep(Duration::from_secs(cli.interval));
    }

    Ok(())
}
