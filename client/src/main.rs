use clap::Parser;
use client::network::Client;
use log::info;
use shared::input::spawn_stdin_reader;
use shared::DEFAULT_CONNECT_TIMEOUT_MS;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name shown on the leaderboard
    name: String,

    /// Server host
    host: String,

    /// Server port
    port: u16,

    /// Give up connecting after this many milliseconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_MS)]
    connect_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    println!("Starting game...");
    let client = Client::connect(
        &args.name,
        &args.host,
        args.port,
        Duration::from_millis(args.connect_timeout_ms),
    )
    .await?;

    println!("Waiting for input...");
    let mut stdout = tokio::io::stdout();
    let result = client.play(spawn_stdin_reader(), &mut stdout).await?;
    info!("Game finished: {:?}", result);

    Ok(())
}
