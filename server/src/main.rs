use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::control::run_console;
use server::network::Server;
use server::words::WordSource;
use shared::input::spawn_stdin_reader;
use shared::{
    DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_GUESSES, DEFAULT_MAX_LINE_LEN, DEFAULT_SHUTDOWN_GRACE_MS,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    port: u16,

    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Word list, one candidate word per line
    #[arg(short, long, default_value = "words.txt")]
    words: PathBuf,

    /// Leaderboard file
    #[arg(short, long, default_value = "toplist.txt")]
    leaderboard: PathBuf,

    /// Wrong guesses allowed per game
    #[arg(long, default_value_t = DEFAULT_MAX_GUESSES)]
    max_guesses: u32,

    /// Entries kept on the leaderboard
    #[arg(long, default_value = "10")]
    capacity: usize,

    /// How long a win waits for the leaderboard lock
    #[arg(long, default_value_t = DEFAULT_LOCK_TIMEOUT_MS)]
    lock_timeout_ms: u64,

    /// Close sessions idle for this many seconds
    #[arg(long)]
    idle_timeout_secs: Option<u64>,

    /// Maximum concurrent sessions
    #[arg(long, default_value = "256")]
    max_sessions: usize,

    /// Longest accepted client line, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LEN)]
    max_line_len: usize,

    /// How long shutdown waits for open sessions
    #[arg(long, default_value_t = DEFAULT_SHUTDOWN_GRACE_MS)]
    shutdown_grace_ms: u64,

    /// Do not read operator commands from stdin
    #[arg(long)]
    no_console: bool,
}

impl Args {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: format!("{}:{}", self.host, self.port),
            words_path: self.words.clone(),
            leaderboard_path: self.leaderboard.clone(),
            max_guesses: self.max_guesses,
            leaderboard_capacity: self.capacity,
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
            idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
            max_sessions: self.max_sessions,
            max_line_len: self.max_line_len,
            shutdown_grace: Duration::from_millis(self.shutdown_grace_ms),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.config();

    let words = WordSource::load(&config.words_path).await?;
    let server = Server::bind(config, words).await?;
    let shutdown = server.shutdown_handle();

    println!("Running on {}", server.local_addr()?);

    if !args.no_console {
        println!("Exit with !exit");
        tokio::spawn(run_console(spawn_stdin_reader(), shutdown.clone()));
    }

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, shutting down gracefully...");
                shutdown.shutdown();
            }
        });
    }

    server.run().await;

    Ok(())
}
