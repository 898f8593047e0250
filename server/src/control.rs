//! Operator console. `!exit` (or the end of operator input) shuts the
//! server down.

use crate::shutdown::ShutdownHandle;
use log::info;
use tokio::sync::mpsc;

pub const EXIT_COMMAND: &str = "!exit";
pub const HELP_TEXT: &str = "Available commands: !exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Exit,
    Unknown,
}

pub fn parse_command(line: &str) -> ConsoleCommand {
    if line.trim() == EXIT_COMMAND {
        ConsoleCommand::Exit
    } else {
        ConsoleCommand::Unknown
    }
}

/// Consumes operator lines until `!exit` or end of input, then requests
/// shutdown.
pub async fn run_console(mut commands: mpsc::UnboundedReceiver<String>, shutdown: ShutdownHandle) {
    while let Some(line) = commands.recv().await {
        match parse_command(&line) {
            ConsoleCommand::Exit => break,
            ConsoleCommand::Unknown => println!("{}", HELP_TEXT),
        }
    }

    info!("Operator requested shutdown");
    shutdown.shutdown();
}
