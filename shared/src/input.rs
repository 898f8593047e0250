//! Terminal line collection shared by the server console and the client

use log::warn;
use tokio::sync::mpsc;

/// Reads stdin lines on a dedicated thread and forwards them over a channel
///
/// A blocking stdin read cannot be cancelled, so it lives outside the async
/// runtime; either binary can exit without waiting for the user to press
/// enter. The channel closes at end of input.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || forward_lines(std::io::stdin().lock(), tx));

    rx
}

fn forward_lines<B: std::io::BufRead>(input: B, tx: mpsc::UnboundedSender<String>) {
    for line in input.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("Failed to read terminal input: {}", e);
                break;
            }
        }
    }
}
