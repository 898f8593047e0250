use log::{debug, info, warn};
use shared::{username_line, ServerLine};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server did not accept the connection in time.
    #[error("Connecting to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    /// Socket or terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the game ended from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Won,
    Lost,
    /// The connection closed before a result was announced.
    Unfinished,
}

pub struct Client {
    name: String,
    stream: TcpStream,
}

impl Client {
    pub async fn connect(
        name: &str,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let addr = format!("{}:{}", host, port);
        info!("Connecting to {}...", addr);

        let stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ClientError::ConnectTimeout {
                addr: addr.clone(),
                timeout,
            })??;

        Ok(Client {
            name: name.to_string(),
            stream,
        })
    }

    /// Announces the username, then relays guesses from `input` to the
    /// server and server lines to `output` until the closing sentinel or the
    /// end of the connection.
    pub async fn play<O>(
        self,
        mut input: mpsc::UnboundedReceiver<String>,
        output: &mut O,
    ) -> Result<GameResult, ClientError>
    where
        O: AsyncWrite + Unpin,
    {
        let (reader, mut writer) = self.stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        send_line(&mut writer, &username_line(&self.name)).await?;

        let mut result = GameResult::Unfinished;
        let mut forwarding = true;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Server closed the connection");
                        break;
                    };

                    match ServerLine::parse(&line) {
                        ServerLine::Exiting => break,
                        ServerLine::Won => result = GameResult::Won,
                        ServerLine::Lost => result = GameResult::Lost,
                        _ => {}
                    }

                    output.write_all(line.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                    output.flush().await?;
                },

                guess = input.recv(), if forwarding => match guess {
                    Some(guess) => {
                        if let Err(e) = send_line(&mut writer, &guess).await {
                            warn!("Failed to send guess: {}", e);
                            forwarding = false;
                        }
                    }
                    None => forwarding = false,
                },
            }
        }

        Ok(result)
    }
}

async fn send_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
