//! Server network layer: TCP accept loop and session supervision

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::game::GuessState;
use crate::leaderboard::Leaderboard;
use crate::session::{Session, SessionLimits, SessionOutcome};
use crate::session_manager::SessionManager;
use crate::shutdown::{wait_for_shutdown, ShutdownHandle};
use crate::words::WordSource;
use log::{debug, error, info, warn};
use shared::ServerLine;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, RwLock};
use tokio::task::JoinSet;

/// Accepts connections and runs one session task per connection
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    words: Arc<WordSource>,
    leaderboard: Arc<Leaderboard>,
    sessions: Arc<RwLock<SessionManager>>,
    shutdown: ShutdownHandle,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    pub async fn bind(config: ServerConfig, words: WordSource) -> Result<Self, StartupError> {
        let listener = TcpListener::bind(&config.bind_addr)
            .await
            .map_err(|source| StartupError::Bind {
                addr: config.bind_addr.clone(),
                source,
            })?;
        info!("Server listening on {}", config.bind_addr);

        let leaderboard = Arc::new(Leaderboard::new(
            config.leaderboard_path.clone(),
            config.leaderboard_capacity,
            config.lock_timeout,
        ));
        let sessions = Arc::new(RwLock::new(SessionManager::new(config.max_sessions)));
        let (shutdown, shutdown_rx) = ShutdownHandle::new();

        Ok(Server {
            listener,
            config,
            words: Arc::new(words),
            leaderboard,
            sessions,
            shutdown,
            shutdown_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Runs the accept loop until shutdown is requested, then waits for
    /// every live session to close before releasing the listener. Sessions
    /// still running after the configured grace period are aborted.
    pub async fn run(self) {
        let mut tasks = JoinSet::new();
        let mut shutdown_rx = self.shutdown_rx.clone();

        info!("Waiting for players...");

        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown_rx) => break,

                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => self.spawn_session(&mut tasks, stream, addr).await,
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                },

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!("Session task failed: {}", e);
                    }
                },
            }
        }

        let live = self.sessions.read().await.len();
        info!("Server shutting down, closing {} live sessions", live);

        let drain = async {
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    error!("Session task failed during shutdown: {}", e);
                }
            }
        };
        if tokio::time::timeout(self.config.shutdown_grace, drain).await.is_err() {
            warn!(
                "Aborting {} sessions still open after {:?}",
                tasks.len(),
                self.config.shutdown_grace
            );
            tasks.shutdown().await;
        }

        drop(self.listener);
        info!("Server stopped");
    }

    async fn spawn_session(&self, tasks: &mut JoinSet<()>, stream: TcpStream, addr: SocketAddr) {
        let session_id = self.sessions.write().await.add_session(addr);

        let Some(session_id) = session_id else {
            warn!("Refusing connection from {}: session limit reached", addr);
            tasks.spawn(refuse(stream));
            return;
        };

        let answer = self.words.random_word().to_string();
        debug!("The answer for session {} is {}", session_id, answer);

        let (reader, writer) = stream.into_split();
        let session = Session::new(
            session_id,
            BufReader::new(reader),
            writer,
            GuessState::new(&answer, self.config.max_guesses),
            Arc::clone(&self.leaderboard),
            self.shutdown_rx.clone(),
            SessionLimits {
                idle_timeout: self.config.idle_timeout,
                max_line_len: self.config.max_line_len,
            },
        );
        let sessions = Arc::clone(&self.sessions);

        tasks.spawn(async move {
            let outcome = session.run().await;
            log_outcome(session_id, &outcome);
            sessions.write().await.remove_session(&session_id);
        });
    }
}

/// Turns away a connection beyond the session limit.
async fn refuse(mut stream: TcpStream) {
    let line = format!("{}\n", ServerLine::Exiting);
    if let Err(e) = stream.write_all(line.as_bytes()).await {
        debug!("Failed to notify refused connection: {}", e);
    }
    let _ = stream.shutdown().await;
}

fn log_outcome(session_id: u32, outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Won {
            player,
            score,
            recorded,
        } => info!(
            "Session {}: {} won with {} tries left{}",
            session_id,
            player,
            score,
            if *recorded { " and made the toplist" } else { "" }
        ),
        SessionOutcome::Lost { player } => info!("Session {}: {} lost", session_id, player),
        SessionOutcome::Disconnected => info!("Session {}: disconnected", session_id),
        SessionOutcome::ShutDown => info!("Session {}: closed by shutdown", session_id),
    }
}
