//! # Hangman Server Library
//!
//! This library provides the server side of a networked word-guessing game.
//! Players connect over TCP, each is given a random secret word, and the
//! server plays the game with them one text line at a time. Winners are
//! written to a shared, file-backed leaderboard.
//!
//! ## Core Responsibilities
//!
//! ### Session Handling
//! Every accepted connection runs its own session task. A session owns its
//! game state outright and nothing it does, including failing, can affect
//! another session or the accept loop.
//!
//! ### Leaderboard Integrity
//! Many sessions may finish at the same time. The leaderboard file is
//! reloaded, updated and rewritten under a single lock with a bounded wait,
//! so concurrent wins never interleave or lose updates. A session that
//! cannot get the lock in time skips its update instead of retrying.
//!
//! ### Coordinated Shutdown
//! A shutdown request stops the accept loop, tells every live session to send
//! the closing sentinel, and waits for them to finish before the listener is
//! released.
//!
//! ## Wire Protocol
//!
//! Newline-delimited UTF-8 lines. The server first sends the obscured answer.
//! The client announces itself with `[USERNAME]<name>`, then sends a single
//! character to guess a letter or a longer line to guess the whole word.
//! After each letter that does not end the game the server replies with
//! `Remaining tries: <N>` and the updated obscured answer. The game ends with
//! `You won!` or `You lost!`, followed by `[EXITING NOW]`.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! Pure guess bookkeeping: hits, misses, remaining tries, win and loss.
//!
//! ### Session Module (`session`)
//! The per-connection protocol state machine.
//!
//! ### Leaderboard Module (`leaderboard`)
//! Ranked `<score> <name>` list persisted to a flat file.
//!
//! ### Network Module (`network`)
//! TCP accept loop, session spawning and shutdown supervision, backed by the
//! live-session registry in `session_manager`.
//!
//! ### Control Module (`control`)
//! Operator console accepting `!exit`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//! use server::words::WordSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let words = WordSource::load(&config.words_path).await?;
//!
//!     let server = Server::bind(config, words).await?;
//!     let shutdown = server.shutdown_handle();
//!
//!     tokio::spawn(async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         shutdown.shutdown();
//!     });
//!
//!     server.run().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod control;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod network;
pub mod session;
pub mod session_manager;
pub mod shutdown;
pub mod storage;
pub mod words;
