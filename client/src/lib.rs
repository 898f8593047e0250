//! # Hangman Client Library
//!
//! Terminal client for the hangman server. It connects over TCP, announces
//! the player's name with `[USERNAME]<name>`, forwards every line the player
//! types as a guess, and prints every line the server sends until the
//! server's closing `[EXITING NOW]` sentinel.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! Connection setup with a bounded connect timeout, and the relay loop
//! between the terminal and the server.
//!
//! Terminal input comes from `shared::input`, which reads lines on a
//! background thread so the client can exit as soon as the game ends.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//! use shared::input::spawn_stdin_reader;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect("alice", "127.0.0.1", 5050, Duration::from_secs(2)).await?;
//!     let mut stdout = tokio::io::stdout();
//!     let result = client.play(spawn_stdin_reader(), &mut stdout).await?;
//!     println!("{:?}", result);
//!     Ok(())
//! }
//! ```

pub mod network;
