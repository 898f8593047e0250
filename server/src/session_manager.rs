//! Registry of live sessions
//!
//! The supervisor records every accepted connection here and removes it when
//! its session ends. The registry enforces the live-session limit and gives
//! shutdown a view of what is still running; it plays no part in routing.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// A connection that currently has a running session
#[derive(Debug)]
pub struct LiveSession {
    /// Unique session identifier assigned by the server
    pub id: u32,
    /// Peer address, for logging
    pub addr: SocketAddr,
    /// When the connection was accepted
    pub connected_at: Instant,
}

impl LiveSession {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Tracks live sessions up to a fixed capacity
///
/// Session IDs start from 1 and are never reused while the server runs.
pub struct SessionManager {
    sessions: HashMap<u32, LiveSession>,
    next_session_id: u32,
    max_sessions: usize,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            next_session_id: 1,
            max_sessions,
        }
    }

    /// Registers a new connection
    ///
    /// Returns None if the server is already running `max_sessions` sessions.
    pub fn add_session(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.sessions.len() >= self.max_sessions {
            return None;
        }

        let session_id = self.next_session_id;
        self.next_session_id += 1;

        info!("Session {} accepted from {}", session_id, addr);
        self.sessions
            .insert(session_id, LiveSession::new(session_id, addr));

        Some(session_id)
    }

    /// Removes a finished session. Returns false if it was already gone.
    pub fn remove_session(&mut self, session_id: &u32) -> bool {
        if let Some(session) = self.sessions.remove(session_id) {
            info!(
                "Session {} from {} closed after {:.1}s",
                session.id,
                session.addr,
                session.age().as_secs_f32()
            );
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
