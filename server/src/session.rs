//! Per-connection game protocol.
//!
//! A session sends the obscured answer, takes the first inbound line as the
//! `[USERNAME]` announcement, then interprets each following line as a guess
//! until the game is won or lost. The stream closing or a shutdown request
//! ends it early. Only wins touch the leaderboard.

use crate::error::SessionError;
use crate::game::GuessState;
use crate::leaderboard::Leaderboard;
use crate::shutdown::wait_for_shutdown;
use log::{debug, info, warn};
use shared::{parse_username, ClientLine, ServerLine, DEFAULT_MAX_LINE_LEN, DEFAULT_PLAYER_NAME};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitUsername,
    Playing,
    Won,
    Lost,
    Closed,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Won {
        player: String,
        score: i32,
        /// Whether the leaderboard was rewritten with this win.
        recorded: bool,
    },
    Lost {
        player: String,
    },
    /// Stream end, idle timeout or transport failure before a result.
    Disconnected,
    /// Closed by a server shutdown.
    ShutDown,
}

/// Result of applying one guess line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    Ignored,
    Continue { remaining_tries: i32, obscured: String },
    Won,
    Lost,
}

/// Applies one guess line to `game`.
///
/// A single character is a letter guess. Anything longer is a whole-word
/// guess, which always ends the game.
pub fn play_turn(game: &mut GuessState, line: &str) -> Turn {
    match ClientLine::parse(line) {
        ClientLine::Empty => Turn::Ignored,
        ClientLine::Letter(c) => {
            game.guess_char(c);
            if game.is_won() {
                Turn::Won
            } else if game.is_lost() {
                Turn::Lost
            } else {
                Turn::Continue {
                    remaining_tries: game.remaining_tries(),
                    obscured: game.obscured_answer(),
                }
            }
        }
        ClientLine::Word(word) => {
            game.reveal_word(&word);
            if game.is_won() {
                Turn::Won
            } else {
                Turn::Lost
            }
        }
    }
}

/// Longest a closing line may take to reach a client that stopped reading.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Per-connection read limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Ends the session when the client sends nothing for this long.
    pub idle_timeout: Option<Duration>,
    /// Longest inbound line accepted, in bytes, excluding the terminator.
    pub max_line_len: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout: None,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// Reads one line of at most `max_len` bytes, without its `\n` or `\r\n`
/// terminator. `Ok(None)` means the stream ended.
///
/// Never buffers more than `max_len + 2` bytes of a line; anything longer
/// fails with [`SessionError::LineTooLong`].
pub async fn read_bounded_line<R>(
    reader: &mut R,
    max_len: usize,
) -> Result<Option<String>, SessionError>
where
    R: AsyncBufRead + Unpin,
{
    let limit = u64::try_from(max_len)
        .unwrap_or(u64::MAX)
        .saturating_add(2);
    let mut buf = Vec::new();
    let read = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    if buf.len() > max_len {
        return Err(SessionError::LineTooLong(max_len));
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| SessionError::Transport(io::Error::new(io::ErrorKind::InvalidData, e)))
}

enum Inbound {
    Line(String),
    EndOfStream,
    Shutdown,
}

pub struct Session<R, W> {
    id: u32,
    reader: R,
    writer: W,
    game: GuessState,
    player: String,
    state: SessionState,
    leaderboard: Arc<Leaderboard>,
    limits: SessionLimits,
    shutdown: watch::Receiver<bool>,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        id: u32,
        reader: R,
        writer: W,
        game: GuessState,
        leaderboard: Arc<Leaderboard>,
        shutdown: watch::Receiver<bool>,
        limits: SessionLimits,
    ) -> Self {
        Self {
            id,
            reader,
            writer,
            game,
            player: DEFAULT_PLAYER_NAME.to_string(),
            state: SessionState::AwaitUsername,
            leaderboard,
            limits,
            shutdown,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Plays the session to completion. Errors never escape; a failing
    /// connection simply ends as `Disconnected`.
    pub async fn run(mut self) -> SessionOutcome {
        let outcome = match self.drive().await {
            Ok(outcome) => outcome,
            Err(SessionError::Interrupted) => {
                info!("Session {} interrupted by shutdown while writing", self.id);
                SessionOutcome::ShutDown
            }
            Err(e) => {
                warn!("Session {} dropped: {}", self.id, e);
                SessionOutcome::Disconnected
            }
        };

        self.state = SessionState::Closed;
        let _ = tokio::time::timeout(CLOSE_GRACE, self.writer.shutdown()).await;
        outcome
    }

    async fn drive(&mut self) -> Result<SessionOutcome, SessionError> {
        self.send(ServerLine::Obscured(self.game.obscured_answer()))
            .await?;

        loop {
            let line = match self.next_inbound().await? {
                Inbound::Line(line) => line,
                Inbound::EndOfStream => {
                    debug!("Session {} reached end of stream", self.id);
                    return Ok(SessionOutcome::Disconnected);
                }
                Inbound::Shutdown => {
                    self.send_closing(ServerLine::Exiting).await?;
                    return Ok(SessionOutcome::ShutDown);
                }
            };

            if self.state == SessionState::AwaitUsername {
                self.announce(&line);
                continue;
            }

            match play_turn(&mut self.game, &line) {
                Turn::Ignored => {}
                Turn::Continue {
                    remaining_tries,
                    obscured,
                } => {
                    self.send(ServerLine::RemainingTries(remaining_tries)).await?;
                    self.send(ServerLine::Obscured(obscured)).await?;
                }
                Turn::Won => {
                    self.state = SessionState::Won;
                    self.send(ServerLine::Won).await?;
                    return self.finish().await;
                }
                Turn::Lost => {
                    self.state = SessionState::Lost;
                    self.send(ServerLine::Lost).await?;
                    return self.finish().await;
                }
            }
        }
    }

    fn announce(&mut self, line: &str) {
        match parse_username(line) {
            Some(name) => self.player = name.to_string(),
            None => warn!(
                "Session {} sent no usable username ({:?}), playing as {}",
                self.id, line, DEFAULT_PLAYER_NAME
            ),
        }
        info!("Session {} is playing as {}", self.id, self.player);
        self.state = SessionState::Playing;
    }

    /// Records a win, then sends the closing sentinel.
    async fn finish(&mut self) -> Result<SessionOutcome, SessionError> {
        let outcome = if self.state == SessionState::Won {
            let score = self.game.remaining_tries();
            let recorded = match self.leaderboard.try_record_win(&self.player, score).await {
                Ok(changed) => changed,
                Err(e) => {
                    warn!("Session {} skipped leaderboard update: {}", self.id, e);
                    false
                }
            };
            SessionOutcome::Won {
                player: self.player.clone(),
                score,
                recorded,
            }
        } else {
            SessionOutcome::Lost {
                player: self.player.clone(),
            }
        };

        if let Err(e) = self.send_closing(ServerLine::Exiting).await {
            debug!("Session {} could not send the closing line: {}", self.id, e);
        }
        Ok(outcome)
    }

    async fn next_inbound(&mut self) -> Result<Inbound, SessionError> {
        let reader = &mut self.reader;
        let limits = self.limits;
        let read = async move {
            let line = read_bounded_line(reader, limits.max_line_len);
            match limits.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, line).await {
                    Ok(result) => result,
                    Err(_) => Ok(None),
                },
                None => line.await,
            }
        };

        tokio::select! {
            _ = wait_for_shutdown(&mut self.shutdown) => Ok(Inbound::Shutdown),
            line = read => Ok(match line? {
                Some(line) => Inbound::Line(line),
                None => Inbound::EndOfStream,
            }),
        }
    }

    /// Writes one line, giving up as soon as shutdown is requested so a
    /// client that stopped reading cannot hold the session open.
    async fn send(&mut self, line: ServerLine) -> Result<(), SessionError> {
        let data = format!("{}\n", line);
        let writer = &mut self.writer;

        tokio::select! {
            _ = wait_for_shutdown(&mut self.shutdown) => Err(SessionError::Interrupted),
            written = write_line(writer, &data) => written,
        }
    }

    /// Writes a final line within [`CLOSE_GRACE`], even during shutdown.
    async fn send_closing(&mut self, line: ServerLine) -> Result<(), SessionError> {
        let data = format!("{}\n", line);
        tokio::time::timeout(CLOSE_GRACE, write_line(&mut self.writer, &data))
            .await
            .map_err(|_| SessionError::Interrupted)?
    }
}

async fn write_line<W>(writer: &mut W, data: &str) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(data.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shutdown::ShutdownHandle;
    use crate::storage::{load_lines, temp_path};
    use std::path::Path;
    use tokio::io::{split, AsyncReadExt, BufReader};
    use tokio_test::io::{Builder, Mock};

    fn board(path: &Path) -> Arc<Leaderboard> {
        Arc::new(Leaderboard::new(path, 10, Duration::from_millis(2000)))
    }

    async fn run_scripted(
        mock: Mock,
        answer: &str,
        max_guesses: u32,
        leaderboard: Arc<Leaderboard>,
    ) -> SessionOutcome {
        let (_handle, shutdown) = ShutdownHandle::new();
        let (reader, writer) = split(mock);
        let session = Session::new(
            1,
            BufReader::new(reader),
            writer,
            GuessState::new(answer, max_guesses),
            leaderboard,
            shutdown,
            SessionLimits::default(),
        );
        session.run().await
    }

    #[test]
    fn test_play_turn_letters() {
        let mut game = GuessState::new("cat", 10);

        assert_eq!(
            play_turn(&mut game, "c"),
            Turn::Continue {
                remaining_tries: 10,
                obscured: "c__".to_string()
            }
        );
        assert_eq!(
            play_turn(&mut game, "z"),
            Turn::Continue {
                remaining_tries: 9,
                obscured: "c__".to_string()
            }
        );
        assert_eq!(play_turn(&mut game, ""), Turn::Ignored);
        assert_eq!(
            play_turn(&mut game, "a"),
            Turn::Continue {
                remaining_tries: 9,
                obscured: "ca_".to_string()
            }
        );
        assert_eq!(play_turn(&mut game, "t"), Turn::Won);
    }

    #[test]
    fn test_play_turn_loss_on_budget() {
        let mut game = GuessState::new("dog", 1);
        assert_eq!(play_turn(&mut game, "x"), Turn::Lost);
    }

    #[test]
    fn test_play_turn_word_always_ends() {
        let mut game = GuessState::new("cat", 10);
        assert_eq!(play_turn(&mut game, "cow"), Turn::Lost);

        let mut game = GuessState::new("cat", 10);
        assert_eq!(play_turn(&mut game, "tac"), Turn::Won);
    }

    #[tokio::test]
    async fn test_winning_session_records_score() {
        let path = temp_path("session");
        let mock = Builder::new()
            .write(b"___\n")
            .read(b"[USERNAME]alice\n")
            .read(b"c\n")
            .write(b"Remaining tries: 10\n")
            .write(b"c__\n")
            .read(b"z\n")
            .write(b"Remaining tries: 9\n")
            .write(b"c__\n")
            .read(b"cat\n")
            .write(b"You won!\n")
            .write(b"[EXITING NOW]\n")
            .build();

        let outcome = run_scripted(mock, "cat", 10, board(&path)).await;

        assert_eq!(
            outcome,
            SessionOutcome::Won {
                player: "alice".to_string(),
                score: 9,
                recorded: true
            }
        );
        assert_eq!(load_lines(&path).await.unwrap(), vec!["9 alice".to_string()]);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_letter_win_ends_without_status_lines() {
        let path = temp_path("session");
        let mock = Builder::new()
            .write(b"__\n")
            .read(b"[USERNAME]bo\n")
            .read(b"h\n")
            .write(b"Remaining tries: 3\n")
            .write(b"h_\n")
            .read(b"i\n")
            .write(b"You won!\n")
            .write(b"[EXITING NOW]\n")
            .build();

        let outcome = run_scripted(mock, "hi", 3, board(&path)).await;

        assert!(matches!(outcome, SessionOutcome::Won { score: 3, .. }));
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_losing_session_leaves_leaderboard_alone() {
        let path = temp_path("session");
        let mock = Builder::new()
            .write(b"___\n")
            .read(b"[USERNAME]bob\n")
            .read(b"x\n")
            .write(b"Remaining tries: 1\n")
            .write(b"___\n")
            .read(b"y\n")
            .write(b"You lost!\n")
            .write(b"[EXITING NOW]\n")
            .build();

        let outcome = run_scripted(mock, "dog", 2, board(&path)).await;

        assert_eq!(
            outcome,
            SessionOutcome::Lost {
                player: "bob".to_string()
            }
        );
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_wrong_word_loses_immediately() {
        let path = temp_path("session");
        let mock = Builder::new()
            .write(b"___\n")
            .read(b"[USERNAME]bob\n")
            .read(b"cow\n")
            .write(b"You lost!\n")
            .write(b"[EXITING NOW]\n")
            .build();

        let outcome = run_scripted(mock, "cat", 10, board(&path)).await;
        assert!(matches!(outcome, SessionOutcome::Lost { .. }));
    }

    #[tokio::test]
    async fn test_empty_lines_are_ignored() {
        let path = temp_path("session");
        let mock = Builder::new()
            .write(b"_\n")
            .read(b"[USERNAME]eve\n")
            .read(b"\n")
            .read(b"\n")
            .read(b"a\n")
            .write(b"You won!\n")
            .write(b"[EXITING NOW]\n")
            .build();

        let outcome = run_scripted(mock, "a", 10, board(&path)).await;
        assert!(matches!(outcome, SessionOutcome::Won { .. }));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_missing_prefix_uses_default_name() {
        let path = temp_path("session");
        let mock = Builder::new()
            .write(b"_\n")
            .read(b"mallory\n")
            .read(b"q\n")
            .write(b"You won!\n")
            .write(b"[EXITING NOW]\n")
            .build();

        let outcome = run_scripted(mock, "q", 10, board(&path)).await;

        assert_eq!(
            outcome,
            SessionOutcome::Won {
                player: DEFAULT_PLAYER_NAME.to_string(),
                score: 10,
                recorded: true
            }
        );
        assert_eq!(
            load_lines(&path).await.unwrap(),
            vec![format!("10 {}", DEFAULT_PLAYER_NAME)]
        );

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_disconnect_before_username() {
        let path = temp_path("session");
        let mock = Builder::new().write(b"___\n").build();

        let outcome = run_scripted(mock, "cat", 10, board(&path)).await;
        assert_eq!(outcome, SessionOutcome::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_mid_game_skips_leaderboard() {
        let path = temp_path("session");
        let mock = Builder::new()
            .write(b"___\n")
            .read(b"[USERNAME]carol\n")
            .read(b"c\n")
            .write(b"Remaining tries: 10\n")
            .write(b"c__\n")
            .build();

        let outcome = run_scripted(mock, "cat", 10, board(&path)).await;

        assert_eq!(outcome, SessionOutcome::Disconnected);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_shutdown_sends_sentinel() {
        let path = temp_path("session");
        let (handle, shutdown) = ShutdownHandle::new();
        let (server_side, mut client_side) = tokio::io::duplex(1024);
        let (reader, writer) = split(server_side);

        let session = Session::new(
            7,
            BufReader::new(reader),
            writer,
            GuessState::new("cat", 10),
            board(&path),
            shutdown,
            SessionLimits::default(),
        );
        let task = tokio::spawn(session.run());

        let mut first = [0u8; 4];
        client_side.read_exact(&mut first).await.unwrap();
        assert_eq!(&first, b"___\n");

        handle.shutdown();
        let outcome = task.await.unwrap();
        assert_eq!(outcome, SessionOutcome::ShutDown);

        let mut rest = String::new();
        client_side.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "[EXITING NOW]\n");
    }

    #[tokio::test]
    async fn test_idle_timeout_counts_as_disconnect() {
        let path = temp_path("session");
        let (_handle, shutdown) = ShutdownHandle::new();
        let (server_side, _client_side) = tokio::io::duplex(1024);
        let (reader, writer) = split(server_side);

        let session = Session::new(
            8,
            BufReader::new(reader),
            writer,
            GuessState::new("cat", 10),
            board(&path),
            shutdown,
            SessionLimits {
                idle_timeout: Some(Duration::from_millis(50)),
                ..SessionLimits::default()
            },
        );
        assert_eq!(session.state(), SessionState::AwaitUsername);

        let outcome = tokio::time::timeout(Duration::from_secs(2), session.run())
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Disconnected);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_blocked_write() {
        let path = temp_path("session");
        let (handle, shutdown) = ShutdownHandle::new();
        let (server_side, mut client_side) = tokio::io::duplex(64);
        let (reader, writer) = split(server_side);

        let session = Session::new(
            9,
            BufReader::new(reader),
            writer,
            GuessState::new("cat", 10),
            board(&path),
            shutdown,
            SessionLimits::default(),
        );
        let task = tokio::spawn(session.run());

        // Every "c" is answered with 24 bytes that are never read.
        client_side.write_all(b"[USERNAME]x\n").await.unwrap();
        for _ in 0..10 {
            client_side.write_all(b"c\n").await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());

        handle.shutdown();
        let outcome = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, SessionOutcome::ShutDown);
        drop(client_side);
    }

    #[tokio::test]
    async fn test_oversized_line_disconnects() {
        let path = temp_path("session");
        let long = format!("{}\n", "c".repeat(DEFAULT_MAX_LINE_LEN + 1));
        let mock = Builder::new()
            .write(b"___\n")
            .read(b"[USERNAME]mal\n")
            .read(long.as_bytes())
            .build();

        let outcome = run_scripted(mock, "cat", 10, board(&path)).await;

        assert_eq!(outcome, SessionOutcome::Disconnected);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_read_bounded_line() {
        let mut input = &b"abc\r\nxyz\n\ntail"[..];
        assert_eq!(
            read_bounded_line(&mut input, 3).await.unwrap(),
            Some("abc".to_string())
        );
        assert_eq!(
            read_bounded_line(&mut input, 3).await.unwrap(),
            Some("xyz".to_string())
        );
        assert_eq!(
            read_bounded_line(&mut input, 3).await.unwrap(),
            Some(String::new())
        );
        assert!(matches!(
            read_bounded_line(&mut input, 3).await,
            Err(SessionError::LineTooLong(3))
        ));

        let mut input = &b"tail"[..];
        assert_eq!(
            read_bounded_line(&mut input, 4).await.unwrap(),
            Some("tail".to_string())
        );
        assert_eq!(read_bounded_line(&mut input, 4).await.unwrap(), None);

        let mut input = &b"\xff\n"[..];
        assert!(matches!(
            read_bounded_line(&mut input, 4).await,
            Err(SessionError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_win_is_reported_when_leaderboard_is_unwritable() {
        let path = temp_path("no-such-dir").join("toplist.txt");
        let mock = Builder::new()
            .write(b"__\n")
            .read(b"[USERNAME]zoe\n")
            .read(b"ok\n")
            .write(b"You won!\n")
            .write(b"[EXITING NOW]\n")
            .build();

        let outcome = run_scripted(mock, "ok", 10, board(&path)).await;

        assert_eq!(
            outcome,
            SessionOutcome::Won {
                player: "zoe".to_string(),
                score: 10,
                recorded: false
            }
        );
        assert!(!path.exists());
    }
}
