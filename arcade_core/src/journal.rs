//! Append-only game-session journal.
//!
//! Finished games are appended to a JSONL (JSON Lines) file with file
//! locking to ensure safe concurrent access. The journal is independent of
//! the aggregate profile: history and personal-best queries read it back
//! even if the profile blob is reset.

use crate::{GameSession, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Session sink trait for persisting finished games
pub trait SessionSink {
    fn append(&mut self, session: &GameSession) -> Result<()>;
}

/// JSONL-based session sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionSink for JsonlSink {
    fn append(&mut self, session: &GameSession) -> Result<()> {
        self.ensure_parent_dir()?;

        // Open file for appending
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        // Write session as JSON line
        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(session)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended session {} to journal", session.id);
        Ok(())
    }
}

/// Read all sessions from a journal file
pub fn read_sessions(path: &Path) -> Result<Vec<GameSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut sessions = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<GameSession>(&line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sessions from journal", sessions.len());
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameId;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_session(game: GameId, score: u32) -> GameSession {
        GameSession {
            id: Uuid::new_v4(),
            game,
            score,
            coins_earned: score / 10,
            xp_earned: score / 5,
            played_at: Utc::now(),
        }
    }

    #[test]
    fn test_append_and_read_single_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("sessions.jsonl");

        let session = create_test_session(GameId::ObbyRush, 420);
        let session_id = session.id;

        // Append session
        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&session).unwrap();

        // Read back
        let sessions = read_sessions(&journal_path).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, session_id);
        assert_eq!(sessions[0].game, GameId::ObbyRush);
        assert_eq!(sessions[0].score, 420);
    }

    #[test]
    fn test_append_multiple_sessions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("sessions.jsonl");

        let mut sink = JsonlSink::new(&journal_path);

        // Append multiple sessions
        for i in 0..5 {
            let session = create_test_session(GameId::DodgeMaster, i * 10);
            sink.append(&session).unwrap();
        }

        // Read back
        let sessions = read_sessions(&journal_path).unwrap();
        assert_eq!(sessions.len(), 5);
    }

    #[test]
    fn test_read_empty_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("nonexistent.jsonl");

        let sessions = read_sessions(&journal_path).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("sessions.jsonl");

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&create_test_session(GameId::MemoryMatch, 100))
            .unwrap();

        // Inject a corrupt line between good ones
        {
            use std::io::Write;
            let mut file = OpenOptions::new().append(true).open(&journal_path).unwrap();
            writeln!(file, "{{ truncated garbage").unwrap();
        }
        sink.append(&create_test_session(GameId::MemoryMatch, 200))
            .unwrap();

        let sessions = read_sessions(&journal_path).unwrap();
        assert_eq!(sessions.len(), 2);
    }
}
