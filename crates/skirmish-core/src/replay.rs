//! Match recordings.
//!
//! A [`Recording`] stores the snapshots a match emitted, together with the
//! seed and configuration that produced them. Frames are the snapshots
//! themselves, so replaying is reading frames back; nothing is re-simulated.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::SimConfig;
//! use skirmish_core::replay::Recording;
//! use skirmish_core::snapshot::TickSnapshot;
//! use skirmish_core::world::WorldState;
//!
//! let mut world = WorldState::new(100.0, 100.0);
//! world.spawn_agent("a", None, 100);
//!
//! let mut rec = Recording::new(Some(7), SimConfig::default());
//! rec.push(TickSnapshot::capture(&world));
//!
//! let json = rec.to_json().unwrap();
//! let back = Recording::from_json(&json).unwrap();
//! assert_eq!(back, rec);
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::ReplayError;
use crate::snapshot::TickSnapshot;

/// Snapshots of one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Seed of the match, if it was seeded.
    pub seed: Option<u64>,
    /// Configuration the match ran with.
    pub config: SimConfig,
    /// Recorded snapshots, oldest first.
    pub frames: Vec<TickSnapshot>,
}

impl Recording {
    /// Creates an empty recording.
    #[must_use]
    pub fn new(seed: Option<u64>, config: SimConfig) -> Self {
        Self {
            seed,
            config,
            frames: Vec::new(),
        }
    }

    /// Appends a frame.
    pub fn push(&mut self, frame: TickSnapshot) {
        self.frames.push(frame);
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The frame recorded for `turn`, if any.
    #[must_use]
    pub fn frame_at(&self, turn: u64) -> Option<&TickSnapshot> {
        self.frames.iter().find(|f| f.turn == turn)
    }

    /// The most recent frame.
    #[must_use]
    pub fn last(&self) -> Option<&TickSnapshot> {
        self.frames.last()
    }

    /// Encodes the recording as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Json`] if encoding fails.
    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a recording from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Json`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the recording to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a recording from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldState;

    fn recording() -> Recording {
        let mut world = WorldState::new(100.0, 100.0);
        world.spawn_agent("a", None, 100);
        world.spawn_agent("b", None, 100);
        let mut rec = Recording::new(Some(1), SimConfig::default());
        for _ in 0..3 {
            world.advance_turn();
            rec.push(TickSnapshot::capture(&world));
        }
        rec
    }

    #[test]
    fn frames_are_found_by_turn() {
        let rec = recording();
        assert_eq!(rec.len(), 3);
        assert_eq!(rec.frame_at(2).unwrap().turn, 2);
        assert!(rec.frame_at(9).is_none());
        assert_eq!(rec.last().unwrap().turn, 3);
    }

    #[test]
    fn file_round_trip() {
        let rec = recording();
        let path = std::env::temp_dir().join(format!("skirmish-replay-{}.json", std::process::id()));

        rec.save(&path).unwrap();
        let back = Recording::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back, rec);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = Recording::from_json("{ \"frames\": 3 }").unwrap_err();
        assert!(matches!(err, ReplayError::Json(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Recording::load("/nonexistent/skirmish/replay.json").unwrap_err();
        assert!(matches!(err, ReplayError::Io(_)));
    }
}
