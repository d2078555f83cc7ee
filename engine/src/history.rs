use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Bounded, rewindable record of per-frame states.
///
/// Recording while rewound discards the abandoned future before appending.
/// Once `capacity` entries are held the oldest entry is evicted; `first_frame`
/// keeps frame numbers stable across evictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
    first_frame: u64,
    cursor: usize,
}

impl<T> History<T> {
    pub fn new(initial: T, capacity: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        Self {
            entries,
            capacity: capacity.max(1),
            first_frame: 0,
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute frame number of the entry under the cursor.
    pub fn frame(&self) -> u64 {
        self.first_frame + self.cursor as u64
    }

    pub fn first_frame(&self) -> u64 {
        self.first_frame
    }

    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    pub fn at_frame(&self, frame: u64) -> Option<&T> {
        let idx = frame.checked_sub(self.first_frame)?;
        self.entries.get(usize::try_from(idx).ok()?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn rewind(&mut self, frames: usize) -> u64 {
        self.cursor = self.cursor.saturating_sub(frames);
        self.frame()
    }

    pub fn forward(&mut self, frames: usize) -> u64 {
        let last = self.entries.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add(frames).min(last);
        self.frame()
    }

    pub fn record(&mut self, entry: T) -> u64 {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.first_frame += 1;
        }
        self.cursor = self.entries.len() - 1;
        self.frame()
    }
}

impl<T: Serialize> History<T> {
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}

impl<T: DeserializeOwned> History<T> {
    pub fn load_json_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let mut history: Self = serde_json::from_slice(&bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if history.entries.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "history file has no entries",
            ));
        }
        history.capacity = history.capacity.max(1);
        history.cursor = history.cursor.min(history.entries.len() - 1);
        Ok(history)
    }
}
