use std::collections::VecDeque;

use super::DataSource;
use crate::error::SourceError;

/// Replays a fixed sequence of read results, then reports empty reads.
/// Useful for tests and deterministic playback.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    queue: VecDeque<Result<Vec<f64>, SourceError>>,
    reads: usize,
}

impl ScriptedSource {
    pub fn new(reads: impl IntoIterator<Item = Result<Vec<f64>, SourceError>>) -> Self {
        Self {
            queue: reads.into_iter().collect(),
            reads: 0,
        }
    }

    pub fn push(&mut self, read: Result<Vec<f64>, SourceError>) {
        self.queue.push_back(read);
    }

    /// Number of `read` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DataSource for ScriptedSource {
    fn read(&mut self, _max_samples: usize) -> Result<Vec<f64>, SourceError> {
        self.reads += 1;
        self.queue.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}
