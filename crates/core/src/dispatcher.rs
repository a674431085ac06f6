//! Sample dispatch from read plugins to the host

use anyhow::Result;
use nvsmi_types::Sample;
use std::sync::Mutex;

/// Receiver of samples produced during a read cycle
pub trait Dispatcher: Send + Sync {
    /// Publish one sample
    fn dispatch(&self, sample: Sample) -> Result<()>;
}

/// Dispatcher that keeps every sample in memory
///
/// Used by the `query` command and by tests that need to look at what a
/// plugin published.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    samples: Mutex<Vec<Sample>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every recorded sample, leaving the recorder empty
    pub fn take(&self) -> Vec<Sample> {
        match self.samples.lock() {
            Ok(mut samples) => std::mem::take(&mut *samples),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&self, sample: Sample) -> Result<()> {
        self.samples
            .lock()
            .map_err(|_| anyhow::anyhow!("sample recorder lock poisoned"))?
            .push(sample);
        Ok(())
    }
}
