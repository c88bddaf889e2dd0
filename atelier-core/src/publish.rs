//! Publisher contract
//!
//! Publishing is an external collaborator with a narrow interface: take the
//! approved artifact, persist it, and distribute it. The approval gate only
//! needs the success/failure result back: a failed publish leaves the
//! session pending so the publish step can be retried on its own.

use async_trait::async_trait;

use crate::Result;

/// Trait for artifact publishers
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Get the name of this publisher
    fn name(&self) -> &'static str;

    /// Persist and distribute the approved artifact
    async fn publish(&self, artifact: &str) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Publisher double that records what it was asked to publish
    #[derive(Default)]
    pub(crate) struct RecordingPublisher {
        pub(crate) published: Mutex<Vec<String>>,
        pub(crate) fail_next: AtomicU32,
    }

    impl RecordingPublisher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Make the next `count` publish calls fail
        pub(crate) fn fail_next(&self, count: u32) {
            self.fail_next.store(count, Ordering::SeqCst);
        }

        pub(crate) fn publish_count(&self) -> usize {
            self.published.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn publish(&self, artifact: &str) -> Result<()> {
            if self.fail_next.load(Ordering::SeqCst) > 0 {
                self.fail_next.fetch_sub(1, Ordering::SeqCst);
                return Err(Error::Publish("Simulated publish failure".to_string()));
            }

            self.published.lock().unwrap().push(artifact.to_string());
            Ok(())
        }
    }
}
