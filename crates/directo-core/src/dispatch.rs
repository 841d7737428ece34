//! Batch dispatcher: split edit lists into bounded batches and submit in order

use crate::edit::EditOperation;
use crate::error::Result;
use crate::service::DocumentService;
use log::{debug, info};
use std::thread;
use std::time::Duration;

/// Largest batch the document service is assumed to accept
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Pause between consecutive batch calls
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(1);

/// Submits edit operations in consecutive chunks with a pause between calls
///
/// Later chunks may target offsets that only exist once earlier chunks have
/// been applied server-side, so chunks go out strictly in list order. A
/// failure stops the submission; chunks already sent stay applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchDispatcher {
    batch_size: usize,
    delay: Duration,
}

impl Default for BatchDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_BATCH_DELAY)
    }
}

impl BatchDispatcher {
    /// A zero `batch_size` is treated as one
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            delay,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Submit `operations` to `document_id` in order
    pub fn submit<S: DocumentService + ?Sized>(
        &self,
        service: &mut S,
        document_id: &str,
        operations: &[EditOperation],
    ) -> Result<()> {
        let chunks = operations.len().div_ceil(self.batch_size);
        for (i, chunk) in operations.chunks(self.batch_size).enumerate() {
            if i > 0 && !self.delay.is_zero() {
                debug!("waiting {:?} before next batch", self.delay);
                thread::sleep(self.delay);
            }
            info!(
                "submitting batch {}/{} ({} edits) to {}",
                i + 1,
                chunks,
                chunk.len(),
                document_id
            );
            service.batch_edit(document_id, chunk)?;
        }
        Ok(())
    }
}
