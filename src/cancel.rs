//! Cooperative cancellation for long embed/extract calls.
//!
//! A token is owned by the caller and cloned into the engine. The bit-plane
//! loops poll it at fixed intervals and bail out with
//! [`StegoError::Cancelled`]; the partially written buffer is simply dropped.

use crate::error::{Result, StegoError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Number of sample positions visited between two cancellation checks
pub const CANCEL_CHECK_INTERVAL: usize = 4096;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone of this token observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(StegoError::Cancelled)
        } else {
            Ok(())
        }
    }
}
