//! Progress-callback trait for per-item conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! structured events as each video is converted. The library itself never
//! prints; presentation (log lines, a progress bar, a JSON feed) belongs to
//! whoever implements this trait.
//!
//! # Example
//!
//! ```rust
//! use video2audio::{ConversionConfig, ConversionProgressCallback, FailureReason};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct FailureCounter {
//!     failed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for FailureCounter {
//!     fn on_item_error(&self, _index: usize, _total: usize, input: &Path, reason: &FailureReason) {
//!         self.failed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}: {}", input.display(), reason);
//!     }
//! }
//!
//! let counter = Arc::new(FailureCounter { failed: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::FailureReason;
use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator as it processes each work item.
///
/// Implementations must be `Send + Sync`: with `concurrency > 1` the item
/// events arrive from several workers at once and possibly out of order.
/// `index` is the 1-based position in enumeration order, so it stays
/// stable regardless of completion order.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after enumeration, before the first conversion.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before ffmpeg is started for an item.
    fn on_item_start(&self, index: usize, total: usize, input: &Path) {
        let _ = (index, total, input);
    }

    /// Called when an item's audio file has been written.
    fn on_item_complete(&self, index: usize, total: usize, input: &Path, output: &Path) {
        let _ = (index, total, input, output);
    }

    /// Called when an item failed.
    fn on_item_error(&self, index: usize, total: usize, input: &Path, reason: &FailureReason) {
        let _ = (index, total, input, reason);
    }

    /// Called once after every item has been attempted.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
