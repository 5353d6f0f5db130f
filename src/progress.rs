//! Progress-callback trait for per-item generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! events while the table builder walks the catalog.
//!
//! # Example
//!
//! ```rust
//! use catalog2pdf::{GenerationConfig, GenerationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct FallbackCounter {
//!     fallbacks: AtomicUsize,
//! }
//!
//! impl GenerationProgressCallback for FallbackCounter {
//!     fn on_image_fallback(&self, url: Option<&str>, reason: &str) {
//!         self.fallbacks.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("no image for {url:?}: {reason}");
//!     }
//! }
//!
//! let counter = Arc::new(FallbackCounter { fallbacks: AtomicUsize::new(0) });
//! let config = GenerationConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the generation pipeline as it processes groups and items.
///
/// Items are processed sequentially, but the trait is `Send + Sync` so one
/// callback can be shared by runs on different threads. All methods have
/// no-op defaults.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once, after grouping and before the first item.
    fn on_generation_start(&self, total_items: usize, total_groups: usize) {
        let _ = (total_items, total_groups);
    }

    /// Called before the rows of a group are built.
    ///
    /// `name` is `None` when grouping is disabled.
    fn on_group_start(&self, name: Option<&str>, item_count: usize) {
        let _ = (name, item_count);
    }

    /// Called after each row is complete.
    ///
    /// * `done`: rows finished so far across all groups (1-indexed)
    /// * `total`: total items in the catalog
    fn on_item_complete(&self, done: usize, total: usize) {
        let _ = (done, total);
    }

    /// Called when an image cell fell back to text.
    ///
    /// `url` is `None` when the item had no usable image URL at all.
    fn on_image_fallback(&self, url: Option<&str>, reason: &str) {
        let _ = (url, reason);
    }

    /// Called once after the document has been written.
    fn on_generation_complete(&self, total_items: usize, image_fallbacks: usize) {
        let _ = (total_items, image_fallbacks);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        groups: AtomicUsize,
        items: AtomicUsize,
        fallbacks: AtomicUsize,
        started_total: AtomicUsize,
    }

    impl GenerationProgressCallback for TrackingCallback {
        fn on_generation_start(&self, total_items: usize, _total_groups: usize) {
            self.started_total.store(total_items, Ordering::SeqCst);
        }

        fn on_group_start(&self, _name: Option<&str>, _item_count: usize) {
            self.groups.fetch_add(1, Ordering::SeqCst);
        }

        fn on_item_complete(&self, _done: usize, _total: usize) {
            self.items.fetch_add(1, Ordering::SeqCst);
        }

        fn on_image_fallback(&self, _url: Option<&str>, _reason: &str) {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_generation_start(5, 2);
        cb.on_group_start(Some("Surgical"), 3);
        cb.on_item_complete(1, 5);
        cb.on_image_fallback(None, "no url");
        cb.on_generation_complete(5, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_generation_start(3, 2);
        tracker.on_group_start(Some("A"), 2);
        tracker.on_item_complete(1, 3);
        tracker.on_image_fallback(Some("http://x/a.png"), "HTTP 404");
        tracker.on_item_complete(2, 3);
        tracker.on_group_start(Some("B"), 1);
        tracker.on_item_complete(3, 3);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.groups.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.items.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.fallbacks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_generation_start(10, 1);
        cb.on_group_start(None, 10);
    }
}
