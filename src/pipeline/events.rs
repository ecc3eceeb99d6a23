//! Filtering lifecycle events reported to the host.

use crate::shape::CacheKey;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Progress notifications for one generation request.
///
/// Every request emits `FilteringStart` followed by exactly one of
/// `FilteringFinish` or `FilteringError`. `ExtractImage` follows a finish when
/// image extraction is enabled and succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    FilteringStart { key: CacheKey },
    FilteringFinish { key: CacheKey, cache_hit: bool },
    FilteringError { message: String },
    ExtractImage { path: PathBuf },
}

/// Receiver of filtering events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: FilterEvent);
}

impl EventSink for mpsc::UnboundedSender<FilterEvent> {
    fn emit(&self, event: FilterEvent) {
        if let Err(err) = self.send(event) {
            log::debug!("Dropping filter event, receiver closed: {:?}", err.0);
        }
    }
}

/// Writes events to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEvents;

impl EventSink for LogEvents {
    fn emit(&self, event: FilterEvent) {
        match event {
            FilterEvent::FilteringStart { key } => log::debug!("Filtering started: {}", key),
            FilterEvent::FilteringFinish { key, cache_hit } => {
                log::info!("Filtering finished: {} (cache hit: {})", key, cache_hit)
            }
            FilterEvent::FilteringError { message } => log::error!("Filtering failed: {}", message),
            FilterEvent::ExtractImage { path } => {
                log::info!("Extracted image to {}", path.display())
            }
        }
    }
}
