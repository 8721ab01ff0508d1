//! Middleware seam.

use crate::error::HookResult;
use crate::futures::StopFuture;
use crate::request::{AnnounceRequest, ScrapeRequest};

/// A step in the tracker's request pipeline.
///
/// Handlers run inline on the request path and may be called concurrently.
/// `Ok(())` lets the request continue unchanged; an error ends it.
/// Implementations must be thread-safe (Send + Sync).
pub trait Hook: Send + Sync {
    /// Inspect an announce.
    fn handle_announce(&self, req: &AnnounceRequest) -> HookResult<()>;

    /// Inspect a scrape.
    fn handle_scrape(&self, req: &ScrapeRequest) -> HookResult<()>;

    /// Release background resources.
    fn stop(&self) -> StopFuture;
}

impl<T: Hook> Hook for std::sync::Arc<T> {
    fn handle_announce(&self, req: &AnnounceRequest) -> HookResult<()> {
        (**self).handle_announce(req)
    }

    fn handle_scrape(&self, req: &ScrapeRequest) -> HookResult<()> {
        (**self).handle_scrape(req)
    }

    fn stop(&self) -> StopFuture {
        (**self).stop()
    }
}
