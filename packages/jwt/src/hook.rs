//! The JWT announce gate.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{HookError, HookResult};
use crate::futures::StopFuture;
use crate::jwks::KeyFetcher;
use crate::keystore::{KeySet, KeyStore};
use crate::request::{AnnounceRequest, ScrapeRequest};
use crate::rotation::{RotationScheduler, RotationState};
use crate::traits::Hook;
use crate::validator::{validate, ValidationContext};

/// Announce parameter carrying the token.
pub const JWT_PARAM: &str = "jwt";

/// Fails announces that lack a valid JWT for their swarm.
///
/// Scrapes pass through untouched.
#[derive(Debug)]
pub struct JwtHook {
    cfg: Config,
    keys: Arc<KeyStore>,
    rotation: RotationScheduler,
}

impl JwtHook {
    /// Validate `cfg`, fetch the JWK Set once, and start background
    /// rotation.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns [`HookError::Config`] for a bad config and
    /// [`HookError::InitialFetch`] if the first fetch fails. No hook is
    /// created in either case.
    pub async fn start(cfg: Config) -> HookResult<Self> {
        debug!(config = ?cfg, "creating new JWT middleware");
        let url = cfg.validate()?;
        let fetcher =
            KeyFetcher::new(url, cfg.jwk_set_fetch_timeout).map_err(HookError::InitialFetch)?;

        debug!("performing initial fetch of JWKs");
        let initial = fetcher.fetch().await.map_err(|e| {
            error!(jwk_set_url = %cfg.jwk_set_url, error = %e, "failed to fetch initial JWK Set");
            HookError::InitialFetch(e)
        })?;

        let keys = Arc::new(KeyStore::new(initial));
        let rotation =
            RotationScheduler::spawn(fetcher, Arc::clone(&keys), cfg.jwk_set_update_interval);

        info!(
            issuer = %cfg.issuer,
            audience = %cfg.audience,
            interval_secs = cfg.jwk_set_update_interval.as_secs(),
            "JWT middleware ready"
        );

        Ok(Self {
            cfg,
            keys,
            rotation,
        })
    }

    /// Configuration the hook was started with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Snapshot of the keys currently used for validation.
    pub fn key_set(&self) -> Arc<KeySet> {
        self.keys.read()
    }

    /// State of the background rotation.
    pub fn rotation_state(&self) -> RotationState {
        self.rotation.state()
    }
}

impl Hook for JwtHook {
    fn handle_announce(&self, req: &AnnounceRequest) -> HookResult<()> {
        let Some(token) = req.params.as_ref().and_then(|p| p.string(JWT_PARAM)) else {
            return Err(HookError::MissingCredential);
        };

        let keys = self.keys.read();
        let ctx = ValidationContext::new(&req.info_hash, token.as_bytes());
        validate(&ctx, &keys, &self.cfg).map_err(|reason| {
            debug!(info_hash = %req.info_hash, %reason, "rejecting announce");
            HookError::from(reason)
        })
    }

    fn handle_scrape(&self, _req: &ScrapeRequest) -> HookResult<()> {
        // Scrapes don't require any protection.
        Ok(())
    }

    fn stop(&self) -> StopFuture {
        debug!("attempting to shutdown JWT middleware");
        self.rotation.cancel()
    }
}
