//! Token validation against the current key set.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. the token parses as a compact JWS
//! 2. `iss` equals the configured issuer
//! 3. `aud` contains the configured audience
//! 4. `infohash` equals the hex of the announced infohash
//! 5. the header carries a `kid`
//! 6. the `kid` is in the key set
//! 7. the RS256 signature verifies with that key
//!
//! The signing algorithm is fixed to RS256; the header's `alg` is ignored.

use tracing::debug;

use crate::algorithms::verify_rs256;
use crate::config::Config;
use crate::error::InvalidReason;
use crate::keystore::KeySet;
use crate::request::InfoHash;
use crate::token::Token;

/// Name of the claim binding a token to one swarm.
pub const INFOHASH_CLAIM: &str = "infohash";

/// Per-request validation input.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Swarm the request is for
    pub info_hash: &'a InfoHash,
    /// Raw token as received
    pub token: &'a [u8],
}

impl<'a> ValidationContext<'a> {
    /// Bundle a request's infohash and token.
    pub fn new(info_hash: &'a InfoHash, token: &'a [u8]) -> Self {
        Self { info_hash, token }
    }
}

/// Validate a token for the request in `ctx`.
///
/// # Errors
/// Returns the [`InvalidReason`] of the first failed check.
pub fn validate(
    ctx: &ValidationContext<'_>,
    keys: &KeySet,
    cfg: &Config,
) -> Result<(), InvalidReason> {
    let token = Token::parse(ctx.token).inspect_err(|_| {
        debug!("failed to parse JWT");
    })?;

    let iss = token.claims.issuer();
    if iss != Some(cfg.issuer.as_str()) {
        debug!(
            exists = iss.is_some(),
            claim = iss.unwrap_or_default(),
            config = %cfg.issuer,
            "unequal or missing issuer when validating JWT"
        );
        return Err(InvalidReason::IssuerMismatch);
    }

    let auds = token.claims.audience();
    if !auds
        .as_ref()
        .is_some_and(|auds| auds.contains(&cfg.audience.as_str()))
    {
        debug!(
            exists = auds.is_some(),
            claim = %auds.as_deref().unwrap_or_default().join(","),
            config = %cfg.audience,
            "unequal or missing audience when validating JWT"
        );
        return Err(InvalidReason::AudienceMismatch);
    }

    let ih_hex = ctx.info_hash.to_hex();
    let ih_claim = token.claims.string(INFOHASH_CLAIM);
    if ih_claim != Some(ih_hex.as_str()) {
        debug!(
            exists = ih_claim.is_some(),
            claim = ih_claim.unwrap_or_default(),
            request = %ih_hex,
            "unequal or missing infohash when validating JWT"
        );
        return Err(InvalidReason::ResourceMismatch);
    }

    let Some(kid) = token.header.kid() else {
        debug!(exists = false, "missing kid when validating JWT");
        return Err(InvalidReason::MissingKeyId);
    };

    let Some(public_key) = keys.get(kid) else {
        debug!(kid, "missing public key for kid when validating JWT");
        return Err(InvalidReason::UnknownKey);
    };

    if !verify_rs256(public_key, token.signing_input(), token.signature()) {
        debug!(kid, kty = public_key.kty(), "failed to verify signature of JWT");
        return Err(InvalidReason::SignatureInvalid);
    }

    Ok(())
}
