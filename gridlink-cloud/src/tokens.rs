//! Issuance and single-use redemption of enrollment tokens.

use std::fmt::Write as _;

use gridlink_types::{EnrollmentToken, SiteId};

use crate::error::CloudError;
use crate::store::KvStore;

/// Exclusive owner of the active-token set.
///
/// A token present in the map has never been redeemed. Redemption removes
/// it within a single critical section, so a token is redeemable at most
/// once no matter how many callers race for it.
#[derive(Clone, Debug, Default)]
pub struct TokenAuthority {
    active: KvStore<EnrollmentToken, SiteId>,
}

impl TokenAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh token bound to `site_id` and add it to the active
    /// set. Multiple tokens may be outstanding for the same site; each
    /// stays valid until individually redeemed.
    ///
    /// The caller is expected to have verified that the site exists.
    pub async fn issue(&self, site_id: SiteId) -> Result<EnrollmentToken, CloudError> {
        let token = generate_token()?;
        self.active.put(token.clone(), site_id).await;
        Ok(token)
    }

    /// Atomically consume `token`, returning the site it was bound to.
    ///
    /// Fails with `InvalidToken` if the token is unknown or was already
    /// redeemed, including by a concurrent caller that won the race.
    pub async fn redeem(&self, token: &EnrollmentToken) -> Result<SiteId, CloudError> {
        self.active
            .take(token)
            .await
            .ok_or(CloudError::InvalidToken)
    }
}

/// 16 bytes from the OS RNG, hex-encoded.
fn generate_token() -> Result<EnrollmentToken, CloudError> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes)?;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(out, "{byte:02x}").unwrap(); // meets capacity constraint
    }

    Ok(EnrollmentToken::from(out))
}
