//! Identifier and wire types shared between the gridlink cloud and edge.
//!
//! The identifiers are opaque strings. They get their own types so that a
//! site, an edge and an enrollment token can never be swapped for one
//! another by accident, on either side of the wire.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl Deref for $name {
            type Target = String;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

opaque_id! {
    /// Identifier of a logical site owning one desired configuration.
    SiteId
}

opaque_id! {
    /// Caller-supplied identifier of an edge device.
    EdgeId
}

opaque_id! {
    /// Single-use, site-scoped credential authorizing one edge registration.
    ///
    /// Tokens are issued by the cloud and consumed on first successful
    /// redemption. The string itself carries 128 bits of OS entropy.
    EnrollmentToken
}

/// Body of `POST /api/edge/register`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub edge_id: EdgeId,
    pub token: EnrollmentToken,
}

/// Successful response to a registration: the site the edge is now bound to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub site_id: SiteId,
}

/// Successful response to `POST /api/sites/{site_id}/enrollment-token`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: EnrollmentToken,
}

/// One registered edge and the site it is bound to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeEntry {
    pub site_id: SiteId,
    pub edge_id: EdgeId,
}

/// Response to `GET /api/edges`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeList {
    pub edges: Vec<EdgeEntry>,
}
