//! Client identity for rate limiting.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRef, FromRequestParts};
use axum::http::request::Parts;

/// Header naming the original client when a reverse proxy forwards requests.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity used when neither a forwarded address nor a peer is known.
pub const ANONYMOUS: &str = "anonymous";

/// How a client is identified.
///
/// `X-Forwarded-For` is set by whoever sends the request, so it is only
/// honored behind a proxy that overwrites it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientPolicy {
    /// Take the first `X-Forwarded-For` entry over the peer address.
    pub trust_forwarded_for: bool,
}

/// Who sent the request: the peer address (or, when trusted, the first
/// `X-Forwarded-For` entry), else [`ANONYMOUS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_parts(parts: &Parts, policy: ClientPolicy) -> Self {
        if policy.trust_forwarded_for {
            let forwarded = parts
                .headers
                .get(FORWARDED_FOR)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|first| !first.is_empty());
            if let Some(first) = forwarded {
                return Self(first.to_owned());
            }
        }

        match parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => Self(addr.ip().to_string()),
            None => Self(ANONYMOUS.to_owned()),
        }
    }
}

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
    ClientPolicy: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, ClientPolicy::from_ref(state)))
    }
}
