//! Client details recorded with activity entries.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use erasmus_core::audit::ActivityContext;

/// IP address and user agent of the current request.
///
/// The IP comes from the first `X-Forwarded-For` entry, then `X-Real-IP`,
/// then the peer address of the connection.
#[derive(Debug, Clone, Default)]
pub struct RequestContext(pub ActivityContext);

impl RequestContext {
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let ip_address = header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| header("x-real-ip"))
            .map(str::to_string)
            .or_else(|| peer.map(|addr| addr.ip().to_string()));

        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        RequestContext(ActivityContext {
            ip_address,
            user_agent,
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let peer = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr);
        Ok(RequestContext::from_parts(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some(SocketAddr::from(([203, 0, 113, 9], 52100)))
    }

    #[test]
    fn first_forwarded_address_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.7, 172.16.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let RequestContext(ctx) = RequestContext::from_parts(&headers, peer());
        assert_eq!(ctx.ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(ctx.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));

        let RequestContext(ctx) = RequestContext::from_parts(&headers, peer());
        assert_eq!(ctx.ip_address.as_deref(), Some("192.168.1.1"));
        assert_eq!(ctx.user_agent, None);
    }

    #[test]
    fn peer_address_when_no_proxy_headers() {
        let RequestContext(ctx) = RequestContext::from_parts(&HeaderMap::new(), peer());
        assert_eq!(ctx.ip_address.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn missing_headers_and_peer_leave_context_empty() {
        let RequestContext(ctx) = RequestContext::from_parts(&HeaderMap::new(), None);
        assert_eq!(ctx, ActivityContext::default());
    }
}
