use crate::common::error::AppError;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";

#[derive(Debug, Copy, Clone)]
pub struct IpAddrInfo {
    pub ip_addr: IpAddr,
}

/// Resolves the client address: the first hop of `X-Forwarded-For`,
/// otherwise the peer address of the connection.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    let forwarded = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first_hop| IpAddr::from_str(first_hop.trim()).ok());
    match forwarded {
        Some(ip_addr) => Some(ip_addr),
        None => extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip()),
    }
}

impl<S: Sync + Send> FromRequestParts<S> for IpAddrInfo {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match client_ip(&parts.headers, &parts.extensions) {
            Some(ip_addr) => Ok(IpAddrInfo { ip_addr }),
            None => Err(AppError::InternalServerError("client address unavailable")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    #[rstest]
    #[case("203.0.113.7", "203.0.113.7")]
    #[case("203.0.113.7, 10.0.0.1", "203.0.113.7")]
    #[case(" 2001:db8::1 ,10.0.0.1", "2001:db8::1")]
    fn forwarded_header_first_hop_wins(#[case] header: &str, #[case] expected: &str) {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR_HEADER, HeaderValue::from_str(header).unwrap());
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));

        let ip = client_ip(&headers, &extensions).unwrap();
        assert_eq!(ip, IpAddr::from_str(expected).unwrap());
    }

    #[test]
    fn falls_back_to_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR_HEADER, HeaderValue::from_static("not-an-ip"));
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 4000))));

        let ip = client_ip(&headers, &extensions).unwrap();
        assert_eq!(ip, IpAddr::from([192, 168, 1, 20]));
    }

    #[test]
    fn no_address_without_header_or_peer() {
        assert!(client_ip(&HeaderMap::new(), &Extensions::new()).is_none());
    }
}
