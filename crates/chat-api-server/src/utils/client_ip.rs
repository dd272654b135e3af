use axum::http::HeaderMap;
use std::net::SocketAddr;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolve the caller identity used to key conversations.
///
/// Takes the first entry of `X-Forwarded-For` when the header is present,
/// otherwise the peer address of the connection.
pub fn resolve_user_id(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(first_forwarded)
        .unwrap_or_else(|| peer.ip().to_string())
}

fn first_forwarded(value: &str) -> Option<String> {
    let first = value.split(',').next()?.trim();
    if first.is_empty() {
        return None;
    }
    Some(first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.0.0.7:51234".parse().unwrap()
    }

    #[test]
    fn test_first_forwarded_entry_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR,
            HeaderValue::from_static("  203.0.113.9 , 198.51.100.2, 10.0.0.1"),
        );
        assert_eq!(resolve_user_id(&headers, peer()), "203.0.113.9");
    }

    #[test]
    fn test_single_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("198.51.100.2"));
        assert_eq!(resolve_user_id(&headers, peer()), "198.51.100.2");
    }

    #[test]
    fn test_falls_back_to_peer_ip() {
        assert_eq!(resolve_user_id(&HeaderMap::new(), peer()), "10.0.0.7");
    }

    #[test]
    fn test_blank_header_falls_back_to_peer_ip() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static(" , 198.51.100.2"));
        assert_eq!(resolve_user_id(&headers, peer()), "10.0.0.7");
    }
}
