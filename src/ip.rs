/// Client address extraction for rate limiting
///
/// Visitors are anonymous, so the client IP is the identifier the public
/// form limits are keyed on. It is never stored.
use actix_web::HttpRequest;
use std::net::IpAddr;

/// Fallback identifier when no address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extract the real client IP address from an HTTP request.
///
/// Checks headers in order of preference:
/// 1. X-Forwarded-For (first IP in the list)
/// 2. X-Real-IP
/// 3. Remote peer address
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    // Proxy chains: the first entry is the original client
    if let Some(xff) = req.headers().get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                let trimmed = first_ip.trim();
                if trimmed.parse::<IpAddr>().is_ok() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    if let Some(xri) = req.headers().get("x-real-ip") {
        if let Ok(xri_str) = xri.to_str() {
            let trimmed = xri_str.trim();
            if trimmed.parse::<IpAddr>().is_ok() {
                return Some(trimmed.to_string());
            }
        }
    }

    req.peer_addr().map(|peer| peer.ip().to_string())
}

/// Client IP, or [`UNKNOWN_CLIENT`] when none is available.
pub fn client_key(req: &HttpRequest) -> String {
    extract_client_ip(req).unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
