use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use ipnet::IpNet;

use crate::state::AppState;

/// Extension type to store resolved client IP
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

fn peer_is_trusted(proxies: &[IpNet], peer: Option<SocketAddr>) -> bool {
    match peer {
        Some(sa) => proxies.iter().any(|net| net.contains(&sa.ip())),
        None => false,
    }
}

/// Forwarding headers are only believed when the immediate peer is a trusted proxy.
pub fn resolve_client_ip(
    headers: &axum::http::HeaderMap,
    peer: Option<SocketAddr>,
    proxies: &[IpNet],
) -> Option<IpAddr> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    // Prefer Cloudflare header, then X-Forwarded-For, then X-Real-IP
    let forwarded = if peer_is_trusted(proxies, peer) {
        if let Some(cf) = header("cf-connecting-ip") {
            IpAddr::from_str(cf.trim()).ok()
        } else if let Some(xff) = header("x-forwarded-for") {
            xff.split(',').next().and_then(|s| IpAddr::from_str(s.trim()).ok())
        } else if let Some(xri) = header("x-real-ip") {
            IpAddr::from_str(xri.trim()).ok()
        } else {
            None
        }
    } else {
        None
    };

    forwarded.or_else(|| peer.map(|sa| sa.ip()))
}

pub async fn proxy_middleware(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    if let Some(ip) = resolve_client_ip(req.headers(), peer, &state.trusted_proxies) {
        req.extensions_mut().insert(ClientIp(ip));
    }

    next.run(req).await
}
