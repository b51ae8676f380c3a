//! Rate limiting middleware using token bucket algorithm.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

use crate::state::AppState;

/// Seconds between token replenishments.
const REPLENISH_SECONDS: u64 = 1;
const BURST_SIZE: u32 = 30;

type RateLimitLayer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn build_layer<K: KeyExtractor>(key_extractor: K) -> Option<RateLimitLayer<K>> {
    GovernorConfigBuilder::default()
        .per_second(REPLENISH_SECONDS)
        .burst_size(BURST_SIZE)
        .key_extractor(key_extractor)
        .finish()
        .map(|conf| GovernorLayer::new(Arc::new(conf)))
}

/// Rate limits every route in `router` per client IP.
///
/// # Limits
///
/// - **Replenish**: one request per second
/// - **Burst**: 30 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// With `behind_proxy`, the client IP comes from `X-Forwarded-For`,
/// `X-Real-IP` or `Forwarded`, falling back to the peer address. Otherwise
/// only the socket peer address is used, which requires serving with
/// `into_make_service_with_connect_info`.
pub fn limit(router: Router<AppState>, behind_proxy: bool) -> Router<AppState> {
    let limited = if behind_proxy {
        build_layer(SmartIpKeyExtractor).map(|layer| router.clone().layer(layer))
    } else {
        build_layer(PeerIpKeyExtractor).map(|layer| router.clone().layer(layer))
    };

    limited.unwrap_or_else(|| {
        tracing::warn!("Invalid rate limit configuration, write routes are not rate limited");
        router
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_build_for_both_extractors() {
        assert!(build_layer(PeerIpKeyExtractor).is_some());
        assert!(build_layer(SmartIpKeyExtractor).is_some());
    }
}
