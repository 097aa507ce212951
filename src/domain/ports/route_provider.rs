use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::geo::{BoundingBox, Location, Route};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteProviderError {
    #[error("routing service unavailable: {0}")]
    Unavailable(String),
    #[error("no route found between the given points")]
    NoRouteFound,
    #[error("malformed routing service response: {0}")]
    InvalidResponse(String),
}

/// Inbound-to-engine port for the external routing service. Modelled as a
/// black box per the spec: two geodetic points in, a polyline-encoded route
/// with distance and duration out.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn generate(
        &self,
        origin: Location,
        destination: Location,
        cancellation: CancellationToken,
    ) -> Result<Route, RouteProviderError>;

    /// Convenience: two uniformly-sampled points in `bbox`, forwarded to `generate`.
    async fn generate_random(
        &self,
        bbox: &BoundingBox,
        cancellation: CancellationToken,
    ) -> Result<Route, RouteProviderError> {
        let mut rng = rand::rng();
        let origin = bbox.sample(&mut rng);
        let destination = bbox.sample(&mut rng);
        self.generate(origin, destination, cancellation).await
    }

    /// Generates up to `count` routes; per-call failures are skipped
    /// silently, but cancellation terminates the batch early.
    async fn generate_batch(
        &self,
        bbox: &BoundingBox,
        count: usize,
        cancellation: CancellationToken,
    ) -> Vec<Route> {
        let mut routes = Vec::with_capacity(count);
        for _ in 0..count {
            if cancellation.is_cancelled() {
                break;
            }
            if let Ok(route) = self.generate_random(bbox, cancellation.clone()).await {
                routes.push(route);
            }
        }
        routes
    }
}
