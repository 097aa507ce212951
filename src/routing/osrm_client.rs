use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};
use url::Url;

use crate::domain::geo::{Location, Polyline, Route};
use crate::domain::ports::{RouteProvider, RouteProviderError};

use super::cache::RouteCache;
use super::errors::OsrmClientError;
use super::response::OsrmRouteResponse;

fn map_reqwest_error(e: reqwest::Error) -> OsrmClientError {
    if e.is_timeout() {
        OsrmClientError::TimedOut
    } else {
        OsrmClientError::Transport(e)
    }
}

impl From<OsrmClientError> for RouteProviderError {
    fn from(error: OsrmClientError) -> Self {
        match error {
            OsrmClientError::NoRouteFound => RouteProviderError::NoRouteFound,
            OsrmClientError::InvalidResponse(message) => RouteProviderError::InvalidResponse(message),
            OsrmClientError::Transport(_) | OsrmClientError::Cancelled | OsrmClientError::TimedOut => {
                RouteProviderError::Unavailable(error.to_string())
            }
        }
    }
}

/// `RouteProvider` backed by an OSRM-compatible HTTP routing service (§4.2,
/// §6.2). Caches successful responses in a bounded, TTL-checked cache.
pub struct OsrmRouteProvider {
    client: Client,
    base_url: Url,
    timeout: Duration,
    cache: RouteCache,
    route_id_seq: AtomicU64,
}

impl OsrmRouteProvider {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url,
            timeout,
            cache: RouteCache::new(),
            route_id_seq: AtomicU64::new(1),
        }
    }

    fn next_route_id(&self) -> String {
        let seq = self.route_id_seq.fetch_add(1, Ordering::Relaxed);
        format!("route_{seq:06}")
    }

    fn request_url(&self, origin: Location, destination: Location) -> Result<Url, OsrmClientError> {
        // Endpoints are carried in `lon,lat` order (§4.2).
        let path = format!(
            "route/v1/driving/{},{};{},{}",
            origin.longitude(),
            origin.latitude(),
            destination.longitude(),
            destination.latitude()
        );
        self.base_url
            .join(&path)
            .map_err(|e| OsrmClientError::InvalidResponse(e.to_string()))
    }

    async fn fetch(&self, origin: Location, destination: Location, cancellation: &CancellationToken) -> Result<Route, OsrmClientError> {
        let mut url = self.request_url(origin, destination)?;
        url.query_pairs_mut().append_pair("overview", "full").append_pair("geometries", "polyline");

        let request = self.client.get(url).timeout(self.timeout).send();

        let response = tokio::select! {
            _ = cancellation.cancelled() => return Err(OsrmClientError::Cancelled),
            result = request => result.map_err(map_reqwest_error)?,
        };

        let parsed: OsrmRouteResponse = response.json().await.map_err(map_reqwest_error)?;
        let osrm_route = parsed.first_route()?;

        let polyline = Polyline::new(osrm_route.geometry).map_err(|e| OsrmClientError::InvalidResponse(e.to_string()))?;
        let decoded = polyline.decode().map_err(|e| OsrmClientError::InvalidResponse(e.to_string()))?;
        if decoded.len() < 2 {
            return Err(OsrmClientError::InvalidResponse("route geometry has fewer than two points".to_string()));
        }

        Route::new(self.next_route_id(), origin, destination, polyline, osrm_route.distance, osrm_route.duration, Utc::now())
            .map_err(|e| OsrmClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RouteProvider for OsrmRouteProvider {
    #[instrument(skip(self, cancellation), fields(origin = %origin, destination = %destination))]
    async fn generate(&self, origin: Location, destination: Location, cancellation: CancellationToken) -> Result<Route, RouteProviderError> {
        if let Some(cached) = self.cache.get(origin, destination) {
            return Ok(cached);
        }

        match self.fetch(origin, destination, &cancellation).await {
            Ok(route) => {
                self.cache.put(origin, destination, route.clone());
                Ok(route)
            }
            Err(e) => {
                warn!(error = %e, "routing request failed");
                Err(e.into())
            }
        }
    }
}
