//! `RouteProvider` adapter: an OSRM-compatible HTTP routing service wrapped
//! with a bounded, TTL-checked route cache (§4.2).

pub mod cache;
pub mod errors;
pub mod osrm_client;
pub mod response;

pub use errors::OsrmClientError;
pub use osrm_client::OsrmRouteProvider;
