pub mod event_publisher;
pub mod route_provider;

pub use event_publisher::{EventPublisher, EventPublisherError};
pub use route_provider::{RouteProvider, RouteProviderError};
