pub mod bounding_box;
pub mod location;
pub mod polyline;
pub mod route;

pub use bounding_box::{BoundingBox, BoundingBoxError};
pub use location::{Location, LocationError};
pub use polyline::{Polyline, PolylineError};
pub use route::{Route, RouteError};
