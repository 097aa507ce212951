use serde::Deserialize;

use super::errors::OsrmClientError;

/// Mirrors the OSRM `/route/v1` response shape (§6.2): a status code plus
/// zero or more route records.
#[derive(Debug, Deserialize)]
pub struct OsrmRouteResponse {
    pub code: String,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    pub distance: f64,
    pub duration: f64,
    pub geometry: String,
}

impl OsrmRouteResponse {
    /// Applies the §4.2 failure-mapping rule: non-"Ok" code or an empty
    /// route list both mean "no route found," not an error to surface
    /// differently.
    pub fn first_route(self) -> Result<OsrmRoute, OsrmClientError> {
        if self.code != "Ok" {
            return Err(OsrmClientError::NoRouteFound);
        }
        self.routes.into_iter().next().ok_or(OsrmClientError::NoRouteFound)
    }
}
