use std::time::Duration;

/// Tunables for the simulation engine (§4.4.2). Defaults match the spec
/// exactly; production wiring overrides them from `SIMULATION_*` env vars
/// (see `crate::config::Config`), tests override them directly to run fast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub update_interval: Duration,
    pub speed_kmh: f64,
    pub time_multiplier: f64,
    pub pickup_wait_time: Duration,
    pub delivery_wait_time: Duration,
    pub failure_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(5),
            speed_kmh: 30.0,
            time_multiplier: 1.0,
            pickup_wait_time: Duration::from_secs(30),
            delivery_wait_time: Duration::from_secs(60),
            failure_rate: 0.05,
        }
    }
}
