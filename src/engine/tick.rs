use chrono::{DateTime, Utc};

use crate::domain::events::CourierLocationEvent;
use crate::domain::geo::Location;

use super::delivery_state::DeliveryState;
use super::config::EngineConfig;

/// Route-following kinematics for one moving-phase tick (§4.4.3).
///
/// Advances `state.current_location` and `state.current_point_idx` by the
/// distance the courier can cover in `elapsed`, walking forward through the
/// remaining route points and falling back to linear interpolation within a
/// sub-segment. Returns `true` iff the route was exhausted this tick (the
/// final point was reached).
pub fn advance_position(state: &mut DeliveryState, elapsed_wall: std::time::Duration, config: &EngineConfig) -> bool {
    let elapsed_s = elapsed_wall.as_secs_f64();
    let mut to_travel_km = (config.speed_kmh / 3600.0) * elapsed_s * config.time_multiplier;

    if state.current_points.is_empty() {
        return true;
    }

    loop {
        let Some(next_point) = state.next_point() else {
            // Already at (or past) the final point.
            if let Some(&last) = state.current_points.last() {
                state.current_location = last;
            }
            state.heading = None;
            return true;
        };

        let segment_km = state.current_location.distance_to(&next_point);

        if segment_km <= f64::EPSILON {
            // Degenerate (zero-length) segment: skip straight to the next point.
            state.current_point_idx += 1;
            state.current_location = next_point;
            continue;
        }

        if to_travel_km >= segment_km {
            to_travel_km -= segment_km;
            state.current_point_idx += 1;
            state.current_location = next_point;

            if state.next_point().is_none() {
                state.heading = None;
                return true;
            }
            continue;
        }

        // Budget runs out mid-segment: interpolate and stop.
        let fraction = to_travel_km / segment_km;
        state.heading = Some(state.current_location.bearing_to(&next_point));
        state.current_location = state.current_location.interpolate_toward(&next_point, fraction);
        return false;
    }
}

/// Builds the location event for the current tick, honoring the phase's
/// courier-status mapping and the "speed = 0 while waiting" rule (§4.4.4).
pub fn build_location_event(state: &DeliveryState, now: DateTime<Utc>, config: &EngineConfig) -> CourierLocationEvent {
    let speed_kmh = if state.phase.is_moving() { Some(config.speed_kmh) } else { Some(0.0) };

    CourierLocationEvent {
        courier_id: state.courier_id.clone(),
        latitude: state.current_location.latitude(),
        longitude: state.current_location.longitude(),
        timestamp: now,
        status: state.phase.location_status().to_string(),
        speed_kmh,
        heading: if state.phase.is_moving() { state.heading } else { None },
        route_id: state.current_route.as_ref().map(|r| r.id().to_string()),
    }
}

/// Whether a wait-phase dwell timer has elapsed, scaled by `time_multiplier`.
pub fn wait_elapsed(phase_started_at: DateTime<Utc>, now: DateTime<Utc>, wait_time: std::time::Duration, time_multiplier: f64) -> bool {
    let elapsed_s = (now - phase_started_at).num_milliseconds() as f64 / 1000.0;
    elapsed_s * time_multiplier >= wait_time.as_secs_f64()
}

fn location_at(points: &[Location], idx: usize) -> Location {
    points[idx.min(points.len() - 1)]
}

/// `distanceTo(points[idx], current_location) <= distance(points[idx], points[idx+1]) + eps`,
/// the per-tick bound from §8.1.
pub fn within_segment_bound(state: &DeliveryState, epsilon_km: f64) -> bool {
    if state.current_points.len() < 2 {
        return true;
    }
    let idx = state.current_point_idx.min(state.current_points.len() - 1);
    let from = location_at(&state.current_points, idx);
    let to = location_at(&state.current_points, (idx + 1).min(state.current_points.len() - 1));

    let bound = from.distance_to(&to) + epsilon_km;
    from.distance_to(&state.current_location) <= bound
}
