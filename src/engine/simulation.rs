use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::domain::events::{
    CourierLocationEvent, DeliverOrderEvent, DeliveryOutcome, DomainEvent, LocationPayload,
    NotDeliveredReason, PickUpOrderEvent, PickupLocationSnapshot, PICKUP_LOCATION_ACCURACY_M,
};
use crate::domain::geo::{BoundingBox, Location, Route};
use crate::domain::order::DeliveryOrder;
use crate::domain::ports::{EventPublisher, RouteProvider};
use crate::domain::state_machine::Phase;

use super::config::EngineConfig;
use super::delivery_state::DeliveryState;
use super::errors::{StartDeliveryError, TickError};
use super::tick::{advance_position, build_location_event, wait_elapsed};

/// Half-width, in degrees, of the box a courier's unobserved starting
/// position is sampled from around its pickup address. The engine has no
/// notion of a courier's real-world location before `StartDelivery`; this is
/// the synthetic stand-in, matching how `BoundingBox` is documented to be
/// "used only for synthetic route generation" (§3.1).
const PICKUP_LEG_SPAWN_RADIUS_DEG: f64 = 0.02;

fn spawn_bbox_around(pickup: Location) -> BoundingBox {
    let min_lat = (pickup.latitude() - PICKUP_LEG_SPAWN_RADIUS_DEG).max(crate::domain::geo::location::MIN_LATITUDE);
    let max_lat = (pickup.latitude() + PICKUP_LEG_SPAWN_RADIUS_DEG).min(crate::domain::geo::location::MAX_LATITUDE);
    let min_lon = (pickup.longitude() - PICKUP_LEG_SPAWN_RADIUS_DEG).max(crate::domain::geo::location::MIN_LONGITUDE);
    let max_lon = (pickup.longitude() + PICKUP_LEG_SPAWN_RADIUS_DEG).min(crate::domain::geo::location::MAX_LONGITUDE);

    // Degenerate boxes only arise pathologically close to a pole or the
    // antimeridian; widen to the minimum legal box rather than fail startup.
    BoundingBox::new(min_lat, (max_lat).max(min_lat + 1e-6), min_lon, (max_lon).max(min_lon + 1e-6))
        .unwrap_or_else(|_| BoundingBox::new(-1.0, 1.0, -1.0, 1.0).expect("fallback bbox is always valid"))
}

struct EngineInner<R, P>
where
    R: RouteProvider + 'static,
    P: EventPublisher + 'static,
{
    table: RwLock<HashMap<String, DeliveryState>>,
    tasks: AsyncMutex<HashMap<String, (JoinHandle<()>, CancellationToken)>>,
    route_provider: Arc<R>,
    event_publisher: Arc<P>,
    config: EngineConfig,
    rng: StdMutex<StdRng>,
    minimal_route_seq: AtomicU64,
    shutdown: CancellationToken,
}

/// Owns the table of active simulations, schedules per-courier ticks, and
/// publishes the three event streams. See SPEC_FULL.md §4.4 for the
/// behavioural contract this implements.
pub struct SimulationEngine<R, P>
where
    R: RouteProvider + 'static,
    P: EventPublisher + 'static,
{
    inner: Arc<EngineInner<R, P>>,
}

impl<R, P> Clone for SimulationEngine<R, P>
where
    R: RouteProvider + 'static,
    P: EventPublisher + 'static,
{
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<R, P> SimulationEngine<R, P>
where
    R: RouteProvider + 'static,
    P: EventPublisher + 'static,
{
    pub fn new(route_provider: Arc<R>, event_publisher: Arc<P>, config: EngineConfig) -> Self {
        Self::with_seed(route_provider, event_publisher, config, rand::random())
    }

    /// Constructs the engine with an explicit PRNG seed, for deterministic tests (§4.4.6).
    pub fn with_seed(route_provider: Arc<R>, event_publisher: Arc<P>, config: EngineConfig, seed: u64) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                table: RwLock::new(HashMap::new()),
                tasks: AsyncMutex::new(HashMap::new()),
                route_provider,
                event_publisher,
                config,
                rng: StdMutex::new(StdRng::seed_from_u64(seed)),
                minimal_route_seq: AtomicU64::new(1),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Atomically inserts a new `DeliveryState` in `HeadingToPickup` and
    /// spawns its ticker (§4.4.1).
    #[instrument(skip(self, order, cancellation), fields(courier_id = %courier_id))]
    pub async fn start_delivery(
        &self,
        courier_id: String,
        order: DeliveryOrder,
        cancellation: CancellationToken,
    ) -> Result<(), StartDeliveryError> {
        {
            let table = self.inner.table.read().await;
            if let Some(existing) = table.get(&courier_id) {
                if !existing.is_idle() {
                    return Err(StartDeliveryError::CourierHasActiveDelivery(courier_id));
                }
            }
        }

        let spawn_point = {
            let bbox = spawn_bbox_around(order.pickup_location);
            let mut rng = self.inner.rng.lock().expect("engine rng mutex poisoned");
            bbox.sample(&mut *rng)
        };

        let route = self
            .inner
            .route_provider
            .generate(spawn_point, order.pickup_location, cancellation.clone())
            .await?;

        let now = Utc::now();
        let state = DeliveryState::new_heading_to_pickup(courier_id.clone(), order, route, now)
            .map_err(|e| StartDeliveryError::Routing(crate::domain::ports::RouteProviderError::InvalidResponse(e.to_string())))?;

        {
            let mut table = self.inner.table.write().await;
            table.insert(courier_id.clone(), state);
        }

        let task_cancellation = cancellation.child_token();
        let inner = self.inner.clone();
        let task_courier_id = courier_id.clone();
        let handle = tokio::spawn(async move {
            run_courier(inner, task_courier_id, task_cancellation).await;
        });

        self.inner.tasks.lock().await.insert(courier_id.clone(), (handle, cancellation));
        info!(courier_id = %courier_id, "simulation started");
        Ok(())
    }

    /// Removes the row. Best-effort; the ticker observes removal (or
    /// cancellation) on its next suspension point and exits.
    pub async fn stop_delivery(&self, courier_id: &str) {
        self.inner.table.write().await.remove(courier_id);
        if let Some((_, cancellation)) = self.inner.tasks.lock().await.remove(courier_id) {
            cancellation.cancel();
        }
        info!(courier_id = %courier_id, "simulation stopped");
    }

    /// Returns a value copy to prevent external mutation.
    pub async fn get_delivery_state(&self, courier_id: &str) -> Option<DeliveryState> {
        self.inner.table.read().await.get(courier_id).cloned()
    }

    /// Active courier IDs, excluding rows sitting idle.
    pub async fn get_all_deliveries(&self) -> Vec<String> {
        self.inner
            .table
            .read()
            .await
            .iter()
            .filter(|(_, state)| !state.is_idle())
            .map(|(courier_id, _)| courier_id.clone())
            .collect()
    }

    /// Signals all tickers to terminate, waits for them (bounded by
    /// `deadline` if given), and clears the table.
    pub async fn stop(&self, deadline: Option<std::time::Duration>) {
        self.inner.shutdown.cancel();

        let handles: Vec<(String, JoinHandle<()>)> = {
            let mut tasks = self.inner.tasks.lock().await;
            tasks.drain().map(|(courier_id, (handle, _))| (courier_id, handle)).collect()
        };

        for (courier_id, handle) in handles {
            let joined = match deadline {
                Some(timeout) => tokio::time::timeout(timeout, handle).await.ok(),
                None => Some(handle.await),
            };
            if joined.is_none() {
                warn!(courier_id = %courier_id, "simulation task did not stop before deadline");
            }
        }

        self.inner.table.write().await.clear();
        info!("simulation engine stopped");
    }
}

/// Per-courier tick loop: one long-lived task per active simulation (§5).
async fn run_courier<R, P>(inner: Arc<EngineInner<R, P>>, courier_id: String, cancellation: CancellationToken)
where
    R: RouteProvider + 'static,
    P: EventPublisher + 'static,
{
    let mut interval = tokio::time::interval(inner.config.update_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancellation.cancelled() => break,
            _ = inner.shutdown.cancelled() => break,
            _ = interval.tick() => {
                match process_tick(&inner, &courier_id, &cancellation).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        warn!(courier_id = %courier_id, error = %e, "tick faulted, ending simulation");
                        break;
                    }
                }
            }
        }
    }

    inner.tasks.lock().await.remove(&courier_id);
}

/// Runs one tick for `courier_id`. Returns `Ok(false)` if the simulation task
/// should exit cleanly (row removed, delivery completed); `Err` if it faulted
/// on a publish or a state machine violation (§7).
async fn process_tick<R, P>(inner: &Arc<EngineInner<R, P>>, courier_id: &str, cancellation: &CancellationToken) -> Result<bool, TickError>
where
    R: RouteProvider + 'static,
    P: EventPublisher + 'static,
{
    // Snapshot: hold the table lock only long enough to clone the row (§5).
    let mut state = {
        let table = inner.table.read().await;
        match table.get(courier_id) {
            Some(state) => state.clone(),
            None => return Ok(false),
        }
    };

    let now = Utc::now();

    match state.phase {
        Phase::HeadingToPickup | Phase::HeadingToCustomer => {
            let elapsed = (now - state.last_update_at).to_std().unwrap_or_default();
            let completed = advance_position(&mut state, elapsed, &inner.config);
            state.last_update_at = now;

            let event = build_location_event(&state, now, &inner.config);
            inner.event_publisher.publish_location(event).await?;

            if completed {
                let next_phase = match state.phase {
                    Phase::HeadingToPickup => Phase::PickingUp,
                    Phase::HeadingToCustomer => Phase::Delivering,
                    _ => unreachable!(),
                };
                state.phase = state.phase.transition_to(next_phase)?;
                state.phase_started_at = now;
            }

            write_back(inner, courier_id, state).await;
            Ok(true)
        }
        Phase::PickingUp => {
            let event = build_location_event(&state, now, &inner.config);
            inner.event_publisher.publish_location(event).await?;
            state.last_update_at = now;

            if wait_elapsed(state.phase_started_at, now, inner.config.pickup_wait_time, inner.config.time_multiplier) {
                let Some(order) = state.current_order.clone() else {
                    warn!(courier_id = %courier_id, "PickingUp row has no order attached, ending simulation");
                    return Ok(false);
                };

                let pickup_event = PickUpOrderEvent {
                    order_id: order.order_id.clone(),
                    courier_id: courier_id.to_string(),
                    pickup_location: PickupLocationSnapshot {
                        lat: state.current_location.latitude(),
                        lon: state.current_location.longitude(),
                        accuracy: PICKUP_LOCATION_ACCURACY_M,
                        timestamp: now,
                    },
                    picked_up_at: now,
                };

                // Emitted before the delivery-leg route is computed, so a
                // routing failure below cannot erase a successful pickup
                // from the observable history (§4.4.5).
                inner.event_publisher.publish_pickup(pickup_event).await?;

                let route = delivery_leg_route(inner, &state, &order, cancellation).await;

                let Ok(points) = route.points() else {
                    warn!(courier_id = %courier_id, "delivery-leg route polyline failed to decode, ending simulation");
                    return Ok(false);
                };

                state.phase = state.phase.transition_to(Phase::HeadingToCustomer)?;
                state.phase_started_at = now;
                state.current_route = Some(route);
                state.current_points = points;
                state.current_point_idx = 0;
            }

            write_back(inner, courier_id, state).await;
            Ok(true)
        }
        Phase::Delivering => {
            let event = build_location_event(&state, now, &inner.config);
            inner.event_publisher.publish_location(event).await?;
            state.last_update_at = now;

            if wait_elapsed(state.phase_started_at, now, inner.config.delivery_wait_time, inner.config.time_multiplier) {
                let Some(order) = state.current_order.clone() else {
                    warn!(courier_id = %courier_id, "Delivering row has no order attached, ending simulation");
                    return Ok(false);
                };

                let u: f64 = {
                    let mut rng = inner.rng.lock().expect("engine rng mutex poisoned");
                    rng.random()
                };
                let delivered = u >= inner.config.failure_rate;

                let (status, reason) = if delivered {
                    (DeliveryOutcome::Delivered, None)
                } else {
                    let idx: usize = {
                        let mut rng = inner.rng.lock().expect("engine rng mutex poisoned");
                        rng.random_range(0..NotDeliveredReason::SIMULATED.len())
                    };
                    (DeliveryOutcome::NotDelivered, Some(NotDeliveredReason::SIMULATED[idx]))
                };

                let deliver_event = DeliverOrderEvent {
                    order_id: order.order_id.clone(),
                    courier_id: courier_id.to_string(),
                    status,
                    reason,
                    current_location: LocationPayload::from(state.current_location),
                    delivered_at: now,
                };

                inner.event_publisher.publish_delivery(deliver_event).await?;

                state.phase = state.phase.transition_to(Phase::Idle)?;
                state.phase_started_at = now;
                state.current_order = None;
                state.current_route = None;
                state.current_points.clear();
                state.current_point_idx = 0;

                write_back(inner, courier_id, state).await;
                // The delivery is complete; the simulation task exits (§3.4).
                return Ok(false);
            }

            write_back(inner, courier_id, state).await;
            Ok(true)
        }
        Phase::Idle => Ok(false),
    }
}

/// Requests the delivery-leg route; falls back to a minimal two-point route
/// rather than abandoning a picked-up parcel (§4.4.4, §9).
async fn delivery_leg_route<R, P>(
    inner: &Arc<EngineInner<R, P>>,
    state: &DeliveryState,
    order: &DeliveryOrder,
    cancellation: &CancellationToken,
) -> Route
where
    R: RouteProvider + 'static,
    P: EventPublisher + 'static,
{
    match inner
        .route_provider
        .generate(state.current_location, order.delivery_location, cancellation.clone())
        .await
    {
        Ok(route) => route,
        Err(e) => {
            warn!(
                courier_id = %state.courier_id,
                error = %e,
                "delivery-leg routing failed, falling back to minimal route"
            );
            let seq = inner.minimal_route_seq.fetch_add(1, Ordering::Relaxed);
            let id = format!("route_minimal_{seq:06}");
            Route::minimal(id, state.current_location, order.delivery_location, inner.config.speed_kmh, Utc::now())
                .expect("minimal route construction cannot fail for validated Location endpoints")
        }
    }
}

async fn write_back<R, P>(inner: &Arc<EngineInner<R, P>>, courier_id: &str, state: DeliveryState)
where
    R: RouteProvider + 'static,
    P: EventPublisher + 'static,
{
    let mut table = inner.table.write().await;
    if let Some(slot) = table.get_mut(courier_id) {
        *slot = state;
    }
}
