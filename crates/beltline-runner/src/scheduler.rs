//! Real-time tick driver.
//!
//! One background task owns the interval. Every control operation that
//! changes the cadence stops that task (waiting for any in-flight tick to
//! finish) before a new one is spawned, so at most one interval is ever
//! live. Player edits go through the same mutex as the tick, so an edit
//! lands strictly between two ticks.

use std::sync::Arc;
use std::time::Duration;

use beltline_core::belt::Side;
use beltline_core::fixed::{Fixed64, checked_f64_to_fixed64, fixed64_to_f64};
use beltline_core::id::BuildingId;
use beltline_core::item::BuildingKind;
use beltline_core::placement::PlacementRejected;
use beltline_core::query::WorldSummary;
use beltline_core::world::{Building, WorldState};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::{RunnerConfig, scaled_period};
use crate::error::RunnerError;
use crate::persistence::SaveStore;

pub type SharedWorld = Arc<Mutex<WorldState>>;

pub struct Scheduler {
    world: SharedWorld,
    store: Option<SaveStore>,
    base_period: Duration,
    save_every: u64,
    ticks_tx: watch::Sender<u64>,
    task: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Wrap `world`. The scheduler starts paused. The world keeps its own
    /// speed unless the config names one.
    pub fn new(world: WorldState, config: &RunnerConfig, store: Option<SaveStore>) -> Self {
        let mut world = world;
        world.set_running(false);
        if let Some(speed) = config.speed
            && !checked_f64_to_fixed64(speed).is_some_and(|fixed| world.set_speed(fixed))
        {
            warn!(speed, "ignoring unusable configured speed");
        }
        let (ticks_tx, _) = watch::channel(world.ticks());
        Self {
            world: Arc::new(Mutex::new(world)),
            store,
            base_period: Duration::from_millis(config.tick_period_ms),
            save_every: config.save_every,
            ticks_tx,
            task: None,
        }
    }

    /// Shared handle to the world, for observers.
    pub fn world(&self) -> SharedWorld {
        Arc::clone(&self.world)
    }

    /// Receives the tick counter after every completed tick.
    pub fn subscribe_ticks(&self) -> watch::Receiver<u64> {
        self.ticks_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub async fn summary(&self) -> WorldSummary {
        self.world.lock().await.summary()
    }

    /// Begin ticking. No-op if already running.
    pub async fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        let speed = {
            let mut world = self.world.lock().await;
            world.set_running(true);
            world.speed()
        };
        self.spawn(speed);
        info!(speed = fixed64_to_f64(speed), "simulation started");
    }

    pub async fn resume(&mut self) {
        self.start().await;
    }

    /// Stop ticking. No-op if already paused.
    pub async fn pause(&mut self) {
        if !self.halt().await {
            return;
        }
        self.world.lock().await.set_running(false);
        info!("simulation paused");
    }

    /// Change the speed multiplier. While running, the interval restarts at
    /// the new rate.
    pub async fn set_speed(&mut self, speed: f64) -> Result<(), RunnerError> {
        let Some(fixed) = checked_f64_to_fixed64(speed) else {
            return Err(RunnerError::InvalidSpeed { speed });
        };
        if !self.world.lock().await.set_speed(fixed) {
            return Err(RunnerError::InvalidSpeed { speed });
        }
        if self.halt().await {
            self.spawn(fixed);
        }
        info!(speed, "speed changed");
        Ok(())
    }

    /// Pause, discard the world for a fresh one, and delete the save.
    pub async fn reset(&mut self) -> Result<(), RunnerError> {
        self.halt().await;
        {
            let mut world = self.world.lock().await;
            world.reset();
            self.ticks_tx.send_replace(world.ticks());
        }
        if let Some(store) = &self.store {
            store.clear()?;
        }
        info!("world reset");
        Ok(())
    }

    pub async fn place(
        &self,
        kind: BuildingKind,
        side: Side,
        slot: usize,
    ) -> Result<BuildingId, PlacementRejected> {
        self.world.lock().await.place(kind, side, slot)
    }

    pub async fn remove(&self, id: BuildingId) -> Result<Building, PlacementRejected> {
        self.world.lock().await.remove(id)
    }

    pub async fn move_building(
        &self,
        id: BuildingId,
        slot: usize,
        side: Side,
    ) -> Result<(), PlacementRejected> {
        self.world.lock().await.move_building(id, slot, side)
    }

    /// Save the current world now.
    pub async fn save_now(&self) -> Result<(), RunnerError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let data = self.world.lock().await.serialize()?;
        store.write(&data)
    }

    /// Pause and write a final save.
    pub async fn shutdown(mut self) -> Result<WorldState, RunnerError> {
        self.pause().await;
        self.save_now().await?;
        let world = self.world.lock().await.clone();
        Ok(world)
    }

    fn spawn(&mut self, speed: Fixed64) {
        let period = scaled_period(self.base_period, fixed64_to_f64(speed));
        let driver = TickLoop {
            world: Arc::clone(&self.world),
            store: self.store.clone(),
            save_every: self.save_every,
            ticks_tx: self.ticks_tx.clone(),
        };
        self.task = Some(tokio::spawn(driver.run(period)));
    }

    /// Stop the tick task, waiting for it to wind down. Returns whether one
    /// was running.
    async fn halt(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        task.abort();
        if let Err(err) = task.await
            && !err.is_cancelled()
        {
            warn!(%err, "tick task ended abnormally");
        }
        true
    }
}

struct TickLoop {
    world: SharedWorld,
    store: Option<SaveStore>,
    save_every: u64,
    ticks_tx: watch::Sender<u64>,
}

impl TickLoop {
    async fn run(self, period: Duration) {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            // The step and the encode happen under the lock with no await in
            // between, so cancellation never splits a tick.
            let (tick, snapshot) = {
                let mut world = self.world.lock().await;
                world.step();
                let tick = world.ticks();
                let snapshot = if self.due_for_save(tick) {
                    match world.serialize() {
                        Ok(data) => Some(data),
                        Err(err) => {
                            warn!(tick, %err, "could not encode world for saving");
                            None
                        }
                    }
                } else {
                    None
                };
                (tick, snapshot)
            };
            self.ticks_tx.send_replace(tick);
            if let (Some(store), Some(data)) = (&self.store, snapshot) {
                store.write_logged(&data);
            }
        }
    }

    fn due_for_save(&self, tick: u64) -> bool {
        self.store.is_some() && self.save_every > 0 && tick % self.save_every == 0
    }
}
