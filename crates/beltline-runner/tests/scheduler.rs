//! Scheduler behavior under tokio's paused clock.

use std::time::Duration;

use beltline_core::belt::Side;
use beltline_core::config::SimConfig;
use beltline_core::fixed::Fixed64;
use beltline_core::item::BuildingKind;
use beltline_core::test_utils::{science_line, two_ore_world};
use beltline_core::world::WorldState;
use beltline_runner::config::RunnerConfig;
use beltline_runner::persistence::SaveStore;
use beltline_runner::{RunnerError, Scheduler};
use tokio::time::sleep;

fn config(save_every: u64) -> RunnerConfig {
    RunnerConfig {
        tick_period_ms: 500,
        save_every,
        ..RunnerConfig::default()
    }
}

fn line_world() -> WorldState {
    let mut w = two_ore_world();
    science_line(&mut w);
    w
}

async fn ticks(scheduler: &Scheduler) -> u64 {
    scheduler.world().lock().await.ticks()
}

#[tokio::test(start_paused = true)]
async fn starts_paused() {
    let scheduler = Scheduler::new(line_world(), &config(0), None);
    sleep(Duration::from_secs(10)).await;
    assert!(!scheduler.is_running());
    assert_eq!(ticks(&scheduler).await, 0);
}

#[tokio::test(start_paused = true)]
async fn ticks_at_configured_period() {
    let mut scheduler = Scheduler::new(line_world(), &config(0), None);
    scheduler.start().await;
    sleep(Duration::from_millis(1250)).await;
    assert_eq!(ticks(&scheduler).await, 2);
    assert!(scheduler.summary().await.running);
}

#[tokio::test(start_paused = true)]
async fn double_start_does_not_double_tick() {
    let mut scheduler = Scheduler::new(line_world(), &config(0), None);
    scheduler.start().await;
    scheduler.start().await;
    scheduler.resume().await;
    sleep(Duration::from_millis(1250)).await;
    assert_eq!(ticks(&scheduler).await, 2);
}

#[tokio::test(start_paused = true)]
async fn pause_stops_ticking() {
    let mut scheduler = Scheduler::new(line_world(), &config(0), None);
    scheduler.start().await;
    sleep(Duration::from_millis(1250)).await;
    scheduler.pause().await;
    sleep(Duration::from_secs(10)).await;
    assert_eq!(ticks(&scheduler).await, 2);
    assert!(!scheduler.is_running());
    assert!(!scheduler.summary().await.running);

    scheduler.resume().await;
    sleep(Duration::from_millis(600)).await;
    assert_eq!(ticks(&scheduler).await, 3);
}

#[tokio::test(start_paused = true)]
async fn speed_change_restarts_interval() {
    let mut scheduler = Scheduler::new(line_world(), &config(0), None);
    scheduler.start().await;
    sleep(Duration::from_millis(1100)).await;
    assert_eq!(ticks(&scheduler).await, 2);

    scheduler.set_speed(2.0).await.unwrap();
    sleep(Duration::from_millis(900)).await;
    assert_eq!(ticks(&scheduler).await, 5);
    assert_eq!(scheduler.summary().await.speed, Fixed64::from_num(2));
}

#[tokio::test(start_paused = true)]
async fn speed_change_while_paused_stays_paused() {
    let mut scheduler = Scheduler::new(line_world(), &config(0), None);
    scheduler.set_speed(4.0).await.unwrap();
    sleep(Duration::from_secs(5)).await;
    assert!(!scheduler.is_running());
    assert_eq!(ticks(&scheduler).await, 0);
}

#[tokio::test(start_paused = true)]
async fn restored_world_keeps_saved_speed() {
    let mut saved = line_world();
    assert!(saved.set_speed(Fixed64::from_num(4)));
    let data = saved.serialize().unwrap();
    let restored = WorldState::restore_or_fresh(Some(data.as_slice()), &SimConfig::default(), 1);

    let mut scheduler = Scheduler::new(restored, &config(0), None);
    assert_eq!(scheduler.summary().await.speed, Fixed64::from_num(4));

    // Speed 4 gives a 125 ms period.
    scheduler.start().await;
    sleep(Duration::from_millis(1100)).await;
    assert_eq!(ticks(&scheduler).await, 8);
}

#[tokio::test(start_paused = true)]
async fn configured_speed_overrides_saved_speed() {
    let mut saved = line_world();
    assert!(saved.set_speed(Fixed64::from_num(4)));
    let config = RunnerConfig {
        speed: Some(0.5),
        ..config(0)
    };
    let scheduler = Scheduler::new(saved, &config, None);
    assert_eq!(scheduler.summary().await.speed, Fixed64::from_num(0.5));
}

#[tokio::test(start_paused = true)]
async fn non_positive_speed_is_rejected() {
    let mut scheduler = Scheduler::new(line_world(), &config(0), None);
    for bad in [0.0, -1.0, f64::NAN] {
        assert!(matches!(
            scheduler.set_speed(bad).await,
            Err(RunnerError::InvalidSpeed { .. })
        ));
    }
    assert_eq!(scheduler.summary().await.speed, Fixed64::ONE);
}

#[tokio::test(start_paused = true)]
async fn tick_counter_is_published() {
    let mut scheduler = Scheduler::new(line_world(), &config(0), None);
    let mut rx = scheduler.subscribe_ticks();
    scheduler.start().await;
    rx.wait_for(|&t| t >= 3).await.unwrap();
    assert!(ticks(&scheduler).await >= 3);
}

#[tokio::test(start_paused = true)]
async fn real_time_run_matches_direct_advance() {
    let mut direct = line_world();
    let mut scheduler = Scheduler::new(direct.clone(), &config(0), None);
    let mut rx = scheduler.subscribe_ticks();
    scheduler.start().await;
    rx.wait_for(|&t| t >= 40).await.unwrap();
    scheduler.pause().await;

    let driven = scheduler.world().lock().await.clone();
    direct.advance(driven.ticks());
    assert_eq!(driven.state_hash(), direct.state_hash());
}

#[tokio::test(start_paused = true)]
async fn edits_land_between_ticks() {
    let mut scheduler = Scheduler::new(two_ore_world(), &config(0), None);
    scheduler.start().await;
    sleep(Duration::from_millis(750)).await;

    let id = scheduler
        .place(BuildingKind::Miner, Side::Left, 0)
        .await
        .unwrap();
    assert!(scheduler.place(BuildingKind::Lab, Side::Left, 0).await.is_err());
    scheduler.move_building(id, 1, Side::Right).await.unwrap();
    sleep(Duration::from_millis(500)).await;
    {
        let world = scheduler.world();
        let world = world.lock().await;
        let b = world.building(id).unwrap();
        assert_eq!((b.slot, b.side), (1, Side::Right));
        assert!(b.progress <= 1);
        assert_eq!(world.ticks(), 2);
    }
    scheduler.remove(id).await.unwrap();
    assert_eq!(scheduler.summary().await.building_count, 0);
}

#[tokio::test(start_paused = true)]
async fn saves_every_n_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let store = SaveStore::new(dir.path().join("world.save"));
    let mut scheduler = Scheduler::new(line_world(), &config(5), Some(store.clone()));
    scheduler.start().await;

    sleep(Duration::from_millis(2250)).await;
    assert!(store.load().is_none());

    sleep(Duration::from_millis(500)).await;
    let saved = WorldState::deserialize(&store.load().unwrap(), &SimConfig::default()).unwrap();
    assert_eq!(saved.ticks(), 5);
    assert!(!saved.is_running());

    sleep(Duration::from_millis(2000)).await;
    let saved = WorldState::deserialize(&store.load().unwrap(), &SimConfig::default()).unwrap();
    assert_eq!(saved.ticks(), 5);
}

#[tokio::test(start_paused = true)]
async fn reset_pauses_and_clears_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = SaveStore::new(dir.path().join("world.save"));
    let mut scheduler = Scheduler::new(line_world(), &config(1), Some(store.clone()));
    scheduler.start().await;
    sleep(Duration::from_millis(1250)).await;
    assert!(store.load().is_some());

    scheduler.reset().await.unwrap();
    assert!(!scheduler.is_running());
    assert!(store.load().is_none());
    let summary = scheduler.summary().await;
    assert_eq!(summary.tick, 0);
    assert_eq!(summary.building_count, 0);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(ticks(&scheduler).await, 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_writes_final_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = SaveStore::new(dir.path().join("world.save"));
    let mut scheduler = Scheduler::new(line_world(), &config(0), Some(store.clone()));
    scheduler.start().await;
    sleep(Duration::from_millis(1250)).await;

    let world = scheduler.shutdown().await.unwrap();
    assert_eq!(world.ticks(), 2);
    let saved = WorldState::deserialize(&store.load().unwrap(), &SimConfig::default()).unwrap();
    assert_eq!(saved.state_hash(), world.state_hash());
}
