//! Contract Test: Engine Lifecycle
//!
//! This test verifies the Starting → Polling → Stopped/Faulted lifecycle.
//!
//! Constraints verified:
//! - Startup and shutdown messages are sent through the status backend
//! - Engine terminates on shutdown signal
//! - A shutdown signal raised during a cycle is honored after the cycle
//! - A snapshot error faults the engine without a shutdown message
//!
//! If this test fails, someone has changed when the engine announces itself
//! or how it stops.

mod common;

use common::*;
use drivewatch_core::engine::{SHUTDOWN_MESSAGE, startup_message};
use drivewatch_core::error::{Error, FetchError};
use drivewatch_core::{MonitorEvent, MonitorState};
use std::time::Duration;

#[tokio::test]
async fn shutdown_signal_stops_engine_and_announces_it() {
    let source = ScriptedSource::constant(&["a.txt"]);
    let wiring = Wiring::new();
    let settings = fast_settings();
    let target = settings.target_url.clone();
    let (mut engine, mut events) = engine_with(&source, &wiring, settings);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let result = engine
            .run_until(async {
                let _ = shutdown_rx.await;
            })
            .await;
        (engine, result)
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_tx.send(()).expect("engine is still listening");

    let (engine, result) = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Engine should terminate within 5 seconds")
        .expect("engine task completes");

    assert!(result.is_ok(), "clean shutdown: {:?}", result);
    assert_eq!(engine.state(), MonitorState::Stopped);
    assert_eq!(
        wiring.status.sent(),
        vec![startup_message(&target), SHUTDOWN_MESSAGE.to_string()]
    );
    assert_eq!(wiring.alerts.send_count(), 1, "a.txt is alerted once");
    assert!(source.call_count() >= 2, "engine keeps polling until stopped");

    let events = drain_events(&mut events);
    assert_eq!(events.first(), Some(&MonitorEvent::Started { target_url: target }));
    assert_eq!(events.last(), Some(&MonitorEvent::Stopped));
}

#[tokio::test]
async fn signal_already_raised_is_seen_after_first_cycle() {
    let source = ScriptedSource::constant(&["a.txt"]);
    let wiring = Wiring::new();
    let (mut engine, _events) = engine_with(&source, &wiring, fast_settings());

    // Shutdown is ready before the first cycle starts
    engine.run_until(async {}).await.unwrap();

    assert_eq!(source.call_count(), 1, "the running cycle completes first");
    assert_eq!(wiring.alerts.send_count(), 1);
    assert_eq!(wiring.status.send_count(), 2);
    assert_eq!(engine.state(), MonitorState::Stopped);
}

#[tokio::test]
async fn long_sleep_is_interrupted_by_shutdown() {
    let source = ScriptedSource::constant(&[]);
    let wiring = Wiring::new();
    let settings = drivewatch_core::EngineSettings::new(
        "https://drive.example/share",
        Duration::from_secs(3600),
    );
    let (mut engine, _events) = engine_with(&source, &wiring, settings);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        engine.run_until(tokio::time::sleep(Duration::from_millis(20))),
    )
    .await
    .expect("shutdown must not wait for the poll interval");

    assert!(result.is_ok());
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn snapshot_error_faults_without_shutdown_message() {
    let source = ScriptedSource::new(vec![
        Ok(items(&["a.txt"])),
        Err(FetchError::launch("chrome not found")),
    ]);
    let wiring = Wiring::new();
    let settings = fast_settings();
    let target = settings.target_url.clone();
    let (mut engine, mut events) = engine_with(&source, &wiring, settings);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        engine.run_until(std::future::pending::<()>()),
    )
    .await
    .expect("faulted engine returns on its own");

    assert!(matches!(result, Err(Error::Fetch(FetchError::Launch(_)))));
    assert_eq!(engine.state(), MonitorState::Faulted);
    assert_eq!(wiring.status.sent(), vec![startup_message(&target)]);
    assert!(matches!(
        drain_events(&mut events).last(),
        Some(MonitorEvent::Faulted { .. })
    ));
}

#[tokio::test]
async fn known_items_survive_across_cycles_until_shutdown() {
    let source = ScriptedSource::new(vec![
        Ok(items(&["a.txt"])),
        Ok(items(&["b.txt"])),
        Ok(items(&["a.txt", "b.txt"])),
    ]);
    let wiring = Wiring::new();
    let (mut engine, _events) = engine_with(&source, &wiring, fast_settings());

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let result = engine
            .run_until(async {
                let _ = shutdown_rx.await;
            })
            .await;
        (engine, result)
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();
    let (engine, result) = handle.await.unwrap();

    result.unwrap();
    assert_eq!(engine.known_items().to_set(), items(&["a.txt", "b.txt"]));
    assert_eq!(wiring.alerts.send_count(), 2, "a.txt then b.txt, nothing after");
}
