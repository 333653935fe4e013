//! Integration tests for transferq
//!
//! These tests drive a `TransferManager` over real temporary directories and
//! the JSON task store.

use std::fs;
use std::sync::Arc;
use std::time::Duration;
use transferq_engine::{JsonTaskStore, TaskRecord, TaskStore};
use transferq_tests::test_utils::{
    all_terminal, file_name, wait_for, FailingOperations, SlowOperations, TestWorkspace,
};
use transferq_types::{StatusHistory, TaskSnapshot, TransferStatus, DIRECTORY_EXTENSION};

const LIMIT: Duration = Duration::from_secs(10);

fn find<'a>(records: &'a [Arc<TaskRecord>], name: &str) -> &'a TaskRecord {
    records
        .iter()
        .find(|r| file_name(r) == name)
        .unwrap_or_else(|| panic!("no record for {name}"))
}

#[tokio::test]
async fn test_copies_every_file_of_a_directory() {
    let ws = TestWorkspace::new();
    ws.add_source_file("a.txt", b"alpha");
    ws.add_source_file("b.log", b"bravo");

    let manager = ws.manager();
    manager.start().await.unwrap();
    manager.submit(ws.source_str(), ws.destination_str());

    let records = wait_for(&manager, LIMIT, |r| all_terminal(r, 2)).await;
    assert!(records.iter().all(|r| r.status() == TransferStatus::Done));
    for record in &records {
        let history = record.history();
        let awaiting = history.get(TransferStatus::Awaiting).unwrap();
        let copying = history.get(TransferStatus::Copying).unwrap();
        let done = history.get(TransferStatus::Done).unwrap();
        assert!(awaiting <= copying && copying <= done);
    }

    assert_eq!(fs::read(ws.destination.join("a.txt")).unwrap(), b"alpha");
    assert_eq!(fs::read(ws.destination.join("b.log")).unwrap(), b"bravo");
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_registered_records_match_source_files() {
    let ws = TestWorkspace::new();
    for name in ["1.csv", "2.csv", "3.json", "README"] {
        ws.add_source_file(name, name.as_bytes());
    }

    let manager = ws.manager();
    manager.start().await.unwrap();
    manager.submit(ws.source_str(), ws.destination_str());

    let records = wait_for(&manager, LIMIT, |r| all_terminal(r, 4)).await;
    assert_eq!(find(&records, "README").extension(), "");
    assert_eq!(find(&records, "3.json").extension(), ".json");
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_missing_source_directory() {
    let ws = TestWorkspace::new();
    let manager = ws.manager();
    manager.start().await.unwrap();

    let missing = ws.source.join("nope").to_string_lossy().into_owned();
    manager.submit(missing, ws.destination_str());

    let records = wait_for(&manager, LIMIT, |r| !r.is_empty()).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].extension(), DIRECTORY_EXTENSION);
    assert_eq!(records[0].status(), TransferStatus::Error);
    assert!(records[0]
        .error_message()
        .unwrap()
        .contains("does not exist"));
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_same_extension_runs_one_at_a_time() {
    let ws = TestWorkspace::new();
    ws.add_source_file("first.dat", b"1");
    ws.add_source_file("second.dat", b"2");

    let delay = Duration::from_millis(300);
    let manager = ws.manager_with(Arc::new(SlowOperations::new(delay)));
    manager.start().await.unwrap();
    manager.submit(ws.source_str(), ws.destination_str());

    let records = wait_for(&manager, LIMIT, |r| all_terminal(r, 2)).await;
    let first = find(&records, "first.dat").history();
    let second = find(&records, "second.dat").history();

    let first_done = first.get(TransferStatus::Done).unwrap();
    let first_copying = first.get(TransferStatus::Copying).unwrap();
    let second_copying = second.get(TransferStatus::Copying).unwrap();
    assert!(second_copying >= first_done);
    assert!((second_copying - first_copying).to_std().unwrap() >= delay);
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_different_extensions_run_concurrently() {
    let ws = TestWorkspace::new();
    ws.add_source_file("a.txt", b"a");
    ws.add_source_file("b.log", b"b");

    let delay = Duration::from_millis(500);
    let manager = ws.manager_with(Arc::new(SlowOperations::new(delay)));
    manager.start().await.unwrap();
    manager.submit(ws.source_str(), ws.destination_str());

    let records = wait_for(&manager, LIMIT, |r| all_terminal(r, 2)).await;
    let a_copying = find(&records, "a.txt").history().get(TransferStatus::Copying).unwrap();
    let b_done = find(&records, "b.log").history().get(TransferStatus::Done).unwrap();
    assert!(a_copying < b_done);
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_failing_copy_leaves_siblings_alone() {
    let ws = TestWorkspace::new();
    ws.add_source_file("broken.bad", b"x");
    ws.add_source_file("fine.txt", b"y");

    let manager = ws.manager_with(Arc::new(FailingOperations::new(".bad")));
    manager.start().await.unwrap();
    manager.submit(ws.source_str(), ws.destination_str());

    let records = wait_for(&manager, LIMIT, |r| all_terminal(r, 2)).await;
    let broken = find(&records, "broken.bad");
    assert_eq!(broken.status(), TransferStatus::Error);
    assert!(broken
        .error_message()
        .unwrap()
        .contains("device refused the write"));
    assert_eq!(find(&records, "fine.txt").status(), TransferStatus::Done);
    assert!(!ws.destination.join("broken.bad").exists());
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_finished_work_is_not_persisted() {
    let ws = TestWorkspace::new();
    ws.add_source_file("a.txt", b"a");

    let manager = ws.manager();
    manager.start().await.unwrap();
    manager.submit(ws.source_str(), ws.destination_str());
    wait_for(&manager, LIMIT, |r| all_terminal(r, 1)).await;
    manager.stop().await.unwrap();

    let restarted = ws.manager();
    restarted.start().await.unwrap();
    assert!(restarted.list_all().await.is_empty());
    restarted.stop().await.unwrap();
}

#[tokio::test]
async fn test_restart_with_empty_store() {
    let ws = TestWorkspace::new();
    let manager = ws.manager();
    manager.start().await.unwrap();
    assert!(manager.list_all().await.is_empty());
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_restart_resumes_awaiting_work() {
    let ws = TestWorkspace::new();
    let source = ws.add_source_file("pending.txt", b"resume me");
    let destination = ws.destination.join("pending.txt");

    let store = JsonTaskStore::new(ws.store_path());
    store.init().await.unwrap();
    store
        .upsert(&TaskRecord::new(
            source.to_string_lossy(),
            destination.to_string_lossy(),
            ".txt",
        ))
        .await
        .unwrap();

    let manager = ws.manager();
    manager.start().await.unwrap();
    let records = wait_for(&manager, LIMIT, |r| all_terminal(r, 1)).await;
    assert_eq!(records[0].status(), TransferStatus::Done);
    assert_eq!(fs::read(&destination).unwrap(), b"resume me");
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_restart_keeps_interrupted_copy_blocking() {
    let ws = TestWorkspace::new();
    let stuck = ws.add_source_file("1-stuck.dat", b"1");
    let behind = ws.add_source_file("2-behind.dat", b"2");

    let started = chrono::Utc::now() - chrono::Duration::seconds(10);
    let mut history = StatusHistory::new(started);
    history.record(TransferStatus::Copying, started);
    let snapshots = vec![
        TaskSnapshot {
            source: stuck.to_string_lossy().into_owned(),
            destination: ws.destination.join("1-stuck.dat").to_string_lossy().into_owned(),
            extension: ".dat".into(),
            status: TransferStatus::Copying,
            error_message: None,
            status_history: history,
        },
        TaskSnapshot {
            source: behind.to_string_lossy().into_owned(),
            destination: ws.destination.join("2-behind.dat").to_string_lossy().into_owned(),
            extension: ".dat".into(),
            status: TransferStatus::Awaiting,
            error_message: None,
            status_history: StatusHistory::new(chrono::Utc::now()),
        },
    ];
    fs::write(ws.store_path(), serde_json::to_string_pretty(&snapshots).unwrap()).unwrap();

    let manager = ws.manager();
    manager.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let records = manager.list_all().await;
    assert_eq!(records.len(), 2);
    assert_eq!(find(&records, "1-stuck.dat").status(), TransferStatus::Copying);
    assert_eq!(find(&records, "2-behind.dat").status(), TransferStatus::Awaiting);
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_corrupt_store_starts_empty() {
    let ws = TestWorkspace::new();
    fs::write(ws.store_path(), b"[{\"source\": ").unwrap();

    let manager = ws.manager();
    manager.start().await.unwrap();
    assert!(manager.list_all().await.is_empty());
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_returns_promptly_with_copies_in_flight() {
    let ws = TestWorkspace::new();
    ws.add_source_file("slow.bin", b"z");

    let manager = ws.manager_with(Arc::new(SlowOperations::new(Duration::from_secs(5))));
    manager.start().await.unwrap();
    manager.submit(ws.source_str(), ws.destination_str());
    wait_for(&manager, LIMIT, |r| {
        r.first()
            .is_some_and(|record| record.status() == TransferStatus::Copying)
    })
    .await;

    let started = std::time::Instant::now();
    manager.stop().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}
