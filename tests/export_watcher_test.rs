//! 匯出監看整合測試 - 以真實執行緒與暫存資料夾驗證監看流程

use std::fs;
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use chrono::Local;
use regex::Regex;
use tempfile::TempDir;
use video_workflow::component::export_watcher::{
    RelocationOptions, WatchError, WatchEvent, WatchOptions, WatchSession, WatchState,
};
use video_workflow::tools::date_folder_name;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn options(relocation: RelocationOptions) -> WatchOptions {
    WatchOptions {
        relocation,
        poll_interval: Duration::from_millis(25),
        error_backoff: Duration::from_millis(25),
    }
}

fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("exports");
    let dest = temp_dir.path().join("master");
    fs::create_dir_all(&source).unwrap();
    fs::create_dir_all(&dest).unwrap();
    (temp_dir, source, dest)
}

/// 收集事件直到 `done` 成立或逾時
fn collect_until(
    receiver: &Receiver<WatchEvent>,
    done: impl Fn(&[WatchEvent]) -> bool,
) -> Vec<WatchEvent> {
    let deadline = Instant::now() + EVENT_TIMEOUT;
    let mut events = Vec::new();
    while !done(events.as_slice()) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(remaining) {
            Ok(event) => events.push(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
        }
    }
    events
}

fn count(events: &[WatchEvent], pred: impl Fn(&WatchEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// 啟動前已存在的檔案不會被處理，只有新檔案會被搬移
#[test]
fn test_only_new_files_are_relocated() {
    let (_temp_dir, source, dest) = setup();
    fs::write(source.join("video1.mp4"), "old").unwrap();

    let (mut session, receiver) =
        WatchSession::start(&source, &dest, options(RelocationOptions::default())).unwrap();

    let started = collect_until(&receiver, |e| !e.is_empty());
    assert!(matches!(
        started.first(),
        Some(WatchEvent::Started {
            existing_files: 1,
            ..
        })
    ));

    fs::write(source.join("video2.mp4"), "new").unwrap();
    let events = collect_until(&receiver, |e| {
        e.iter().any(|e| matches!(e, WatchEvent::FileRelocated(_)))
    });

    // 再等幾個輪詢週期，確認不會重複處理
    std::thread::sleep(Duration::from_millis(200));
    session.stop_and_wait();
    let mut events = events;
    events.extend(receiver.try_iter());

    let detected: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            WatchEvent::FileDetected(path) => Some(file_name(path)),
            _ => None,
        })
        .collect();
    assert_eq!(detected, vec!["video2.mp4".to_string()]);
    assert_eq!(
        count(&events, |e| matches!(e, WatchEvent::FileRelocated(_))),
        1
    );
    assert!(matches!(events.last(), Some(WatchEvent::Stopped)));

    assert!(source.join("video1.mp4").exists());
    assert!(!source.join("video2.mp4").exists());
    assert_eq!(fs::read_to_string(dest.join("video2.mp4")).unwrap(), "new");
}

/// 加上時間戳記並放入日期資料夾
#[test]
fn test_rename_and_dated_subfolder() {
    let (_temp_dir, source, dest) = setup();
    let relocation = RelocationOptions {
        rename_with_timestamp: true,
        use_dated_subfolder: true,
    };
    let (mut session, receiver) = WatchSession::start(&source, &dest, options(relocation)).unwrap();

    fs::write(source.join("final_cut.mov"), "render").unwrap();
    let events = collect_until(&receiver, |e| {
        e.iter().any(|e| matches!(e, WatchEvent::FileRelocated(_)))
    });
    session.stop_and_wait();

    let record = events
        .iter()
        .find_map(|e| match e {
            WatchEvent::FileRelocated(record) => Some(record),
            _ => None,
        })
        .expect("應該有搬移紀錄");

    let folder = record.destination.parent().unwrap();
    assert_eq!(
        file_name(folder),
        date_folder_name(record.timestamp.date_naive())
    );
    assert_eq!(folder.parent().unwrap(), std::path::absolute(&dest).unwrap());

    let pattern = Regex::new(r"^final_cut_\d{8}_\d{6}\.mov$").unwrap();
    assert!(pattern.is_match(&file_name(&record.destination)));
    assert_eq!(fs::read_to_string(&record.destination).unwrap(), "render");
    assert!(record.timestamp <= Local::now());
}

/// 目的地在監看中被刪除：回報搬移錯誤、來源檔保留，監看持續進行
#[test]
fn test_missing_destination_reports_error_and_keeps_watching() {
    let (_temp_dir, source, dest) = setup();
    let (mut session, receiver) =
        WatchSession::start(&source, &dest, options(RelocationOptions::default())).unwrap();
    collect_until(&receiver, |e| !e.is_empty());

    fs::remove_dir_all(&dest).unwrap();
    fs::write(source.join("first.mp4"), "a").unwrap();
    let first = collect_until(&receiver, |e| {
        e.iter().any(|e| matches!(e, WatchEvent::Error(_)))
    });
    assert!(first.iter().any(|e| matches!(
        e,
        WatchEvent::Error(WatchError::Relocation { source_path, .. })
            if file_name(source_path) == "first.mp4"
    )));
    assert!(session.is_running());

    fs::write(source.join("second.mp4"), "b").unwrap();
    let second = collect_until(&receiver, |e| {
        e.iter().any(|e| matches!(e, WatchEvent::Error(_)))
    });
    session.stop_and_wait();

    assert!(second.iter().any(|e| matches!(
        e,
        WatchEvent::FileDetected(path) if file_name(path) == "second.mp4"
    )));
    assert!(source.join("first.mp4").exists());
    assert!(source.join("second.mp4").exists());
    assert!(!dest.exists());
}

/// 子資料夾不會被當成新檔案
#[test]
fn test_subdirectories_are_ignored() {
    let (_temp_dir, source, dest) = setup();
    let (mut session, receiver) =
        WatchSession::start(&source, &dest, options(RelocationOptions::default())).unwrap();

    fs::create_dir_all(source.join("renders")).unwrap();
    fs::write(source.join("renders/nested.mp4"), "x").unwrap();
    fs::write(source.join("top.mp4"), "y").unwrap();

    let events = collect_until(&receiver, |e| {
        e.iter().any(|e| matches!(e, WatchEvent::FileRelocated(_)))
    });
    std::thread::sleep(Duration::from_millis(150));
    session.stop_and_wait();
    let mut events = events;
    events.extend(receiver.try_iter());

    let detected: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            WatchEvent::FileDetected(path) => Some(file_name(path)),
            _ => None,
        })
        .collect();
    assert_eq!(detected, vec!["top.mp4".to_string()]);
    assert!(source.join("renders/nested.mp4").exists());
}

/// 停止可以重複呼叫，之後不再有任何事件
#[test]
fn test_stop_is_idempotent() {
    let (_temp_dir, source, dest) = setup();
    let (mut session, receiver) =
        WatchSession::start(&source, &dest, options(RelocationOptions::default())).unwrap();

    session.stop();
    session.stop();
    session.wait();
    session.stop_and_wait();
    assert_eq!(session.state(), WatchState::Idle);

    let events: Vec<WatchEvent> = receiver.try_iter().collect();
    assert_eq!(count(&events, |e| matches!(e, WatchEvent::Stopped)), 1);

    fs::write(source.join("late.mp4"), "z").unwrap();
    std::thread::sleep(Duration::from_millis(100));
    assert!(receiver.try_recv().is_err());
    assert!(source.join("late.mp4").exists());
}

/// 來源資料夾暫時消失：回報掃描錯誤後退避重試，恢復後繼續搬移
#[test]
fn test_poll_failure_recovers_after_backoff() {
    let (_temp_dir, source, dest) = setup();
    let (mut session, receiver) =
        WatchSession::start(&source, &dest, options(RelocationOptions::default())).unwrap();
    collect_until(&receiver, |e| !e.is_empty());

    fs::remove_dir_all(&source).unwrap();
    let failed = collect_until(&receiver, |e| {
        e.iter().any(|e| matches!(e, WatchEvent::Error(_)))
    });
    assert!(failed.iter().any(|e| matches!(
        e,
        WatchEvent::Error(WatchError::PollIteration { .. })
    )));
    assert!(session.is_running());

    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("after.mp4"), "back").unwrap();
    let recovered = collect_until(&receiver, |e| {
        e.iter().any(|e| matches!(e, WatchEvent::FileRelocated(_)))
    });
    session.stop_and_wait();

    assert!(recovered.iter().any(|e| matches!(
        e,
        WatchEvent::FileRelocated(record) if file_name(&record.source) == "after.mp4"
    )));
    assert_eq!(fs::read_to_string(dest.join("after.mp4")).unwrap(), "back");
}
