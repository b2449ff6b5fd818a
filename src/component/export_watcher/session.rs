use super::error::WatchError;
use super::event::WatchEvent;
use super::relocator::{RelocationOptions, relocate};
use super::snapshot::FileSnapshot;
use chrono::Local;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 等待期間檢查停止請求的間隔
const SLEEP_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Watching,
    Stopping,
}

impl WatchState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Watching => 1,
            Self::Stopping => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Watching,
            2 => Self::Stopping,
            _ => Self::Idle,
        }
    }
}

/// 呼叫端與監看執行緒共用的狀態
#[derive(Debug, Clone)]
struct SharedState(Arc<AtomicU8>);

impl SharedState {
    fn new(state: WatchState) -> Self {
        Self(Arc::new(AtomicU8::new(state.as_u8())))
    }

    fn load(&self) -> WatchState {
        WatchState::from_u8(self.0.load(Ordering::SeqCst))
    }

    fn store(&self, state: WatchState) {
        self.0.store(state.as_u8(), Ordering::SeqCst);
    }

    fn transition(&self, from: WatchState, to: WatchState) -> bool {
        self.0
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub relocation: RelocationOptions,
    pub poll_interval: Duration,
    /// 單次輪詢失敗後的等待時間
    pub error_backoff: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            relocation: RelocationOptions::default(),
            poll_interval: Duration::from_secs(2),
            error_backoff: Duration::from_secs(5),
        }
    }
}

/// 一個匯出資料夾的監看工作
///
/// 每個 session 擁有自己的執行緒與快照；呼叫端只能讀取狀態或要求停止。
/// handle 被丟棄時會要求停止，但不等待執行緒結束。
pub struct WatchSession {
    source: PathBuf,
    destination: PathBuf,
    state: SharedState,
    worker: Option<JoinHandle<()>>,
}

impl WatchSession {
    /// 驗證路徑、建立初始快照並啟動監看執行緒，立即返回
    pub fn start(
        source: &Path,
        destination: &Path,
        options: WatchOptions,
    ) -> Result<(Self, Receiver<WatchEvent>), WatchError> {
        let source = resolve_directory("來源", source)?;
        let destination = resolve_directory("目的地", destination)?;
        // 搬移後的檔案會再次出現在來源中而被重複處理
        if destination == source {
            return Err(WatchError::InvalidPath {
                role: "目的地",
                path: destination,
                reason: "與來源資料夾相同",
            });
        }

        let initial = FileSnapshot::take(&source).map_err(|e| {
            warn!("無法讀取來源資料夾 {}: {e}", source.display());
            WatchError::InvalidPath {
                role: "來源",
                path: source.clone(),
                reason: "無法讀取",
            }
        })?;

        let (events, receiver) = mpsc::channel();
        let state = SharedState::new(WatchState::Watching);

        let worker = Worker {
            source: source.clone(),
            destination: destination.clone(),
            options,
            state: state.clone(),
            events,
            previous: initial,
        };

        let handle = thread::Builder::new()
            .name("export-watcher".to_string())
            .spawn(move || worker.run())
            .map_err(|source| {
                state.store(WatchState::Idle);
                WatchError::WorkerSpawn { source }
            })?;

        Ok((
            Self {
                source,
                destination,
                state,
                worker: Some(handle),
            },
            receiver,
        ))
    }

    /// 要求停止；進行中的輪詢會正常完成。重複呼叫不會有任何效果。
    pub fn stop(&self) {
        if self.state.transition(WatchState::Watching, WatchState::Stopping) {
            info!("要求停止監看: {}", self.source.display());
        } else {
            debug!("監看已停止或正在停止: {}", self.source.display());
        }
    }

    /// 等待監看執行緒結束
    pub fn wait(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("監看執行緒異常結束: {}", self.source.display());
            }
            self.state.store(WatchState::Idle);
        }
    }

    /// 停止並等待執行緒結束
    pub fn stop_and_wait(&mut self) {
        self.stop();
        self.wait();
    }

    #[must_use]
    pub fn state(&self) -> WatchState {
        self.state.load()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == WatchState::Watching
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn resolve_directory(role: &'static str, path: &Path) -> Result<PathBuf, WatchError> {
    let invalid = |reason| WatchError::InvalidPath {
        role,
        path: path.to_path_buf(),
        reason,
    };

    if !path.exists() {
        return Err(invalid("路徑不存在"));
    }
    if !path.is_dir() {
        return Err(invalid("路徑不是資料夾"));
    }
    std::path::absolute(path).map_err(|_| invalid("無法取得絕對路徑"))
}

/// 監看執行緒：唯一持有快照並執行搬移的角色
struct Worker {
    source: PathBuf,
    destination: PathBuf,
    options: WatchOptions,
    state: SharedState,
    events: Sender<WatchEvent>,
    previous: FileSnapshot,
}

impl Worker {
    fn run(mut self) {
        info!(
            "開始監看 {} -> {}",
            self.source.display(),
            self.destination.display()
        );
        if !self.previous.is_empty() {
            info!("既有檔案 {} 個不會被處理", self.previous.len());
        }
        self.emit(WatchEvent::Started {
            source: self.source.clone(),
            existing_files: self.previous.len(),
        });

        while self.state.load() == WatchState::Watching {
            let pause = match self.poll_once() {
                Ok(()) => self.options.poll_interval,
                Err(e) => {
                    warn!("{e}");
                    self.emit(WatchEvent::Error(e));
                    self.options.error_backoff
                }
            };
            self.sleep(pause);
        }

        self.state.store(WatchState::Idle);
        info!("已停止監看: {}", self.source.display());
        self.emit(WatchEvent::Stopped);
    }

    fn poll_once(&mut self) -> Result<(), WatchError> {
        let current =
            FileSnapshot::take(&self.source).map_err(|source| WatchError::PollIteration {
                path: self.source.clone(),
                source,
            })?;

        for path in current.newly_detected(&self.previous) {
            info!("偵測到新檔案: {}", path.display());
            self.emit(WatchEvent::FileDetected(path.clone()));

            match relocate(&path, &self.destination, self.options.relocation, Local::now()) {
                Ok(record) => {
                    info!(
                        "已搬移: {} -> {}",
                        record.source.display(),
                        record.destination.display()
                    );
                    self.emit(WatchEvent::FileRelocated(record));
                }
                Err(e) => {
                    error!("{e}");
                    self.emit(WatchEvent::Error(e));
                }
            }
        }

        self.previous = current;
        Ok(())
    }

    /// 分段等待，期間收到停止請求就提早返回
    fn sleep(&self, duration: Duration) {
        let mut remaining = duration;
        while !remaining.is_zero() && self.state.load() == WatchState::Watching {
            let step = remaining.min(SLEEP_SLICE);
            thread::sleep(step);
            remaining = remaining.saturating_sub(step);
        }
    }

    fn emit(&self, event: WatchEvent) {
        // 接收端已關閉時事件直接丟棄，監看照常進行
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fast_options() -> WatchOptions {
        WatchOptions {
            poll_interval: Duration::from_millis(20),
            error_backoff: Duration::from_millis(20),
            ..WatchOptions::default()
        }
    }

    #[test]
    fn test_state_round_trip() {
        for state in [WatchState::Idle, WatchState::Watching, WatchState::Stopping] {
            assert_eq!(WatchState::from_u8(state.as_u8()), state);
        }
    }

    #[test]
    fn test_start_rejects_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let result = WatchSession::start(
            &temp_dir.path().join("missing"),
            temp_dir.path(),
            fast_options(),
        );

        assert!(matches!(
            result,
            Err(WatchError::InvalidPath { role: "來源", .. })
        ));
    }

    #[test]
    fn test_start_rejects_file_as_destination() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not_a_dir.txt");
        fs::write(&file, "x").unwrap();

        let result = WatchSession::start(temp_dir.path(), &file, fast_options());
        assert!(matches!(
            result,
            Err(WatchError::InvalidPath { role: "目的地", .. })
        ));
    }

    #[test]
    fn test_start_rejects_same_source_and_destination() {
        let temp_dir = TempDir::new().unwrap();
        let exports = temp_dir.path().join("exports");
        fs::create_dir_all(&exports).unwrap();

        let result = WatchSession::start(&exports, &exports, fast_options());
        assert!(matches!(
            result,
            Err(WatchError::InvalidPath { role: "目的地", .. })
        ));
    }

    #[test]
    fn test_start_accepts_destination_inside_source() {
        let temp_dir = TempDir::new().unwrap();
        let master = temp_dir.path().join("master");
        fs::create_dir_all(&master).unwrap();

        let (mut session, _receiver) =
            WatchSession::start(temp_dir.path(), &master, fast_options()).unwrap();
        session.stop_and_wait();
    }

    #[test]
    fn test_stop_transitions_to_idle_and_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("exports");
        let dest = temp_dir.path().join("master");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();

        let (mut session, receiver) = WatchSession::start(&source, &dest, fast_options()).unwrap();
        assert!(session.is_running());

        session.stop();
        assert_ne!(session.state(), WatchState::Watching);
        session.stop();
        session.wait();
        assert_eq!(session.state(), WatchState::Idle);

        session.stop();
        session.wait();
        assert_eq!(session.state(), WatchState::Idle);

        let events: Vec<WatchEvent> = receiver.try_iter().collect();
        assert!(matches!(events.first(), Some(WatchEvent::Started { existing_files: 0, .. })));
        assert!(matches!(events.last(), Some(WatchEvent::Stopped)));
    }
}
