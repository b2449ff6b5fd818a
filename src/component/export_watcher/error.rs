use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 匯出監看的錯誤分類
///
/// 只有 `InvalidPath` 與 `WorkerSpawn` 會阻止監看開始；
/// 其餘錯誤以事件回報，監看迴圈繼續執行。
#[derive(Debug, Error)]
pub enum WatchError {
    /// 啟動前的路徑檢查失敗
    #[error("無效的{role}資料夾 {}: {reason}", path.display())]
    InvalidPath {
        role: &'static str,
        path: PathBuf,
        reason: &'static str,
    },

    /// 單次輪詢失敗（資料夾暫時無法讀取等），退避後重試
    #[error("掃描資料夾失敗 {}: {source}", path.display())]
    PollIteration { path: PathBuf, source: io::Error },

    /// 單一檔案移動失敗，來源檔案保留原處
    #[error("無法移動 {} -> {}: {source}", source_path.display(), destination.display())]
    Relocation {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },

    #[error("無法啟動監看執行緒: {source}")]
    WorkerSpawn { source: io::Error },
}
