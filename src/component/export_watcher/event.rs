use super::error::WatchError;
use chrono::{DateTime, Local};
use std::path::PathBuf;

/// 一次成功的搬移
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub timestamp: DateTime<Local>,
}

/// 監看執行緒送出的事件
#[derive(Debug)]
pub enum WatchEvent {
    /// 初始快照完成，`existing_files` 為啟動前既有的檔案數（不會被處理）
    Started {
        source: PathBuf,
        existing_files: usize,
    },
    FileDetected(PathBuf),
    FileRelocated(RelocationRecord),
    Error(WatchError),
    Stopped,
}
