use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// 最近使用路徑的保留數量
pub const MAX_RECENT_PATHS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

/// 匯出資料夾監看設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportWatcherSettings {
    /// 監看的匯出資料夾（空字串表示尚未設定）
    pub watch_dir: String,
    pub rename_with_timestamp: bool,
    pub use_dated_subfolder: bool,
    pub poll_interval_secs: u64,
    pub error_backoff_secs: u64,
}

impl Default for ExportWatcherSettings {
    fn default() -> Self {
        Self {
            watch_dir: String::new(),
            rename_with_timestamp: false,
            use_dated_subfolder: true,
            poll_interval_secs: 2,
            error_backoff_secs: 5,
        }
    }
}

impl ExportWatcherSettings {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    #[must_use]
    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs.max(1))
    }
}

/// 專案資料夾結構設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub folders: Vec<String>,
    /// 剪輯軟體的專案範本，建立結構時一併複製
    pub template_path: Option<PathBuf>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            folders: ["footage", "proxies", "exports", "logs"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            template_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// 複製完成後以 BLAKE3 驗證內容
    pub verify_hash: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self { verify_hash: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// env_logger 過濾字串，`RUST_LOG` 優先
    pub level: String,
    /// 設定後日誌寫入檔案而非 stderr
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    /// 素材根目錄（SD 卡匯入、專案資料夾的預設位置）
    pub raw_path: String,
    /// 成品目錄（匯出監看的預設目的地）
    pub master_path: String,
    /// 外接 SSD 的磁碟名稱
    pub ssd_name: String,
    pub video_extensions: Vec<String>,
    pub export_watcher: ExportWatcherSettings,
    pub project: ProjectSettings,
    pub import: ImportSettings,
    pub logging: LoggingSettings,
    pub recent_paths: Vec<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            raw_path: String::new(),
            master_path: String::new(),
            ssd_name: String::new(),
            video_extensions: vec![".mp4".to_string(), ".mov".to_string()],
            export_watcher: ExportWatcherSettings::default(),
            project: ProjectSettings::default(),
            import: ImportSettings::default(),
            logging: LoggingSettings::default(),
            recent_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: UserSettings,
}
