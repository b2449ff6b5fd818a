use crate::config::LoggingSettings;
use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};

/// 初始化 env_logger
///
/// `RUST_LOG` 優先於設定檔的 `logging.level`；
/// 設定了 `logging.file_path` 時改寫入檔案（附加模式）。
pub fn init(settings: &LoggingSettings) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(settings.level.as_str()));
    builder.format_timestamp_secs();

    if let Some(path) = &settings.file_path {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("無法建立日誌資料夾: {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("無法開啟日誌檔案: {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("日誌系統已初始化")?;
    Ok(())
}
