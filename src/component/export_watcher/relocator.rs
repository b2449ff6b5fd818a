use super::error::WatchError;
use super::event::RelocationRecord;
use crate::tools::{date_folder_name, timestamped_file_name};
use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelocationOptions {
    /// `<主檔名>_<YYYYMMDD_HHMMSS>.<副檔名>`
    pub rename_with_timestamp: bool,
    /// 放入 `<目的地>/<YYYY-MM-DD>/`
    pub use_dated_subfolder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationPlan {
    pub folder: PathBuf,
    pub destination: PathBuf,
}

#[must_use]
pub fn plan_relocation(
    source_file: &Path,
    destination_root: &Path,
    options: RelocationOptions,
    now: NaiveDateTime,
) -> RelocationPlan {
    let folder = if options.use_dated_subfolder {
        destination_root.join(date_folder_name(now.date()))
    } else {
        destination_root.to_path_buf()
    };

    let file_name = source_file.file_name().map(Path::new).unwrap_or(source_file);
    let destination = if options.rename_with_timestamp {
        folder.join(timestamped_file_name(file_name, now))
    } else {
        folder.join(file_name)
    };

    RelocationPlan {
        folder,
        destination,
    }
}

/// 將偵測到的檔案搬到目的地
///
/// 只用 rename，不做複製後刪除：跨檔案系統的搬移會失敗並回報錯誤。
/// 日期資料夾只建立一層，目的地本身被刪除時不會被重建。
/// 目標檔案已存在時不覆寫。
pub fn relocate(
    source_file: &Path,
    destination_root: &Path,
    options: RelocationOptions,
    now: DateTime<Local>,
) -> Result<RelocationRecord, WatchError> {
    let plan = plan_relocation(source_file, destination_root, options, now.naive_local());
    let fail = |source: io::Error| WatchError::Relocation {
        source_path: source_file.to_path_buf(),
        destination: plan.destination.clone(),
        source,
    };

    if options.use_dated_subfolder {
        match fs::create_dir(&plan.folder) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists && plan.folder.is_dir() => {}
            Err(e) => return Err(fail(e)),
        }
    }

    if plan.destination.exists() {
        return Err(fail(io::Error::new(
            ErrorKind::AlreadyExists,
            "目標檔案已存在",
        )));
    }

    fs::rename(source_file, &plan.destination).map_err(fail)?;

    Ok(RelocationRecord {
        source: source_file.to_path_buf(),
        destination: plan.destination,
        timestamp: now,
    })
}
