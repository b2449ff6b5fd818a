use chrono::{NaiveDate, NaiveDateTime};
use std::ffi::OsString;
use std::path::Path;

/// 日期資料夾名稱，例如 `2024-05-01`
#[must_use]
pub fn date_folder_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 檔名時間戳記，例如 `20240501_100000`
fn timestamp_suffix(at: NaiveDateTime) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// 在主檔名後附加時間戳記，保留原副檔名
///
/// `clip.mov` -> `clip_20240501_100000.mov`，沒有副檔名時只附加時間戳記。
/// 主檔名與副檔名按原始位元組保留，非 UTF-8 的名稱不會被改寫。
#[must_use]
pub fn timestamped_file_name(file_name: &Path, at: NaiveDateTime) -> OsString {
    let mut name = file_name.file_stem().map(OsString::from).unwrap_or_default();
    name.push("_");
    name.push(timestamp_suffix(at));

    if let Some(ext) = file_name.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}
