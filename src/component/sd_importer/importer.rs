use crate::tools::{FileInfo, date_folder_name, ensure_directory_exists, files_match};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const COPY_CHUNK_SIZE: usize = 1024 * 1024; // 1MB

/// 匯入結果
#[derive(Debug, Default)]
pub struct ImportResult {
    pub copied: usize,
    /// 目標已存在且大小相同
    pub skipped: usize,
    pub errors: usize,
    /// 通過雜湊驗證的檔案數
    pub verified: usize,
    pub bytes_copied: u64,
    pub cancelled: bool,
}

/// `<素材根目錄>/<YYYY-MM-DD>/footage`
#[must_use]
pub fn import_destination(raw_path: &Path, date: NaiveDate) -> PathBuf {
    raw_path.join(date_folder_name(date)).join("footage")
}

/// 從記憶卡複製素材
pub struct FootageImporter {
    shutdown_signal: Arc<AtomicBool>,
    verify_hash: bool,
}

impl FootageImporter {
    pub const fn new(shutdown_signal: Arc<AtomicBool>, verify_hash: bool) -> Self {
        Self {
            shutdown_signal,
            verify_hash,
        }
    }

    pub fn import(&self, files: &[FileInfo], destination: &Path) -> Result<ImportResult> {
        ensure_directory_exists(destination)?;
        info!(
            "開始匯入 {} 個檔案到 {}",
            files.len(),
            destination.display()
        );

        let mut result = ImportResult::default();
        let mut copied_pairs: Vec<(PathBuf, PathBuf)> = Vec::new();

        let total_bytes: u64 = files.iter().map(|f| f.size).sum();
        let progress_bar = ProgressBar::new(total_bytes);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}")?
                .progress_chars("#>-"),
        );

        for file in files {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，停止匯入");
                progress_bar.abandon_with_message("已中斷");
                result.cancelled = true;
                break;
            }

            let Some(file_name) = file.path.file_name() else {
                continue;
            };
            progress_bar.set_message(file_name.to_string_lossy().into_owned());

            let target = match resolve_target(destination, Path::new(file_name), file.size) {
                ImportTarget::AlreadyImported(existing) => {
                    debug!("跳過已匯入的檔案: {}", existing.display());
                    result.skipped += 1;
                    progress_bar.inc(file.size);
                    continue;
                }
                ImportTarget::New(target) => target,
            };
            match copy_with_progress(&file.path, &target, &progress_bar) {
                Ok(bytes) => {
                    debug!("已複製: {} -> {}", file.path.display(), target.display());
                    result.copied += 1;
                    result.bytes_copied += bytes;
                    copied_pairs.push((file.path.clone(), target));
                }
                Err(e) => {
                    error!("複製失敗 {}: {e:#}", file.path.display());
                    result.errors += 1;
                    if target.exists() {
                        if let Err(e) = fs::remove_file(&target) {
                            warn!("無法刪除不完整的複本 {}: {e}", target.display());
                        }
                    }
                }
            }
        }

        if !result.cancelled {
            progress_bar.finish_with_message("完成");
        }

        if self.verify_hash && !copied_pairs.is_empty() {
            self.verify_copies(&copied_pairs, &mut result);
        }

        info!(
            "匯入完成 - 複製: {}, 跳過: {}, 失敗: {}, 驗證: {}",
            result.copied, result.skipped, result.errors, result.verified
        );
        Ok(result)
    }

    /// 平行比對來源與複本；不一致的複本會被刪除並計為失敗
    fn verify_copies(&self, pairs: &[(PathBuf, PathBuf)], result: &mut ImportResult) {
        info!("驗證 {} 個複本", pairs.len());

        let mismatched: Vec<&(PathBuf, PathBuf)> = pairs
            .par_iter()
            .filter(|(source, copy)| match files_match(source, copy) {
                Ok(same) => !same,
                Err(e) => {
                    warn!("無法驗證 {}: {e:#}", copy.display());
                    true
                }
            })
            .collect();

        result.verified = pairs.len() - mismatched.len();

        for (source, copy) in mismatched {
            error!("複本內容不一致: {} -> {}", source.display(), copy.display());
            if let Err(e) = fs::remove_file(copy) {
                warn!("無法刪除不一致的複本 {}: {e}", copy.display());
            }
            result.copied -= 1;
            result.errors += 1;
        }
    }
}

enum ImportTarget {
    /// 同名（或先前改名的）複本已存在且大小相同
    AlreadyImported(PathBuf),
    New(PathBuf),
}

/// 依序檢查 `<檔名>`、`<主檔名>_1.<副檔名>`、`<主檔名>_2.<副檔名>`...
///
/// 任一既有候選大小相同即視為已匯入；否則使用第一個不存在的名稱。
fn resolve_target(destination: &Path, file_name: &Path, size: u64) -> ImportTarget {
    let mut index = 0;
    loop {
        let candidate = destination.join(candidate_name(file_name, index));
        match fs::metadata(&candidate) {
            Ok(metadata) if metadata.len() == size => {
                return ImportTarget::AlreadyImported(candidate);
            }
            Ok(_) => index += 1,
            Err(_) => return ImportTarget::New(candidate),
        }
    }
}

/// 第 0 個候選為原檔名，其後為 `<主檔名>_<n>.<副檔名>`
fn candidate_name(file_name: &Path, index: usize) -> OsString {
    if index == 0 {
        return file_name.as_os_str().to_os_string();
    }

    let mut name = file_name.file_stem().map(OsString::from).unwrap_or_default();
    name.push(format!("_{index}"));
    if let Some(ext) = file_name.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

fn copy_with_progress(source: &Path, target: &Path, progress_bar: &ProgressBar) -> Result<u64> {
    let input = File::open(source).with_context(|| format!("無法開啟檔案: {}", source.display()))?;
    let output =
        File::create(target).with_context(|| format!("無法建立檔案: {}", target.display()))?;

    let mut reader = BufReader::with_capacity(COPY_CHUNK_SIZE, input);
    let mut writer = BufWriter::with_capacity(COPY_CHUNK_SIZE, output);
    let mut buffer = vec![0u8; COPY_CHUNK_SIZE];
    let mut copied = 0u64;

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("讀取檔案失敗: {}", source.display()))?;
        if bytes_read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..bytes_read])
            .with_context(|| format!("寫入檔案失敗: {}", target.display()))?;
        copied += bytes_read as u64;
        progress_bar.inc(bytes_read as u64);
    }

    writer
        .flush()
        .with_context(|| format!("寫入檔案失敗: {}", target.display()))?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_info(path: PathBuf) -> FileInfo {
        let size = fs::metadata(&path).unwrap().len();
        FileInfo { path, size }
    }

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let card = temp_dir.path().join("card");
        let dest = temp_dir.path().join("raw/2024-05-01/footage");
        fs::create_dir_all(&card).unwrap();
        (temp_dir, card, dest)
    }

    #[test]
    fn test_import_destination() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            import_destination(Path::new("/raw"), date),
            PathBuf::from("/raw/2024-05-01/footage")
        );
    }

    #[test]
    fn test_import_copies_and_verifies() {
        let (_temp_dir, card, dest) = setup();
        fs::write(card.join("C0001.MP4"), "clip one").unwrap();
        fs::write(card.join("C0002.MP4"), "clip two!").unwrap();
        let files = vec![
            file_info(card.join("C0001.MP4")),
            file_info(card.join("C0002.MP4")),
        ];

        let importer = FootageImporter::new(Arc::new(AtomicBool::new(false)), true);
        let result = importer.import(&files, &dest).unwrap();

        assert_eq!(result.copied, 2);
        assert_eq!(result.verified, 2);
        assert_eq!(result.errors, 0);
        assert_eq!(result.bytes_copied, 17);
        assert_eq!(fs::read_to_string(dest.join("C0001.MP4")).unwrap(), "clip one");
        // 匯入是複製，來源保留
        assert!(card.join("C0001.MP4").exists());
    }

    #[test]
    fn test_import_skips_already_imported() {
        let (_temp_dir, card, dest) = setup();
        fs::write(card.join("C0001.MP4"), "clip one").unwrap();
        let files = vec![file_info(card.join("C0001.MP4"))];

        let importer = FootageImporter::new(Arc::new(AtomicBool::new(false)), false);
        importer.import(&files, &dest).unwrap();
        let second = importer.import(&files, &dest).unwrap();

        assert_eq!(second.copied, 0);
        assert_eq!(second.skipped, 1);
    }

    #[test]
    fn test_import_renames_on_name_collision() {
        let (_temp_dir, card, dest) = setup();
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("C0001.MP4"), "other camera").unwrap();
        fs::write(card.join("C0001.MP4"), "clip one").unwrap();
        let files = vec![file_info(card.join("C0001.MP4"))];

        let importer = FootageImporter::new(Arc::new(AtomicBool::new(false)), false);
        let result = importer.import(&files, &dest).unwrap();

        assert_eq!(result.copied, 1);
        assert_eq!(fs::read_to_string(dest.join("C0001.MP4")).unwrap(), "other camera");
        assert_eq!(fs::read_to_string(dest.join("C0001_1.MP4")).unwrap(), "clip one");
    }

    #[test]
    fn test_reimport_after_collision_skips_renamed_copy() {
        let (_temp_dir, card, dest) = setup();
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("C0001.MP4"), "other camera").unwrap();
        fs::write(card.join("C0001.MP4"), "clip one").unwrap();
        let files = vec![file_info(card.join("C0001.MP4"))];

        let importer = FootageImporter::new(Arc::new(AtomicBool::new(false)), false);
        importer.import(&files, &dest).unwrap();
        let second = importer.import(&files, &dest).unwrap();

        assert_eq!(second.copied, 0);
        assert_eq!(second.skipped, 1);
        assert!(!dest.join("C0001_2.MP4").exists());
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_candidate_name_keeps_non_utf8_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = Path::new(OsStr::from_bytes(b"C\xff01.MP4"));
        assert_eq!(candidate_name(name, 0).as_bytes(), b"C\xff01.MP4");
        assert_eq!(candidate_name(name, 2).as_bytes(), b"C\xff01_2.MP4");
    }

    #[test]
    fn test_import_stops_on_shutdown() {
        let (_temp_dir, card, dest) = setup();
        fs::write(card.join("C0001.MP4"), "clip one").unwrap();
        let files = vec![file_info(card.join("C0001.MP4"))];

        let importer = FootageImporter::new(Arc::new(AtomicBool::new(true)), true);
        let result = importer.import(&files, &dest).unwrap();

        assert!(result.cancelled);
        assert_eq!(result.copied, 0);
        assert!(!dest.join("C0001.MP4").exists());
    }

    #[test]
    fn test_missing_source_counts_as_error() {
        let (_temp_dir, card, dest) = setup();
        let files = vec![FileInfo {
            path: card.join("pulled_out.MP4"),
            size: 10,
        }];

        let importer = FootageImporter::new(Arc::new(AtomicBool::new(false)), true);
        let result = importer.import(&files, &dest).unwrap();

        assert_eq!(result.errors, 1);
        assert_eq!(result.copied, 0);
        assert!(!dest.join("pulled_out.MP4").exists());
    }
}
