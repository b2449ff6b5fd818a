use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
}

/// 將設定中的副檔名（`.mp4`、`MOV`）正規化為不含點的小寫
#[must_use]
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[must_use]
pub fn has_extension(path: &Path, normalized: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| normalized.iter().any(|e| e == &ext.to_lowercase()))
}

/// 遞迴掃描目錄下符合副檔名的檔案，按路徑排序
pub fn scan_files_with_extensions(directory: &Path, extensions: &[String]) -> Result<Vec<FileInfo>> {
    let normalized = normalize_extensions(extensions);

    let mut files: Vec<FileInfo> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), &normalized))
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            Some(FileInfo {
                path: entry.into_path(),
                size: metadata.len(),
            })
        })
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
