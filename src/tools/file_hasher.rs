use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 4 * 1024 * 1024; // 4MB buffer

pub fn calculate_file_hash(path: &Path) -> Result<blake3::Hash> {
    let file = File::open(path).with_context(|| format!("無法開啟檔案: {}", path.display()))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("讀取檔案失敗: {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// 比對兩個檔案內容是否相同（大小不同時不計算雜湊）
pub fn files_match(source: &Path, copy: &Path) -> Result<bool> {
    let source_len = std::fs::metadata(source)
        .with_context(|| format!("無法讀取檔案資訊: {}", source.display()))?
        .len();
    let copy_len = std::fs::metadata(copy)
        .with_context(|| format!("無法讀取檔案資訊: {}", copy.display()))?
        .len();
    if source_len != copy_len {
        return Ok(false);
    }

    Ok(calculate_file_hash(source)? == calculate_file_hash(copy)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file_with(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_identical_files_match() {
        let a = temp_file_with(b"identical content");
        let b = temp_file_with(b"identical content");
        assert!(files_match(a.path(), b.path()).unwrap());
    }

    #[test]
    fn test_same_size_different_content() {
        let a = temp_file_with(b"content A");
        let b = temp_file_with(b"content B");
        assert!(!files_match(a.path(), b.path()).unwrap());
    }

    #[test]
    fn test_truncated_copy_does_not_match() {
        let a = temp_file_with(b"full footage");
        let b = temp_file_with(b"full");
        assert!(!files_match(a.path(), b.path()).unwrap());
    }
}
