use log::debug;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 某一時刻監看資料夾第一層的一般檔案
///
/// 只看第一層：子資料夾與其內容一律忽略。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSnapshot {
    paths: HashSet<PathBuf>,
}

impl FileSnapshot {
    /// 掃描資料夾；資料夾本身無法讀取時回傳錯誤，
    /// 個別項目在掃描途中消失則略過。
    pub fn take(directory: &Path) -> io::Result<Self> {
        let mut paths = HashSet::new();

        for entry in WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
        {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    paths.insert(entry.into_path());
                }
                Ok(_) => {}
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => debug!("略過無法讀取的項目: {e}"),
            }
        }

        Ok(Self { paths })
    }

    /// `self - previous`，按路徑排序
    #[must_use]
    pub fn newly_detected(&self, previous: &Self) -> Vec<PathBuf> {
        let mut new_paths: Vec<PathBuf> = self.paths.difference(&previous.paths).cloned().collect();
        new_paths.sort();
        new_paths
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<PathBuf> for FileSnapshot {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}
