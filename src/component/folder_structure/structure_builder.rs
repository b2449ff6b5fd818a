use crate::tools::{date_folder_name, validate_directory_exists};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use log::{info, warn};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

static REGEX_ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("Invalid regex"));

static REGEX_MULTIPLE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// 將專案名稱中不能作為資料夾名稱的字元換成 `_`
#[must_use]
pub fn sanitize_project_name(name: &str) -> String {
    let replaced = REGEX_ILLEGAL_CHARS.replace_all(name.trim(), "_");
    let collapsed = REGEX_MULTIPLE_SPACES.replace_all(&replaced, " ");
    collapsed.trim_matches(|c: char| c == '.' || c.is_whitespace()).to_string()
}

/// 建立專案結構的參數
#[derive(Debug, Clone)]
pub struct ProjectRequest {
    pub base_dir: PathBuf,
    pub date: NaiveDate,
    pub project_name: String,
    pub folders: Vec<String>,
    pub template_path: Option<PathBuf>,
}

/// 建立完成的專案結構
#[derive(Debug, Default)]
pub struct ProjectLayout {
    pub project_dir: PathBuf,
    pub created_folders: Vec<PathBuf>,
    pub template_copied: Option<PathBuf>,
    pub cancelled: bool,
}

impl ProjectRequest {
    /// `<base>/<YYYY-MM-DD>/<專案名稱>`
    pub fn project_dir(&self) -> Result<PathBuf> {
        let name = sanitize_project_name(&self.project_name);
        if name.is_empty() {
            bail!("專案名稱不可為空");
        }
        Ok(self.base_dir.join(date_folder_name(self.date)).join(name))
    }
}

/// 建立專案資料夾結構，已存在的資料夾會保留
pub fn create_project_structure(
    request: &ProjectRequest,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<ProjectLayout> {
    validate_directory_exists(&request.base_dir)?;
    if request.folders.iter().all(|f| f.trim().is_empty()) {
        bail!("至少需要選擇一個子資料夾");
    }

    let project_dir = request.project_dir()?;
    fs::create_dir_all(&project_dir)
        .with_context(|| format!("無法建立專案資料夾: {}", project_dir.display()))?;
    info!("建立專案資料夾: {}", project_dir.display());

    let mut layout = ProjectLayout {
        project_dir,
        ..ProjectLayout::default()
    };

    for folder in request.folders.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        if shutdown_signal.load(Ordering::SeqCst) {
            warn!("收到中斷訊號，停止建立資料夾");
            layout.cancelled = true;
            return Ok(layout);
        }

        let folder_path = layout.project_dir.join(sanitize_project_name(folder));
        fs::create_dir_all(&folder_path)
            .with_context(|| format!("無法建立資料夾: {}", folder_path.display()))?;
        info!("建立資料夾: {}", folder_path.display());
        layout.created_folders.push(folder_path);
    }

    if let Some(template) = &request.template_path {
        layout.template_copied = copy_template(template, &layout.project_dir)?;
    }

    Ok(layout)
}

/// 複製專案範本；範本不存在只記錄警告
fn copy_template(template: &Path, project_dir: &Path) -> Result<Option<PathBuf>> {
    if !template.is_file() {
        warn!("找不到專案範本: {}", template.display());
        return Ok(None);
    }
    let Some(file_name) = template.file_name() else {
        return Ok(None);
    };

    let target = project_dir.join(file_name);
    if target.exists() {
        info!("專案範本已存在: {}", target.display());
        return Ok(Some(target));
    }

    fs::copy(template, &target).with_context(|| {
        format!(
            "複製專案範本失敗: {} -> {}",
            template.display(),
            target.display()
        )
    })?;
    info!("已複製專案範本: {}", target.display());
    Ok(Some(target))
}
