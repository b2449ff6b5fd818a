use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::path::Path;

/// 候選路徑：設定值在前，其後為最近使用的路徑（去重）
#[must_use]
pub fn candidate_paths(default: &str, recent_paths: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for path in std::iter::once(default).chain(recent_paths.iter().map(String::as_str)) {
        let path = path.trim();
        if !path.is_empty() && !candidates.iter().any(|c| c == path) {
            candidates.push(path.to_string());
        }
    }
    candidates
}

/// 選擇資料夾路徑；按 ESC 回傳 `None`
pub fn prompt_directory(prompt: &str, default: &str, recent_paths: &[String]) -> Result<Option<String>> {
    let candidates = candidate_paths(default, recent_paths);

    if candidates.is_empty() {
        return input_path(prompt).map(Some);
    }

    let mut options: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let indicator = if Path::new(p).is_dir() { "✓" } else { "✗" };
            format!("{} [{}] {}", i + 1, indicator, p)
        })
        .collect();
    options.push(t!("common.enter_new_path").to_string());

    println!("{}", style(t!("common.esc_hint")).dim());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&options)
        .default(0)
        .interact_opt()?;

    match selection {
        None => Ok(None),
        Some(idx) if idx < candidates.len() => Ok(Some(candidates[idx].clone())),
        Some(_) => input_path(prompt).map(Some),
    }
}

fn input_path(prompt: &str) -> Result<String> {
    let path: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(path.trim().to_string())
}
