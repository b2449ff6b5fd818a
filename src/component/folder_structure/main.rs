use super::structure_builder::{ProjectLayout, ProjectRequest, create_project_structure};
use crate::component::prompt::prompt_directory;
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect};
use log::{info, warn};
use rust_i18n::t;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 專案資料夾結構元件
pub struct FolderStructureCreator {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl FolderStructureCreator {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style(t!("project.title")).cyan().bold());

        let Some(base_dir) = prompt_directory(
            &t!("project.prompt_base"),
            &self.config.settings.raw_path,
            &self.config.settings.recent_paths,
        )?
        else {
            return Ok(());
        };

        let project_name: String = Input::new()
            .with_prompt(t!("project.prompt_name"))
            .interact_text()?;

        let date = self.prompt_date()?;

        let Some(folders) = self.prompt_folders()? else {
            return Ok(());
        };

        let request = ProjectRequest {
            base_dir: PathBuf::from(&base_dir),
            date,
            project_name,
            folders,
            template_path: self.config.settings.project.template_path.clone(),
        };

        let layout = create_project_structure(&request, &self.shutdown_signal)?;
        if layout.cancelled {
            self.shutdown_signal.store(false, Ordering::SeqCst);
        }

        self.remember_base_dir(&base_dir);
        Self::print_result(&layout);
        Ok(())
    }

    fn prompt_date(&self) -> Result<NaiveDate> {
        let today = Local::now().date_naive();
        let use_today = Confirm::new()
            .with_prompt(t!("project.prompt_use_today", date = today.format("%Y-%m-%d")))
            .default(true)
            .interact()?;
        if use_today {
            return Ok(today);
        }

        let input: String = Input::new()
            .with_prompt(t!("project.prompt_date"))
            .validate_with(|input: &String| -> Result<(), String> {
                NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
                    .map(|_| ())
                    .map_err(|_| t!("project.invalid_date").to_string())
            })
            .interact_text()?;

        Ok(NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")?)
    }

    fn prompt_folders(&self) -> Result<Option<Vec<String>>> {
        let folders = &self.config.settings.project.folders;
        let defaults = vec![true; folders.len()];

        let selection = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("project.prompt_folders"))
            .items(folders)
            .defaults(&defaults)
            .interact_opt()?;

        Ok(selection.map(|indices| indices.into_iter().map(|i| folders[i].clone()).collect()))
    }

    fn remember_base_dir(&mut self, base_dir: &str) {
        let settings = &mut self.config.settings;
        add_recent_path(settings, base_dir);
        if let Err(e) = save_settings(settings) {
            warn!("無法儲存路徑歷史: {e}");
        }
    }

    fn print_result(layout: &ProjectLayout) {
        println!();
        println!(
            "{}",
            style(t!("project.created", path = layout.project_dir.display())).green()
        );
        for folder in &layout.created_folders {
            println!("  {} {}", style("✓").green(), folder.display());
        }
        if let Some(template) = &layout.template_copied {
            println!(
                "  {} {}",
                style("✓").green(),
                t!("project.template_copied", path = template.display())
            );
        }
        if layout.cancelled {
            println!("  {}", style(t!("common.interrupted")).yellow());
        }

        info!(
            "專案結構建立完成: {} ({} 個子資料夾)",
            layout.project_dir.display(),
            layout.created_folders.len()
        );
    }
}
