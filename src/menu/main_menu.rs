use crate::config::save::save_settings;
use crate::config::types::{Config, Language};
use crate::menu::handlers::{
    run_export_watcher, run_folder_structure, run_media_list, run_sd_importer,
};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use rust_i18n::t;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_watcher"),
        t!("main_menu.opt_importer"),
        t!("main_menu.opt_project"),
        t!("main_menu.opt_media"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_export_watcher(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_sd_importer(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) => {
            run_folder_structure(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(3) => {
            run_media_list(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(4) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(5) | None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_paths"),
            t!("settings.opt_watcher"),
            t!("settings.opt_import"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_paths_menu(term, config)?,
            Some(1) => show_watcher_settings_menu(term, config)?,
            Some(2) => show_import_settings_menu(term, config)?,
            Some(3) => show_language_menu(term, config)?,
            Some(4) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn input_with_default(prompt: &str, current: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn saved_notice() -> Result<()> {
    println!("\n{}", style(t!("settings.saved")).green());
    std::thread::sleep(std::time::Duration::from_secs(1));
    Ok(())
}

/// 路徑設定選單
fn show_paths_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;
    println!("{}", style(t!("settings.paths.title")).cyan().bold());

    let settings = &mut config.settings;
    settings.raw_path = input_with_default(&t!("settings.paths.raw"), &settings.raw_path)?;
    settings.master_path = input_with_default(&t!("settings.paths.master"), &settings.master_path)?;
    settings.ssd_name = input_with_default(&t!("settings.paths.ssd"), &settings.ssd_name)?;

    let template = settings
        .project
        .template_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let template = input_with_default(&t!("settings.paths.template"), &template)?;
    settings.project.template_path = (!template.is_empty()).then(|| PathBuf::from(template));

    save_settings(settings)?;
    saved_notice()
}

/// 匯出監看預設值
fn show_watcher_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;
    println!("{}", style(t!("settings.watcher.title")).cyan().bold());

    let watcher = &mut config.settings.export_watcher;
    watcher.rename_with_timestamp = Confirm::new()
        .with_prompt(t!("watcher.prompt_rename"))
        .default(watcher.rename_with_timestamp)
        .interact()?;
    watcher.use_dated_subfolder = Confirm::new()
        .with_prompt(t!("watcher.prompt_dated"))
        .default(watcher.use_dated_subfolder)
        .interact()?;
    watcher.poll_interval_secs = Input::new()
        .with_prompt(t!("settings.watcher.poll_interval"))
        .default(watcher.poll_interval_secs)
        .interact_text()?;
    watcher.error_backoff_secs = Input::new()
        .with_prompt(t!("settings.watcher.error_backoff"))
        .default(watcher.error_backoff_secs)
        .interact_text()?;

    save_settings(&config.settings)?;
    saved_notice()
}

/// 匯入設定
fn show_import_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;
    println!("{}", style(t!("settings.import.title")).cyan().bold());

    let settings = &mut config.settings;
    settings.import.verify_hash = Confirm::new()
        .with_prompt(t!("settings.import.verify"))
        .default(settings.import.verify_hash)
        .interact()?;

    let extensions = input_with_default(
        &t!("settings.import.extensions"),
        &settings.video_extensions.join(", "),
    )?;
    let extensions: Vec<String> = extensions
        .split(',')
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();
    if !extensions.is_empty() {
        settings.video_extensions = extensions;
    }

    save_settings(settings)?;
    saved_notice()
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];
    let items: Vec<String> = languages.iter().map(ToString::to_string).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        saved_notice()?;
    }

    Ok(())
}
