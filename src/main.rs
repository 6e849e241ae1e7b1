mod action;
mod app;
mod catalog;
mod cli;
mod components;
mod config;
mod error;
mod logging;
mod store;
mod variables;

use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::Result;

use catalog::{ModelCatalog, PromptTemplateCatalog};
use cli::Cli;
use components::SettingsModal;
use config::ConfigManager;
use error::SettingsError;
use store::{AiChatConfig, ConfigDraftStore};
use variables::{VariableCatalogBuilder, VariableDescriptor};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse_args();

    let config_manager = match &cli.config_dir {
        Some(dir) => ConfigManager::with_dir(dir)?,
        None => ConfigManager::new()?,
    };
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config_manager.settings().general.log_level.clone());
    let _log_guard = logging::init(&config_manager.log_file(), &log_level)?;
    tracing::info!(config_dir = %config_manager.config_dir().display(), "starting ai-chat-settings");

    let initial = read_initial_config(cli.input.as_deref())?;
    let picker_menu = match &cli.picker_menu {
        Some(path) => read_picker_menu(path)?,
        None => Vec::new(),
    };

    let models: Arc<dyn ModelCatalog> = Arc::new(config_manager.model_catalog());
    let prompts: Arc<dyn PromptTemplateCatalog> = Arc::new(config_manager.prompt_catalog());
    let variables = VariableCatalogBuilder::new(config_manager.labels().clone(), picker_menu);

    let (result_tx, result_rx) = crossbeam_channel::bounded(1);
    let store = ConfigDraftStore::new(initial, models);
    let modal = SettingsModal::new(store, prompts, &variables, cli.advanced)
        .on_success(move |config| {
            let _ = result_tx.send(config);
        })
        .on_close(|| tracing::debug!("settings modal closed"));

    {
        // Terminal is restored when the app is dropped, before any output
        let mut app = app::App::new(modal, config_manager.theme().clone())?;
        app.run()?;
    }

    match result_rx.try_recv() {
        Ok(config) => {
            write_output(cli.output.as_deref(), &config)?;
            tracing::info!("configuration written");
        }
        Err(_) => tracing::info!("editing discarded, nothing written"),
    }

    Ok(())
}

/// Initial configuration from `path`, or stdin when `None`
fn read_initial_config(path: Option<&Path>) -> error::Result<AiChatConfig> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    parse_initial_config(&raw)
}

fn parse_initial_config(raw: &str) -> error::Result<AiChatConfig> {
    if raw.trim().is_empty() {
        return Err(SettingsError::Input("empty configuration".to_string()));
    }
    Ok(serde_json::from_str(raw)?)
}

fn read_picker_menu(path: &Path) -> error::Result<Vec<VariableDescriptor>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Committed configuration to `path`, or stdout when `None`. Nothing else is written to stdout.
fn write_output(path: Option<&Path>, config: &AiChatConfig) -> error::Result<()> {
    match path {
        Some(path) => write_json(&mut std::fs::File::create(path)?, config),
        None => write_json(&mut io::stdout().lock(), config),
    }
}

fn write_json(out: &mut impl Write, config: &AiChatConfig) -> error::Result<()> {
    serde_json::to_writer_pretty(&mut *out, config)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
