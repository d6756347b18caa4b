use super::prompts;
use crate::context::AppContext;
use crate::output::Output;
use crate::render::mask_secret;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use popcorn_config::API_KEY_ENV;
use serde_json::json;

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output).await,
        crate::ConfigCommands::ApiKey { key } => configure_api_key(key, output).await,
        crate::ConfigCommands::Set {
            base_url,
            timeout,
            min_query_len,
        } => configure_settings(base_url, timeout, min_query_len, output).await,
    }
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let config_file = ctx.paths.config_file();
    let credentials = ctx.credentials()?;

    let from_env = std::env::var(API_KEY_ENV).is_ok_and(|v| !v.trim().is_empty());
    let api_key = credentials.resolve_omdb_api_key().unwrap_or_default();
    let api_key_display = if full { api_key.clone() } else { mask_secret(&api_key) };

    if !config_file.exists() {
        output.info(format!(
            "No configuration file at {}, using defaults",
            config_file.display()
        ));
    }

    if output.is_human() && !output.is_quiet() {
        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("Setting").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
        table.load_preset(presets::UTF8_FULL);
        table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
        table.add_row(vec![Cell::new("Config file"), Cell::new(config_file.display())]);
        table.add_row(vec![
            Cell::new("Data directory"),
            Cell::new(ctx.paths.data_dir().display()),
        ]);
        table.add_row(vec![Cell::new("OMDb base URL"), Cell::new(&ctx.config.omdb.base_url)]);
        table.add_row(vec![
            Cell::new("Request timeout"),
            Cell::new(format!("{}s", ctx.config.omdb.request_timeout_secs)),
        ]);
        table.add_row(vec![
            Cell::new("Min query length"),
            Cell::new(ctx.config.search.min_query_len),
        ]);
        table.add_row(vec![Cell::new("Storage key"), Cell::new(&ctx.config.storage.watched_key)]);
        table.add_row(vec![
            Cell::new("OMDb API key"),
            Cell::new(if from_env {
                format!("{} (from {})", api_key_display, API_KEY_ENV)
            } else {
                api_key_display.clone()
            })
            .fg(if api_key.is_empty() { Color::Red } else { Color::Green }),
        ]);
        output.block(table.to_string());
    }

    output.json(&json!({
        "config_file": config_file.display().to_string(),
        "data_dir": ctx.paths.data_dir().display().to_string(),
        "config": ctx.config,
        "omdb_api_key": api_key_display,
        "api_key_from_env": from_env,
    }));
    Ok(())
}

async fn configure_api_key(key: Option<String>, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    ctx.paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create directories: {}", e))?;

    let key = match key {
        Some(key) => key,
        None => {
            output.info("Get a free key at https://www.omdbapi.com/apikey.aspx");
            prompts::prompt_secret("OMDb API key")?
        }
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(eyre!("API key cannot be empty"));
    }

    let mut credentials = ctx.credentials()?;
    credentials.set_omdb_api_key(key);
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    output.success(format!(
        "OMDb API key saved to {}",
        ctx.paths.credentials_file().display()
    ));
    if std::env::var(API_KEY_ENV).is_ok() {
        output.warn(format!("{} is set and takes precedence over the saved key", API_KEY_ENV));
    }
    Ok(())
}

async fn configure_settings(
    base_url: Option<String>,
    timeout: Option<u64>,
    min_query_len: Option<usize>,
    output: &Output,
) -> Result<()> {
    if base_url.is_none() && timeout.is_none() && min_query_len.is_none() {
        output.warn("Nothing to change. Use --base-url, --timeout or --min-query-len");
        return Ok(());
    }

    let mut ctx = AppContext::load()?;
    if let Some(base_url) = base_url {
        ctx.config.omdb.base_url = base_url.trim().to_string();
    }
    if let Some(timeout) = timeout {
        ctx.config.omdb.request_timeout_secs = timeout;
    }
    if let Some(min_query_len) = min_query_len {
        ctx.config.search.min_query_len = min_query_len;
    }

    ctx.config
        .validate()
        .map_err(|e| eyre!("Invalid setting: {}", e))?;

    let config_file = ctx.paths.config_file();
    ctx.config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration saved to {}", config_file.display()));
    output.json(&json!({ "config": ctx.config }));
    Ok(())
}
