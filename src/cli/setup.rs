//! Connection setup: load the layered config, offer the saved settings, or
//! walk the user through entering and saving new ones.

use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Input, Password};
use marauder_config::constants::defaults::DEFAULT_CONTEXT_LIMIT;
use marauder_config::{ConfigManager, ConfigPaths, MarauderConfig, PartialConfig};
use marauder_core::utils::colors::style;
use tracing::{debug, info};

use super::Cli;

#[derive(Debug, PartialEq, Eq)]
enum SetupAction {
    /// Layers already yield a complete config
    UseResolved,
    /// Ask whether to reuse the saved config file
    OfferSaved,
    Prompt,
    /// Incomplete and nobody to ask
    Fail(Vec<&'static str>),
}

fn plan_setup(
    force_prompt: bool,
    has_saved: bool,
    missing: Vec<&'static str>,
    interactive: bool,
) -> SetupAction {
    if !interactive {
        return if missing.is_empty() {
            SetupAction::UseResolved
        } else {
            SetupAction::Fail(missing)
        };
    }
    if force_prompt || !missing.is_empty() {
        SetupAction::Prompt
    } else if has_saved {
        SetupAction::OfferSaved
    } else {
        SetupAction::UseResolved
    }
}

/// Resolve the connection settings for this run.
pub fn load_connection_config(cli: &Cli, interactive: bool) -> Result<MarauderConfig> {
    if cli.setup && !interactive {
        bail!("--setup needs an interactive terminal");
    }

    let paths = ConfigPaths::from_home_dir()?;
    let mut manager = ConfigManager::load(paths, cli.runtime_overrides())
        .context("Failed to load configuration")?;
    let effective = manager.effective();

    let action = plan_setup(
        cli.setup,
        manager.saved().is_some(),
        effective.missing_fields(),
        interactive,
    );
    debug!(?action, file = %manager.config_file().display(), "configuration plan");

    match action {
        SetupAction::UseResolved => Ok(manager.resolve()?),
        SetupAction::Fail(missing) => bail!(
            "Configuration is incomplete (missing: {}). Run `marauder --setup` in a terminal, \
             pass --base-url/--api-key/--model, or set MARAUDER_BASE_URL, MARAUDER_API_KEY \
             and MARAUDER_MODEL.",
            missing.join(", ")
        ),
        SetupAction::OfferSaved => {
            let config = manager.resolve()?;
            println!(
                "Found saved config at {}",
                style(manager.config_file().display()).cyan()
            );
            println!("  {}", describe_config(&config));
            let reuse = Confirm::new()
                .with_prompt("Use saved config?")
                .default(true)
                .interact()?;
            if reuse {
                return Ok(config);
            }
            run_setup_prompts(&mut manager, &effective)
        }
        SetupAction::Prompt => run_setup_prompts(&mut manager, &effective),
    }
}

fn run_setup_prompts(
    manager: &mut ConfigManager,
    effective: &PartialConfig,
) -> Result<MarauderConfig> {
    println!();
    println!("{}", style("Connection setup").cyan().bold());

    let base_url = prompt_text("API base URL", effective.base_url.as_deref())?;

    let existing_key = effective.api_key.as_deref().filter(|key| !key.is_empty());
    let api_key = match existing_key {
        Some(current) => {
            let entered = Password::new()
                .with_prompt(format!(
                    "API key (blank keeps {})",
                    mask_api_key(current)
                ))
                .allow_empty_password(true)
                .interact()?;
            if entered.trim().is_empty() {
                current.to_owned()
            } else {
                entered.trim().to_owned()
            }
        }
        None => Password::new()
            .with_prompt("API key")
            .interact()?
            .trim()
            .to_owned(),
    };

    let model = prompt_text("Model", effective.model.as_deref())?;
    let context_limit: u64 = Input::new()
        .with_prompt("Context window (tokens)")
        .default(effective.context_limit.unwrap_or(DEFAULT_CONTEXT_LIMIT))
        .interact_text()?;

    let config = PartialConfig {
        base_url: Some(base_url),
        api_key: Some(api_key),
        model: Some(model),
        context_limit: Some(context_limit),
    }
    .resolve()?;

    let current_file = manager.config_file().to_path_buf();
    let location_input: String = Input::new()
        .with_prompt("Save config to (file or directory)")
        .default(current_file.display().to_string())
        .interact_text()?;
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let location = manager.paths().save_location(&location_input, &cwd);
    let pointer = (location != current_file).then_some(location.as_path());

    let saved_to = manager.save(&config, pointer)?;
    info!(file = %saved_to.display(), "connection settings saved");
    println!("{} {}", style("✓ Saved to").green(), saved_to.display());
    Ok(config)
}

fn prompt_text(prompt: &str, current: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(current) = current.filter(|value| !value.trim().is_empty()) {
        input = input.default(current.to_owned());
    }
    Ok(input.interact_text()?.trim().to_owned())
}

/// One-line description without the secret.
pub fn describe_config(config: &MarauderConfig) -> String {
    format!(
        "{} @ {} (key {}, context {})",
        config.model,
        config.base_url,
        mask_api_key(&config.api_key),
        config.context_limit
    )
}

/// Only the last four characters of a key are ever printed.
pub fn mask_api_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "****".to_owned();
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("****{tail}")
}
