pub mod assemble;
pub mod check;
pub mod serve;

use eco_config::AppConfig;
use std::path::Path;

/// Load the config from `path` or the default location, then apply
/// environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => AppConfig::load()?,
    };
    tracing::debug!(
        assets = %config.content.assets_dir.display(),
        max_tokens = config.budget.max_prompt_tokens,
        "Config loaded"
    );
    Ok(config)
}
