//! Config command implementation.

use crate::cli::{mask_secret, ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: &Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", masked_toml(settings)?);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init => {
            if config_path.exists() {
                Output::warning(&format!("Config already exists at {}", config_path.display()));
            } else {
                Settings::default().save_to(config_path)?;
                Output::success(&format!("Created config at {}", config_path.display()));
            }
        }
    }

    Ok(())
}

/// The settings as TOML with API keys masked.
fn masked_toml(settings: &Settings) -> Result<String> {
    let mut shown = settings.clone();
    for key in [
        &mut shown.youtube.api_key,
        &mut shown.search.api_key,
        &mut shown.llm.api_key,
    ] {
        if let Some(value) = key.as_mut() {
            *value = mask_secret(value);
        }
    }

    toml::to_string_pretty(&shown).map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_masks_api_keys() {
        let mut settings = Settings::default();
        settings.llm.api_key = Some("gsk_abcdefghijklmnop1234".to_string());
        settings.search.api_key = Some("exa-short".to_string());

        let shown = masked_toml(&settings).unwrap();
        assert!(!shown.contains("gsk_abcdefghijklmnop1234"));
        assert!(shown.contains("gsk_...1234"));
        assert!(!shown.contains("exa-short"));
        assert_eq!(settings.llm.api_key.as_deref(), Some("gsk_abcdefghijklmnop1234"));
    }

    #[test]
    fn test_init_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tubenotes").join("config.toml");

        // Secrets from the environment never land in the file
        let mut settings = Settings::default();
        settings.llm.api_key = Some("gsk_secret".to_string());
        run_config(&ConfigAction::Init, &settings, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("caption_language = \"en\""));
        assert!(!written.contains("gsk_secret"));

        let parsed: Settings = toml::from_str(&written).unwrap();
        assert_eq!(parsed.http.timeout_secs, 120);

        // Existing files are left alone
        run_config(&ConfigAction::Init, &Settings::default(), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
    }
}
