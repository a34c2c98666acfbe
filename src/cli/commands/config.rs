//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let mut settings = settings;
            apply_setting(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a dotted-key assignment to the settings.
fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.data_dir" => settings.general.data_dir = value.to_string(),
        "general.log_level" => settings.general.log_level = value.to_string(),
        "playlist.url" => settings.playlist.url = Some(value.to_string()),
        "playlist.max_videos" => settings.playlist.max_videos = parse_value(key, value)?,
        "playlist.languages" => {
            settings.playlist.languages = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "chunking.chunk_size" => settings.chunking.chunk_size = parse_value(key, value)?,
        "chunking.chunk_overlap" => settings.chunking.chunk_overlap = parse_value(key, value)?,
        "embedding.model" => settings.embedding.model = value.to_string(),
        "embedding.dimensions" => settings.embedding.dimensions = parse_value(key, value)?,
        "vector_store.sqlite_path" => settings.vector_store.sqlite_path = value.to_string(),
        "rag.model" => settings.rag.model = value.to_string(),
        "rag.top_k" => settings.rag.top_k = parse_value(key, value)?,
        "rag.min_score" => settings.rag.min_score = parse_value(key, value)?,
        _ => {
            return Err(anyhow::anyhow!(
                "Unknown config key: {} (run 'spole config show' to see available keys)",
                key
            ));
        }
    }

    Ok(())
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_string_keys() {
        let mut settings = Settings::default();

        apply_setting(&mut settings, "rag.model", "gpt-4o").unwrap();
        assert_eq!(settings.rag.model, "gpt-4o");

        apply_setting(&mut settings, "playlist.url", "https://example.com/p").unwrap();
        assert_eq!(settings.playlist.url.as_deref(), Some("https://example.com/p"));
    }

    #[test]
    fn test_set_numeric_keys() {
        let mut settings = Settings::default();

        apply_setting(&mut settings, "chunking.chunk_size", "500").unwrap();
        assert_eq!(settings.chunking.chunk_size, 500);

        apply_setting(&mut settings, "rag.top_k", "5").unwrap();
        assert_eq!(settings.rag.top_k, 5);

        apply_setting(&mut settings, "rag.min_score", "0.5").unwrap();
        assert_eq!(settings.rag.min_score, 0.5);
    }

    #[test]
    fn test_set_language_list() {
        let mut settings = Settings::default();

        apply_setting(&mut settings, "playlist.languages", "de, de-DE").unwrap();
        assert_eq!(settings.playlist.languages, vec!["de", "de-DE"]);
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let mut settings = Settings::default();
        assert!(apply_setting(&mut settings, "no.such.key", "x").is_err());
    }

    #[test]
    fn test_set_rejects_bad_numeric_value() {
        let mut settings = Settings::default();
        assert!(apply_setting(&mut settings, "chunking.chunk_size", "lots").is_err());
        // The failed assignment leaves the old value in place.
        assert_eq!(settings.chunking.chunk_size, 1000);
    }
}
