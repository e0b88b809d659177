use crate::config::settings::ProfessorConfig;
use crate::error::{ProfessorError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

const APP_NAME: &str = "parallel-professor";

/// Get XDG-compliant config directory
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ProfessorError::Config("Could not determine config directory".to_string()))
}

/// Get XDG-compliant data directory
pub fn data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ProfessorError::Config("Could not determine data directory".to_string()))
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get database path, honouring the `[storage]` override
pub fn database_path(config: &ProfessorConfig) -> Result<PathBuf> {
    match &config.storage.database_path {
        Some(path) => Ok(path.clone()),
        None => Ok(data_dir()?.join("professor.db")),
    }
}

/// Load config from file, creating default if not exists
pub fn load_config() -> Result<ProfessorConfig> {
    let path = config_path()?;

    if !path.exists() {
        let config = ProfessorConfig::default();
        save_config(&config)?;
        return Ok(config);
    }

    let content = fs::read_to_string(&path)?;
    let config: ProfessorConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save config to file
pub fn save_config(config: &ProfessorConfig) -> Result<()> {
    let path = config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(&path, content)?;
    Ok(())
}

/// Ensure all data directories exist
pub fn ensure_directories() -> Result<()> {
    fs::create_dir_all(config_dir()?)?;
    fs::create_dir_all(data_dir()?)?;
    Ok(())
}

/// Load the config file and layer credentials from the environment on top.
pub fn load_config_with_env() -> Result<ProfessorConfig> {
    let mut config = load_config()?;
    apply_env(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

fn apply_env<F>(config: &mut ProfessorConfig, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = var("OPENAI_API_KEY") {
        config.transcription.api_key = Some(key.clone());
        config.llm.api_key = Some(key);
    }
    if let Some(region) = var("AWS_REGION") {
        config.upload.region = region;
    }
    if let Some(key) = var("AWS_ACCESS_KEY_ID") {
        config.upload.access_key_id = Some(key);
    }
    if let Some(secret) = var("AWS_SECRET_ACCESS_KEY") {
        config.upload.secret_access_key = Some(secret);
    }
    if let Some(bucket) = var("PROFESSOR_BUCKET") {
        config.upload.bucket = Some(bucket);
    }
    if let Some(path) = var("PROFESSOR_DATABASE") {
        config.storage.database_path = Some(PathBuf::from(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_serializes() {
        let config = ProfessorConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[lectures]"));
        assert!(toml.contains("[transcription]"));
        assert!(toml.contains("[llm]"));
        assert!(toml.contains("[upload]"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = ProfessorConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: ProfessorConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config.lectures.code_policy, parsed.lectures.code_policy);
        assert_eq!(config.llm.model, parsed.llm.model);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("AWS_REGION", "eu-west-2"),
            ("PROFESSOR_BUCKET", "lecture-videos"),
            ("PROFESSOR_DATABASE", "/tmp/lectures.db"),
        ]);

        let mut config = ProfessorConfig::default();
        apply_env(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.transcription.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.upload.region, "eu-west-2");
        assert_eq!(config.upload.bucket.as_deref(), Some("lecture-videos"));
        assert!(config.upload.access_key_id.is_none());
        assert_eq!(
            database_path(&config).unwrap(),
            PathBuf::from("/tmp/lectures.db")
        );
    }

    #[test]
    fn test_paths_are_scoped_to_app() {
        assert!(config_dir().unwrap().ends_with(APP_NAME));
        assert!(data_dir().unwrap().ends_with(APP_NAME));

        let path = config_path().unwrap();
        assert!(path.ends_with(format!("{}/config.toml", APP_NAME)));

        let db = database_path(&ProfessorConfig::default()).unwrap();
        assert!(db.ends_with(format!("{}/professor.db", APP_NAME)));
    }
}
