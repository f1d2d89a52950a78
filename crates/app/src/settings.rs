use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use tedai_llm::{
    BackendConfig, DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, RIG_GEMINI_BACKEND_ID,
};

pub const SETTINGS_DIRECTORY_NAME: &str = "tedai";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const ENV_PREFIX: &str = "TEDAI_";

/// Bare variables consulted when no api key was configured.
pub const FALLBACK_API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_backend_id")]
    pub backend_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backend_id: default_backend_id(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: None,
        }
    }
}

impl AppSettings {
    pub fn to_backend_config(&self) -> Option<BackendConfig> {
        if self.api_key.trim().is_empty() {
            return None;
        }

        Some(BackendConfig::new(
            &self.backend_id,
            &self.api_key,
            &self.endpoint,
            Some(self.model.clone()),
        ))
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn normalized(mut self) -> Self {
        self.backend_id = non_blank_or(self.backend_id, default_backend_id);
        self.api_key = self.api_key.trim().to_string();
        self.endpoint = non_blank_or(self.endpoint, default_endpoint);
        self.model = non_blank_or(self.model, default_model);
        self
    }

    /// Fills a blank api key from the first non-empty fallback variable.
    fn with_fallback_api_key(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.api_key.trim().is_empty()
            && let Some(api_key) = FALLBACK_API_KEY_VARS
                .iter()
                .filter_map(|name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        {
            self.api_key = api_key;
        }
        self
    }
}

/// Current settings plus the file they are saved to.
pub struct SettingsStore {
    settings: Arc<ArcSwap<AppSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".tedai"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = load_layered(&config_path, |name| std::env::var(name).ok());
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<AppSettings> {
        self.settings.load_full()
    }

    /// Normalizes, writes to disk, then publishes `settings`.
    pub fn update(&self, settings: AppSettings) -> Result<(), SettingsError> {
        let normalized = settings.normalized();
        self.persist(&normalized)?;
        self.settings.store(Arc::new(normalized));
        Ok(())
    }

    fn persist(&self, settings: &AppSettings) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(settings).context(EncodeSettingsSnafu {
            stage: "encode-settings",
        })?;
        write_atomically(&self.config_path, &content)?;

        tracing::info!(path = ?self.config_path, "settings saved");
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("cannot create the tedai config directory {path:?} (`{stage}`): {source}"))]
    ConfigDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot encode tedai settings as JSON (`{stage}`): {source}"))]
    EncodeSettings {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("cannot stage tedai settings in {staged:?} (`{stage}`): {source}"))]
    StageWrite {
        stage: &'static str,
        staged: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot replace {target:?} with the staged settings (`{stage}`): {source}"))]
    Replace {
        stage: &'static str,
        target: PathBuf,
        source: std::io::Error,
    },
}

/// Writes next to `target` first, so readers see either the old or the new file.
fn write_atomically(target: &Path, content: &str) -> Result<(), SettingsError> {
    if let Some(dir) = target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).context(ConfigDirSnafu {
            stage: "ensure-config-dir",
            path: dir.to_path_buf(),
        })?;
    }

    let staged = target.with_extension("json.tmp");
    std::fs::write(&staged, content).context(StageWriteSnafu {
        stage: "stage-settings",
        staged: staged.clone(),
    })?;

    if let Err(source) = std::fs::rename(&staged, target) {
        // Leave no stray staging file behind a failed swap.
        let _ = std::fs::remove_file(&staged);
        return Err(source).context(ReplaceSnafu {
            stage: "swap-in-settings",
            target: target.to_path_buf(),
        });
    }
    Ok(())
}

/// Layers defaults, the JSON file at `path` when present, then `TEDAI_*` variables.
fn load_layered(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> AppSettings {
    let mut figment = Figment::from(Serialized::defaults(AppSettings::default()));

    if path.exists() {
        figment = figment.merge(Json::file(path));
    } else {
        tracing::info!("settings file not found at {:?}, using defaults", path);
    }

    let settings = match figment.merge(Env::prefixed(ENV_PREFIX)).extract::<AppSettings>() {
        Ok(settings) => settings,
        Err(error) => {
            tracing::warn!(
                "failed to parse settings from {:?}: {}. using defaults",
                path,
                error
            );
            AppSettings::default()
        }
    };

    settings.with_fallback_api_key(lookup).normalized()
}

fn non_blank_or(value: String, default: fn() -> String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default()
    } else {
        trimmed.to_string()
    }
}

fn default_backend_id() -> String {
    RIG_GEMINI_BACKEND_ID.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_GEMINI_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = load_layered(&dir.path().join("absent.json"), no_env);

        assert_eq!(settings.backend_id, RIG_GEMINI_BACKEND_ID);
        assert_eq!(settings.endpoint, DEFAULT_GEMINI_ENDPOINT);
        assert_eq!(settings.model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn file_values_override_defaults_and_are_trimmed() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"api_key": "  file-key  ", "model": "gemini-2.5-pro", "temperature": 0.4}}"#
        )
        .expect("write settings");

        let settings = load_layered(file.path(), no_env);
        assert_eq!(settings.api_key, "file-key");
        assert_eq!(settings.model, "gemini-2.5-pro");
        assert_eq!(settings.temperature, Some(0.4));
        assert_eq!(settings.endpoint, DEFAULT_GEMINI_ENDPOINT);
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"temperature": [1, 2]}}"#).expect("write settings");

        let settings = load_layered(file.path(), no_env);
        assert_eq!(settings.temperature, None);
        assert_eq!(settings.model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn blank_values_normalize_to_defaults() {
        let settings = AppSettings {
            backend_id: " ".to_string(),
            api_key: " key ".to_string(),
            endpoint: String::new(),
            model: "\t".to_string(),
            temperature: None,
        }
        .normalized();

        assert_eq!(settings.backend_id, RIG_GEMINI_BACKEND_ID);
        assert_eq!(settings.api_key, "key");
        assert_eq!(settings.endpoint, DEFAULT_GEMINI_ENDPOINT);
        assert_eq!(settings.model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn fallback_key_fills_only_blank_api_key() {
        let lookup = |name: &str| match name {
            "API_KEY" => Some("   ".to_string()),
            "GEMINI_API_KEY" => Some("gemini-key".to_string()),
            _ => None,
        };

        let filled = AppSettings::default().with_fallback_api_key(lookup);
        assert_eq!(filled.api_key, "gemini-key");
        assert!(filled.to_backend_config().is_some());

        let kept = AppSettings {
            api_key: "configured".to_string(),
            ..AppSettings::default()
        }
        .with_fallback_api_key(lookup);
        assert_eq!(kept.api_key, "configured");
    }

    #[test]
    fn update_persists_normalized_settings_and_swaps() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
        let store = SettingsStore {
            settings: Arc::new(ArcSwap::from_pointee(AppSettings::default())),
            config_path: path.clone(),
        };

        store
            .update(AppSettings {
                api_key: " saved-key ".to_string(),
                model: "gemini-2.0-flash".to_string(),
                ..AppSettings::default()
            })
            .expect("update settings");

        assert_eq!(store.settings().api_key, "saved-key");
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = load_layered(&path, no_env);
        assert_eq!(reloaded.api_key, "saved-key");
        assert_eq!(reloaded.model, "gemini-2.0-flash");
    }

    #[test]
    fn update_reports_unwritable_config_dir_and_keeps_settings() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").expect("write blocker");

        let store = SettingsStore {
            settings: Arc::new(ArcSwap::from_pointee(AppSettings::default())),
            config_path: blocker.join(SETTINGS_FILE_NAME),
        };

        let error = store
            .update(AppSettings {
                api_key: "unsaved".to_string(),
                ..AppSettings::default()
            })
            .expect_err("directory cannot be created");

        assert!(matches!(error, SettingsError::ConfigDir { .. }));
        assert!(error.to_string().contains("tedai config directory"));
        assert!(store.settings().api_key.is_empty());
    }

    #[test]
    fn blank_key_has_no_backend_config() {
        assert!(!AppSettings::default().is_valid());
        assert!(AppSettings::default().to_backend_config().is_none());
    }
}
