use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::model::Source;

pub const DEFAULT_API_URL: &str = "https://api.stormglass.io/v2";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "FORECAST_CONFIG";

/// Everything [`crate::ForecastClient`] needs, resolved from [`Config`] or built by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_token: String,
    pub source: Source,
}

/// StormGlass credentials and request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormGlassConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub api_token: String,
    /// Preferred source id, e.g. "noaa" or "sg".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl StormGlassConfig {
    pub fn source_id(&self) -> Result<Source> {
        match &self.source {
            Some(s) => Source::try_from(s.as_str()),
            None => Ok(Source::default()),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Third-party services the app talks to.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Resources {
    pub stormglass: Option<StormGlassConfig>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [resources.stormglass]
/// api_url = "https://api.stormglass.io/v2"
/// api_token = "..."
/// source = "noaa"
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub resources: Resources,
}

impl Config {
    pub fn stormglass(&self) -> Option<&StormGlassConfig> {
        self.resources.stormglass.as_ref()
    }

    /// Resolve the settings a client is built from.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let sg = self.stormglass().ok_or_else(|| {
            anyhow!(
                "No StormGlass API token configured.\n\
                 Hint: run `forecast configure` and enter your API token."
            )
        })?;

        let source = sg
            .source_id()
            .context("Invalid `source` in [resources.stormglass]")?;

        Ok(ClientConfig {
            api_url: sg.api_url.clone(),
            api_token: sg.api_token.clone(),
            source,
        })
    }

    /// Load from [`Config::config_file_path`].
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Read `path`; a missing file means nothing has been configured yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Write TOML to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize StormGlass settings")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// `$FORECAST_CONFIG` if set, else `config.toml` in the platform config dir.
    pub fn config_file_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("dev", "surf-forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory; set {CONFIG_PATH_ENV}"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace the API token, keeping any other StormGlass settings.
    pub fn upsert_stormglass_token(&mut self, api_token: String) {
        match &mut self.resources.stormglass {
            Some(sg) => sg.api_token = api_token,
            None => {
                self.resources.stormglass = Some(StormGlassConfig {
                    api_url: default_api_url(),
                    api_token,
                    source: None,
                    timeout_secs: None,
                })
            }
        }
    }

    /// Override the API base URL. No-op until a token has been stored.
    pub fn set_api_url(&mut self, api_url: String) {
        if let Some(sg) = &mut self.resources.stormglass {
            sg.api_url = api_url;
        }
    }

    /// Store the preferred source. No-op until a token has been stored.
    pub fn set_source(&mut self, source: Source) {
        if let Some(sg) = &mut self.resources.stormglass {
            sg.source = Some(source.as_str().to_string());
        }
    }

    pub fn is_configured(&self) -> bool {
        self.stormglass().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_errors_when_not_configured() {
        let cfg = Config::default();
        let err = cfg.client_config().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No StormGlass API token configured"));
        assert!(msg.contains("Hint: run `forecast configure`"));
    }

    #[test]
    fn upsert_token_uses_defaults() {
        let mut cfg = Config::default();
        cfg.upsert_stormglass_token("TOKEN".into());

        let client = cfg.client_config().expect("configured");
        assert_eq!(client.api_url, DEFAULT_API_URL);
        assert_eq!(client.api_token, "TOKEN");
        assert_eq!(client.source, Source::Noaa);
        assert!(cfg.is_configured());
    }

    #[test]
    fn upsert_token_keeps_existing_settings() {
        let mut cfg = Config::default();
        cfg.upsert_stormglass_token("OLD".into());
        cfg.set_source(Source::StormGlass);
        cfg.set_api_url("http://localhost:8080".into());

        cfg.upsert_stormglass_token("NEW".into());

        let client = cfg.client_config().expect("configured");
        assert_eq!(client.api_token, "NEW");
        assert_eq!(client.source, Source::StormGlass);
        assert_eq!(client.api_url, "http://localhost:8080");
    }

    #[test]
    fn setters_are_noops_without_token() {
        let mut cfg = Config::default();
        cfg.set_source(Source::Icon);
        cfg.set_api_url("http://localhost".into());

        assert!(!cfg.is_configured());
    }

    #[test]
    fn parses_namespaced_toml() {
        let cfg = Config::from_toml(
            r#"
            [resources.stormglass]
            api_token = "abc"
            source = "ICON"
            timeout_secs = 5
            "#,
        )
        .unwrap();

        let sg = cfg.stormglass().expect("section present");
        assert_eq!(sg.api_url, DEFAULT_API_URL);
        assert_eq!(sg.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.client_config().unwrap().source, Source::Icon);
    }

    #[test]
    fn unknown_source_in_toml_is_reported() {
        let cfg = Config::from_toml(
            r#"
            [resources.stormglass]
            api_token = "abc"
            source = "nope"
            "#,
        )
        .unwrap();

        let err = cfg.client_config().unwrap_err();
        assert!(format!("{err:#}").contains("Unknown source 'nope'"));
    }

    fn scratch_path(name: &str) -> PathBuf {
        env::temp_dir()
            .join(format!("forecast-core-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let cfg = Config::load_from(&scratch_path("missing")).unwrap();
        assert!(!cfg.is_configured());
    }

    #[test]
    fn save_to_then_load_from_keeps_settings() {
        let path = scratch_path("saved");
        let mut cfg = Config::default();
        cfg.upsert_stormglass_token("TOKEN".into());
        cfg.set_source(Source::Yr);

        cfg.save_to(&path).unwrap();
        let back = Config::load_from(&path).unwrap();
        fs::remove_dir_all(path.parent().unwrap()).ok();

        assert_eq!(back.client_config().unwrap(), cfg.client_config().unwrap());
    }

    #[test]
    fn load_from_reports_bad_toml_with_path() {
        let path = scratch_path("broken");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "resources = 3").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        fs::remove_dir_all(path.parent().unwrap()).ok();

        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn toml_roundtrip_preserves_settings() {
        let mut cfg = Config::default();
        cfg.upsert_stormglass_token("TOKEN".into());
        cfg.set_source(Source::Dwd);

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();

        assert_eq!(back.client_config().unwrap(), cfg.client_config().unwrap());
    }
}
