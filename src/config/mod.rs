use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "pinshelf";
const APP_CONFIG_FILE: &str = "config.json";

const DEFAULT_MENU_PAGE_MARKER: &str = "Stmain.php";
const DEFAULT_SHORTCUT_LABEL: &str = "開啟 iCan";
const DEFAULT_SHORTCUT_URL: &str = "https://admin.tcu.edu.tw/TCUstweb/TranIcan.php";

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub menu_page_marker: Option<String>,
    #[serde(default)]
    pub default_shortcut_label: Option<String>,
    #[serde(default)]
    pub default_shortcut_url: Option<String>,
}

/// `AppConfig` with every optional field resolved to its default.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub menu_page_marker: String,
    pub default_shortcut_label: String,
    pub default_shortcut_url: String,
}

impl PortalConfig {
    pub fn resolve(config: AppConfig) -> Self {
        Self {
            menu_page_marker: config
                .menu_page_marker
                .unwrap_or_else(|| DEFAULT_MENU_PAGE_MARKER.to_string()),
            default_shortcut_label: config
                .default_shortcut_label
                .unwrap_or_else(|| DEFAULT_SHORTCUT_LABEL.to_string()),
            default_shortcut_url: config
                .default_shortcut_url
                .unwrap_or_else(|| DEFAULT_SHORTCUT_URL.to_string()),
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::resolve(AppConfig::default())
    }
}

pub fn load_portal_config() -> PortalConfig {
    PortalConfig::resolve(load_app_config())
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

/// Data directory for persisted state (pins, launcher position, snapshot).
pub fn app_data_dir() -> Result<PathBuf, ConfigPathError> {
    let mut root = match std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        Some(xdg) if !xdg.as_os_str().is_empty() => xdg,
        _ => {
            let home = std::env::var_os("HOME")
                .map(PathBuf::from)
                .ok_or(ConfigPathError::MissingHomeDirectory)?;
            home.join(".local").join("share")
        }
    };
    root.push(APP_DIR);
    Ok(root)
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "pinshelf",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/pinshelf/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("pinshelf", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/pinshelf/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("pinshelf", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn portal_config_resolves_defaults_for_unset_fields() {
        let config = PortalConfig::resolve(AppConfig {
            menu_page_marker: None,
            default_shortcut_label: Some("iCan".to_string()),
            default_shortcut_url: None,
        });

        assert_eq!(config.menu_page_marker, DEFAULT_MENU_PAGE_MARKER);
        assert_eq!(config.default_shortcut_label, "iCan");
        assert_eq!(config.default_shortcut_url, DEFAULT_SHORTCUT_URL);
    }
}
