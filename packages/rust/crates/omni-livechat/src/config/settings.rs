//! Runtime settings loader for omni-livechat.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - User overrides:  `<--conf | PRJ_CONFIG_HOME | .config>/omni-livechat/settings.yaml`
//!
//! Merge precedence is user over system; CLI flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use omni_chat_window::WindowKind;
use serde::Deserialize;

const SYSTEM_SETTINGS_FILE: &str = "packages/conf/settings.yaml";
const USER_SETTINGS_FILE: &str = "omni-livechat/settings.yaml";
const DEFAULT_CONFIG_HOME: &str = ".config";

/// Merged settings file contents. Every field is optional; defaults live in `resolve`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveChatSettings {
    /// Aggregation window.
    #[serde(default)]
    pub window: WindowSettings,
    /// Terminal output.
    #[serde(default)]
    pub display: DisplaySettings,
    /// YouTube Data API source.
    #[serde(default)]
    pub youtube: YouTubeSettings,
    /// JSON-lines replay source.
    #[serde(default)]
    pub replay: ReplaySettings,
}

/// `window:` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowSettings {
    /// `duration` or `count`.
    pub kind: Option<WindowKind>,
    /// Window length in seconds.
    pub duration_secs: Option<u64>,
    /// Count-window capacity.
    pub size: Option<usize>,
    /// One counted message per sender and content.
    pub unique: Option<bool>,
    /// Normalizer label (`identity`, `trim`, `casefold`, `trim_casefold`).
    pub normalizer: Option<String>,
}

/// `display:` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplaySettings {
    /// How many contents to show.
    pub top: Option<usize>,
    /// Clear the terminal before each frame.
    pub clear_screen: Option<bool>,
}

/// `youtube:` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YouTubeSettings {
    /// Data API key.
    pub api_key: Option<String>,
    /// API base URL (tests point this at a local server).
    pub base_url: Option<String>,
    /// Per-request timeout.
    pub request_timeout_secs: Option<u64>,
    /// Lower bound on the server-suggested polling interval.
    pub min_poll_interval_ms: Option<u64>,
}

/// `replay:` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplaySettings {
    /// Messages per replayed batch.
    pub batch_size: Option<usize>,
    /// Pause between replayed batches.
    pub interval_ms: Option<u64>,
}

impl LiveChatSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            window: self.window.merge(overlay.window),
            display: self.display.merge(overlay.display),
            youtube: self.youtube.merge(overlay.youtube),
            replay: self.replay.merge(overlay.replay),
        }
    }
}

impl WindowSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            kind: overlay.kind.or(self.kind),
            duration_secs: overlay.duration_secs.or(self.duration_secs),
            size: overlay.size.or(self.size),
            unique: overlay.unique.or(self.unique),
            normalizer: overlay.normalizer.or(self.normalizer),
        }
    }
}

impl DisplaySettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            top: overlay.top.or(self.top),
            clear_screen: overlay.clear_screen.or(self.clear_screen),
        }
    }
}

impl YouTubeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            api_key: overlay.api_key.or(self.api_key),
            base_url: overlay.base_url.or(self.base_url),
            request_timeout_secs: overlay
                .request_timeout_secs
                .or(self.request_timeout_secs),
            min_poll_interval_ms: overlay
                .min_poll_interval_ms
                .or(self.min_poll_interval_ms),
        }
    }
}

impl ReplaySettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            batch_size: overlay.batch_size.or(self.batch_size),
            interval_ms: overlay.interval_ms.or(self.interval_ms),
        }
    }
}

/// Where the two settings files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPaths {
    /// Shipped defaults.
    pub system: PathBuf,
    /// Per-user overrides.
    pub user: PathBuf,
}

impl SettingsPaths {
    /// Layout under `project_root`: relative config homes are taken from there.
    #[must_use]
    pub fn under(project_root: &Path, config_home: &Path) -> Self {
        Self {
            system: project_root.join(SYSTEM_SETTINGS_FILE),
            user: project_root.join(config_home).join(USER_SETTINGS_FILE),
        }
    }

    /// Locate the files from the environment.
    ///
    /// `conf_dir` (the CLI `--conf` flag) replaces the config home; otherwise
    /// `PRJ_CONFIG_HOME`, then `.config`. The project root is `PRJ_ROOT` or the
    /// current directory.
    #[must_use]
    pub fn discover(conf_dir: Option<&Path>) -> Self {
        let project_root = non_empty_env("PRJ_ROOT")
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let config_home = conf_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| non_empty_env("PRJ_CONFIG_HOME").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_HOME));
        Self::under(&project_root, &config_home)
    }
}

impl LiveChatSettings {
    /// Load both files and merge them, user over system. Missing or broken
    /// files contribute nothing.
    #[must_use]
    pub fn load(paths: &SettingsPaths) -> Self {
        let system = Self::from_file(&paths.system).unwrap_or_default();
        let user = Self::from_file(&paths.user).unwrap_or_default();
        tracing::debug!(
            event = "livechat.settings.loaded",
            system = %paths.system.display(),
            user = %paths.user.display(),
            "settings loaded"
        );
        system.merge(user)
    }

    /// Parse one settings file. `None` when it is absent, unreadable or not valid YAML.
    #[must_use]
    pub fn from_file(path: &Path) -> Option<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
            Err(error) => {
                tracing::warn!(
                    event = "livechat.settings.unreadable",
                    path = %path.display(),
                    error = %error,
                    "ignoring settings file"
                );
                return None;
            }
        };
        serde_yaml::from_str(&raw)
            .map_err(|error| {
                tracing::warn!(
                    event = "livechat.settings.invalid_yaml",
                    path = %path.display(),
                    error = %error,
                    "ignoring settings file"
                );
            })
            .ok()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
