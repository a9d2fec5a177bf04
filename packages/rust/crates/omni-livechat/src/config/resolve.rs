//! Settings + CLI flags -> concrete runtime values. Flags win over files.

use std::time::Duration;

use anyhow::{Result, bail};
use omni_chat_window::{AggregatorConfig, Normalizer};

use super::settings::{DisplaySettings, ReplaySettings, WindowSettings, YouTubeSettings};
use crate::runner::RunOptions;
use crate::source::{DEFAULT_YOUTUBE_API_BASE, YouTubeConfig};

/// Window length when neither settings nor flags give one.
pub const DEFAULT_WINDOW_SECS: u64 = 60;
/// Contents rendered per frame by default.
pub const DEFAULT_TOP: usize = 10;
/// Messages per replayed batch by default.
pub const DEFAULT_REPLAY_BATCH_SIZE: usize = 50;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MIN_POLL_INTERVAL_MS: u64 = 1_000;
const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Window options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct WindowOverrides {
    /// `--window-seconds`.
    pub window_secs: Option<u64>,
    /// `--unique` (only ever turns uniqueness on).
    pub unique: Option<bool>,
    /// `--normalizer`.
    pub normalizer: Option<String>,
}

/// Build the aggregator config.
///
/// # Errors
///
/// Zero window length or an unknown normalizer label.
pub fn resolve_aggregator_config(
    settings: &WindowSettings,
    overrides: &WindowOverrides,
) -> Result<AggregatorConfig> {
    let window_secs = overrides
        .window_secs
        .or(settings.duration_secs)
        .unwrap_or(DEFAULT_WINDOW_SECS);
    if window_secs == 0 {
        bail!("window duration must be greater than zero seconds");
    }

    let label = overrides
        .normalizer
        .as_deref()
        .or(settings.normalizer.as_deref())
        .unwrap_or("identity");
    let Some(normalizer) = Normalizer::from_label(label) else {
        bail!("unknown normalizer `{label}` (expected identity, trim, casefold, trim_casefold)");
    };

    Ok(AggregatorConfig {
        window_kind: settings.kind.unwrap_or_default(),
        window_duration: Duration::from_secs(window_secs),
        window_size: settings.size.unwrap_or(0),
        normalizer,
        unique: overrides.unique.or(settings.unique).unwrap_or(false),
    })
}

/// Build poll-loop options.
#[must_use]
pub fn resolve_run_options(
    settings: &DisplaySettings,
    top: Option<usize>,
    no_clear: bool,
    max_rounds: Option<u64>,
) -> RunOptions {
    RunOptions {
        top: top.or(settings.top).unwrap_or(DEFAULT_TOP),
        clear_screen: !no_clear && settings.clear_screen.unwrap_or(true),
        max_rounds,
    }
}

/// Build the YouTube source config. API key: flag, then `YOUTUBE_API_KEY`, then settings.
///
/// # Errors
///
/// No API key anywhere.
pub fn resolve_youtube_config(
    settings: &YouTubeSettings,
    api_key: Option<String>,
) -> Result<YouTubeConfig> {
    let api_key = api_key
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .or_else(|| settings.api_key.clone())
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty());
    let Some(api_key) = api_key else {
        bail!("apiKey is required (--api-key, YOUTUBE_API_KEY, or youtube.api_key in settings)");
    };
    Ok(YouTubeConfig {
        api_key,
        base_url: settings
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE.to_string()),
        request_timeout: Duration::from_secs(
            settings
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        min_poll_interval: Duration::from_millis(
            settings
                .min_poll_interval_ms
                .unwrap_or(DEFAULT_MIN_POLL_INTERVAL_MS),
        ),
    })
}

/// Replay batch size and pause, flags over settings.
#[must_use]
pub fn resolve_replay_pacing(
    settings: &ReplaySettings,
    batch_size: Option<usize>,
    interval_ms: Option<u64>,
) -> (usize, Duration) {
    let batch_size = batch_size
        .or(settings.batch_size)
        .unwrap_or(DEFAULT_REPLAY_BATCH_SIZE)
        .max(1);
    let interval = Duration::from_millis(interval_ms.or(settings.interval_ms).unwrap_or(0));
    (batch_size, interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_chat_window::WindowKind;

    #[test]
    fn flags_override_window_settings() {
        let settings = WindowSettings {
            kind: Some(WindowKind::Duration),
            duration_secs: Some(300),
            size: None,
            unique: Some(true),
            normalizer: Some("trim".to_string()),
        };
        let overrides = WindowOverrides {
            window_secs: Some(30),
            unique: None,
            normalizer: Some("casefold".to_string()),
        };
        let config = resolve_aggregator_config(&settings, &overrides).unwrap();
        assert_eq!(config.window_duration, Duration::from_secs(30));
        assert!(config.unique);
        assert_eq!(config.normalizer.apply(" A "), " a ");
    }

    #[test]
    fn window_defaults_apply() {
        let config =
            resolve_aggregator_config(&WindowSettings::default(), &WindowOverrides::default())
                .unwrap();
        assert_eq!(config.window_duration, Duration::from_secs(DEFAULT_WINDOW_SECS));
        assert_eq!(config.window_kind, WindowKind::Duration);
        assert!(!config.unique);
    }

    #[test]
    fn rejects_bad_window_values() {
        let zero = WindowOverrides {
            window_secs: Some(0),
            ..WindowOverrides::default()
        };
        assert!(resolve_aggregator_config(&WindowSettings::default(), &zero).is_err());

        let unknown = WindowOverrides {
            normalizer: Some("stem".to_string()),
            ..WindowOverrides::default()
        };
        assert!(resolve_aggregator_config(&WindowSettings::default(), &unknown).is_err());
    }

    #[test]
    fn youtube_requires_api_key() {
        assert!(resolve_youtube_config(&YouTubeSettings::default(), Some("  ".into())).is_err());
        let config = resolve_youtube_config(&YouTubeSettings::default(), Some("k".into())).unwrap();
        assert_eq!(config.base_url, DEFAULT_YOUTUBE_API_BASE);
        assert_eq!(config.min_poll_interval, Duration::from_millis(1_000));
    }

    #[test]
    fn run_options_honor_no_clear() {
        let settings = DisplaySettings {
            top: Some(3),
            clear_screen: Some(true),
        };
        let options = resolve_run_options(&settings, None, true, Some(2));
        assert_eq!(options.top, 3);
        assert!(!options.clear_screen);
        assert_eq!(options.max_rounds, Some(2));
    }

    #[test]
    fn replay_pacing_clamps_batch_size() {
        let (batch, interval) = resolve_replay_pacing(&ReplaySettings::default(), Some(0), None);
        assert_eq!(batch, 1);
        assert_eq!(interval, Duration::ZERO);
    }
}
