#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use omni_chat_window::WindowKind;
use omni_livechat::{LiveChatSettings, SettingsPaths, WindowOverrides, resolve_aggregator_config};
use tempfile::TempDir;

fn write_file(path: PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write yaml");
}

fn load(system: &Path, user: &Path) -> LiveChatSettings {
    LiveChatSettings::load(&SettingsPaths {
        system: system.to_path_buf(),
        user: user.to_path_buf(),
    })
}

#[test]
fn merge_user_overrides_system() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("packages/conf/settings.yaml");
    let user = tmp.path().join(".config/omni-livechat/settings.yaml");

    write_file(
        system.clone(),
        r#"
window:
  kind: duration
  duration_secs: 60
  unique: false
  normalizer: identity
display:
  top: 10
  clear_screen: true
youtube:
  api_key: "system-key"
  request_timeout_secs: 30
replay:
  batch_size: 50
"#,
    );
    write_file(
        user.clone(),
        r#"
window:
  duration_secs: 300
  normalizer: trim_casefold
display:
  clear_screen: false
youtube:
  api_key: "user-key"
"#,
    );

    let settings = load(&system, &user);
    assert_eq!(settings.window.kind, Some(WindowKind::Duration));
    assert_eq!(settings.window.duration_secs, Some(300));
    assert_eq!(settings.window.unique, Some(false));
    assert_eq!(settings.window.normalizer.as_deref(), Some("trim_casefold"));
    assert_eq!(settings.display.top, Some(10));
    assert_eq!(settings.display.clear_screen, Some(false));
    assert_eq!(settings.youtube.api_key.as_deref(), Some("user-key"));
    assert_eq!(settings.youtube.request_timeout_secs, Some(30));
    assert_eq!(settings.replay.batch_size, Some(50));

    let config = resolve_aggregator_config(&settings.window, &WindowOverrides::default())
        .expect("aggregator config");
    assert_eq!(config.window_duration.as_secs(), 300);
    assert_eq!(config.normalizer.apply("  Grass "), "grass");
}

#[test]
fn missing_files_yield_defaults() {
    let tmp = TempDir::new().expect("tempdir");
    let settings = load(
        &tmp.path().join("nope/system.yaml"),
        &tmp.path().join("nope/user.yaml"),
    );
    assert!(settings.window.duration_secs.is_none());
    assert!(settings.youtube.api_key.is_none());
}

#[test]
fn invalid_yaml_is_ignored() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("system.yaml");
    let user = tmp.path().join("user.yaml");
    write_file(system.clone(), "window:\n  duration_secs: 90\n");
    write_file(user.clone(), "window: [not, a, map\n");

    let settings = load(&system, &user);
    assert_eq!(settings.window.duration_secs, Some(90));
}

#[test]
fn count_window_kind_parses() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("system.yaml");
    write_file(system.clone(), "window:\n  kind: count\n  size: 500\n");

    let settings = load(&system, &tmp.path().join("absent.yaml"));
    assert_eq!(settings.window.kind, Some(WindowKind::Count));
    assert_eq!(settings.window.size, Some(500));
}

#[test]
fn relative_config_home_sits_under_project_root() {
    let paths = SettingsPaths::under(Path::new("/srv/votes"), Path::new("conf"));
    assert_eq!(
        paths.system,
        PathBuf::from("/srv/votes/packages/conf/settings.yaml")
    );
    assert_eq!(
        paths.user,
        PathBuf::from("/srv/votes/conf/omni-livechat/settings.yaml")
    );
}

#[test]
fn conf_dir_flag_selects_user_file() {
    let tmp = TempDir::new().expect("tempdir");
    let conf_dir = tmp.path().join("alt-conf");
    write_file(
        conf_dir.join("omni-livechat/settings.yaml"),
        "display:\n  top: 3\n",
    );

    let paths = SettingsPaths::discover(Some(&conf_dir));
    assert_eq!(paths.user, conf_dir.join("omni-livechat/settings.yaml"));
    let settings = LiveChatSettings::load(&paths);
    assert_eq!(settings.display.top, Some(3));
}
