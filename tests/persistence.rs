//! Integration tests for settings and plugin configuration on disk
//!
//! These tests point the XDG directories at a temp dir, so they run serially.

use std::path::Path;

use appframe::app::{
    PluginPropertyBag, Setting, SettingsGroup, SettingsProfile, SettingsProvider,
    TomlSettingsProvider,
};
use appframe::prelude::*;
use serial_test::serial;
use tempfile::TempDir;
use uuid::Uuid;

const APP_NAME: &str = "persistence-test";
const AUTOSAVE: Uuid = Uuid::from_u128(0x5e7_0001);
const FONT_SIZE: Uuid = Uuid::from_u128(0x5e7_0002);

/// Redirect the per-user data and config directories into `root`.
fn redirect_user_dirs(root: &Path) {
    std::env::set_var("XDG_DATA_HOME", root.join("data"));
    std::env::set_var("XDG_CONFIG_HOME", root.join("config"));
}

fn editor_settings(config_dir: &Path) -> TomlSettingsProvider {
    let mut provider = TomlSettingsProvider::in_dir(config_dir);
    provider.add_group(SettingsGroup::new(
        "Editor:General",
        [
            Setting::boolean("autosave", "Save automatically", false).with_id(AUTOSAVE),
            Setting::range("font-size", "Font size", 12.0, Some(6.0), Some(72.0))
                .with_id(FONT_SIZE),
        ],
    ));
    provider
}

#[test]
#[serial]
#[cfg(target_os = "linux")]
fn test_settings_saved_on_stop_and_loaded_on_start() {
    let temp = TempDir::new().unwrap();
    redirect_user_dirs(temp.path());

    let app = Application::new()
        .with_short_name(APP_NAME)
        .with_arguments(Vec::<String>::new());
    let config_dir = app.config_dir().unwrap();
    assert!(config_dir.starts_with(temp.path()));
    app.add_settings_provider(Box::new(editor_settings(&config_dir)));

    app.start().unwrap();
    assert!(app.set_setting_value("autosave", true, None).unwrap());
    assert!(app.set_setting_value("font-size", 200, None).unwrap());
    assert!(app
        .set_setting_value("autosave", false, Some(SettingsProfile::ALL_USERS_ID))
        .unwrap());
    assert!(!app.set_setting_value("missing", 1, None).unwrap());
    app.stop(0);

    // a fresh application with the same provider layout sees the saved values
    let reloaded = Application::new()
        .with_short_name(APP_NAME)
        .with_arguments(Vec::<String>::new());
    reloaded.add_settings_provider(Box::new(editor_settings(&config_dir)));
    reloaded.start().unwrap();

    let autosave = reloaded.find_setting("autosave").unwrap();
    assert!(autosave.get_as(false, None));
    assert!(!autosave.get_as(true, Some(SettingsProfile::ALL_USERS_ID)));
    let font_size = reloaded.find_setting("font-size").unwrap();
    assert_eq!(font_size.get_as(0.0, None), 72.0);
}

#[test]
#[serial]
#[cfg(target_os = "linux")]
fn test_plugin_property_bag_found_through_data_paths() {
    let temp = TempDir::new().unwrap();
    redirect_user_dirs(temp.path());

    let app = Application::new().with_short_name(APP_NAME);
    let paths = app.data_paths();
    assert_eq!(paths.len(), 2);

    let plugin_id = Uuid::new_v4();
    let property = Uuid::new_v4();

    let mut global = PluginPropertyBag::new(plugin_id);
    global.bag_mut().set_value(property, "from-config").unwrap();
    global.save(&paths[1]).unwrap();

    let mut local = PluginPropertyBag::new(plugin_id);
    local.bag_mut().set_value(property, "from-data").unwrap();
    local.save(&paths[0]).unwrap();

    let bag = app.plugin_property_bag(plugin_id);
    assert_eq!(bag.loaded_from().len(), 2);
    assert_eq!(
        bag.bag().get_value(property, String::new()),
        "from-config".to_string()
    );
}
