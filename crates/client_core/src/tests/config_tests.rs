use super::{
    apply_env_overrides, load_settings_from, normalize_api_base_url, prepare_api_base_url,
    SettingsError, StorefrontSettings,
};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn adds_http_scheme_to_bare_host() {
    assert_eq!(
        normalize_api_base_url("localhost:3000"),
        "http://localhost:3000"
    );
}

#[test]
fn strips_trailing_slashes_and_whitespace() {
    assert_eq!(
        normalize_api_base_url("  https://shop.example.com/api/  "),
        "https://shop.example.com/api"
    );
}

#[test]
fn empty_url_falls_back_to_default() {
    assert_eq!(
        normalize_api_base_url("   "),
        StorefrontSettings::default().api_base_url
    );
}

#[test]
fn prepared_url_keeps_path_prefix() {
    let url = prepare_api_base_url("shop.example.com/api/v1/").expect("valid url");
    assert_eq!(url.as_str(), "http://shop.example.com/api/v1");
}

#[test]
fn rejects_unparseable_url() {
    let err = prepare_api_base_url("http://exa mple.com").expect_err("must fail");
    assert!(matches!(err, SettingsError::InvalidUrl { .. }));
}

#[test]
fn rejects_url_that_cannot_be_a_base() {
    let err = prepare_api_base_url("mailto:ops@example.com?via=http://shop")
        .expect_err("must fail");
    assert!(matches!(err, SettingsError::UnsupportedUrl(_)));
    assert_eq!(
        err.to_string(),
        "api base url 'mailto:ops@example.com?via=http://shop' cannot be used as a base url"
    );
}

#[test]
fn missing_settings_file_yields_defaults() {
    let settings = load_settings_from(&env::temp_dir().join("storefront-does-not-exist.toml"))
        .expect("defaults");
    assert_eq!(settings, StorefrontSettings::default());
}

#[test]
fn settings_file_overrides_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("storefront_settings_test_{suffix}.toml"));
    fs::write(
        &path,
        "api_base_url = \"https://lessons.example.com\"\nlog_filter = \"debug\"\n",
    )
    .expect("write settings");

    let settings = load_settings_from(&path).expect("load settings");
    assert_eq!(settings.api_base_url, "https://lessons.example.com");
    assert_eq!(settings.log_filter, "debug");

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn malformed_settings_file_is_an_error() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("storefront_settings_bad_{suffix}.toml"));
    fs::write(&path, "api_base_url = [1, 2").expect("write settings");

    let err = load_settings_from(&path).expect_err("must fail");
    assert!(matches!(err, SettingsError::Parse { .. }));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn app_prefixed_env_wins_over_legacy_name() {
    let env_vars: HashMap<&str, &str> = HashMap::from([
        ("STOREFRONT_API_URL", "http://legacy:1"),
        ("APP__API_BASE_URL", "http://preferred:2"),
        ("APP__LOG_FILTER", "client_core=debug"),
    ]);
    let settings = apply_env_overrides(StorefrontSettings::default(), |key| {
        env_vars.get(key).map(|v| v.to_string())
    });
    assert_eq!(settings.api_base_url, "http://preferred:2");
    assert_eq!(settings.log_filter, "client_core=debug");
}
