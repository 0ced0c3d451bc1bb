use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_public_catalog() {
    let settings = Settings::default();
    assert_eq!(settings.api_base_url, "https://api.escuelajs.co/api/v1");
    assert_eq!(settings.page_size, 10);
    assert!(settings.resort_on_refresh);
    assert_eq!(settings.export_path, PathBuf::from("products.csv"));
}

#[test]
fn normalizes_trailing_slashes_and_blank_urls() {
    assert_eq!(
        normalize_base_url(" http://localhost:3000/api/v1/ "),
        "http://localhost:3000/api/v1"
    );
    assert_eq!(normalize_base_url("   "), DEFAULT_API_BASE_URL);
}

#[test]
fn file_values_override_defaults() {
    let file_cfg = parse_file_settings(
        r#"
        api_base_url = "http://localhost:3000/api/v1"
        page_size = 25
        resort_on_refresh = false
        "#,
    )
    .expect("parse");
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, file_cfg);

    assert_eq!(settings.api_base_url, "http://localhost:3000/api/v1");
    assert_eq!(settings.page_size, 25);
    assert!(!settings.resort_on_refresh);
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn unknown_file_keys_are_rejected() {
    assert!(parse_file_settings("items_per_page = 5").is_err());
}

#[test]
fn zero_page_size_and_timeout_in_file_are_ignored() {
    let file_cfg =
        parse_file_settings("page_size = 0\nrequest_timeout_secs = 0").expect("parse");
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, file_cfg);
    assert_eq!(settings.page_size, 10);
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn zero_timeout_in_env_is_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[("APP__REQUEST_TIMEOUT_SECS", "0"), ("APP__PAGE_SIZE", "0")]),
    );
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(settings.page_size, 10);
}

#[test]
fn app_prefixed_env_wins_over_short_name() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("CATALOG_API_URL", "http://short.example"),
            ("APP__API_BASE_URL", "http://prefixed.example"),
            ("APP__PAGE_SIZE", "20"),
            ("APP__RESORT_ON_REFRESH", "false"),
            ("APP__EXPORT_PATH", "/tmp/out.csv"),
        ]),
    );
    assert_eq!(settings.api_base_url, "http://prefixed.example");
    assert_eq!(settings.page_size, 20);
    assert!(!settings.resort_on_refresh);
    assert_eq!(settings.export_path, PathBuf::from("/tmp/out.csv"));
}

#[test]
fn malformed_env_values_are_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("APP__PAGE_SIZE", "lots"),
            ("APP__REQUEST_TIMEOUT_SECS", "-1"),
            ("APP__RESORT_ON_REFRESH", "maybe"),
        ]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn explicit_config_path_must_exist() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("catalog_admin_missing_{suffix}.toml"));

    let err = load_settings(Some(&missing)).expect_err("missing file");
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn loads_explicit_config_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("catalog_admin_test_{suffix}.toml"));
    fs::write(&path, "page_size = 7\nlog_filter = \"debug\"\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("settings");
    assert_eq!(settings.page_size, 7);
    assert_eq!(settings.view_options().page_size, 7);

    fs::remove_file(path).expect("cleanup");
}
