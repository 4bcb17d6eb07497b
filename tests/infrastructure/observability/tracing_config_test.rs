use rvc_server::infrastructure::observability::{DEFAULT_FILTER, TracingConfig};

#[test]
fn given_default_config_when_created_then_crate_logs_at_debug_in_text() {
    let config = TracingConfig::default();

    assert_eq!(config.environment, "local");
    assert!(!config.json_format);
    assert!(config.default_filter.contains("rvc_server=debug"));
}

#[test]
fn given_level_when_applied_then_default_filter_is_replaced() {
    let config = TracingConfig::new("prod")
        .with_json(true)
        .with_level(Some("warn,rvc_server=info"));

    assert_eq!(config.environment, "prod");
    assert!(config.json_format);
    assert_eq!(config.default_filter, "warn,rvc_server=info");
}

#[test]
fn given_blank_or_missing_level_when_applied_then_default_filter_is_kept() {
    assert_eq!(
        TracingConfig::new("test").with_level(None).default_filter,
        DEFAULT_FILTER
    );
    assert_eq!(
        TracingConfig::new("test").with_level(Some("  ")).default_filter,
        DEFAULT_FILTER
    );
}
