//! Integration tests for logging system

use bridge_traits::logging::LogLevel;
use core_runtime::config::SILENT_PLACEHOLDER_SOURCE;
use core_runtime::logging::{display_source, init_logging, LogFormat, LoggingConfig};

#[test]
fn test_logging_initialization_only_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);
    assert!(init_logging(config.clone()).is_ok());

    // A global subscriber is already installed for this process
    assert!(init_logging(config).is_err());
}

#[test]
fn test_invalid_filter_is_reported() {
    let config = LoggingConfig::default().with_filter("core_playback=loud");
    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("Invalid log filter"));
}

#[test]
fn test_display_source_hides_payloads() {
    let shown = display_source(SILENT_PLACEHOLDER_SOURCE);
    assert!(!shown.contains("UklGR"));
    assert!(shown.starts_with("data:audio/wav"));
}

#[test]
fn test_display_source_strips_query() {
    assert_eq!(
        display_source("https://cdn.example/audio/rain.ogg?token=secret&exp=1"),
        "https://cdn.example/audio/rain.ogg"
    );
    assert_eq!(display_source(""), "");
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
