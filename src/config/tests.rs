use rstest::rstest;

use super::*;

#[test]
fn default() {
    let config = Config::default();
    assert_eq!(config.label, "hookstores");
    assert!(!config.log_actions);
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn deserialize_partial() {
    let config: Config = serde_json::from_str(r#"{ "log_actions": true }"#).unwrap();
    assert_eq!(
        config,
        Config {
            log_actions: true,
            ..Config::new()
        }
    );
}

#[test]
fn deserialize_full() {
    let config: Config = serde_json::from_str(
        r#"{ "label": "la-taverne", "log_actions": true, "log_level": "info" }"#,
    )
    .unwrap();
    assert_eq!(config.label, "la-taverne");
    assert!(config.log_actions);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn deserialize_unknown_level() {
    assert!(serde_json::from_str::<Config>(r#"{ "log_level": "loud" }"#).is_err());
}

#[rstest]
#[case(LogLevel::Trace, "trace")]
#[case(LogLevel::Debug, "debug")]
#[case(LogLevel::Info, "info")]
fn level_display(#[case] level: LogLevel, #[case] s: &str) {
    assert_eq!(level.to_string(), s);
}
