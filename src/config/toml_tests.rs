//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.gate.mode.is_none());
        assert!(config.gate.wait_ms.is_none());
        assert!(config.output.format.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [gate]
            mode = "throttle"
            wait_ms = 150
            max_wait_ms = 900
            leading = false
            trailing = true

            [output]
            format = "json"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        let gate = &config.gate;

        assert_eq!(gate.mode.as_deref(), Some("throttle"));
        assert_eq!(gate.wait_ms, Some(150));
        assert_eq!(gate.max_wait_ms, Some(900));
        assert_eq!(gate.leading, Some(false));
        assert_eq!(gate.trailing, Some(true));
        assert_eq!(config.output.format.as_deref(), Some("json"));
    }

    #[test]
    fn parse_negative_wait() {
        let config = TomlConfig::parse("[gate]\nwait_ms = -20\n").unwrap();
        assert_eq!(config.gate.wait_ms, Some(-20));
    }

    #[test]
    fn parse_partial_sections() {
        let config = TomlConfig::parse("[output]\nformat = \"text\"\n").unwrap();

        assert!(config.gate.mode.is_none());
        assert_eq!(config.output.format.as_deref(), Some("text"));
    }
}

mod rejection {
    use super::*;

    #[test]
    fn unknown_section_is_rejected() {
        let result = TomlConfig::parse("[server]\nport = 80\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_gate_field_is_rejected() {
        let result = TomlConfig::parse("[gate]\nwait = 100\n");
        assert!(result.is_err());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result = TomlConfig::parse("[gate]\nleading = \"yes\"\n");
        assert!(result.is_err());
    }
}

mod template {
    use super::*;

    #[test]
    fn template_parses() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        assert_eq!(config.gate.mode.as_deref(), Some("debounce"));
        assert_eq!(config.gate.wait_ms, Some(300));
        assert_eq!(config.output.format.as_deref(), Some("text"));
    }

    #[test]
    fn template_documents_every_field() {
        let template = default_config_template();

        for key in ["mode", "wait_ms", "max_wait_ms", "leading", "trailing", "format"] {
            assert!(template.contains(key), "template is missing {key}");
        }
    }
}
