//! Tests for CLI argument parsing.

use std::path::PathBuf;

use clap::Parser;

use super::cli::{Cli, Command, FormatArg, ModeArg};
use super::{OutputFormat, defaults};
use crate::gate::Mode;

mod parsing {
    use super::*;

    #[test]
    fn parse_no_args() {
        let cli = Cli::parse_from_iter(["rategate"]);

        assert!(cli.command.is_none());
        assert!(cli.mode.is_none());
        assert!(cli.wait.is_none());
        assert!(cli.max_wait.is_none());
        assert!(cli.leading.is_none());
        assert!(cli.trailing.is_none());
        assert!(cli.format.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_gate_options() {
        let cli = Cli::parse_from_iter([
            "rategate",
            "--mode",
            "throttle",
            "--wait",
            "250",
            "--max-wait",
            "1000",
            "--leading",
            "false",
            "--trailing",
            "true",
        ]);

        assert_eq!(cli.mode, Some(ModeArg::Throttle));
        assert_eq!(cli.wait, Some(250));
        assert_eq!(cli.max_wait, Some(1000));
        assert_eq!(cli.leading, Some(false));
        assert_eq!(cli.trailing, Some(true));
    }

    #[test]
    fn parse_negative_wait() {
        let cli = Cli::parse_from_iter(["rategate", "--wait", "-5"]);
        assert_eq!(cli.wait, Some(-5));
    }

    #[test]
    fn parse_format_and_config() {
        let cli = Cli::parse_from_iter(["rategate", "--format", "json", "-c", "gate.toml", "-v"]);

        assert_eq!(cli.format, Some(FormatArg::Json));
        assert_eq!(cli.config, Some(PathBuf::from("gate.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn rejects_unknown_mode() {
        let result = Cli::try_parse_from(["rategate", "--mode", "burst"]);
        assert!(result.is_err());
    }
}

mod init_command {
    use super::*;

    #[test]
    fn init_uses_default_output() {
        let cli = Cli::parse_from_iter(["rategate", "init"]);

        assert!(matches!(
            cli.command,
            Some(Command::Init { ref output }) if output == &PathBuf::from(defaults::CONFIG_FILE)
        ));
    }

    #[test]
    fn init_with_custom_output() {
        let cli = Cli::parse_from_iter(["rategate", "init", "-o", "custom.toml"]);

        assert!(matches!(
            cli.command,
            Some(Command::Init { ref output }) if output == &PathBuf::from("custom.toml")
        ));
    }

    #[test]
    fn run_mode_has_no_command() {
        let cli = Cli::parse_from_iter(["rategate", "--wait", "10"]);
        assert!(cli.command.is_none());
    }
}

mod conversions {
    use super::*;

    #[test]
    fn mode_arg_converts_to_mode() {
        assert_eq!(Mode::from(ModeArg::Debounce), Mode::Debounce);
        assert_eq!(Mode::from(ModeArg::Throttle), Mode::Throttle);
    }

    #[test]
    fn format_arg_converts_to_output_format() {
        assert_eq!(OutputFormat::from(FormatArg::Text), OutputFormat::Text);
        assert_eq!(OutputFormat::from(FormatArg::Json), OutputFormat::Json);
    }
}
