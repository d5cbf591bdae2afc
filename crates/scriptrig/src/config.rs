//! Configuration loading for the CLI.
//!
//! Leading arguments that name configuration flags are handed to
//! `ortho_config`; everything from the first other token onwards is parsed by
//! clap as the harness's own arguments.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use scriptrig_config::Config;

use crate::errors::AppError;

/// Flags accepted by the configuration loader. Every one takes a value.
///
/// Keep in sync with the fields of [`Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--server-binary",
    "--admin-binary",
    "--service-url",
    "--script-path",
    "--script-dir",
    "--default-pattern",
    "--placeholder-token",
    "--identity-prefix",
    "--identity-domain",
    "--ready-status",
    "--poll-interval-ms",
    "--probe-timeout-ms",
    "--startup-timeout-secs",
    "--request-timeout-secs",
    "--log-filter",
    "--log-format",
    "--color",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the filtered configuration arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify_flag(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Stop;
    }
    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*text, false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

#[derive(Debug)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(program) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut index = 1;
    while let Some(argument) = args.get(index) {
        match classify_flag(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                index += 1;
                if needs_value {
                    if let Some(value) = args.get(index) {
                        config_arguments.push(value.clone());
                        index += 1;
                    }
                }
            }
            FlagAction::Stop => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments,
        command_start: index,
    }
}

/// Rebuilds the argument list clap sees: the program name plus the tail.
pub(crate) fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(split.command_start))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--script-dir=scripts", FlagAction::Include { needs_value: false })]
    #[case("--script-dir", FlagAction::Include { needs_value: true })]
    #[case("--unknown", FlagAction::Stop)]
    #[case("*.lua", FlagAction::Stop)]
    fn classifies_flags(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(classify_flag(OsStr::new(argument)), expected);
    }

    #[test]
    fn splits_config_flags_from_the_pattern() {
        let args = os_args(&[
            "scriptrig",
            "--script-dir",
            "scripts",
            "--log-filter=debug",
            "auth_*.lua",
        ]);
        let split = split_config_arguments(&args);

        assert_eq!(
            split.config_arguments,
            os_args(&["scriptrig", "--script-dir", "scripts", "--log-filter=debug"])
        );
        assert_eq!(
            prepare_cli_arguments(&args, &split),
            os_args(&["scriptrig", "auth_*.lua"])
        );
    }

    #[test]
    fn flags_after_the_pattern_reach_clap() {
        let args = os_args(&["scriptrig", "*.lua", "--script-dir", "x"]);
        let split = split_config_arguments(&args);

        assert_eq!(split.config_arguments, os_args(&["scriptrig"]));
        assert_eq!(split.command_start, 1);
    }

    #[test]
    fn dangling_flag_is_left_for_the_loader() {
        let args = os_args(&["scriptrig", "--service-url"]);
        let split = split_config_arguments(&args);

        assert_eq!(split.config_arguments, args);
        assert_eq!(split.command_start, 2);
    }

    #[test]
    fn ortho_loader_applies_command_line_flags() {
        let config = OrthoConfigLoader
            .load(&os_args(&["scriptrig", "--ready-status", "418"]))
            .expect("load configuration");
        assert_eq!(config.ready_status, 418);
    }

    #[test]
    fn empty_arguments_split_cleanly() {
        let split = split_config_arguments(&[]);
        assert!(split.config_arguments.is_empty());
        assert_eq!(split.command_start, 0);
    }
}
