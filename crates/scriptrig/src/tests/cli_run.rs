//! CLI runner behaviour with a substituted configuration loader.

use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::Result;
use scriptrig_config::{ColorMode, Config};

use super::support::{FakeService, Rig, service_replies};
use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

struct Captured {
    exit_code: ExitCode,
    stdout: String,
    stderr: String,
}

fn run_cli(config: Config, args: &[&str]) -> Captured {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit_code = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr, false);
        let args = std::iter::once("scriptrig")
            .chain(args.iter().copied())
            .map(OsString::from);
        run_with_loader(args, &mut io, &StaticConfigLoader { config })
    };
    Captured {
        exit_code,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    }
}

#[test]
fn help_is_written_to_stdout() {
    let captured = run_cli(Config::default(), &["--help"]);
    assert_eq!(captured.exit_code, ExitCode::SUCCESS);
    assert!(captured.stdout.contains("PATTERN"), "stdout: {}", captured.stdout);
    assert!(captured.stderr.is_empty());
}

#[test]
fn surplus_arguments_are_a_usage_error() {
    let captured = run_cli(Config::default(), &["*.lua", "extra"]);
    assert_eq!(captured.exit_code, ExitCode::FAILURE);
    assert!(!captured.stderr.is_empty());
}

#[test]
fn missing_server_binary_fails_before_provisioning() -> Result<()> {
    let rig = Rig::new()?;
    let service = FakeService::spawn(service_replies)?;
    let config = Config {
        server_binary: String::from("/nonexistent/service"),
        ..rig.config(&service)
    };

    let captured = run_cli(config, &[]);

    assert_eq!(captured.exit_code, ExitCode::FAILURE);
    assert!(
        captured.stderr.contains("failed to spawn service binary"),
        "stderr: {}",
        captured.stderr
    );
    assert!(rig.admin_log().is_empty());
    Ok(())
}

#[test]
fn positional_pattern_selects_scripts() -> Result<()> {
    let rig = Rig::new()?;
    rig.add_script("auth_login.lua", "return 1")?;
    rig.add_script("broken.lua", "-- error: panic")?;
    let service = FakeService::spawn(service_replies)?;
    let config = Config {
        server_binary: rig.write_server()?,
        color: ColorMode::Never,
        ..rig.config(&service)
    };

    let captured = run_cli(config, &["auth_*"]);

    assert_eq!(captured.exit_code, ExitCode::SUCCESS, "stderr: {}", captured.stderr);
    assert!(captured.stdout.contains("✓ "), "stdout: {}", captured.stdout);
    assert!(captured.stdout.contains("auth_login.lua"));
    assert!(!captured.stdout.contains("broken.lua"));
    assert!(captured.stdout.ends_with("1 passed, 0 failed\n"));
    assert_eq!(rig.server_log(), ["stopped"]);
    Ok(())
}

#[test]
fn failing_script_sets_a_failure_exit_code() -> Result<()> {
    let rig = Rig::new()?;
    rig.add_script("broken.lua", "-- error: panic")?;
    let service = FakeService::spawn(service_replies)?;
    let config = Config {
        server_binary: rig.write_server()?,
        color: ColorMode::Always,
        ..rig.config(&service)
    };

    let captured = run_cli(config, &[]);

    assert_eq!(captured.exit_code, ExitCode::FAILURE);
    assert!(captured.stdout.contains("\x1b[91m✘ "), "stdout: {}", captured.stdout);
    assert!(captured.stdout.contains("=> Status code: 200"));
    assert!(captured.stdout.contains(r#"=> Response body: {"ok":true}"#));
    Ok(())
}
