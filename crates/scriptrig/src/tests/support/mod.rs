//! Shared fixtures for harness-level tests.
//!
//! [`Rig`] lays out a temporary workspace holding a stand-in service process,
//! an admin script that logs its invocations, and a script corpus, so tests
//! can observe exactly how often the harness tears things down.

mod fake_service;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use scriptrig_config::Config;
use tempfile::TempDir;

pub(crate) use fake_service::{FakeService, RecordedRequest, Reply};

use crate::credentials::{CredentialProvisioner, ProcessAdmin, RandomIdentity};
use crate::discovery::Corpus;
use crate::executor::{HttpTransport, TestExecutor};
use crate::harness::Harness;
use crate::supervisor::{HttpProbe, ReadinessPolicy, ServerCommand};

pub(crate) const PRINCIPAL_ID: &str = "42";
pub(crate) const SECRET: &str = "hunter2";

/// Temporary workspace for one harness run.
pub(crate) struct Rig {
    dir: TempDir,
}

impl Rig {
    pub(crate) fn new() -> Result<Self> {
        let rig = Self {
            dir: TempDir::new().context("temp dir")?,
        };
        fs::create_dir(rig.scripts_dir()).context("create script dir")?;
        rig.write_admin("exit 0")?;
        Ok(rig)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub(crate) fn scripts_dir(&self) -> PathBuf {
        self.path("scripts")
    }

    pub(crate) fn add_script(&self, name: &str, contents: &str) -> Result<()> {
        fs::write(self.scripts_dir().join(name), contents).context("write script")
    }

    /// Installs an admin command whose `remove` runs `remove_body`.
    pub(crate) fn write_admin(&self, remove_body: &str) -> Result<()> {
        let script = format!(
            "#!/bin/sh\n\
             echo \"$1 $2\" >> '{log}'\n\
             case \"$1\" in\n\
             add) echo 'Account ID: {PRINCIPAL_ID}'; echo 'Account secret: {SECRET}' ;;\n\
             remove) {remove_body} ;;\n\
             esac\n",
            log = self.path("admin.log").display(),
        );
        write_executable(&self.path("service-admin"), &script)
    }

    /// Command for a long-running process that logs each SIGTERM it handles.
    pub(crate) fn server_command(&self) -> ServerCommand {
        ServerCommand::new("sh").arg("-c").arg(self.server_body())
    }

    /// Installs the same process as an executable and returns its path.
    pub(crate) fn write_server(&self) -> Result<String> {
        let path = self.path("service");
        write_executable(&path, &format!("#!/bin/sh\n{}\n", self.server_body()))?;
        Ok(path.display().to_string())
    }

    fn server_body(&self) -> String {
        format!(
            "trap 'echo stopped >> \"{}\"; exit 0' TERM; while :; do sleep 0.05; done",
            self.path("server.log").display()
        )
    }

    pub(crate) fn admin_log(&self) -> Vec<String> {
        read_lines(&self.path("admin.log"))
    }

    pub(crate) fn server_log(&self) -> Vec<String> {
        read_lines(&self.path("server.log"))
    }

    pub(crate) fn harness(
        &self,
        service: &FakeService,
        server: ServerCommand,
    ) -> Result<Harness<HttpProbe, ProcessAdmin, RandomIdentity, HttpTransport>> {
        let probe = HttpProbe::new(service.url(), Duration::from_millis(500))?;
        let transport = HttpTransport::new(
            format!("{}/script", service.url()),
            Some(Duration::from_secs(5)),
        )?;
        let scripts = Utf8PathBuf::from_path_buf(self.scripts_dir())
            .map_err(|path| anyhow::anyhow!("non-UTF-8 temp path {path:?}"))?;
        Ok(Harness::new(
            server,
            probe,
            ReadinessPolicy {
                ready_status: 401,
                poll_interval: Duration::from_millis(20),
                timeout: Duration::from_secs(5),
            },
            CredentialProvisioner::new(
                ProcessAdmin::new(self.path("service-admin")),
                RandomIdentity,
                "scriptrig",
                "scriptrig.test",
            ),
            TestExecutor::new(transport, "__account_id__"),
            Corpus::new(scripts, "*.lua"),
        ))
    }

    /// Configuration pointing the real CLI wiring at this workspace.
    pub(crate) fn config(&self, service: &FakeService) -> Config {
        Config {
            admin_binary: self.path("service-admin").display().to_string(),
            service_url: service.url(),
            script_dir: self.scripts_dir().display().to_string(),
            poll_interval_ms: 20,
            probe_timeout_ms: 500,
            startup_timeout_secs: 5,
            request_timeout_secs: 5,
            ..Config::default()
        }
    }
}

/// Answers probes as a live service and echoes scripts as successes.
pub(crate) fn service_replies(request: &RecordedRequest) -> Reply {
    match request.method.as_str() {
        "GET" => Reply::json(401, r#"{"error":"unauthorized"}"#),
        _ if request.body.contains("hangup") => Reply::Hangup,
        _ => Reply::json(200, r#"{"ok":true}"#),
    }
}

fn write_executable(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).context("write executable")?;
    let mut permissions = fs::metadata(path).context("stat executable")?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).context("chmod executable")
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|text| text.lines().map(str::to_owned).collect())
        .unwrap_or_default()
}
