//! Shared helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use unitwatch::{JobMode, ManagerError, TransientProperties, Translator, UnitControl};

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_test_dir(tag: &str) -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = PathBuf::from(format!("/tmp/unitwatch-{}-{}-{}", tag, std::process::id(), id));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// A translator that logs each token to `<dir>/calls.log` and prints a
/// small .network body. Tokens listed in `failing` exit non-zero.
pub fn fake_translator(dir: &Path, failing: &[&str]) -> (Translator, PathBuf) {
    let log = dir.join("calls.log");
    let script = dir.join("translate.sh");

    let mut body = String::from("#!/bin/sh\n");
    body.push_str(&format!("echo \"$1\" >> '{}'\n", log.display()));
    for token in failing {
        body.push_str(&format!(
            "if [ \"$1\" = \"{}\" ]; then echo \"no config for $1\"; exit 1; fi\n",
            token
        ));
    }
    body.push_str("printf '[Match]\\nName=%s\\n\\n[Network]\\n# from %s\\n' \"$1\" \"$2\"\n");
    fs::write(&script, body).unwrap();

    // Run through sh so the freshly written file is never exec'd directly
    let cmd = format!("/bin/sh '{}'", script.display());
    (Translator::from_command_line(&cmd).unwrap(), log)
}

pub fn translator_calls(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn expected_network_body(token: &str, source: &Path) -> String {
    format!("[Match]\nName={}\n\n[Network]\n# from {}\n", token, source.display())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enable {
        files: Vec<PathBuf>,
        runtime: bool,
        force: bool,
    },
    Reload,
    Restart(String),
    Start(String),
    Transient {
        name: String,
        mode: JobMode,
        properties: TransientProperties,
    },
}

/// Records every request instead of talking to systemd
#[derive(Debug, Default)]
pub struct RecordingControl {
    calls: Mutex<Vec<Call>>,
    fail_restart: Option<String>,
    fail_transient: bool,
}

impl RecordingControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject restarts of `name`
    pub fn failing_restart(name: &str) -> Self {
        Self {
            fail_restart: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_transient() -> Self {
        Self {
            fail_transient: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn restarts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Restart(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn transients(&self) -> Vec<(String, TransientProperties)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Transient {
                    name, properties, ..
                } => Some((name, properties)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn rejected(operation: &'static str, target: &str) -> ManagerError {
    ManagerError::Call {
        operation,
        target: target.to_string(),
        source: zbus::Error::Failure("rejected by test".into()),
    }
}

impl UnitControl for RecordingControl {
    async fn enable_unit_files(
        &self,
        files: &[PathBuf],
        runtime: bool,
        force: bool,
    ) -> Result<(), ManagerError> {
        self.record(Call::Enable {
            files: files.to_vec(),
            runtime,
            force,
        });
        Ok(())
    }

    async fn daemon_reload(&self) -> Result<(), ManagerError> {
        self.record(Call::Reload);
        Ok(())
    }

    async fn restart_unit(&self, name: &str) -> Result<(), ManagerError> {
        if self.fail_restart.as_deref() == Some(name) {
            return Err(rejected("RestartUnit", name));
        }
        self.record(Call::Restart(name.to_string()));
        Ok(())
    }

    async fn start_unit(&self, name: &str) -> Result<(), ManagerError> {
        self.record(Call::Start(name.to_string()));
        Ok(())
    }

    async fn start_transient_unit(
        &self,
        name: &str,
        mode: JobMode,
        properties: &TransientProperties,
    ) -> Result<(), ManagerError> {
        if self.fail_transient {
            return Err(rejected("StartTransientUnit", name));
        }
        self.record(Call::Transient {
            name: name.to_string(),
            mode,
            properties: properties.clone(),
        });
        Ok(())
    }
}
