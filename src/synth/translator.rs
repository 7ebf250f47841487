//! External translation command
//!
//! The translator is invoked as `<program> [args...] <token> <source>` and
//! prints unit-file text. Stdout and stderr share one pipe, so the captured
//! text keeps the order the translator wrote it in.

use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use std::os::fd::OwnedFd;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::SynthError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translator {
    program: String,
    args: Vec<String>,
}

impl Translator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Parse a command line such as `"/bin/sh /opt/gentoo-to-networkd"`
    pub fn from_command_line(cmd: &str) -> Result<Self, SynthError> {
        let parts = shlex::split(cmd).ok_or_else(|| SynthError::InvalidCommand(cmd.to_string()))?;
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| SynthError::InvalidCommand(cmd.to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the translator for one interface token
    ///
    /// Blocks until the command exits; there is no timeout.
    pub async fn translate(&self, token: &str, source: &Path) -> Result<String, SynthError> {
        log::debug!("Running {} {} {}", self.program, token, source.display());

        let (reader, writer) = output_pipe().map_err(|e| self.spawn_error(e))?;
        let stderr = writer.try_clone().map_err(|e| self.spawn_error(e))?;

        // The command (and the parent's copies of the write end) is dropped
        // once spawned, so the read below sees EOF when the child exits
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(token)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let mut output = Vec::new();
        let read = tokio::fs::File::from_std(std::fs::File::from(reader))
            .read_to_end(&mut output)
            .await;
        let status = child.wait().await.map_err(|e| self.output_error(e))?;
        read.map_err(|e| self.output_error(e))?;

        let combined = String::from_utf8_lossy(&output).into_owned();
        if !status.success() {
            return Err(SynthError::Translator {
                token: token.to_string(),
                status: describe_status(status),
                output: combined,
            });
        }
        Ok(combined)
    }

    fn spawn_error(&self, source: std::io::Error) -> SynthError {
        SynthError::Spawn {
            program: self.program.clone(),
            source,
        }
    }

    fn output_error(&self, source: std::io::Error) -> SynthError {
        SynthError::Output {
            program: self.program.clone(),
            source,
        }
    }
}

/// One pipe for both output streams, `(read, write)`
fn output_pipe() -> std::io::Result<(OwnedFd, OwnedFd)> {
    pipe2(OFlag::O_CLOEXEC).map_err(std::io::Error::from)
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {}", code),
        None => status.to_string(),
    }
}
