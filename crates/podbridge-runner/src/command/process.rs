use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use podbridge_core::{PodError, PodResult};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::{info, warn};

use super::{CommandRunner, CommandSpec, ProcessOutput, StreamMode};

/// A child process managed within its own process group, so that a timeout
/// takes down everything it spawned (`xcodebuild` forks compilers, `pod` forks
/// `git`).
pub struct ManagedChild {
    child: tokio::process::Child,
    pgid: i32,
}

impl ManagedChild {
    /// Kill the entire process group.
    /// Sends SIGTERM first, waits grace_period, then SIGKILL.
    pub async fn kill_group(&mut self, grace_period: Duration) {
        if let Err(e) = kill(Pid::from_raw(-self.pgid), Signal::SIGTERM) {
            // ESRCH means the group is already gone
            if e != nix::errno::Errno::ESRCH {
                warn!("SIGTERM to process group {} failed: {e}", self.pgid);
            }
            return;
        }

        if tokio::time::timeout(grace_period, self.child.wait())
            .await
            .is_err()
        {
            if let Err(e) = kill(Pid::from_raw(-self.pgid), Signal::SIGKILL) {
                if e != nix::errno::Errno::ESRCH {
                    warn!("SIGKILL to process group {} failed: {e}", self.pgid);
                }
            }
            let _ = self.child.wait().await;
        }
    }
}

/// Runs commands as real OS processes, one at a time, each bounded by a timeout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
    kill_grace: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration, kill_grace: Duration) -> Self {
        Self {
            timeout,
            kill_grace,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600), Duration::from_secs(10))
    }
}

fn spawn_managed(
    spec: &CommandSpec,
) -> PodResult<(ManagedChild, tokio::process::ChildStdout, tokio::process::ChildStderr)> {
    let spawn_error = |source: std::io::Error| PodError::Spawn {
        command: spec.argv.clone(),
        source,
    };

    if spec.argv.is_empty() {
        return Err(spawn_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty command",
        )));
    }

    let mut cmd = Command::new(spec.program());
    cmd.args(spec.args())
        .current_dir(&spec.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // New session, so the child's whole tree shares one process group.
    unsafe {
        cmd.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }

    let mut child = cmd.spawn().map_err(spawn_error)?;
    let exited = || spawn_error(std::io::Error::other("child exited before its pid was read"));
    let pid = child.id().ok_or_else(exited)? as i32;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| spawn_error(std::io::Error::other("stdout was not piped")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| spawn_error(std::io::Error::other("stderr was not piped")))?;

    Ok((ManagedChild { child, pgid: pid }, stdout, stderr))
}

/// Bytes of an echoed stream kept for the caller; the rest was shown live.
const TEE_CAPTURE_LIMIT: usize = 256 * 1024;

/// Drain `rd` to the end, copying each chunk to `echo` as it arrives. When
/// echoing, only the last [`TEE_CAPTURE_LIMIT`] bytes are collected.
async fn pump<R, W>(mut rd: R, mut echo: Option<W>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut collected = Vec::new();
    let mut buf = vec![0u8; 16 * 1024];
    loop {
        let n = rd.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        collected.extend_from_slice(&buf[..n]);
        if let Some(wr) = echo.as_mut() {
            wr.write_all(&buf[..n]).await?;
            wr.flush().await?;
            if collected.len() > TEE_CAPTURE_LIMIT {
                let excess = collected.len() - TEE_CAPTURE_LIMIT;
                collected.drain(..excess);
            }
        }
    }
    Ok(collected)
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(&self, spec: &CommandSpec) -> PodResult<ProcessOutput> {
        let (mut managed, stdout, stderr) = spawn_managed(spec)?;
        let tee = spec.mode == StreamMode::Tee;

        let result = tokio::time::timeout(self.timeout, async {
            tokio::try_join!(
                pump(stdout, tee.then(tokio::io::stdout)),
                pump(stderr, tee.then(tokio::io::stderr)),
                managed.child.wait()
            )
        })
        .await;

        match result {
            Ok(Ok((stdout_bytes, stderr_bytes, status))) => Ok(ProcessOutput {
                exit_code: status.code(),
                stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
                stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            }),
            Ok(Err(e)) => Err(PodError::io(
                format!("collect output of '{}'", spec.command_line()),
                e,
            )),
            Err(_elapsed) => {
                info!(
                    "'{}' timed out after {:?}, killing process group",
                    spec.command_line(),
                    self.timeout
                );
                managed.kill_group(self.kill_grace).await;
                Err(PodError::Timeout {
                    command: spec.argv.clone(),
                    after: self.timeout,
                })
            }
        }
    }
}
