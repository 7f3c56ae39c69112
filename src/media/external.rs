//! Bounded-time invocation of external programs (probing, frame extraction).

use crossbeam_channel::bounded;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

use crate::error::DegradeReason;
use crate::utils::config::ExternalToolConsts;

/// Short display name for a program path (`/usr/bin/ffprobe` -> `ffprobe`).
pub fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Run `cmd` to completion within `timeout` and return its stdout.
///
/// Stdin and stderr are discarded. Spawn failure with `NotFound` is [`DegradeReason::ToolMissing`];
/// exceeding the deadline kills the child and yields [`DegradeReason::ToolTimeout`]; a non-zero exit is
/// [`DegradeReason::ToolFailed`].
///
/// Stdout is drained on a detached thread. If the child leaves a grandchild holding the pipe open,
/// that thread lingers until the grandchild closes it; the call itself still returns by the deadline.
pub fn run_with_timeout(
    mut cmd: Command,
    tool: &str,
    timeout: Duration,
) -> Result<Vec<u8>, DegradeReason> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(DegradeReason::ToolMissing {
                tool: tool.to_string(),
            });
        }
        Err(e) => return Err(DegradeReason::Io(format!("spawn {tool}: {e}"))),
    };
    let deadline = Instant::now() + timeout;

    // Drain stdout concurrently so a chatty child never blocks on a full pipe.
    let (out_tx, out_rx) = bounded::<Vec<u8>>(1);
    if let Some(mut stdout) = child.stdout.take() {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf);
            let _ = out_tx.send(buf);
        });
    } else {
        let _ = out_tx.send(Vec::new());
    }

    let timed_out = || DegradeReason::ToolTimeout {
        tool: tool.to_string(),
        secs: timeout.as_secs(),
    };
    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill_and_reap(&mut child);
            return Err(timed_out());
        }
        Err(e) => {
            kill_and_reap(&mut child);
            return Err(DegradeReason::Io(format!("wait for {tool}: {e}")));
        }
    };

    if !status.success() {
        return Err(DegradeReason::ToolFailed {
            tool: tool.to_string(),
            status: status.to_string(),
        });
    }

    // Output can lag the exit briefly; never wait much past the deadline for it.
    let grace = deadline
        .saturating_duration_since(Instant::now())
        .max(ExternalToolConsts::OUTPUT_GRACE);
    out_rx.recv_timeout(grace).map_err(|_| timed_out())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_tool_missing() {
        let cmd = Command::new("/nonexistent/definitely-not-ffprobe");
        let err = run_with_timeout(cmd, "ffprobe", Duration::from_secs(1)).unwrap_err();
        assert_eq!(
            err,
            DegradeReason::ToolMissing {
                tool: "ffprobe".to_string()
            }
        );
    }

    #[test]
    fn tool_name_strips_directories() {
        assert_eq!(tool_name(Path::new("/usr/bin/ffmpeg")), "ffmpeg");
        assert_eq!(tool_name(Path::new("ffprobe")), "ffprobe");
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("printf hello");
        let out = run_with_timeout(cmd, "sh", Duration::from_secs(10)).unwrap();
        assert_eq!(out, b"hello");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_tool_failed() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("exit 3");
        let err = run_with_timeout(cmd, "sh", Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, DegradeReason::ToolFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn slow_program_times_out() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let start = Instant::now();
        let err = run_with_timeout(cmd, "sleep", Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, DegradeReason::ToolTimeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn grandchild_holding_stdout_does_not_outlast_deadline() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("sleep 5 & exit 0");
        let start = Instant::now();
        let err = run_with_timeout(cmd, "sh", Duration::from_millis(300)).unwrap_err();
        assert!(matches!(err, DegradeReason::ToolTimeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
