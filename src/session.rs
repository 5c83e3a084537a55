//! Capture session controller
//!
//! Turns a validated capture request into a running native-recorder process
//! and a classified outcome. The controller owns the whole child lifecycle:
//! argument construction, stdio policy, interrupt forwarding, and terminal
//! classification.
//!
//! Interrupts are observed at exactly one point, the child wait loop. An
//! interrupt is forwarded to the child as SIGINT so the recorder can finalize
//! its output file; the child is never killed forcibly, and a session ended
//! this way is `Interrupted`, not `Failed`. The child runs in its own process
//! group, so a terminal Ctrl+C reaches the orchestrator alone and the
//! forwarded signal is the only SIGINT the recorder ever sees.

use crate::error::SessionError;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::str::FromStr;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Upper bound substituted for a continuous session, in seconds. The native
/// binary enforces the duration; 24 hours stands in for "until interrupted".
pub const CONTINUOUS_SENTINEL_SECS: u32 = 86_400;

/// Which audio source(s) a capture session targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Internal system audio.
    Internal,
    /// Microphone input.
    Microphone,
    /// Internal audio and microphone mixed.
    Both,
}

impl Mode {
    /// Fixed token passed to the native binary.
    pub fn as_arg(self) -> &'static str {
        match self {
            Mode::Internal => "internal",
            Mode::Microphone => "microphone",
            Mode::Both => "both",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "internal" => Ok(Mode::Internal),
            "microphone" => Ok(Mode::Microphone),
            "both" => Ok(Mode::Both),
            other => Err(format!(
                "unknown mode '{}', expected internal, microphone, or both",
                other
            )),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// Requested session length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureDuration {
    /// Bounded session; the native binary stops itself after this many seconds.
    Seconds(u32),
    /// No time bound; ends only via interrupt. Passed to the binary as the
    /// 24-hour sentinel.
    Continuous,
}

impl CaptureDuration {
    /// Duration argument for the native binary.
    pub fn as_arg(self) -> String {
        match self {
            CaptureDuration::Seconds(secs) => secs.to_string(),
            CaptureDuration::Continuous => CONTINUOUS_SENTINEL_SECS.to_string(),
        }
    }

    pub fn is_continuous(self) -> bool {
        matches!(self, CaptureDuration::Continuous)
    }
}

/// One validated capture request. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub mode: Mode,
    pub duration: CaptureDuration,
    pub output_path: PathBuf,
}

/// Terminal state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The native binary ran to completion with exit status zero.
    Completed,
    /// The session ended via a forwarded interrupt; partial output preserved
    /// by the native binary. Not an error.
    Interrupted,
    /// The native binary exited nonzero without an interrupt.
    Failed,
}

/// Result of one capture session. The output path was passed to the native
/// binary for `Completed` and `Interrupted` outcomes; whether the file exists
/// is the binary's responsibility.
#[derive(Debug)]
pub struct RecordingResult {
    pub outcome: Outcome,
    pub output_path: PathBuf,
    /// Buffered stdout/stderr of the child for bounded sessions; `None` for
    /// continuous sessions, whose stdio passes through live.
    pub diagnostics: Option<String>,
}

/// Resolve the path a capture binary is spawned with. A bare file name gets
/// a `./` prefix so the child comes from the working directory rather than a
/// PATH lookup.
pub fn invocation_path(binary: &Path) -> PathBuf {
    if binary.components().count() == 1 && !binary.is_absolute() {
        Path::new(".").join(binary)
    } else {
        binary.to_path_buf()
    }
}

/// Controller for a single capture session.
pub struct CaptureSession {
    binary: PathBuf,
    request: CaptureRequest,
}

impl CaptureSession {
    pub fn new(binary: PathBuf, request: CaptureRequest) -> Self {
        Self { binary, request }
    }

    /// Argument vector appended to the binary path:
    /// `[output_path, duration_secs, mode]`.
    pub fn build_args(&self) -> Vec<String> {
        vec![
            self.request.output_path.display().to_string(),
            self.request.duration.as_arg(),
            self.request.mode.as_arg().to_string(),
        ]
    }

    /// Launch the native binary and block until it exits.
    ///
    /// `interrupt` is a one-shot future (typically `ctrl_c`); when it
    /// resolves before the child exits, SIGINT is forwarded to the child and
    /// the session keeps waiting for the child's own graceful shutdown.
    pub async fn run<F>(self, interrupt: F) -> Result<RecordingResult, SessionError>
    where
        F: std::future::Future<Output = ()>,
    {
        let live = self.request.duration.is_continuous();

        let mut cmd = Command::new(&self.binary);
        cmd.args(self.build_args());
        // Own process group: a terminal Ctrl+C is not delivered to the child
        // directly, so a recorder that treats a second SIGINT as a hard abort
        // still gets exactly one, the forwarded one.
        #[cfg(unix)]
        cmd.process_group(0);
        if live {
            // Continuous sessions stream the recorder's own progress and
            // interrupt messages straight to the terminal.
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        tracing::info!(
            "Launching capture: {:?} {:?}",
            self.binary,
            self.build_args()
        );

        let mut child = cmd.spawn().map_err(|e| SessionError::SpawnFailed {
            binary: self.binary.clone(),
            reason: e.to_string(),
        })?;

        // Drain pipes concurrently so the child never blocks on a full pipe.
        let stdout_task = child.stdout.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf).await;
                buf
            })
        });
        let stderr_task = child.stderr.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf).await;
                buf
            })
        });

        // Captured up front: wait() holds the child mutably inside the loop.
        let child_pid = child.id();

        tokio::pin!(interrupt);
        let mut interrupted = false;

        let status = loop {
            tokio::select! {
                res = child.wait() => {
                    break res.map_err(|e| SessionError::WaitFailed(e.to_string()))?;
                }
                _ = &mut interrupt, if !interrupted => {
                    tracing::info!("Interrupt received, forwarding to capture child");
                    interrupted = true;
                    forward_interrupt(child_pid);
                }
            }
        };

        let mut diagnostics = None;
        if !live {
            let stdout = collect(stdout_task).await;
            let stderr = collect(stderr_task).await;
            let text: Vec<String> = [stdout, stderr]
                .into_iter()
                .map(|buf| String::from_utf8_lossy(&buf).trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !text.is_empty() {
                diagnostics = Some(text.join("\n"));
            }
        }

        let outcome = classify(status, interrupted);
        tracing::info!("Capture session ended: {:?} (status {})", outcome, status);

        Ok(RecordingResult {
            outcome,
            output_path: self.request.output_path,
            diagnostics,
        })
    }
}

async fn collect(task: Option<tokio::task::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    match task {
        Some(handle) => handle.await.unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Exit status zero is `Completed`, nonzero is `Failed`, and any exit reached
/// after a forwarded interrupt is `Interrupted` regardless of status.
fn classify(status: ExitStatus, interrupted: bool) -> Outcome {
    if interrupted {
        Outcome::Interrupted
    } else if status.success() {
        Outcome::Completed
    } else {
        Outcome::Failed
    }
}

#[cfg(unix)]
fn forward_interrupt(child_pid: Option<u32>) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    // None once the child has been reaped; nothing to forward then.
    if let Some(pid) = child_pid {
        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGINT) {
            tracing::warn!("Failed to forward SIGINT to capture child: {}", e);
        }
    }
}

#[cfg(not(unix))]
fn forward_interrupt(_child_pid: Option<u32>) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(mode: Mode, duration: CaptureDuration) -> CaptureSession {
        CaptureSession::new(
            PathBuf::from("recorder"),
            CaptureRequest {
                mode,
                duration,
                output_path: PathBuf::from("out/recording.wav"),
            },
        )
    }

    #[test]
    fn test_args_continuous_both() {
        let args = session(Mode::Both, CaptureDuration::Continuous).build_args();
        assert_eq!(&args[args.len() - 2..], &["86400", "both"]);
    }

    #[test]
    fn test_args_bounded_internal() {
        let args = session(Mode::Internal, CaptureDuration::Seconds(45)).build_args();
        assert_eq!(&args[args.len() - 2..], &["45", "internal"]);
    }

    #[test]
    fn test_args_start_with_output_path() {
        let args = session(Mode::Microphone, CaptureDuration::Seconds(10)).build_args();
        assert_eq!(args.len(), 3);
        assert_eq!(Path::new(&args[0]), Path::new("out/recording.wav"));
        assert_eq!(args[2], "microphone");
    }

    #[test]
    fn test_invocation_path() {
        assert_eq!(
            invocation_path(Path::new("recorder")),
            PathBuf::from("./recorder")
        );
        assert_eq!(
            invocation_path(Path::new("build/recorder")),
            PathBuf::from("build/recorder")
        );
        assert_eq!(
            invocation_path(Path::new("/usr/local/bin/recorder")),
            PathBuf::from("/usr/local/bin/recorder")
        );
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("internal".parse::<Mode>().unwrap(), Mode::Internal);
        assert_eq!("MICROPHONE".parse::<Mode>().unwrap(), Mode::Microphone);
        assert_eq!("both".parse::<Mode>().unwrap(), Mode::Both);
        assert!("speaker".parse::<Mode>().is_err());
    }

    #[test]
    fn test_duration_args() {
        assert_eq!(CaptureDuration::Seconds(60).as_arg(), "60");
        assert_eq!(CaptureDuration::Continuous.as_arg(), "86400");
        assert!(CaptureDuration::Continuous.is_continuous());
        assert!(!CaptureDuration::Seconds(1).is_continuous());
    }

    #[cfg(unix)]
    mod classification {
        use super::super::*;
        use std::os::unix::process::ExitStatusExt;

        #[test]
        fn test_zero_exit_completes() {
            let status = ExitStatus::from_raw(0);
            assert_eq!(classify(status, false), Outcome::Completed);
        }

        #[test]
        fn test_nonzero_exit_fails() {
            let status = ExitStatus::from_raw(1 << 8);
            assert_eq!(classify(status, false), Outcome::Failed);
        }

        #[test]
        fn test_interrupt_wins_over_exit_status() {
            // A child may exit nonzero (or die to the signal) after a
            // forwarded interrupt; that is still a user stop, not a failure.
            assert_eq!(classify(ExitStatus::from_raw(0), true), Outcome::Interrupted);
            assert_eq!(
                classify(ExitStatus::from_raw(1 << 8), true),
                Outcome::Interrupted
            );
        }
    }
}
