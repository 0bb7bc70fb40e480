//! Download bridge - runs the external download worker.
//!
//! The worker is an opaque program launched once per request as
//! `<program> <args...> <platform> <url> <format>`. Arguments are passed as an
//! argument vector; no shell ever sees the url.
//!
//! # Worker Output Contract
//!
//! On completion the worker prints one JSON object to stdout containing at
//! least `success` (bool), plus `file_path` and/or `error` when relevant:
//!
//! ```json
//! { "success": true, "file_path": "downloads/clip.mp4", "title": "clip" }
//! ```
//!
//! A `"success": false` object is a normal result, not an error. Everything
//! else (spawn failure, non-zero exit, timeout, unparseable stdout) is a
//! [`BridgeError`].

use std::{path::PathBuf, process::Stdio, sync::Arc, time::Duration};

use serde_json::Value;
use tokio::{process::Command, sync::Semaphore};

use crate::models::download::{MediaFormat, Platform};

/// Ways a worker run can fail before yielding a usable result.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to start worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("worker timed out after {0:?}")]
    Timeout(Duration),

    #[error("worker exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("malformed worker output: {0}")]
    Malformed(String),

    #[error("worker pool is shut down")]
    PoolClosed,
}

/// Program and leading arguments used to launch the worker.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Parsed worker result.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerOutcome {
    /// The full JSON object, returned to the caller untouched
    pub payload: Value,
    pub success: bool,
    pub file_path: Option<String>,
    pub error: Option<String>,
}

/// Launches worker processes with a timeout and a cap on how many run at once.
#[derive(Debug)]
pub struct DownloadBridge {
    command: WorkerCommand,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl DownloadBridge {
    /// `max_in_flight` is clamped to at least one worker.
    pub fn new(command: WorkerCommand, timeout: Duration, max_in_flight: usize) -> Self {
        Self {
            command,
            timeout,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Worker slots not currently held by a running download.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run one download attempt and parse its result.
    ///
    /// Waits for a free worker slot first; the timeout only covers the
    /// process itself. On unix the worker leads its own process group, and
    /// the whole group is killed when this future finishes or is dropped, so
    /// nothing the worker spawned outlives its slot.
    pub async fn invoke(
        &self,
        platform: Platform,
        url: &str,
        format: MediaFormat,
    ) -> Result<WorkerOutcome, BridgeError> {
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| BridgeError::PoolClosed)?;

        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .arg(platform.as_str())
            .arg(url)
            .arg(format.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(BridgeError::Spawn)?;
        let _group = ProcessGroup::led_by(child.id());

        tracing::info!(%platform, %format, pid = child.id(), "worker started");

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(BridgeError::Spawn)?,
            Err(_) => {
                tracing::warn!(%platform, timeout = ?self.timeout, "worker timed out");
                return Err(BridgeError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(BridgeError::Exit {
                status: output.status.to_string(),
                stderr,
            });
        }

        let outcome = parse_worker_output(&output.stdout)?;
        tracing::info!(%platform, success = outcome.success, "worker finished");

        Ok(outcome)
    }
}

/// Kills every process in the worker's group when dropped.
struct ProcessGroup {
    #[cfg_attr(not(unix), allow(dead_code))]
    pgid: Option<u32>,
}

impl ProcessGroup {
    fn led_by(pid: Option<u32>) -> Self {
        Self { pgid: pid }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Some(pgid) = self.pgid.and_then(|id| i32::try_from(id).ok()) {
            use nix::{
                errno::Errno,
                sys::signal::{Signal, killpg},
                unistd::Pid,
            };

            match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                // ESRCH: every process in the group has already exited
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => tracing::warn!(pgid, error = %e, "failed to kill worker process group"),
            }
        }
    }
}

/// Parse worker stdout into a [`WorkerOutcome`].
///
/// The output must be a single JSON object with a boolean `success` field.
/// `file_path` and `error` are picked up when they are strings.
pub fn parse_worker_output(stdout: &[u8]) -> Result<WorkerOutcome, BridgeError> {
    let payload: Value = serde_json::from_slice(stdout)
        .map_err(|e| BridgeError::Malformed(e.to_string()))?;

    let object = payload
        .as_object()
        .ok_or_else(|| BridgeError::Malformed("expected a JSON object".to_string()))?;

    let success = object
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| BridgeError::Malformed("missing boolean `success` field".to_string()))?;

    let text = |field: &str| object.get(field).and_then(Value::as_str).map(str::to_string);
    let file_path = text("file_path");
    let error = text("error");

    Ok(WorkerOutcome {
        payload,
        success,
        file_path,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_successful_result() {
        let outcome =
            parse_worker_output(br#"{"success":true,"file_path":"x.mp4","title":"clip"}"#)
                .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.file_path.as_deref(), Some("x.mp4"));
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.payload["title"], "clip");
    }

    #[test]
    fn logical_failure_is_not_an_error() {
        let outcome =
            parse_worker_output(br#"{"success":false,"error":"video unavailable"}"#).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("video unavailable"));
        assert_eq!(
            outcome.payload,
            json!({"success": false, "error": "video unavailable"})
        );
    }

    #[test]
    fn trailing_newline_is_accepted() {
        assert!(parse_worker_output(b"{\"success\":true}\n").is_ok());
    }

    #[test]
    fn non_json_and_incomplete_objects_are_malformed() {
        for stdout in [
            &b"[download] 45.2% of 10MiB"[..],
            &b""[..],
            &b"[1,2]"[..],
            &br#"{"file_path":"x.mp4"}"#[..],
            &br#"{"success":"yes"}"#[..],
        ] {
            assert!(
                matches!(parse_worker_output(stdout), Err(BridgeError::Malformed(_))),
                "{}",
                String::from_utf8_lossy(stdout)
            );
        }
    }

    #[cfg(unix)]
    fn sh(script: &str) -> WorkerCommand {
        WorkerCommand::new("/bin/sh").arg("-c").arg(script).arg("worker")
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn passes_platform_url_and_format_as_arguments() {
        let bridge = DownloadBridge::new(
            sh(r#"printf '{"success":true,"args":["%s","%s","%s"]}' "$1" "$2" "$3""#),
            Duration::from_secs(10),
            1,
        );

        let outcome = bridge
            .invoke(Platform::Youtube, "https://y/watch?v=1&t=$(id)", MediaFormat::Wav)
            .await
            .unwrap();

        assert_eq!(
            outcome.payload["args"],
            json!(["youtube", "https://y/watch?v=1&t=$(id)", "wav"])
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_bridge_failure() {
        let bridge = DownloadBridge::new(sh("echo boom >&2; exit 3"), Duration::from_secs(10), 1);

        match bridge.invoke(Platform::Tiktok, "u", MediaFormat::Mp4).await {
            Err(BridgeError::Exit { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected exit failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_worker_times_out() {
        let bridge = DownloadBridge::new(sh("sleep 5"), Duration::from_millis(200), 1);

        let started = std::time::Instant::now();
        let result = bridge.invoke(Platform::Facebook, "u", MediaFormat::Mp4).await;

        assert!(matches!(result, Err(BridgeError::Timeout(d)) if d == Duration::from_millis(200)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn timeout_message_keeps_sub_second_precision() {
        let err = BridgeError::Timeout(Duration::from_millis(300));
        assert_eq!(err.to_string(), "worker timed out after 300ms");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_processes_the_worker_spawned() {
        let marker = std::env::temp_dir().join(format!("bridge-orphan-{}", uuid::Uuid::new_v4()));
        let bridge = DownloadBridge::new(
            sh(&format!("(sleep 1; touch '{}') & wait", marker.display())),
            Duration::from_millis(300),
            1,
        );

        let result = bridge.invoke(Platform::Youtube, "u", MediaFormat::Mp4).await;
        assert!(matches!(result, Err(BridgeError::Timeout(_))));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "background process survived the timeout");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn finished_worker_leaves_no_background_processes() {
        let marker = std::env::temp_dir().join(format!("bridge-leftover-{}", uuid::Uuid::new_v4()));
        let bridge = DownloadBridge::new(
            sh(&format!(
                r#"(sleep 1; touch '{}') >/dev/null 2>&1 & echo '{{"success":true}}'"#,
                marker.display()
            )),
            Duration::from_secs(10),
            1,
        );

        let outcome = bridge
            .invoke(Platform::Youtube, "u", MediaFormat::Mp4)
            .await
            .unwrap();
        assert!(outcome.success);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "background process outlived the worker");
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let bridge = DownloadBridge::new(
            WorkerCommand::new("/nonexistent/download-worker"),
            Duration::from_secs(1),
            1,
        );

        let result = bridge.invoke(Platform::Spotify, "u", MediaFormat::Mp3).await;
        assert!(matches!(result, Err(BridgeError::Spawn(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pool_limits_concurrent_workers() {
        // Two 300ms workers through a single slot take at least 600ms.
        let bridge = Arc::new(DownloadBridge::new(
            sh(r#"sleep 0.3; echo '{"success":true}'"#),
            Duration::from_secs(10),
            1,
        ));

        let started = std::time::Instant::now();
        let (a, b) = tokio::join!(
            bridge.invoke(Platform::Youtube, "a", MediaFormat::Mp4),
            bridge.invoke(Platform::Youtube, "b", MediaFormat::Mp4),
        );

        assert!(a.is_ok() && b.is_ok());
        assert!(started.elapsed() >= Duration::from_millis(600));
    }
}
