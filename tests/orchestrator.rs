//! Integration tests for the build cache and capture session
//!
//! Shell stubs stand in for the compiler and the native recorder, so the
//! tests exercise real child processes (spawn, stdio capture, SIGINT
//! forwarding) without any platform capture framework.

#![cfg(unix)]

use sckrec::build_cache::{self, BuildStatus};
use sckrec::error::{BuildError, SessionError};
use sckrec::session::{CaptureDuration, CaptureRequest, CaptureSession, Mode, Outcome};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn set_mtime(path: &Path, time: SystemTime) {
    let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

/// Fake compiler that logs each invocation and "produces" the binary by
/// copying the source (args: <source> -o <binary>).
fn fake_compiler(dir: &Path, log: &Path) -> PathBuf {
    write_script(
        dir,
        "fakecc",
        &format!(
            "#!/bin/sh\necho run >> {}\ncp \"$1\" \"$3\"\n",
            log.display()
        ),
    )
}

fn invocation_count(log: &Path) -> usize {
    std::fs::read_to_string(log)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

fn request(mode: Mode, duration: CaptureDuration, output: &Path) -> CaptureRequest {
    CaptureRequest {
        mode,
        duration,
        output_path: output.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Build cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_binary_compiles_exactly_once() {
    let tmp = tempfile::tempdir().unwrap();
    let log = tmp.path().join("compile.log");
    let compiler = fake_compiler(tmp.path(), &log);
    let source = tmp.path().join("core.swift");
    let binary = tmp.path().join("recorder");
    std::fs::write(&source, b"source v1").unwrap();

    let status = build_cache::ensure_binary(&source, &binary, compiler.to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(status, BuildStatus::Rebuilt);
    assert_eq!(invocation_count(&log), 1);
    assert!(binary.exists());
}

#[tokio::test]
async fn fresh_binary_never_invokes_compiler() {
    let tmp = tempfile::tempdir().unwrap();
    let log = tmp.path().join("compile.log");
    let compiler = fake_compiler(tmp.path(), &log);
    let source = tmp.path().join("core.swift");
    let binary = tmp.path().join("recorder");
    std::fs::write(&source, b"source").unwrap();
    std::fs::write(&binary, b"binary").unwrap();

    let base = SystemTime::now();
    set_mtime(&source, base);
    set_mtime(&binary, base + Duration::from_secs(10));

    let status = build_cache::ensure_binary(&source, &binary, compiler.to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(status, BuildStatus::CacheHit);
    assert_eq!(invocation_count(&log), 0);
}

#[tokio::test]
async fn source_newer_than_binary_forces_rebuild() {
    let tmp = tempfile::tempdir().unwrap();
    let log = tmp.path().join("compile.log");
    let compiler = fake_compiler(tmp.path(), &log);
    let source = tmp.path().join("core.swift");
    let binary = tmp.path().join("recorder");
    std::fs::write(&source, b"source v2").unwrap();
    std::fs::write(&binary, b"stale binary").unwrap();

    let base = SystemTime::now();
    set_mtime(&binary, base);
    set_mtime(&source, base + Duration::from_secs(10));

    let status = build_cache::ensure_binary(&source, &binary, compiler.to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(status, BuildStatus::Rebuilt);
    assert_eq!(invocation_count(&log), 1);
    // the fake compiler copies the source over the stale binary
    assert_eq!(std::fs::read(&binary).unwrap(), b"source v2");
}

#[tokio::test]
async fn compile_failure_carries_stderr_verbatim() {
    let tmp = tempfile::tempdir().unwrap();
    let compiler = write_script(
        tmp.path(),
        "badcc",
        "#!/bin/sh\necho 'core.swift:3:1: error: cannot find SCStream' >&2\nexit 1\n",
    );
    let source = tmp.path().join("core.swift");
    std::fs::write(&source, b"broken").unwrap();

    let err = build_cache::ensure_binary(
        &source,
        &tmp.path().join("recorder"),
        compiler.to_str().unwrap(),
    )
    .await
    .unwrap_err();

    match err {
        BuildError::CompileFailed { stderr } => {
            assert!(stderr.contains("cannot find SCStream"));
        }
        other => panic!("expected CompileFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn force_rebuild_ignores_fresh_binary() {
    let tmp = tempfile::tempdir().unwrap();
    let log = tmp.path().join("compile.log");
    let compiler = fake_compiler(tmp.path(), &log);
    let source = tmp.path().join("core.swift");
    let binary = tmp.path().join("recorder");
    std::fs::write(&source, b"source").unwrap();
    std::fs::write(&binary, b"binary").unwrap();

    let base = SystemTime::now();
    set_mtime(&source, base);
    set_mtime(&binary, base + Duration::from_secs(10));

    build_cache::force_rebuild(&source, &binary, compiler.to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(invocation_count(&log), 1);
}

// ---------------------------------------------------------------------------
// Capture session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bounded_session_completes_and_buffers_output() {
    let tmp = tempfile::tempdir().unwrap();
    let recorder = write_script(
        tmp.path(),
        "recorder",
        "#!/bin/sh\necho \"writing $1\"\necho 'stream opened' >&2\nexit 0\n",
    );
    let output = tmp.path().join("out.wav");

    let session = CaptureSession::new(
        recorder,
        request(Mode::Internal, CaptureDuration::Seconds(5), &output),
    );
    let result = session.run(std::future::pending()).await.unwrap();

    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.output_path, output);
    let diagnostics = result.diagnostics.unwrap();
    assert!(diagnostics.contains("writing"));
    assert!(diagnostics.contains("stream opened"));
}

#[tokio::test]
async fn nonzero_exit_without_interrupt_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let recorder = write_script(
        tmp.path(),
        "recorder",
        "#!/bin/sh\necho 'no display found' >&2\nexit 2\n",
    );

    let session = CaptureSession::new(
        recorder,
        request(
            Mode::Both,
            CaptureDuration::Seconds(5),
            &tmp.path().join("out.wav"),
        ),
    );
    let result = session.run(std::future::pending()).await.unwrap();

    assert_eq!(result.outcome, Outcome::Failed);
    assert!(result.diagnostics.unwrap().contains("no display found"));
}

#[tokio::test]
async fn forwarded_interrupt_classifies_interrupted() {
    let tmp = tempfile::tempdir().unwrap();
    // Recorder that finalizes and exits cleanly on SIGINT.
    let recorder = write_script(
        tmp.path(),
        "recorder",
        "#!/bin/sh\ntrap 'exit 0' INT TERM\nsleep 30 &\nwait $!\n",
    );

    let session = CaptureSession::new(
        recorder,
        request(
            Mode::Both,
            CaptureDuration::Seconds(30),
            &tmp.path().join("out.wav"),
        ),
    );
    let result = session
        .run(tokio::time::sleep(Duration::from_millis(300)))
        .await
        .unwrap();

    assert_eq!(result.outcome, Outcome::Interrupted);
}

#[tokio::test]
async fn interrupt_wins_even_when_child_exits_nonzero() {
    let tmp = tempfile::tempdir().unwrap();
    let recorder = write_script(
        tmp.path(),
        "recorder",
        "#!/bin/sh\ntrap 'exit 7' INT TERM\nsleep 30 &\nwait $!\n",
    );

    let session = CaptureSession::new(
        recorder,
        request(
            Mode::Microphone,
            CaptureDuration::Seconds(30),
            &tmp.path().join("out.wav"),
        ),
    );
    let result = session
        .run(tokio::time::sleep(Duration::from_millis(300)))
        .await
        .unwrap();

    assert_eq!(result.outcome, Outcome::Interrupted);
}

#[tokio::test]
async fn child_receives_contract_arguments() {
    let tmp = tempfile::tempdir().unwrap();
    let argfile = tmp.path().join("args.txt");
    let recorder = write_script(
        tmp.path(),
        "recorder",
        &format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > {}\n", argfile.display()),
    );
    let output = tmp.path().join("recordings/rec.wav");
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();

    let session = CaptureSession::new(
        recorder,
        request(Mode::Internal, CaptureDuration::Seconds(45), &output),
    );
    session.run(std::future::pending()).await.unwrap();

    let args: Vec<String> = std::fs::read_to_string(&argfile)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(args.len(), 3);
    assert_eq!(Path::new(&args[0]), output);
    assert_eq!(args[1], "45");
    assert_eq!(args[2], "internal");
}

#[tokio::test]
async fn continuous_session_streams_live_instead_of_buffering() {
    let tmp = tempfile::tempdir().unwrap();
    let recorder = write_script(tmp.path(), "recorder", "#!/bin/sh\nexit 0\n");
    let output = tmp.path().join("out.wav");

    let session = CaptureSession::new(
        recorder,
        request(Mode::Both, CaptureDuration::Continuous, &output),
    );
    let result = session.run(std::future::pending()).await.unwrap();

    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.output_path, output);
    // Continuous sessions inherit stdio; nothing is captured for the result.
    assert!(result.diagnostics.is_none());
}

#[tokio::test]
async fn continuous_session_uses_sentinel_duration() {
    let tmp = tempfile::tempdir().unwrap();
    let session = CaptureSession::new(
        PathBuf::from("recorder"),
        request(
            Mode::Both,
            CaptureDuration::Continuous,
            &tmp.path().join("out.wav"),
        ),
    );
    let args = session.build_args();
    assert_eq!(&args[args.len() - 2..], &["86400", "both"]);
}

#[tokio::test]
async fn missing_binary_is_a_spawn_error() {
    let tmp = tempfile::tempdir().unwrap();
    let session = CaptureSession::new(
        tmp.path().join("no-such-recorder"),
        request(
            Mode::Internal,
            CaptureDuration::Seconds(1),
            &tmp.path().join("out.wav"),
        ),
    );

    let err = session.run(std::future::pending()).await.unwrap_err();
    assert!(matches!(err, SessionError::SpawnFailed { .. }));
}
