//! Termination guard tests
//!
//! The guard changes process-wide signal dispositions, so every test here
//! holds `SERIAL`. The end-to-end test re-runs this test binary as a child
//! process that raises SIGTERM against itself.

#![cfg(unix)]

use rust_async_logger::core::BANNER_SEPARATOR;
use rust_async_logger::info;
use rust_async_logger::prelude::*;
use std::os::unix::process::ExitStatusExt;
use std::process::Command;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

const CHILD_DIR_ENV: &str = "RUST_ASYNC_LOGGER_TERMINATION_DIR";
const CHILD_LINES: usize = 500;

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn disposition(signum: libc::c_int) -> libc::sighandler_t {
    unsafe {
        let mut current: libc::sigaction = std::mem::zeroed();
        assert_eq!(libc::sigaction(signum, std::ptr::null(), &mut current), 0);
        current.sa_sigaction
    }
}

#[test]
fn test_second_guard_is_rejected() {
    let _serial = serial();
    let logger = Logger::new();

    let guard = logger.install_termination_guard().expect("first guard");
    let second = logger.install_termination_guard();
    assert!(matches!(second, Err(LoggerError::GuardAlreadyInstalled)));

    drop(guard);
    let again = logger.install_termination_guard();
    assert!(again.is_ok());
}

#[test]
fn test_guard_restores_default_dispositions() {
    let _serial = serial();
    let logger = Logger::new();
    assert_eq!(disposition(libc::SIGTERM), libc::SIG_DFL);

    let guard = logger.install_termination_guard().unwrap();
    assert!(guard.is_installed(libc::SIGTERM));
    assert!(guard.is_installed(libc::SIGALRM));
    assert!(!guard.is_installed(libc::SIGKILL));
    assert_ne!(disposition(libc::SIGTERM), libc::SIG_DFL);

    drop(guard);
    assert_eq!(disposition(libc::SIGTERM), libc::SIG_DFL);
    assert_eq!(disposition(libc::SIGALRM), libc::SIG_DFL);
}

#[test]
fn test_custom_disposition_is_left_alone() {
    let _serial = serial();
    let logger = Logger::new();

    unsafe {
        libc::signal(libc::SIGUSR2, libc::SIG_IGN);
    }
    let guard = logger.install_termination_guard().unwrap();
    assert!(!guard.is_installed(libc::SIGUSR2));
    assert!(guard.is_installed(libc::SIGUSR1));
    drop(guard);

    assert_eq!(disposition(libc::SIGUSR2), libc::SIG_IGN);
    unsafe {
        libc::signal(libc::SIGUSR2, libc::SIG_DFL);
    }
}

#[test]
fn test_sigterm_flushes_queue_before_exit() {
    let _serial = serial();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = Command::new(std::env::current_exe().unwrap())
        .args([
            "termination_child_process",
            "--exact",
            "--ignored",
            "--nocapture",
            "--test-threads=1",
        ])
        .env(CHILD_DIR_ENV, temp_dir.path())
        .output()
        .expect("Failed to spawn child");

    assert_eq!(
        output.status.signal(),
        Some(libc::SIGTERM),
        "child did not die of SIGTERM: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let content = std::fs::read_to_string(temp_dir.path().join("child.log")).unwrap();
    let start = content.rfind(BANNER_SEPARATOR).unwrap() + BANNER_SEPARATOR.len() + 1;
    let lines: Vec<&str> = content[start..].lines().collect();
    assert_eq!(lines.len(), CHILD_LINES);
    assert_eq!(lines[0], "line 0");
    assert_eq!(lines[CHILD_LINES - 1], format!("line {}", CHILD_LINES - 1));
}

/// Body of the child process started by `test_sigterm_flushes_queue_before_exit`
#[test]
#[ignore = "run as a child process"]
fn termination_child_process() {
    let Ok(dir) = std::env::var(CHILD_DIR_ENV) else {
        return;
    };

    let logger = Logger::builder()
        .log_dir(dir)
        .file_name("child.log")
        .format("$C$Z")
        .color(ColorMode::Never)
        .build()
        .unwrap();
    let _guard = logger.install_termination_guard().unwrap();

    for i in 0..CHILD_LINES {
        info!(logger, "line {}", i);
    }

    unsafe {
        libc::raise(libc::SIGTERM);
    }

    // Only reached if the signal did not terminate the process
    std::process::exit(3);
}
