//! Flush-on-termination guard
//!
//! Without a guard, a process killed by a terminating signal loses every
//! event still sitting in the queue. [`TerminationGuard`] hooks the
//! terminating signals whose disposition is still the default one and makes
//! the worker drain before the process dies.
//!
//! The handler itself only does async-signal-safe work: it writes the signal
//! number into a self-pipe and waits (bounded) on a second pipe. A watcher
//! thread reads the first pipe, shuts the logger down, restores the recorded
//! dispositions and closes the second pipe. The handler then re-raises the
//! signal so the default action runs.
//!
//! Signals that already carry a custom disposition are left alone. Only one
//! guard can be active per process.
//!
//! # Example
//!
//! ```no_run
//! use rust_async_logger::Logger;
//!
//! # fn main() -> rust_async_logger::Result<()> {
//! let logger = Logger::builder().file_name("app.log").build()?;
//! let _guard = logger.install_termination_guard()?;
//!
//! // A SIGTERM from here on still gets every queued line onto disk.
//! # Ok(())
//! # }
//! ```

#[cfg(unix)]
mod unix {
    use crate::core::error::{LoggerError, Result};
    use crate::core::logger::{Logger, LoggerInner};
    use parking_lot::Mutex;
    use std::fmt;
    use std::fs::File;
    use std::io::{self, Read};
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
    use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
    use std::sync::{Arc, Weak};
    use std::thread::{self, JoinHandle};

    pub const WATCHER_THREAD_NAME: &str = "logger-termination-watcher";

    /// Upper bound for how long a handler waits for the flush
    const ACK_TIMEOUT_MS: libc::c_int = 5_000;

    static GUARD_ACTIVE: AtomicBool = AtomicBool::new(false);
    static HANDLING: AtomicBool = AtomicBool::new(false);
    /// Write end of the notification pipe, -1 when no guard is active
    static NOTIFY_FD: AtomicI32 = AtomicI32::new(-1);
    /// Read end of the acknowledgement pipe, -1 when no guard is active
    static ACK_FD: AtomicI32 = AtomicI32::new(-1);

    /// Signals whose default action terminates the process, aliases removed
    pub fn terminating_signals() -> Vec<libc::c_int> {
        let mut signals = vec![
            libc::SIGHUP,
            libc::SIGINT,
            libc::SIGQUIT,
            libc::SIGILL,
            libc::SIGTRAP,
            libc::SIGABRT,
            libc::SIGIOT,
            libc::SIGBUS,
            libc::SIGFPE,
            libc::SIGKILL,
            libc::SIGUSR1,
            libc::SIGSEGV,
            libc::SIGUSR2,
            libc::SIGPIPE,
            libc::SIGALRM,
            libc::SIGTERM,
            libc::SIGXCPU,
            libc::SIGXFSZ,
            libc::SIGVTALRM,
            libc::SIGPROF,
            libc::SIGIO,
            libc::SIGSYS,
        ];
        #[cfg(any(target_os = "linux", target_os = "android"))]
        signals.extend([libc::SIGPOLL, libc::SIGPWR]);
        #[cfg(all(
            any(target_os = "linux", target_os = "android"),
            any(
                target_arch = "x86",
                target_arch = "x86_64",
                target_arch = "arm",
                target_arch = "aarch64",
                target_arch = "riscv64"
            )
        ))]
        signals.push(libc::SIGSTKFLT);

        signals.sort_unstable();
        signals.dedup();
        signals
    }

    /// Asynchronous terminating signals: masked on the logger's own threads
    /// so the kernel delivers them to an application thread instead.
    const ASYNC_SIGNALS: [libc::c_int; 11] = [
        libc::SIGHUP,
        libc::SIGINT,
        libc::SIGQUIT,
        libc::SIGUSR1,
        libc::SIGUSR2,
        libc::SIGALRM,
        libc::SIGTERM,
        libc::SIGXCPU,
        libc::SIGVTALRM,
        libc::SIGPROF,
        libc::SIGIO,
    ];

    /// Block asynchronous terminating signals on the calling thread
    pub fn block_async_signals() {
        // SAFETY: sigset_t is plain data; the calls only touch this thread's mask.
        unsafe {
            let mut set: libc::sigset_t = std::mem::zeroed();
            libc::sigemptyset(&mut set);
            for signum in ASYNC_SIGNALS {
                libc::sigaddset(&mut set, signum);
            }
            libc::pthread_sigmask(libc::SIG_BLOCK, &set, std::ptr::null_mut());
        }
    }

    extern "C" fn on_terminate(signum: libc::c_int) {
        // Only the first signal notifies; later ones just wait for the same ack.
        if !HANDLING.swap(true, Ordering::SeqCst) {
            let fd = NOTIFY_FD.load(Ordering::SeqCst);
            if fd >= 0 {
                let byte = signum as u8;
                // SAFETY: write(2) is async-signal-safe; the fd is non-blocking.
                unsafe {
                    libc::write(fd, &byte as *const u8 as *const libc::c_void, 1);
                }
            }
        }

        let ack = ACK_FD.load(Ordering::SeqCst);
        if ack >= 0 {
            let mut pfd = libc::pollfd {
                fd: ack,
                events: libc::POLLIN,
                revents: 0,
            };
            for _ in 0..3 {
                // SAFETY: poll(2) is async-signal-safe. The watcher closes the
                // write end when it is done, which wakes us with POLLHUP.
                let ready = unsafe { libc::poll(&mut pfd, 1, ACK_TIMEOUT_MS) };
                if ready >= 0 || io::Error::last_os_error().raw_os_error() != Some(libc::EINTR) {
                    break;
                }
            }
        }

        // SAFETY: signal(2) and raise(3) are async-signal-safe. The signal is
        // blocked while its handler runs, so it is delivered with the default
        // action right after we return.
        unsafe {
            libc::signal(signum, libc::SIG_DFL);
            libc::raise(signum);
        }
    }

    /// Disposition found before the guard replaced it
    struct SavedDisposition {
        signum: libc::c_int,
        action: libc::sigaction,
    }

    type Installed = Arc<Mutex<Option<Vec<SavedDisposition>>>>;

    fn restore(saved: &[SavedDisposition]) {
        for entry in saved {
            // SAFETY: re-installs a sigaction previously returned by the kernel.
            let rc = unsafe { libc::sigaction(entry.signum, &entry.action, std::ptr::null_mut()) };
            if rc != 0 {
                eprintln!(
                    "[LOGGER WARNING] {}",
                    LoggerError::signal(entry.signum, io::Error::last_os_error())
                );
            }
        }
    }

    /// Restore once, whichever of the watcher and `Drop` gets there first
    fn restore_installed(installed: &Installed) {
        if let Some(saved) = installed.lock().take() {
            restore(&saved);
        }
    }

    fn install_handlers() -> Result<Vec<SavedDisposition>> {
        let mut saved = Vec::new();

        for signum in terminating_signals() {
            // SAFETY: zeroed sigaction is a valid "query" buffer.
            let mut current: libc::sigaction = unsafe { std::mem::zeroed() };
            if unsafe { libc::sigaction(signum, std::ptr::null(), &mut current) } != 0 {
                continue;
            }
            if current.sa_sigaction != libc::SIG_DFL {
                // someone else owns this signal
                continue;
            }

            // SAFETY: handler only performs async-signal-safe calls.
            let rc = unsafe {
                let mut action: libc::sigaction = std::mem::zeroed();
                action.sa_sigaction = on_terminate as libc::sighandler_t;
                action.sa_flags = libc::SA_RESTART;
                libc::sigemptyset(&mut action.sa_mask);
                libc::sigaction(signum, &action, std::ptr::null_mut())
            };
            if rc != 0 {
                let err = io::Error::last_os_error();
                if err.raw_os_error() == Some(libc::EINVAL) {
                    // SIGKILL and friends cannot be caught
                    continue;
                }
                restore(&saved);
                return Err(LoggerError::signal(signum, err));
            }

            saved.push(SavedDisposition {
                signum,
                action: current,
            });
        }

        Ok(saved)
    }

    fn pipe() -> Result<(OwnedFd, OwnedFd)> {
        let mut fds = [0 as libc::c_int; 2];
        // SAFETY: fds has room for the two descriptors pipe(2) writes.
        if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
            return Err(LoggerError::io_operation(
                "creating termination pipe",
                "pipe(2) failed",
                io::Error::last_os_error(),
            ));
        }
        // SAFETY: both descriptors were just returned by pipe(2) and are owned here.
        let (read, write) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
        for fd in [&read, &write] {
            unsafe {
                libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC);
            }
        }
        Ok((read, write))
    }

    fn set_nonblocking(fd: &OwnedFd) {
        // SAFETY: fcntl on a descriptor we own.
        unsafe {
            let flags = libc::fcntl(fd.as_raw_fd(), libc::F_GETFL);
            libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags | libc::O_NONBLOCK);
        }
    }

    fn reset_statics() {
        NOTIFY_FD.store(-1, Ordering::SeqCst);
        ACK_FD.store(-1, Ordering::SeqCst);
        HANDLING.store(false, Ordering::SeqCst);
    }

    /// Reads the notification pipe; on a signal, flushes and acknowledges.
    fn watch(
        mut notify: File,
        ack: OwnedFd,
        logger: Weak<LoggerInner>,
        installed: Installed,
    ) {
        block_async_signals();

        let mut byte = [0u8; 1];
        loop {
            match notify.read(&mut byte) {
                Ok(0) => return, // guard dropped
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    eprintln!("[LOGGER ERROR] Termination watcher failed to read: {}", e);
                    return;
                }
            }
        }

        if let Some(inner) = logger.upgrade() {
            inner.stop();
        }
        restore_installed(&installed);
        // Closing the write end wakes every handler waiting on the ack pipe.
        drop(ack);
    }

    /// Keeps the termination hooks installed while alive.
    ///
    /// Dropping the guard restores the original dispositions.
    pub struct TerminationGuard {
        signals: Vec<libc::c_int>,
        installed: Installed,
        notify_write: Option<OwnedFd>,
        ack_read: Option<OwnedFd>,
        watcher: Option<JoinHandle<()>>,
    }

    impl TerminationGuard {
        pub(crate) fn install(logger: &Logger) -> Result<Self> {
            if GUARD_ACTIVE.swap(true, Ordering::SeqCst) {
                return Err(LoggerError::GuardAlreadyInstalled);
            }

            Self::install_inner(logger).inspect_err(|_| {
                reset_statics();
                GUARD_ACTIVE.store(false, Ordering::SeqCst);
            })
        }

        fn install_inner(logger: &Logger) -> Result<Self> {
            let (notify_read, notify_write) = pipe()?;
            let (ack_read, ack_write) = pipe()?;
            set_nonblocking(&notify_write);

            NOTIFY_FD.store(notify_write.as_raw_fd(), Ordering::SeqCst);
            ACK_FD.store(ack_read.as_raw_fd(), Ordering::SeqCst);
            HANDLING.store(false, Ordering::SeqCst);

            let saved = install_handlers()?;
            let signals = saved.iter().map(|s| s.signum).collect();
            let installed: Installed = Arc::new(Mutex::new(Some(saved)));

            let weak = logger.downgrade();
            let watcher_installed = Arc::clone(&installed);
            let notify = File::from(notify_read);
            let watcher = thread::Builder::new()
                .name(WATCHER_THREAD_NAME.to_string())
                .spawn(move || watch(notify, ack_write, weak, watcher_installed))
                .map_err(|e| {
                    restore_installed(&installed);
                    LoggerError::io_operation("spawning termination watcher", "thread spawn failed", e)
                })?;

            Ok(Self {
                signals,
                installed,
                notify_write: Some(notify_write),
                ack_read: Some(ack_read),
                watcher: Some(watcher),
            })
        }

        /// Signals this guard installed a handler for
        pub fn installed_signals(&self) -> &[libc::c_int] {
            &self.signals
        }

        pub fn is_installed(&self, signum: libc::c_int) -> bool {
            self.signals.contains(&signum)
        }
    }

    impl fmt::Debug for TerminationGuard {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("TerminationGuard")
                .field("signals", &self.signals)
                .finish()
        }
    }

    impl Drop for TerminationGuard {
        fn drop(&mut self) {
            restore_installed(&self.installed);
            NOTIFY_FD.store(-1, Ordering::SeqCst);

            // EOF on the pipe lets the watcher exit
            drop(self.notify_write.take());
            if let Some(handle) = self.watcher.take() {
                if handle.join().is_err() {
                    eprintln!("[LOGGER ERROR] Termination watcher panicked");
                }
            }

            ACK_FD.store(-1, Ordering::SeqCst);
            drop(self.ack_read.take());
            reset_statics();
            GUARD_ACTIVE.store(false, Ordering::SeqCst);
        }
    }

}

#[cfg(not(unix))]
mod fallback {
    use crate::core::error::Result;
    use crate::core::logger::Logger;

    /// No signal hooks on this platform; flushing relies on `shutdown`/`Drop`.
    #[derive(Debug)]
    pub struct TerminationGuard {
        _private: (),
    }

    impl TerminationGuard {
        pub(crate) fn install(_logger: &Logger) -> Result<Self> {
            Ok(Self { _private: () })
        }

        pub fn installed_signals(&self) -> &[i32] {
            &[]
        }

        pub fn is_installed(&self, _signum: i32) -> bool {
            false
        }
    }

    pub fn terminating_signals() -> Vec<i32> {
        Vec::new()
    }

    pub fn block_async_signals() {}
}

#[cfg(unix)]
pub use unix::{block_async_signals, terminating_signals, TerminationGuard, WATCHER_THREAD_NAME};

#[cfg(not(unix))]
pub use fallback::{block_async_signals, terminating_signals, TerminationGuard};
