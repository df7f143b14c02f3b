//! Background worker: the single consumer of the event queue
//!
//! Lock order: the queue lock is always released (inside `EventQueue::pop`)
//! before the text-state lock is taken for rendering or a control update.
//! The two are never held together, so producers are never blocked behind
//! rendering or file I/O.

use super::{
    appender::Appender,
    clock::Clock,
    error::{LoggerError, Result},
    format::{self, FormatState, RenderContext},
    log_event::LogEvent,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    queue::{EventQueue, QueueItem},
    termination,
    thread_label::ThreadLabelRegistry,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub const WORKER_THREAD_NAME: &str = "logger-worker";

/// Format and label state read on every render
#[derive(Debug, Default)]
pub(crate) struct TextState {
    pub(crate) format: FormatState,
    pub(crate) labels: ThreadLabelRegistry,
    pub(crate) colorize: bool,
    pub(crate) project_root: Option<String>,
}

/// State shared between the producers and the worker
pub(crate) struct Shared {
    pub(crate) queue: EventQueue,
    pub(crate) text: Mutex<TextState>,
    pub(crate) metrics: LoggerMetrics,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Shared {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            queue: EventQueue::new(),
            text: Mutex::new(TextState::default()),
            metrics: LoggerMetrics::new(),
            clock,
        }
    }

    /// Render an event with the format that is current right now
    pub(crate) fn render(&self, event: &LogEvent) -> String {
        let now = self.clock.now();
        let text = self.text.lock();
        let ctx = RenderContext::new(&text.labels)
            .with_colors(text.colorize)
            .with_project_root(text.project_root.as_deref());
        format::render(text.format.current(), event, &now, &ctx)
    }
}

/// Start the worker thread. It owns `appenders` until it exits.
pub(crate) fn spawn(shared: Arc<Shared>, appenders: Vec<Box<dyn Appender>>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            termination::block_async_signals();
            Worker { shared, appenders }.run();
        })
        .map_err(LoggerError::WorkerSpawn)
}

struct Worker {
    shared: Arc<Shared>,
    appenders: Vec<Box<dyn Appender>>,
}

impl Worker {
    /// Runs until the queue is closed and drained.
    fn run(mut self) {
        loop {
            let item = match self.shared.queue.try_pop() {
                Some(item) => item,
                None => {
                    // Drained: make everything written so far durable before sleeping
                    self.flush_all();
                    match self.shared.queue.pop() {
                        Some(item) => item,
                        None => break,
                    }
                }
            };
            self.dispatch(item);
        }
        self.flush_all();
    }

    fn dispatch(&mut self, item: QueueItem) {
        match item {
            QueueItem::Log(event) => {
                let line = self.shared.render(&event);
                if self.write_all(Some(event.level), &line) {
                    self.shared.metrics.record_written();
                }
            }
            QueueItem::UpdateFormat(new_format) => {
                let notice = {
                    let mut text = self.shared.text.lock();
                    let old = text.format.current().to_string();
                    text.format.update(new_format);
                    format!(
                        "Changing log-format. From [{}] to [{}]\n",
                        old,
                        text.format.current()
                    )
                };
                self.control_notice(&notice);
            }
            QueueItem::RevertFormat => {
                let notice = {
                    let mut text = self.shared.text.lock();
                    text.format.revert();
                    format!(
                        "Changing to previous log-format. From [{}] to [{}]\n",
                        text.format.previous(),
                        text.format.current()
                    )
                };
                self.control_notice(&notice);
            }
            QueueItem::RegisterLabel { thread, label } => {
                let audit = self.shared.text.lock().labels.register(thread, label);
                self.control_notice(&format!("{}\n", audit));
            }
            QueueItem::UnregisterLabel { thread } => {
                let audit = self.shared.text.lock().labels.unregister(thread);
                self.control_notice(&format!("{}\n", audit));
            }
        }
    }

    fn control_notice(&mut self, notice: &str) {
        self.shared.metrics.record_control_event();
        self.write_all(None, notice);
    }

    /// Hand `text` to every appender. Returns `true` if none failed.
    ///
    /// Each appender is isolated with `catch_unwind`: one failing or
    /// panicking appender does not keep the others from receiving the line,
    /// and nothing escapes the worker loop.
    fn write_all(&mut self, level: Option<LogLevel>, text: &str) -> bool {
        let mut ok = true;

        for (idx, appender) in self.appenders.iter_mut().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.write(level, text)
            }));

            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Appender #{} ({}) failed: {}",
                        idx,
                        appender.name(),
                        e
                    );
                    self.shared.metrics.record_write_failure();
                    ok = false;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} ({}) panicked: {}. \
                         Other appenders continue to function.",
                        idx,
                        appender.name(),
                        panic_message(&*panic_info)
                    );
                    self.shared.metrics.record_write_failure();
                    ok = false;
                }
            }
        }

        ok
    }

    fn flush_all(&mut self) {
        for (idx, appender) in self.appenders.iter_mut().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| appender.flush()));

            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender #{} flush failed: {}", idx, e);
                    self.shared.metrics.record_write_failure();
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked during flush: {}",
                        idx,
                        panic_message(&*panic_info)
                    );
                    self.shared.metrics.record_write_failure();
                }
            }
        }
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
