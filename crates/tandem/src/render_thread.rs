//! # Render Thread
//!
//! Runs the consumer half of a [`Renderer`] on a dedicated thread:
//!
//! ```text
//! loop {
//!     stop requested?          → exit
//!     wait ≤ poll_interval     → nothing committed, loop
//!     replay (Full / hidden)   → ExecuteReport over the channel
//! }
//! ```
//!
//! Reports are sent with `try_send`; if the update thread does not drain
//! them, excess reports are dropped and counted rather than stalling the
//! render thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tandem_render::{Backend, ExecuteMode, ExecuteReport, Renderer};
use tracing::{debug, info, warn};

/// Render loop settings.
#[derive(Clone, Debug)]
pub struct RenderThreadConfig {
    /// Thread name.
    pub name: String,
    /// Longest wait for a commit before re-checking for stop.
    pub poll_interval: Duration,
    /// Report channel capacity.
    pub report_capacity: usize,
}

impl Default for RenderThreadConfig {
    fn default() -> Self {
        Self {
            name: "tandem-render".to_owned(),
            poll_interval: Duration::from_millis(10),
            report_capacity: 64,
        }
    }
}

/// Flags shared between the owner and the loop.
#[derive(Debug, Default)]
struct Control {
    stop: AtomicBool,
    hidden: AtomicBool,
    dropped_reports: AtomicU64,
}

/// Handle to a running render loop.
///
/// The update thread keeps recording and committing through its own
/// reference to the [`Renderer`].
#[derive(Debug)]
pub struct RenderThread {
    control: Arc<Control>,
    reports: Receiver<ExecuteReport>,
    handle: JoinHandle<u64>,
}

impl RenderThread {
    /// Starts a render loop for `renderer`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn<B: Backend + 'static>(
        renderer: Arc<Renderer<B>>,
        config: RenderThreadConfig,
    ) -> std::io::Result<Self> {
        let control = Arc::new(Control::default());
        let (sender, reports) = bounded(config.report_capacity);

        let handle = {
            let control = Arc::clone(&control);
            let poll_interval = config.poll_interval;
            thread::Builder::new()
                .name(config.name.clone())
                .spawn(move || run(&renderer, &control, &sender, poll_interval))?
        };

        info!(name = %config.name, "Render thread started");
        Ok(Self {
            control,
            reports,
            handle,
        })
    }

    /// Executed-frame reports, oldest first.
    #[must_use]
    pub fn reports(&self) -> &Receiver<ExecuteReport> {
        &self.reports
    }

    /// Switches between full replay and resources-only replay.
    ///
    /// Takes effect from the next frame the loop picks up.
    pub fn set_hidden(&self, hidden: bool) {
        self.control.hidden.store(hidden, Ordering::Release);
    }

    /// Reports dropped because the channel was full.
    #[must_use]
    pub fn dropped_reports(&self) -> u64 {
        self.control.dropped_reports.load(Ordering::Relaxed)
    }

    /// Asks the loop to exit and waits for it.
    ///
    /// Returns the number of frames the loop executed. Flush the renderer
    /// first if the last commit must be replayed.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the render thread panicked.
    pub fn stop(self) -> thread::Result<u64> {
        self.control.stop.store(true, Ordering::Release);
        self.handle.join()
    }
}

fn run<B: Backend>(
    renderer: &Renderer<B>,
    control: &Control,
    sender: &Sender<ExecuteReport>,
    poll_interval: Duration,
) -> u64 {
    let mut frames = 0u64;

    while !control.stop.load(Ordering::Acquire) {
        let mode = if control.hidden.load(Ordering::Acquire) {
            ExecuteMode::ResourcesOnly
        } else {
            ExecuteMode::Full
        };

        let Some(report) = renderer.try_execute_commands_for(poll_interval, mode) else {
            continue;
        };
        frames += 1;

        match sender.try_send(report) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                control.dropped_reports.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(frame = report.frame, "Report receiver gone");
            }
        }
    }

    debug!(frames, "Render thread exiting");
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_render::{BackendCall, PassAction, RecordingBackend, RendererConfig};

    fn start() -> (Arc<Renderer<RecordingBackend>>, RenderThread, tandem_render::CallLog) {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let renderer = Arc::new(Renderer::new(backend, RendererConfig::default()).unwrap());
        let thread = RenderThread::spawn(Arc::clone(&renderer), RenderThreadConfig::default()).unwrap();
        (renderer, thread, log)
    }

    #[test]
    fn test_reports_arrive_in_frame_order() {
        let (renderer, thread, _log) = start();

        for n in 0..5 {
            renderer.add_command_draw(n, 3, 1);
            renderer.flush_commands();
            renderer.commit_commands();
        }
        renderer.flush_commands();

        // The report is sent just after the flush is released.
        let frames: Vec<u64> = (0..5)
            .map(|_| thread.reports().recv_timeout(Duration::from_secs(5)).unwrap().frame)
            .collect();
        assert_eq!(frames, vec![0, 1, 2, 3, 4]);
        assert_eq!(thread.stop().unwrap(), 5);
    }

    #[test]
    fn test_hidden_frames_skip_passes() {
        let (renderer, thread, log) = start();
        thread.set_hidden(true);

        renderer.add_command_begin_default_pass(PassAction::load());
        renderer.add_command_end_pass();
        renderer.add_command_custom("tick", |_| {});
        renderer.commit_commands();
        renderer.flush_commands();

        let report = thread.reports().recv().unwrap();
        assert_eq!(report.commands_skipped, 2);
        assert!(log.position(&BackendCall::EndPass).is_none());
        thread.stop().unwrap();
    }

    #[test]
    fn test_stop_without_frames() {
        let (_renderer, thread, _log) = start();
        assert_eq!(thread.stop().unwrap(), 0);
    }
}
