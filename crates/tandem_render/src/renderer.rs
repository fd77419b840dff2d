//! # Renderer - Update/Render Handoff
//!
//! THE FRAME PROTOCOL:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        FRAME TIMELINE                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  UPDATE THREAD                     RENDER THREAD                │
//! │                                                                 │
//! │  add_command_*  → pending          execute_commands()           │
//! │       │                              └── blocks (IDLE)          │
//! │  flush_commands()                                               │
//! │       └── waits for frame N-1                                   │
//! │  commit_commands()                                              │
//! │       ├── swap buffers                                          │
//! │       └── release render ─────────►  wakes (COMMITTED)          │
//! │                                      ├── replay (EXECUTING)     │
//! │  add_command_* → new pending         ├── run due cleanups       │
//! │       (frame N+1 overlaps)           ├── frame_index += 1       │
//! │                                      └── release update         │
//! │  flush_commands() ◄─────────────────────  (FLUSHED)             │
//! │       └── IDLE                                                  │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. One update thread records, one render thread executes
//! 2. Every commit must be flushed before the next commit
//! 3. A destroyed handle stays allocated until its cleanup's due frame

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytemuck::Pod;
use parking_lot::{Mutex, MutexGuard};
use tandem_core::{Semaphore, ThreadBinding};
use tracing::{debug, debug_span, info, trace, warn};

use crate::backend::{Backend, BackendInfo};
use crate::cleanup::{CleanupEntry, CleanupScheduler};
use crate::command::{CustomCommand, OperationKind, RenderCommand, UniformBlock};
use crate::config::RendererConfig;
use crate::desc::{
    Bindings, BufferDesc, ImageData, ImageDesc, PassAction, PassDesc, PipelineDesc, PixelFormat,
    Rect, ShaderDesc, ShaderStage,
};
use crate::error::{RenderError, RenderResult};
use crate::handle::{Buffer, Image, Pass, Pipeline, ResourceHandle, ResourcePools, Shader};
use crate::queue::CommandQueue;
use crate::stats::{ExecuteReport, RendererStats};

/// Where the handoff currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RendererState {
    /// No commit outstanding.
    Idle = 0,
    /// Buffers swapped, render thread not yet started on them.
    Committed = 1,
    /// Render thread replaying.
    Executing = 2,
    /// Render thread done, update thread has not flushed yet.
    Flushed = 3,
}

impl RendererState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Committed,
            2 => Self::Executing,
            3 => Self::Flushed,
            _ => Self::Idle,
        }
    }
}

/// Which commands an execute replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecuteMode {
    /// Every command.
    #[default]
    Full,
    /// Resource lifecycle, uploads and custom commands only.
    ///
    /// For frames with nothing to present to (hidden or minimized surface):
    /// resources still get created and destroyed on schedule, but no pass
    /// is opened.
    ResourcesOnly,
}

impl ExecuteMode {
    const fn replays(self, kind: OperationKind) -> bool {
        match self {
            Self::Full => true,
            Self::ResourcesOnly => kind.is_resource() || matches!(kind, OperationKind::Custom),
        }
    }
}

/// Records graphics commands on one thread and replays them on another.
///
/// Share it between the two threads with an [`Arc`]. Methods prefixed
/// `add_command_` plus [`commit_commands`](Self::commit_commands),
/// [`flush_commands`](Self::flush_commands) and
/// [`schedule_cleanup`](Self::schedule_cleanup) belong to the update
/// thread; [`execute_commands`](Self::execute_commands) belongs to the
/// render thread.
///
/// ## Usage
///
/// ```rust
/// use std::sync::Arc;
/// use tandem_render::{PassAction, RecordingBackend, Renderer, RendererConfig};
///
/// let renderer = Arc::new(Renderer::new(RecordingBackend::new(), RendererConfig::default()).unwrap());
///
/// let render = {
///     let renderer = Arc::clone(&renderer);
///     std::thread::spawn(move || renderer.execute_commands())
/// };
///
/// renderer.add_command_begin_default_pass(PassAction::clear([0.0, 0.0, 0.0, 1.0]));
/// renderer.add_command_end_pass();
/// renderer.add_command_commit();
/// renderer.commit_commands();
/// renderer.flush_commands();
///
/// assert_eq!(render.join().unwrap().commands_executed, 3);
/// assert_eq!(renderer.frame_index(), 1);
/// ```
pub struct Renderer<B: Backend> {
    /// Configuration.
    config: RendererConfig,
    /// Name and format, captured at creation.
    info: BackendInfo,
    /// Render-thread backend.
    backend: Mutex<B>,
    /// Pending / in-flight command buffers.
    queue: CommandQueue,
    /// Frame-deferred cleanups.
    cleanups: Mutex<CleanupScheduler>,
    /// Handle allocation, shared with destroy cleanups.
    pools: Arc<Mutex<ResourcePools>>,
    /// Render thread → update thread: frame replayed.
    update_semaphore: Semaphore,
    /// Update thread → render thread: frame committed.
    render_semaphore: Semaphore,
    /// A commit has not been flushed yet.
    flushing: AtomicBool,
    /// Current [`RendererState`].
    state: AtomicU8,
    /// Frames fully executed. Written by the render thread only.
    frame_index: AtomicU64,
    /// Default pass width.
    default_pass_width: AtomicU32,
    /// Default pass height.
    default_pass_height: AtomicU32,
    /// Serializes callers into the execute path.
    execute_lock: Mutex<()>,
    /// Update thread binding.
    producer: ThreadBinding,
    /// Render thread binding.
    consumer: ThreadBinding,
    /// Lifetime totals.
    stats: Mutex<RendererStats>,
}

impl<B: Backend> Renderer<B> {
    /// Creates a renderer driving `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] if `config` fails validation.
    pub fn new(backend: B, config: RendererConfig) -> RenderResult<Self> {
        config.validate()?;

        let info = BackendInfo::of(&backend);
        let (producer, consumer) = if config.enforce_thread_affinity {
            (ThreadBinding::new("producer"), ThreadBinding::new("consumer"))
        } else {
            (ThreadBinding::disabled("producer"), ThreadBinding::disabled("consumer"))
        };

        info!(
            backend = %info.name,
            color_format = ?info.color_format,
            command_capacity = config.command_capacity,
            "Renderer created"
        );

        Ok(Self {
            info,
            backend: Mutex::new(backend),
            queue: CommandQueue::with_capacity(config.command_capacity),
            cleanups: Mutex::new(CleanupScheduler::new()),
            pools: Arc::new(Mutex::new(ResourcePools::new(&config.pools))),
            update_semaphore: Semaphore::with_max(0, 1),
            render_semaphore: Semaphore::with_max(0, 1),
            flushing: AtomicBool::new(false),
            state: AtomicU8::new(RendererState::Idle as u8),
            frame_index: AtomicU64::new(0),
            default_pass_width: AtomicU32::new(config.default_pass_width),
            default_pass_height: AtomicU32::new(config.default_pass_height),
            execute_lock: Mutex::new(()),
            producer,
            consumer,
            stats: Mutex::new(RendererStats::default()),
            config,
        })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// The configuration this renderer was built with.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Backend name.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        &self.info.name
    }

    /// Default framebuffer color format.
    #[must_use]
    pub fn pixel_format(&self) -> PixelFormat {
        self.info.color_format
    }

    /// Current handoff state.
    #[must_use]
    pub fn state(&self) -> RendererState {
        RendererState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Frames fully executed by the render thread.
    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index.load(Ordering::Acquire)
    }

    /// Frame the pending buffer will execute as.
    #[must_use]
    pub fn recording_frame(&self) -> u64 {
        self.cleanups.lock().current_frame()
    }

    /// Commands recorded since the last commit.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.queue.pending_len()
    }

    /// Cleanups scheduled but not yet run.
    #[must_use]
    pub fn scheduled_cleanups(&self) -> usize {
        self.cleanups.lock().len()
    }

    /// Returns true while `handle`'s slot has not been returned to its pool.
    #[must_use]
    pub fn is_alive<H: ResourceHandle>(&self, handle: H) -> bool {
        self.pools.lock().is_alive(handle)
    }

    /// Lifetime totals.
    #[must_use]
    pub fn stats(&self) -> RendererStats {
        *self.stats.lock()
    }

    /// Default pass `[width, height]`.
    #[must_use]
    pub fn default_pass_size(&self) -> [u32; 2] {
        [
            self.default_pass_width.load(Ordering::Relaxed),
            self.default_pass_height.load(Ordering::Relaxed),
        ]
    }

    /// Locks the backend. Blocks while a frame is executing.
    pub fn backend(&self) -> MutexGuard<'_, B> {
        self.backend.lock()
    }

    // =========================================================================
    // UPDATE THREAD: RECORDING
    // =========================================================================

    fn record(&self, command: RenderCommand) {
        self.producer.check();
        self.queue.record(command);
    }

    fn make<H: ResourceHandle>(&self, command: impl FnOnce(H) -> RenderCommand) -> RenderResult<H> {
        self.producer.check();

        let handle = self.pools.lock().alloc::<H>().map_err(|e| {
            warn!(kind = %H::KIND, error = %e, "Handle allocation failed");
            e
        })?;

        self.queue.record(command(handle));
        Ok(handle)
    }

    fn destroy<H: ResourceHandle>(&self, handle: H, command: RenderCommand) {
        self.producer.check();

        if !self.pools.lock().retire(handle) {
            trace!(kind = %H::KIND, id = handle.id(), "Ignoring destroy of dead or retiring handle");
            return;
        }

        self.queue.record(command);

        // The slot goes back to the pool only after the destroy has replayed.
        let pools = Arc::clone(&self.pools);
        self.cleanups
            .lock()
            .schedule(H::KIND.name(), self.config.destroy_defer_frames, move || {
                pools.lock().release(handle);
            });
    }

    /// Records opening a debug group.
    pub fn add_command_push_debug_group(&self, name: impl Into<Cow<'static, str>>) {
        self.record(RenderCommand::PushDebugGroup { name: name.into() });
    }

    /// Records closing the innermost debug group.
    pub fn add_command_pop_debug_group(&self) {
        self.record(RenderCommand::PopDebugGroup);
    }

    /// Allocates a buffer handle and records its creation.
    ///
    /// The handle can be used in later commands right away.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PoolExhausted`] if the buffer pool is full.
    pub fn add_command_make_buffer(&self, desc: BufferDesc) -> RenderResult<Buffer> {
        self.make(|buffer| RenderCommand::MakeBuffer { buffer, desc })
    }

    /// Allocates an image handle and records its creation.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PoolExhausted`] if the image pool is full.
    pub fn add_command_make_image(&self, desc: ImageDesc) -> RenderResult<Image> {
        self.make(|image| RenderCommand::MakeImage { image, desc })
    }

    /// Allocates a shader handle and records its creation.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PoolExhausted`] if the shader pool is full.
    pub fn add_command_make_shader(&self, desc: ShaderDesc) -> RenderResult<Shader> {
        self.make(|shader| RenderCommand::MakeShader { shader, desc })
    }

    /// Allocates a pipeline handle and records its creation.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PoolExhausted`] if the pipeline pool is full.
    pub fn add_command_make_pipeline(&self, desc: PipelineDesc) -> RenderResult<Pipeline> {
        self.make(|pipeline| RenderCommand::MakePipeline { pipeline, desc })
    }

    /// Allocates a render target handle and records its creation.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PoolExhausted`] if the pass pool is full.
    pub fn add_command_make_pass(&self, desc: PassDesc) -> RenderResult<Pass> {
        self.make(|pass| RenderCommand::MakePass { pass, desc })
    }

    /// Records destroying `buffer`; its slot is released by a deferred cleanup.
    pub fn add_command_destroy_buffer(&self, buffer: Buffer) {
        self.destroy(buffer, RenderCommand::DestroyBuffer { buffer });
    }

    /// Records destroying `image`; its slot is released by a deferred cleanup.
    pub fn add_command_destroy_image(&self, image: Image) {
        self.destroy(image, RenderCommand::DestroyImage { image });
    }

    /// Records destroying `shader`; its slot is released by a deferred cleanup.
    pub fn add_command_destroy_shader(&self, shader: Shader) {
        self.destroy(shader, RenderCommand::DestroyShader { shader });
    }

    /// Records destroying `pipeline`; its slot is released by a deferred cleanup.
    pub fn add_command_destroy_pipeline(&self, pipeline: Pipeline) {
        self.destroy(pipeline, RenderCommand::DestroyPipeline { pipeline });
    }

    /// Records destroying `pass`; its slot is released by a deferred cleanup.
    pub fn add_command_destroy_pass(&self, pass: Pass) {
        self.destroy(pass, RenderCommand::DestroyPass { pass });
    }

    /// Records replacing the contents of `buffer`.
    pub fn add_command_update_buffer(&self, buffer: Buffer, data: impl Into<Vec<u8>>) {
        self.record(RenderCommand::UpdateBuffer {
            buffer,
            data: data.into(),
        });
    }

    /// Records appending to `buffer`.
    pub fn add_command_append_buffer(&self, buffer: Buffer, data: impl Into<Vec<u8>>) {
        self.record(RenderCommand::AppendBuffer {
            buffer,
            data: data.into(),
        });
    }

    /// Records replacing the contents of `image`.
    pub fn add_command_update_image(&self, image: Image, data: ImageData) {
        self.record(RenderCommand::UpdateImage { image, data });
    }

    /// Records starting a pass on the default framebuffer.
    ///
    /// The size comes from [`set_default_pass_size`](Self::set_default_pass_size)
    /// at replay time.
    pub fn add_command_begin_default_pass(&self, action: PassAction) {
        self.record(RenderCommand::BeginDefaultPass { action });
    }

    /// Records starting a pass on `pass`.
    pub fn add_command_begin_pass(&self, pass: Pass, action: PassAction) {
        self.record(RenderCommand::BeginPass { pass, action });
    }

    /// Records setting the viewport.
    pub fn add_command_apply_viewport(&self, rect: Rect, origin_top_left: bool) {
        self.record(RenderCommand::ApplyViewport { rect, origin_top_left });
    }

    /// Records setting the scissor rectangle.
    pub fn add_command_apply_scissor_rect(&self, rect: Rect, origin_top_left: bool) {
        self.record(RenderCommand::ApplyScissorRect { rect, origin_top_left });
    }

    /// Records binding `pipeline`.
    pub fn add_command_apply_pipeline(&self, pipeline: Pipeline) {
        self.record(RenderCommand::ApplyPipeline { pipeline });
    }

    /// Records binding resources.
    pub fn add_command_apply_bindings(&self, bindings: &Bindings) {
        self.record(RenderCommand::ApplyBindings { bindings: *bindings });
    }

    /// Records a uniform upload, copying `data` inline.
    ///
    /// # Panics
    ///
    /// Panics if `data` is longer than
    /// [`MAX_UNIFORM_BYTES`](crate::MAX_UNIFORM_BYTES).
    pub fn add_command_apply_uniforms(&self, stage: ShaderStage, slot: u32, data: &[u8]) {
        let block = match UniformBlock::try_from_bytes(data) {
            Ok(block) => block,
            Err(e) => panic!("add_command_apply_uniforms: {e}"),
        };
        self.record(RenderCommand::ApplyUniforms { stage, slot, block });
    }

    /// Records a uniform upload of a plain-old-data value.
    ///
    /// # Panics
    ///
    /// Panics if `T` is larger than [`MAX_UNIFORM_BYTES`](crate::MAX_UNIFORM_BYTES).
    pub fn add_command_apply_uniforms_pod<T: Pod>(&self, stage: ShaderStage, slot: u32, value: &T) {
        self.add_command_apply_uniforms(stage, slot, bytemuck::bytes_of(value));
    }

    /// Records a draw.
    pub fn add_command_draw(&self, base_element: u32, element_count: u32, instance_count: u32) {
        self.record(RenderCommand::Draw {
            base_element,
            element_count,
            instance_count,
        });
    }

    /// Records ending the current pass.
    pub fn add_command_end_pass(&self) {
        self.record(RenderCommand::EndPass);
    }

    /// Records the backend's end-of-frame commit.
    pub fn add_command_commit(&self) {
        self.record(RenderCommand::Commit);
    }

    /// Records a caller-supplied operation, run on the render thread with
    /// the backend.
    pub fn add_command_custom(
        &self,
        label: &'static str,
        callback: impl FnOnce(&mut dyn Backend) + Send + 'static,
    ) {
        self.record(RenderCommand::Custom(CustomCommand::new(label, callback)));
    }

    /// Queues `action` to run on the render thread once the frame being
    /// recorded, plus `defer_frames` more, have executed.
    ///
    /// Returns the due frame.
    pub fn schedule_cleanup(&self, defer_frames: u32, action: impl FnOnce() + Send + 'static) -> u64 {
        self.producer.check();
        self.cleanups.lock().schedule("custom", defer_frames, action)
    }

    // =========================================================================
    // UPDATE THREAD: HANDOFF
    // =========================================================================

    /// Publishes the pending buffer to the render thread.
    ///
    /// # Panics
    ///
    /// Panics if the previous commit has not been flushed.
    pub fn commit_commands(&self) {
        self.producer.check();

        let already_flushing = self.flushing.swap(true, Ordering::AcqRel);
        assert!(
            !already_flushing,
            "commit_commands called twice without an intervening flush"
        );

        let handed_over = self.queue.swap_and_commit();
        let frame = {
            let mut cleanups = self.cleanups.lock();
            let frame = cleanups.current_frame();
            cleanups.advance_frame();
            frame
        };

        self.state.store(RendererState::Committed as u8, Ordering::Release);
        self.render_semaphore.release();

        debug!(frame, commands = handed_over, "Commands committed");
    }

    /// Blocks until the render thread has executed the last commit.
    ///
    /// Returns immediately if nothing is outstanding.
    pub fn flush_commands(&self) {
        self.producer.check();

        if !self.flushing.load(Ordering::Acquire) {
            return;
        }

        self.update_semaphore.acquire();
        self.finish_flush();
    }

    /// Same as [`flush_commands`](Self::flush_commands).
    pub fn wait_for_flush(&self) {
        self.flush_commands();
    }

    /// Waits at most `timeout` for the last commit to execute.
    ///
    /// Returns true if nothing is outstanding anymore. Update thread only:
    /// it takes the same completion permit as
    /// [`flush_commands`](Self::flush_commands).
    ///
    /// # Panics
    ///
    /// Panics when called from a thread other than the update thread.
    #[must_use]
    pub fn try_wait_for_flush(&self, timeout: Duration) -> bool {
        self.producer.check();

        if !self.flushing.load(Ordering::Acquire) {
            return true;
        }

        if self.update_semaphore.try_acquire_for(timeout) {
            self.finish_flush();
            true
        } else {
            false
        }
    }

    /// Waits for outstanding work so the renderer can be dropped cleanly.
    ///
    /// Update thread only, like [`try_wait_for_flush`](Self::try_wait_for_flush).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::FlushTimeout`] if the render thread does not
    /// finish the last commit within `timeout`.
    pub fn shutdown(&self, timeout: Duration) -> RenderResult<()> {
        if self.try_wait_for_flush(timeout) {
            info!(frames = self.frame_index(), "Renderer drained");
            Ok(())
        } else {
            let waited_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(waited_ms, "Renderer shutdown timed out");
            Err(RenderError::FlushTimeout { waited_ms })
        }
    }

    fn finish_flush(&self) {
        self.flushing.store(false, Ordering::Release);
        self.state.store(RendererState::Idle as u8, Ordering::Release);
        debug!(frame = self.frame_index(), "Commands flushed");
    }

    // =========================================================================
    // RENDER THREAD
    // =========================================================================

    /// Sets the default framebuffer size used by default passes.
    pub fn set_default_pass_size(&self, width: u32, height: u32) {
        self.default_pass_width.store(width, Ordering::Relaxed);
        self.default_pass_height.store(height, Ordering::Relaxed);
    }

    /// Serializes external access against the execute path.
    ///
    /// While the guard lives, a committed frame waits to start replaying.
    /// An execute that is still waiting for a commit does not hold the
    /// lock, so taking it never waits on the update thread.
    pub fn lock_execute(&self) -> MutexGuard<'_, ()> {
        self.execute_lock.lock()
    }

    /// Blocks until a commit arrives, then replays it in full.
    pub fn execute_commands(&self) -> ExecuteReport {
        self.execute_commands_with(ExecuteMode::Full)
    }

    /// Blocks until a commit arrives, then replays it according to `mode`.
    pub fn execute_commands_with(&self, mode: ExecuteMode) -> ExecuteReport {
        self.consumer.check();

        self.render_semaphore.acquire();
        let _serial = self.execute_lock.lock();
        self.execute_committed(mode)
    }

    /// Waits at most `timeout` for a commit; replays it if one arrives.
    ///
    /// Lets a render loop wake up periodically to check for shutdown.
    pub fn try_execute_commands_for(&self, timeout: Duration, mode: ExecuteMode) -> Option<ExecuteReport> {
        self.consumer.check();

        if !self.render_semaphore.try_acquire_for(timeout) {
            return None;
        }
        let _serial = self.execute_lock.lock();
        Some(self.execute_committed(mode))
    }

    fn execute_committed(&self, mode: ExecuteMode) -> ExecuteReport {
        self.state.store(RendererState::Executing as u8, Ordering::Release);

        let frame = self.frame_index.load(Ordering::Acquire);
        let span = debug_span!("execute_commands", frame, ?mode);
        let _enter = span.enter();

        let default_pass_size = self.default_pass_size();
        let mut executed = 0u32;
        let mut skipped = 0u32;

        {
            let mut backend = self.backend.lock();
            self.queue.drain(|command| {
                let kind = command.kind();
                if mode.replays(kind) {
                    trace!(?kind, "Replaying command");
                    command.execute(&mut *backend, default_pass_size);
                    executed += 1;
                } else {
                    skipped += 1;
                }
            });
        }

        let mut due: Vec<CleanupEntry> = Vec::new();
        self.cleanups.lock().take_due(frame, &mut due);
        let cleanups_run = due.len();
        for entry in due {
            trace!(label = entry.label(), due_frame = entry.due_frame(), "Running cleanup");
            entry.run();
        }

        let report = ExecuteReport {
            frame,
            commands_executed: executed,
            commands_skipped: skipped,
            cleanups_run: u32::try_from(cleanups_run).unwrap_or(u32::MAX),
        };
        self.stats.lock().record(&report);

        self.frame_index.store(frame + 1, Ordering::Release);
        self.state.store(RendererState::Flushed as u8, Ordering::Release);
        self.update_semaphore.release();

        debug!(
            executed = report.commands_executed,
            skipped = report.commands_skipped,
            cleanups = report.cleanups_run,
            "Frame executed"
        );

        report
    }
}

impl<B: Backend> Drop for Renderer<B> {
    fn drop(&mut self) {
        if *self.flushing.get_mut() && self.render_semaphore.available() > 0 {
            warn!(
                commands = self.queue.in_flight_len(),
                "Renderer dropped with a committed frame that was never executed"
            );
        }

        // Final drain: whatever is still scheduled runs now, exactly once.
        let remaining = self.cleanups.get_mut().drain_all();
        if !remaining.is_empty() {
            warn!(count = remaining.len(), "Running cleanups that never came due");
        }
        for entry in remaining {
            entry.run();
        }

        info!(frames = *self.frame_index.get_mut(), "Renderer destroyed");
    }
}

impl<B: Backend> std::fmt::Debug for Renderer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("backend", &self.info.name)
            .field("state", &self.state())
            .field("frame_index", &self.frame_index())
            .finish_non_exhaustive()
    }
}
