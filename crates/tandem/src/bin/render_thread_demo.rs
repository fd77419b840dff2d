//! # Render Thread Demo
//!
//! Records a small scene on the main thread and replays it on a render
//! thread through the recording backend.
//!
//! ```bash
//! # Default logging
//! cargo run --bin render_thread_demo
//!
//! # Per-command replay traces
//! RUST_LOG=trace cargo run --bin render_thread_demo
//!
//! # Custom config
//! cargo run --bin render_thread_demo -- tandem.toml
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytemuck::{Pod, Zeroable};
use tandem::render::{
    BufferDesc, BufferType, PassAction, PipelineDesc, Rect, ShaderDesc, ShaderStage,
};
use tandem::{RecordingBackend, RenderResult, RenderThread, RenderThreadConfig, Renderer, RendererConfig};
use tracing::{error, info};

const FRAMES: u32 = 120;
const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;
const VIEWPORT: Rect = Rect::new(0, 0, 1280, 720);

/// Per-draw uniforms.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct DrawParams {
    offset: [f32; 2],
    scale: f32,
    time: f32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tandem=debug")),
        )
        .init();

    if let Err(e) = run() {
        error!(error = %e, "Demo failed");
        std::process::exit(1);
    }
}

fn run() -> RenderResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => RendererConfig::load(path)?,
        None => RendererConfig {
            default_pass_width: WIDTH,
            default_pass_height: HEIGHT,
            destroy_defer_frames: 2,
            ..RendererConfig::default()
        },
    };

    let backend = RecordingBackend::new();
    let log = backend.log();
    let renderer = Arc::new(Renderer::new(backend, config)?);
    let render_thread = RenderThread::spawn(Arc::clone(&renderer), RenderThreadConfig::default())?;

    // Resources, created once.
    let vertices = renderer.add_command_make_buffer(BufferDesc {
        size: 3 * 16,
        buffer_type: BufferType::Vertex,
        label: Some("triangle".into()),
        ..BufferDesc::default()
    })?;
    let shader = renderer.add_command_make_shader(ShaderDesc::default())?;
    let pipeline = renderer.add_command_make_pipeline(PipelineDesc {
        shader,
        ..PipelineDesc::default()
    })?;

    let start = Instant::now();
    for frame in 0..FRAMES {
        // The window is hidden for a stretch in the middle.
        render_thread.set_hidden((40..60).contains(&frame));

        let time = start.elapsed().as_secs_f32();
        renderer.add_command_push_debug_group("frame");
        renderer.add_command_begin_default_pass(PassAction::clear([0.05, 0.05, 0.08, 1.0]));
        renderer.add_command_apply_viewport(VIEWPORT, true);
        renderer.add_command_apply_pipeline(pipeline);
        for i in 0..4u8 {
            let params = DrawParams {
                offset: [f32::from(i) * 0.25 - 0.5, 0.0],
                scale: 0.2,
                time,
            };
            renderer.add_command_apply_uniforms_pod(ShaderStage::Vertex, 0, &params);
            renderer.add_command_draw(0, 3, 1);
        }
        renderer.add_command_end_pass();
        renderer.add_command_pop_debug_group();
        renderer.add_command_commit();

        // Wait for the previous frame before handing over this one.
        renderer.flush_commands();
        renderer.commit_commands();
    }

    renderer.add_command_destroy_pipeline(pipeline);
    renderer.add_command_destroy_shader(shader);
    renderer.add_command_destroy_buffer(vertices);
    renderer.flush_commands();
    renderer.commit_commands();

    // Two empty frames let the deferred releases come due.
    for _ in 0..2 {
        renderer.flush_commands();
        renderer.commit_commands();
    }

    renderer.shutdown(Duration::from_secs(2))?;
    let frames = render_thread.stop().unwrap_or_else(|_| {
        error!("Render thread panicked");
        0
    });

    let stats = renderer.stats();
    info!(
        frames,
        backend_calls = log.len(),
        avg_commands = stats.avg_commands_per_frame(),
        peak_commands = stats.peak_commands_per_frame,
        skipped = stats.commands_skipped,
        cleanups = stats.cleanups_run,
        pipeline_released = !renderer.is_alive(pipeline),
        "Demo complete"
    );

    Ok(())
}
