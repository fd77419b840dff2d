//! Integration tests for the update/render handoff.
//!
//! The test thread plays the update thread; a spawned thread plays the
//! render thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tandem_render::{
    BackendCall, BufferDesc, CallLog, ExecuteMode, ExecuteReport, PassAction, RecordingBackend,
    Renderer, RendererConfig, RendererState, ResourceHandle,
};

fn shared_renderer(config: RendererConfig) -> (Arc<Renderer<RecordingBackend>>, CallLog) {
    let backend = RecordingBackend::new();
    let log = backend.log();
    (Arc::new(Renderer::new(backend, config).unwrap()), log)
}

/// Spawns a render thread that executes exactly `frames` commits.
fn spawn_render_thread(
    renderer: &Arc<Renderer<RecordingBackend>>,
    frames: usize,
) -> thread::JoinHandle<Vec<ExecuteReport>> {
    let renderer = Arc::clone(renderer);
    thread::spawn(move || (0..frames).map(|_| renderer.execute_commands()).collect())
}

fn draw(base_element: u32) -> BackendCall {
    BackendCall::Draw {
        base_element,
        element_count: 3,
        instance_count: 1,
    }
}

#[test]
fn test_replay_preserves_recording_order() {
    let (renderer, log) = shared_renderer(RendererConfig::default());
    let render = spawn_render_thread(&renderer, 1);

    renderer.add_command_push_debug_group("scene");
    renderer.add_command_begin_default_pass(PassAction::clear([0.1, 0.1, 0.1, 1.0]));
    for n in 0..5 {
        renderer.add_command_draw(n, 3, 1);
    }
    renderer.add_command_end_pass();
    renderer.add_command_pop_debug_group();
    renderer.add_command_commit();

    renderer.commit_commands();
    renderer.flush_commands();

    let reports = render.join().unwrap();
    assert_eq!(reports[0].commands_executed, 10);

    let mut expected = vec![
        BackendCall::PushDebugGroup("scene".into()),
        BackendCall::BeginDefaultPass { width: 0, height: 0 },
    ];
    expected.extend((0..5).map(draw));
    expected.extend([BackendCall::EndPass, BackendCall::PopDebugGroup, BackendCall::Commit]);
    assert_eq!(log.snapshot(), expected);
}

#[test]
fn test_commands_recorded_after_commit_wait_for_next_frame() {
    let (renderer, log) = shared_renderer(RendererConfig::default());
    let render = spawn_render_thread(&renderer, 2);

    renderer.add_command_draw(100, 3, 1);
    renderer.commit_commands();

    // Recorded while frame 0 may be replaying.
    renderer.add_command_draw(200, 3, 1);
    renderer.flush_commands();

    assert_eq!(log.snapshot(), vec![draw(100)]);
    assert_eq!(renderer.pending_len(), 1);

    renderer.commit_commands();
    renderer.flush_commands();

    let reports = render.join().unwrap();
    assert_eq!(reports.iter().map(|r| r.commands_executed).collect::<Vec<_>>(), vec![1, 1]);
    assert_eq!(log.snapshot(), vec![draw(100), draw(200)]);
}

#[test]
fn test_overlapped_frames_converge() {
    const FRAMES: u32 = 100;

    let (renderer, log) = shared_renderer(RendererConfig::default());
    let render = spawn_render_thread(&renderer, FRAMES as usize);

    for n in 0..FRAMES {
        renderer.add_command_draw(n, 3, 1);
        renderer.flush_commands();
        renderer.commit_commands();
    }
    renderer.flush_commands();

    let reports = render.join().unwrap();
    assert_eq!(renderer.frame_index(), u64::from(FRAMES));
    assert_eq!(renderer.state(), RendererState::Idle);
    assert_eq!(reports.last().map(|r| r.frame), Some(u64::from(FRAMES) - 1));
    assert_eq!(log.snapshot(), (0..FRAMES).map(draw).collect::<Vec<_>>());
}

#[test]
fn test_cleanup_with_defer_two_runs_on_third_drain() {
    let (renderer, log) = shared_renderer(RendererConfig::default());
    let render = spawn_render_thread(&renderer, 3);

    let marker = log.clone();
    let due = renderer.schedule_cleanup(2, move || marker.mark("released"));
    assert_eq!(due, 2);

    let released = BackendCall::Marker("released".into());
    for drain in 1..=3 {
        renderer.commit_commands();
        renderer.flush_commands();

        let ran = log.position(&released).is_some();
        assert_eq!(ran, drain == 3, "drain {drain}");
    }

    let reports = render.join().unwrap();
    assert_eq!(reports.iter().map(|r| r.cleanups_run).collect::<Vec<_>>(), vec![0, 0, 1]);
    assert_eq!(renderer.scheduled_cleanups(), 0);
}

#[test]
fn test_cleanup_runs_after_the_frame_replays() {
    let (renderer, log) = shared_renderer(RendererConfig::default());
    let render = spawn_render_thread(&renderer, 1);

    let marker = log.clone();
    renderer.add_command_draw(0, 3, 1);
    renderer.schedule_cleanup(0, move || marker.mark("cleanup"));
    renderer.add_command_commit();

    renderer.commit_commands();
    renderer.flush_commands();
    render.join().unwrap();

    assert_eq!(
        log.snapshot(),
        vec![draw(0), BackendCall::Commit, BackendCall::Marker("cleanup".into())]
    );
}

#[test]
fn test_handle_lifecycle_round_trip() {
    let mut config = RendererConfig::default();
    config.pools.buffers = 1;
    config.destroy_defer_frames = 1;
    let (renderer, log) = shared_renderer(config);
    let render = spawn_render_thread(&renderer, 2);

    // Make, use and destroy within one frame.
    let buffer = renderer.add_command_make_buffer(BufferDesc::default()).unwrap();
    renderer.add_command_update_buffer(buffer, [9u8, 8, 7]);
    renderer.add_command_destroy_buffer(buffer);
    renderer.commit_commands();
    renderer.flush_commands();

    assert_eq!(
        log.snapshot(),
        vec![
            BackendCall::InitBuffer(buffer),
            BackendCall::UpdateBuffer(buffer, vec![9, 8, 7]),
            BackendCall::DestroyBuffer(buffer),
        ]
    );

    // The slot is still held: the single-slot pool is full.
    assert!(renderer.is_alive(buffer));
    assert!(renderer.add_command_make_buffer(BufferDesc::default()).is_err());

    renderer.commit_commands();
    renderer.flush_commands();
    render.join().unwrap();

    assert!(!renderer.is_alive(buffer));

    let reused = renderer.add_command_make_buffer(BufferDesc::default()).unwrap();
    assert_eq!(reused.slot(), buffer.slot());
    assert_ne!(reused, buffer);
    assert!(!renderer.is_alive(buffer));
}

#[test]
fn test_resources_only_frame_still_counts() {
    let (renderer, log) = shared_renderer(RendererConfig::default());
    let render = {
        let renderer = Arc::clone(&renderer);
        thread::spawn(move || renderer.execute_commands_with(ExecuteMode::ResourcesOnly))
    };

    let buffer = renderer.add_command_make_buffer(BufferDesc::default()).unwrap();
    renderer.add_command_begin_default_pass(PassAction::load());
    renderer.add_command_draw(0, 3, 1);
    renderer.add_command_end_pass();

    renderer.commit_commands();
    renderer.flush_commands();

    let report = render.join().unwrap();
    assert_eq!(report.commands_executed, 1);
    assert_eq!(report.commands_skipped, 3);
    assert_eq!(renderer.frame_index(), 1);
    assert_eq!(log.snapshot(), vec![BackendCall::InitBuffer(buffer)]);
}

#[test]
fn test_polling_render_loop_shuts_down() {
    let (renderer, _log) = shared_renderer(RendererConfig::default());
    let stop = Arc::new(AtomicBool::new(false));

    let render = {
        let renderer = Arc::clone(&renderer);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut frames = 0;
            while !stop.load(Ordering::Acquire) {
                if renderer
                    .try_execute_commands_for(Duration::from_millis(5), ExecuteMode::Full)
                    .is_some()
                {
                    frames += 1;
                }
            }
            frames
        })
    };

    for n in 0..10 {
        renderer.add_command_draw(n, 3, 1);
        renderer.flush_commands();
        renderer.commit_commands();
    }

    renderer.shutdown(Duration::from_secs(5)).unwrap();
    stop.store(true, Ordering::Release);

    assert_eq!(render.join().unwrap(), 10);
    assert_eq!(renderer.frame_index(), 10);
    assert_eq!(renderer.stats().frames_executed, 10);
}

#[test]
fn test_second_producer_thread_panics() {
    let (renderer, _log) = shared_renderer(RendererConfig::default());
    renderer.add_command_draw(0, 3, 1);

    let intruder = {
        let renderer = Arc::clone(&renderer);
        thread::spawn(move || renderer.add_command_draw(1, 3, 1))
    };

    assert!(intruder.join().is_err());
    assert_eq!(renderer.pending_len(), 1);
}

#[test]
fn test_affinity_can_be_disabled() {
    let mut config = RendererConfig::default();
    config.enforce_thread_affinity = false;
    let (renderer, _log) = shared_renderer(config);
    renderer.add_command_draw(0, 3, 1);

    let other = {
        let renderer = Arc::clone(&renderer);
        thread::spawn(move || renderer.add_command_draw(1, 3, 1))
    };

    other.join().unwrap();
    assert_eq!(renderer.pending_len(), 2);
}

#[test]
fn test_lock_execute_while_render_thread_idles() {
    let (renderer, log) = shared_renderer(RendererConfig::default());
    let render = spawn_render_thread(&renderer, 1);

    // Let the render thread park waiting for a commit.
    thread::sleep(Duration::from_millis(50));

    let (locked_tx, locked_rx) = std::sync::mpsc::channel();
    let pauser = {
        let renderer = Arc::clone(&renderer);
        thread::spawn(move || {
            let _paused = renderer.lock_execute();
            locked_tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(100));
        })
    };
    locked_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("lock_execute waited on an idle render thread");

    // Committed while paused: replay waits for the guard.
    renderer.add_command_draw(0, 3, 1);
    renderer.commit_commands();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(renderer.frame_index(), 0);

    pauser.join().unwrap();
    renderer.flush_commands();
    render.join().unwrap();

    assert_eq!(renderer.frame_index(), 1);
    assert_eq!(log.snapshot(), vec![draw(0)]);
}

#[test]
fn test_flush_wait_is_update_thread_only() {
    let (renderer, _log) = shared_renderer(RendererConfig::default());
    renderer.commit_commands();

    let intruder = {
        let renderer = Arc::clone(&renderer);
        thread::spawn(move || renderer.try_wait_for_flush(Duration::from_millis(500)))
    };
    assert!(intruder.join().is_err());

    // The completion permit is still there for the update thread.
    let render = spawn_render_thread(&renderer, 1);
    assert!(renderer.try_wait_for_flush(Duration::from_secs(5)));
    render.join().unwrap();

    assert_eq!(renderer.state(), RendererState::Idle);
    assert_eq!(renderer.frame_index(), 1);
}
