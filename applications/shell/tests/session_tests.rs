//! Integration tests for shell command execution
//!
//! Runs command sequences against the demo library on the simulated
//! backend, with tokio time paused.

use melo_playback::{PlaybackConfig, PlaybackEngine, PlayerStatus, RepeatMode, SimulatedBackend};
use melo_shell::{demo::demo_library, Command, Outcome, Session, ShellError};
use std::sync::Arc;
use std::time::Duration;

fn session() -> Session {
    let library = demo_library();
    let backend = Arc::new(SimulatedBackend::from_tracks(&library));
    let engine = PlaybackEngine::new(backend, PlaybackConfig::default());
    Session::new(library, engine)
}

async fn run(session: &mut Session, line: &str) -> String {
    let command: Command = line.parse().expect("Failed to parse command");
    match session.execute(command).await.expect("Command failed") {
        Outcome::Continue(output) => output,
        Outcome::Quit => panic!("unexpected quit"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_play_seeds_queue_with_library() {
    let mut session = session();

    let output = run(&mut session, "play 2").await;
    assert_eq!(output, "Playing Harbour Walk");

    let snapshot = session.engine().snapshot();
    assert_eq!(snapshot.status, PlayerStatus::Playing);
    assert_eq!(snapshot.current_index, Some(1));
    assert_eq!(snapshot.queue.len(), session.library().len());

    let queue = run(&mut session, "queue").await;
    assert!(queue.lines().nth(1).unwrap().starts_with(">  2. Harbour Walk"));
}

#[tokio::test(start_paused = true)]
async fn test_status_line() {
    let mut session = session();
    assert_eq!(
        run(&mut session, "status").await,
        "[idle] nothing loaded (shuffle off, repeat off)"
    );

    run(&mut session, "play 1").await;
    run(&mut session, "seek 65").await;
    let status = run(&mut session, "pause").await;

    assert_eq!(status, "[paused] Morning Light 1:05 / 3:04 (shuffle off, repeat off)");
}

#[tokio::test(start_paused = true)]
async fn test_playback_advances_on_the_clock() {
    let mut session = session();
    run(&mut session, "play 5").await;

    // Short Interlude is the last track (12s) and repeat is off
    let mut rx = session.engine().subscribe();
    let snapshot = tokio::time::timeout(
        Duration::from_secs(60),
        rx.wait_for(|s| s.status == PlayerStatus::Paused),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    assert_eq!(snapshot.current_index, Some(4));
    assert_eq!(snapshot.position, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_repeat_all_wraps_from_last_track() {
    let mut session = session();
    assert_eq!(run(&mut session, "repeat").await, "Repeat all");
    assert_eq!(session.engine().snapshot().repeat, RepeatMode::All);
    run(&mut session, "play 5").await;

    let mut rx = session.engine().subscribe();
    let snapshot = tokio::time::timeout(
        Duration::from_secs(60),
        rx.wait_for(|s| s.current_index == Some(0)),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    assert!(snapshot.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_playlist_workflow() {
    let mut session = session();

    assert_eq!(run(&mut session, "playlist new  Road trip ").await, "Created playlist 'Road trip'");
    run(&mut session, "playlist add 1 3").await;
    run(&mut session, "playlist add 1 1").await;
    run(&mut session, "playlist add 1 3").await;
    assert_eq!(run(&mut session, "playlists").await, "  1. Road trip (3 tracks)");

    assert_eq!(run(&mut session, "playlist play 1").await, "Playing Glasshouse");
    let snapshot = session.engine().snapshot();
    assert_eq!(snapshot.queue.len(), 3);

    // Removing entry 1 drops both copies of Glasshouse
    assert_eq!(
        run(&mut session, "playlist remove 1 1").await,
        "Removed Glasshouse (2 entries)"
    );
    assert_eq!(session.store().playlists()[0].track_count(), 1);
    // The engine keeps its own copy of the queue
    assert_eq!(session.engine().snapshot().queue.len(), 3);

    assert_eq!(run(&mut session, "playlist delete 1").await, "Deleted playlist 'Road trip'");
    assert_eq!(run(&mut session, "playlists").await, "No playlists");
}

#[tokio::test(start_paused = true)]
async fn test_errors_leave_state_unchanged() {
    let mut session = session();

    let result = session.execute(Command::Play(99)).await;
    assert!(matches!(
        result,
        Err(ShellError::OutOfRange {
            kind: "track",
            position: 99
        })
    ));

    let result = session.execute(Command::Next).await;
    assert!(matches!(result, Err(ShellError::Playback(_))));

    run(&mut session, "playlist new Empty").await;
    let result = session.execute(Command::PlaylistPlay(1)).await;
    assert!(matches!(result, Err(ShellError::EmptyPlaylist(name)) if name == "Empty"));

    let result = session.execute(Command::PlaylistNew("   ".to_string())).await;
    assert!(matches!(result, Err(ShellError::Playlist(_))));

    assert_eq!(session.engine().snapshot().status, PlayerStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_quit() {
    let mut session = session();
    assert_eq!(session.execute(Command::Quit).await.unwrap(), Outcome::Quit);
}
