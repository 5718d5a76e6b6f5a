//! Built-in library used when no manifest is configured

use melo_core::Track;
use std::time::Duration;

const DEMO_TRACKS: &[(&str, &str, u64)] = &[
    ("demo-1", "Morning Light.mp3", 184),
    ("demo-2", "Harbour Walk.flac", 231),
    ("demo-3", "Glasshouse.m4a", 158),
    ("demo-4", "Night Ferry.mp3", 247),
    ("demo-5", "Short Interlude.ogg", 12),
];

pub fn demo_library() -> Vec<Track> {
    DEMO_TRACKS
        .iter()
        .map(|(id, filename, secs)| {
            Track::new(*id, format!("demo://{id}"), *filename).with_duration(Duration::from_secs(*secs))
        })
        .collect()
}
