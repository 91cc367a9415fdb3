//! End-to-end extraction tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::{
    fs,
    num::{NonZeroU32, NonZeroU64},
    path::Path,
    sync::{Arc, Mutex},
};

use holoframe::{
    ExtractOptions, ProgressCallback, ProgressInfo, ResizeFilter, StreamEnd, VideoSource,
    artifact_path,
};
use image::ColorType;

fn sample_60fps_path() -> &'static str {
    "tests/fixtures/sample_60fps.mp4"
}

fn sample_24fps_path() -> &'static str {
    "tests/fixtures/sample_24fps.mp4"
}

fn quiet_options() -> ExtractOptions {
    ExtractOptions::new().with_batch_size(u64::MAX)
}

/// Every file in `dir`, sorted by name.
fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to list output directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn assert_contiguous(dir: &Path, count: u64) {
    let expected: Vec<String> = (0..count).map(|i| format!("frame_{i:06}.png")).collect();
    assert_eq!(listing(dir), expected);
}

// ── sampling ───────────────────────────────────────────────────────

#[test]
fn sixty_fps_source_at_thirty_keeps_every_other_frame() {
    let path = sample_60fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path().join("frames");

    let report = holoframe::extract(path, &out, &quiet_options()).expect("Extraction failed");

    assert_eq!(report.interval.get(), 2);
    assert_eq!(report.end, StreamEnd::Exhausted);
    assert!(report.decoded_count > 0);
    assert_eq!(report.saved_count, report.decoded_count.div_ceil(2));
    assert_contiguous(&out, report.saved_count);
}

#[test]
fn target_above_native_rate_keeps_every_frame() {
    let path = sample_24fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();

    let report = holoframe::extract(path, out, &quiet_options()).expect("Extraction failed");

    assert_eq!(report.interval.get(), 1);
    assert_eq!(report.saved_count, report.decoded_count);
    assert_contiguous(out, report.saved_count);
}

#[test]
fn decoded_count_matches_a_plain_decode() {
    let path = sample_60fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = VideoSource::open(path).expect("Failed to open fixture");
    let decoded = source
        .frames()
        .expect("Failed to start decoding")
        .collect::<Result<Vec<_>, _>>()
        .expect("Fixture should decode cleanly")
        .len() as u64;
    drop(source);

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let report = holoframe::extract(path, temporary_directory.path(), &quiet_options())
        .expect("Extraction failed");
    assert_eq!(report.decoded_count, decoded);
}

// ── output format ──────────────────────────────────────────────────

#[test]
fn artifacts_are_64_by_48_grayscale_png() {
    let path = sample_60fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();
    let options = quiet_options().with_max_frames(NonZeroU64::new(3));

    let report = holoframe::extract(path, out, &options).expect("Extraction failed");
    assert_eq!(report.saved_count, 3);

    for index in 0..report.saved_count {
        let image = image::open(artifact_path(out, index)).expect("Artifact should decode");
        assert_eq!((image.width(), image.height()), (64, 48));
        assert_eq!(image.color(), ColorType::L8);
    }
}

#[test]
fn custom_resolution_and_filter() {
    let path = sample_24fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();
    let options = quiet_options()
        .with_max_frames(NonZeroU64::new(1))
        .with_resolution(32, 24)
        .with_resize_filter(ResizeFilter::Nearest);

    holoframe::extract(path, out, &options).expect("Extraction failed");

    let image = image::open(artifact_path(out, 0)).expect("Artifact should decode");
    assert_eq!((image.width(), image.height()), (32, 24));
}

// ── frame cap ──────────────────────────────────────────────────────

#[test]
fn max_frames_stops_after_cap() {
    let path = sample_60fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();
    let options = quiet_options().with_max_frames(NonZeroU64::new(5));

    let report = holoframe::extract(path, out, &options).expect("Extraction failed");

    assert_eq!(report.saved_count, 5);
    assert_eq!(report.end, StreamEnd::FrameCap);
    // The cap is checked right after the fifth keep, at decode position 8.
    assert_eq!(report.decoded_count, 9);
    assert_contiguous(out, 5);
}

#[test]
fn cap_larger_than_source_runs_to_the_end() {
    let path = sample_24fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let options = quiet_options().with_max_frames(NonZeroU64::new(1_000_000));

    let report = holoframe::extract(path, temporary_directory.path(), &options)
        .expect("Extraction failed");

    assert_eq!(report.end, StreamEnd::Exhausted);
    assert!(report.saved_count < 1_000_000);
}

#[test]
fn lower_target_rate_widens_interval() {
    let path = sample_60fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let options = quiet_options().with_target_fps(NonZeroU32::new(7).unwrap());

    let report = holoframe::extract(path, temporary_directory.path(), &options)
        .expect("Extraction failed");

    assert_eq!(report.interval.get(), 8);
    assert_eq!(report.saved_count, report.decoded_count.div_ceil(8));
}

// ── output directory ───────────────────────────────────────────────

#[test]
fn creates_nested_output_directory() {
    let path = sample_24fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path().join("plugins/Hologram/frames");
    let options = quiet_options().with_max_frames(NonZeroU64::new(2));

    holoframe::extract(path, &out, &options).expect("Extraction failed");
    assert_contiguous(&out, 2);
}

#[test]
fn existing_files_are_left_in_place() {
    let path = sample_24fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temporary_directory.path();
    fs::write(out.join("notes.txt"), b"keep me").expect("Failed to write marker");
    let options = quiet_options().with_max_frames(NonZeroU64::new(2));

    holoframe::extract(path, out, &options).expect("Extraction failed");

    assert_eq!(
        listing(out),
        vec!["frame_000000.png", "frame_000001.png", "notes.txt"]
    );
    assert_eq!(fs::read(out.join("notes.txt")).unwrap(), b"keep me");
}

// ── progress ───────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder(Mutex<Vec<ProgressInfo>>);

impl ProgressCallback for Recorder {
    fn on_progress(&self, info: &ProgressInfo) {
        self.0.lock().unwrap().push(info.clone());
    }
}

#[test]
fn progress_reports_every_batch_and_at_the_end() {
    let path = sample_60fps_path();
    if !Path::new(path).exists() {
        return;
    }

    let recorder = Arc::new(Recorder::default());
    let options = ExtractOptions::new()
        .with_progress(recorder.clone())
        .with_batch_size(10);

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let report = holoframe::extract(path, temporary_directory.path(), &options)
        .expect("Extraction failed");

    let reports = recorder.0.lock().unwrap();
    let (last, batches) = reports.split_last().expect("Expected a final report");
    assert!(last.finished);
    assert_eq!(last.current, report.saved_count);
    assert_eq!(batches.len() as u64, report.saved_count / 10);
    for (i, info) in batches.iter().enumerate() {
        assert_eq!(info.current, (i as u64 + 1) * 10);
        assert!(!info.finished);
    }
}
