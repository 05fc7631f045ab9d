//! Batch run lifecycle integration tests.
//!
//! These tests drive the batch runner with mock converter and tag reader:
//! - Tree discovery, filtering and mirroring
//! - Per-file failures and source removal
//! - Output naming from tags, collisions
//! - Pre-flight errors, cancellation and bounded parallelism

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use audiobatch_core::{
    batch::SUMMARY_FILE_NAME,
    testing::{fixtures, MockConverter, MockTagReader},
    BatchRunner, ConfigError, InputFilter, InputMode, OutputFormat, RunError, Settings,
};

/// Test helper wiring a runner to mocks over a scratch directory.
struct TestHarness {
    runner: BatchRunner<MockConverter, MockTagReader>,
    converter: Arc<MockConverter>,
    tags: Arc<MockTagReader>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_parallelism(1)
    }

    fn with_parallelism(max_parallel: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let converter = Arc::new(MockConverter::new());
        let tags = Arc::new(MockTagReader::new());
        let runner = BatchRunner::new(Arc::clone(&converter), Arc::clone(&tags))
            .with_max_parallel(max_parallel);

        Self {
            runner,
            converter,
            tags,
            temp_dir,
        }
    }

    /// Create `music/<relative>` for each entry and return the `music` dir.
    fn music(&self, files: &[&str]) -> PathBuf {
        let root = self.temp_dir.path().join("music");
        std::fs::create_dir_all(&root).expect("Failed to create music dir");
        fixtures::tree(&root, files).expect("Failed to create source files");
        root
    }

    fn entries_in_temp(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path())
            .expect("Failed to read temp dir")
            .count()
    }
}

fn flac_only() -> Settings {
    Settings {
        input_filter: InputFilter::new(["flac"]),
        ..Default::default()
    }
}

fn read_summary(root: &Path) -> String {
    std::fs::read_to_string(root.join(SUMMARY_FILE_NAME)).expect("summary.txt missing")
}

// =============================================================================
// Discovery and mirroring
// =============================================================================

#[tokio::test]
async fn test_mirrors_tree_and_counts() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac", "sub/b.mp3", "sub/c.flac"]);

    let summary = harness
        .runner
        .run(&[music.clone()], &flac_only(), InputMode::Directories)
        .await
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.errors, 0);
    assert!(!summary.cancelled);

    let root = &summary.output_root;
    let root_name = root.file_name().unwrap().to_string_lossy().to_string();
    assert!(root_name.starts_with("music_converted-"), "{}", root_name);
    assert!(root.join("sub").is_dir());
    assert!(root.join("a.wav").is_file());
    assert!(root.join("sub/c.wav").is_file());
    assert!(!root.join("sub/b.wav").exists());

    // Sources are left alone
    assert!(music.join("a.flac").exists());
    assert!(music.join("sub/b.mp3").exists());

    assert_eq!(summary.report_path, Some(root.join(SUMMARY_FILE_NAME)));
    let report = read_summary(root);
    assert!(report.contains("total: 3, converted: 2, skipped: 1, errors: 0"));
    assert!(report.contains("\t INFO: ignoring file b.mp3"));
    assert!(report.contains("\t* c.flac"));
    assert!(report.contains("\t\t-> c.wav"));
    assert!(report.contains(&format!(
        "INFO: created: {}, path includes 2 target files",
        root.join("sub").display()
    )));
}

#[tokio::test]
async fn test_log_follows_discovery_order() {
    let harness = TestHarness::new();
    let music = harness.music(&["b.flac", "a.flac", "disc2/a.flac"]);

    let summary = harness
        .runner
        .run(&[music], &flac_only(), InputMode::Directories)
        .await
        .unwrap();

    let files: Vec<&str> = summary
        .log
        .iter()
        .filter_map(|l| l.strip_prefix("\t* "))
        .collect();
    assert_eq!(files, vec!["a.flac", "b.flac", "a.flac"]);

    let first_line = &summary.log[0];
    assert!(first_line.starts_with("INFO: created: "));
    assert!(first_line.ends_with("path includes 2 target files"));
}

#[tokio::test]
async fn test_flat_output() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac", "sub/b.flac", "sub/deeper/c.flac"]);

    let settings = Settings {
        mirror_structure: false,
        ..flac_only()
    };
    let summary = harness
        .runner
        .run(&[music], &settings, InputMode::Directories)
        .await
        .unwrap();

    assert_eq!(summary.converted, 3);
    let root = &summary.output_root;
    assert!(!root.join("sub").exists());
    for name in ["a.wav", "b.wav", "c.wav"] {
        assert!(root.join(name).is_file(), "missing {}", name);
    }
}

#[tokio::test]
async fn test_files_mode() {
    let harness = TestHarness::new();
    let music = harness.music(&["x/first.flac", "y/second.flac", "y/notes.txt"]);

    let inputs = vec![
        music.join("x/first.flac"),
        music.join("y/second.flac"),
        music.join("y/notes.txt"),
    ];
    let summary = harness
        .runner
        .run(&inputs, &flac_only(), InputMode::Files)
        .await
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.skipped, 1);

    let root = &summary.output_root;
    assert_eq!(root.parent().unwrap(), music.join("x").canonicalize().unwrap());
    let root_name = root.file_name().unwrap().to_string_lossy().to_string();
    assert!(root_name.starts_with("first_converted-"));
    assert!(root.join("first.wav").is_file());
    assert!(root.join("second.wav").is_file());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_failure_keeps_source_and_run_continues() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac", "b.flac", "c.flac"]);
    harness.converter.fail_on("b.flac").await;

    let settings = Settings {
        remove_source_after_conversion: true,
        ..flac_only()
    };
    let summary = harness
        .runner
        .run(&[music.clone()], &settings, InputMode::Directories)
        .await
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.errors, 1);
    assert!(summary.has_errors());

    assert!(music.join("b.flac").exists());
    assert!(!music.join("a.flac").exists());
    assert!(!music.join("c.flac").exists());

    assert!(summary
        .log
        .iter()
        .any(|l| l.starts_with("ERROR: Error while saving file b: ")));
    assert_eq!(harness.converter.conversion_count().await, 3);
}

#[tokio::test]
async fn test_failed_source_removal_keeps_converted_outcome() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac", "b.flac"]);
    // The source is gone by the time the runner tries to remove it
    harness.converter.set_consume_sources(true).await;

    let settings = Settings {
        remove_source_after_conversion: true,
        ..flac_only()
    };
    let summary = harness
        .runner
        .run(&[music], &settings, InputMode::Directories)
        .await
        .unwrap();

    assert_eq!(summary.converted, 2);
    assert_eq!(summary.errors, 0);
    assert!(!summary.has_errors());

    let warnings: Vec<&String> = summary
        .log
        .iter()
        .filter(|l| l.starts_with("\t WARNING: could not remove source "))
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].starts_with("\t WARNING: could not remove source a.flac: "));

    // The warning follows the file's own lines
    let a = summary.log.iter().position(|l| l == "\t* a.flac").unwrap();
    assert!(summary.log[a + 2].starts_with("\t WARNING: could not remove source a.flac"));
    assert!(read_summary(&summary.output_root).contains("could not remove source b.flac"));
}

#[tokio::test]
async fn test_all_failures_still_write_summary() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac"]);
    harness.converter.fail_on("a.flac").await;

    let summary = harness
        .runner
        .run(&[music], &flac_only(), InputMode::Directories)
        .await
        .unwrap();

    assert_eq!(summary.converted, 0);
    assert_eq!(summary.errors, 1);
    assert!(read_summary(&summary.output_root).contains("errors: 1"));
}

// =============================================================================
// Naming
// =============================================================================

#[tokio::test]
async fn test_names_from_tags_with_collisions() {
    let harness = TestHarness::new();
    let music = harness.music(&["01.flac", "02.flac", "03.flac", "04.flac"]);
    harness
        .tags
        .set_tags("01.flac", &[("artist", "Artist"), ("title", "Song")])
        .await;
    harness
        .tags
        .set_tags("02.flac", &[("artist", "Artist"), ("title", "Song")])
        .await;
    harness
        .tags
        .set_tags("03.flac", &[("artist", "AC/DC"), ("title", "Why?")])
        .await;
    // Only a title: falls back to the source stem
    harness.tags.set_tags("04.flac", &[("title", "Lonely")]).await;

    let summary = harness
        .runner
        .run(&[music], &flac_only(), InputMode::Directories)
        .await
        .unwrap();

    let root = &summary.output_root;
    assert!(root.join("Artist - Song.wav").is_file());
    assert!(root.join("Artist - Song (2).wav").is_file());
    assert!(root.join("ACXDC - WhyX.wav").is_file());
    assert!(root.join("04.wav").is_file());
    assert_eq!(harness.tags.reads().await.len(), 4);
}

#[tokio::test]
async fn test_rename_disabled_skips_tag_reads() {
    let harness = TestHarness::new();
    let music = harness.music(&["01 intro.flac"]);
    harness
        .tags
        .set_tags("01 intro.flac", &[("artist", "A"), ("title", "B")])
        .await;

    let mut settings = flac_only();
    settings.naming.rename_from_metadata = false;
    settings.output_format = OutputFormat::Aiff;

    let summary = harness
        .runner
        .run(&[music], &settings, InputMode::Directories)
        .await
        .unwrap();

    assert!(summary.output_root.join("01 intro.aiff").is_file());
    assert!(harness.tags.reads().await.is_empty());
}

#[tokio::test]
async fn test_cover_art_only_for_aiff() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac", "cover.jpg"]);

    let mut settings = flac_only();
    settings.embed_cover_art = true;
    settings.output_format = OutputFormat::Aiff;
    harness
        .runner
        .run(&[music.clone()], &settings, InputMode::Directories)
        .await
        .unwrap();

    settings.output_format = OutputFormat::Wav;
    harness
        .runner
        .run(&[music], &settings, InputMode::Directories)
        .await
        .unwrap();

    let jobs = harness.converter.recorded_conversions().await;
    assert_eq!(jobs.len(), 2);
    let cover = jobs[0].job.cover_art_path.as_ref().unwrap();
    assert!(cover.ends_with("cover.jpg"));
    assert!(jobs[1].job.cover_art_path.is_none());
}

// =============================================================================
// Runs
// =============================================================================

#[tokio::test]
async fn test_two_runs_use_distinct_roots() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac"]);

    let first = harness
        .runner
        .run(&[music.clone()], &flac_only(), InputMode::Directories)
        .await
        .unwrap();
    let second = harness
        .runner
        .run(&[music], &flac_only(), InputMode::Directories)
        .await
        .unwrap();

    assert_ne!(first.output_root, second.output_root);
    assert!(first.output_root.join("a.wav").is_file());
    assert!(second.output_root.join("a.wav").is_file());
}

#[tokio::test]
async fn test_preflight_errors_leave_no_trace() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac"]);
    let before = harness.entries_in_temp();

    let result = harness
        .runner
        .run(&[], &flac_only(), InputMode::Directories)
        .await;
    assert!(matches!(result, Err(RunError::NoInputs)));

    let missing = harness.temp_dir.path().join("nope");
    let result = harness
        .runner
        .run(&[missing], &flac_only(), InputMode::Directories)
        .await;
    assert!(matches!(result, Err(RunError::InputNotFound { .. })));

    let settings = Settings {
        input_filter: InputFilter::new(Vec::<String>::new()),
        ..Default::default()
    };
    let result = harness
        .runner
        .run(&[music.clone()], &settings, InputMode::Directories)
        .await;
    assert!(matches!(
        result,
        Err(RunError::Config(ConfigError::ValidationError(_)))
    ));

    let mut settings = flac_only();
    settings.naming.template = Some("$ARTIST $NOPE".to_string());
    let result = harness
        .runner
        .run(&[music], &settings, InputMode::Directories)
        .await;
    assert!(matches!(result, Err(RunError::Config(_))));

    assert_eq!(harness.entries_in_temp(), before);
    assert_eq!(harness.converter.conversion_count().await, 0);
}

#[tokio::test]
async fn test_cancel_skips_remaining_files() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac", "b.flac", "c.flac"]);
    harness
        .converter
        .cancel_after(1, harness.runner.cancel_handle())
        .await;

    let summary = harness
        .runner
        .run(&[music], &flac_only(), InputMode::Directories)
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.converted, 1);
    assert_eq!(summary.skipped, 2);
    assert!(summary
        .log
        .contains(&"\t INFO: run cancelled, not converting b.flac".to_string()));
    assert!(read_summary(&summary.output_root).contains(" CANCELLED"));
    assert_eq!(harness.converter.conversion_count().await, 1);
}

#[tokio::test]
async fn test_runner_is_reusable_after_cancel() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac", "b.flac"]);
    harness
        .converter
        .cancel_after(1, harness.runner.cancel_handle())
        .await;

    let first = harness
        .runner
        .run(&[music.clone()], &flac_only(), InputMode::Directories)
        .await
        .unwrap();
    assert!(first.cancelled);
    assert_eq!(first.converted, 1);

    // Keep the mock from cancelling again; its count is already past 1
    harness
        .converter
        .cancel_after(usize::MAX, harness.runner.cancel_handle())
        .await;

    let second = harness
        .runner
        .run(&[music], &flac_only(), InputMode::Directories)
        .await
        .unwrap();
    assert!(!second.cancelled);
    assert_eq!(second.converted, 2);
    assert_eq!(second.skipped, 0);
    assert_ne!(first.output_root, second.output_root);
}

#[tokio::test]
async fn test_parallel_run_keeps_order_and_counts() {
    let harness = TestHarness::with_parallelism(3);
    let music = harness.music(&["1.flac", "2.flac", "3.flac", "4.flac", "5.flac", "6.txt"]);
    harness
        .converter
        .set_conversion_duration(Duration::from_millis(20))
        .await;
    harness.converter.fail_on("4.flac").await;

    let summary = harness
        .runner
        .run(&[music], &flac_only(), InputMode::Directories)
        .await
        .unwrap();

    assert_eq!(summary.total, 6);
    assert_eq!(summary.converted, 4);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.skipped, 1);

    let files: Vec<&str> = summary
        .log
        .iter()
        .filter_map(|l| l.strip_prefix("\t* "))
        .collect();
    assert_eq!(files, vec!["1.flac", "2.flac", "3.flac", "4.flac", "5.flac"]);
}

#[tokio::test]
async fn test_summary_serializes_to_json() {
    let harness = TestHarness::new();
    let music = harness.music(&["a.flac"]);

    let summary = harness
        .runner
        .run(&[music], &flac_only(), InputMode::Directories)
        .await
        .unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["converted"], 1);
    assert!(json["log"].as_array().unwrap().len() >= 2);
}
