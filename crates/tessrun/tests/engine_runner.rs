//! End-to-end runs against a stub engine.
//!
//! The stub is a shell script named `tesseract` inside a temp directory that
//! the config points at, so the real spawn / drain / watchdog / cleanup path
//! is exercised without a Tesseract install. The script answers the
//! `--version` probe and then acts out whatever behavior each test needs.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tessrun::{DocumentSink, EngineConfig, EngineError, OcrRunner, SinkError};
use tokio_util::sync::CancellationToken;

/// Write an executable `tesseract` stub into `dir`. The stub handles the
/// `--version` probe itself; `body` sees the real engine arguments
/// (`$1` input, `$2` output base).
fn install_stub(dir: &Path, body: &str) {
    let path = dir.join("tesseract");
    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then\n  echo 'tesseract 5.3.0'\n  exit 0\nfi\n{body}\n"
    );
    std::fs::write(&path, script).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
}

fn runner_for(dir: &TempDir, config: EngineConfig) -> OcrRunner {
    OcrRunner::new(EngineConfig {
        tesseract_path: dir.path().to_string_lossy().into_owned(),
        ..config
    })
    .unwrap()
}

fn write_input(dir: &TempDir, bytes: &[u8]) -> PathBuf {
    let input = dir.path().join("scan.png");
    std::fs::write(&input, bytes).unwrap();
    input
}

#[derive(Debug, Default)]
struct RecordingSink {
    events: Vec<String>,
}

impl DocumentSink for RecordingSink {
    fn begin_region(&mut self) -> Result<(), SinkError> {
        self.events.push("begin".to_string());
        Ok(())
    }

    fn text(&mut self, chunk: &str) -> Result<(), SinkError> {
        self.events.push(format!("text:{chunk}"));
        Ok(())
    }

    fn end_region(&mut self) -> Result<(), SinkError> {
        self.events.push("end".to_string());
        Ok(())
    }
}

#[tokio::test]
async fn extracts_text_written_by_engine() {
    let dir = TempDir::new().unwrap();
    install_stub(dir.path(), "printf 'The quick brown fox' > \"$2.txt\"");
    let runner = runner_for(&dir, EngineConfig::default());
    let input = write_input(&dir, b"fake png bytes");

    let mut sink = RecordingSink::default();
    runner.process_file(&input, &mut sink).await.unwrap();

    assert_eq!(sink.events, ["begin", "text:The quick brown fox", "end"]);
}

#[tokio::test]
async fn nonzero_exit_with_output_still_succeeds() {
    let dir = TempDir::new().unwrap();
    install_stub(dir.path(), "printf 'still readable' > \"$2.txt\"\nexit 3");
    let runner = runner_for(&dir, EngineConfig::default());
    let input = write_input(&dir, b"fake png bytes");

    let mut sink = RecordingSink::default();
    runner.process_file(&input, &mut sink).await.unwrap();

    assert_eq!(sink.events, ["begin", "text:still readable", "end"]);
}

#[tokio::test]
async fn missing_output_file_yields_empty_result() {
    let dir = TempDir::new().unwrap();
    install_stub(dir.path(), "exit 0");
    let runner = runner_for(&dir, EngineConfig::default());
    let input = write_input(&dir, b"fake png bytes");

    let mut sink = RecordingSink::default();
    runner.process_file(&input, &mut sink).await.unwrap();

    assert!(sink.events.is_empty());
}

#[tokio::test]
async fn chatty_engine_does_not_deadlock_pipes() {
    let dir = TempDir::new().unwrap();
    // Well past a typical 64 KiB pipe buffer, on both channels.
    install_stub(
        dir.path(),
        "i=0\nwhile [ $i -lt 3000 ]; do\n  echo 'stdout noise line with some padding to fill the pipe buffer quickly'\n  echo 'stderr noise line with some padding to fill the pipe buffer quickly' >&2\n  i=$((i+1))\ndone\nprintf 'done' > \"$2.txt\"",
    );
    let runner = runner_for(&dir, EngineConfig::default());
    let input = write_input(&dir, b"fake png bytes");

    let mut sink = RecordingSink::default();
    runner.process_file(&input, &mut sink).await.unwrap();

    assert_eq!(sink.events, ["begin", "text:done", "end"]);
}

#[tokio::test]
async fn timeout_kills_engine_and_cleans_scratch() {
    let dir = TempDir::new().unwrap();
    // Record the output base, then stall well past the timeout. The marker
    // only appears if the process survives the kill.
    install_stub(
        dir.path(),
        "printf '%s' \"$2\" > \"$1.base\"\nsleep 3\nprintf 'late' > \"$2.txt\"\ntouch \"$1.done\"",
    );
    let runner = runner_for(
        &dir,
        EngineConfig {
            timeout_secs: 1,
            ..Default::default()
        },
    );
    let input = write_input(&dir, b"fake png bytes");

    let mut sink = RecordingSink::default();
    let started = Instant::now();
    let result = runner.process_file(&input, &mut sink).await;

    assert!(matches!(result, Err(EngineError::Timeout { seconds: 1 })));
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(sink.events.is_empty());

    // Scratch files are gone even on the error path.
    let base = PathBuf::from(std::fs::read_to_string(input.with_extension("png.base")).unwrap());
    assert!(!base.exists());
    assert!(!Path::new(&format!("{}.txt", base.display())).exists());

    // Past the stub's own finish line: had it survived, the marker would exist.
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!input.with_extension("png.done").exists());
}

#[tokio::test]
async fn cancellation_terminates_engine() {
    let dir = TempDir::new().unwrap();
    install_stub(dir.path(), "sleep 5\ntouch \"$1.done\"");
    let runner = runner_for(
        &dir,
        EngineConfig {
            timeout_secs: 60,
            ..Default::default()
        },
    );
    let input = write_input(&dir, b"fake png bytes");

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let mut sink = RecordingSink::default();
    let started = Instant::now();
    let result = runner
        .process_file_with_cancel(&input, &mut sink, &cancel)
        .await;

    assert!(matches!(result, Err(EngineError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(cancel.is_cancelled());
    assert!(sink.events.is_empty());
}

#[tokio::test]
async fn out_of_bounds_input_never_spawns_engine() {
    let dir = TempDir::new().unwrap();
    install_stub(dir.path(), "touch \"$1.spawned\"\nprintf 'text' > \"$2.txt\"");
    let input = write_input(&dir, &[0u8; 500]);

    // 500 bytes > max of 100: skipped.
    let runner = runner_for(
        &dir,
        EngineConfig {
            max_file_size: 100,
            ..Default::default()
        },
    );
    let mut sink = RecordingSink::default();
    runner.process_file(&input, &mut sink).await.unwrap();
    assert!(sink.events.is_empty());
    assert!(!input.with_extension("png.spawned").exists());

    // 500 bytes < min of 1000: also skipped.
    let runner = runner_for(
        &dir,
        EngineConfig {
            min_file_size: 1000,
            ..Default::default()
        },
    );
    let mut sink = RecordingSink::default();
    runner.process_file(&input, &mut sink).await.unwrap();
    assert!(sink.events.is_empty());
    assert!(!input.with_extension("png.spawned").exists());
}

#[tokio::test]
async fn scratch_files_removed_after_successful_run() {
    let dir = TempDir::new().unwrap();
    install_stub(
        dir.path(),
        "printf '%s' \"$2\" > \"$1.base\"\nprintf 'hello' > \"$2.txt\"",
    );
    let runner = runner_for(&dir, EngineConfig::default());
    let input = write_input(&dir, b"fake png bytes");

    let mut sink = RecordingSink::default();
    runner.process_file(&input, &mut sink).await.unwrap();
    assert_eq!(sink.events, ["begin", "text:hello", "end"]);

    let base = PathBuf::from(std::fs::read_to_string(input.with_extension("png.base")).unwrap());
    assert!(!base.exists());
    assert!(!Path::new(&format!("{}.txt", base.display())).exists());
}

#[tokio::test]
async fn probe_tolerates_nonzero_version_exit() {
    let dir = TempDir::new().unwrap();
    // An engine whose --version exits non-zero is still invocable.
    let path = dir.path().join("tesseract");
    std::fs::write(
        &path,
        "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then\n  exit 1\nfi\nprintf 'grumpy but working' > \"$2.txt\"\n",
    )
    .unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();

    let runner = runner_for(&dir, EngineConfig::default());
    assert!(tessrun::engine_available(runner.config()).await);

    let input = write_input(&dir, b"fake png bytes");
    let mut sink = RecordingSink::default();
    runner.process_file(&input, &mut sink).await.unwrap();
    assert_eq!(sink.events, ["begin", "text:grumpy but working", "end"]);
}

#[tokio::test]
async fn sink_rejection_surfaces_after_cleanup() {
    struct FullSink;

    impl DocumentSink for FullSink {
        fn begin_region(&mut self) -> Result<(), SinkError> {
            Ok(())
        }

        fn text(&mut self, _chunk: &str) -> Result<(), SinkError> {
            Err(SinkError::new("downstream closed"))
        }

        fn end_region(&mut self) -> Result<(), SinkError> {
            Ok(())
        }
    }

    let dir = TempDir::new().unwrap();
    install_stub(
        dir.path(),
        "printf '%s' \"$2\" > \"$1.base\"\nprintf 'rejected text' > \"$2.txt\"",
    );
    let runner = runner_for(&dir, EngineConfig::default());
    let input = write_input(&dir, b"fake png bytes");

    let result = runner.process_file(&input, &mut FullSink).await;
    assert!(matches!(result, Err(EngineError::Sink { .. })));

    // Cleanup still ran: the engine's output file did not leak.
    let base = PathBuf::from(std::fs::read_to_string(input.with_extension("png.base")).unwrap());
    assert!(!base.exists());
    assert!(!Path::new(&format!("{}.txt", base.display())).exists());
}

#[tokio::test]
async fn recognizes_in_memory_image_end_to_end() {
    let dir = TempDir::new().unwrap();
    // The normalized input must be a readable file when the engine runs.
    install_stub(
        dir.path(),
        "[ -s \"$1\" ] || exit 9\nprintf 'from image' > \"$2.txt\"",
    );
    let runner = runner_for(&dir, EngineConfig::default());

    let image = image::DynamicImage::ImageRgb8(image::RgbImage::new(8, 8));
    let mut sink = RecordingSink::default();
    runner.process_image(&image, &mut sink).await.unwrap();

    assert_eq!(sink.events, ["begin", "text:from image", "end"]);
}

#[tokio::test]
async fn concurrent_runs_share_nothing_but_config() {
    let dir = TempDir::new().unwrap();
    install_stub(dir.path(), "printf 'run %s' \"$(basename \"$1\")\" > \"$2.txt\"");
    let runner = runner_for(&dir, EngineConfig::default());

    let mut handles = Vec::new();
    for i in 0..4 {
        let runner = runner.clone();
        let input = dir.path().join(format!("scan-{i}.png"));
        std::fs::write(&input, b"fake png bytes").unwrap();
        handles.push(tokio::spawn(async move {
            let mut sink = tessrun::StringSink::new();
            runner.process_file(&input, &mut sink).await.unwrap();
            (i, sink.into_string())
        }));
    }

    for handle in handles {
        let (i, text) = handle.await.unwrap();
        assert_eq!(text, format!("run scan-{i}.png"));
    }
}
