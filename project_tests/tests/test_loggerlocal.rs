use lib_common::loggers::loggerlocal::{LoggerLocal, LoggerLocalOptions};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn test_loggerlocal_file_logging() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let log_dir_path = temp_dir.path().to_path_buf();

    let options = LoggerLocalOptions {
        use_tty: None, // Disable TTY output for testing
        use_file: Some(vec![6, 5, 4, 3, 2, 1, 0]),
        log_dir: Some(log_dir_path.clone()),
    };

    let app_name = "test_app".to_string();
    let logger = LoggerLocal::new(app_name.clone(), Some(options));

    logger.info("This is an info message", None).await;
    logger.warn("This is a warning message", Some(serde_json::json!({"code": 101}))).await;
    logger.error("This is an error message", None).await;
    logger.debug("This is a debug message", None).await;

    let log_files: Vec<_> = fs::read_dir(&log_dir_path)
        .expect("Failed to read log directory")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();

    assert_eq!(log_files.len(), 1, "expected exactly one log file");
    let log_file_path = &log_files[0];
    assert_eq!(Some(log_file_path.as_path()), logger.current_log_file());

    let contents = fs::read_to_string(log_file_path).expect("Failed to read log file contents");

    assert!(contents.contains("[INFO] "));
    assert!(contents.contains("This is an info message"));
    assert!(contents.contains("[WARN] "));
    assert!(contents.contains(r#""code":101"#), "Warning extra data not found in log file");
    assert!(contents.contains("This is an error message"));
    assert!(contents.contains("This is a debug message"));
    assert!(contents.contains("[test_app]"));
}

#[tokio::test]
async fn test_loggerlocal_levels_are_filtered() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let logger = LoggerLocal::new(
        "filtered".to_string(),
        Some(LoggerLocalOptions {
            use_tty: None,
            ..LoggerLocalOptions::from_min_level(4, Some(temp_dir.path().to_path_buf()))
        }),
    );

    logger.debug("hidden debug line", None).await;
    logger.warn("visible warning line", None).await;

    let contents = fs::read_to_string(logger.current_log_file().unwrap()).unwrap();
    assert!(contents.contains("visible warning line"));
    assert!(!contents.contains("hidden debug line"));
}

#[tokio::test]
async fn test_loggerlocal_rotation_keeps_newest() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let log_dir_path = temp_dir.path().to_path_buf();

    // Leftovers from earlier runs
    fs::write(log_dir_path.join("rotating-20200101_000000.log"), "old\n").unwrap();
    fs::write(log_dir_path.join("rotating-20210101_000000.log"), "newer\n").unwrap();
    fs::write(log_dir_path.join("other-20200101_000000.log"), "other app\n").unwrap();

    let _logger = LoggerLocal::new(
        "rotating".to_string(),
        Some(LoggerLocalOptions {
            use_tty: None,
            use_file: Some(vec![3]),
            log_dir: Some(log_dir_path.clone()),
        }),
    );

    assert!(!log_dir_path.join("rotating-20200101_000000.log").exists());
    assert!(log_dir_path.join("rotating-20210101_000000.log").exists());
    assert!(log_dir_path.join("other-20200101_000000.log").exists());
}

#[tokio::test]
async fn test_loggerlocal_concurrent_writes() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let logger = Arc::new(LoggerLocal::new(
        "concurrent".to_string(),
        Some(LoggerLocalOptions {
            use_tty: None,
            use_file: Some(vec![3]),
            log_dir: Some(temp_dir.path().to_path_buf()),
        }),
    ));

    let mut handles = Vec::new();
    for i in 0..20 {
        let logger = Arc::clone(&logger);
        handles.push(tokio::spawn(async move {
            logger.info(&format!("line number {}", i), None).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let contents = fs::read_to_string(logger.current_log_file().unwrap()).unwrap();
    assert_eq!(contents.lines().count(), 20);
}

#[tokio::test(flavor = "current_thread")]
async fn test_loggerlocal_file_writes_on_single_thread_runtime() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let logger = Arc::new(LoggerLocal::new(
        "single_thread".to_string(),
        Some(LoggerLocalOptions {
            use_tty: None,
            use_file: Some(vec![3]),
            log_dir: Some(temp_dir.path().to_path_buf()),
        }),
    ));

    let payload = "x".repeat(8 * 1024);
    let mut handles = Vec::new();
    for i in 0..10 {
        let logger = Arc::clone(&logger);
        let message = format!("writer {} {}", i, payload);
        handles.push(tokio::spawn(async move {
            logger.info(&message, None).await;
        }));
    }

    // The runtime thread stays free to run other tasks while lines are appended.
    let ticker = tokio::spawn(async { tokio::task::yield_now().await });
    tokio::time::timeout(std::time::Duration::from_secs(10), ticker)
        .await
        .expect("runtime thread was blocked")
        .unwrap();

    for handle in handles {
        handle.await.unwrap();
    }

    let contents = fs::read_to_string(logger.current_log_file().unwrap()).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 10);
    for line in lines {
        assert!(line.contains("[INFO] "), "malformed line start");
        assert!(line.ends_with(&payload), "line was interleaved or truncated");
    }
}
