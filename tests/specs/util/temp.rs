//! Temp file utility specs

use clinch_util::{cleanup_temp_files, create_temp_file, TempFiles};

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn fixture_reads_a_created_temp_file_dir() {
    let path = create_temp_file("{\"ok\":true}", "json").unwrap();
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
    let dir = path.parent().unwrap().to_path_buf();

    let options = RunOptions::new(["pwd"]).cwd(&dir);
    let result = fixture().run(&options).await.unwrap();
    assert!(result.success());

    let report = cleanup_temp_files([&path]);
    assert!(report.is_clean());
    assert!(!path.exists());
}

#[test]
fn cleanup_continues_past_failures() {
    let a = create_temp_file("a", "txt").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let b = create_temp_file("b", "txt").unwrap();

    // A directory cannot be removed as a file
    let report = cleanup_temp_files([a.clone(), dir.path().to_path_buf(), b.clone()]);

    assert_eq!(report.removed, vec![a.clone(), b.clone()]);
    assert_eq!(report.failed.len(), 1);
    assert!(!a.exists() && !b.exists());
}

#[test]
fn guard_removes_files_on_drop() {
    let path = {
        let mut files = TempFiles::new();
        let path = files.create("x", "log").unwrap();
        assert!(path.exists());
        path
    };
    assert!(!path.exists());
}
