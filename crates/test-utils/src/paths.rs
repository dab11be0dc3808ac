//! Scratch directories for tests that write outputs.

/// Fresh temporary directory, removed when the returned guard is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("climate_viz_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}
