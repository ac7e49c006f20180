use dataset_fs::io::{self, InstallLock};
use dataset_fs::{Error, NormalizedPath, RobustnessConfig};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

#[test]
fn test_copy_file_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.txt");
    let dest = temp.path().join("dest.txt");
    fs::write(&src, "updated").unwrap();
    fs::write(&dest, "original").unwrap();

    io::copy_file_atomic(&src, &NormalizedPath::new(&dest)).unwrap();

    assert_eq!(fs::read_to_string(&dest).unwrap(), "updated");
}

#[test]
fn test_copy_file_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.txt");
    fs::write(&src, "content").unwrap();

    io::copy_file_atomic(&src, &NormalizedPath::new(temp.path().join("out.txt"))).unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "found temp files: {leftovers:?}");
}

#[test]
fn test_copy_file_atomic_missing_source_cleans_up() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out.txt");

    let result = io::copy_file_atomic(&temp.path().join("missing"), &NormalizedPath::new(&dest));

    assert!(result.is_err());
    assert!(!dest.exists());
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_with_retry_retries_transient_errors() {
    let attempts = AtomicUsize::new(0);
    let result = io::with_retry(RobustnessConfig::default(), || {
        if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(std::io::Error::from(std::io::ErrorKind::Interrupted))
        } else {
            Ok(42)
        }
    });

    assert_eq!(result.unwrap(), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[test]
fn test_with_retry_fails_fast_on_permanent_errors() {
    let attempts = AtomicUsize::new(0);
    let result: std::io::Result<()> = io::with_retry(RobustnessConfig::default(), || {
        attempts.fetch_add(1, Ordering::SeqCst);
        Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
    });

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_with_retry_none_runs_once() {
    let attempts = AtomicUsize::new(0);
    let result: std::io::Result<()> = io::with_retry(RobustnessConfig::none(), || {
        attempts.fetch_add(1, Ordering::SeqCst);
        Err(std::io::Error::from(std::io::ErrorKind::Interrupted))
    });

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_read_text_nonexistent_file() {
    let path = NormalizedPath::new("/nonexistent/profile.toml");
    let result = io::read_text(&path);
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn test_install_lock_is_exclusive() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("archives.lock"));

    let first = InstallLock::acquire(&path).unwrap();
    let second = InstallLock::acquire(&path);
    assert!(matches!(second, Err(Error::LockFailed { .. })));

    drop(first);
    assert!(InstallLock::acquire(&path).is_ok());
}
