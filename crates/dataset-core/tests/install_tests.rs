//! End-to-end install tests on a real filesystem

use dataset_core::{
    DatasetManager, Error, InstallAction, InstallLayout, InstallProfile, Manifest, SourceSelection,
};
use dataset_fs::{LocalStorage, NormalizedPath, RobustnessConfig};
use dataset_test_utils::TestTree;
use pretty_assertions::assert_eq;

fn storage() -> LocalStorage {
    LocalStorage::with_robustness(RobustnessConfig::none())
}

fn archive_tree() -> TestTree {
    let tree = TestTree::new();
    tree.write_zip(
        "source/archive.zip",
        &[
            ("flights/", ""),
            ("flights/2024.csv", "origin,dest\nSEA,SFO\n"),
            ("README.md", "# datasets\n"),
        ],
    );
    tree
}

fn archive_profile(tree: &TestTree) -> InstallProfile {
    InstallProfile {
        data_source_uri: format!("file://{}", tree.path_str("source")),
        datasets_path: Some(tree.path_str("datasets")),
        archives_path: Some(tree.path_str("archives")),
        ..Default::default()
    }
}

#[test]
fn test_fresh_archive_install_unpacks() {
    let tree = archive_tree();
    let mut manager =
        DatasetManager::from_profile(storage(), &archive_profile(&tree), SourceSelection::Primary)
            .unwrap();

    let summary = manager.install(false).unwrap();

    assert_eq!(summary.action, InstallAction::Fresh);
    assert_eq!(summary.fixes, 0);
    assert!(summary.unpacked);
    assert_eq!(manager.layout(), InstallLayout::Archive);
    assert_eq!(tree.listing("archives"), vec!["/archive.zip"]);
    assert_eq!(
        tree.listing("datasets"),
        vec!["/README.md", "/flights/", "/flights/2024.csv"]
    );
    tree.assert_file_contains("datasets/flights/2024.csv", "SEA,SFO");
}

#[test]
fn test_second_install_skips_transfer_and_unpack() {
    let tree = archive_tree();
    let profile = archive_profile(&tree);
    let mut manager =
        DatasetManager::from_profile(storage(), &profile, SourceSelection::Primary).unwrap();
    manager.install(false).unwrap();

    let summary = manager.install(false).unwrap();

    assert_eq!(summary.action, InstallAction::Skip);
    assert_eq!(summary.fixes, 0);
    assert!(!summary.unpacked);
}

#[test]
fn test_reinstall_repopulates_datasets() {
    let tree = archive_tree();
    let mut manager =
        DatasetManager::from_profile(storage(), &archive_profile(&tree), SourceSelection::Primary)
            .unwrap();
    manager.install(false).unwrap();
    tree.write_file("datasets/scratch.txt", "left over");

    let summary = manager.install(true).unwrap();

    assert_eq!(summary.action, InstallAction::Reinstall);
    assert!(summary.unpacked);
    tree.assert_file_not_exists("datasets/scratch.txt");
    tree.assert_file_exists("datasets/flights/2024.csv");
}

#[test]
fn test_strict_validation_reports_drift() {
    let tree = archive_tree();
    let mut manager =
        DatasetManager::from_profile(storage(), &archive_profile(&tree), SourceSelection::Primary)
            .unwrap();
    manager.install(false).unwrap();
    tree.write_file("archives/tampered.bin", "x");

    let err = manager.validate(true).unwrap_err();

    assert!(matches!(err, Error::UnexpectedDrift { fixes: 1 }));
    tree.assert_file_not_exists("archives/tampered.bin");
}

#[test]
fn test_classic_install_restores_missing_and_removes_extra() {
    let tree = TestTree::new();
    tree.write_file("source/data.csv", "a\n");
    tree.write_file("source/sub/a.csv", "b\n");
    tree.write_file("source/archive.zip", "not really a zip");
    tree.write_file("installed/data.csv", "a\n");
    tree.write_file("installed/archive.zip", "not really a zip");
    tree.write_file("installed/old/x.csv", "stale\n");

    let manifest = Manifest::new(["/archive.zip", "/data.csv", "/sub/", "/sub/a.csv"]).unwrap();
    let mut manager = DatasetManager::new(
        storage(),
        format!("file://{}", tree.path_str("source")),
        NormalizedPath::new(tree.path("installed")),
        manifest,
    );

    let summary = manager.install(false).unwrap();

    assert_eq!(summary.action, InstallAction::Skip);
    assert_eq!(summary.fixes, 2);
    assert_eq!(
        summary.repaired_paths,
        vec!["/old/".to_string(), "/sub/".to_string()]
    );
    assert_eq!(
        tree.listing("installed"),
        vec!["/archive.zip", "/data.csv", "/sub/", "/sub/a.csv"]
    );
}

#[test]
fn test_profile_loaded_from_toml() {
    let tree = archive_tree();
    tree.write_file(
        "datasets.toml",
        &format!(
            "data_source_uri = \"file://{}\"\ndatasets_path = \"{}\"\narchives_path = \"{}\"\ninstall_min_time = \"1 min\"\ninstall_max_time = \"5 min\"\n",
            tree.path_str("source"),
            tree.path_str("datasets"),
            tree.path_str("archives"),
        ),
    );

    let profile = InstallProfile::load(&NormalizedPath::new(tree.path("datasets.toml"))).unwrap();
    let mut manager =
        DatasetManager::from_profile(storage(), &profile, SourceSelection::Primary).unwrap();

    assert_eq!(profile.install_window(), Some(("1 min", "5 min")));
    assert!(manager.install(false).unwrap().unpacked);
}

#[test]
fn test_missing_source_fails_transfer() {
    let tree = TestTree::new();
    let mut manager =
        DatasetManager::from_profile(storage(), &archive_profile(&tree), SourceSelection::Primary)
            .unwrap();

    let err = manager.install(false).unwrap_err();

    assert!(matches!(
        err,
        Error::Fs(dataset_fs::Error::Transfer { .. })
    ));
}
