use revsweep_engine::{
    ArchiveFormat, LegacySizing, SweepConfig, SweepOutcome, Sweeper, VersionPattern,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STAMP: &str = "20240101010101";

fn write(root: &Path, rel: &str, len: usize) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![b'x'; len]).unwrap();
}

/// Relative path to file content for every file under `root`.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

fn project(temp: &TempDir) -> PathBuf {
    let root = temp.path().join("project");
    for v in 1..=4 {
        write(&root, &format!("shots/e1/scene_v00{v}.blend"), 100 * v);
        write(&root, &format!("shots/e1/scene_v00{v}.blend1"), 10);
    }
    write(&root, "shots/e2/anim_v001.blend", 50);
    write(&root, "shots/e2/anim_v002.blend", 60);
    write(&root, "shots/e2/anim_vAA.blend", 70);
    for name in ["a", "b", "c"] {
        write(&root, &format!("shots/e3_old/{name}.blend"), 1000);
    }
    write(&root, "notes/readme.txt", 5);
    root
}

fn config(root: &Path) -> SweepConfig {
    SweepConfig::builder()
        .root(root)
        .keep(2usize)
        .legacy(true)
        .build()
        .unwrap()
}

#[test]
fn test_dry_run_matches_real_run_and_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let root = project(&temp);
    let before = snapshot(&root);

    let mut dry = config(&root);
    dry.dry_run = true;
    let projected = Sweeper::new(dry)
        .run_with(|_| panic!("dry runs never ask"))
        .unwrap();
    assert_eq!(snapshot(&root), before);

    let applied = Sweeper::new(config(&root)).run().unwrap();

    let projected = projected.execution().unwrap();
    let applied = applied.execution().unwrap();
    assert!(projected.dry_run);
    assert!(!applied.dry_run);
    assert_eq!(projected.files_removed, applied.files_removed);
    assert_eq!(projected.dirs_removed, applied.dirs_removed);
    assert_eq!(projected.bytes_freed, applied.bytes_freed);
}

#[test]
fn test_delete_mode_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let root = project(&temp);

    let first = Sweeper::new(config(&root)).run().unwrap();
    let execution = first.execution().unwrap();
    // two .blend and two .blend1 in e1, e2 skipped, one legacy directory
    assert_eq!(execution.files_removed, 4);
    assert_eq!(execution.dirs_removed, 1);
    assert_eq!(execution.bytes_freed, 100 + 200 + 10 + 10 + 3000);

    let second = Sweeper::new(config(&root)).plan().unwrap();
    assert!(second.is_empty());
    // the ambiguous group is still reported
    assert_eq!(second.skipped.len(), 1);
}

#[test]
fn test_ambiguous_group_is_untouched() {
    let temp = TempDir::new().unwrap();
    let root = project(&temp);

    let report = Sweeper::new(config(&root)).run().unwrap();
    assert_eq!(report.plan.skipped.len(), 1);
    assert_eq!(report.plan.skipped[0].extension, ".blend");
    for name in ["anim_v001.blend", "anim_v002.blend", "anim_vAA.blend"] {
        assert!(root.join("shots/e2").join(name).exists());
    }
}

#[test]
fn test_archive_preserves_structure() {
    let temp = TempDir::new().unwrap();
    let root = project(&temp);
    let before = snapshot(&root);
    let archive_root = temp.path().join("archive");

    let mut config = config(&root);
    config.archive_root = Some(archive_root.clone());
    config.compress = false;

    let report = Sweeper::new(config).with_archive_stamp(STAMP).run().unwrap();
    let execution = report.execution().unwrap();

    let folder = archive_root.join(format!("archivedfiles_{STAMP}"));
    assert_eq!(execution.archive.as_ref().unwrap().folder, folder);

    let archived = snapshot(&folder);
    assert_eq!(archived.len(), 7);
    for (rel, content) in &archived {
        assert_eq!(before.get(rel), Some(content), "{}", rel.display());
        assert!(!root.join(rel).exists());
    }
    assert!(archived.contains_key(Path::new("shots/e3_old/a.blend")));
    assert!(archived.contains_key(Path::new("shots/e1/scene_v001.blend")));
}

#[test]
fn test_compressed_archive() {
    let temp = TempDir::new().unwrap();
    let root = project(&temp);
    let archive_root = temp.path().join("archive");

    let mut config = config(&root);
    config.archive_root = Some(archive_root.clone());
    config.archive_format = ArchiveFormat::TarGz;

    let report = Sweeper::new(config).with_archive_stamp(STAMP).run().unwrap();
    let archive = report.execution().unwrap().archive.clone().unwrap();

    let container = archive_root.join(format!("archivedfiles_{STAMP}.tar.gz"));
    assert_eq!(archive.container, Some(container.clone()));
    assert!(container.is_file());
    assert!(!archive.folder.exists());
}

#[test]
fn test_legacy_independent_of_keep() {
    for keep in [0usize, 1, 5, 100] {
        let temp = TempDir::new().unwrap();
        let root = project(&temp);

        let mut config = config(&root);
        config.keep = keep;
        let plan = Sweeper::new(config).plan().unwrap();

        let dirs: Vec<&Path> = plan.directories.iter().map(|d| d.path.as_path()).collect();
        assert_eq!(dirs, vec![plan.root.join("shots/e3_old").as_path()]);
        assert_eq!(plan.dir_bytes(), 3000);
    }
}

#[test]
fn test_retention_independent_of_legacy_mode() {
    let temp = TempDir::new().unwrap();
    let root = project(&temp);

    let with_legacy = Sweeper::new(config(&root)).plan().unwrap();
    let mut off = config(&root);
    off.legacy = false;
    let without_legacy = Sweeper::new(off).plan().unwrap();

    // With legacy mode off the legacy files are ordinary but unversioned
    // names, so they land in a skipped group rather than the old set.
    assert_eq!(with_legacy.files, without_legacy.files);
    assert!(without_legacy.directories.is_empty());
    assert_eq!(without_legacy.skipped.len(), 2);
}

#[test]
fn test_deep_size_counts_nested_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("project");
    write(&root, "e1_old/a.blend", 100);
    write(&root, "e1_old/nested/b.blend", 25);

    let mut shallow = config(&root);
    shallow.legacy_sizing = LegacySizing::Shallow;
    let mut deep = shallow.clone();
    deep.legacy_sizing = LegacySizing::Recursive;

    assert_eq!(Sweeper::new(shallow).plan().unwrap().dir_bytes(), 100);
    assert_eq!(Sweeper::new(deep).plan().unwrap().dir_bytes(), 125);
}

#[test]
fn test_custom_extensions_and_pattern() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("project");
    for v in 1..=3 {
        write(&root, &format!("cache/sim.r{v}.vdb"), 1);
    }
    write(&root, "cache/scene_v001.blend", 1);

    let mut config = config(&root);
    config.extensions = vec![".vdb".to_string()];
    config.version_pattern = VersionPattern::new(r"\.r(\d+)$").unwrap();
    config.keep = 1;

    let report = Sweeper::new(config).run().unwrap();
    assert_eq!(report.execution().unwrap().files_removed, 2);
    assert!(root.join("cache/sim.r3.vdb").exists());
    assert!(root.join("cache/scene_v001.blend").exists());
}

#[test]
fn test_nothing_to_do_report_serializes() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("project");
    write(&root, "shots/e1/scene_v001.blend", 1);

    let report = Sweeper::new(config(&root)).run().unwrap();
    assert!(matches!(report.outcome, SweepOutcome::NothingToDo));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"]["status"], "nothing_to_do");
    assert_eq!(json["plan"]["files"].as_array().unwrap().len(), 0);
}

#[test]
fn test_legacy_named_root_is_still_swept() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("shots_old");
    for v in 1..=3 {
        write(&root, &format!("e1/scene_v00{v}.blend"), 1);
    }

    let mut config = config(&root);
    config.keep = 1;
    let report = Sweeper::new(config).run().unwrap();

    assert_eq!(report.plan.file_count(), 2);
    assert!(report.plan.directories.is_empty());
    assert_eq!(report.execution().unwrap().files_removed, 2);
    assert!(root.join("e1/scene_v003.blend").exists());
}

#[test]
fn test_repeated_extension_selects_each_file_once() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("project");
    for v in 1..=3 {
        write(&root, &format!("e1/scene_v00{v}.blend"), 1);
    }

    let mut config = config(&root);
    config.keep = 1;
    config.extensions = vec![".blend".to_string(), ".blend".to_string()];

    let report = Sweeper::new(config).run().unwrap();
    assert_eq!(report.plan.file_count(), 2);
    assert_eq!(report.execution().unwrap().files_removed, 2);
    assert!(root.join("e1/scene_v003.blend").exists());
}
