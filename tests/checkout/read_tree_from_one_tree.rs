use crate::common::command::{repository_dir, run_bit_command, snapshot, write_tree};
use crate::common::file::{FileSpec, random_content, read_file, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn deleted_file_is_restored(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let content = random_content();
    let tree = snapshot(dir, &[("a.txt", &content), ("lib/mod.rs", "mod")]);
    std::fs::remove_file(dir.join("lib/mod.rs")).expect("Failed to delete file");

    run_bit_command(dir, &["read-tree", &tree]).assert().success();

    assert_eq!(read_file(&dir.join("lib/mod.rs")), Some("mod".to_string()));
    assert_eq!(read_file(&dir.join("a.txt")), Some(content));
}

#[rstest]
fn index_is_reset_to_the_tree(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("a.txt", "one"), ("old/file.txt", "old")]);
    let second = snapshot(dir, &[("a.txt", "two"), ("new/file.txt", "new")]);

    run_bit_command(dir, &["read-tree", "--force", &first])
        .assert()
        .success();

    assert_eq!(write_tree(dir), first);
    assert_eq!(read_file(&dir.join("a.txt")), Some("one".to_string()));
    assert_eq!(read_file(&dir.join("old/file.txt")), Some("old".to_string()));
    assert!(!dir.join("new").exists());
    assert_ne!(first, second);
}

#[rstest]
fn modified_file_is_rewritten(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let tree = snapshot(dir, &[("a.txt", "one")]);
    write_file(FileSpec::new(dir.join("a.txt"), "scribbled".to_string()));

    run_bit_command(dir, &["read-tree", &tree]).assert().success();

    assert_eq!(read_file(&dir.join("a.txt")), Some("one".to_string()));
}

#[rstest]
fn unknown_tree_is_rejected(repository_dir: TempDir) {
    let dir = repository_dir.path();

    run_bit_command(dir, &["read-tree", "deadbeef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a valid object name deadbeef"));
}
