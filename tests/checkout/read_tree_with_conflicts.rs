use crate::common::command::{
    check_out, read_index, repository_dir, run_bit_command, snapshot,
};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

/// A repository at `first` with an unstaged edit to a file `second` changes
#[fixture]
fn edited_repository(repository_dir: TempDir) -> (TempDir, String, String) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("a.txt", "one"), ("b.txt", "bee")]);
    let second = snapshot(dir, &[("a.txt", "two"), ("b.txt", "bee")]);
    check_out(dir, &first);
    write_file(FileSpec::new(dir.join("a.txt"), "local edit".to_string()));

    (repository_dir, first, second)
}

#[rstest]
fn conflicting_checkout_aborts_without_writing(edited_repository: (TempDir, String, String)) {
    let (repository_dir, first, second) = edited_repository;
    let dir = repository_dir.path();
    let index_before = read_index(dir);

    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Your local changes to the following files would be overwritten by checkout:",
        ))
        .stderr(predicate::str::contains("\ta.txt"))
        .stderr(predicate::str::contains("Aborting"));

    let index_after = read_index(dir);
    crate::assert_index_eq!(&index_before, &index_after);
    assert_eq!(read_file(&dir.join("a.txt")), Some("local edit".to_string()));
}

#[rstest]
fn forced_checkout_discards_local_changes(edited_repository: (TempDir, String, String)) {
    let (repository_dir, first, second) = edited_repository;
    let dir = repository_dir.path();

    run_bit_command(dir, &["read-tree", "--force", &first, &second])
        .assert()
        .success();

    assert_eq!(read_file(&dir.join("a.txt")), Some("two".to_string()));
    assert_eq!(crate::common::command::write_tree(dir), second);
}

#[rstest]
fn untracked_file_in_the_way_is_reported(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("a.txt", "one")]);
    let second = snapshot(dir, &[("a.txt", "one"), ("new.txt", "tracked")]);
    check_out(dir, &first);
    write_file(FileSpec::new(dir.join("new.txt"), "untracked".to_string()));

    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "The following untracked working tree files would be overwritten by checkout:",
        ))
        .stderr(predicate::str::contains("\tnew.txt"));
    assert_eq!(read_file(&dir.join("new.txt")), Some("untracked".to_string()));

    run_bit_command(dir, &["read-tree", "--force", &first, &second])
        .assert()
        .success();
    assert_eq!(read_file(&dir.join("new.txt")), Some("tracked".to_string()));
}

#[rstest]
fn untracked_file_blocking_a_directory_is_reported(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("a.txt", "one")]);
    let second = snapshot(dir, &[("a.txt", "one"), ("lib/mod.rs", "mod")]);
    check_out(dir, &first);
    write_file(FileSpec::new(dir.join("lib"), "in the way".to_string()));

    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\tlib"));
    assert_eq!(read_file(&dir.join("lib")), Some("in the way".to_string()));

    run_bit_command(dir, &["read-tree", "--force", &first, &second])
        .assert()
        .success();
    assert_eq!(read_file(&dir.join("lib/mod.rs")), Some("mod".to_string()));
}

#[rstest]
fn deleting_a_modified_file_is_a_conflict(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("a.txt", "one"), ("gone.txt", "doomed")]);
    let second = snapshot(dir, &[("a.txt", "one")]);
    check_out(dir, &first);
    write_file(FileSpec::new(dir.join("gone.txt"), "precious".to_string()));

    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\tgone.txt"));

    assert_eq!(read_file(&dir.join("gone.txt")), Some("precious".to_string()));
}
