use crate::common::command::{
    check_out, ls_tree, read_index, repository_dir, run_bit_command, snapshot, write_tree,
};
use crate::common::file::{FileSpec, random_content, read_file, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn switch_adds_and_removes_files(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let shared = random_content();
    let first = snapshot(
        dir,
        &[("a.txt", &shared), ("docs/guide/intro.md", "intro")],
    );
    let second = snapshot(dir, &[("a.txt", &shared), ("b.txt", "bee")]);
    check_out(dir, &first);

    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .success();

    assert_eq!(read_file(&dir.join("a.txt")), Some(shared));
    assert_eq!(read_file(&dir.join("b.txt")), Some("bee".to_string()));
    assert!(!dir.join("docs").exists());
}

#[rstest]
fn switch_updates_the_index_to_the_target_tree(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("a.txt", "one"), ("lib/mod.rs", "mod")]);
    let second = snapshot(dir, &[("a.txt", "two"), ("lib/mod.rs", "mod")]);
    check_out(dir, &first);

    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .success();

    assert_eq!(crate::common::command::write_tree(dir), second);
}

#[rstest]
fn tracked_file_is_replaced_by_a_directory(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("lib", "a plain file")]);
    let second = snapshot(dir, &[("lib/mod.rs", "pub mod walk;")]);
    check_out(dir, &first);

    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .success();

    assert!(dir.join("lib").is_dir());
    assert_eq!(
        read_file(&dir.join("lib/mod.rs")),
        Some("pub mod walk;".to_string())
    );
}

#[rstest]
fn tracked_directory_is_replaced_by_a_file(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("lib/mod.rs", "mod"), ("lib/walk.rs", "walk")]);
    let second = snapshot(dir, &[("lib", "a plain file")]);
    check_out(dir, &first);

    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .success();

    assert_eq!(read_file(&dir.join("lib")), Some("a plain file".to_string()));
}

#[rstest]
fn local_changes_outside_the_switch_survive(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("a.txt", "one"), ("b.txt", "bee")]);
    let second = snapshot(dir, &[("a.txt", "two"), ("b.txt", "bee")]);
    check_out(dir, &first);
    write_file(FileSpec::new(dir.join("b.txt"), "local edit".to_string()));

    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .success();

    assert_eq!(read_file(&dir.join("a.txt")), Some("two".to_string()));
    assert_eq!(read_file(&dir.join("b.txt")), Some("local edit".to_string()));
}

#[rstest]
fn repeating_a_checkout_changes_nothing(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("a.txt", "one"), ("lib/mod.rs", "mod")]);
    let second = snapshot(dir, &[("a.txt", "two"), ("src/main.rs", "fn main() {}")]);
    check_out(dir, &first);
    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .success();
    let index_before = read_index(dir);

    run_bit_command(dir, &["read-tree", &second, &second])
        .assert()
        .success();

    let index_after = read_index(dir);
    crate::assert_index_eq!(&index_before, &index_after);
    assert_eq!(read_file(&dir.join("a.txt")), Some("two".to_string()));
}

#[rstest]
fn abbreviated_tree_ids_are_resolved(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("a.txt", "one")]);
    let second = snapshot(dir, &[("a.txt", "two")]);
    check_out(dir, &first);

    run_bit_command(dir, &["read-tree", &first[..8], &second[..8]])
        .assert()
        .success();

    assert_eq!(read_file(&dir.join("a.txt")), Some("two".to_string()));
}

#[rstest]
fn files_written_before_a_failure_stay_staged(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let first = snapshot(dir, &[("a.txt", "one")]);
    let second = snapshot(dir, &[("a.txt", "two"), ("b.txt", "bee")]);
    check_out(dir, &first);

    let target = ls_tree(dir, &second);
    let object_id = |name: &str| {
        target
            .iter()
            .find(|(path, _)| path == name)
            .map(|(_, oid)| oid.clone())
            .unwrap_or_else(|| panic!("{name} missing from the target tree"))
    };
    let lost = object_id("b.txt");
    std::fs::remove_file(dir.join(".git/objects").join(&lost[..2]).join(&lost[2..]))
        .expect("Failed to delete object");

    run_bit_command(dir, &["read-tree", &first, &second])
        .assert()
        .failure();

    assert_eq!(read_file(&dir.join("a.txt")), Some("two".to_string()));
    assert!(!dir.join("b.txt").exists());
    assert_eq!(
        ls_tree(dir, &write_tree(dir)),
        vec![("a.txt".to_string(), object_id("a.txt"))]
    );
}
