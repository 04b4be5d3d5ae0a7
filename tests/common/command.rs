use crate::common::file::{FileSpec, clear_workspace, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    let repository_dir = TempDir::new().expect("Failed to create temp dir");

    run_bit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

pub fn run_bit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bit").expect("Failed to find bit binary");
    cmd.current_dir(dir);
    cmd.env_remove("BIT_LOG");
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn run_git_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Record `files` as a tree and return its ID
///
/// The working directory and the index end up holding exactly `files`.
pub fn snapshot(dir: &Path, files: &[(&str, &str)]) -> String {
    clear_workspace(dir);
    let _ = std::fs::remove_file(dir.join(".git").join("index"));

    for (path, content) in files {
        write_file(FileSpec::new(dir.join(path), content.to_string()));
    }
    if !files.is_empty() {
        run_bit_command(dir, &["add", "."]).assert().success();
    }

    write_tree(dir)
}

pub fn write_tree(dir: &Path) -> String {
    let output = run_bit_command(dir, &["write-tree"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    String::from_utf8(output)
        .expect("write-tree printed invalid UTF-8")
        .trim()
        .to_string()
}

/// Make the index and the working directory match `tree`
pub fn check_out(dir: &Path, tree: &str) {
    run_bit_command(dir, &["read-tree", "--force", tree])
        .assert()
        .success();
}

pub fn read_index(dir: &Path) -> Vec<u8> {
    std::fs::read(dir.join(".git").join("index")).expect("Failed to read index")
}

/// `(path, object ID)` of every entry at the top of `tree`
pub fn ls_tree(dir: &Path, tree: &str) -> Vec<(String, String)> {
    let output = run_bit_command(dir, &["ls-tree", tree])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    String::from_utf8(output)
        .expect("ls-tree printed invalid UTF-8")
        .lines()
        .map(|line| {
            let (meta, path) = line.split_once('\t').expect("ls-tree line without a path");
            let oid = meta.split_whitespace().nth(2).expect("ls-tree line without an ID");
            (path.to_string(), oid.to_string())
        })
        .collect()
}
