use sift::{
    all_files, clean_directory, copy_directory, delete_directory, make_directory, FsError,
    Outcome, PropertySpec,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn copied_tree_lists_the_same_files() {
    let td = tempdir().expect("tempdir");
    let src = td.path().join("src");
    fs::create_dir_all(src.join("a/b")).expect("dirs");
    fs::write(src.join("one.txt"), "1").expect("one");
    fs::write(src.join("a/two.txt"), "2").expect("two");
    fs::write(src.join("a/b/three.txt"), "3").expect("three");

    let dst = td.path().join("dst");
    assert!(copy_directory(&src, &dst).succeeded());

    let spec = PropertySpec::from("relative_pathname");
    let mut before: Vec<String> = all_files(&src, &spec)
        .expect("src")
        .iter()
        .map(|p| p.as_value().expect("scalar").to_string())
        .collect();
    let mut after: Vec<String> = all_files(&dst, &spec)
        .expect("dst")
        .iter()
        .map(|p| p.as_value().expect("scalar").to_string())
        .collect();
    before.sort();
    after.sort();
    assert_eq!(before, after);
}

#[test]
fn failed_copy_leaves_earlier_siblings() {
    let td = tempdir().expect("tempdir");
    let src = td.path().join("src");
    fs::create_dir_all(src.join("b_dir")).expect("dirs");
    fs::write(src.join("a.txt"), "a").expect("a");
    fs::write(src.join("b_dir/inner.txt"), "inner").expect("inner");
    fs::write(src.join("c.txt"), "c").expect("c");

    let dst = td.path().join("dst");
    // A directory at the target path of a file cannot be overwritten by a copy.
    fs::create_dir_all(dst.join("b_dir/inner.txt")).expect("blocker");

    let outcome = copy_directory(&src, &dst);
    assert!(!outcome.succeeded());
    assert!(dst.join("a.txt").is_file());
    assert!(!dst.join("c.txt").exists());
}

#[test]
fn preserve_leaves_an_empty_directory() {
    let td = tempdir().expect("tempdir");
    let dir = td.path().join("cache");
    fs::create_dir_all(dir.join("x/y")).expect("dirs");
    fs::write(dir.join("x/y/z.bin"), [0u8; 16]).expect("z");
    fs::write(dir.join("top"), "t").expect("top");

    assert!(delete_directory(&dir, true).succeeded());
    assert!(dir.is_dir());
    assert!(fs::read_dir(&dir).expect("read").next().is_none());

    assert!(clean_directory(&dir).succeeded());
    assert!(delete_directory(&dir, false).succeeded());
    assert!(!dir.exists());
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_unlinked_not_emptied() {
    let td = tempdir().expect("tempdir");
    let target = td.path().join("target");
    fs::create_dir(&target).expect("target");
    fs::write(target.join("keep.txt"), "keep").expect("keep");

    let dir = td.path().join("dir");
    fs::create_dir(&dir).expect("dir");
    std::os::unix::fs::symlink(&target, dir.join("alias")).expect("symlink");
    std::os::unix::fs::symlink(target.join("keep.txt"), dir.join("file_alias")).expect("symlink");

    assert!(clean_directory(&dir).succeeded());
    assert!(fs::symlink_metadata(dir.join("alias")).is_err());
    assert!(target.join("keep.txt").is_file());
}

#[test]
fn delete_directory_on_missing_path_fails() {
    let td = tempdir().expect("tempdir");
    let outcome = delete_directory(&td.path().join("ghost"), false);
    assert!(matches!(outcome, Outcome::Failed(FsError::DirectoryNotFound(_))));
}

#[test]
fn make_directory_existing_path() {
    let td = tempdir().expect("tempdir");
    let existing = td.path().join("here");
    fs::create_dir(&existing).expect("dir");

    assert!(make_directory(&existing, 0o755, false, false).is_err());
    assert!(make_directory(&existing, 0o755, true, false).is_err());

    let forced = make_directory(&existing, 0o755, true, true).expect("no error when forced");
    assert!(matches!(forced, Outcome::Failed(_)));
}

#[cfg(unix)]
#[test]
fn make_directory_applies_mode() {
    use std::os::unix::fs::PermissionsExt;

    let td = tempdir().expect("tempdir");
    let dir = td.path().join("private");
    assert!(make_directory(&dir, 0o700, false, false)
        .expect("create")
        .succeeded());
    let mode = fs::metadata(&dir).expect("meta").permissions().mode();
    assert_eq!(mode & 0o077, 0);
}

#[cfg(unix)]
#[test]
fn delete_failures_are_ignored_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    // Root ignores permission bits, so nothing would fail.
    if unsafe { libc::geteuid() } == 0 {
        return;
    }
    let td = tempdir().expect("tempdir");
    let parent = td.path().join("parent");
    let dir = parent.join("victim");
    let locked = dir.join("locked");
    fs::create_dir_all(&locked).expect("dirs");
    fs::write(dir.join("loose.txt"), "x").expect("loose");
    fs::write(locked.join("stuck.txt"), "y").expect("stuck");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).expect("chmod locked");
    fs::set_permissions(&parent, fs::Permissions::from_mode(0o555)).expect("chmod parent");

    let outcome = delete_directory(&dir, false);

    fs::set_permissions(&parent, fs::Permissions::from_mode(0o755)).expect("restore parent");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("restore locked");

    assert!(outcome.succeeded());
    assert!(matches!(outcome, Outcome::Ignored(_)));
    assert!(!dir.join("loose.txt").exists());
    assert!(locked.join("stuck.txt").is_file());
    assert!(dir.is_dir());
}
