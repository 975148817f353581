use stargazer::archive::{metadata_last, Archive, BuildOptions, EntryOrder};
use stargazer::{build_archive, read_archive, serialize, sha1, summarize, unpack, Entry, StarError};
use std::collections::BTreeMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};

const B_BIN: &[u8] = &[0x00, 0xFF, 0x7F];

fn write_file(root: &Path, rel: &str, data: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, data).unwrap();
}

fn sample_tree() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"hi");
    write_file(dir.path(), "sub/b.bin", B_BIN);
    dir
}

fn by_name(archive: &Archive) -> BTreeMap<String, Vec<u8>> {
    archive
        .iter()
        .map(|e| (e.filename().into_owned(), e.content().to_vec()))
        .collect()
}

#[test]
fn test_build_from_directory() {
    let dir = sample_tree();
    let archive = build_archive(dir.path()).unwrap();
    assert_eq!(archive.len(), 2);

    let a = archive.iter().find(|e| e.filename() == "a.txt").unwrap();
    assert_eq!(a.header().filename_size, 5);
    assert_eq!(a.header().header_size, 13);
    assert_eq!(a.content_size(), 2);
    assert_eq!(a.digest(), &sha1(b"hi"));

    let b = archive.iter().find(|e| e.filename() == "sub/b.bin").unwrap();
    assert_eq!(b.header().filename_size, 9);
    assert_eq!(b.header().header_size, 17);
    assert_eq!(b.content_size(), 3);
    assert_eq!(b.digest(), &sha1(B_BIN));
}

#[test]
fn test_walk_order_is_sorted() {
    let dir = tempdir().unwrap();
    for name in ["zeta.rel", "alpha.rel", "mid/inner.rel", "beta.rel"] {
        write_file(dir.path(), name, name.as_bytes());
    }
    let archive = build_archive(dir.path()).unwrap();
    let names: Vec<_> = archive.iter().map(|e| e.filename().into_owned()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names.len(), 4);
    assert_eq!(names, sorted);
}

#[test]
fn test_build_with_metadata_last() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "install.txt", b"install");
    write_file(dir.path(), "metadata.xml", b"<mod/>");
    write_file(dir.path(), "NulledFile.rel", &[0u8; 32]);
    write_file(dir.path(), "data/a.rel", b"a");

    let opts = BuildOptions { order: Some(metadata_last as EntryOrder) };
    let archive = Archive::from_directory_with(dir.path(), opts).unwrap();
    let names: Vec<_> = archive.iter().map(|e| e.filename().into_owned()).collect();
    assert_eq!(names.len(), 4);
    assert_eq!(&names[2..], ["metadata.xml", "install.txt"]);
}

#[test]
fn test_pack_then_read_roundtrip() {
    let dir = sample_tree();
    write_file(dir.path(), ".hidden", b"still packed");
    let archive = build_archive(dir.path()).unwrap();

    let archive_file = NamedTempFile::new().unwrap();
    let written = archive.write_to_path(archive_file.path()).unwrap();
    assert_eq!(written, fs::metadata(archive_file.path()).unwrap().len());

    let read = read_archive(archive_file.path()).unwrap();
    assert_eq!(read, archive);

    let expected: BTreeMap<String, Vec<u8>> = [
        (".hidden".to_string(), b"still packed".to_vec()),
        ("a.txt".to_string(), b"hi".to_vec()),
        ("sub/b.bin".to_string(), B_BIN.to_vec()),
    ]
    .into_iter()
    .collect();
    assert_eq!(by_name(&read), expected);
}

#[test]
fn test_serialize_is_byte_exact() {
    let dir = sample_tree();
    let bytes = serialize(&build_archive(dir.path()).unwrap()).unwrap();
    let reread = Archive::read(Cursor::new(&bytes)).unwrap();
    assert_eq!(serialize(&reread).unwrap(), bytes);
}

#[test]
fn test_unpack_recreates_tree() {
    let dir = sample_tree();
    let archive = build_archive(dir.path()).unwrap();

    let out = tempdir().unwrap();
    let dest = out.path().join("nested").join("extracted");
    unpack(&archive, &dest).unwrap();

    assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"hi");
    assert_eq!(fs::read(dest.join("sub").join("b.bin")).unwrap(), B_BIN);
}

#[test]
fn test_unpack_overwrites_existing_files() {
    let archive = Archive::from_entries(vec![Entry::new("a.txt", b"new".to_vec()).unwrap()]);
    let out = tempdir().unwrap();
    fs::write(out.path().join("a.txt"), b"old and longer").unwrap();
    archive.unpack(out.path()).unwrap();
    assert_eq!(fs::read(out.path().join("a.txt")).unwrap(), b"new");
}

#[test]
fn test_unpack_stops_at_first_failure() {
    let archive = Archive::from_entries(vec![
        Entry::new("first.txt", b"1".to_vec()).unwrap(),
        Entry::new("blocker/inner.txt", b"2".to_vec()).unwrap(),
        Entry::new("third.txt", b"3".to_vec()).unwrap(),
    ]);
    let out = tempdir().unwrap();
    // A plain file where a directory is needed.
    fs::write(out.path().join("blocker"), b"").unwrap();

    assert!(matches!(archive.unpack(out.path()), Err(StarError::Io(_))));
    assert!(out.path().join("first.txt").exists());
    assert!(!out.path().join("third.txt").exists());
}

#[test]
fn test_unpack_refuses_parent_traversal() {
    let archive = Archive::from_entries(vec![Entry::new("../evil.txt", b"x".to_vec()).unwrap()]);
    let out = tempdir().unwrap();
    let dest = out.path().join("dest");
    assert!(matches!(archive.unpack(&dest), Err(StarError::UnsafePath { .. })));
    assert!(!out.path().join("evil.txt").exists());
}

#[test]
fn test_read_archive_rejects_directory() {
    let dir = tempdir().unwrap();
    assert!(matches!(read_archive(dir.path()), Err(StarError::NotAFile { .. })));
}

#[test]
fn test_read_archive_missing_file() {
    let dir = tempdir().unwrap();
    assert!(matches!(read_archive(dir.path().join("invalid.star")), Err(StarError::Io(_))));
}

#[test]
fn test_read_archive_empty_file() {
    let file = NamedTempFile::new().unwrap();
    assert!(matches!(read_archive(file.path()), Err(StarError::NoEntries)));
}

#[test]
fn test_build_rejects_file() {
    let file = NamedTempFile::new().unwrap();
    assert!(matches!(build_archive(file.path()), Err(StarError::NotADirectory { .. })));
}

#[test]
fn test_build_rejects_long_filename() {
    let dir = tempdir().unwrap();
    // 3 * 100 characters + 2 separators = 302 bytes once joined.
    let rel = format!("{}/{}/{}", "a".repeat(100), "b".repeat(100), "c".repeat(100));
    write_file(dir.path(), &rel, b"deep");
    match build_archive(dir.path()) {
        Err(StarError::FilenameTooLong { filename }) => assert_eq!(filename, rel),
        other => panic!("expected FilenameTooLong, got {other:?}"),
    }
}

#[test]
fn test_build_empty_directory() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("only_dirs")).unwrap();
    let archive = build_archive(dir.path()).unwrap();
    assert!(archive.is_empty());
}

#[test]
fn test_clean_end_after_complete_entries() {
    let archive = Archive::from_entries(vec![
        Entry::new("one", b"1".to_vec()).unwrap(),
        Entry::new("two", b"22".to_vec()).unwrap(),
    ]);
    let bytes = archive.serialize().unwrap();
    let first_len = archive.entries()[0].encoded_len() as usize;

    let prefix = Archive::read(Cursor::new(&bytes[..first_len])).unwrap();
    assert_eq!(prefix.len(), 1);
    assert_eq!(prefix.entries()[0].filename(), "one");

    for cut in first_len + 1..bytes.len() {
        assert!(
            matches!(Archive::read(Cursor::new(&bytes[..cut])), Err(StarError::Truncated { .. })),
            "cut at {cut} should be truncated"
        );
    }
}

#[test]
fn test_summarize() {
    let dir = sample_tree();
    let archive = build_archive(dir.path()).unwrap();
    let text = summarize(&archive);
    assert!(text.contains("a.txt\n  Filesize: 2 bytes\n  SHA1: c22b5f9178342609428d6f51b2c5af4c0bde6a42\n"));
    assert!(text.contains("sub/b.bin\n  Filesize: 3 bytes\n"));
    assert!(text.ends_with("Total contents: 2\nTotal content size: 5 bytes\n"));
}
