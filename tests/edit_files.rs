use std::fs;

use setconf::file::create_if_missing;
use setconf::settings::{load_settings_from_path, CONFIG_FILE};
use setconf::{AddOutcome, Assignment, ConfigFile, EditPolicy, Syntax};
use tempfile::TempDir;

#[test]
fn test_change_makefile_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Makefile");
    fs::write(
        &path,
        "# Compiler\nCC = gcc\n#CC = clang\nCFLAGS := -O2\n\nall:\n\t$(CC) main.c\n",
    )
    .unwrap();

    let syntax = Syntax::default();
    let policy = EditPolicy::default();
    let mut file = ConfigFile::open(&path, &syntax).unwrap();
    assert_eq!(file.set_value("CC", "tcc", &policy, &syntax).unwrap(), 1);
    assert_eq!(file.set_value("CFLAGS", "-O3", &policy, &syntax).unwrap(), 1);
    file.save().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# Compiler\nCC = tcc\n#CC = clang\nCFLAGS := -O3\n\nall:\n\t$(CC) main.c\n"
    );
}

#[test]
fn test_untouched_file_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mixed.conf");
    let content = "a = 1\r\n  // b: 2\r\nc=3\rd := 4";
    fs::write(&path, content).unwrap();

    let syntax = Syntax::default();
    let mut file = ConfigFile::open(&path, &syntax).unwrap();
    assert_eq!(
        file.set_value("missing", "x", &EditPolicy::default(), &syntax)
            .unwrap(),
        0
    );
    file.save().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn test_add_to_new_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("new.conf");
    let syntax = Syntax::default();
    let policy = EditPolicy::default();

    assert!(create_if_missing(&path).unwrap());
    let mut file = ConfigFile::open(&path, &syntax).unwrap();
    let outcome = file
        .add(&Assignment::parse("port: 8080").unwrap(), &policy, &syntax)
        .unwrap();
    assert_eq!(outcome, AddOutcome::Appended);
    let outcome = file
        .add(&Assignment::new("host", "localhost"), &policy, &syntax)
        .unwrap();
    assert_eq!(outcome, AddOutcome::Appended);
    file.save().unwrap();

    let mut file = ConfigFile::open(&path, &syntax).unwrap();
    let outcome = file
        .add(&Assignment::new("host", "example.org"), &policy, &syntax)
        .unwrap();
    assert_eq!(outcome, AddOutcome::Changed(1));
    file.save().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "port: 8080\nhost=example.org\n"
    );
}

#[test]
fn test_multiline_value_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("PKGBUILD");
    fs::write(
        &path,
        "pkgname=setconf\nsha256sums=('aaaa'\n            'bbbb')\nbuild() {\n  make\n}\n",
    )
    .unwrap();

    let syntax = Syntax::default();
    let mut file = ConfigFile::open(&path, &syntax).unwrap();
    let changed = file
        .set_value_multiline(
            "sha256sums",
            "('cccc')",
            ")",
            &EditPolicy::default(),
            &syntax,
        )
        .unwrap();
    assert!(changed);
    file.save().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "pkgname=setconf\nsha256sums=('cccc')\nbuild() {\n  make\n}\n"
    );
}

#[test]
fn test_settings_extend_comment_markers() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE),
        "comment_markers = [\";\"]\n\n[edit]\nuncomment = true\n",
    )
    .unwrap();
    let settings = load_settings_from_path(dir.path());
    let syntax = settings.syntax();
    let policy = settings.edit_policy();

    let path = dir.path().join("php.ini");
    fs::write(&path, "[Date]\n;date.timezone = Europe/Oslo\nmemory_limit = 128M\n").unwrap();

    let mut file = ConfigFile::open(&path, &syntax).unwrap();
    assert_eq!(
        file.set_value("date.timezone", "UTC", &policy, &syntax)
            .unwrap(),
        1
    );
    file.save().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[Date]\ndate.timezone = UTC\nmemory_limit = 128M\n"
    );
}
