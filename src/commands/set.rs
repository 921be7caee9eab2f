use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;
use tracing::info;

use setconf::edit::{AddOutcome, Adjust, Assignment, EditPolicy};
use setconf::file::create_if_missing;
use setconf::{ConfigFile, Error, Syntax};

/// What to do with the file, decided from the positional arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// `FILE KEY VALUE` or `FILE KEY=VALUE`
    Value { key: String, value: String },
    /// `FILE KEY+=N` or `FILE KEY-=N`
    Adjust {
        key: String,
        delta: String,
        adjust: Adjust,
    },
    /// `FILE KEY VALUE END`
    Multiline {
        key: String,
        value: String,
        end: String,
    },
    /// `--add FILE KEY VALUE` or `--add FILE KEY=VALUE`
    Add(Assignment),
}

impl Change {
    pub fn from_args(
        key: String,
        value: Option<String>,
        end: Option<String>,
        add: bool,
    ) -> Result<Self, Error> {
        match (value, end) {
            (Some(value), _) if add => Ok(Change::Add(Assignment::new(&key, &value))),
            (None, _) if add => Assignment::parse(&key)
                .map(Change::Add)
                .ok_or(Error::InvalidAssignment(key)),
            (Some(value), Some(end)) => Ok(Change::Multiline { key, value, end }),
            (Some(value), None) => Ok(Change::Value { key, value }),
            (None, _) => {
                let assignment =
                    Assignment::parse(&key).ok_or_else(|| Error::InvalidAssignment(key.clone()))?;
                Ok(match assignment.adjustment() {
                    Some(adjust) => Change::Adjust {
                        key: assignment.key,
                        delta: assignment.value,
                        adjust,
                    },
                    None => Change::Value {
                        key: assignment.key,
                        value: assignment.value,
                    },
                })
            }
        }
    }

    fn key(&self) -> &str {
        match self {
            Change::Value { key, .. } | Change::Adjust { key, .. } | Change::Multiline { key, .. } => {
                key
            }
            Change::Add(assignment) => &assignment.key,
        }
    }

    fn apply(&self, file: &mut ConfigFile, policy: &EditPolicy, syntax: &Syntax) -> Result<(), Error> {
        match self {
            Change::Value { key, value } => {
                let n = file.set_value(key, value, policy, syntax)?;
                info!(key, lines = n, "changed value");
            }
            Change::Adjust { key, delta, adjust } => {
                let n = file.adjust_value(key, delta, *adjust, policy, syntax)?;
                info!(key, lines = n, "adjusted value");
            }
            Change::Multiline { key, value, end } => {
                let changed = file.set_value_multiline(key, value, end, policy, syntax)?;
                info!(key, changed, "changed multi-line value");
            }
            Change::Add(assignment) => match file.add(assignment, policy, syntax)? {
                AddOutcome::Changed(n) => info!(key = assignment.key, lines = n, "changed value"),
                AddOutcome::Unchanged => info!(key = assignment.key, "already set"),
                AddOutcome::Appended => info!(key = assignment.key, "appended line"),
            },
        }
        Ok(())
    }
}

pub fn set(path: &Path, change: &Change, policy: &EditPolicy, syntax: &Syntax, dry_run: bool) -> ExitCode {
    let adding = matches!(change, Change::Add(_));

    let mut file = if adding && dry_run && !path.exists() {
        let mut file = ConfigFile::default();
        file.set_filename(path);
        file
    } else {
        if adding {
            if let Err(e) = create_if_missing(path) {
                eprintln!("{} {}", "Error:".red().bold(), e);
                return ExitCode::from(2);
            }
        }
        match ConfigFile::open(path, syntax) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("{} Can't read {}", "Error:".red().bold(), e);
                return ExitCode::from(2);
            }
        }
    };

    let original = file.to_string();
    if let Err(e) = change.apply(&mut file, policy, syntax) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        return ExitCode::from(2);
    }
    let changed = file.to_string();

    if changed == original {
        // Commented lines only count when the policy lets them be edited
        let present = if policy.skip_commented && !policy.uncomment {
            file.has_key(change.key(), syntax)
        } else {
            file.find_key(change.key(), syntax).is_some()
        };
        if !adding && !present {
            eprintln!("Key not found in {}: {}", path.display(), change.key());
            return ExitCode::from(1);
        }
        return ExitCode::SUCCESS;
    }

    if dry_run {
        println!("Would change {}:\n", path.display());
        print_diff(&original, &changed);
        return ExitCode::from(1);
    }

    match file.save() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} Can't write {}", "Error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

/// Simple diff: show lines that differ
fn print_diff(original: &str, changed: &str) {
    println!("{}", "--- original".red());
    println!("{}\n", "+++ changed".green());

    let old_lines: Vec<&str> = original.lines().collect();
    let new_lines: Vec<&str> = changed.lines().collect();

    let max_lines = old_lines.len().max(new_lines.len());
    for i in 0..max_lines {
        let old = old_lines.get(i).copied();
        let new = new_lines.get(i).copied();

        if old != new {
            if let Some(old) = old {
                println!("{}", format!("-{}", old).red());
            }
            if let Some(new) = new {
                println!("{}", format!("+{}", new).green());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn test_change_from_key_value() {
        let change = Change::from_args(s("CC"), Some(s("clang")), None, false).unwrap();
        assert_eq!(
            change,
            Change::Value {
                key: s("CC"),
                value: s("clang")
            }
        );
    }

    #[test]
    fn test_change_from_single_assignment() {
        let change = Change::from_args(s("x=42"), None, None, false).unwrap();
        assert_eq!(
            change,
            Change::Value {
                key: s("x"),
                value: s("42")
            }
        );

        let change = Change::from_args(s("jobs+=2"), None, None, false).unwrap();
        assert_eq!(
            change,
            Change::Adjust {
                key: s("jobs"),
                delta: s("2"),
                adjust: Adjust::Increment
            }
        );
    }

    #[test]
    fn test_change_from_multiline() {
        let change =
            Change::from_args(s("NUMS"), Some(s("[1, 2, 3]")), Some(s("]")), false).unwrap();
        assert_eq!(
            change,
            Change::Multiline {
                key: s("NUMS"),
                value: s("[1, 2, 3]"),
                end: s("]")
            }
        );
    }

    #[test]
    fn test_change_from_add() {
        let change = Change::from_args(s("ABC"), Some(s("123")), None, true).unwrap();
        assert_eq!(change, Change::Add(Assignment::new("ABC", "123")));

        let change = Change::from_args(s("Z:=567"), None, None, true).unwrap();
        assert_eq!(change, Change::Add(Assignment::parse("Z:=567").unwrap()));
    }

    #[test]
    fn test_change_without_operator() {
        let err = Change::from_args(s("novalue"), None, None, false).unwrap_err();
        assert!(matches!(err, Error::InvalidAssignment(_)));
        let err = Change::from_args(s("novalue"), None, None, true).unwrap_err();
        assert!(matches!(err, Error::InvalidAssignment(_)));
    }

    #[test]
    fn test_set_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Makefile");
        fs::write(&path, "CC=gcc\nCFLAGS = -O2\n").unwrap();

        let change = Change::from_args(s("CC"), Some(s("clang")), None, false).unwrap();
        let code = set(&path, &change, &EditPolicy::default(), &Syntax::default(), false);
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(fs::read_to_string(&path).unwrap(), "CC=clang\nCFLAGS = -O2\n");
    }

    #[test]
    fn test_set_dry_run_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.conf");
        fs::write(&path, "x = 1\n").unwrap();

        let change = Change::from_args(s("x"), Some(s("2")), None, false).unwrap();
        let code = set(&path, &change, &EditPolicy::default(), &Syntax::default(), true);
        assert_eq!(code, ExitCode::from(1));
        assert_eq!(fs::read_to_string(&path).unwrap(), "x = 1\n");
    }

    #[test]
    fn test_set_missing_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.conf");
        fs::write(&path, "x = 1\n").unwrap();

        let change = Change::from_args(s("y"), Some(s("2")), None, false).unwrap();
        let code = set(&path, &change, &EditPolicy::default(), &Syntax::default(), false);
        assert_eq!(code, ExitCode::from(1));
    }

    #[test]
    fn test_set_key_only_in_comment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.conf");
        fs::write(&path, "# x = 1\n").unwrap();

        let change = Change::from_args(s("x"), Some(s("2")), None, false).unwrap();
        let code = set(&path, &change, &EditPolicy::default(), &Syntax::default(), false);
        assert_eq!(code, ExitCode::from(1));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# x = 1\n");

        let policy = EditPolicy {
            skip_commented: false,
            ..Default::default()
        };
        let change = Change::from_args(s("x"), Some(s("1")), None, false).unwrap();
        let code = set(&path, &change, &policy, &Syntax::default(), false);
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn test_set_missing_file() {
        let dir = TempDir::new().unwrap();
        let change = Change::from_args(s("y"), Some(s("2")), None, false).unwrap();
        let code = set(
            &dir.path().join("missing.conf"),
            &change,
            &EditPolicy::default(),
            &Syntax::default(),
            false,
        );
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn test_add_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.conf");

        let change = Change::from_args(s("ABC"), Some(s("123")), None, true).unwrap();
        let code = set(&path, &change, &EditPolicy::default(), &Syntax::default(), false);
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(fs::read_to_string(&path).unwrap(), "ABC=123\n");
    }

    #[test]
    fn test_add_dry_run_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.conf");

        let change = Change::from_args(s("ABC"), Some(s("123")), None, true).unwrap();
        let code = set(&path, &change, &EditPolicy::default(), &Syntax::default(), true);
        assert_eq!(code, ExitCode::from(1));
        assert!(!path.exists());
    }
}
