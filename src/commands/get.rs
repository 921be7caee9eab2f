use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;

use setconf::{ConfigFile, Syntax};

pub fn get(path: &Path, key: &str, syntax: &Syntax, json: bool) -> ExitCode {
    let file = match ConfigFile::open(path, syntax) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{} Can't read {}", "Error:".red().bold(), e);
            return ExitCode::from(2);
        }
    };

    let Some((index, line)) = file.find_assignment(key, syntax) else {
        if json {
            println!("null");
        } else {
            eprintln!("Key not found in {}: {}", path.display(), key);
        }
        return ExitCode::from(1);
    };

    if json {
        let output = serde_json::json!({
            "file": path.display().to_string(),
            "key": key,
            "value": line.value(),
            "line": index + 1,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                return ExitCode::from(2);
            }
        }
    } else {
        println!("{}", line.value());
    }

    ExitCode::SUCCESS
}
