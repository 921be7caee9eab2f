mod commands;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use setconf::settings::load_settings;

#[derive(Parser)]
#[command(name = "setconf")]
#[command(about = "Change a single value in a configuration file", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file to change
    #[arg(required_unless_present = "completions")]
    file: Option<PathBuf>,
    /// Key to change, or KEY=VALUE, KEY+=N, KEY-=N
    #[arg(required_unless_present = "completions")]
    key: Option<String>,
    /// New value
    value: Option<String>,
    /// End marker for a value spanning several lines
    end: Option<String>,
    /// Create the file if missing and append the key if it is not there
    #[arg(short, long)]
    add: bool,
    /// Print the current value of KEY instead of changing it
    #[arg(long, conflicts_with_all = ["value", "end", "add"])]
    get: bool,
    /// Output as JSON (with --get)
    #[arg(long, requires = "get")]
    json: bool,
    /// Show what would change without writing the file
    #[arg(short = 'n', long)]
    dry_run: bool,
    /// Uncomment matching commented lines before changing them
    #[arg(long)]
    uncomment: bool,
    /// Also change commented lines, leaving them commented
    #[arg(long)]
    include_commented: bool,
    /// Remove whitespace around the key
    #[arg(long)]
    trim_key: bool,
    /// Remove whitespace around the value
    #[arg(long)]
    trim_value: bool,
    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
    /// Log what is being changed
    #[arg(short, long, env = "SETCONF_VERBOSE")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

fn main() -> ExitCode {
    let args = Cli::parse();

    if let Some(shell) = args.completions {
        generate(shell, &mut Cli::command(), "setconf", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_tracing(args.verbose);

    let (Some(file), Some(key)) = (args.file, args.key) else {
        eprintln!("{} FILE and KEY are required", "Error:".red().bold());
        return ExitCode::from(2);
    };

    let settings = load_settings();
    let syntax = settings.syntax();
    let mut policy = settings.edit_policy();
    if args.uncomment {
        policy.uncomment = true;
    }
    if args.include_commented {
        policy.skip_commented = false;
    }
    if args.trim_key {
        policy.trim_key = true;
    }
    if args.trim_value {
        policy.trim_value = true;
    }

    if args.get {
        return commands::get(&file, &key, &syntax, args.json);
    }

    let change = match commands::Change::from_args(key, args.value, args.end, args.add) {
        Ok(change) => change,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::from(2);
        }
    };

    commands::set(&file, &change, &policy, &syntax, args.dry_run)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positional() {
        let cli = Cli::try_parse_from(["setconf", "Makefile", "CC", "clang"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("Makefile")));
        assert_eq!(cli.key.as_deref(), Some("CC"));
        assert_eq!(cli.value.as_deref(), Some("clang"));
        assert!(cli.end.is_none());
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from(["setconf", "-a", "-n", "--uncomment", "f.conf", "x=1"])
            .unwrap();
        assert!(cli.add);
        assert!(cli.dry_run);
        assert!(cli.uncomment);
        assert!(cli.value.is_none());
    }

    #[test]
    fn test_completions_without_positionals() {
        let cli = Cli::try_parse_from(["setconf", "--completions", "bash"]).unwrap();
        assert_eq!(cli.completions, Some(Shell::Bash));
    }

    #[test]
    fn test_missing_key_is_rejected() {
        assert!(Cli::try_parse_from(["setconf", "f.conf"]).is_err());
    }

    #[test]
    fn test_get_conflicts_with_value() {
        assert!(Cli::try_parse_from(["setconf", "--get", "f.conf", "x", "1"]).is_err());
        assert!(Cli::try_parse_from(["setconf", "--json", "f.conf", "x"]).is_err());
    }
}
