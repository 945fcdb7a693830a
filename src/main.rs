//! Loads a khal config file and prints what it resolves to.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use khal_conf::{Config, Error};

/// Command-line arguments.
#[derive(Debug, Default)]
struct Args {
    /// Path to the config file; searched for when absent.
    config: Option<PathBuf>,
    verbose: bool,
    dump: bool,
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Args {
    /// Parses the arguments following the program name.
    ///
    /// Errors are usage messages and never reach the library's error type.
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut args = args.into_iter();
        let mut parsed = Args::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-c" => parsed.config = Some(PathBuf::from(value(&mut args, "-c")?)),
                "-a" => parsed.include.push(value(&mut args, "-a")?),
                "-d" => parsed.exclude.push(value(&mut args, "-d")?),
                "-v" => parsed.verbose = true,
                "--dump" => parsed.dump = true,
                other => return Err(format!("unknown argument: {other}")),
            }
        }

        if !parsed.include.is_empty() && !parsed.exclude.is_empty() {
            return Err("-a and -d cannot be combined".into());
        }
        Ok(parsed)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("{flag} requires a value"))
}

fn main() -> ExitCode {
    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: khal-conf [-v] [--dump] [-c CONF] [-a CAL ... | -d CAL ...]");
            return ExitCode::from(2);
        }
    };

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Invalid config file, exiting.");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let mut builder = Config::builder();
    if let Some(path) = &args.config {
        builder = builder.with_file(path);
    }
    let config = builder.build()?;
    debug!(calendars = config.calendars.len(), "configuration loaded");

    if args.dump {
        match config.render() {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => eprintln!("cannot render configuration: {e}"),
        }
        return Ok(());
    }

    println!("default command: {}", config.default.default_command.as_str());
    println!(
        "default calendar: {}",
        config.default_calendar().unwrap_or_default()
    );
    for calendar in config.selected_calendars(&args.include, &args.exclude) {
        println!("{}", calendar.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, String> {
        Args::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn test_dump_and_config() {
        let args = parse(&["--dump", "-c", "/etc/khal.conf", "-v"]).unwrap();
        assert!(args.dump);
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("/etc/khal.conf")));
    }

    #[test]
    fn test_repeated_include() {
        let args = parse(&["-a", "home", "-a", "work"]).unwrap();
        assert_eq!(args.include, ["home", "work"]);
        assert!(args.exclude.is_empty());
        assert!(!args.dump);
    }

    #[test]
    fn test_include_and_exclude_rejected() {
        let err = parse(&["-a", "home", "-d", "work"]).unwrap_err();
        assert_eq!(err, "-a and -d cannot be combined");
    }

    #[test]
    fn test_unknown_argument_rejected() {
        let err = parse(&["--list"]).unwrap_err();
        assert_eq!(err, "unknown argument: --list");
    }

    #[test]
    fn test_missing_value_rejected() {
        let err = parse(&["-c"]).unwrap_err();
        assert_eq!(err, "-c requires a value");
    }
}
