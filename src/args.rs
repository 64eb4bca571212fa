use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Command-line arguments for the outpack tool
#[derive(Debug)]
pub struct Args {
    /// Enable verbose output
    pub verbose: bool,

    /// Directory to package (overrides the manifest)
    pub source: Option<PathBuf>,

    /// Archive file to write (overrides the manifest)
    pub output: Option<PathBuf>,

    /// Path to Cargo.toml or directory containing it
    pub path: Option<PathBuf>,

    /// Path to alternative manifest file for outpack configuration
    pub manifest: Option<PathBuf>,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            verbose: matches.get_flag("verbose"),
            source: matches.get_one::<String>("source").map(PathBuf::from),
            output: matches.get_one::<String>("output").map(PathBuf::from),
            path: matches.get_one::<String>("path").map(PathBuf::from),
            manifest: matches.get_one::<String>("manifest").map(PathBuf::from),
        }
    }
}

fn command() -> Command {
    Command::new("outpack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Package a build output directory into a single tar.gz archive")
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .env("OUTPACK_SOURCE")
                .help("Directory to package (default: out)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .env("OUTPACK_OUTPUT")
                .help("Archive file to write, replaced if it exists (default: <name>.tar.gz)"),
        )
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .value_name("PATH")
                .help("Path to Cargo.toml or directory containing it"),
        )
        .arg(
            Arg::new("manifest")
                .short('m')
                .long("manifest")
                .value_name("FILE")
                .help("Path to alternative manifest file (e.g., outpack.toml) for outpack configuration"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("List every archive member as it is added"),
        )
}
