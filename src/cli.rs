use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "frisk")]
#[command(about = "Flag risky patterns in a tree of Python sources")]
#[command(version)]
pub struct Cli {
    /// Directory (or single file) to scan
    pub(crate) path: Option<PathBuf>,
}

#[test]
fn path_is_optional_and_positional() {
    let cli = Cli::try_parse_from(["frisk", "src/app"]).unwrap();
    assert_eq!(cli.path, Some(PathBuf::from("src/app")));

    let cli = Cli::try_parse_from(["frisk"]).unwrap();
    assert!(cli.path.is_none());
}

#[test]
fn unknown_flags_are_rejected() {
    assert!(Cli::try_parse_from(["frisk", "--format", "json", "."]).is_err());
}
