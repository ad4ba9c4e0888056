pub mod scan;

use crate::cli::Cli;
use crate::errors::FriskResult;
use crate::utils::config::Config;
use console::style;

/// Exit status for a missing path argument.
pub const USAGE_EXIT: u8 = 1;

/// Run the CLI request and return the process exit status.
pub fn handle_command(cli: Cli, config: &Config) -> FriskResult<u8> {
    match cli.path {
        Some(path) => {
            scan::handle(&path, config)?;
            Ok(0)
        }
        None => {
            println!("{} {} <path>", style("Usage:").bold(), env!("CARGO_PKG_NAME"));
            Ok(USAGE_EXIT)
        }
    }
}

#[test]
fn missing_path_is_a_usage_failure() {
    let code = handle_command(Cli { path: None }, &Config::default()).unwrap();
    assert_eq!(code, USAGE_EXIT);
}

#[test]
fn clean_directory_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let cli = Cli { path: Some(dir.path().to_path_buf()) };
    assert_eq!(handle_command(cli, &Config::default()).unwrap(), 0);
}
