use std::path::PathBuf;
use thiserror::Error;

pub type FriskResult<T, E = FriskError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum FriskError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("tree-sitter error: {0}")]
  TreeSitter(#[from] tree_sitter::LanguageError),

  /// Diagnostic produced by the parser adapter; shown verbatim.
  #[error("{0}")]
  Parse(String),

  #[error("path does not exist: {}", .0.display())]
  RootNotFound(PathBuf),

  #[error("thread-pool error: {0}")]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

#[test]
fn parse_errors_display_the_bare_diagnostic() {
  let e = FriskError::Parse("invalid syntax (line 1, column 5)".into());
  assert_eq!(e.to_string(), "invalid syntax (line 1, column 5)");
}

#[test]
fn root_not_found_names_the_path() {
  let e = FriskError::RootNotFound(PathBuf::from("no/such/dir"));
  assert_eq!(e.to_string(), "path does not exist: no/such/dir");
}
