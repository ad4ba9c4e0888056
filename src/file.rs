use crate::ast;
use crate::detectors;
use crate::errors::FriskResult;
use crate::report::Finding;
use std::path::Path;

/// Scan one file. Never fails: read and parse problems come back as a
/// single file-level finding.
pub(crate) fn scan_file(path: &Path) -> Vec<Finding> {
  tracing::debug!("Scanning: {}", path.display());
  match std::fs::read_to_string(path) {
    Ok(source) => scan_source(&source),
    Err(e) => {
      tracing::debug!("cannot read {}: {e}", path.display());
      vec![Finding::parse_error(e)]
    }
  }
}

/// Same pipeline as [`scan_file`], over text already in memory.
pub(crate) fn scan_source(source: &str) -> Vec<Finding> {
  match run_detectors(source) {
    Ok(findings) => findings,
    Err(e) => vec![Finding::parse_error(e)],
  }
}

fn run_detectors(source: &str) -> FriskResult<Vec<Finding>> {
  let tree = ast::parse(source)?;

  let mut out = Vec::new();
  for detector in detectors::fresh() {
    let name = detector.name();
    let mut found = detectors::run(detector, &tree);
    tracing::trace!(detector = name, count = found.len());
    out.append(&mut found);
  }
  Ok(out)
}

#[test]
fn detector_order_is_fixed() {
  let src = "password = 'x'\nq = 'a' + b\neval(q)\n";
  let findings = scan_source(src);
  let messages: Vec<_> = findings.iter().map(Finding::message).collect();
  assert_eq!(
    messages,
    vec![
      "Use of dangerous call: eval()",
      "Possible SQL injection risk due to string concatenation",
      "Hardcoded secret in variable 'password'",
    ]
  );
}

#[test]
fn parse_failure_is_a_single_sentinel_finding() {
  // would be flagged by every detector if it parsed
  let src = "password = 'x'\neval('a' + b\n";
  let findings = scan_source(src);
  assert_eq!(findings.len(), 1);
  assert_eq!(findings[0].line(), crate::report::FILE_LEVEL_LINE);
  assert!(findings[0].message().starts_with("Parse error: "));
}

#[test]
fn clean_source_yields_nothing() {
  assert!(scan_source("import os\n\nprint(os.getcwd())\n").is_empty());
}

#[test]
fn missing_file_is_reported_like_a_parse_error() {
  let dir = tempfile::tempdir().unwrap();
  let findings = scan_file(&dir.path().join("gone.py"));
  assert_eq!(findings.len(), 1);
  assert_eq!(findings[0].line(), -1);
  assert!(findings[0].message().starts_with("Parse error: "));
}

#[test]
fn undecodable_file_is_reported_like_a_parse_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("latin1.py");
  std::fs::write(&path, b"name = '\xe9t\xe9'\n").unwrap();

  let findings = scan_file(&path);
  assert_eq!(findings.len(), 1);
  assert!(findings[0].message().starts_with("Parse error: "));
}

#[test]
fn detectors_are_independent() {
  use crate::detectors::{DangerousCall, HardcodedSecret, UnsafeConcatenation, run_one};
  use std::collections::HashSet;

  let src = "import subprocess\n\
             api_key = 'k'\n\
             cmd = 'ls ' + path\n\
             subprocess.call(cmd)\n\
             exec(cmd)\n\
             token = secret = 'x' + y\n";

  let together: HashSet<_> = scan_source(src).into_iter().collect();
  let mut alone = HashSet::new();
  alone.extend(run_one(DangerousCall::default(), src));
  alone.extend(run_one(UnsafeConcatenation::default(), src));
  alone.extend(run_one(HardcodedSecret::default(), src));

  assert_eq!(together, alone);
  assert_eq!(together.len(), 5);
}
