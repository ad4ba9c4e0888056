use std::path::Path;

/// Whether `path` ends in one of `extensions` (exact, case-sensitive match,
/// so `setup.PY` is not a source file).
pub fn has_source_ext(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e == ext))
}

#[test]
fn has_source_ext_matches_exactly() {
  let py = vec!["py".to_string()];
  let cases = [
    ("app.py", true),
    ("pkg/mod/__init__.py", true),
    ("setup.PY", false),
    ("stub.pyi", false),
    ("notes.txt", false),
    ("py", false),
  ];

  for (file, expected) in cases {
    assert_eq!(has_source_ext(Path::new(file), &py), expected, "case: {file}");
  }
}
