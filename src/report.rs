use serde::Serialize;
use std::collections::BTreeMap;

/// Line value for findings that belong to the whole file.
pub const FILE_LEVEL_LINE: i64 = -1;

/// One reported issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Finding {
    line: i64,
    message: String,
}

impl Finding {
    pub fn new(line: i64, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// The single finding a file gets when it cannot be read or parsed.
    pub fn parse_error(diagnostic: impl std::fmt::Display) -> Self {
        Self::new(FILE_LEVEL_LINE, format!("Parse error: {diagnostic}"))
    }

    pub fn line(&self) -> i64 {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Path → findings. Only files with at least one finding are ever stored.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FileReport(BTreeMap<String, Vec<Finding>>);

impl FileReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the findings for `path`; an empty list leaves the report untouched.
    pub fn record(&mut self, path: String, findings: Vec<Finding>) {
        if findings.is_empty() {
            return;
        }
        self.0.entry(path).or_default().extend(findings);
    }

    pub fn get(&self, path: &str) -> Option<&[Finding]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Indented JSON, two spaces per level.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[test]
fn empty_findings_never_create_a_key() {
    let mut report = FileReport::new();
    report.record("clean.py".into(), vec![]);
    assert!(report.is_empty());
    assert!(report.get("clean.py").is_none());
}

#[test]
fn parse_error_uses_the_file_level_sentinel() {
    let f = Finding::parse_error("invalid syntax (line 3, column 1)");
    assert_eq!(f.line(), FILE_LEVEL_LINE);
    assert_eq!(f.message(), "Parse error: invalid syntax (line 3, column 1)");
}

#[test]
fn json_shape_matches_the_cli_contract() {
    let mut report = FileReport::new();
    report.record(
        "pkg/app.py".into(),
        vec![Finding::new(5, "Use of dangerous call: exec()")],
    );

    let expected = r#"{
  "pkg/app.py": [
    {
      "line": 5,
      "message": "Use of dangerous call: exec()"
    }
  ]
}"#;
    assert_eq!(report.to_json().unwrap(), expected);
}

#[test]
fn empty_report_serialises_as_empty_object() {
    assert_eq!(FileReport::new().to_json().unwrap(), "{}");
}
