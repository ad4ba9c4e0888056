use crate::detectors::Detector;
use crate::report::Finding;
use crate::syntax::{PyNode, Target};

/// Substrings that make a variable name look like it holds a credential.
const SECRET_HINTS: &[&str] = &["secret", "password", "token", "key"];

/// Flags literal values assigned to secret-looking names.
#[derive(Debug, Default)]
pub struct HardcodedSecret {
    findings: Vec<Finding>,
}

fn looks_secret(name: &str) -> bool {
    let lc = name.to_lowercase();
    SECRET_HINTS.iter().any(|hint| lc.contains(hint))
}

impl Detector for HardcodedSecret {
    fn name(&self) -> &'static str {
        "hardcoded_secret"
    }

    fn visit(&mut self, node: &PyNode<'_>) {
        let PyNode::Assign {
            line,
            targets,
            value: Some(_),
        } = node
        else {
            return;
        };

        for target in targets {
            match target {
                Target::Name(name) if looks_secret(name) => self.findings.push(Finding::new(
                    *line,
                    format!("Hardcoded secret in variable '{name}'"),
                )),
                Target::Name(_) | Target::Other => {}
            }
        }
    }

    fn finish(self: Box<Self>) -> Vec<Finding> {
        self.findings
    }
}

#[cfg(test)]
use crate::detectors::run_one;

#[test]
fn literal_password_is_flagged() {
    assert_eq!(
        run_one(HardcodedSecret::default(), "db_password = \"abc123\"\n"),
        vec![Finding::new(1, "Hardcoded secret in variable 'db_password'")]
    );
}

#[test]
fn computed_value_is_not_flagged() {
    assert!(run_one(HardcodedSecret::default(), "db_password = get_secret()\n").is_empty());
}

#[test]
fn name_match_is_case_insensitive_substring() {
    let src = "API_KEY = 'k'\nAuthToken = 'x'\nmonkey = 'banana'\nuser = 'bob'\n";
    assert_eq!(
        run_one(HardcodedSecret::default(), src),
        vec![
            Finding::new(1, "Hardcoded secret in variable 'API_KEY'"),
            Finding::new(2, "Hardcoded secret in variable 'AuthToken'"),
            Finding::new(3, "Hardcoded secret in variable 'monkey'"),
        ]
    );
}

#[test]
fn any_literal_counts_not_only_strings() {
    assert_eq!(
        run_one(HardcodedSecret::default(), "secret = None\ntoken_ttl = 3600\n"),
        vec![
            Finding::new(1, "Hardcoded secret in variable 'secret'"),
            Finding::new(2, "Hardcoded secret in variable 'token_ttl'"),
        ]
    );
}

#[test]
fn every_target_of_a_chain_is_checked() {
    assert_eq!(
        run_one(HardcodedSecret::default(), "secret = password = user = 'x'\n"),
        vec![
            Finding::new(1, "Hardcoded secret in variable 'secret'"),
            Finding::new(1, "Hardcoded secret in variable 'password'"),
        ]
    );
}

#[test]
fn tuple_and_attribute_targets_are_ignored() {
    let src = "key, value = 'a', 'b'\n(secret, other) = 'xy'\nself.token = 'x'\ncfg['password'] = 'x'\n";
    assert!(run_one(HardcodedSecret::default(), src).is_empty());
}

#[test]
fn annotated_assignment_is_not_plain() {
    assert!(run_one(HardcodedSecret::default(), "api_key: str = 'abc'\n").is_empty());
}

#[test]
fn assignments_inside_functions_are_found() {
    let src = "def connect():\n    token = 'abc'\n    return token\n";
    assert_eq!(
        run_one(HardcodedSecret::default(), src),
        vec![Finding::new(2, "Hardcoded secret in variable 'token'")]
    );
}

#[test]
fn parenthesised_name_target_is_checked() {
    assert_eq!(
        run_one(HardcodedSecret::default(), "(secret) = 'x'\n"),
        vec![Finding::new(1, "Hardcoded secret in variable 'secret'")]
    );
}
