use crate::detectors::Detector;
use crate::report::Finding;
use crate::syntax::{Literal, PyNode};

const MESSAGE: &str = "Possible SQL injection risk due to string concatenation";

/// Flags `+` where an immediate operand is a string literal.
///
/// Only the two direct operands are looked at; `a + b` between two
/// variables never triggers, whatever their runtime types.
#[derive(Debug, Default)]
pub struct UnsafeConcatenation {
    findings: Vec<Finding>,
}

impl Detector for UnsafeConcatenation {
    fn name(&self) -> &'static str {
        "unsafe_concatenation"
    }

    fn visit(&mut self, node: &PyNode<'_>) {
        match node {
            PyNode::BinaryOp {
                line,
                operator: "+",
                left,
                right,
            } if *left == Some(Literal::Str) || *right == Some(Literal::Str) => {
                self.findings.push(Finding::new(*line, MESSAGE));
            }
            PyNode::BinaryOp { .. } | PyNode::Call { .. } | PyNode::Assign { .. } | PyNode::Other => {}
        }
    }

    fn finish(self: Box<Self>) -> Vec<Finding> {
        self.findings
    }
}

#[cfg(test)]
use crate::detectors::run_one;

#[test]
fn literal_prefix_concatenation_is_flagged() {
    let src = "import db\n\nquery = \"SELECT * FROM t WHERE id=\" + user_id\n";
    assert_eq!(
        run_one(UnsafeConcatenation::default(), src),
        vec![Finding::new(3, MESSAGE)]
    );
}

#[test]
fn literal_suffix_concatenation_is_flagged() {
    assert_eq!(
        run_one(UnsafeConcatenation::default(), "q = where + ' LIMIT 1'\n"),
        vec![Finding::new(1, MESSAGE)]
    );
}

#[test]
fn two_variables_do_not_trigger() {
    assert!(run_one(UnsafeConcatenation::default(), "q = base + clause\n").is_empty());
}

#[test]
fn non_string_literals_do_not_trigger() {
    let src = "n = count + 1\nb = data + b'\\x00'\nz = x + None\n";
    assert!(run_one(UnsafeConcatenation::default(), src).is_empty());
}

#[test]
fn other_operators_do_not_trigger() {
    assert!(run_one(UnsafeConcatenation::default(), "s = 'id=%s' % user_id\n").is_empty());
}

#[test]
fn fstrings_are_not_literals() {
    assert!(run_one(UnsafeConcatenation::default(), "q = f'SELECT {x}' + tail\n").is_empty());
}

#[test]
fn only_immediate_operands_are_inspected() {
    // parsed as ('a' + b) + c: the inner node triggers, the outer does not
    assert_eq!(
        run_one(UnsafeConcatenation::default(), "q = 'a' + b + c\n"),
        vec![Finding::new(1, MESSAGE)]
    );
}

#[test]
fn concatenation_inside_calls_is_found() {
    let src = "cursor.execute(\n    \"DELETE FROM t WHERE id=\" + ident\n)\n";
    assert_eq!(
        run_one(UnsafeConcatenation::default(), src),
        vec![Finding::new(2, MESSAGE)]
    );
}
