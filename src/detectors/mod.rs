mod concatenation;
mod dangerous_call;
mod hardcoded_secret;

pub use concatenation::UnsafeConcatenation;
pub use dangerous_call::DangerousCall;
pub use hardcoded_secret::HardcodedSecret;

use crate::ast::SyntaxTree;
use crate::report::Finding;
use crate::syntax::PyNode;

/// A single-responsibility rule run over one file's tree.
///
/// Instances are per file: build them with [`fresh`], feed every node
/// through [`Detector::visit`], then consume them with [`Detector::finish`].
pub trait Detector {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Inspect one node. Must be total: unexpected shapes yield no finding.
    fn visit(&mut self, node: &PyNode<'_>);

    /// Hand over everything found, in traversal order.
    fn finish(self: Box<Self>) -> Vec<Finding>;
}

/// One new instance of every detector, in reporting order.
pub fn fresh() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(DangerousCall::default()),
        Box::new(UnsafeConcatenation::default()),
        Box::new(HardcodedSecret::default()),
    ]
}

/// Run `detector` over the whole tree exactly once.
pub fn run(mut detector: Box<dyn Detector>, tree: &SyntaxTree) -> Vec<Finding> {
    tree.for_each_node(|node| detector.visit(&node));
    detector.finish()
}

/// Parse `src` and run a single detector over it.
#[cfg(test)]
pub(crate) fn run_one(detector: impl Detector + 'static, src: &str) -> Vec<Finding> {
    let tree = crate::ast::parse(src).expect("fixture parses");
    run(Box::new(detector), &tree)
}

#[test]
fn fresh_detectors_come_in_reporting_order() {
    let names: Vec<_> = fresh().iter().map(|d| d.name()).collect();
    assert_eq!(
        names,
        vec!["dangerous_call", "unsafe_concatenation", "hardcoded_secret"]
    );
}

#[test]
fn fresh_detectors_start_empty() {
    for d in fresh() {
        assert!(d.finish().is_empty());
    }
}
