use crate::detectors::Detector;
use crate::report::Finding;
use crate::syntax::{Callee, PyNode};
use phf::{Set, phf_set};

/// Dynamic evaluation, flagged even when called by bare name.
static EVAL_CALLS: Set<&'static str> = phf_set! { "eval", "exec" };

/// Subprocess entry points, flagged only when qualified (`subprocess.run`).
static SUBPROCESS_CALLS: Set<&'static str> = phf_set! { "Popen", "call", "run" };

/// Flags `eval`/`exec` and qualified `Popen`/`call`/`run` calls.
#[derive(Debug, Default)]
pub struct DangerousCall {
    findings: Vec<Finding>,
}

impl Detector for DangerousCall {
    fn name(&self) -> &'static str {
        "dangerous_call"
    }

    fn visit(&mut self, node: &PyNode<'_>) {
        let PyNode::Call { line, callee } = node else {
            return;
        };
        let (name, qualified) = match *callee {
            Callee::Name(name) => (name, false),
            Callee::Attribute(name) => (name, true),
            Callee::Other => return,
        };

        if EVAL_CALLS.contains(name) {
            self.findings
                .push(Finding::new(*line, format!("Use of dangerous call: {name}()")));
        }
        if qualified && SUBPROCESS_CALLS.contains(name) {
            self.findings.push(Finding::new(
                *line,
                format!("Potential unsafe subprocess usage: {name}"),
            ));
        }
    }

    fn finish(self: Box<Self>) -> Vec<Finding> {
        self.findings
    }
}

#[cfg(test)]
use crate::detectors::run_one;

#[test]
fn bare_exec_is_flagged_on_its_line() {
    let src = "import sys\n\n\nuser_input = sys.argv[1]\nexec(user_input)\n";
    assert_eq!(
        run_one(DangerousCall::default(), src),
        vec![Finding::new(5, "Use of dangerous call: exec()")]
    );
}

#[test]
fn qualified_eval_is_flagged_too() {
    assert_eq!(
        run_one(DangerousCall::default(), "builtins.eval(s)\n"),
        vec![Finding::new(1, "Use of dangerous call: eval()")]
    );
}

#[test]
fn qualified_subprocess_run_is_flagged() {
    let src = format!("{}subprocess.run(cmd)\n", "\n".repeat(9));
    assert_eq!(
        run_one(DangerousCall::default(), &src),
        vec![Finding::new(10, "Potential unsafe subprocess usage: run")]
    );
}

#[test]
fn bare_run_is_not_flagged() {
    let src = format!("{}run(cmd)\n", "\n".repeat(9));
    assert!(run_one(DangerousCall::default(), &src).is_empty());
}

#[test]
fn popen_and_call_need_a_qualifier() {
    let src = "Popen(a)\ncall(b)\nsp.Popen(a)\nsp.call(b)\n";
    assert_eq!(
        run_one(DangerousCall::default(), src),
        vec![
            Finding::new(3, "Potential unsafe subprocess usage: Popen"),
            Finding::new(4, "Potential unsafe subprocess usage: call"),
        ]
    );
}

#[test]
fn unrelated_and_odd_callees_are_ignored() {
    let src = "print(x)\nhandlers[0](x)\nget_fn()(x)\n(lambda: 1)()\nevaluate(x)\n";
    assert!(run_one(DangerousCall::default(), src).is_empty());
}

#[test]
fn nested_calls_are_reported_outer_first() {
    assert_eq!(
        run_one(DangerousCall::default(), "eval(compile(exec(s), 'f', 'exec'))\n"),
        vec![
            Finding::new(1, "Use of dangerous call: eval()"),
            Finding::new(1, "Use of dangerous call: exec()"),
        ]
    );
}

#[test]
fn parenthesised_callees_are_still_flagged() {
    assert_eq!(
        run_one(DangerousCall::default(), "(eval)(x)\n(subprocess.run)(c)\n"),
        vec![
            Finding::new(1, "Use of dangerous call: eval()"),
            Finding::new(2, "Potential unsafe subprocess usage: run"),
        ]
    );
}
