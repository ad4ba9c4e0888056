use crate::errors::{FriskError, FriskResult};
use crate::syntax::PyNode;
use once_cell::sync::Lazy;
use std::cell::RefCell;
use tree_sitter::{Language, Node, Tree};

static PYTHON: Lazy<Language> = Lazy::new(|| Language::from(tree_sitter_python::LANGUAGE));

thread_local! {
    static PARSER: RefCell<tree_sitter::Parser> = RefCell::new(tree_sitter::Parser::new());
}

/// Whether `node` is a Python-2 statement the grammar accepts but Python 3
/// rejects. `print >> f, x` still reads as a tuple expression there, so the
/// chevron form is accepted.
fn is_legacy_statement(node: Node<'_>) -> bool {
    match node.kind() {
        "print_statement" => {
            let mut cursor = node.walk();
            let has_chevron = node.named_children(&mut cursor).any(|c| c.kind() == "chevron");
            !has_chevron
        }
        "exec_statement" => true,
        _ => false,
    }
}

/// One parsed file. Owns its source so lowered nodes can borrow from it.
pub struct SyntaxTree {
    tree: Tree,
    source: String,
}

/// Parse `source` into a [`SyntaxTree`].
///
/// tree-sitter recovers from bad input instead of failing, so any error
/// or missing node left in the tree is turned into [`FriskError::Parse`].
pub fn parse(source: &str) -> FriskResult<SyntaxTree> {
    if source.contains('\0') {
        return Err(FriskError::Parse(
            "source code cannot contain null bytes".into(),
        ));
    }
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let tree = PARSER.with(|cell| {
        let mut parser = cell.borrow_mut();
        parser.set_language(&PYTHON)?;
        parser
            .parse(source, None)
            .ok_or_else(|| FriskError::Parse("parser produced no tree".into()))
    })?;

    if let Some(diagnostic) = first_syntax_error(tree.root_node(), source.as_bytes()) {
        return Err(FriskError::Parse(diagnostic));
    }

    Ok(SyntaxTree {
        tree,
        source: source.to_owned(),
    })
}

impl SyntaxTree {
    /// Pre-order, depth-first walk over every named node, children in
    /// source order, handing each lowered node to `f`.
    pub fn for_each_node<'t>(&'t self, mut f: impl FnMut(PyNode<'t>)) {
        let src = self.source.as_bytes();
        let mut stack = vec![self.tree.root_node()];
        while let Some(node) = stack.pop() {
            f(PyNode::lower(node, src));

            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
}

fn first_syntax_error(root: Node<'_>, src: &[u8]) -> Option<String> {
    if !root.has_error() && !contains_legacy_statement(root) {
        return None;
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let point = node.start_position();
        let (line, col) = (point.row + 1, point.column + 1);

        if node.is_missing() {
            return Some(format!("expected '{}' (line {line}, column {col})", node.kind()));
        }
        if node.is_error() || is_legacy_statement(node) {
            let near = node
                .utf8_text(src)
                .ok()
                .and_then(|t| t.split_whitespace().next())
                .map(|t| format!(" near '{t}'"))
                .unwrap_or_default();
            return Some(format!("invalid syntax{near} (line {line}, column {col})"));
        }

        // `children`, not `named_children`: MISSING tokens are often anonymous.
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    // has_error() was set but no node owned the error
    Some("invalid syntax".into())
}

fn contains_legacy_statement(root: Node<'_>) -> bool {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if is_legacy_statement(node) {
            return true;
        }
        let mut cursor = node.walk();
        stack.extend(node.named_children(&mut cursor));
    }
    false
}

#[test]
fn valid_source_parses() {
    let tree = parse("import os\n\ndef f(x):\n    return os.path.join(x, 'y')\n");
    assert!(tree.is_ok());
}

#[test]
fn empty_source_parses() {
    assert!(parse("").is_ok());
}

#[test]
fn broken_source_reports_a_located_diagnostic() {
    let err = match parse("def broken(:\n    pass\n") {
        Err(FriskError::Parse(msg)) => msg,
        Err(e) => panic!("unexpected error kind: {e}"),
        Ok(_) => panic!("broken source must not parse"),
    };
    assert!(err.contains("(line 1, column "), "diagnostic was: {err}");
}

#[test]
fn python2_print_statement_is_rejected() {
    assert!(matches!(parse("print 'hello'\n"), Err(FriskError::Parse(_))));
}

#[test]
fn print_chevron_is_valid_python3() {
    assert!(parse("import sys\nprint >> sys.stderr, 'x'\n").is_ok());
}

#[test]
fn chevron_print_keeps_the_rest_of_the_file_scannable() {
    let tree = parse("print >> f, eval(x)\n").unwrap();
    let mut calls = 0;
    tree.for_each_node(|n| {
        if let PyNode::Call { .. } = n {
            calls += 1;
        }
    });
    assert_eq!(calls, 1);
}

#[test]
fn null_bytes_are_rejected() {
    match parse("x = 1\0\n") {
        Err(FriskError::Parse(msg)) => assert_eq!(msg, "source code cannot contain null bytes"),
        _ => panic!("NUL must be a parse error"),
    }
}

#[test]
fn leading_bom_is_ignored() {
    assert!(parse("\u{feff}x = 1\n").is_ok());
}

#[test]
fn walk_is_preorder_in_source_order() {
    let tree = parse("eval(a)\nexec(b)\n").unwrap();
    let mut lines = Vec::new();
    tree.for_each_node(|n| {
        if let PyNode::Call { line, .. } = n {
            lines.push(line);
        }
    });
    assert_eq!(lines, vec![1, 2]);
}
