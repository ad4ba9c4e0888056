//! Typed view over the tree-sitter Python grammar.
//!
//! Detectors only ever see [`PyNode`]. Every grammar node is lowered into
//! one of its variants; shapes we do not care about become `Other`, so a
//! detector can match exhaustively and never has to deal with a node it
//! does not understand.

use tree_sitter::Node;

/// Constant value kinds, mirroring what Python folds into a constant node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
  Str,
  Bytes,
  Number,
  Bool,
  None,
  Ellipsis,
}

/// What sits in the `function` position of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee<'a> {
  /// `eval(...)`
  Name(&'a str),
  /// `subprocess.run(...)`, carrying only the final segment.
  Attribute(&'a str),
  /// Subscripts, call results, lambdas, ...
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
  Name(&'a str),
  /// Tuples, attributes, subscripts, starred targets.
  Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PyNode<'a> {
  Call {
    line: i64,
    callee: Callee<'a>,
  },
  BinaryOp {
    line: i64,
    operator: &'a str,
    left: Option<Literal>,
    right: Option<Literal>,
  },
  /// Plain `=` statement. A chain `a = b = v` is a single node with every target.
  Assign {
    line: i64,
    targets: Vec<Target<'a>>,
    value: Option<Literal>,
  },
  Other,
}

impl<'a> PyNode<'a> {
  pub fn lower(node: Node<'a>, src: &'a [u8]) -> Self {
    match node.kind() {
      "call" => PyNode::Call {
        line: line_of(node),
        callee: node
          .child_by_field_name("function")
          .map(|f| lower_callee(f, src))
          .unwrap_or(Callee::Other),
      },
      "binary_operator" => PyNode::BinaryOp {
        line: line_of(node),
        operator: node
          .child_by_field_name("operator")
          .map(|op| op.kind())
          .unwrap_or_default(),
        left: node.child_by_field_name("left").and_then(|n| literal(n, src)),
        right: node.child_by_field_name("right").and_then(|n| literal(n, src)),
      },
      "assignment" => lower_assignment(node, src).unwrap_or(PyNode::Other),
      _ => PyNode::Other,
    }
  }
}

/// 1-based source line of a node.
pub fn line_of(node: Node<'_>) -> i64 {
  node.start_position().row as i64 + 1
}

/// Strip redundant parentheses: `((x))` → `x`.
fn unparen(mut node: Node<'_>) -> Node<'_> {
  while node.kind() == "parenthesized_expression" {
    let mut cursor = node.walk();
    let inner = node
      .named_children(&mut cursor)
      .find(|c| c.kind() != "comment");
    match inner {
      Some(inner) => node = inner,
      None => break,
    }
  }
  node
}

fn lower_callee<'a>(func: Node<'a>, src: &'a [u8]) -> Callee<'a> {
  let func = unparen(func);
  match func.kind() {
    "identifier" => func
      .utf8_text(src)
      .map(Callee::Name)
      .unwrap_or(Callee::Other),
    "attribute" => func
      .child_by_field_name("attribute")
      .and_then(|a| a.utf8_text(src).ok())
      .map(Callee::Attribute)
      .unwrap_or(Callee::Other),
    _ => Callee::Other,
  }
}

fn lower_assignment<'a>(node: Node<'a>, src: &'a [u8]) -> Option<PyNode<'a>> {
  // The inner links of a chain are folded into the outermost assignment.
  if node.parent().is_some_and(|p| p.kind() == "assignment") {
    return None;
  }

  let mut targets = Vec::new();
  let mut cur = node;
  loop {
    // `x: int = 1` is an annotated assignment, not a plain one.
    if cur.child_by_field_name("type").is_some() {
      return None;
    }
    let left = cur.child_by_field_name("left")?;
    targets.push(lower_target(left, src));

    let right = cur.child_by_field_name("right")?;
    if right.kind() == "assignment" {
      cur = right;
      continue;
    }
    return Some(PyNode::Assign {
      line: line_of(node),
      targets,
      value: literal(right, src),
    });
  }
}

fn lower_target<'a>(node: Node<'a>, src: &'a [u8]) -> Target<'a> {
  match node.kind() {
    "identifier" => node.utf8_text(src).map(Target::Name).unwrap_or(Target::Other),
    // `(secret) = v` names one target; `(secret,) = v` is a tuple
    "tuple_pattern" | "parenthesized_expression" => {
      let mut cursor = node.walk();
      let children: Vec<_> = node.children(&mut cursor).collect();
      if children.iter().any(|c| c.kind() == ",") {
        return Target::Other;
      }
      let named: Vec<_> = children
        .into_iter()
        .filter(|c| c.is_named() && c.kind() != "comment")
        .collect();
      match named.as_slice() {
        [inner] => lower_target(*inner, src),
        _ => Target::Other,
      }
    }
    _ => Target::Other,
  }
}

/// Classify `node` as a constant, looking through redundant parentheses.
pub fn literal(node: Node<'_>, src: &[u8]) -> Option<Literal> {
  match node.kind() {
    "string" => string_literal(node, src),
    "concatenated_string" => {
      let mut cursor = node.walk();
      // a single f-string part turns the whole thing into a formatted string
      let parts = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "string")
        .map(|c| string_literal(c, src))
        .collect::<Option<Vec<_>>>()?;
      if !parts.is_empty() && parts.iter().all(|l| *l == Literal::Bytes) {
        Some(Literal::Bytes)
      } else {
        Some(Literal::Str)
      }
    }
    "integer" | "float" => Some(Literal::Number),
    "true" | "false" => Some(Literal::Bool),
    "none" => Some(Literal::None),
    "ellipsis" => Some(Literal::Ellipsis),
    "parenthesized_expression" => {
      let inner = unparen(node);
      if inner.kind() == "parenthesized_expression" {
        return None;
      }
      literal(inner, src)
    }
    _ => None,
  }
}

fn string_literal(node: Node<'_>, src: &[u8]) -> Option<Literal> {
  let text = node.utf8_text(src).ok()?;
  let prefix = text
    .chars()
    .take_while(|c| *c != '"' && *c != '\'')
    .collect::<String>()
    .to_ascii_lowercase();

  if prefix.contains('f') {
    None
  } else if prefix.contains('b') {
    Some(Literal::Bytes)
  } else {
    Some(Literal::Str)
  }
}

#[cfg(test)]
fn lowered(source: &str) -> Vec<String> {
  let tree = crate::ast::parse(source).expect("fixture parses");
  let mut seen = Vec::new();
  tree.for_each_node(|n| {
    if n != PyNode::Other {
      seen.push(format!("{n:?}"));
    }
  });
  seen
}

#[test]
fn call_callees_are_classified_by_shape() {
  let tree = crate::ast::parse("eval(x)\nos.path.join(a)\nfns[0](y)\n").unwrap();
  let mut calls = Vec::new();
  tree.for_each_node(|n| {
    if let PyNode::Call { .. } = n {
      calls.push(n);
    }
  });
  assert_eq!(
    calls,
    vec![
      PyNode::Call { line: 1, callee: Callee::Name("eval") },
      PyNode::Call { line: 2, callee: Callee::Attribute("join") },
      PyNode::Call { line: 3, callee: Callee::Other },
    ]
  );
}

#[test]
fn parenthesised_callees_are_looked_through() {
  let tree = crate::ast::parse("(eval)(x)\n((subprocess.run))(c)\n").unwrap();
  let mut calls = Vec::new();
  tree.for_each_node(|n| {
    if let PyNode::Call { .. } = n {
      calls.push(n);
    }
  });
  assert_eq!(
    calls,
    vec![
      PyNode::Call { line: 1, callee: Callee::Name("eval") },
      PyNode::Call { line: 2, callee: Callee::Attribute("run") },
    ]
  );
}

#[test]
fn parenthesised_name_target_is_a_name() {
  assert_eq!(
    lowered("(secret) = 'x'\n"),
    vec![format!(
      "{:?}",
      PyNode::Assign { line: 1, targets: vec![Target::Name("secret")], value: Some(Literal::Str) }
    )]
  );
  assert_eq!(
    lowered("(secret,) = 'x'\n"),
    vec![format!(
      "{:?}",
      PyNode::Assign { line: 1, targets: vec![Target::Other], value: Some(Literal::Str) }
    )]
  );
}

#[test]
fn binary_operands_keep_only_literal_kinds() {
  let tree = crate::ast::parse("q = 'a' + b\nn = x - 1\n").unwrap();
  let mut ops = Vec::new();
  tree.for_each_node(|n| {
    if let PyNode::BinaryOp { .. } = n {
      ops.push(n);
    }
  });
  assert_eq!(
    ops,
    vec![
      PyNode::BinaryOp { line: 1, operator: "+", left: Some(Literal::Str), right: None },
      PyNode::BinaryOp { line: 2, operator: "-", left: None, right: Some(Literal::Number) },
    ]
  );
}

#[test]
fn literal_kinds() {
  let cases = [
    ("x = 'a'", Some(Literal::Str)),
    ("x = b'a'", Some(Literal::Bytes)),
    ("x = rb'a'", Some(Literal::Bytes)),
    ("x = f'{a}'", None),
    ("x = f'plain'", None),
    ("x = 'a' 'b'", Some(Literal::Str)),
    ("x = 'a' f'{b}'", None),
    ("x = 42", Some(Literal::Number)),
    ("x = 4.2", Some(Literal::Number)),
    ("x = True", Some(Literal::Bool)),
    ("x = None", Some(Literal::None)),
    ("x = ...", Some(Literal::Ellipsis)),
    ("x = ('a')", Some(Literal::Str)),
    ("x = -1", None),
    ("x = ('a', 'b')", None),
    ("x = y", None),
  ];
  for (src, expected) in cases {
    let tree = crate::ast::parse(src).unwrap();
    let mut value = None;
    tree.for_each_node(|n| {
      if let PyNode::Assign { value: v, .. } = n {
        value = Some(v);
      }
    });
    assert_eq!(value, Some(expected), "case: {src}");
  }
}

#[test]
fn chained_assignment_is_one_node_with_every_target() {
  let tree = crate::ast::parse("a = b = 'x'\n").unwrap();
  let mut assigns = Vec::new();
  tree.for_each_node(|n| {
    if let PyNode::Assign { .. } = n {
      assigns.push(n);
    }
  });
  assert_eq!(
    assigns,
    vec![PyNode::Assign {
      line: 1,
      targets: vec![Target::Name("a"), Target::Name("b")],
      value: Some(Literal::Str),
    }]
  );
}

#[test]
fn annotated_and_augmented_assignments_are_not_plain() {
  assert!(lowered("key: str = 'x'\ntoken += 'y'\n").is_empty());
}

#[test]
fn tuple_targets_are_not_unpacked() {
  assert_eq!(
    lowered("a, b = 'x'\n"),
    vec![format!(
      "{:?}",
      PyNode::Assign { line: 1, targets: vec![Target::Other], value: Some(Literal::Str) }
    )]
  );
}
