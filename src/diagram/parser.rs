//! Parser for the diagram mini-language.
//!
//! Accepts the two Mermaid forms the analysis prompt asks for: `mindmap`
//! (an indentation tree of concepts) and flowcharts (`graph TD` / `graph
//! LR` / `flowchart …` with nodes and directed edges). The source text
//! comes from a third-party model and is treated as untrusted: parsing is
//! defensive and every failure is a typed [`RenderError`], never a panic.
//!
//! Lines the renderer cannot draw but Mermaid would tolerate (`%%`
//! comments, `classDef`, `style`, `subgraph`/`end`, `click`) are skipped so
//! a diagram using them still renders its nodes and edges.

use crate::error::RenderError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// A parsed diagram, ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagram {
    Mindmap(MindNode),
    Flow(FlowGraph),
}

/// One node of a mindmap tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MindNode {
    pub label: String,
    pub children: Vec<MindNode>,
}

/// Direction of a flowchart's primary axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    TopDown,
    LeftRight,
}

/// Visual shape of a flowchart node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeShape {
    #[default]
    Rect,
    Rounded,
    Diamond,
    Circle,
}

/// Visual style of a flowchart edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    /// `-->` — solid with arrowhead.
    Arrow,
    /// `---` — solid, no arrowhead.
    Open,
    /// `-.->` — dotted with arrowhead.
    Dotted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

/// A directed edge between node indices in [`FlowGraph::nodes`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    pub from: usize,
    pub to: usize,
    pub label: Option<String>,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowGraph {
    pub direction: FlowDirection,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// Parse a diagram description.
pub fn parse(source: &str) -> Result<Diagram, RenderError> {
    let lines: Vec<(usize, &str)> = strip_fences(source)
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| {
            let t = l.trim();
            !t.is_empty() && !t.starts_with("%%")
        })
        .collect();

    let Some(&(_, header)) = lines.first() else {
        return Err(RenderError::Empty);
    };
    let header = header.trim();

    if header == "mindmap" {
        parse_mindmap(&lines[1..]).map(Diagram::Mindmap)
    } else if let Some(direction) = parse_flow_header(header) {
        parse_flow(direction, &lines[1..]).map(Diagram::Flow)
    } else {
        Err(RenderError::UnknownDiagramType {
            header: header.chars().take(40).collect(),
        })
    }
}

/// Strip a wrapping ```` ```mermaid ```` fence, if the model fenced the
/// source despite instructions.
fn strip_fences(source: &str) -> &str {
    let trimmed = source.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    match body.split_once('\n') {
        Some((_, content)) => content,
        None => body,
    }
}

fn parse_flow_header(header: &str) -> Option<FlowDirection> {
    let mut tokens = header.split_whitespace();
    match tokens.next()? {
        "graph" | "flowchart" => {}
        _ => return None,
    }
    Some(match tokens.next() {
        Some("LR") | Some("RL") => FlowDirection::LeftRight,
        // TD, TB, BT, or no direction token at all
        _ => FlowDirection::TopDown,
    })
}

// ── Mindmap ──────────────────────────────────────────────────────────────

fn parse_mindmap(lines: &[(usize, &str)]) -> Result<MindNode, RenderError> {
    // Stack of (indent, node); deeper lines attach to the nearest shallower
    // ancestor when popped.
    let mut stack: Vec<(usize, MindNode)> = Vec::new();

    for &(line_no, raw) in lines {
        let indent = raw.len() - raw.trim_start().len();
        let label = clean_mindmap_label(raw.trim());
        if label.is_empty() {
            return Err(RenderError::Syntax {
                line: line_no,
                detail: "empty mindmap node".into(),
            });
        }
        let node = MindNode {
            label,
            children: Vec::new(),
        };

        if stack.is_empty() {
            stack.push((indent, node));
            continue;
        }

        while stack.len() > 1 && stack[stack.len() - 1].0 >= indent {
            let (_, done) = stack.pop().expect("stack has > 1 entry");
            stack
                .last_mut()
                .expect("parent remains after pop")
                .1
                .children
                .push(done);
        }

        if stack[stack.len() - 1].0 >= indent {
            // Sibling of the root: mindmaps have exactly one root.
            return Err(RenderError::Syntax {
                line: line_no,
                detail: "mindmap has more than one root".into(),
            });
        }
        stack.push((indent, node));
    }

    let mut root = match stack.pop() {
        Some((_, node)) => node,
        None => return Err(RenderError::Empty),
    };
    while let Some((_, mut parent)) = stack.pop() {
        parent.children.push(root);
        root = parent;
    }
    Ok(root)
}

/// Unwrap Mermaid mindmap shape markup down to the plain label.
///
/// Handles both the bare forms (`((x))`, `(x)`, `[x]`, `"x"`) and the
/// id-prefixed form (`root((x))`).
fn clean_mindmap_label(text: &str) -> String {
    for (open, close) in [("((", "))"), ("[", "]"), ("(", ")"), ("\"", "\"")] {
        if let Some(start) = text.find(open) {
            let candidate = &text[start..];
            if let Some(inner) = candidate.strip_prefix(open).and_then(|r| r.strip_suffix(close)) {
                return inner.trim().trim_matches('"').trim().to_string();
            }
        }
    }
    text.trim().trim_matches('"').trim().to_string()
}

// ── Flowchart ────────────────────────────────────────────────────────────

/// Edge operator with optional `|label|` following it.
static EDGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*(-\.->|-->|---|==>)(?:\|([^|]*)\|)?\s*").expect("edge regex compiles")
});

/// A node token: identifier plus optional shape text.
static NODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^([A-Za-z0-9_.-]+)\s*(\(\(.*\)\)|\[.*\]|\(.*\)|\{.*\})?$"#)
        .expect("node regex compiles")
});

/// Keywords the renderer skips rather than rejects.
fn is_ignorable(line: &str) -> bool {
    let first = line.split_whitespace().next().unwrap_or("");
    matches!(
        first,
        "subgraph" | "end" | "classDef" | "class" | "style" | "linkStyle" | "click" | "direction"
    )
}

fn parse_flow(
    direction: FlowDirection,
    lines: &[(usize, &str)],
) -> Result<FlowGraph, RenderError> {
    let mut graph = FlowGraph {
        direction,
        nodes: Vec::new(),
        edges: Vec::new(),
    };
    let mut index: HashMap<String, usize> = HashMap::new();

    for &(line_no, raw) in lines {
        let line = raw.trim();
        if is_ignorable(line) {
            continue;
        }

        // Split "A[Start] -->|yes| B --> C" into node tokens and the edge
        // operators between them.
        let tokens: Vec<&str> = EDGE_RE.split(line).collect();
        let links: Vec<(EdgeStyle, Option<String>)> = EDGE_RE
            .captures_iter(line)
            .map(|c| {
                let style = match &c[1] {
                    "-.->" => EdgeStyle::Dotted,
                    "---" => EdgeStyle::Open,
                    _ => EdgeStyle::Arrow,
                };
                let label = c
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|l| !l.is_empty());
                (style, label)
            })
            .collect();

        if tokens.len() != links.len() + 1 {
            return Err(RenderError::Syntax {
                line: line_no,
                detail: "dangling edge operator".into(),
            });
        }

        let mut ids = Vec::with_capacity(tokens.len());
        for token in tokens {
            ids.push(intern_node(token.trim(), line_no, &mut graph, &mut index)?);
        }
        for (i, (style, label)) in links.into_iter().enumerate() {
            graph.edges.push(FlowEdge {
                from: ids[i],
                to: ids[i + 1],
                label,
                style,
            });
        }
    }

    if graph.nodes.is_empty() {
        return Err(RenderError::Empty);
    }
    Ok(graph)
}

/// Parse one node token and return its index, creating it on first sight.
///
/// A later definition with explicit shape text refines a node first seen as
/// a bare reference; a bare reference never clobbers an earlier label.
fn intern_node(
    token: &str,
    line_no: usize,
    graph: &mut FlowGraph,
    index: &mut HashMap<String, usize>,
) -> Result<usize, RenderError> {
    let caps = NODE_RE.captures(token).ok_or_else(|| RenderError::Syntax {
        line: line_no,
        detail: format!("unrecognized node '{}'", token.chars().take(30).collect::<String>()),
    })?;

    let id = caps[1].to_string();
    let decorated = caps.get(2).map(|m| m.as_str());
    let (label, shape) = match decorated {
        Some(d) => decode_shape(d),
        None => (id.clone(), NodeShape::default()),
    };

    if let Some(&idx) = index.get(&id) {
        if decorated.is_some() {
            graph.nodes[idx].label = label;
            graph.nodes[idx].shape = shape;
        }
        return Ok(idx);
    }
    let idx = graph.nodes.len();
    graph.nodes.push(FlowNode { id: id.clone(), label, shape });
    index.insert(id, idx);
    Ok(idx)
}

fn decode_shape(decorated: &str) -> (String, NodeShape) {
    let inner = |s: &str, open: &str, close: &str| {
        s.strip_prefix(open)
            .and_then(|r| r.strip_suffix(close))
            .map(|i| i.trim().trim_matches('"').to_string())
    };
    if let Some(label) = inner(decorated, "((", "))") {
        (label, NodeShape::Circle)
    } else if let Some(label) = inner(decorated, "[", "]") {
        (label, NodeShape::Rect)
    } else if let Some(label) = inner(decorated, "{", "}") {
        (label, NodeShape::Diamond)
    } else if let Some(label) = inner(decorated, "(", ")") {
        (label, NodeShape::Rounded)
    } else {
        (decorated.to_string(), NodeShape::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_header() {
        let err = parse("not a real diagram").unwrap_err();
        assert!(matches!(err, RenderError::UnknownDiagramType { .. }));
    }

    #[test]
    fn rejects_empty_source() {
        assert!(matches!(parse("   \n  "), Err(RenderError::Empty)));
        assert!(matches!(parse("%% only a comment"), Err(RenderError::Empty)));
    }

    #[test]
    fn parses_basic_mindmap() {
        let source = "mindmap\n  root((Transformers))\n    Attention\n      Multi-head\n    Training\n";
        let Diagram::Mindmap(root) = parse(source).unwrap() else {
            panic!("expected mindmap");
        };
        assert_eq!(root.label, "Transformers");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].label, "Attention");
        assert_eq!(root.children[0].children[0].label, "Multi-head");
        assert_eq!(root.children[1].label, "Training");
    }

    #[test]
    fn mindmap_strips_shape_markup() {
        assert_eq!(clean_mindmap_label("((Core Idea))"), "Core Idea");
        assert_eq!(clean_mindmap_label("root((Core Idea))"), "Core Idea");
        assert_eq!(clean_mindmap_label("[Square]"), "Square");
        assert_eq!(clean_mindmap_label("(Rounded)"), "Rounded");
        assert_eq!(clean_mindmap_label("\"Quoted\""), "Quoted");
        assert_eq!(clean_mindmap_label("Plain"), "Plain");
    }

    #[test]
    fn mindmap_with_two_roots_is_an_error() {
        let source = "mindmap\n  First\n  Second\n";
        assert!(matches!(parse(source), Err(RenderError::Syntax { .. })));
    }

    #[test]
    fn parses_graph_td_with_chain_and_labels() {
        let source = "graph TD\n  A[Start] -->|yes| B(Review) --> C{Decision}\n  C -.-> D((Done))\n";
        let Diagram::Flow(graph) = parse(source).unwrap() else {
            panic!("expected flow");
        };
        assert_eq!(graph.direction, FlowDirection::TopDown);
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.edges.len(), 3);
        assert_eq!(graph.nodes[0].label, "Start");
        assert_eq!(graph.nodes[1].shape, NodeShape::Rounded);
        assert_eq!(graph.nodes[2].shape, NodeShape::Diamond);
        assert_eq!(graph.nodes[3].shape, NodeShape::Circle);
        assert_eq!(graph.edges[0].label.as_deref(), Some("yes"));
        assert_eq!(graph.edges[2].style, EdgeStyle::Dotted);
    }

    #[test]
    fn flowchart_lr_sets_direction() {
        let Diagram::Flow(graph) = parse("flowchart LR\n  A --> B\n").unwrap() else {
            panic!("expected flow");
        };
        assert_eq!(graph.direction, FlowDirection::LeftRight);
    }

    #[test]
    fn later_definition_refines_bare_reference() {
        let source = "graph TD\n  A --> B\n  B[Proper Label] --> C\n";
        let Diagram::Flow(graph) = parse(source).unwrap() else {
            panic!("expected flow");
        };
        assert_eq!(graph.nodes[1].label, "Proper Label");
        // but a bare re-reference keeps it
        assert_eq!(graph.nodes.len(), 3);
    }

    #[test]
    fn skips_styling_lines() {
        let source = "graph TD\n  classDef red fill:#f00\n  A --> B\n  style A fill:#fff\n";
        let Diagram::Flow(graph) = parse(source).unwrap() else {
            panic!("expected flow");
        };
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn dangling_operator_is_syntax_error() {
        let err = parse("graph TD\n  A -->\n").unwrap_err();
        assert!(matches!(err, RenderError::Syntax { .. }));
    }

    #[test]
    fn fenced_source_is_unwrapped() {
        let source = "```mermaid\ngraph TD\nA --> B\n```";
        assert!(matches!(parse(source), Ok(Diagram::Flow(_))));
    }
}
