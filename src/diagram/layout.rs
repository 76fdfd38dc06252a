//! Geometry for parsed diagrams.
//!
//! Text metrics are approximated (average glyph width × length) rather than
//! measured — good enough for concise node labels, and it keeps the
//! renderer free of font dependencies. Mindmaps are laid out as
//! left-to-right trees with one row per leaf; flowcharts as layered ranks
//! along the declared axis.

use crate::diagram::parser::{
    Diagram, EdgeStyle, FlowDirection, FlowGraph, MindNode, NodeShape,
};

pub const FONT_SIZE: f32 = 13.0;
const CHAR_WIDTH: f32 = 7.2;
const NODE_HEIGHT: f32 = 34.0;
const NODE_PAD_X: f32 = 14.0;
const MARGIN: f32 = 24.0;

// Mindmap spacing
const ROW_HEIGHT: f32 = 48.0;
const LEVEL_WIDTH: f32 = 200.0;

// Flowchart spacing
const RANK_GAP: f32 = 72.0;
const SIBLING_GAP: f32 = 28.0;

/// A node with its final position (`x`, `y` is the top-left corner).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: String,
    pub shape: NodeShape,
}

/// An edge as a polyline between placed nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEdge {
    pub points: Vec<(f32, f32)>,
    pub label: Option<String>,
    pub arrow: bool,
    pub dotted: bool,
}

/// The complete scene handed to the SVG emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<PlacedNode>,
    pub edges: Vec<PlacedEdge>,
}

/// Estimated pixel width of a node drawn for `label`.
fn node_width(label: &str) -> f32 {
    (label.chars().count().max(2) as f32) * CHAR_WIDTH + 2.0 * NODE_PAD_X
}

/// Compute positions for every node and edge of the diagram.
pub fn compute_layout(diagram: &Diagram) -> Layout {
    match diagram {
        Diagram::Mindmap(root) => layout_mindmap(root),
        Diagram::Flow(graph) => layout_flow(graph),
    }
}

// ── Mindmap ──────────────────────────────────────────────────────────────

fn leaf_count(node: &MindNode) -> usize {
    if node.children.is_empty() {
        1
    } else {
        node.children.iter().map(leaf_count).sum()
    }
}

fn layout_mindmap(root: &MindNode) -> Layout {
    let mut layout = Layout {
        width: 0.0,
        height: leaf_count(root) as f32 * ROW_HEIGHT + 2.0 * MARGIN,
        nodes: Vec::new(),
        edges: Vec::new(),
    };
    let mut next_row = 0usize;
    place_mind_node(root, 0, &mut next_row, &mut layout);

    for node in &layout.nodes {
        layout.width = layout.width.max(node.x + node.width + MARGIN);
    }
    layout
}

/// Recursive placement; returns the index of the placed node so the parent
/// can draw a connector to it.
fn place_mind_node(
    node: &MindNode,
    depth: usize,
    next_row: &mut usize,
    layout: &mut Layout,
) -> usize {
    let x = MARGIN + depth as f32 * LEVEL_WIDTH;
    let width = node_width(&node.label);

    // Reserve our slot, then place children to learn our vertical center.
    let index = layout.nodes.len();
    layout.nodes.push(PlacedNode {
        x,
        y: 0.0,
        width,
        height: NODE_HEIGHT,
        label: node.label.clone(),
        shape: if depth == 0 { NodeShape::Circle } else { NodeShape::Rounded },
    });

    let center_y = if node.children.is_empty() {
        let y = MARGIN + (*next_row as f32 + 0.5) * ROW_HEIGHT;
        *next_row += 1;
        y
    } else {
        let mut child_centers = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let child_index = place_mind_node(child, depth + 1, next_row, layout);
            child_centers.push((
                child_index,
                layout.nodes[child_index].y + NODE_HEIGHT / 2.0,
            ));
        }
        for &(child_index, child_center) in &child_centers {
            let child = &layout.nodes[child_index];
            layout.edges.push(PlacedEdge {
                points: vec![
                    (x + width, 0.0), // parent y patched below
                    (child.x, child_center),
                ],
                label: None,
                arrow: false,
                dotted: false,
            });
        }
        child_centers.iter().map(|&(_, c)| c).sum::<f32>() / child_centers.len() as f32
    };

    layout.nodes[index].y = center_y - NODE_HEIGHT / 2.0;

    // Patch the connector start points now that our center is known.
    let edge_start = layout.edges.len() - node.children.len();
    for edge in &mut layout.edges[edge_start..] {
        edge.points[0].1 = center_y;
    }
    index
}

// ── Flowchart ────────────────────────────────────────────────────────────

/// Assign a layer to every node: sources sit at rank 0 and each edge pushes
/// its target below its source. Passes are bounded by the node count, so
/// cycles terminate with a stable (if imperfect) ranking.
fn assign_ranks(graph: &FlowGraph) -> Vec<usize> {
    let mut rank = vec![0usize; graph.nodes.len()];
    for _ in 0..graph.nodes.len() {
        let mut changed = false;
        for edge in &graph.edges {
            if rank[edge.to] < rank[edge.from] + 1 && rank[edge.from] + 1 < graph.nodes.len() {
                rank[edge.to] = rank[edge.from] + 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    rank
}

fn layout_flow(graph: &FlowGraph) -> Layout {
    let ranks = assign_ranks(graph);
    let rank_count = ranks.iter().copied().max().unwrap_or(0) + 1;

    // Nodes per rank, in insertion order (the order the model wrote them).
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (i, &r) in ranks.iter().enumerate() {
        layers[r].push(i);
    }

    let widths: Vec<f32> = graph.nodes.iter().map(|n| node_width(&n.label)).collect();
    let max_node_width = widths.iter().cloned().fold(0.0f32, f32::max);

    // Span of each layer along the cross axis (x for top-down, y for
    // left-right), used to center layers against the widest one.
    let cross_extent = |i: usize| match graph.direction {
        FlowDirection::TopDown => widths[i],
        FlowDirection::LeftRight => NODE_HEIGHT,
    };
    let layer_spans: Vec<f32> = layers
        .iter()
        .map(|layer| {
            let total: f32 = layer.iter().map(|&i| cross_extent(i)).sum();
            total + SIBLING_GAP * (layer.len().saturating_sub(1)) as f32
        })
        .collect();
    let max_span = layer_spans.iter().cloned().fold(0.0f32, f32::max);

    let mut nodes: Vec<Option<PlacedNode>> = vec![None; graph.nodes.len()];
    for (r, layer) in layers.iter().enumerate() {
        // Center each layer within the widest one.
        let mut cursor = MARGIN + (max_span - layer_spans[r]) / 2.0;
        for &i in layer {
            let (x, y) = match graph.direction {
                FlowDirection::TopDown => (cursor, MARGIN + r as f32 * (NODE_HEIGHT + RANK_GAP)),
                FlowDirection::LeftRight => {
                    (MARGIN + r as f32 * (max_node_width + RANK_GAP), cursor)
                }
            };
            nodes[i] = Some(PlacedNode {
                x,
                y,
                width: widths[i],
                height: NODE_HEIGHT,
                label: graph.nodes[i].label.clone(),
                shape: graph.nodes[i].shape,
            });
            cursor += cross_extent(i) + SIBLING_GAP;
        }
    }
    let nodes: Vec<PlacedNode> = nodes.into_iter().flatten().collect();

    let edges = graph
        .edges
        .iter()
        .map(|edge| {
            let from = &nodes[edge.from];
            let to = &nodes[edge.to];
            let points = match graph.direction {
                FlowDirection::TopDown => vec![
                    (from.x + from.width / 2.0, from.y + from.height),
                    (to.x + to.width / 2.0, to.y),
                ],
                FlowDirection::LeftRight => vec![
                    (from.x + from.width, from.y + from.height / 2.0),
                    (to.x, to.y + to.height / 2.0),
                ],
            };
            PlacedEdge {
                points,
                label: edge.label.clone(),
                arrow: !matches!(edge.style, EdgeStyle::Open),
                dotted: matches!(edge.style, EdgeStyle::Dotted),
            }
        })
        .collect();

    let mut layout = Layout {
        width: 0.0,
        height: 0.0,
        nodes,
        edges,
    };
    for node in &layout.nodes {
        layout.width = layout.width.max(node.x + node.width + MARGIN);
        layout.height = layout.height.max(node.y + node.height + MARGIN);
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::parser::parse;

    fn flow(source: &str) -> Layout {
        compute_layout(&parse(source).unwrap())
    }

    #[test]
    fn chain_ranks_stack_top_down() {
        let layout = flow("graph TD\nA --> B --> C\n");
        assert_eq!(layout.nodes.len(), 3);
        assert!(layout.nodes[0].y < layout.nodes[1].y);
        assert!(layout.nodes[1].y < layout.nodes[2].y);
    }

    #[test]
    fn lr_ranks_advance_horizontally() {
        let layout = flow("graph LR\nA --> B\n");
        assert!(layout.nodes[0].x < layout.nodes[1].x);
        let dy = (layout.nodes[0].y - layout.nodes[1].y).abs();
        assert!(dy < 1.0, "LR siblingless nodes share a row, dy={dy}");
    }

    #[test]
    fn siblings_share_a_rank() {
        let layout = flow("graph TD\nA --> B\nA --> C\n");
        assert!((layout.nodes[1].y - layout.nodes[2].y).abs() < 1.0);
        assert!(layout.nodes[1].x != layout.nodes[2].x);
    }

    #[test]
    fn cyclic_graph_terminates() {
        let layout = flow("graph TD\nA --> B\nB --> A\n");
        assert_eq!(layout.nodes.len(), 2);
        assert!(layout.width > 0.0 && layout.height > 0.0);
    }

    #[test]
    fn open_edges_have_no_arrow() {
        let layout = flow("graph TD\nA --- B\n");
        assert!(!layout.edges[0].arrow);
    }

    #[test]
    fn mindmap_rows_do_not_overlap() {
        let layout = compute_layout(
            &parse("mindmap\n  root((R))\n    A\n      A1\n      A2\n    B\n").unwrap(),
        );
        assert_eq!(layout.nodes.len(), 5);
        // Leaves occupy distinct rows.
        let mut ys: Vec<i64> = layout
            .nodes
            .iter()
            .filter(|n| n.shape == NodeShape::Rounded)
            .map(|n| n.y as i64)
            .collect();
        ys.sort_unstable();
        ys.dedup();
        assert!(ys.len() >= 3, "expected distinct rows, got {ys:?}");
    }

    #[test]
    fn mindmap_connectors_have_no_arrowheads() {
        let layout = compute_layout(&parse("mindmap\n  R\n    A\n    B\n").unwrap());
        assert_eq!(layout.edges.len(), 2);
        assert!(layout.edges.iter().all(|e| !e.arrow));
    }

    #[test]
    fn wide_labels_widen_nodes() {
        let layout = flow("graph TD\nA[tiny] --> B[a considerably longer label]\n");
        assert!(layout.nodes[1].width > layout.nodes[0].width);
    }
}
