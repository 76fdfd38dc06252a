//! SVG emission for a computed [`Layout`].
//!
//! Output is a standalone scalable vector graphic suitable for embedding.
//! All user-visible text is XML-escaped; element ids are fixed strings so
//! rendering the same layout twice yields byte-identical output.

use crate::diagram::layout::{Layout, PlacedEdge, PlacedNode, FONT_SIZE};
use crate::diagram::parser::NodeShape;
use std::fmt::Write as _;

// Neutral theme, matching the product's slate palette.
const BACKGROUND: &str = "#ffffff";
const NODE_FILL: &str = "#f1f5f9";
const NODE_STROKE: &str = "#64748b";
const TEXT_COLOR: &str = "#1e293b";
const LINE_COLOR: &str = "#64748b";
const FONT_FAMILY: &str = "Inter, sans-serif";

/// Render the layout as a complete `<svg>` document.
pub fn render_svg(layout: &Layout) -> String {
    let width = layout.width.max(200.0);
    let height = layout.height.max(120.0);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}">"#
    );
    let _ = write!(
        svg,
        r#"<rect width="100%" height="100%" fill="{BACKGROUND}"/>"#
    );
    let _ = write!(
        svg,
        r#"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="{LINE_COLOR}"/></marker></defs>"#
    );

    for edge in &layout.edges {
        push_edge(&mut svg, edge);
    }
    for node in &layout.nodes {
        push_node(&mut svg, node);
    }

    svg.push_str("</svg>");
    svg
}

fn push_edge(svg: &mut String, edge: &PlacedEdge) {
    if edge.points.is_empty() {
        return;
    }
    let mut d = String::new();
    let _ = write!(d, "M {:.2} {:.2}", edge.points[0].0, edge.points[0].1);
    for point in edge.points.iter().skip(1) {
        let _ = write!(d, " L {:.2} {:.2}", point.0, point.1);
    }

    let marker = if edge.arrow { r#" marker-end="url(#arrow)""# } else { "" };
    let dash = if edge.dotted { r#" stroke-dasharray="3 5""# } else { "" };
    let _ = write!(
        svg,
        r#"<path d="{d}" fill="none" stroke="{LINE_COLOR}" stroke-width="1.4"{marker}{dash}/>"#
    );

    if let Some(label) = &edge.label {
        let (first, last) = (edge.points[0], edge.points[edge.points.len() - 1]);
        let mid_x = (first.0 + last.0) / 2.0;
        let mid_y = (first.1 + last.1) / 2.0;
        let half_w = label.chars().count() as f32 * FONT_SIZE * 0.32 + 6.0;
        let _ = write!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="4" fill="{BACKGROUND}"/>"#,
            mid_x - half_w,
            mid_y - FONT_SIZE * 0.75,
            half_w * 2.0,
            FONT_SIZE * 1.5
        );
        push_text(svg, mid_x, mid_y, label);
    }
}

fn push_node(svg: &mut String, node: &PlacedNode) {
    let cx = node.x + node.width / 2.0;
    let cy = node.y + node.height / 2.0;

    match node.shape {
        NodeShape::Rect | NodeShape::Rounded => {
            let rx = if node.shape == NodeShape::Rounded { 16.0 } else { 4.0 };
            let _ = write!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{rx}" fill="{NODE_FILL}" stroke="{NODE_STROKE}" stroke-width="1.2"/>"#,
                node.x, node.y, node.width, node.height
            );
        }
        NodeShape::Circle => {
            let _ = write!(
                svg,
                r#"<ellipse cx="{cx:.2}" cy="{cy:.2}" rx="{:.2}" ry="{:.2}" fill="{NODE_FILL}" stroke="{NODE_STROKE}" stroke-width="1.2"/>"#,
                node.width / 2.0,
                node.height / 2.0 + 4.0
            );
        }
        NodeShape::Diamond => {
            let _ = write!(
                svg,
                r#"<polygon points="{cx:.2},{:.2} {:.2},{cy:.2} {cx:.2},{:.2} {:.2},{cy:.2}" fill="{NODE_FILL}" stroke="{NODE_STROKE}" stroke-width="1.2"/>"#,
                node.y - 6.0,
                node.x + node.width + 10.0,
                node.y + node.height + 6.0,
                node.x - 10.0
            );
        }
    }
    push_text(svg, cx, cy, &node.label);
}

fn push_text(svg: &mut String, cx: f32, cy: f32, text: &str) {
    // dominant-baseline keeps the glyphs vertically centered on cy.
    let _ = write!(
        svg,
        r#"<text x="{cx:.2}" y="{cy:.2}" text-anchor="middle" dominant-baseline="central" font-family="{FONT_FAMILY}" font-size="{FONT_SIZE}" fill="{TEXT_COLOR}">{}</text>"#,
        escape_xml(text)
    );
}

/// Escape text for inclusion in SVG content.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
