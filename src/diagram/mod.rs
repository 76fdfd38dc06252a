//! Diagram rendering: a textual diagram description → embeddable SVG.
//!
//! The description is untrusted model output, so the whole pipeline is
//! infallible from the caller's perspective: [`render`] always returns a
//! [`RenderedDiagram`], degrading to a fallback graphic when the source
//! cannot be parsed or laid out. A render failure is terminal for that
//! source string — there is nothing to retry until a new description
//! arrives — and it never affects the analysis result that carried it.
//!
//! ```text
//! source ──▶ parser ──▶ layout ──▶ svg
//!            (tree/graph) (geometry) (markup)
//! ```
//!
//! [`DiagramSlot`] adds the one piece of coordination the renderer needs:
//! when sources arrive faster than renders finish, only the newest render
//! may land. Completions are sequenced by the slot, not by finish order.

pub mod layout;
pub mod parser;
pub mod svg;

use crate::error::RenderError;
use tracing::{debug, warn};

/// Text shown inside the fallback graphic when a description cannot be
/// rendered.
pub const FALLBACK_MESSAGE: &str = "Could not render diagram. Syntax might be invalid.";

/// The outcome of rendering one diagram description.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDiagram {
    /// A complete `<svg>` document.
    pub svg: String,
    /// True when `svg` is the fallback graphic rather than a real diagram.
    pub fallback: bool,
}

/// Render a diagram description, falling back on any failure.
///
/// Never panics and never blocks indefinitely: parsing is line-bounded and
/// layout passes are bounded by node count, so arbitrary input resolves.
pub fn render(source: &str) -> RenderedDiagram {
    match try_render(source) {
        Ok(svg) => RenderedDiagram { svg, fallback: false },
        Err(e) => {
            warn!("Diagram render failed, using fallback: {e}");
            RenderedDiagram {
                svg: fallback_svg(),
                fallback: true,
            }
        }
    }
}

fn try_render(source: &str) -> Result<String, RenderError> {
    let diagram = parser::parse(source)?;
    let layout = layout::compute_layout(&diagram);
    debug!(
        "Rendered diagram: {} nodes, {} edges, {:.0}x{:.0}",
        layout.nodes.len(),
        layout.edges.len(),
        layout.width,
        layout.height
    );
    Ok(svg::render_svg(&layout))
}

/// The graphic shown in place of an unrenderable diagram.
fn fallback_svg() -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="420" height="120" viewBox="0 0 420 120">"#,
            r##"<rect width="100%" height="100%" fill="#ffffff"/>"##,
            r##"<rect x="8" y="8" width="404" height="104" rx="12" fill="#fef2f2" stroke="#fca5a5"/>"##,
            r##"<text x="210" y="60" text-anchor="middle" dominant-baseline="central" font-family="Inter, sans-serif" font-size="14" fill="#b91c1c">{}</text>"##,
            "</svg>"
        ),
        svg::escape_xml(FALLBACK_MESSAGE)
    )
}

/// Sequencing guard for one diagram display slot.
///
/// Each new source value claims a fresh sequence number via [`begin`];
/// a completed render is applied only if it still carries the newest
/// number. Out-of-order completions (a slow render finishing after a newer
/// one) are discarded, so the displayed diagram always corresponds to the
/// latest source.
///
/// [`begin`]: DiagramSlot::begin
#[derive(Debug, Default)]
pub struct DiagramSlot {
    seq: u64,
    current: Option<RenderedDiagram>,
}

impl DiagramSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a sequence number for a new source value. Any render still in
    /// flight for an earlier number becomes stale.
    pub fn begin(&mut self) -> u64 {
        self.seq += 1;
        self.current = None;
        self.seq
    }

    /// Apply a finished render. Returns `false` (and discards the render)
    /// if `seq` is stale.
    pub fn complete(&mut self, seq: u64, rendered: RenderedDiagram) -> bool {
        if seq != self.seq {
            debug!("Discarding stale diagram render (seq {seq} < {})", self.seq);
            return false;
        }
        self.current = Some(rendered);
        true
    }

    /// The newest applied render, if any.
    pub fn current(&self) -> Option<&RenderedDiagram> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_source_renders_real_svg() {
        let out = render("graph TD\nA --> B\n");
        assert!(!out.fallback);
        assert!(out.svg.contains("</svg>"));
    }

    #[test]
    fn invalid_source_yields_fallback() {
        let out = render("not a real diagram");
        assert!(out.fallback);
        assert!(out.svg.contains(FALLBACK_MESSAGE));
    }

    #[test]
    fn empty_source_yields_fallback() {
        assert!(render("").fallback);
    }

    #[test]
    fn fallback_graphic_is_wellformed_svg() {
        let out = render("not a real diagram");
        assert!(out.svg.starts_with("<svg"));
        assert!(out.svg.ends_with("</svg>"));
        // The red-tinted notice panel, with its colors intact.
        assert!(out.svg.contains(r##"fill="#fef2f2""##));
        assert!(out.svg.contains(r##"fill="#b91c1c""##));
        assert!(out.svg.contains(&svg::escape_xml(FALLBACK_MESSAGE)));
    }

    #[test]
    fn arbitrary_junk_always_resolves() {
        for junk in [
            "graph TD\n$$$ *** |||\n",
            "mindmap",
            "mindmap\n\u{0000}weird",
            "flowchart XX\n]] --> [[",
        ] {
            let out = render(junk);
            assert!(out.svg.contains("</svg>"), "no svg for {junk:?}");
        }
    }

    #[test]
    fn slot_applies_latest_seq() {
        let mut slot = DiagramSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        // The older render finishes last; it must not overwrite.
        assert!(slot.complete(second, render("graph TD\nA --> B\n")));
        assert!(!slot.complete(first, render("mindmap\n  stale\n")));

        let current = slot.current().unwrap();
        assert!(!current.fallback);
        assert!(current.svg.contains(">A</text>"));
    }

    #[test]
    fn begin_clears_previous_render() {
        let mut slot = DiagramSlot::new();
        let seq = slot.begin();
        slot.complete(seq, render("graph TD\nA --> B\n"));
        assert!(slot.current().is_some());

        slot.begin();
        assert!(slot.current().is_none());
    }
}
