#![forbid(unsafe_code)]

//! SVG output for `graphiti` scenes.
//!
//! [`SvgRenderer`] implements [`graphiti_core::Renderer`]; hand it to [`Scene::draw`] and call
//! [`SvgRenderer::finish`] to get the document.
//!
//! [`Scene::draw`]: graphiti_core::Scene::draw

mod util;

use graphiti_core::render::{LinkShape, NodeShape, ProbeTrace, Renderer};
use graphiti_core::{ProbeShape, Scene};
use std::fmt::Write as _;
use util::{escape_xml, fmt, fmt_into};

const HIGHLIGHT_STROKE_WIDTH: f64 = 4.0;
const STROKE_WIDTH: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Root `<svg id="...">`.
    pub diagram_id: Option<String>,
    /// CSS color painted behind the scene.
    pub background: Option<String>,
    pub stroke: String,
    pub trace_stroke: String,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            background: None,
            stroke: "#000".to_string(),
            trace_stroke: "#F00".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    options: SvgRenderOptions,
    width: f64,
    height: f64,
    links: String,
    nodes: String,
    probes: String,
}

impl SvgRenderer {
    pub fn new(options: SvgRenderOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Assembles the SVG document from everything drawn since the last `clear`.
    pub fn finish(&self) -> String {
        let id = escape_xml(self.options.diagram_id.as_deref().unwrap_or("graphiti"));
        let w = fmt(self.width);
        let h = fmt(self.height);

        let mut out = String::with_capacity(
            256 + self.links.len() + self.nodes.len() + self.probes.len(),
        );
        let _ = write!(
            &mut out,
            r#"<svg id="{id}" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        );
        if let Some(bg) = self.options.background.as_deref() {
            let _ = write!(
                &mut out,
                r#"<rect class="background" x="0" y="0" width="{w}" height="{h}" fill="{}"/>"#,
                escape_xml(bg)
            );
        }
        let stroke = escape_xml(&self.options.stroke);
        let _ = write!(
            &mut out,
            r#"<g class="links" stroke="{stroke}" fill="none">{}</g>"#,
            self.links
        );
        let _ = write!(
            &mut out,
            r#"<g class="nodes" stroke="{stroke}" fill="none">{}</g>"#,
            self.nodes
        );
        if !self.probes.is_empty() {
            let _ = write!(
                &mut out,
                r#"<g class="trace" stroke="{}" fill="none">{}</g>"#,
                escape_xml(&self.options.trace_stroke),
                self.probes
            );
        }
        out.push_str("</svg>\n");
        out
    }
}

fn stroke_width(highlighted: bool) -> f64 {
    if highlighted {
        HIGHLIGHT_STROKE_WIDTH
    } else {
        STROKE_WIDTH
    }
}

impl Renderer for SvgRenderer {
    fn clear(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.links.clear();
        self.nodes.clear();
        self.probes.clear();
    }

    fn draw_link(&mut self, link: &LinkShape) {
        let out = &mut self.links;
        out.push_str(r#"<line class="link"#);
        if link.highlighted {
            out.push_str(" highlighted");
        }
        out.push_str(r#"" data-id=""#);
        util::escape_xml_into(out, &link.id);
        out.push_str(r#"" x1=""#);
        fmt_into(out, link.head.0);
        out.push_str(r#"" y1=""#);
        fmt_into(out, link.head.1);
        out.push_str(r#"" x2=""#);
        fmt_into(out, link.tail.0);
        out.push_str(r#"" y2=""#);
        fmt_into(out, link.tail.1);
        out.push_str(r#"" stroke-width=""#);
        fmt_into(out, stroke_width(link.highlighted));
        out.push_str(r#""><title>"#);
        util::escape_xml_into(out, &link.title);
        out.push_str("</title></line>");
    }

    fn draw_node(&mut self, node: &NodeShape) {
        let out = &mut self.nodes;
        out.push_str(r#"<g class="node"#);
        if node.highlighted {
            out.push_str(" highlighted");
        }
        out.push_str(r#"" data-id=""#);
        util::escape_xml_into(out, &node.id);
        out.push_str(r#""><circle cx=""#);
        fmt_into(out, node.x);
        out.push_str(r#"" cy=""#);
        fmt_into(out, node.y);
        out.push_str(r#"" r=""#);
        fmt_into(out, node.radius);
        out.push_str(r#"" stroke-width=""#);
        fmt_into(out, stroke_width(node.highlighted));
        out.push_str(r#""/>"#);
        if !node.title.is_empty() {
            out.push_str(r#"<text x=""#);
            fmt_into(out, node.x);
            out.push_str(r#"" y=""#);
            fmt_into(out, node.y + node.radius * 2.0);
            out.push_str(r#"" stroke="none" fill="currentColor" text-anchor="middle">"#);
            util::escape_xml_into(out, &node.title);
            out.push_str("</text>");
        }
        out.push_str("</g>");
    }

    fn draw_probe(&mut self, probe: &ProbeTrace) {
        let acc = probe.accuracy;
        match probe.shape {
            ProbeShape::Square => {
                let _ = write!(
                    &mut self.probes,
                    r#"<rect x="{}" y="{}" width="{}" height="{}"/>"#,
                    fmt(probe.x - acc),
                    fmt(probe.y - acc),
                    fmt(2.0 * acc),
                    fmt(2.0 * acc)
                );
            }
            ProbeShape::Circle => {
                let _ = write!(
                    &mut self.probes,
                    r#"<circle cx="{}" cy="{}" r="{}"/>"#,
                    fmt(probe.x),
                    fmt(probe.y),
                    fmt(acc)
                );
            }
        }
    }
}

/// Clears, draws and serializes `scene` in one go.
pub fn render_scene_svg(
    scene: &Scene,
    highlight: Option<&graphiti_core::HitTarget>,
    options: &SvgRenderOptions,
) -> String {
    let mut renderer = SvgRenderer::new(options.clone());
    scene.clear(&mut renderer);
    scene.draw(&mut renderer, highlight);
    renderer.finish()
}
