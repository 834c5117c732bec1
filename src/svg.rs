//! Deterministic SVG diagrams.
//!
//! Every renderer maps data space linearly onto a fixed canvas with a constant
//! margin. Output depends only on the arguments, so identical input yields
//! byte-identical markup.

use crate::domain::{Point, Shape};
use crate::util::fmt_number;

const TRAPEZOID_W: f64 = 360.0;
const TRAPEZOID_H: f64 = 220.0;
const TRAPEZOID_MARGIN: f64 = 40.0;
// room left of the shape for the height label
const TRAPEZOID_GUTTER: f64 = 60.0;

const LINE_W: f64 = 400.0;
const LINE_H: f64 = 60.0;
const LINE_MARGIN: f64 = 20.0;

const PLANE_SIZE: f64 = 400.0;
const PLANE_MARGIN: f64 = 40.0;

/// Render whichever shape a skill asked for.
pub fn render(shape: &Shape) -> String {
  match shape {
    Shape::Trapezoid { b1, b2, h, units } => render_trapezoid(*b1, *b2, *h, units),
    Shape::NumberLine { min, max, highlight } => render_number_line(*min, *max, highlight),
    Shape::CoordinatePlane { x_min, x_max, y_min, y_max, points } => {
      render_coordinate_plane((*x_min, *x_max), (*y_min, *y_max), points)
    }
  }
}

/// Bottom base `b1`, top base `b2`, both centred, with a dashed height line.
pub fn render_trapezoid(b1: i64, b2: i64, h: i64, units: &str) -> String {
  let (b1f, b2f, hf) = (b1.max(1) as f64, b2.max(1) as f64, h.max(1) as f64);
  let width = TRAPEZOID_W - 2.0 * TRAPEZOID_MARGIN - TRAPEZOID_GUTTER;
  let scale = (width / b1f.max(b2f)).min((TRAPEZOID_H - 2.0 * TRAPEZOID_MARGIN) / hf);
  let cx = TRAPEZOID_MARGIN + TRAPEZOID_GUTTER + width / 2.0;
  let bottom_y = TRAPEZOID_MARGIN + hf * scale;
  let top_y = TRAPEZOID_MARGIN;
  let (bl, br) = (cx - b1f * scale / 2.0, cx + b1f * scale / 2.0);
  let (tl, tr) = (cx - b2f * scale / 2.0, cx + b2f * scale / 2.0);
  let units = escape(units);

  let mut svg = open(TRAPEZOID_W, TRAPEZOID_H);
  svg.push_str(&format!(
    "  <polygon points=\"{},{} {},{} {},{} {},{}\" fill=\"#eef5ff\" stroke=\"black\" stroke-width=\"2\"/>\n",
    n(bl), n(bottom_y), n(br), n(bottom_y), n(tr), n(top_y), n(tl), n(top_y)
  ));
  // height drawn from the left end of the top base
  svg.push_str(&format!(
    "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#555\" stroke-width=\"1\" stroke-dasharray=\"4 3\"/>\n",
    n(tl), n(top_y), n(tl), n(bottom_y)
  ));
  svg.push_str(&text(cx, bottom_y + 20.0, "middle", &format!("{b1} {units}")));
  svg.push_str(&text(cx, top_y - 8.0, "middle", &format!("{b2} {units}")));
  // right-aligned left of the leftmost corner so it clears both slanted edges
  svg.push_str(&text(bl.min(tl) - 6.0, (top_y + bottom_y) / 2.0 + 4.0, "end", &format!("h = {h} {units}")));
  svg.push_str("</svg>");
  svg
}

/// Integer ticks from `min` to `max`; highlighted values outside the range are skipped.
pub fn render_number_line(min: i64, max: i64, highlight: &[f64]) -> String {
  let span = (max - min).max(1) as f64;
  let x_of = |v: f64| LINE_MARGIN + (v - min as f64) * (LINE_W - 2.0 * LINE_MARGIN) / span;
  let mid = LINE_H / 2.0;
  let step = ((max - min) / 20).max(1) as usize;

  let mut svg = open(LINE_W, LINE_H);
  svg.push_str(&format!(
    "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"black\" stroke-width=\"2\"/>\n",
    n(LINE_MARGIN), n(mid), n(LINE_W - LINE_MARGIN), n(mid)
  ));
  for i in (min..=max).step_by(step) {
    let x = x_of(i as f64);
    svg.push_str(&format!(
      "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"black\" stroke-width=\"1\"/>\n",
      n(x), n(mid - 6.0), n(x), n(mid + 6.0)
    ));
    svg.push_str(&text(x, mid + 20.0, "middle", &i.to_string()));
  }
  for &v in highlight {
    if v >= min as f64 && v <= max as f64 {
      svg.push_str(&format!("  <circle cx=\"{}\" cy=\"{}\" r=\"4\" fill=\"red\"/>\n", n(x_of(v)), n(mid)));
    }
  }
  svg.push_str("</svg>");
  svg
}

/// Square grid with axes through the origin when it is in range.
pub fn render_coordinate_plane(x_range: (i64, i64), y_range: (i64, i64), points: &[Point]) -> String {
  let (x_min, x_max) = x_range;
  let (y_min, y_max) = y_range;
  let inner = PLANE_SIZE - 2.0 * PLANE_MARGIN;
  let x_span = (x_max - x_min).max(1) as f64;
  let y_span = (y_max - y_min).max(1) as f64;
  let px = |x: f64| PLANE_MARGIN + (x - x_min as f64) * inner / x_span;
  let py = |y: f64| PLANE_SIZE - PLANE_MARGIN - (y - y_min as f64) * inner / y_span;

  let mut svg = open(PLANE_SIZE, PLANE_SIZE);
  for i in x_min..=x_max {
    let x = px(i as f64);
    svg.push_str(&grid_line(x, PLANE_MARGIN, x, PLANE_SIZE - PLANE_MARGIN));
  }
  for j in y_min..=y_max {
    let y = py(j as f64);
    svg.push_str(&grid_line(PLANE_MARGIN, y, PLANE_SIZE - PLANE_MARGIN, y));
  }

  let axis_y = py(0f64.clamp(y_min as f64, y_max as f64));
  let axis_x = px(0f64.clamp(x_min as f64, x_max as f64));
  svg.push_str(&format!(
    "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"black\" stroke-width=\"2\"/>\n",
    n(PLANE_MARGIN), n(axis_y), n(PLANE_SIZE - PLANE_MARGIN), n(axis_y)
  ));
  svg.push_str(&format!(
    "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"black\" stroke-width=\"2\"/>\n",
    n(axis_x), n(PLANE_MARGIN), n(axis_x), n(PLANE_SIZE - PLANE_MARGIN)
  ));
  for i in (x_min..=x_max).filter(|i| *i != 0) {
    svg.push_str(&text(px(i as f64), axis_y + 16.0, "middle", &i.to_string()));
  }
  for j in (y_min..=y_max).filter(|j| *j != 0) {
    svg.push_str(&text(axis_x - 8.0, py(j as f64) + 4.0, "end", &j.to_string()));
  }

  for p in points {
    if p.x < x_min as f64 || p.x > x_max as f64 || p.y < y_min as f64 || p.y > y_max as f64 {
      continue;
    }
    svg.push_str(&format!("  <circle cx=\"{}\" cy=\"{}\" r=\"5\" fill=\"red\"/>\n", n(px(p.x)), n(py(p.y))));
    svg.push_str(&text(px(p.x) + 8.0, py(p.y) - 8.0, "start", &p.to_string()));
  }
  svg.push_str("</svg>");
  svg
}

fn open(w: f64, h: f64) -> String {
  format!(
    "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" height=\"{1}\" viewBox=\"0 0 {0} {1}\">\n",
    n(w),
    n(h)
  )
}

fn text(x: f64, y: f64, anchor: &str, body: &str) -> String {
  format!(
    "  <text x=\"{}\" y=\"{}\" text-anchor=\"{anchor}\" font-size=\"12\">{body}</text>\n",
    n(x),
    n(y)
  )
}

fn grid_line(x1: f64, y1: f64, x2: f64, y2: f64) -> String {
  format!(
    "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ddd\" stroke-width=\"1\"/>\n",
    n(x1), n(y1), n(x2), n(y2)
  )
}

fn n(v: f64) -> String {
  fmt_number(v)
}

fn escape(s: &str) -> String {
  s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}
