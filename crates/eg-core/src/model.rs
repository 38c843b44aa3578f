//! Serializable data model for the diagram editor.
//!
//! All positional data lives on a normalized logical plane, 0–100 on both
//! axes, independent of pixel size — this is what makes stored diagrams
//! survive container resizes untouched. Reference lines and quota brackets
//! relate to curves by id (never by reference), so snapshot-based undo can
//! swap the whole state without leaving stale pointers.
//!
//! The serde renames reproduce the exact JSON field names of the persisted
//! state format (`referenceLines`, `selectedCurve`, `start_y`, …); host
//! snapshots written by earlier versions import with missing fields taking
//! defaults.

use crate::id::EntityId;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

/// Upper bound of the logical coordinate range on both axes.
pub const COORD_MAX: f32 = 100.0;

/// Default fill color for new shading polygons.
pub const DEFAULT_PAINT_COLOR: Color = Color::rgb(0x34, 0x98, 0xDB);

/// Default stroke color for new curves.
pub const DEFAULT_CURVE_COLOR: Color = Color::rgb(0x00, 0x00, 0x00);

// ─── Color ───────────────────────────────────────────────────────────────

/// RGBA color, stored as 8-bit channels and serialized as a `#RRGGBB` /
/// `#RRGGBBAA` hex string to match the persisted state format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        fn nibble(c: u8) -> Option<u8> {
            match c {
                b'0'..=b'9' => Some(c - b'0'),
                b'a'..=b'f' => Some(c - b'a' + 10),
                b'A'..=b'F' => Some(c - b'A' + 10),
                _ => None,
            }
        }
        fn byte(hi: u8, lo: u8) -> Option<u8> {
            Some(nibble(hi)? << 4 | nibble(lo)?)
        }

        let b = hex.strip_prefix('#').unwrap_or(hex).as_bytes();
        match b.len() {
            3 => Some(Self::rgb(
                nibble(b[0])? * 17,
                nibble(b[1])? * 17,
                nibble(b[2])? * 17,
            )),
            6 => Some(Self::rgb(byte(b[0], b[1])?, byte(b[2], b[3])?, byte(b[4], b[5])?)),
            8 => Some(Self::rgba(
                byte(b[0], b[1])?,
                byte(b[2], b[3])?,
                byte(b[4], b[5])?,
                byte(b[6], b[7])?,
            )),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| D::Error::custom(format!("invalid hex color {s:?}")))
    }
}

// ─── Points & geometry ───────────────────────────────────────────────────

/// A point on the logical 0–100 plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both components clamped to the logical range.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_coord(self.x),
            y: clamp_coord(self.y),
        }
    }
}

/// Clamp one coordinate to the logical range.
pub fn clamp_coord(v: f32) -> f32 {
    v.clamp(0.0, COORD_MAX)
}

/// One of a curve's two owned endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    P1,
    P2,
}

/// How a reference line or quota bracket relates to its host curve.
///
/// `Body` anchors track an interpolated point at parameter `t`; `Custom`
/// marks a quota whose end handle was dragged away from automatic tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attachment {
    P1,
    P2,
    Body,
    Custom,
}

impl From<Endpoint> for Attachment {
    fn from(end: Endpoint) -> Self {
        match end {
            Endpoint::P1 => Attachment::P1,
            Endpoint::P2 => Attachment::P2,
        }
    }
}

// ─── Entities ────────────────────────────────────────────────────────────

/// A straight segment between two owned endpoints.
///
/// `kind` is a free-form tag (`"generic"` by default) and `label` is never
/// auto-assigned — semantic naming is left entirely to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub id: EntityId,
    #[serde(rename = "type", default = "default_curve_kind")]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_curve_color")]
    pub color: Color,
    pub p1: Point,
    pub p2: Point,
}

fn default_curve_kind() -> String {
    "generic".to_string()
}

fn default_curve_color() -> Color {
    DEFAULT_CURVE_COLOR
}

impl Curve {
    pub fn endpoint(&self, end: Endpoint) -> Point {
        match end {
            Endpoint::P1 => self.p1,
            Endpoint::P2 => self.p2,
        }
    }

    pub fn endpoint_mut(&mut self, end: Endpoint) -> &mut Point {
        match end {
            Endpoint::P1 => &mut self.p1,
            Endpoint::P2 => &mut self.p2,
        }
    }

    /// Interpolated point at parameter `t` along the segment (`t` in [0, 1]).
    pub fn point_at(&self, t: f32) -> Point {
        Point::new(
            self.p1.x + t * (self.p2.x - self.p1.x),
            self.p1.y + t * (self.p2.y - self.p1.y),
        )
    }

    /// The tracked anchor for an attachment, or `None` for `Custom`
    /// (detached) anchors and body anchors with no parameter.
    pub fn anchor(&self, attachment: Attachment, t: Option<f32>) -> Option<Point> {
        match attachment {
            Attachment::P1 => Some(self.p1),
            Attachment::P2 => Some(self.p2),
            Attachment::Body => t.map(|t| self.point_at(t)),
            Attachment::Custom => None,
        }
    }

    /// Intersection of the infinite lines through `self` and `other`.
    /// `None` when the lines are (near-)parallel.
    pub fn intersection_with(&self, other: &Curve) -> Option<Point> {
        let (x1, y1, x2, y2) = (self.p1.x, self.p1.y, self.p2.x, self.p2.y);
        let (x3, y3, x4, y4) = (other.p1.x, other.p1.y, other.p2.x, other.p2.y);
        let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if denom.abs() < 1e-3 {
            return None;
        }
        let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
        Some(Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1)))
    }
}

/// A free-floating text annotation, not attached to anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingLabel {
    pub id: EntityId,
    pub text: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(rename = "fontSize", default)]
    pub font_size: Option<f32>,
}

/// A user-drawn shaded region.
///
/// The interactive paint tool commits exactly four vertices, but imported
/// states may carry any count; anything with at least three renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadePolygon {
    pub id: EntityId,
    pub points: Vec<Point>,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_paint_color")]
    pub color: Color,
}

fn default_paint_color() -> Color {
    DEFAULT_PAINT_COLOR
}

impl ShadePolygon {
    /// Vertex centroid, used for label placement. `None` below three points.
    pub fn centroid(&self) -> Option<Point> {
        if self.points.len() < 3 {
            return None;
        }
        let n = self.points.len() as f32;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }

    /// Ray-cast interior test in logical coordinates.
    pub fn contains(&self, p: Point) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let mut inside = false;
        let pts = &self.points;
        let mut j = pts.len() - 1;
        for i in 0..pts.len() {
            let (xi, yi) = (pts[i].x, pts[i].y);
            let (xj, yj) = (pts[j].x, pts[j].y);
            if (yi > p.y) != (yj > p.y) && p.x < (xj - xi) * (p.y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Axis guide labels of a reference line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLabelPair {
    pub horizontal: String,
    pub vertical: String,
}

/// A non-owning relation tracking a point on a curve, rendered as dashed
/// guides to both axes. Recomputed whenever the host curve moves; deleted
/// with its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    #[serde(rename = "pointId")]
    pub point_id: EntityId,
    #[serde(rename = "curveId")]
    pub curve_id: EntityId,
    pub attachment: Attachment,
    #[serde(default)]
    pub t: Option<f32>,
    #[serde(rename = "pointX")]
    pub point_x: f32,
    #[serde(rename = "pointY")]
    pub point_y: f32,
    #[serde(default)]
    pub labels: AxisLabelPair,
}

/// A vertical quota bracket anchored on a curve, with an independently
/// draggable upper end. Dragging the end detaches it from automatic
/// tracking (`attachment` becomes `Custom`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaBracket {
    #[serde(rename = "curveId")]
    pub curve_id: EntityId,
    #[serde(rename = "pointId")]
    pub point_id: EntityId,
    pub attachment: Attachment,
    #[serde(default)]
    pub t: Option<f32>,
    pub x: f32,
    pub start_y: f32,
    pub end_y: f32,
    #[serde(default)]
    pub label: String,
}

/// A directly draggable horizontal line across the full plot width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalLine {
    #[serde(rename = "type", default = "default_line_kind")]
    pub kind: String,
    pub position: f32,
    #[serde(default)]
    pub label: String,
}

fn default_line_kind() -> String {
    "horizontal".to_string()
}

impl HorizontalLine {
    pub fn at(position: f32) -> Self {
        Self {
            kind: default_line_kind(),
            position,
            label: String::new(),
        }
    }
}

// ─── Interaction modes ───────────────────────────────────────────────────

/// The active editing mode; governs how pointer events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Select / drag (default).
    #[default]
    Curve,
    /// Two-click curve construction.
    DrawCurve,
    /// Four-click polygon shading.
    Paint,
    /// Place or drag horizontal lines.
    Line,
    /// Attach a quota bracket to a curve.
    Quota,
    /// Attach a reference line to a curve.
    Reference,
    /// Edit or place text labels.
    Label,
    /// Delete the first entity hit.
    Eraser,
}

impl Mode {
    /// Wire name, e.g. `"draw-curve"`.
    pub fn as_name(self) -> &'static str {
        match self {
            Mode::Curve => "curve",
            Mode::DrawCurve => "draw-curve",
            Mode::Paint => "paint",
            Mode::Line => "line",
            Mode::Quota => "quota",
            Mode::Reference => "reference",
            Mode::Label => "label",
            Mode::Eraser => "eraser",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "curve" => Mode::Curve,
            "draw-curve" => Mode::DrawCurve,
            "paint" => Mode::Paint,
            "line" => Mode::Line,
            "quota" => Mode::Quota,
            "reference" => Mode::Reference,
            "label" => Mode::Label,
            "eraser" => Mode::Eraser,
            _ => return None,
        })
    }
}

// ─── Construction buffers ────────────────────────────────────────────────

/// In-progress draw-curve staging: clicked points, committed at two.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawBuffer {
    #[serde(default)]
    pub points: SmallVec<[Point; 2]>,
}

/// In-progress paint staging: clicked vertices, committed at four.
/// Carries the polygon id and fill color it will commit with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintBuffer {
    pub id: EntityId,
    #[serde(default)]
    pub points: SmallVec<[Point; 4]>,
    pub color: Color,
}

// ─── External curve specification ────────────────────────────────────────

/// Curve options supplied by the host (question presets, `add_curve`).
/// Every field is optional; missing pieces take engine defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSpec {
    pub id: Option<EntityId>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: Option<String>,
    pub color: Option<Color>,
    pub p1: Option<Point>,
    pub p2: Option<Point>,
}

/// Axis caption overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
    pub origin: String,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self {
            x: "Quantity".to_string(),
            y: "Price (HK$)".to_string(),
            origin: "0".to_string(),
        }
    }
}

// ─── Aggregate state ─────────────────────────────────────────────────────

/// The complete serializable editor state.
///
/// The four `*_state` fields are transient multi-click staging buffers —
/// serialized for simplicity, but meaningless outside an active session.
/// `line_state` and `quota_state` are vestigial wire slots that the current
/// tools never populate; they are kept so exported snapshots match the
/// established format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphState {
    pub curves: Vec<Curve>,
    pub labels: Vec<FloatingLabel>,
    pub shading: Vec<ShadePolygon>,
    pub reference_lines: Vec<ReferenceLine>,
    pub quotas: Vec<QuotaBracket>,
    pub lines: Vec<HorizontalLine>,
    pub show_grid: bool,
    pub selected_curve: Option<EntityId>,
    pub mode: Mode,
    pub draw_curve_state: Option<DrawBuffer>,
    pub paint_state: Option<PaintBuffer>,
    pub line_state: Option<()>,
    pub quota_state: Option<()>,
    pub paint_color: Color,
}

impl Default for GraphState {
    fn default() -> Self {
        Self {
            curves: Vec::new(),
            labels: Vec::new(),
            shading: Vec::new(),
            reference_lines: Vec::new(),
            quotas: Vec::new(),
            lines: Vec::new(),
            show_grid: true,
            selected_curve: None,
            mode: Mode::default(),
            draw_curve_state: None,
            paint_state: None,
            line_state: None,
            quota_state: None,
            paint_color: DEFAULT_PAINT_COLOR,
        }
    }
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn curve(&self, id: EntityId) -> Option<&Curve> {
        self.curves.iter().find(|c| c.id == id)
    }

    pub fn curve_mut(&mut self, id: EntityId) -> Option<&mut Curve> {
        self.curves.iter_mut().find(|c| c.id == id)
    }

    /// Append a curve built from a host spec, filling gaps with defaults.
    /// Default endpoints stagger with the current curve count so stacked
    /// curves stay distinguishable. Returns the new curve's id.
    pub fn push_curve_from_spec(&mut self, spec: &CurveSpec) -> EntityId {
        let n = self.curves.len() as f32;
        let curve = Curve {
            id: spec.id.unwrap_or_else(|| EntityId::generate("curve")),
            kind: spec.kind.clone().unwrap_or_else(default_curve_kind),
            label: spec.label.clone().unwrap_or_default(),
            color: spec.color.unwrap_or(DEFAULT_CURVE_COLOR),
            p1: spec.p1.unwrap_or(Point::new(20.0 + n * 5.0, 80.0 - n * 5.0)),
            p2: spec.p2.unwrap_or(Point::new(80.0 + n * 5.0, 20.0 - n * 5.0)),
        };
        let id = curve.id;
        self.curves.push(curve);
        id
    }

    /// Remove a curve and cascade-delete every reference line and quota
    /// attached to it. Clears the selection if it pointed at the curve.
    /// Returns `false` when no such curve exists.
    pub fn remove_curve(&mut self, id: EntityId) -> bool {
        let before = self.curves.len();
        self.curves.retain(|c| c.id != id);
        if self.curves.len() == before {
            return false;
        }
        self.prune_attachments(id);
        if self.selected_curve == Some(id) {
            self.selected_curve = None;
        }
        true
    }

    /// Drop every reference line and quota whose host curve id matches.
    pub fn prune_attachments(&mut self, curve_id: EntityId) {
        self.reference_lines.retain(|rl| rl.curve_id != curve_id);
        self.quotas.retain(|q| q.curve_id != curve_id);
    }

    /// Re-derive every attachment anchored to `curve_id` from the curve's
    /// current geometry. Quota end handles shift by the same vertical delta
    /// as their anchor, clamped so `end_y >= start_y`; `Custom` quotas are
    /// left alone.
    pub fn retrack_attachments(&mut self, curve_id: EntityId) {
        let Some(curve) = self.curve(curve_id).cloned() else {
            return;
        };
        for rl in &mut self.reference_lines {
            if rl.curve_id != curve_id {
                continue;
            }
            if let Some(anchor) = curve.anchor(rl.attachment, rl.t) {
                rl.point_x = anchor.x;
                rl.point_y = anchor.y;
            }
        }
        for q in &mut self.quotas {
            if q.curve_id != curve_id || q.attachment == Attachment::Custom {
                continue;
            }
            if let Some(anchor) = curve.anchor(q.attachment, q.t) {
                let dy = anchor.y - q.start_y;
                q.x = anchor.x;
                q.start_y = anchor.y;
                q.end_y = (q.end_y + dy).max(q.start_y);
            }
        }
    }

    /// Erase all user content and staging buffers. Grid visibility, paint
    /// color and the active mode survive.
    pub fn clear_content(&mut self) {
        self.curves.clear();
        self.labels.clear();
        self.shading.clear();
        self.reference_lines.clear();
        self.quotas.clear();
        self.lines.clear();
        self.selected_curve = None;
        self.clear_buffers();
    }

    /// Drop all transient construction buffers (mode switches do this).
    pub fn clear_buffers(&mut self) {
        self.draw_curve_state = None;
        self.paint_state = None;
        self.line_state = None;
        self.quota_state = None;
    }

    /// Deep-clone export as a JSON value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Import from a JSON value. Missing fields take defaults; type-level
    /// mismatches fail with [`crate::StateError`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, crate::StateError> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn curve(id: &str, p1: Point, p2: Point) -> Curve {
        Curve {
            id: EntityId::intern(id),
            kind: "generic".to_string(),
            label: String::new(),
            color: DEFAULT_CURVE_COLOR,
            p1,
            p2,
        }
    }

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#3498DB").unwrap();
        assert_eq!(c, Color::rgb(0x34, 0x98, 0xDB));
        assert_eq!(c.to_hex(), "#3498DB");
        assert_eq!(Color::from_hex("fff").unwrap(), Color::rgb(255, 255, 255));
        assert_eq!(Color::from_hex("#00000080").unwrap().a, 0x80);
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#GGGGGG").is_none());
    }

    #[test]
    fn point_at_interpolates() {
        let c = curve("c", Point::new(0.0, 0.0), Point::new(100.0, 50.0));
        let mid = c.point_at(0.5);
        assert!((mid.x - 50.0).abs() < 1e-4);
        assert!((mid.y - 25.0).abs() < 1e-4);
    }

    #[test]
    fn intersection_of_crossing_segments() {
        let a = curve("a", Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let b = curve("b", Point::new(0.0, 100.0), Point::new(100.0, 0.0));
        let p = a.intersection_with(&b).unwrap();
        assert!((p.x - 50.0).abs() < 1e-3);
        assert!((p.y - 50.0).abs() < 1e-3);

        let parallel = curve("p", Point::new(0.0, 10.0), Point::new(100.0, 110.0));
        assert!(a.intersection_with(&parallel).is_none());
    }

    #[test]
    fn polygon_contains() {
        let poly = ShadePolygon {
            id: EntityId::intern("shade_t"),
            points: vec![
                Point::new(10.0, 10.0),
                Point::new(60.0, 10.0),
                Point::new(60.0, 60.0),
                Point::new(10.0, 60.0),
            ],
            label: String::new(),
            color: DEFAULT_PAINT_COLOR,
        };
        assert!(poly.contains(Point::new(30.0, 30.0)));
        assert!(!poly.contains(Point::new(70.0, 30.0)));
        // Degenerate polygons never contain anything.
        let degenerate = ShadePolygon {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            ..poly.clone()
        };
        assert!(!degenerate.contains(Point::new(0.5, 0.5)));
    }

    #[test]
    fn retrack_moves_anchor_and_shifts_quota_end() {
        let mut state = GraphState::new();
        let cid = EntityId::intern("curve_rt");
        state
            .curves
            .push(curve("curve_rt", Point::new(20.0, 40.0), Point::new(80.0, 40.0)));
        state.reference_lines.push(ReferenceLine {
            point_id: EntityId::intern("curve_rt_p1"),
            curve_id: cid,
            attachment: Attachment::P1,
            t: None,
            point_x: 20.0,
            point_y: 40.0,
            labels: AxisLabelPair::default(),
        });
        state.quotas.push(QuotaBracket {
            curve_id: cid,
            point_id: EntityId::intern("curve_rt_quota_0"),
            attachment: Attachment::Body,
            t: Some(0.5),
            x: 50.0,
            start_y: 40.0,
            end_y: 60.0,
            label: String::new(),
        });

        state.curve_mut(cid).unwrap().p1 = Point::new(25.0, 50.0);
        state.retrack_attachments(cid);

        let rl = &state.reference_lines[0];
        assert_eq!((rl.point_x, rl.point_y), (25.0, 50.0));

        // Body anchor midpoint moved up by 5; end follows.
        let q = &state.quotas[0];
        assert!((q.start_y - 45.0).abs() < 1e-4);
        assert!((q.end_y - 65.0).abs() < 1e-4);
    }

    #[test]
    fn retrack_leaves_custom_quota_alone() {
        let mut state = GraphState::new();
        let cid = EntityId::intern("curve_cu");
        state
            .curves
            .push(curve("curve_cu", Point::new(20.0, 40.0), Point::new(80.0, 40.0)));
        state.quotas.push(QuotaBracket {
            curve_id: cid,
            point_id: EntityId::intern("curve_cu_quota_0"),
            attachment: Attachment::Custom,
            t: None,
            x: 33.0,
            start_y: 40.0,
            end_y: 77.0,
            label: String::new(),
        });
        state.curve_mut(cid).unwrap().p1 = Point::new(0.0, 0.0);
        state.retrack_attachments(cid);
        let q = &state.quotas[0];
        assert_eq!((q.x, q.start_y, q.end_y), (33.0, 40.0, 77.0));
    }

    #[test]
    fn remove_curve_cascades() {
        let mut state = GraphState::new();
        let cid = state.push_curve_from_spec(&CurveSpec::default());
        state.selected_curve = Some(cid);
        state.reference_lines.push(ReferenceLine {
            point_id: EntityId::intern("x_p1"),
            curve_id: cid,
            attachment: Attachment::P1,
            t: None,
            point_x: 20.0,
            point_y: 80.0,
            labels: AxisLabelPair::default(),
        });
        state.quotas.push(QuotaBracket {
            curve_id: cid,
            point_id: EntityId::intern("x_quota"),
            attachment: Attachment::P1,
            t: None,
            x: 20.0,
            start_y: 80.0,
            end_y: 100.0,
            label: String::new(),
        });

        assert!(state.remove_curve(cid));
        assert!(state.curves.is_empty());
        assert!(state.reference_lines.is_empty());
        assert!(state.quotas.is_empty());
        assert_eq!(state.selected_curve, None);

        assert!(!state.remove_curve(cid));
    }

    #[test]
    fn default_curve_placement_staggers() {
        let mut state = GraphState::new();
        state.push_curve_from_spec(&CurveSpec::default());
        state.push_curve_from_spec(&CurveSpec::default());
        assert_eq!(state.curves[0].p1, Point::new(20.0, 80.0));
        assert_eq!(state.curves[0].p2, Point::new(80.0, 20.0));
        assert_eq!(state.curves[1].p1, Point::new(25.0, 75.0));
        assert_eq!(state.curves[1].p2, Point::new(85.0, 15.0));
    }

    #[test]
    fn wire_format_field_names() {
        let mut state = GraphState::new();
        let cid = state.push_curve_from_spec(&CurveSpec {
            id: Some(EntityId::intern("c1")),
            ..CurveSpec::default()
        });
        state.selected_curve = Some(cid);
        state.quotas.push(QuotaBracket {
            curve_id: cid,
            point_id: EntityId::intern("c1_quota_0"),
            attachment: Attachment::Body,
            t: Some(0.25),
            x: 35.0,
            start_y: 65.0,
            end_y: 85.0,
            label: String::new(),
        });

        let v = state.to_value();
        assert_eq!(v["showGrid"], serde_json::json!(true));
        assert_eq!(v["selectedCurve"], serde_json::json!("c1"));
        assert_eq!(v["mode"], serde_json::json!("curve"));
        assert_eq!(v["paintColor"], serde_json::json!("#3498DB"));
        assert_eq!(v["drawCurveState"], serde_json::Value::Null);
        assert_eq!(v["lineState"], serde_json::Value::Null);
        assert_eq!(v["curves"][0]["type"], serde_json::json!("generic"));
        assert_eq!(v["curves"][0]["color"], serde_json::json!("#000000"));
        let q = &v["quotas"][0];
        assert_eq!(q["curveId"], serde_json::json!("c1"));
        assert_eq!(q["pointId"], serde_json::json!("c1_quota_0"));
        assert_eq!(q["attachment"], serde_json::json!("body"));
        assert_eq!(q["start_y"], serde_json::json!(65.0));
        assert_eq!(q["end_y"], serde_json::json!(85.0));
        assert!(v.get("referenceLines").is_some());
    }

    #[test]
    fn partial_snapshot_imports_with_defaults() {
        let v = serde_json::json!({
            "curves": [
                { "id": "c9", "p1": { "x": 1.0, "y": 2.0 }, "p2": { "x": 3.0, "y": 4.0 } }
            ],
            "mode": "draw-curve"
        });
        let state = GraphState::from_value(v).unwrap();
        assert_eq!(state.curves.len(), 1);
        assert_eq!(state.curves[0].kind, "generic");
        assert_eq!(state.curves[0].color, DEFAULT_CURVE_COLOR);
        assert_eq!(state.mode, Mode::DrawCurve);
        assert!(state.show_grid);
        assert_eq!(state.paint_color, DEFAULT_PAINT_COLOR);
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let v = serde_json::json!({ "curves": "not-an-array" });
        assert!(GraphState::from_value(v).is_err());
    }

    #[test]
    fn state_serde_roundtrip_is_deep_equal() {
        let mut state = GraphState::new();
        let cid = state.push_curve_from_spec(&CurveSpec::default());
        state.selected_curve = Some(cid);
        state.mode = Mode::Paint;
        state.paint_state = Some(PaintBuffer {
            id: EntityId::generate("shade"),
            points: smallvec::smallvec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)],
            color: DEFAULT_PAINT_COLOR,
        });
        state.lines.push(HorizontalLine::at(42.0));

        let back = GraphState::from_value(state.to_value()).unwrap();
        assert_eq!(back, state);
    }
}
