//! Symbol drawing primitives and their single-line legacy encodings.
//!
//! Every primitive is tagged with the owning unit number and DeMorgan body
//! style (0 means shared). The legacy `DRAW` grammar is positional; field
//! order in the `legacy_line` methods is load-bearing.

use kiback_sexpr::Sexpr;
use serde::Serialize;

use crate::effects::Effects;
use crate::geom::{compact, quadrant, to_mil};
use crate::{Error, Result};

/// Fill mode of a pen-drawn shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Fill {
    #[default]
    None,
    Outline,
    Background,
}

impl Fill {
    fn from_name(name: &str) -> Fill {
        match name {
            "outline" => Fill::Outline,
            "background" => Fill::Background,
            _ => Fill::None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Fill::None => 'N',
            Fill::Outline => 'F',
            Fill::Background => 'f',
        }
    }
}

/// Stroke width and fill shared by rectangle, arc, circle and polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pen {
    pub width: f64,
    pub fill: Fill,
}

impl Default for Pen {
    fn default() -> Self {
        Pen {
            width: 0.254,
            fill: Fill::None,
        }
    }
}

impl Pen {
    /// Consume a `(stroke ...)` or `(fill ...)` entry; false if the entry is
    /// something else.
    fn absorb(&mut self, entry: &Sexpr) -> bool {
        match entry.head() {
            Some("stroke") => {
                if let Some(w) = entry
                    .child("width")
                    .and_then(|n| n.arg(0))
                    .and_then(Sexpr::as_f64)
                {
                    self.width = w;
                }
                true
            }
            Some("fill") => {
                if let Some(kind) = entry
                    .child("type")
                    .and_then(|n| n.arg(0))
                    .and_then(Sexpr::as_atom)
                {
                    self.fill = Fill::from_name(kind);
                }
                true
            }
            _ => false,
        }
    }

    fn width_mil(&self) -> i64 {
        to_mil(self.width)
    }
}

fn point_of(node: &Sexpr) -> (f64, f64) {
    (
        node.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0),
        node.arg(1).and_then(Sexpr::as_f64).unwrap_or(0.0),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rectangle {
    pub unit: i64,
    pub body_style: i64,
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub pen: Pen,
}

impl Rectangle {
    fn from_body(unit: i64, body_style: i64, body: &[Sexpr]) -> Rectangle {
        let mut rect = Rectangle {
            unit,
            body_style,
            start: (0.0, 0.0),
            end: (0.0, 0.0),
            pen: Pen::default(),
        };
        for entry in body {
            match entry.head() {
                Some("start") => rect.start = point_of(entry),
                Some("end") => rect.end = point_of(entry),
                _ => {
                    rect.pen.absorb(entry);
                }
            }
        }
        rect
    }

    pub fn legacy_line(&self) -> String {
        format!(
            "S {} {} {} {} {} {} {} {}",
            to_mil(self.start.0),
            to_mil(self.start.1),
            to_mil(self.end.0),
            to_mil(self.end.1),
            self.unit,
            self.body_style,
            self.pen.width_mil(),
            self.pen.fill.code(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arc {
    pub unit: i64,
    pub body_style: i64,
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub center: (f64, f64),
    pub radius: f64,
    /// Start and end angle in degrees; emitted in tenths of a degree.
    pub angles: (f64, f64),
    pub pen: Pen,
}

impl Arc {
    fn from_body(unit: i64, body_style: i64, body: &[Sexpr]) -> Arc {
        let mut arc = Arc {
            unit,
            body_style,
            start: (0.0, 0.0),
            end: (0.0, 0.0),
            center: (0.0, 0.0),
            radius: 0.0,
            angles: (0.0, 0.0),
            pen: Pen::default(),
        };
        for entry in body {
            match entry.head() {
                Some("start") => arc.start = point_of(entry),
                Some("end") => arc.end = point_of(entry),
                Some("radius") => {
                    for el in entry.body() {
                        match el.head() {
                            Some("at") => arc.center = point_of(el),
                            Some("length") => {
                                arc.radius = el.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0)
                            }
                            Some("angles") => arc.angles = point_of(el),
                            _ => {}
                        }
                    }
                }
                _ => {
                    arc.pen.absorb(entry);
                }
            }
        }
        arc
    }

    pub fn legacy_line(&self) -> String {
        format!(
            "A {} {} {} {} {} {} {} {} {} {} {} {} {}",
            to_mil(self.center.0),
            to_mil(self.center.1),
            to_mil(self.radius),
            (self.angles.0 * 10.0) as i64,
            (self.angles.1 * 10.0) as i64,
            self.unit,
            self.body_style,
            self.pen.width_mil(),
            self.pen.fill.code(),
            to_mil(self.start.0),
            to_mil(self.start.1),
            to_mil(self.end.0),
            to_mil(self.end.1),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub unit: i64,
    pub body_style: i64,
    pub center: (f64, f64),
    pub radius: f64,
    pub pen: Pen,
}

impl Circle {
    fn from_body(unit: i64, body_style: i64, body: &[Sexpr]) -> Circle {
        let mut circle = Circle {
            unit,
            body_style,
            center: (0.0, 0.0),
            radius: 0.0,
            pen: Pen::default(),
        };
        for entry in body {
            match entry.head() {
                Some("center") => circle.center = point_of(entry),
                Some("radius") => {
                    circle.radius = entry.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0)
                }
                _ => {
                    circle.pen.absorb(entry);
                }
            }
        }
        circle
    }

    pub fn legacy_line(&self) -> String {
        format!(
            "C {} {} {} {} {} {} {}",
            to_mil(self.center.0),
            to_mil(self.center.1),
            to_mil(self.radius),
            self.unit,
            self.body_style,
            self.pen.width_mil(),
            self.pen.fill.code(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub unit: i64,
    pub body_style: i64,
    pub points: Vec<(f64, f64)>,
    pub pen: Pen,
}

impl Polyline {
    fn from_body(unit: i64, body_style: i64, body: &[Sexpr]) -> Polyline {
        let mut poly = Polyline {
            unit,
            body_style,
            points: Vec::new(),
            pen: Pen::default(),
        };
        for entry in body {
            match entry.head() {
                Some("pts") => {
                    for el in entry.body() {
                        if el.head() == Some("xy") {
                            poly.points.push(point_of(el));
                        }
                    }
                }
                _ => {
                    poly.pen.absorb(entry);
                }
            }
        }
        poly
    }

    pub fn legacy_line(&self) -> String {
        let coords = self
            .points
            .iter()
            .flat_map(|&(x, y)| [to_mil(x), to_mil(y)])
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "P {} {} {} {} {coords} {}",
            self.points.len(),
            self.unit,
            self.body_style,
            self.pen.width_mil(),
            self.pen.fill.code(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub unit: i64,
    pub body_style: i64,
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Passed through unconverted: both formats store text angles in tenths
    /// of a degree, unlike arcs.
    pub angle: f64,
    pub effects: Effects,
}

impl Text {
    fn from_body(unit: i64, body_style: i64, body: &[Sexpr]) -> Text {
        let mut text = Text {
            unit,
            body_style,
            text: body
                .first()
                .and_then(Sexpr::as_atom)
                .unwrap_or("")
                .to_string(),
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            effects: Effects::default(),
        };
        for entry in body.iter().skip(1) {
            match entry.head() {
                Some("at") => {
                    text.x = entry.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0);
                    text.y = entry.arg(1).and_then(Sexpr::as_f64).unwrap_or(0.0);
                    text.angle = entry.arg(2).and_then(Sexpr::as_f64).unwrap_or(0.0);
                }
                Some("effects") => text.effects = Effects::from_body(entry.body()),
                _ => {}
            }
        }
        text
    }

    pub fn legacy_line(&self) -> String {
        let quoted;
        let body = if self.text.contains(' ') {
            quoted = format!("\"{}\"", self.text);
            quoted.as_str()
        } else {
            self.text.as_str()
        };
        let slant = if self.effects.italic { "Italic" } else { "Normal" };
        let weight = if self.effects.bold { 1 } else { 0 };
        format!(
            "T {} {} {} {} 0 {} {} {body} {slant} {weight} {} {}",
            compact(self.angle),
            to_mil(self.x),
            to_mil(self.y),
            to_mil(self.effects.font_width),
            self.unit,
            self.body_style,
            self.effects.justify_x.code(),
            self.effects.justify_y.code(),
        )
    }
}

/// Electrical pin types with their single-letter legacy codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PinType {
    Input,
    Output,
    Passive,
    PowerIn,
    PowerOut,
    Bidirectional,
    Unspecified,
    TriState,
    Unconnected,
    OpenEmitter,
    OpenCollector,
}

impl PinType {
    fn from_name(name: &str) -> Result<PinType> {
        Ok(match name {
            "input" => PinType::Input,
            "output" => PinType::Output,
            "passive" => PinType::Passive,
            "power_in" => PinType::PowerIn,
            "power_out" => PinType::PowerOut,
            "bidirectional" => PinType::Bidirectional,
            "unspecified" => PinType::Unspecified,
            "tri_state" => PinType::TriState,
            "unconnected" => PinType::Unconnected,
            "open_emitter" => PinType::OpenEmitter,
            "open_collector" => PinType::OpenCollector,
            other => return Err(Error::UnknownPinType(other.to_string())),
        })
    }

    pub fn code(self) -> char {
        match self {
            PinType::Input => 'I',
            PinType::Output => 'O',
            PinType::Passive => 'P',
            PinType::PowerIn => 'W',
            PinType::PowerOut => 'w',
            PinType::Bidirectional => 'B',
            PinType::Unspecified => 'U',
            PinType::TriState => 'T',
            PinType::Unconnected => 'N',
            PinType::OpenEmitter => 'E',
            PinType::OpenCollector => 'C',
        }
    }
}

/// Graphic pin styles with their legacy codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PinStyle {
    Line,
    Clock,
    ClockLow,
    EdgeClockHigh,
    Inverted,
    InvertedClock,
    NonLogic,
    InputLow,
    OutputLow,
}

impl PinStyle {
    fn from_name(name: &str) -> Result<PinStyle> {
        Ok(match name {
            "line" => PinStyle::Line,
            "clock" => PinStyle::Clock,
            "clock_low" => PinStyle::ClockLow,
            "edge_clock_high" => PinStyle::EdgeClockHigh,
            "inverted" => PinStyle::Inverted,
            "inverted_clock" => PinStyle::InvertedClock,
            "non_logic" => PinStyle::NonLogic,
            "input_low" => PinStyle::InputLow,
            "output_low" => PinStyle::OutputLow,
            other => return Err(Error::UnknownPinStyle(other.to_string())),
        })
    }

    pub fn code(self) -> &'static str {
        match self {
            PinStyle::Line => "",
            PinStyle::Clock => "C",
            PinStyle::ClockLow => "CL",
            PinStyle::EdgeClockHigh => "F",
            PinStyle::Inverted => "I",
            PinStyle::InvertedClock => "IC",
            PinStyle::NonLogic => "X",
            PinStyle::InputLow => "L",
            PinStyle::OutputLow => "V",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pin {
    pub unit: i64,
    pub body_style: i64,
    pub pin_type: PinType,
    pub style: PinStyle,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub length: f64,
    pub name: String,
    pub name_effects: Effects,
    pub number: String,
    pub number_effects: Effects,
    pub hidden: bool,
}

impl Pin {
    fn from_body(unit: i64, body_style: i64, body: &[Sexpr]) -> Result<Pin> {
        let pin_type =
            PinType::from_name(body.first().and_then(Sexpr::as_atom).unwrap_or("passive"))?;
        let style = PinStyle::from_name(body.get(1).and_then(Sexpr::as_atom).unwrap_or("line"))?;
        let mut pin = Pin {
            unit,
            body_style,
            pin_type,
            style,
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            length: 0.0,
            name: String::new(),
            name_effects: Effects::default(),
            number: String::new(),
            number_effects: Effects::default(),
            hidden: false,
        };
        for entry in body.iter().skip(2) {
            match entry.head() {
                Some("at") => {
                    pin.x = entry.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0);
                    pin.y = entry.arg(1).and_then(Sexpr::as_f64).unwrap_or(0.0);
                    pin.angle = entry.arg(2).and_then(Sexpr::as_f64).unwrap_or(0.0);
                }
                Some("length") => {
                    pin.length = entry.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0)
                }
                Some("name") => {
                    pin.name = entry.arg(0).and_then(Sexpr::as_atom).unwrap_or("").to_string();
                    if let Some(effects) = entry.child("effects") {
                        pin.name_effects = Effects::from_body(effects.body());
                    }
                }
                Some("number") => {
                    pin.number = entry.arg(0).and_then(Sexpr::as_atom).unwrap_or("").to_string();
                    if let Some(effects) = entry.child("effects") {
                        pin.number_effects = Effects::from_body(effects.body());
                    }
                }
                _ => {
                    if entry.as_atom() == Some("hide") {
                        pin.hidden = true;
                    }
                }
            }
        }
        // pads without an explicit number default to pin 1
        if pin.number.is_empty() {
            pin.number.push('1');
        }
        Ok(pin)
    }

    /// `R`, `U`, `L` or `D` from the orientation angle.
    fn direction(&self) -> char {
        ['R', 'U', 'L', 'D'][quadrant(self.angle)]
    }

    pub fn legacy_line(&self) -> String {
        let mut style = self.style.code().to_string();
        if self.hidden {
            style.insert(0, 'N');
        }
        if !style.is_empty() {
            style.insert(0, ' ');
        }
        format!(
            "X {} {} {} {} {} {} {} {} {} {} {}{style}",
            self.name,
            self.number,
            to_mil(self.x),
            to_mil(self.y),
            to_mil(self.length),
            self.direction(),
            to_mil(self.number_effects.font_width),
            to_mil(self.name_effects.font_width),
            self.unit,
            self.body_style,
            self.pin_type.code(),
        )
    }
}

/// One drawable element. Closed over the six legacy record kinds; the
/// library serializer buckets by variant with an exhaustive match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawItem {
    Rectangle(Rectangle),
    Arc(Arc),
    Circle(Circle),
    Polyline(Polyline),
    Text(Text),
    Pin(Pin),
}

impl DrawItem {
    /// Construct from a drawing node inside a symbol unit block.
    pub fn from_node(unit: i64, body_style: i64, node: &Sexpr) -> Result<DrawItem> {
        let body = node.body();
        Ok(match node.head() {
            Some("rectangle") => DrawItem::Rectangle(Rectangle::from_body(unit, body_style, body)),
            Some("arc") => DrawItem::Arc(Arc::from_body(unit, body_style, body)),
            Some("circle") => DrawItem::Circle(Circle::from_body(unit, body_style, body)),
            Some("polyline") => DrawItem::Polyline(Polyline::from_body(unit, body_style, body)),
            Some("text") => DrawItem::Text(Text::from_body(unit, body_style, body)),
            Some("pin") => DrawItem::Pin(Pin::from_body(unit, body_style, body)?),
            other => return Err(Error::UnknownDrawElement(other.unwrap_or("").to_string())),
        })
    }
}

/// An ordered group of drawing primitives sharing a unit number and body
/// style. Unit 0 / body style 0 mean shared across alternates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    pub number: i64,
    pub body_style: i64,
    pub items: Vec<DrawItem>,
}

impl Unit {
    pub fn from_body(number: i64, body_style: i64, body: &[Sexpr]) -> Result<Unit> {
        let mut items = Vec::with_capacity(body.len());
        for node in body {
            items.push(DrawItem::from_node(number, body_style, node)?);
        }
        Ok(Unit {
            number,
            body_style,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiback_sexpr::parse;

    fn item(unit: i64, body_style: i64, text: &str) -> DrawItem {
        DrawItem::from_node(unit, body_style, &parse(text).unwrap()).unwrap()
    }

    #[test]
    fn rectangle_line() {
        let rect = item(
            0,
            1,
            "(rectangle (start -2.54 2.54) (end 2.54 -2.54)
               (stroke (width 0.254)) (fill (type background)))",
        );
        match rect {
            DrawItem::Rectangle(r) => {
                assert_eq!(r.legacy_line(), "S -100 100 100 -100 0 1 10 f")
            }
            other => panic!("expected rectangle, got {other:?}"),
        }
    }

    #[test]
    fn circle_line() {
        let circle = item(1, 1, "(circle (center 0 0) (radius 1.27) (fill (type outline)))");
        match circle {
            DrawItem::Circle(c) => assert_eq!(c.legacy_line(), "C 0 0 50 1 1 10 F"),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn arc_angles_in_tenths() {
        let arc = item(
            0,
            1,
            "(arc (start -1.27 0) (end 1.27 0)
               (radius (at 0 0) (length 1.27) (angles 180 0)))",
        );
        match arc {
            DrawItem::Arc(a) => {
                assert_eq!(a.legacy_line(), "A 0 0 50 1800 0 0 1 10 N -50 0 50 0")
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn polyline_point_run() {
        let poly = item(
            0,
            1,
            "(polyline (pts (xy 0 0) (xy 2.54 2.54) (xy 5.08 0)) (stroke (width 0)))",
        );
        match poly {
            DrawItem::Polyline(p) => {
                assert_eq!(p.legacy_line(), "P 3 0 1 0 0 0 100 100 200 0 N")
            }
            other => panic!("expected polyline, got {other:?}"),
        }
    }

    #[test]
    fn text_quotes_only_with_spaces() {
        let text = item(0, 0, r#"(text "open collector" (at 0 -5.08 900))"#);
        match text {
            DrawItem::Text(t) => assert_eq!(
                t.legacy_line(),
                "T 900 0 -200 50 0 0 0 \"open collector\" Normal 0 C C"
            ),
            other => panic!("expected text, got {other:?}"),
        }
        let text = item(0, 0, r#"(text "CLK" (at 0 0 0))"#);
        match text {
            DrawItem::Text(t) => {
                assert_eq!(t.legacy_line(), "T 0 0 0 50 0 0 0 CLK Normal 0 C C")
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn pin_line_layout() {
        let pin = item(
            1,
            1,
            r#"(pin passive line (at -5.08 0 0) (length 2.54)
                 (name "~" (effects (font (size 1.27 1.27))))
                 (number "1" (effects (font (size 1.27 1.27)))))"#,
        );
        match pin {
            DrawItem::Pin(p) => assert_eq!(p.legacy_line(), "X ~ 1 -200 0 100 R 50 50 1 1 P"),
            other => panic!("expected pin, got {other:?}"),
        }
    }

    #[test]
    fn pin_without_number_defaults_to_one() {
        let pin = item(1, 1, r#"(pin input clock (at 0 0 180) (length 2.54) (name "CLK"))"#);
        match pin {
            DrawItem::Pin(p) => {
                assert_eq!(p.number, "1");
                assert_eq!(p.legacy_line(), "X CLK 1 0 0 100 L 50 50 1 1 I C");
            }
            other => panic!("expected pin, got {other:?}"),
        }
    }

    #[test]
    fn hidden_pin_style_prefix() {
        let pin = item(
            0,
            1,
            r#"(pin power_in line (at 0 -7.62 90) (length 0) hide
                 (name "GND") (number "3"))"#,
        );
        match pin {
            DrawItem::Pin(p) => assert_eq!(p.legacy_line(), "X GND 3 0 -300 0 U 50 50 0 1 W N"),
            other => panic!("expected pin, got {other:?}"),
        }
    }

    #[test]
    fn unknown_element_is_an_error() {
        let node = parse("(bezier (pts (xy 0 0)))").unwrap();
        assert!(matches!(
            DrawItem::from_node(0, 1, &node),
            Err(Error::UnknownDrawElement(_))
        ));
    }

    #[test]
    fn unknown_pin_type_is_an_error() {
        let node = parse("(pin mystery line (at 0 0 0))").unwrap();
        assert!(matches!(
            DrawItem::from_node(0, 1, &node),
            Err(Error::UnknownPinType(_))
        ));
    }
}
