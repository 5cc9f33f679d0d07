//! Named text fields attached to symbols (`Reference`, `Value`, ...).

use kiback_sexpr::Sexpr;
use serde::Serialize;

use crate::effects::Effects;
use crate::geom::{apply, to_mil};

/// A `(property "Name" "text" ...)` field.
///
/// The name is carried so non-standard fields can be re-emitted under their
/// own name in legacy schematic component blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    pub text: String,
    pub id: i64,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub effects: Effects,
}

impl Property {
    /// Build from a `(property ...)` node.
    pub fn from_node(node: &Sexpr) -> Property {
        let mut prop = Property {
            name: node.arg(0).and_then(Sexpr::as_atom).unwrap_or("").to_string(),
            text: node.arg(1).and_then(Sexpr::as_atom).unwrap_or("").to_string(),
            id: -1,
            ..Property::default()
        };
        for entry in node.body().iter().skip(2) {
            match entry.head() {
                Some("id") => {
                    if let Some(id) = entry.arg(0).and_then(Sexpr::as_i64) {
                        prop.id = id;
                    }
                }
                Some("at") => {
                    prop.x = entry.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0);
                    prop.y = entry.arg(1).and_then(Sexpr::as_f64).unwrap_or(0.0);
                    prop.angle = entry.arg(2).and_then(Sexpr::as_f64).unwrap_or(0.0);
                }
                Some("effects") => prop.effects = Effects::from_body(entry.body()),
                _ => {}
            }
        }
        prop
    }

    /// `H` for horizontal text, `V` for anything else. Legacy fields only
    /// know the two orientations.
    fn direction(&self) -> char {
        if self.angle == 0.0 {
            'H'
        } else {
            'V'
        }
    }

    /// Field body for a library `F0`..`F3` line.
    ///
    /// `print_text` is false for the Datasheet field, whose text lives in the
    /// doc library instead.
    pub fn lib_field(&self, print_text: bool) -> String {
        let x = to_mil(self.x);
        let y = to_mil(self.y);
        let size = to_mil(self.effects.font_width);
        let visibility = if self.effects.hide { 'I' } else { 'V' };
        let slant = if self.effects.italic { 'I' } else { 'N' };
        let weight = if self.effects.bold { 'B' } else { 'N' };
        let text = if print_text { self.text.as_str() } else { "" };
        format!(
            "\"{text}\" {x} {y} {size} {} {visibility} {} {}{slant}{weight}",
            self.direction(),
            self.effects.justify_x.code(),
            self.effects.justify_y.code(),
        )
    }

    /// Field body for a schematic `F n` line, with the position mapped
    /// through the placement orientation matrix around the component origin.
    pub fn sch_field(&self, origin: (i64, i64), matrix: [i64; 4]) -> String {
        let (x, y) = apply(matrix, origin, (to_mil(self.x), to_mil(self.y)));
        let size = to_mil(self.effects.font_width);
        let visibility = if self.effects.hide { "0001" } else { "0000" };
        let slant = if self.effects.italic { 'I' } else { 'N' };
        let weight = if self.effects.bold { 'B' } else { 'N' };
        format!(
            "\"{}\" {} {x} {y} {size}  {visibility} {} {}{slant}{weight}",
            self.text,
            self.direction(),
            self.effects.justify_x.code(),
            self.effects.justify_y.code(),
        )
    }
}
