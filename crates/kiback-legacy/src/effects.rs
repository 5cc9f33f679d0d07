//! Text rendering attributes shared by properties, labels, free text and pins.

use kiback_sexpr::Sexpr;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum JustifyX {
    Left,
    #[default]
    Center,
    Right,
}

impl JustifyX {
    fn from_name(name: &str) -> JustifyX {
        match name {
            "left" => JustifyX::Left,
            "right" => JustifyX::Right,
            _ => JustifyX::Center,
        }
    }

    /// Single-letter legacy code
    pub fn code(self) -> char {
        match self {
            JustifyX::Left => 'L',
            JustifyX::Center => 'C',
            JustifyX::Right => 'R',
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum JustifyY {
    Top,
    #[default]
    Center,
    Bottom,
}

impl JustifyY {
    fn from_name(name: &str) -> JustifyY {
        match name {
            "top" => JustifyY::Top,
            "bottom" => JustifyY::Bottom,
            _ => JustifyY::Center,
        }
    }

    pub fn code(self) -> char {
        match self {
            JustifyY::Top => 'T',
            JustifyY::Center => 'C',
            JustifyY::Bottom => 'B',
        }
    }
}

/// Parsed `(effects ...)` block. Font sizes are millimeters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Effects {
    pub font_width: f64,
    pub font_height: f64,
    pub italic: bool,
    pub bold: bool,
    pub hide: bool,
    pub justify_x: JustifyX,
    pub justify_y: JustifyY,
}

impl Default for Effects {
    fn default() -> Self {
        Effects {
            font_width: 1.27,
            font_height: 1.27,
            italic: false,
            bold: false,
            hide: false,
            justify_x: JustifyX::Center,
            justify_y: JustifyY::Center,
        }
    }
}

impl Effects {
    /// Build from the body of an `(effects ...)` node.
    pub fn from_body(body: &[Sexpr]) -> Effects {
        let mut effects = Effects::default();
        for entry in body {
            match entry.head() {
                Some("font") => effects.parse_font(entry.body()),
                Some("justify") => {
                    if let Some(x) = entry.arg(0).and_then(Sexpr::as_atom) {
                        effects.justify_x = JustifyX::from_name(x);
                    }
                    if let Some(y) = entry.arg(1).and_then(Sexpr::as_atom) {
                        effects.justify_y = JustifyY::from_name(y);
                    }
                }
                _ => {
                    if entry.as_atom() == Some("hide") {
                        effects.hide = true;
                    }
                }
            }
        }
        effects
    }

    fn parse_font(&mut self, body: &[Sexpr]) {
        for entry in body {
            if entry.head() == Some("size") {
                if let Some(w) = entry.arg(0).and_then(Sexpr::as_f64) {
                    self.font_width = w;
                }
                if let Some(h) = entry.arg(1).and_then(Sexpr::as_f64) {
                    self.font_height = h;
                }
            } else {
                match entry.as_atom() {
                    Some("italic") => self.italic = true,
                    Some("bold") => self.bold = true,
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiback_sexpr::parse;

    fn effects_of(text: &str) -> Effects {
        let node = parse(text).unwrap();
        Effects::from_body(node.body())
    }

    #[test]
    fn defaults_are_centered_and_visible() {
        let effects = Effects::default();
        assert_eq!(effects.font_width, 1.27);
        assert_eq!(effects.justify_x, JustifyX::Center);
        assert_eq!(effects.justify_y, JustifyY::Center);
        assert!(!effects.hide);
        assert!(!effects.italic);
    }

    #[test]
    fn parses_font_and_flags() {
        let effects = effects_of("(effects (font (size 2.54 1.27) italic bold) hide)");
        assert_eq!(effects.font_width, 2.54);
        assert_eq!(effects.font_height, 1.27);
        assert!(effects.italic);
        assert!(effects.bold);
        assert!(effects.hide);
    }

    #[test]
    fn parses_justification() {
        let effects = effects_of("(effects (justify left bottom))");
        assert_eq!(effects.justify_x, JustifyX::Left);
        assert_eq!(effects.justify_y, JustifyY::Bottom);

        let effects = effects_of("(effects (justify right))");
        assert_eq!(effects.justify_x, JustifyX::Right);
        assert_eq!(effects.justify_y, JustifyY::Center);
    }
}
