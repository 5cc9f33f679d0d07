//! Sheet-level objects and the `.sch` document emitter.

use chrono::Utc;
use kiback_sexpr::Sexpr;
use serde::Serialize;

use crate::effects::Effects;
use crate::geom::{quadrant, to_mil};
use crate::library::split_lib_id;
use crate::symbol::Symbol;
use crate::{Error, Result};

pub const SCH_HEADER: &str = "\
EESchema Schematic File Version 4
EELAYER 30 0
EELAYER END
$Descr A4 11693 8268
encoding utf-8
Sheet 1 1
Title \"\"
Date \"\"
Rev \"\"
Comp \"\"
Comment1 \"\"
Comment2 \"\"
Comment3 \"\"
Comment4 \"\"
$EndDescr
";
pub const SCH_FOOTER: &str = "\n$EndSCHEMATC\n";

fn at_of(body: &[Sexpr]) -> (f64, f64) {
    for entry in body {
        if entry.head() == Some("at") {
            return (
                entry.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0),
                entry.arg(1).and_then(Sexpr::as_f64).unwrap_or(0.0),
            );
        }
    }
    (0.0, 0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Junction {
    pub x: f64,
    pub y: f64,
}

impl Junction {
    fn from_body(body: &[Sexpr]) -> Junction {
        let (x, y) = at_of(body);
        Junction { x, y }
    }

    pub fn legacy_line(&self) -> String {
        format!("Connection ~ {} {}", to_mil(self.x), to_mil(self.y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoConnect {
    pub x: f64,
    pub y: f64,
}

impl NoConnect {
    fn from_body(body: &[Sexpr]) -> NoConnect {
        let (x, y) = at_of(body);
        NoConnect { x, y }
    }

    pub fn legacy_line(&self) -> String {
        format!("NoConn ~ {} {}", to_mil(self.x), to_mil(self.y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wire {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl Wire {
    fn from_body(body: &[Sexpr]) -> Wire {
        let mut wire = Wire {
            start: (0.0, 0.0),
            end: (0.0, 0.0),
        };
        for entry in body {
            if entry.head() == Some("pts") {
                let mut points = entry.body().iter().filter(|e| e.head() == Some("xy"));
                if let Some(p) = points.next() {
                    wire.start = (
                        p.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0),
                        p.arg(1).and_then(Sexpr::as_f64).unwrap_or(0.0),
                    );
                }
                if let Some(p) = points.next() {
                    wire.end = (
                        p.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0),
                        p.arg(1).and_then(Sexpr::as_f64).unwrap_or(0.0),
                    );
                }
            }
        }
        wire
    }

    pub fn legacy_lines(&self) -> String {
        format!(
            "Wire Wire Line\n\t{} {} {} {}",
            to_mil(self.start.0),
            to_mil(self.start.1),
            to_mil(self.end.0),
            to_mil(self.end.1),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub effects: Effects,
}

impl Label {
    fn from_body(body: &[Sexpr]) -> Label {
        let mut label = Label {
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
                    label.x = entry.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0);
                    label.y = entry.arg(1).and_then(Sexpr::as_f64).unwrap_or(0.0);
                    label.angle = entry.arg(2).and_then(Sexpr::as_f64).unwrap_or(0.0);
                }
                Some("effects") => label.effects = Effects::from_body(entry.body()),
                _ => {}
            }
        }
        label
    }

    pub fn legacy_lines(&self) -> String {
        let slant = if self.effects.italic { "Italic" } else { "~" };
        let weight = if self.effects.bold { "10" } else { "0" };
        format!(
            "Text Label {} {} {}    {}   {slant} {weight}\n{}",
            to_mil(self.x),
            to_mil(self.y),
            quadrant(self.angle),
            to_mil(self.effects.font_width),
            self.text,
        )
    }
}

/// One schematic sheet: wiring objects plus placed symbol instances.
///
/// Instance identifiers count up from the Unix timestamp taken at
/// construction, so placements on one sheet never collide.
#[derive(Debug, Serialize)]
pub struct Schematic {
    pub junctions: Vec<Junction>,
    pub no_connects: Vec<NoConnect>,
    pub wires: Vec<Wire>,
    pub labels: Vec<Label>,
    pub symbols: Vec<Symbol>,
    next_id: u64,
}

impl Schematic {
    pub fn new() -> Schematic {
        Schematic::seeded(Utc::now().timestamp() as u64)
    }

    /// Deterministic variant for tests.
    pub fn seeded(seed: u64) -> Schematic {
        Schematic {
            junctions: Vec::new(),
            no_connects: Vec::new(),
            wires: Vec::new(),
            labels: Vec::new(),
            symbols: Vec::new(),
            next_id: seed,
        }
    }

    /// Route one sheet-level node into the matching collection.
    pub fn add_entry(&mut self, node: &Sexpr) -> Result<()> {
        let body = node.body();
        match node.head() {
            Some("junction") => self.junctions.push(Junction::from_body(body)),
            Some("no_connect") => self.no_connects.push(NoConnect::from_body(body)),
            Some("wire") => self.wires.push(Wire::from_body(body)),
            Some("label") => self.labels.push(Label::from_body(body)),
            Some("symbol") => self.add_placement(node)?,
            // sheet-instance bookkeeping with no legacy counterpart
            Some("path") | Some("sheet_instances") | Some("symbol_instances") => {}
            other => log::debug!("schematic: skipping '{}' entry", other.unwrap_or("?")),
        }
        Ok(())
    }

    fn add_placement(&mut self, node: &Sexpr) -> Result<()> {
        let lib_id = match node.body().first() {
            Some(first) if first.head() == Some("lib_id") => {
                first.arg(0).and_then(Sexpr::as_atom).unwrap_or("")
            }
            _ => return Err(Error::MissingLibId),
        };
        let (libname, name) = split_lib_id(lib_id);
        let mut symbol = Symbol::from_body(libname, name, &node.body()[1..])?;
        symbol.time_id = self.next_id;
        self.next_id += 1;
        self.symbols.push(symbol);
        Ok(())
    }

    /// The legacy schematic document: junctions, no-connects, wires, labels,
    /// then component blocks, in that order.
    pub fn to_legacy_sch(&self) -> Result<String> {
        let mut lines: Vec<String> = Vec::new();
        lines.extend(self.junctions.iter().map(Junction::legacy_line));
        lines.extend(self.no_connects.iter().map(NoConnect::legacy_line));
        lines.extend(self.wires.iter().map(Wire::legacy_lines));
        lines.extend(self.labels.iter().map(Label::legacy_lines));
        for symbol in &self.symbols {
            lines.push(symbol.legacy_comp()?);
        }
        Ok(format!("{SCH_HEADER}{}{SCH_FOOTER}", lines.join("\n")))
    }
}

impl Default for Schematic {
    fn default() -> Self {
        Schematic::new()
    }
}
