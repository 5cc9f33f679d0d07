//! The symbol aggregate: library definitions and schematic placements.

use kiback_sexpr::Sexpr;
use serde::Serialize;

use crate::draw::{DrawItem, Unit};
use crate::geom::{orientation_matrix, to_mil, Mirror};
use crate::property::Property;
use crate::{Error, Result};

/// A part definition, and — when it comes from a schematic sheet — its
/// placement on that sheet.
#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    pub libname: String,
    pub name: String,
    /// Set when this symbol is an alias of another symbol's graphics.
    pub extends: Option<String>,
    pub power: bool,
    pub locked: bool,
    pub pin_numbers_hide: bool,
    pub pin_numbers_offset: f64,
    pub pin_names_hide: bool,
    pub pin_names_offset: f64,
    pub reference: Option<Property>,
    pub value: Option<Property>,
    pub footprint: Option<Property>,
    /// Free text moves to the doc library; the `F3` field stays empty.
    pub datasheet: Option<Property>,
    pub keywords: Option<Property>,
    pub description: Option<Property>,
    pub fp_filters: Option<Property>,
    /// Non-standard named properties, in declaration order.
    pub extra_properties: Vec<Property>,
    /// Names of symbols extending this one; filled by the library back-link
    /// pass.
    pub aliases: Vec<String>,
    pub units: Vec<Unit>,

    // Placement state, meaningful only for schematic instances.
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub mirror: Mirror,
    pub placed_unit: i64,
    pub in_bom: bool,
    pub on_board: bool,
    pub uuid: String,
    /// Per-sheet instance identifier, assigned by the schematic builder.
    pub time_id: u64,
}

impl Symbol {
    fn new(libname: &str, name: &str) -> Symbol {
        Symbol {
            libname: libname.to_string(),
            name: name.to_string(),
            extends: None,
            power: false,
            locked: false,
            pin_numbers_hide: false,
            pin_numbers_offset: 0.0,
            pin_names_hide: false,
            pin_names_offset: 1.016, // 40 mil, the editor default
            reference: None,
            value: None,
            footprint: None,
            datasheet: None,
            keywords: None,
            description: None,
            fp_filters: None,
            extra_properties: Vec::new(),
            aliases: Vec::new(),
            units: Vec::new(),
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            mirror: Mirror::None,
            placed_unit: 1,
            in_bom: false,
            on_board: false,
            uuid: String::new(),
            time_id: 0,
        }
    }

    /// Build a symbol from the body of a `(symbol ...)` node. `body` starts
    /// after the name.
    pub fn from_body(libname: &str, name: &str, body: &[Sexpr]) -> Result<Symbol> {
        let mut symbol = Symbol::new(libname, name);
        for entry in body {
            match entry.head() {
                Some("property") => symbol.add_property(entry),
                Some("symbol") => {
                    // a per-unit drawing block, named <symbol>_<unit>_<style>
                    let block_name = entry.arg(0).and_then(Sexpr::as_atom).unwrap_or("");
                    let (unit, body_style) = unit_numbers(block_name)?;
                    symbol
                        .units
                        .push(Unit::from_body(unit, body_style, &entry.body()[1..])?);
                }
                Some("extends") => {
                    symbol.extends = entry.arg(0).and_then(Sexpr::as_atom).map(String::from)
                }
                Some("power") => symbol.power = true,
                Some("pin_numbers") => {
                    let (hide, offset) = hide_and_offset(entry.body());
                    symbol.pin_numbers_hide = hide;
                    if let Some(offset) = offset {
                        symbol.pin_numbers_offset = offset;
                    }
                }
                Some("pin_names") => {
                    let (hide, offset) = hide_and_offset(entry.body());
                    symbol.pin_names_hide = hide;
                    if let Some(offset) = offset {
                        symbol.pin_names_offset = offset;
                    }
                }
                Some("at") => {
                    symbol.x = entry.arg(0).and_then(Sexpr::as_f64).unwrap_or(0.0);
                    symbol.y = entry.arg(1).and_then(Sexpr::as_f64).unwrap_or(0.0);
                    symbol.angle = entry.arg(2).and_then(Sexpr::as_f64).unwrap_or(0.0);
                }
                Some("mirror") => {
                    symbol.mirror = Mirror::from_name(
                        entry.arg(0).and_then(Sexpr::as_atom).unwrap_or(""),
                    )
                }
                Some("unit") => {
                    symbol.placed_unit = entry.arg(0).and_then(Sexpr::as_i64).unwrap_or(1)
                }
                Some("in_bom") => {
                    symbol.in_bom = entry.arg(0).and_then(Sexpr::as_atom) == Some("yes")
                }
                Some("on_board") => {
                    symbol.on_board = entry.arg(0).and_then(Sexpr::as_atom) == Some("yes")
                }
                Some("uuid") => {
                    symbol.uuid = entry.arg(0).and_then(Sexpr::as_atom).unwrap_or("").to_string()
                }
                other => {
                    log::warn!(
                        "symbol {}: skipping unknown entry '{}'",
                        symbol.name,
                        other.unwrap_or("?")
                    );
                }
            }
        }
        Ok(symbol)
    }

    fn add_property(&mut self, node: &Sexpr) {
        let prop = Property::from_node(node);
        match prop.name.as_str() {
            "Reference" => self.reference = Some(prop),
            "Value" => self.value = Some(prop),
            "Footprint" => self.footprint = Some(prop),
            "Datasheet" => self.datasheet = Some(prop),
            "ki_keywords" => self.keywords = Some(prop),
            "ki_description" => self.description = Some(prop),
            "ki_fp_filters" => self.fp_filters = Some(prop),
            "ki_locked" => self.locked = true,
            name if name.starts_with("ki_") => {
                log::warn!("symbol {}: skipping unknown property '{name}'", self.name);
            }
            _ => self.extra_properties.push(prop),
        }
    }

    fn require<'a>(&self, field: &'static str, prop: &'a Option<Property>) -> Result<&'a Property> {
        prop.as_ref().ok_or_else(|| Error::MissingProperty {
            symbol: self.name.clone(),
            field,
        })
    }

    /// Highest unit-specific unit number, defaulting to 1.
    ///
    /// Best effort: a final unit with no geometry of its own is invisible
    /// here. The legacy writers used the same heuristic, so keep it.
    pub fn drawable_units(&self) -> i64 {
        self.units
            .iter()
            .map(|u| u.number)
            .filter(|&n| n > 0)
            .max()
            .unwrap_or(1)
    }

    /// The `DEF`..`ENDDEF` block of a legacy library. Cache libraries prefix
    /// the symbol name with the library name.
    pub fn legacy_def(&self, cache_lib: bool) -> Result<String> {
        let reference = self.require("Reference", &self.reference)?;
        let value = self.require("Value", &self.value)?;
        let footprint = self.require("Footprint", &self.footprint)?;
        let datasheet = self.require("Datasheet", &self.datasheet)?;

        let name = if cache_lib {
            format!("{}_{}", self.libname, self.name)
        } else {
            self.name.clone()
        };

        // bucket primitives by kind; emission order is fixed per kind, not
        // source order
        let mut arcs = Vec::new();
        let mut circles = Vec::new();
        let mut texts = Vec::new();
        let mut rectangles = Vec::new();
        let mut polylines = Vec::new();
        let mut pins = Vec::new();
        for unit in &self.units {
            for item in &unit.items {
                match item {
                    DrawItem::Arc(el) => arcs.push(el.legacy_line()),
                    DrawItem::Circle(el) => circles.push(el.legacy_line()),
                    DrawItem::Text(el) => texts.push(el.legacy_line()),
                    DrawItem::Rectangle(el) => rectangles.push(el.legacy_line()),
                    DrawItem::Polyline(el) => polylines.push(el.legacy_line()),
                    DrawItem::Pin(el) => pins.push(el.legacy_line()),
                }
            }
        }

        let mut lines = Vec::new();
        lines.push("#".to_string());
        lines.push(format!("# {name}"));
        lines.push("#".to_string());
        lines.push(format!(
            "DEF {name} {} {} {} {} {} {} {} {}",
            reference.text,
            to_mil(self.pin_numbers_offset),
            to_mil(self.pin_names_offset),
            if self.pin_numbers_hide { 'N' } else { 'Y' },
            if self.pin_names_hide { 'N' } else { 'Y' },
            self.drawable_units(),
            if self.locked { 'L' } else { 'F' },
            if self.power { 'P' } else { 'N' },
        ));
        lines.push(format!("F0 {}", reference.lib_field(true)));
        lines.push(format!("F1 {}", value.lib_field(true)));
        lines.push(format!("F2 {}", footprint.lib_field(true)));
        // datasheet text goes to the doc library, not here
        lines.push(format!("F3 {}", datasheet.lib_field(false)));
        if !self.aliases.is_empty() {
            lines.push(format!("ALIAS {}", self.aliases.join(" ")));
        }
        if let Some(fplist) = &self.fp_filters {
            lines.push("$FPLIST".to_string());
            lines.push(format!(" {}", fplist.text));
            lines.push("$ENDFPLIST".to_string());
        }
        lines.push("DRAW".to_string());
        for group in [arcs, circles, texts, rectangles, polylines, pins] {
            lines.extend(group);
        }
        lines.push("ENDDRAW".to_string());
        lines.push("ENDDEF".to_string());
        Ok(lines.join("\n"))
    }

    /// The `$CMP` block of a legacy doc library, or `None` when the symbol
    /// has no description, keywords or datasheet text.
    pub fn legacy_doc(&self) -> Option<String> {
        fn text_of(prop: &Option<Property>) -> Option<&str> {
            prop.as_ref()
                .map(|p| p.text.as_str())
                .filter(|t| !t.is_empty())
        }
        let description = text_of(&self.description);
        let keywords = text_of(&self.keywords);
        let datasheet = text_of(&self.datasheet);
        if description.is_none() && keywords.is_none() && datasheet.is_none() {
            return None;
        }
        let mut lines = Vec::new();
        lines.push("#".to_string());
        lines.push(format!("$CMP {}", self.name));
        if let Some(text) = description {
            lines.push(format!("D {text}"));
        }
        if let Some(text) = keywords {
            lines.push(format!("K {text}"));
        }
        if let Some(text) = datasheet {
            lines.push(format!("F {text}"));
        }
        lines.push("$ENDCMP".to_string());
        Some(lines.join("\n"))
    }

    /// The `$Comp` block of a legacy schematic for a placed instance.
    pub fn legacy_comp(&self) -> Result<String> {
        let reference = self.require("Reference", &self.reference)?;
        let value = self.require("Value", &self.value)?;
        let footprint = self.require("Footprint", &self.footprint)?;
        let datasheet = self.require("Datasheet", &self.datasheet)?;

        let x = to_mil(self.x);
        let y = to_mil(self.y);
        let matrix = orientation_matrix(self.angle, self.mirror);

        let mut lines = Vec::new();
        lines.push("$Comp".to_string());
        lines.push(format!("L {}:{} {}", self.libname, self.name, reference.text));
        lines.push(format!("U {} 1 {:X}", self.placed_unit, self.time_id));
        lines.push(format!("P {x} {y}"));
        for (n, prop) in [reference, value, footprint, datasheet].iter().enumerate() {
            lines.push(format!("F {n} {}", prop.sch_field((x, y), matrix)));
        }
        for (n, prop) in self.extra_properties.iter().enumerate() {
            lines.push(format!(
                "F {} {} \"{}\"",
                n + 4,
                prop.sch_field((x, y), matrix),
                prop.name,
            ));
        }
        lines.push(format!("\t1    {x} {y}"));
        lines.push(format!(
            "\t{}    {}    {}    {}",
            matrix[0], matrix[1], matrix[2], matrix[3]
        ));
        lines.push("$EndComp".to_string());
        Ok(lines.join("\n"))
    }
}

/// Hide flag and optional offset from a `(pin_numbers ...)` or
/// `(pin_names ...)` body.
fn hide_and_offset(body: &[Sexpr]) -> (bool, Option<f64>) {
    let mut hide = false;
    let mut offset = None;
    for entry in body {
        if entry.head() == Some("offset") {
            offset = entry.arg(0).and_then(Sexpr::as_f64);
        } else if entry.as_atom() == Some("hide") {
            hide = true;
        }
    }
    (hide, offset)
}

/// Split the `_<unit>_<style>` suffix off a per-unit drawing block name.
fn unit_numbers(block_name: &str) -> Result<(i64, i64)> {
    let mut parts = block_name.rsplit('_');
    let body_style = parts.next().and_then(|p| p.parse().ok());
    let unit = parts.next().and_then(|p| p.parse().ok());
    match (unit, body_style) {
        (Some(unit), Some(body_style)) => Ok((unit, body_style)),
        _ => Err(Error::BadUnitName(block_name.to_string())),
    }
}
