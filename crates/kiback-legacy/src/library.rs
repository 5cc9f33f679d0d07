//! Symbol collections and the `.lib` / `.dcm` document emitters.

use kiback_sexpr::Sexpr;
use serde::Serialize;

use crate::symbol::Symbol;
use crate::Result;

pub const LIB_HEADER: &str = "EESchema-LIBRARY Version 2.4\n#encoding utf-8\n";
pub const LIB_FOOTER: &str = "\n#\n#End Library\n";
pub const DCM_HEADER: &str = "EESchema-DOCLIB  Version 2.0\n";
pub const DCM_FOOTER: &str = "\n#\n#End Doc Library\n";

/// Symbols in declaration order; the vector index is the emission ordinal.
#[derive(Debug, Default, Serialize)]
pub struct Library {
    symbols: Vec<Symbol>,
}

impl Library {
    /// Build from the children of a `kicad_symbol_lib` document (or of a
    /// schematic's `lib_symbols` block).
    ///
    /// Two passes: construct every symbol in document order, then back-link
    /// each extending symbol's name into its base symbol's alias list.
    pub fn from_body(body: &[Sexpr]) -> Result<Library> {
        let mut symbols = Vec::new();
        for entry in body {
            match entry.head() {
                Some("symbol") => {
                    let full_name = entry.arg(0).and_then(Sexpr::as_atom).unwrap_or("");
                    let (libname, name) = split_lib_id(full_name);
                    let body = entry.body().get(1..).unwrap_or_default();
                    symbols.push(Symbol::from_body(libname, name, body)?);
                }
                // version, generator and friends carry nothing we emit
                other => log::debug!("library: skipping '{}' entry", other.unwrap_or("?")),
            }
        }

        let links: Vec<(String, String)> = symbols
            .iter()
            .filter_map(|s| s.extends.clone().map(|base| (base, s.name.clone())))
            .collect();
        for (base, alias) in links {
            match symbols.iter_mut().find(|s| s.name == base) {
                Some(base_symbol) => base_symbol.aliases.push(alias),
                None => log::warn!("symbol '{alias}' extends '{base}' but the base is missing"),
            }
        }

        Ok(Library { symbols })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// The legacy symbol library document. Aliases are folded into their
    /// base symbol's `ALIAS` line and skipped here; everything else emits in
    /// declaration order.
    pub fn to_legacy_lib(&self, cache_lib: bool) -> Result<String> {
        let mut blocks = Vec::new();
        for symbol in self.symbols.iter().filter(|s| s.extends.is_none()) {
            blocks.push(symbol.legacy_def(cache_lib)?);
        }
        Ok(format!("{LIB_HEADER}{}{LIB_FOOTER}", blocks.join("\n")))
    }

    /// The legacy doc library. Full declaration order, aliases included;
    /// undocumented symbols contribute nothing.
    pub fn to_legacy_dcm(&self) -> String {
        let blocks: Vec<String> = self.symbols.iter().filter_map(Symbol::legacy_doc).collect();
        format!("{DCM_HEADER}{}{DCM_FOOTER}", blocks.join("\n"))
    }
}

/// Split an optional `lib:` prefix off a symbol or lib_id name.
pub(crate) fn split_lib_id(full: &str) -> (&str, &str) {
    match full.split_once(':') {
        Some((lib, name)) => (lib, name),
        None => ("", full),
    }
}
