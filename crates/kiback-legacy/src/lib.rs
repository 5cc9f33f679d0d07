//! Backport of KiCad 6 S-expression documents to the legacy v4 formats.
//!
//! A parsed `.kicad_sym` library or `.kicad_sch` sheet goes through
//! [`Document::from_sexpr`], which builds the typed model, and comes out of
//! the `to_legacy_*` emitters as `.lib`, `.dcm`, `.sch` and `-cache.lib`
//! text. The emitters reproduce the positional legacy grammar byte for byte;
//! see the individual modules for the field layouts.

pub mod draw;
pub mod effects;
pub mod geom;
pub mod library;
pub mod property;
pub mod schematic;
pub mod symbol;

use kiback_sexpr::Sexpr;

pub use draw::{DrawItem, Fill, Pin, PinStyle, PinType, Unit};
pub use effects::{Effects, JustifyX, JustifyY};
pub use geom::{orientation_matrix, to_mil, Mirror};
pub use library::Library;
pub use property::Property;
pub use schematic::Schematic;
pub use symbol::Symbol;

/// Errors raised while building the model or emitting legacy text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("document head is '{0}', expected kicad_symbol_lib or kicad_sch")]
    UnknownDocument(String),

    #[error("document root is not a list")]
    NotAList,

    #[error("symbol unit block '{0}' does not end in _<unit>_<bodystyle>")]
    BadUnitName(String),

    #[error("placed symbol does not start with a lib_id node")]
    MissingLibId,

    #[error("symbol '{symbol}' has no {field} property")]
    MissingProperty {
        symbol: String,
        field: &'static str,
    },

    #[error("unknown drawing element '{0}'")]
    UnknownDrawElement(String),

    #[error("unknown pin electrical type '{0}'")]
    UnknownPinType(String),

    #[error("unknown pin graphic style '{0}'")]
    UnknownPinStyle(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A classified input document, ready for legacy emission.
#[derive(Debug)]
pub enum Document {
    /// A symbol library; emits `.lib` and `.dcm`.
    Library(Library),
    /// A schematic sheet; emits `.sch` plus a `-cache.lib` built from the
    /// embedded `lib_symbols` block.
    Schematic { sheet: Schematic, cache: Library },
}

impl Document {
    /// Classify a parsed top-level expression and build the domain model.
    pub fn from_sexpr(root: &Sexpr) -> Result<Document> {
        let items = root.as_list().ok_or(Error::NotAList)?;
        match items.first().and_then(Sexpr::as_atom) {
            Some("kicad_symbol_lib") => {
                Ok(Document::Library(Library::from_body(&items[1..])?))
            }
            Some("kicad_sch") => {
                let mut sheet = Schematic::new();
                let mut lib_symbols: &[Sexpr] = &[];
                for entry in &items[1..] {
                    if entry.head() == Some("lib_symbols") {
                        lib_symbols = entry.body();
                    } else {
                        sheet.add_entry(entry)?;
                    }
                }
                let cache = Library::from_body(lib_symbols)?;
                Ok(Document::Schematic { sheet, cache })
            }
            other => Err(Error::UnknownDocument(other.unwrap_or("").to_string())),
        }
    }
}
