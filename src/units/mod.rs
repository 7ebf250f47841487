//! Unit descriptors, documents of units, and their on-disk placement

mod document;
mod placement;
mod unit;

pub use document::{Document, DocumentError, UserData, DOCUMENT_HEADER};
pub use placement::{place_unit, unit_dir, PlaceError};
pub use unit::{Persistence, Unit, UnitGroup};
