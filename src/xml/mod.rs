//! XML boundary of the engine.
//!
//! [`read_nodeset`] turns one UANodeSet document into the engine's data
//! model, [`write_address_space`] turns the merged graph back into a single
//! document. Content the engine does not interpret survives the round trip
//! verbatim as raw fragments.

mod reader;
mod writer;

pub use reader::read_nodeset;
pub use writer::write_address_space;
