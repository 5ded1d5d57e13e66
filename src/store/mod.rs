//! Flat-file persistence split across logical submodules.

mod codec;
mod error;
mod records;

pub use codec::{decode_line, encode_line};
pub use error::StoreError;
pub use records::RecordStore;
