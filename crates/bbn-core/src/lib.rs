#![deny(missing_docs)]
#![doc = "Units, physical constants, the cosmological state record and the shared error type of the BBN kinetics engine."]

pub mod errors;
pub mod hash;
pub mod state;
pub mod units;

pub use errors::{BbnError, ErrorInfo};
pub use hash::{stable_hash_string, to_canonical_json_bytes};
pub use state::CosmologicalState;
pub use units::{CONST, UNITS};
