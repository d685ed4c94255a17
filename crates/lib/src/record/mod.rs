//! Keyed record sets for the passwd, shadow and group databases.
//!
//! Every entity is written under three keys so that the encoded database can
//! be queried by numeric id (`=`), by enumeration index (`0`) or by name
//! (`.`). The three lines for one entity share a byte-identical payload; the
//! only place key text is produced is [`RecordKey`]'s `Display` impl.

pub mod compiler;
pub mod errors;
pub mod key;
pub mod table;

pub use compiler::{AccountSettings, CompiledRecords, RecordCompiler};
pub use errors::{EntityKind, RecordError};
pub use key::{Category, KeyKind, Record, RecordKey, RecordSet};
pub use table::RecordTable;
