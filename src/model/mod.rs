//! Record model and snapshot types

mod record;
mod snapshot;

pub use record::{format_value_per_100k, AcceptedRecord, RawRecord};
pub use snapshot::{format_timestamp, Snapshot};
