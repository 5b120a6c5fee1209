//! Snapshot file I/O.

mod hash;
mod load;
mod save;

pub use hash::compute_files_hash;
pub use load::{load_snapshot, parse_snapshot_bytes};
pub use save::{save_snapshot, serialize_snapshot};
