//! Build minimal container roots from dynamically linked binaries.
//!
//! Uses `ldd` rather than reading the dynamic section directly: the
//! loader trace reports the concrete file each library resolves to on
//! this host, which is exactly what gets hard-linked into the new
//! root. The binary lands under `bin/`, every library at its original
//! absolute path below the root, so overlapping runs for several
//! binaries assemble one container tree incrementally.

mod link;
mod paths;
mod resolve;

pub use link::{materialize, materialize_with, place_dependency, place_entry_point};
pub use paths::map_into_root;
pub use resolve::{parse_ldd_output, DependencyLister, DependencyRecord, Ldd};
