//! Coex checkpoint persistence
//!
//! Each phase of a run writes its result under a common prefix so a later
//! invocation can pick up where the previous one stopped:
//!
//! | File | Content |
//! |------|---------|
//! | `<prefix>.cbsd` | Device records (JSON) |
//! | `<prefix>.ewt` | Edge-weight table with model tag (text) |
//! | `<prefix>.cvg` | Coverage maps (JSON) |
//! | `<prefix>.area` | Area grid (JSON) |
//! | `<prefix>.gc` | Coloring results (JSON) |
//! | `<prefix>.manifest.json` | Run summary |
//!
//! Existing runs are never overwritten by [`CheckpointStore::next_free_prefix`]
//! users: the first free `<prefix>-N` is picked instead.

pub mod error;
pub mod ewt;
pub mod json_store;
pub mod records;
pub mod snapshot;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use ewt::{decode_table, encode_table};
pub use json_store::JsonStore;
pub use records::{ColoringRecord, CoverageRecord, RunManifest, coverage_map, coverage_record};
pub use snapshot::{RunSnapshot, load_run, save_run};
pub use store::CheckpointStore;
