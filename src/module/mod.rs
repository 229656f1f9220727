// Tue Jan 13 2026 - Alex

pub mod error;
pub mod record;
pub mod snapshot;
pub mod table;
pub mod value;

pub use error::{SnapshotError, ValueError};
pub use record::{ModuleId, ModuleRecord};
pub use snapshot::{load_snapshot, parse_snapshot, value_to_json};
pub use table::{ModuleCache, ModuleTable};
pub use value::{Callable, ExportValue, NativeFn, ObjectData, ObjectFlags, ObjectRef};
