pub mod metrics;
pub mod workspace;

pub use metrics::{get_metrics, init_metrics};
pub use workspace::{JobWorkspace, PathAllocator, TempWorkspace, UuidPathAllocator};
