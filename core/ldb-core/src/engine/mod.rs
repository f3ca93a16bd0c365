//! Engine Module

pub mod descriptor;
pub mod handle;
pub mod handler;
pub mod plugin;
pub mod registry;
pub mod status;
pub mod surface;
pub mod variables;

pub use handle::TableHandle;
pub use handler::{TableHandler, TableOps};
pub use plugin::Engine;
pub use registry::TableRegistry;
pub use status::{EngineStatus, EngineStatusSnapshot, TableStats, TableStatsSnapshot};
pub use surface::{ExtraHint, FullSurface};
pub use variables::SystemVariables;
