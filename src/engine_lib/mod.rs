// src/engine_lib/mod.rs
pub mod polygon;
pub mod storage;
pub mod store;
pub mod drawing;
pub mod surface;
pub mod panels;
pub mod preferences;
pub mod camera;

pub use polygon::{Polygon, PolygonId, PolygonPatch};
pub use storage::{MemoryStorage, Storage};
pub use store::{PolygonStore, StoreSnapshot, SubscriptionId};
pub use drawing::{DrawState, DrawingMachine};
pub use surface::{MapSurface, RenderFrame, SurfaceEvent, SurfaceOutcome};
pub use panels::{ListAction, ListEntry, ListPanel, PolygonStats};
pub use preferences::Preferences;
pub use camera::MapCamera;
