// floortrack_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::displacement::{DisplacementStrategy, MotionInput};
pub use crate::store::{RouteStore, StoredRoute};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::{EngineConfig, PositioningMode, StrategyKind};
pub use crate::messages::{GeoFix, Sample3, SensorEvent};
pub use crate::route::{RoutePoint, RouteSnapshot, RouteTrack};
pub use crate::types::{Anchor, MapId, RouteTag};

// --- The Engine ---
pub use crate::session::{MapMode, PositioningSession, SessionPhase};

// --- Concrete Implementations (Export common ones for convenience) ---
pub use crate::displacement::{Cardinal, CardinalStep, ContinuousIntegration};
pub use crate::geo::GeoToPixelMapper;
pub use crate::motion::{ContinuousMotion, MotionClassifier, MotionState};
pub use crate::orientation::{Heading, OrientationFilter};
pub use crate::store::{JsonRouteStore, MemoryRouteStore};

// --- Errors ---
pub use crate::error::{ConfigError, SessionError, StoreError};
