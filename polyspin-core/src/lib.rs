/// Polyspin Core Library - Shared geometry, interaction and scene logic
///
/// This library holds everything the frontends share: polyhedron
/// construction, the play/pause and drag-rotation state machine, the shape
/// parameters and the scene context that ties them to a graphics engine.

pub mod config;
pub mod geometry;
pub mod interaction;
pub mod lighting;
pub mod projection;
pub mod scene;
pub mod shape;
pub mod transform;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use geometry::{build_geometry, FaceCount, Mesh, MeshDefinition, Triangle, Vertex};
pub use interaction::{
    AnimationMode, DragSession, InputSource, Interaction, InteractionState, MouseButton,
    PointerEvent,
};
pub use lighting::Lighting;
pub use projection::{Camera, ProjectedTriangle};
pub use scene::{Frame, GraphicsEngine, Scene, Viewport};
pub use shape::{AngularVelocity, Axis, Channel, Rgb, ShapeConfig};
pub use transform::{Orientation, Transform};
