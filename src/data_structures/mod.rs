//! Engine data structures.
//!
//! - `transform` holds per-object position, rotation and scale
//! - `scene` groups meshes with transforms and the active lighting

pub mod scene;
pub mod transform;
