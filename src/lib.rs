//! lab-ngin
//!
//! The reusable core of a series of interactive graphics labs: a free-fly
//! camera, OBJ meshes with textured submeshes, texture and shader-program
//! loading and a small lighting model. All GPU work goes through the
//! explicit-handle [`gpu::GpuBackend`] trait; [`gpu::WgpuBackend`] implements
//! it on wgpu. Window creation and the event loop stay with the application,
//! which forwards winit events to [`controller::CameraController`].
//!
//! High-level modules
//! - `math`: vector/matrix aliases and transform builders
//! - `camera`: Euler-angle camera, projection and camera uniform
//! - `controller`: winit input to camera commands
//! - `gpu`: resource handles, backend trait and the wgpu backend
//! - `resources`: OBJ mesh and texture loading
//! - `shader`: stage compilation, program linking and bundled WGSL
//! - `lighting`: directional, point and spot lights, toon shading
//! - `data_structures`: transforms and scenes
//!

pub mod camera;
pub mod controller;
pub mod data_structures;
pub mod error;
pub mod gpu;
pub mod lighting;
pub mod logging;
pub mod math;
pub mod resources;
pub mod shader;
pub mod time;

pub use error::{Error, Result};

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use image;
pub use wgpu;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
