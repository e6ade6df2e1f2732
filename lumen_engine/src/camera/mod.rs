//! Camera module
//!
//! The camera only holds matrices. The engine reads them when a program
//! is bound and never stores cameras itself.

mod camera;

pub use camera::{Camera, CameraMode};
