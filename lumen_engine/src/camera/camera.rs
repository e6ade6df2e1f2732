//! Camera - projection and view matrices plus the pose that produces
//! the view.
//!
//! Setters store and compute nothing; `look_at` is the only operation that
//! derives the view matrix from position and direction.

use glam::{Mat4, Vec3};

/// Vertical field of view of the 3D camera, in degrees
pub const PERSPECTIVE_FOV_DEGREES: f32 = 45.0;
pub const PERSPECTIVE_NEAR: f32 = 0.1;
pub const PERSPECTIVE_FAR: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Orthographic over [-1, 1] on both axes
    Ortho2D,
    /// Perspective with a square aspect ratio
    Perspective3D,
}

#[derive(Debug, Clone)]
pub struct Camera {
    mode: CameraMode,
    projection_matrix: Mat4,
    view_matrix: Mat4,
    position: Vec3,
    direction: Vec3,
    up: Vec3,
}

impl Camera {
    /// Orthographic camera with an identity view
    pub fn new_2d() -> Self {
        Self::with_mode(CameraMode::Ortho2D)
    }

    /// Perspective camera with an identity view
    pub fn new_3d() -> Self {
        Self::with_mode(CameraMode::Perspective3D)
    }

    pub fn with_mode(mode: CameraMode) -> Self {
        Self {
            mode,
            projection_matrix: Self::projection_for(mode),
            view_matrix: Mat4::IDENTITY,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }

    fn projection_for(mode: CameraMode) -> Mat4 {
        match mode {
            CameraMode::Ortho2D => {
                Mat4::orthographic_rh_gl(-1.0, 1.0, -1.0, 1.0, f32::MIN_POSITIVE, f32::MAX)
            }
            CameraMode::Perspective3D => Mat4::perspective_rh_gl(
                PERSPECTIVE_FOV_DEGREES.to_radians(),
                1.0,
                PERSPECTIVE_NEAR,
                PERSPECTIVE_FAR,
            ),
        }
    }

    /// Switch projection mode, keeping the pose and view
    pub fn switch_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
        self.projection_matrix = Self::projection_for(mode);
    }

    /// Recompute the view from position, direction and up
    pub fn look_at(&mut self) {
        self.view_matrix = Mat4::look_at_rh(self.position, self.position + self.direction, self.up);
    }

    // ===== GETTERS =====

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    // ===== SETTERS =====

    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }

    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Viewing direction; a zero vector is ignored
    pub fn set_direction(&mut self, direction: Vec3) {
        if let Some(direction) = direction.try_normalize() {
            self.direction = direction;
        }
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_3d()
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
