use glam::{Mat4, Vec3};

pub const PITCH_LIMIT: f32 = 89.0;
pub const FOV_MIN: f32 = 1.0;
pub const FOV_MAX: f32 = 45.0;

/// Free-fly camera. Angles are in degrees.
#[derive(Debug, Clone)]
pub struct CameraState {
    pub position: Vec3,
    front: Vec3,
    pub up: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl CameraState {
    pub fn new(position: Vec3, yaw: f32, pitch: f32, fov: f32) -> Self {
        let mut cam = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            yaw,
            pitch: 0.0,
            fov: FOV_MAX,
            z_near: 0.1,
            z_far: 100.0,
        };
        cam.set_fov(fov);
        cam.set_orientation(yaw, pitch);
        cam
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Unit vector pointing to the camera's right, `normalize(front x up)`.
    pub fn right(&self) -> Vec3 {
        self.front.cross(self.up).normalize()
    }

    /// Set yaw/pitch and rebuild the front vector. Pitch is clamped to
    /// [-89, 89] so the view never flips over the pole.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.front = front_from_angles(self.yaw, self.pitch);
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(FOV_MIN, FOV_MAX);
    }

    pub fn target(&self) -> Vec3 {
        self.position + self.front
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target(), self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.0, 8.0), -90.0, 0.0, FOV_MAX)
    }
}

// Spherical to Cartesian, y up.
fn front_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = CameraState::default();
        assert!((cam.front() - Vec3::NEG_Z).length() < 1e-5);
        assert!((cam.right() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn pitch_and_fov_are_clamped_on_construction() {
        let cam = CameraState::new(Vec3::ZERO, 0.0, 120.0, 90.0);
        assert_eq!(cam.pitch(), PITCH_LIMIT);
        assert_eq!(cam.fov(), FOV_MAX);
    }

    #[test]
    fn front_stays_unit_length() {
        let mut cam = CameraState::default();
        for (yaw, pitch) in [(0.0, 0.0), (37.0, -88.0), (-720.5, 89.0), (1e4, 45.0)] {
            cam.set_orientation(yaw, pitch);
            assert!((cam.front().length() - 1.0).abs() < 1e-5);
        }
    }
}
