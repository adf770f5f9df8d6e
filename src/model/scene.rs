use glam::{Mat4, Vec3};

use super::animation::Animation;
use super::camera::CameraState;
use super::mouse::MouseTrackingState;

/// Where and how an animated object sits in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub base: Vec3,
    /// Hinge or pivot point, relative to `base`, that rotations turn about.
    pub pivot: Vec3,
    pub axis: Vec3,
    /// Half-size of the box drawn for the object.
    pub extent: Vec3,
    pub color: [f32; 3],
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            base: Vec3::ZERO,
            pivot: Vec3::ZERO,
            axis: Vec3::Y,
            extent: Vec3::splat(0.5),
            color: [0.8, 0.8, 0.8],
        }
    }
}

/// One animated object and its toggle flag.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub engaged: bool,
    pub animation: Animation,
    pub placement: Placement,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, animation: Animation, placement: Placement) -> Self {
        Self {
            name: name.into(),
            engaged: false,
            animation,
            placement,
        }
    }

    /// Model matrix for the renderer.
    pub fn model_matrix(&self) -> Mat4 {
        let p = &self.placement;
        Mat4::from_translation(p.base)
            * self.animation.pose(p.pivot, p.axis)
            * Mat4::from_scale(p.extent * 2.0)
    }

    /// Objects that only drive a colour blend have nothing to draw.
    pub fn is_drawable(&self) -> bool {
        self.animation.fade_factor().is_none()
    }
}

/// Everything the frame loop mutates, in one place.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub camera: CameraState,
    pub mouse: MouseTrackingState,
    pub objects: Vec<SceneObject>,
    pub quit_requested: bool,
}

impl SimulationState {
    pub fn new(camera: CameraState, mouse: MouseTrackingState, objects: Vec<SceneObject>) -> Self {
        Self {
            camera,
            mouse,
            objects,
            quit_requested: false,
        }
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    pub fn is_engaged(&self, name: &str) -> bool {
        self.object(name).is_some_and(|o| o.engaged)
    }

    /// Blend factor of the first fade in the scene, 0 when there is none.
    pub fn sky_factor(&self) -> f32 {
        self.objects
            .iter()
            .find_map(|o| o.animation.fade_factor())
            .unwrap_or(0.0)
    }

    /// Sky colour for the current blend factor.
    pub fn sky_color(&self, day: Vec3, sunset: Vec3) -> Vec3 {
        day.lerp(sunset, self.sky_factor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::animation::{Fade, Hinge};

    fn door_scene() -> SimulationState {
        let door = SceneObject::new(
            "door",
            Animation::Hinge(Hinge::new(45.0, 0.0, 90.0)),
            Placement {
                pivot: Vec3::new(0.185, 0.0, 0.3),
                axis: Vec3::NEG_Y,
                ..Placement::default()
            },
        );
        let sunset = SceneObject::new("sunset", Animation::Fade(Fade::new(0.05)), Placement::default());
        SimulationState::new(CameraState::default(), MouseTrackingState::default(), vec![door, sunset])
    }

    #[test]
    fn lookup_by_name() {
        let mut state = door_scene();
        assert!(state.object("door").is_some());
        assert!(state.object("window").is_none());
        state.object_mut("door").unwrap().engaged = true;
        assert!(state.is_engaged("door"));
        assert!(!state.is_engaged("sunset"));
    }

    #[test]
    fn sky_colour_follows_fade_factor() {
        let mut state = door_scene();
        let day = Vec3::new(0.60, 0.82, 0.96);
        let sunset = Vec3::new(0.96, 0.64, 0.38);
        assert_eq!(state.sky_color(day, sunset), day);
        if let Animation::Fade(f) = &mut state.object_mut("sunset").unwrap().animation {
            f.factor = 0.5;
        }
        assert!((state.sky_color(day, sunset) - (day + sunset) * 0.5).length() < 1e-5);
    }

    #[test]
    fn closed_door_sits_at_its_base() {
        let state = door_scene();
        let door = state.object("door").unwrap();
        let m = door.model_matrix();
        assert!(m.transform_point3(Vec3::ZERO).length() < 1e-5);
        assert!(door.is_drawable());
        assert!(!state.object("sunset").unwrap().is_drawable());
    }
}
