use crate::model::SimulationState;

/// Advances every animated object by one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationUpdater;

impl AnimationUpdater {
    pub fn new() -> Self {
        Self
    }

    /// Runs every frame whether or not a toggle changed; the flag only picks
    /// the direction or target.
    pub fn update(&self, state: &mut SimulationState, dt: f32) {
        for object in &mut state.objects {
            object.animation.step(&mut object.engaged, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Animation, CameraState, Ease, Fade, Hinge, MouseTrackingState, Placement, SceneObject, Spin};
    use glam::Vec3;

    #[test]
    fn updates_every_object_in_place() {
        let mut state = SimulationState::new(
            CameraState::default(),
            MouseTrackingState::default(),
            vec![
                SceneObject::new("door", Animation::Hinge(Hinge::new(45.0, 0.0, 90.0)), Placement::default()),
                SceneObject::new("chair", Animation::Ease(Ease::new(-50.0, Vec3::new(-1.8, 0.0, 0.0), 3.6, 2.7)), Placement::default()),
                SceneObject::new("sunset", Animation::Fade(Fade::new(0.5)), Placement::default()),
                SceneObject::new("ball", Animation::Spin(Spin::new(0.4)), Placement::default()),
            ],
        );
        for object in &mut state.objects {
            object.engaged = true;
        }

        let updater = AnimationUpdater::new();
        updater.update(&mut state, 1.0);

        let angle = |name: &str| state.object(name).unwrap().animation.angle();
        assert_eq!(angle("door"), 45.0);
        assert_eq!(angle("chair"), -50.0);
        assert!((angle("ball") - 0.4).abs() < 1e-6);
        assert_eq!(state.object("sunset").unwrap().animation.fade_factor(), Some(0.5));
        assert!(state.is_engaged("sunset"));

        updater.update(&mut state, 1.0);
        assert_eq!(state.object("sunset").unwrap().animation.fade_factor(), Some(0.0));
        assert!(!state.is_engaged("sunset"));
    }
}
