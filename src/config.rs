//! Scene descriptions.
//!
//! A [`SceneConfig`] is everything that differs between scenes: which
//! objects exist and how they move, the camera start, sky colours and the
//! keys that drive it all. Two presets are built in; any scene can be dumped
//! to TOML and loaded back with `confy`.

use std::collections::HashSet;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::controller::{ActionBinding, CameraController, InputSampler, Key, KeyBindings, ToggleEffect};
use crate::error::ConfigError;
use crate::model::{
    Animation, CameraState, Ease, Fade, Hinge, MouseTrackingState, Placement, SceneObject, SimulationState, Spin,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Doors, chair, shower and sunset on keys 1-4.
    House,
    /// Spinning ball and dog, sunset on T.
    Pet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Longest time step fed to the simulation, in seconds.
    pub max_frame_delta: f32,
    pub camera: CameraConfig,
    pub sky: SkyConfig,
    pub bindings: KeyBindings,
    pub objects: Vec<ObjectConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 8.0),
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
            move_speed: 2.5,
            mouse_sensitivity: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyConfig {
    pub day: [f32; 3],
    pub sunset: [f32; 3],
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            day: [0.60, 0.82, 0.96],
            sunset: [0.96, 0.64, 0.38],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub name: String,
    pub animation: AnimationConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnimationConfig {
    Hinge { rate: f32, min: f32, max: f32 },
    Ease {
        target_rotation: f32,
        target_position: Vec3,
        rotation_rate: f32,
        position_rate: f32,
    },
    Fade { speed: f32 },
    Spin { step: f32 },
}

impl AnimationConfig {
    pub fn build(&self) -> Animation {
        match *self {
            AnimationConfig::Hinge { rate, min, max } => Animation::Hinge(Hinge::new(rate, min, max)),
            AnimationConfig::Ease {
                target_rotation,
                target_position,
                rotation_rate,
                position_rate,
            } => Animation::Ease(Ease::new(target_rotation, target_position, rotation_rate, position_rate)),
            AnimationConfig::Fade { speed } => Animation::Fade(Fade::new(speed)),
            AnimationConfig::Spin { step } => Animation::Spin(Spin::new(step)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub base: Vec3,
    pub pivot: Vec3,
    pub axis: Vec3,
    pub extent: Vec3,
    pub color: [f32; 3],
}

impl Default for PlacementConfig {
    fn default() -> Self {
        let p = Placement::default();
        Self {
            base: p.base,
            pivot: p.pivot,
            axis: p.axis,
            extent: p.extent,
            color: p.color,
        }
    }
}

impl PlacementConfig {
    fn build(&self) -> Placement {
        Placement {
            base: self.base,
            pivot: self.pivot,
            axis: self.axis.try_normalize().unwrap_or(Vec3::Y),
            extent: self.extent,
            color: self.color,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::preset(Preset::House)
    }
}

impl SceneConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::House => house(),
            Preset::Pet => pet(),
        }
    }

    /// Read a TOML scene file. The file must exist; `confy` would otherwise
    /// create it from the default scene.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let config: SceneConfig = confy::load_path(path).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), objects = config.objects.len(), "loaded scene file");
        Ok(config)
    }

    pub fn store(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self).map_err(|source| ConfigError::Store {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "width/height",
                reason: format!("window size {}x{} is empty", self.width, self.height),
            });
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(ConfigError::InvalidSetting {
                field: "max_frame_delta",
                reason: format!("must be a positive number of seconds, got {}", self.max_frame_delta),
            });
        }
        check_rate("camera", "move_speed", self.camera.move_speed)?;
        check_rate("camera", "mouse_sensitivity", self.camera.mouse_sensitivity)?;

        if self.objects.is_empty() {
            return Err(ConfigError::Empty);
        }
        let mut names = HashSet::new();
        for object in &self.objects {
            if object.name.is_empty() {
                return Err(ConfigError::UnnamedObject);
            }
            if !names.insert(object.name.as_str()) {
                return Err(ConfigError::DuplicateObject(object.name.clone()));
            }
            object.validate()?;
        }

        let mut keys = HashSet::new();
        for key in self.bindings.all_keys() {
            if !keys.insert(key) {
                return Err(ConfigError::DuplicateKey(key.label()));
            }
        }
        for action in &self.bindings.actions {
            if action.targets.is_empty() {
                return Err(ConfigError::NoTargets(action.key.label()));
            }
            if let Some(target) = action.targets.iter().find(|t| !names.contains(t.as_str())) {
                return Err(ConfigError::UnknownTarget {
                    key: action.key.label(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }

    /// Initial simulation state: camera at its start pose, every toggle off.
    pub fn build_state(&self) -> SimulationState {
        let cam = &self.camera;
        let camera = CameraState::new(cam.position, cam.yaw, cam.pitch, cam.fov);
        let objects = self
            .objects
            .iter()
            .map(|o| SceneObject::new(o.name.clone(), o.animation.build(), o.placement.build()))
            .collect();
        SimulationState::new(camera, MouseTrackingState::centered(self.width, self.height), objects)
    }

    pub fn build_sampler(&self) -> InputSampler {
        InputSampler::new(
            self.bindings.clone(),
            CameraController::new(self.camera.move_speed, self.camera.mouse_sensitivity),
        )
    }

    pub fn day_color(&self) -> Vec3 {
        Vec3::from_array(self.sky.day)
    }

    pub fn sunset_color(&self) -> Vec3 {
        Vec3::from_array(self.sky.sunset)
    }
}

impl ObjectConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name.as_str();
        match self.animation {
            AnimationConfig::Hinge { rate, min, max } => {
                check_rate(name, "rate", rate)?;
                if !(min.is_finite() && max.is_finite()) || min > max {
                    return Err(ConfigError::InvertedBounds {
                        object: self.name.clone(),
                        min,
                        max,
                    });
                }
            }
            AnimationConfig::Ease {
                target_rotation,
                target_position,
                rotation_rate,
                position_rate,
            } => {
                check_rate(name, "rotation_rate", rotation_rate)?;
                check_rate(name, "position_rate", position_rate)?;
                if !target_rotation.is_finite() || !target_position.is_finite() {
                    return Err(ConfigError::InvalidSetting {
                        field: "ease target",
                        reason: format!("`{name}` has a non-finite target"),
                    });
                }
            }
            AnimationConfig::Fade { speed } => {
                check_rate(name, "speed", speed)?;
                if speed == 0.0 {
                    return Err(ConfigError::InvalidSetting {
                        field: "fade speed",
                        reason: format!("`{name}` would never finish"),
                    });
                }
            }
            AnimationConfig::Spin { step } => {
                if !step.is_finite() {
                    return Err(ConfigError::InvalidSetting {
                        field: "spin step",
                        reason: format!("`{name}` has a non-finite step"),
                    });
                }
            }
        }
        for (field, value) in [
            ("extent.x", self.placement.extent.x),
            ("extent.y", self.placement.extent.y),
            ("extent.z", self.placement.extent.z),
        ] {
            check_rate(name, field, value)?;
        }
        Ok(())
    }
}

fn check_rate(object: &str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate {
            object: object.to_string(),
            field,
            value,
        })
    }
}

fn action(key: Key, effect: ToggleEffect, targets: &[&str]) -> ActionBinding {
    ActionBinding {
        key,
        effect,
        targets: targets.iter().map(|t| t.to_string()).collect(),
    }
}

fn object(name: &str, animation: AnimationConfig, placement: PlacementConfig) -> ObjectConfig {
    ObjectConfig {
        name: name.to_string(),
        animation,
        placement,
    }
}

fn sunset() -> ObjectConfig {
    object("sunset", AnimationConfig::Fade { speed: 0.05 }, PlacementConfig::default())
}

fn house() -> SceneConfig {
    let door_hinge = AnimationConfig::Hinge { rate: 45.0, min: 0.0, max: 90.0 };
    SceneConfig {
        title: "State Machine Animation".to_string(),
        width: 1600,
        height: 1200,
        max_frame_delta: 0.1,
        camera: CameraConfig::default(),
        sky: SkyConfig::default(),
        bindings: KeyBindings {
            actions: vec![
                action(Key::Digit1, ToggleEffect::OpenClose, &["door", "door2"]),
                action(Key::Digit2, ToggleEffect::OpenClose, &["chair"]),
                action(Key::Digit3, ToggleEffect::OpenClose, &["shower"]),
                action(Key::Digit4, ToggleEffect::OneShot, &["sunset"]),
            ],
            ..KeyBindings::default()
        },
        objects: vec![
            object(
                "door",
                door_hinge.clone(),
                PlacementConfig {
                    base: Vec3::new(-0.2, 0.5, 2.0),
                    pivot: Vec3::new(0.185, 0.0, 0.0),
                    axis: Vec3::NEG_Y,
                    extent: Vec3::new(0.185, 0.5, 0.03),
                    color: [0.55, 0.35, 0.2],
                },
            ),
            object(
                "door2",
                door_hinge,
                PlacementConfig {
                    base: Vec3::new(0.6, 0.5, 2.0),
                    pivot: Vec3::new(0.185, 0.0, 0.0),
                    axis: Vec3::NEG_Y,
                    extent: Vec3::new(0.185, 0.5, 0.03),
                    color: [0.7, 0.85, 0.95],
                },
            ),
            object(
                "chair",
                AnimationConfig::Ease {
                    target_rotation: -50.0,
                    target_position: Vec3::new(-1.8, 0.0, 0.0),
                    rotation_rate: 3.6,
                    position_rate: 2.7,
                },
                PlacementConfig {
                    base: Vec3::new(1.2, 0.25, 0.0),
                    pivot: Vec3::new(0.3, 0.0, -0.4),
                    axis: Vec3::Y,
                    extent: Vec3::splat(0.25),
                    color: [0.8, 0.6, 0.3],
                },
            ),
            object(
                "shower",
                AnimationConfig::Ease {
                    target_rotation: 0.0,
                    target_position: Vec3::new(0.21, 0.0, -0.4),
                    rotation_rate: 0.0,
                    position_rate: 2.0,
                },
                PlacementConfig {
                    base: Vec3::new(-1.5, 0.6, -1.0),
                    pivot: Vec3::ZERO,
                    axis: Vec3::Y,
                    extent: Vec3::new(0.02, 0.6, 0.4),
                    color: [0.75, 0.9, 1.0],
                },
            ),
            sunset(),
        ],
    }
}

fn pet() -> SceneConfig {
    SceneConfig {
        title: "Pet Scene Animation".to_string(),
        width: 800,
        height: 600,
        max_frame_delta: 0.1,
        camera: CameraConfig::default(),
        sky: SkyConfig::default(),
        bindings: KeyBindings {
            actions: vec![
                action(Key::T, ToggleEffect::OneShot, &["sunset"]),
                action(Key::N, ToggleEffect::FreeSpin, &["ball"]),
                action(Key::M, ToggleEffect::FreeSpin, &["dog"]),
            ],
            ..KeyBindings::default()
        },
        objects: vec![
            object(
                "dog",
                AnimationConfig::Spin { step: -0.6 },
                PlacementConfig {
                    base: Vec3::new(1.5, 0.3, 0.0),
                    extent: Vec3::new(0.4, 0.25, 0.2),
                    color: [0.6, 0.45, 0.3],
                    ..PlacementConfig::default()
                },
            ),
            object(
                "ball",
                AnimationConfig::Spin { step: 0.4 },
                PlacementConfig {
                    base: Vec3::new(0.0, 0.5, 0.0),
                    extent: Vec3::splat(0.3),
                    color: [0.4, 0.7, 1.0],
                    ..PlacementConfig::default()
                },
            ),
            sunset(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for preset in [Preset::House, Preset::Pet] {
            SceneConfig::preset(preset).validate().unwrap();
        }
    }

    #[test]
    fn house_state_starts_closed_with_camera_at_start_pose() {
        let state = SceneConfig::preset(Preset::House).build_state();
        assert_eq!(state.objects.len(), 5);
        assert!(state.objects.iter().all(|o| !o.engaged));
        assert_eq!(state.camera.position, Vec3::new(0.0, 1.0, 8.0));
        assert_eq!((state.mouse.last_x, state.mouse.last_y), (800.0, 600.0));
        assert!(state.mouse.first_move);
    }

    #[test]
    fn rejects_unknown_target() {
        let mut cfg = SceneConfig::preset(Preset::Pet);
        cfg.bindings.actions[0].targets = vec!["cat".into()];
        assert!(matches!(cfg.validate(), Err(ConfigError::UnknownTarget { target, .. }) if target == "cat"));
    }

    #[test]
    fn rejects_duplicate_key_and_object() {
        let mut cfg = SceneConfig::preset(Preset::House);
        cfg.bindings.actions[1].key = Key::W;
        assert!(matches!(cfg.validate(), Err(ConfigError::DuplicateKey(k)) if k == "W"));

        let mut cfg = SceneConfig::preset(Preset::House);
        let copy = cfg.objects[0].clone();
        cfg.objects.push(copy);
        assert!(matches!(cfg.validate(), Err(ConfigError::DuplicateObject(name)) if name == "door"));
    }

    #[test]
    fn rejects_bad_numbers() {
        let mut cfg = SceneConfig::preset(Preset::House);
        cfg.objects[0].animation = AnimationConfig::Hinge { rate: 45.0, min: 90.0, max: 0.0 };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvertedBounds { .. })));

        let mut cfg = SceneConfig::preset(Preset::House);
        cfg.objects[2].animation = AnimationConfig::Ease {
            target_rotation: -50.0,
            target_position: Vec3::ZERO,
            rotation_rate: f32::NAN,
            position_rate: 1.0,
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidRate { field: "rotation_rate", .. })));

        let mut cfg = SceneConfig::preset(Preset::Pet);
        cfg.objects[2].animation = AnimationConfig::Fade { speed: 0.0 };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSetting { .. })));

        let mut cfg = SceneConfig::preset(Preset::Pet);
        cfg.max_frame_delta = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_incomplete_scenes() {
        let mut cfg = SceneConfig::preset(Preset::House);
        cfg.objects.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::Empty)));

        let mut cfg = SceneConfig::preset(Preset::House);
        cfg.objects[0].name = String::new();
        assert!(matches!(cfg.validate(), Err(ConfigError::UnnamedObject)));

        let mut cfg = SceneConfig::preset(Preset::Pet);
        cfg.bindings.actions[0].targets.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::NoTargets(_))));
    }

    #[test]
    fn rejects_negative_rates() {
        let mut cfg = SceneConfig::preset(Preset::Pet);
        cfg.camera.move_speed = -1.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidRate { field: "move_speed", value, .. }) if value == -1.0
        ));

        let mut cfg = SceneConfig::preset(Preset::House);
        cfg.objects[0].animation = AnimationConfig::Hinge { rate: -45.0, min: 0.0, max: 90.0 };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidRate { object, field: "rate", .. }) if object == "door"
        ));
    }

    #[test]
    fn missing_scene_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(SceneConfig::load(&path), Err(ConfigError::Missing(_))));
        assert!(!path.exists());
    }

    #[test]
    fn dumped_scene_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pet.toml");
        let cfg = SceneConfig::preset(Preset::Pet);
        cfg.store(&path).unwrap();
        assert_eq!(SceneConfig::load(&path).unwrap(), cfg);
    }
}
