//! Single-degree-of-freedom animated quantities.
//!
//! Every kind is driven by one `engaged` flag and advanced once per frame.
//! Linear kinds ([`Hinge`], [`Fade`]) move at a fixed rate and stop at a
//! bound; [`Ease`] settles exponentially toward its target and never
//! overshoots; [`Spin`] turns by a fixed step per frame with no bound.

use glam::{Mat4, Vec3};

/// Linear angle between two mechanical stops, e.g. a door on its hinge.
#[derive(Debug, Clone, PartialEq)]
pub struct Hinge {
    pub angle: f32,
    /// Degrees per second.
    pub rate: f32,
    pub min: f32,
    pub max: f32,
}

impl Hinge {
    pub fn new(rate: f32, min: f32, max: f32) -> Self {
        Self { angle: min, rate, min, max }
    }

    pub fn step(&mut self, opening: bool, dt: f32) {
        let sign = if opening { 1.0 } else { -1.0 };
        self.angle = (self.angle + sign * self.rate * dt).clamp(self.min, self.max);
    }
}

/// Exponential settling of a Y rotation and a translation toward either the
/// target pose (engaged) or the rest pose (origin, zero rotation).
#[derive(Debug, Clone, PartialEq)]
pub struct Ease {
    pub rotation: f32,
    pub position: Vec3,
    pub target_rotation: f32,
    pub target_position: Vec3,
    /// Smoothing factor per second for the rotation channel.
    pub rotation_rate: f32,
    /// Smoothing factor per second for the position channel.
    pub position_rate: f32,
}

impl Ease {
    pub fn new(target_rotation: f32, target_position: Vec3, rotation_rate: f32, position_rate: f32) -> Self {
        Self {
            rotation: 0.0,
            position: Vec3::ZERO,
            target_rotation,
            target_position,
            rotation_rate,
            position_rate,
        }
    }

    pub fn step(&mut self, engaged: bool, dt: f32) {
        let (rot_goal, pos_goal) = if engaged {
            (self.target_rotation, self.target_position)
        } else {
            (0.0, Vec3::ZERO)
        };
        self.rotation = mix(self.rotation, rot_goal, smoothing(self.rotation_rate, dt));
        self.position = mix_vec(self.position, pos_goal, smoothing(self.position_rate, dt));
    }
}

/// One-shot 0→1 ramp that rewinds to 0 and disengages itself on completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    pub factor: f32,
    /// Units of factor per second.
    pub speed: f32,
}

impl Fade {
    pub fn new(speed: f32) -> Self {
        Self { factor: 0.0, speed }
    }

    /// Returns whether the fade is still running after this step.
    pub fn step(&mut self, active: bool, dt: f32) -> bool {
        if !active {
            return false;
        }
        self.factor += self.speed * dt;
        if self.factor >= 1.0 {
            self.factor = 0.0;
            return false;
        }
        true
    }
}

/// Free spin. The step is per frame, not per second.
#[derive(Debug, Clone, PartialEq)]
pub struct Spin {
    pub angle: f32,
    pub step: f32,
}

impl Spin {
    pub fn new(step: f32) -> Self {
        Self { angle: 0.0, step }
    }

    pub fn step(&mut self, spinning: bool) {
        if spinning {
            self.angle += self.step;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
    Hinge(Hinge),
    Ease(Ease),
    Fade(Fade),
    Spin(Spin),
}

impl Animation {
    /// Advance one frame. `engaged` may be cleared by self-terminating kinds.
    pub fn step(&mut self, engaged: &mut bool, dt: f32) {
        match self {
            Animation::Hinge(h) => h.step(*engaged, dt),
            Animation::Ease(e) => e.step(*engaged, dt),
            Animation::Fade(f) => *engaged = f.step(*engaged, dt),
            Animation::Spin(s) => s.step(*engaged),
        }
    }

    /// Rotation in degrees about the placement axis.
    pub fn angle(&self) -> f32 {
        match self {
            Animation::Hinge(h) => h.angle,
            Animation::Ease(e) => e.rotation,
            Animation::Fade(_) => 0.0,
            Animation::Spin(s) => s.angle,
        }
    }

    pub fn offset(&self) -> Vec3 {
        match self {
            Animation::Ease(e) => e.position,
            _ => Vec3::ZERO,
        }
    }

    /// The sky blend factor, for fades.
    pub fn fade_factor(&self) -> Option<f32> {
        match self {
            Animation::Fade(f) => Some(f.factor),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Animation::Hinge(_) => "hinge",
            Animation::Ease(_) => "ease",
            Animation::Fade(_) => "fade",
            Animation::Spin(_) => "spin",
        }
    }

    /// Pose contribution: translate by the eased offset, then rotate about
    /// `axis` around `pivot`.
    pub fn pose(&self, pivot: Vec3, axis: Vec3) -> Mat4 {
        Mat4::from_translation(self.offset())
            * Mat4::from_translation(pivot)
            * Mat4::from_axis_angle(axis, self.angle().to_radians())
            * Mat4::from_translation(-pivot)
    }
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    if t >= 1.0 {
        return b;
    }
    a + (b - a) * t
}

fn mix_vec(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    Vec3::new(mix(a.x, b.x, t), mix(a.y, b.y, t), mix(a.z, b.z, t))
}

// k*dt capped at 1 so a long frame lands on the goal instead of past it.
fn smoothing(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}
