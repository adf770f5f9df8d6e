use egui::Context;

use crate::controller::{KeyBindings, ToggleEffect};
use crate::model::{Animation, SceneObject, SimulationState};

/// Frames-per-second averaged over roughly one second.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    fps: f32,
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    pub fn record(&mut self, dt: f32) {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed >= 1.0 {
            self.fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// One line of status for an object, e.g. `door  open  37.5°`.
pub fn describe(object: &SceneObject) -> String {
    let name = &object.name;
    match &object.animation {
        Animation::Hinge(h) => {
            let state = if object.engaged { "opening" } else { "closing" };
            format!("{name}  {state}  {:.1}°", h.angle)
        }
        Animation::Ease(e) => {
            let state = if object.engaged { "out" } else { "back" };
            format!(
                "{name}  {state}  {:.1}°  ({:.2}, {:.2}, {:.2})",
                e.rotation, e.position.x, e.position.y, e.position.z
            )
        }
        Animation::Fade(f) => {
            let state = if object.engaged { "running" } else { "idle" };
            format!("{name}  {state}  {:.0}%", f.factor * 100.0)
        }
        Animation::Spin(s) => {
            let state = if object.engaged { "spinning" } else { "stopped" };
            format!("{name}  {state}  {:.1}°", s.angle)
        }
    }
}

fn effect_label(effect: ToggleEffect) -> &'static str {
    match effect {
        ToggleEffect::OpenClose => "toggle",
        ToggleEffect::OneShot => "run",
        ToggleEffect::FreeSpin => "spin",
    }
}

/// Help lines for every key the scene listens to.
pub fn control_lines(bindings: &KeyBindings) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{}{}{}{} - Move",
            bindings.forward.label(),
            bindings.left.label(),
            bindings.backward.label(),
            bindings.right.label()
        ),
        format!("{}/{} - Up/Down", bindings.up.label(), bindings.down.label()),
        "Right mouse - Look".to_string(),
        "Wheel - Zoom".to_string(),
        format!("{} - Quit", bindings.quit.label()),
    ];
    lines.extend(
        bindings
            .actions
            .iter()
            .map(|a| format!("{} - {} {}", a.key.label(), effect_label(a.effect), a.targets.join(" + "))),
    );
    lines
}

pub fn build_ui(ctx: &Context, state: &SimulationState, bindings: &KeyBindings, fps: f32) {
    let cam = &state.camera;
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {fps:.0}")).small());
            ui.label(
                egui::RichText::new(format!(
                    "Pos: x: {:.2} y: {:.2} z: {:.2}",
                    cam.position.x, cam.position.y, cam.position.z
                ))
                .small(),
            );
            ui.label(
                egui::RichText::new(format!("Yaw: {:.1} Pitch: {:.1} FOV: {:.1}", cam.yaw(), cam.pitch(), cam.fov()))
                    .small(),
            );
            ui.separator();
            for object in &state.objects {
                ui.label(egui::RichText::new(describe(object)).small());
            }
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            for line in control_lines(bindings) {
                ui.label(egui::RichText::new(line).small());
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, SceneConfig};

    #[test]
    fn fps_averages_over_a_second() {
        let mut counter = FpsCounter::default();
        for _ in 0..59 {
            counter.record(1.0 / 60.0);
        }
        assert_eq!(counter.fps(), 0.0);
        counter.record(1.0 / 60.0 + 1e-3);
        assert!((counter.fps() - 60.0).abs() < 0.1);
    }

    #[test]
    fn help_lists_every_action() {
        let cfg = SceneConfig::preset(Preset::House);
        let lines = control_lines(&cfg.bindings);
        assert_eq!(lines[0], "WASD - Move");
        assert!(lines.contains(&"1 - toggle door + door2".to_string()));
        assert!(lines.contains(&"4 - run sunset".to_string()));
    }

    #[test]
    fn describes_object_state() {
        let mut state = SceneConfig::preset(Preset::Pet).build_state();
        let ball = state.object_mut("ball").unwrap();
        ball.engaged = true;
        assert_eq!(describe(ball), "ball  spinning  0.0°");
        assert_eq!(describe(state.object("sunset").unwrap()), "sunset  idle  0%");
    }
}
