//! Time-driven motion of the primary object
//!
//! Every law is a pure function of the elapsed time, so the frame loop can be
//! paused or restarted without accumulating drift.

use std::f64::consts::TAU;

use crate::color::Color;
use crate::constants::{PULSE_FLOOR, SPIN_RATE, SWAY_AMPLITUDE};
use crate::scene::Transform;
use crate::settings::{AnimationSettings, RotateAnimation, TranslateAnimation};

/// Apply the selected motion laws for `elapsed` seconds
///
/// Only the components driven by an active law are written.
///
/// # Returns
/// `true` if anything was animated
pub fn animate(
    animation: &AnimationSettings,
    elapsed: f64,
    transform: &mut Transform,
    color: &mut Color,
) -> bool {
    let sin = elapsed.sin() as f32;
    let cos = elapsed.cos() as f32;

    match animation.translate {
        TranslateAnimation::None => {}
        TranslateAnimation::UpDown => transform.position.y = sin,
        TranslateAnimation::SideToSide => transform.position.x = sin,
        TranslateAnimation::BackForth => transform.position.z = sin,
        TranslateAnimation::Circle => {
            transform.position.x = sin;
            transform.position.z = cos;
        }
    }

    let spin = (elapsed * SPIN_RATE as f64).rem_euclid(TAU) as f32;
    let sway = sin * SWAY_AMPLITUDE;
    match animation.rotate {
        RotateAnimation::None => {}
        RotateAnimation::SpinX => transform.rotation.x = spin,
        RotateAnimation::SpinY => transform.rotation.y = spin,
        RotateAnimation::SpinZ => transform.rotation.z = spin,
        RotateAnimation::SwayX => transform.rotation.x = sway,
        RotateAnimation::SwayY => transform.rotation.y = sway,
        RotateAnimation::SwayZ => transform.rotation.z = sway,
    }

    if animation.pulse_scale {
        transform.scale = glam::Vec3::splat(pulse(elapsed));
    }

    if animation.cycle_color {
        *color = Color::rgb(sin, cos, sin).clamped();
    }

    animation.translate != TranslateAnimation::None
        || animation.rotate != RotateAnimation::None
        || animation.pulse_scale
        || animation.cycle_color
}

/// Uniform scale of the pulse law
pub fn pulse(elapsed: f64) -> f32 {
    (elapsed.sin() as f32 + 1.0).max(PULSE_FLOOR)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec3;

    use super::*;

    fn run(animation: &AnimationSettings, t: f64) -> (Transform, Color) {
        let mut transform = Transform::resting();
        let mut color = Color::WHITE;
        animate(animation, t, &mut transform, &mut color);
        (transform, color)
    }

    #[test]
    fn test_translation_laws() {
        let t = 0.7_f64;
        let mut animation = AnimationSettings::default();

        animation.translate = TranslateAnimation::UpDown;
        let (pose, _) = run(&animation, t);
        assert_relative_eq!(pose.position.y, t.sin() as f32);
        assert_eq!(pose.position.x, 0.0);

        animation.translate = TranslateAnimation::SideToSide;
        assert_relative_eq!(run(&animation, t).0.position.x, t.sin() as f32);

        animation.translate = TranslateAnimation::BackForth;
        assert_relative_eq!(run(&animation, t).0.position.z, t.sin() as f32);

        animation.translate = TranslateAnimation::Circle;
        let (pose, _) = run(&animation, t);
        assert_relative_eq!(pose.position.x, t.sin() as f32);
        assert_relative_eq!(pose.position.z, t.cos() as f32);
        assert_eq!(pose.position.y, 0.5);
    }

    #[test]
    fn test_laws_ignore_previous_pose() {
        let animation = AnimationSettings {
            translate: TranslateAnimation::Circle,
            ..AnimationSettings::default()
        };
        let mut moved = Transform::resting();
        moved.position = Vec3::new(9.0, 0.5, -9.0);
        let mut color = Color::WHITE;
        animate(&animation, 2.0, &mut moved, &mut color);
        assert_eq!(moved.position, run(&animation, 2.0).0.position);
    }

    #[test]
    fn test_spin_rate() {
        let animation = AnimationSettings {
            rotate: RotateAnimation::SpinY,
            ..AnimationSettings::default()
        };
        let (pose, _) = run(&animation, 1.0);
        assert_relative_eq!(pose.rotation.y, 1.5, epsilon = 1e-6);

        // Wraps after a full turn
        let (pose, _) = run(&animation, 10.0);
        assert_relative_eq!(pose.rotation.y, (15.0_f64 % TAU) as f32, epsilon = 1e-5);
    }

    #[test]
    fn test_sway() {
        let animation = AnimationSettings {
            rotate: RotateAnimation::SwayZ,
            ..AnimationSettings::default()
        };
        let (pose, _) = run(&animation, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(pose.rotation.z, std::f32::consts::FRAC_PI_4, epsilon = 1e-6);
    }

    #[test]
    fn test_pulse_bounds() {
        for i in 0..1000 {
            let s = pulse(i as f64 * 0.037);
            assert!((PULSE_FLOOR..=2.0).contains(&s));
        }
        assert_relative_eq!(pulse(-std::f64::consts::FRAC_PI_2), PULSE_FLOOR);
    }

    #[test]
    fn test_color_cycle_is_clamped() {
        let animation = AnimationSettings {
            cycle_color: true,
            ..AnimationSettings::default()
        };
        let (_, color) = run(&animation, 4.0);
        assert_eq!(color.r, 0.0);
        assert_eq!(color.g, 0.0);
        let (_, color) = run(&animation, 1.0);
        assert_relative_eq!(color.r, 1.0_f64.sin() as f32);
        assert_relative_eq!(color.g, 1.0_f64.cos() as f32);
    }

    #[test]
    fn test_nothing_selected() {
        let animation = AnimationSettings::default();
        let mut transform = Transform::resting();
        let mut color = Color::WHITE;
        assert!(!animate(&animation, 3.0, &mut transform, &mut color));
        assert_eq!(transform, Transform::resting());
        assert_eq!(color, Color::WHITE);
    }
}
