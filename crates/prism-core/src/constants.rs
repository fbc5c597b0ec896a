//! Global constants for prism-core

use std::f32::consts::PI;

/// Resting position of the primary object (just above the ground disk)
pub const RESTING_POSITION: [f32; 3] = [0.0, 0.5, 0.0];

/// Ground disk radius
pub const GROUND_RADIUS: f32 = 5.0;

/// Ground disk segment count
pub const GROUND_SEGMENTS: u32 = 32;

/// Height of the ground disk
pub const GROUND_HEIGHT: f32 = -0.5;

/// Length of each axes helper line
pub const AXES_SIZE: f32 = 5.0;

/// Range of point and spot lights
pub const LIGHT_DISTANCE: f32 = 50.0;

/// Physical decay exponent of point and spot lights
pub const LIGHT_DECAY: f32 = 2.0;

/// Shadow map resolution (square)
pub const SHADOW_MAP_SIZE: u32 = 1024;

/// Shadow camera near plane
pub const SHADOW_NEAR: f32 = 0.5;

/// Shadow camera far plane
pub const SHADOW_FAR: f32 = 50.0;

/// Half extent of the orthographic shadow frustum of a directional light
pub const SHADOW_ORTHO_EXTENT: f32 = 5.0;

/// Size of the directional and hemisphere light helpers
pub const HELPER_SIZE: f32 = 2.0;

/// Radius of the point light helper sphere
pub const POINT_HELPER_RADIUS: f32 = 1.0;

/// Angular rate of the steady spin animation (radians per second)
pub const SPIN_RATE: f32 = 1.5;

/// Amplitude of the sway animation (radians)
pub const SWAY_AMPLITUDE: f32 = PI / 4.0;

/// Lower bound of the pulsing scale
pub const PULSE_FLOOR: f32 = 0.05;

/// Orbit controls damping factor
pub const ORBIT_DAMPING: f32 = 0.25;

/// Orbit controls minimum distance to target
pub const ORBIT_MIN_DISTANCE: f32 = 0.5;

/// Orbit controls maximum distance to target
pub const ORBIT_MAX_DISTANCE: f32 = 1000.0;

/// Orbit controls maximum polar angle
pub const ORBIT_MAX_POLAR: f32 = PI / 2.0;

/// Text shown by the text shape
pub const TEXT_LABEL: &str = "CS105";

/// Text shape glyph size
pub const TEXT_SIZE: f32 = 1.0;

/// Text shape extrusion depth
pub const TEXT_DEPTH: f32 = 0.2;

/// Segments per curve when flattening glyph outlines
pub const TEXT_CURVE_SEGMENTS: u32 = 12;

/// World-space edge length of point sprites
pub const POINT_SIZE: f32 = 0.08;

/// Rolling window of the frame statistics (seconds)
pub const STATS_WINDOW: f64 = 1.0;

/// Transform gizmo handle dimensions in gizmo units
///
/// One gizmo unit is [`gizmo::SCREEN_FRACTION`] of the viewport height at the
/// gizmo's distance, so handles keep a constant on-screen size.
pub mod gizmo {
    /// Length of the translate arrows
    pub const ARROW_LENGTH: f32 = 1.0;

    /// Pick radius around the translate arrows
    pub const HIT_RADIUS: f32 = 0.08;

    /// Radius of the rotate rings
    pub const RING_RADIUS: f32 = 0.85;

    /// Pick tolerance around the rotate rings
    pub const RING_HIT_THICKNESS: f32 = 0.07;

    /// Distance of the scale handles from the center
    pub const SCALE_AXIS_LENGTH: f32 = 0.9;

    /// Pick radius of the scale handles
    pub const SCALE_HIT_SIZE: f32 = 0.12;

    /// Gizmo size relative to the viewport height
    pub const SCREEN_FRACTION: f32 = 0.125;

    /// Scale change per gizmo unit dragged
    pub const SCALE_SENSITIVITY: f32 = 2.0;

    /// Smallest scale a drag can reach
    pub const MIN_SCALE: f32 = 1e-3;
}
