//! Display color to shading color conversion

use prism_core::Color;

/// Decode one sRGB channel to linear light
pub fn srgb_to_linear(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear RGB of a display color
pub fn linear_rgb(color: Color) -> [f32; 3] {
    color.to_array().map(srgb_to_linear)
}

/// Clear value for a background color
///
/// sRGB targets encode the clear value themselves; other targets receive the
/// display color unchanged.
pub fn clear_color(color: Color, format: wgpu::TextureFormat) -> wgpu::Color {
    let [r, g, b] = if format.is_srgb() {
        linear_rgb(color)
    } else {
        color.to_array()
    };
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_srgb_to_linear() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert_eq!(srgb_to_linear(1.0), 1.0);
        assert_relative_eq!(srgb_to_linear(0.5), 0.214, epsilon = 1e-3);
        assert_eq!(srgb_to_linear(2.0), 1.0);
    }

    #[test]
    fn test_clear_color_follows_target_encoding() {
        let grey = Color::from_hex(0x828282);
        let raw = clear_color(grey, wgpu::TextureFormat::Bgra8Unorm);
        assert_relative_eq!(raw.r, grey.r as f64, epsilon = 1e-6);

        let encoded = clear_color(grey, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert!(encoded.r < raw.r);
        assert_eq!(encoded.a, 1.0);
    }
}
