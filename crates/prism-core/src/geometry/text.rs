//! Extruded text from typeface JSON fonts
//!
//! Fonts use the typeface JSON layout: a `glyphs` map whose entries carry an
//! advance (`ha`) and an outline string (`o`) of `m`/`l`/`q`/`b` commands in
//! font units, plus the font `resolution` (units per em).

use std::collections::HashMap;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use super::Geometry;
use super::triangulate::{point_in_polygon, signed_area, triangulate_polygon};

/// Font loading and outline errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid outline command: {0}")]
    InvalidOutline(String),
    #[error("No glyph for '{0}' and no fallback glyph")]
    MissingGlyph(char),
    #[error("Text produced no geometry")]
    Empty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units
    pub ha: f32,
    /// Outline commands
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BoundingBox {
    #[serde(rename = "yMin")]
    y_min: f32,
    #[serde(rename = "yMax")]
    y_max: f32,
}

/// A parsed typeface font
#[derive(Debug, Clone, Deserialize)]
pub struct Typeface {
    pub glyphs: HashMap<String, Glyph>,
    #[serde(rename = "familyName", default)]
    pub family_name: String,
    pub resolution: f32,
    #[serde(rename = "boundingBox", default)]
    bounding_box: BoundingBox,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f32,
}

impl Typeface {
    /// Parse a font from JSON bytes
    pub fn from_json(data: &[u8]) -> Result<Self, FontError> {
        let font: Typeface =
            serde_json::from_slice(data).map_err(|e| FontError::Parse(e.to_string()))?;
        if font.resolution <= 0.0 {
            return Err(FontError::Parse(format!(
                "invalid resolution {}",
                font.resolution
            )));
        }
        Ok(font)
    }

    /// Load a font file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let data = std::fs::read(path.as_ref()).map_err(|e| FontError::Io(e.to_string()))?;
        Self::from_json(&data)
    }

    /// Glyph for a character, falling back to `?`
    pub fn glyph(&self, ch: char) -> Result<&Glyph, FontError> {
        let mut buf = [0u8; 4];
        self.glyphs
            .get(ch.encode_utf8(&mut buf) as &str)
            .or_else(|| self.glyphs.get("?"))
            .ok_or(FontError::MissingGlyph(ch))
    }

    fn line_height(&self) -> f32 {
        self.bounding_box.y_max - self.bounding_box.y_min + self.underline_thickness
    }

    /// Flattened outline contours of `text` laid out at `size`
    pub fn contours(
        &self,
        text: &str,
        size: f32,
        curve_segments: u32,
    ) -> Result<Vec<Vec<Vec2>>, FontError> {
        let scale = size / self.resolution;
        let mut contours = Vec::new();
        let mut offset = Vec2::ZERO;

        for ch in text.chars() {
            if ch == '\n' {
                offset.x = 0.0;
                offset.y -= self.line_height() * scale;
                continue;
            }
            let glyph = self.glyph(ch)?;
            if let Some(outline) = &glyph.o {
                contours.extend(parse_outline(outline, scale, offset, curve_segments)?);
            }
            offset.x += glyph.ha * scale;
        }

        Ok(contours)
    }
}

fn parse_outline(
    outline: &str,
    scale: f32,
    offset: Vec2,
    curve_segments: u32,
) -> Result<Vec<Vec<Vec2>>, FontError> {
    let tokens: Vec<&str> = outline.split_whitespace().collect();
    let mut contours: Vec<Vec<Vec2>> = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    let mut i = 0;

    let point = |tokens: &[&str], at: usize| -> Result<Vec2, FontError> {
        let coord = |k: usize| {
            tokens
                .get(k)
                .ok_or_else(|| FontError::InvalidOutline("truncated command".to_string()))?
                .parse::<f32>()
                .map_err(|e| FontError::InvalidOutline(e.to_string()))
        };
        Ok(Vec2::new(coord(at)?, coord(at + 1)?) * scale + offset)
    };

    while i < tokens.len() {
        let command = tokens[i];
        i += 1;
        match command {
            "m" => {
                if current.len() >= 3 {
                    contours.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push(point(&tokens, i)?);
                i += 2;
            }
            "l" => {
                current.push(point(&tokens, i)?);
                i += 2;
            }
            "q" => {
                // End point first, then the control point
                let end = point(&tokens, i)?;
                let control = point(&tokens, i + 2)?;
                i += 4;
                let start = current.last().copied().unwrap_or(end);
                for s in 1..=curve_segments {
                    let t = s as f32 / curve_segments as f32;
                    let u = 1.0 - t;
                    current.push(start * (u * u) + control * (2.0 * u * t) + end * (t * t));
                }
            }
            "b" => {
                // End point first, then both control points
                let end = point(&tokens, i)?;
                let c1 = point(&tokens, i + 2)?;
                let c2 = point(&tokens, i + 4)?;
                i += 6;
                let start = current.last().copied().unwrap_or(end);
                for s in 1..=curve_segments {
                    let t = s as f32 / curve_segments as f32;
                    let u = 1.0 - t;
                    current.push(
                        start * (u * u * u)
                            + c1 * (3.0 * u * u * t)
                            + c2 * (3.0 * u * t * t)
                            + end * (t * t * t),
                    );
                }
            }
            "z" => {}
            other => return Err(FontError::InvalidOutline(other.to_string())),
        }
    }
    if current.len() >= 3 {
        contours.push(current);
    }

    for contour in &mut contours {
        if contour.len() > 1 && contour.first() == contour.last() {
            contour.pop();
        }
    }
    Ok(contours)
}

/// A solid contour and the holes it contains
struct Outline {
    solid: Vec<Vec2>,
    holes: Vec<Vec<Vec2>>,
}

/// Group contours by nesting depth: even depth is solid, odd depth is a hole
fn group_contours(contours: Vec<Vec<Vec2>>) -> Vec<Outline> {
    let depth: Vec<usize> = contours
        .iter()
        .enumerate()
        .map(|(i, c)| {
            contours
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && point_in_polygon(c[0], other))
                .count()
        })
        .collect();

    let mut outlines: Vec<(usize, Outline)> = Vec::new();
    let mut holes = Vec::new();
    for (i, contour) in contours.iter().enumerate() {
        if depth[i] % 2 == 0 {
            outlines.push((
                i,
                Outline {
                    solid: contour.clone(),
                    holes: Vec::new(),
                },
            ));
        } else {
            holes.push(i);
        }
    }

    for h in holes {
        let probe = contours[h][0];
        // Innermost containing solid
        let owner = outlines
            .iter_mut()
            .filter(|(_, o)| point_in_polygon(probe, &o.solid))
            .min_by(|a, b| {
                signed_area(&a.1.solid)
                    .abs()
                    .total_cmp(&signed_area(&b.1.solid).abs())
            });
        if let Some((_, outline)) = owner {
            outline.holes.push(contours[h].clone());
        }
    }

    outlines.into_iter().map(|(_, o)| o).collect()
}

/// Generate extruded text geometry
///
/// The front face lies at `z = depth` and the back face at `z = 0`; the
/// baseline of the first line is on `y = 0`.
pub fn generate_text(
    font: &Typeface,
    text: &str,
    size: f32,
    depth: f32,
    curve_segments: u32,
) -> Result<Geometry, FontError> {
    let contours = font.contours(text, size, curve_segments.max(1))?;
    let mut geometry = Geometry::empty(format!("Text \"{text}\""));

    for outline in group_contours(contours) {
        extrude(&mut geometry, &outline, depth);
    }

    if geometry.indices.is_empty() {
        return Err(FontError::Empty);
    }
    Ok(geometry)
}

fn extrude(geometry: &mut Geometry, outline: &Outline, depth: f32) {
    let mut points = outline.solid.clone();
    for hole in &outline.holes {
        points.extend_from_slice(hole);
    }
    let triangles = triangulate_polygon(&outline.solid, &outline.holes);

    // Caps
    for (z, normal, front) in [(depth, 1.0, true), (0.0, -1.0, false)] {
        let base = geometry.positions.len() as u32;
        for p in &points {
            geometry.positions.push([p.x, p.y, z]);
            geometry.normals.push([0.0, 0.0, normal]);
            geometry.uvs.push([p.x, -p.y]);
        }
        for [a, b, c] in &triangles {
            if front {
                geometry
                    .indices
                    .extend_from_slice(&[base + a, base + b, base + c]);
            } else {
                geometry
                    .indices
                    .extend_from_slice(&[base + a, base + c, base + b]);
            }
        }
    }

    // Walls: solid counter-clockwise, holes clockwise, so (dy, -dx) faces out of the material
    let mut walls: Vec<Vec<Vec2>> = Vec::with_capacity(outline.holes.len() + 1);
    walls.push(oriented(&outline.solid, true));
    for hole in &outline.holes {
        walls.push(oriented(hole, false));
    }

    for contour in walls {
        let n = contour.len();
        let mut distance = 0.0;
        for i in 0..n {
            let p = contour[i];
            let q = contour[(i + 1) % n];
            let edge = q - p;
            let length = edge.length();
            if length <= f32::EPSILON {
                continue;
            }
            let normal = [edge.y / length, -edge.x / length, 0.0];
            let base = geometry.positions.len() as u32;
            for (v, z) in [(p, 0.0), (q, 0.0), (q, depth), (p, depth)] {
                geometry.positions.push([v.x, v.y, z]);
                geometry.normals.push(normal);
            }
            geometry.uvs.extend_from_slice(&[
                [distance, 1.0],
                [distance + length, 1.0],
                [distance + length, 1.0 - depth],
                [distance, 1.0 - depth],
            ]);
            distance += length;
            geometry
                .indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}

fn oriented(contour: &[Vec2], counter_clockwise: bool) -> Vec<Vec2> {
    let mut contour = contour.to_vec();
    if (signed_area(&contour) > 0.0) != counter_clockwise {
        contour.reverse();
    }
    contour
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: &str = r#"{
        "familyName": "Test",
        "resolution": 1000,
        "boundingBox": { "yMin": 0, "yMax": 700 },
        "underlineThickness": 50,
        "glyphs": {
            "I": { "ha": 400, "o": "m 100 0 l 300 0 l 300 700 l 100 700 z" },
            "O": { "ha": 700, "o": "m 0 0 l 600 0 l 600 700 l 0 700 z m 200 200 l 200 500 l 400 500 l 400 200 z" },
            "D": { "ha": 700, "o": "m 0 0 l 300 0 q 600 350 600 0 q 300 700 600 700 l 0 700 z" },
            "?": { "ha": 500 },
            " ": { "ha": 300 }
        }
    }"#;

    fn font() -> Typeface {
        Typeface::from_json(FONT.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_font() {
        let font = font();
        assert_eq!(font.family_name, "Test");
        assert_eq!(font.glyphs.len(), 5);
    }

    #[test]
    fn test_missing_glyph_falls_back() {
        let font = font();
        assert_eq!(font.glyph('Z').unwrap().ha, 500.0);
    }

    #[test]
    fn test_layout_advances() {
        let font = font();
        let contours = font.contours("II", 1.0, 4).unwrap();
        assert_eq!(contours.len(), 2);
        assert!((contours[1][0].x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_hole_detection() {
        let font = font();
        let outlines = group_contours(font.contours("O", 1.0, 4).unwrap());
        assert_eq!(outlines.len(), 1);
        assert_eq!(outlines[0].holes.len(), 1);
    }

    #[test]
    fn test_curves_are_flattened() {
        let font = font();
        let contours = font.contours("D", 1.0, 8).unwrap();
        assert_eq!(contours.len(), 1);
        // move, line, 8 + 8 curve points, line; closing point dropped
        assert_eq!(contours[0].len(), 1 + 1 + 8 + 8 + 1);
    }

    #[test]
    fn test_extruded_text_is_valid() {
        let font = font();
        let text = generate_text(&font, "IO ?", 1.0, 0.2, 12).unwrap();
        assert!(text.is_valid());
        let (min, max) = text.bounds().unwrap();
        assert!(min.z.abs() < 1e-6);
        assert!((max.z - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_empty_text_is_an_error() {
        let font = font();
        assert!(matches!(
            generate_text(&font, " ", 1.0, 0.2, 12),
            Err(FontError::Empty)
        ));
    }

    #[test]
    fn test_bad_command() {
        let font = Typeface::from_json(
            br#"{"resolution": 1000, "glyphs": {"A": {"ha": 1, "o": "m 0 0 x 1 1"}}}"#,
        )
        .unwrap();
        assert!(matches!(
            font.contours("A", 1.0, 4),
            Err(FontError::InvalidOutline(_))
        ));
    }
}
