//! Asset keys, the asset catalog and the in-memory asset cache
//!
//! The scene only ever refers to textures, cube maps and fonts through an
//! [`AssetKey`]. Decoded data lives in the [`AssetCache`]; a key whose entry is
//! not ready is treated as absent by the renderer.

mod loads;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::config::AssetConfig;
use crate::geometry::{FontError, Typeface};
use crate::model::ModelError;
use crate::settings::{BackgroundChoice, PlaneTexture};

pub use loads::{
    CompletedLoad, IssuedLoad, LoadJob, LoadPayload, LoadRequest, LoadSlot, LoadTicket,
    LoadTracker,
};

/// Cube map face file stems in +X, -X, +Y, -Y, +Z, -Z order
pub const CUBE_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

/// Asset loading errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Font error: {0}")]
    Font(#[from] FontError),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Cube map faces must be square and equally sized")]
    CubeMapMismatch,
    #[error("Not supported on this platform: {0}")]
    Unsupported(String),
}

/// Identity of a loadable asset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetKey {
    /// Image file, relative to the asset root
    Image(String),
    /// Folder holding the six cube map faces, relative to the asset root
    CubeMap(String),
    /// Typeface JSON font, relative to the asset root
    Font(String),
    /// Image supplied by the user at runtime
    Imported { name: String, id: Uuid },
}

impl AssetKey {
    pub fn imported(name: impl Into<String>) -> Self {
        Self::Imported {
            name: name.into(),
            id: Uuid::new_v4(),
        }
    }

    /// Short human readable name for logs
    pub fn label(&self) -> &str {
        match self {
            Self::Image(path) | Self::CubeMap(path) | Self::Font(path) => path,
            Self::Imported { name, .. } => name,
        }
    }
}

impl std::fmt::Display for AssetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image(path) => write!(f, "image:{path}"),
            Self::CubeMap(path) => write!(f, "cubemap:{path}"),
            Self::Font(path) => write!(f, "font:{path}"),
            Self::Imported { name, id } => write!(f, "imported:{name}#{}", id.simple()),
        }
    }
}

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Decode any supported image format (PNG, JPEG, TGA)
    pub fn decode(bytes: &[u8]) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes).map_err(|e| AssetError::Decode(e.to_string()))?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Read and decode an image file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| AssetError::Io(e.to_string()))?;
        Self::decode(&bytes)
    }

    /// Wrap raw RGBA8 pixels
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, AssetError> {
        if pixels.len() != (width as usize) * (height as usize) * 4 {
            return Err(AssetError::Decode(format!(
                "expected {}x{} RGBA pixels, got {} bytes",
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Six square faces of an environment map
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMapData {
    pub size: u32,
    pub faces: [ImageData; 6],
}

impl CubeMapData {
    pub fn new(faces: [ImageData; 6]) -> Result<Self, AssetError> {
        let size = faces[0].width;
        if faces.iter().any(|f| f.width != size || f.height != size) {
            return Err(AssetError::CubeMapMismatch);
        }
        Ok(Self { size, faces })
    }

    /// Files of the six faces in `folder`, in [`CUBE_FACES`] order
    pub fn face_paths(folder: &Path, extension: &str) -> [PathBuf; 6] {
        CUBE_FACES.map(|stem| folder.join(format!("{stem}.{extension}")))
    }

    /// Build from six decoded faces, in [`CUBE_FACES`] order
    pub fn from_faces(faces: Vec<ImageData>) -> Result<Self, AssetError> {
        let faces: [ImageData; 6] = faces
            .try_into()
            .map_err(|_| AssetError::CubeMapMismatch)?;
        Self::new(faces)
    }

    /// Load the six faces from a folder
    pub fn load(folder: impl AsRef<Path>, extension: &str) -> Result<Self, AssetError> {
        let faces = Self::face_paths(folder.as_ref(), extension)
            .iter()
            .map(ImageData::load)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_faces(faces)
    }
}

/// Loading state of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState<'a> {
    Missing,
    Pending,
    Ready,
    Failed(&'a str),
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Pending,
    Image(Arc<ImageData>),
    CubeMap(Arc<CubeMapData>),
    Font(Arc<Typeface>),
    Failed(String),
}

/// Decoded assets by key
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<AssetKey, CacheEntry>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &AssetKey) -> AssetState<'_> {
        match self.entries.get(key) {
            None => AssetState::Missing,
            Some(CacheEntry::Pending) => AssetState::Pending,
            Some(CacheEntry::Failed(reason)) => AssetState::Failed(reason),
            Some(_) => AssetState::Ready,
        }
    }

    pub fn is_ready(&self, key: &AssetKey) -> bool {
        self.state(key) == AssetState::Ready
    }

    /// Mark `key` pending; returns false when it is already pending or ready
    ///
    /// Failed keys are retried.
    pub fn begin(&mut self, key: &AssetKey) -> bool {
        match self.entries.get(key) {
            Some(CacheEntry::Failed(_)) | None => {
                self.entries.insert(key.clone(), CacheEntry::Pending);
                true
            }
            Some(_) => false,
        }
    }

    pub fn insert_image(&mut self, key: AssetKey, image: ImageData) {
        self.entries.insert(key, CacheEntry::Image(Arc::new(image)));
    }

    pub fn insert_cube_map(&mut self, key: AssetKey, cube: CubeMapData) {
        self.entries.insert(key, CacheEntry::CubeMap(Arc::new(cube)));
    }

    pub fn insert_font(&mut self, key: AssetKey, font: Typeface) {
        self.entries.insert(key, CacheEntry::Font(Arc::new(font)));
    }

    pub fn insert_failed(&mut self, key: AssetKey, error: &AssetError) {
        self.entries
            .insert(key, CacheEntry::Failed(error.to_string()));
    }

    pub fn image(&self, key: &AssetKey) -> Option<Arc<ImageData>> {
        match self.entries.get(key) {
            Some(CacheEntry::Image(image)) => Some(image.clone()),
            _ => None,
        }
    }

    pub fn cube_map(&self, key: &AssetKey) -> Option<Arc<CubeMapData>> {
        match self.entries.get(key) {
            Some(CacheEntry::CubeMap(cube)) => Some(cube.clone()),
            _ => None,
        }
    }

    pub fn font(&self, key: &AssetKey) -> Option<Arc<Typeface>> {
        match self.entries.get(key) {
            Some(CacheEntry::Font(font)) => Some(font.clone()),
            _ => None,
        }
    }

    /// Drop an entry; returns false if there was none
    pub fn remove(&mut self, key: &AssetKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Runtime imports currently held
    pub fn imported_keys(&self) -> impl Iterator<Item = &AssetKey> {
        self.entries
            .keys()
            .filter(|key| matches!(key, AssetKey::Imported { .. }))
    }
}

/// Texture maps of the stone floor preset
#[derive(Debug, Clone, PartialEq)]
pub struct StoneFloorKeys {
    pub base: AssetKey,
    pub ambient_occlusion: AssetKey,
    pub height: AssetKey,
    pub normal: AssetKey,
}

/// Texture maps of the ceiling preset
#[derive(Debug, Clone, PartialEq)]
pub struct CeilingKeys {
    pub base: AssetKey,
    pub roughness: AssetKey,
    pub metallic: AssetKey,
    pub normal: AssetKey,
}

/// Where every built-in asset lives
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    root: PathBuf,
    font: String,
    environment: String,
    environment_extension: String,
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::new(&AssetConfig::default())
    }
}

impl AssetCatalog {
    pub fn new(config: &AssetConfig) -> Self {
        Self {
            root: config.root.clone(),
            font: config.font.clone(),
            environment: config.environment.clone(),
            environment_extension: config.environment_extension.clone(),
        }
    }

    pub fn background(&self, choice: BackgroundChoice) -> Option<AssetKey> {
        let file = match choice {
            BackgroundChoice::Color => return None,
            BackgroundChoice::Sea => "sea",
            BackgroundChoice::Nature => "nature",
            BackgroundChoice::Galaxy => "galaxy",
        };
        Some(AssetKey::Image(format!("textures/background/{file}.jpg")))
    }

    pub fn plane(&self, texture: PlaneTexture) -> Option<AssetKey> {
        let file = match texture {
            PlaneTexture::Color => return None,
            PlaneTexture::Grass => "grass",
            PlaneTexture::Dry => "dry",
        };
        Some(AssetKey::Image(format!("textures/plane/{file}.jpg")))
    }

    pub fn stone_floor(&self) -> StoneFloorKeys {
        let key = |name: &str| AssetKey::Image(format!("textures/stone_floor/{name}.jpg"));
        StoneFloorKeys {
            base: key("base"),
            ambient_occlusion: key("ambient_occlusion"),
            height: key("height"),
            normal: key("normal"),
        }
    }

    pub fn ceiling(&self) -> CeilingKeys {
        let key = |name: &str| AssetKey::Image(format!("textures/ceiling/{name}.jpg"));
        CeilingKeys {
            base: key("base"),
            roughness: key("roughness"),
            metallic: key("metallic"),
            normal: key("normal"),
        }
    }

    /// Image multiplied onto the scene by the blending preset
    pub fn shells(&self) -> AssetKey {
        AssetKey::Image("textures/shells.jpg".to_string())
    }

    /// Environment cube map used by the reflection preset
    pub fn environment(&self) -> AssetKey {
        AssetKey::CubeMap(self.environment.clone())
    }

    pub fn environment_extension(&self) -> &str {
        &self.environment_extension
    }

    pub fn font(&self) -> AssetKey {
        AssetKey::Font(self.font.clone())
    }

    /// File system location of a key; `None` for runtime imports
    pub fn resolve(&self, key: &AssetKey) -> Option<PathBuf> {
        match key {
            AssetKey::Image(path) | AssetKey::CubeMap(path) | AssetKey::Font(path) => {
                Some(self.root.join(path))
            }
            AssetKey::Imported { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_lifecycle() {
        let mut cache = AssetCache::new();
        let key = AssetKey::Image("a.png".to_string());
        assert_eq!(cache.state(&key), AssetState::Missing);

        assert!(cache.begin(&key));
        assert!(!cache.begin(&key));
        assert_eq!(cache.state(&key), AssetState::Pending);

        cache.insert_failed(key.clone(), &AssetError::Io("missing".to_string()));
        assert!(matches!(cache.state(&key), AssetState::Failed(_)));
        // Failed keys may be retried
        assert!(cache.begin(&key));

        let image = ImageData::from_rgba(1, 1, vec![255, 0, 0, 255]).unwrap();
        cache.insert_image(key.clone(), image);
        assert!(cache.is_ready(&key));
        assert!(cache.image(&key).is_some());
        assert!(cache.cube_map(&key).is_none());
        assert!(!cache.begin(&key));
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(ImageData::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(ImageData::from_rgba(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_decode_png() {
        let mut bytes = Vec::new();
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        image
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        let decoded = ImageData::decode(&bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(&decoded.pixels[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            ImageData::decode(b"not an image"),
            Err(AssetError::Decode(_))
        ));
    }

    #[test]
    fn test_cube_map_requires_equal_faces() {
        let face = |size: u32| {
            ImageData::from_rgba(size, size, vec![0; (size * size * 4) as usize]).unwrap()
        };
        assert!(CubeMapData::new(std::array::from_fn(|_| face(2))).is_ok());
        let mut faces: [ImageData; 6] = std::array::from_fn(|_| face(2));
        faces[3] = face(4);
        assert!(matches!(
            CubeMapData::new(faces),
            Err(AssetError::CubeMapMismatch)
        ));
    }

    #[test]
    fn test_cube_map_face_order() {
        let paths = CubeMapData::face_paths(Path::new("textures/pisa"), "png");
        assert_eq!(paths[0], Path::new("textures/pisa/px.png"));
        assert_eq!(paths[5], Path::new("textures/pisa/nz.png"));

        let face = || ImageData::from_rgba(1, 1, vec![0; 4]).unwrap();
        assert!(CubeMapData::from_faces((0..6).map(|_| face()).collect()).is_ok());
        assert!(matches!(
            CubeMapData::from_faces((0..5).map(|_| face()).collect()),
            Err(AssetError::CubeMapMismatch)
        ));
    }

    #[test]
    fn test_catalog_keys() {
        let catalog = AssetCatalog::default();
        assert_eq!(catalog.background(BackgroundChoice::Color), None);
        assert_eq!(
            catalog.background(BackgroundChoice::Sea),
            Some(AssetKey::Image("textures/background/sea.jpg".to_string()))
        );
        assert_eq!(
            catalog.plane(PlaneTexture::Dry),
            Some(AssetKey::Image("textures/plane/dry.jpg".to_string()))
        );
        let path = catalog.resolve(&catalog.shells()).unwrap();
        assert!(path.ends_with("textures/shells.jpg"));
        assert!(catalog.resolve(&AssetKey::imported("x.png")).is_none());
    }
}
