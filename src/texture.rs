//! Planet texture loading and decoding.
//!
//! Textures are read from the asset directory. When a file is missing and
//! downloads are allowed, it is fetched from its public URL and cached in
//! the asset directory for the next start.

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use tracing::{info, warn};

use crate::error::TextureError;

const MAX_TEXTURE_BYTES: u64 = 32 * 1024 * 1024;
const TEXTURE_BASE_URL: &str =
    "https://raw.githubusercontent.com/mrdoob/three.js/master/examples/textures/planets";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TextureKind {
    Day,
    Clouds,
    Normal,
}

impl TextureKind {
    pub const ALL: [TextureKind; 3] = [TextureKind::Day, TextureKind::Clouds, TextureKind::Normal];

    pub fn file_name(&self) -> &'static str {
        match self {
            TextureKind::Day => "earth_atmos_2048.jpg",
            TextureKind::Clouds => "earth_clouds_1024.png",
            TextureKind::Normal => "earth_normal_2048.jpg",
        }
    }

    pub fn url(&self) -> String {
        format!("{}/{}", TEXTURE_BASE_URL, self.file_name())
    }

    /// 1x1 stand-in used until the real image arrives.
    pub fn placeholder(&self) -> EarthTexture {
        let pixel = match self {
            TextureKind::Day => [18, 42, 92],
            TextureKind::Clouds => [0, 0, 0],
            TextureKind::Normal => [128, 128, 255],
        };
        EarthTexture { width: 1, height: 1, pixels: vec![pixel] }
    }
}

#[derive(Clone, Debug)]
pub struct EarthTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

impl EarthTexture {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TextureError> {
        use std::io::Cursor;
        let mut reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(TextureError::Io)?;
        reader.no_limits();
        let img = reader.decode()
            .map_err(TextureError::Decode)?
            .to_rgb8();
        let width = img.width();
        let height = img.height();
        let pixels: Vec<[u8; 3]> = img.pixels().map(|p| p.0).collect();
        Ok(Self { width, height, pixels })
    }

    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&[r, g, b]| [r, g, b]).collect()
    }
}

/// Loads one texture from `assets_dir`, downloading it first if allowed.
pub fn load_texture(kind: TextureKind, assets_dir: &Path, allow_download: bool) -> Result<EarthTexture, TextureError> {
    let path = assets_dir.join(kind.file_name());
    if path.exists() {
        let bytes = std::fs::read(&path).map_err(TextureError::Io)?;
        return EarthTexture::from_bytes(&bytes);
    }
    if !allow_download {
        return Err(TextureError::NotFound(path));
    }

    let bytes = download(&kind.url())?;
    let texture = EarthTexture::from_bytes(&bytes)?;
    if let Err(e) = cache(&path, &bytes) {
        warn!(path = %path.display(), error = %e, "could not cache texture");
    }
    Ok(texture)
}

fn download(url: &str) -> Result<Vec<u8>, TextureError> {
    info!(url, "downloading texture");
    let response = ureq::get(url)
        .call()
        .map_err(|e| TextureError::Download { url: url.to_string(), reason: e.to_string() })?;
    let mut bytes = Vec::new();
    response.into_reader()
        .take(MAX_TEXTURE_BYTES)
        .read_to_end(&mut bytes)
        .map_err(|e| TextureError::Download { url: url.to_string(), reason: e.to_string() })?;
    Ok(bytes)
}

fn cache(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}

pub type TextureResult = (TextureKind, Result<EarthTexture, TextureError>);

/// Starts one loader thread per texture kind; results arrive on the
/// returned channel in completion order.
pub fn spawn_texture_loads(assets_dir: PathBuf, allow_download: bool) -> mpsc::Receiver<TextureResult> {
    let (tx, rx) = mpsc::channel();
    for kind in TextureKind::ALL {
        let tx = tx.clone();
        let dir = assets_dir.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("texture-{:?}", kind).to_lowercase())
            .spawn(move || {
                let _ = tx.send((kind, load_texture(kind, &dir, allow_download)));
            });
        if let Err(e) = spawned {
            warn!(?kind, error = %e, "could not start texture loader");
        }
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_decode_keeps_pixel_order() {
        let tex = EarthTexture::from_bytes(&png_bytes()).unwrap();
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.pixels, vec![[255, 0, 0], [0, 0, 255]]);
        assert_eq!(tex.rgb_bytes(), vec![255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        assert!(EarthTexture::from_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn test_load_from_asset_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TextureKind::Clouds.file_name()), png_bytes()).unwrap();
        let tex = load_texture(TextureKind::Clouds, dir.path(), false).unwrap();
        assert_eq!(tex.width, 2);
    }

    #[test]
    fn test_missing_texture_offline() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_texture(TextureKind::Day, dir.path(), false).unwrap_err();
        assert!(matches!(err, TextureError::NotFound(_)));
    }

    #[test]
    fn test_placeholders_are_single_pixels() {
        for kind in TextureKind::ALL {
            let p = kind.placeholder();
            assert_eq!(p.pixels.len(), 1);
        }
        assert_eq!(TextureKind::Normal.placeholder().pixels[0], [128, 128, 255]);
    }

    #[test]
    fn test_loader_threads_report_every_kind() {
        let dir = tempfile::tempdir().unwrap();
        let rx = spawn_texture_loads(dir.path().to_path_buf(), false);
        let mut seen: Vec<TextureKind> = rx.iter().take(3).map(|(k, r)| {
            assert!(r.is_err());
            k
        }).collect();
        seen.sort_by_key(|k| *k as u8);
        assert_eq!(seen, TextureKind::ALL.to_vec());
    }
}
