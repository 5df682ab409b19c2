//! Encoding and saving card artifacts

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use crate::config::EncodingConfig;
use crate::error::EncodingError;

/// Encoded image format of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Jpeg,
    Png,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Jpeg => "jpg",
            ArtifactFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactFormat::Jpeg => "image/jpeg",
            ArtifactFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serializes a finished canvas.
pub trait ArtifactEncoder: Send + Sync {
    fn format(&self) -> ArtifactFormat;
    fn encode(&self, canvas: &RgbaImage) -> Result<Vec<u8>, EncodingError>;
}

/// Fixed-quality baseline JPEG. Alpha is dropped.
#[derive(Debug, Clone, Copy)]
pub struct JpegArtifactEncoder {
    quality: u8,
}

impl JpegArtifactEncoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for JpegArtifactEncoder {
    fn default() -> Self {
        Self::new(90)
    }
}

impl ArtifactEncoder for JpegArtifactEncoder {
    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Jpeg
    }

    fn encode(&self, canvas: &RgbaImage) -> Result<Vec<u8>, EncodingError> {
        let rgb: RgbImage = canvas.convert();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.quality).encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ColorType::Rgb8,
        )?;
        non_empty(bytes)
    }
}

/// Lossless PNG, keeping alpha.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngArtifactEncoder;

impl ArtifactEncoder for PngArtifactEncoder {
    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Png
    }

    fn encode(&self, canvas: &RgbaImage) -> Result<Vec<u8>, EncodingError> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes).write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ColorType::Rgba8,
        )?;
        non_empty(bytes)
    }
}

fn non_empty(bytes: Vec<u8>) -> Result<Vec<u8>, EncodingError> {
    if bytes.is_empty() {
        Err(EncodingError::Empty)
    } else {
        Ok(bytes)
    }
}

/// Build the encoder selected by configuration.
pub fn encoder_for(config: &EncodingConfig) -> Box<dyn ArtifactEncoder> {
    match config.format {
        ArtifactFormat::Jpeg => Box::new(JpegArtifactEncoder::new(config.quality)),
        ArtifactFormat::Png => Box::new(PngArtifactEncoder),
    }
}

/// A finished, encoded card. Holds no reference to any intermediate bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardArtifact {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ArtifactFormat,
}

impl CardArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Readable stream positioned at the start.
    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes)
    }
}

/// Write an artifact to disk.
///
/// Creates parent directories if they don't exist.
pub fn save_artifact(artifact: &CardArtifact, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, &artifact.bytes)
}

/// Generate the output path for a rendered card.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `{input_stem}_card.{ext}` next to the input |
/// | `-o out.jpg` | `out.jpg` |
/// | `-o dir/` | `dir/{input_stem}_card.{ext}` |
pub fn generate_output_path(
    input: &Path,
    output_arg: Option<&Path>,
    format: ArtifactFormat,
) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let file_name = format!("{}_card.{}", stem, format.extension());

    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(file_name)
            } else {
                output.to_path_buf()
            }
        }
        None => {
            let parent = input.parent().unwrap_or(Path::new(""));
            if parent.as_os_str().is_empty() {
                PathBuf::from(file_name)
            } else {
                parent.join(file_name)
            }
        }
    }
}
