//! Heightmap import/export as PNG images.
//!
//! Accepted inputs:
//! - 16-bit grayscale (big-endian samples, the native export format)
//! - 8-bit grayscale (expanded to 16 bits)
//! - 8-bit RGBA with the 16-bit height packed as red = low byte, green = high byte

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::{HeightfieldError, Heightmap};

impl Heightmap {
    /// Load a heightmap from a PNG file, mapping samples onto the given elevation range.
    pub fn load_png(
        path: &Path,
        min_elevation: f32,
        max_elevation: f32,
    ) -> Result<Self, HeightfieldError> {
        let decoder = png::Decoder::new(BufReader::new(File::open(path)?));
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let bytes = &buf[..info.buffer_size()];

        let samples: Vec<u16> = match (info.color_type, info.bit_depth) {
            (png::ColorType::Grayscale, png::BitDepth::Sixteen) => bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect(),
            (png::ColorType::Grayscale, png::BitDepth::Eight) => {
                bytes.iter().map(|&v| u16::from(v) * 257).collect()
            }
            (png::ColorType::Rgba, png::BitDepth::Eight) => bytes
                .chunks_exact(4)
                .map(|px| u16::from_le_bytes([px[0], px[1]]))
                .collect(),
            (color_type, bit_depth) => {
                return Err(HeightfieldError::UnsupportedPng {
                    color_type: format!("{color_type:?}"),
                    bit_depth: bit_depth as u8,
                });
            }
        };

        log::info!(
            "Loaded {}x{} heightmap from {}",
            info.width,
            info.height,
            path.display()
        );
        Heightmap::from_samples(info.width, info.height, samples, min_elevation, max_elevation)
    }

    /// Save the raw samples as a 16-bit grayscale PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), HeightfieldError> {
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = png::Encoder::new(writer, self.width(), self.height());
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Sixteen);

        let bytes: Vec<u8> = self
            .samples()
            .iter()
            .flat_map(|sample| sample.to_be_bytes())
            .collect();

        let mut png_writer = encoder.write_header()?;
        png_writer.write_image_data(&bytes)?;
        png_writer.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{HeightmapParams, generate_heightmap};

    use super::*;

    #[test]
    fn test_png_roundtrip_preserves_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terrain.png");

        let map = generate_heightmap(24, 16, HeightmapParams::default(), -50.0, 450.0).unwrap();
        map.save_png(&path).unwrap();

        let loaded = Heightmap::load_png(&path, -50.0, 450.0).unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn test_packed_rgba_decodes_low_high_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packed.png");

        let file = BufWriter::new(File::create(&path).unwrap());
        let mut encoder = png::Encoder::new(file, 2, 1);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer
            .write_image_data(&[0x34, 0x12, 0, 255, 0xFF, 0xFF, 0, 255])
            .unwrap();
        writer.finish().unwrap();

        let loaded = Heightmap::load_png(&path, 0.0, 1.0).unwrap();
        assert_eq!(loaded.samples(), &[0x1234, 0xFFFF]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Heightmap::load_png(&dir.path().join("missing.png"), 0.0, 1.0);
        assert!(matches!(result, Err(HeightfieldError::Io(_))));
    }
}
