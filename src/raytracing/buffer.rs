use super::color::Color;
use super::error::TracerError;

#[derive(Debug, Clone, Copy)]
pub struct PixelData {
    pub color: Color,
    /// Set when tracing this pixel hit tied intersections and the result was
    /// deferred to the resolution pass.
    pub is_ambiguous: bool,
}

/// Dense row-major grid of accumulated light energy, one cell per traced
/// sub-pixel. Colors stay in linear HDR until `tone_mapped_bytes`.
pub struct PixelBuffer {
    pixels: Vec<PixelData>,
    pixels_wide: usize,
    pixels_high: usize,
}

impl PixelBuffer {
    pub fn new(pixels_wide: usize, pixels_high: usize, background_color: Color) -> PixelBuffer {
        PixelBuffer {
            pixels: vec![
                PixelData {
                    color: background_color,
                    is_ambiguous: false,
                };
                pixels_wide * pixels_high
            ],
            pixels_wide,
            pixels_high,
        }
    }

    pub fn pixels_wide(&self) -> usize {
        self.pixels_wide
    }

    pub fn pixels_high(&self) -> usize {
        self.pixels_high
    }

    fn index(&self, i: usize, j: usize) -> Result<usize, TracerError> {
        if i < self.pixels_wide && j < self.pixels_high {
            Ok(j * self.pixels_wide + i)
        } else {
            Err(TracerError::PixelOutOfBounds(i, j))
        }
    }

    pub fn pixel(&self, i: usize, j: usize) -> Result<&PixelData, TracerError> {
        let index = self.index(i, j)?;
        Ok(&self.pixels[index])
    }

    pub fn pixel_mut(&mut self, i: usize, j: usize) -> Result<&mut PixelData, TracerError> {
        let index = self.index(i, j)?;
        Ok(&mut self.pixels[index])
    }

    /// Whole storage as one row-major slice, for partitioning into disjoint
    /// row stripes during parallel rendering.
    pub fn pixels_mut(&mut self) -> &mut [PixelData] {
        &mut self.pixels
    }

    pub fn ambiguous_coordinates(&self) -> Vec<(usize, usize)> {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, pixel)| pixel.is_ambiguous)
            .map(|(index, _)| (index % self.pixels_wide, index / self.pixels_wide))
            .collect()
    }

    /// Largest color component anywhere in the buffer, validating every
    /// pixel on the way. A solid black image reports 1 so the tone-mapping
    /// division is always defined.
    pub fn max_color_value(&self) -> Result<f64, TracerError> {
        let mut max: f64 = 0.0;
        for pixel in &self.pixels {
            pixel.color.validate()?;
            max = max.max(pixel.color.max_component());
        }
        if max == 0.0 {
            max = 1.0;
        }
        Ok(max)
    }

    /// Box-filter the buffer down by an integer factor, averaging each
    /// factor-by-factor block of sub-pixels into one output pixel.
    pub fn downsample(&self, factor: usize) -> PixelBuffer {
        let small_wide = self.pixels_wide / factor;
        let small_high = self.pixels_high / factor;
        let mut small = PixelBuffer::new(small_wide, small_high, Color::black());
        let patch_weight = 1.0 / (factor * factor) as f64;
        for j in 0..small_high {
            for i in 0..small_wide {
                let mut sum = Color::black();
                for dj in 0..factor {
                    let row = (j * factor + dj) * self.pixels_wide;
                    for di in 0..factor {
                        sum += self.pixels[row + i * factor + di].color;
                    }
                }
                small.pixels[j * small_wide + i].color = sum * patch_weight;
            }
        }
        small
    }

    /// Tone map to packed RGB8: every component is scaled by 255 over the
    /// global maximum (not per pixel), then clamped to the byte range.
    pub fn tone_mapped_bytes(&self) -> Result<Vec<u8>, TracerError> {
        let max = self.max_color_value()?;
        let scale = 255.0 / max;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for pixel in &self.pixels {
            bytes.push(convert_component(pixel.color.red * scale));
            bytes.push(convert_component(pixel.color.green * scale));
            bytes.push(convert_component(pixel.color.blue * scale));
        }
        Ok(bytes)
    }
}

fn convert_component(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_buffer_reports_unit_maximum() {
        let buffer = PixelBuffer::new(4, 4, Color::black());
        assert_eq!(buffer.max_color_value().unwrap(), 1.0);
    }

    #[test]
    fn negative_component_fails_the_max_scan() {
        let mut buffer = PixelBuffer::new(2, 2, Color::black());
        buffer.pixel_mut(1, 1).unwrap().color = Color::new(0.0, -0.5, 0.0);
        assert!(buffer.max_color_value().is_err());
    }

    #[test]
    fn out_of_bounds_access_is_an_error() {
        let mut buffer = PixelBuffer::new(3, 2, Color::black());
        assert!(buffer.pixel(2, 1).is_ok());
        assert!(buffer.pixel(3, 0).is_err());
        assert!(buffer.pixel_mut(0, 2).is_err());
    }

    #[test]
    fn downsample_averages_each_block() {
        let mut buffer = PixelBuffer::new(2, 2, Color::black());
        buffer.pixel_mut(0, 0).unwrap().color = Color::new(1.0, 0.0, 0.0);
        buffer.pixel_mut(1, 0).unwrap().color = Color::new(0.0, 1.0, 0.0);
        buffer.pixel_mut(0, 1).unwrap().color = Color::new(0.0, 0.0, 1.0);
        buffer.pixel_mut(1, 1).unwrap().color = Color::new(1.0, 1.0, 1.0);
        let small = buffer.downsample(2);
        assert_eq!(small.pixels_wide(), 1);
        assert_eq!(small.pixels_high(), 1);
        assert_eq!(small.pixel(0, 0).unwrap().color, Color::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn tone_mapping_scales_by_the_global_maximum() {
        let mut buffer = PixelBuffer::new(2, 1, Color::black());
        buffer.pixel_mut(0, 0).unwrap().color = Color::new(2.0, 1.0, 0.0);
        buffer.pixel_mut(1, 0).unwrap().color = Color::new(0.5, 0.0, 2.0);
        let bytes = buffer.tone_mapped_bytes().unwrap();
        assert_eq!(bytes, vec![255, 127, 0, 63, 0, 255]);
    }

    #[test]
    fn ambiguous_coordinates_report_row_major_positions() {
        let mut buffer = PixelBuffer::new(3, 2, Color::black());
        buffer.pixel_mut(2, 0).unwrap().is_ambiguous = true;
        buffer.pixel_mut(1, 1).unwrap().is_ambiguous = true;
        assert_eq!(buffer.ambiguous_coordinates(), vec![(2, 0), (1, 1)]);
    }
}
