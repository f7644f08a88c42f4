use image::{GrayImage, Luma, RgbaImage};
use nalgebra::Vector4;

use crate::util::{from_rgba8, to_rgba8};

/// Value the depth buffer is reset to. Farther than anything interpolation can produce.
pub const FAR_DEPTH: f32 = f32::INFINITY;

/// Framebuffer, holding its width, height, flat rgba8 pixel data and a parallel depth buffer.
/// (0, 0) is the bottom left pixel, rows are stored top to bottom.
///
/// The depth buffer keeps `depth_samples` slots per pixel, one for every sub-sample a pixel
/// is rasterized with.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    depth_samples: u32,
    depth: Vec<f32>,      // Nearest accepted depth per sample, FAR_DEPTH after clear().
    render_data: Vec<u8>, // rgba8, row major.
}

impl Framebuffer {
    /// Generates new framebuffer filled with transparent black and a far depth buffer.
    pub fn new(width: u32, height: u32) -> Framebuffer {
        return Framebuffer::with_depth_samples(width, height, 1);
    }

    /// Same as `new`, with `depth_samples` depth slots per pixel.
    pub fn with_depth_samples(width: u32, height: u32, depth_samples: u32) -> Framebuffer {
        let depth_samples = depth_samples.max(1);
        let n_pixels = width as usize * height as usize;
        return Framebuffer {
            width,
            height,
            depth_samples,
            depth: vec![FAR_DEPTH; n_pixels * depth_samples as usize],
            render_data: vec![0; 4 * n_pixels],
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    pub fn depth_samples(&self) -> u32 {
        return self.depth_samples;
    }

    /// Get rendered frame as a slice of rgba8 values, top row first.
    pub fn as_render_data(&self) -> &[u8] {
        return &self.render_data[..];
    }

    /// Sets every pixel to `color` and resets the depth buffer.
    pub fn clear(&mut self, color: Vector4<f32>) {
        let bytes = to_rgba8(color);
        for pixel in self.render_data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&bytes);
        }
        self.depth.fill(FAR_DEPTH);
    }

    /// Index of a pixel, with y pointing up.
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        return x as usize + (self.height - 1 - y) as usize * self.width as usize;
    }

    /// Index of a depth slot.
    fn depth_index(&self, x: u32, y: u32, sample: u32) -> usize {
        debug_assert!(sample < self.depth_samples);
        return self.index(x, y) * self.depth_samples as usize + sample as usize;
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let index = 4 * self.index(x, y);
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.render_data[index..index + 4]);
        return bytes;
    }

    /// Pixel as a normalized color.
    pub fn color(&self, x: u32, y: u32) -> Vector4<f32> {
        return from_rgba8(self.pixel(x, y));
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Vector4<f32>) {
        let index = 4 * self.index(x, y);
        self.render_data[index..index + 4].copy_from_slice(&to_rgba8(color));
    }

    /// Nearest depth over the samples of a pixel.
    pub fn depth(&self, x: u32, y: u32) -> f32 {
        let start = self.depth_index(x, y, 0);
        let slots = &self.depth[start..start + self.depth_samples as usize];
        return slots.iter().copied().fold(FAR_DEPTH, f32::min);
    }

    /// Sets the depth of every sample of a pixel.
    pub fn set_depth(&mut self, x: u32, y: u32, depth: f32) {
        let start = self.depth_index(x, y, 0);
        self.depth[start..start + self.depth_samples as usize].fill(depth);
    }

    pub fn sample_depth(&self, x: u32, y: u32, sample: u32) -> f32 {
        return self.depth[self.depth_index(x, y, sample)];
    }

    pub fn set_sample_depth(&mut self, x: u32, y: u32, sample: u32, depth: f32) {
        let index = self.depth_index(x, y, sample);
        self.depth[index] = depth;
    }

    /// Box filter: averages each `factor` x `factor` block into one pixel, keeping the nearest
    /// depth of the block. Dimensions must be multiples of `factor`.
    pub fn downsample(&self, factor: u32) -> Framebuffer {
        let factor = factor.max(1);
        let mut result = Framebuffer::new(self.width / factor, self.height / factor);
        let n_samples = (factor * factor) as f32;
        for y in 0..result.height {
            for x in 0..result.width {
                let mut color = Vector4::zeros();
                let mut depth = FAR_DEPTH;
                for j in 0..factor {
                    for i in 0..factor {
                        color += self.color(x * factor + i, y * factor + j);
                        depth = depth.min(self.depth(x * factor + i, y * factor + j));
                    }
                }
                result.set_pixel(x, y, color / n_samples);
                result.set_depth(x, y, depth);
            }
        }
        return result;
    }

    /// Copy of the frame as an image, top row first.
    pub fn to_image(&self) -> RgbaImage {
        return RgbaImage::from_fn(self.width, self.height, |x, row| {
            image::Rgba(self.pixel(x, self.height - 1 - row))
        });
    }

    /// Image, representing depth buffer values. Nearest pixels are brightest, untouched ones black.
    /// Lazy in a sense, that it is calculated only if this call is made.
    pub fn depth_image(&self) -> GrayImage {
        let finite = self.depth.iter().copied().filter(|z| z.is_finite());
        let (z_min, z_max) = finite.fold((f32::MAX, f32::MIN), |(lo, hi), z| (lo.min(z), hi.max(z)));
        let scale = (z_max - z_min).max(f32::EPSILON);
        return GrayImage::from_fn(self.width, self.height, |x, row| {
            let z = self.depth(x, self.height - 1 - row);
            if !z.is_finite() {
                return Luma([0]);
            }
            Luma([(255.0 - (z - z_min) / scale * 254.0).round() as u8])
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn clear_fills_color_and_resets_depth() {
        let mut frame = Framebuffer::new(3, 2);
        frame.set_depth(1, 1, 0.5);
        frame.clear(vector![1.0, 0.0, 0.0, 1.0]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(frame.pixel(x, y), [255, 0, 0, 255]);
                assert_eq!(frame.depth(x, y), FAR_DEPTH);
            }
        }
    }

    #[test]
    fn y_points_up() {
        let mut frame = Framebuffer::new(2, 2);
        frame.set_pixel(0, 0, vector![1.0, 1.0, 1.0, 1.0]);
        // Bottom left pixel lives in the last row of the data.
        assert_eq!(&frame.as_render_data()[8..12], &[255, 255, 255, 255]);
        assert_eq!(frame.to_image().get_pixel(0, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn downsample_averages_blocks() {
        let mut frame = Framebuffer::new(4, 2);
        frame.clear(vector![0.0, 0.0, 0.0, 1.0]);
        frame.set_pixel(0, 0, vector![1.0, 1.0, 1.0, 1.0]);
        frame.set_pixel(1, 1, vector![1.0, 1.0, 1.0, 1.0]);
        frame.set_depth(1, 1, 0.25);
        let small = frame.downsample(2);
        assert_eq!((small.width(), small.height()), (2, 1));
        assert_eq!(small.pixel(0, 0), [128, 128, 128, 255]);
        assert_eq!(small.pixel(1, 0), [0, 0, 0, 255]);
        assert_eq!(small.depth(0, 0), 0.25);
    }

    #[test]
    fn per_sample_depth() {
        let mut frame = Framebuffer::with_depth_samples(2, 2, 4);
        assert_eq!(frame.depth_samples(), 4);
        frame.set_sample_depth(1, 0, 2, 0.5);
        frame.set_sample_depth(1, 0, 3, 0.25);
        assert_eq!(frame.sample_depth(1, 0, 2), 0.5);
        assert_eq!(frame.sample_depth(1, 0, 0), FAR_DEPTH);
        assert_eq!(frame.depth(1, 0), 0.25);
        assert_eq!(frame.depth(0, 0), FAR_DEPTH);

        frame.set_depth(0, 1, 0.75);
        assert!((0..4).all(|sample| frame.sample_depth(0, 1, sample) == 0.75));
        frame.clear(Vector4::zeros());
        assert_eq!(frame.depth(1, 0), FAR_DEPTH);
    }

    #[test]
    fn depth_image_marks_untouched_black() {
        let mut frame = Framebuffer::new(2, 1);
        frame.set_depth(0, 0, 0.3);
        let image = frame.depth_image();
        assert_eq!(image.get_pixel(0, 0).0, [255]);
        assert_eq!(image.get_pixel(1, 0).0, [0]);
    }
}
