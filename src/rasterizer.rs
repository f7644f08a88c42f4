use std::path::Path;

use image::RgbaImage;
use nalgebra::{Vector3, Vector4};

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::object::Object;
use crate::raster::{draw_triangle, RasterState, ShadedVertex, MAX_SAMPLES_PER_AXIS};
use crate::shader::{Attrib, FragmentShader, ShaderProgram, UniformValue, VertexShader};
use crate::surface::{Surface, WindowSurface};

/// How extra samples per pixel are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Supersampling {
    /// Framebuffer at display resolution, every pixel averages its own grid of sub-samples.
    #[default]
    PerPixel,
    /// Framebuffer enlarged by the per-axis factor, box filtered down on `show`.
    Buffer,
}

/// Setup of a rasterizer.
#[derive(Debug, Clone)]
pub struct RasterizerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub supersampling: Supersampling,
    pub depth_test: bool,
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        return Self {
            title: String::from("tiny_rasterizer"),
            width: 640,
            height: 480,
            samples_per_pixel: 1,
            supersampling: Supersampling::PerPixel,
            depth_test: false,
        };
    }
}

impl RasterizerConfig {
    /// Sub-samples along each axis: the rounded square root of samples per pixel, at least 1
    /// and at most `MAX_SAMPLES_PER_AXIS`.
    pub fn samples_per_axis(&self) -> u32 {
        let samples = (self.samples_per_pixel as f64).sqrt().round() as u32;
        return samples.clamp(1, MAX_SAMPLES_PER_AXIS);
    }
}

/// Software rasterizer: owns the framebuffer and the surface frames are shown on.
///
/// Typical frame: `clear`, set uniforms, `draw_object` for every object, `show`.
pub struct Rasterizer<S: Surface = WindowSurface> {
    surface: S,
    frame: Framebuffer,
    config: RasterizerConfig,
    quit: bool,
}

impl Rasterizer<WindowSurface> {
    /// Creates a window with the given title, size and samples per pixel.
    pub fn initialize(title: &str, width: u32, height: u32, samples_per_pixel: u32) -> Result<Self> {
        let config = RasterizerConfig {
            title: title.to_owned(),
            width,
            height,
            samples_per_pixel,
            ..Default::default()
        };
        return Self::with_config(config);
    }

    /// Creates a window described by `config`.
    pub fn with_config(config: RasterizerConfig) -> Result<Self> {
        let surface = WindowSurface::new(&config.title, config.width, config.height)?;
        return Ok(Self::with_surface(surface, config));
    }
}

impl<S: Surface> Rasterizer<S> {
    /// Rasterizer presenting to an already created surface.
    ///
    /// In `Supersampling::PerPixel` mode the depth buffer keeps one slot per sub-sample, in
    /// `Supersampling::Buffer` mode the framebuffer itself is enlarged.
    pub fn with_surface(surface: S, config: RasterizerConfig) -> Self {
        let samples = config.samples_per_axis();
        if samples * samples < config.samples_per_pixel {
            log::warn!(
                "{} samples per pixel requested, using {}",
                config.samples_per_pixel,
                samples * samples
            );
        }
        let frame = match config.supersampling {
            Supersampling::PerPixel => {
                Framebuffer::with_depth_samples(config.width, config.height, samples * samples)
            }
            Supersampling::Buffer => Framebuffer::new(
                config.width.saturating_mul(samples),
                config.height.saturating_mul(samples),
            ),
        };
        log::debug!(
            "rasterizer {}x{}, {} samples per axis ({:?}), depth test {}",
            config.width,
            config.height,
            config.samples_per_axis(),
            config.supersampling,
            config.depth_test
        );
        return Self {
            surface,
            frame,
            config,
            quit: false,
        };
    }

    pub fn config(&self) -> &RasterizerConfig {
        return &self.config;
    }

    pub fn surface(&self) -> &S {
        return &self.surface;
    }

    pub fn surface_mut(&mut self) -> &mut S {
        return &mut self.surface;
    }

    /// The internal framebuffer, enlarged in `Supersampling::Buffer` mode.
    pub fn framebuffer(&self) -> &Framebuffer {
        return &self.frame;
    }

    /// True once quitting was requested through the surface.
    pub fn should_quit(&self) -> bool {
        return self.quit;
    }

    // Shader programs.

    pub fn create_shader_program(&self, vs: VertexShader, fs: FragmentShader) -> ShaderProgram {
        log::debug!("created shader program");
        return ShaderProgram::new(vs, fs);
    }

    /// Binds `program` for the draw calls issued through the returned handle.
    pub fn use_shader_program<'a>(&'a mut self, program: &'a ShaderProgram) -> ActiveProgram<'a, S> {
        return ActiveProgram {
            rasterizer: self,
            program,
        };
    }

    pub fn set_uniform<T: UniformValue>(&self, program: &mut ShaderProgram, name: &str, value: T) {
        program.set_uniform(name, value);
    }

    pub fn delete_shader_program(&self, program: ShaderProgram) {
        log::debug!("deleted shader program with {} uniforms", program.uniforms().len());
        drop(program);
    }

    // Objects.

    pub fn create_object(&self) -> Object {
        return Object::new();
    }

    /// Sets the `attrib_index`th attribute of the first `data.len()` vertices.
    pub fn set_vertex_attribs<T: Attrib>(&self, object: &mut Object, attrib_index: usize, data: &[T]) {
        object.set_vertex_attribs(attrib_index, data);
    }

    pub fn set_triangle_indices(&self, object: &mut Object, indices: &[Vector3<usize>]) {
        object.set_triangle_indices(indices);
    }

    // Drawing.

    pub fn enable_depth_test(&mut self) {
        log::debug!("depth test enabled");
        self.config.depth_test = true;
    }

    pub fn disable_depth_test(&mut self) {
        log::debug!("depth test disabled");
        self.config.depth_test = false;
    }

    /// Sets all pixels to `color` and resets the depth buffer.
    pub fn clear(&mut self, color: Vector4<f32>) {
        self.frame.clear(color);
    }

    /// Draws the triangles of `object` with `program`.
    ///
    /// Colors are shaded once per triangle corner and interpolated. Nothing is drawn if a
    /// triangle references a missing vertex; a shader error stops the draw before the
    /// triangle it happened in.
    pub fn draw_object(&mut self, program: &ShaderProgram, object: &Object) -> Result<()> {
        object.validate()?;
        let state = RasterState {
            depth_test: self.config.depth_test,
            samples_per_axis: match self.config.supersampling {
                Supersampling::PerPixel => self.config.samples_per_axis(),
                Supersampling::Buffer => 1,
            },
        };

        let mut skipped = 0;
        for indices in object.triangles() {
            let mut vertices = [ShadedVertex {
                position: Vector4::zeros(),
                color: Vector4::zeros(),
            }; 3];
            for (vertex, index) in vertices.iter_mut().zip(indices.iter()) {
                let (position, out) = program.shade_vertex(&object.vertices()[*index])?;
                vertex.position = position;
                vertex.color = program.shade_fragment(&out)?;
            }
            if !draw_triangle(&mut self.frame, vertices, state) {
                skipped += 1;
            }
        }
        log::trace!(
            "drew {} triangles, {} skipped",
            object.triangles().len() - skipped,
            skipped
        );
        return Ok(());
    }

    /// Downsampled copy of the frame, None if it already is at display resolution.
    fn display_frame(&self) -> Option<Framebuffer> {
        return match self.config.supersampling {
            Supersampling::Buffer if self.config.samples_per_axis() > 1 => {
                Some(self.frame.downsample(self.config.samples_per_axis()))
            }
            _ => None,
        };
    }

    /// Displays the framebuffer on the surface and polls it for a quit request.
    pub fn show(&mut self) -> Result<()> {
        let downsampled = self.display_frame();
        let frame = downsampled.as_ref().unwrap_or(&self.frame);
        self.surface.present(frame.width(), frame.height(), frame.as_render_data())?;
        if self.surface.poll_quit() {
            log::debug!("quit requested");
            self.quit = true;
        }
        return Ok(());
    }

    /// Copy of the current frame at display resolution.
    pub fn snapshot(&self) -> RgbaImage {
        return match self.display_frame() {
            Some(frame) => frame.to_image(),
            None => self.frame.to_image(),
        };
    }

    /// Saves the current frame at display resolution, format picked from the extension.
    pub fn save_frame<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.snapshot().save(path.as_ref())?;
        log::info!("saved frame to {}", path.as_ref().display());
        return Ok(());
    }
}

/// A rasterizer with a shader program bound for drawing.
pub struct ActiveProgram<'a, S: Surface> {
    rasterizer: &'a mut Rasterizer<S>,
    program: &'a ShaderProgram,
}

impl<'a, S: Surface> ActiveProgram<'a, S> {
    pub fn draw_object(&mut self, object: &Object) -> Result<()> {
        return self.rasterizer.draw_object(self.program, object);
    }

    pub fn program(&self) -> &ShaderProgram {
        return self.program;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    #[test]
    fn samples_per_axis_is_rounded_square_root() {
        let mut config = RasterizerConfig::default();
        for (spp, expected) in [(0, 1), (1, 1), (2, 1), (3, 2), (4, 2), (9, 3), (16, 4), (u32::MAX, 16)] {
            config.samples_per_pixel = spp;
            assert_eq!(config.samples_per_axis(), expected, "{} samples per pixel", spp);
        }
    }

    #[test]
    fn buffer_mode_enlarges_framebuffer() {
        let config = RasterizerConfig {
            width: 10,
            height: 5,
            samples_per_pixel: 9,
            supersampling: Supersampling::Buffer,
            ..Default::default()
        };
        let rasterizer = Rasterizer::with_surface(HeadlessSurface::new(), config);
        assert_eq!((rasterizer.framebuffer().width(), rasterizer.framebuffer().height()), (30, 15));
        assert_eq!(rasterizer.snapshot().dimensions(), (10, 5));
    }

    #[test]
    fn per_pixel_mode_keeps_depth_per_sample() {
        let config = RasterizerConfig {
            width: 10,
            height: 5,
            samples_per_pixel: 4,
            ..Default::default()
        };
        let rasterizer = Rasterizer::with_surface(HeadlessSurface::new(), config);
        assert_eq!((rasterizer.framebuffer().width(), rasterizer.framebuffer().height()), (10, 5));
        assert_eq!(rasterizer.framebuffer().depth_samples(), 4);
    }

    #[test]
    fn huge_sample_count_is_clamped() {
        let config = RasterizerConfig {
            width: 4,
            height: 2,
            samples_per_pixel: u32::MAX,
            supersampling: Supersampling::Buffer,
            ..Default::default()
        };
        let rasterizer = Rasterizer::with_surface(HeadlessSurface::new(), config);
        assert_eq!((rasterizer.framebuffer().width(), rasterizer.framebuffer().height()), (64, 32));
        assert_eq!(rasterizer.snapshot().dimensions(), (4, 2));
    }

    #[test]
    fn quit_is_latched() {
        let mut rasterizer = Rasterizer::with_surface(HeadlessSurface::new(), RasterizerConfig::default());
        rasterizer.show().unwrap();
        assert!(!rasterizer.should_quit());
        rasterizer.surface_mut().request_quit();
        rasterizer.show().unwrap();
        rasterizer.show().unwrap();
        assert!(rasterizer.should_quit());
        assert_eq!(rasterizer.surface().frames_presented(), 3);
    }
}
