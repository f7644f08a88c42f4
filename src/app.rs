use std::f32::consts::PI;
use std::time;

use nalgebra as na;
use na::{vector, Matrix4, Perspective3, Vector3, Vector4};

use tiny_rasterizer::util::to_hom_point;
use tiny_rasterizer::{
    fs_constant, fs_identity, vs_color, vs_color_transform, vs_transform, Object, Rasterizer,
    RasterizerConfig, ShaderProgram, Supersampling,
};

/// Execution parameters, filled from the command line.
pub struct Params {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: Option<u32>, // None keeps the demo's own choice.
    pub supersampling: Supersampling,
    pub print_fps: bool,
    pub demo_name: String,
    pub output: Option<String>, // Where to save the last frame.
}

/// A scene redrawn every frame. Anything changing between frames lives in the implementor.
trait Demo {
    fn frame(&mut self, r: &mut Rasterizer, dt: f32) -> tiny_rasterizer::Result<()>;
}

/// Helper for the rotations below.
fn rotation_z(degrees: f32) -> Matrix4<f32> {
    return Matrix4::from_axis_angle(&Vector3::z_axis(), degrees.to_radians());
}

/// Unit square in the first quadrant, two triangles.
fn unit_square(r: &Rasterizer) -> Object {
    let mut square = r.create_object();
    let vertices: [Vector4<f32>; 4] = [
        vector![0.0, 0.0, 0.0, 1.0],
        vector![1.0, 0.0, 0.0, 1.0],
        vector![0.0, 1.0, 0.0, 1.0],
        vector![1.0, 1.0, 0.0, 1.0],
    ];
    r.set_vertex_attribs(&mut square, 0, &vertices);
    r.set_triangle_indices(&mut square, &[vector![0, 1, 2], vector![1, 2, 3]]);
    return square;
}

/// Two triangles with colors interpolated between their corners.
struct TriangleDemo {
    program: ShaderProgram,
    shape: Object,
}

impl TriangleDemo {
    fn new(r: &mut Rasterizer) -> Self {
        let program = r.create_shader_program(vs_color(), fs_identity());
        let mut shape = r.create_object();
        let vertices: [Vector4<f32>; 4] = [
            vector![-0.8, 0.0, 0.0, 1.0],
            vector![-0.4, -0.8, 0.0, 1.0],
            vector![0.8, 0.8, 0.0, 1.0],
            vector![-0.4, -0.4, 0.0, 1.0],
        ];
        let colors: [Vector4<f32>; 4] = [
            vector![0.0, 0.4, 0.0, 1.0],
            vector![0.0, 0.4, 0.0, 1.0],
            vector![0.0, 0.4, 0.0, 1.0],
            vector![0.8, 0.8, 0.8, 1.0],
        ];
        r.set_vertex_attribs(&mut shape, 0, &vertices);
        r.set_vertex_attribs(&mut shape, 1, &colors);
        r.set_triangle_indices(&mut shape, &[vector![0, 1, 3], vector![1, 2, 3]]);
        return Self { program, shape };
    }
}

impl Demo for TriangleDemo {
    fn frame(&mut self, r: &mut Rasterizer, _dt: f32) -> tiny_rasterizer::Result<()> {
        r.clear(Vector4::repeat(1.0));
        return r.use_shader_program(&self.program).draw_object(&self.shape);
    }
}

/// Analog clock showing UTC time, built from transformed unit squares.
struct ClockDemo {
    program: ShaderProgram,
    square: Object,
}

impl ClockDemo {
    fn new(r: &mut Rasterizer) -> Self {
        let mut program = r.create_shader_program(vs_transform(), fs_constant());
        r.set_uniform(&mut program, "color", vector![0.0f32, 0.6, 0.0, 1.0]);
        let square = unit_square(r);
        return Self { program, square };
    }

    /// Draws the square scaled to `length` x `width`, rotated by `degrees`.
    fn draw_bar(&mut self, r: &mut Rasterizer, degrees: f32, length: f32, width: f32, offset: f32) -> tiny_rasterizer::Result<()> {
        let transform = rotation_z(degrees)
            * Matrix4::new_nonuniform_scaling(&vector![length, width, 1.0])
            * Matrix4::new_translation(&vector![offset, -0.5, 0.0]);
        r.set_uniform(&mut self.program, "transform", transform);
        return r.draw_object(&self.program, &self.square);
    }
}

impl Demo for ClockDemo {
    fn frame(&mut self, r: &mut Rasterizer, _dt: f32) -> tiny_rasterizer::Result<()> {
        r.clear(Vector4::repeat(1.0));
        for i in 0..12 {
            self.draw_bar(r, -30.0 * i as f32, 0.04, 0.02, 15.0)?;
        }

        let seconds_today = time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .map(|d| d.as_secs() % 86_400)
            .unwrap_or(0);
        let h = (seconds_today / 3600) as f32;
        let m = (seconds_today / 60 % 60) as f32;
        let s = (seconds_today % 60) as f32;
        self.draw_bar(r, -30.0 * h + 90.0, 0.2, 0.02, 0.0)?;
        self.draw_bar(r, -6.0 * m + 90.0, 0.35, 0.01, 0.0)?;
        return self.draw_bar(r, -6.0 * s + 90.0, 0.5, 0.006, 0.0);
    }
}

/// Rotating quad in perspective, colors interpolated perspective-correctly.
struct QuadDemo {
    program: ShaderProgram,
    shape: Object,
    projection_view: Matrix4<f32>,
    angle: f32, // Degrees around x.
}

impl QuadDemo {
    fn new(r: &mut Rasterizer, aspect: f32) -> Self {
        let program = r.create_shader_program(vs_color_transform(), fs_identity());
        let mut shape = r.create_object();
        let vertices: [Vector4<f32>; 4] = [
            vector![-0.8, -0.8, 0.0, 1.0],
            vector![0.8, -0.8, 0.0, 1.0],
            vector![-0.8, 0.8, 0.0, 1.0],
            vector![0.8, 0.8, 0.0, 1.0],
        ];
        let blue: Vector4<f32> = vector![0.3, 0.3, 1.0, 1.0];
        let yellow: Vector4<f32> = vector![1.0, 1.0, 0.3, 1.0];
        r.set_vertex_attribs(&mut shape, 0, &vertices);
        r.set_vertex_attribs(&mut shape, 1, &[blue, yellow, blue, yellow]);
        r.set_triangle_indices(&mut shape, &[vector![0, 1, 2], vector![1, 2, 3]]);
        r.enable_depth_test();

        let projection = Perspective3::new(aspect, 45f32.to_radians(), 0.1, 100.0).to_homogeneous();
        let view = Matrix4::new_translation(&vector![0.0, 0.0, -3.0]);
        return Self {
            program,
            shape,
            projection_view: projection * view,
            angle: -70.0,
        };
    }
}

impl Demo for QuadDemo {
    fn frame(&mut self, r: &mut Rasterizer, dt: f32) -> tiny_rasterizer::Result<()> {
        self.angle -= 60.0 * dt;
        let model = Matrix4::from_axis_angle(&Vector3::x_axis(), self.angle.to_radians());
        r.set_uniform(&mut self.program, "transform", self.projection_view * model);
        r.clear(Vector4::repeat(1.0));
        return r.draw_object(&self.program, &self.shape);
    }
}

/// Rotating cube with a different color on every face.
struct CubeDemo {
    program: ShaderProgram,
    cube: Object,
    projection_view: Matrix4<f32>,
    time: f32,
}

impl CubeDemo {
    fn new(r: &mut Rasterizer, aspect: f32) -> Self {
        let program = r.create_shader_program(vs_color_transform(), fs_identity());
        let face_colors: [Vector4<f32>; 6] = [
            vector![0.94, 0.94, 0.94, 1.0],
            vector![1.0, 0.84, 0.0, 1.0],
            vector![0.0, 0.61, 0.28, 1.0],
            vector![0.0, 0.27, 0.68, 1.0],
            vector![0.72, 0.07, 0.2, 1.0],
            vector![1.0, 0.35, 0.0, 1.0],
        ];
        let mut vertices = Vec::new();
        let mut colors = Vec::new();
        let mut triangles = Vec::new();
        // Each face is spanned by two unit axes from a corner of the [-0.5, 0.5] cube.
        for (face, color) in face_colors.iter().enumerate() {
            let axis = face % 3;
            let sign = if face < 3 { -0.5 } else { 0.5 };
            let u = Vector3::ith((axis + 1) % 3, 1.0);
            let v = Vector3::ith((axis + 2) % 3, 1.0);
            let center = Vector3::ith(axis, sign);
            let base = vertices.len();
            for (a, b) in [(-0.5, -0.5), (0.5, -0.5), (-0.5, 0.5), (0.5, 0.5)] {
                vertices.push(to_hom_point(center + u * a + v * b));
                colors.push(*color);
            }
            triangles.push(vector![base, base + 1, base + 2]);
            triangles.push(vector![base + 1, base + 2, base + 3]);
        }
        let mut cube = r.create_object();
        r.set_vertex_attribs(&mut cube, 0, &vertices);
        r.set_vertex_attribs(&mut cube, 1, &colors);
        r.set_triangle_indices(&mut cube, &triangles);
        r.enable_depth_test();

        let projection = Perspective3::new(aspect, 45f32.to_radians(), 0.1, 100.0).to_homogeneous();
        let view = Matrix4::new_translation(&vector![0.0, 0.0, -3.0]);
        return Self {
            program,
            cube,
            projection_view: projection * view,
            time: 0.0,
        };
    }
}

impl Demo for CubeDemo {
    fn frame(&mut self, r: &mut Rasterizer, dt: f32) -> tiny_rasterizer::Result<()> {
        self.time += dt;
        let model = Matrix4::from_axis_angle(&Vector3::y_axis(), self.time)
            * Matrix4::from_axis_angle(&Vector3::x_axis(), 0.5 * self.time + PI / 6.0);
        r.set_uniform(&mut self.program, "transform", self.projection_view * model);
        r.clear(vector![0.2, 0.2, 0.2, 1.0]);
        return r.draw_object(&self.program, &self.cube);
    }
}

/// Actually launches the window and runs the chosen demo until quit is requested.
pub fn run(params: Params) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height, default_samples) = match params.demo_name.as_str() {
        "clock" => (params.height, params.height, 16),
        _ => (params.width, params.height, 1),
    };
    let config = RasterizerConfig {
        title: params.demo_name.clone(),
        width,
        height,
        samples_per_pixel: params.samples_per_pixel.unwrap_or(default_samples),
        supersampling: params.supersampling,
        depth_test: false,
    };
    let mut r = Rasterizer::with_config(config)?;

    let aspect = width as f32 / height as f32;
    let mut demo: Box<dyn Demo> = match params.demo_name.as_str() {
        "triangle" => Box::new(TriangleDemo::new(&mut r)),
        "clock" => Box::new(ClockDemo::new(&mut r)),
        "quad" => Box::new(QuadDemo::new(&mut r, aspect)),
        "cube" => Box::new(CubeDemo::new(&mut r, aspect)),
        other => return Err(format!("demo {} is not supported, try triangle, clock, quad or cube", other).into()),
    };

    let mut last_frame = time::Instant::now();
    let mut frame_counter_time_begin = time::Instant::now();
    let mut frame_counter: u32 = 0;
    while !r.should_quit() {
        let now = time::Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        demo.frame(&mut r, dt)?;
        r.show()?;

        if params.print_fps {
            // Counting frames to printout stats every second.
            frame_counter += 1;
            if frame_counter_time_begin.elapsed().as_secs_f32() > 1.0 {
                log::info!("FPS --- {}", frame_counter);
                frame_counter_time_begin = time::Instant::now();
                frame_counter = 0;
            }
        }
    }

    if let Some(path) = params.output {
        r.save_frame(path)?;
    }

    return Ok(());
}
