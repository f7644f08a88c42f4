//! Triangle rasterization.
//!
//! Triangles arrive as three clip space positions with a color per vertex. They are mapped to
//! the framebuffer, walked over their clamped bounding box and every covered sample gets the
//! interpolated vertex color, optionally depth tested and perspective corrected.

use nalgebra as na;
use na::{vector, Vector2, Vector3, Vector4};

use crate::framebuffer::Framebuffer;
use crate::util::{from_hom_point, from_hom_vector};

/// Output of the shader stages for one triangle corner.
#[derive(Debug, Clone, Copy)]
pub struct ShadedVertex {
    pub position: Vector4<f32>, // Clip space.
    pub color: Vector4<f32>,
}

/// Upper bound on sub-samples per pixel along each axis.
pub const MAX_SAMPLES_PER_AXIS: u32 = 16;

/// Per draw settings.
#[derive(Debug, Clone, Copy)]
pub struct RasterState {
    /// Depth test, perspective division and perspective-correct interpolation go together.
    pub depth_test: bool,
    /// Sub-samples per pixel along each axis.
    pub samples_per_axis: u32,
}

/// Vertex mapped to the framebuffer, x and y in pixels.
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    xy: Vector2<f32>,
    z: f32,
    inv_w: f32, // 1 / clip w, or 1 without perspective.
}

/// Bounding box in pixels, inclusive on both ends.
#[derive(Debug, PartialEq)]
struct BoundingBox {
    ll: Vector2<u32>, // lower left corner
    ur: Vector2<u32>, // upper right corner
}

impl BoundingBox {
    /// Bounding box of the three points clamped to a width x height frame.
    /// None if nothing of it is on the frame.
    fn clamped(points: [Vector2<f32>; 3], width: u32, height: u32) -> Option<BoundingBox> {
        let min_x = points[0].x.min(points[1].x).min(points[2].x).floor();
        let min_y = points[0].y.min(points[1].y).min(points[2].y).floor();
        let max_x = points[0].x.max(points[1].x).max(points[2].x).floor();
        let max_y = points[0].y.max(points[1].y).max(points[2].y).floor();
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return None;
        }
        if max_x < 0.0 || max_y < 0.0 || min_x >= width as f32 || min_y >= height as f32 {
            return None;
        }
        return Some(BoundingBox {
            ll: vector![min_x.max(0.0) as u32, min_y.max(0.0) as u32],
            ur: vector![
                (max_x as u32).min(width - 1),
                (max_y as u32).min(height - 1)
            ],
        });
    }
}

/// z of the 2D cross product (b - a) x (p - a). Positive when p is to the left of a -> b.
fn edge(a: Vector2<f32>, b: Vector2<f32>, p: Vector2<f32>) -> f32 {
    return (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
}

/// Maps a clip space position to the framebuffer.
fn to_screen(position: Vector4<f32>, width: u32, height: u32, depth_test: bool) -> ScreenVertex {
    let (ndc, inv_w) = if depth_test {
        (from_hom_point(position), 1.0 / position.w)
    } else {
        (from_hom_vector(position), 1.0)
    };
    let half = vector![width as f32 / 2.0, height as f32 / 2.0];
    return ScreenVertex {
        xy: ndc.xy().component_mul(&half) + half,
        z: ndc.z,
        inv_w,
    };
}

/// Depth and color of a covered sample.
struct Fragment {
    depth: f32,
    color: Vector4<f32>,
}

/// A triangle set up for sampling.
struct Triangle {
    vertices: [ScreenVertex; 3],
    colors: [Vector4<f32>; 3],
    area: f32, // Signed, its sign is the reference for inside tests.
    perspective: bool,
}

impl Triangle {
    /// Fragment at `p`, None if `p` is not strictly inside.
    fn sample(&self, p: Vector2<f32>) -> Option<Fragment> {
        let [a, b, c] = self.vertices;
        let e_ab = edge(a.xy, b.xy, p);
        let e_bc = edge(b.xy, c.xy, p);
        let e_ca = edge(c.xy, a.xy, p);
        if e_ab * self.area <= 0.0 || e_bc * self.area <= 0.0 || e_ca * self.area <= 0.0 {
            return None;
        }

        // Weight of a vertex is the area of the sub-triangle opposite to it.
        let bar_coord = Vector3::new(e_bc, e_ca, e_ab) / self.area;
        let depth = bar_coord.dot(&vector![a.z, b.z, c.z]);
        let weights = if self.perspective {
            let corrected = bar_coord.component_mul(&vector![a.inv_w, b.inv_w, c.inv_w]);
            corrected / corrected.sum()
        } else {
            bar_coord
        };
        let color = self.colors[0] * weights.x + self.colors[1] * weights.y + self.colors[2] * weights.z;
        return Some(Fragment { depth, color });
    }
}

/// Draws one triangle into `frame`. Returns false if it was skipped as degenerate or off the frame.
///
/// Each pixel of the bounding box averages `samples_per_axis`^2 evenly spaced samples. Samples
/// outside the triangle, or failing the depth test, contribute the color already in the pixel,
/// so edges blend with whatever was drawn before. A pixel is written only if at least one sample
/// was accepted. Every sample is depth tested against its own slot of the depth buffer, so the
/// frame should keep `samples_per_axis`^2 depth samples; with fewer, slots are shared.
pub fn draw_triangle(frame: &mut Framebuffer, vertices: [ShadedVertex; 3], state: RasterState) -> bool {
    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return false;
    }
    let screen = vertices.map(|v| to_screen(v.position, width, height, state.depth_test));
    let area = edge(screen[0].xy, screen[1].xy, screen[2].xy);
    if area == 0.0 || !area.is_finite() {
        return false;
    }
    let bbox = match BoundingBox::clamped(screen.map(|v| v.xy), width, height) {
        Some(bbox) => bbox,
        None => return false,
    };
    let triangle = Triangle {
        vertices: screen,
        colors: vertices.map(|v| v.color),
        area,
        perspective: state.depth_test,
    };

    let samples = state.samples_per_axis.clamp(1, MAX_SAMPLES_PER_AXIS);
    let step = 1.0 / (samples + 1) as f32;
    let n_samples = (samples * samples) as f32;
    let depth_slots = frame.depth_samples();
    for y in bbox.ll.y..=bbox.ur.y {
        for x in bbox.ll.x..=bbox.ur.x {
            let existing = frame.color(x, y);
            let mut accepted = false;
            let mut pixel_color = Vector4::zeros();
            for s_j in 0..samples {
                for s_i in 0..samples {
                    let slot = (s_j * samples + s_i) % depth_slots;
                    let p = vector![
                        x as f32 + (s_i + 1) as f32 * step,
                        y as f32 + (s_j + 1) as f32 * step
                    ];
                    let fragment = match triangle.sample(p) {
                        Some(fragment) => fragment,
                        None => {
                            pixel_color += existing;
                            continue;
                        }
                    };
                    if state.depth_test {
                        if !(fragment.depth < frame.sample_depth(x, y, slot)) {
                            pixel_color += existing;
                            continue;
                        }
                        frame.set_sample_depth(x, y, slot, fragment.depth);
                    }
                    accepted = true;
                    pixel_color += fragment.color;
                }
            }
            if accepted {
                frame.set_pixel(x, y, pixel_color / n_samples);
            }
        }
    }
    return true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat(positions: [Vector4<f32>; 3], color: Vector4<f32>) -> [ShadedVertex; 3] {
        positions.map(|position| ShadedVertex { position, color })
    }

    const FLAT: RasterState = RasterState {
        depth_test: false,
        samples_per_axis: 1,
    };

    #[test]
    fn bounding_box_is_clamped() {
        let bbox = BoundingBox::clamped([vector![-3.0, 1.5], vector![2.2, -1.0], vector![12.0, 3.9]], 8, 4);
        assert_eq!(
            bbox,
            Some(BoundingBox {
                ll: vector![0, 0],
                ur: vector![7, 3]
            })
        );
        assert_eq!(
            BoundingBox::clamped([vector![9.0, 1.0], vector![10.0, 2.0], vector![12.0, 3.0]], 8, 4),
            None
        );
    }

    #[test]
    fn screen_mapping() {
        let v = to_screen(vector![-1.0, 1.0, 0.5, 1.0], 8, 4, false);
        assert_relative_eq!(v.xy, vector![0.0, 4.0]);
        let v = to_screen(vector![1.0, 0.0, 1.0, 2.0], 8, 4, true);
        assert_relative_eq!(v.xy, vector![6.0, 2.0]);
        assert_relative_eq!(v.z, 0.5);
        assert_relative_eq!(v.inv_w, 0.5);
    }

    #[test]
    fn winding_does_not_matter() {
        let ccw = [vector![-1.0, -1.0, 0.0, 1.0], vector![1.0, -1.0, 0.0, 1.0], vector![-1.0, 1.0, 0.0, 1.0]];
        let cw = [ccw[0], ccw[2], ccw[1]];
        let mut frame_ccw = Framebuffer::new(4, 4);
        let mut frame_cw = Framebuffer::new(4, 4);
        assert!(draw_triangle(&mut frame_ccw, flat(ccw, vector![1.0, 0.0, 0.0, 1.0]), FLAT));
        assert!(draw_triangle(&mut frame_cw, flat(cw, vector![1.0, 0.0, 0.0, 1.0]), FLAT));
        assert_eq!(frame_ccw.as_render_data(), frame_cw.as_render_data());
        assert_eq!(frame_ccw.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(frame_ccw.pixel(3, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn shared_edge_has_no_gaps_or_overlaps() {
        // Two halves of the whole frame. The diagonal of a 4x3 frame misses every pixel centre.
        let a = vector![-1.0, -1.0, 0.0, 1.0];
        let b = vector![1.0, -1.0, 0.0, 1.0];
        let c = vector![1.0, 1.0, 0.0, 1.0];
        let d = vector![-1.0, 1.0, 0.0, 1.0];
        let half = vector![0.5, 0.5, 0.5, 0.5];
        let mut frame = Framebuffer::new(4, 3);
        frame.clear(Vector4::zeros());
        draw_triangle(&mut frame, flat([a, b, c], half), FLAT);
        draw_triangle(&mut frame, flat([a, c, d], half), FLAT);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(frame.pixel(x, y), [128, 128, 128, 128]);
            }
        }
    }

    #[test]
    fn coplanar_halves_do_not_depth_test_each_other() {
        // The diagonal of a 6x4 frame passes between all 2x2 sub-samples.
        let a = vector![-1.0, -1.0, 0.5, 1.0];
        let b = vector![1.0, -1.0, 0.5, 1.0];
        let c = vector![1.0, 1.0, 0.5, 1.0];
        let d = vector![-1.0, 1.0, 0.5, 1.0];
        let white = Vector4::repeat(1.0);
        let mut frames = [false, true].map(|depth_test| {
            let state = RasterState {
                depth_test,
                samples_per_axis: 2,
            };
            let mut frame = Framebuffer::with_depth_samples(6, 4, 4);
            frame.clear(vector![0.0, 0.0, 0.0, 1.0]);
            draw_triangle(&mut frame, flat([a, b, c], white), state);
            draw_triangle(&mut frame, flat([a, c, d], white), state);
            frame
        });
        assert_eq!(frames[0].as_render_data(), frames[1].as_render_data());
        // Every sample got exactly one of the halves.
        let depth_tested = &mut frames[1];
        for y in 0..4 {
            for x in 0..6 {
                assert!((0..4).all(|sample| (depth_tested.sample_depth(x, y, sample) - 0.5).abs() < 1e-6));
            }
        }
        // A nearer sample wins only where it lands.
        let near = RasterState {
            depth_test: true,
            samples_per_axis: 2,
        };
        draw_triangle(depth_tested, flat([a, b, c].map(|v| v - vector![0.0, 0.0, 0.25, 0.0]), white), near);
        assert_relative_eq!(depth_tested.sample_depth(5, 0, 0), 0.25, epsilon = 1e-6);
        assert_relative_eq!(depth_tested.sample_depth(0, 3, 3), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn oversized_sample_count_is_clamped() {
        let mut frame = Framebuffer::new(2, 2);
        let state = RasterState {
            depth_test: false,
            samples_per_axis: u32::MAX,
        };
        let positions = [vector![-1.0, -1.0, 0.0, 1.0], vector![3.0, -1.0, 0.0, 1.0], vector![-1.0, 3.0, 0.0, 1.0]];
        assert!(draw_triangle(&mut frame, flat(positions, Vector4::repeat(1.0)), state));
        assert_eq!(frame.pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn degenerate_triangle_is_skipped() {
        let mut frame = Framebuffer::new(4, 4);
        let p = vector![0.0, 0.0, 0.0, 1.0];
        let q = vector![0.5, 0.5, 0.0, 1.0];
        assert!(!draw_triangle(&mut frame, flat([p, q, q], Vector4::repeat(1.0)), FLAT));
    }

    #[test]
    fn zero_w_is_skipped_with_depth_test() {
        let mut frame = Framebuffer::new(4, 4);
        let state = RasterState {
            depth_test: true,
            samples_per_axis: 1,
        };
        let positions = [vector![-1.0, -1.0, 0.0, 0.0], vector![1.0, -1.0, 0.0, 1.0], vector![0.0, 1.0, 0.0, 1.0]];
        assert!(!draw_triangle(&mut frame, flat(positions, Vector4::repeat(1.0)), state));
    }

    #[test]
    fn barycentric_weights_sum_to_one() {
        let triangle = Triangle {
            vertices: [
                ScreenVertex { xy: vector![0.0, 0.0], z: 0.0, inv_w: 1.0 },
                ScreenVertex { xy: vector![4.0, 0.0], z: 1.0, inv_w: 1.0 },
                ScreenVertex { xy: vector![0.0, 4.0], z: 2.0, inv_w: 1.0 },
            ],
            colors: [
                vector![1.0, 0.0, 0.0, 1.0],
                vector![0.0, 1.0, 0.0, 1.0],
                vector![0.0, 0.0, 1.0, 1.0],
            ],
            area: 16.0,
            perspective: false,
        };
        let fragment = triangle.sample(vector![1.0, 1.0]).unwrap();
        assert_relative_eq!(fragment.color, vector![0.5, 0.25, 0.25, 1.0]);
        assert_relative_eq!(fragment.depth, 0.75);
        // On an edge is outside.
        assert!(triangle.sample(vector![2.0, 0.0]).is_none());
        assert!(triangle.sample(vector![5.0, 5.0]).is_none());
    }
}
