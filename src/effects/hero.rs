//! Point-cloud hero scene: a rotating torus knot, a handful of orbiting
//! spheres and a slowly turning star field, viewed by a camera that trails
//! the pointer.
//!
//! Everything here is plain geometry. `wasm::render` uploads the projected
//! vertices and draws them as `gl.POINTS`.

use std::f64::consts::TAU;
use std::ops::{Add, Mul, Sub};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::loader::{Rgb, TEAL};
use crate::motion::{Trail, Vec2};

pub const KNOT_SPIN: (f64, f64) = (0.18, 0.24);
pub const FIELD_SPIN: f64 = 0.03;
pub const FIELD_POINTS: usize = 400;
pub const CAMERA_DISTANCE: f64 = 6.0;
pub const FOV_DEGREES: f64 = 55.0;

const KNOT_P: f64 = 2.0;
const KNOT_Q: f64 = 3.0;
const KNOT_RADIUS: f64 = 1.4;
const KNOT_TUBE: f64 = 0.42;
const KNOT_SEGMENTS: usize = 180;
const KNOT_RING: usize = 10;
const FIELD_EXTENT: f64 = 22.0;
/// How far the camera swings for a pointer at the viewport edge.
const PARALLAX_RANGE: Vec2 = Vec2::new(0.4, 0.25);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, o: Vec3) -> f64 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn cross(self, o: Vec3) -> Vec3 {
        Vec3::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 {
            self * (1.0 / len)
        } else {
            self
        }
    }

    pub fn rotate_x(self, a: f64) -> Vec3 {
        let (s, c) = a.sin_cos();
        Vec3::new(self.x, self.y * c - self.z * s, self.y * s + self.z * c)
    }

    pub fn rotate_y(self, a: f64) -> Vec3 {
        let (s, c) = a.sin_cos();
        Vec3::new(self.x * c + self.z * s, self.y, -self.x * s + self.z * c)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, k: f64) -> Vec3 {
        Vec3::new(self.x * k, self.y * k, self.z * k)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub radius: f64,
    pub speed: f64,
    pub offset: f64,
    pub color: Rgb,
    pub size: f64,
}

pub const ORBITS: [Orbit; 4] = [
    Orbit { radius: 3.2, speed: 0.5, offset: 0.0, color: Rgb(255, 77, 166), size: 0.22 },
    Orbit { radius: 2.6, speed: 0.8, offset: 2.1, color: Rgb(168, 85, 247), size: 0.16 },
    Orbit { radius: 3.8, speed: 0.35, offset: 4.2, color: Rgb(0, 255, 200), size: 0.14 },
    Orbit { radius: 2.0, speed: 1.1, offset: 1.5, color: Rgb(6, 182, 212), size: 0.12 },
];

impl Orbit {
    pub fn position(&self, seconds: f64) -> Vec3 {
        let t = seconds * self.speed + self.offset;
        Vec3::new(t.cos() * self.radius, (t * 0.7).sin() * 0.6, t.sin() * self.radius)
    }
}

/// A point in camera space: `z` is negative in front of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    /// World-space diameter.
    pub size: f64,
    pub color: Rgb,
    pub alpha: f64,
}

fn knot_curve(u: f64) -> Vec3 {
    let qu = KNOT_Q / KNOT_P * u;
    let r = (2.0 + qu.cos()) * 0.5 * KNOT_RADIUS;
    Vec3::new(r * u.cos(), r * u.sin(), KNOT_RADIUS * qu.sin() * 0.5)
}

/// Rest pose of the knot, sampled as rings around the tube.
pub fn knot_points() -> Vec<Vec3> {
    let mut points = Vec::with_capacity(KNOT_SEGMENTS * KNOT_RING);
    for i in 0..KNOT_SEGMENTS {
        let u = i as f64 / KNOT_SEGMENTS as f64 * KNOT_P * TAU;
        let p1 = knot_curve(u);
        let p2 = knot_curve(u + 0.01);
        let tangent = p2 - p1;
        let binormal = tangent.cross(p2 + p1).normalized();
        let normal = binormal.cross(tangent).normalized();
        for j in 0..KNOT_RING {
            let v = j as f64 / KNOT_RING as f64 * TAU;
            let cx = -KNOT_TUBE * v.cos();
            let cy = KNOT_TUBE * v.sin();
            points.push(p1 + normal * cx + binormal * cy);
        }
    }
    points
}

/// A look-at camera orbiting the origin at a fixed distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
}

impl Camera {
    pub fn new(eye: Vec3) -> Self {
        Self { eye }
    }

    /// World to camera space, looking at the origin with +y up.
    pub fn view(&self, p: Vec3) -> Vec3 {
        let forward = (Vec3::default() - self.eye).normalized();
        let right = forward.cross(Vec3::new(0.0, 1.0, 0.0)).normalized();
        let up = right.cross(forward);
        let d = p - self.eye;
        Vec3::new(d.dot(right), d.dot(up), -d.dot(forward))
    }
}

pub struct HeroScene {
    knot: Vec<Vec3>,
    field: Vec<Vec3>,
    parallax: Trail,
}

impl HeroScene {
    pub fn new(seed: u64, parallax_factor: f64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let field = (0..FIELD_POINTS)
            .map(|_| {
                Vec3::new(
                    (rng.gen::<f64>() - 0.5) * FIELD_EXTENT,
                    (rng.gen::<f64>() - 0.5) * FIELD_EXTENT,
                    (rng.gen::<f64>() - 0.5) * FIELD_EXTENT,
                )
            })
            .collect();
        Self {
            knot: knot_points(),
            field,
            parallax: Trail::new(Vec2::ZERO, parallax_factor),
        }
    }

    pub fn len(&self) -> usize {
        self.knot.len() + ORBITS.len() + self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Camera after easing one step toward the pointer. `pointer` is in
    /// normalised device coordinates, +y up.
    pub fn camera(&mut self, pointer: Vec2) -> Camera {
        let target = Vec2::new(pointer.x * PARALLAX_RANGE.x, pointer.y * PARALLAX_RANGE.y);
        let at = self.parallax.step(target);
        Camera::new(Vec3::new(at.x, at.y, CAMERA_DISTANCE))
    }

    pub fn frame(&mut self, seconds: f64, pointer: Vec2) -> Vec<Vertex> {
        let camera = self.camera(pointer);
        let (ax, ay) = (seconds * KNOT_SPIN.0, seconds * KNOT_SPIN.1);
        let field_angle = seconds * FIELD_SPIN;

        let mut out = Vec::with_capacity(self.len());
        out.extend(self.field.iter().map(|p| Vertex {
            position: camera.view(p.rotate_y(field_angle)),
            size: 0.06,
            color: TEAL,
            alpha: 0.5,
        }));
        out.extend(self.knot.iter().map(|p| Vertex {
            position: camera.view(p.rotate_x(ax).rotate_y(ay)),
            size: 0.07,
            color: TEAL,
            alpha: 0.85,
        }));
        out.extend(ORBITS.iter().map(|o| Vertex {
            position: camera.view(o.position(seconds)),
            size: o.size * 2.0,
            color: o.color,
            alpha: 1.0,
        }));
        out
    }
}

/// Projected point, ready for the vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
    pub size_px: f32,
}

/// Perspective projection where `fov` spans the shorter side of the viewport,
/// so the scene keeps its apparent size on wide and tall screens alike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    width: f64,
    height: f64,
    focal: f64,
    near: f64,
    far: f64,
}

impl Projection {
    pub fn new(width: f64, height: f64, fov_degrees: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            focal: 1.0 / (fov_degrees.to_radians() / 2.0).tan(),
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    fn short_side(&self) -> f64 {
        self.width.min(self.height)
    }

    /// `None` for points behind the near plane or past the far plane.
    pub fn project(&self, view: Vec3, size: f64) -> Option<ClipPoint> {
        let dist = -view.z;
        if dist < self.near || dist > self.far {
            return None;
        }
        let m = self.short_side();
        let x = self.focal * view.x / dist * m / self.width;
        let y = self.focal * view.y / dist * m / self.height;
        let depth = (dist - self.near) / (self.far - self.near) * 2.0 - 1.0;
        let size_px = size * self.focal / dist * m / 2.0;
        Some(ClipPoint {
            x: x as f32,
            y: y as f32,
            depth: depth as f32,
            size_px: size_px as f32,
        })
    }

    /// Pixel offset of a clip-space point from the viewport centre.
    pub fn to_pixels(&self, p: &ClipPoint) -> (f64, f64) {
        (p.x as f64 * self.width / 2.0, p.y as f64 * self.height / 2.0)
    }
}

/// Interleaved `x y z size r g b a` floats for one draw call.
pub fn pack_vertices(
    vertices: &[Vertex],
    projection: &Projection,
    pixel_ratio: f64,
    out: &mut Vec<f32>,
) -> usize {
    out.clear();
    let mut count = 0;
    for v in vertices {
        let Some(p) = projection.project(v.position, v.size) else {
            continue;
        };
        out.extend_from_slice(&[
            p.x,
            p.y,
            p.depth,
            (p.size_px as f64 * pixel_ratio).max(1.0) as f32,
            v.color.0 as f32 / 255.0,
            v.color.1 as f32 / 255.0,
            v.color.2 as f32 / 255.0,
            v.alpha as f32,
        ]);
        count += 1;
    }
    count
}

pub const FLOATS_PER_VERTEX: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn orbit_positions_follow_the_table() {
        let o = ORBITS[0];
        assert!(close(o.position(0.0), Vec3::new(3.2, 0.0, 0.0)));
        let quarter = std::f64::consts::FRAC_PI_2 / o.speed;
        let p = o.position(quarter);
        assert!(p.x.abs() < 1e-9);
        assert!((p.z - 3.2).abs() < 1e-9);
    }

    #[test]
    fn knot_is_sampled_around_the_tube() {
        let points = knot_points();
        assert_eq!(points.len(), KNOT_SEGMENTS * KNOT_RING);
        let reach = points.iter().map(|p| p.length()).fold(0.0, f64::max);
        assert!(reach < KNOT_RADIUS * 1.5 + KNOT_TUBE + 1e-6);
        assert!(reach > KNOT_RADIUS);
    }

    #[test]
    fn camera_at_rest_looks_down_negative_z() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, CAMERA_DISTANCE));
        assert!(close(cam.view(Vec3::default()), Vec3::new(0.0, 0.0, -CAMERA_DISTANCE)));
        assert!(close(cam.view(Vec3::new(1.0, 2.0, 0.0)), Vec3::new(1.0, 2.0, -CAMERA_DISTANCE)));
    }

    #[test]
    fn parallax_trails_the_pointer() {
        let mut scene = HeroScene::new(1, 0.04);
        let first = scene.camera(Vec2::new(1.0, 1.0));
        assert!((first.eye.x - 0.4 * 0.04).abs() < 1e-12);
        let mut last = first;
        for _ in 0..400 {
            last = scene.camera(Vec2::new(1.0, 1.0));
        }
        assert!((last.eye.x - 0.4).abs() < 1e-3);
        assert!((last.eye.y - 0.25).abs() < 1e-3);
    }

    #[test]
    fn frame_emits_every_point_and_spins() {
        let mut scene = HeroScene::new(7, 0.04);
        let a = scene.frame(0.0, Vec2::ZERO);
        let b = scene.frame(2.0, Vec2::ZERO);
        assert_eq!(a.len(), scene.len());
        assert_eq!(a.len(), FIELD_POINTS + KNOT_SEGMENTS * KNOT_RING + ORBITS.len());
        assert_ne!(a[FIELD_POINTS].position, b[FIELD_POINTS].position);
        assert!(a.iter().all(|v| v.position.z < 0.0 || v.alpha == 0.5));
    }

    #[test]
    fn same_seed_same_field() {
        let mut a = HeroScene::new(3, 0.04);
        let mut b = HeroScene::new(3, 0.04);
        assert_eq!(a.frame(1.0, Vec2::ZERO), b.frame(1.0, Vec2::ZERO));
    }

    #[test]
    fn points_behind_the_camera_are_culled() {
        let proj = Projection::new(800.0, 600.0, FOV_DEGREES);
        assert!(proj.project(Vec3::new(0.0, 0.0, 1.0), 0.1).is_none());
        assert!(proj.project(Vec3::new(0.0, 0.0, -6.0), 0.1).is_some());
    }

    #[test]
    fn packing_skips_culled_points() {
        let proj = Projection::new(800.0, 600.0, FOV_DEGREES);
        let vertices = [
            Vertex { position: Vec3::new(0.0, 0.0, -6.0), size: 0.1, color: TEAL, alpha: 1.0 },
            Vertex { position: Vec3::new(0.0, 0.0, 2.0), size: 0.1, color: TEAL, alpha: 1.0 },
        ];
        let mut buf = Vec::new();
        assert_eq!(pack_vertices(&vertices, &proj, 2.0, &mut buf), 1);
        assert_eq!(buf.len(), FLOATS_PER_VERTEX);
        assert_eq!(buf[5], 1.0);
    }
}
