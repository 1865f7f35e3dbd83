use std::f32::consts::TAU;
use std::ops::Range;

use cgmath::{vec3, InnerSpace, Vector3};

use crate::mesh::{MeshParts, PrimitiveShape};

/// position (3) + normal (3) + uv (2)
pub const FLOATS_PER_VERTEX: usize = 8;

const SLICES: u32 = 36;
const STACKS: u32 = 18;
const TAPERED_TOP_RADIUS: f32 = 0.5;
const TORUS_MINOR_RADIUS: f32 = 0.2;

/// Generated geometry for one primitive shape. Capped shapes keep their
/// sides and caps in separate index ranges so they can be drawn partially.
#[derive(Debug, Clone)]
pub struct ShapeMesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub sides: Range<u32>,
    pub top: Option<Range<u32>>,
    pub bottom: Option<Range<u32>>,
}

impl ShapeMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    /// Index ranges to draw for `parts`. Shapes without caps always draw
    /// everything.
    pub fn ranges(&self, parts: MeshParts) -> Vec<Range<u32>> {
        if self.top.is_none() && self.bottom.is_none() {
            return vec![0..self.indices.len() as u32];
        }

        let mut ranges = Vec::with_capacity(3);
        if parts.bottom {
            ranges.extend(self.bottom.clone());
        }
        if parts.sides {
            ranges.push(self.sides.clone());
        }
        if parts.top {
            ranges.extend(self.top.clone());
        }
        ranges
    }

    fn whole(builder: Builder) -> Self {
        let count = builder.indices.len() as u32;
        Self {
            vertices: builder.vertices,
            indices: builder.indices,
            sides: 0..count,
            top: None,
            bottom: None,
        }
    }
}

pub fn generate(shape: PrimitiveShape) -> ShapeMesh {
    match shape {
        PrimitiveShape::Box => ShapeMesh::whole(cuboid()),
        PrimitiveShape::Plane => ShapeMesh::whole(plane()),
        PrimitiveShape::Prism => ShapeMesh::whole(prism()),
        PrimitiveShape::Pyramid3 => ShapeMesh::whole(pyramid(3)),
        PrimitiveShape::Pyramid4 => ShapeMesh::whole(pyramid(4)),
        PrimitiveShape::Sphere => ShapeMesh::whole(sphere()),
        PrimitiveShape::Torus => ShapeMesh::whole(torus()),
        PrimitiveShape::Cylinder => capped(1.0),
        PrimitiveShape::TaperedCylinder => capped(TAPERED_TOP_RADIUS),
        PrimitiveShape::Cone => capped(0.0),
    }
}

#[derive(Default)]
struct Builder {
    vertices: Vec<f32>,
    indices: Vec<u32>,
}

impl Builder {
    fn vertex(&mut self, position: Vector3<f32>, normal: Vector3<f32>, uv: [f32; 2]) -> u32 {
        let index = (self.vertices.len() / FLOATS_PER_VERTEX) as u32;
        self.vertices.extend_from_slice(&[
            position.x, position.y, position.z, normal.x, normal.y, normal.z, uv[0], uv[1],
        ]);
        index
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// A flat-shaded triangle, counter-clockwise when seen from outside.
    fn face3(&mut self, p: [Vector3<f32>; 3], uv: [[f32; 2]; 3]) {
        let normal = (p[1] - p[0]).cross(p[2] - p[0]).normalize();
        let a = self.vertex(p[0], normal, uv[0]);
        let b = self.vertex(p[1], normal, uv[1]);
        let c = self.vertex(p[2], normal, uv[2]);
        self.triangle(a, b, c);
    }

    /// A flat-shaded quad, corners counter-clockwise when seen from outside.
    fn face4(&mut self, p: [Vector3<f32>; 4]) {
        let normal = (p[1] - p[0]).cross(p[2] - p[0]).normalize();
        let a = self.vertex(p[0], normal, [0.0, 0.0]);
        let b = self.vertex(p[1], normal, [1.0, 0.0]);
        let c = self.vertex(p[2], normal, [1.0, 1.0]);
        let d = self.vertex(p[3], normal, [0.0, 1.0]);
        self.triangle(a, b, c);
        self.triangle(a, c, d);
    }

    fn len(&self) -> u32 {
        self.indices.len() as u32
    }
}

fn cuboid() -> Builder {
    let h = 0.5;
    let mut b = Builder::default();
    // front, back, left, right, bottom, top
    b.face4([vec3(-h, -h, h), vec3(h, -h, h), vec3(h, h, h), vec3(-h, h, h)]);
    b.face4([vec3(h, -h, -h), vec3(-h, -h, -h), vec3(-h, h, -h), vec3(h, h, -h)]);
    b.face4([vec3(-h, -h, -h), vec3(-h, -h, h), vec3(-h, h, h), vec3(-h, h, -h)]);
    b.face4([vec3(h, -h, h), vec3(h, -h, -h), vec3(h, h, -h), vec3(h, h, h)]);
    b.face4([vec3(-h, -h, -h), vec3(h, -h, -h), vec3(h, -h, h), vec3(-h, -h, h)]);
    b.face4([vec3(-h, h, h), vec3(h, h, h), vec3(h, h, -h), vec3(-h, h, -h)]);
    b
}

fn plane() -> Builder {
    let mut b = Builder::default();
    b.face4([
        vec3(-1.0, 0.0, 1.0),
        vec3(1.0, 0.0, 1.0),
        vec3(1.0, 0.0, -1.0),
        vec3(-1.0, 0.0, -1.0),
    ]);
    b
}

fn prism() -> Builder {
    let h = 0.5;
    let (left, right, apex) = (vec3(-h, -h, 0.0), vec3(h, -h, 0.0), vec3(0.0, h, 0.0));
    let front = vec3(0.0, 0.0, h);
    let back = vec3(0.0, 0.0, -h);

    let mut b = Builder::default();
    let uv = [[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]];
    b.face3([left + front, right + front, apex + front], uv);
    b.face3([right + back, left + back, apex + back], uv);
    b.face4([left + back, right + back, right + front, left + front]);
    b.face4([right + front, right + back, apex + back, apex + front]);
    b.face4([apex + front, apex + back, left + back, left + front]);
    b
}

fn pyramid(sides: u32) -> Builder {
    let h = 0.5;
    let apex = vec3(0.0, h, 0.0);
    let base: Vec<Vector3<f32>> = match sides {
        3 => vec![vec3(-h, -h, h), vec3(h, -h, h), vec3(0.0, -h, -h)],
        _ => vec![vec3(-h, -h, h), vec3(h, -h, h), vec3(h, -h, -h), vec3(-h, -h, -h)],
    };

    let mut b = Builder::default();
    for i in 0..base.len() {
        let next = base[(i + 1) % base.len()];
        b.face3([base[i], next, apex], [[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]]);
    }
    // Base, wound to face down.
    if base.len() == 3 {
        b.face3([base[0], base[2], base[1]], [[0.0, 0.0], [0.5, 1.0], [1.0, 0.0]]);
    } else {
        b.face4([base[0], base[3], base[2], base[1]]);
    }
    b
}

fn sphere() -> Builder {
    let mut b = Builder::default();
    for stack in 0..=STACKS {
        let v = stack as f32 / STACKS as f32;
        let phi = v * std::f32::consts::PI;
        for slice in 0..=SLICES {
            let u = slice as f32 / SLICES as f32;
            let theta = u * TAU;
            let normal = vec3(phi.sin() * theta.cos(), -phi.cos(), phi.sin() * theta.sin());
            b.vertex(normal, normal, [u, v]);
        }
    }
    grid_indices(&mut b, STACKS, SLICES);
    b
}

fn torus() -> Builder {
    let mut b = Builder::default();
    for ring in 0..=SLICES {
        let u = ring as f32 / SLICES as f32;
        let theta = u * TAU;
        let center = vec3(theta.cos(), 0.0, theta.sin());
        for side in 0..=STACKS {
            let v = side as f32 / STACKS as f32;
            let phi = v * TAU;
            let normal = center * phi.cos() + vec3(0.0, phi.sin(), 0.0);
            b.vertex(center + normal * TORUS_MINOR_RADIUS, normal, [u, v]);
        }
    }
    grid_indices(&mut b, SLICES, STACKS);
    b
}

/// Indices for a `(rows + 1) x (columns + 1)` vertex grid.
fn grid_indices(b: &mut Builder, rows: u32, columns: u32) {
    let stride = columns + 1;
    for row in 0..rows {
        for column in 0..columns {
            let a = row * stride + column;
            let c = a + stride;
            b.triangle(a, c, a + 1);
            b.triangle(a + 1, c, c + 1);
        }
    }
}

/// Cylinder family: base radius 1 at y = 0, `top_radius` at y = 1. A zero
/// top radius makes a cone, which has no top cap.
fn capped(top_radius: f32) -> ShapeMesh {
    let mut b = Builder::default();

    let bottom_start = b.len();
    cap(&mut b, 0.0, 1.0, -1.0);
    let bottom = bottom_start..b.len();

    let sides_start = b.len();
    let first = (b.vertices.len() / FLOATS_PER_VERTEX) as u32;
    let slope = 1.0 - top_radius;
    for slice in 0..=SLICES {
        let u = slice as f32 / SLICES as f32;
        let (sin, cos) = (u * TAU).sin_cos();
        let normal = vec3(cos, slope, sin).normalize();
        b.vertex(vec3(cos, 0.0, sin), normal, [u, 0.0]);
        b.vertex(vec3(cos * top_radius, 1.0, sin * top_radius), normal, [u, 1.0]);
    }
    for slice in 0..SLICES {
        let lower = first + slice * 2;
        b.triangle(lower, lower + 1, lower + 3);
        b.triangle(lower, lower + 3, lower + 2);
    }
    let sides = sides_start..b.len();

    let top = if top_radius > 0.0 {
        let start = b.len();
        cap(&mut b, 1.0, top_radius, 1.0);
        Some(start..b.len())
    } else {
        None
    };

    ShapeMesh {
        vertices: b.vertices,
        indices: b.indices,
        sides,
        top,
        bottom: Some(bottom),
    }
}

/// A disc at height `y`, facing `facing` along Y.
fn cap(b: &mut Builder, y: f32, radius: f32, facing: f32) {
    let normal = vec3(0.0, facing, 0.0);
    let center = b.vertex(vec3(0.0, y, 0.0), normal, [0.5, 0.5]);
    for slice in 0..=SLICES {
        let (sin, cos) = (slice as f32 / SLICES as f32 * TAU).sin_cos();
        b.vertex(
            vec3(cos * radius, y, sin * radius),
            normal,
            [0.5 + cos * 0.5, 0.5 + sin * 0.5],
        );
    }
    for slice in 0..SLICES {
        let (a, c) = (center + 1 + slice, center + 2 + slice);
        if facing > 0.0 {
            b.triangle(center, c, a);
        } else {
            b.triangle(center, a, c);
        }
    }
}
