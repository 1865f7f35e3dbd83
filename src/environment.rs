//! The fixed furniture drawn behind the editable scene every frame: a
//! credenza against a stucco wall, with a vase and two candles on top.

use cgmath::{Vector2, Vector3, Vector4};

use crate::mesh::{MeshParts, Primitive, PrimitiveShape};
use crate::renderer::Renderer;

use crate::mesh::PrimitiveShape::{Box as Cuboid, Cylinder, Plane, TaperedCylinder};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const IVORY: [f32; 4] = [0.96, 0.96, 0.862, 1.0];
const WAX: [f32; 4] = [0.952, 0.890, 0.760, 1.0];
const GRAY: [f32; 4] = [0.6, 0.6, 0.6, 1.0];

const NO_TOP: MeshParts = MeshParts {
    top: false,
    bottom: true,
    sides: true,
};
const NO_BOTTOM: MeshParts = MeshParts {
    top: true,
    bottom: false,
    sides: true,
};

/// One row of the furniture table. Every row states all of its shading
/// inputs, so nothing carries over from the row drawn before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPart {
    pub label: &'static str,
    pub shape: PrimitiveShape,
    pub parts: MeshParts,
    pub scale: [f32; 3],
    pub rotation: [f32; 3],
    pub position: [f32; 3],
    pub material: &'static str,
    pub texture: &'static str,
    pub uv_scale: [f32; 2],
    pub color: [f32; 4],
}

const fn part(
    label: &'static str,
    shape: PrimitiveShape,
    scale: [f32; 3],
    position: [f32; 3],
    material: &'static str,
) -> FixedPart {
    FixedPart {
        label,
        shape,
        parts: MeshParts::ALL,
        scale,
        rotation: [0.0, 0.0, 0.0],
        position,
        material,
        texture: "",
        uv_scale: [1.0, 1.0],
        color: WHITE,
    }
}

impl FixedPart {
    const fn rotated(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    const fn textured(mut self, texture: &'static str, uv_scale: [f32; 2]) -> Self {
        self.texture = texture;
        self.uv_scale = uv_scale;
        self
    }

    const fn colored(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    const fn only(mut self, parts: MeshParts) -> Self {
        self.parts = parts;
        self
    }

    const fn uv(mut self, uv_scale: [f32; 2]) -> Self {
        self.uv_scale = uv_scale;
        self
    }
}

const KNOB: [f32; 3] = [0.08, 0.08, 0.08];
const FACING_OUT: [f32; 3] = [90.0, 0.0, 0.0];

pub static ENVIRONMENT: &[FixedPart] = &[
    part("backdrop", Plane, [20.0, 1.0, 7.0], [0.0, 5.0, 3.3], "wall")
        .rotated([90.0, 0.0, 0.0])
        .textured("backdrop", [6.0, 5.0])
        .colored(GRAY),
    part("floor", Plane, [10.0, 1.0, 20.0], [0.0, 0.0, 10.0], "wood")
        .rotated([0.0, 90.0, 0.0])
        .textured("floor", [5.0, 10.0]),
    part("picture frame", Plane, [3.0, 1.0, 5.0], [0.0, 7.5, 3.35], "picture frame")
        .rotated([0.0, 90.0, 90.0])
        .textured("picture frame", [1.0, 1.0]),
    // vase and its stacked base
    part("vase", TaperedCylinder, [0.6, 1.0, 0.6], [0.0, 5.301, 5.0], "glass")
        .rotated([0.0, 0.0, 180.0])
        .only(NO_BOTTOM)
        .textured("vase", [2.0, 2.0]),
    part("vase base", Cylinder, [0.5, 0.1, 0.5], [0.0, 4.0, 5.0], "metal")
        .textured("stainless", [1.0, 1.0]),
    part("vase base", Cylinder, [0.4, 0.1, 0.4], [0.0, 4.1, 5.0], "metal")
        .textured("stainless", [1.0, 1.0]),
    part("vase base", Cylinder, [0.3, 0.1, 0.3], [0.0, 4.2, 5.0], "metal")
        .textured("stainless", [1.0, 1.0]),
    // candles
    part("candle holder", Cylinder, [0.4, 0.8, 0.4], [1.5, 4.01, 5.0], "glass")
        .only(NO_TOP)
        .textured("candle holders", [2.5, 2.0])
        .colored([1.0, 1.0, 1.0, 0.5]),
    part("candle holder", Cylinder, [0.4, 0.8, 0.4], [-1.5, 4.01, 5.0], "glass")
        .only(NO_TOP)
        .textured("candle holders", [2.5, 2.0])
        .colored([1.0, 1.0, 1.0, 0.5]),
    part("candle", Cylinder, [0.2, 0.6, 0.2], [1.5, 4.0, 5.0], "glass")
        .uv([2.5, 2.0])
        .colored(WAX),
    part("candle", Cylinder, [0.2, 0.6, 0.2], [-1.5, 4.0, 5.0], "glass")
        .only(NO_BOTTOM)
        .uv([2.5, 2.0])
        .colored(WAX),
    part("wick", Cylinder, [0.005, 0.1, 0.005], [1.5, 4.55, 5.0], "metal")
        .uv([2.5, 2.0])
        .colored(BLACK),
    part("wick", Cylinder, [0.005, 0.1, 0.005], [-1.5, 4.55, 5.0], "metal")
        .uv([2.5, 2.0])
        .colored(BLACK),
    // credenza carcass
    part("credenza", Cuboid, [4.0, 4.0, 3.0], [0.0, 2.0, 5.0], "woodNoShine")
        .textured("credenza", [1.0, 1.0])
        .colored(IVORY),
    part("credenza", Cuboid, [1.0, 4.0, 2.6], [-2.5, 2.0, 4.8], "woodNoShine")
        .textured("credenza", [1.0, 1.0])
        .colored(IVORY),
    part("credenza", Cuboid, [1.0, 4.0, 2.6], [2.5, 2.0, 4.8], "woodNoShine")
        .textured("credenza", [1.0, 1.0])
        .colored(IVORY),
    // dark recesses behind the drawers and doors
    part("negative space", Cuboid, [3.6, 0.6, 3.0], [0.0, 3.5, 5.05], "woodNoShine").colored(BLACK),
    part("negative space", Cuboid, [3.6, 2.8, 3.0], [0.0, 1.65, 5.05], "woodNoShine").colored(BLACK),
    part("negative space", Cuboid, [0.7, 0.6, 2.6], [-2.5, 3.5, 4.85], "woodNoShine").colored(BLACK),
    part("negative space", Cuboid, [0.7, 0.6, 2.6], [2.5, 3.5, 4.85], "woodNoShine").colored(BLACK),
    part("negative space", Cuboid, [0.7, 2.9, 2.6], [-2.5, 1.6, 4.85], "woodNoShine").colored(BLACK),
    part("negative space", Cuboid, [0.7, 2.9, 2.6], [2.5, 1.6, 4.85], "woodNoShine").colored(BLACK),
    // drawers
    part("drawer", Cuboid, [3.52, 0.52, 3.0], [0.0, 3.51, 5.06], "wood")
        .textured("doors", [4.0, 1.0])
        .colored(IVORY),
    part("drawer", Cuboid, [0.62, 0.55, 2.6], [2.47, 3.5, 4.9], "wood")
        .textured("doors", [4.0, 1.0])
        .colored(IVORY),
    part("drawer", Cuboid, [0.62, 0.55, 2.6], [-2.47, 3.5, 4.9], "wood")
        .textured("doors", [4.0, 1.0])
        .colored(IVORY),
    // doors
    part("door", Cuboid, [1.75, 2.74, 3.0], [-0.89, 1.66, 5.06], "wood").textured("doors", [1.0, 1.0]),
    part("door", Cuboid, [1.75, 2.74, 3.0], [0.89, 1.66, 5.06], "wood").textured("doors", [1.0, 1.0]),
    part("door", Cuboid, [0.65, 2.8, 2.6], [-2.48, 1.62, 4.86], "wood").textured("doors", [1.0, 1.0]),
    part("door", Cuboid, [0.65, 2.8, 2.6], [2.48, 1.62, 4.86], "wood").textured("doors", [1.0, 1.0]),
    // knobs
    part("knob", Cylinder, KNOB, [2.25, 1.62, 6.15], "metal").rotated(FACING_OUT).textured("knobs", [1.0, 1.0]),
    part("knob", Cylinder, KNOB, [2.47, 3.5, 6.15], "metal").rotated(FACING_OUT).textured("knobs", [1.0, 1.0]),
    part("knob", Cylinder, KNOB, [-2.25, 1.62, 6.15], "metal").rotated(FACING_OUT).textured("knobs", [1.0, 1.0]),
    part("knob", Cylinder, KNOB, [-2.47, 3.5, 6.15], "metal").rotated(FACING_OUT).textured("knobs", [1.0, 1.0]),
    part("knob", Cylinder, KNOB, [0.2, 1.65, 6.5], "metal").rotated(FACING_OUT).textured("knobs", [1.0, 1.0]),
    part("knob", Cylinder, KNOB, [-0.2, 1.65, 6.5], "metal").rotated(FACING_OUT).textured("knobs", [1.0, 1.0]),
    part("knob", Cylinder, KNOB, [0.0, 3.5, 6.5], "metal").rotated(FACING_OUT).textured("knobs", [1.0, 1.0]),
];

/// Draws every row of [`ENVIRONMENT`] through the same pipeline as the
/// scene's own instances.
pub fn draw_environment(renderer: &mut Renderer<'_>) {
    for part in ENVIRONMENT {
        renderer.set_transformations(
            Vector3::from(part.scale),
            Vector3::from(part.rotation),
            Vector3::from(part.position),
        );
        renderer.set_material(part.material);
        renderer.set_texture(part.texture);
        renderer.set_uv_scale(Vector2::from(part.uv_scale));
        renderer.set_color(Vector4::from(part.color));
        renderer.draw_primitive(Primitive {
            shape: part.shape,
            parts: part.parts,
        });
    }
}
