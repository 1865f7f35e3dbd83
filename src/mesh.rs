use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::handles::MeshHandle;

/// The basic shapes the mesh library can draw without any uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveShape {
    Box,
    Cone,
    Cylinder,
    Plane,
    Prism,
    Pyramid3,
    Pyramid4,
    Sphere,
    TaperedCylinder,
    Torus,
}

impl PrimitiveShape {
    pub const ALL: [PrimitiveShape; 10] = [
        PrimitiveShape::Box,
        PrimitiveShape::Cone,
        PrimitiveShape::Cylinder,
        PrimitiveShape::Plane,
        PrimitiveShape::Prism,
        PrimitiveShape::Pyramid3,
        PrimitiveShape::Pyramid4,
        PrimitiveShape::Sphere,
        PrimitiveShape::TaperedCylinder,
        PrimitiveShape::Torus,
    ];

    /// Order used when recovering a shape from a free-form tag. "tapered
    /// cylinder" contains "cylinder", so it has to be tried first.
    const MATCH_ORDER: [PrimitiveShape; 10] = [
        PrimitiveShape::Box,
        PrimitiveShape::Cone,
        PrimitiveShape::TaperedCylinder,
        PrimitiveShape::Cylinder,
        PrimitiveShape::Plane,
        PrimitiveShape::Prism,
        PrimitiveShape::Pyramid3,
        PrimitiveShape::Pyramid4,
        PrimitiveShape::Sphere,
        PrimitiveShape::Torus,
    ];

    /// Tag given to freshly added instances of this shape.
    pub fn tag(self) -> &'static str {
        match self {
            PrimitiveShape::Box => "box",
            PrimitiveShape::Cone => "cone",
            PrimitiveShape::Cylinder => "cylinder",
            PrimitiveShape::Plane => "plane",
            PrimitiveShape::Prism => "prism",
            PrimitiveShape::Pyramid3 => "pyramid3",
            PrimitiveShape::Pyramid4 => "pyramid4",
            PrimitiveShape::Sphere => "sphere",
            PrimitiveShape::TaperedCylinder => "tapered cylinder",
            PrimitiveShape::Torus => "torus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PrimitiveShape::Box => "Box",
            PrimitiveShape::Cone => "Cone",
            PrimitiveShape::Cylinder => "Cylinder",
            PrimitiveShape::Plane => "Plane",
            PrimitiveShape::Prism => "Prism",
            PrimitiveShape::Pyramid3 => "Pyramid 3",
            PrimitiveShape::Pyramid4 => "Pyramid 4",
            PrimitiveShape::Sphere => "Sphere",
            PrimitiveShape::TaperedCylinder => "Tapered Cylinder",
            PrimitiveShape::Torus => "Torus",
        }
    }

    /// First shape whose tag occurs anywhere in `tag`.
    pub fn find_in_tag(tag: &str) -> Option<Self> {
        Self::MATCH_ORDER
            .into_iter()
            .find(|shape| tag.contains(shape.tag()))
    }

    /// Parses a shape name typed by a user: `"tapered cylinder"`,
    /// `"tapered-cylinder"` and `"Tapered_Cylinder"` are all accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|shape| shape.tag() == normalized)
    }

    pub fn has_caps(self) -> bool {
        matches!(
            self,
            PrimitiveShape::Cone | PrimitiveShape::Cylinder | PrimitiveShape::TaperedCylinder
        )
    }
}

/// Which parts of a capped shape to draw. Ignored by shapes without caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshParts {
    pub top: bool,
    pub bottom: bool,
    pub sides: bool,
}

impl MeshParts {
    pub const ALL: MeshParts = MeshParts {
        top: true,
        bottom: true,
        sides: true,
    };
}

impl Default for MeshParts {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Primitive {
    pub shape: PrimitiveShape,
    pub parts: MeshParts,
}

impl From<PrimitiveShape> for Primitive {
    fn from(shape: PrimitiveShape) -> Self {
        Primitive {
            shape,
            parts: MeshParts::ALL,
        }
    }
}

/// One leaf mesh of an imported model file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportedMesh {
    pub path: PathBuf,
    /// Position of the mesh in the file's depth-first node walk.
    pub ordinal: usize,
    pub handle: MeshHandle,
}

/// What an instance draws once its shader state is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Drawable {
    Primitive(Primitive),
    Imported(ImportedMesh),
}

/// Geometry provider: the primitive shapes plus any uploaded meshes.
pub trait MeshLibrary {
    fn draw_primitive(&mut self, primitive: Primitive);

    /// Uploads interleaved position/normal vertices (6 floats each) and
    /// triangle indices.
    fn upload_mesh(&mut self, vertices: &[f32], indices: &[u32])
        -> Result<MeshHandle, BackendError>;

    fn draw_mesh(&mut self, handle: MeshHandle);
}

pub fn draw(drawable: &Drawable, meshes: &mut dyn MeshLibrary) {
    match drawable {
        Drawable::Primitive(primitive) => meshes.draw_primitive(*primitive),
        Drawable::Imported(imported) => meshes.draw_mesh(imported.handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tapered_cylinder_wins_over_cylinder() {
        assert_eq!(
            PrimitiveShape::find_in_tag("my tapered cylinder 2"),
            Some(PrimitiveShape::TaperedCylinder)
        );
        assert_eq!(
            PrimitiveShape::find_in_tag("cylinder"),
            Some(PrimitiveShape::Cylinder)
        );
    }

    #[test]
    fn tags_are_case_sensitive_substrings() {
        assert_eq!(PrimitiveShape::find_in_tag("big box"), Some(PrimitiveShape::Box));
        assert_eq!(PrimitiveShape::find_in_tag("Box"), None);
        assert_eq!(PrimitiveShape::find_in_tag("lamp"), None);
    }

    #[test]
    fn every_shape_recovers_from_its_own_tag() {
        for shape in PrimitiveShape::ALL {
            assert_eq!(PrimitiveShape::find_in_tag(shape.tag()), Some(shape));
        }
    }

    #[test]
    fn user_typed_names() {
        assert_eq!(
            PrimitiveShape::from_name("Tapered_Cylinder"),
            Some(PrimitiveShape::TaperedCylinder)
        );
        assert_eq!(PrimitiveShape::from_name(" torus "), Some(PrimitiveShape::Torus));
        assert_eq!(PrimitiveShape::from_name("hexagon"), None);
    }
}
