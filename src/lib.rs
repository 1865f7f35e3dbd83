//! Scene graph and rendering pipeline of the credenza scene editor.
//!
//! Everything GPU-facing goes through the traits in [`shaders`], [`mesh`]
//! and [`textures`]; [`opengl`] implements them on top of `glow`.

pub mod camera;
pub mod commands;
pub mod config;
pub mod data;
pub mod editor;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod handles;
pub mod loader;
pub mod material;
pub mod mesh;
pub mod opengl;
pub mod renderer;
pub mod scene_file;
pub mod shaders;
pub mod textures;
pub mod viewport;
pub mod world;

#[cfg(test)]
mod testing;
