//! Texpaint painting engine - layered RGBA textures and paint tools
//!
//! This crate provides the CPU side of a texture painting tool:
//! - [`surface`] - RGBA8 pixel buffer with straight-alpha blending
//! - [`codec`] - Image decode/encode for PNG, JPEG, BMP and TGA
//! - [`brush`] - Circular dab stamping and stroke interpolation
//! - [`fill`] - Tolerance-based flood fill
//! - [`tiles`] - Tile grid with dirty tracking for partial uploads
//! - [`layer`] / [`stack`] - Layers, ordering and compositing
//! - [`tools`] - Paint tools and their single dispatch point
//! - [`pipeline`] - Stroke handling and undo for front-ends
//! - [`project`] - Saving and loading layered projects

pub mod brush;
pub mod codec;
pub mod color;
pub mod constants;
pub mod error;
pub mod fill;
pub mod layer;
pub mod pipeline;
pub mod project;
pub mod stack;
pub mod surface;
pub mod tiles;
pub mod tools;
pub mod types;

pub use brush::*;
pub use codec::*;
pub use constants::*;
pub use error::*;
pub use fill::*;
pub use layer::*;
pub use pipeline::*;
pub use project::*;
pub use stack::*;
pub use surface::*;
pub use tiles::*;
pub use tools::*;
pub use types::*;
