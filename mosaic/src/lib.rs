//!
//! Low-poly mosaics: approximate a raster image with flat colored triangles.
//!
//! Candidate points are thinned (`filter`), triangulated, cleaned up
//! (`validate`) and every surviving triangle gets the mean color of the pixels
//! it covers (`color`). The result is written as JSON and as flat text
//! (`serialize`).
//!

pub mod candidates;
pub mod color;
pub mod config;
pub mod error;
pub mod filter;
pub mod mesh;
pub mod pipeline;
pub mod render;
pub mod serialize;
pub mod validate;

pub use config::Config;
pub use error::{Error, Result};
pub use mesh::{Color, Mesh, MeshTriangle, Point, Triangle};
pub use pipeline::{build_mesh, Stats};
