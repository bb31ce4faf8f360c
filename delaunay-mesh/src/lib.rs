pub mod arena;
pub mod bvh;
pub mod geo;
pub mod mesh;

pub use mesh::DelaunayMesh;
