pub mod chunk;
pub mod config;
pub mod density;
pub mod error;
pub mod ffi;
pub mod grid;
pub mod interp;
pub mod mesh;
pub mod noise;
pub mod pack;
pub mod plugin;
pub mod tables;
pub mod terrain;
pub mod types;
pub mod utils;

pub use config::{DensityConfig, TerrainConfig};
pub use error::{Result, TerrainError};
pub use pack::OutputBlock;
pub use plugin::{TerrainPlugin, TerrainRequest};
pub use terrain::{generate_terrain, generate_terrain_with};
