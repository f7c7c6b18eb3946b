pub mod fabric;
pub mod geometry;
pub mod heating_systems;
pub mod material_properties;
pub mod units;
