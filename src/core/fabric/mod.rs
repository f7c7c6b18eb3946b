pub mod structure_type;
pub mod thermal_properties;
