pub mod estimate;
pub mod group;
