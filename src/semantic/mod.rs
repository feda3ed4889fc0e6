pub mod archetypes;
pub mod classifier;
