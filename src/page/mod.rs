pub mod analyzer;
pub mod page_model;
