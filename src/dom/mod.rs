pub mod dom_model;
