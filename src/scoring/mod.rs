pub mod legitimacy;
pub mod score_model;
