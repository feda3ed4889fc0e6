pub mod gate;
pub mod verification;
