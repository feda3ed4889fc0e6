pub mod site_policy;
pub mod tables;
