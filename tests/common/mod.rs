#![allow(dead_code)]

pub mod candidates;
pub mod snapshots;
