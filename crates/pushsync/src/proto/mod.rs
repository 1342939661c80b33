// Automatically generated mod.rs
pub mod pushsync;
