//! Library crate for phishguard exposing reusable modules.
pub mod client;
pub mod controller;
pub mod counter;
pub mod render;
pub mod types;
