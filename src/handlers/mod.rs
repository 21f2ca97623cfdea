//! HTTP handlers grouped by surface.

pub mod admin;
pub mod locations;
pub mod meta;
