//! Measurement overlay engine.
//!
//! Turns fetched measurements into colored, site-grouped markers and runs
//! the click protocol that highlights one site and traces its path.

pub mod color;
pub mod color_domain;
pub mod config;
pub mod controller;
pub mod grouping;
pub mod interaction;
pub mod marker_color;
pub mod render;
pub mod style;
pub mod trace;
