//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations shared between tools and image rendering
//! - Image rendering using tiny-skia
//! - Text label rendering

pub mod geometry;
pub mod image;
pub mod text;
