//! Declarative path shapes rendered into rasters with deterministic cache keys.
//!
//! A [`shape::PathShapeRenderer`] is built from a JSON description (path,
//! rotation, color) and a target size. It draws onto any [`draw::Canvas`] and
//! derives a [`shape::CacheKey`] covering every input that affects the pixels.
//! Rendered rasters can be recolored with [`filter::ColorMatrix`] presets.
//! The [`pipeline`] ties generators to a cache, and [`storage`] manages
//! temporary artifacts and their cleanup on shutdown.

pub mod config;
pub mod convert;
pub mod draw;
pub mod filter;
pub mod pipeline;
pub mod shape;
pub mod storage;

pub use config::Config;
pub use shape::{CacheKey, PathShapeRenderer, ShapeGenerator};
