//! # stagecast-core
//!
//! Core types and primitives for the Stagecast overlay compositor.
//! This crate contains foundational types shared across all Stagecast crates:
//! colors, geometry, frame buffers, frame timestamps, configuration, and error types.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;
pub mod math;
pub mod time;

pub use config::*;

pub use color::Color;
pub use error::{StageError, StageResult};
pub use frame::FrameBuffer;
pub use math::{Affine2D, Point2D, Rect, Size2D};
pub use time::FrameTime;
