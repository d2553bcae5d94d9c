//! Megaverse Core - Fundamental types for grid reconciliation
//!
//! This crate defines the types shared across the reconciler:
//! - Grid coordinates (Position)
//! - The astral entity taxonomy (Entity, Color, Direction)
//! - Grid snapshots and per-cell actions
//! - The error taxonomy

pub mod position;
pub mod entity;
pub mod grid;
pub mod action;
pub mod error;

pub use position::*;
pub use entity::*;
pub use grid::*;
pub use action::*;
pub use error::*;
