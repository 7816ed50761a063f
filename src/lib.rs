//! Perspective arcade engine: a fixed-timestep simulation of pseudo-3D
//! entities and particle effects, configurable into a space shooter or a
//! city-flying dodger. Rendering and input belong to the embedding frontend.

pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod particles;
pub mod projection;
pub mod surface;
pub mod tables;
