//! # Voxel Task System
//!
//! Background work on islands. Generating a large island takes long enough
//! that it should not run inline with a tick.

pub mod island_generation_task;
