//! # Core Module
//!
//! Shared-ownership primitives used throughout the island engine.
//!
//! ## Key Components
//! - `MtResource`: thread-safe reference-counted resource with read-write locking
//!
//! Islands, chunks and the registry state are all held in `MtResource`s, so a
//! reference obtained under the registry lock stays valid after the lock is
//! released, even if the island is destroyed concurrently.
//!
//! ## Usage
//! ```rust
//! use island_engine::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;
