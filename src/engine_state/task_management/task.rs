//! # Task System Core Traits
//!
//! This module defines the two halves of a unit of background work.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the owning thread with the world
//! 5. The result may hand back follow-up tasks, which are published in turn
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back
//! - Anything shared with the world goes through `MtResource` handles

use crate::engine_state::voxels::world::IslandWorld;

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should own everything they read. Mesh tasks, for example, carry a
/// snapshot or chunk handle rather than a borrow of the world.
pub trait Task: Send {
    /// Performs the work and returns a result for the owning thread.
    ///
    /// Runs on a worker. Errors are handled internally and reported through
    /// the result.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`.
pub trait TaskResult: Send {
    /// Applies the result to the world on the thread that owns the
    /// `TaskManager`.
    ///
    /// Keep this cheap: it runs inline with the caller's tick.
    ///
    /// # Returns
    /// Follow-up tasks to publish (often empty)
    fn handle_result(self: Box<Self>, world: &IslandWorld) -> Vec<Box<dyn Task + Send>>;
}
