/// Database models
///
/// # Models
///
/// - `user`: accounts with an admin flag; password stored only as a hash
/// - `project`: admin-managed grouping of tasks
/// - `task`: the unit of work, optionally assigned to a user
///
/// Plain CRUD lives here. The task lifecycle (assign, unassign, submit) is
/// enforced one level up in [`crate::workflow`].
pub mod project;
pub mod task;
pub mod user;
