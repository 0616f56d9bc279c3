//! Core models and contracts for TaskMate: the task data model, the durable
//! key-value storage contract, the user-prompt capability, and the pure view
//! projections.

pub mod prompt;
pub mod storage;
pub mod tasks;
pub mod views;
