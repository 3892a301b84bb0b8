//! # Tasks Module
//!
//! Personal to-do items. Every operation is scoped to the user resolved by
//! the `AuthedUser` guard.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::tasks_routes;
