//! Terminal client for the team board backend.
//!
//! The core is the Tasks view's mapping workflow: filter a project's tasks and
//! the team, select some of each, and submit them as one bulk mapping.
//!
//! - [`client`]: typed HTTP calls with cookie-based sessions
//! - [`session`]: explicit session context and route guard
//! - [`filter`] / [`selection`] / [`mapping`]: the workflow's building blocks
//! - [`view`]: the event-driven Tasks view tying them together
//! - [`board`]: the interactive line-driven front end for a view

pub mod board;
pub mod client;
pub mod config;
pub mod filter;
pub mod forms;
pub mod mapping;
pub mod models;
pub mod render;
pub mod selection;
pub mod session;
pub mod view;
