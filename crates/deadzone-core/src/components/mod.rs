//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! Rules live in systems; rendering lives outside this crate.

mod actors;
mod common;

pub use actors::*;
pub use common::*;
