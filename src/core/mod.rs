// log-follow - core/mod.rs
//
// Core logic layer: formatting, buffering, layout state.
// Dependencies: util, regex, serde.
// Must NOT depend on: ui, platform, app, or perform I/O.

pub mod buffer;
pub mod formatter;
pub mod layout;
pub mod model;
