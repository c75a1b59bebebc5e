// log-follow - platform/mod.rs
//
// Platform abstraction layer: configuration directories and config.toml.
// Dependencies: util, core model types, directories crate.
// Must NOT depend on: app, ui.

pub mod config;
