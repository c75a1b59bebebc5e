// log-follow - app/mod.rs
//
// Application layer: file I/O, worker threads, render-thread state.
// Dependencies: core layer.
// Must NOT depend on: ui, platform specifics.

pub mod cursor;
pub mod state;
pub mod tail;
