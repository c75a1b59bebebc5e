// log-follow - ui/panels/mod.rs

pub mod footer;
pub mod log_panel;
