//! # Pad Transcoder Library
//!
//! Remaps controller frames from one device protocol into another.
//!
//! Buttons are routed bit by bit, and each analog axis passes through a
//! six-point piecewise-linear calibration with saturation at both ends and
//! a flat dead zone around neutral.

pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod poller;
