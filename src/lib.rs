//! Gamepad role tracking
//!
//! Two independent pieces:
//!
//! - [`controller`] turns raw pad input into held/down/up signals per
//!   logical button, including buttons that only exist as analogue axes.
//! - [`monitor`] binds entities to a fixed set of roles with O(1)
//!   activation and deactivation and an age clock per role.
//!
//! [`demo`] connects the two, and [`config`] holds the file-backed settings
//! of the `rolepad` binary.

pub mod config;
pub mod controller;
pub mod demo;
pub mod monitor;
