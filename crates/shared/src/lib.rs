//! Core of the pin map viewer: normalized pin coordinates, the pin store and
//! its persistence, the pan/zoom viewport and the interaction mode machine.
//!
//! Everything here is synchronous and DOM-free so it can be driven from the
//! web frontend and exercised directly in unit tests.

pub mod category;
pub mod controller;
pub mod coords;
pub mod error;
pub mod mode;
pub mod models;
pub mod persist;
pub mod share;
pub mod store;
pub mod viewport;
