//! API exposure
//!
//! Each exposure consumes a `ServerHost` and produces a router for its
//! protocol. REST is the only one served today.

pub mod rest;

pub use rest::RestExposure;
