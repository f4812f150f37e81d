//! School-office resources
//!
//! Each resource follows the same layout: `model` (records, request parsing
//! and wire views), `handlers` (Axum handlers) and `descriptor` (routes).

pub mod class;
pub mod invoice;
pub mod notice;
pub mod payment;
pub mod user;
