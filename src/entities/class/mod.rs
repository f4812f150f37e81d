//! Classes and enrollments

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::ClassDescriptor;
pub use model::{Class, ClassView, Enrollment};
