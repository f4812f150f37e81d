//! Payment entity: model, handlers and route descriptor

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::PaymentDescriptor;
pub use model::{Payment, PaymentDraft, PaymentMethod};
