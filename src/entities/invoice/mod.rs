//! Invoice entity: model, handlers and route descriptor

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::InvoiceDescriptor;
pub use model::{Invoice, InvoiceRecord, InvoiceStatus, InvoiceView, NewInvoice, StudentRef};
