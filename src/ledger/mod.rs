//! Fee ledger
//!
//! - [`reducer`]: folds a student's invoices into a balance and [`FeeStatus`]
//! - [`recorder`]: chooses the invoice a payment lands on and appends it
//! - [`store`]: the storage seam holding invoices and payments together
//! - [`amount`]: money and due-date parsing shared by the write paths

pub mod amount;
pub mod descriptor;
pub mod handlers;
pub mod recorder;
pub mod reducer;
pub mod store;

pub use descriptor::LedgerDescriptor;
pub use recorder::{PaymentRecorder, PaymentTarget};
pub use reducer::{FeeStatus, LedgerSummary};
pub use store::LedgerStore;
