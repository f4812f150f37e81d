//! Notice board

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::NoticeDescriptor;
pub use model::{AuthorRef, Notice, NoticePatch, NoticeView, Priority};
