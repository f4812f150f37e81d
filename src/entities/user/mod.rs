//! User directory: model, header-based auth provider, handlers and routes

pub mod descriptor;
pub mod handlers;
pub mod model;
pub mod provider;

pub use descriptor::UserDescriptor;
pub use model::{NewUser, User, UserFilter, UserPatch, UserStatus, default_avatar};
pub use provider::DirectoryAuthProvider;
