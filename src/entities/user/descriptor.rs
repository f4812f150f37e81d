//! Route descriptor for the user directory

use axum::{Router, routing::get};

use super::handlers::{create_user, delete_user, get_user, list_users, update_user};
use crate::server::{AppState, EntityDescriptor};

pub struct UserDescriptor;

impl EntityDescriptor for UserDescriptor {
    fn entity_type(&self) -> &str {
        "user"
    }

    fn plural(&self) -> &str {
        "users"
    }

    fn build_routes(&self, state: AppState) -> Router {
        Router::new()
            .route("/users", get(list_users).post(create_user))
            .route(
                "/users/{id}",
                get(get_user).put(update_user).delete(delete_user),
            )
            .with_state(state)
    }
}
