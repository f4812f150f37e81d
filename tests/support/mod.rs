//! Shared fixtures for the HTTP integration tests
//!
//! `create_test_server()` builds the full router over in-memory stores and
//! registers one user per role. Requests are authenticated by sending the
//! user's id in the `x-user-id` header, see [`as_user`].

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use eduverse::config::AppConfig;
use eduverse::prelude::*;
use eduverse::server::RestExposure;
use serde_json::{Value, json};

/// One user per role, plus a second student
pub struct School {
    pub server: TestServer,
    pub state: AppState,
    pub admin: Uuid,
    pub accountant: Uuid,
    pub teacher: Uuid,
    pub staff: Uuid,
    pub student: Uuid,
    pub other_student: Uuid,
}

pub async fn create_test_server() -> School {
    create_test_server_with(AppConfig::default_config()).await
}

pub async fn create_test_server_with(config: AppConfig) -> School {
    let host = ServerBuilder::new()
        .with_config(config)
        .with_event_bus(64)
        .build_host()
        .expect("Failed to build host");
    let state = host.state.clone();

    let admin = add_user(&state, "System Administrator", "admin@school.edu", Role::Admin).await;
    let accountant = add_user(&state, "Robert Martinez", "accountant@school.edu", Role::Accountant).await;
    let teacher = add_user(&state, "Sarah Johnson", "teacher@school.edu", Role::Teacher).await;
    let staff = add_user(&state, "John Doe", "staff@school.edu", Role::Staff).await;
    let student = add_user(&state, "Emma Wilson", "emma@school.edu", Role::Student).await;
    let other_student = add_user(&state, "Liam Smith", "liam@school.edu", Role::Student).await;

    let app = RestExposure::build_router(Arc::new(host)).expect("Failed to build app");
    let server = TestServer::try_new(app).expect("Failed to create test server");

    School {
        server,
        state,
        admin,
        accountant,
        teacher,
        staff,
        student,
        other_student,
    }
}

pub async fn add_user(state: &AppState, name: &str, email: &str, role: Role) -> Uuid {
    state
        .users
        .create(User::new(name, email, role))
        .await
        .expect("Failed to create user")
        .id
}

/// Header pair identifying the caller
pub fn as_user(id: Uuid) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(USER_ID_HEADER),
        HeaderValue::from_str(&id.to_string()).expect("uuid is a valid header value"),
    )
}

impl School {
    /// Create an invoice through the API as the accountant and return its id
    pub async fn invoice(&self, student: Uuid, amount: &str, due_date: &str) -> Uuid {
        let (name, value) = as_user(self.accountant);
        let response = self
            .server
            .post("/invoices")
            .add_header(name, value)
            .json(&json!({
                "studentId": student,
                "description": "Tuition",
                "amount": amount,
                "dueDate": due_date,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        body["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("invoice id")
    }
}
