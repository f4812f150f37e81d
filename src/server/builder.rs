//! ServerBuilder for fluent API to build the HTTP server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use super::entity_registry::{EntityDescriptor, EntityRegistry};
use super::exposure::RestExposure;
use super::host::{AppState, ServerHost};
use crate::config::AppConfig;
use crate::core::auth::AuthProvider;
use crate::core::events::EventBus;
use crate::core::DataService;
use crate::entities::class::{Class, ClassDescriptor, Enrollment};
use crate::entities::invoice::InvoiceDescriptor;
use crate::entities::notice::{Notice, NoticeDescriptor};
use crate::entities::payment::PaymentDescriptor;
use crate::entities::user::{DirectoryAuthProvider, User, UserDescriptor};
use crate::ledger::recorder::PaymentRecorder;
use crate::ledger::store::LedgerStore;
use crate::ledger::LedgerDescriptor;
use crate::storage::{InMemoryDataService, InMemoryLedgerStore};

/// Builder for the school-office server
///
/// Every storage service defaults to its in-memory implementation and the
/// auth provider defaults to [`DirectoryAuthProvider`] over the user store.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(AppConfig::from_yaml_file("school.yaml")?)
///     .with_event_bus(1024)
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    users: Option<Arc<dyn DataService<User>>>,
    classes: Option<Arc<dyn DataService<Class>>>,
    enrollments: Option<Arc<dyn DataService<Enrollment>>>,
    notices: Option<Arc<dyn DataService<Notice>>>,
    ledger: Option<Arc<dyn LedgerStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
    entity_registry: EntityRegistry,
    custom_routes: Vec<Router>,
    event_bus: Option<EventBus>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let mut entity_registry = EntityRegistry::new();
        entity_registry.register(Box::new(UserDescriptor));
        entity_registry.register(Box::new(ClassDescriptor));
        entity_registry.register(Box::new(NoticeDescriptor));
        entity_registry.register(Box::new(InvoiceDescriptor));
        entity_registry.register(Box::new(PaymentDescriptor));
        entity_registry.register(Box::new(LedgerDescriptor));

        Self {
            config: AppConfig::default_config(),
            users: None,
            classes: None,
            enrollments: None,
            notices: None,
            ledger: None,
            auth: None,
            entity_registry,
            custom_routes: Vec::new(),
            event_bus: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_user_service(mut self, service: impl DataService<User> + 'static) -> Self {
        self.users = Some(Arc::new(service));
        self
    }

    pub fn with_class_service(mut self, service: impl DataService<Class> + 'static) -> Self {
        self.classes = Some(Arc::new(service));
        self
    }

    pub fn with_enrollment_service(
        mut self,
        service: impl DataService<Enrollment> + 'static,
    ) -> Self {
        self.enrollments = Some(Arc::new(service));
        self
    }

    pub fn with_notice_service(mut self, service: impl DataService<Notice> + 'static) -> Self {
        self.notices = Some(Arc::new(service));
        self
    }

    pub fn with_ledger_store(mut self, store: impl LedgerStore + 'static) -> Self {
        self.ledger = Some(Arc::new(store));
        self
    }

    /// Replace the default header-based directory lookup
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Register an additional resource descriptor
    pub fn register(mut self, descriptor: impl EntityDescriptor + 'static) -> Self {
        self.entity_registry.register(Box::new(descriptor));
        self
    }

    /// Add routes that don't belong to any resource
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Enable the domain event bus
    ///
    /// `capacity` is the broadcast buffer size (1024 is a good default).
    pub fn with_event_bus(mut self, capacity: usize) -> Self {
        self.event_bus = Some(EventBus::new(capacity));
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> Result<ServerHost> {
        let users = self
            .users
            .unwrap_or_else(|| Arc::new(InMemoryDataService::<User>::new()));
        let classes = self
            .classes
            .unwrap_or_else(|| Arc::new(InMemoryDataService::<Class>::new()));
        let enrollments = self
            .enrollments
            .unwrap_or_else(|| Arc::new(InMemoryDataService::<Enrollment>::new()));
        let notices = self
            .notices
            .unwrap_or_else(|| Arc::new(InMemoryDataService::<Notice>::new()));
        let ledger = self
            .ledger
            .unwrap_or_else(|| Arc::new(InMemoryLedgerStore::new()));
        let auth = self
            .auth
            .unwrap_or_else(|| Arc::new(DirectoryAuthProvider::new(users.clone())));

        let event_bus = self.event_bus.map(Arc::new);
        let recorder = PaymentRecorder::new(ledger.clone(), self.config.ledger)
            .with_event_bus(event_bus.clone());
        let capabilities = Arc::new(self.config.capability_table());

        let state = AppState {
            config: Arc::new(self.config),
            users,
            classes,
            enrollments,
            notices,
            ledger,
            recorder,
            capabilities,
            auth,
            event_bus,
        };

        let mut host = ServerHost::new(state, self.entity_registry);
        host.custom_routes = self.custom_routes;
        Ok(host)
    }

    /// Build the REST router
    pub fn build(self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host)
    }

    /// Bind the configured address and serve until Ctrl+C / SIGTERM
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr()?;
        let app = self.build()?;
        serve(app, addr).await
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve a router with graceful shutdown
pub async fn serve(app: Router, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
