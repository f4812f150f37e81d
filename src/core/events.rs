//! Domain event bus
//!
//! Mutating handlers publish a [`DomainEvent`] after a successful write.
//! Publishing never blocks and never fails; with no subscribers the event is
//! dropped.
//!
//! ```rust,ignore
//! let bus = EventBus::new(1024);
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DomainEvent::NoticeDeleted { notice_id });
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("{} at {}", envelope.event.name(), envelope.timestamp);
//! }
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Something that changed in the school records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    InvoiceCreated {
        invoice_id: Uuid,
        student_id: Uuid,
        #[serde(with = "rust_decimal::serde::str")]
        amount: Decimal,
    },
    PaymentRecorded {
        payment_id: Uuid,
        invoice_id: Uuid,
        #[serde(with = "rust_decimal::serde::str")]
        amount_paid: Decimal,
    },
    NoticePublished {
        notice_id: Uuid,
        author_id: Uuid,
    },
    NoticeUpdated {
        notice_id: Uuid,
    },
    NoticeDeleted {
        notice_id: Uuid,
    },
    UserCreated {
        user_id: Uuid,
        role: String,
    },
    UserDeleted {
        user_id: Uuid,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::InvoiceCreated { .. } => "invoice_created",
            DomainEvent::PaymentRecorded { .. } => "payment_recorded",
            DomainEvent::NoticePublished { .. } => "notice_published",
            DomainEvent::NoticeUpdated { .. } => "notice_updated",
            DomainEvent::NoticeDeleted { .. } => "notice_deleted",
            DomainEvent::UserCreated { .. } => "user_created",
            DomainEvent::UserDeleted { .. } => "user_deleted",
        }
    }

    /// Id of the record the event is about
    pub fn subject_id(&self) -> Uuid {
        match self {
            DomainEvent::InvoiceCreated { invoice_id, .. } => *invoice_id,
            DomainEvent::PaymentRecorded { payment_id, .. } => *payment_id,
            DomainEvent::NoticePublished { notice_id, .. }
            | DomainEvent::NoticeUpdated { notice_id }
            | DomainEvent::NoticeDeleted { notice_id } => *notice_id,
            DomainEvent::UserCreated { user_id, .. } | DomainEvent::UserDeleted { user_id } => {
                *user_id
            }
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: DomainEvent,
}

impl EventEnvelope {
    pub fn new(event: DomainEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; all clones share one channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// `capacity` bounds how far a slow receiver may lag before it starts
    /// losing events
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers, returning how many will see it
    pub fn publish(&self, event: DomainEvent) -> usize {
        tracing::trace!(event = event.name(), subject = %event.subject_id(), "publishing event");
        // Err only means there are no receivers
        self.sender.send(EventEnvelope::new(event)).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
