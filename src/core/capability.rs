//! Role capability table
//!
//! Everything a role may see or do is looked up here instead of being
//! branched on inline. The built-in table can be overridden per role from
//! the `roles:` section of the configuration file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::auth::Role;

/// Visibility tier of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Audience {
    Everyone,
    Students,
    Teachers,
}

impl Audience {
    pub const ALL: [Audience; 3] = [Audience::Everyone, Audience::Students, Audience::Teachers];

    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Everyone => "Everyone",
            Audience::Students => "Students",
            Audience::Teachers => "Teachers",
        }
    }

    /// Case-insensitive parse used for request payloads
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// Which invoices a role may read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceScope {
    /// Any student's invoices
    All,
    /// Only invoices billed to the caller
    Own,
    /// No invoice access
    None,
}

/// A single yes/no permission, used by [`crate::core::auth::AuthPolicy::Allows`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CreateInvoices,
    RecordPayments,
    ReadUsers,
    ManageUsers,
    ManageClasses,
    AuthorNotices,
    ModerateNotices,
    /// Read every student's invoices and ledgers
    ReadAllInvoices,
}

/// Capabilities granted to one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub notice_audiences: Vec<Audience>,
    pub invoice_scope: InvoiceScope,
    pub create_invoices: bool,
    pub record_payments: bool,
    pub read_users: bool,
    pub manage_users: bool,
    pub manage_classes: bool,
    pub author_notices: bool,
    pub moderate_notices: bool,
}

impl Default for Capabilities {
    /// Least privilege: public notices, every invoice readable, nothing writable
    fn default() -> Self {
        Self {
            notice_audiences: vec![Audience::Everyone],
            invoice_scope: InvoiceScope::All,
            create_invoices: false,
            record_payments: false,
            read_users: false,
            manage_users: false,
            manage_classes: false,
            author_notices: false,
            moderate_notices: false,
        }
    }
}

impl Capabilities {
    fn everything() -> Self {
        Self {
            notice_audiences: Audience::ALL.to_vec(),
            invoice_scope: InvoiceScope::All,
            create_invoices: true,
            record_payments: true,
            read_users: true,
            manage_users: true,
            manage_classes: true,
            author_notices: true,
            moderate_notices: true,
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::CreateInvoices => self.create_invoices,
            Capability::RecordPayments => self.record_payments,
            Capability::ReadUsers => self.read_users,
            Capability::ManageUsers => self.manage_users,
            Capability::ManageClasses => self.manage_classes,
            Capability::AuthorNotices => self.author_notices,
            Capability::ModerateNotices => self.moderate_notices,
            Capability::ReadAllInvoices => self.invoice_scope == InvoiceScope::All,
        }
    }

    pub fn sees_audience(&self, audience: Audience) -> bool {
        self.notice_audiences.contains(&audience)
    }
}

/// Role → capabilities lookup
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    entries: HashMap<Role, Capabilities>,
    fallback: Capabilities,
}

impl CapabilityTable {
    /// The built-in table
    pub fn defaults() -> Self {
        let mut entries = HashMap::new();

        entries.insert(Role::Admin, Capabilities::everything());
        entries.insert(
            Role::Accountant,
            Capabilities {
                manage_users: false,
                manage_classes: false,
                author_notices: false,
                moderate_notices: false,
                ..Capabilities::everything()
            },
        );
        entries.insert(
            Role::Teacher,
            Capabilities {
                notice_audiences: vec![Audience::Everyone, Audience::Teachers],
                author_notices: true,
                ..Capabilities::default()
            },
        );
        entries.insert(
            Role::Student,
            Capabilities {
                notice_audiences: vec![Audience::Everyone, Audience::Students],
                invoice_scope: InvoiceScope::Own,
                ..Capabilities::default()
            },
        );
        for role in [Role::Clerk, Role::Librarian, Role::Staff] {
            entries.insert(role, Capabilities::default());
        }

        Self {
            entries,
            fallback: Capabilities::default(),
        }
    }

    /// Replace whole entries for the given roles
    pub fn with_overrides(mut self, overrides: &HashMap<Role, Capabilities>) -> Self {
        for (role, caps) in overrides {
            self.entries.insert(*role, caps.clone());
        }
        self
    }

    pub fn for_role(&self, role: Role) -> &Capabilities {
        self.entries.get(&role).unwrap_or(&self.fallback)
    }

    pub fn allows(&self, role: Role, capability: Capability) -> bool {
        self.for_role(role).allows(capability)
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::defaults()
    }
}
