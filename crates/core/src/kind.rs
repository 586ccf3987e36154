//! Entity-kind discriminator shared by the store and the sync layer.

use serde::{Deserialize, Serialize};

/// The four synchronized entity collections.
///
/// Used as the change-notification granularity of the store and as the
/// table selector of the sync gateway.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Contact,
    Invoice,
    Transaction,
}

impl EntityKind {
    /// Remote table name for this kind.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Product => "products",
            EntityKind::Contact => "contacts",
            EntityKind::Invoice => "invoices",
            EntityKind::Transaction => "transactions",
        }
    }

    pub const ALL: [EntityKind; 4] = [
        EntityKind::Product,
        EntityKind::Contact,
        EntityKind::Invoice,
        EntityKind::Transaction,
    ];
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.table())
    }
}
