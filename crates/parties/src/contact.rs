use serde::{Deserialize, Serialize};

use mizan_core::{ContactId, DomainError, DomainResult, Entity};

/// Contact kind: client (receivable counterparty) or supplier (payable
/// counterparty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Client,
    Supplier,
}

/// A client or supplier with a running balance.
///
/// Balance sign convention:
/// - client: `balance < 0` means the client owes us (receivable),
///   `balance > 0` means we owe the client (credit);
/// - supplier: `balance > 0` means we owe the supplier (payable).
///
/// The balance equals the opening balance plus the signed sum of the
/// unsettled remainders of invoices posted against this contact. It is
/// mutated only by invoice posting and by direct edit in the contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    #[serde(rename = "type")]
    pub kind: ContactKind,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub balance: f64,
}

impl Contact {
    pub fn new(
        id: ContactId,
        kind: ContactKind,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        opening_balance: f64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("contact name cannot be empty"));
        }

        Ok(Self {
            id,
            kind,
            name,
            phone: phone.into(),
            email: email.into(),
            balance: opening_balance,
        })
    }
}

impl Entity for Contact {
    type Id = ContactId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
