//! Wire-format mapping.
//!
//! The remote schema uses snake_case column names for products, invoices,
//! and transactions, while the domain serializes camelCase. The mapping is
//! mechanical and 1:1 on top-level fields (`salePrice ↔ sale_price`,
//! `refId ↔ ref_id`, ...); nested values such as invoice line items are
//! stored as opaque JSON and keep their domain shape. Contact records pass
//! through unchanged.

use serde_json::Value;

use mizan_core::EntityKind;

fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn map_keys(record: Value, f: impl Fn(&str) -> String) -> Value {
    match record {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (f(&key), value))
                .collect(),
        ),
        other => other,
    }
}

/// Domain JSON → remote row.
pub fn to_wire(kind: EntityKind, record: Value) -> Value {
    match kind {
        EntityKind::Contact => record,
        _ => map_keys(record, camel_to_snake),
    }
}

/// Remote row → domain JSON.
pub fn from_wire(kind: EntityKind, record: Value) -> Value {
    match kind {
        EntityKind::Contact => record,
        _ => map_keys(record, snake_to_camel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mizan_core::ProductId;
    use serde_json::json;

    #[test]
    fn product_fields_map_to_snake_case_columns() {
        let product = mizan_inventory::Product::new(
            ProductId::new(),
            "P001",
            "123",
            "Laptop",
            "Electronics",
            "Main",
            450.0,
            550.0,
            10,
            2,
        )
        .unwrap();

        let wire = to_wire(
            EntityKind::Product,
            serde_json::to_value(&product).unwrap(),
        );
        assert!(wire.get("sale_price").is_some());
        assert!(wire.get("purchase_price").is_some());
        assert!(wire.get("min_quantity").is_some());
        assert!(wire.get("salePrice").is_none());
    }

    #[test]
    fn transaction_round_trips_through_the_wire_shape() {
        use mizan_accounting::{Transaction, TransactionKind};
        use mizan_core::TransactionId;

        let tx = Transaction::manual(
            TransactionId::new(),
            "2024-05-02".parse().unwrap(),
            TransactionKind::Expense,
            "Rent",
            100.0,
            "Office rent",
        )
        .unwrap();
        let domain = serde_json::to_value(&tx).unwrap();

        let wire = to_wire(EntityKind::Transaction, domain.clone());
        let back = from_wire(EntityKind::Transaction, wire);
        assert_eq!(back, domain);

        let parsed: Transaction = serde_json::from_value(back).unwrap();
        assert_eq!(parsed, tx);
    }

    #[test]
    fn invoice_keeps_nested_items_in_domain_shape() {
        let record = json!({
            "id": "x",
            "contactId": "c",
            "paidAmount": 100.0,
            "items": [{"productId": "p", "quantity": 2}],
        });

        let wire = to_wire(EntityKind::Invoice, record);
        assert!(wire.get("contact_id").is_some());
        assert!(wire.get("paid_amount").is_some());
        // Line items are an opaque JSON column.
        assert_eq!(wire["items"][0]["productId"], "p");
    }

    #[test]
    fn contacts_pass_through_unchanged() {
        let record = json!({"id": "c", "type": "client", "name": "Delta"});
        assert_eq!(to_wire(EntityKind::Contact, record.clone()), record);
        assert_eq!(from_wire(EntityKind::Contact, record.clone()), record);
    }

    #[test]
    fn ref_id_maps_both_directions() {
        let domain = json!({"refId": "abc"});
        let wire = to_wire(EntityKind::Transaction, domain.clone());
        assert_eq!(wire, json!({"ref_id": "abc"}));
        assert_eq!(from_wire(EntityKind::Transaction, wire), domain);
    }
}
