use serde::{Deserialize, Serialize};

use mizan_core::{DomainError, DomainResult, Entity, ProductId};

/// A stocked product.
///
/// `quantity` reflects the net of all posted invoice lines referencing this
/// product since creation. It is signed: a sale may drive it negative
/// transiently (oversell is accepted, not guarded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub barcode: String,
    pub name: String,
    pub category: String,
    pub warehouse: String,
    pub purchase_price: f64,
    pub sale_price: f64,
    pub quantity: i64,
    /// Reorder threshold.
    pub min_quantity: i64,
}

impl Product {
    /// Validating constructor for new products entered through the inventory
    /// form. Quantities are caller-supplied opening stock.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProductId,
        code: impl Into<String>,
        barcode: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        warehouse: impl Into<String>,
        purchase_price: f64,
        sale_price: f64,
        quantity: i64,
        min_quantity: i64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if purchase_price < 0.0 || sale_price < 0.0 {
            return Err(DomainError::validation("prices cannot be negative"));
        }
        if min_quantity < 0 {
            return Err(DomainError::validation(
                "minimum quantity cannot be negative",
            ));
        }

        Ok(Self {
            id,
            code: code.into(),
            barcode: barcode.into(),
            name,
            category: category.into(),
            warehouse: warehouse.into(),
            purchase_price,
            sale_price,
            quantity,
            min_quantity,
        })
    }

    /// Low-stock rule: at or below the reorder threshold counts as low.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_product(quantity: i64, min_quantity: i64) -> Product {
        Product::new(
            ProductId::new(),
            "P001",
            "123456",
            "Laptop",
            "Electronics",
            "Main warehouse",
            450.0,
            550.0,
            quantity,
            min_quantity,
        )
        .unwrap()
    }

    #[test]
    fn low_stock_boundary_is_inclusive() {
        assert!(test_product(5, 5).is_low_stock());
        assert!(!test_product(6, 5).is_low_stock());
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = Product::new(
            ProductId::new(),
            "P001",
            "",
            "Laptop",
            "",
            "",
            -1.0,
            550.0,
            0,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Product::new(
            ProductId::new(),
            "P001",
            "",
            "  ",
            "",
            "",
            1.0,
            2.0,
            0,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    proptest! {
        /// Property: the low-stock predicate is exactly `quantity <= min_quantity`.
        #[test]
        fn low_stock_matches_threshold(quantity in -100i64..100, min in 0i64..100) {
            let p = test_product(quantity, min);
            prop_assert_eq!(p.is_low_stock(), quantity <= min);
        }
    }
}
