//! The supplier entry form as an explicit view model.

use serde::{Deserialize, Serialize};
use suppliers_types::Supplier;

/// One string per visible form field.
///
/// Serializes so the CLI can persist the form between invocations, the way
/// the page kept its fields between button presses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    pub id: String,
    pub name: String,
    pub address: String,
    pub email: String,
    /// Products as the comma-joined display string, e.g. `"1, 2"`.
    pub products: String,
}

impl FormFields {
    /// Overwrite every field from a server-returned record, including the
    /// server-assigned id.
    pub fn apply_record(&mut self, supplier: &Supplier) {
        self.id = supplier.id.to_string();
        self.name = supplier.name.clone();
        self.address = supplier.address.clone();
        self.email = supplier.email.clone();
        self.products = supplier.products_display();
    }

    /// Reset every field, id included.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.id.trim().is_empty()
            && self.name.trim().is_empty()
            && self.address.trim().is_empty()
            && self.email.trim().is_empty()
            && self.products.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suppliers_types::{ProductId, SupplierId};

    #[test]
    fn apply_record_overwrites_every_field() {
        let mut form = FormFields {
            id: "old".into(),
            name: "old".into(),
            address: "old".into(),
            email: "old".into(),
            products: "old".into(),
        };
        form.apply_record(&Supplier {
            id: SupplierId::Number(7),
            name: "Acme".into(),
            address: "X".into(),
            email: "a@b.c".into(),
            products: vec![ProductId::Number(1), ProductId::Number(2)],
        });

        assert_eq!(form.id, "7");
        assert_eq!(form.name, "Acme");
        assert_eq!(form.address, "X");
        assert_eq!(form.email, "a@b.c");
        assert_eq!(form.products, "1, 2");
    }

    #[test]
    fn clear_empties_every_field_including_id() {
        let mut form = FormFields {
            id: "7".into(),
            name: "Acme".into(),
            ..FormFields::default()
        };
        form.clear();
        assert!(form.is_empty());
        assert_eq!(form.id, "");
    }
}
