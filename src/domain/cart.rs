use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::product::{Product, ProductId};

/// A product held in the cart together with its quantity.
///
/// Serialized flat, so a stored entry reads
/// `{"id":1,"title":"..","price":179.9,"image":"..","amount":2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(flatten)]
    pub product: Product,
    pub amount: u32,
}

impl CartEntry {
    /// A fresh entry always starts at one unit.
    pub fn new(mut product: Product) -> Self {
        // the entry's own field; a catalog attribute of that name would be written twice
        product.extra.remove("amount");
        Self { product, amount: 1 }
    }

    pub fn id(&self) -> ProductId {
        self.product.id
    }
}

/// Ordered list of cart entries, unique by product id.
///
/// Transitions (`with_appended`, `with_amount`, `without`) return a new cart and
/// leave `self` untouched, so a caller can persist the next state before adopting it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from raw entries, rejecting duplicate ids and zero amounts.
    pub fn from_entries(entries: Vec<CartEntry>) -> Result<Self, String> {
        let cart = Self { entries };
        cart.validate()?;
        Ok(cart)
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn get(&self, id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Quantity per product id, as a product listing shows it next to each item.
    pub fn amounts(&self) -> HashMap<ProductId, u32> {
        self.entries.iter().map(|entry| (entry.id(), entry.amount)).collect()
    }

    /// Sum of all quantities.
    pub fn total_items(&self) -> u64 {
        self.entries.iter().map(|entry| u64::from(entry.amount)).sum()
    }

    /// Checks the cart invariants: one entry per id, every amount at least 1.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if entry.amount == 0 {
                return Err(format!("Product {} has amount 0", entry.id()));
            }
            if !seen.insert(entry.id()) {
                return Err(format!("Product {} appears more than once", entry.id()));
            }
        }
        Ok(())
    }

    /// Appends a new entry at the end. The caller ensures the id is not present yet.
    pub fn with_appended(&self, entry: CartEntry) -> Cart {
        let mut entries = self.entries.clone();
        entries.push(entry);
        Cart { entries }
    }

    /// Sets the amount of an existing entry in place. `None` if the product is absent.
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Cart> {
        let position = self.entries.iter().position(|entry| entry.id() == id)?;
        let mut entries = self.entries.clone();
        entries[position].amount = amount;
        Some(Cart { entries })
    }

    /// Drops the entry for `id`, keeping the others in order. `None` if absent.
    pub fn without(&self, id: ProductId) -> Option<Cart> {
        if !self.contains(id) {
            return None;
        }
        let entries = self
            .entries
            .iter()
            .filter(|entry| entry.id() != id)
            .cloned()
            .collect();
        Some(Cart { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: ProductId, amount: u32) -> CartEntry {
        CartEntry {
            product: Product::new(id, format!("Sneaker {id}"), 100.0, format!("https://img/{id}.jpg")),
            amount,
        }
    }

    #[test]
    fn test_transitions_leave_original_untouched() {
        let cart = Cart::from_entries(vec![entry(1, 1), entry(2, 3)]).unwrap();

        let appended = cart.with_appended(CartEntry::new(Product::new(3, "Boot", 50.0, "")));
        let bumped = cart.with_amount(2, 4).unwrap();
        let removed = cart.without(1).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(2).unwrap().amount, 3);
        assert_eq!(appended.entries().last().unwrap().id(), 3);
        assert_eq!(appended.get(3).unwrap().amount, 1);
        assert_eq!(bumped.get(2).unwrap().amount, 4);
        assert_eq!(removed.entries(), &[entry(2, 3)]);
    }

    #[test]
    fn test_missing_product_transitions_return_none() {
        let cart = Cart::from_entries(vec![entry(2, 1)]).unwrap();
        assert!(cart.with_amount(5, 2).is_none());
        assert!(cart.without(5).is_none());
    }

    #[test]
    fn test_without_keeps_order_of_others() {
        let cart = Cart::from_entries(vec![entry(1, 1), entry(2, 2), entry(3, 3)]).unwrap();
        let removed = cart.without(2).unwrap();
        let ids: Vec<_> = removed.entries().iter().map(CartEntry::id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_validate_rejects_duplicates_and_zero_amounts() {
        assert!(Cart::from_entries(vec![entry(1, 1), entry(1, 2)]).is_err());
        assert!(Cart::from_entries(vec![entry(1, 0)]).is_err());
    }

    #[test]
    fn test_counts() {
        let cart = Cart::from_entries(vec![entry(1, 2), entry(4, 5)]).unwrap();
        assert_eq!(cart.total_items(), 7);
        assert_eq!(cart.amounts().get(&4), Some(&5));
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_entry_serializes_flat() {
        let json = serde_json::to_value(entry(1, 2)).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "Sneaker 1");
        assert_eq!(json["amount"], 2);
    }

    #[test]
    fn test_catalog_amount_attribute_does_not_shadow_entry_amount() {
        let mut product = Product::new(4, "Sandal", 59.9, "");
        product.extra.insert("amount".to_string(), serde_json::json!(12));
        product.extra.insert("brand".to_string(), serde_json::json!("Havaianas"));

        let entry = CartEntry::new(product);
        let json = serde_json::to_string(&entry).unwrap();
        let back: CartEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(back, entry);
        assert_eq!(back.amount, 1);
        assert_eq!(back.product.extra.get("brand"), Some(&serde_json::json!("Havaianas")));
    }
}
