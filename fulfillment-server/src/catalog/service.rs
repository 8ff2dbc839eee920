//! Catalog Service - in-memory vendor/menu read model
//!
//! Mirrors the authoritative catalog into lock-free maps. The fulfillment
//! core only reads; upserts arrive from the catalog sync path (or from test
//! fixtures).

use dashmap::DashMap;
use shared::models::{MenuItem, Vendor};
use std::sync::Arc;

/// Unified catalog lookup for vendors and menu items
#[derive(Clone, Default)]
pub struct CatalogService {
    /// Vendors cache: vendor_id -> Vendor
    vendors: Arc<DashMap<String, Vendor>>,
    /// Menu items cache: menu_item_id -> MenuItem
    menu_items: Arc<DashMap<String, MenuItem>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("vendors", &self.vendors.len())
            .field("menu_items", &self.menu_items.len())
            .finish()
    }
}

impl CatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Sync-side upserts ==========

    pub fn upsert_vendor(&self, vendor: Vendor) {
        self.vendors.insert(vendor.id.clone(), vendor);
    }

    pub fn upsert_menu_item(&self, item: MenuItem) {
        self.menu_items.insert(item.id.clone(), item);
    }

    pub fn remove_vendor(&self, vendor_id: &str) {
        self.vendors.remove(vendor_id);
    }

    pub fn remove_menu_item(&self, menu_item_id: &str) {
        self.menu_items.remove(menu_item_id);
    }

    // ========== Read side ==========

    /// Look up a vendor by id
    pub fn vendor(&self, vendor_id: &str) -> Option<Vendor> {
        self.vendors.get(vendor_id).map(|v| v.clone())
    }

    /// Look up a menu item by id
    pub fn menu_item(&self, menu_item_id: &str) -> Option<MenuItem> {
        self.menu_items.get(menu_item_id).map(|m| m.clone())
    }

    /// Batch lookup used by the pricing calculator; missing ids are simply
    /// absent from the result, the calculator reports them as invalid items
    pub fn menu_items_batch(&self, ids: &[String]) -> Vec<MenuItem> {
        ids.iter()
            .filter_map(|id| self.menu_items.get(id).map(|m| m.clone()))
            .collect()
    }

    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }
}
