//! In-memory vendor directory.

use async_trait::async_trait;
use dashmap::DashMap;

use vendhub_core::AppResult;
use vendhub_core::types::id::VendorId;
use vendhub_entity::vendor::{Vendor, VendorStatus};

use crate::traits::VendorDirectory;

/// In-memory vendor directory keyed by vendor id.
#[derive(Debug, Default)]
pub struct MemoryVendorDirectory {
    vendors: DashMap<VendorId, Vendor>,
}

impl MemoryVendorDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a vendor record.
    pub fn insert(&self, vendor: Vendor) {
        self.vendors.insert(vendor.id, vendor);
    }

    /// Remove a vendor record.
    pub fn remove(&self, id: VendorId) -> Option<Vendor> {
        self.vendors.remove(&id).map(|(_, vendor)| vendor)
    }
}

#[async_trait]
impl VendorDirectory for MemoryVendorDirectory {
    async fn find_by_id(&self, id: VendorId) -> AppResult<Option<Vendor>> {
        Ok(self.vendors.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_status(&self, status: VendorStatus) -> AppResult<Vec<Vendor>> {
        Ok(self
            .vendors
            .iter()
            .filter(|entry| entry.value().status == status)
            .map(|entry| entry.value().clone())
            .collect())
    }
}
