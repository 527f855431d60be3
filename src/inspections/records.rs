//! Listing filters and the client-side listing cache for persisted
//! inspections.

use std::sync::Mutex;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::directory::{Vehicle, VehicleId};

use super::domain::{ChecklistKind, InspectionRecord, RecordId};

/// Conjunctive listing filters. The economic-number filter matches by
/// substring against the vehicle a record references, not the record itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordQuery {
    #[serde(default)]
    pub kind: Option<ChecklistKind>,
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
    #[serde(default)]
    pub economic_number: Option<String>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl RecordQuery {
    pub fn needs_vehicle_join(&self) -> bool {
        self.economic_number
            .as_deref()
            .map(|needle| !needle.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Applies every filter in the query; all must hold for a row to survive.
/// `vehicle` is the referenced vehicle when the query needs the join; a
/// record whose vehicle cannot be resolved fails the economic-number filter.
pub fn matches(record: &InspectionRecord, query: &RecordQuery, vehicle: Option<&Vehicle>) -> bool {
    if let Some(kind) = query.kind {
        if record.kind != kind {
            return false;
        }
    }
    if let Some(vehicle_id) = &query.vehicle_id {
        if &record.vehicle_id != vehicle_id {
            return false;
        }
    }
    if let Some(needle) = query.economic_number.as_deref() {
        let needle = needle.trim().to_lowercase();
        if !needle.is_empty() {
            let Some(vehicle) = vehicle else {
                return false;
            };
            if !vehicle.economic_number.to_lowercase().contains(&needle) {
                return false;
            }
        }
    }
    let inspected_on = record.inspected_at.date_naive();
    if let Some(from) = query.from {
        if inspected_on < from {
            return false;
        }
    }
    if let Some(to) = query.to {
        if inspected_on > to {
            return false;
        }
    }
    true
}

/// Mutation confirmed by the store, replayed onto the cached listing.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    Created(InspectionRecord),
    Updated(InspectionRecord),
    Deleted(RecordId),
}

/// Cached copy of the record collection.
///
/// The reducer in [`ListingCache::apply`] runs only after a confirmed store
/// response, and [`ListingCache::invalidate`] forces the next read to
/// refetch, keeping the optimistic patch and the authoritative refetch as
/// two distinct, ordered steps. There is no cross-client invalidation.
#[derive(Default)]
pub struct ListingCache {
    rows: Mutex<Option<Vec<InspectionRecord>>>,
}

impl ListingCache {
    pub fn snapshot(&self) -> Option<Vec<InspectionRecord>> {
        self.rows.lock().expect("cache mutex poisoned").clone()
    }

    pub fn fill(&self, rows: Vec<InspectionRecord>) {
        *self.rows.lock().expect("cache mutex poisoned") = Some(rows);
    }

    /// Patches a warm cache in place; a cold cache stays cold and the next
    /// read refetches from the store.
    pub fn apply(&self, event: &CacheEvent) {
        let mut guard = self.rows.lock().expect("cache mutex poisoned");
        let Some(rows) = guard.as_mut() else {
            return;
        };
        match event {
            CacheEvent::Created(record) => rows.push(record.clone()),
            CacheEvent::Updated(record) => {
                if let Some(slot) = rows.iter_mut().find(|row| row.id == record.id) {
                    *slot = record.clone();
                }
            }
            CacheEvent::Deleted(id) => rows.retain(|row| &row.id != id),
        }
    }

    pub fn invalidate(&self) {
        *self.rows.lock().expect("cache mutex poisoned") = None;
    }
}
