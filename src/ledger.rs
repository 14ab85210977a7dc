//! In-memory entry ledger for the active session.
//!
//! The ledger owns entry lifetime exclusively: entries are appended on
//! confirmation, hard-deleted on removal, and never mutated. Per-meal
//! buckets and daily totals are derived views recomputed from current
//! state, never stored.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::models::entry::{Entry, Meal};

/// Typed ledger notification. Carries only the entry id; listeners
/// re-query the ledger for current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "entryId", rename_all = "snake_case")]
pub enum LedgerEvent {
    EntryAdded(Uuid),
    EntryRemoved(Uuid),
}

/// Entries partitioned into the four fixed meal buckets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MealBuckets {
    pub morning: Vec<Entry>,
    pub lunch: Vec<Entry>,
    pub evening: Vec<Entry>,
    pub dinner: Vec<Entry>,
}

/// Elementwise nutrition sums across all entries. Plain sums; rounding is
/// deferred to presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Ordered collection of logged entries. Insertion order is preserved for
/// display but irrelevant for aggregation.
#[derive(Debug, Default)]
pub struct EntryLedger {
    entries: Vec<Entry>,
}

impl EntryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Removes the entry with the given id. Returns false (and leaves the
    /// ledger unchanged) when no such entry exists.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() < before
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn by_meal(&self) -> MealBuckets {
        let mut buckets = MealBuckets::default();
        for entry in &self.entries {
            let bucket = match entry.meal {
                Meal::Morning => &mut buckets.morning,
                Meal::Lunch => &mut buckets.lunch,
                Meal::Evening => &mut buckets.evening,
                Meal::Dinner => &mut buckets.dinner,
            };
            bucket.push(entry.clone());
        }
        buckets
    }

    /// Sums across all entries, missing macros counted as zero.
    pub fn totals(&self) -> MacroTotals {
        self.entries.iter().fold(MacroTotals::default(), |mut acc, e| {
            acc.calories += e.calories;
            acc.protein += e.protein.unwrap_or(0.0);
            acc.carbs += e.carbs.unwrap_or(0.0);
            acc.fat += e.fat.unwrap_or(0.0);
            acc
        })
    }
}

/// Cloneable handle to the session ledger, shared across handlers.
/// Mutations publish a typed event on the broadcast channel.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<EntryLedger>>,
    events: broadcast::Sender<LedgerEvent>,
}

impl SharedLedger {
    pub fn new(events: broadcast::Sender<LedgerEvent>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EntryLedger::new())),
            events,
        }
    }

    pub async fn add(&self, entry: Entry) {
        let id = entry.id;
        self.inner.lock().await.add(entry);
        let _ = self.events.send(LedgerEvent::EntryAdded(id));
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.inner.lock().await.remove(id);
        if removed {
            let _ = self.events.send(LedgerEvent::EntryRemoved(id));
        }
        removed
    }

    /// Entries in insertion order plus both derived views, taken under a
    /// single lock so they describe the same state.
    pub async fn snapshot(&self) -> (Vec<Entry>, MealBuckets, MacroTotals) {
        let ledger = self.inner.lock().await;
        (ledger.entries().to_vec(), ledger.by_meal(), ledger.totals())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(meal: Meal, calories: f64, protein: Option<f64>) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            date_key: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            meal,
            food_id: Uuid::new_v4(),
            name: "test food".into(),
            grams: 100.0,
            calories,
            protein,
            carbs: None,
            fat: None,
        }
    }

    fn bucket_sum(bucket: &[Entry]) -> f64 {
        bucket.iter().map(|e| e.calories).sum()
    }

    // ── aggregation ──────────────────────────────────────────────────────

    #[test]
    fn test_totals_sum_across_all_meals() {
        let mut ledger = EntryLedger::new();
        ledger.add(entry(Meal::Morning, 100.0, None));
        ledger.add(entry(Meal::Dinner, 50.0, None));

        assert_eq!(ledger.totals().calories, 150.0);

        let buckets = ledger.by_meal();
        assert_eq!(buckets.morning.len(), 1);
        assert_eq!(buckets.morning[0].calories, 100.0);
        assert_eq!(buckets.dinner.len(), 1);
        assert_eq!(buckets.dinner[0].calories, 50.0);
        assert!(buckets.lunch.is_empty());
        assert!(buckets.evening.is_empty());
    }

    #[test]
    fn test_missing_macros_count_as_zero() {
        let mut ledger = EntryLedger::new();
        ledger.add(entry(Meal::Lunch, 200.0, Some(10.0)));
        ledger.add(entry(Meal::Lunch, 300.0, None));

        let totals = ledger.totals();
        assert_eq!(totals.calories, 500.0);
        assert_eq!(totals.protein, 10.0);
        assert_eq!(totals.carbs, 0.0);
        assert_eq!(totals.fat, 0.0);
    }

    #[test]
    fn test_totals_equal_sum_of_bucket_sums() {
        let mut ledger = EntryLedger::new();
        ledger.add(entry(Meal::Morning, 120.0, None));
        ledger.add(entry(Meal::Lunch, 450.0, None));
        ledger.add(entry(Meal::Evening, 90.0, None));
        ledger.add(entry(Meal::Dinner, 600.0, None));
        ledger.add(entry(Meal::Lunch, 330.0, None));

        let buckets = ledger.by_meal();
        let bucket_total = bucket_sum(&buckets.morning)
            + bucket_sum(&buckets.lunch)
            + bucket_sum(&buckets.evening)
            + bucket_sum(&buckets.dinner);

        assert_eq!(ledger.totals().calories, bucket_total);

        // invariant holds after a removal too
        let victim = buckets.lunch[0].id;
        ledger.remove(victim);
        let buckets = ledger.by_meal();
        let bucket_total = bucket_sum(&buckets.morning)
            + bucket_sum(&buckets.lunch)
            + bucket_sum(&buckets.evening)
            + bucket_sum(&buckets.dinner);
        assert_eq!(ledger.totals().calories, bucket_total);
    }

    #[test]
    fn test_each_entry_lands_in_exactly_one_bucket() {
        let mut ledger = EntryLedger::new();
        for meal in [Meal::Morning, Meal::Lunch, Meal::Evening, Meal::Dinner] {
            ledger.add(entry(meal, 100.0, None));
        }

        let buckets = ledger.by_meal();
        let count = buckets.morning.len()
            + buckets.lunch.len()
            + buckets.evening.len()
            + buckets.dinner.len();
        assert_eq!(count, ledger.entries().len());
    }

    // ── mutation ─────────────────────────────────────────────────────────

    #[test]
    fn test_remove_unknown_id_is_a_no_op() {
        let mut ledger = EntryLedger::new();
        ledger.add(entry(Meal::Morning, 100.0, None));

        assert!(!ledger.remove(Uuid::new_v4()));
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.totals().calories, 100.0);
    }

    #[test]
    fn test_add_then_remove_round_trips() {
        let mut ledger = EntryLedger::new();
        ledger.add(entry(Meal::Morning, 100.0, Some(5.0)));
        let before = ledger.totals();

        let extra = entry(Meal::Dinner, 50.0, None);
        let extra_id = extra.id;
        ledger.add(extra);
        assert!(ledger.remove(extra_id));

        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.totals(), before);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut ledger = EntryLedger::new();
        let first = entry(Meal::Dinner, 1.0, None);
        let second = entry(Meal::Morning, 2.0, None);
        ledger.add(first.clone());
        ledger.add(second.clone());

        let ids: Vec<Uuid> = ledger.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    // ── shared handle & events ───────────────────────────────────────────

    #[tokio::test]
    async fn test_shared_ledger_publishes_typed_events() {
        let (tx, _) = broadcast::channel(16);
        let ledger = SharedLedger::new(tx);
        let mut rx = ledger.subscribe();

        let e = entry(Meal::Lunch, 250.0, None);
        let id = e.id;
        ledger.add(e).await;
        assert_eq!(rx.recv().await.unwrap(), LedgerEvent::EntryAdded(id));

        ledger.remove(id).await;
        assert_eq!(rx.recv().await.unwrap(), LedgerEvent::EntryRemoved(id));
    }

    #[tokio::test]
    async fn test_shared_ledger_no_event_for_unknown_removal() {
        let (tx, _) = broadcast::channel(16);
        let ledger = SharedLedger::new(tx);
        let mut rx = ledger.subscribe();

        assert!(!ledger.remove(Uuid::new_v4()).await);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_snapshot_views_agree() {
        let (tx, _) = broadcast::channel(16);
        let ledger = SharedLedger::new(tx);
        ledger.add(entry(Meal::Morning, 100.0, None)).await;
        ledger.add(entry(Meal::Dinner, 50.0, None)).await;

        let (entries, buckets, totals) = ledger.snapshot().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(totals.calories, 150.0);
        assert_eq!(
            bucket_sum(&buckets.morning) + bucket_sum(&buckets.dinner),
            totals.calories
        );
    }

    #[test]
    fn test_ledger_event_serializes_with_entry_id_payload() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(LedgerEvent::EntryRemoved(id)).unwrap();
        assert_eq!(json["type"], "entry_removed");
        assert_eq!(json["entryId"], id.to_string());
    }
}
