use std::{
    collections::{HashMap, HashSet},
    fmt,
    rc::Rc,
};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    ItemName,
    catalog::{Capability, ItemCatalog},
};

/// Notifications published by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// An item was reported; fired on every report.
    Collected { item: ItemName, count: u32 },
    /// A capability latched for the first time this session.
    CapabilityUnlocked(Capability),
}

/// Callback registered with [`CollectionLedger::subscribe`].
pub type LedgerListener = Box<dyn FnMut(&LedgerEvent)>;

/// What a single report changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    /// Count for the item after the report.
    pub count: u32,
    /// Set when this report unlocked a capability.
    pub unlocked: Option<Capability>,
    /// False when the item is not in the catalog.
    pub known: bool,
}

/// Collected versus required totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub collected: u32,
    pub required: u32,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collected, self.required)
    }
}

/// One-way set of unlocked capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityLatch {
    unlocked: HashSet<Capability>,
}

impl CapabilityLatch {
    /// Latches `capability`; returns true only the first time.
    pub fn latch(&mut self, capability: Capability) -> bool {
        self.unlocked.insert(capability)
    }

    pub fn is_unlocked(&self, capability: &Capability) -> bool {
        self.unlocked.contains(capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.unlocked.iter()
    }

    fn reset(&mut self) {
        self.unlocked.clear();
    }
}

/// Authoritative count of what the player has collected this session.
///
/// Counts only ever go up until [`reset`](Self::reset), which is reserved
/// for restarting the session.
pub struct CollectionLedger {
    catalog: Rc<ItemCatalog>,
    counts: HashMap<ItemName, u32>,
    latch: CapabilityLatch,
    listeners: Vec<LedgerListener>,
}

impl CollectionLedger {
    pub fn new(catalog: Rc<ItemCatalog>) -> Self {
        CollectionLedger {
            catalog,
            counts: HashMap::new(),
            latch: CapabilityLatch::default(),
            listeners: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Registers a listener for every future ledger event.
    pub fn subscribe(&mut self, listener: LedgerListener) {
        self.listeners.push(listener);
    }

    /// Records one more copy of `item`.
    ///
    /// Unknown names are counted and logged; they never count toward
    /// progress.
    pub fn report(&mut self, item: &str) -> ReportOutcome {
        let known = self.catalog.contains(item);
        if !known {
            warn!("Reported item '{}' is not in the catalog", item);
        }

        let count = {
            let entry = self.counts.entry(item.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };
        info!(
            "Collected: {} ({}/{})",
            self.catalog.display_name(item),
            count,
            self.required(item)
        );

        let unlocked = self.check_unlock(item, count);
        self.publish(&LedgerEvent::Collected {
            item: item.to_string(),
            count,
        });
        if let Some(capability) = &unlocked {
            self.publish(&LedgerEvent::CapabilityUnlocked(capability.clone()));
        }

        ReportOutcome {
            count,
            unlocked,
            known,
        }
    }

    fn check_unlock(&mut self, item: &str, count: u32) -> Option<Capability> {
        let definition = self.catalog.get(item)?;
        if count < definition.required_amount {
            return None;
        }
        let capability = definition.capability()?;
        if self.latch.latch(capability.clone()) {
            info!("Unlocked capability: {}", capability);
            Some(capability)
        } else {
            None
        }
    }

    fn publish(&mut self, event: &LedgerEvent) {
        for listener in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn count(&self, item: &str) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    fn required(&self, item: &str) -> u32 {
        self.catalog
            .get(item)
            .map(|definition| definition.required_amount)
            .unwrap_or(0)
    }

    /// Sum of counts over catalog items.
    pub fn total_collected(&self) -> u32 {
        self.catalog.iter().map(|item| self.count(&item.name)).sum()
    }

    /// Over-collection counts as complete. Unknown items never are.
    pub fn is_complete(&self, item: &str) -> bool {
        match self.catalog.get(item) {
            Some(definition) => self.count(item) >= definition.required_amount,
            None => false,
        }
    }

    pub fn all_complete(&self) -> bool {
        self.catalog.iter().all(|item| self.is_complete(&item.name))
    }

    /// Display names of incomplete items, in catalog order.
    pub fn missing_items(&self) -> Vec<String> {
        self.catalog
            .iter()
            .filter(|item| !self.is_complete(&item.name))
            .map(|item| item.display_name.clone())
            .collect()
    }

    pub fn has_item(&self, item: &str, amount: u32) -> bool {
        self.count(item) >= amount.max(1)
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.latch.is_unlocked(capability)
    }

    pub fn capabilities(&self) -> &CapabilityLatch {
        &self.latch
    }

    /// Collected total, capped per item at its requirement, against the
    /// catalog's total requirement.
    pub fn progress(&self) -> Progress {
        let collected = self
            .catalog
            .iter()
            .map(|item| self.count(&item.name).min(item.required_amount))
            .sum();
        Progress {
            collected,
            required: self.catalog.total_required(),
        }
    }

    /// Empties counts and the capability latch. Listeners stay registered.
    pub fn reset(&mut self) {
        self.counts.clear();
        self.latch.reset();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::catalog::{ItemCategory, ItemFunction, ItemTypeDefinition};

    fn ledger() -> CollectionLedger {
        let catalog = ItemCatalog::new(vec![
            ItemTypeDefinition::new("LifeboatKey", 1, ItemCategory::Key, ItemFunction::Escape)
                .with_display_name("Lifeboat Key"),
            ItemTypeDefinition::new("GoldCoin", 3, ItemCategory::Treasure, ItemFunction::Currency)
                .with_display_name("Gold Coin"),
            ItemTypeDefinition::new("Cutlass", 2, ItemCategory::Weapon, ItemFunction::DefendSelf),
        ])
        .unwrap();
        CollectionLedger::new(Rc::new(catalog))
    }

    #[test]
    fn counts_and_totals_agree() {
        let mut ledger = ledger();
        for item in ["GoldCoin", "GoldCoin", "LifeboatKey", "Cutlass", "GoldCoin", "GoldCoin"] {
            ledger.report(item);
        }
        let sum: u32 = ["LifeboatKey", "GoldCoin", "Cutlass"]
            .iter()
            .map(|item| ledger.count(item))
            .sum();
        assert_eq!(sum, ledger.total_collected());
        assert_eq!(ledger.count("GoldCoin"), 4);
        assert!(ledger.is_complete("GoldCoin"));
        assert!(!ledger.all_complete());
        assert_eq!(ledger.missing_items(), vec!["Cutlass".to_string()]);
        assert_eq!(ledger.progress(), Progress { collected: 5, required: 6 });
    }

    #[test]
    fn unknown_items_are_tolerated() {
        let mut ledger = ledger();
        let outcome = ledger.report("Parrot");
        assert!(!outcome.known);
        assert_eq!(ledger.count("Parrot"), 1);
        assert!(!ledger.is_complete("Parrot"));
        assert_eq!(ledger.total_collected(), 0);
    }

    #[test]
    fn capability_latches_once() {
        let mut ledger = ledger();
        let unlocks = Rc::new(Cell::new(0));
        let seen = Rc::clone(&unlocks);
        ledger.subscribe(Box::new(move |event| {
            if matches!(event, LedgerEvent::CapabilityUnlocked(_)) {
                seen.set(seen.get() + 1);
            }
        }));

        assert_eq!(ledger.report("Cutlass").unlocked, None);
        assert_eq!(ledger.report("Cutlass").unlocked, Some(Capability::CanDefend));
        for _ in 0..2 {
            assert_eq!(ledger.report("Cutlass").unlocked, None);
        }
        assert_eq!(unlocks.get(), 1);
        assert!(ledger.has_capability(&Capability::CanDefend));
        assert!(!ledger.has_capability(&Capability::CanEscape));
    }

    #[test]
    fn every_report_notifies() {
        let mut ledger = ledger();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        ledger.subscribe(Box::new(move |event| sink.borrow_mut().push(event.clone())));

        ledger.report("LifeboatKey");
        ledger.report("Hat");
        assert_eq!(
            *events.borrow(),
            vec![
                LedgerEvent::Collected {
                    item: "LifeboatKey".into(),
                    count: 1
                },
                LedgerEvent::CapabilityUnlocked(Capability::CanEscape),
                LedgerEvent::Collected {
                    item: "Hat".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn reset_clears_counts_and_latch() {
        let mut ledger = ledger();
        ledger.report("LifeboatKey");
        ledger.reset();
        assert_eq!(ledger.total_collected(), 0);
        assert!(!ledger.has_capability(&Capability::CanEscape));
        assert_eq!(
            ledger.report("LifeboatKey").unlocked,
            Some(Capability::CanEscape)
        );
    }
}
