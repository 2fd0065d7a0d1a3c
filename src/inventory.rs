//! The player's backpack: per-kind resource counts.

use bevy::prelude::*;

use crate::territory::tile::{ResourceBag, ResourceKind};

/// Resources carried by the player.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Backpack {
    counts: ResourceBag,
}

impl Backpack {
    /// A backpack pre-filled with the given stock.
    pub fn with_stock(stock: impl IntoIterator<Item = (ResourceKind, u32)>) -> Self {
        let mut backpack = Self::default();
        for (kind, amount) in stock {
            backpack.add(kind, amount);
        }
        backpack
    }

    /// Adds `amount` of `kind`, saturating at `u32::MAX`.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        if amount == 0 {
            return;
        }
        let count = self.counts.entry(kind).or_insert(0);
        *count = count.saturating_add(amount);
    }

    /// Amount of `kind` carried.
    pub fn count(&self, kind: ResourceKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// At least `amount` of `kind` carried.
    pub fn has(&self, kind: ResourceKind, amount: u32) -> bool {
        self.count(kind) >= amount
    }

    /// Every entry of `cost` is covered.
    pub fn has_all(&self, cost: &ResourceBag) -> bool {
        cost.iter().all(|(&kind, &amount)| self.has(kind, amount))
    }

    /// Removes `amount` of `kind` if enough is carried.
    pub fn try_spend(&mut self, kind: ResourceKind, amount: u32) -> bool {
        self.try_spend_all(&ResourceBag::from([(kind, amount)]))
    }

    /// Removes the whole `cost`, or nothing if any entry is short.
    pub fn try_spend_all(&mut self, cost: &ResourceBag) -> bool {
        if !self.has_all(cost) {
            return false;
        }
        for (&kind, &amount) in cost {
            if let Some(count) = self.counts.get_mut(&kind) {
                *count -= amount;
            }
        }
        true
    }

    /// Every kind with its count, zeros included, in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        ResourceKind::ALL.into_iter().map(|k| (k, self.count(k)))
    }
}
