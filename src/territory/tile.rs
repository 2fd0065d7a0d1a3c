//! Resource kinds, cost bags, and the per-hex unlock state.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::coords::HexCoord;

/// Gatherable and spendable resources.
///
/// The derive order fixes payment order: wood is always drained before stone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Chopped from trees.
    Wood,
    /// Mined from rocks.
    Stone,
    /// Mined from ore veins.
    IronOre,
    /// Currency.
    Coins,
    /// Rare currency.
    Gems,
}

impl ResourceKind {
    /// Every kind, in payment order.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::IronOre,
        ResourceKind::Coins,
        ResourceKind::Gems,
    ];

    /// Human-readable label for HUD text.
    pub fn display_name(self) -> &'static str {
        match self {
            ResourceKind::Wood => "Wood",
            ResourceKind::Stone => "Stone",
            ResourceKind::IronOre => "Iron Ore",
            ResourceKind::Coins => "Coins",
            ResourceKind::Gems => "Gems",
        }
    }
}

/// Amount per resource kind, iterated in [`ResourceKind`] order.
pub type ResourceBag = BTreeMap<ResourceKind, u32>;

/// Lifecycle of a tile. Only moves forward: `Locked` → `Unlocking` → `Unlocked`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum HexState {
    /// Not yet claimed.
    #[default]
    Locked,
    /// Payment in progress.
    Unlocking,
    /// Claimed; terminal.
    Unlocked,
}

/// Gameplay state of one grid cell: lock status, unlock cost, and payment so far.
#[derive(Debug, Clone, PartialEq)]
pub struct HexTile {
    /// Cell this tile occupies.
    pub coord: HexCoord,
    /// Current lifecycle state.
    pub state: HexState,
    /// Total required per resource kind.
    pub unlock_cost: ResourceBag,
    /// Paid so far per resource kind.
    pub paid_amount: ResourceBag,
}

impl HexTile {
    /// A locked tile with no cost.
    pub fn new(coord: HexCoord) -> Self {
        Self {
            coord,
            state: HexState::Locked,
            unlock_cost: ResourceBag::new(),
            paid_amount: ResourceBag::new(),
        }
    }

    /// A locked tile with the given cost.
    pub fn with_cost(coord: HexCoord, unlock_cost: ResourceBag) -> Self {
        Self {
            unlock_cost,
            ..Self::new(coord)
        }
    }

    /// Required amount of `kind` (0 if the tile does not ask for it).
    pub fn cost(&self, kind: ResourceKind) -> u32 {
        self.unlock_cost.get(&kind).copied().unwrap_or(0)
    }

    /// Paid amount of `kind`.
    pub fn paid(&self, kind: ResourceKind) -> u32 {
        self.paid_amount.get(&kind).copied().unwrap_or(0)
    }

    /// Still owed of `kind`, never negative.
    pub fn remaining(&self, kind: ResourceKind) -> u32 {
        self.cost(kind).saturating_sub(self.paid(kind))
    }

    /// Adds to the paid total. Unclamped; the grid bounds calls by [`Self::remaining`].
    pub fn add_payment(&mut self, kind: ResourceKind, amount: u32) {
        *self.paid_amount.entry(kind).or_insert(0) += amount;
    }

    /// True when every cost entry is covered. Vacuously true for a free tile.
    pub fn is_fully_paid(&self) -> bool {
        self.unlock_cost
            .iter()
            .all(|(&kind, &cost)| self.paid(kind) >= cost)
    }

    /// Fraction of the total cost paid, in `[0, 1]`; `1.0` for a free tile.
    pub fn progress(&self) -> f32 {
        let (total_cost, total_paid) = self
            .unlock_cost
            .iter()
            .fold((0u64, 0u64), |(cost_sum, paid_sum), (&kind, &cost)| {
                let paid = self.paid(kind).min(cost);
                (cost_sum + cost as u64, paid_sum + paid as u64)
            });
        if total_cost == 0 {
            return 1.0;
        }
        total_paid as f32 / total_cost as f32
    }

    /// Unlock cost as a step function of hex-distance from the origin.
    pub fn calculate_cost(distance: u32) -> ResourceBag {
        let mut cost = ResourceBag::new();
        match distance {
            0 => {}
            1 => {
                cost.insert(ResourceKind::Wood, 10);
            }
            2 => {
                cost.insert(ResourceKind::Wood, 15);
                cost.insert(ResourceKind::Stone, 5);
            }
            3 => {
                cost.insert(ResourceKind::Wood, 20);
                cost.insert(ResourceKind::Stone, 10);
            }
            d => {
                let extra = 5 * (d - 4);
                cost.insert(ResourceKind::Wood, 25 + extra);
                cost.insert(ResourceKind::Stone, 15 + extra);
            }
        }
        cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(cost: &[(ResourceKind, u32)]) -> HexTile {
        HexTile::with_cost(HexCoord::new(1, 0), cost.iter().copied().collect())
    }

    // ── queries ─────────────────────────────────────────────────────

    #[test]
    fn remaining_never_goes_negative() {
        let mut t = tile(&[(ResourceKind::Wood, 3)]);
        t.add_payment(ResourceKind::Wood, 5);
        assert_eq!(t.paid(ResourceKind::Wood), 5);
        assert_eq!(t.remaining(ResourceKind::Wood), 0);
    }

    #[test]
    fn unknown_kind_costs_nothing() {
        let t = tile(&[(ResourceKind::Wood, 3)]);
        assert_eq!(t.cost(ResourceKind::Gems), 0);
        assert_eq!(t.remaining(ResourceKind::Gems), 0);
    }

    #[test]
    fn free_tile_is_fully_paid() {
        let t = tile(&[]);
        assert!(t.is_fully_paid());
        assert_eq!(t.progress(), 1.0);
    }

    #[test]
    fn fully_paid_needs_every_kind() {
        let mut t = tile(&[(ResourceKind::Wood, 2), (ResourceKind::Stone, 1)]);
        t.add_payment(ResourceKind::Wood, 2);
        assert!(!t.is_fully_paid());
        t.add_payment(ResourceKind::Stone, 1);
        assert!(t.is_fully_paid());
    }

    #[test]
    fn progress_sums_across_kinds() {
        let mut t = tile(&[(ResourceKind::Wood, 15), (ResourceKind::Stone, 5)]);
        t.add_payment(ResourceKind::Wood, 5);
        assert!((t.progress() - 0.25).abs() < 1e-6);
        t.add_payment(ResourceKind::Stone, 5);
        assert!((t.progress() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn progress_ignores_overpayment() {
        let mut t = tile(&[(ResourceKind::Wood, 4), (ResourceKind::Stone, 4)]);
        t.add_payment(ResourceKind::Wood, 40);
        assert!((t.progress() - 0.5).abs() < 1e-6);
    }

    // ── cost table ──────────────────────────────────────────────────

    #[test]
    fn cost_table_steps() {
        assert!(HexTile::calculate_cost(0).is_empty());
        assert_eq!(
            HexTile::calculate_cost(1),
            ResourceBag::from([(ResourceKind::Wood, 10)])
        );
        assert_eq!(
            HexTile::calculate_cost(2),
            ResourceBag::from([(ResourceKind::Wood, 15), (ResourceKind::Stone, 5)])
        );
        assert_eq!(
            HexTile::calculate_cost(3),
            ResourceBag::from([(ResourceKind::Wood, 20), (ResourceKind::Stone, 10)])
        );
        assert_eq!(
            HexTile::calculate_cost(6),
            ResourceBag::from([(ResourceKind::Wood, 35), (ResourceKind::Stone, 25)])
        );
    }

    #[test]
    fn cost_total_is_non_decreasing() {
        let totals: Vec<u32> = (1..=30)
            .map(|d| HexTile::calculate_cost(d).values().sum())
            .collect();
        for w in totals.windows(2) {
            assert!(w[1] >= w[0], "cost must not drop with distance");
        }
    }

    #[test]
    fn payment_order_follows_kind_order() {
        let t = tile(&[(ResourceKind::Stone, 1), (ResourceKind::Wood, 1)]);
        let kinds: Vec<_> = t.unlock_cost.keys().copied().collect();
        assert_eq!(kinds, vec![ResourceKind::Wood, ResourceKind::Stone]);
    }
}
