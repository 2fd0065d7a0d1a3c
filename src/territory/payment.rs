//! Automatic payment: while the player stands near a payable tile, one unit of
//! resource moves from the backpack into that tile at a fixed rate.

use std::time::Duration;

use bevy::prelude::*;

use super::coords::HexCoord;
use super::grid::HexGrid;
use super::tile::HexState;
use crate::inventory::Backpack;
use crate::math::nearest_within;

/// Period between single-unit payments at `rate` payments per second.
pub fn payment_interval(rate: f64) -> Duration {
    let nanos = (1e9 / rate.max(1e-3)).round().max(1.0);
    Duration::from_nanos(nanos as u64)
}

/// Tracks the current payment target and the payment clock.
#[derive(Resource, Debug)]
pub struct PaymentController {
    detection_radius: f32,
    current_target: Option<HexCoord>,
    timer: Timer,
}

impl PaymentController {
    /// Pays `rate` units per second to tiles within `detection_radius` world units.
    pub fn new(rate: f64, detection_radius: f32) -> Self {
        Self {
            detection_radius,
            current_target: None,
            timer: Timer::new(payment_interval(rate), TimerMode::Repeating),
        }
    }

    /// Tile currently being paid, if any.
    pub fn current_target(&self) -> Option<HexCoord> {
        self.current_target
    }

    /// Nearest payable tile strictly within the detection radius.
    pub fn find_nearest_payable(&self, grid: &HexGrid, player_pos: Vec3) -> Option<HexCoord> {
        let candidates = grid
            .get_payable_tiles()
            .into_iter()
            .map(|c| (c, grid.hex_to_world(c)));
        nearest_within(player_pos, self.detection_radius, candidates)
    }

    /// Advances by `delta`: retargets, then makes one payment per elapsed period.
    ///
    /// Long frames are caught up exactly. Returns the number of payments made.
    pub fn tick(
        &mut self,
        delta: Duration,
        player_pos: Vec3,
        grid: &mut HexGrid,
        backpack: &mut Backpack,
    ) -> u32 {
        let nearest = self.find_nearest_payable(grid, player_pos);
        if nearest != self.current_target {
            self.set_target(nearest, grid);
        }
        let Some(target) = self.current_target else {
            return 0;
        };

        self.timer.tick(delta);
        let mut paid = 0;
        for _ in 0..self.timer.times_finished_this_tick() {
            if Self::pay_once(target, grid, backpack) {
                paid += 1;
            }
        }
        paid
    }

    fn set_target(&mut self, target: Option<HexCoord>, grid: &mut HexGrid) {
        if let Some(old) = self.current_target {
            grid.set_highlight(old, false);
        }
        self.current_target = target;
        self.timer.reset();

        let Some(coord) = target else {
            return;
        };
        if grid
            .get_tile(coord)
            .is_some_and(|t| t.state == HexState::Locked)
        {
            grid.start_unlocking(coord);
        }
        grid.set_highlight(coord, true);
        debug!("payment target is now {coord}");
    }

    /// Moves one unit of the first still-owed kind the backpack holds.
    fn pay_once(coord: HexCoord, grid: &mut HexGrid, backpack: &mut Backpack) -> bool {
        let Some(tile) = grid.get_tile(coord) else {
            return false;
        };
        if tile.state != HexState::Unlocking {
            return false;
        }
        let Some(kind) = tile
            .unlock_cost
            .keys()
            .copied()
            .find(|&k| tile.remaining(k) > 0 && backpack.has(k, 1))
        else {
            return false;
        };
        backpack.try_spend(kind, 1) && grid.add_payment(coord, kind, 1)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::territory::coords::HexMetrics;
    use crate::territory::grid::{NullVisuals, TerritoryEvent};
    use crate::territory::map_data::{HexMapData, HexSaveData, InitialState};
    use crate::territory::tile::ResourceKind;

    fn procedural() -> HexGrid {
        let mut grid = HexGrid::new(HexMetrics::default(), NullVisuals);
        grid.generate(2, None);
        grid
    }

    /// Origin unlocked, (1,0) costing 100 wood.
    fn expensive_neighbor() -> HexGrid {
        let mut target = HexSaveData::new(HexCoord::new(1, 0));
        target.wood_cost = 100;
        let origin = HexSaveData {
            initial_state: InitialState::Unlocked,
            ..HexSaveData::new(HexCoord::ORIGIN)
        };
        let mut grid = HexGrid::new(HexMetrics::default(), NullVisuals);
        grid.load_from_data(&HexMapData {
            hexes: vec![origin, target],
        });
        grid
    }

    fn wood(n: u32) -> Backpack {
        Backpack::with_stock([(ResourceKind::Wood, n)])
    }

    #[test]
    fn interval_from_rate() {
        assert_eq!(payment_interval(5.0), Duration::from_millis(200));
        assert_eq!(payment_interval(1.0), Duration::from_secs(1));
        assert!(payment_interval(0.0) > Duration::from_secs(60));
    }

    #[test]
    fn pays_at_rate_and_unlocks() {
        let mut grid = procedural();
        let target = HexCoord::new(1, 0);
        let pos = grid.hex_to_world(target);
        let mut backpack = wood(100);
        let mut ctl = PaymentController::new(5.0, 6.0);

        let unlocked = Arc::new(Mutex::new(0));
        let counter = unlocked.clone();
        grid.subscribe(move |e| {
            if matches!(e, TerritoryEvent::Unlocked(_)) {
                *counter.lock().unwrap() += 1;
            }
        });

        assert_eq!(ctl.tick(Duration::from_secs(1), pos, &mut grid, &mut backpack), 5);
        assert_eq!(ctl.current_target(), Some(target));
        assert_eq!(grid.get_tile(target).unwrap().state, HexState::Unlocking);
        assert!(grid.get_visual(target).unwrap().highlighted);

        assert_eq!(ctl.tick(Duration::from_secs(1), pos, &mut grid, &mut backpack), 5);
        assert_eq!(grid.get_tile(target).unwrap().state, HexState::Unlocked);
        assert_eq!(backpack.count(ResourceKind::Wood), 90);

        // The unlocked tile is no longer payable; the next tick retargets.
        ctl.tick(Duration::from_millis(10), pos, &mut grid, &mut backpack);
        assert_ne!(ctl.current_target(), Some(target));
        assert!(!grid.get_visual(target).unwrap().highlighted);
        assert_eq!(*unlocked.lock().unwrap(), 1);
    }

    #[test]
    fn uneven_frames_catch_up_exactly() {
        let mut grid = expensive_neighbor();
        let target = HexCoord::new(1, 0);
        let pos = grid.hex_to_world(target);
        let mut backpack = wood(1000);
        let mut ctl = PaymentController::new(5.0, 6.0);

        let frames = [16, 17, 16, 951, 500, 250, 250];
        let paid: u32 = frames
            .iter()
            .map(|ms| ctl.tick(Duration::from_millis(*ms), pos, &mut grid, &mut backpack))
            .sum();
        assert_eq!(paid, 10);
        assert_eq!(grid.get_tile(target).unwrap().paid(ResourceKind::Wood), 10);
    }

    #[test]
    fn never_pays_past_cost() {
        let mut grid = procedural();
        let target = HexCoord::new(1, 0);
        let pos = grid.hex_to_world(target);
        let mut backpack = wood(1000);
        let mut ctl = PaymentController::new(50.0, 1.0);
        for _ in 0..20 {
            ctl.tick(Duration::from_secs(3), pos, &mut grid, &mut backpack);
        }
        let tile = grid.get_tile(target).unwrap();
        assert_eq!(tile.state, HexState::Unlocked);
        assert_eq!(tile.paid(ResourceKind::Wood), 10);
        assert_eq!(backpack.count(ResourceKind::Wood), 990);
    }

    #[test]
    fn empty_backpack_pays_nothing() {
        let mut grid = procedural();
        let target = HexCoord::new(1, 0);
        let pos = grid.hex_to_world(target);
        let mut backpack = Backpack::default();
        let mut ctl = PaymentController::new(5.0, 6.0);
        assert_eq!(ctl.tick(Duration::from_secs(5), pos, &mut grid, &mut backpack), 0);
        let tile = grid.get_tile(target).unwrap();
        assert_eq!(tile.state, HexState::Unlocking);
        assert_eq!(tile.paid(ResourceKind::Wood), 0);
    }

    #[test]
    fn wood_is_paid_before_stone() {
        let mut grid = procedural();
        let mut backpack =
            Backpack::with_stock([(ResourceKind::Wood, 100), (ResourceKind::Stone, 100)]);
        let mut ctl = PaymentController::new(1.0, 1.0);

        let first = HexCoord::new(1, 0);
        let pos = grid.hex_to_world(first);
        ctl.tick(Duration::from_secs(10), pos, &mut grid, &mut backpack);

        // (2,0) is two steps out: 15 wood then 5 stone.
        let outer = HexCoord::new(2, 0);
        let pos = grid.hex_to_world(outer);
        ctl.tick(Duration::ZERO, pos, &mut grid, &mut backpack);
        assert_eq!(ctl.current_target(), Some(outer));
        ctl.tick(Duration::from_secs(16), pos, &mut grid, &mut backpack);
        let tile = grid.get_tile(outer).unwrap();
        assert_eq!(tile.paid(ResourceKind::Wood), 15);
        assert_eq!(tile.paid(ResourceKind::Stone), 1);
        ctl.tick(Duration::from_secs(4), pos, &mut grid, &mut backpack);
        assert_eq!(grid.get_tile(outer).unwrap().state, HexState::Unlocked);
    }

    #[test]
    fn out_of_range_has_no_target() {
        let mut grid = procedural();
        let mut backpack = wood(10);
        let mut ctl = PaymentController::new(5.0, 6.0);
        let far = Vec3::new(500.0, 0.0, 500.0);
        assert_eq!(ctl.tick(Duration::from_secs(2), far, &mut grid, &mut backpack), 0);
        assert_eq!(ctl.current_target(), None);
        assert_eq!(backpack.count(ResourceKind::Wood), 10);
    }

    #[test]
    fn walking_away_keeps_partial_payment() {
        let mut grid = expensive_neighbor();
        let target = HexCoord::new(1, 0);
        let pos = grid.hex_to_world(target);
        let mut backpack = wood(50);
        let mut ctl = PaymentController::new(5.0, 6.0);
        ctl.tick(Duration::from_secs(1), pos, &mut grid, &mut backpack);
        ctl.tick(Duration::ZERO, Vec3::splat(900.0), &mut grid, &mut backpack);
        assert_eq!(ctl.current_target(), None);
        let tile = grid.get_tile(target).unwrap();
        assert_eq!(tile.state, HexState::Unlocking);
        assert_eq!(tile.paid(ResourceKind::Wood), 5);
        assert!(!grid.get_visual(target).unwrap().highlighted);
    }
}
