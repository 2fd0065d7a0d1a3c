//! Odd-q offset coordinates for the territory grid.
//!
//! Columns run along world X, every odd column is pushed half a cell along
//! world Z. All functions here are pure and free of ECS state.

use bevy::prelude::*;
use hexx::Hex;
use serde::{Deserialize, Serialize};

/// Column/row address of one grid cell in the odd-q offset layout.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize,
    Deserialize,
)]
pub struct HexCoord {
    /// Column.
    pub q: i32,
    /// Row.
    pub r: i32,
}

/// Neighbor offsets for odd columns.
const ODD_NEIGHBORS: [(i32, i32); 6] = [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (0, -1)];

/// Neighbor offsets for even columns.
const EVEN_NEIGHBORS: [(i32, i32); 6] = [(1, -1), (1, 0), (0, 1), (-1, 0), (-1, -1), (0, -1)];

impl HexCoord {
    /// The grid origin, always the starting tile of a procedural grid.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// Creates a coordinate from column and row.
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Whether this coordinate sits in an odd (shifted) column.
    pub fn is_odd_column(self) -> bool {
        is_odd_column(self.q)
    }

    /// The six adjacent coordinates, in a fixed parity-dependent order.
    pub fn neighbors(self) -> [HexCoord; 6] {
        let offsets = if self.is_odd_column() {
            ODD_NEIGHBORS
        } else {
            EVEN_NEIGHBORS
        };
        offsets.map(|(dq, dr)| HexCoord::new(self.q + dq, self.r + dr))
    }

    /// Cube coordinate as an axial [`Hex`] (`x = q`, `z = r - (q - (q & 1)) / 2`).
    pub fn to_cube(self) -> Hex {
        let x = self.q;
        let z = self.r - (self.q - (self.q & 1)) / 2;
        Hex::new(x, z)
    }

    /// Minimum number of hex steps between `self` and `other`.
    pub fn distance(self, other: HexCoord) -> u32 {
        self.to_cube().distance_to(other.to_cube()) as u32
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.q, self.r)
    }
}

/// Column parity via bitwise-and, so negative columns behave like positive ones.
pub fn is_odd_column(q: i32) -> bool {
    (q & 1) != 0
}

/// Hex-steps between two coordinates (cube distance).
pub fn hex_distance(a: HexCoord, b: HexCoord) -> u32 {
    a.distance(b)
}

/// World-space dimensions of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct HexMetrics {
    /// Center-to-corner radius.
    pub size: f32,
}

impl Default for HexMetrics {
    fn default() -> Self {
        Self { size: 5.0 }
    }
}

impl HexMetrics {
    /// Creates metrics for cells of the given center-to-corner radius.
    pub fn new(size: f32) -> Self {
        Self { size }
    }

    /// Corner-to-corner width along X.
    pub fn width(&self) -> f32 {
        self.size * 2.0
    }

    /// Edge-to-edge height along Z.
    pub fn height(&self) -> f32 {
        3.0_f32.sqrt() * self.size
    }

    fn column_spacing(&self) -> f32 {
        self.width() * 0.75
    }

    fn z_offset(&self, q: i32) -> f32 {
        if is_odd_column(q) {
            self.height() * 0.5
        } else {
            0.0
        }
    }

    /// Center of a cell on the flat `y = 0` plane.
    pub fn hex_to_world(&self, coord: HexCoord) -> Vec3 {
        let x = coord.q as f32 * self.column_spacing();
        let z = coord.r as f32 * self.height() + self.z_offset(coord.q);
        Vec3::new(x, 0.0, z)
    }

    /// Cell containing (approximately) a world position. `y` is ignored.
    pub fn world_to_hex(&self, pos: Vec3) -> HexCoord {
        let q = (pos.x / self.column_spacing()).round() as i32;
        let r = ((pos.z - self.z_offset(q)) / self.height()).round() as i32;
        HexCoord::new(q, r)
    }
}

/// Triangle indices for [`hex_fan_vertices`]: six triangles around vertex 0.
pub const HEX_FAN_INDICES: [u16; 18] = [0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 5, 0, 5, 6, 0, 6, 1];

/// Center vertex followed by six rim vertices at 60° steps, on the xz plane.
pub fn hex_fan_vertices(size: f32) -> [Vec3; 7] {
    std::array::from_fn(|i| {
        if i == 0 {
            Vec3::ZERO
        } else {
            let angle = (60.0 * (i - 1) as f32).to_radians();
            Vec3::new(size * angle.cos(), 0.0, size * angle.sin())
        }
    })
}
