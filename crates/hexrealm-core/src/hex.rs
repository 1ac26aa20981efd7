//! Axial hex-grid geometry
//!
//! Coordinates are axial `(q, r)` with the implicit cube coordinate
//! `s = -q - r`. A map of radius `n` is the hexagon of every coordinate whose
//! largest cube component is at most `n`; it holds `3n² + 3n + 1` cells.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axial offsets of the six neighbors, in clockwise order starting east
pub const DIRECTIONS: [Hex; 6] = [
    Hex::new(1, 0),
    Hex::new(1, -1),
    Hex::new(0, -1),
    Hex::new(-1, 0),
    Hex::new(-1, 1),
    Hex::new(0, 1),
];

/// An axial hex coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    /// The map center, where every game's starting town sits
    pub const ORIGIN: Hex = Hex::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube coordinate
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Number of steps from the origin
    pub fn length(&self) -> u32 {
        self.q
            .unsigned_abs()
            .max(self.r.unsigned_abs())
            .max(self.s().unsigned_abs())
    }

    /// Hex distance: `(|Δq| + |Δr| + |Δs|) / 2`
    pub fn distance(&self, other: Hex) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        (dq + dr + ds) / 2
    }

    /// All six adjacent coordinates, unfiltered
    pub fn neighbors(&self) -> impl Iterator<Item = Hex> + '_ {
        DIRECTIONS.iter().map(move |d| *self + *d)
    }

    pub fn is_adjacent(&self, other: Hex) -> bool {
        self.distance(other) == 1
    }
}

impl std::ops::Add for Hex {
    type Output = Hex;

    fn add(self, rhs: Hex) -> Hex {
        Hex::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl std::ops::Sub for Hex {
    type Output = Hex;

    fn sub(self, rhs: Hex) -> Hex {
        Hex::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

impl From<(i32, i32)> for Hex {
    fn from((q, r): (i32, i32)) -> Self {
        Hex::new(q, r)
    }
}

/// Lazy iterator over every coordinate within a distance of a center
///
/// Walks columns `q` from `-radius` to `radius`, and for each column the rows
/// that keep `|s|` in bounds. Cloning restarts from the same position.
#[derive(Debug, Clone)]
pub struct HexRange {
    center: Hex,
    radius: i32,
    q: i32,
    r: i32,
}

impl HexRange {
    fn new(center: Hex, radius: u32) -> Self {
        let radius = radius as i32;
        Self {
            center,
            radius,
            q: -radius,
            r: row_start(-radius, radius),
        }
    }
}

fn row_start(q: i32, radius: i32) -> i32 {
    (-radius).max(-q - radius)
}

fn row_end(q: i32, radius: i32) -> i32 {
    radius.min(-q + radius)
}

impl Iterator for HexRange {
    type Item = Hex;

    fn next(&mut self) -> Option<Hex> {
        if self.q > self.radius {
            return None;
        }
        let hex = self.center + Hex::new(self.q, self.r);
        if self.r < row_end(self.q, self.radius) {
            self.r += 1;
        } else {
            self.q += 1;
            self.r = row_start(self.q, self.radius);
        }
        Some(hex)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.q > self.radius {
            return (0, Some(0));
        }
        let mut remaining = (row_end(self.q, self.radius) - self.r + 1) as usize;
        for q in (self.q + 1)..=self.radius {
            remaining += (row_end(q, self.radius) - row_start(q, self.radius) + 1) as usize;
        }
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HexRange {}

/// Every coordinate of a map with the given radius, centered on the origin
pub fn coordinates_in_radius(radius: u32) -> HexRange {
    HexRange::new(Hex::ORIGIN, radius)
}

/// Number of cells in a map of the given radius
pub fn cell_count(radius: u32) -> usize {
    let n = radius as usize;
    3 * n * n + 3 * n + 1
}

/// A bounded hexagonal map centered on the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexGrid {
    radius: u32,
}

impl HexGrid {
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        cell_count(self.radius)
    }

    /// A grid always contains at least the origin
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, hex: Hex) -> bool {
        hex.length() <= self.radius
    }

    pub fn coordinates(&self) -> HexRange {
        coordinates_in_radius(self.radius)
    }

    /// Neighbors of `hex` that lie on this map; there is no wraparound
    pub fn neighbors(&self, hex: Hex) -> impl Iterator<Item = Hex> + '_ {
        DIRECTIONS
            .iter()
            .map(move |d| hex + *d)
            .filter(move |n| self.contains(*n))
    }

    /// Coordinates on this map within `distance` of `center`
    pub fn range(&self, center: Hex, distance: u32) -> impl Iterator<Item = Hex> + '_ {
        HexRange::new(center, distance).filter(move |h| self.contains(*h))
    }

    /// Coordinates on this map at exactly `distance` from `center`
    pub fn ring(&self, center: Hex, distance: u32) -> impl Iterator<Item = Hex> + '_ {
        self.range(center, distance)
            .filter(move |h| center.distance(*h) == distance)
    }
}
