//! # Plane Grid
//!
//! Geometry of the planning grid: the bidirectional mapping between
//! continuous 2D coordinates, discrete cell keys, and flat vertex
//! identifiers. The grid is unbounded, cells are square, and a coordinate
//! always maps to exactly one cell (nearest cell centre).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// Opaque identifier of one grid cell, stable for the lifetime of one terrain snapshot.
pub type Vertex = u64;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Offset applied to key axes when packing them into a [`Vertex`], so that negative keys map
/// into the unsigned identifier space.
const KEY_OFFSET: i64 = 1 << 31;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Discrete cell address, in cells relative to the grid origin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Key {
    pub x: i32,
    pub y: i32,
}

/// A uniform unbounded planar grid with a fixed cell resolution.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct PlaneGrid {
    resolution_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Key {
    /// Pack this key into a flat vertex identifier.
    ///
    /// The packing is bijective over the full i32 key range.
    pub fn to_vertex(self) -> Vertex {
        let x = (self.x as i64 + KEY_OFFSET) as u64;
        let y = (self.y as i64 + KEY_OFFSET) as u64;
        (y << 32) | x
    }

    /// Unpack a flat vertex identifier into its key.
    pub fn from_vertex(vertex: Vertex) -> Self {
        Self {
            x: ((vertex & 0xFFFF_FFFF) as i64 - KEY_OFFSET) as i32,
            y: ((vertex >> 32) as i64 - KEY_OFFSET) as i32,
        }
    }

    /// Return the key displaced by the given number of cells in each axis.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }
}

impl PlaneGrid {
    /// Create a new grid with the given cell resolution in meters per cell.
    pub fn new(resolution_m: f64) -> Self {
        Self { resolution_m }
    }

    /// The cell resolution in meters per cell.
    pub fn resolution_m(&self) -> f64 {
        self.resolution_m
    }

    /// Get the key of the cell containing the given coordinate.
    pub fn coord_to_key(&self, coord: &Point2<f64>) -> Key {
        Key {
            x: (coord.x / self.resolution_m).round() as i32,
            y: (coord.y / self.resolution_m).round() as i32,
        }
    }

    /// Get the vertex of the cell containing the given coordinate.
    pub fn coord_to_vertex(&self, coord: &Point2<f64>) -> Vertex {
        self.coord_to_key(coord).to_vertex()
    }

    /// Get the centre coordinate of the given cell.
    pub fn key_to_coord(&self, key: Key) -> Point2<f64> {
        Point2::new(key.x as f64 * self.resolution_m, key.y as f64 * self.resolution_m)
    }

    /// Get the centre coordinate of the given vertex's cell.
    pub fn vertex_to_coord(&self, vertex: Vertex) -> Point2<f64> {
        self.key_to_coord(Key::from_vertex(vertex))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
