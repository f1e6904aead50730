//! The four 90° sectors around a search center, and a small fixed-size map keyed by them.

use crate::types::point::Point;
use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the four geographic sectors around the estimation target.
///
/// Each quadrant carries a signed `(latitude, longitude)` pair which is used for adjacency
/// tests: two quadrants are diagonal when both signs differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quadrant {
    SouthWest,
    SouthEast,
    NorthEast,
    NorthWest,
}

impl Quadrant {
    /// All quadrants, in iteration order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::SouthWest,
        Quadrant::SouthEast,
        Quadrant::NorthEast,
        Quadrant::NorthWest,
    ];

    /// The `(latitude sign, longitude sign)` of the quadrant.
    pub fn signs(self) -> (i8, i8) {
        match self {
            Quadrant::SouthWest => (-1, -1),
            Quadrant::SouthEast => (-1, 1),
            Quadrant::NorthEast => (1, 1),
            Quadrant::NorthWest => (1, -1),
        }
    }

    /// Compass bearing (degrees, clockwise from north) where the quadrant's arc starts.
    /// The arc sweeps +90° from here.
    pub fn start_bearing(self) -> f64 {
        match self {
            Quadrant::NorthEast => 0.0,
            Quadrant::SouthEast => 90.0,
            Quadrant::SouthWest => 180.0,
            Quadrant::NorthWest => 270.0,
        }
    }

    /// Classifies `point` relative to `center`.
    ///
    /// Ties are resolved toward south and west, so every input maps to exactly one quadrant
    /// and the center itself is `SouthWest`.
    pub fn classify(center: &Point, point: &Point) -> Quadrant {
        let south = point.latitude <= center.latitude;
        if south && point.longitude <= center.longitude {
            Quadrant::SouthWest
        } else if south && point.longitude >= center.longitude {
            Quadrant::SouthEast
        } else if point.longitude >= center.longitude {
            Quadrant::NorthEast
        } else {
            Quadrant::NorthWest
        }
    }

    /// True when the two quadrants share neither axis (NE/SW, NW/SE).
    pub fn is_diagonal_to(self, other: Quadrant) -> bool {
        let (lat_a, lon_a) = self.signs();
        let (lat_b, lon_b) = other.signs();
        lat_a != lat_b && lon_a != lon_b
    }

    fn index(self) -> usize {
        match self {
            Quadrant::SouthWest => 0,
            Quadrant::SouthEast => 1,
            Quadrant::NorthEast => 2,
            Quadrant::NorthWest => 3,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quadrant::SouthWest => "SW",
            Quadrant::SouthEast => "SE",
            Quadrant::NorthEast => "NE",
            Quadrant::NorthWest => "NW",
        };
        f.write_str(name)
    }
}

/// A value for every quadrant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuadrantMap<T>([T; 4]);

impl<T> QuadrantMap<T> {
    pub fn from_fn(f: impl FnMut(Quadrant) -> T) -> Self {
        QuadrantMap(Quadrant::ALL.map(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Quadrant, &T)> {
        Quadrant::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }
}

impl<T> Index<Quadrant> for QuadrantMap<T> {
    type Output = T;

    fn index(&self, quadrant: Quadrant) -> &T {
        &self.0[quadrant.index()]
    }
}

impl<T> IndexMut<Quadrant> for QuadrantMap<T> {
    fn index_mut(&mut self, quadrant: Quadrant) -> &mut T {
        &mut self.0[quadrant.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_boundary_inclusive_toward_south_west() {
        let center = Point::new(0.0, 0.0);
        assert_eq!(Quadrant::classify(&center, &center), Quadrant::SouthWest);
        assert_eq!(
            Quadrant::classify(&center, &Point::new(1.0, -1.0)),
            Quadrant::NorthWest
        );
        assert_eq!(
            Quadrant::classify(&center, &Point::new(-1.0, 1.0)),
            Quadrant::SouthEast
        );
        assert_eq!(
            Quadrant::classify(&center, &Point::new(1.0, 1.0)),
            Quadrant::NorthEast
        );
        assert_eq!(
            Quadrant::classify(&center, &Point::new(-1.0, -1.0)),
            Quadrant::SouthWest
        );
        // Ties on a single axis.
        assert_eq!(
            Quadrant::classify(&center, &Point::new(0.0, 1.0)),
            Quadrant::SouthEast
        );
        assert_eq!(
            Quadrant::classify(&center, &Point::new(1.0, 0.0)),
            Quadrant::NorthEast
        );
    }

    #[test]
    fn test_diagonal_quadrants() {
        assert!(Quadrant::NorthEast.is_diagonal_to(Quadrant::SouthWest));
        assert!(Quadrant::NorthWest.is_diagonal_to(Quadrant::SouthEast));
        assert!(!Quadrant::NorthEast.is_diagonal_to(Quadrant::SouthEast));
        assert!(!Quadrant::NorthEast.is_diagonal_to(Quadrant::NorthWest));
        assert!(!Quadrant::SouthEast.is_diagonal_to(Quadrant::SouthWest));
    }

    #[test]
    fn test_quadrant_map_indexes_every_quadrant() {
        let mut map = QuadrantMap::from_fn(|_| 0u32);
        map[Quadrant::NorthWest] += 3;
        let collected: Vec<_> = map.iter().map(|(q, v)| (q, *v)).collect();
        assert_eq!(collected[3], (Quadrant::NorthWest, 3));
        assert_eq!(map.values().sum::<u32>(), 3);
    }
}
