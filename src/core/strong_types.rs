// Strong Types - newtypes for row ids, coordinates and day intervals
// Keeps a listing id from being passed where a user id is expected

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Declares an `INTEGER PRIMARY KEY` newtype that binds and decodes as `i64`.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $label:expr) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
        )]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self).map_err(|_| {
                    AppError::ValidationFailed(format!("{} must be an integer, got {:?}", $label, s))
                })
            }
        }
    };
}

row_id!(UserId, "user id");
row_id!(ListingId, "listing id");
row_id!(ReservationId, "reservation id");
row_id!(RatingId, "rating id");
row_id!(
    /// Social account id; distinct from the `UserId` the account belongs to
    AccountId,
    "account id"
);
row_id!(PostId, "post id");
row_id!(CommentId, "comment id");

/// A point on the listing plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance; what the radius predicate compares against `r²`.
    pub fn squared_distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.squared_distance_to(other).sqrt()
    }

    /// Strict containment: a listing exactly `radius` away is outside.
    pub fn within_radius(&self, other: &Point, radius: f64) -> bool {
        self.squared_distance_to(other) < radius * radius
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Closed day interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: i64,
    pub end: i64,
}

impl DayRange {
    pub fn new(start: i64, end: i64) -> AppResult<Self> {
        if start > end {
            return Err(AppError::ValidationFailed(format!(
                "day range must not end before it starts: {} > {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Touching endpoints count as overlapping.
    pub fn overlaps(&self, other: &DayRange) -> bool {
        !(other.end < self.start || other.start > self.end)
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_parsing() {
        assert_eq!("42".parse::<ListingId>().unwrap(), ListingId::new(42));
        assert_eq!(" 7 ".parse::<PostId>().unwrap().value(), 7);
        assert!(matches!(
            "seven".parse::<PostId>(),
            Err(AppError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_radius_is_strict() {
        let origin = Point::new(0.0, 0.0);
        assert!(origin.within_radius(&Point::new(3.0, 3.9), 5.0));
        assert!(!origin.within_radius(&Point::new(3.0, 4.0), 5.0));
        assert_eq!(origin.distance_to(&Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_overlap_is_boundary_inclusive() {
        let booked = DayRange::new(10, 20).unwrap();
        assert!(booked.overlaps(&DayRange::new(15, 25).unwrap()));
        assert!(booked.overlaps(&DayRange::new(20, 21).unwrap()));
        assert!(booked.overlaps(&DayRange::new(1, 10).unwrap()));
        assert!(booked.overlaps(&DayRange::new(12, 13).unwrap()));
        assert!(!booked.overlaps(&DayRange::new(21, 25).unwrap()));
        assert!(!booked.overlaps(&DayRange::new(1, 9).unwrap()));
    }

    #[test]
    fn test_reversed_range_rejected() {
        assert!(DayRange::new(5, 4).is_err());
        assert!(DayRange::new(5, 5).is_ok());
    }
}
