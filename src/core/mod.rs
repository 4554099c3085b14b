// Core types shared by both command surfaces

pub mod strong_types;

pub use strong_types::{
    AccountId, CommentId, DayRange, ListingId, Point, PostId, RatingId, ReservationId, UserId,
};
