use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use super::GlobalArgs;
use crate::config::Config;
use crate::core::strong_types::{DayRange, ListingId, Point};
use crate::domains::MarketplaceService;
use crate::error::AppResult;
use crate::infrastructure::SqliteDatabase;
use crate::output::Output;

#[derive(Parser, Debug)]
#[command(
    name = "rentals",
    version,
    about = "Rental listings marketplace: users, listings, geo search, reservations and ratings"
)]
pub struct RentalsCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: RentalsCommand,
}

#[derive(Subcommand, Debug, Clone)]
#[command(rename_all = "lower")]
pub enum RentalsCommand {
    /// Create the database and load the schema
    Create,
    /// Register a user
    AddUser { email: String, name: String },
    /// Create a listing at coordinates X Y
    AddListing {
        username: String,
        title: String,
        description: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Listings strictly within RADIUS of X Y, nearest first
    Search {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        /// Search radius [default: STAYFEED_SEARCH_RADIUS or 10]
        #[arg(allow_negative_numbers = true)]
        radius: Option<f64>,
    },
    /// Every listing ordered by distance from X Y
    SearchAll {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Listings free from DAY1 to DAY2 (inclusive), nearest to X Y first
    SearchDay {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        day1: i64,
        day2: i64,
    },
    /// Listings owned by a user
    UserListings { username: String },
    /// Delete a listing you own
    Delete { username: String, listingid: ListingId },
    /// Reserve a listing from DAY1 to DAY2 (inclusive)
    Reserve {
        username: String,
        listingid: ListingId,
        day1: i64,
        day2: i64,
    },
    /// Reservations held by a user
    UserReservations { username: String },
    /// Reservations on a listing
    ListingReservations { listingid: ListingId },
    /// Who has reserved a listing you own
    SeeWhosReserved { username: String, listingid: ListingId },
    /// Cancel your reservations on a listing
    Cancel { username: String, listingid: ListingId },
    /// Rate a listing
    Rate {
        username: String,
        listingid: ListingId,
        #[arg(allow_negative_numbers = true)]
        rating: i64,
        comment: String,
    },
    /// Ratings on a listing
    ListingRating { listingid: ListingId },
    /// Listings booked by users with similar reservations, free from DAY1 to DAY2
    RecommendedListings {
        username: String,
        day1: i64,
        day2: i64,
    },
}

pub async fn run(cli: RentalsCli) -> AppResult<()> {
    let config = cli.global.config()?;
    let output = cli.global.output();

    let db = if matches!(cli.command, RentalsCommand::Create) {
        Arc::new(SqliteDatabase::create(&config).await?)
    } else {
        Arc::new(SqliteDatabase::open(&config).await?)
    };
    let service = MarketplaceService::new(db.clone());
    let result = dispatch(&service, &config, &output, cli.command).await;
    db.close().await;
    result
}

async fn dispatch(
    service: &MarketplaceService,
    config: &Config,
    output: &Output,
    command: RentalsCommand,
) -> AppResult<()> {
    info!(?command, "rentals command");
    match command {
        RentalsCommand::Create => output.status(
            &format!(
                "Database created successfully at {}",
                config.database.path.display()
            ),
            None,
        ),
        RentalsCommand::AddUser { email, name } => {
            let id = service.database().insert_user(&name, &email).await?;
            output.status(
                &format!("Created user {} with email {}", name, email),
                Some(id.value()),
            )
        }
        RentalsCommand::AddListing {
            username,
            title,
            description,
            x,
            y,
        } => {
            let location = Point::new(x, y);
            let id = service
                .add_listing(&username, &title, &description, location)
                .await?;
            output.status(
                &format!("Created listing {:?} at {}", title, location),
                Some(id.value()),
            )
        }
        RentalsCommand::Search { x, y, radius } => {
            let origin = Point::new(x, y);
            let radius = radius.unwrap_or(config.search.default_radius);
            let rows = service.search_radius(origin, radius).await?;
            output.records(
                &format!(
                    "Found {} listings within radius: {} from location: {} {}",
                    rows.len(),
                    radius,
                    x,
                    y
                ),
                &rows,
            )
        }
        RentalsCommand::SearchAll { x, y } => {
            let rows = service.search_all(Point::new(x, y)).await?;
            output.records(
                &format!("Found {} listings near location: {} {}", rows.len(), x, y),
                &rows,
            )
        }
        RentalsCommand::SearchDay { x, y, day1, day2 } => {
            let days = DayRange::new(day1, day2)?;
            let rows = service.search_available(Point::new(x, y), days).await?;
            output.records(
                &format!(
                    "Found {} listings available {} near location: {} {}",
                    rows.len(),
                    days,
                    x,
                    y
                ),
                &rows,
            )
        }
        RentalsCommand::UserListings { username } => {
            let rows = service.user_listings(&username).await?;
            output.records(
                &format!("Found {} listings for user: {}", rows.len(), username),
                &rows,
            )
        }
        RentalsCommand::Delete {
            username,
            listingid,
        } => {
            let message = if service.delete_listing(&username, listingid).await? {
                format!("Deleted listing with id: {} for user: {}", listingid, username)
            } else {
                format!("No listing found with id: {} for user: {}", listingid, username)
            };
            output.status(&message, None)
        }
        RentalsCommand::Reserve {
            username,
            listingid,
            day1,
            day2,
        } => {
            let days = DayRange::new(day1, day2)?;
            let id = service.reserve(&username, listingid, days).await?;
            output.status(
                &format!(
                    "Reserved listing {} for user {} from {} to {}",
                    listingid, username, days.start, days.end
                ),
                Some(id.value()),
            )
        }
        RentalsCommand::UserReservations { username } => {
            let rows = service.user_reservations(&username).await?;
            output.records(
                &format!("Found {} reservations for user: {}", rows.len(), username),
                &rows,
            )
        }
        RentalsCommand::ListingReservations { listingid } => {
            let rows = service.listing_reservations(listingid).await?;
            output.records(
                &format!("Found {} reservations for listing: {}", rows.len(), listingid),
                &rows,
            )
        }
        RentalsCommand::SeeWhosReserved {
            username,
            listingid,
        } => {
            let rows = service.reservations_for_owner(&username, listingid).await?;
            output.records(
                &format!(
                    "Found {} reservations on listing {} owned by {}",
                    rows.len(),
                    listingid,
                    username
                ),
                &rows,
            )
        }
        RentalsCommand::Cancel {
            username,
            listingid,
        } => {
            let removed = service.cancel(&username, listingid).await?;
            let message = if removed == 0 {
                format!(
                    "No reservation found for listing: {} for user: {}",
                    listingid, username
                )
            } else {
                format!(
                    "Canceled {} reservation(s) for listing: {} for user: {}",
                    removed, listingid, username
                )
            };
            output.status(&message, None)
        }
        RentalsCommand::Rate {
            username,
            listingid,
            rating,
            comment,
        } => {
            let id = service.rate(&username, listingid, rating, &comment).await?;
            output.status(
                &format!(
                    "Rated listing {} with {} for user {}",
                    listingid, rating, username
                ),
                Some(id.value()),
            )
        }
        RentalsCommand::ListingRating { listingid } => {
            let summary = service.listing_ratings(listingid).await?;
            if output.is_json() {
                return output.json_value(&summary);
            }
            let average = summary
                .average
                .map(|avg| format!("{:.2}", avg))
                .unwrap_or_else(|| "unrated".to_string());
            output.records(
                &format!(
                    "Found {} ratings for listing: {} (average: {})",
                    summary.ratings.len(),
                    listingid,
                    average
                ),
                &summary.ratings,
            )
        }
        RentalsCommand::RecommendedListings {
            username,
            day1,
            day2,
        } => {
            let days = DayRange::new(day1, day2)?;
            let rows = service.recommended_listings(&username, days).await?;
            output.records(
                &format!(
                    "Found {} recommended listings for {} available {}",
                    rows.len(),
                    username,
                    days
                ),
                &rows,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        RentalsCli::command().debug_assert();
    }

    #[test]
    fn subcommands_use_lowercase_names() {
        let cli = RentalsCli::try_parse_from(["rentals", "seewhosreserved", "alice", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            RentalsCommand::SeeWhosReserved { ref username, listingid }
                if username == "alice" && listingid == ListingId::new(3)
        ));
    }

    #[test]
    fn search_radius_is_optional_and_accepts_negatives() {
        let cli = RentalsCli::try_parse_from(["rentals", "search", "-1.5", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            RentalsCommand::Search { x, y, radius: None } if x == -1.5 && y == 2.0
        ));
    }

    #[test]
    fn negative_radius_reaches_validation() {
        let cli = RentalsCli::try_parse_from(["rentals", "search", "0", "0", "-5"]).unwrap();
        assert!(matches!(
            cli.command,
            RentalsCommand::Search { radius: Some(r), .. } if r == -5.0
        ));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = RentalsCli::try_parse_from([
            "rentals",
            "userlistings",
            "alice",
            "--json",
            "--database",
            "/tmp/store.db",
        ])
        .unwrap();
        assert!(cli.global.json);
        assert_eq!(
            cli.global.database.as_deref(),
            Some(std::path::Path::new("/tmp/store.db"))
        );
    }

    #[test]
    fn non_numeric_listing_id_is_rejected() {
        assert!(RentalsCli::try_parse_from(["rentals", "listingrating", "abc"]).is_err());
    }
}
