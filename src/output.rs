//! Line-oriented text and JSON rendering for command results.
//!
//! Text mode prints a heading followed by one indented `Key: value` block per
//! row. JSON mode prints the rows as a pretty JSON array, and status lines as
//! `{"status": "ok", "message": ..., "id": ...}` objects.

use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::{
    format_timestamp, Account, FeedItem, Listing, ListingMatch, Post, Rating, Recommendation,
    Reservation,
};

/// Rows that know how to lay themselves out as labelled text lines.
pub trait TextRecord {
    fn fields(&self) -> Vec<(&'static str, String)>;
}

fn rating_text(avg: Option<f64>) -> String {
    match avg {
        Some(avg) => format!("{:.2}", avg),
        None => "unrated".to_string(),
    }
}

impl TextRecord for ListingMatch {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Id", self.id.to_string()),
            ("Title", self.title.clone()),
            ("Description", self.description.clone()),
            ("Owner", self.owner_name.clone()),
            ("xCoordinate", self.x.to_string()),
            ("yCoordinate", self.y.to_string()),
            ("Distance", format!("{:.3}", self.distance)),
            ("Rating", rating_text(self.avg_rating)),
        ]
    }
}

impl TextRecord for Listing {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Id", self.id.to_string()),
            ("Title", self.title.clone()),
            ("Description", self.description.clone()),
            ("xCoordinate", self.x.to_string()),
            ("yCoordinate", self.y.to_string()),
        ]
    }
}

impl TextRecord for Reservation {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Id", self.id.to_string()),
            ("User", format!("{} ({})", self.user_name, self.user_id)),
            ("Listing", format!("{} ({})", self.listing_title, self.listing_id)),
            ("Day1", self.day1.to_string()),
            ("Day2", self.day2.to_string()),
        ]
    }
}

impl TextRecord for Rating {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Id", self.id.to_string()),
            ("User", format!("{} ({})", self.user_name, self.user_id)),
            ("Rating", self.rating.to_string()),
            ("Comment", self.comment.clone()),
        ]
    }
}

impl TextRecord for Recommendation {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Id", self.id.to_string()),
            ("Title", self.title.clone()),
            ("Description", self.description.clone()),
            ("Score", self.score.to_string()),
            ("Rating", rating_text(self.avg_rating)),
        ]
    }
}

impl TextRecord for Account {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("UserName", self.user_name.clone()),
            ("AccountId", self.id.to_string()),
        ]
    }
}

impl TextRecord for Post {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Id", self.id.to_string()),
            ("Title", self.title.clone()),
            ("TextBody", self.text_body.clone()),
            ("Date", format_timestamp(self.created)),
            ("Likes", self.likes.to_string()),
            ("Comments", self.comments.to_string()),
        ]
    }
}

impl TextRecord for FeedItem {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("UserName", self.poster_name.clone()),
            ("Id", self.id.to_string()),
            ("Title", self.title.clone()),
            ("TextBody", self.text_body.clone()),
            ("Date", format_timestamp(self.created)),
            ("Likes", self.likes.to_string()),
            ("Comments", self.comments.clone().unwrap_or_default()),
        ]
    }
}

pub fn render_records<T: Serialize + TextRecord>(
    json: bool,
    heading: &str,
    rows: &[T],
) -> AppResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(rows)?);
    }

    let mut out = String::from(heading);
    for row in rows {
        out.push('\n');
        for (label, value) in row.fields() {
            out.push_str(&format!("\n    {}: {}", label, value));
        }
    }
    Ok(out)
}

pub fn render_status(json: bool, message: &str, id: Option<i64>) -> AppResult<String> {
    if json {
        return Ok(serde_json::to_string(&json!({
            "status": "ok",
            "message": message,
            "id": id,
        }))?);
    }
    Ok(match id {
        Some(id) => format!("{}\nInserted with id={}", message, id),
        None => message.to_string(),
    })
}

/// A status line followed by related rows. JSON mode nests the rows under
/// `records` so stdout stays a single document.
pub fn render_status_with_records<T: Serialize + TextRecord>(
    json: bool,
    message: &str,
    heading: &str,
    rows: &[T],
) -> AppResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(&json!({
            "status": "ok",
            "message": message,
            "records": rows,
        }))?);
    }
    Ok(format!(
        "{}\n{}",
        render_status(false, message, None)?,
        render_records(false, heading, rows)?
    ))
}

pub fn render_error(json: bool, err: &AppError) -> String {
    if json {
        return json!({
            "error": err.to_string(),
            "fatal": err.is_fatal(),
        })
        .to_string();
    }
    format!("Error: {}", err)
}

/// Prints to stdout in the selected mode.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn records<T: Serialize + TextRecord>(&self, heading: &str, rows: &[T]) -> AppResult<()> {
        println!("{}", render_records(self.json, heading, rows)?);
        Ok(())
    }

    /// Prints a whole value as pretty JSON, for results that are not a plain row list.
    pub fn json_value<T: Serialize>(&self, value: &T) -> AppResult<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn status(&self, message: &str, id: Option<i64>) -> AppResult<()> {
        println!("{}", render_status(self.json, message, id)?);
        Ok(())
    }

    pub fn status_with_records<T: Serialize + TextRecord>(
        &self,
        message: &str,
        heading: &str,
        rows: &[T],
    ) -> AppResult<()> {
        println!(
            "{}",
            render_status_with_records(self.json, message, heading, rows)?
        );
        Ok(())
    }

    /// Business-rule rejections go to stdout; everything fatal goes to stderr.
    pub fn error(&self, err: &AppError) {
        let rendered = render_error(self.json, err);
        if err.is_fatal() {
            eprintln!("{}", rendered);
        } else {
            println!("{}", rendered);
        }
    }
}
