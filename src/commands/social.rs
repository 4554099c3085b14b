use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use super::GlobalArgs;
use crate::config::Config;
use crate::core::strong_types::PostId;
use crate::domains::SocialService;
use crate::error::AppResult;
use crate::infrastructure::SqliteDatabase;
use crate::output::Output;

#[derive(Parser, Debug)]
#[command(
    name = "social",
    version,
    about = "Social feed: accounts, posts, follows, likes and comments"
)]
pub struct SocialCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: SocialCommand,
}

#[derive(Subcommand, Debug, Clone)]
#[command(rename_all = "lower")]
pub enum SocialCommand {
    /// Create the database and load the schema
    Create,
    /// Register a user
    AddUser { name: String, email: String },
    /// Create a social account for the user registered under EMAIL
    AddAccount { username: String, email: String },
    /// Publish a post
    CreatePost {
        username: String,
        title: String,
        content: String,
    },
    /// Posts from accounts you follow, newest first
    Feed { username: String },
    /// Your own posts
    MyPosts { username: String },
    /// Delete one of your posts with its likes and comments
    DeletePost { username: String, postid: PostId },
    /// Follow another account
    Follow {
        username: String,
        followusername: String,
    },
    /// Stop following an account
    Unfollow {
        username: String,
        unfollowusername: String,
    },
    /// Accounts you follow
    ListFollows { username: String },
    /// Accounts whose user name contains SEARCHUSER
    SearchUser { searchuser: String },
    /// Like a post (once per account)
    Like { username: String, postid: PostId },
    /// Comment on a post
    Comment {
        username: String,
        postid: PostId,
        comment: String,
    },
}

pub async fn run(cli: SocialCli) -> AppResult<()> {
    let config = cli.global.config()?;
    let output = cli.global.output();

    let db = if matches!(cli.command, SocialCommand::Create) {
        Arc::new(SqliteDatabase::create(&config).await?)
    } else {
        Arc::new(SqliteDatabase::open(&config).await?)
    };
    let service = SocialService::new(db.clone());
    let result = dispatch(&service, &config, &output, cli.command).await;
    db.close().await;
    result
}

async fn dispatch(
    service: &SocialService,
    config: &Config,
    output: &Output,
    command: SocialCommand,
) -> AppResult<()> {
    info!(?command, "social command");
    match command {
        SocialCommand::Create => output.status(
            &format!(
                "Database created successfully at {}",
                config.database.path.display()
            ),
            None,
        ),
        SocialCommand::AddUser { name, email } => {
            let id = service.database().insert_user(&name, &email).await?;
            output.status(
                &format!("Created user {} with email {}", name, email),
                Some(id.value()),
            )
        }
        SocialCommand::AddAccount { username, email } => {
            let id = service.add_account(&username, &email).await?;
            output.status(
                &format!("Created account {} for email {}", username, email),
                Some(id.value()),
            )
        }
        SocialCommand::CreatePost {
            username,
            title,
            content,
        } => {
            let id = service.create_post(&username, &title, &content).await?;
            output.status(
                &format!("Created post {:?} for user {}", title, username),
                Some(id.value()),
            )
        }
        SocialCommand::Feed { username } => {
            let rows = service.feed(&username).await?;
            output.records(
                &format!("Feed for user {}: {} posts", username, rows.len()),
                &rows,
            )
        }
        SocialCommand::MyPosts { username } => {
            let rows = service.my_posts(&username).await?;
            output.records(
                &format!("Posts by user {}: {}", username, rows.len()),
                &rows,
            )
        }
        SocialCommand::DeletePost { username, postid } => {
            service.delete_post(&username, postid).await?;
            output.status(&format!("Deleted post {} successfully.", postid), None)
        }
        SocialCommand::Follow {
            username,
            followusername,
        } => {
            let suggestions = service.follow(&username, &followusername).await?;
            output.status_with_records(
                &format!("{} is now following {}", username, followusername),
                "Suggested users to follow:",
                &suggestions,
            )
        }
        SocialCommand::Unfollow {
            username,
            unfollowusername,
        } => {
            let removed = service.unfollow(&username, &unfollowusername).await?;
            let message = if removed == 0 {
                format!("{} was not following {}", username, unfollowusername)
            } else {
                format!("{} unfollowed {} successfully.", username, unfollowusername)
            };
            output.status(&message, None)
        }
        SocialCommand::ListFollows { username } => {
            let rows = service.list_follows(&username).await?;
            output.records(
                &format!("User {} follows {} accounts", username, rows.len()),
                &rows,
            )
        }
        SocialCommand::SearchUser { searchuser } => {
            let rows = service.search_accounts(&searchuser).await?;
            output.records(
                &format!("Found {} users matching {:?}", rows.len(), searchuser),
                &rows,
            )
        }
        SocialCommand::Like { username, postid } => {
            service.like(&username, postid).await?;
            output.status(&format!("{} liked post {}", username, postid), None)
        }
        SocialCommand::Comment {
            username,
            postid,
            comment,
        } => {
            let id = service.comment(&username, postid, &comment).await?;
            output.status(
                &format!("{} commented on post {}", username, postid),
                Some(id.value()),
            )
        }
    }
}
