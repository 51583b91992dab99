//! # blog-manage
//!
//! Administrative commands that have no page in the web UI: creating and
//! deleting groups, users and posts. Reads the same settings as the server.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use blog_auth_simple::SimpleAuthProvider;
use blog_config::Settings;
use blog_db_sqlite::SqliteBlogRepo;
use blog_storage_local::LocalMediaStore;
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Adds a group posts can be filed under.
    CreateGroup {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Deletes a group; its posts stay, without a group.
    DeleteGroup {
        #[arg(long)]
        slug: String,
    },
    /// Registers a user with the same rules as the signup page.
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Deletes a user with all their posts, comments and follows.
    DeleteUser {
        #[arg(long)]
        username: String,
    },
    /// Deletes one post and its image.
    DeletePost {
        #[arg(long)]
        id: uuid::Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let args = Args::parse();
    let settings = Settings::load().context("failed to load settings")?;

    let repo = SqliteBlogRepo::new(&settings.database.url).await?;
    let store = LocalMediaStore::new(
        PathBuf::from(&settings.media.root),
        settings.media.url_prefix.clone(),
    );

    match args.command {
        Command::CreateGroup {
            slug,
            title,
            description,
        } => {
            let group = commands::create_group(&repo, &slug, &title, &description).await?;
            println!("created group {} ({})", group.slug, group.id);
        }
        Command::DeleteGroup { slug } => {
            commands::delete_group(&repo, &slug).await?;
            println!("deleted group {slug}");
        }
        Command::CreateUser { username, password } => {
            let auth = SimpleAuthProvider::new(settings.auth.session_secret.expose_secret())?;
            let user = commands::create_user(&repo, &auth, &username, &password).await?;
            println!("created user {} ({})", user.username, user.id);
        }
        Command::DeleteUser { username } => {
            let removed = commands::delete_user(&repo, &store, &username).await?;
            println!("deleted user {username} and {removed} posts");
        }
        Command::DeletePost { id } => {
            commands::delete_post(&repo, &store, id).await?;
            println!("deleted post {id}");
        }
    }
    Ok(())
}
