//! # Quill
//!
//! Operator CLI for the post store: migrate the schema, write posts and query
//! them. Posts are printed as JSON lines.

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use futures::TryStreamExt;
use uuid::Uuid;

use quill_core::domain::{Post, PostStatus};
use quill_core::ports::{BaseRepository, PageRequest, PostRepository};
use quill_infra::telemetry::init_telemetry;

mod config;
mod state;

use config::AppConfig;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Manage posts in the Quill store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PostArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    content: String,
    #[arg(long, default_value = "draft")]
    status: PostStatus,
    #[arg(long)]
    id: Option<Uuid>,
}

impl PostArgs {
    fn into_post(self) -> Post {
        let post = Post::new(self.title, self.content).with_status(self.status);
        match self.id {
            Some(id) => post.with_id(id),
            None => post,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending schema migrations
    Migrate,
    /// Create a post, or update it when --id names an existing one
    Save(PostArgs),
    /// Create a post; fails if --id names an existing one
    Insert(PostArgs),
    /// Show one post
    Get { id: Uuid },
    /// Posts whose title contains FRAGMENT (case-sensitive)
    Search { fragment: String },
    /// Posts with the given status
    ByStatus { status: PostStatus },
    /// One zero-based page of posts, oldest first
    List {
        #[arg(long, default_value_t = 0)]
        page: u64,
        #[arg(long, default_value_t = 10)]
        size: u64,
    },
    /// Every post, oldest first
    All,
    /// Number of stored posts
    Count,
    /// Delete every post
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

fn print_post(post: &Post) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(post)?);
    Ok(())
}

fn print_posts(posts: &[Post]) -> anyhow::Result<()> {
    posts.iter().try_for_each(print_post)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    init_telemetry(&config.telemetry);

    let state = AppState::new(config.database.as_ref())
        .await
        .context("failed to open post store")?;
    let posts = &state.posts;

    match cli.command {
        #[cfg(feature = "postgres")]
        Command::Migrate => {
            use migration::{Migrator, MigratorTrait};

            let Some(repo) = &state.postgres else {
                bail!("migrate needs DATABASE_URL or DB_HOST to be set");
            };
            Migrator::up(repo.connection(), None)
                .await
                .context("migration failed")?;
            tracing::info!("Migrations applied");
        }
        #[cfg(not(feature = "postgres"))]
        Command::Migrate => bail!("built without the postgres feature"),
        Command::Save(args) => print_post(&posts.save(args.into_post()).await?)?,
        Command::Insert(args) => print_post(&posts.insert(args.into_post()).await?)?,
        Command::Get { id } => match posts.find_by_id(id).await? {
            Some(post) => print_post(&post)?,
            None => bail!("post {id} not found"),
        },
        Command::Search { fragment } => {
            print_posts(&posts.find_by_title_contains(&fragment).await?)?;
        }
        Command::ByStatus { status } => {
            print_posts(&posts.find_by_status(status).await?)?;
        }
        Command::List { page, size } => {
            print_posts(&posts.find_page(PageRequest::of(page, size)).await?)?;
        }
        Command::All => {
            let mut all = posts.find_all();
            while let Some(post) = all.try_next().await? {
                print_post(&post)?;
            }
        }
        Command::Count => println!("{}", posts.count().await?),
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to delete every post without --yes");
            }
            let deleted = posts.delete_all().await?;
            tracing::info!(deleted, "Cleared posts");
        }
    }

    Ok(())
}
