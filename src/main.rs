use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use feedline::config::Config;
use feedline::model::{Post, SignIn};
use feedline::notice::{NoticeLevel, NoticeReceiver};
use feedline::FeedlineClient;

#[derive(Parser, Debug)]
#[command(name = "feedline")]
#[command(about = "Command-line client for the social feed API")]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session tokens
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    SignOut,
    /// Email a password reset link
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Show the signed-in user
    Whoami,
    /// Print the home feed
    Feed {
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Toggle the like on a post
    Like { post_id: String },
    /// Follow a user
    Follow { user_id: String },
    /// Unfollow a user
    Unfollow { user_id: String },
    /// List notifications
    Notifications,
    /// Search users
    Search { query: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let (client, mut notices) =
        FeedlineClient::from_config(&config).context("Failed to create client")?;

    let result = run(&client, cli.command).await;
    print_notices(&mut notices);
    result
}

async fn run(client: &FeedlineClient, command: Command) -> Result<()> {
    match command {
        Command::SignIn { email, password } => {
            let user = client.auth().sign_in(&SignIn { email, password }).await?;
            println!("Signed in as {} (@{})", user.display_name(), user.user_name);
            Ok(())
        }
        Command::SignOut => {
            client.auth().sign_out();
            Ok(())
        }
        Command::ForgotPassword { email } => {
            client.auth().forgot_password(&email).await?;
            Ok(())
        }
        command => run_signed_in(client, command).await,
    }
}

async fn run_signed_in(client: &FeedlineClient, command: Command) -> Result<()> {
    let Some(me) = client.auth().check_auth().await? else {
        bail!("Not signed in. Run `feedline sign-in` first.");
    };

    match command {
        Command::Whoami => {
            println!("{} (@{})", me.display_name(), me.user_name);
            println!(
                "{} posts, {} followers, {} following",
                me.posts_count, me.followers_count, me.following_count
            );
        }
        Command::Feed { pages } => {
            client.feed().load().await?;
            for _ in 1..pages {
                if !client.feed().state().can_load_next() {
                    break;
                }
                client.feed().load_more().await?;
            }
            for post in client.feed().posts() {
                print_post(&post);
            }
        }
        Command::Like { post_id } => {
            client.posts().load(&post_id).await?;
            let liked = client.posts().toggle_like(&post_id).await?;
            let likes = client
                .posts()
                .get(&post_id)
                .map(|p| p.likes_count)
                .unwrap_or_default();
            println!("{} ({} likes)", if liked { "Liked" } else { "Unliked" }, likes);
        }
        Command::Follow { user_id } => {
            let target = client.profile().load(&user_id).await?;
            client.follows().follow(&user_id).await?;
            if target.is_private {
                println!("Follow request sent to @{}", target.user_name);
            } else {
                println!("Following @{}", target.user_name);
            }
        }
        Command::Unfollow { user_id } => {
            let target = client.profile().load(&user_id).await?;
            client.follows().unfollow(&user_id).await?;
            println!("Unfollowed @{}", target.user_name);
        }
        Command::Notifications => {
            client.notifications().load().await?;
            for notification in client.notifications().notifications() {
                let marker = if notification.is_read { " " } else { "*" };
                println!(
                    "{} [{}] @{} {}",
                    marker,
                    notification.kind.label(),
                    notification.sender_user.user_name,
                    notification.body()
                );
            }
        }
        Command::Search { query } => {
            client.search().search(&query).await?;
            for user in client.search().results() {
                println!("@{}  {}", user.user_name, user.display_name());
            }
        }
        Command::SignIn { .. } | Command::SignOut | Command::ForgotPassword { .. } => {}
    }
    Ok(())
}

fn print_post(post: &Post) {
    let title = post
        .title
        .as_deref()
        .or(post.content.as_deref())
        .unwrap_or("(media)");
    println!(
        "{}  @{}: {}  [{} likes, {} comments]",
        post.id, post.user.user_name, title, post.likes_count, post.comments_count
    );
}

fn print_notices(notices: &mut NoticeReceiver) {
    while let Ok(notice) = notices.try_recv() {
        let prefix = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        match notice.detail {
            Some(detail) => eprintln!("[{}] {}: {}", prefix, notice.title, detail),
            None => eprintln!("[{}] {}", prefix, notice.title),
        }
    }
}
