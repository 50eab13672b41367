use clap::Subcommand;
use colored::Colorize;
use crate::catalog::CategoryKind;
use crate::client::GalleryClient;
use crate::entities::ANONYMOUS_ACTOR;
use crate::probe::ObjectProbe;
use crate::storage::DocumentStore;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the gallery slots of one subcategory
    Photos {
        kind: CategoryKind,
        /// Display name, e.g. "Month 3" or "Family Moments"
        name: String,
    },
    /// Resolve every subcategory of a category
    Gallery {
        kind: CategoryKind,
    },
    /// Record a like for a photo URL
    Like {
        url: String,
        #[arg(long, default_value = ANONYMOUS_ACTOR)]
        actor: String,
    },
    /// Show like counts for one or more photo URLs
    Likes {
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(long, default_value = ANONYMOUS_ACTOR)]
        actor: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the gallery table in use
    Catalog,
}

pub async fn run<P: ObjectProbe, S: DocumentStore>(client: &GalleryClient<P, S>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Photos { kind, name } => {
            let photos = client.get_photos(kind, &name).await?;
            println!("{}", serde_json::to_string_pretty(&photos)?);
        }
        Command::Gallery { kind } => {
            let sections = client.get_gallery(kind).await?;
            println!("{}", serde_json::to_string_pretty(&sections)?);
        }
        Command::Like { url, actor } => {
            let total = client.toggle_like(&url, &actor).await;
            println!("{} {}", "\u{2665}".red(), format!("{total} likes").as_str().bold());
        }
        Command::Likes { urls, actor, json } => {
            let summaries = client.get_many_likes(&urls, &actor).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
                return Ok(());
            }
            for url in &urls {
                let summary = summaries.get(url).cloned().unwrap_or_default();
                let heart = if summary.liked { "\u{2665}".red() } else { "\u{2661}".normal() };
                println!("{} {:>4}  {}", heart, summary.total_likes, url.dimmed());
            }
        }
        Command::Catalog => {
            println!("{}", serde_json::to_string_pretty(client.catalog())?);
        }
    }
    Ok(())
}
