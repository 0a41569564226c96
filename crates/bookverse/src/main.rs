use crate::prelude::*;
use clap::Parser;

mod books;
mod error;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Search and read books from the Google Books catalog"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Hosts that cover-image links may point at; anything else falls back
    /// to the placeholder cover.
    #[clap(
        long,
        env = "BOOKVERSE_IMAGE_HOSTS",
        global = true,
        default_value = "books.google.com,images.unsplash.com"
    )]
    image_hosts: String,

    /// Whether to display additional information.
    #[clap(long, env = "BOOKVERSE_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    /// Parsed image-host allow-list.
    pub fn allowed_image_hosts(&self) -> Vec<String> {
        self.image_hosts
            .split(',')
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .collect()
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Search the catalog and print one page of results
    Search(crate::books::search::SearchOptions),

    /// Show the detail view for a single book
    Read(crate::books::read::ReadOptions),

    /// Interactive search session (search, filter, page, open)
    Browse,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Search(options) => crate::books::search::run(options, app.global).await,
        SubCommands::Read(options) => crate::books::read::run(options, app.global).await,
        SubCommands::Browse => crate::books::browse::run(app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_global(image_hosts: &str) -> Global {
        Global {
            image_hosts: image_hosts.to_string(),
            verbose: false,
        }
    }

    #[test]
    fn test_allowed_image_hosts_splits_and_trims() {
        let global = test_global("books.google.com, images.unsplash.com");
        assert_eq!(
            global.allowed_image_hosts(),
            vec![
                "books.google.com".to_string(),
                "images.unsplash.com".to_string()
            ]
        );
    }

    #[test]
    fn test_allowed_image_hosts_skips_empty_entries() {
        let global = test_global("books.google.com,,");
        assert_eq!(
            global.allowed_image_hosts(),
            vec!["books.google.com".to_string()]
        );
    }
}
