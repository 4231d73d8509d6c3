//! CLI entry point for vera-site

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "vera-site")]
#[command(author = "Vera Team")]
#[command(version)]
#[command(about = "Blog content and site backend for the Vera website", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List site content
    List {
        /// Type of content to list (post, tag, slug)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Show a single post
    Show {
        slug: String,

        /// Print the full post as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the posts carrying a tag
    Tag { tag: String },

    /// Write sitemap, robots.txt and post JSON
    #[command(alias = "g")]
    Generate {
        /// Output directory
        #[arg(short, long, default_value = "public")]
        out: PathBuf,
    },

    /// Print sitemap.xml
    Sitemap,

    /// Print robots.txt
    Robots,

    /// Start the HTTP server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Calculate a temporary chart through the backend
    Chart {
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Birth time (HH:MM); omit when unknown
        #[arg(long)]
        time: Option<String>,

        /// Birth place, resolved through autocomplete
        #[arg(long)]
        place: String,
    },

    /// Autocomplete a birth place
    Places { input: String },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = if cli.debug {
        "vera_site=debug,info"
    } else {
        "vera_site=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    if let Commands::Version = cli.command {
        println!("vera-site version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let site = vera_site::Site::new(&base_dir)?;

    match cli.command {
        Commands::List { r#type } => {
            vera_site::commands::list::run(&site, &r#type).await?;
        }

        Commands::Show { slug, json } => {
            vera_site::commands::show::post(&site, &slug, json).await?;
        }

        Commands::Tag { tag } => {
            vera_site::commands::show::tag(&site, &tag).await?;
        }

        Commands::Generate { out } => {
            let out_dir = if out.is_absolute() {
                out
            } else {
                base_dir.join(out)
            };
            tracing::info!("Generating into {:?}", out_dir);
            vera_site::commands::generate::run(&site, &out_dir).await?;
            println!("Generated successfully!");
        }

        Commands::Sitemap => {
            print!("{}", site.sitemap().await);
        }

        Commands::Robots => {
            print!("{}", site.robots());
        }

        Commands::Server { port, ip } => {
            tracing::info!("Starting server at http://{}:{}", ip, port);
            vera_site::server::start(site, &ip, port).await?;
        }

        Commands::Chart { date, time, place } => {
            vera_site::commands::chart::run(&site, &date, time.as_deref(), &place).await?;
        }

        Commands::Places { input } => {
            vera_site::commands::chart::places(&site, &input).await?;
        }

        Commands::Version => unreachable!("handled above"),
    }

    Ok(())
}
