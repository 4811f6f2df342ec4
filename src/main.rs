use clap::{Parser, Subcommand};
use gcs_media::attachments::{self, Attachment, AttachmentIndex};
use gcs_media::cache::ServingUrlCache;
use gcs_media::config;
use gcs_media::media::MediaLibrary;
use gcs_media::output;
use gcs_media::planner::{Dimensions, Planner, SizeRequest, format_srcset};
use gcs_media::service::HttpImageService;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gcs-media")]
#[command(about = "Serve media-library images through a cloud image service")]
#[command(long_about = "\
Serve media-library images through a cloud image service

Sizes are given as a preset name (thumbnail, medium, large, or any
[sizes.<name>] from config.toml), `full` for the original, `WxH` to fit
inside a box, or `WxH:crop` to fill it exactly.

State directory layout:

  .gcs-media/
  ├── attachments.json             # Attachment index (id → file, url, type, size)
  └── .serving-url-cache.json      # Cached base serving URLs per attachment

Logging goes to stderr and is controlled by RUST_LOG (default gcs_media=info).

Run 'gcs-media gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Directory for the attachment index and serving-URL cache
    #[arg(long, default_value = ".gcs-media", global = true)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// An original's dimensions, given as `WxH`.
#[derive(clap::Args, Clone)]
struct OriginalArgs {
    /// Original dimensions, e.g. 2000x1500
    #[arg(long, value_parser = parse_dimensions)]
    original: Dimensions,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a size against an original's dimensions
    Resolve {
        size: SizeRequest,
        #[command(flatten)]
        original: OriginalArgs,
        /// Also render the serving URL for this base URL
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Render the serving URL for a size
    Url {
        base_url: String,
        size: SizeRequest,
        #[command(flatten)]
        original: OriginalArgs,
    },
    /// List responsive srcset candidates for a size
    Srcset {
        base_url: String,
        size: SizeRequest,
        #[command(flatten)]
        original: OriginalArgs,
    },
    /// Register a local image as an attachment
    Import {
        /// Local image file to read type and dimensions from
        path: PathBuf,
        /// Stored file reference, e.g. gs://bucket/2024/05/dawn.jpg
        #[arg(long)]
        file: String,
        /// URL the host serves the original from
        #[arg(long)]
        url: String,
        /// Attachment id (defaults to the next free id)
        #[arg(long)]
        id: Option<u64>,
    },
    /// List registered attachments
    List,
    /// Downsize an attachment, falling back to the original
    Downsize { id: u64, size: SizeRequest },
    /// Render <img> markup for an attachment
    Img {
        id: u64,
        size: SizeRequest,
        #[arg(long, default_value = "")]
        alt: String,
    },
    /// Delete an attachment and its serving image
    Delete { id: u64 },
    /// Validate config.toml
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve {
            size,
            original,
            base_url,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let presets = config.preset_registry();
            let planner = Planner::new(&presets, config.images.quality());
            let original = original.original;
            let resolved = planner.resolve_size(&size, original);
            let url = match (&base_url, &resolved) {
                (Some(base), Some(r)) => Some(planner.serving_url(base, r)),
                _ => None,
            };
            output::print_resolution(&size, original, resolved.as_ref(), url.as_deref());
        }
        Command::Url {
            base_url,
            size,
            original,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let presets = config.preset_registry();
            let planner = Planner::new(&presets, config.images.quality());
            let resolved = planner
                .resolve_size(&size, original.original)
                .ok_or_else(|| format!("{size} does not resolve on {}", original.original))?;
            println!("{}", planner.serving_url(&base_url, &resolved));
        }
        Command::Srcset {
            base_url,
            size,
            original,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let presets = config.preset_registry();
            let planner = Planner::new(&presets, config.images.quality());
            let candidates = planner.build_srcset(&base_url, &size, original.original);
            output::print_srcset_candidates(&candidates);
            if !candidates.is_empty() {
                println!();
                println!("srcset=\"{}\"", format_srcset(&candidates));
            }
        }
        Command::Import {
            path,
            file,
            url,
            id,
        } => {
            let mut index = AttachmentIndex::load(&cli.state_dir)?;
            let (mime_type, dims) = attachments::identify(&path)?;
            let id = id.unwrap_or_else(|| index.next_id());
            index.insert(Attachment {
                id,
                file,
                url,
                mime_type,
                width: dims.width,
                height: dims.height,
            });
            index.save(&cli.state_dir)?;
            tracing::info!(id, path = %path.display(), "imported attachment");
            let cache = ServingUrlCache::load(&cli.state_dir);
            output::print_attachment_list(&index, &cache);
        }
        Command::List => {
            let index = AttachmentIndex::load(&cli.state_dir)?;
            let cache = ServingUrlCache::load(&cli.state_dir);
            output::print_attachment_list(&index, &cache);
        }
        Command::Downsize { id, size } => {
            let mut library = open_library(&cli.config_dir, &cli.state_dir)?;
            let native = library.attachments().get(id)?.native_downsize();
            let downsize = library.get_intermediate_url(id, &size, || Some(native));
            output::print_downsize(id, &size, downsize.as_ref());
            finish(&library, &cli.state_dir)?;
        }
        Command::Img { id, size, alt } => {
            let mut library = open_library(&cli.config_dir, &cli.state_dir)?;
            library.attachments().get(id)?;
            if let Some(markup) = library.image_markup(id, &size, &alt) {
                println!("{}", markup.into_string());
            }
            finish(&library, &cli.state_dir)?;
        }
        Command::Delete { id } => {
            let mut library = open_library(&cli.config_dir, &cli.state_dir)?;
            library.delete_attachment(id)?;
            library.remove_attachment(id);
            library.attachments().save(&cli.state_dir)?;
            library.cache().save(&cli.state_dir)?;
            println!("Deleted attachment {id}");
        }
        Command::Check => {
            println!("==> Checking {}", cli.config_dir.join("config.toml").display());
            let config = config::load_config(&cli.config_dir)?;
            let presets = config.preset_registry();
            for (name, spec) in presets.iter() {
                let crop = if spec.crop.is_cropped() { " crop" } else { "" };
                println!("    {name}: {}x{}{crop}", spec.width, spec.height);
            }
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gcs_media=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load config and state into a media library talking to the configured service.
fn open_library(
    config_dir: &Path,
    state_dir: &Path,
) -> Result<MediaLibrary<HttpImageService>, Box<dyn std::error::Error>> {
    let config = config::load_config(config_dir)?;
    let service = config
        .images
        .service_url()
        .map(HttpImageService::new)
        .transpose()?;
    if service.is_none() && config.images.enabled {
        tracing::warn!("images.enabled is set but images.service_url is empty");
    }
    let index = AttachmentIndex::load(state_dir)?;
    let cache = ServingUrlCache::load(state_dir);
    Ok(MediaLibrary::new(config, index, cache, service))
}

/// Persist the serving-URL cache and report lookup statistics.
fn finish(
    library: &MediaLibrary<HttpImageService>,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    library.cache().save(state_dir)?;
    if library.stats().total() > 0 {
        eprintln!("{}", output::format_cache_stats(&library.stats()));
    }
    Ok(())
}

fn parse_dimensions(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let width = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{s}'"))?;
    let height = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{s}'"))?;
    Ok(Dimensions::new(width, height))
}
