use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tankobon::config::{self, ReaderConfig};
use tankobon::library::{Library, Theme};
use tankobon::output;
use tankobon::reader;
use tankobon::resolver::{FsLoader, ImageResolver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tankobon")]
#[command(about = "Chapter-paged reader for local manga directories")]
#[command(long_about = "\
Chapter-paged reader for local manga directories

Register a directory of sequentially numbered images, tell tankobon roughly
how many chapters it has, and read it chapter by chapter. Pages are found by
number without listing the directory; the extension and zero-padding are
guessed and the last working guess is tried first:

  010-One-Piece/
  ├── 001.webp        # padded, webp
  ├── 002.webp
  └── ...
  Berserk/
  ├── 1.jpg           # unpadded, jpg
  └── 2.jpg

Chapters split the images evenly: 25 images declared as 4 chapters gives
6 images per chapter and 5 chapters, the last holding one image.

Reading state (current chapter, zoom) and the theme preference are kept in
<data-dir>/library.json. Settings come from <data-dir>/config.toml, or the
file given with --config; run 'tankobon gen-config' for the options.
Set RUST_LOG=debug to see every candidate tried.")]
#[command(version)]
struct Cli {
    /// Directory holding library.json and config.toml
    #[arg(long, default_value = ".tankobon", global = true)]
    data_dir: PathBuf,

    /// Config file to use instead of <data-dir>/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a directory of numbered images
    Add {
        dir: PathBuf,
        /// Estimated number of chapters
        #[arg(long, default_value_t = 1)]
        chapters: usize,
        /// Total image count (default: count image files in the directory)
        #[arg(long)]
        images: Option<usize>,
        /// Display title (default: from the directory name)
        #[arg(long)]
        title: Option<String>,
    },
    /// Unregister a collection and forget its reading state
    Remove { id: String },
    /// List registered collections
    List,
    /// Change a collection's title or counts
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        images: Option<usize>,
        #[arg(long)]
        chapters: Option<usize>,
    },
    /// Show every chapter's image range
    Chapters { id: String },
    /// Resolve and list the pages of a chapter
    Read {
        id: String,
        /// Chapter to open (1-based, clamped to the collection)
        #[arg(long, conflicts_with_all = ["next", "prev"])]
        chapter: Option<i64>,
        /// Advance to the next chapter
        #[arg(long, conflicts_with = "prev")]
        next: bool,
        /// Go back to the previous chapter
        #[arg(long)]
        prev: bool,
        /// Resolve pages one at a time instead of in parallel
        #[arg(long)]
        sequential: bool,
    },
    /// Adjust the stored zoom level
    Zoom { id: String, action: ZoomAction },
    /// Show or change the theme preference
    Theme { mode: Option<ThemeMode> },
    /// Resolve every page and report missing ones
    Check {
        id: String,
        #[arg(long)]
        sequential: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum ZoomAction {
    In,
    Out,
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeMode {
    Light,
    Dark,
    Toggle,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir;
    let config_path = cli.config;

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Add {
            dir,
            chapters,
            images,
            title,
        } => {
            let mut library = Library::load(&data_dir);
            let entry = library.register(&dir, title, images, chapters)?;
            println!(
                "Added {} [{}]: {} images in {} chapters",
                entry.title, entry.id, entry.total_image_count, entry.total_chapters
            );
            library.save(&data_dir)?;
        }
        Command::Remove { id } => {
            let mut library = Library::load(&data_dir);
            let entry = library.remove(&id)?;
            println!("Removed {} [{}]", entry.title, entry.id);
            library.save(&data_dir)?;
        }
        Command::List => {
            let config = load_config(config_path.as_deref(), &data_dir)?;
            let library = Library::load(&data_dir);
            output::print_library(&library, &config.viewer);
        }
        Command::Edit {
            id,
            title,
            images,
            chapters,
        } => {
            let mut library = Library::load(&data_dir);
            let entry = library.update(&id, title, images, chapters)?;
            println!(
                "Updated {} [{}]: {} images in {} chapters",
                entry.title, entry.id, entry.total_image_count, entry.total_chapters
            );
            library.save(&data_dir)?;
        }
        Command::Chapters { id } => {
            let config = load_config(config_path.as_deref(), &data_dir)?;
            let library = Library::load(&data_dir);
            let entry = library.get(&id)?;
            let collection = entry.collection()?;
            let current = library.progress(&entry.id, &config.viewer).chapter;
            output::print_chapter_table(entry, &collection, current);
        }
        Command::Read {
            id,
            chapter,
            next,
            prev,
            sequential,
        } => {
            let config = load_config(config_path.as_deref(), &data_dir)?;
            let mut library = Library::load(&data_dir);
            let entry = library.get(&id)?.clone();
            let collection = entry.collection()?;

            let state = library.progress_mut(&entry.id, &config.viewer);
            let current = match chapter {
                Some(n) => state.open_chapter(&collection, n),
                None if next => state.next_chapter(&collection),
                None if prev => state.prev_chapter(&collection),
                None => state.set_chapter(&collection, state.chapter as i64),
            };

            init_thread_pool(&config);
            let resolver = ImageResolver::from_config(FsLoader, &config.resolver);
            let pages = reader::load_chapter(&collection, current as i64, &resolver, !sequential)?;
            output::print_chapter(&entry.title, collection.total_chapters(), &pages);
            library.save(&data_dir)?;
        }
        Command::Zoom { id, action } => {
            let config = load_config(config_path.as_deref(), &data_dir)?;
            let mut library = Library::load(&data_dir);
            let key = library.get(&id)?.id.clone();
            let state = library.progress_mut(&key, &config.viewer);
            let zoom = match action {
                ZoomAction::In => state.zoom_in(&config.viewer),
                ZoomAction::Out => state.zoom_out(&config.viewer),
                ZoomAction::Reset => state.reset_zoom(&config.viewer),
            };
            println!("Zoom: {}x", zoom);
            library.save(&data_dir)?;
        }
        Command::Theme { mode } => {
            let mut library = Library::load(&data_dir);
            if let Some(mode) = mode {
                library.theme = match mode {
                    ThemeMode::Light => Theme::Light,
                    ThemeMode::Dark => Theme::Dark,
                    ThemeMode::Toggle => library.theme.toggle(),
                };
                library.save(&data_dir)?;
            }
            println!("Theme: {}", library.theme);
        }
        Command::Check { id, sequential } => {
            let config = load_config(config_path.as_deref(), &data_dir)?;
            let library = Library::load(&data_dir);
            let entry = library.get(&id)?;
            let collection = entry.collection()?;
            init_thread_pool(&config);
            let resolver = ImageResolver::from_config(FsLoader, &config.resolver);
            let report = reader::check_collection(&collection, &resolver, !sequential)?;
            output::print_check(&entry.title, &report);
        }
    }

    Ok(())
}

/// Load `--config` when given, otherwise `<data-dir>/config.toml` if present.
fn load_config(
    config_path: Option<&Path>,
    data_dir: &Path,
) -> Result<ReaderConfig, config::ConfigError> {
    match config_path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(data_dir),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(config: &ReaderConfig) {
    let threads = config::effective_threads(&config.processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
