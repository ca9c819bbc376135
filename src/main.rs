use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use cover_forge::state::data::{DEFAULT_BLEED_IN, DEFAULT_DPI, DEFAULT_INCHES_PER_PAGE};
use cover_forge::store::database;
use cover_forge::{
    catalog, map_cover, store, AppState, BookOptions, CoverError, CoverGeometry, CoverRecord,
    CoverStore, CoverUpdate, DatabaseStore, MappedRegion, MemoryStore, Registry, TrimSize,
};

#[derive(Parser)]
#[command(name = "cover-forge", about = "3D book cover previewer core", version)]
struct Cli {
    /// Storage backend
    #[arg(long, default_value = "sqlite", value_enum)]
    backend: BackendArg,

    /// SQLite database path (defaults to the per-user data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    /// Flat in-process store; nothing persists between runs
    Memory,
    /// SQLite-backed store with image recompression on write
    Sqlite,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one cover image to the catalog
    Add {
        /// Cover image file (PNG, JPEG or WebP)
        #[arg(short, long)]
        file: PathBuf,

        /// Trim preset name (see `presets`)
        #[arg(long, conflicts_with_all = ["width_in", "height_in"])]
        preset: Option<String>,

        /// Custom trim width in inches
        #[arg(long, requires = "height_in")]
        width_in: Option<f64>,

        /// Custom trim height in inches
        #[arg(long, requires = "width_in")]
        height_in: Option<f64>,

        /// Spine width in inches
        #[arg(long)]
        spine_in: Option<f64>,

        /// Page count, used to derive spine width when --spine-in is absent
        #[arg(long)]
        pages: Option<u32>,

        /// Per-page thickness for the derivation (paper-stock specific)
        #[arg(long, default_value_t = DEFAULT_INCHES_PER_PAGE)]
        inches_per_page: f64,

        /// Artwork resolution
        #[arg(long, default_value_t = DEFAULT_DPI)]
        dpi: u32,

        /// Enable bleed trimming
        #[arg(long)]
        bleed: bool,

        /// Bleed margin in inches
        #[arg(long, default_value_t = DEFAULT_BLEED_IN)]
        bleed_in: f64,
    },

    /// Import every cover image found under a folder (recursive)
    Import {
        /// Folder to scan for PNG/JPEG/WebP files
        #[arg(short, long)]
        folder: PathBuf,

        /// Trim preset name shared by all imported covers
        #[arg(long, conflicts_with_all = ["width_in", "height_in"])]
        preset: Option<String>,

        #[arg(long, requires = "height_in")]
        width_in: Option<f64>,

        #[arg(long, requires = "width_in")]
        height_in: Option<f64>,

        #[arg(long)]
        spine_in: Option<f64>,

        #[arg(long)]
        pages: Option<u32>,

        #[arg(long, default_value_t = DEFAULT_INCHES_PER_PAGE)]
        inches_per_page: f64,

        #[arg(long, default_value_t = DEFAULT_DPI)]
        dpi: u32,
    },

    /// List all covers in the catalog
    List,

    /// Search covers by name, trim size, or preset name/category
    Search { query: String },

    /// Derive the 3D box dimensions and texture regions for a cover
    Map {
        id: String,

        /// Show the book opened instead of closed
        #[arg(long)]
        open: bool,
    },

    /// Edit a cover's metadata
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, requires = "height_in")]
        width_in: Option<f64>,

        #[arg(long, requires = "width_in")]
        height_in: Option<f64>,

        #[arg(long)]
        spine_in: Option<f64>,

        #[arg(long)]
        dpi: Option<u32>,

        /// Enable or disable bleed trimming
        #[arg(long)]
        bleed: Option<bool>,

        #[arg(long)]
        bleed_in: Option<f64>,
    },

    /// Remove a cover and its stored artwork
    Remove { id: String },

    /// Delete every record and every stored image
    Clear,

    /// Show the trim-size preset table
    Presets,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

async fn run() -> cover_forge::Result<()> {
    let cli = Cli::parse();
    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(DatabaseStore::default_db_path);

    let mut registry: Registry<Box<dyn CoverStore>> = match cli.backend {
        BackendArg::Memory => Registry::new(Box::new(MemoryStore::new())),
        BackendArg::Sqlite => {
            let store = DatabaseStore::open(&db_path)?;
            Registry::new(Box::new(store))
        }
    };

    match cli.command {
        Commands::Add {
            file,
            preset,
            width_in,
            height_in,
            spine_in,
            pages,
            inches_per_page,
            dpi,
            bleed,
            bleed_in,
        } => {
            let trim = resolve_trim(preset.as_deref(), width_in, height_in)?;
            let options = BookOptions {
                spine_width_in: spine_in,
                page_count: pages,
                inches_per_page,
                dpi,
                bleed,
                bleed_in,
            };

            let name = file
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let bytes = std::fs::read(&file)?;

            let record = registry.add(&name, &bytes, trim, &options)?;
            println!("✅ Added {} ({})", record.original_name, record.id);
            print_record(&record);
        }

        Commands::Import {
            folder,
            preset,
            width_in,
            height_in,
            spine_in,
            pages,
            inches_per_page,
            dpi,
        } => {
            let trim = resolve_trim(preset.as_deref(), width_in, height_in)?;
            let options = BookOptions {
                spine_width_in: spine_in,
                page_count: pages,
                inches_per_page,
                dpi,
                ..BookOptions::default()
            };

            println!("🔍 Scanning folder: {}", folder.display());
            let result = match cli.backend {
                // background import opens its own connection per task
                BackendArg::Sqlite => {
                    database::import_folder_async(db_path.clone(), folder, options, trim).await?
                }
                BackendArg::Memory => registry.import_folder(&folder, trim, &options)?,
            };

            println!(
                "✅ Import complete: {} added, {} skipped",
                result.imported, result.skipped
            );
        }

        Commands::List => {
            let records = registry.list()?;
            if records.is_empty() {
                println!("Catalog is empty.");
            }
            for record in &records {
                print_record(record);
            }
        }

        Commands::Search { query } => {
            let matches = registry.search(&query)?;
            println!("{} match(es) for \"{query}\"", matches.len());
            for record in &matches {
                print_record(record);
            }
        }

        Commands::Map { id, open } => {
            let record = registry
                .find_by_id(&id)?
                .ok_or_else(|| CoverError::NotFound { id: id.clone() })?;

            let mut state = AppState::new();
            state.select(Some(record.id.clone()));
            if open {
                state.toggle_open();
            }

            let token = state.begin_resolution();
            let bytes = registry.artwork(&record.id)?;
            let (px_w, px_h) = store::decode_dimensions(&bytes)?;
            let geometry = map_cover(&record, px_w, px_h)?;

            // a stale token would mean the selection changed mid-resolution
            if state.resolution_current(token) {
                print_geometry(&record, px_w, px_h, state.is_open(), &geometry);
            }
        }

        Commands::Update {
            id,
            name,
            width_in,
            height_in,
            spine_in,
            dpi,
            bleed,
            bleed_in,
        } => {
            let trim = match (width_in, height_in) {
                (Some(w), Some(h)) => Some(TrimSize::new(w, h)),
                _ => None,
            };
            let update = CoverUpdate {
                original_name: name,
                trim,
                spine_width_in: spine_in,
                dpi,
                has_bleed: bleed,
                bleed_in,
            };

            let record = registry.update(&id, &update)?;
            println!("✅ Updated {}", record.id);
            print_record(&record);
        }

        Commands::Remove { id } => {
            registry.remove(&id)?;
            println!("🗑️  Removed {id}");
        }

        Commands::Clear => {
            registry.clear()?;
            println!("🗑️  Catalog cleared");
        }

        Commands::Presets => {
            println!("{:<14} {:<12} SIZE", "NAME", "CATEGORY");
            for preset in catalog::list_presets() {
                println!(
                    "{:<14} {:<12} {}",
                    preset.name,
                    preset.category,
                    preset.trim.label()
                );
            }
        }
    }

    Ok(())
}

/// Turn either a preset name or explicit dimensions into a trim size.
fn resolve_trim(
    preset: Option<&str>,
    width_in: Option<f64>,
    height_in: Option<f64>,
) -> cover_forge::Result<TrimSize> {
    if let Some(name) = preset {
        return catalog::find_preset_by_name(name)
            .map(|p| p.trim)
            .ok_or_else(|| CoverError::Validation(format!("unknown preset \"{name}\"")));
    }
    match (width_in, height_in) {
        (Some(w), Some(h)) => Ok(TrimSize::new(w, h)),
        _ => Err(CoverError::Validation(
            "supply either --preset or both --width-in and --height-in".into(),
        )),
    }
}

fn print_record(record: &CoverRecord) {
    let preset = catalog::find_preset(
        record.trim.width_in,
        record.trim.height_in,
        catalog::PRESET_TOLERANCE_IN,
    )
    .map(|p| format!(" [{} / {}]", p.name, p.category))
    .unwrap_or_default();

    let bleed = if record.has_bleed {
        format!(", bleed {} in", record.bleed_inches())
    } else {
        String::new()
    };

    let uploaded = chrono::DateTime::from_timestamp(record.uploaded_at, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| record.uploaded_at.to_string());

    println!(
        "  {}  {}  {}{}, spine {} in, {} dpi{} (uploaded {})",
        record.id,
        record.original_name,
        record.trim.label(),
        preset,
        record.spine_width_in,
        record.dpi,
        bleed,
        uploaded
    );
}

fn print_geometry(
    record: &CoverRecord,
    px_w: u32,
    px_h: u32,
    open: bool,
    geometry: &CoverGeometry,
) {
    println!(
        "📖 {}: artwork {}x{} px, shown {}",
        record.original_name,
        px_w,
        px_h,
        if open { "open" } else { "closed" }
    );

    for (label, region) in [
        ("front", &geometry.front),
        ("spine", &geometry.spine),
        ("back", &geometry.back),
    ] {
        print_region(label, region);
    }
}

fn print_region(label: &str, region: &MappedRegion) {
    println!(
        "  {label:<6} box {:.4} × {:.4} × {:.4}  uv offset ({:.4}, {:.4})  repeat ({:.4}, {:.4})",
        region.dimensions.x,
        region.dimensions.y,
        region.dimensions.z,
        region.uv_offset.x,
        region.uv_offset.y,
        region.uv_repeat.x,
        region.uv_repeat.y
    );
}
