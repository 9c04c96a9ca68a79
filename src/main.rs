//! nexttreino - Workout builder and trainer

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nexttreino::config::{Config, DEFAULT_DB_PATH, DEFAULT_HOST, DEFAULT_PAGE_PATH, DEFAULT_SITE_ROOT};
use nexttreino::db::{Database, KeyValueStore, StorageError};
use nexttreino::exercises::{Catalog, CategoryFilter};
use nexttreino::images::{ImageHandle, ImageProbe, Recovery, recover};
use nexttreino::store::{SaveOutcome, WorkoutId, WorkoutStore};
use nexttreino::timer::{RestTicker, TimerEvent};
use nexttreino::tui::App;

#[derive(Parser)]
#[command(name = "nexttreino")]
#[command(author, version, about = "Workout builder and trainer")]
struct Cli {
    /// SQLite file holding saved workouts and favorites
    #[arg(long, global = true, env = "NEXTTREINO_DB", default_value = DEFAULT_DB_PATH)]
    db: String,

    /// Host the app is served from (e.g. "someone.github.io")
    #[arg(long, global = true, env = "NEXTTREINO_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Page path the app is served under (e.g. "/nexttreino/")
    #[arg(long, global = true, env = "NEXTTREINO_PAGE_PATH", default_value = DEFAULT_PAGE_PATH)]
    page_path: String,

    /// Directory with the deployed site, used to check images
    #[arg(long, global = true, env = "NEXTTREINO_ASSETS", default_value = DEFAULT_SITE_ROOT)]
    assets: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI
    Tui,

    /// Show the exercise catalog
    Catalog {
        /// Category id (peito, costas, pernas, ...) or "todos"
        #[arg(short, long, default_value = "todos")]
        category: String,
    },

    /// List saved workouts
    List,

    /// Save a workout from catalog exercise ids
    Create {
        #[arg(short, long)]
        name: String,

        /// Exercise id (repeat for more)
        #[arg(short, long = "exercise", required = true)]
        exercises: Vec<String>,

        /// Overwrite a workout with the same name
        #[arg(long)]
        replace: bool,
    },

    /// Make a workout current
    Load { id: String },

    /// Change the name or exercises of a workout
    Edit {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        /// Exercise id replacing the current list (repeat for more)
        #[arg(short, long = "exercise")]
        exercises: Vec<String>,

        /// Overwrite another workout with the same name
        #[arg(long)]
        replace: bool,
    },

    /// Delete a workout
    Delete { id: String },

    /// Show completed exercises
    Favorites {
        /// Remove all favorites
        #[arg(long)]
        clear: bool,
    },

    /// Resolve an exercise image reference
    Image {
        raw: String,

        /// Look for the file under the assets directory, walking the fallbacks
        #[arg(long)]
        check: bool,
    },

    /// Run a rest countdown
    Rest { seconds: u32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let tui = matches!(cli.command, None | Some(Commands::Tui));
    let default_filter = if tui { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::new(&cli.db, &cli.host, &cli.page_path, &cli.assets);
    let catalog = Catalog::load();

    match cli.command {
        Some(Commands::Catalog { category }) => {
            let filter = CategoryFilter::parse(&category)
                .with_context(|| format!("unknown category: {}", category))?;
            println!("{} ({})", filter.label(), catalog.filter(filter).len());
            println!("{:-<70}", "");
            for e in catalog.filter(filter) {
                println!("{:20} | {:28} | {:18} | {:6} | {}", e.id, e.name, e.muscle_group, e.sets_scheme, e.rest_spec);
            }
        }

        Some(Commands::Image { raw, check }) => {
            let resolver = config.resolver();
            let src = resolver.resolve(Some(raw.as_str()));
            println!("{}", src);
            if !check {
                for candidate in resolver.fallback_candidates(&src) {
                    println!("  fallback: {}", candidate);
                }
                return Ok(());
            }

            let probe = config.probe();
            if probe.probe(&src).await {
                println!("ok");
                return Ok(());
            }
            let mut handle = ImageHandle::new(src);
            match recover(&resolver, &mut handle, Some(raw.as_str()), &probe, config.retry_delay).await {
                Recovery::Recovered(found) => println!("fallback: {}", found),
                Recovery::Placeholder(label) => println!("missing, showing \"{}\"", label),
                Recovery::Skipped => {}
            }
        }

        Some(Commands::Rest { seconds }) => {
            let mut ticker = RestTicker::new();
            let mut events = ticker.start(seconds);
            println!("{}", ticker.state().display());
            while let Some(event) = events.recv().await {
                match event {
                    TimerEvent::Tick { .. } => println!("{}", ticker.state().display()),
                    TimerEvent::Finished => println!("Descanso concluído!"),
                }
            }
        }

        None | Some(Commands::Tui) => {
            let store = WorkoutStore::open(Database::open(&config.db_path)?);
            let mut app = App::new(store, catalog, &config);
            app.run()?;
        }

        Some(command) => {
            let mut store = WorkoutStore::open(Database::open(&config.db_path)?);
            run_store_command(command, &mut store, &catalog)?;
        }
    }

    Ok(())
}

fn run_store_command<S: KeyValueStore>(
    command: Commands,
    store: &mut WorkoutStore<S>,
    catalog: &Catalog,
) -> Result<()> {
    match command {
        Commands::List => {
            let current = store.current().map(|w| w.id.clone());
            println!("Workouts:");
            println!("{:-<60}", "");
            for w in store.workouts() {
                let mark = if Some(&w.id) == current.as_ref() { "*" } else { " " };
                println!(
                    "{} {} | {:30} | {:2} exercises | {}",
                    mark,
                    w.id,
                    w.name,
                    w.exercises.len(),
                    w.last_used
                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
        }

        Commands::Create { name, exercises, replace } => {
            store.begin_create();
            select(store, catalog, &exercises)?;
            save(store, &name, replace)?;
        }

        Commands::Edit { id, name, exercises, replace } => {
            let id = WorkoutId::new(id);
            store.begin_edit(&id)?;
            if !exercises.is_empty() {
                while store.remove_selected(0).is_some() {}
                select(store, catalog, &exercises)?;
            }
            let name = match name {
                Some(name) => name,
                None => store.draft().map(|d| d.name.clone()).unwrap_or_default(),
            };
            save(store, &name, replace)?;
        }

        Commands::Load { id } => {
            let loaded = store.load_workout(&WorkoutId::new(id))?;
            warn_storage(loaded.storage_error.as_ref());
            println!("Loaded: {} ({} exercises)", loaded.value.name, loaded.value.exercises.len());
        }

        Commands::Delete { id } => {
            let removed = store.delete_workout(&WorkoutId::new(id.clone()));
            warn_storage(removed.storage_error.as_ref());
            if removed.value {
                println!("Deleted: {}", id);
            } else {
                println!("No workout {}", id);
            }
        }

        Commands::Favorites { clear } => {
            if clear {
                let cleared = store.clear_favorites();
                warn_storage(cleared.storage_error.as_ref());
                println!("Favorites cleared");
            } else {
                for e in store.favorites() {
                    println!("{:20} | {:28} | {}", e.id, e.name, e.muscle_group);
                }
            }
        }

        // handled in main without opening the store
        Commands::Tui | Commands::Catalog { .. } | Commands::Image { .. } | Commands::Rest { .. } => {}
    }

    Ok(())
}

fn select<S: KeyValueStore>(store: &mut WorkoutStore<S>, catalog: &Catalog, ids: &[String]) -> Result<()> {
    for id in ids {
        let exercise = catalog
            .find(id)
            .with_context(|| format!("unknown exercise: {}", id))?;
        if store.draft().is_some_and(|d| d.is_selected(id)) {
            continue;
        }
        store.toggle_selection(exercise);
    }
    Ok(())
}

fn save<S: KeyValueStore>(store: &mut WorkoutStore<S>, name: &str, replace: bool) -> Result<()> {
    let committed = match store.save_workout(name)? {
        SaveOutcome::Saved(committed) => committed,
        SaveOutcome::NameConflict { name, .. } if replace => store.confirm_replace(&name)?,
        SaveOutcome::NameConflict { existing, name } => {
            bail!("a workout named \"{}\" already exists ({}); use --replace to overwrite it", name, existing)
        }
    };
    warn_storage(committed.storage_error.as_ref());
    println!("Saved: {} (id: {})", committed.value.name, committed.value.id);
    Ok(())
}

fn warn_storage(error: Option<&StorageError>) {
    if let Some(e) = error {
        eprintln!("warning: not persisted: {}", e);
    }
}
