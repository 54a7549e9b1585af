// Leafeon CLI binary

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use clap::{Parser, Subcommand};
use anyhow::Result;

use leafeon::constants::PLANTNET_DEFAULT_ORGAN;
use leafeon::identify::{save_identified, PlantIdentifier};
use leafeon::photos::import_photo;
use leafeon::{LeafeonConfig, PlantRecord, PlantRecordStore};

#[derive(Parser)]
#[command(name = "leafeon")]
#[command(about = "Leafeon - A gallery of the plants you photograph", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory (defaults to LEAFEON_DATA_DIR or ~/.leafeon)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all saved plants
    List,

    /// Search plants by name or description
    Search {
        /// Text to look for (case-insensitive)
        query: String,
    },

    /// Show plant details
    Show {
        /// Plant ID
        id: String,
    },

    /// Add a photo to the gallery
    Add {
        /// Photo to import
        photo: PathBuf,
        /// Plant name
        #[arg(short, long)]
        name: Option<String>,
        /// Notes about the plant
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Identify a photo with Pl@ntNet
    Identify {
        /// Photo to identify
        photo: PathBuf,
        /// Save the result to the gallery
        #[arg(long)]
        save: bool,
        /// Photographed organ (flower, leaf, fruit, bark, auto)
        #[arg(long, default_value = PLANTNET_DEFAULT_ORGAN)]
        organ: String,
    },

    /// Edit a plant's name and description
    Edit {
        /// Plant ID
        id: String,
        /// New name
        #[arg(short, long)]
        name: String,
        /// New description
        #[arg(short, long)]
        description: String,
    },

    /// Delete a plant
    Delete {
        /// Plant ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = resolve_config(cli.data_dir)?;

    match cli.command {
        Commands::List => cmd_list(&config),
        Commands::Search { query } => cmd_search(&config, &query),
        Commands::Show { id } => cmd_show(&config, &id),
        Commands::Add { photo, name, description } => cmd_add(&config, photo, name, description),
        Commands::Identify { photo, save, organ } => cmd_identify(&config, photo, save, &organ),
        Commands::Edit { id, name, description } => cmd_edit(&config, &id, &name, &description),
        Commands::Delete { id, yes } => cmd_delete(&config, &id, yes),
    }
}

fn cmd_list(config: &LeafeonConfig) -> Result<()> {
    let store = open_loaded_store(config)?;
    let plants = store.plants();

    println!("Gallery: {} ({} plants)", config.data_dir.display(), plants.len());
    println!();

    if plants.is_empty() {
        println!("No plants yet. Use 'leafeon add <photo>' to save one.");
        return Ok(());
    }

    print_table(&plants);
    Ok(())
}

fn cmd_search(config: &LeafeonConfig, query: &str) -> Result<()> {
    let store = open_loaded_store(config)?;
    let matches = store.search(query);

    if matches.is_empty() {
        println!("No plants match '{}'", query);
        return Ok(());
    }

    println!("{} match(es) for '{}'", matches.len(), query);
    println!();
    print_table(&matches);
    Ok(())
}

fn cmd_show(config: &LeafeonConfig, id: &str) -> Result<()> {
    let store = open_loaded_store(config)?;
    let plant = store
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Plant {} not found", id))?;

    println!("Plant {}", plant.id);
    println!();
    println!("Name:        {}", plant.name);
    println!("Description: {}", plant.description);
    println!("Photo:       {}", plant.uri);

    if let Some(ref family) = plant.metadata.family {
        println!("Family:      {}", family);
    }
    if let Some(probability) = plant.metadata.probability {
        println!("Confidence:  {}", format_probability(probability));
    }

    Ok(())
}

fn cmd_add(
    config: &LeafeonConfig,
    photo: PathBuf,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let store = open_loaded_store(config)?;
    let imported = import_photo(&photo, &config.photos_dir())?;

    let plant = store.add(
        &imported.to_string_lossy(),
        name.as_deref().unwrap_or_default(),
        description.as_deref().unwrap_or_default(),
        None,
    )?;

    println!("Saved '{}' as {}", plant.name, plant.id);
    println!("  Photo: {}", plant.uri);
    Ok(())
}

fn cmd_identify(config: &LeafeonConfig, photo: PathBuf, save: bool, organ: &str) -> Result<()> {
    let client = config.plantnet_client()?.with_organ(organ);

    let identification = match client.identify(&photo)? {
        Some(identification) => identification,
        None => {
            println!("Pl@ntNet could not identify {}", photo.display());
            return Ok(());
        }
    };

    println!("Identified {}", photo.display());
    println!();
    println!("Species:     {}", identification.scientific_name.as_deref().unwrap_or("-"));
    println!("Common name: {}", identification.common_name.as_deref().unwrap_or("-"));
    println!("Family:      {}", identification.family.as_deref().unwrap_or("-"));
    println!(
        "Confidence:  {}",
        identification
            .score
            .map(format_probability)
            .unwrap_or_else(|| "-".to_string())
    );

    if save {
        let store = open_loaded_store(config)?;
        let imported = import_photo(&photo, &config.photos_dir())?;
        let plant = save_identified(&store, &imported.to_string_lossy(), &identification)?;
        println!();
        println!("Saved '{}' as {}", plant.name, plant.id);
    }

    Ok(())
}

fn cmd_edit(config: &LeafeonConfig, id: &str, name: &str, description: &str) -> Result<()> {
    let store = open_loaded_store(config)?;
    let plant = store.update(id, name, description)?;

    println!("Updated {}", plant.id);
    println!("  Name:        {}", plant.name);
    println!("  Description: {}", plant.description);
    Ok(())
}

fn cmd_delete(config: &LeafeonConfig, id: &str, yes: bool) -> Result<()> {
    let store = open_loaded_store(config)?;

    let plant = match store.get(id) {
        Some(plant) => plant,
        None => {
            println!("No plant with id {}", id);
            return Ok(());
        }
    };

    if !yes && !confirm(&format!("Delete '{}' ({})?", plant.name, plant.id))? {
        println!("Cancelled");
        return Ok(());
    }

    if store.delete(id)? {
        println!("Deleted '{}'", plant.name);
    }
    Ok(())
}

// --- Helper Functions ---

fn resolve_config(data_dir: Option<PathBuf>) -> Result<LeafeonConfig> {
    let config = LeafeonConfig::from_env()?;
    Ok(match data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    })
}

/// Open the store and load it, reporting load warnings on stderr.
fn open_loaded_store(config: &LeafeonConfig) -> Result<PlantRecordStore> {
    let store = config.open_store()?;
    let report = store.load()?;
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(store)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_table(plants: &[PlantRecord]) {
    println!("{:<36}  {:<24}  {:>6}  {}", "ID", "Name", "Conf", "Description");
    println!("{}", "-".repeat(90));

    for plant in plants {
        let confidence = plant
            .metadata
            .probability
            .map(format_probability)
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<36}  {:<24}  {:>6}  {}",
            plant.id,
            truncate(&plant.name, 24),
            confidence,
            truncate(&plant.description, 40)
        );
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
