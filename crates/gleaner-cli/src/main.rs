use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gleaner_core::dump::AstDump;
use gleaner_core::export::{ItemExport, PerkExport, SupervisorExport};
use gleaner_core::extract::Extraction;
use gleaner_core::translate::TranslationTable;

#[derive(Parser)]
#[command(name = "gleaner", about = "Game-content record extractor for decompiled scripts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print routine and asset counts from a decompiled AST dump.
    Info {
        /// Path to the decompiled AST dump (JSON).
        #[arg(long)]
        dump: PathBuf,
    },
    /// Extract records and write the JSON export files.
    Extract {
        /// Path to the decompiled AST dump (JSON).
        #[arg(long)]
        dump: PathBuf,
        /// Path to the localization CSV. Without it, text renders in the
        /// diagnostic (untranslated) form.
        #[arg(long)]
        translations: Option<PathBuf>,
        /// Output directory for the export files.
        #[arg(long, default_value = "exports")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Info { dump } => info(&dump),
        Command::Extract {
            dump,
            translations,
            out,
        } => extract(&dump, translations.as_deref(), &out),
    }
}

fn info(dump_path: &Path) -> Result<()> {
    let dump = load_dump(dump_path)?;
    let mut names: Vec<&str> = dump.routine_names().collect();
    names.sort_unstable();

    println!("routines: {}", names.len());
    for name in names {
        println!("  {name}");
    }
    println!("objects: {}", dump.assets.object_count());
    for (kind, table) in &dump.assets.names {
        println!("{kind:?}: {}", table.len());
    }
    Ok(())
}

fn extract(dump_path: &Path, translations: Option<&Path>, out: &Path) -> Result<()> {
    let dump = load_dump(dump_path)?;

    let table = translations
        .map(|path| {
            TranslationTable::from_csv_path(path)
                .with_context(|| format!("failed to load translations from {}", path.display()))
        })
        .transpose()?;
    if let Some(table) = &table {
        eprintln!("[gleaner] loaded {} translation entries", table.len());
    }

    let extraction = Extraction::run(&dump).context("extraction failed")?;
    eprintln!(
        "[gleaner] extracted {} items, {} perks, {} supervisors",
        extraction.items.len(),
        extraction.perks.len(),
        extraction.supervisors.len()
    );

    fs::create_dir_all(out)
        .with_context(|| format!("failed to create output directory {}", out.display()))?;

    let items: Vec<ItemExport> = extraction
        .items
        .iter()
        .map(|item| ItemExport::from_record(item, table.as_ref()))
        .collect();
    write_json(&out.join("items.json"), &items)?;

    let perks: Vec<PerkExport> = extraction
        .perks
        .iter()
        .map(|perk| PerkExport::from_record(perk, table.as_ref()))
        .collect();
    write_json(&out.join("perks.json"), &perks)?;

    let supervisors: Vec<SupervisorExport> = extraction
        .supervisors
        .iter()
        .map(|supervisor| SupervisorExport::from_record(supervisor, table.as_ref()))
        .collect();
    write_json(&out.join("supervisors.json"), &supervisors)?;

    // Sprite rendering happens in a separate tool; we only hand it the
    // names worth exporting.
    let sprites = extraction.sprite_exports(table.as_ref());
    write_json(&out.join("sprite_manifest.json"), &sprites)?;
    eprintln!("[gleaner] {} sprites flagged for export", sprites.len());

    eprintln!("[gleaner] wrote exports to {}", out.display());
    Ok(())
}

fn load_dump(path: &Path) -> Result<AstDump> {
    let dump = AstDump::from_path(path)
        .with_context(|| format!("failed to load AST dump from {}", path.display()))?;
    eprintln!("[gleaner] loaded {} routines", dump.routine_names().count());
    Ok(dump)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
