//! Stockmeta CLI: generate and curate stock-marketplace metadata.
//!
//! Configuration comes from STOCKMETA_* environment variables (or `.env`);
//! credentials live in the settings document edited with `settings set`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stockmeta_cli::{init_tracing, map_istock, set_setting, truncate_string, Runtime};
use stockmeta_core::constants::CREATED_AT_FORMAT;
use stockmeta_core::{AppConfig, Language, MediaAsset};
use stockmeta_worker::{PipelineEvent, SessionUpdate};
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Parser)]
#[command(name = "stockmeta", about = "Stock metadata generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate title, description and keywords for one file and save them
    Generate {
        /// Image or video file
        file: PathBuf,
        /// Extra context passed to the model
        #[arg(long, default_value = "")]
        hint: String,
    },
    /// Build list thumbnails for every supported file in a folder
    Thumbs {
        folder: PathBuf,
    },
    /// Show the records stored for a folder
    Records {
        folder: PathBuf,
        /// Print full records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Learned iStock vocabulary
    Vocab {
        #[command(subcommand)]
        sub: VocabCommands,
    },
    /// Operator settings
    Settings {
        #[command(subcommand)]
        sub: SettingsCommands,
    },
    /// Translate a piece of text
    Translate {
        text: String,
        /// Target language: en or tr
        #[arg(long)]
        to: Language,
    },
    /// Find and replace across every field of a stored record
    Replace {
        file: PathBuf,
        #[arg(long)]
        find: String,
        #[arg(long = "with")]
        replacement: String,
    },
    /// Re-apply the learned vocabulary to a stored record's iStock keywords
    MapIstock {
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum VocabCommands {
    List,
    /// Map a general term to the platform's preferred term
    Add { general: String, term: String },
    Remove { general: String },
}

#[derive(Subcommand)]
enum SettingsCommands {
    Show,
    /// Set one field: groq_api_key, everypixels_id, everypixels_secret or save_dir
    Set { field: String, value: String },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let runtime = Runtime::load(config).await?;

    match cli.command {
        Commands::Generate { file, hint } => {
            let asset = MediaAsset::new(&file)?;
            let orchestrator = Arc::new(runtime.orchestrator()?);
            let (tx, mut rx) = mpsc::unbounded_channel();
            orchestrator.spawn_generation(asset, hint, tx);

            while let Some(event) = rx.recv().await {
                match event {
                    PipelineEvent::Progress { stage, .. } => eprintln!("  {}", stage),
                    PipelineEvent::Finished { record } => print_json(&record)?,
                    PipelineEvent::Autosaved { record, saved } => {
                        if !saved {
                            warn!(path = %record.path, "Record was generated but not saved");
                        }
                        break;
                    }
                    PipelineEvent::Failed { error, .. } => return Err(error.into()),
                }
            }
        }
        Commands::Thumbs { folder } => {
            let mut session = runtime.session()?;
            let count = session.open_folder(&folder).await?;
            let mut failed = 0usize;
            if count > 0 {
                loop {
                    match session.next_update().await {
                        SessionUpdate::ThumbnailReady { path, loaded } => {
                            if !loaded {
                                failed += 1;
                            }
                            println!("{} {}", if loaded { "ok  " } else { "fail" }, path);
                        }
                        SessionUpdate::ThumbnailsFinished => break,
                        _ => {}
                    }
                }
            }
            println!(
                "{} files, {} thumbnails failed, cache at {}",
                count,
                failed,
                runtime.config.thumbnail_dir().display()
            );
        }
        Commands::Records { folder, json } => {
            let records = runtime.records.load(&folder).await?;
            if json {
                print_json(&records.values().collect::<Vec<_>>())?;
            } else {
                for record in records.values() {
                    let kw = &record.keywords;
                    println!(
                        "{:<32} {} {:<48} {}/{}/{}",
                        truncate_string(&record.file_name, 32),
                        record.created_at.format(CREATED_AT_FORMAT),
                        truncate_string(&record.title.en, 48),
                        kw.adobe.en.len(),
                        kw.shutterstock.en.len(),
                        kw.istock.en.len(),
                    );
                }
                println!("{} records", records.len());
            }
        }
        Commands::Vocab { sub } => match sub {
            VocabCommands::List => {
                for (general, term) in runtime.vocabulary.entries().await? {
                    println!("{} -> {}", general, term);
                }
            }
            VocabCommands::Add { general, term } => {
                runtime.vocabulary.upsert(&general, &term).await?;
                println!("{} -> {}", general.trim().to_lowercase(), term.trim());
            }
            VocabCommands::Remove { general } => {
                if !runtime.vocabulary.remove(&general).await? {
                    anyhow::bail!("No vocabulary entry for '{}'", general);
                }
                println!("Removed '{}'", general);
            }
        },
        Commands::Settings { sub } => match sub {
            SettingsCommands::Show => {
                println!("settings file: {}", runtime.settings_store.path().display());
                println!("{:#?}", runtime.settings);
            }
            SettingsCommands::Set { field, value } => {
                let mut settings = runtime.settings.clone();
                set_setting(&mut settings, &field, &value)?;
                runtime.settings_store.save(&settings).await?;
                println!("Updated {}", field);
            }
        },
        Commands::Translate { text, to } => {
            let orchestrator = runtime.orchestrator()?;
            println!("{}", orchestrator.translation().translate(&text, to).await?);
        }
        Commands::Replace {
            file,
            find,
            replacement,
        } => {
            let mut record = runtime.stored_record(&file).await?;
            let changed = record.replace_all(&find, &replacement);
            if changed > 0 {
                runtime.save_record(&mut record).await?;
            }
            println!("{} fields changed", changed);
        }
        Commands::MapIstock { file } => {
            let mut record = runtime.stored_record(&file).await?;
            let replaced = map_istock(&runtime.vocabulary, &mut record).await;
            runtime.save_record(&mut record).await?;
            println!("{} iStock keywords replaced", replaced);
        }
    }

    Ok(())
}
