mod config;
mod input;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use stickwork_audio::{select_backend, start_backend, FileSource, SampleLoader, SampleManifest};
use stickwork_domain::{JsonFileStore, RudimentCatalog, StrokeEvent};
use stickwork_tutor::{BackgroundStore, NextLevel, ProgressionController, StrokeOutcome};
use time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::TrainerConfig;
use crate::input::Command;

#[derive(Parser, Debug)]
#[command(author, version, about = "Practice drum rudiments one stroke at a time", long_about = None)]
struct Cli {
    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory holding the drum samples
    #[arg(long)]
    samples: Option<PathBuf>,
    /// Where progress is saved
    #[arg(long)]
    state: Option<PathBuf>,
    /// YAML rudiment list replacing the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Run without opening an audio device
    #[arg(long)]
    no_audio: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = TrainerConfig::load(cli.config.as_deref())?;
    if let Some(samples) = cli.samples {
        config.samples_dir = samples;
    }
    if let Some(state) = cli.state {
        config.state_path = Some(state);
    }
    if let Some(catalog) = cli.catalog {
        config.catalog_path = Some(catalog);
    }

    let catalog = match &config.catalog_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path.display()))?;
            RudimentCatalog::from_yaml_str(&text)
                .with_context(|| format!("parsing catalog {}", path.display()))?
        }
        None => RudimentCatalog::standard(),
    };
    let rt = Runtime::new()?;
    let file_store = JsonFileStore::new(config.state_path());
    info!(path = %file_store.path().display(), "progress file");
    let (store, writer) = BackgroundStore::spawn(Arc::new(file_store), rt.handle());

    let backend = select_backend(cli.no_audio);
    let mut audio = start_backend(backend.as_ref(), &config.scheduler);
    info!(backend = ?audio.kind, "audio ready");
    let mut controller = ProgressionController::new(
        catalog,
        Box::new(store),
        audio.take_scheduler(),
        config.scheduler.velocity,
    );

    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let loader = SampleLoader::new(FileSource::new(SampleManifest::new(
        config.samples_dir.clone(),
    )));
    rt.spawn(async move { loader.load_progressive(updates_tx).await });

    println!("l/r to play a stroke, `level N` to jump, `status`, `quit`.");
    print_level(&controller);

    let clock = Instant::now();
    let mut last_save = Instant::now();
    let mut stdin = io::stdin().lock();
    let mut raw = Vec::new();
    while let Some(line) = input::next_line(&mut stdin, &mut raw) {
        let at = Duration::seconds_f64(clock.elapsed().as_secs_f64());
        while let Ok(update) = updates.try_recv() {
            controller.on_samples_updated(update);
        }

        match input::parse(&line) {
            Ok(Command::Stroke { hand, velocity }) => {
                let mut event = StrokeEvent::new(hand, at);
                if let Some(velocity) = velocity {
                    event = event.with_velocity(velocity);
                }
                let outcome = controller.handle_stroke(event);
                report(&controller, &outcome);
            }
            Ok(Command::Level(level)) => match controller.change_level(level) {
                Ok(()) => print_level(&controller),
                Err(err) => println!("{err}"),
            },
            Ok(Command::Status) => print_status(&controller),
            Ok(Command::Quit) => break,
            Ok(Command::Empty) => {}
            Err(err) => println!("{err}"),
        }
        let _ = io::stdout().flush();

        if let Some(interval) = config.autosave_interval() {
            if last_save.elapsed() >= interval {
                controller.save();
                last_save = Instant::now();
            }
        }
    }

    let analytics = controller.analytics();
    println!(
        "{} strokes, {} completions, {:.0}% clean",
        analytics.strokes,
        analytics.completions,
        analytics.accuracy() * 100.0
    );
    for (level, bpm) in &analytics.best_bpm {
        println!("  level {level}: best {bpm} bpm");
    }

    controller.save();
    drop(controller);
    if let Err(err) = rt.block_on(writer) {
        warn!(error = %err, "progress writer stopped early");
    }
    rt.shutdown_background();
    drop(audio);
    Ok(())
}

fn print_level(controller: &ProgressionController) {
    let rudiment = controller.current_rudiment();
    let state = controller.state();
    println!(
        "Level {}/{}: {} (sound set {})",
        state.current_level,
        controller.catalog().count(),
        rudiment.name,
        state.sound_set
    );
    println!("  {}", rudiment.sticking());
    let thresholds = rudiment.thresholds;
    println!(
        "  bronze {} / silver {} / gold {} bpm",
        thresholds.bronze(),
        thresholds.silver(),
        thresholds.gold()
    );
}

fn print_status(controller: &ProgressionController) {
    let state = controller.state();
    for rudiment in controller.catalog().iter() {
        let marker = if rudiment.id == state.current_level { ">" } else { " " };
        let tier = if state.is_accessible(rudiment.id) {
            state.achievement(rudiment.id).to_string()
        } else {
            "locked".to_string()
        };
        println!("{marker} {:>2} {:<24} {tier}", rudiment.id, rudiment.name);
    }
    if controller.is_all_complete() {
        println!("  every level complete");
    }
    let matcher = controller.matcher();
    println!(
        "  {}/{} strokes into the current attempt",
        matcher.index(),
        matcher.rudiment().len()
    );
}

fn report(controller: &ProgressionController, outcome: &StrokeOutcome) {
    match outcome {
        StrokeOutcome::Advanced { index, total } => println!("  {index}/{total}"),
        StrokeOutcome::Mismatch { expected, played } => match expected {
            Some(expected) => println!("  expected {expected}, got {played}. Start again."),
            None => println!("  start again"),
        },
        StrokeOutcome::Completed(notice) => {
            let tempo = notice
                .bpm
                .map(|bpm| format!("{bpm} bpm"))
                .unwrap_or_else(|| "no tempo".to_string());
            println!(
                "{} complete: {} ({tempo}), best {}",
                notice.rudiment, notice.tier, notice.achievement
            );
            if notice.sound_unlocked {
                println!("New sound set unlocked!");
            }
            match notice.next {
                NextLevel::Level(_) => print_level(controller),
                NextLevel::AllComplete => println!("All levels complete."),
            }
        }
    }
}
