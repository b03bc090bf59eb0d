//! Hero CLI
//!
//! Play the hero scene headlessly, print its schedule, or validate content.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hero_animation::TweenEvent;
use hero_core::{ElementId, Style};
use hero_scene::{EffectCatalog, HeroScene, HeroView, MountOutcome, Role, Stage, HERO_SCRIPT};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

#[derive(Parser)]
#[command(name = "hero")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Headless hero scene player", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the scene and advance it frame by frame
    Play {
        /// How long to play, in milliseconds
        #[arg(short, long, default_value = "3000")]
        duration: u32,

        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Print element styles every this many milliseconds
        #[arg(long, default_value = "250")]
        sample: u32,

        /// Unmount the scene at this time, in milliseconds
        #[arg(long)]
        unmount_at: Option<u32>,

        /// Content file (defaults to ./hero.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print samples as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Print when every entrance and loop starts
    Plan {
        /// Content file (defaults to ./hero.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the content file and the effect catalog
    Check {
        /// Content file (defaults to ./hero.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Play {
            duration,
            fps,
            sample,
            unmount_at,
            config,
            json,
        } => cmd_play(
            PlayOptions {
                duration,
                fps,
                sample,
                unmount_at,
                json,
            },
            config.as_deref(),
        ),

        Commands::Plan { config, json } => cmd_plan(config.as_deref(), json),

        Commands::Check { config } => cmd_check(config.as_deref()),
    }
}

fn build_scene(config: Option<&std::path::Path>) -> Result<HeroScene> {
    let content = config::load_content(config)?;
    let catalog = EffectCatalog::standard();
    catalog.validate().context("Effect catalog is invalid")?;
    let scene = HeroScene::new(&catalog, content).context("Failed to compose hero scene")?;
    Ok(scene)
}

struct PlayOptions {
    duration: u32,
    fps: u32,
    sample: u32,
    unmount_at: Option<u32>,
    json: bool,
}

#[derive(Serialize)]
struct Sample<'a> {
    t_ms: u32,
    mounted: bool,
    elements: Vec<(&'a str, Style)>,
}

/// Labelled elements sampled during playback
fn tracked(view: &HeroView) -> Vec<(String, ElementId)> {
    let roles = [
        Role::Title,
        Role::Subtitle,
        Role::Description,
        Role::OrbA,
        Role::OrbB,
        Role::Badge,
        Role::NameHighlight,
        Role::Cta,
        Role::Social,
        Role::ScrollIndicator,
        Role::ScrollBob,
    ];

    let mut out = Vec::new();
    for role in roles {
        let elements = view.elements(role);
        if elements.len() == 1 {
            out.push((role.to_string(), elements[0]));
        } else {
            for (index, element) in elements.into_iter().enumerate() {
                out.push((format!("{role}[{index}]"), element));
            }
        }
    }
    out
}

fn cmd_play(options: PlayOptions, config: Option<&std::path::Path>) -> Result<()> {
    if options.fps == 0 {
        anyhow::bail!("--fps must be greater than zero");
    }
    let mut scene = build_scene(config)?;
    let mut stage = Stage::new();

    let view = scene.render(&mut stage.tree().borrow_mut())?.clone();
    stage.attach(view.root)?;
    match scene.mount(&stage)? {
        MountOutcome::Mounted => info!(
            "Playing hero scene for {}ms at {} fps",
            options.duration, options.fps
        ),
        outcome => anyhow::bail!("Scene did not mount: {:?}", outcome),
    }

    let dt = 1000.0 / options.fps as f32;
    let tracked = tracked(&view);
    let mut next_sample = 0u32;
    let mut events = EventCounts::default();

    loop {
        let now = stage.elapsed_ms().round() as u32;

        if let Some(at) = options.unmount_at {
            if now >= at && scene.is_mounted() {
                scene.unmount();
                info!("Unmounted at {}ms", now);
            }
        }

        if options.sample > 0 && now >= next_sample {
            print_sample(&stage, &tracked, now, scene.is_mounted(), options.json)?;
            next_sample = next_sample.saturating_add(options.sample);
        }

        if now >= options.duration {
            break;
        }

        stage.frame(dt);
        events.record(stage.drain_events());
    }

    info!(
        "{} frames, {} started, {} completed, {} reverted",
        stage.frame_count(),
        events.started,
        events.completed,
        events.reverted
    );
    Ok(())
}

#[derive(Default)]
struct EventCounts {
    started: usize,
    completed: usize,
    reverted: usize,
}

impl EventCounts {
    fn record(&mut self, events: Vec<TweenEvent>) {
        for event in events {
            match event {
                TweenEvent::Started(_) => self.started += 1,
                TweenEvent::Completed(_) => self.completed += 1,
                TweenEvent::Reverted(_) => self.reverted += 1,
                TweenEvent::Killed(_) => {}
            }
        }
    }
}

fn print_sample(
    stage: &Stage,
    tracked: &[(String, ElementId)],
    t_ms: u32,
    mounted: bool,
    json: bool,
) -> Result<()> {
    let elements: Vec<(&str, Style)> = tracked
        .iter()
        .filter_map(|(label, id)| stage.snapshot(*id).map(|style| (label.as_str(), style)))
        .collect();

    if json {
        let sample = Sample {
            t_ms,
            mounted,
            elements,
        };
        println!("{}", serde_json::to_string(&sample)?);
        return Ok(());
    }

    println!("t = {t_ms}ms{}", if mounted { "" } else { " (unmounted)" });
    for (label, style) in elements {
        println!(
            "  {:<18} opacity {:>5.2}  x {:>7.2}  y {:>7.2}  scale {:>5.2}  scale-x {:>5.2}  skew-y {:>5.2}",
            label, style.opacity, style.x, style.y, style.scale, style.scale_x, style.skew_y
        );
    }
    Ok(())
}

fn cmd_plan(config: Option<&std::path::Path>, json: bool) -> Result<()> {
    let scene = build_scene(config)?;
    let plan = scene.plan();

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{:<18} {:<18} {:<10} {:>8} {:>9}",
        "element", "preset", "engine", "delay", "duration"
    );
    for entry in plan {
        let label = match entry.index {
            Some(index) => format!("{}[{}]", entry.role, index),
            None => entry.role.to_string(),
        };
        let duration = if entry.looping {
            format!("{}ms loop", entry.duration_ms)
        } else {
            format!("{}ms", entry.duration_ms)
        };
        println!(
            "{:<18} {:<18} {:<10} {:>6}ms {:>9}",
            label, entry.preset, entry.engine, entry.delay_ms, duration
        );
    }
    Ok(())
}

fn cmd_check(config: Option<&std::path::Path>) -> Result<()> {
    let catalog = EffectCatalog::standard();
    let scene = build_scene(config)?;

    let content = scene.content();
    if content.socials.is_empty() {
        warn!("No social links: the social row will stay empty");
    }

    info!(
        "OK: {} presets, {} cues, {} ctas, {} social links",
        catalog.len(),
        HERO_SCRIPT.len(),
        content.ctas.len(),
        content.socials.len()
    );
    Ok(())
}
