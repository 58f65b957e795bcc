//! Cookery CLI - Recipe-driven Image Degradation
//!
//! Cook a still image, print random recipes, list the catalog, or run the
//! real-time pipeline against a still image as a stand-in camera.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use cookery::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cookery", version, about = "Cook images with lossy recipes")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed RNG seed for reproducible output.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cook an image and write a JPEG.
    Cook(CookArgs),
    /// Print a random recipe.
    Generate(GenerateArgs),
    /// List the operation catalog.
    List(ListArgs),
    /// Run the real-time pipeline on a still image and save the last frame.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct CookArgs {
    /// Input image.
    input: PathBuf,

    /// Output JPEG path.
    output: PathBuf,

    /// Recipe file to apply instead of a random cook.
    #[arg(long, conflicts_with = "iterations")]
    recipe: Option<PathBuf>,

    /// Number of random steps.
    #[arg(long)]
    iterations: Option<usize>,

    /// Scale random parameters, 0.0 (gentle) to 1.0 (full).
    #[arg(long)]
    strength: Option<f64>,

    /// Print the effective recipe to stdout.
    #[arg(long, default_value_t = false)]
    print_recipe: bool,

    /// Also print the result as a data URL.
    #[arg(long, default_value_t = false)]
    data_url: bool,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Number of steps.
    #[arg(long, conflicts_with = "light")]
    count: Option<usize>,

    /// Short recipe suitable for live frames.
    #[arg(long, default_value_t = false)]
    light: bool,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Emit JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Still image used as the frame source.
    input: PathBuf,

    /// Where to write the last presented frame.
    output: PathBuf,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 30)]
    frames: usize,

    /// Viewport size, e.g. 1280x720.
    #[arg(long, value_parser = parse_dimensions, default_value = "1280x720")]
    viewport: (u32, u32),

    /// Recipe file; a light recipe is generated when omitted.
    #[arg(long)]
    recipe: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => CookConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => CookConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    match cli.cmd {
        Command::Cook(args) => cmd_cook(config, args),
        Command::Generate(args) => cmd_generate(config, args),
        Command::List(args) => cmd_list(&config, args),
        Command::Preview(args) => cmd_preview(config, args),
    }
}

fn cmd_cook(mut config: CookConfig, args: CookArgs) -> anyhow::Result<()> {
    if let Some(strength) = args.strength {
        config = config.with_strength(strength);
    }
    if let Some(iterations) = args.iterations {
        config = config.with_iterations(iterations);
    }
    config.validate()?;

    let mut buffer = cookery::io::load_image(&args.input, config.max_dimension)
        .with_context(|| format!("load image '{}'", args.input.display()))?;
    let quality = config.export_quality;

    let mut kitchen = Kitchen::new(config).with_progress(|update| match update {
        ProgressUpdate::StepApplied { token, duration_ms, .. } => {
            log::info!("  • {token} ({duration_ms}ms)");
        }
        ProgressUpdate::StepSkipped { token, .. } => {
            log::warn!("  • skipped {token}");
        }
        ProgressUpdate::Completed { total_duration_ms, steps_applied, .. } => {
            log::info!("Cooked {steps_applied} step(s) in {total_duration_ms}ms");
        }
        _ => {}
    });

    let report = match &args.recipe {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read recipe '{}'", path.display()))?;
            kitchen.apply(&mut buffer, &Recipe::parse(&text))?
        }
        None => kitchen.cook_random(&mut buffer)?,
    };

    cookery::io::export_jpeg(&buffer, &args.output, quality)
        .with_context(|| format!("write '{}'", args.output.display()))?;

    if args.print_recipe {
        print!("{}", report.effective);
    }
    if args.data_url {
        println!("{}", cookery::io::to_data_url(&buffer, quality)?);
    }
    eprintln!("wrote {}", args.output.display());
    Ok(())
}

fn cmd_generate(config: CookConfig, args: GenerateArgs) -> anyhow::Result<()> {
    config.validate()?;
    let count = args.count.unwrap_or(config.iterations);
    let light = args.light;
    let mut kitchen = Kitchen::new(config);
    let recipe = if light {
        kitchen.generate_light()
    } else {
        kitchen.generate_random(count)
    };
    print!("{recipe}");
    Ok(())
}

fn cmd_list(config: &CookConfig, args: ListArgs) -> anyhow::Result<()> {
    let catalog = OperationCatalog::new(config);
    if args.json {
        let entries: Vec<_> = catalog.iter().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Available operations ({} total):", catalog.len());
    println!();
    for (category, entries) in catalog.grouped_by_category() {
        println!("  {}", category.display_name());
        for info in entries {
            match &info.parameter {
                Some(p) => println!(
                    "      {} <{}>  {} [{}..{}, random {}..{}]",
                    info.token, p.name, info.description, p.min, p.max, p.random.0, p.random.1
                ),
                None => println!("      {}  {}", info.token, info.description),
            }
        }
        println!();
    }
    Ok(())
}

fn cmd_preview(config: CookConfig, args: PreviewArgs) -> anyhow::Result<()> {
    config.validate()?;
    let image = cookery::io::load_image(&args.input, config.max_dimension)
        .with_context(|| format!("load image '{}'", args.input.display()))?;
    let quality = config.export_quality;

    let register = match &args.recipe {
        Some(path) => RecipeRegister::with_text(
            std::fs::read_to_string(path)
                .with_context(|| format!("read recipe '{}'", path.display()))?,
        ),
        None => RecipeRegister::new(),
    };

    let mut workspace = Workspace::new(image.clone());
    let (width, height) = args.viewport;
    let mut pipeline = RealtimePipeline::new(
        StillFrameSource::new(image),
        BufferSink::new(width, height),
        Kitchen::new(config),
    )
    .with_register(register);

    pipeline.start()?;
    log::info!("Live recipe:\n{}", pipeline.register().snapshot());
    for _ in 0..args.frames {
        if let TickOutcome::Stopped(reason) = pipeline.tick(&mut workspace)? {
            log::warn!("Pipeline stopped early: {reason:?}");
            break;
        }
    }
    let stats = pipeline.stats();
    pipeline.stop();

    let frame = pipeline
        .sink_mut()
        .take_last_frame()
        .context("no frame was presented")?;
    cookery::io::export_jpeg(&frame, &args.output, quality)
        .with_context(|| format!("write '{}'", args.output.display()))?;
    eprintln!(
        "wrote {} ({} frame(s), {} fallback)",
        args.output.display(),
        stats.frames_presented,
        stats.fallback_frames
    );
    Ok(())
}

fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w = w.parse().map_err(|_| format!("bad width '{w}'"))?;
    let h = h.parse().map_err(|_| format!("bad height '{h}'"))?;
    if w == 0 || h == 0 {
        return Err("viewport dimensions must be non-zero".to_string());
    }
    Ok((w, h))
}
