use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use padcraft::{
    BackgroundCache, Compositor, FilterChain, FontBook, FsResolver, ImageSource, LayerState,
    OutputFormat, ProductSizeTable, RenderDriver, RenderSettings, encode_raster, template_raster,
};

#[derive(Parser, Debug)]
#[command(name = "padcraft", version)]
struct Cli {
    /// Log debug events to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a design configuration to an image.
    Render(RenderArgs),
    /// Make the flat background of a template image transparent.
    RemoveBg(RemoveBgArgs),
    /// Print the CSS filter string previews use for a configuration.
    Css(CssArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input configuration JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path, or `-` to print a data URL.
    #[arg(long)]
    out: PathBuf,

    /// Output format. Defaults to the output extension, then PNG.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Named product size (e.g. `400x900`) to render at instead of the design canvas.
    #[arg(long)]
    size: Option<String>,

    /// Product size table JSON. The built-in table is used when omitted.
    #[arg(long)]
    sizes: Option<PathBuf>,

    /// Directory relative image paths resolve against. Defaults to the input's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Directory of .ttf/.otf files for text elements.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Also load fonts installed on this machine.
    #[arg(long)]
    system_fonts: bool,
}

#[derive(Parser, Debug)]
struct RemoveBgArgs {
    /// Template image (PNG, JPEG or SVG).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// RGB distance below which a pixel counts as background.
    #[arg(long)]
    tolerance: Option<f32>,
}

#[derive(Parser, Debug)]
struct CssArgs {
    /// Input configuration JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::RemoveBg(args) => cmd_remove_bg(args),
        Command::Css(args) => cmd_css(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<LayerState> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open configuration '{}'", path.display()))?;
    let state = LayerState::from_config_json(&text)
        .with_context(|| format!("parse configuration '{}'", path.display()))?;
    state.validate()?;
    Ok(state)
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let state = read_config(&args.in_path)?;
    let settings = RenderSettings::from_env();

    let mut fonts = if args.system_fonts {
        FontBook::with_system_fonts()
    } else {
        FontBook::new()
    };
    if let Some(dir) = &args.fonts {
        let n = fonts.load_dir(dir);
        tracing::info!(dir = %dir.display(), files = n, "loaded fonts");
    }

    let root = args
        .assets
        .clone()
        .unwrap_or_else(|| parent_dir(&args.in_path));
    let compositor = Compositor::new(settings)
        .with_fonts(Arc::new(fonts))
        .with_resolver(Arc::new(FsResolver::new(root)));
    let mut driver = RenderDriver::new(compositor);

    let to_stdout = args.out.as_os_str() == "-";
    let format = args
        .format
        .or_else(|| (!to_stdout).then(|| OutputFormat::from_path(&args.out)).flatten())
        .unwrap_or_default();

    let output = match &args.size {
        Some(name) => {
            let table = match &args.sizes {
                Some(p) => ProductSizeTable::from_path(p)?,
                None => ProductSizeTable::standard(),
            };
            driver.render_for_product(&state, &table, name, format)?
        }
        None => driver.render_final(&state, format)?,
    };

    for skipped in &output.skipped {
        eprintln!("skipped {}: {}", skipped.layer, skipped.reason);
    }
    if output.placeholder {
        eprintln!("base image unavailable; wrote placeholder");
    }

    if to_stdout {
        println!("{}", output.data_url());
    } else {
        std::fs::write(&args.out, &output.image.bytes)
            .with_context(|| format!("write image '{}'", args.out.display()))?;
    }
    Ok(())
}

fn cmd_remove_bg(args: RemoveBgArgs) -> anyhow::Result<()> {
    let settings = RenderSettings::from_env();
    let tolerance = args.tolerance.unwrap_or(settings.background_tolerance);

    let path = std::path::absolute(&args.in_path)
        .with_context(|| format!("resolve '{}'", args.in_path.display()))?;
    let resolver = FsResolver::new(parent_dir(&path));
    let source = ImageSource::new(path.to_string_lossy().into_owned());
    let raster = template_raster(BackgroundCache::global(), &source, &resolver, tolerance)
        .with_context(|| format!("remove background of '{}'", args.in_path.display()))?;

    let png = encode_raster(&raster, OutputFormat::Png, settings.jpeg_quality)?;
    std::fs::write(&args.out, &png.bytes)
        .with_context(|| format!("write image '{}'", args.out.display()))?;
    Ok(())
}

fn cmd_css(args: CssArgs) -> anyhow::Result<()> {
    let state = read_config(&args.in_path)?;
    println!(
        "{}",
        FilterChain::for_design(&state.adjustments, state.filter)
    );
    Ok(())
}
