use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a template to a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input template JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 1080)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Replace the caption text.
    #[arg(long)]
    caption: Option<String>,

    /// Replace the CTA label.
    #[arg(long)]
    cta: Option<String>,

    /// Replace the background color (`#RRGGBB`).
    #[arg(long)]
    background: Option<String>,

    /// Image overriding the stock mask: a path under the assets root, an http(s) URL or a data URL.
    #[arg(long)]
    image: Option<String>,

    /// Directory relative asset paths resolve against. Defaults to the template's directory.
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Keep transparency instead of flattening onto the background color.
    #[arg(long)]
    no_matte: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
    }
}

fn apply_overrides(
    config: &mut adframe::TemplateConfig,
    args: &RenderArgs,
) -> anyhow::Result<()> {
    if let Some(text) = &args.caption {
        config.caption.text = text.clone();
    }
    if let Some(text) = &args.cta {
        config.cta.text = text.clone();
    }
    if let Some(color) = &args.background {
        config.background_color = adframe::Color::from_hex(color)
            .with_context(|| format!("parse --background '{color}'"))?;
    }
    if let Some(image) = &args.image {
        config.urls.mask = adframe::AssetRef::parse(image)
            .with_context(|| format!("parse --image '{}'", short(image)))?;
    }
    Ok(())
}

fn short(s: &str) -> &str {
    s.get(..64).unwrap_or(s)
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = adframe::TemplateConfig::from_path(&args.in_path)
        .with_context(|| format!("load template '{}'", args.in_path.display()))?;
    apply_overrides(&mut config, &args)?;

    let canvas = adframe::Canvas::new(args.width, args.height)?;
    config.validate(canvas)?;

    let assets_root = args.assets_root.clone().unwrap_or_else(|| {
        args.in_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    });
    let loader =
        adframe::AssetLoader::with_config(adframe::LoaderConfig::default().with_assets_root(assets_root))
            .context("create asset loader")?;
    let session = adframe::RenderSession::new(loader, adframe::RenderSessionOpts { canvas })?;

    let outcome = session.render_template(&config).await?;
    let Some(report) = outcome.report() else {
        anyhow::bail!("render pass was superseded");
    };
    for defect in &report.defects {
        eprintln!("warning: skipped {}: {}", defect.layer, defect.reason);
    }

    let surface = session.snapshot();
    let surface = if args.no_matte {
        surface
    } else {
        surface.flatten_onto(config.background_color)
    };
    surface
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
