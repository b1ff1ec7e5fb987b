use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use mask_packer_core::config::{OutputFormat, PageIndexPolicy};
use mask_packer_core::{
    ComposeConfig, MaskIndex, PageReport, ResampleKernel, decode_atlas, dry_run, pack_masks,
    reports_to_json,
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "mask-packer",
    about = "Paint per-sprite mask images onto the pages of a texture atlas",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose one mask image per atlas page
    Pack(PackArgs),
    /// Decode an atlas and print its pages and sprites
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Atlas text file
    #[arg(help_heading = "Input/Output")]
    atlas: PathBuf,
    /// Directory of mask images, named after the sprites
    #[arg(help_heading = "Input/Output")]
    masks: PathBuf,
    /// Output directory
    #[arg(default_value = ".", help_heading = "Input/Output")]
    out: PathBuf,
    /// YAML config file path (values override the flags below)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob) matched against mask names, e.g. `hero/*`
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob) matched against mask names
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Output
    /// Output image format: png | jpg
    #[arg(short, long, default_value = "png", help_heading = "Output")]
    format: String,
    /// Suffix appended to page names: <page>_<suffix>.<format>
    #[arg(short, long, default_value = "masks", help_heading = "Output")]
    suffix: String,
    /// Keep the alpha channel (default output is fully opaque)
    #[arg(short, long, default_value_t = false, help_heading = "Output")]
    alpha: bool,
    /// When to append the page index to file names: auto | always
    #[arg(long, default_value = "auto", value_parser = ["auto", "always"], help_heading = "Output")]
    page_index: String,

    // Image Processing
    /// Resampling kernel for rotated sprites: nearest | bilinear | bicubic
    #[arg(long, default_value = "bicubic", help_heading = "Image Processing")]
    kernel: String,
    /// Compose pages one after another instead of in parallel
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    sequential: bool,

    // Reporting
    /// Write per-page reports (JSON) to this file
    #[arg(long, help_heading = "Reporting")]
    report: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Reporting")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Reporting")]
    print_config_format: String,
    /// Dry run: decode and match masks but do not write images
    #[arg(long, default_value_t = false, help_heading = "Reporting")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct InspectArgs {
    /// Atlas text file
    atlas: PathBuf,
    /// Output format: json | yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"])]
    output: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args),
        Commands::Inspect(args) => run_inspect(args),
    }
}

fn run_pack(cli: &PackArgs) -> anyhow::Result<()> {
    let mut cfg = compose_config_from_args(cli)?;
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_compose_config(cfg)?;
    }
    cfg.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let start = Instant::now();
    let pages = read_atlas(&cli.atlas)?;
    info!(pages = pages.len(), "decoded atlas");

    let inc_set = build_globset(&cli.include)?;
    let exc_set = build_globset(&cli.exclude)?;
    let masks = MaskIndex::scan_filtered(&cli.masks, |key| {
        !should_skip(key, inc_set.as_ref(), exc_set.as_ref())
    })
    .with_context(|| format!("scan masks {}", cli.masks.display()))?;
    info!(count = masks.len(), root = %cli.masks.display(), "indexed masks");

    let reports = if cli.dry_run {
        dry_run(&pages, &masks, &cfg, &cli.out)
    } else {
        pack_masks(&pages, &masks, &cfg, &cli.out)
            .with_context(|| format!("pack masks into {}", cli.out.display()))?
    };

    log_summary(&reports, cli.dry_run);
    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&reports_to_json(&reports))?;
        fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), "wrote report");
    }
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "done");
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let pages = read_atlas(&args.atlas)?;
    match args.output.as_str() {
        "yaml" => print!("{}", serde_yaml::to_string(&pages)?),
        _ => println!("{}", serde_json::to_string_pretty(&pages)?),
    }
    Ok(())
}

fn read_atlas(path: &Path) -> anyhow::Result<Vec<mask_packer_core::Page>> {
    let file = File::open(path).with_context(|| format!("open atlas {}", path.display()))?;
    decode_atlas(file).with_context(|| format!("decode atlas {}", path.display()))
}

fn log_summary(reports: &[PageReport], dry_run: bool) {
    for r in reports {
        if dry_run {
            for name in &r.skipped {
                warn!(page = %r.page, "skipped {name}: no mask with that name");
            }
            info!(page = %r.page, "would pack {} sprites to {}", r.painted, r.output.display());
        } else {
            info!(page = %r.page, "packed {} sprites to {}", r.painted, r.output.display());
        }
    }
}

fn compose_config_from_args(cli: &PackArgs) -> anyhow::Result<ComposeConfig> {
    Ok(ComposeConfig {
        format: cli.format.parse()?,
        suffix: cli.suffix.clone(),
        keep_alpha: cli.alpha,
        kernel: parse_kernel(&cli.kernel)?,
        page_index: parse_page_index(&cli.page_index)?,
        parallel: !cli.sequential,
    })
}

fn parse_kernel(s: &str) -> anyhow::Result<ResampleKernel> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown kernel {s:?} (expected nearest|bilinear|bicubic)"))
}

fn parse_page_index(s: &str) -> anyhow::Result<PageIndexPolicy> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown page index policy {s:?} (expected auto|always)"))
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("glob {pat:?}"))?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(key: &str, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    if let Some(ex) = exclude {
        if ex.is_match(key) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(key) {
            return true;
        }
    }
    false
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    format: Option<String>,
    suffix: Option<String>,
    keep_alpha: Option<bool>,
    kernel: Option<String>,
    page_index: Option<String>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_compose_config(self, mut cfg: ComposeConfig) -> anyhow::Result<ComposeConfig> {
        if let Some(v) = self.format {
            cfg.format = v.parse::<OutputFormat>()?;
        }
        if let Some(v) = self.suffix {
            cfg.suffix = v;
        }
        if let Some(v) = self.keep_alpha {
            cfg.keep_alpha = v;
        }
        if let Some(v) = self.kernel {
            cfg.kernel = parse_kernel(&v)?;
        }
        if let Some(v) = self.page_index {
            cfg.page_index = parse_page_index(&v)?;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
