use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use longpage_core::archive::{is_image_filename, is_zip_filename};
use longpage_core::bundle::{archive_file_name, composite_file_name};
use longpage_core::normalize::scaled_height;
use longpage_core::partition::partition;
use longpage_core::{
    AlphaPolicy, BuildConfig, IngestReport, WorkingSet, build, plan_layout, to_json_summary,
};
use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "longpage",
    about = "Stack product images into a long detail page (JPG + Photoshop build scripts)",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the composite JPG and the zip bundle
    Build(BuildArgs),
    /// Layout-only: print offsets per partition as JSON, encode nothing
    Plan(BuildArgs),
}

#[derive(Parser, Debug, Clone)]
struct BuildArgs {
    // Input/Output
    /// Input files, directories or .zip archives (in order)
    #[arg(required = true, help_heading = "Input/Output")]
    inputs: Vec<PathBuf>,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Base name (files will be name.jpg / name_bundle.zip)
    #[arg(short, long, default_value = "detail_page", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (overrides layout options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Canvas width in pixels
    #[arg(long, default_value_t = 900, help_heading = "Layout")]
    width: u32,
    /// Top padding
    #[arg(long, default_value_t = 180, help_heading = "Layout")]
    top: u32,
    /// Bottom padding
    #[arg(long, default_value_t = 250, help_heading = "Layout")]
    bottom: u32,
    /// Gap between images
    #[arg(long, default_value_t = 300, help_heading = "Layout")]
    gap: u32,

    // Limits
    /// Images per Photoshop script
    #[arg(long, default_value_t = 10, help_heading = "Limits")]
    max_per_group: usize,
    /// Maximum number of scripts
    #[arg(long, default_value_t = 2, help_heading = "Limits")]
    max_groups: usize,
    /// Maximum images accepted per build
    #[arg(long, default_value_t = 20, help_heading = "Limits")]
    max_total: usize,

    // Image Processing
    /// JPEG quality (1..=100)
    #[arg(long, default_value_t = 95, help_heading = "Image Processing")]
    quality: u8,
    /// Transparent pixels: flatten | discard
    #[arg(long, default_value = "flatten", help_heading = "Image Processing")]
    alpha_policy: String,
    /// Normalize images in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    parallel: bool,

    // Export
    /// Export a build summary (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_summary: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: build everything in memory but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let show_progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Build(args) => run_build(args, show_progress),
        Commands::Plan(args) => run_plan(args, show_progress),
    }
}

fn run_build(args: &BuildArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = resolve_config(args)?;
    if args.print_config {
        return print_config(&cfg, &args.print_config_format);
    }

    let set = load_working_set(args, &cfg, show_progress)?;
    let out = build(set.snapshot(), &args.name, &cfg).context("build detail page")?;
    info!("{}", out.summary.describe());

    if args.dry_run {
        info!(
            entries = out.bundle.entries.len(),
            "dry run: nothing written"
        );
    } else {
        fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;

        let zip_path = args.out_dir.join(archive_file_name(&out.base_name));
        let zip_bytes = out.archive_bytes()?;
        fs::write(&zip_path, &zip_bytes)
            .with_context(|| format!("write {}", zip_path.display()))?;

        let jpg_path = args.out_dir.join(composite_file_name(&out.base_name));
        fs::write(&jpg_path, &out.composite_jpeg)
            .with_context(|| format!("write {}", jpg_path.display()))?;

        info!(
            ?zip_path,
            ?jpg_path,
            scripts = out.partitions.len(),
            bytes = zip_bytes.len(),
            "bundle written"
        );
    }

    if let Some(summary_path) = &args.export_summary {
        let json = serde_json::to_string_pretty(&to_json_summary(&out.summary))?;
        fs::write(summary_path, json)
            .with_context(|| format!("write {}", summary_path.display()))?;
        info!(?summary_path, "summary exported");
    }
    Ok(())
}

fn run_plan(args: &BuildArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = resolve_config(args)?;
    if args.print_config {
        return print_config(&cfg, &args.print_config_format);
    }

    let set = load_working_set(args, &cfg, show_progress)?;
    // source dimensions are enough; nothing is resized or encoded
    let heights: Vec<u32> = set
        .snapshot()
        .iter()
        .map(|a| scaled_height(a.width, a.height, cfg.canvas_width))
        .collect();
    let plan = plan_layout(cfg.canvas_width, &heights, cfg.spacing)?;
    let parts = partition(&heights, &cfg)?;

    let names: Vec<&str> = set.snapshot().iter().map(|a| a.name.as_str()).collect();
    let partitions: Vec<serde_json::Value> = parts
        .iter()
        .map(|p| {
            serde_json::json!({
                "number": p.number,
                "images": &names[p.range.clone()],
                "offsets": p.plan.offsets(),
                "height": p.plan.total_height,
            })
        })
        .collect();
    let value = serde_json::json!({
        "width": plan.width,
        "totalHeight": plan.total_height,
        "images": names,
        "heights": heights,
        "offsets": plan.offsets(),
        "partitions": partitions,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn resolve_config(args: &BuildArgs) -> anyhow::Result<BuildConfig> {
    let alpha_policy: AlphaPolicy = args
        .alpha_policy
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown alpha policy: {}", args.alpha_policy))?;
    let mut cfg = BuildConfig::builder()
        .canvas_width(args.width)
        .spacing(args.top, args.bottom, args.gap)
        .max_per_group(args.max_per_group)
        .max_groups(args.max_groups)
        .max_total(args.max_total)
        .jpeg_quality(args.quality)
        .alpha_policy(alpha_policy)
        .parallel(args.parallel)
        .build();

    // YAML values win over flags
    if let Some(path) = &args.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_build_config(cfg)?;
    }
    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

fn print_config(cfg: &BuildConfig, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(())
}

fn load_working_set(
    args: &BuildArgs,
    cfg: &BuildConfig,
    show_progress: bool,
) -> anyhow::Result<WorkingSet> {
    let paths = gather_paths(&args.inputs, &args.include, &args.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no image or zip files found in the given inputs");
    }
    let mut set = WorkingSet::new(cfg.max_total);
    let report = ingest_with_progress(&mut set, &paths, show_progress)?;
    info!(
        added = report.added,
        duplicates = report.duplicates,
        over_limit = report.over_limit,
        failed = report.failed.len(),
        "loaded input images"
    );
    if report.over_limit > 0 {
        warn!(
            limit = cfg.max_total,
            ignored = report.over_limit,
            "image limit reached; remaining images were ignored"
        );
    }
    if set.is_empty() {
        anyhow::bail!("no usable images ({} rejected)", report.rejected());
    }
    Ok(set)
}

fn gather_paths(
    inputs: &[PathBuf],
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    for path in inputs {
        if !path.exists() {
            anyhow::bail!("input not found: {}", path.display());
        }
        if path.is_file() {
            if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_upload(path) {
                list.push(path.to_path_buf());
            }
            continue;
        }
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_upload(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("invalid glob {pat}"))?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_upload(p: &Path) -> bool {
    let name = p.to_string_lossy();
    is_image_filename(&name) || is_zip_filename(&name)
}

fn ingest_with_progress(
    set: &mut WorkingSet,
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<IngestReport> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut report = IngestReport::default();
    for p in paths {
        let name = p
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| p.to_string_lossy().into_owned());
        if let Some(b) = &bar {
            b.set_message(name.clone());
        }
        match fs::read(p) {
            Ok(bytes) => set.add_upload(&name, bytes, &mut report),
            Err(e) => {
                warn!(?p, error = %e, "skip unreadable file");
                report.failed.push((name, e.to_string()));
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(report)
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

#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    canvas_width: Option<u32>,
    top: Option<u32>,
    bottom: Option<u32>,
    gap: Option<u32>,
    max_per_group: Option<usize>,
    max_groups: Option<usize>,
    max_total: Option<usize>,
    jpeg_quality: Option<u8>,
    alpha_policy: Option<String>,
    background: Option<[u8; 3]>,
    max_translate_step: Option<u32>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_build_config(self, mut cfg: BuildConfig) -> anyhow::Result<BuildConfig> {
        if let Some(v) = self.canvas_width {
            cfg.canvas_width = v;
        }
        if let Some(v) = self.top {
            cfg.spacing.top = v;
        }
        if let Some(v) = self.bottom {
            cfg.spacing.bottom = v;
        }
        if let Some(v) = self.gap {
            cfg.spacing.gap = v;
        }
        if let Some(v) = self.max_per_group {
            cfg.max_per_group = v;
        }
        if let Some(v) = self.max_groups {
            cfg.max_groups = v;
        }
        if let Some(v) = self.max_total {
            cfg.max_total = v;
        }
        if let Some(v) = self.jpeg_quality {
            cfg.jpeg_quality = v;
        }
        if let Some(s) = self.alpha_policy {
            cfg.alpha_policy = s
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown alpha policy in config: {s}"))?;
        }
        if let Some(v) = self.background {
            cfg.background = v;
        }
        if let Some(v) = self.max_translate_step {
            cfg.max_translate_step = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
