use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use deckforge_core::config::{BuildConfig, OverlapPolicy, SlideSize};
use deckforge_core::deck::{DeckSettings, DeckSpec, render_deck};
use deckforge_core::theme::ThemeName;
use deckforge_core::{DeckReport, analyze, overlap, report_to_json, samples, stats_to_json};
use globset::{Glob, GlobSet, GlobSetBuilder};
use handlebars::Handlebars;
use serde::Deserialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "deckforge",
    about = "Build PowerPoint decks from YAML/JSON and check them for overlapping shapes",
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
    /// Render a deck description into a .pptx file
    Build(BuildArgs),
    /// Report shapes and overlapping elements of existing .pptx files
    Analyze(AnalyzeArgs),
    /// Print or write one of the bundled sample decks
    Example(ExampleArgs),
}

#[derive(Parser, Debug, Clone)]
struct BuildArgs {
    // Input/Output
    /// Deck description (.yaml, .yml or .json)
    #[arg(help_heading = "Input/Output")]
    deck: PathBuf,
    /// Output file (default: <deck stem>.pptx in the current directory)
    #[arg(short, long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    /// YAML config file path (overrides the options below)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Style
    /// Theme: mckinsey | bcg | bain | deloitte
    #[arg(long, help_heading = "Style")]
    theme: Option<String>,
    /// Page size: widescreen | standard | large | 16:9 | 4:3 | <w>x<h> (inches)
    #[arg(long, help_heading = "Style")]
    size: Option<String>,
    /// Font family for template text
    #[arg(long, help_heading = "Style")]
    font: Option<String>,
    /// Omit slide numbers on content slides
    #[arg(long, default_value_t = false, help_heading = "Style")]
    no_slide_numbers: bool,
    /// Chevron bar of the deck's section dividers under each slide header
    #[arg(long, default_value_t = false, help_heading = "Style")]
    navigation: bool,
    /// Text of a logo area to the right of each slide header
    #[arg(long, help_heading = "Style")]
    logo: Option<String>,

    // Checks
    /// What to do with overlapping shapes: ignore | warn | deny
    #[arg(long, value_parser = ["ignore", "warn", "deny"], default_value = "warn", help_heading = "Checks")]
    overlaps: String,

    // Export
    /// Export build stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after deck/CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: render and check the deck but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct AnalyzeArgs {
    /// Input .pptx files or directories
    #[arg(required = true, help_heading = "Input/Output")]
    inputs: Vec<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Write the report to this file instead of stdout
    #[arg(long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    /// Report format: text | json | template
    #[arg(long, value_parser = ["text", "json", "template"], default_value = "text", help_heading = "Report")]
    format: String,
    /// External template file (handlebars), used when --format template
    #[arg(long, help_heading = "Report")]
    template: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
struct ExampleArgs {
    /// Sample name (see --list)
    name: Option<String>,
    /// Write the sample YAML to this file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// List the bundled samples
    #[arg(long, default_value_t = false)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Build(args) => run_build(args),
        Commands::Analyze(args) => run_analyze(args, cli.progress && !cli.quiet),
        Commands::Example(args) => run_example(args),
    }
}

fn run_build(cli: &BuildArgs) -> anyhow::Result<()> {
    let spec = DeckSpec::from_path(&cli.deck)
        .with_context(|| format!("read deck {}", cli.deck.display()))?;
    let file = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            let y: YamlConfig = serde_yaml::from_str(&text)
                .with_context(|| format!("parse config {}", path.display()))?;
            Some(y)
        }
        None => None,
    };
    let (spec, cfg) = merge_config(spec, cli, file)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let base_dir = cli
        .deck
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let start = Instant::now();
    let pres = render_deck(&spec, &cfg, base_dir)
        .with_context(|| format!("render {}", cli.deck.display()))?;
    let overlaps = overlap::enforce(&pres, cfg.overlap_policy)?;
    let stats = pres.stats();
    info!(
        slides = stats.num_slides,
        shapes = stats.num_shapes,
        overlaps,
        elapsed = format!("{:.1}ms", start.elapsed().as_secs_f64() * 1000.0),
        "deck rendered"
    );

    if !cli.dry_run {
        let out_path = cli
            .out
            .clone()
            .unwrap_or_else(|| default_output(&cli.deck));
        if let Some(dir) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        deckforge_core::save(&pres, &out_path)
            .with_context(|| format!("write {}", out_path.display()))?;
        info!(?out_path, slides = pres.slides.len(), "presentation written");
    }

    if let Some(stats_path) = &cli.export_stats {
        let value = stats_to_json(&stats, overlaps);
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{} overlaps={}", stats.summary(), overlaps);
        }
    }
    Ok(())
}

/// Defaults < deck settings < command line < config file. The returned deck
/// has its settings folded into the config, so `render_deck` cannot apply
/// them a second time over the flags.
fn merge_config(
    spec: DeckSpec,
    cli: &BuildArgs,
    file: Option<YamlConfig>,
) -> anyhow::Result<(DeckSpec, BuildConfig)> {
    let mut cfg = spec.effective_config(&BuildConfig::default())?;
    apply_args(cli, &mut cfg)?;
    if let Some(y) = file {
        cfg = y.into_build_config(cfg)?;
    }
    let spec = DeckSpec {
        settings: DeckSettings::default(),
        ..spec
    };
    Ok((spec, cfg))
}

fn apply_args(cli: &BuildArgs, cfg: &mut BuildConfig) -> anyhow::Result<()> {
    if let Some(v) = &cli.theme {
        cfg.theme = parse_theme(v)?;
    }
    if let Some(v) = &cli.size {
        cfg.size = parse_size(v)?;
    }
    if let Some(v) = &cli.font {
        cfg.font_family = v.clone();
    }
    if cli.no_slide_numbers {
        cfg.slide_numbers = false;
    }
    if cli.navigation {
        cfg.navigation = true;
    }
    if let Some(v) = &cli.logo {
        cfg.logo = Some(v.clone());
    }
    cfg.overlap_policy = parse_policy(&cli.overlaps)?;
    Ok(())
}

/// `<deck stem>.pptx` in the working directory.
fn default_output(deck: &Path) -> PathBuf {
    let stem = deck
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("deck");
    PathBuf::from(format!("{stem}.pptx"))
}

fn run_analyze(cli: &AnalyzeArgs, show_progress: bool) -> anyhow::Result<()> {
    let mut paths = Vec::new();
    for input in &cli.inputs {
        paths.extend(gather_paths(input, &cli.include, &cli.exclude)?);
    }
    if paths.is_empty() {
        anyhow::bail!("no .pptx files found");
    }
    let reports = analyze_with_progress(&paths, show_progress)?;
    if reports.is_empty() {
        anyhow::bail!("none of the {} input files could be analyzed", paths.len());
    }
    let total: usize = reports.iter().map(|(_, r)| r.total_overlaps()).sum();
    info!(files = reports.len(), overlaps = total, "analysis finished");

    let rendered = match cli.format.as_str() {
        "text" => {
            let mut out = String::new();
            for (name, report) in &reports {
                out.push_str(&report.render_text(name));
                out.push('\n');
            }
            if reports.len() > 1 {
                out.push_str(&format!(
                    "Total: {} files, {} potential overlapping elements\n",
                    reports.len(),
                    total
                ));
            }
            out
        }
        "json" => serde_json::to_string_pretty(&report_context(&reports))?,
        "template" => {
            let tpl_owned_from_file: Option<String> = match &cli.template {
                Some(path) => Some(
                    fs::read_to_string(path)
                        .with_context(|| format!("read template {}", path.display()))?,
                ),
                None => None,
            };
            let tpl_ref = tpl_owned_from_file
                .as_deref()
                .unwrap_or(include_str!("templates/report.hbs"));
            render_template(tpl_ref, &report_context(&reports))?
        }
        other => anyhow::bail!("unknown report format: {}", other),
    };

    match &cli.out {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("write {}", path.display()))?;
            info!(?path, "report written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Template and JSON context: `{ files: [<report>...], total_overlaps }`.
fn report_context(reports: &[(String, DeckReport)]) -> serde_json::Value {
    let files: Vec<serde_json::Value> = reports
        .iter()
        .map(|(name, r)| report_to_json(r, name))
        .collect();
    let total: usize = reports.iter().map(|(_, r)| r.total_overlaps()).sum();
    serde_json::json!({ "files": files, "total_overlaps": total })
}

fn render_template(tpl: &str, ctx: &serde_json::Value) -> anyhow::Result<String> {
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_escape_fn(handlebars::no_escape);
    reg.register_template_string("tpl", tpl)?;
    Ok(reg.render("tpl", ctx)?)
}

fn analyze_with_progress(
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<(String, DeckReport)>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} analyzing {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match deckforge_core::open(p) {
            Ok(pres) => {
                let report = analyze(&pres);
                if report.total_overlaps() > 0 {
                    warn!(?p, overlaps = report.total_overlaps(), "overlapping elements");
                }
                list.push((p.to_string_lossy().replace('\\', "/"), report));
            }
            Err(e) => {
                error!(?p, error = %e, "skip presentation");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn run_example(cli: &ExampleArgs) -> anyhow::Result<()> {
    let name = match (&cli.name, cli.list) {
        (Some(name), false) => name,
        _ => {
            for s in samples::SAMPLES.iter() {
                println!("{:<22}{}", s.name, s.description);
            }
            return Ok(());
        }
    };
    let Some(sample) = samples::find(name) else {
        let known: Vec<&str> = samples::SAMPLES.iter().map(|s| s.name).collect();
        anyhow::bail!("unknown sample: {} (known: {})", name, known.join(", "));
    };
    match &cli.out {
        Some(path) => {
            fs::write(path, sample.yaml).with_context(|| format!("write {}", path.display()))?;
            info!(?path, sample = sample.name, "sample written");
        }
        None => print!("{}", sample.yaml),
    }
    Ok(())
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

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_pptx(path) {
            list.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_pptx(p) {
                list.push(p.to_path_buf());
            }
        }
    } else {
        warn!(?path, "input does not exist");
    }
    Ok(list)
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

/// `.pptx` files, minus the `~$` lock files Office leaves next to open decks.
fn is_pptx(p: &Path) -> bool {
    let lock = p
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"));
    !lock
        && p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pptx"))
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
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    theme: Option<String>,
    size: Option<String>,
    font_family: Option<String>,
    slide_numbers: Option<bool>,
    overlap_policy: Option<String>,
    navigation: Option<bool>,
    logo: Option<String>,
}

impl YamlConfig {
    fn into_build_config(self, mut cfg: BuildConfig) -> anyhow::Result<BuildConfig> {
        if let Some(v) = self.theme {
            cfg.theme = parse_theme(&v)?;
        }
        if let Some(v) = self.size {
            cfg.size = parse_size(&v)?;
        }
        if let Some(v) = self.font_family {
            cfg.font_family = v;
        }
        if let Some(v) = self.slide_numbers {
            cfg.slide_numbers = v;
        }
        if let Some(v) = self.overlap_policy {
            cfg.overlap_policy = parse_policy(&v)?;
        }
        if let Some(v) = self.navigation {
            cfg.navigation = v;
        }
        if let Some(v) = self.logo {
            cfg.logo = Some(v);
        }
        Ok(cfg)
    }
}

fn parse_theme(s: &str) -> anyhow::Result<ThemeName> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown theme: {} (mckinsey|bcg|bain|deloitte)", s))
}

fn parse_size(s: &str) -> anyhow::Result<SlideSize> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown slide size: {}", s))
}

fn parse_policy(s: &str) -> anyhow::Result<OverlapPolicy> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown overlap policy: {} (ignore|warn|deny)", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_config_overrides_only_given_fields() {
        let y: YamlConfig = serde_yaml::from_str("theme: bcg\nslide_numbers: false\n").unwrap();
        let base = BuildConfig::builder().font_family("Georgia").build();
        let cfg = y.into_build_config(base).unwrap();
        assert_eq!(cfg.theme, ThemeName::Bcg);
        assert!(!cfg.slide_numbers);
        assert_eq!(cfg.font_family, "Georgia");
        assert_eq!(cfg.overlap_policy, OverlapPolicy::Warn);
    }

    #[test]
    fn yaml_config_rejects_bad_values() {
        let y: YamlConfig = serde_yaml::from_str("size: tiny\n").unwrap();
        assert!(y.into_build_config(BuildConfig::default()).is_err());
        assert!(serde_yaml::from_str::<YamlConfig>("colour: red\n").is_err());
    }

    #[test]
    fn cli_flags_parse_into_config() {
        let cli = Cli::try_parse_from([
            "deckforge",
            "build",
            "deck.yaml",
            "--theme",
            "bain",
            "--size",
            "4:3",
            "--no-slide-numbers",
            "--overlaps",
            "deny",
        ])
        .unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        let mut cfg = BuildConfig::default();
        apply_args(&args, &mut cfg).unwrap();
        assert_eq!(cfg.theme, ThemeName::Bain);
        assert_eq!(cfg.size, SlideSize::Standard);
        assert!(!cfg.slide_numbers);
        assert_eq!(cfg.overlap_policy, OverlapPolicy::Deny);
    }

    fn build_args(flags: &[&str]) -> BuildArgs {
        let argv = ["deckforge", "build", "deck.yaml"].iter().chain(flags);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Build(args) => args,
            other => panic!("expected build, got {other:?}"),
        }
    }

    #[test]
    fn config_sources_apply_in_order() {
        let spec = DeckSpec::from_yaml_str(
            r#"
settings: { theme: bcg, size: "4:3", font_family: Georgia, slide_numbers: false }
slides:
  - { kind: key_message, title: Ask, message: Fund phase two }
"#,
        )
        .unwrap();

        // deck settings alone
        let (_, cfg) = merge_config(spec.clone(), &build_args(&[]), None).unwrap();
        assert_eq!(cfg.theme, ThemeName::Bcg);
        assert_eq!(cfg.size, SlideSize::Standard);

        // flags beat the deck
        let args = build_args(&["--theme", "bain", "--size", "widescreen", "--logo", "ACME"]);
        let (_, cfg) = merge_config(spec.clone(), &args, None).unwrap();
        assert_eq!(cfg.theme, ThemeName::Bain);
        assert_eq!(cfg.size, SlideSize::Widescreen);
        assert_eq!(cfg.font_family, "Georgia");
        assert!(!cfg.slide_numbers);

        // the config file beats the flags
        let file: YamlConfig =
            serde_yaml::from_str("theme: deloitte
slide_numbers: true
logo: Initech
").unwrap();
        let (stripped, cfg) = merge_config(spec, &args, Some(file)).unwrap();
        assert_eq!(cfg.theme, ThemeName::Deloitte);
        assert_eq!(cfg.size, SlideSize::Widescreen);
        assert_eq!(cfg.font_family, "Georgia");
        assert!(cfg.slide_numbers);
        assert_eq!(cfg.logo.as_deref(), Some("Initech"));
        assert_eq!(stripped.settings, DeckSettings::default());

        // rendering keeps the merged size instead of the deck's 4:3
        let pres = render_deck(&stripped, &cfg, Path::new(".")).unwrap();
        assert_eq!((pres.width, pres.height), (12_192_000, 6_858_000));
        assert!(pres.slides[0].shapes.iter().any(|s| s.text() == "Initech"));
    }

    #[test]
    fn default_output_uses_the_deck_stem() {
        assert_eq!(
            default_output(Path::new("decks/pitch.yaml")),
            PathBuf::from("pitch.pptx")
        );
    }

    #[test]
    fn discovery_skips_lock_files_and_honours_globs() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("q3");
        fs::create_dir_all(&sub).unwrap();
        for name in ["a.pptx", "~$a.pptx", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::write(sub.join("b.PPTX"), b"").unwrap();

        let all = gather_paths(dir.path(), &[], &[]).unwrap();
        let names: Vec<_> = all
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, ["a.pptx", "b.PPTX"]);

        let only_q3 = gather_paths(dir.path(), &["**/q3/**".into()], &[]).unwrap();
        assert_eq!(only_q3.len(), 1);
        let no_q3 = gather_paths(dir.path(), &[], &["**/q3/**".into()]).unwrap();
        assert_eq!(no_q3.len(), 1);
    }

    #[test]
    fn built_in_sample_builds_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("medichain.pptx");
        let spec = samples::find("medichain").unwrap().spec().unwrap();
        let pres = render_deck(&spec, &BuildConfig::default(), Path::new(".")).unwrap();
        deckforge_core::save(&pres, &out).unwrap();

        let reports = analyze_with_progress(&[out], false).unwrap();
        assert_eq!(reports.len(), 1);
        let ctx = report_context(&reports);
        assert_eq!(ctx["total_overlaps"], 0);
        let text = render_template(include_str!("templates/report.hbs"), &ctx).unwrap();
        assert!(text.contains("medichain.pptx"));
        assert!(text.contains("Total overlapping pairs: 0"));
    }

    #[test]
    fn strict_templates_reject_unknown_fields() {
        let ctx = serde_json::json!({ "files": [], "total_overlaps": 0 });
        assert!(render_template("{{missing}}", &ctx).is_err());
    }
}
