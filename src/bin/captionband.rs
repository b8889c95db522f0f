use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sha2::Digest as _;

use captionband::{
    CpuSurface, DrawCommand, EnvOverrides, FontSet, RecordingSurface, RenderReport, Rgba8,
    Session, StyleConfig, SubtitleSpec, WatermarkSpec,
};

#[derive(Parser, Debug)]
#[command(name = "captionband", version)]
struct Cli {
    /// Log debug details (layout plans, font resolution) to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the captioned image to a file.
    Render(RenderArgs),
    /// Print image dimensions, file size and the layout for a given line count.
    Info(InfoArgs),
    /// Print the layout plan and draw calls as JSON without rasterizing.
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
struct TextArgs {
    /// Subtitle text; each line becomes one band.
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,

    /// Read subtitle text from a file.
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Watermark text drawn in the top-right corner.
    #[arg(long)]
    watermark: Option<String>,
}

#[derive(Args, Debug)]
struct StyleArgs {
    /// Style config JSON.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Subtitle fill color (#RRGGBB or #RRGGBBAA).
    #[arg(long)]
    color: Option<Rgba8>,

    /// Subtitle outline color.
    #[arg(long)]
    stroke_color: Option<Rgba8>,

    /// Subtitle outline width in px (0 disables it).
    #[arg(long)]
    stroke_width: Option<f32>,

    /// Watermark fill color.
    #[arg(long)]
    watermark_color: Option<Rgba8>,

    /// Watermark opacity in [0, 1].
    #[arg(long)]
    watermark_opacity: Option<f32>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input image.
    #[arg(long)]
    image: PathBuf,

    #[command(flatten)]
    text: TextArgs,

    #[command(flatten)]
    style: StyleArgs,

    /// Font file used for all text instead of system fonts.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold font file for subtitles. Without it subtitles use `--font` at its own weight.
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// Output path. Defaults to `captioned_<unix-millis>.png` in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output format. Defaults to the output extension, then PNG.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Print diagnostics about text font resolution (family name + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input image.
    #[arg(long)]
    image: PathBuf,

    /// Number of subtitle lines to plan for.
    #[arg(long, default_value_t = 0)]
    lines: usize,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input image.
    #[arg(long)]
    image: PathBuf,

    #[command(flatten)]
    text: TextArgs,

    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Png,
    Jpeg,
    Bmp,
}

impl From<OutputFormat> for image::ImageFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

#[derive(serde::Serialize)]
struct PlanDump<'a> {
    #[serde(flatten)]
    report: &'a RenderReport,
    lines: &'a [String],
    commands: &'a [DrawCommand],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let env = EnvOverrides::from_env();
    match cli.cmd {
        Command::Render(args) => cmd_render(args, &env),
        Command::Info(args) => cmd_info(args, &env),
        Command::Plan(args) => cmd_plan(args, &env),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_style(args: &StyleArgs, env: &EnvOverrides) -> anyhow::Result<StyleConfig> {
    let mut cfg = match &args.style {
        Some(path) => StyleConfig::from_path(path)?,
        None => StyleConfig::default(),
    };
    cfg.apply_env(env);

    if let Some(c) = args.color {
        cfg.subtitle.color = c;
    }
    if let Some(c) = args.stroke_color {
        cfg.subtitle.stroke_color = c;
    }
    if let Some(w) = args.stroke_width {
        cfg.subtitle.stroke_width = w;
    }
    if let Some(c) = args.watermark_color {
        cfg.watermark.color = c;
    }
    if let Some(o) = args.watermark_opacity {
        cfg.watermark.opacity = o;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn read_subtitle_text(args: &TextArgs) -> anyhow::Result<String> {
    match (&args.text, &args.text_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("read subtitle text '{}'", path.display())),
        (None, None) => Ok(String::new()),
    }
}

fn new_session(surface: CpuSurface, env: &EnvOverrides) -> Session {
    Session::new(surface).with_max_image_bytes(env.max_image_bytes_or_default())
}

fn cmd_render(args: RenderArgs, env: &EnvOverrides) -> anyhow::Result<()> {
    let cfg = load_style(&args.style, env)?;
    let text = read_subtitle_text(&args.text)?;
    let watermark_text = args.text.watermark.clone().unwrap_or_default();

    let subtitle = SubtitleSpec::from_text(&text, cfg.subtitle.clone());
    let watermark = WatermarkSpec::new(&watermark_text, cfg.watermark.clone());

    let font_path = args.font.clone().or(cfg.font.clone());
    let bold_font_path = args.bold_font.clone().or(cfg.bold_font.clone());
    let needs_fonts = !subtitle.is_empty() || !watermark.is_empty() || args.dump_fonts;
    let surface = if needs_fonts {
        let fonts = FontSet::resolve(font_path.as_deref(), bold_font_path.as_deref())
            .context("resolve fonts")?;
        if args.dump_fonts {
            dump_font_diagnostics(&fonts, font_path.as_deref(), bold_font_path.as_deref());
        }
        CpuSurface::new(Some(&fonts))?
    } else {
        CpuSurface::without_fonts()
    };

    let mut session = new_session(surface, env);
    session.load_image_path(&args.image)?;
    session.set_subtitle_style(subtitle.style.clone());
    session.set_subtitle_text(&text);
    session.set_watermark_style(watermark.style.clone());
    session.set_watermark_text(&watermark_text);

    session.render()?;
    if !watermark.is_empty() && session.last_report().is_some_and(|r| r.watermark.is_none()) {
        tracing::warn!("image is too short to fit the watermark; it was skipped");
    }

    let out = args.out.unwrap_or_else(default_output_name);
    let format = match args.format {
        Some(f) => f.into(),
        None => image::ImageFormat::from_path(&out).unwrap_or(image::ImageFormat::Png),
    };
    let bytes = session.export(format)?;

    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, bytes).with_context(|| format!("write image '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_info(args: InfoArgs, env: &EnvOverrides) -> anyhow::Result<()> {
    let mut session = new_session(CpuSurface::without_fonts(), env);
    let info = session.load_image_path(&args.image)?;
    let plan = captionband::LayoutPlan::compute(info.width, info.height, args.lines)?;
    let (canvas_w, canvas_h) = plan.canvas_px();

    println!("image:       {}", args.image.display());
    println!("dimensions:  {}x{}", info.width, info.height);
    println!("file size:   {}", info.display_size());
    println!("lines:       {}", args.lines);
    println!("font size:   {}px", plan.font_size);
    println!("band height: {}px", plan.band_height);
    println!("canvas:      {canvas_w}x{canvas_h}");
    Ok(())
}

fn cmd_plan(args: PlanArgs, env: &EnvOverrides) -> anyhow::Result<()> {
    let cfg = load_style(&args.style, env)?;
    let text = read_subtitle_text(&args.text)?;
    let subtitle = SubtitleSpec::from_text(&text, cfg.subtitle);
    let watermark = WatermarkSpec::new(
        args.text.watermark.as_deref().unwrap_or_default(),
        cfg.watermark,
    );

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("read image '{}'", args.image.display()))?;
    let image = captionband::decode_image_with_limit(&bytes, env.max_image_bytes_or_default())?;

    let mut surface = RecordingSurface::new();
    let report = captionband::render_into(&mut surface, Some(&image), &subtitle, &watermark)?;
    let dump = PlanDump {
        report: &report,
        lines: subtitle.lines(),
        commands: surface.commands(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&dump).context("serialize plan")?
    );
    Ok(())
}

fn default_output_name() -> PathBuf {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    PathBuf::from(format!("captioned_{millis}.png"))
}

fn dump_font_diagnostics(fonts: &FontSet, regular: Option<&Path>, bold: Option<&Path>) {
    eprintln!("text font diagnostics:");
    let faces = [
        ("bold", &fonts.bold, bold.or(regular)),
        ("regular", &fonts.regular, regular),
    ];
    for (role, face, source) in faces {
        let source = source.map_or_else(|| "system".to_string(), |p| p.display().to_string());
        eprintln!("  {role}:");
        eprintln!("    font_source: {source}");
        eprintln!("    family:      {}", face.family());
        eprintln!("    index:       {}", face.index());
        eprintln!("    sha256:      {}", sha256_hex(face.bytes()));
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
