use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use stickgrid::{
    ColorSpec, DEFAULT_DURATION_MS, Editor, ExportOpts, RenderSettings, SelectionRect, TemplateDir,
    ViewportMode, ViewportPolicy,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stickgrid", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame of an animation as a PNG.
    Frame(FrameArgs),
    /// Export an animation as an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print frame summaries of an animation as JSON.
    Summary(SummaryArgs),
    /// Build an animation document from frame files or templates.
    Compose(ComposeArgs),
    /// Move the painted cells inside a rectangle of one frame.
    Move(MoveArgs),
    /// List the frame templates in a directory.
    Templates(TemplatesArgs),
}

#[derive(Args, Debug)]
struct RasterArgs {
    /// Pixel size of one grid cell.
    #[arg(long, default_value_t = 10)]
    cell_size: u32,

    /// Draw a 1-pixel border around painted cells in this colour (`#rrggbb` or a name).
    #[arg(long)]
    outline: Option<String>,
}

impl RasterArgs {
    fn settings(&self) -> anyhow::Result<RenderSettings> {
        let outline = self
            .outline
            .as_deref()
            .map(ColorSpec::parse)
            .transpose()
            .context("parse --outline")?
            .map(|c| c.rgb());
        let settings = RenderSettings {
            cell_size: self.cell_size,
            outline,
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Args, Debug)]
struct ViewportArgs {
    /// Viewport mode: `full`, `half` or `stick-figure`.
    #[arg(long)]
    mode: Option<String>,

    /// Cells of padding around content.
    #[arg(long)]
    padding: Option<u32>,

    /// Minimum viewport width in cells.
    #[arg(long)]
    min_w: Option<u32>,

    /// Minimum viewport height in cells.
    #[arg(long)]
    min_h: Option<u32>,

    /// Use one viewport covering every frame.
    #[arg(long, conflicts_with = "no_lock")]
    lock: bool,

    /// Resolve the viewport per frame.
    #[arg(long)]
    no_lock: bool,
}

impl ViewportArgs {
    fn apply(&self, mut policy: ViewportPolicy) -> anyhow::Result<ViewportPolicy> {
        if let Some(mode) = &self.mode {
            policy.mode = mode
                .parse::<ViewportMode>()
                .map_err(|()| anyhow::anyhow!("unknown viewport mode '{mode}'"))?;
        }
        if let Some(padding) = self.padding {
            policy.padding = padding;
        }
        if let Some(w) = self.min_w {
            policy.min_width = w;
        }
        if let Some(h) = self.min_h {
            policy.min_height = h;
        }
        if self.lock {
            policy.lock_to_union = true;
        }
        if self.no_lock {
            policy.lock_to_union = false;
        }
        Ok(policy)
    }
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    raster: RasterArgs,

    #[command(flatten)]
    viewport: ViewportArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Output frame rate.
    #[arg(long, default_value_t = 5)]
    fps: u32,

    /// Render frames on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel` (defaults to the number of CPUs).
    #[arg(long)]
    threads: Option<usize>,

    /// Fail instead of replacing an existing output file.
    #[arg(long)]
    no_overwrite: bool,

    #[command(flatten)]
    raster: RasterArgs,

    #[command(flatten)]
    viewport: ViewportArgs,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Output animation JSON.
    #[arg(long)]
    out: PathBuf,

    /// Frame to append, as `REF` or `REF@MS`; REF is a template name or a file path.
    #[arg(long = "add", required = true)]
    frames: Vec<String>,

    /// Background reference applied to every frame.
    #[arg(long)]
    background: Option<String>,

    /// Template directory used to resolve names.
    #[arg(long)]
    templates: Option<PathBuf>,

    #[command(flatten)]
    viewport: ViewportArgs,
}

#[derive(Args, Debug)]
struct MoveArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path (defaults to rewriting the input).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Frame index (0-based).
    #[arg(long)]
    frame: usize,

    /// Selection rectangle as `r0,c0,r1,c1` (inclusive).
    #[arg(long)]
    rect: String,

    /// Row offset.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    dr: i64,

    /// Column offset.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    dc: i64,
}

#[derive(Args, Debug)]
struct TemplatesArgs {
    /// Template directory.
    #[arg(long)]
    dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Summary(args) => cmd_summary(args),
        Command::Compose(args) => cmd_compose(args),
        Command::Move(args) => cmd_move(args),
        Command::Templates(args) => cmd_templates(args),
    }
}

fn open_editor(path: &Path) -> anyhow::Result<Editor> {
    let mut editor = Editor::new();
    editor
        .load(path)
        .with_context(|| format!("load animation '{}'", path.display()))?;
    Ok(editor)
}

fn apply_viewport(editor: &mut Editor, viewport: &ViewportArgs) -> anyhow::Result<()> {
    let policy = viewport.apply(*editor.sequencer().policy())?;
    editor.sequencer_mut().set_policy(policy);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut editor = open_editor(&args.in_path)?;
    apply_viewport(&mut editor, &args.viewport)?;
    let settings = args.raster.settings()?;

    editor
        .render_frame_png(args.frame, &args.out, &settings)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut editor = open_editor(&args.in_path)?;
    apply_viewport(&mut editor, &args.viewport)?;

    let opts = ExportOpts {
        fps: args.fps,
        settings: args.raster.settings()?,
        parallel: args.parallel,
        threads: args.threads,
        overwrite: !args.no_overwrite,
    };
    let stats = editor
        .export_video_with(&args.out, &opts)
        .with_context(|| format!("export '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} frames rendered, {} written)",
        args.out.display(),
        stats.frames_rendered,
        stats.frames_written
    );
    Ok(())
}

fn cmd_summary(args: SummaryArgs) -> anyhow::Result<()> {
    let editor = open_editor(&args.in_path)?;
    let json = serde_json::to_string_pretty(&editor.get_summaries())
        .context("serialize frame summaries")?;
    println!("{json}");
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let mut editor = match &args.templates {
        Some(dir) => Editor::with_templates(
            TemplateDir::open(dir)
                .with_context(|| format!("open template dir '{}'", dir.display()))?,
        ),
        None => Editor::new(),
    };
    apply_viewport(&mut editor, &args.viewport)?;

    for spec in &args.frames {
        let (reference, duration_ms) = parse_frame_ref(spec)?;
        editor
            .add_frame(reference, duration_ms, args.background.as_deref())
            .with_context(|| format!("add frame '{reference}'"))?;
    }

    editor
        .save(&args.out)
        .with_context(|| format!("write animation '{}'", args.out.display()))?;
    eprintln!("wrote {} ({} frames)", args.out.display(), editor.sequencer().len());
    Ok(())
}

fn cmd_move(args: MoveArgs) -> anyhow::Result<()> {
    let mut editor = open_editor(&args.in_path)?;
    let rect = parse_rect(&args.rect)?;

    let outcome = editor.move_selection(args.frame, rect, args.dr, args.dc)?;
    let out = args.out.as_deref().unwrap_or(args.in_path.as_path());
    editor
        .save(out)
        .with_context(|| format!("write animation '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({} cells moved, {} dropped)",
        out.display(),
        outcome.moved.len(),
        outcome.dropped.len()
    );
    Ok(())
}

fn cmd_templates(args: TemplatesArgs) -> anyhow::Result<()> {
    let templates = TemplateDir::open(&args.dir)
        .with_context(|| format!("open template dir '{}'", args.dir.display()))?;
    for name in templates.list()? {
        println!("{name}");
    }
    Ok(())
}

fn parse_frame_ref(spec: &str) -> anyhow::Result<(&str, u32)> {
    match spec.rsplit_once('@') {
        Some((reference, ms)) => {
            let ms = ms
                .trim()
                .parse::<u32>()
                .with_context(|| format!("parse duration in '{spec}'"))?;
            Ok((reference, ms))
        }
        None => Ok((spec, DEFAULT_DURATION_MS)),
    }
}

fn parse_rect(s: &str) -> anyhow::Result<SelectionRect> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("parse rectangle '{s}'"))?;
    let [r0, c0, r1, c1] = parts[..] else {
        anyhow::bail!("rectangle '{s}' must have four comma-separated values");
    };
    Ok(SelectionRect { r0, c0, r1, c1 })
}
