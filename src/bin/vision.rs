use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vision::{
    Canvas, Circle, Color, Command, Interpreter, IrWriter, Line, Point, Polygon, Polyline, Rect,
    Refresh, RenderClient, RenderService, VisionConfig,
};

#[derive(Parser, Debug)]
#[command(name = "vision", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Replay a command sequence onto a local canvas.
    Interpret(InterpretArgs),
    /// Run the render service.
    Serve(ServeArgs),
    /// Replay a command sequence against a running render service.
    Send(SendArgs),
    /// Write a demo sequence that exercises every operation.
    Demo(DemoArgs),
}

#[derive(Parser, Debug)]
struct InterpretArgs {
    /// Input sequence, one JSON record per line.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write every completed frame to this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Write the final frame as a PNG.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Initial canvas width.
    #[arg(long)]
    width: Option<u32>,

    /// Initial canvas height.
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address.
    #[arg(long)]
    addr: Option<String>,

    /// Maximum concurrent connections.
    #[arg(long)]
    workers: Option<usize>,

    /// Write every completed frame to this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SendArgs {
    /// Input sequence, one JSON record per line.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Service address; defaults to the configured one.
    #[arg(long)]
    addr: Option<String>,
}

#[derive(Parser, Debug)]
struct DemoArgs {
    /// Output sequence path.
    #[arg(long)]
    out: PathBuf,

    /// Canvas width.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Canvas height.
    #[arg(long, default_value_t = 1080)]
    height: u32,
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
        Cmd::Interpret(args) => cmd_interpret(args),
        Cmd::Serve(args) => cmd_serve(args),
        Cmd::Send(args) => cmd_send(args),
        Cmd::Demo(args) => cmd_demo(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<VisionConfig> {
    let mut cfg = match path {
        Some(path) => VisionConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => VisionConfig::default(),
    };
    cfg.apply_env().context("apply environment overrides")?;
    Ok(cfg)
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")
}

fn cmd_interpret(args: InterpretArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(w) = args.width {
        cfg.canvas.width = w;
    }
    if let Some(h) = args.height {
        cfg.canvas.height = h;
    }
    if args.export_dir.is_some() {
        cfg.canvas.export_dir = args.export_dir;
    }
    cfg.validate()?;

    let canvas = cfg.canvas.build().context("create canvas")?;
    let mut interp = Interpreter::new(canvas);
    let stats = interp
        .interpret_file(&args.in_path)
        .with_context(|| format!("interpret '{}'", args.in_path.display()))?;
    tracing::info!(applied = stats.applied, frames = stats.refreshes, "sequence complete");

    let canvas = interp.canvas_mut();
    if cfg.canvas.export_dir.is_some() && canvas.frame_count() > 0 {
        canvas.export_current().context("export final frame")?;
    }
    if let Some(out) = &args.out {
        let frame = canvas.snapshot().context("snapshot final frame")?;
        vision::write_png(out, &frame).with_context(|| format!("write png '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        cfg.service.addr = addr;
    }
    if let Some(workers) = args.workers {
        cfg.service.max_workers = workers;
    }
    if args.export_dir.is_some() {
        cfg.canvas.export_dir = args.export_dir;
    }
    cfg.validate()?;

    let canvas = cfg.canvas.build().context("create canvas")?;
    runtime()?.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&cfg.service.addr)
            .await
            .with_context(|| format!("bind '{}'", cfg.service.addr))?;
        let service = RenderService::new(canvas, cfg.service.clone());
        let shared = service.canvas();
        service
            .serve_with_shutdown(listener, async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::warn!(?err, "ctrl-c handler unavailable");
                    std::future::pending::<()>().await;
                }
            })
            .await?;

        let mut canvas = shared.lock().await;
        if cfg.canvas.export_dir.is_some() && canvas.frame_count() > 0 {
            canvas.export_current().context("export final frame")?;
        }
        anyhow::Ok(())
    })
}

fn cmd_send(args: SendArgs) -> anyhow::Result<()> {
    let cfg = load_config(None)?;
    let addr = args.addr.unwrap_or(cfg.service.addr);
    let file = std::fs::File::open(&args.in_path)
        .with_context(|| format!("open '{}'", args.in_path.display()))?;

    runtime()?.block_on(async move {
        let mut client = RenderClient::connect(addr.as_str())
            .await
            .with_context(|| format!("connect to '{addr}'"))?;
        let stats = client
            .replay(BufReader::new(file))
            .await
            .with_context(|| format!("send '{}'", args.in_path.display()))?;
        eprintln!("sent {} command(s)", stats.applied);
        anyhow::Ok(())
    })
}

fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    let (w, h) = (f64::from(args.width), f64::from(args.height));
    let (cx, cy) = ((w / 2.0).floor(), (h / 2.0).floor());
    let commands = [
        Command::Refresh(Refresh {
            color: None,
            width: Some(args.width),
            height: Some(args.height),
        }),
        Command::Line(
            Line::new(Point(0.0, 0.0), Point(w, h))
                .with_color(Color::rgb(0, 255, 0))
                .with_line_width(3.0),
        ),
        Command::Circle(Circle {
            x: cx,
            y: cy,
            r: 100.0,
            color: Color::rgb(0, 175, 175),
            line_width: 1.0,
            fill: true,
        }),
        Command::Rect(Rect {
            x: cx,
            y: cy,
            rx: 500.0,
            ry: 200.0,
            color: Color::rgb(255, 0, 0),
            line_width: 1.0,
            fill: false,
        }),
        Command::Polyline(Polyline {
            points: vec![
                Point(100.0, 100.0),
                Point(300.0, 100.0),
                Point(500.0, 300.0),
                Point(400.0, 700.0),
            ],
            color: Color::rgb(0, 100, 255),
            line_width: 1.0,
            close: false,
        }),
        Command::Polygon(Polygon {
            points: vec![
                Point(300.0, 500.0),
                Point(700.0, 500.0),
                Point(800.0, 700.0),
                Point(200.0, 700.0),
            ],
            color: Color::rgb(0, 200, 200),
        }),
    ];

    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
    }
    let file = std::fs::File::create(&args.out)
        .with_context(|| format!("create '{}'", args.out.display()))?;
    let mut writer = IrWriter::new(std::io::BufWriter::new(file));
    writer.write_all(&commands)?;
    let written = writer.records_written();
    writer.finish()?;

    eprintln!("wrote {} record(s) to {}", written, args.out.display());
    Ok(())
}
