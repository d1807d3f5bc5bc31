use clap::{Args, Parser, Subcommand};
use graphiti::svg::{SvgRenderOptions, render_scene_svg};
use graphiti::{HitProbe, HitTarget, LayoutPolicy, LayoutReport, Scene, SceneDocument};
use serde::Serialize;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Io(std::io::Error),
    Scene(graphiti::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Scene(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<graphiti::Error> for CliError {
    fn from(value: graphiti::Error) -> Self {
        Self::Scene(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Lay out, pick from and render graph scene documents.
///
/// Set `GRAPHITI_LOG` (e.g. `debug`) to see diagnostics on stderr.
#[derive(Debug, Parser)]
#[command(name = "graphiti-cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Place nodes with a layout policy and print the resulting scene document.
    Layout {
        #[command(flatten)]
        scene: SceneArgs,
        #[arg(long)]
        pretty: bool,
    },
    /// Report the node or link under each queried point.
    Pick {
        #[command(flatten)]
        scene: SceneArgs,
        /// Query point as `x,y`; repeatable.
        #[arg(long = "at", value_name = "X,Y", value_parser = parse_point, required = true)]
        at: Vec<(f64, f64)>,
        #[arg(long)]
        pretty: bool,
    },
    /// Dump the hit-test probes built for the scene.
    Probes {
        #[command(flatten)]
        scene: SceneArgs,
        #[arg(long)]
        pretty: bool,
    },
    /// Render the scene to SVG.
    Render {
        #[command(flatten)]
        scene: SceneArgs,
        /// Highlight whatever lies under `x,y`.
        #[arg(long, value_name = "X,Y", value_parser = parse_point)]
        highlight_at: Option<(f64, f64)>,
        /// Outline every hit-test probe.
        #[arg(long)]
        trace: bool,
        #[arg(long)]
        background: Option<String>,
        #[arg(long)]
        id: Option<String>,
        /// Write to a file instead of stdout.
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
}

#[derive(Debug, Args)]
struct SceneArgs {
    /// Scene document (JSON); `-` or omitted reads stdin.
    input: Option<String>,
    /// Layout policy to apply before anything else (`random`, `random-circle`,
    /// `random-square`, `harmony`).
    #[arg(long)]
    policy: Option<String>,
    /// Overrides the document's seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_point(raw: &str) -> Result<(f64, f64), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{raw}`"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y: {e}"))?;
    Ok((x, y))
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

/// Loads the document, applies the optional seed/policy and connects the spatial index.
fn load_scene(args: &SceneArgs) -> Result<(Scene, Option<LayoutReport>), CliError> {
    let text = read_input(args.input.as_deref())?;
    let doc = SceneDocument::from_json(&text)?;
    let mut scene = doc.to_scene()?;
    if let Some(seed) = args.seed {
        scene.reseed(seed);
    }
    let report = args
        .policy
        .as_deref()
        .map(|name| scene.organize(LayoutPolicy::from_name(name)));
    scene.connect();
    tracing::debug!(
        nodes = scene.nodes().len(),
        links = scene.links().len(),
        probes = scene.index().probes().len(),
        "scene loaded"
    );
    Ok((scene, report))
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    report: Option<&'a LayoutReport>,
    scene: &'a SceneDocument,
}

#[derive(Serialize)]
struct PickOut {
    x: f64,
    y: f64,
    hit: Option<HitTarget>,
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Layout { scene, pretty } => {
            let (loaded, report) = load_scene(&scene)?;
            let doc = SceneDocument::from_scene(&loaded);
            let out = LayoutOut {
                report: report.as_ref(),
                scene: &doc,
            };
            println!("{}", to_json(&out, pretty)?);
        }
        Command::Pick { scene, at, pretty } => {
            let (loaded, _) = load_scene(&scene)?;
            let picks: Vec<PickOut> = at
                .into_iter()
                .map(|(x, y)| PickOut {
                    x,
                    y,
                    hit: loaded.item_at(x, y),
                })
                .collect();
            println!("{}", to_json(&picks, pretty)?);
        }
        Command::Probes { scene, pretty } => {
            let (loaded, _) = load_scene(&scene)?;
            let probes: &[HitProbe] = loaded.index().probes();
            println!("{}", to_json(&probes, pretty)?);
        }
        Command::Render {
            scene,
            highlight_at,
            trace,
            background,
            id,
            out,
        } => {
            let (mut loaded, _) = load_scene(&scene)?;
            if trace {
                let mut hit_test = loaded.options().hit_test.clone();
                hit_test.show_trace = true;
                loaded.set_hit_test_options(hit_test)?;
                loaded.connect();
            }
            let highlight = highlight_at.and_then(|(x, y)| loaded.item_at(x, y));
            let svg = render_scene_svg(
                &loaded,
                highlight.as_ref(),
                &SvgRenderOptions {
                    diagram_id: id,
                    background,
                    ..Default::default()
                },
            );
            match out {
                Some(path) => std::fs::write(path, svg)?,
                None => print!("{svg}"),
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GRAPHITI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
