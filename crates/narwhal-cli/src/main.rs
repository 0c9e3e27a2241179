use narwhal::{Circle, Interval, LinearPack, PackOptions, UnplaceablePolicy};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Pack(narwhal::Error),
    DuplicateId(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Pack(err) => write!(f, "{err}"),
            CliError::DuplicateId(id) => write!(f, "duplicate circle id: {id}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<narwhal::Error> for CliError {
    fn from(value: narwhal::Error) -> Self {
        Self::Pack(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Pack,
    Normalize,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    padding: Option<f64>,
    width: Option<f64>,
    radius_scale: Option<f64>,
    skip_unplaceable: bool,
    max_candidates: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct InputCircle {
    #[serde(default)]
    id: Option<String>,
    target: f64,
    radius: f64,
}

#[derive(Debug, Deserialize)]
struct InputDocument {
    #[serde(default)]
    options: PackOptions,
    circles: Vec<InputCircle>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Input {
    Document(InputDocument),
    Circles(Vec<InputCircle>),
}

impl Input {
    fn into_parts(self) -> (PackOptions, Vec<InputCircle>) {
        match self {
            Input::Document(doc) => (doc.options, doc.circles),
            Input::Circles(circles) => (PackOptions::default(), circles),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CircleOut<'a> {
    id: &'a str,
    target: f64,
    radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackOut<'a> {
    scale: f64,
    radius_scale: f64,
    target_range: Interval,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<&'a str>,
    circles: Vec<CircleOut<'a>>,
}

fn usage() -> &'static str {
    "narwhal-cli\n\
\n\
USAGE:\n\
  narwhal-cli [pack] [--pretty] [--padding <n>] [--width <n>] [--radius-scale <n>] [--skip-unplaceable] [--max-candidates <n>] [<path>|-]\n\
  narwhal-cli normalize [--pretty] [--padding <n>] [--width <n>] [--radius-scale <n>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input is JSON: either {\"options\": {...}, \"circles\": [...]} or a bare circle array.\n\
  - Each circle has \"target\", \"radius\" and an optional \"id\" (defaults to its index).\n\
  - Flags override the options found in the input document.\n\
  - normalize prints the rescaled circles without packing them.\n\
  - Set NARWHAL_LOG (e.g. NARWHAL_LOG=debug) to enable diagnostics on stderr.\n\
"
}

fn parse_number<T: std::str::FromStr>(value: Option<&String>) -> Result<T, CliError> {
    value
        .and_then(|v| v.parse::<T>().ok())
        .ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "pack" => args.command = Command::Pack,
            "normalize" => args.command = Command::Normalize,
            "--pretty" => args.pretty = true,
            "--skip-unplaceable" => args.skip_unplaceable = true,
            "--padding" => args.padding = Some(parse_number(it.next())?),
            "--width" => args.width = Some(parse_number(it.next())?),
            "--radius-scale" => args.radius_scale = Some(parse_number(it.next())?),
            "--max-candidates" => args.max_candidates = Some(parse_number(it.next())?),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
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

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("NARWHAL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_overrides(options: &mut PackOptions, args: &Args) {
    if let Some(padding) = args.padding {
        options.padding = padding;
    }
    if let Some(width) = args.width {
        options.width = width;
    }
    if args.radius_scale.is_some() {
        options.radius_scale = args.radius_scale;
    }
    if args.skip_unplaceable {
        options.on_unplaceable = UnplaceablePolicy::Skip;
    }
    if args.max_candidates.is_some() {
        options.max_candidates = args.max_candidates;
    }
}

fn circle_ids(input: &[InputCircle]) -> Result<Vec<String>, CliError> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut ids = Vec::with_capacity(input.len());
    for (idx, circle) in input.iter().enumerate() {
        let id = circle.id.clone().unwrap_or_else(|| idx.to_string());
        if !seen.insert(id.clone()) {
            return Err(CliError::DuplicateId(id));
        }
        ids.push(id);
    }
    Ok(ids)
}

fn circles_out<'a>(ids: &'a [String], circles: &[Circle]) -> Vec<CircleOut<'a>> {
    ids.iter()
        .zip(circles)
        .map(|(id, c)| CircleOut {
            id: id.as_str(),
            target: c.target,
            radius: c.radius,
            x: c.placement.map(|p| p.x),
            y: c.placement.map(|p| p.y),
            distance: c.placement.map(|p| p.distance),
            order: c.placement.map(|p| p.order),
        })
        .collect()
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let input: Input = serde_json::from_str(&text)?;
    let (mut options, input_circles) = input.into_parts();
    apply_overrides(&mut options, &args);

    let ids = circle_ids(&input_circles)?;
    let mut circles: Vec<Circle> = input_circles
        .iter()
        .map(|c| Circle::new(c.target, c.radius))
        .collect();

    match args.command {
        Command::Normalize => {
            let norm = LinearPack::new(&mut circles, options).normalize()?;
            let out = PackOut {
                scale: norm.scale,
                radius_scale: norm.radius_scale,
                target_range: norm.target_range,
                blocks: None,
                skipped: Vec::new(),
                circles: circles_out(&ids, &circles),
            };
            write_json(&out, args.pretty)
        }
        Command::Pack => {
            let summary = LinearPack::new(&mut circles, options)
                .on_start(|event| {
                    tracing::info!(circles = event.circles, scale = event.scale, "packing");
                })
                .run()?;
            let out = PackOut {
                scale: summary.scale(),
                radius_scale: summary.radius_scale(),
                target_range: summary.target_range(),
                blocks: Some(summary.blocks.len()),
                skipped: summary.skipped.iter().map(|&i| ids[i].as_str()).collect(),
                circles: circles_out(&ids, &circles),
            };
            write_json(&out, args.pretty)
        }
    }
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::Pack(narwhal::Error::NoValidPlacement { .. })) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
