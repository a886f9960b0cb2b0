use canopy_model::RawGraph;
use canopy_worker::{
    Router, WorkerConfig, WorkerHandle, WorkerRequest, WorkerResponse, spawn_worker,
};
use futures::StreamExt;
use futures::executor::block_on;
use serde::Serialize;
use std::io::{Read, Write};
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "CANOPY_LOG";
const DEFAULT_SESSION: &str = "cli";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Model(canopy_model::Error),
    Worker(canopy_worker::Error),
    Json(serde_json::Error),
    Request {
        line: usize,
        source: serde_json::Error,
    },
    NoResponse,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Model(err) => write!(f, "{err}"),
            CliError::Worker(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Request { line, source } => {
                write!(f, "invalid request on line {line}: {source}")
            }
            CliError::NoResponse => write!(f, "the worker produced no model graph"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<canopy_model::Error> for CliError {
    fn from(value: canopy_model::Error) -> Self {
        Self::Model(value)
    }
}

impl From<canopy_worker::Error> for CliError {
    fn from(value: canopy_worker::Error) -> Self {
        Self::Worker(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Process,
    Replay,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    config: Option<String>,
    threshold: Option<usize>,
    layout: bool,
    session: Option<String>,
}

fn usage() -> &'static str {
    "canopy-cli\n\
\n\
USAGE:\n\
  canopy-cli [process] [--pretty] [--config <file>] [--threshold <n>] [--layout] [--session <id>] [<path>|-]\n\
  canopy-cli replay [--pretty] [--config <file>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - process reads a raw graph JSON document and prints the model graph.\n\
  - replay reads one worker request per line and prints one response per line.\n\
  - --config takes a JSON file: {\"processing\": {...}, \"layout\": {...}}.\n\
  - Logs go to stderr; set CANOPY_LOG (e.g. CANOPY_LOG=debug) to change the filter.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "process" => args.command = Command::Process,
            "replay" => args.command = Command::Replay,
            "--pretty" => args.pretty = true,
            "--layout" => args.layout = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--threshold" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.threshold = Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--session" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.session = Some(id.clone());
            }
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

fn write_json(out: &mut impl Write, value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn load_config(args: &Args) -> Result<WorkerConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => WorkerConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => WorkerConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.processing.max_children_per_group = threshold;
        config.validate()?;
    }
    Ok(config)
}

fn run_process(args: &Args, config: WorkerConfig) -> Result<(), CliError> {
    let raw = RawGraph::from_json_str(&read_input(args.input.as_deref())?)?;
    let graph_id = if raw.id.is_empty() {
        "graph".to_string()
    } else {
        raw.id.clone()
    };
    let session_id = args
        .session
        .clone()
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    let mut router = Router::new(config)?;
    let mut model_graph = None;
    router.handle(
        WorkerRequest::ProcessGraph {
            graph_id,
            session_id,
            raw_graph: raw,
            initial_layout: args.layout,
        },
        |response| match response {
            WorkerResponse::ProgressUpdate(update) => match &update.error {
                Some(error) => tracing::warn!(label = ?update.label, %error, "processing problem"),
                None => tracing::info!(label = ?update.label, "progress"),
            },
            WorkerResponse::ProcessGraphResp { model_graph: g, .. } => model_graph = Some(g),
            _ => {}
        },
    )?;

    let graph = model_graph.ok_or(CliError::NoResponse)?;
    write_json(&mut std::io::stdout().lock(), &graph, args.pretty)
}

fn run_replay(args: &Args, config: WorkerConfig) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let mut requests: Vec<WorkerRequest> = Vec::new();
    for (ix, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let request = serde_json::from_str(line).map_err(|source| CliError::Request {
            line: ix + 1,
            source,
        })?;
        requests.push(request);
    }

    let (handle, worker) = spawn_worker(Router::new(config)?);
    let WorkerHandle {
        requests: sender,
        responses,
    } = handle;
    for request in requests {
        if sender.unbounded_send(request).is_err() {
            break;
        }
    }
    drop(sender);

    let router = block_on(worker);
    tracing::debug!(cached = router.store().len(), "replay finished");
    let responses: Vec<WorkerResponse> = block_on(responses.collect());

    let mut out = std::io::stdout().lock();
    for response in &responses {
        write_json(&mut out, response, args.pretty)?;
    }
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    match args.command {
        Command::Process => run_process(&args, config),
        Command::Replay => run_replay(&args, config),
    }
}

fn install_tracing_subscriber() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    install_tracing_subscriber();

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

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
