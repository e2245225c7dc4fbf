use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use rosterguard::cache::SystemClock;
use rosterguard::config::AppConfig;
use rosterguard::error::AppError;
use rosterguard::qualification::{
    qualification_router, ControllerId, ControllerRef, CsvTrainingStore, MultiAirportQualification,
    QualificationService, Rating, StationGroup,
};
use rosterguard::telemetry;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "rosterguard",
    about = "Controller qualification and staffing feasibility service for volunteer ATC events",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Qualification engine utilities
    Qualification {
        #[command(subcommand)]
        command: QualificationCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Training provider CSV export backing the record store
    #[arg(long)]
    training_export: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum QualificationCommand {
    /// Evaluate one controller against one or more event airports
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Controller id (CID)
    #[arg(long)]
    cid: String,
    /// Network rating id (1 = OBS .. 12 = ADM)
    #[arg(long, value_parser = parse_rating)]
    rating: Rating,
    /// Event airport; repeat for multi-airport events
    #[arg(long = "airport", required = true)]
    airports: Vec<String>,
    /// FIR scoping area-control stations and familiarizations
    #[arg(long)]
    fir: Option<String>,
    /// Training provider CSV export to evaluate against
    #[arg(long)]
    training_export: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Qualification {
            command: QualificationCommand::Evaluate(args),
        } => run_evaluate(args).await,
    }
}

fn parse_rating(raw: &str) -> Result<Rating, String> {
    let id = raw
        .trim()
        .parse::<u8>()
        .map_err(|err| format!("failed to parse '{raw}' as a rating id ({err})"))?;
    Rating::try_from(id).map_err(|err| err.to_string())
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let store = match args.training_export.take() {
        Some(path) => {
            let store = CsvTrainingStore::from_path(&path)?;
            info!(
                controllers = store.controller_count(),
                ?path,
                "training record store loaded"
            );
            store
        }
        None => {
            warn!("no training export configured; every evaluation will see empty records");
            CsvTrainingStore::empty()
        }
    };

    let service = Arc::new(QualificationService::new(
        Arc::new(store),
        Arc::new(SystemClock),
        config.cache.ttl(),
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(qualification_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "qualification service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        cid,
        rating,
        airports,
        fir,
        training_export,
    } = args;

    let store = CsvTrainingStore::from_path(training_export)?;
    let service = QualificationService::new(
        Arc::new(store),
        Arc::new(SystemClock),
        chrono::Duration::hours(rosterguard::cache::DEFAULT_TTL_HOURS),
    );

    let controller = ControllerRef {
        id: ControllerId(cid.clone()),
        rating,
    };
    let result = service
        .evaluate_multi(&controller, &airports, fir.as_deref())
        .await?;

    render_qualification(&cid, rating, &result);
    Ok(())
}

fn render_qualification(cid: &str, rating: Rating, result: &MultiAirportQualification) {
    println!("Qualification report for {cid} ({})", rating.label());
    println!("Evaluated at {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));

    println!("\nPer airport");
    for airport in &result.airports {
        let group = airport
            .group
            .map(StationGroup::label)
            .unwrap_or("not authorized");
        if airport.restrictions.is_empty() {
            println!("- {}: {}", airport.airport, group);
        } else {
            let caveats: Vec<String> = airport
                .restrictions
                .iter()
                .map(|restriction| restriction.summary())
                .collect();
            println!("- {}: {} ({})", airport.airport, group, caveats.join("; "));
        }
    }

    match result.highest_group {
        Some(group) => println!("\nHighest controllable group: {}", group.label()),
        None => println!("\nHighest controllable group: none"),
    }

    if !result.evidence.endorsements.is_empty() {
        println!("Endorsements considered: {}", result.evidence.endorsements.join(", "));
    }
    if !result.evidence.familiarizations.is_empty() {
        println!(
            "Familiarized sectors: {}",
            result.evidence.familiarizations.join(", ")
        );
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
