use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use fleetcheck::config::AppConfig;
use fleetcheck::directory::{
    InMemoryRoleDirectory, InMemoryVehicleDirectory, Role, RoleId, User, UserId, Vehicle,
    VehicleId,
};
use fleetcheck::error::AppError;
use fleetcheck::inspections::{
    inspection_router, ChecklistKind, InMemoryInspectionRecordStore, InMemoryTemplateStore,
    InspectionRecord, InspectionService, ItemDraft, SectionDraft, SectionKind, TemplateDraft,
};
use fleetcheck::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "fleetcheck",
    about = "Fleet maintenance administration and vehicle inspection checklists",
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
    /// Work with persisted inspection reports offline
    Report {
        #[command(subcommand)]
        command: ReportCommand,
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
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Rebuild the printable document from a persisted record on disk
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Path to an inspection record serialized as JSON
    #[arg(long)]
    record: PathBuf,
    /// Optional path to the referenced vehicle serialized as JSON
    #[arg(long)]
    vehicle: Option<PathBuf>,
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
        Command::Report {
            command: ReportCommand::Render(args),
        } => run_render(args),
    }
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

    let templates = Arc::new(InMemoryTemplateStore::new());
    let records = Arc::new(InMemoryInspectionRecordStore::new(
        config.inspections.folio_prefix.clone(),
    ));
    let vehicles = Arc::new(demo_fleet());
    let roles = Arc::new(demo_roles());
    let service = Arc::new(InspectionService::new(templates, records, vehicles, roles));
    seed_demo_templates(service.as_ref());

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
        .merge(inspection_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fleet inspection service ready");

    axum::serve(listener, app).await?;
    Ok(())
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

fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.record)?;
    let record: InspectionRecord = serde_json::from_str(&raw)?;

    let vehicle = match args.vehicle {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)?;
            Some(serde_json::from_str::<Vehicle>(&raw)?)
        }
        None => None,
    };

    print!(
        "{}",
        fleetcheck::inspections::render_printable(&record, vehicle.as_ref())
    );
    Ok(())
}

fn demo_fleet() -> InMemoryVehicleDirectory {
    let directory = InMemoryVehicleDirectory::with_fleet(vec![
        Vehicle {
            id: VehicleId("veh-001".to_string()),
            economic_number: "ECO-042".to_string(),
            plates: "XKL-93-21".to_string(),
            brand: "Kenworth".to_string(),
            model: "T380".to_string(),
            year: Some(2021),
            assigned_user_id: Some(UserId("usr-chofer-1".to_string())),
        },
        Vehicle {
            id: VehicleId("veh-002".to_string()),
            economic_number: "ECO-107".to_string(),
            plates: "UTR-55-08".to_string(),
            brand: "International".to_string(),
            model: "MV607".to_string(),
            year: Some(2019),
            assigned_user_id: None,
        },
    ]);
    directory.assign(
        VehicleId("veh-001".to_string()),
        User {
            id: UserId("usr-chofer-1".to_string()),
            full_name: "Raúl Medina".to_string(),
            role_id: RoleId("role-chofer".to_string()),
        },
    );
    directory
}

fn demo_roles() -> InMemoryRoleDirectory {
    InMemoryRoleDirectory::with_roles(vec![
        Role {
            id: RoleId("role-chofer".to_string()),
            name: "Chofer".to_string(),
        },
        Role {
            id: RoleId("role-supervisor".to_string()),
            name: "Supervisor de flota".to_string(),
        },
    ])
}

fn seed_demo_templates(
    service: &InspectionService<
        InMemoryTemplateStore,
        InMemoryInspectionRecordStore,
        InMemoryVehicleDirectory,
        InMemoryRoleDirectory,
    >,
) {
    let draft = TemplateDraft {
        name: "Revisión diaria de unidad".to_string(),
        description: "Checklist express antes de salir a ruta".to_string(),
        kind: ChecklistKind::Express,
        sections: vec![
            SectionDraft {
                uid: None,
                title: "Motor".to_string(),
                kind: SectionKind::Tristate,
                items: vec![
                    ItemDraft {
                        uid: None,
                        name: "Nivel de aceite".to_string(),
                    },
                    ItemDraft {
                        uid: None,
                        name: "Frenos".to_string(),
                    },
                ],
            },
            SectionDraft {
                uid: None,
                title: "Cabina".to_string(),
                kind: SectionKind::Binary,
                items: vec![ItemDraft {
                    uid: None,
                    name: "Cinturones de seguridad".to_string(),
                }],
            },
        ],
        role_ids: vec![RoleId("role-chofer".to_string())],
        active: true,
    };

    if let Err(err) = service.create_template(draft) {
        tracing::warn!(error = %err, "demo template seed skipped");
    }
}
