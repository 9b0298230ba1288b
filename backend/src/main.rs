//! Machine mapping entry-point: lists or updates user mappings for this host.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use machine_mapping::config::MappingSettings;
use machine_mapping::domain::ports::{
    MachineIdentifierProvider, MachineMappingCommand, MachineMappingQuery,
    StaticMachineIdentifier,
};
use machine_mapping::domain::{
    MachineId, MachineMappingCommandService, MachineMappingQueryService, MachineMappingRequest,
    ResponseEnvelope, TraceId,
};
use machine_mapping::outbound::audit::TracingAuditSink;
use machine_mapping::outbound::machine_identifier::SysfsMacAddressProvider;
use machine_mapping::outbound::persistence::{
    InMemoryMappingRepository, load_snapshot, store_snapshot,
};

const BIN_NAME: &str = "machine-mapping";

/// `machine-mapping` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "machine-mapping",
    about = "Map registration users to the client machine they operate",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List users mapped to this machine.
    View,
    /// Create or update a user's mapping to a machine.
    Map(MapArgs),
}

#[derive(Debug, Clone, clap::Args)]
struct MapArgs {
    #[arg(long = "user-id", value_name = "id")]
    user_id: String,
    #[arg(long = "user-name", value_name = "name")]
    user_name: String,
    #[arg(long, value_name = "code")]
    role: String,
    /// `ACTIVE` or `IN-ACTIVE`.
    #[arg(long, value_name = "status")]
    status: String,
    #[arg(long = "center-id", value_name = "id")]
    center_id: String,
    #[arg(long = "station-id", value_name = "id")]
    station_id: String,
    #[arg(long = "machine-id", value_name = "id")]
    machine_id: String,
}

impl From<MapArgs> for MachineMappingRequest {
    fn from(args: MapArgs) -> Self {
        Self {
            user_id: args.user_id,
            user_name: args.user_name,
            role: args.role,
            status: args.status,
            center_id: args.center_id,
            station_id: args.station_id,
            machine_id: args.machine_id,
        }
    }
}

fn main() -> io::Result<ExitCode> {
    let args = CliArgs::parse();

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = MappingSettings::load_from_iter([OsString::from(BIN_NAME)])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(TraceId::scope(
        TraceId::generate(),
        async_main(args.command, settings),
    ))
}

async fn async_main(command: Command, settings: MappingSettings) -> io::Result<ExitCode> {
    let snapshot_path = settings.snapshot_path();
    let snapshot = load_snapshot(snapshot_path)
        .map_err(io::Error::other)?
        .unwrap_or_default();
    let repo = Arc::new(InMemoryMappingRepository::from_snapshot(snapshot));
    let audit_sink = Arc::new(TracingAuditSink);

    let envelope = match command {
        Command::View => match settings.machine_id() {
            Some(configured) => {
                let machine_id = MachineId::new(configured).map_err(|error| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("configured machine id is invalid: {error}"),
                    )
                })?;
                let provider = Arc::new(StaticMachineIdentifier::new(machine_id));
                view(provider, repo, audit_sink).await
            }
            None => {
                let provider = Arc::new(SysfsMacAddressProvider::new(settings.net_class_dir()));
                view(provider, repo, audit_sink).await
            }
        },
        Command::Map(map_args) => {
            let request = MachineMappingRequest::from(map_args);
            let service = MachineMappingCommandService::new(
                Arc::clone(&repo),
                audit_sink,
                Arc::new(DefaultClock),
            );
            let envelope = service.save_or_update(request.clone()).await;
            if envelope.is_success() {
                let validated = request.validate().map_err(io::Error::other)?;
                repo.enrol(&validated).map_err(io::Error::other)?;
                persist(&repo, snapshot_path)?;
            }
            envelope
        }
    };

    print_envelope(&envelope)?;
    Ok(if envelope.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn view<P>(
    provider: Arc<P>,
    repo: Arc<InMemoryMappingRepository>,
    audit_sink: Arc<TracingAuditSink>,
) -> ResponseEnvelope
where
    P: MachineIdentifierProvider,
{
    MachineMappingQueryService::new(provider, repo, audit_sink)
        .view()
        .await
}

fn persist(repo: &InMemoryMappingRepository, path: &Path) -> io::Result<()> {
    let snapshot = repo.snapshot().map_err(io::Error::other)?;
    store_snapshot(path, &snapshot).map_err(io::Error::other)?;
    info!(path = %path.display(), "mapping snapshot saved");
    Ok(())
}

fn print_envelope(envelope: &ResponseEnvelope) -> io::Result<()> {
    let body = serde_json::to_string_pretty(envelope)
        .map_err(|error| io::Error::other(format!("encode response: {error}")))?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{body}")
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI argument parsing.

    use clap::Parser;
    use rstest::rstest;

    use super::{CliArgs, Command};
    use machine_mapping::domain::MachineMappingRequest;

    #[rstest]
    fn view_takes_no_arguments() {
        let args = CliArgs::try_parse_from(["machine-mapping", "view"]).expect("view parses");
        assert!(matches!(args.command, Command::View));
    }

    #[rstest]
    fn map_arguments_become_a_request() {
        let args = CliArgs::try_parse_from([
            "machine-mapping",
            "map",
            "--user-id",
            "ID123",
            "--user-name",
            "Test User",
            "--role",
            "101",
            "--status",
            "ACTIVE",
            "--center-id",
            "CNTR123",
            "--station-id",
            "STN123",
            "--machine-id",
            "MCHN123",
        ])
        .expect("map parses");

        let Command::Map(map_args) = args.command else {
            panic!("expected map command");
        };
        let request = MachineMappingRequest::from(map_args);
        assert_eq!(request.user_id, "ID123");
        assert_eq!(request.user_name, "Test User");
        assert_eq!(request.status, "ACTIVE");
        assert_eq!(request.machine_id, "MCHN123");
    }

    #[rstest]
    fn map_requires_every_field() {
        let err = CliArgs::try_parse_from(["machine-mapping", "map", "--user-id", "ID123"])
            .expect_err("missing fields");
        assert!(err.to_string().contains("--user-name"));
    }
}
