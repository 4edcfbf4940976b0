//! Monitor command - log a flight from a telemetry stream and write its OFP.

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use console::style;
use flightlog::config::ConfigFile;
use flightlog::flight_plan::FlightPlan;
use flightlog::monitor::{
    Monitor, MonitorListener, MonitorSummary, ReportTarget, StopReason,
};
use flightlog::passage::PassageRecord;
use flightlog::phase::FlightPhase;
use flightlog::session::Session;
use flightlog::telemetry::{spawn_stream_reader, ReplaySource};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;

/// Arguments for the monitor command.
pub struct MonitorArgs {
    pub plan: Option<PathBuf>,
    pub telemetry: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub aircraft: Option<String>,
    pub print_report: bool,
}

/// Prints passages and phase changes as they happen.
struct ConsoleListener;

impl MonitorListener for ConsoleListener {
    fn on_passage(&mut self, record: &PassageRecord) {
        println!(
            "{} {:<16} {}  GS {:>3.0} kt  FL{:03.0}  fuel {:.0} kg",
            style(record.timestamp.format("%H:%M:%SZ")).dim(),
            style(record.name()).bold().green(),
            record.position,
            record.ground_speed_kt,
            (record.altitude_ft / 100.0).max(0.0),
            record.fuel_remaining_kg
        );
    }

    fn on_phase_change(&mut self, _from: FlightPhase, to: FlightPhase) {
        println!("{} {}", style("Phase:").cyan(), to.description());
    }

    fn on_takeoff_roll(&mut self) {
        println!("{}", style("Takeoff roll").yellow());
    }
}

/// Run the monitor command.
pub fn run(args: MonitorArgs, config: &ConfigFile) -> Result<(), CliError> {
    let mut session = Session::new();

    if let Some(path) = &args.plan {
        let plan = FlightPlan::load(path)?;
        println!(
            "Flight plan: {} → {} ({} fixes)",
            plan.meta.departure.display_name(),
            plan.meta.destination.display_name(),
            plan.fixes.len()
        );
        session.load_flight_plan(plan);
    } else {
        println!("No flight plan loaded; only takeoff and landing will be logged");
    }

    if let Some(title) = args.aircraft.clone().or_else(|| config.report.aircraft_title.clone()) {
        session.set_aircraft_title(title);
    }

    let mut monitor_config = config.monitor.to_monitor_config();
    if let Some(ms) = args.interval_ms {
        monitor_config.poll_interval = Duration::from_millis(ms.max(1));
    }

    let target = match args.output {
        Some(path) => ReportTarget::File(path),
        None => ReportTarget::Directory(config.report.directory.clone()),
    };

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, writing report...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    println!("FlightLog v{}", flightlog::VERSION);
    println!("Press Ctrl+C to stop and write the report");
    println!();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .map_err(CliError::Runtime)?;

    let monitor = Monitor::new(monitor_config)
        .with_report_target(target)
        .with_cancellation(cancel)
        .with_listener(ConsoleListener);

    // A replayed file is consumed one line per poll; live stdin is read on
    // its own thread and only the newest sample is polled
    let summary = match &args.telemetry {
        Some(path) => {
            let file = std::fs::File::open(path).map_err(|e| {
                CliError::Config(format!("Cannot open telemetry {}: {}", path.display(), e))
            })?;
            let mut source = ReplaySource::new(BufReader::new(file));
            runtime.block_on(monitor.run(&mut session, &mut source))
        }
        None => {
            let mut source = spawn_stream_reader(BufReader::new(io::stdin()))?;
            runtime.block_on(monitor.run(&mut session, &mut source))
        }
    };

    print_summary(&summary);
    if args.print_report {
        println!();
        print!("{}", summary.report);
    }

    match summary.report_error {
        Some(e) => Err(CliError::Config(format!("Report not saved: {}", e))),
        None => Ok(()),
    }
}

fn print_summary(summary: &MonitorSummary) {
    let reason = match &summary.stop_reason {
        StopReason::PostflightTaxi => style(summary.stop_reason.to_string()).green(),
        StopReason::StreamEnded | StopReason::Cancelled => {
            style(summary.stop_reason.to_string()).yellow()
        }
        StopReason::TelemetryFailed(_) => style(summary.stop_reason.to_string()).red(),
    };

    println!();
    println!("Session Summary");
    println!("───────────────");
    println!("  Stopped:  {}", reason);
    println!("  Samples:  {}", summary.samples_processed);
    println!("  Passages: {}", summary.passages);
    if !summary.fuel.legs.is_empty() {
        println!(
            "  Fuel:     {:.0} kg over {:.0} min ({:.0} kg/h)",
            summary.fuel.total_fuel_kg(),
            summary.fuel.total_minutes(),
            summary.fuel.average_fuel_flow_kg_hr()
        );
    }
    if let Some(path) = &summary.report_path {
        println!("  Report:   {}", path.display());
    }
}
