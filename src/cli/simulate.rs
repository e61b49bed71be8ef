//! Simulate command handler
//!
//! Mounts the widget on a headless page, drives it through a scenario,
//! tears it down, and prints what the maps library was asked to do.

use crate::config::Config;
use crate::error::Result;
use crate::host::headless::{HeadlessHost, LibraryCall, MarkerRef};
use crate::widget::{MapWidget, WidgetState};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::rc::Rc;
use tracing::info;

/// Page conditions to simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Library already on the page
    Preloaded,
    /// Library loaded over the network
    Network,
    /// Script request fails
    LoadError,
    /// No mount element on the page
    MissingMount,
}

/// Simulate command arguments
#[derive(Args)]
pub struct SimulateArgs {
    /// Scenario to run
    #[arg(long, short = 's', value_enum, default_value = "network")]
    pub scenario: Scenario,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome of one simulated mount
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub scenario: Scenario,
    /// State after start, after the script settled, and at the end
    pub states: Vec<WidgetState>,
    pub scripts_injected: usize,
    pub calls: Vec<String>,
    pub watches_after_stop: usize,
    pub timers_after_stop: usize,
}

/// Run the simulate command
pub fn run(args: SimulateArgs) -> Result<()> {
    let config = Config::load()?;
    let report = simulate(&config, args.scenario);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Scenario: {:?}", report.scenario);
    let states: Vec<String> = report.states.iter().map(|s| s.to_string()).collect();
    println!("States:   {}", states.join(" -> "));
    println!("Scripts injected: {}", report.scripts_injected);
    println!();
    println!("Library calls:");
    if report.calls.is_empty() {
        println!("  (none)");
    }
    for call in &report.calls {
        println!("  {}", call);
    }
    println!();
    println!(
        "After teardown: {} watches, {} timers",
        report.watches_after_stop, report.timers_after_stop
    );

    Ok(())
}

/// Drive one widget through `scenario` on a fresh headless page
pub fn simulate(config: &Config, scenario: Scenario) -> SimulationReport {
    let host = match scenario {
        Scenario::Preloaded => HeadlessHost::new()
            .with_mount(&config.map.mount_id)
            .with_library(),
        Scenario::Network | Scenario::LoadError => {
            HeadlessHost::new().with_mount(&config.map.mount_id)
        }
        Scenario::MissingMount => HeadlessHost::new().without_mount().with_library(),
    };
    let host = Rc::new(host);
    let widget = MapWidget::new(host.clone(), config.clone());
    let mut states = Vec::new();

    info!(?scenario, "simulating");
    widget.start();
    states.push(widget.state());

    match scenario {
        Scenario::Network => {
            host.complete_script_load();
            states.push(widget.state());
        }
        Scenario::LoadError => {
            host.fail_script_load();
            states.push(widget.state());
        }
        Scenario::Preloaded | Scenario::MissingMount => {}
    }

    if widget.state().is_ready() {
        host.click_marker(MarkerRef(0));
        host.resize_container();
        host.resize_window();
        host.advance(config.container_delay().max(config.window_delay()));
    }

    widget.stop();

    SimulationReport {
        scenario,
        states,
        scripts_injected: host.injected_scripts().len(),
        calls: host.calls().iter().map(describe).collect(),
        watches_after_stop: host.active_watches(),
        timers_after_stop: host.pending_timers(),
    }
}

fn describe(call: &LibraryCall) -> String {
    match call {
        LibraryCall::MapCreated { map, mount } => {
            format!("map #{} created in #{}", map.0, mount)
        }
        LibraryCall::MarkerCreated {
            marker,
            map,
            position,
        } => format!("marker #{} placed on map #{} at {}", marker.0, map.0, position),
        LibraryCall::PopupCreated { popup } => format!("popup #{} created", popup.0),
        LibraryCall::PopupOpened { popup, marker, at } => format!(
            "[{:>5}ms] popup #{} opened on marker #{}",
            at.as_millis(),
            popup.0,
            marker.0
        ),
        LibraryCall::LayoutRecomputed { map, at } => {
            format!("[{:>5}ms] map #{} layout recomputed", at.as_millis(), map.0)
        }
        LibraryCall::Recentered { map, center, at } => format!(
            "[{:>5}ms] map #{} re-centered on {}",
            at.as_millis(),
            map.0,
            center
        ),
        LibraryCall::PopupClosed { popup } => format!("popup #{} closed", popup.0),
        LibraryCall::MarkerDetached { marker } => format!("marker #{} detached", marker.0),
        LibraryCall::MapDisposed { map } => format!("map #{} disposed", map.0),
    }
}
