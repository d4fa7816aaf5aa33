// Only compile the viewer module when the TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use std::env;
use std::path::Path;

use instrument_timeline::{
    build_scenario, load_index, load_state_groups, write_index, Snapshot,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("index") => {
            let Some(dir) = args.get(1) else {
                bail!("usage: instrument-timeline index <scenarios-dir>");
            };
            run_index(Path::new(dir))
        }
        Some(dir) => {
            let summary = args.iter().any(|a| a == "--summary");
            let scenario_id = args
                .iter()
                .skip(1)
                .find(|a| !a.starts_with("--"))
                .map(String::as_str);
            run_view(Path::new(dir), scenario_id, summary)
        }
        None => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("instrument-timeline - animated version timelines for legal instruments");
    println!();
    println!("Usage:");
    println!("  instrument-timeline <scenarios-dir> [scenario-id] [--summary]");
    println!("  instrument-timeline index <scenarios-dir>");
    println!();
    println!("Modes:");
    println!("  (default)   load a scenario and open the timeline viewer");
    println!("  --summary   print per-state instrument tables instead of the viewer");
    println!("  index       rebuild index.json for a scenarios directory");
}

fn run_index(scenarios_dir: &Path) -> Result<()> {
    println!("📂 Scanning {}...", scenarios_dir.display());
    let path = write_index(scenarios_dir)?;
    println!("✓ Wrote {}", path.display());
    Ok(())
}

fn run_view(scenarios_dir: &Path, scenario_id: Option<&str>, summary: bool) -> Result<()> {
    println!("📂 Reading scenario index from {}...", scenarios_dir.display());
    let index = load_index(scenarios_dir)?;
    let scenario = index.find_scenario(scenario_id)?;
    println!("✓ {} ({} states)", scenario.label, scenario.states.len());

    let states = load_state_groups(scenarios_dir, scenario)?;
    let snapshots = build_scenario(&scenario.id, &states)?;
    println!("✓ Built {} timeline snapshots", snapshots.len());

    if summary {
        print_summary(&snapshots);
        return Ok(());
    }

    run_viewer(scenario.label.clone(), snapshots)
}

fn print_summary(snapshots: &[Snapshot]) {
    for (index, snapshot) in snapshots.iter().enumerate() {
        println!();
        println!("━━━ {} ━━━", snapshot.heading(index, snapshots.len()));
        for line in snapshot.meta.summary_lines() {
            println!("  {line}");
        }
        for instrument in &snapshot.instruments {
            println!("  {}", instrument.display_name);
            for version in &instrument.versions {
                let number = version
                    .version_number
                    .map_or_else(|| "v?".to_string(), |n| format!("v{n}"));
                let valid_to = version
                    .valid_to
                    .map_or_else(|| "open ended".to_string(), |d| d.to_string());
                let timeline_marker = if version.on_timeline { "" } else { " (off timeline)" };
                println!(
                    "    {number}: {} → {valid_to}{timeline_marker}",
                    version.valid_from
                );
            }
        }
    }
}

#[cfg(feature = "tui")]
fn run_viewer(scenario_label: String, snapshots: Vec<Snapshot>) -> Result<()> {
    use instrument_timeline::PlaybackSequencer;

    println!("Starting viewer... (Press 'q' to quit)");
    let mut sequencer = PlaybackSequencer::new();
    sequencer.load(snapshots);

    let mut app = ui::App::new(scenario_label, sequencer);
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_viewer(_scenario_label: String, _snapshots: Vec<Snapshot>) -> Result<()> {
    eprintln!("❌ Viewer not available in this build!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print the timelines with: --summary");
    std::process::exit(1);
}
