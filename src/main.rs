//! rig-symmetry CLI
//!
//! Usage:
//!   rig-symmetry [OPTIONS] <SCENE>
//!
//! Options:
//!   -m, --mode <MODE>        mirror, flip or symmetrize
//!   -a, --axis <AXIS>        horizontal or vertical
//!   -f, --fulcrum <FULCRUM>  origin, centroid or offset
//!       --apply-to <SIDE>    top-right or bottom-left
//!       --reset              Key frame 1 and update the resting pose
//!       --classify           Only print the classification
//!   -n, --dry-run            Print the planned keys without applying
//!   -o, --output <FILE>      Write the updated scene here
//!   -h, --help               Print help

use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;

use rig_symmetry::rig::types::{ApplyTo, Axis, Frame, Fulcrum, Mode, NodeId};
use rig_symmetry::{plan_transformation, MemoryScene, Preferences, RigError, Session};

#[derive(Parser)]
#[command(name = "rig-symmetry")]
#[command(about = "Mirror, flip and symmetrize 2D deformer rigs")]
struct Cli {
    /// Scene document (TOML)
    scene: PathBuf,

    /// Transformation mode: mirror, flip, symmetrize
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Reflection axis: horizontal, vertical
    #[arg(short, long)]
    axis: Option<Axis>,

    /// Pivot: origin, centroid, offset
    #[arg(short, long)]
    fulcrum: Option<Fulcrum>,

    /// Side overwritten when symmetrizing: top-right, bottom-left
    #[arg(long)]
    apply_to: Option<ApplyTo>,

    /// Clear existing keys, key frame 1 and copy the result to the resting pose
    #[arg(long)]
    reset: bool,

    /// Frame to read and key (defaults to the scene's frame)
    #[arg(long)]
    frame: Option<Frame>,

    /// Replace the scene's selection
    #[arg(short, long, num_args = 1..)]
    select: Vec<String>,

    /// Preferences file (TOML); created with --save-prefs
    #[arg(short, long)]
    prefs: Option<PathBuf>,

    /// Store the effective options in the preferences file
    #[arg(long, requires = "prefs")]
    save_prefs: bool,

    /// Print the classification and available options, then exit
    #[arg(long)]
    classify: bool,

    /// Print the planned keys without applying them
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Write the updated scene to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log chain, wing and pivot details
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), RigError> {
    let mut scene = MemoryScene::from_file(&cli.scene)?;
    if !cli.select.is_empty() {
        scene.set_selection(cli.select.iter().map(|s| NodeId::new(s.as_str())).collect())?;
    }
    let frame = cli.frame.unwrap_or_else(|| scene.frame());

    let preferences = effective_preferences(cli)?;
    if cli.save_prefs {
        if let Some(path) = &cli.prefs {
            preferences.save(path)?;
        }
    }

    let mut session = Session::new(preferences);
    session.set_reset_to_resting(cli.reset);
    let classification = session.selection_changed(&scene).clone();

    println!(
        "operation: {} ({} nodes, anchors {:?})",
        classification.operation,
        classification.chain.len(),
        classification.anchors
    );
    let availability = session.availability();
    for hint in &availability.hints {
        println!("hint: {}", hint);
    }
    if cli.classify {
        let modes: Vec<String> = availability
            .modes
            .iter()
            .map(|m| m.mode.to_string())
            .collect();
        println!("modes: {}", modes.join(", "));
        if let Some(label) = availability.offset_label {
            println!("offset fulcrum: {}", label);
        }
        return Ok(());
    }

    if cli.dry_run {
        let pref = session
            .preferences()
            .to_pref(classification.operation, cli.reset);
        let plan = plan_transformation(&scene, &classification, &pref, frame)?;
        println!("{} ({} keys)", plan.label, plan.writes.len());
        for write in &plan.writes {
            println!("  {}", write);
        }
        return Ok(());
    }

    let report = session.apply(&mut scene, frame)?;
    eprintln!("{}", report);

    match &cli.output {
        Some(path) => scene.save(path)?,
        None => print!("{}", scene.to_toml_string()?),
    }
    Ok(())
}

/// Stored preferences overridden by the options given on the command line
fn effective_preferences(cli: &Cli) -> Result<Preferences, RigError> {
    let mut preferences = match &cli.prefs {
        Some(path) => Preferences::load_or_default(path)?,
        None => Preferences::default(),
    };
    if let Some(mode) = cli.mode {
        preferences.mode = mode;
    }
    if let Some(axis) = cli.axis {
        preferences.axis = axis;
    }
    if let Some(fulcrum) = cli.fulcrum {
        preferences.fulcrum = fulcrum;
    }
    if let Some(apply_to) = cli.apply_to {
        preferences.apply_to = apply_to;
    }
    Ok(preferences)
}
