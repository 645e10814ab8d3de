//! Command-line front end for `robot_kinematics`.
//!
//! ```bash
//! # Dump the built-in demo arm, edit it, feed it back
//! example chain > arm.json
//!
//! example fk --joints 10,20,-30,40,50,60
//! example ik --pose 900,100,1000,180,0,0 --near 0,0,0,0,0,0
//! example --chain arm.json ik --pose 900,100,1000,180,0,0 --config solver.json
//! ```
//!
//! Results go to stdout as JSON, logs to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use robot_kinematics::{
    ArmDimensions, AxisConfiguration, InverseKinematics, JointLimits, JointVector, KinematicChain,
    Pose, Solution, SolverConfig,
};
use serde::Serialize;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "example")]
#[command(about = "Forward and inverse kinematics for a six-axis arm", long_about = None)]
struct Cli {
    /// Chain description (JSON). Uses the built-in demo arm when omitted.
    #[arg(long, global = true)]
    chain: Option<PathBuf>,

    /// Log solver diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the chain description as JSON
    Chain,

    /// TCP pose for a joint vector (degrees)
    Fk {
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        joints: Vec<f64>,
    },

    /// Joint solutions for a TCP pose given as X,Y,Z,W,P,R
    Ik {
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        pose: Vec<f64>,

        /// Also report the valid solution nearest to these joints
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        near: Option<Vec<f64>>,

        /// Solver tolerances (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Drop solutions that violate axis limits
        #[arg(long)]
        valid_only: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ForwardOutput {
    tcp: Pose,
    xyzwpr: [f64; 6],
    in_limits: [bool; 6],
    configuration: AxisConfiguration,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InverseOutput<'a> {
    solutions: Vec<&'a Solution>,
    closest: Option<&'a Solution>,
    messages: Vec<String>,
}

fn demo_chain() -> Result<KinematicChain> {
    let dims = ArmDimensions {
        a1: 150.0,
        a2: 0.0,
        b: 0.0,
        c1: 486.5,
        c2: 700.0,
        c3: 600.0,
        c4: 65.0,
    };
    let limits = [
        JointLimits::new(-180.0, 180.0),
        JointLimits::new(-63.0, 136.0),
        JointLimits::new(-235.0, 55.0),
        JointLimits::new(-200.0, 200.0),
        JointLimits::new(-115.0, 115.0),
        JointLimits::new(-400.0, 400.0),
    ];
    Ok(KinematicChain::from_dimensions(dims, limits)?)
}

fn load_chain(path: Option<&Path>) -> Result<KinematicChain> {
    let Some(path) = path else {
        return demo_chain();
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let chain = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    info!("Loaded chain from {}", path.display());
    Ok(chain)
}

fn load_solver(path: Option<&Path>) -> Result<InverseKinematics> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SolverConfig::default(),
    };
    Ok(InverseKinematics::new(config)?)
}

fn six(values: &[f64], what: &str) -> Result<[f64; 6]> {
    match <[f64; 6]>::try_from(values) {
        Ok(array) => Ok(array),
        Err(_) => bail!("{} needs 6 comma-separated values, got {}", what, values.len()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let chain = load_chain(cli.chain.as_deref())?;

    match cli.command {
        Commands::Chain => print_json(&chain),
        Commands::Fk { joints } => {
            let joints = JointVector::new(six(&joints, "--joints")?);
            let result = chain.evaluate(&joints);
            if !result.is_within_limits() {
                info!("{} is outside the axis limits", joints);
            }
            print_json(&ForwardOutput {
                tcp: result.tcp,
                xyzwpr: result.tcp.to_xyzwpr(),
                in_limits: result.in_limits,
                configuration: chain.axis_configuration(&joints),
            })
        }
        Commands::Ik {
            pose,
            near,
            config,
            valid_only,
        } => {
            let [x, y, z, w, p, r] = six(&pose, "--pose")?;
            let target = Pose::from_xyzwpr(x, y, z, w, p, r);
            let solver = load_solver(config.as_deref())?;
            let set = solver.solve(&chain, &target);
            info!("{} solution(s), {} valid", set.len(), set.valid().count());

            let near = near.map(|values| six(&values, "--near")).transpose()?;
            let closest = near.and_then(|angles| set.closest_to(&JointVector::new(angles)));
            print_json(&InverseOutput {
                solutions: set.iter().filter(|s| !valid_only || s.valid).collect(),
                closest,
                messages: set.messages(),
            })
        }
    }
}
