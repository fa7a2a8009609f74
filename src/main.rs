use anasim::detectors::{ArrayGeometry, SmearMode};
use anasim::{Config, ReactionRole, Simulation};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "anasim")]
#[command(about = "Reaction event generator and silicon/wire array response", long_about = None)]
struct Cli {
    /// JSON run configuration
    config: Option<PathBuf>,

    /// Report the fraction of channel centres that map back onto themselves
    #[arg(long)]
    check_geometry: bool,

    /// Write every channel corner and centre to this file
    #[arg(long, value_name = "FILE")]
    draw: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.check_geometry || cli.draw.is_some() {
        let geometry = ArrayGeometry::new(SmearMode::Fixed);
        if cli.check_geometry {
            println!("geometry consistency ratio: {:.4}", geometry.consistency_ratio());
        }
        if let Some(path) = &cli.draw {
            let mut writer = BufWriter::new(File::create(path)?);
            geometry.write_coordinates(&mut writer)?;
            info!("wrote channel coordinates to {}", path.display());
        }
    }

    let Some(path) = &cli.config else {
        if !cli.check_geometry && cli.draw.is_none() {
            return Err("no configuration file given".into());
        }
        return Ok(());
    };

    let config = Config::from_file(path)?;
    let simulation = Simulation::new(config)?;
    let summary = simulation.run()?;

    println!("{}: {} events", simulation.equation(), summary.events);
    for role in [
        ReactionRole::Ejectile,
        ReactionRole::Residual,
        ReactionRole::BreakupLight,
        ReactionRole::BreakupHeavy,
    ] {
        let count = summary.detected_by_role.get(&role).copied().unwrap_or(0);
        if count > 0 {
            println!(
                "  {:<14} {:>8} detected ({:.2}%)",
                role.to_string(),
                count,
                100.0 * summary.efficiency(role)
            );
        }
    }
    for (stage, count) in &summary.detected_by_stage {
        println!("  {:<14} {:>8} hits", stage, count);
    }
    println!(
        "  any particle   {:>8} events ({:.2}%)",
        summary.events_with_detection,
        100.0 * summary.any_detection_efficiency()
    );
    Ok(())
}
