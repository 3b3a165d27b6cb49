use std::io::{BufWriter, Write};
use std::path::PathBuf;

use apex_sim::{DriveConfig, DriveSession, InputScript};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Replay scripted input through the Apex Drive car model")]
struct Cli {
    /// drive.toml with catalog and session settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog file, overrides the one named in the config
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a script and print frame reports as JSON lines
    Run {
        script: PathBuf,
        /// Catalog index, overrides the script and the config
        #[arg(long)]
        car: Option<usize>,
        #[arg(long)]
        max_frame_dt: Option<f32>,
        /// Print every n-th frame; the last frame is always printed
        #[arg(long, default_value_t = 1)]
        every: u64,
    },
    /// List the catalog
    Cars,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apex_replay=info,apex_sim=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DriveConfig::load(path)?,
        None => DriveConfig::default(),
    };
    if let Some(catalog) = cli.catalog {
        config.catalog = Some(catalog);
    }
    let catalog = config.load_catalog()?;

    match cli.command {
        Commands::Cars => {
            for (index, entry) in catalog.entries().iter().enumerate() {
                let profile = entry.profile;
                println!(
                    "{index}: {name} ({color}) accel {accel} top {top} brake {brake} steer {steer}",
                    name = entry.name,
                    color = entry.color.to_hex(),
                    accel = profile.acceleration(),
                    top = profile.top_speed(),
                    brake = profile.brake_force(),
                    steer = profile.steering_rate(),
                );
            }
        }
        Commands::Run {
            script,
            car,
            max_frame_dt,
            every,
        } => {
            let mut script = InputScript::load(&script)?;
            if car.is_some() {
                script.car = car;
            }
            if let Some(max) = max_frame_dt {
                config.session.max_frame_dt = Some(max);
            }

            let mut session = DriveSession::new(catalog, config.session)?;
            tracing::info!(frames = script.frames, dt = script.dt, "replaying script");

            let every = every.max(1);
            let mut out = BufWriter::new(std::io::stdout().lock());
            let mut last = None;
            for report in script.run(&mut session)? {
                if report.frame % every == 0 || report.frame == script.frames {
                    serde_json::to_writer(&mut out, &report)?;
                    out.write_all(b"\n")?;
                }
                last = Some(report);
            }
            out.flush()?;

            if let Some(report) = last {
                let position = report.vehicle.world_position();
                tracing::info!(
                    car = %session.active_entry().name,
                    speed_kmh = report.telemetry.rounded(),
                    heading = report.vehicle.heading,
                    x = position.x,
                    z = position.z,
                    "replay finished"
                );
            }
        }
    }

    Ok(())
}
