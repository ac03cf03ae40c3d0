//! Swarm Field entry point
//!
//! Lays out the grid, starts the UDP control listener and drives the
//! fixed-rate tick until the requested number of ticks has run.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use glam::Vec3;

use swarm_field::control::{Behavior, ControlStore, Subject};
use swarm_field::net;
use swarm_field::settings::Settings;
use swarm_field::sim::{Driver, FixedObstacles, Surface, Swarm};

#[derive(Parser, Debug)]
#[command(name = "swarm-field")]
#[command(about = "Drive an actuator grid from UDP commands")]
#[command(version)]
struct Cli {
    /// Settings file (JSON). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective settings to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// UDP port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Cell spacing in world units
    #[arg(long)]
    density: Option<f32>,

    /// Wave damping factor
    #[arg(long)]
    damping: Option<f32>,

    /// Surface width (x)
    #[arg(long, default_value_t = 3.0)]
    width: f32,

    /// Surface depth (z)
    #[arg(long, default_value_t = 1.5)]
    depth: f32,

    /// Obstacle position as "x,z" (repeatable)
    #[arg(long = "obstacle", value_parser = parse_obstacle)]
    obstacles: Vec<Vec3>,

    /// Start under manual control with this behavior
    #[arg(long)]
    behavior: Option<String>,

    /// Start with this subject
    #[arg(long)]
    subject: Option<String>,

    /// Stop after this many ticks (runs until killed when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Seconds between status lines
    #[arg(long, default_value_t = 2.0)]
    status_every: f32,
}

fn parse_obstacle(s: &str) -> Result<Vec3, String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,z\", got {s:?}"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x in {s:?}: {e}"))?;
    let z: f32 = z.trim().parse().map_err(|e| format!("bad z in {s:?}: {e}"))?;
    Ok(Vec3::new(x, 0.0, z))
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(density) = cli.density {
        settings.density = density;
    }
    if let Some(damping) = cli.damping {
        settings.damping = damping;
    }
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = load_settings(&cli)?;
    if let Some(path) = &cli.write_config {
        settings
            .save(path)
            .with_context(|| format!("writing settings to {}", path.display()))?;
        log::info!("Wrote settings to {}", path.display());
        return Ok(());
    }

    let surface = Surface::from_size(cli.width, cli.depth);
    let swarm = match Swarm::new(&settings, Some(&surface)) {
        Ok(swarm) => swarm,
        Err(e) => {
            log::error!("Swarm setup failed: {e}");
            bail!(e);
        }
    };
    log::info!(
        "Swarm Field starting: {}x{} cells ({} total) over {:.2}x{:.2}",
        swarm.grid().col_count(),
        swarm.grid().row_count(),
        swarm.grid().cell_count(),
        surface.width(),
        surface.depth(),
    );

    let store = ControlStore::new();
    if let Some(name) = &cli.subject {
        match Subject::from_wire(name) {
            Some(subject) => store.set_subject(subject),
            None => log::warn!("Unknown subject {name:?}, keeping {}", Subject::default()),
        }
    }
    if let Some(name) = &cli.behavior {
        store.set_manual_behavior(Behavior::from_wire(name));
    }
    store.set_gestures_enabled(settings.gestures_enabled);

    let listener = net::spawn(settings.port, store.clone())
        .with_context(|| format!("starting control listener on port {}", settings.port))?;

    let mut driver = Driver::new(swarm, store, FixedObstacles(cli.obstacles.clone()));
    run(&mut driver, cli.ticks, settings.tick_dt(), cli.status_every);

    let applied = listener.shutdown();
    log::info!(
        "Stopped after {} ticks, {} control packets applied",
        driver.swarm().time_ticks,
        applied
    );
    Ok(())
}

fn run(driver: &mut Driver<FixedObstacles>, ticks: Option<u64>, dt: f32, status_every: f32) {
    let frame = Duration::from_secs_f32(dt);
    let mut last = Instant::now();
    let mut since_status = 0.0;

    while ticks.is_none_or(|limit| driver.swarm().time_ticks < limit) {
        let now = Instant::now();
        let frame_dt = now.duration_since(last).as_secs_f32();
        last = now;

        driver.advance(frame_dt);

        since_status += frame_dt;
        if since_status >= status_every {
            since_status = 0.0;
            if let Some(report) = driver.last_report() {
                log::info!(
                    "tick {} | {} | peak {:.3} | ripples {}",
                    report.tick,
                    driver.store().snapshot(),
                    report.peak_offset,
                    report.ripples
                );
            }
        }

        let spent = now.elapsed();
        if spent < frame {
            thread::sleep(frame - spent);
        }
    }
}
