use clap::Parser;
use netanim_rs::engine::{AnimTime, EngineContext, FilterConfig};
use netanim_rs::viz::FrameLogger;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "trace-play",
    about = "Replay a netanim XML trace and dump per-tick render frames"
)]
struct Args {
    /// Path to the XML trace file
    #[arg(long)]
    trace: PathBuf,

    /// Stop at this simulation time (s); defaults to the trace's max time
    #[arg(long)]
    until_secs: Option<f64>,

    /// Simulation time step per tick (s)
    #[arg(long, default_value_t = 0.1)]
    update_rate: f64,

    /// Output frames JSON file (for offline replay)
    #[arg(long)]
    frames_json: Option<PathBuf>,

    /// Disable packet rendering
    #[arg(long)]
    no_packets: bool,

    /// Show wireless transmission circles
    #[arg(long)]
    wireless_circles: bool,

    /// Restrict wireless packet visibility to unicast-matched destinations
    #[arg(long)]
    unicast_match: bool,

    /// Hide packet metadata labels
    #[arg(long)]
    no_meta: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut ctx = EngineContext::new();
    ctx.set_update_rate(args.update_rate);
    ctx.set_filters(FilterConfig {
        show_packets: !args.no_packets,
        show_meta: !args.no_meta,
        show_wireless_circles: args.wireless_circles,
        unicast_match: args.unicast_match,
        show_route_path: false,
    });

    let summary = match ctx.load_trace(&args.trace, |parsed, total| {
        eprintln!("parsing {parsed}/{total}");
    }) {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let until = args.until_secs.unwrap_or(summary.max_simulation_time);
    let mut logger = FrameLogger::default();
    let mut t = 0.0;
    let mut shown_total: u64 = 0;
    while t <= until {
        let frame = ctx.tick(AnimTime::from_secs(t));
        shown_total += frame.packets_shown as u64;
        logger.push(frame);
        t += args.update_rate;
    }

    println!(
        "trace_summary version={} nodes={} links={} packets={} max_time={:.6} frames={} packets_shown_total={}",
        summary.version,
        summary.node_count,
        summary.link_count,
        summary.packet_count,
        summary.max_simulation_time,
        logger.frames.len(),
        shown_total
    );

    if let Some(path) = args.frames_json {
        let json = serde_json::to_string_pretty(&logger.frames).expect("serialize frames");
        fs::write(&path, json).expect("write frames json");
        eprintln!("wrote {} frames to {}", logger.frames.len(), path.display());
    }

    ExitCode::SUCCESS
}
