//! FairFlip CLI
//!
//! Usage:
//!   fairflip                                 # Interactive simulator
//!   fairflip --replay samples.txt --flip-after  # Replay a tilt recording, then flip
//!   fairflip --serve                         # HTTP API server
//!   fairflip --replay samples.txt --json     # JSON output

use clap::Parser;
use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

use fairflip::core::{
    parse_sample, run_server, HapticActuator, NoHaptics, ScriptedTiltSource, SessionHandle,
    TerminalBell,
};
use fairflip::types::{FlipOutcome, TiltOutput};
use fairflip::{FlipConfig, RandomPolicy, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "fairflip",
    version = VERSION,
    about = "FairFlip - a coin flip you can quietly tilt",
    long_about = "FairFlip simulates a coin whose next flip can be biased by tilting the device.\n\n\
                  Tilt x past +threshold arms HEADS (one short pulse), past -threshold arms\n\
                  TAILS (double pulse). Stealth mode disables the bias for verifiably fair flips.\n\n\
                  Modes:\n  \
                  --interactive  Type samples and commands (default)\n  \
                  --replay FILE  Feed a recorded sample file\n  \
                  --serve        HTTP API server mode\n\n\
                  Interactive commands:\n  \
                  <x> <y>        Deliver a tilt sample (also x,y or x=.. y=..)\n  \
                  flip           Flip the coin\n  \
                  stealth        Toggle stealth mode\n  \
                  status         Show the status line\n  \
                  quit           Exit"
)]
struct Args {
    /// Interactive mode - read samples and commands from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Replay samples from a file, one "x y" per line
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Flip once after the replay finishes
    #[arg(long)]
    flip_after: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tilt threshold override
    #[arg(long)]
    threshold: Option<f32>,

    /// Smoothing factor override (0, 1]
    #[arg(long)]
    smoothing: Option<f32>,

    /// RNG seed for RANDOM flips
    #[arg(long)]
    seed: Option<u64>,

    /// RANDOM flips alternate faces instead of drawing
    #[arg(long)]
    alternate: bool,

    /// Simulate a device without a vibration motor
    #[arg(long)]
    no_haptics: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let default_filter = if args.serve {
        fairflip::logging::SERVER_FILTER
    } else {
        fairflip::logging::TERMINAL_FILTER
    };
    fairflip::logging::init(args.log_json, default_filter);

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let result = if args.serve {
        run_serve(&args, config).await
    } else if args.interactive {
        run_interactive(&args, config).await
    } else if let Some(ref path) = args.replay {
        run_replay(path, &args, config).await
    } else {
        // Default to interactive if no mode specified
        run_interactive(&args, config).await
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Config file, then CLI overrides
fn build_config(args: &Args) -> fairflip::Result<FlipConfig> {
    let mut config = match args.config {
        Some(ref path) => FlipConfig::load(path)?,
        None => FlipConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.filter.tilt_threshold = threshold;
    }
    if let Some(smoothing) = args.smoothing {
        config.filter.smoothing_factor = smoothing;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.alternate {
        config.random_policy = RandomPolicy::Alternate;
    }
    config.validate()?;
    Ok(config)
}

fn actuator(args: &Args) -> Box<dyn HapticActuator> {
    if args.no_haptics {
        Box::new(NoHaptics)
    } else {
        Box::new(TerminalBell)
    }
}

/// Interactive commands besides samples
#[derive(Debug, PartialEq)]
enum Command {
    Flip,
    Stealth,
    Status,
    Quit,
}

lazy_static! {
    static ref RE_COMMAND: Regex =
        Regex::new(r"(?i)^\s*(flip|f|stealth|s|status|quit|exit|q)\s*$").unwrap();
}

fn parse_command(line: &str) -> Option<Command> {
    let caps = RE_COMMAND.captures(line)?;
    match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
        "flip" | "f" => Some(Command::Flip),
        "stealth" | "s" => Some(Command::Stealth),
        "status" => Some(Command::Status),
        _ => Some(Command::Quit),
    }
}

/// Run the interactive simulator
async fn run_interactive(args: &Args, config: FlipConfig) -> fairflip::Result<()> {
    let session = SessionHandle::new(config, actuator(args));
    session.start();

    print_header("Interactive", args.no_color);
    println!("Type a tilt sample like '4.2 0' or a command: flip, stealth, status, quit.");
    let threshold = session.lock().config().filter.tilt_threshold;
    println!("Tip: tilt past ±{:.1} on x to arm the next flip.", threshold);
    println!();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let prompt = format_prompt(&session, args.no_color);
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(sample) = parse_sample(line) {
            if let Some(output) = session.ingest(sample) {
                print_tilt(&output, args)?;
            }
            continue;
        }

        match parse_command(line) {
            Some(Command::Flip) => match session.request_flip() {
                Some(pending) => {
                    println!("{}", fairflip::LABEL_FLIPPING.yellow());
                    if let Some(outcome) = pending.settled().await {
                        print_outcome(&outcome, args)?;
                    }
                }
                None => println!("{}", "  flip already in progress".dimmed()),
            },
            Some(Command::Stealth) => {
                let notice = session.toggle_stealth();
                println!("{}", notice.text.bold());
            }
            Some(Command::Status) => {
                let update = session.snapshot();
                if args.json {
                    println!("{}", serde_json::to_string(&update)?);
                } else {
                    println!(
                        "  {} | offset=({:+.2}, {:+.2}) | rotation={:.0}°",
                        update.status, update.offset.x, update.offset.y, update.rotation
                    );
                }
            }
            Some(Command::Quit) => break,
            None => println!(
                "{}",
                "⚠ Expected a sample like '3.5 -1' or flip / stealth / status / quit".yellow()
            ),
        }
    }

    session.stop();
    println!("\nSession ended. Samples: {}", session.lock().filter().sample_count());
    Ok(())
}

/// Replay a sample file through the session
async fn run_replay(path: &Path, args: &Args, config: FlipConfig) -> fairflip::Result<()> {
    let file = File::open(path)?;
    let mut source = ScriptedTiltSource::from_reader(BufReader::new(file))?;

    let session = SessionHandle::new(config, actuator(args));
    session.start();

    if !args.json {
        print_header("Replay", args.no_color);
    }

    // Scripted delivery is synchronous: every output is queued once attach returns
    let mut outputs = session.attach(&mut source);
    while let Ok(output) = outputs.try_recv() {
        print_tilt(&output, args)?;
    }

    let haptics = session.lock().haptic_count();
    if !args.json {
        println!();
        println!(
            "Samples: {} | haptic pulses: {}",
            session.lock().filter().sample_count(),
            haptics
        );
    }

    if args.flip_after {
        if let Some(pending) = session.request_flip() {
            if let Some(outcome) = pending.settled().await {
                print_outcome(&outcome, args)?;
            }
        }
    }

    session.stop();
    Ok(())
}

/// Run HTTP API server
async fn run_serve(args: &Args, config: FlipConfig) -> fairflip::Result<()> {
    println!();
    println!("╔═══════════════════════════════════════════╗");
    println!("║  🪙 FairFlip API Server                    ║");
    println!("║  Version: {}                           ║", VERSION);
    println!("╚═══════════════════════════════════════════╝");
    println!();

    run_server(&args.addr, config).await
}

/// Print header
fn print_header(mode: &str, no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  FairFlip v{} - {}", VERSION, mode);
        println!("========================================");
    } else {
        println!("{}", "╔═══════════════════════════════════════════╗".bold());
        println!("{}", format!("║        FairFlip v{} - {}", VERSION, mode).bold());
        println!("{}", "╚═══════════════════════════════════════════╝".bold());
    }
    println!();
}

/// Prompt shows only the public status line
fn format_prompt(session: &SessionHandle, no_color: bool) -> String {
    let update = session.snapshot();
    if no_color {
        format!("[{}] > ", update.status)
    } else if update.flipping {
        format!("{} > ", format!("[{}]", update.status).yellow())
    } else {
        format!("{} > ", format!("[{}]", update.status).dimmed())
    }
}

fn print_tilt(output: &TiltOutput, args: &Args) -> fairflip::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string(output)?);
    } else if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
    }
    Ok(())
}

fn print_outcome(outcome: &FlipOutcome, args: &Args) -> fairflip::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string(outcome)?);
    } else if args.no_color {
        println!("{}", outcome.to_parseable_string());
    } else {
        println!("{}", outcome.to_terminal_string());
    }
    Ok(())
}
