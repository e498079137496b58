use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_recorder::audio::{SimulatedCapture, SimulatedRegistry};
use voice_recorder::{Config, Event, Platform, VoiceRecorder};

/// Record one voice memo against the simulated platform
#[derive(Parser, Debug)]
#[command(name = "voice-recorder", version)]
struct Args {
    /// Config file path, without extension
    #[arg(short, long, default_value = "config/voice-recorder")]
    config: String,

    /// Stop after this many milliseconds; omit to run until the cap
    #[arg(long)]
    record_ms: Option<u64>,

    /// Microphone requests to deny before granting access
    #[arg(long, default_value_t = 0)]
    denials: u32,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn print_event(event: &Event) -> Result<()> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("voice_recorder={}", log_level))),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = if Path::new(&format!("{}.toml", args.config)).exists() {
        Config::load(&args.config)?
    } else {
        info!("No config at {}.toml, using defaults", args.config);
        Config::defaults()?
    };

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!(
        "Max recording time: {}ms, format: {}",
        cfg.recording.max_duration_ms,
        cfg.recording.format.extension()
    );

    let platform = Platform {
        capture: Arc::new(SimulatedCapture::new(args.denials)),
        registry: Arc::new(SimulatedRegistry::default()),
        destination: Platform::destination_for(&cfg),
    };
    let recorder = VoiceRecorder::new(&cfg, platform);

    let mut rx = recorder.events().subscribe();
    recorder.init();

    // Wait for the recorder handle
    loop {
        let event = rx.recv().await.context("Event bus closed")?;
        print_event(&event)?;

        match event {
            Event::Ready => break,
            Event::CannotAccessAudio => bail!("Cannot access the microphone"),
            Event::Error { error } => bail!("Cannot create recorder: {}", error),
            _ => {}
        }
    }

    if !recorder.session().start_recording() {
        bail!("Recorder refused to start");
    }

    if let Some(ms) = args.record_ms {
        let session = recorder.session().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            session.stop_recording();
        });
    }

    loop {
        let event = rx.recv().await.context("Event bus closed")?;
        print_event(&event)?;

        if event.is_terminal_recording() {
            break;
        }
    }

    recorder.shutdown();
    while let Ok(event) = rx.try_recv() {
        print_event(&event)?;
    }

    println!("{}", serde_json::to_string(&recorder.session().stats())?);

    Ok(())
}
