use std::io::BufRead;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use tokio::sync::mpsc;

use samsung_tv_switch::{
    ControllerSettingsBuilder, PowerController, RemoteKey, StateRefresher, SwitchHandler,
    SwitchUpdate, TargetDevice, TvSwitch,
};

/// Samsung TV power switch
#[derive(Parser)]
#[command(name = "samsung_tv_switch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// What to do
    #[arg(long, value_enum, default_value_t = Command::Start)]
    command: Command,

    /// TV IP address
    #[arg(long)]
    ip: String,

    /// TV MAC address (required for start and on)
    #[arg(long)]
    mac: Option<String>,

    /// Seconds between background state refreshes (start only)
    #[arg(long, default_value_t = 60)]
    refresh_secs: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Command {
    /// Run the switch bridge until interrupted
    Start,
    /// Turn the TV on
    On,
    /// Turn the TV off
    Off,
    /// Print whether the TV is on or off
    State,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter(
            None,
            if cli.verbose {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();

    let needs_mac = matches!(cli.command, Command::Start | Command::On);
    let mac = match (&cli.mac, needs_mac) {
        (Some(mac), _) => mac.clone(),
        (None, false) => String::new(),
        (None, true) => {
            error!("missing --mac");
            return ExitCode::from(2);
        }
    };

    let settings = ControllerSettingsBuilder::new()
        .with_refresh_interval(Duration::from_secs(cli.refresh_secs.max(1)))
        .build();
    let refresh_interval = settings.refresh_interval;
    let controller = Arc::new(PowerController::new(settings));
    let device = TargetDevice::new(&cli.ip, &mac);

    match cli.command {
        Command::Start => {
            run_bridge(TvSwitch::new(device, controller), refresh_interval).await;

            ExitCode::SUCCESS
        }
        Command::On => match controller.power_on(&device).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        },
        Command::Off => match controller.power_off(&device).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        },
        Command::State => {
            if controller.get_state(&device).await {
                println!("on");
            } else {
                println!("off");
            }

            ExitCode::SUCCESS
        }
    }
}

/// Run the switch until Ctrl-C, end of input, or `quit`.
///
/// State changes found by the background refresh are logged. Lines read from stdin stand in for
/// remote get/set requests: `on`, `off`, `state`, or `key <KEY>`.
async fn run_bridge(switch: TvSwitch, refresh_interval: Duration) {
    let switch = Arc::new(switch);

    info!("Switch bridge starting for TV {}", switch.device());

    let (update_tx, mut update_rx) = mpsc::channel(8);
    let refresher = StateRefresher::new(refresh_interval);
    let refresh_handle = refresher.start(switch.clone(), update_tx);

    // Task to log state changes pushed by the refresher
    tokio::spawn(async move {
        let mut last_state: Option<bool> = None;

        while let Some(SwitchUpdate::State(is_on)) = update_rx.recv().await {
            if last_state != Some(is_on) {
                info!("Switch state: {}", if is_on { "on" } else { "off" });
                last_state = Some(is_on);
            }
        }
    });

    let stdin_switch = switch.clone();
    let mut lines = forward_lines(std::io::BufReader::new(std::io::stdin()));

    // Task to accept switch requests from the console
    let stdin_handle = tokio::spawn(async move {
        while let Some(line) = lines.recv().await {
            let mut words = line.split_whitespace();

            match (words.next(), words.next()) {
                (Some("on"), None) => {
                    let _ = stdin_switch.on_set(true).await;
                }
                (Some("off"), None) => {
                    let _ = stdin_switch.on_set(false).await;
                }
                (Some("state"), None) => {
                    println!("{}", if stdin_switch.on_get().await { "on" } else { "off" });
                }
                (Some("key"), Some(key)) => match key.parse::<RemoteKey>() {
                    Ok(key) => {
                        let _ = stdin_switch.send_key(key).await;
                    }
                    Err(e) => warn!("{e}"),
                },
                (Some("quit"), None) => break,
                (None, _) => {}
                _ => warn!("Unknown request (expected: on, off, state, key <KEY>, quit)"),
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        _ = stdin_handle => {}
    }

    refresher.stop();
    let _ = refresh_handle.await;

    info!("Switch bridge shut down");
}

/// Forward lines from `reader` over a channel until end of input.
///
/// The reader runs on a detached thread, outside the runtime's blocking pool, so a pending read
/// never holds up runtime shutdown.
fn forward_lines<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (line_tx, line_rx) = mpsc::channel(8);

    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if line_tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Could not read from stdin: {e}");
                    break;
                }
            }
        }
    });

    line_rx
}

// ================================================================================================
// Tests
