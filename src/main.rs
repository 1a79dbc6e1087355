// main.rs — headless driver for the tile grid
//
// Spawns one worker per surface, then reads newline-delimited JSON commands
// on stdin (see protocol.rs) and prints the popup text for every selection
// report on stdout. Logs go to stderr; filter with RUST_LOG.
//
//   echo '{"type":"click","page_x":34,"page_y":10}' | tilestorm

use std::io::BufRead;
use std::time::Duration;

use tilestorm::config::Config;
use tilestorm::controller::{Controller, Popup};
use tilestorm::protocol::Command;
use tracing_subscriber::EnvFilter;

const POLL: Duration = Duration::from_millis(16);
const DRAIN: Duration = Duration::from_millis(250);

fn main() {
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();
    let mut controller = match Controller::spawn(&config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to start surfaces: {e}");
            std::process::exit(1);
        }
    };

    let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    tracing::warn!("stdin: {e}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match Command::decode(&line) {
                Ok(cmd) => {
                    if cmd_tx.send(cmd).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("{e}, line ignored"),
            }
        }
    });

    let mut shown: Vec<Option<Popup>> = vec![None; controller.surface_count()];

    loop {
        show(&mut shown, controller.try_recv_all());

        let cmd = match cmd_rx.recv_timeout(POLL) {
            Ok(cmd) => cmd,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        };
        tracing::debug!("command: {cmd:?}");

        let result = match cmd {
            Command::Click { page_x, page_y } => controller.click_page(page_x, page_y),
            Command::ClickSurface { surface, x, y } => controller.click_surface(surface, x, y),
            Command::Close { surface } => {
                if let Some(slot) = shown.get_mut(surface) {
                    *slot = None;
                }
                controller.close(surface)
            }
            Command::Quit => break,
        };
        if let Err(e) = result {
            tracing::warn!("{e}");
        }
    }

    // Let in-flight reports for the last commands arrive before tearing down.
    std::thread::sleep(DRAIN);
    show(&mut shown, controller.try_recv_all());
    controller.shutdown();
    tracing::info!("Shut down");
}

/// Print each popup whose content changed for its surface.
fn show(shown: &mut [Option<Popup>], popups: Vec<Popup>) {
    for popup in popups {
        let Some(slot) = shown.get_mut(popup.surface_index) else {
            continue;
        };
        if slot.as_ref() != Some(&popup) {
            println!("[surface {}] {popup}", popup.surface_index);
            *slot = Some(popup);
        }
    }
}
