//! DMX Runner - reference scheduler for the DMX control engine
//!
//! Loads an engine configuration (first argument, default `dmx.toml` when
//! present), installs the configured chase or a default fade on the
//! configured channels and polls the universe at the refresh rate until no
//! channel has actions left. Rendered values of the driven channels are
//! printed to stdout whenever they change.

#![warn(missing_docs)]

mod logging_setup;

use anyhow::{Context, Result};
use dmx_control::dmx::{BaseChannel, MAX_VALUE, UNIVERSE_SIZE};
use dmx_control::{Action, Engine, EngineConfig, ListenerType, Universe};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

const DEFAULT_CONFIG: &str = "dmx.toml";
const DEFAULT_FADE_MS: i64 = 1000;

fn load_config() -> Result<EngineConfig> {
    let path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            if !default.exists() {
                return Ok(EngineConfig::default());
            }
            default
        }
    };
    EngineConfig::load(&path).with_context(|| format!("Failed to load config {:?}", path))
}

fn driven_values(frame: &[u8; UNIVERSE_SIZE], channels: &[BaseChannel]) -> Vec<u8> {
    channels
        .iter()
        .filter_map(|c| frame.get(usize::from(c.channel_id()) - 1).copied())
        .collect()
}

fn main() -> Result<()> {
    let config = load_config()?;
    let _log_guard = logging_setup::init(&config.log)?;

    info!("==========================================");
    info!("===      DMX Runner Session Started    ===");
    info!("==========================================");

    let channels = config.channel_list()?;
    let steps = config.chase_steps()?;
    let (mut engine, handle) = Engine::new(Universe::new(i32::from(config.universe)));

    for address in &channels {
        engine.universe_mut().register_channel(*address)?.add_listener(
            "runner",
            |key: &str, running: i32| debug!("Listener {}: running = {}", key, running != 0),
            ListenerType::Action,
        );
    }

    if steps.is_empty() {
        info!("No chase configured, fading {} channel(s) up", channels.len());
        handle.set_action(
            channels.clone(),
            Action::fade(DEFAULT_FADE_MS, MAX_VALUE, config.repeat)?,
        )?;
    } else {
        info!(
            "Running {}-step chase on {} channel(s)",
            steps.len(),
            channels.len()
        );
        handle.chase(channels.clone(), steps, config.repeat())?;
    }

    let interval = config.refresh_interval();
    let start = Instant::now();
    let mut last_values: Option<Vec<u8>> = None;

    loop {
        let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let frame = engine.tick(now_ms);
        let values = driven_values(&frame, &channels);

        if last_values.as_ref() != Some(&values) {
            println!("{:>8}ms {:?}", now_ms, values);
            last_values = Some(values);
        }

        if !engine.universe().has_running_actions() {
            info!("All actions completed after {}ms", now_ms);
            break;
        }

        thread::sleep(interval);
    }

    Ok(())
}
