//! blc-lcd - show text and icons on a Beckmann+Egle BLC terminal
//!
//! Loads a TOML config, brings up the display, places a layout and any
//! `--text` items, then keeps the screen up for `--hold` seconds, stepping
//! icon animations every `--tick` milliseconds.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use blc_driver::{
    layout, Blc, CharDisplay, IconPlacement, LayoutItem, TomlConfig, DEFAULT_SECTION,
};
use blc_hal_linux::{LinuxSerial, UucpLock};

#[derive(Parser, Debug)]
#[command(name = "blc-lcd", version, about = "Drive a Beckmann+Egle BLC character display")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "/etc/blc.toml")]
    config: PathBuf,

    /// Config section with Port, Type and Icons
    #[arg(short, long, default_value = DEFAULT_SECTION)]
    section: String,

    /// Layout to show, read from section `Layout:<name>`
    #[arg(short, long)]
    layout: Option<String>,

    /// Extra text as ROW:COL:TEXT (1-based)
    #[arg(short, long = "text")]
    text: Vec<LayoutItem>,

    /// Icon to show as ID:ROW:COL (position 1-based)
    #[arg(short, long = "icon")]
    icon: Vec<IconPlacement>,

    /// Seconds to keep the display up before quitting
    #[arg(long, default_value_t = 0)]
    hold: u64,

    /// Milliseconds between icon animation frames
    #[arg(long, default_value_t = 500)]
    tick: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = TomlConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let mut blc = Blc::init(&config, &args.section, &mut LinuxSerial, UucpLock::default())
        .context("initializing display")?;

    let reserved = usize::from(blc.icon_count());
    if config.icons().len() > reserved {
        warn!(
            defined = config.icons().len(),
            reserved,
            "more icons configured than reserved, extra icons ignored"
        );
    }
    for (id, frames) in config.icons().iter().take(reserved).enumerate() {
        blc.define_icon(id as u8, frames)
            .with_context(|| format!("defining icon {id}"))?;
    }

    if let Some(name) = &args.layout {
        let items = layout::load(&config, name);
        let placed = layout::apply(&mut blc, &items);
        debug!(layout = %name, placed, "layout applied");
    }
    layout::apply(&mut blc, &args.text);

    let deadline = Instant::now() + Duration::from_secs(args.hold);
    let tick = Duration::from_millis(args.tick.max(1));
    let mut frame = 0;
    loop {
        for icon in &args.icon {
            blc.draw_icon(icon.id, frame, icon.row, icon.col)
                .with_context(|| format!("drawing icon {}", icon.id))?;
        }
        blc.flush().context("flushing display")?;

        if Instant::now() >= deadline {
            break;
        }
        thread::sleep(tick);
        frame = frame.wrapping_add(1);
    }

    blc.quit();
    Ok(())
}
