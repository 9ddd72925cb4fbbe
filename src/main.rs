use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use signsheet::codec;
use signsheet::platform::{JsonFileStore, KeyValueStore, LocalPlatform, ViewportMetrics};
use signsheet::rendering::raster::digest_image;
use signsheet::{InputEvent, KeyScheme, Roster, RowId, SheetConfig, SignatureSheet, ToolKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay and inspect attendance-sheet signatures")]
struct Cli {
    /// JSON file holding the persisted signatures
    #[arg(short, long, default_value = "signatures.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mount a sheet on the store and replay a JSON script of input events
    Replay {
        script: PathBuf,
        /// Sheet configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Roster (JSON array of names or records); defaults to the faculty list
        #[arg(long)]
        roster: Option<PathBuf>,
        /// Container width in logical pixels
        #[arg(long, default_value = "640")]
        width: f32,
        /// Device pixel ratio
        #[arg(long, default_value = "1")]
        dpr: f32,
        /// Report a touch-capable display
        #[arg(long)]
        touch: bool,
    },
    /// List stored signatures
    List,
    /// Write one row's signature to a PNG file
    Export {
        #[arg(long)]
        row: usize,
        #[arg(long, value_enum, default_value = "canvas")]
        scheme: Scheme,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Delete stored signatures
    Clear {
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        row: Option<usize>,
        #[arg(long)]
        all: bool,
        #[arg(long, value_enum, default_value = "canvas")]
        scheme: Scheme,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Scheme {
    Canvas,
    Signature,
}

impl From<Scheme> for KeyScheme {
    fn from(s: Scheme) -> Self {
        match s {
            Scheme::Canvas => KeyScheme::Canvas,
            Scheme::Signature => KeyScheme::Signature,
        }
    }
}

/// One line of a replay script: either an input event (`"type"`) or a
/// toolbar/lock action (`"op"`).
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Step {
    Event(InputEvent),
    Control(Control),
}

#[derive(Deserialize, Debug)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Control {
    SetTool { tool: ToolKind },
    SetEraserRadius { radius: f32 },
    Lock { row: Option<RowId> },
    Unlock { row: Option<RowId> },
    Clear { row: Option<RowId> },
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("signsheet: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let store = Arc::new(
        JsonFileStore::open(&cli.store).with_context(|| format!("opening store {}", cli.store.display()))?,
    );
    match cli.command {
        Command::Replay { script, config, roster, width, dpr, touch } => {
            let metrics = ViewportMetrics {
                container_width: width,
                device_pixel_ratio: dpr,
                touch,
            };
            replay(store, &script, config.as_deref(), roster.as_deref(), metrics)
        }
        Command::List => list(&*store),
        Command::Export { row, scheme, out } => {
            let key = KeyScheme::from(scheme).key(RowId(row));
            let Some(encoded) = store.get(&key)? else {
                bail!("nothing stored under {}", key);
            };
            let img = codec::decode_data_url(&encoded)?;
            std::fs::write(&out, codec::encode_png(&img)?)?;
            println!("{} -> {} ({}x{})", key, out.display(), img.width(), img.height());
            Ok(())
        }
        Command::Clear { row, all, scheme } => {
            let scheme = KeyScheme::from(scheme);
            let keys: Vec<String> = if all {
                let prefix = scheme.key(RowId(0));
                let prefix = prefix.trim_end_matches('0');
                store.keys()?.into_iter().filter(|k| k.starts_with(prefix)).collect()
            } else {
                row.map(|r| vec![scheme.key(RowId(r))]).unwrap_or_default()
            };
            for key in &keys {
                store.remove(key)?;
                println!("removed {}", key);
            }
            Ok(())
        }
    }
}

fn replay(
    store: Arc<JsonFileStore>,
    script: &Path,
    config: Option<&Path>,
    roster: Option<&Path>,
    metrics: ViewportMetrics,
) -> anyhow::Result<()> {
    let config = match config {
        Some(p) => SheetConfig::from_json(&std::fs::read_to_string(p)?)
            .with_context(|| format!("loading config {}", p.display()))?,
        None => SheetConfig::default(),
    };
    let roster = match roster {
        Some(p) => Roster::load(p).with_context(|| format!("loading roster {}", p.display()))?,
        None => Roster::default(),
    };
    let steps: Vec<Step> = serde_json::from_str(&std::fs::read_to_string(script)?)
        .with_context(|| format!("parsing script {}", script.display()))?;

    let platform = Arc::new(LocalPlatform::with_store(store, metrics));
    let mut sheet = SignatureSheet::new(config, roster, platform)?;
    sheet.mount();
    // Let stored images land before replaying strokes over them.
    sheet.wait_for_restores();

    let mut persisted = 0;
    for step in steps {
        match step {
            Step::Event(ev) => {
                if sheet.handle_event(ev).persisted {
                    persisted += 1;
                }
            }
            Step::Control(Control::SetTool { tool }) => sheet.set_tool(tool),
            Step::Control(Control::SetEraserRadius { radius }) => {
                sheet.set_eraser_radius(radius);
            }
            Step::Control(Control::Lock { row: Some(r) }) => sheet.set_row_locked(r, true)?,
            Step::Control(Control::Lock { row: None }) => sheet.set_all_locked(true),
            Step::Control(Control::Unlock { row: Some(r) }) => sheet.set_row_locked(r, false)?,
            Step::Control(Control::Unlock { row: None }) => sheet.set_all_locked(false),
            Step::Control(Control::Clear { row: Some(r) }) => sheet.clear_row(r)?,
            Step::Control(Control::Clear { row: None }) => sheet.clear_all(),
        }
    }

    let m = sheet.metrics();
    println!(
        "viewport {} wide at dpr {} ({} input)",
        m.container_width,
        m.effective_dpr(),
        if m.touch { "touch" } else { "pointer" }
    );
    println!("{} strokes persisted", persisted);
    for row in sheet.rows() {
        let Some(surface) = sheet.surface(row.id) else { continue };
        let status = if surface.is_empty() { "unsigned" } else { "signed" };
        let digest = surface.raster().map(|r| r.digest()).unwrap_or_default();
        println!("{:>3}  {:<32} {:<20} {:<9} {}", row.id.index(), row.name, row.designation, status, &digest[..digest.len().min(16)]);
    }
    Ok(())
}

fn list(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    for key in store.keys()? {
        let Some(value) = store.get(&key)? else { continue };
        match codec::decode_data_url(&value) {
            Ok(img) => println!("{:<16} {}x{} {}", key, img.width(), img.height(), &digest_image(&img)[..16]),
            Err(e) => println!("{:<16} <unreadable: {}>", key, e),
        }
    }
    Ok(())
}
