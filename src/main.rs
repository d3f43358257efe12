use std::{
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
    thread,
};

use circlemap::{
    CircleMapError, CoordinateNormalizer, FileTrackMapLoader, TrackMapLoader,
    live::{
        config::AppConfig,
        replay::{load_feed, run_replay},
    },
    projection::CircleMapFrame,
    writer,
};
use clap::{Parser, Subcommand};
use log::{error, warn};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded live feed and write one circle map frame per update
    Replay {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory with `<circuit key>.json` track maps
        #[arg(short, long)]
        maps: Option<PathBuf>,

        /// Only write frames once the track outline is ready
        #[arg(long, default_value_t = false)]
        ready_only: bool,
    },
    /// Print the normalized outline and transform of a circuit
    Outline {
        #[arg(short, long)]
        circuit: String,

        #[arg(short, long)]
        maps: Option<PathBuf>,
    },
}

fn track_map_loader(
    maps: Option<PathBuf>,
    app_config: &AppConfig,
) -> Result<FileTrackMapLoader, CircleMapError> {
    match maps.or_else(|| app_config.track_maps_dir.clone()) {
        Some(dir) => Ok(FileTrackMapLoader::new(dir)),
        None => FileTrackMapLoader::new_default(),
    }
}

fn replay(
    input: &Path,
    output: Option<PathBuf>,
    loader: FileTrackMapLoader,
    emit_not_ready_frames: bool,
) -> Result<(), CircleMapError> {
    let messages = load_feed(input)?;
    let (frame_tx, frame_rx) = mpsc::channel::<CircleMapFrame>();
    let writer_thread =
        thread::spawn(move || writer::write_frames(output.as_deref(), frame_rx));

    let replay_result = run_replay(messages, Arc::new(loader), frame_tx, emit_not_ready_frames);
    let writer_result = writer_thread
        .join()
        .map_err(|_| CircleMapError::WriterError {
            source: std::io::Error::other("frame writer thread panicked"),
        })?;

    replay_result?;
    writer_result?;
    Ok(())
}

fn outline(circuit: &str, loader: FileTrackMapLoader) -> Result<(), CircleMapError> {
    let Some(raw) = loader.load_track_map(circuit)? else {
        warn!("No track map for circuit {} in {:?}", circuit, loader.maps_path());
        return Ok(());
    };
    let track = CoordinateNormalizer::new().normalize(&raw)?;
    let json = serde_json::to_string_pretty(&track)
        .map_err(|e| CircleMapError::FrameSerializeError { source: e })?;
    println!("{}", json);
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");

    let app_config = match AppConfig::from_local_file() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!("Ignoring config file: {}", e);
            AppConfig::default()
        }
    };

    let result = match cli.command {
        Commands::Replay {
            input,
            output,
            maps,
            ready_only,
        } => track_map_loader(maps, &app_config).and_then(|loader| {
            replay(
                &input,
                output,
                loader,
                app_config.emit_not_ready_frames && !ready_only,
            )
        }),
        Commands::Outline { circuit, maps } => {
            track_map_loader(maps, &app_config).and_then(|loader| outline(&circuit, loader))
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
