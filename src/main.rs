use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use route_sim::config::{CameraRangeMode, Settings};
use route_sim::core::{InterpolationMode, Path};
use route_sim::host::driver::wall_clock_since;
use route_sim::host::{run_headless, run_realtime, MockRendererHost};
use route_sim::input::load_file;
use route_sim::playback::{PlaybackController, SessionEvent};
use route_sim::store::{JsonFileStore, RouteStore, SavedModel, SavedRoute, TravelMethod};

#[derive(StructOpt)]
#[structopt(name = "route-sim", about = "Animate a model and camera along a route")]
enum Command {
    /// Play a directions JSON, path JSON or CSV file
    Play {
        /// The route file to load
        file: String,
        #[structopt(flatten)]
        options: PlayArgs,
    },
    /// Play a route from the library
    Replay {
        /// Saved route name, `FROM;TO`
        name: String,
        #[structopt(flatten)]
        options: PlayArgs,
    },
    /// List saved routes
    Routes,
    /// Remove a saved route
    Delete {
        /// Saved route name, `FROM;TO`
        name: String,
    },
    /// List saved models
    Models,
    /// Add a model to the library
    AddModel {
        url: String,
        #[structopt(long)]
        transit: bool,
    },
}

#[derive(StructOpt, Debug)]
struct PlayArgs {
    /// Desired travel time in minutes, usually 0 to 120; 0 plays at real speed
    #[structopt(long, default_value = "0")]
    eta: f64,
    /// Model scale, 1 to 100
    #[structopt(long, default_value = "3")]
    scale: f64,
    /// Tick on a real clock instead of as fast as possible
    #[structopt(long)]
    realtime: bool,
    /// Headless tick limit
    #[structopt(long, default_value = "1000000")]
    max_ticks: u64,
    /// Interpolate linearly instead of along great circles
    #[structopt(long)]
    linear: bool,
    /// Pull the camera back as the model speeds up
    #[structopt(long)]
    adaptive_range: bool,
    /// Store the played route in the library
    #[structopt(long, number_of_values = 2, value_names = &["FROM", "TO"])]
    save: Option<Vec<String>>,
    /// Mark the saved route as transit
    #[structopt(long)]
    transit: bool,
    /// Write the effective settings back to the config file
    #[structopt(long)]
    save_settings: bool,
}

impl PlayArgs {
    /// Settings from the config file with flag overrides applied
    fn settings(&self) -> Settings {
        let mut settings = Settings::load();
        if self.linear {
            settings.interpolation = InterpolationMode::Linear;
        }
        if self.adaptive_range {
            settings.camera_range = CameraRangeMode::SpeedAdaptive;
        }
        settings
    }

    fn travel_method(&self) -> TravelMethod {
        if self.transit {
            TravelMethod::Transit
        } else {
            TravelMethod::Driving
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let command = Command::from_args();
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

    match command {
        Command::Play { file, options } => {
            let path = load_file(&file)?;
            info!("Loaded {} with {} nodes", file, path.len());
            rt.block_on(play(path, options, library))
        }
        Command::Replay { name, options } => {
            let route = rt.block_on(library()?.load_route(&name))?;
            rt.block_on(play(route.path, options, library))
        }
        Command::Routes => {
            for route in rt.block_on(library()?.list_routes())? {
                println!(
                    "{}\t{:?}\t{} nodes\t{:.0}s\t{}",
                    route.name(),
                    route.travel_method,
                    route.path.len(),
                    route.path.total_duration(),
                    route.saved_at.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
        Command::Delete { name } => {
            if !rt.block_on(library()?.delete_route(&name))? {
                warn!("No saved route named {}", name);
            }
            Ok(())
        }
        Command::Models => {
            for model in rt.block_on(library()?.list_models())? {
                println!("{}\t{:?}\t{}", model.name, model.travel_method, model.url);
            }
            Ok(())
        }
        Command::AddModel { url, transit } => {
            let method = if transit { TravelMethod::Transit } else { TravelMethod::Driving };
            rt.block_on(library()?.save_model(SavedModel::from_url(&url, method)))?;
            Ok(())
        }
    }
}

fn library() -> Result<JsonFileStore> {
    JsonFileStore::default_location().context("No user data directory available for the route library")
}

/// Play `path` and print the session summary
///
/// The route library is only opened when the route is being saved.
async fn play<S: RouteStore>(path: Path, options: PlayArgs, open_library: impl FnOnce() -> Result<S>) -> Result<()> {
    let settings = options.settings();
    if options.save_settings {
        settings.save()?;
    }

    let frame = settings.frame_interval();
    let mut controller = PlaybackController::new(MockRendererHost::default(), settings)?;
    let events = controller.subscribe();

    controller.start_session(path.clone(), options.eta, options.scale)?;

    let started = tokio::time::Instant::now();
    let summary = if options.realtime {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let ctrl_c = stop_signal.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c.store(true, Ordering::SeqCst);
            }
        });
        run_realtime(&mut controller, frame, stop_signal).await
    } else {
        run_headless(&mut controller, frame, options.max_ticks)
    };
    info!("Playback took {:.2?}", wall_clock_since(started));

    for event in events.try_iter() {
        if let SessionEvent::Started { session_id } = event {
            info!("Session {} started", session_id);
        }
    }

    let summary = summary.context("Session produced no summary")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(endpoints) = &options.save {
        if let [from, to] = endpoints.as_slice() {
            open_library()?
                .save_route(SavedRoute::new(from, to, options.travel_method(), path))
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Command::from_iter_safe(std::iter::once("route-sim").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_play_defaults() {
        match parse(&["play", "route.json"]) {
            Command::Play { file, options } => {
                assert_eq!(file, "route.json");
                assert_eq!(options.eta, 0.0);
                assert_eq!(options.scale, 3.0);
                assert_eq!(options.max_ticks, 1_000_000);
                assert!(!options.realtime);
                assert!(options.save.is_none());
                assert_eq!(options.travel_method(), TravelMethod::Driving);
            }
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn test_play_flags() {
        let command = parse(&[
            "replay", "Lyon;Paris", "--eta", "45", "--scale", "10", "--realtime", "--adaptive-range",
            "--save", "Lyon", "Nice", "--transit",
        ]);
        match command {
            Command::Replay { name, options } => {
                assert_eq!(name, "Lyon;Paris");
                assert_eq!(options.eta, 45.0);
                assert_eq!(options.scale, 10.0);
                assert!(options.realtime);
                assert!(options.adaptive_range);
                assert_eq!(options.save, Some(vec!["Lyon".to_string(), "Nice".to_string()]));
                assert_eq!(options.travel_method(), TravelMethod::Transit);
            }
            _ => panic!("expected replay"),
        }
    }

    #[test]
    fn test_library_subcommands() {
        assert!(matches!(parse(&["routes"]), Command::Routes));
        assert!(matches!(parse(&["models"]), Command::Models));
        assert!(matches!(parse(&["delete", "A;B"]), Command::Delete { .. }));
        match parse(&["add-model", "https://example.com/bus.dae", "--transit"]) {
            Command::AddModel { url, transit } => {
                assert_eq!(url, "https://example.com/bus.dae");
                assert!(transit);
            }
            _ => panic!("expected add-model"),
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        let args = |a: &[&str]| Command::from_iter_safe(std::iter::once("route-sim").chain(a.iter().copied()));
        assert!(args(&["play"]).is_err());
        assert!(args(&["play", "r.csv", "--eta", "soon"]).is_err());
        assert!(args(&["play", "r.csv", "--save", "OnlyOrigin"]).is_err());
        assert!(args(&["fly"]).is_err());
    }

    fn short_route() -> Path {
        use route_sim::core::{Coordinate, PathNode};
        Path::new(vec![
            PathNode::new(Coordinate::new(0.0, 0.0), 10.0, 0.5),
            PathNode::new(Coordinate::new(0.0, 0.0001), 0.0, 0.0),
        ])
        .unwrap()
    }

    fn play_args(args: &[&str]) -> PlayArgs {
        match parse(&[&["play", "route.csv"][..], args].concat()) {
            Command::Play { options, .. } => options,
            _ => panic!("expected play"),
        }
    }

    #[tokio::test]
    async fn test_play_without_save_never_opens_library() {
        let result = play(short_route(), play_args(&[]), || -> Result<JsonFileStore> {
            anyhow::bail!("no data directory")
        })
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_play_with_save_stores_route() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = dir.path().to_path_buf();
        play(short_route(), play_args(&["--save", "A", "B"]), move || Ok(JsonFileStore::new(store_dir)))
            .await
            .unwrap();

        let saved = JsonFileStore::new(dir.path()).load_route("A;B").await.unwrap();
        assert_eq!(saved.path, short_route());
    }
}
