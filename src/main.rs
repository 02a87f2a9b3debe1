use anyhow::Context as _;
use clap::Parser as CliParser;
use log::warn;
use placemap::app::PlaceMapApp;
use placemap::config::Config;
use placemap::data::load_map_data;
use placemap::map::placemap_egui::PlaceMap;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Directory containing the data files.
  #[arg(short, long)]
  data_dir: Option<std::path::PathBuf>,

  /// Path to the state boundary topology (overrides the data dir).
  #[arg(long)]
  boundaries: Option<std::path::PathBuf>,

  /// Path to the places CSV export (overrides the data dir).
  #[arg(long)]
  places: Option<std::path::PathBuf>,

  /// Path to the partners CSV export (overrides the data dir).
  #[arg(long)]
  partners: Option<std::path::PathBuf>,

  /// Path to the population density raster (overrides the data dir).
  #[arg(long)]
  density: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<()> {
  env_logger::init();

  let args = Args::parse();
  let mut config = Config::new();
  config.data_dir = args.data_dir.or(config.data_dir);
  config.boundaries_file = args.boundaries.or(config.boundaries_file);
  config.places_file = args.places.or(config.places_file);
  config.partners_file = args.partners.or(config.partners_file);
  config.density_file = args.density.or(config.density_file);

  let data = load_map_data(&config)
    .with_context(|| format!("loading map data from {:?}", config.data_dir))?;

  let options = eframe::NativeOptions {
    viewport: egui::ViewportBuilder {
      inner_size: Some(egui::vec2(1200.0, 750.0)),
      ..Default::default()
    },
    ..Default::default()
  };

  eframe::run_native(
    "placemap",
    options,
    Box::new(|_cc| {
      let map = PlaceMap::new(Some(data)).with_filter_changed(Box::new(|filter| {
        log::debug!("Filter changed: {filter:?}");
      }));
      Ok(Box::new(PlaceMapApp::new(map)))
    }),
  )
  .map_err(|e| {
    warn!("eframe exited with an error");
    anyhow::anyhow!("{e}")
  })
}
