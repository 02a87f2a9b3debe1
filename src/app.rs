use egui::Widget as _;

use crate::map::placemap_egui::PlaceMap;

/// Holds the UI state of placemap: the map widget fills the whole viewport,
/// everything else is drawn by the widget itself.
pub struct PlaceMapApp {
  map: PlaceMap,
}

impl PlaceMapApp {
  #[must_use]
  pub fn new(map: PlaceMap) -> Self {
    Self { map }
  }
}

impl eframe::App for PlaceMapApp {
  fn ui(&mut self, ui: &mut egui::Ui, _frame: &mut eframe::Frame) {
    egui::CentralPanel::default()
      .frame(egui::Frame::NONE)
      .show_inside(ui, |ui| {
        (&mut self.map).ui(ui);
      });
  }
}
