use std::collections::BTreeMap;

use egui::{
  Align2, Color32, CornerRadius, FontId, Rect, Response, RichText, Sense, Stroke, TextureHandle,
  TextureOptions, Ui, Widget,
};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform as SkiaTransform};

use crate::data::{MapData, PlaceRecord, focus_areas};

use super::boundaries::StateShape;
use super::coordinates::{MAP_HEIGHT, MAP_WIDTH, MapPoint, ScreenPosition, ViewMapping};
use super::filter::{FilterChanged, FilterState};
use super::markers::{
  MARKER_DEFAULT_RADIUS, MARKER_HOVER_DOT_RADIUS, MARKER_HOVER_RADIUS, MarkerGroup, group_places,
};
use super::projection::AlbersUsa;
use super::selection::{POPUP_HEIGHT, POPUP_WIDTH, SelectionState, popup_position};
use super::viewport::Viewport;

const STATE_FILL: Color32 = Color32::from_rgb(0xAD, 0xC7, 0xFF);
const STATE_STROKE: Color32 = Color32::from_rgb(0xF0, 0xF0, 0xF0);
const MARKER_RING: Color32 = Color32::from_rgb(0x06, 0x1A, 0x61);
const MARKER_RING_FILL: Color32 = Color32::from_rgba_unmultiplied_const(0x06, 0x1A, 0x61, 0x99);
const LEGEND_FILL: Color32 = Color32::from_rgb(0xE9, 0xFB, 0xAE);
const TEXT_PRIMARY: Color32 = Color32::from_rgb(0x0F, 0x10, 0x0F);
const DENSITY_OPACITY: f32 = 0.9;
const STATE_STROKE_WIDTH: f32 = 1.5;
/// Supersampling factor for the rasterized fill layer.
const FILL_RASTER_SCALE: f32 = 2.;
/// A wheel notch arrives as one line on most platforms; browsers report about
/// a hundred pixels for the same notch, which is the scale the zoom formula
/// expects.
const WHEEL_LINE_PIXELS: f32 = 100.;

/// The embeddable map widget: boundary fills, density raster, boundary
/// strokes, markers, detail popup, overlay, legend and zoom controls, in that
/// z-order.
pub struct PlaceMap {
  data: Option<MapData>,
  projection: AlbersUsa,
  viewport: Viewport,
  selection: SelectionState,
  hovered: Option<String>,
  filter: FilterState,
  dropdown_open: bool,
  on_filter_change: Option<FilterChanged>,
  fill_texture: Option<TextureHandle>,
  density_texture: Option<TextureHandle>,
  active_touches: BTreeMap<u64, ScreenPosition>,
}

impl PlaceMap {
  #[must_use]
  pub fn new(data: Option<MapData>) -> Self {
    Self {
      data,
      projection: AlbersUsa::default(),
      viewport: Viewport::default(),
      selection: SelectionState::default(),
      hovered: None,
      filter: FilterState::default(),
      dropdown_open: false,
      on_filter_change: None,
      fill_texture: None,
      density_texture: None,
      active_touches: BTreeMap::new(),
    }
  }

  /// Registers the page-level callback notified when the filter changes.
  #[must_use]
  pub fn with_filter_changed(mut self, callback: FilterChanged) -> Self {
    self.on_filter_change = Some(callback);
    self
  }

  /// Supplies the data once an external loader has it; until then the widget
  /// renders a loading placeholder.
  pub fn set_data(&mut self, data: MapData) {
    self.data = Some(data);
    self.fill_texture = None;
    self.density_texture = None;
  }

  #[must_use]
  pub fn filter(&self) -> &FilterState {
    &self.filter
  }

  fn ensure_textures(&mut self, ui: &Ui) {
    let Some(data) = &self.data else {
      return;
    };
    if self.fill_texture.is_none() {
      if let Some(img) = rasterize_state_fills(&data.states) {
        self.fill_texture =
          Some(
            ui.ctx()
              .load_texture("state-fills", img, TextureOptions::LINEAR),
          );
      }
    }
    if self.density_texture.is_none() {
      if let Some(raster) = &data.density {
        let img = egui::ColorImage::from_rgba_unmultiplied(
          [raster.width() as usize, raster.height() as usize],
          raster.as_raw(),
        );
        self.density_texture = Some(ui.ctx().load_texture(
          "density-raster",
          img,
          TextureOptions::LINEAR,
        ));
      }
    }
  }

  /// Touch events arrive per context, not per widget, so a touch only joins
  /// the gesture when it starts on the map itself. Touches that started on
  /// the popup, dropdown or controls are never tracked and their moves are
  /// ignored.
  fn handle_touch_events(&mut self, ui: &Ui, rect: Rect) {
    let events: Vec<_> = ui.input(|i| {
      i.events
        .iter()
        .filter(|e| matches!(e, egui::Event::Touch { .. }))
        .cloned()
        .collect()
    });
    for event in events {
      let egui::Event::Touch { id, phase, pos, .. } = event else {
        continue;
      };
      match phase {
        egui::TouchPhase::Start => {
          let layer_at_pos = ui.ctx().layer_id_at(pos);
          if !touch_starts_gesture(rect, pos, layer_at_pos, ui.layer_id()) {
            continue;
          }
          self.active_touches.insert(id.0, pos.into());
          self.dropdown_open = false;
          let touches = self.touch_positions();
          self.viewport.touch_started(&touches);
        }
        egui::TouchPhase::Move => {
          if !self.active_touches.contains_key(&id.0) {
            continue;
          }
          self.active_touches.insert(id.0, pos.into());
          let touches = self.touch_positions();
          self.viewport.touch_moved(&touches);
        }
        egui::TouchPhase::End | egui::TouchPhase::Cancel => {
          if self.active_touches.remove(&id.0).is_none() {
            continue;
          }
          let touches = self.touch_positions();
          self.viewport.touch_ended(&touches);
        }
      }
    }
  }

  fn touch_positions(&self) -> Vec<ScreenPosition> {
    self.active_touches.values().copied().collect()
  }

  fn handle_mouse_wheel(&mut self, ui: &Ui, response: &Response) {
    if !response.hovered() {
      return;
    }
    let wheel = ui.input(|i| {
      i.events.iter().find_map(|e| match e {
        egui::Event::MouseWheel { unit, delta, .. } => Some((*unit, *delta)),
        _ => None,
      })
    });
    if let Some((unit, delta)) = wheel {
      let pixels = wheel_delta_in_pixels(unit, delta, response.rect.height());
      let cursor = response.hover_pos().unwrap_or_default();
      // egui's wheel points up where the DOM's deltaY points down.
      self.viewport.wheel(-pixels, cursor.into());
    }
  }

  fn handle_drag(&mut self, ui: &Ui, response: &Response) {
    // Touch input drives the viewport through the touch events directly.
    if !self.active_touches.is_empty() {
      return;
    }
    if response.drag_started() {
      self.dropdown_open = false;
      if let Some(pos) = response.interact_pointer_pos() {
        self.viewport.pointer_pressed(pos.into());
      }
    } else if response.dragged() {
      if let Some(pos) = response.interact_pointer_pos() {
        self.viewport.pointer_moved(pos.into());
      }
    }
    if response.drag_stopped() {
      self.viewport.pointer_released();
    }
    // Pointer up outside the container must still end the gesture.
    if self.viewport.is_gesturing() && !ui.input(|i| i.pointer.any_down()) {
      self.viewport.pointer_released();
    }
  }

  /// Map-space hit test with the marker's counter-scaled radius. The hover
  /// boundary widens to the expanded glyph while a marker is hovered.
  fn hit_group<'a>(
    &self,
    groups: &'a [MarkerGroup],
    view: &ViewMapping,
    pos: ScreenPosition,
  ) -> Option<&'a MarkerGroup> {
    let point = view.to_map(pos);
    let inv = self.viewport.inverse_scale();
    if let Some(current) = &self.hovered {
      if let Some(group) = groups.iter().find(|g| &g.key == current) {
        if point.dist(&group.anchor) <= MARKER_HOVER_RADIUS * inv {
          return Some(group);
        }
      }
    }
    groups
      .iter()
      .find(|g| point.dist(&g.anchor) <= MARKER_DEFAULT_RADIUS * inv)
  }

  fn draw_boundaries(&self, ui: &Ui, view: &ViewMapping) {
    let painter = ui.painter();
    let top_left: egui::Pos2 = view.to_screen(MapPoint::new(0., 0.)).into();
    let bottom_right: egui::Pos2 = view.to_screen(MapPoint::new(MAP_WIDTH, MAP_HEIGHT)).into();
    let content = Rect::from_min_max(top_left, bottom_right);
    let uv = Rect::from_min_max(egui::pos2(0., 0.), egui::pos2(1., 1.));

    if let Some(texture) = &self.fill_texture {
      painter.image(texture.id(), content, uv, Color32::WHITE);
    }
    if let Some(texture) = &self.density_texture {
      painter.image(
        texture.id(),
        content,
        uv,
        Color32::WHITE.gamma_multiply(DENSITY_OPACITY),
      );
    }

    let Some(data) = &self.data else {
      return;
    };
    let stroke = Stroke::new(
      STATE_STROKE_WIDTH * view.fit_scale() * self.viewport.zoom(),
      STATE_STROKE,
    );
    for state in &data.states {
      for ring in &state.rings {
        let points: Vec<egui::Pos2> = ring.iter().map(|p| view.to_screen(*p).into()).collect();
        painter.add(egui::Shape::closed_line(points, stroke));
      }
    }
  }

  fn draw_markers(&self, ui: &Ui, view: &ViewMapping, groups: &[MarkerGroup]) {
    let Some(data) = &self.data else {
      return;
    };
    let painter = ui.painter();
    let s = view.fit_scale();
    for group in groups {
      let center: egui::Pos2 = view.to_screen(group.anchor).into();
      if self.hovered.as_deref() == Some(group.key.as_str()) {
        painter.circle_filled(center, MARKER_HOVER_RADIUS * s, MARKER_RING_FILL);
        painter.circle_stroke(
          center,
          MARKER_HOVER_RADIUS * s,
          Stroke::new(2. * s, MARKER_RING),
        );
        painter.circle_filled(center, MARKER_HOVER_DOT_RADIUS * s, Color32::WHITE);
        if let Some(&first) = group.members.first() {
          let city = &data.places[first].city;
          if !city.is_empty() {
            painter.text(
              center + egui::vec2(0., -(MARKER_HOVER_RADIUS + 8.) * s),
              Align2::CENTER_BOTTOM,
              city,
              FontId::proportional(13. * s),
              MARKER_RING,
            );
          }
        }
      } else {
        painter.circle_filled(center, MARKER_DEFAULT_RADIUS * s, Color32::WHITE);
        if group.members.len() > 1 {
          painter.text(
            center,
            Align2::CENTER_CENTER,
            group.members.len().to_string(),
            FontId::proportional(12. * s),
            MARKER_RING,
          );
        }
      }
    }
  }

  fn show_marker_details(&mut self, ui: &Ui, rect: Rect, groups: &[MarkerGroup]) {
    let Some((key, pos)) = self
      .selection
      .open_popup()
      .map(|(k, p)| (k.to_string(), p))
    else {
      return;
    };
    let Some(group) = groups.iter().find(|g| g.key == key) else {
      // The group was filtered away underneath the popup.
      self.selection.close_details();
      return;
    };
    let Some(data) = &self.data else {
      return;
    };

    let mut close_requested = false;
    let mut view_place = None;
    egui::Area::new(egui::Id::new("marker-details"))
      .order(egui::Order::Foreground)
      .fixed_pos(egui::pos2(rect.left() + pos.x, rect.top() + pos.y))
      .show(ui.ctx(), |ui| {
        egui::Frame::popup(ui.style()).show(ui, |ui| {
          ui.set_width(POPUP_WIDTH - 24.);
          ui.set_max_height(POPUP_HEIGHT - 24.);
          ui.horizontal(|ui| {
            ui.label(RichText::new(place_count_label(group)).color(TEXT_PRIMARY).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
              if ui.button("\u{2715}").clicked() {
                close_requested = true;
              }
            });
          });
          egui::ScrollArea::vertical().show(ui, |ui| {
            for (i, &member) in group.members.iter().enumerate() {
              if i > 0 {
                ui.separator();
              }
              let place = &data.places[member];
              ui.label(RichText::new(&place.name).strong());
              ui.label(location_label(place));
              ui.label(&place.preview_description);
              if ui.button("View project details").clicked() {
                view_place = Some(place.id);
              }
            }
          });
        });
      });

    if close_requested {
      self.selection.close_details();
    }
    if let Some(place_id) = view_place {
      self.selection.view_details(place_id);
    }
  }

  fn show_overlay(&mut self, ui: &Ui, rect: Rect) {
    let Some(place_id) = self.selection.open_overlay() else {
      return;
    };
    let Some(data) = &self.data else {
      return;
    };
    let Some(place) = data.places.iter().find(|p| p.id == place_id) else {
      log::warn!("Overlay place {place_id} disappeared from the place list");
      self.selection.close_overlay();
      return;
    };

    let mut close_requested = false;
    egui::Area::new(egui::Id::new("project-overlay"))
      .order(egui::Order::Foreground)
      .fixed_pos(rect.min)
      .show(ui.ctx(), |ui| {
        ui.painter()
          .rect_filled(rect, CornerRadius::ZERO, Color32::from_black_alpha(140));
        let panel_width = (rect.width() - 80.).min(640.);
        let panel = Rect::from_center_size(
          rect.center(),
          egui::vec2(panel_width, (rect.height() - 80.).min(520.)),
        );
        ui.scope_builder(egui::UiBuilder::new().max_rect(panel), |ui| {
          egui::Frame::window(ui.style()).fill(Color32::WHITE).show(ui, |ui| {
            ui.set_min_size(panel.size());
            ui.horizontal(|ui| {
              ui.heading(RichText::new(&place.name).color(TEXT_PRIMARY));
              ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("\u{2715}").clicked() {
                  close_requested = true;
                }
              });
            });
            ui.label(RichText::new(location_label(place)).color(TEXT_PRIMARY));
            let years = place.years_label();
            if !years.is_empty() {
              ui.label(years);
            }
            ui.horizontal_wrapped(|ui| {
              for group in focus_areas::groups_for_project(&place.focus_areas) {
                ui.label(format!("{} {}", group.icon, group.label));
              }
            });
            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| {
              ui.label(RichText::new(&place.highlight).italics());
              ui.label(&place.description);
              if !place.focus_areas.is_empty() {
                // Unmapped areas are still listed verbatim here.
                ui.label(format!("Focus areas: {}", place.focus_areas.join(", ")));
              }
              if !data.partners.is_empty() {
                ui.separator();
                ui.label(RichText::new("Partners").strong());
                for partner in &data.partners {
                  if partner.link.is_empty() {
                    ui.label(&partner.name);
                  } else {
                    ui.hyperlink_to(&partner.name, &partner.link);
                  }
                }
              }
            });
          });
        });
      });

    if close_requested {
      self.selection.close_overlay();
    }
  }

  fn show_legend(&mut self, ui: &Ui, rect: Rect) {
    egui::Area::new(egui::Id::new("focus-area-legend"))
      .order(egui::Order::Middle)
      .fixed_pos(rect.min)
      .show(ui.ctx(), |ui| {
        egui::Frame::NONE
          .fill(LEGEND_FILL)
          .inner_margin(egui::Margin::symmetric(12, 6))
          .show(ui, |ui| {
            ui.set_width(rect.width() - 24.);
            ui.horizontal_wrapped(|ui| {
              for group in &focus_areas::FOCUS_AREA_GROUPS {
                ui.label(
                  RichText::new(format!("{} {}", group.icon, group.label)).color(TEXT_PRIMARY),
                );
              }
              ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if self.filter.selected_areas.is_empty() {
                  "Focus areas \u{25be}".to_string()
                } else {
                  format!("Focus areas ({}) \u{25be}", self.filter.selected_areas.len())
                };
                if ui.button(label).clicked() {
                  self.dropdown_open = !self.dropdown_open;
                }
              });
            });
          });
      });
  }

  fn show_filter_dropdown(&mut self, ui: &Ui, rect: Rect) {
    if !self.dropdown_open {
      return;
    }
    let mut changed = false;
    egui::Area::new(egui::Id::new("focus-area-dropdown"))
      .order(egui::Order::Foreground)
      .fixed_pos(egui::pos2(rect.right() - 260., rect.top() + 36.))
      .show(ui.ctx(), |ui| {
        egui::Frame::popup(ui.style()).show(ui, |ui| {
          ui.set_width(240.);
          for area in focus_areas::all_areas() {
            let mut selected = self.filter.selected_areas.iter().any(|a| a == area);
            if ui.checkbox(&mut selected, area).changed() {
              self.filter.toggle_area(area);
              changed = true;
            }
          }
          ui.separator();
          if ui
            .checkbox(&mut self.filter.include_inactive, "Include past projects")
            .changed()
          {
            changed = true;
          }
          if ui.button("Clear selection").clicked() && !self.filter.selected_areas.is_empty() {
            self.filter.selected_areas.clear();
            changed = true;
          }
        });
      });
    if changed {
      if let Some(callback) = &self.on_filter_change {
        callback(&self.filter);
      }
    }
  }

  fn show_zoom_buttons(&mut self, ui: &Ui, rect: Rect) {
    egui::Area::new(egui::Id::new("zoom-buttons"))
      .order(egui::Order::Middle)
      .fixed_pos(rect.right_bottom() + egui::vec2(-46., -110.))
      .show(ui.ctx(), |ui| {
        let button = |text: &str| {
          egui::Button::new(RichText::new(text).size(18.).color(MARKER_RING))
            .min_size(egui::vec2(30., 30.))
            .corner_radius(CornerRadius::same(15))
            .fill(Color32::from_rgb(0xDF, 0xE3, 0xF0))
        };
        if ui.add(button("+")).clicked() {
          self.viewport.zoom_in();
        }
        if ui.add(button("\u{2212}")).clicked() {
          self.viewport.zoom_out();
        }
      });
  }
}

impl Widget for &mut PlaceMap {
  fn ui(self, ui: &mut Ui) -> Response {
    let size = ui.available_size();
    let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

    if self.data.is_none() {
      ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        "Loading map data\u{2026}",
        FontId::proportional(16.),
        ui.visuals().weak_text_color(),
      );
      return response;
    }

    self.viewport.set_container(rect);
    self.ensure_textures(ui);

    let overlay_open = self.selection.open_overlay().is_some();
    if !overlay_open {
      self.handle_touch_events(ui, rect);
      self.handle_mouse_wheel(ui, &response);
      self.handle_drag(ui, &response);
    }

    let view = ViewMapping::new(rect, self.viewport.transform());
    let groups = match &self.data {
      Some(data) => {
        let filter = &self.filter;
        group_places(
          data
            .places
            .iter()
            .enumerate()
            .filter(|(_, place)| filter.matches(place)),
          &self.projection,
        )
      }
      None => Vec::new(),
    };

    if !overlay_open {
      self.hovered = response
        .hover_pos()
        .and_then(|pos| self.hit_group(&groups, &view, pos.into()))
        .map(|group| group.key.clone());

      if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
          let popup_rect = self.selection.open_popup().map(|(_, p)| {
            Rect::from_min_size(
              egui::pos2(rect.left() + p.x, rect.top() + p.y),
              egui::vec2(POPUP_WIDTH, POPUP_HEIGHT),
            )
          });
          let inside_popup = popup_rect.is_some_and(|r| r.contains(pos));
          if let Some(group) = self.hit_group(&groups, &view, pos.into()) {
            let anchor = view.to_screen(group.anchor);
            let center = ScreenPosition::new(anchor.x - rect.left(), anchor.y - rect.top());
            let key = group.key.clone();
            self
              .selection
              .open_details(key, popup_position(center, rect.width()));
          } else if !inside_popup {
            // Empty map space closes the popup but never the overlay.
            self.selection.close_details();
          }
        }
      }
    }

    if self.viewport.is_gesturing() {
      ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    } else if response.hovered() && self.hovered.is_none() {
      ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
    }

    self.draw_boundaries(ui, &view);
    self.draw_markers(ui, &view, &groups);
    self.show_marker_details(ui, rect, &groups);
    self.show_zoom_buttons(ui, rect);
    self.show_legend(ui, rect);
    self.show_filter_dropdown(ui, rect);
    self.show_overlay(ui, rect);

    response
  }
}

/// Whether a touch landing at `pos` belongs to the map itself. Touches over
/// the popup, dropdown or zoom buttons hit those layers and must not start a
/// map gesture.
fn touch_starts_gesture(
  rect: Rect,
  pos: egui::Pos2,
  layer_at_pos: Option<egui::LayerId>,
  map_layer: egui::LayerId,
) -> bool {
  rect.contains(pos) && layer_at_pos.is_none_or(|layer| layer == map_layer)
}

/// Normalizes a wheel event to the pixel scale the zoom formula expects.
fn wheel_delta_in_pixels(
  unit: egui::MouseWheelUnit,
  delta: egui::Vec2,
  container_height: f32,
) -> f32 {
  match unit {
    egui::MouseWheelUnit::Point => delta.y,
    egui::MouseWheelUnit::Line => delta.y * WHEEL_LINE_PIXELS,
    egui::MouseWheelUnit::Page => delta.y * container_height,
  }
}

fn place_count_label(group: &MarkerGroup) -> String {
  if group.members.len() == 1 {
    "1 project at this location".to_string()
  } else {
    format!("{} projects at this location", group.members.len())
  }
}

fn location_label(place: &PlaceRecord) -> String {
  match (place.city.is_empty(), place.state.is_empty()) {
    (false, false) => format!("{}, {}", place.city, place.state),
    (false, true) => place.city.clone(),
    (true, false) => place.state.clone(),
    (true, true) => String::new(),
  }
}

/// Rasterizes the state fill layer once; egui paths cannot fill concave
/// polygons, tiny-skia can.
fn rasterize_state_fills(states: &[StateShape]) -> Option<egui::ColorImage> {
  #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
  let (width, height) = (
    (MAP_WIDTH * FILL_RASTER_SCALE) as u32,
    (MAP_HEIGHT * FILL_RASTER_SCALE) as u32,
  );
  let mut pixmap = Pixmap::new(width, height)?;
  let mut paint = Paint::default();
  paint.set_color_rgba8(STATE_FILL.r(), STATE_FILL.g(), STATE_FILL.b(), 255);
  paint.anti_alias = true;
  let transform = SkiaTransform::from_scale(FILL_RASTER_SCALE, FILL_RASTER_SCALE);

  for state in states {
    let mut builder = PathBuilder::new();
    for ring in &state.rings {
      let mut points = ring.iter();
      if let Some(first) = points.next() {
        builder.move_to(first.x, first.y);
        for point in points {
          builder.line_to(point.x, point.y);
        }
        builder.close();
      }
    }
    if let Some(path) = builder.finish() {
      pixmap.fill_path(&path, &paint, FillRule::EvenOdd, transform, None);
    }
  }

  Some(egui::ColorImage::from_rgba_premultiplied(
    [width as usize, height as usize],
    pixmap.data(),
  ))
}
