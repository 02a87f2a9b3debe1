/// Decodes the pre-projected state boundary topology.
pub mod boundaries;
/// Coordinate types and the reference-space to screen mapping.
pub mod coordinates;
/// Focus-area and status filtering of the place list.
pub mod filter;
/// Groups places that share a rounded coordinate into markers.
pub mod markers;
/// The egui map widget composing all layers.
pub mod placemap_egui;
/// Forward Albers-USA projection for point data.
pub mod projection;
/// Popup and overlay selection state.
pub mod selection;
/// Pan, zoom and gesture handling.
pub mod viewport;
