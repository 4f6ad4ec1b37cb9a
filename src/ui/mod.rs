pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use renderfns::{draw_footer, draw_header};

/// Main draw function: header, the top view, breadcrumb footer
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let shortcuts = app.current_view().map(|v| v.shortcuts()).unwrap_or_default();
  draw_header(frame, chunks[0], app.title(), &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  draw_footer(frame, chunks[2], &app.view_breadcrumb());
}

/// Keep a list selection inside `0..len`, selecting the first row if none is.
pub fn ensure_valid_selection(list_state: &mut ListState, len: usize) {
  if len == 0 {
    list_state.select(None);
    return;
  }
  match list_state.selected() {
    Some(i) if i >= len => list_state.select(Some(len - 1)),
    None => list_state.select(Some(0)),
    _ => {}
  }
}
