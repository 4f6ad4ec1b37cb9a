use super::input::{InputResult, TextInput};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Rows a field takes on screen: bordered input plus one error line.
pub const FORM_FIELD_HEIGHT: u16 = 4;

/// Labelled text input with an optional validation message
#[derive(Debug, Clone)]
pub struct FormField {
  label: &'static str,
  input: TextInput,
  error: Option<String>,
}

impl FormField {
  pub fn new(label: &'static str, value: &str) -> Self {
    Self {
      label,
      input: TextInput::with_value(value),
      error: None,
    }
  }

  pub fn value(&self) -> &str {
    self.input.value()
  }

  pub fn set_error(&mut self, error: Option<&str>) {
    self.error = error.map(str::to_string);
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> InputResult {
    self.input.handle_key(key)
  }

  pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(3), Constraint::Length(1)])
      .split(area);

    let border = match (self.error.is_some(), focused) {
      (true, _) => Color::Red,
      (false, true) => Color::Yellow,
      (false, false) => Color::DarkGray,
    };

    let block = Block::default()
      .title(format!(" {} ", self.label))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));

    let value = self.input.value();
    let line = if focused {
      let split = value
        .char_indices()
        .nth(self.input.cursor())
        .map(|(i, _)| i)
        .unwrap_or(value.len());
      let (before, after) = value.split_at(split);
      Line::from(vec![
        Span::raw(before),
        Span::styled("_", Style::default().fg(Color::Yellow)),
        Span::raw(after),
      ])
    } else {
      Line::from(value)
    };
    frame.render_widget(Paragraph::new(line).block(block), chunks[0]);

    if let Some(error) = &self.error {
      let message = Paragraph::new(format!(" {}", error)).style(Style::default().fg(Color::Red));
      frame.render_widget(message, chunks[1]);
    }
  }
}
