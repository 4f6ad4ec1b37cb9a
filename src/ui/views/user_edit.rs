use crate::cache::UserCache;
use crate::task::{AsyncTask, TaskState};
use crate::ui::components::{FormField, InputResult, FORM_FIELD_HEIGHT};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::users::validation::{Field, UserDraft};
use crate::users::{UpdateError, User, NEW_USER_ID};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::info;

/// Form for creating a user or editing an existing one
///
/// `id == NEW_USER_ID` selects create mode: the record gets a fresh id and
/// is inserted locally. Edit mode saves through the remote source and only
/// leaves the form once the server accepts the change.
pub struct UserEditView {
  id: u64,
  cache: UserCache,
  fields: Vec<FormField>,
  focused: usize,
  save: AsyncTask<User, UpdateError>,
}

impl UserEditView {
  pub fn create(cache: UserCache) -> Self {
    Self::new(NEW_USER_ID, UserDraft::default(), cache)
  }

  pub fn edit(id: u64, cache: UserCache) -> Self {
    let draft = cache
      .get(id)
      .map(|user| UserDraft::from_user(&user))
      .unwrap_or_default();
    Self::new(id, draft, cache)
  }

  fn new(id: u64, draft: UserDraft, cache: UserCache) -> Self {
    let fields = Field::ALL
      .iter()
      .map(|&field| FormField::new(field.label(), draft.get(field)))
      .collect();

    Self {
      id,
      cache,
      fields,
      focused: 0,
      save: AsyncTask::new(),
    }
  }

  fn is_new(&self) -> bool {
    self.id == NEW_USER_ID
  }

  fn draft(&self) -> UserDraft {
    let mut draft = UserDraft::default();
    for (field, input) in Field::ALL.iter().zip(&self.fields) {
      draft.set(*field, input.value().to_string());
    }
    draft
  }

  fn focus_next(&mut self) {
    self.focused = (self.focused + 1) % self.fields.len();
  }

  fn focus_previous(&mut self) {
    self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
  }

  /// Validate the form and hand the record to the cache.
  fn submit(&mut self) -> ViewAction {
    let id = if self.is_new() { self.cache.next_id() } else { self.id };

    let user = match self.draft().into_user(id) {
      Ok(user) => user,
      Err(errors) => {
        for (field, input) in Field::ALL.iter().zip(self.fields.iter_mut()) {
          input.set_error(errors.for_field(*field));
        }
        if let Some(first) = errors.0.first() {
          self.focused = Field::ALL.iter().position(|f| *f == first.field).unwrap_or(0);
        }
        return ViewAction::None;
      }
    };

    for input in &mut self.fields {
      input.set_error(None);
    }

    if self.is_new() {
      info!(id = user.id, "creating user");
      self.cache.insert(user);
      return ViewAction::Pop;
    }

    let cache = self.cache.clone();
    self.save.start(async move { cache.replace_confirmed(user).await });
    ViewAction::None
  }

  fn render_status(&self, frame: &mut Frame, area: Rect) {
    let (text, style) = match self.save.state() {
      TaskState::Running => ("Saving...".to_string(), Style::default().fg(Color::Yellow)),
      TaskState::Failed(e) => (format!("Failed to save: {}", e), Style::default().fg(Color::Red)),
      TaskState::Cancelled => ("Save cancelled".to_string(), Style::default().fg(Color::DarkGray)),
      _ => (
        "Tab: next field  Ctrl-S: save  Esc: cancel".to_string(),
        Style::default().fg(Color::DarkGray),
      ),
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
  }
}

impl View for UserEditView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.save.is_running() {
      if key.code == KeyCode::Esc {
        self.save.cancel();
      }
      return ViewAction::None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
      return self.submit();
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focus_next();
        return ViewAction::None;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus_previous();
        return ViewAction::None;
      }
      _ => {}
    }

    let last = self.fields.len() - 1;
    match self.fields[self.focused].handle_key(key) {
      InputResult::Submitted if self.focused == last => self.submit(),
      InputResult::Submitted => {
        self.focus_next();
        ViewAction::None
      }
      InputResult::Cancelled => ViewAction::Pop,
      InputResult::Changed | InputResult::NotHandled => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = if self.is_new() {
      " New user ".to_string()
    } else {
      format!(" Edit user #{} ", self.id)
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints: Vec<Constraint> = self
      .fields
      .iter()
      .map(|_| Constraint::Length(FORM_FIELD_HEIGHT))
      .collect();
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints(constraints)
      .split(inner);

    for (i, field) in self.fields.iter().enumerate() {
      field.render(frame, chunks[i], i == self.focused);
    }
    self.render_status(frame, chunks[self.fields.len()]);
  }

  fn breadcrumb_label(&self) -> String {
    if self.is_new() {
      return "New user".to_string();
    }
    match self.cache.get(self.id) {
      Some(user) => format!("Edit {}", user.name),
      None => format!("Edit #{}", self.id),
    }
  }

  fn tick(&mut self) -> ViewAction {
    if self.save.poll() && self.save.data().is_some() {
      return ViewAction::Pop;
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("tab", "next"),
      Shortcut::new("ctrl-s", "save"),
      Shortcut::new("esc", "cancel"),
    ]
  }
}
