use crate::cache::{Snapshot, UserCache};
use crate::task::{AsyncTask, TaskState};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::{UserDetailView, UserEditView};
use crate::users::listing::{self, SortKey, SortState};
use crate::users::{FetchError, User};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Root view: every user, filtered by the search box and sorted
pub struct UserListView {
  cache: UserCache,
  load: AsyncTask<Snapshot, FetchError>,
  list_state: ListState,
  search: SearchInput,
  filter: String,
  sort: SortState,
}

impl UserListView {
  pub fn new(cache: UserCache) -> Self {
    let mut load = AsyncTask::new();
    let loader = cache.clone();
    load.start(async move { loader.get_or_fetch().await });

    Self {
      cache,
      load,
      list_state: ListState::default(),
      search: SearchInput::new(),
      filter: String::new(),
      sort: SortState::default(),
    }
  }

  /// Display rows, derived from the cache on every call
  fn rows(&self) -> Vec<User> {
    self
      .cache
      .snapshot()
      .map(|users| listing::view(&users, &self.filter, self.sort))
      .unwrap_or_default()
  }

  fn selected_user(&self) -> Option<User> {
    let idx = self.list_state.selected()?;
    self.rows().into_iter().nth(idx)
  }

  fn refresh(&mut self) {
    let loader = self.cache.clone();
    self.load.start(async move { loader.refresh().await });
  }

  fn title(&self, count: usize) -> String {
    match self.load.state() {
      TaskState::Running if self.cache.snapshot().is_none() => " Users (loading...) ".to_string(),
      TaskState::Running => format!(" Users ({}) (refreshing...) ", count),
      TaskState::Failed(e) => format!(" Users (error: {}) ", e),
      _ => format!(" Users ({}) ", count),
    }
  }

  fn render_sort_bar(&self, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for (key, hint) in [(SortKey::Name, "n"), (SortKey::Email, "m")] {
      let active = self.sort.key == key;
      let style = if active {
        Style::default().fg(Color::Yellow).bold()
      } else {
        Style::default().fg(Color::DarkGray)
      };
      spans.push(Span::styled(
        format!(" [{}] Sort by {} {} ", hint, key.label(), self.sort.indicator(key)),
        style,
      ));
    }
    if !self.filter.is_empty() {
      spans.push(Span::styled(
        format!("  filter: {}", self.filter),
        Style::default().fg(Color::Cyan),
      ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let rows = self.rows();
    ensure_valid_selection(&mut self.list_state, rows.len());

    let block = Block::default()
      .title(self.title(rows.len()))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if rows.is_empty() {
      let content = if self.cache.snapshot().is_some() {
        "No users found"
      } else if self.load.error().is_some() {
        "Failed to load users. Press 'r' to retry."
      } else {
        "Loading..."
      };
      let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = rows
      .iter()
      .map(|user| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&user.name, 24)),
            Style::default().fg(Color::White).bold(),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<16}", truncate(&user.username, 16)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(truncate(&user.email, 40), Style::default().fg(Color::Yellow)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  // Key handling helpers for or_else chain pattern
  fn handle_search(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.search.handle_key(key) {
      KeyResult::Handled | KeyResult::Event(SearchEvent::Submitted) => Some(ViewAction::None),
      KeyResult::Event(SearchEvent::Changed(query)) => {
        self.filter = query;
        self.list_state.select(Some(0));
        Some(ViewAction::None)
      }
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('n') => self.sort.toggle(SortKey::Name),
      KeyCode::Char('m') => self.sort.toggle(SortKey::Email),
      _ => return None,
    }
    Some(ViewAction::None)
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Enter => {
        let user = self.selected_user()?;
        Some(ViewAction::Push(Box::new(UserDetailView::new(
          user.id,
          self.cache.clone(),
        ))))
      }
      KeyCode::Char('e') => {
        let user = self.selected_user()?;
        Some(ViewAction::Push(Box::new(UserEditView::edit(
          user.id,
          self.cache.clone(),
        ))))
      }
      KeyCode::Char('a') => Some(ViewAction::Push(Box::new(UserEditView::create(
        self.cache.clone(),
      )))),
      KeyCode::Char('d') => {
        let user = self.selected_user()?;
        self.cache.remove(user.id);
        Some(ViewAction::None)
      }
      KeyCode::Char('r') => {
        self.refresh();
        Some(ViewAction::None)
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Quit),
      _ => None,
    }
  }
}

impl View for UserListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_search(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(1)])
      .split(area);

    self.render_sort_bar(frame, chunks[0]);
    self.render_list(frame, chunks[1]);
    self.search.render_overlay(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    "Users".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.load.poll();
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("/", "search"),
      Shortcut::new("enter", "details"),
      Shortcut::new("a", "add"),
      Shortcut::new("e", "edit"),
      Shortcut::new("d", "delete"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "quit"),
    ]
  }
}
