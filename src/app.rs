use crate::cache::UserCache;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::renderfns::extract_domain;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::UserListView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info};

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Header title
  title: String,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, cache: UserCache) -> Self {
    let title = config
      .title
      .clone()
      .unwrap_or_else(|| extract_domain(&config.api.base_url));

    Self {
      view_stack: vec![Box::new(UserListView::new(cache))],
      title,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.main_loop().await;

    // Cleanup terminal, even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn main_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(Duration::from_millis(250));
    info!("ui started");

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    info!("ui stopped");
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.tick(),
      Event::Resize => {}
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      self.should_quit = true;
      return;
    }

    if let Some(view) = self.view_stack.last_mut() {
      let action = view.handle_key(key);
      self.apply(action);
    }
  }

  /// Poll async work in every view; only the top view may navigate.
  fn tick(&mut self) {
    let last = self.view_stack.len().saturating_sub(1);
    let mut top_action = ViewAction::None;
    for (i, view) in self.view_stack.iter_mut().enumerate() {
      let action = view.tick();
      if i == last {
        top_action = action;
      }
    }
    self.apply(top_action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        debug!(view = %view.breadcrumb_label(), "push view");
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Quit => self.should_quit = true,
    }
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self.view_stack.iter().map(|v| v.breadcrumb_label()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ApiConfig;
  use crate::test_support::{loaded_cache, sample_users, settle, FakeSource};
  use std::sync::Arc;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn app() -> App {
    let (_, cache) = loaded_cache(sample_users()).await;
    let mut app = App::new(&Config::default(), cache);
    settle().await;
    app.tick();
    app
  }

  #[tokio::test]
  async fn test_title_defaults_to_api_host() {
    let config = Config {
      api: ApiConfig {
        base_url: "https://users.example.org/api".to_string(),
        ..ApiConfig::default()
      },
      ..Config::default()
    };
    let source = Arc::new(FakeSource::default());
    let app = App::new(&config, source.cache());
    assert_eq!(app.title(), "users.example.org");

    let titled = Config {
      title: Some("Staff".to_string()),
      ..config
    };
    assert_eq!(App::new(&titled, source.cache()).title(), "Staff");
  }

  #[tokio::test]
  async fn test_navigation_stack() {
    let mut app = app().await;
    assert_eq!(app.view_breadcrumb(), vec!["Users"]);

    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.view_breadcrumb(), vec!["Users", "Alice"]);

    app.handle_key(key(KeyCode::Char('e')));
    assert_eq!(app.view_breadcrumb(), vec!["Users", "Alice", "Edit Alice"]);

    app.handle_key(key(KeyCode::Esc));
    app.handle_key(key(KeyCode::Char('q')));
    assert_eq!(app.view_breadcrumb(), vec!["Users"]);
    assert!(!app.should_quit);
  }

  #[tokio::test]
  async fn test_detail_delete_returns_to_list() {
    let mut app = app().await;

    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Char('d')));

    assert_eq!(app.view_breadcrumb(), vec!["Users"]);
  }

  #[tokio::test]
  async fn test_ctrl_c_quits_from_any_view() {
    let mut app = app().await;
    app.handle_key(key(KeyCode::Char('a')));
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }
}
