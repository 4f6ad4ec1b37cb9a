use crate::cache::UserCache;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::UserEditView;
use crate::users::User;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// View for displaying one user's details
///
/// Reads the cache on every render, so edits made further up the stack
/// show as soon as it is back on top.
pub struct UserDetailView {
  id: u64,
  cache: UserCache,
}

impl UserDetailView {
  pub fn new(id: u64, cache: UserCache) -> Self {
    Self { id, cache }
  }

  fn user(&self) -> Option<User> {
    self.cache.get(self.id)
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let user = self.user();
    let title = match &user {
      Some(user) => format!(" {} ", user.name),
      None => format!(" #{} ", self.id),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let user = match user {
      Some(user) => user,
      None => {
        let paragraph = Paragraph::new("User not found").style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, inner);
        return;
      }
    };

    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::DarkGray));
    let lines = vec![
      Line::from(vec![label("Id:       "), Span::raw(user.id.to_string())]),
      Line::from(vec![
        label("Name:     "),
        Span::styled(user.name.clone(), Style::default().fg(Color::White).bold()),
      ]),
      Line::from(vec![
        label("Username: "),
        Span::styled(user.username.clone(), Style::default().fg(Color::Cyan)),
      ]),
      Line::from(vec![
        label("Email:    "),
        Span::styled(user.email.clone(), Style::default().fg(Color::Yellow)),
      ]),
      Line::from(vec![label("Phone:    "), Span::raw(user.phone.clone())]),
      Line::from(vec![
        label("Website:  "),
        Span::styled(user.website.clone(), Style::default().fg(Color::Blue)),
      ]),
    ];

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
  }
}

impl View for UserDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      KeyCode::Char('e') if self.user().is_some() => {
        ViewAction::Push(Box::new(UserEditView::edit(self.id, self.cache.clone())))
      }
      KeyCode::Char('d') => {
        self.cache.remove(self.id);
        ViewAction::Pop
      }
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self
      .user()
      .map(|u| u.name)
      .unwrap_or_else(|| format!("#{}", self.id))
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("e", "edit"),
      Shortcut::new("d", "delete"),
      Shortcut::new("q", "back"),
    ]
  }
}
