//! Login screen with email and password fields.

use ratatui::{
  Frame,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, LoginField};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let [row] = Layout::vertical([Constraint::Length(9)])
    .flex(Flex::Center)
    .areas(area);
  let [card] = Layout::horizontal([Constraint::Length(48)])
    .flex(Flex::Center)
    .areas(row);

  let block = Block::default()
    .title(" Admin sign-in ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(card);
  f.render_widget(block, card);

  let form = &app.login;
  let masked = "•".repeat(form.password.chars().count());

  let mut lines = vec![
    field_line("Email   ", &form.email, form.focus == LoginField::Email),
    Line::raw(""),
    field_line("Password", &masked, form.focus == LoginField::Password),
    Line::raw(""),
  ];
  if form.busy {
    lines.push(Line::styled("Signing in…", Style::default().fg(Color::DarkGray)));
  } else if let Some(error) = &form.error {
    lines.push(Line::styled(error.as_str(), Style::default().fg(Color::Red)));
  }

  f.render_widget(Paragraph::new(lines), inner);
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
  let label_style = if focused {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  };
  let cursor = if focused { "_" } else { "" };
  Line::from(vec![
    Span::styled(format!(" {label}  "), label_style),
    Span::raw(value),
    Span::styled(cursor, Style::default().fg(Color::Cyan)),
  ])
}
