//! Admin screen: stats cards above filter tabs above the RSVP table.

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
};
use rsvp_core::{rsvp::RsvpResponse, stats::ResponseFilter};

use crate::{
  admin::LoadState,
  app::App,
  guard::GuardState,
};

const FILTERS: [ResponseFilter; 4] = [
  ResponseFilter::All,
  ResponseFilter::Yes,
  ResponseFilter::No,
  ResponseFilter::Maybe,
];

fn response_color(response: RsvpResponse) -> Color {
  match response {
    RsvpResponse::Yes => Color::Green,
    RsvpResponse::No => Color::Red,
    RsvpResponse::Maybe => Color::Yellow,
  }
}

fn filter_label(filter: ResponseFilter) -> &'static str {
  match filter {
    ResponseFilter::All => "All",
    ResponseFilter::Yes => "Yes",
    ResponseFilter::No => "No",
    ResponseFilter::Maybe => "Maybe",
  }
}

/// Render the guarded admin screen into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  match app.guard.state() {
    GuardState::Checking => draw_notice(f, area, "Checking session…", Color::DarkGray),
    // A redirect is already queued; nothing guarded is shown.
    GuardState::Unauthenticated => {}
    GuardState::Authenticated(_) => draw_dashboard(f, area, app),
  }
}

fn draw_notice(f: &mut Frame, area: Rect, text: &str, color: Color) {
  let [row] = Layout::vertical([Constraint::Length(1)])
    .flex(ratatui::layout::Flex::Center)
    .areas(area);
  f.render_widget(
    Paragraph::new(text)
      .alignment(Alignment::Center)
      .style(Style::default().fg(color)),
    row,
  );
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
  let [cards, tabs, body] = Layout::vertical([
    Constraint::Length(3),
    Constraint::Length(1),
    Constraint::Min(0),
  ])
  .areas(area);

  match app.admin.load_state() {
    LoadState::Idle | LoadState::Loading => {
      draw_notice(f, area, "Loading RSVPs…", Color::DarkGray);
    }
    LoadState::Failed(message) => {
      draw_notice(f, area, &format!("Error: {message}  (r to retry)"), Color::Red);
    }
    LoadState::Ready => {
      draw_cards(f, cards, app);
      draw_tabs(f, tabs, app);
      draw_table(f, body, app);
    }
  }
}

// ─── Stats ────────────────────────────────────────────────────────────────────

fn draw_cards(f: &mut Frame, area: Rect, app: &App) {
  let stats = app.admin.stats();
  let cards = [
    ("Attending", stats.total_yes.to_string(), Color::Green),
    ("Declined", stats.total_no.to_string(), Color::Red),
    ("Maybe", stats.total_maybe.to_string(), Color::Yellow),
    ("Total guests", stats.total_guests.to_string(), Color::Cyan),
  ];

  let cols = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
  for ((label, value, color), col) in cards.into_iter().zip(cols.iter()) {
    let block = Block::default()
      .title(format!(" {label} "))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(
      Paragraph::new(Span::styled(
        value,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
      ))
      .alignment(Alignment::Center)
      .block(block),
      *col,
    );
  }
}

// ─── Filter tabs ──────────────────────────────────────────────────────────────

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
  let titles: Vec<Line> = FILTERS
    .iter()
    .map(|&filter| {
      Line::from(format!(
        "{} ({})",
        filter_label(filter),
        app.admin.count_for(filter)
      ))
    })
    .collect();
  let selected = FILTERS
    .iter()
    .position(|&filter| filter == app.admin.filter())
    .unwrap_or(0);

  f.render_widget(
    Tabs::new(titles)
      .select(selected)
      .style(Style::default().fg(Color::Gray))
      .highlight_style(
        Style::default()
          .fg(Color::White)
          .bg(Color::Blue)
          .add_modifier(Modifier::BOLD),
      ),
    area,
  );
}

// ─── Table ────────────────────────────────────────────────────────────────────

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
  let shown = app.admin.visible().len();
  let total = app.admin.rsvps().len();
  let title = if shown == total {
    format!(" RSVPs ({total}) ")
  } else {
    format!(" RSVPs ({shown}/{total}) ")
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let rows = app.admin.rows(&Local);
  if rows.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    draw_notice(f, inner, "No RSVPs yet.", Color::DarkGray);
    return;
  }

  let table_rows: Vec<Row> = rows
    .into_iter()
    .map(|row| {
      Row::new(vec![
        Cell::from(row.name),
        Cell::from(Span::styled(
          row.response.as_str(),
          Style::default()
            .fg(response_color(row.response))
            .add_modifier(Modifier::BOLD),
        )),
        Cell::from(row.guests.to_string()),
        Cell::from(row.message),
        Cell::from(Span::styled(row.created, Style::default().fg(Color::Gray))),
      ])
    })
    .collect();

  let header = Row::new(["Name", "Response", "Guests", "Message", "Submitted"])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let table = Table::new(table_rows, [
    Constraint::Percentage(22),
    Constraint::Length(9),
    Constraint::Length(7),
    Constraint::Fill(1),
    Constraint::Length(22),
  ])
  .header(header)
  .block(block)
  .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

  let mut state = TableState::default().with_selected(Some(app.selected));
  f.render_stateful_widget(table, area, &mut state);
}
