//! Kanban board interface.
//!
//! Five columns, one per status, for the current project. Cards are moved
//! between columns with Ctrl/Shift+arrows; the board's notifications are
//! drained after every action and applied to the [`BoardView`] render model.

use std::io;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::debug;

use crate::board::{Board, BoardEvent};
use crate::due::{day_diff, due_label, BoardStats, DueBucket};
use crate::fields::{DueSoonFilter, Status};
use crate::project::NewProject;
use crate::task::{NewTask, Task};
use crate::tui::colors::{
    hex_to_color, label_fg, palette, priority_color, status_color, Palette, DUE_TODAY, OVERDUE,
};
use crate::tui::enums::{due_filter_title, next_due_filter, BoardMode};
use crate::tui::input::InputField;
use crate::view::BoardView;

const HELP: &str = "←/→ column  ↑/↓ card  Ctrl/Shift+←/→ move card  Enter details  / search  \
n new task  N new project  d delete  p/P switch project  s due soon  T theme  q quit";

/// Interactive board state. The `Board` itself is passed into each call.
pub struct BoardApp {
    view: BoardView,
    stats: BoardStats,
    mode: BoardMode,
    selected_column: usize,
    selected_card: usize,
    column_scroll_offsets: [usize; 5],
    input: InputField,
    status_message: String,
    quit: bool,
}

impl BoardApp {
    pub fn new(board: &Board) -> Self {
        BoardApp {
            view: BoardView::new(board),
            stats: board.board_stats(Local::now().date_naive()),
            mode: BoardMode::Browse,
            selected_column: 0,
            selected_card: 0,
            column_scroll_offsets: [0; 5],
            input: InputField::new(),
            status_message: String::new(),
            quit: false,
        }
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn mode(&self) -> BoardMode {
        self.mode
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn selected_status(&self) -> Status {
        Status::ALL[self.selected_column]
    }

    /// Id of the highlighted card, if the column has one.
    pub fn selected_task_id(&self) -> Option<String> {
        self.view
            .visible(self.selected_status())
            .get(self.selected_card)
            .map(|id| id.to_string())
    }

    /// Drain the board's notifications into the view.
    fn sync(&mut self, board: &mut Board) {
        let events = board.drain_events();
        for event in &events {
            match event {
                BoardEvent::Notice { message, .. } => self.status_message = message.clone(),
                BoardEvent::ProjectSwitched { .. } => self.column_scroll_offsets = [0; 5],
                _ => {}
            }
        }
        self.view.apply(&events, board);
        if self.view.take_stats_stale() {
            self.stats = board.board_stats(Local::now().date_naive());
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.view.visible(self.selected_status()).len();
        if len == 0 {
            self.selected_card = 0;
            self.column_scroll_offsets[self.selected_column] = 0;
        } else if self.selected_card >= len {
            self.selected_card = len - 1;
        }
    }

    fn select_task(&mut self, task_id: &str) {
        if let Some(status) = self.view.column_of(task_id) {
            self.selected_column = status.column();
            if let Some(pos) = self.view.visible(status).iter().position(|id| *id == task_id) {
                self.selected_card = pos;
            }
        }
        self.clamp_selection();
    }

    /// Handle one key press. Returns true when the board should close.
    pub fn handle_key(&mut self, board: &mut Board, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return true;
        }

        match self.mode {
            mode if mode.takes_text() => self.handle_text_key(board, key),
            BoardMode::ConfirmDelete => self.handle_confirm_key(board, key),
            BoardMode::Detail | BoardMode::Help => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                    self.mode = BoardMode::Browse;
                }
            }
            BoardMode::DueSoon(filter) => match key.code {
                KeyCode::Tab => self.mode = BoardMode::DueSoon(next_due_filter(filter)),
                KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q') => self.mode = BoardMode::Browse,
                _ => {}
            },
            _ => self.handle_browse_key(board, key),
        }
        self.quit
    }

    fn handle_browse_key(&mut self, board: &mut Board, key: KeyEvent) {
        self.status_message.clear();
        let moving = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,

            KeyCode::Left if moving => self.move_card(board, false),
            KeyCode::Right if moving => self.move_card(board, true),

            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.selected_column < Status::ALL.len() - 1 {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => self.selected_card = self.selected_card.saturating_sub(1),
            KeyCode::Down => {
                let len = self.view.visible(self.selected_status()).len();
                if len > 0 && self.selected_card < len - 1 {
                    self.selected_card += 1;
                }
            }

            KeyCode::Enter => {
                if self.selected_task_id().is_some() {
                    self.mode = BoardMode::Detail;
                }
            }
            KeyCode::Char('/') => {
                self.input = InputField::with_value(self.view.search());
                self.mode = BoardMode::Search;
            }
            KeyCode::Char('n') => {
                self.input.clear();
                self.mode = BoardMode::NewTask;
            }
            KeyCode::Char('N') => {
                self.input.clear();
                self.mode = BoardMode::NewProject;
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if self.selected_task_id().is_some() {
                    self.mode = BoardMode::ConfirmDelete;
                }
            }
            KeyCode::Char('p') => self.cycle_project(board, true),
            KeyCode::Char('P') => self.cycle_project(board, false),
            KeyCode::Char('T') => {
                let theme = board.toggle_theme();
                self.sync(board);
                self.status_message = format!("Theme: {theme}");
            }
            KeyCode::Char('s') => self.mode = BoardMode::DueSoon(DueSoonFilter::All),
            KeyCode::Char('h') | KeyCode::Char('?') => self.mode = BoardMode::Help,
            _ => {}
        }
    }

    fn handle_text_key(&mut self, board: &mut Board, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if self.mode == BoardMode::Search {
                    self.view.set_search("", board);
                    self.clamp_selection();
                }
                self.input.clear();
                self.mode = BoardMode::Browse;
            }
            KeyCode::Enter => self.submit_text(board),
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Char(c) => self.input.handle_char(c),
            _ => {}
        }
        // Search filters as you type.
        if self.mode == BoardMode::Search {
            self.view.set_search(&self.input.value, board);
            self.clamp_selection();
        }
    }

    fn submit_text(&mut self, board: &mut Board) {
        let text = self.input.take();
        match self.mode {
            BoardMode::Search => {
                self.view.set_search(&text, board);
                self.clamp_selection();
                self.status_message = if text.trim().is_empty() {
                    "Search cleared".to_string()
                } else {
                    format!("Search: '{}' ({} tasks shown)", text, self.view.visible_count())
                };
            }
            BoardMode::NewTask => {
                let data = NewTask {
                    title: text,
                    status: Some(self.selected_status()),
                    ..Default::default()
                };
                match board.create_task(data, true) {
                    Ok(task) => {
                        self.sync(board);
                        self.select_task(&task.id);
                    }
                    Err(e) => self.status_message = e.to_string(),
                }
            }
            BoardMode::NewProject => {
                match board.create_project(NewProject { name: text, ..Default::default() }) {
                    Ok(project) => {
                        board.switch_project(&project.id);
                        self.sync(board);
                    }
                    Err(e) => self.status_message = e.to_string(),
                }
            }
            _ => {}
        }
        self.mode = BoardMode::Browse;
    }

    fn handle_confirm_key(&mut self, board: &mut Board, key: KeyEvent) {
        if let KeyCode::Char('y') | KeyCode::Char('Y') = key.code {
            if let Some(id) = self.selected_task_id() {
                board.delete_task(&id);
                self.sync(board);
            }
        } else {
            self.status_message = "Delete cancelled".to_string();
        }
        self.mode = BoardMode::Browse;
    }

    /// Move the selected card one column left or right.
    fn move_card(&mut self, board: &mut Board, forward: bool) {
        let Some(task_id) = self.selected_task_id() else { return };
        let status = self.selected_status();
        let Some(target) = (if forward { status.next() } else { status.prev() }) else { return };

        debug!(task = %task_id, from = %status, to = %target, "moving card");
        if board.move_task(&task_id, target).is_some() {
            self.sync(board);
            self.select_task(&task_id);
        }
    }

    fn cycle_project(&mut self, board: &mut Board, forward: bool) {
        let ids: Vec<String> = board.projects().iter().map(|p| p.id.clone()).collect();
        if ids.len() < 2 {
            return;
        }
        let pos = ids.iter().position(|id| id == board.current_project_id()).unwrap_or(0);
        let next = if forward { (pos + 1) % ids.len() } else { (pos + ids.len() - 1) % ids.len() };
        board.switch_project(&ids[next]);
        self.selected_card = 0;
        self.sync(board);
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    pub fn render(&mut self, f: &mut Frame, board: &Board) {
        let colors = palette(board.theme());
        f.render_widget(Block::default().style(Style::default().bg(colors.bg).fg(colors.fg)), f.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        let today = Local::now().date_naive();
        self.render_header(f, chunks[0], board, &colors);
        self.render_board(f, chunks[1], board, &colors, today);
        self.render_status_bar(f, chunks[2], &colors);

        match self.mode {
            BoardMode::Detail => self.render_task_detail_popup(f, board, &colors, today),
            BoardMode::DueSoon(filter) => self.render_due_soon(f, board, &colors, today, filter),
            BoardMode::ConfirmDelete => self.render_confirm(f, board, &colors),
            BoardMode::Help => {
                let area = popup_area(f.area(), 60, 30);
                f.render_widget(Clear, area);
                f.render_widget(
                    Paragraph::new(HELP)
                        .wrap(Wrap { trim: true })
                        .style(Style::default().bg(colors.card).fg(colors.fg))
                        .block(Block::default().borders(Borders::ALL).title("Keys")),
                    area,
                );
            }
            _ => {}
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect, board: &Board, colors: &Palette) {
        let (name, color) = match board.current_project() {
            Some(p) => (p.name.as_str(), hex_to_color(&p.color).unwrap_or(colors.accent)),
            None => ("Unknown Project", colors.muted),
        };
        let stats = self.stats;
        let line = Line::from(vec![
            Span::styled("● ", Style::default().fg(color)),
            Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled(
                format!(
                    "{} tasks  {} completed  {} overdue",
                    stats.total, stats.completed, stats.overdue
                ),
                Style::default().fg(colors.muted),
            ),
        ]);
        f.render_widget(
            Paragraph::new(line)
                .block(Block::default().borders(Borders::ALL).title("TaskFlow"))
                .alignment(Alignment::Center),
            area,
        );
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect, board: &Board, colors: &Palette, today: NaiveDate) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 5); 5])
            .split(area);

        for (status, &column_area) in Status::ALL.iter().zip(columns.iter()) {
            self.render_column(f, column_area, *status, board, colors, today);
        }
    }

    fn render_column(
        &mut self,
        f: &mut Frame,
        area: Rect,
        status: Status,
        board: &Board,
        colors: &Palette,
        today: NaiveDate,
    ) {
        let column_index = status.column();
        let is_selected = column_index == self.selected_column;
        let cards = self.view.visible(status);

        let border_style = if is_selected {
            Style::default().fg(status_color(status)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.muted)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", status.title(), cards.len()))
            .border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        if let Some(message) = self.view.empty_state(status) {
            f.render_widget(
                Paragraph::new(message)
                    .style(Style::default().fg(colors.muted).add_modifier(Modifier::ITALIC))
                    .alignment(Alignment::Center),
                inner,
            );
            return;
        }

        let card_height = 5;
        let available_height = inner.height as usize;
        let visible_cards = available_height / card_height;

        let scroll_offset = if is_selected {
            let start_visible = self.column_scroll_offsets[column_index];
            let end_visible = start_visible + visible_cards;
            if self.selected_card < start_visible {
                self.column_scroll_offsets[column_index] = self.selected_card;
            } else if self.selected_card >= end_visible && visible_cards > 0 {
                self.column_scroll_offsets[column_index] = self.selected_card + 1 - visible_cards;
            }
            self.column_scroll_offsets[column_index]
        } else {
            self.column_scroll_offsets[column_index].min(cards.len().saturating_sub(1))
        };

        let mut current_y = 0;
        let mut rendered_cards = 0;
        for (card_index, task_id) in cards.iter().enumerate().skip(scroll_offset) {
            if current_y + card_height > available_height {
                break;
            }
            let Some(task) = board.tasks().get(task_id) else { continue };
            let card_area = Rect {
                x: inner.x,
                y: inner.y + current_y as u16,
                width: inner.width,
                height: card_height as u16,
            };
            let highlighted = is_selected && card_index == self.selected_card;
            render_card(f, card_area, task, highlighted, colors, today);
            current_y += card_height;
            rendered_cards += 1;
        }

        let remaining = cards.len().saturating_sub(scroll_offset + rendered_cards);
        if remaining > 0 && inner.height > 0 {
            f.render_widget(
                Paragraph::new(format!("▼ +{remaining} below")).style(Style::default().fg(colors.accent)),
                Rect { x: inner.x, y: inner.y + inner.height - 1, width: inner.width, height: 1 },
            );
        }
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect, colors: &Palette) {
        let text = match self.mode {
            BoardMode::Search => format!("Search: {}▏ Enter to keep, Esc to clear", self.input.value),
            BoardMode::NewTask => format!(
                "New task in {}: {}▏ Enter to create, Esc to cancel",
                self.selected_status().title(),
                self.input.value
            ),
            BoardMode::NewProject => format!("New project: {}▏ Enter to create, Esc to cancel", self.input.value),
            _ if !self.status_message.is_empty() => self.status_message.clone(),
            _ => {
                let search = if self.view.is_searching() {
                    format!(" [Search: {}]", self.view.search())
                } else {
                    String::new()
                };
                format!("Tasks: {}{search} | h: Help", self.view.visible_count())
            }
        };
        f.render_widget(
            Paragraph::new(text).style(Style::default().bg(colors.status_bar).fg(ratatui::style::Color::White)),
            area,
        );
    }

    fn render_task_detail_popup(&self, f: &mut Frame, board: &Board, colors: &Palette, today: NaiveDate) {
        let Some(task) = self.selected_task_id().and_then(|id| board.tasks().get(&id)) else { return };
        let area = popup_area(f.area(), 80, 80);
        f.render_widget(Clear, area);

        let due = match task.due_date {
            Some(d) => format!("{d} ({})", due_label(day_diff(d, today))),
            None => "-".to_string(),
        };
        let mut labels: Vec<Span> = vec![Span::raw("Labels:      ")];
        if task.labels.is_empty() {
            labels.push(Span::raw("-"));
        }
        for label in &task.labels {
            labels.push(Span::styled(format!("{label} "), Style::default().fg(label_fg(label))));
        }

        let lines = vec![
            Line::from(Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(format!("ID:          {}", task.id)),
            Line::from(format!("Status:      {}", task.status.title())),
            Line::from(vec![
                Span::raw("Priority:    "),
                Span::styled(task.priority.to_string(), Style::default().fg(priority_color(task.priority))),
            ]),
            Line::from(format!("Project:     {}", board.project_name(&task.project_id))),
            Line::from(format!("Assignee:    {}", task.assignee.as_deref().unwrap_or("-"))),
            Line::from(format!("Due:         {due}")),
            Line::from(labels),
            Line::from(""),
            Line::from("Description:"),
            Line::from(if task.description.is_empty() { "-".to_string() } else { task.description.clone() }),
        ];
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .style(Style::default().bg(colors.card).fg(colors.fg))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Task Details (Enter to close)")
                        .title_alignment(Alignment::Center)
                        .border_style(Style::default().fg(status_color(task.status))),
                ),
            area,
        );
    }

    fn render_due_soon(&self, f: &mut Frame, board: &Board, colors: &Palette, today: NaiveDate, filter: DueSoonFilter) {
        let tasks = board.due_soon_view(today, filter, self.view.search());
        let summary = board.due_summary(&tasks, today);
        let area = popup_area(f.area(), 80, 80);
        f.render_widget(Clear, area);

        let mut lines = vec![Line::from(format!(
            "Total: {}   Overdue: {}   Due soon: {}",
            summary.total, summary.overdue, summary.due_soon
        ))];
        if tasks.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from("No upcoming deadlines"));
        }
        let mut current: Option<DueBucket> = None;
        for task in &tasks {
            let Some(due) = task.due_date else { continue };
            let bucket = DueBucket::for_date(due, today);
            if current != Some(bucket) {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(bucket.title(), Style::default().add_modifier(Modifier::BOLD))));
                current = Some(bucket);
            }
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<16}", due_label(day_diff(due, today))), due_style(due, today, colors)),
                Span::raw(format!("{}  ", task.title)),
                Span::styled(board.project_name(&task.project_id).to_string(), Style::default().fg(colors.muted)),
            ]));
        }

        f.render_widget(
            Paragraph::new(lines)
                .style(Style::default().bg(colors.card).fg(colors.fg))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("Due Soon: {} (Tab to filter, Esc to close)", due_filter_title(filter))),
                ),
            area,
        );
    }

    fn render_confirm(&self, f: &mut Frame, board: &Board, colors: &Palette) {
        let title = self
            .selected_task_id()
            .and_then(|id| board.tasks().get(&id).map(|t| t.title.clone()))
            .unwrap_or_default();
        let area = popup_area(f.area(), 50, 20);
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(format!("Delete \"{title}\"? (y/n)"))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .style(Style::default().bg(colors.card).fg(OVERDUE))
                .block(Block::default().borders(Borders::ALL).title("Confirm")),
            area,
        );
    }

    /// Main event loop.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>, board: &mut Board) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f, board))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if self.handle_key(board, key) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

fn due_style(due: NaiveDate, today: NaiveDate, colors: &Palette) -> Style {
    match day_diff(due, today) {
        d if d < 0 => Style::default().fg(OVERDUE).add_modifier(Modifier::BOLD),
        0 => Style::default().fg(DUE_TODAY),
        _ => Style::default().fg(colors.muted),
    }
}

/// Centered rectangle taking the given percentages of `area`.
fn popup_area(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_pct) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(height_pct) / 100) as u16;
    Rect::new(area.x + (area.width - width) / 2, area.y + (area.height - height) / 2, width, height)
}

fn render_card(f: &mut Frame, area: Rect, task: &Task, highlighted: bool, colors: &Palette, today: NaiveDate) {
    let style = if highlighted {
        Style::default().bg(colors.accent).fg(colors.bg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(colors.card).fg(colors.fg)
    };

    // Word-wrap the title to at most two lines.
    let available_width = area.width.saturating_sub(2) as usize;
    let mut title_lines: Vec<String> = Vec::new();
    let mut current_line = String::new();
    for word in task.title.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.chars().count() + 1 + word.chars().count() <= available_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            title_lines.push(std::mem::replace(&mut current_line, word.to_string()));
            if title_lines.len() >= 2 {
                current_line.clear();
                break;
            }
        }
    }
    if !current_line.is_empty() && title_lines.len() < 2 {
        title_lines.push(current_line);
    }

    let mut lines: Vec<Line> = title_lines.into_iter().map(Line::from).collect();
    let mut meta = vec![Span::styled(task.priority.to_string(), Style::default().fg(priority_color(task.priority)))];
    if let Some(due) = task.due_date {
        meta.push(Span::raw(" · "));
        meta.push(Span::styled(due_label(day_diff(due, today)), due_style(due, today, colors)));
    }
    lines.push(Line::from(meta));
    if !task.labels.is_empty() {
        lines.push(Line::from(
            task.labels
                .iter()
                .map(|l| Span::styled(format!("{l} "), Style::default().fg(label_fg(l))))
                .collect::<Vec<_>>(),
        ));
    }

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)).style(style),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut BoardApp, board: &mut Board, text: &str) {
        for c in text.chars() {
            app.handle_key(board, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn new_task_lands_in_selected_column() {
        let mut board = Board::in_memory();
        let mut app = BoardApp::new(&board);
        app.handle_key(&mut board, key(KeyCode::Right));
        app.handle_key(&mut board, key(KeyCode::Char('n')));
        assert_eq!(app.mode(), BoardMode::NewTask);
        type_text(&mut app, &mut board, "Plan sprint");
        app.handle_key(&mut board, key(KeyCode::Enter));

        let id = app.selected_task_id().unwrap();
        assert_eq!(board.tasks().get(&id).unwrap().status, Status::Todo);
        assert_eq!(app.status_message(), "Task \"Plan sprint\" created successfully");
    }

    #[test]
    fn blank_title_reports_error() {
        let mut board = Board::in_memory();
        let mut app = BoardApp::new(&board);
        app.handle_key(&mut board, key(KeyCode::Char('n')));
        app.handle_key(&mut board, key(KeyCode::Enter));
        assert_eq!(app.status_message(), "Task title is required");
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn ctrl_right_moves_card_and_follows_it() {
        let mut board = Board::in_memory();
        let task = board.create_task(NewTask { title: "Card".into(), ..Default::default() }, false).unwrap();
        let mut app = BoardApp::new(&board);
        board.drain_events();

        app.handle_key(&mut board, KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL));
        assert_eq!(board.tasks().get(&task.id).unwrap().status, Status::Todo);
        assert_eq!(app.selected_status(), Status::Todo);
        assert_eq!(app.view().occurrences(&task.id), 1);

        app.handle_key(&mut board, KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        assert_eq!(board.tasks().get(&task.id).unwrap().status, Status::Backlog);
        // Already leftmost.
        app.handle_key(&mut board, KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        assert_eq!(board.tasks().get(&task.id).unwrap().status, Status::Backlog);
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut board = Board::in_memory();
        board.create_task(NewTask { title: "Keep?".into(), ..Default::default() }, false).unwrap();
        let mut app = BoardApp::new(&board);

        app.handle_key(&mut board, key(KeyCode::Char('d')));
        app.handle_key(&mut board, key(KeyCode::Char('n')));
        assert_eq!(board.tasks().len(), 1);

        app.handle_key(&mut board, key(KeyCode::Char('d')));
        app.handle_key(&mut board, key(KeyCode::Char('y')));
        assert!(board.tasks().is_empty());
        assert_eq!(app.view().empty_state(Status::Backlog), Some("No tasks in backlog"));
    }

    #[test]
    fn search_filters_while_typing_and_esc_clears() {
        let mut board = Board::in_memory();
        board.create_task(NewTask { title: "Homepage".into(), ..Default::default() }, false).unwrap();
        board.create_task(NewTask { title: "Database".into(), ..Default::default() }, false).unwrap();
        let mut app = BoardApp::new(&board);

        app.handle_key(&mut board, key(KeyCode::Char('/')));
        type_text(&mut app, &mut board, "home");
        assert_eq!(app.view().visible_count(), 1);
        app.handle_key(&mut board, key(KeyCode::Esc));
        assert_eq!(app.view().visible_count(), 2);
        assert_eq!(app.mode(), BoardMode::Browse);
    }

    #[test]
    fn due_soon_overlay_follows_the_board_search() {
        let mut board = Board::in_memory();
        let today = Local::now().date_naive();
        for title in ["Homepage", "Database"] {
            let data = NewTask { title: title.into(), due_date: Some(today), ..Default::default() };
            board.create_task(data, false).unwrap();
        }
        let mut app = BoardApp::new(&board);
        app.handle_key(&mut board, key(KeyCode::Char('/')));
        type_text(&mut app, &mut board, "home");
        app.handle_key(&mut board, key(KeyCode::Enter));
        app.handle_key(&mut board, key(KeyCode::Char('s')));
        assert!(matches!(app.mode(), BoardMode::DueSoon(_)));

        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        terminal.draw(|f| app.render(f, &board)).unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Homepage"));
        assert!(!text.contains("Database"));
        assert!(text.contains("Total: 1"));
    }

    #[test]
    fn project_cycling_and_theme_toggle() {
        let mut board = Board::in_memory();
        let mut app = BoardApp::new(&board);
        app.handle_key(&mut board, key(KeyCode::Char('p')));
        assert_eq!(board.current_project_id(), "project-2");
        assert_eq!(app.view().project_id(), "project-2");
        app.handle_key(&mut board, key(KeyCode::Char('P')));
        app.handle_key(&mut board, key(KeyCode::Char('P')));
        assert_eq!(board.current_project_id(), "project-4");

        let before = board.theme();
        app.handle_key(&mut board, key(KeyCode::Char('T')));
        assert_eq!(board.theme(), before.toggled());
    }

    #[test]
    fn renders_columns_and_placeholders() {
        let mut board = Board::in_memory();
        board.create_task(NewTask { title: "Visible card".into(), ..Default::default() }, false).unwrap();
        let mut app = BoardApp::new(&board);
        let mut terminal = Terminal::new(TestBackend::new(160, 30)).unwrap();
        terminal.draw(|f| app.render(f, &board)).unwrap();

        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Website Redesign"));
        assert!(text.contains("Backlog (1)"));
        assert!(text.contains("No tasks to do"));
        assert!(text.contains("Visible card"));
    }
}
