//! Terminal rendering layer. Paints the four views (list, board, timer,
//! analytics) from the store's projections and forwards key gestures into
//! the store and timer entry points; it never mutates task state directly.
//! The focus timer is advanced from this event loop: once a wall-clock
//! second has elapsed the loop calls `tick()`, so cancellation is always
//! synchronous and no tick can land on a reset timer.

use std::{
    cell::RefCell,
    io,
    path::Path,
    time::{Duration, Instant},
};

use color_eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        BarChart, Block, BorderType, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph,
        Tabs, Wrap,
    },
    Frame, Terminal,
};
use taskmate_core::{
    prompt::UserPrompt,
    tasks::{Task, TaskStatus},
    views::{self, StatusFilter},
};
use taskmate_storage::json_file_store::JsonFileStore;
use taskmate_task::{rules, TaskStore};
use taskmate_timer::{FocusTimer, PRESET_MINUTES};

use crate::{config::Config, export, storage, theme::Theme};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Launch the interactive TUI. Press `q` or `Esc` to exit.
pub fn launch(config: &Config) -> Result<()> {
    let prefs = storage::store_from_config(config)?;
    let store = TaskStore::open(storage::store_from_config(config)?);
    let theme = Theme::load(&prefs);

    let mut timer = FocusTimer::new();
    timer.set_duration_secs(config.timer_duration_secs());

    let mut app = App {
        store,
        prefs,
        timer,
        theme,
        view: View::List,
        selected: 0,
        board_column: TaskStatus::Todo,
        board_row: 0,
        search: String::new(),
        searching: false,
        filter: StatusFilter::All,
        status_line: None,
    };

    // Guard restores the terminal even if we early-return.
    let _guard = TerminalGuard::enter()?;
    let mut terminal = _guard.terminal()?;
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(150))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !app.handle_key(key, &mut terminal)? {
                    break;
                }
            }
        }

        if last_tick.elapsed() >= Duration::from_secs(1) {
            last_tick = Instant::now();
            if let Some(done) = app.timer.tick() {
                let prompt = ModalPrompt::new(&mut terminal, app.theme);
                rules::complete_focus_session(
                    &mut app.store,
                    &prompt,
                    done.focused_task.as_ref(),
                    &done.message,
                )
                .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    List,
    Board,
    Timer,
    Analytics,
}

impl View {
    const ALL: [View; 4] = [View::List, View::Board, View::Timer, View::Analytics];

    fn label(self) -> &'static str {
        match self {
            View::List => "List",
            View::Board => "Board",
            View::Timer => "Timer",
            View::Analytics => "Analytics",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct App {
    store: TaskStore<JsonFileStore>,
    /// Second handle over the same data directory, for the theme key.
    prefs: JsonFileStore,
    timer: FocusTimer,
    theme: Theme,
    view: View,
    selected: usize,
    board_column: TaskStatus,
    board_row: usize,
    search: String,
    searching: bool,
    filter: StatusFilter,
    status_line: Option<String>,
}

impl App {
    // --- input -----------------------------------------------------------

    /// Returns `false` when the app should exit.
    fn handle_key(&mut self, key: KeyEvent, terminal: &mut Term) -> Result<bool> {
        self.status_line = None;

        if self.searching {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.searching = false,
                KeyCode::Backspace => {
                    self.search.pop();
                }
                KeyCode::Char(c) => self.search.push(c),
                _ => {}
            }
            self.clamp_list_selection();
            return Ok(true);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::BackTab => self.view = self.view.prev(),
            KeyCode::Char('t') => {
                self.theme = self.theme.toggled();
                self.theme.save(&self.prefs);
            }
            KeyCode::Char('e') => self.export_snapshot(),
            _ => match self.view {
                View::List => self.handle_list_key(key, terminal)?,
                View::Board => self.handle_board_key(key)?,
                View::Timer => self.handle_timer_key(key),
                View::Analytics => {}
            },
        }
        Ok(true)
    }

    fn handle_list_key(&mut self, key: KeyEvent, terminal: &mut Term) -> Result<()> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected += 1;
                self.clamp_list_selection();
            }
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_list_id() {
                    rules::toggle_checkbox(&mut self.store, &id)
                        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_list_id() {
                    let prompt = ModalPrompt::new(terminal, self.theme);
                    if prompt.confirm("Are you sure?") {
                        self.store
                            .delete(&id)
                            .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
                        self.timer.release_task(&id);
                        self.clamp_list_selection();
                    }
                }
            }
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('f') => {
                self.filter = self.filter.cycled();
                self.clamp_list_selection();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Result<()> {
        let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Left if shifted => self.move_card(left_of(self.board_column))?,
            KeyCode::Right if shifted => self.move_card(right_of(self.board_column))?,
            KeyCode::Char('H') => self.move_card(left_of(self.board_column))?,
            KeyCode::Char('L') => self.move_card(right_of(self.board_column))?,
            KeyCode::Left | KeyCode::Char('h') => {
                if let Some(column) = left_of(self.board_column) {
                    self.board_column = column;
                    self.clamp_board_selection();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if let Some(column) = right_of(self.board_column) {
                    self.board_column = column;
                    self.clamp_board_selection();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.board_row += 1;
                self.clamp_board_selection();
            }
            KeyCode::Up | KeyCode::Char('k') => self.board_row = self.board_row.saturating_sub(1),
            _ => {}
        }
        Ok(())
    }

    fn handle_timer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('s') => {
                if self.timer.is_running() {
                    self.timer.stop();
                } else {
                    self.timer.start(self.store.all());
                }
            }
            KeyCode::Char('r') => self.timer.reset(),
            KeyCode::Char('1') => self.timer.set_preset(PRESET_MINUTES[0]),
            KeyCode::Char('2') => self.timer.set_preset(PRESET_MINUTES[1]),
            KeyCode::Char('3') => self.timer.set_preset(PRESET_MINUTES[2]),
            KeyCode::Char('f') => self.focus_next_task(),
            KeyCode::Char('u') => self.timer.unfocus(),
            _ => {}
        }
    }

    /// Drops the selected card onto the neighboring column; the drop is
    /// absolute, the card takes exactly the target column's status.
    fn move_card(&mut self, target: Option<TaskStatus>) -> Result<()> {
        let Some(target) = target else {
            return Ok(());
        };
        let id = {
            let buckets = views::kanban_buckets(self.store.all());
            buckets
                .column(self.board_column)
                .get(self.board_row)
                .map(|t| t.id.clone())
        };
        if let Some(id) = id {
            rules::drop_on_column(&mut self.store, &id, target)
                .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
            self.board_column = target;
            let buckets = views::kanban_buckets(self.store.all());
            self.board_row = buckets
                .column(target)
                .iter()
                .position(|t| t.id == id)
                .unwrap_or(0);
        }
        Ok(())
    }

    /// Cycles the timer focus through tasks that are not done.
    fn focus_next_task(&mut self) {
        let next_id = {
            let active: Vec<&Task> = self
                .store
                .all()
                .iter()
                .filter(|t| t.status != TaskStatus::Done)
                .collect();
            if active.is_empty() {
                return;
            }
            let next = match self.timer.focused_task() {
                Some(current) => match active.iter().position(|t| &t.id == current) {
                    Some(pos) => active[(pos + 1) % active.len()],
                    None => active[0],
                },
                None => active[0],
            };
            next.id.clone()
        };
        self.timer.focus_on(next_id);
    }

    fn export_snapshot(&mut self) {
        let path = Path::new(export::DEFAULT_EXPORT_FILE);
        self.status_line = Some(match export::write_snapshot(self.store.all(), path) {
            Ok(()) => format!("Exported to {}", export::DEFAULT_EXPORT_FILE),
            Err(err) => format!("Export failed: {err}"),
        });
    }

    fn visible(&self) -> Vec<&Task> {
        views::filter_list(self.store.all(), &self.search, self.filter)
    }

    fn selected_list_id(&self) -> Option<taskmate_core::tasks::TaskId> {
        self.visible().get(self.selected).map(|t| t.id.clone())
    }

    fn clamp_list_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn clamp_board_selection(&mut self) {
        let buckets = views::kanban_buckets(self.store.all());
        let len = buckets.column(self.board_column).len();
        self.board_row = self.board_row.min(len.saturating_sub(1));
    }

    // --- rendering -------------------------------------------------------

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(2),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        match self.view {
            View::List => self.render_list(frame, chunks[1]),
            View::Board => self.render_board(frame, chunks[1]),
            View::Timer => self.render_timer(frame, chunks[1]),
            View::Analytics => self.render_analytics(frame, chunks[1]),
        }
        self.render_footer(frame, chunks[2]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = View::ALL.iter().map(|v| Line::from(v.label())).collect();
        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .style(Style::default().fg(self.theme.fg()))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(Span::styled(
                        format!(" TaskMate — {} tasks ", self.store.len()),
                        Style::default()
                            .fg(self.theme.accent())
                            .add_modifier(Modifier::BOLD),
                    )),
            );
        frame.render_widget(tabs, area);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let visible = self.visible();
        let title = format!(
            " Tasks — filter: {} — search: {} ",
            self.filter.label(),
            if self.search.is_empty() {
                "(none)"
            } else {
                &self.search
            }
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(self.theme.fg()));

        if visible.is_empty() {
            let empty = Paragraph::new("No tasks found.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(self.theme.dim()))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = visible.iter().map(|t| self.list_item(t)).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn list_item(&self, task: &Task) -> ListItem<'static> {
        let mut spans = vec![
            Span::styled(
                status_label(task.status),
                Style::default()
                    .fg(status_color(task.status))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                task.title.clone(),
                if task.status == TaskStatus::Done {
                    Style::default()
                        .fg(self.theme.dim())
                        .add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                },
            ),
            Span::styled(
                format!(" ({})", task.priority.label()),
                Style::default().fg(self.theme.dim()),
            ),
        ];
        if let Some((done, total)) = task.progress() {
            spans.push(Span::styled(
                format!(" {done}/{total} steps"),
                Style::default().fg(self.theme.accent()),
            ));
        }
        if let Some(due) = &task.due_date {
            spans.push(Span::styled(
                format!(" due {due}"),
                Style::default().fg(self.theme.dim()),
            ));
        }
        ListItem::new(Line::from(spans))
    }

    fn render_board(&self, frame: &mut Frame, area: Rect) {
        let buckets = views::kanban_buckets(self.store.all());
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ])
            .split(area);

        for (slot, status) in [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done]
            .into_iter()
            .enumerate()
        {
            let cards = buckets.column(status);
            let selected_column = status == self.board_column;
            let border = if selected_column {
                Style::default().fg(self.theme.accent())
            } else {
                Style::default().fg(self.theme.dim())
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border)
                .title(Span::styled(
                    format!(" {} ({}) ", status.heading(), cards.len()),
                    Style::default()
                        .fg(status_color(status))
                        .add_modifier(Modifier::BOLD),
                ));

            let items: Vec<ListItem> = cards
                .iter()
                .map(|t| {
                    ListItem::new(Line::from(vec![
                        Span::styled(t.title.clone(), Style::default().fg(self.theme.fg())),
                        Span::styled(
                            format!(" ({})", t.priority.label()),
                            Style::default().fg(self.theme.dim()),
                        ),
                    ]))
                })
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");

            if selected_column {
                let mut state = ListState::default();
                state.select((!cards.is_empty()).then_some(self.board_row));
                frame.render_stateful_widget(list, columns[slot], &mut state);
            } else {
                frame.render_widget(list, columns[slot]);
            }
        }
    }

    fn render_timer(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(1),
            ])
            .split(area);

        let phase = if self.timer.is_running() {
            "running"
        } else {
            "paused"
        };
        let display = Paragraph::new(Line::from(vec![
            Span::styled(
                self.timer.display(),
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  ({phase})"), Style::default().fg(self.theme.dim())),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Focus Timer "),
        );
        frame.render_widget(display, chunks[0]);

        let gauge = Gauge::default()
            .ratio(self.timer.progress())
            .label(self.timer.display())
            .gauge_style(Style::default().fg(self.theme.accent()))
            .block(Block::default().borders(Borders::ALL).title(" Session "));
        frame.render_widget(gauge, chunks[1]);

        let focus_line = match self.timer.focused_task() {
            Some(id) => match self.store.find_by_id(id) {
                Some(task) => format!("Focusing: {}", task.title),
                None => "Focusing: (task no longer exists)".to_string(),
            },
            None => "No task focused".to_string(),
        };
        let focus = Paragraph::new(focus_line)
            .alignment(Alignment::Center)
            .style(Style::default().fg(self.theme.fg()));
        frame.render_widget(focus, chunks[2]);

        let help = Paragraph::new(format!(
            "space start/pause · r reset · 1/2/3 presets ({}/{}/{} min) · f focus next · u unfocus",
            PRESET_MINUTES[0], PRESET_MINUTES[1], PRESET_MINUTES[2]
        ))
        .alignment(Alignment::Center)
        .style(Style::default().fg(self.theme.dim()));
        frame.render_widget(help, chunks[3]);
    }

    fn render_analytics(&self, frame: &mut Frame, area: Rect) {
        let counts = views::status_counts(self.store.all());
        let data = [
            ("To Do", counts.todo as u64),
            ("In Progress", counts.doing as u64),
            ("Done", counts.done as u64),
        ];
        let chart = BarChart::default()
            .data(&data)
            .bar_width(12)
            .bar_gap(3)
            .bar_style(Style::default().fg(self.theme.accent()))
            .value_style(
                Style::default()
                    .fg(self.theme.fg())
                    .add_modifier(Modifier::BOLD),
            )
            .label_style(Style::default().fg(self.theme.fg()))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(format!(" Status counts — {} total ", counts.total())),
            );
        frame.render_widget(chart, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let text = if let Some(status) = &self.status_line {
            status.clone()
        } else if self.searching {
            format!("search: {}_  (enter/esc to finish)", self.search)
        } else {
            match self.view {
                View::List => {
                    "j/k move · space toggle done · d delete · / search · f filter · tab view · t theme · e export · q quit"
                }
                View::Board => {
                    "h/l column · j/k card · H/L move card · tab view · t theme · e export · q quit"
                }
                View::Timer => "space start/pause · r reset · tab view · q quit",
                View::Analytics => "tab view · t theme · e export · q quit",
            }
            .to_string()
        };
        let footer = Paragraph::new(text).style(Style::default().fg(self.theme.dim()));
        frame.render_widget(footer, area);
    }
}

fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "[todo]",
        TaskStatus::Doing => "[doing]",
        TaskStatus::Done => "[done]",
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Yellow,
        TaskStatus::Doing => Color::Cyan,
        TaskStatus::Done => Color::Green,
    }
}

fn left_of(status: TaskStatus) -> Option<TaskStatus> {
    match status {
        TaskStatus::Todo => None,
        TaskStatus::Doing => Some(TaskStatus::Todo),
        TaskStatus::Done => Some(TaskStatus::Doing),
    }
}

fn right_of(status: TaskStatus) -> Option<TaskStatus> {
    match status {
        TaskStatus::Todo => Some(TaskStatus::Doing),
        TaskStatus::Doing => Some(TaskStatus::Done),
        TaskStatus::Done => None,
    }
}

/// Notification surface for the TUI: a centered modal over the current
/// frame. `notify` waits for any key; `confirm` waits for y/n. Prompt
/// delivery has no error channel, so draw and read failures degrade to
/// "dismissed" / "declined".
struct ModalPrompt<'a> {
    terminal: RefCell<&'a mut Term>,
    theme: Theme,
}

impl<'a> ModalPrompt<'a> {
    fn new(terminal: &'a mut Term, theme: Theme) -> Self {
        Self {
            terminal: RefCell::new(terminal),
            theme,
        }
    }

    fn draw_box(&self, text: &str, hint: &str) {
        let theme = self.theme;
        let text = text.to_string();
        let hint = hint.to_string();
        let _ = self.terminal.borrow_mut().draw(|frame| {
            let area = centered_rect(50, 25, frame.area());
            frame.render_widget(Clear, area);
            let body = Paragraph::new(vec![
                Line::from(text.clone()),
                Line::from(""),
                Line::from(Span::styled(
                    hint.clone(),
                    Style::default().fg(theme.dim()),
                )),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(" TaskMate ")
                    .style(Style::default().fg(theme.fg())),
            );
            frame.render_widget(body, area);
        });
    }
}

impl UserPrompt for ModalPrompt<'_> {
    fn notify(&self, message: &str) {
        self.draw_box(message, "press any key");
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    }

    fn confirm(&self, question: &str) -> bool {
        self.draw_box(question, "y / n");
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => return true,
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return false,
                    _ => continue,
                },
                Ok(_) => continue,
                Err(_) => return false,
            }
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Enter alternate screen to avoid polluting the shell buffer.
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }

    fn terminal(&self) -> Result<Term> {
        let backend = CrosstermBackend::new(io::stdout());
        Ok(Terminal::new(backend)?)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; errors are logged but not propagated from Drop.
        if let Err(err) = disable_raw_mode() {
            eprintln!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture) {
            eprintln!("failed to restore terminal: {err}");
        }
    }
}
