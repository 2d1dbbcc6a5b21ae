//! Interactive skill console TUI using ratatui.
//!
//! Three panes (skills, file tree, editor) plus a status line, all backed by
//! a [`Console`]. Key handling is a pure mapping from a key press to an
//! [`Action`]; the event loop applies actions to the console and redraws
//! from its state.

use std::io::{self, IsTerminal, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::debug;

use super::editor::EditorBuffer;
use crate::console::{ConfirmedDelete, Console, DeleteIntent};
use crate::error::{ConsoleError, Result};
use crate::session::{Loading, Notice, NoticeLevel, SessionState};
use crate::tree::{self, VisibleRow};

/// Focus state for TUI panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPanel {
    Skills,
    Tree,
    Editor,
}

impl FocusPanel {
    const fn next(self) -> Self {
        match self {
            Self::Skills => Self::Tree,
            Self::Tree => Self::Editor,
            Self::Editor => Self::Skills,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Skills => Self::Editor,
            Self::Tree => Self::Skills,
            Self::Editor => Self::Tree,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    File,
    Directory,
}

/// What the keyboard is currently driving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Keys edit the open file.
    Editing,
    /// Typing the path of a new node.
    Prompt { kind: PromptKind, input: String },
    /// Waiting for y/n on a delete.
    Confirm(DeleteIntent),
}

/// Action to take after handling input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Continue,
    Refresh,
    SelectSkill(String),
    /// Open a file, or toggle and select a directory.
    OpenNode { path: String, is_dir: bool },
    /// The editor text changed.
    Draft(String),
    Save,
    Create { path: String, is_dir: bool },
    AskDeleteNode(String),
    AskDeleteSkill(String),
    Delete(ConfirmedDelete),
}

/// The slice of session state the panes render.
#[derive(Debug, Clone, Default)]
struct View {
    skills: Vec<(String, String)>,
    active: Option<String>,
    rows: Vec<VisibleRow>,
    selected_path: String,
    selected_is_dir: bool,
    has_file: bool,
    draft: String,
    dirty: bool,
    loading: Loading,
    notice: Option<Notice>,
}

impl View {
    fn from_state(state: &SessionState) -> Self {
        Self {
            skills: state
                .skills
                .iter()
                .map(|s| (s.slug.clone(), s.description.clone()))
                .collect(),
            active: state.active_slug().map(str::to_string),
            rows: tree::visible_rows(&state.tree, &state.expansion),
            selected_path: state.editing.selected_path().to_string(),
            selected_is_dir: state.editing.selected_is_dir(),
            has_file: state.editing.has_file(),
            draft: state.editing.draft().to_string(),
            dirty: state.is_dirty(),
            loading: state.loading,
            notice: state.latest_notice().cloned(),
        }
    }
}

/// TUI application state.
pub struct BrowseTui {
    view: View,
    focus: FocusPanel,
    mode: Mode,
    skill_cursor: ListState,
    tree_cursor: ListState,
    editor: EditorBuffer,
    editor_scroll: u16,
    show_help: bool,
    /// Local message shown instead of the latest notice until the next key.
    status_message: Option<String>,
}

impl Default for BrowseTui {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowseTui {
    #[must_use]
    pub fn new() -> Self {
        Self {
            view: View::default(),
            focus: FocusPanel::Skills,
            mode: Mode::Normal,
            skill_cursor: ListState::default(),
            tree_cursor: ListState::default(),
            editor: EditorBuffer::default(),
            editor_scroll: 0,
            show_help: false,
            status_message: None,
        }
    }

    /// Pull the latest session state into the view.
    pub fn sync(&mut self, state: &SessionState) {
        let view = View::from_state(state);
        if self.mode == Mode::Editing && !view.has_file {
            self.mode = Mode::Normal;
        }
        if self.mode != Mode::Editing && self.editor.text() != view.draft {
            self.editor.reset(&view.draft);
            self.editor_scroll = 0;
        }
        clamp(&mut self.skill_cursor, view.skills.len());
        clamp(&mut self.tree_cursor, view.rows.len());
        self.view = view;
    }

    #[must_use]
    pub const fn focus(&self) -> FocusPanel {
        self.focus
    }

    #[must_use]
    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Ask the operator to confirm `intent`.
    pub fn begin_confirm(&mut self, intent: DeleteIntent) {
        self.mode = Mode::Confirm(intent);
    }

    /// Run the TUI main loop.
    pub async fn run(
        mut self,
        console: &Console,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<()> {
        loop {
            console.read(|state| self.sync(state));
            terminal.draw(|f| self.draw(f))?;

            if !event::poll(Duration::from_millis(100))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let action = self.handle_key(key.code, key.modifiers);
            if action == Action::Quit {
                return Ok(());
            }
            self.apply(console, action).await;
        }
    }

    async fn apply(&mut self, console: &Console, action: Action) {
        let result = match action {
            Action::Quit | Action::Continue => Ok(()),
            Action::Refresh => refresh(console).await,
            Action::SelectSkill(slug) => {
                let result = console.select_skill_by_slug(&slug).await;
                if result.is_ok() {
                    self.focus = FocusPanel::Tree;
                    self.tree_cursor.select(Some(0));
                }
                result
            }
            Action::OpenNode { path, is_dir } => {
                if is_dir {
                    console.toggle_expansion(&path);
                }
                console.select_node(&path, is_dir).await
            }
            Action::Draft(text) => {
                console.update_draft(&text);
                Ok(())
            }
            Action::Save => console.commit_save().await,
            Action::Create { path, is_dir } => match console.create_node(&path, is_dir, None).await {
                Ok(created) if !is_dir => console.open_path(&created).await,
                Ok(_) => Ok(()),
                Err(err) => Err(err),
            },
            Action::AskDeleteNode(path) => console
                .prepare_delete_node(&path)
                .map(|intent| self.begin_confirm(intent)),
            Action::AskDeleteSkill(slug) => console
                .prepare_delete_skill(&slug)
                .map(|intent| self.begin_confirm(intent)),
            Action::Delete(confirmed) => console.delete(confirmed).await,
        };
        if let Err(err) = result {
            debug!(error = %err, "console action failed");
            self.status_message = Some(err.to_string());
        }
    }

    /// Map a key press to an action, updating local UI state.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Action {
        self.status_message = None;

        if self.show_help {
            if matches!(key, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter) {
                self.show_help = false;
            }
            return Action::Continue;
        }

        match self.mode {
            Mode::Editing => return self.handle_edit_key(key, modifiers),
            Mode::Prompt { .. } => return self.handle_prompt_key(key),
            Mode::Confirm(_) => return self.handle_confirm_key(key),
            Mode::Normal => {}
        }

        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match key {
            KeyCode::Char('c') if ctrl => return Action::Quit,
            KeyCode::Char('s') if ctrl => return Action::Save,
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Char('?') => {
                self.show_help = true;
                return Action::Continue;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Action::Continue;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return Action::Continue;
            }
            KeyCode::Char('r') => return Action::Refresh,
            KeyCode::Char('e') => return self.enter_edit(),
            KeyCode::Char('n') => return self.open_prompt(PromptKind::File),
            KeyCode::Char('N') => return self.open_prompt(PromptKind::Directory),
            KeyCode::Char('d') => return self.ask_delete(),
            _ => {}
        }

        match self.focus {
            FocusPanel::Skills => self.handle_skills_key(key),
            FocusPanel::Tree => self.handle_tree_key(key),
            FocusPanel::Editor => self.handle_editor_key(key),
        }
    }

    fn handle_skills_key(&mut self, key: KeyCode) -> Action {
        let len = self.view.skills.len();
        match key {
            KeyCode::Down | KeyCode::Char('j') => step(&mut self.skill_cursor, len, true),
            KeyCode::Up | KeyCode::Char('k') => step(&mut self.skill_cursor, len, false),
            KeyCode::Enter | KeyCode::Char('l') => {
                if let Some((slug, _)) = self.skill_cursor.selected().and_then(|i| self.view.skills.get(i)) {
                    return Action::SelectSkill(slug.clone());
                }
            }
            _ => {}
        }
        Action::Continue
    }

    fn handle_tree_key(&mut self, key: KeyCode) -> Action {
        let len = self.view.rows.len();
        match key {
            KeyCode::Down | KeyCode::Char('j') => step(&mut self.tree_cursor, len, true),
            KeyCode::Up | KeyCode::Char('k') => step(&mut self.tree_cursor, len, false),
            KeyCode::Enter | KeyCode::Char('l') => {
                if let Some(row) = self.cursor_row() {
                    return Action::OpenNode {
                        path: row.path.clone(),
                        is_dir: row.is_dir,
                    };
                }
            }
            _ => {}
        }
        Action::Continue
    }

    fn handle_editor_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Down | KeyCode::Char('j') | KeyCode::PageDown => {
                self.editor_scroll = self.editor_scroll.saturating_add(3);
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::PageUp => {
                self.editor_scroll = self.editor_scroll.saturating_sub(3);
            }
            KeyCode::Char('g') => self.editor_scroll = 0,
            _ => {}
        }
        Action::Continue
    }

    fn handle_edit_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Action {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let changed = match key {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                return Action::Continue;
            }
            KeyCode::Char('s') if ctrl => return Action::Save,
            KeyCode::Char(c) if !ctrl => {
                self.editor.insert(c);
                true
            }
            KeyCode::Enter => {
                self.editor.insert('\n');
                true
            }
            KeyCode::Tab => {
                self.editor.insert_str("    ");
                true
            }
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Left => {
                self.editor.left();
                false
            }
            KeyCode::Right => {
                self.editor.right();
                false
            }
            KeyCode::Up => {
                self.editor.up();
                false
            }
            KeyCode::Down => {
                self.editor.down();
                false
            }
            KeyCode::Home => {
                self.editor.home();
                false
            }
            KeyCode::End => {
                self.editor.end();
                false
            }
            _ => false,
        };
        if changed {
            Action::Draft(self.editor.text().to_string())
        } else {
            Action::Continue
        }
    }

    fn handle_prompt_key(&mut self, key: KeyCode) -> Action {
        let Mode::Prompt { kind, input } = &mut self.mode else {
            return Action::Continue;
        };
        match key {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                let path = std::mem::take(input);
                let is_dir = *kind == PromptKind::Directory;
                self.mode = Mode::Normal;
                return Action::Create { path, is_dir };
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
        Action::Continue
    }

    fn handle_confirm_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Char('y' | 'Y') => {
                if let Mode::Confirm(intent) = std::mem::replace(&mut self.mode, Mode::Normal) {
                    return Action::Delete(intent.confirm());
                }
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status_message = Some("Delete cancelled".to_string());
            }
            _ => {}
        }
        Action::Continue
    }

    fn enter_edit(&mut self) -> Action {
        if !self.view.has_file {
            self.status_message = Some("Open a file to edit it".to_string());
        } else if self.view.loading.file {
            self.status_message = Some("File is still loading".to_string());
        } else {
            self.focus = FocusPanel::Editor;
            self.mode = Mode::Editing;
            self.editor.reset(&self.view.draft);
        }
        Action::Continue
    }

    fn open_prompt(&mut self, kind: PromptKind) -> Action {
        if self.view.active.is_none() {
            self.status_message = Some("Select a skill first".to_string());
            return Action::Continue;
        }
        let parent = tree::parent_directory(&self.view.selected_path, self.view.selected_is_dir);
        let input = if parent.is_empty() {
            String::new()
        } else {
            format!("{parent}/")
        };
        self.mode = Mode::Prompt { kind, input };
        Action::Continue
    }

    fn ask_delete(&mut self) -> Action {
        match self.focus {
            FocusPanel::Skills => self
                .skill_cursor
                .selected()
                .and_then(|i| self.view.skills.get(i))
                .map_or(Action::Continue, |(slug, _)| Action::AskDeleteSkill(slug.clone())),
            FocusPanel::Tree => self
                .cursor_row()
                .map_or(Action::Continue, |row| Action::AskDeleteNode(row.path.clone())),
            FocusPanel::Editor if !self.view.selected_path.is_empty() => {
                Action::AskDeleteNode(self.view.selected_path.clone())
            }
            FocusPanel::Editor => Action::Continue,
        }
    }

    fn cursor_row(&self) -> Option<&VisibleRow> {
        self.tree_cursor.selected().and_then(|i| self.view.rows.get(i))
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title bar
                Constraint::Min(8),    // Panes
                Constraint::Length(1), // Status line
                Constraint::Length(1), // Help bar
            ])
            .split(f.area());

        self.draw_title_bar(f, chunks[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(50),
            ])
            .split(chunks[1]);
        self.draw_skills_panel(f, columns[0]);
        self.draw_tree_panel(f, columns[1]);
        self.draw_editor_panel(f, columns[2]);

        self.draw_status_line(f, chunks[2]);
        self.draw_help_bar(f, chunks[3]);

        match &self.mode {
            Mode::Prompt { kind, input } => draw_prompt(f, *kind, input),
            Mode::Confirm(intent) => draw_confirm(f, intent),
            Mode::Normal | Mode::Editing => {}
        }
        if self.show_help {
            draw_help_overlay(f);
        }
    }

    fn draw_title_bar(&self, f: &mut Frame, area: Rect) {
        let active = self
            .view
            .active
            .as_ref()
            .map(|slug| format!(" | {slug}"))
            .unwrap_or_default();
        let title = Line::from(vec![
            Span::styled("skc browse", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" | {} skills{active}", self.view.skills.len())),
        ]);
        f.render_widget(Paragraph::new(title).style(Style::default().fg(Color::Cyan)), area);
    }

    fn pane_block(&self, panel: FocusPanel, title: String) -> Block<'static> {
        let focused = self.focus == panel;
        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title)
    }

    fn draw_skills_panel(&mut self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .view
            .skills
            .iter()
            .map(|(slug, _)| {
                let style = if self.view.active.as_deref() == Some(slug.as_str()) {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(slug.clone(), style)))
            })
            .collect();

        let list = List::new(items)
            .block(self.pane_block(FocusPanel::Skills, " Skills ".to_string()))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        f.render_stateful_widget(list, area, &mut self.skill_cursor);
    }

    fn draw_tree_panel(&mut self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .view
            .rows
            .iter()
            .map(|row| {
                let indent = "  ".repeat(row.depth);
                let label = if row.is_dir {
                    let marker = if row.expanded { "▾" } else { "▸" };
                    format!("{indent}{marker} {}/", row.name)
                } else {
                    format!("{indent}  {}", row.name)
                };
                let mut style = if row.is_dir {
                    Style::default().fg(Color::Blue)
                } else {
                    Style::default()
                };
                if row.path == self.view.selected_path {
                    style = style.add_modifier(Modifier::BOLD).fg(Color::Yellow);
                }
                ListItem::new(Line::from(Span::styled(label, style)))
            })
            .collect();

        let title = if self.view.loading.tree {
            " Files (loading) ".to_string()
        } else {
            " Files ".to_string()
        };
        let list = List::new(items)
            .block(self.pane_block(FocusPanel::Tree, title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        f.render_stateful_widget(list, area, &mut self.tree_cursor);
    }

    fn draw_editor_panel(&mut self, f: &mut Frame, area: Rect) {
        let block = self.pane_block(FocusPanel::Editor, editor_title(&self.view, &self.mode));

        if !self.view.has_file {
            let hint = if self.view.selected_is_dir {
                "Directory selected. Press n or N to create inside it."
            } else {
                "Select a file to edit."
            };
            let paragraph = Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(paragraph, area);
            return;
        }
        if self.view.loading.file {
            f.render_widget(Paragraph::new("Loading...").block(block), area);
            return;
        }

        if self.mode == Mode::Editing {
            let height = area.height.saturating_sub(2).max(1);
            let (line, col) = self.editor.line_col();
            let line = to_u16(line);
            if line < self.editor_scroll {
                self.editor_scroll = line;
            } else if line >= self.editor_scroll.saturating_add(height) {
                self.editor_scroll = line - height + 1;
            }
            let paragraph = Paragraph::new(self.editor.text().to_string())
                .block(block)
                .scroll((self.editor_scroll, 0));
            f.render_widget(paragraph, area);
            f.set_cursor_position((
                area.x + 1 + to_u16(col).min(area.width.saturating_sub(3)),
                area.y + 1 + line - self.editor_scroll,
            ));
        } else {
            let paragraph = Paragraph::new(self.view.draft.clone())
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((self.editor_scroll, 0));
            f.render_widget(paragraph, area);
        }
    }

    fn draw_status_line(&self, f: &mut Frame, area: Rect) {
        let line = if let Some(message) = &self.status_message {
            Line::from(Span::styled(message.clone(), Style::default().fg(Color::Yellow)))
        } else if let Some(notice) = &self.view.notice {
            let color = match notice.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Warn => Color::Yellow,
                NoticeLevel::Error => Color::Red,
            };
            Line::from(Span::styled(notice.message.clone(), Style::default().fg(color)))
        } else {
            Line::from("")
        };
        let loading = self.view.loading;
        let busy = loading.skills || loading.tree || loading.file || loading.saving;
        let mut spans = line.spans;
        if busy {
            spans.push(Span::styled("  [working]", Style::default().fg(Color::DarkGray)));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_help_bar(&self, f: &mut Frame, area: Rect) {
        let help_text = match self.mode {
            Mode::Editing => "Esc: stop editing  Ctrl-S: save  arrows: move",
            Mode::Prompt { .. } => "Enter: create  Esc: cancel",
            Mode::Confirm(_) => "y: delete  n/Esc: cancel",
            Mode::Normal => {
                "Tab: pane  j/k: move  Enter: open  e: edit  Ctrl-S: save  n/N: new file/dir  d: delete  r: refresh  ?: help  q: quit"
            }
        };
        let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
        f.render_widget(paragraph, area);
    }
}

/// Editor pane title; `*` marks unsaved changes.
fn editor_title(view: &View, mode: &Mode) -> String {
    if view.selected_path.is_empty() {
        return " Editor ".to_string();
    }
    let dirty = if view.dirty { " *" } else { "" };
    let editing = if *mode == Mode::Editing { " [editing]" } else { "" };
    format!(" {}{dirty}{editing} ", view.selected_path)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        (area.width - width) / 2,
        (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_prompt(f: &mut Frame, kind: PromptKind, input: &str) {
    let area = centered(f.area(), 60, 3);
    f.render_widget(Clear, area);
    let title = match kind {
        PromptKind::File => " New file path ",
        PromptKind::Directory => " New directory path ",
    };
    let paragraph = Paragraph::new(format!("{input}_")).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );
    f.render_widget(paragraph, area);
}

fn draw_confirm(f: &mut Frame, intent: &DeleteIntent) {
    let area = centered(f.area(), 60, 6);
    f.render_widget(Clear, area);
    let lines = vec![
        Line::from(intent.description()),
        Line::from(""),
        Line::from(Span::styled(
            "[y] delete   [n] cancel",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Confirm delete "),
        );
    f.render_widget(paragraph, area);
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered(f.area(), 60, 20);
    f.render_widget(Clear, area);

    let help_text = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  Tab / S-Tab  Cycle pane focus"),
        Line::from("  j / Down     Move down"),
        Line::from("  k / Up       Move up"),
        Line::from("  Enter / l    Select skill, open file, toggle directory"),
        Line::from("  e            Edit the open file (Esc to stop)"),
        Line::from("  Ctrl-S       Save the open file"),
        Line::from("  n            New file in the selected directory"),
        Line::from("  N            New directory in the selected directory"),
        Line::from("  d            Delete the item under the cursor"),
        Line::from("  r            Refresh skills and files"),
        Line::from("  q            Quit"),
        Line::from(""),
        Line::from("A * in the editor title marks unsaved changes."),
        Line::from("Navigating away discards them."),
        Line::from(""),
        Line::from("Press ? or Esc to close this help"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn clamp(state: &mut ListState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        None => state.select(Some(0)),
        Some(i) if i >= len => state.select(Some(len - 1)),
        Some(_) => {}
    }
}

/// Move the cursor one step, wrapping at both ends.
fn step(state: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => (i + 1) % len,
        Some(0) | None if !forward => len - 1,
        Some(i) if !forward => i - 1,
        _ => 0,
    };
    state.select(Some(i));
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

async fn refresh(console: &Console) -> Result<()> {
    console.refresh_skills().await?;
    let active = console.read(|s| s.active_slug().map(str::to_string));
    match active {
        Some(slug) => console.reload_tree(&slug, false).await,
        None => Ok(()),
    }
}

/// RAII Guard to ensure terminal state is restored even on panic.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Run the browse TUI until the operator quits.
pub async fn run_browse_tui(console: &Console) -> Result<()> {
    if !io::stdout().is_terminal() {
        return Err(ConsoleError::ValidationFailed(
            "browse command requires an interactive terminal".to_string(),
        ));
    }

    let _guard = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    if let Err(err) = console.mount().await {
        debug!(error = %err, "initial load failed");
    }
    BrowseTui::new().run(console, &mut terminal).await
}
