use anyhow::Result;
use crossterm::{
    event::{self, Event, EventStream, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::io;
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::client::orchestrator::SessionOrchestrator;
use crate::core::error::SessionError;
use crate::core::session::{Completion, GenerationSession, PhaseUpdate};
use crate::utils::tui_writer::{LogEntry, LogLevel};

const MAX_LOG_LINES: usize = 50;

/// Messages from the spawned session task back to the UI loop. The UI task
/// is the single writer of all view state; the session task only sends.
enum SessionMessage {
    Phase(PhaseUpdate),
    Done(Result<Completion, SessionError>),
}

struct AppState {
    orchestrator: SessionOrchestrator,
    input: String,
    input_mode: bool,
    status_message: String,
    progress: f32,
    gallery_selected: usize,
    content_scroll: u16,
    show_logs: bool,
    system_logs: Vec<LogEntry>,
}

pub struct ForgeTui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: AppState,
}

impl ForgeTui {
    pub fn new(orchestrator: SessionOrchestrator) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(ForgeTui {
            terminal,
            app: AppState {
                orchestrator,
                input: String::new(),
                input_mode: false,
                status_message: "Press 'i' to describe an app, 'r' to refresh, 'q' to quit"
                    .to_string(),
                progress: 0.0,
                gallery_selected: 0,
                content_scroll: 0,
                show_logs: false,
                system_logs: Vec::new(),
            },
        })
    }

    pub async fn run(&mut self, mut log_rx: mpsc::UnboundedReceiver<LogEntry>) -> Result<()> {
        // Initial gallery load; a failure only becomes a status line, the
        // empty gallery renders its own hint.
        if let Err(error) = self.app.refresh_gallery().await {
            self.app.status_message = format!("{error:#}");
        }

        let (session_tx, mut session_rx) = mpsc::unbounded_channel();
        let mut event_stream = EventStream::new();
        let mut tick = tokio::time::interval(Duration::from_millis(250));

        loop {
            self.draw()?;

            tokio::select! {
                biased; // keyboard first, then session progress, then ticks
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key.code, key.modifiers, &session_tx).await? {
                                break;
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(error)) => {
                            tracing::warn!("terminal event stream error: {error}");
                        }
                        None => break,
                    }
                }
                Some(message) = session_rx.recv() => {
                    self.app.handle_session_message(message).await;
                }
                Some(entry) = log_rx.recv() => {
                    self.app.push_log(entry);
                }
                _ = tick.tick() => {}
            }
        }

        Ok(())
    }

    async fn handle_key(
        &mut self,
        code: KeyCode,
        modifiers: event::KeyModifiers,
        session_tx: &mpsc::UnboundedSender<SessionMessage>,
    ) -> Result<bool> {
        if code == KeyCode::Char('c') && modifiers.contains(event::KeyModifiers::CONTROL) {
            return Ok(true);
        }

        if self.app.input_mode {
            match code {
                KeyCode::Esc => {
                    self.app.input_mode = false;
                }
                KeyCode::Enter => {
                    self.app.input_mode = false;
                    let prompt = std::mem::take(&mut self.app.input);
                    self.app.start_generation(prompt, session_tx);
                }
                KeyCode::Backspace => {
                    self.app.input.pop();
                }
                KeyCode::Char(c) => {
                    self.app.input.push(c);
                }
                _ => {}
            }
            return Ok(false);
        }

        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('i') => {
                self.app.input_mode = true;
            }
            KeyCode::Char('r') => {
                match self.app.refresh_gallery().await {
                    Ok(()) => {
                        self.app.status_message =
                            format!("Gallery refreshed ({} projects)", self.app.gallery_len());
                    }
                    Err(error) => self.app.status_message = format!("{error:#}"),
                }
            }
            KeyCode::Enter => {
                self.app.activate_selected().await;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.app.gallery_selected = self.app.gallery_selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.app.gallery_len().saturating_sub(1);
                self.app.gallery_selected = (self.app.gallery_selected + 1).min(last);
            }
            KeyCode::Tab | KeyCode::Right => {
                self.app.orchestrator.viewer_mut().next_tab();
                self.app.content_scroll = 0;
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.app.orchestrator.viewer_mut().prev_tab();
                self.app.content_scroll = 0;
            }
            KeyCode::PageDown => {
                self.app.content_scroll = self.app.content_scroll.saturating_add(10);
            }
            KeyCode::PageUp => {
                self.app.content_scroll = self.app.content_scroll.saturating_sub(10);
            }
            KeyCode::Char('o') => {
                self.app.status_message = match self.app.orchestrator.viewer().open_preview() {
                    Ok(()) => "Preview opened in browser".to_string(),
                    Err(error) => format!("{error:#}"),
                };
            }
            KeyCode::Char('p') => {
                let client = self.app.orchestrator.client().clone();
                self.app.orchestrator.viewer_mut().refresh_preview(&client);
                self.app.status_message = "Preview reference refreshed".to_string();
            }
            KeyCode::Char('x') => {
                self.app.orchestrator.viewer_mut().close();
                self.app.status_message = "Viewer closed".to_string();
            }
            KeyCode::Char('l') => {
                self.app.show_logs = !self.app.show_logs;
            }
            _ => {}
        }
        Ok(false)
    }

    fn draw(&mut self) -> Result<()> {
        let app = &self.app;
        self.terminal.draw(|frame| render(frame, app))?;
        Ok(())
    }
}

impl Drop for ForgeTui {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

impl AppState {
    fn gallery_len(&self) -> usize {
        self.orchestrator.gallery().len()
    }

    async fn refresh_gallery(&mut self) -> Result<()> {
        let client = self.orchestrator.client().clone();
        self.orchestrator.gallery_mut().refresh(&client).await?;
        let last = self.gallery_len().saturating_sub(1);
        self.gallery_selected = self.gallery_selected.min(last);
        Ok(())
    }

    async fn activate_selected(&mut self) {
        let Some(project) = self
            .orchestrator
            .gallery()
            .projects()
            .get(self.gallery_selected)
            .cloned()
        else {
            return;
        };
        let client = self.orchestrator.client().clone();
        self.content_scroll = 0;
        match self
            .orchestrator
            .viewer_mut()
            .activate(&client, &project)
            .await
        {
            Ok(()) => self.status_message = format!("Viewing '{}'", project.name),
            Err(error) => self.status_message = format!("{error:#}"),
        }
    }

    /// Claim the in-flight slot and spawn the streaming session. The task
    /// owns a cloned client and reports back over the channel; all view
    /// mutation stays on this side.
    fn start_generation(&mut self, prompt: String, tx: &mpsc::UnboundedSender<SessionMessage>) {
        if let Err(error) = GenerationSession::validate_prompt(&prompt) {
            self.status_message = error.to_string();
            return;
        }
        if let Err(error) = self.orchestrator.begin() {
            self.status_message = error.to_string();
            return;
        }

        self.progress = 0.0;
        self.status_message = "Starting generation...".to_string();

        let client = self.orchestrator.client().clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let phase_tx = tx.clone();
            let outcome = GenerationSession::start(&client, &prompt, move |update| {
                let _ = phase_tx.send(SessionMessage::Phase(update.clone()));
            })
            .await;
            let _ = tx.send(SessionMessage::Done(outcome));
        });
    }

    async fn handle_session_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Phase(update) => {
                self.progress = update.progress;
                self.status_message = match &update.details {
                    Some(details) => format!("{} {}", update.message, details),
                    None => update.message.clone(),
                };
            }
            SessionMessage::Done(outcome) => match self.orchestrator.finish(outcome).await {
                Ok(completion) => {
                    self.progress = 1.0;
                    self.status_message = format!(
                        "'{}' ready - 'o' opens the preview",
                        completion.project_name
                    );
                    // Point the gallery cursor at the new project.
                    if let Some(index) = self
                        .orchestrator
                        .gallery()
                        .projects()
                        .iter()
                        .position(|project| project.folder == completion.folder)
                    {
                        self.gallery_selected = index;
                    }
                    self.content_scroll = 0;
                }
                Err(error) => {
                    self.status_message = format!("Generation failed: {error}");
                }
            },
        }
    }

    fn push_log(&mut self, entry: LogEntry) {
        self.system_logs.push(entry);
        if self.system_logs.len() > MAX_LOG_LINES {
            let excess = self.system_logs.len() - MAX_LOG_LINES;
            self.system_logs.drain(0..excess);
        }
    }
}

fn render(frame: &mut Frame, app: &AppState) {
    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(3),
    ];
    if app.show_logs {
        constraints.push(Constraint::Length(8));
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    render_prompt(frame, rows[0], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(rows[1]);
    render_gallery(frame, columns[0], app);
    render_viewer(frame, columns[1], app);

    render_status(frame, rows[2], app);
    if app.show_logs {
        render_logs(frame, rows[3], app);
    }
}

fn render_prompt(frame: &mut Frame, area: Rect, app: &AppState) {
    let (text, style) = if app.input_mode {
        (
            format!("{}_", app.input),
            Style::default().fg(Color::Yellow),
        )
    } else if app.input.is_empty() {
        (
            "press 'i' and describe the app to build".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (app.input.clone(), Style::default())
    };

    let title = if app.orchestrator.is_in_flight() {
        "Prompt (session in flight)"
    } else {
        "Prompt"
    };

    frame.render_widget(
        Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

fn render_gallery(frame: &mut Frame, area: Rect, app: &AppState) {
    let projects = app.orchestrator.gallery().projects();

    if projects.is_empty() {
        frame.render_widget(
            Paragraph::new("No projects yet. Start building!")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("Projects")),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = projects
        .iter()
        .map(|project| {
            let date = chrono::DateTime::from_timestamp(project.created, 0)
                .map(|ts| ts.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::raw(project.name.clone()),
                Span::styled(format!("  {}", date), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.gallery_selected));

    frame.render_stateful_widget(
        List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Projects"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> "),
        area,
        &mut state,
    );
}

fn render_viewer(frame: &mut Frame, area: Rect, app: &AppState) {
    let viewer = app.orchestrator.viewer();
    let Some(active) = viewer.active() else {
        frame.render_widget(
            Paragraph::new("Select a project and press Enter to browse its files.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("Viewer")),
            area,
        );
        return;
    };

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let titles: Vec<Line> = active
        .files
        .iter()
        .map(|file| Line::from(file.name.clone()))
        .collect();
    frame.render_widget(
        Tabs::new(titles)
            .select(active.selected_tab)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(active.summary.name.clone()),
            ),
        parts[0],
    );

    let content = viewer
        .selected_file()
        .map(|file| file.content.clone())
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(content)
            .wrap(Wrap { trim: false })
            .scroll((app.content_scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(active.preview_url.to_string()),
            ),
        parts[1],
    );
}

fn render_status(frame: &mut Frame, area: Rect, app: &AppState) {
    frame.render_widget(
        Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(app.status_message.clone()),
            )
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(f64::from(app.progress).clamp(0.0, 1.0)),
        area,
    );
}

fn render_logs(frame: &mut Frame, area: Rect, app: &AppState) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .system_logs
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Error => Color::Red,
                LogLevel::Warn => Color::Yellow,
                _ => Color::DarkGray,
            };
            Line::from(vec![
                Span::styled(
                    format!("{} ", entry.level.as_str()),
                    Style::default().fg(color),
                ),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Logs")),
        area,
    );
}
