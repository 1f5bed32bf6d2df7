mod app;
mod config;
mod curriculum;
mod engine;
mod event;
mod hangul;
mod keyboard;
mod logging;
mod session;
mod speech;
mod store;
mod ui;
mod user;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use app::{App, AppScreen, LevelAction, StatusKind};
use config::Config;
use event::{AppEvent, EventHandler};
use keyboard::display::{BACKSPACE, ENTER, SHIFT, SPACE};
use keyboard::model::KeyboardModel;
use session::drill::{DrillKind, Feedback};
use session::input::Keystroke;
use store::VocabStore;
use store::json_store::JsonStore;
use store::schema::MasteryKind;
use ui::components::answer_box::AnswerBox;
use ui::components::flashcard::FlashcardView;
use ui::components::keyboard_diagram::KeyboardDiagram;
use ui::components::level_list::LevelList;
use ui::components::progress_bar::ProgressBar;
use ui::components::quiz_view::{QuizView, ResultsPanel};
use ui::components::session_sidebar::SessionSidebar;
use ui::components::word_table::WordTable;
use ui::layout::{AppLayout, LayoutTier, PracticeLayout, PracticeShape, centered_rect, pack_hint_lines};
use ui::line_input::LineInput;
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "hanmadi",
    version,
    about = "Terminal Korean vocabulary trainer with a dubeolsik keyboard"
)]
struct Cli {
    #[arg(short, long, help = "Profile to sign in as")]
    user: Option<String>,

    #[arg(short, long, help = "Level to open after sign-in (e.g. 1A)")]
    level: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Seed for deck shuffles and quiz selection")]
    seed: Option<u64>,

    #[arg(short, long, help = "Storage backend (local, supabase)")]
    backend: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|err| {
        eprintln!("Ignoring unreadable config: {err:#}");
        Config::default()
    });
    if let Some(user) = cli.user {
        config.default_user = Some(user);
    }
    if let Some(level) = cli.level {
        config.default_level = Some(level);
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate(&Theme::available_themes());

    let _log_guard = logging::init_tracing(&config.log_level);
    tracing::info!(backend = %config.backend, theme = %config.theme, "starting hanmadi");

    let store = open_store(&config)?;
    let history_store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            tracing::warn!(error = %err, "practice history will not be saved");
            None
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Release events let the keyboard diagram show held keys
    let keyboard_enhanced = execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, store, history_store, events.sender());

    let result = run_app(&mut terminal, &mut app, &events);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "ui loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<Box<dyn VocabStore>> {
    match config.backend.as_str() {
        #[cfg(feature = "network")]
        "supabase" => {
            let remote = store::remote::SupabaseStore::new(store::remote::SupabaseConfig {
                supabase_url: config.supabase_url.clone(),
                supabase_anon_key: config.supabase_anon_key.clone(),
                access_token: config.supabase_access_token.clone(),
            })?;
            Ok(Box::new(remote))
        }
        #[cfg(not(feature = "network"))]
        "supabase" => anyhow::bail!("this build has no network support; use --backend local"),
        _ => Ok(Box::new(JsonStore::new()?)),
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
            AppEvent::Store(reply) => app.handle_store_reply(reply),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Map a key event to an answer-box keystroke. Latin letters go through
/// the dubeolsik table; jamo typed with an OS Korean input method pass
/// through unchanged.
fn keystroke_for(model: &KeyboardModel, key: &KeyEvent) -> Option<Keystroke> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('t') if ctrl => Some(Keystroke::ShiftToggle),
        _ if ctrl => None,
        KeyCode::Char(' ') => Some(Keystroke::Space),
        KeyCode::Char(ch) => model
            .jamo_for_latin(ch)
            .or_else(|| hangul::jamo::is_jamo(ch).then_some(ch))
            .map(Keystroke::Jamo),
        KeyCode::Enter => Some(Keystroke::Return),
        KeyCode::Backspace => Some(Keystroke::Backspace),
        _ => None,
    }
}

/// The key-diagram entry a key event lights up.
fn depressed_key_for(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(SHIFT),
        KeyCode::Char(' ') => Some(SPACE),
        KeyCode::Char(ch) => Some(ch.to_ascii_lowercase()),
        KeyCode::Enter => Some(ENTER),
        KeyCode::Backspace => Some(BACKSPACE),
        _ => None,
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.kind {
        KeyEventKind::Press => {
            if let Some(ch) = depressed_key_for(&key) {
                app.depressed_keys.insert(ch);
                app.last_key_time = Some(Instant::now());
            }
        }
        KeyEventKind::Release => {
            if let Some(ch) = depressed_key_for(&key) {
                app.depressed_keys.remove(&ch);
            }
            return;
        }
        KeyEventKind::Repeat => {}
    }

    // Only Press events: Repeat would flood the answer box
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match app.screen {
        AppScreen::Login => handle_login_key(app, key),
        AppScreen::Dashboard => handle_dashboard_key(app, key),
        AppScreen::LevelDetail => handle_level_key(app, key),
        AppScreen::Flashcards => handle_flashcard_key(app, key),
        AppScreen::Drill => handle_drill_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::QuizResult => handle_quiz_result_key(app, key),
        AppScreen::WordList => handle_word_list_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::Tab => app.go_to_settings(),
        KeyCode::Enter => app.submit_login(),
        _ => {
            app.login_input.handle(key);
            app.login_error = None;
        }
    }
}

fn handle_dashboard_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('o') => app.logout(),
        KeyCode::Char('c') => app.go_to_settings(),
        KeyCode::Char('r') => app.load_dashboard(),
        KeyCode::Up | KeyCode::Char('k') => app.level_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.level_next(),
        KeyCode::Enter | KeyCode::Char('l') => app.open_selected_level(),
        _ => {}
    }
}

fn handle_level_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('h') => app.go_to_dashboard(),
        KeyCode::Char('c') => app.go_to_settings(),
        KeyCode::Char('r') => app.load_level(),
        KeyCode::Up | KeyCode::Char('k') => app.level_action_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.level_action_next(),
        KeyCode::Enter => app.run_selected_action(),
        KeyCode::Char(ch) => {
            if let Some(action) = LevelAction::from_key(ch) {
                app.run_level_action(action);
            }
        }
        _ => {}
    }
}

fn handle_flashcard_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_to_level_detail(),
        KeyCode::Char(' ') | KeyCode::Enter => app.flashcard_flip(),
        KeyCode::Right | KeyCode::Char('k') => app.flashcard_know(),
        KeyCode::Left | KeyCode::Char('d') => app.flashcard_dont_know(),
        KeyCode::Char('s') => app.flashcard_toggle_side(),
        KeyCode::Char('r') => app.flashcard_reset(),
        KeyCode::Char('p') => app.flashcard_speak(),
        _ => {}
    }
}

fn handle_drill_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_to_level_detail(),
        KeyCode::Tab => app.drill_replay(),
        _ => {
            if let Some(stroke) = keystroke_for(&app.keyboard_model, &key) {
                app.drill_key(stroke);
            }
        }
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    let multiple_choice = app
        .quiz
        .as_ref()
        .and_then(|q| q.current())
        .is_some_and(|q| q.kind == MasteryKind::Meaning && !q.options.is_empty());

    match key.code {
        KeyCode::Esc => app.go_to_level_detail(),
        KeyCode::Tab => app.quiz_replay(),
        KeyCode::Up if multiple_choice => app.quiz_move_selection(-1),
        KeyCode::Down if multiple_choice => app.quiz_move_selection(1),
        KeyCode::Char(ch @ '1'..='9') if multiple_choice => {
            app.quiz_choose(ch as usize - '1' as usize);
        }
        _ => {
            if let Some(stroke) = keystroke_for(&app.keyboard_model, &key) {
                app.quiz_key(stroke);
            }
        }
    }
}

fn handle_quiz_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.start_quiz(),
        KeyCode::Char('d') => app.go_to_dashboard(),
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.go_to_level_detail(),
        _ => {}
    }
}

fn handle_word_list_key(app: &mut App, key: KeyEvent) {
    // Confirmation dialog takes priority
    if app.word_confirm_reset {
        match key.code {
            KeyCode::Char('y') => app.confirm_word_reset(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_word_reset(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_level_detail(),
        KeyCode::Up | KeyCode::Char('k') => app.word_list_move(-1),
        KeyCode::Down | KeyCode::Char('j') => app.word_list_move(1),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => app.word_list_page(-1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => app.word_list_page(1),
        KeyCode::Char('f') | KeyCode::Tab => app.word_list_cycle_filter(),
        KeyCode::Char('n') => app.word_list_cycle_page_size(),
        KeyCode::Char('p') => app.word_list_speak(),
        KeyCode::Char('x') | KeyCode::Delete => app.request_word_reset(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    if app.settings_edit.is_some() {
        app.settings_edit_key(key);
        return;
    }

    match key.code {
        KeyCode::Esc => app.leave_settings(),
        KeyCode::Up | KeyCode::Char('k') => app.settings_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_next(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Login => render_login(frame, app),
        AppScreen::Dashboard => render_dashboard(frame, app),
        AppScreen::LevelDetail => render_level_detail(frame, app),
        AppScreen::Flashcards => render_flashcards(frame, app),
        AppScreen::Drill => render_drill(frame, app),
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::QuizResult => render_quiz_result(frame, app),
        AppScreen::WordList => render_word_list(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, title: &str, info: &str) {
    let colors = &app.theme.colors;
    let user = app
        .session
        .as_ref()
        .map(|s| format!(" | {}", s.display_name))
        .unwrap_or_default();
    let sync = match app.pending_sync() {
        0 => String::new(),
        n => format!(" | {n} unsynced"),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{info}{user}{sync}"),
            Style::default().fg(colors.text_muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

/// Footer: the status message if one is showing, then key hints.
fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => colors.success(),
            StatusKind::Error => colors.error(),
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color),
        )));
    }
    let room = (area.height as usize).saturating_sub(lines.len());
    lines.extend(
        pack_hint_lines(hints, area.width as usize)
            .into_iter()
            .take(room)
            .map(|hint| Line::from(Span::styled(hint, Style::default().fg(colors.text_muted())))),
    );
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_login(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = centered_rect(50, 40, area);
    let block = Block::bordered()
        .title(" hanmadi 한마디 ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Sign in with a profile name",
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .render(layout[0], frame.buffer_mut());

    render_line_input(frame, app, &app.login_input, " Profile ", layout[1]);

    if let Some(err) = &app.login_error {
        Paragraph::new(Line::from(Span::styled(
            format!(" {err}"),
            Style::default().fg(colors.error()),
        )))
        .render(layout[2], frame.buffer_mut());
    }

    render_footer(
        frame,
        app,
        layout[4],
        &["[Enter] Sign in", "[Tab] Settings", "[ESC] Quit"],
    );
}

fn render_line_input(frame: &mut ratatui::Frame, app: &App, input: &LineInput, title: &str, area: Rect) {
    let colors = &app.theme.colors;
    let (before, cursor, after) = input.render_parts();
    let cursor_style = Style::default().fg(colors.bg()).bg(colors.fg());
    let cursor_span = match cursor {
        Some(ch) => Span::styled(ch.to_string(), cursor_style),
        None => Span::styled(" ", cursor_style),
    };
    let line = Line::from(vec![
        Span::styled(before.to_string(), Style::default().fg(colors.fg())),
        cursor_span,
        Span::styled(after.to_string(), Style::default().fg(colors.fg())),
    ]);
    Paragraph::new(line)
        .block(
            Block::bordered()
                .title(title.to_string())
                .border_style(Style::default().fg(colors.border_focused())),
        )
        .render(area, frame.buffer_mut());
}

fn render_dashboard(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let app_layout = AppLayout::new(area);

    let total = app
        .level_summaries
        .iter()
        .fold((0, 0), |(k, t), s| (k + s.progress.known, t + s.progress.total));
    render_header(
        frame,
        app,
        app_layout.header,
        "hanmadi",
        &format!("{}/{} words learned", total.0, total.1),
    );

    let list = LevelList::new(&app.level_summaries, app.level_selected, app.theme).loading(app.loading);
    frame.render_widget(list, app_layout.main);

    if let Some(sidebar) = app_layout.sidebar {
        render_recent_results(frame, app, sidebar);
    }

    render_footer(
        frame,
        app,
        app_layout.footer,
        &[
            "[j/k] Select",
            "[Enter] Open level",
            "[r] Reload",
            "[c] Settings",
            "[o] Sign out",
            "[q] Quit",
        ],
    );
}

fn render_recent_results(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let block = Block::bordered()
        .title(" Recent ")
        .border_style(Style::default().fg(colors.border()))
        .style(Style::default().bg(colors.bg()));

    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = if app.history.is_empty() {
        vec![Line::from(Span::styled(
            " No practice yet",
            Style::default().fg(colors.text_muted()),
        ))]
    } else {
        app.history
            .iter()
            .rev()
            .take(visible)
            .map(|r| {
                Line::from(vec![
                    Span::styled(
                        format!(" {:<3}", r.level),
                        Style::default().fg(colors.accent()),
                    ),
                    Span::styled(
                        format!("{:<10}", r.mode.to_string()),
                        Style::default().fg(colors.fg()),
                    ),
                    Span::styled(
                        format!("{:>4.0}%", r.accuracy() * 100.0),
                        Style::default().fg(colors.text_muted()),
                    ),
                ])
            })
            .collect()
    };
    Paragraph::new(lines).block(block).render(area, frame.buffer_mut());
}

fn render_level_detail(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);

    let level = app.current_level.as_deref().unwrap_or("?");
    let description = app
        .level_summary()
        .map(|s| s.description)
        .unwrap_or_default();
    render_header(frame, app, app_layout.header, &format!("Level {level}"), description);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(LevelAction::ALL.len() as u16 + 2),
        ])
        .split(app_layout.main);

    if let Some(summary) = app.level_summary() {
        frame.render_widget(ProgressBar::counts("Learned", summary.progress, app.theme), layout[0]);
    }
    frame.render_widget(
        ProgressBar::counts("Flashcards", app.flashcard_progress(), app.theme),
        layout[1],
    );
    frame.render_widget(
        ProgressBar::counts("Writing", app.mastery_progress(MasteryKind::Writing), app.theme),
        layout[2],
    );
    frame.render_widget(
        ProgressBar::counts("Listening", app.mastery_progress(MasteryKind::Listening), app.theme),
        layout[3],
    );

    let lines: Vec<Line> = LevelAction::ALL
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let is_selected = i == app.level_action_selected;
            let indicator = if is_selected { ">" } else { " " };
            let style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .bg(colors.accent_dim())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            Line::from(vec![
                Span::styled(format!(" {indicator} [{}] {:<12}", action.key(), action.label()), style),
                Span::styled(
                    format!(" {}", action.description()),
                    Style::default().fg(colors.text_muted()),
                ),
            ])
        })
        .collect();
    let title = if app.loading { " Practice (loading...) " } else { " Practice " };
    Paragraph::new(lines)
        .block(
            Block::bordered()
                .title(title)
                .border_style(Style::default().fg(colors.border())),
        )
        .render(layout[4], frame.buffer_mut());

    if let Some(sidebar) = app_layout.sidebar {
        frame.render_widget(
            ProgressBar::counts("Meaning", app.mastery_progress(MasteryKind::Meaning), app.theme),
            Rect::new(sidebar.x, sidebar.y, sidebar.width, sidebar.height.min(3)),
        );
    }

    render_footer(
        frame,
        app,
        app_layout.footer,
        &["[f/w/l/q/v] Start", "[Enter] Start selected", "[r] Reload", "[ESC] Levels"],
    );
}

fn render_flashcards(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let app_layout = AppLayout::new(area);
    let level = app.current_level.as_deref().unwrap_or("?");

    let Some(cards) = &app.flashcards else {
        return;
    };
    render_header(
        frame,
        app,
        app_layout.header,
        &format!("Flashcards {level}"),
        &format!("{} left", cards.remaining()),
    );

    let panes = PracticeLayout::new(app_layout.main, PracticeShape::Card, app_layout.tier, false);
    frame.render_widget(FlashcardView::new(cards, app.theme), panes.prompt);
    if let Some(progress) = panes.progress {
        frame.render_widget(
            ProgressBar::counts("Known", app.flashcard_progress(), app.theme),
            progress,
        );
    }

    if let Some(sidebar) = app_layout.sidebar {
        frame.render_widget(
            SessionSidebar::new(0, 0, app.theme).sync(app.pending_sync(), app.speaker.is_speaking()),
            sidebar,
        );
    }

    render_footer(
        frame,
        app,
        app_layout.footer,
        &[
            "[Space] Flip",
            "[→/k] Know",
            "[←/d] Don't know",
            "[s] Swap side",
            "[p] Speak",
            "[r] Reset",
            "[ESC] Back",
        ],
    );
}

fn render_drill(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);
    let level = app.current_level.as_deref().unwrap_or("?");

    let Some(drill) = &app.drill else {
        return;
    };
    let title = match drill.kind {
        DrillKind::Writing => format!("Writing {level}"),
        DrillKind::Listening => format!("Listening {level}"),
    };
    let counts = format!("{} correct | {} incorrect", drill.correct_count, drill.incorrect_count);
    render_header(frame, app, app_layout.header, &title, &counts);

    let panes = PracticeLayout::new(
        app_layout.main,
        PracticeShape::Typed,
        app_layout.tier,
        app.config.show_keyboard,
    );

    let prompt: Vec<Line> = match (drill.current_word(), drill.kind) {
        (None, _) => vec![
            Line::from(""),
            Line::from(Span::styled(
                "This level has no words yet.",
                Style::default().fg(colors.text_muted()),
            )),
        ],
        (Some(word), DrillKind::Writing) => vec![
            Line::from(Span::styled(
                "Write in Korean:",
                Style::default().fg(colors.text_muted()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                word.translation.clone(),
                Style::default().fg(colors.card_fg()).add_modifier(Modifier::BOLD),
            )),
        ],
        (Some(_), DrillKind::Listening) => vec![
            Line::from(Span::styled(
                "Listen and write what you hear",
                Style::default().fg(colors.text_muted()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                if app.speaker.is_speaking() { "♪ ♪ ♪" } else { "[Tab] replay" },
                Style::default().fg(colors.accent()),
            )),
        ],
    };
    Paragraph::new(prompt)
        .alignment(Alignment::Center)
        .block(
            Block::bordered()
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.card_bg())),
        )
        .wrap(Wrap { trim: true })
        .render(panes.prompt, frame.buffer_mut());

    if let Some(answer) = panes.answer {
        frame.render_widget(
            AnswerBox::new(&drill.input, drill.feedback.as_ref(), app.theme),
            answer,
        );
    }
    render_keyboard(frame, app, app_layout.tier, panes.keyboard);

    if let Some(sidebar) = app_layout.sidebar {
        frame.render_widget(
            SessionSidebar::new(drill.correct_count, drill.incorrect_count, app.theme)
                .sync(app.pending_sync(), app.speaker.is_speaking()),
            sidebar,
        );
    }

    let next_hint = match drill.feedback {
        Some(Feedback::Incorrect { .. }) => "[Enter] Next word",
        _ => "[Enter] Check",
    };
    render_footer(
        frame,
        app,
        app_layout.footer,
        &[next_hint, "[Ctrl+T] Shift", "[Tab] Replay", "[ESC] Back"],
    );
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let app_layout = AppLayout::new(area);
    let level = app.current_level.as_deref().unwrap_or("?");

    let Some(quiz) = &app.quiz else {
        return;
    };
    render_header(
        frame,
        app,
        app_layout.header,
        &format!("Quiz {level}"),
        &format!("{}%", quiz.progress_percent()),
    );

    let typed = quiz
        .current()
        .is_some_and(|q| q.kind != MasteryKind::Meaning || q.options.is_empty());
    let panes = PracticeLayout::new(
        app_layout.main,
        PracticeShape::Question { typed },
        app_layout.tier,
        app.config.show_keyboard,
    );

    frame.render_widget(QuizView::new(quiz, app.theme), panes.prompt);
    if let Some(progress) = panes.progress {
        frame.render_widget(
            ProgressBar::new(
                "Progress",
                f64::from(quiz.progress_percent()) / 100.0,
                app.theme,
            ),
            progress,
        );
    }
    render_keyboard(frame, app, app_layout.tier, panes.keyboard);

    if let Some(sidebar) = app_layout.sidebar {
        frame.render_widget(
            SessionSidebar::new(quiz.correct_count, quiz.incorrect_count, app.theme)
                .sync(app.pending_sync(), app.speaker.is_speaking()),
            sidebar,
        );
    }

    let hints: &[&str] = if typed {
        &["[Enter] Check / next", "[Ctrl+T] Shift", "[Tab] Replay", "[ESC] Quit quiz"]
    } else {
        &["[↑/↓] Choose", "[1-4] Answer", "[Enter] Check / next", "[ESC] Quit quiz"]
    };
    render_footer(frame, app, app_layout.footer, hints);
}

fn render_keyboard(frame: &mut ratatui::Frame, app: &App, tier: LayoutTier, area: Option<Rect>) {
    if let Some(area) = area {
        frame.render_widget(
            KeyboardDiagram::new(
                &app.keyboard_model,
                app.shift_latched(),
                &app.depressed_keys,
                app.theme,
            )
            .compact(tier.compact_keyboard()),
            area,
        );
    }
}

fn render_quiz_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let Some(result) = &app.last_result else {
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);
    let centered = centered_rect(60, 70, layout[0]);
    frame.render_widget(
        ResultsPanel::new(result, app.best_quiz_result(), app.theme),
        centered,
    );
    render_footer(
        frame,
        app,
        layout[1],
        &["[r] Retake", "[Enter] Level", "[d] Dashboard"],
    );
}

fn render_word_list(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let app_layout = AppLayout::new(area);
    let level = app.current_level.as_deref().unwrap_or("?");
    render_header(
        frame,
        app,
        app_layout.header,
        &format!("Words {level}"),
        &format!("{} per page", app.word_page_size),
    );

    let statuses = app.word_statuses();
    let page = engine::progress::paginate(&statuses, app.word_filter, app.word_page, app.word_page_size);
    let table = WordTable::new(
        &page,
        app.word_filter,
        app.word_selected,
        app.word_confirm_reset,
        app.theme,
    );
    frame.render_widget(table, app_layout.main);

    if let Some(sidebar) = app_layout.sidebar
        && let Some(word) = app.selected_word()
    {
        render_word_detail(frame, app, &word, sidebar);
    }

    render_footer(
        frame,
        app,
        app_layout.footer,
        &[
            "[j/k] Select",
            "[h/l] Page",
            "[f] Filter",
            "[n] Page size",
            "[p] Speak",
            "[x] Reset word",
            "[ESC] Back",
        ],
    );
}

fn render_word_detail(frame: &mut ratatui::Frame, app: &App, word: &store::schema::Word, area: Rect) {
    let colors = &app.theme.colors;
    let row = app.cache.as_ref().and_then(|c| c.row(&word.id));
    let flag = |kind: MasteryKind| {
        let set = row.is_some_and(|r| r.flag(kind));
        Line::from(vec![
            Span::styled(format!(" {:<10}", kind.label()), Style::default().fg(colors.text_muted())),
            Span::styled(
                if set { "✓" } else { "·" },
                Style::default().fg(if set { colors.success() } else { colors.text_muted() }),
            ),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", word.hangul),
            Style::default().fg(colors.card_fg()).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" {}", word.translation),
            Style::default().fg(colors.fg()),
        )),
        Line::from(""),
        flag(MasteryKind::Writing),
        flag(MasteryKind::Listening),
        flag(MasteryKind::Meaning),
    ];
    if let Some(context) = &word.example_context {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {context}"),
            Style::default().fg(colors.text_muted()),
        )));
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .title(" Word ")
                .border_style(Style::default().fg(colors.border())),
        )
        .render(area, frame.buffer_mut());
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = centered_rect(60, 80, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields = app.settings_fields();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    let header = Paragraph::new(Line::from(Span::styled(
        "  Use arrows to navigate, Enter/Right to change, ESC to save & exit",
        Style::default().fg(colors.text_muted()),
    )));
    header.render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(2)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let Some(&field_area) = field_layout.get(i) else {
            break;
        };
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if is_selected {
            colors.pressed_key()
        } else {
            colors.text_muted()
        });

        let value_line = match (&app.settings_edit, is_selected) {
            (Some((_, input)), true) => {
                let (before, cursor, after) = input.render_parts();
                Line::from(vec![
                    Span::styled(format!("     {before}"), value_style),
                    Span::styled(
                        cursor.map_or(" ".to_string(), |c| c.to_string()),
                        Style::default().fg(colors.bg()).bg(colors.fg()),
                    ),
                    Span::styled(after.to_string(), value_style),
                ])
            }
            _ => Line::from(Span::styled(format!("     < {value} >"), value_style)),
        };

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            value_line,
        ];
        Paragraph::new(lines).render(field_area, frame.buffer_mut());
    }

    let hints: &[&str] = if app.settings_edit.is_some() {
        &["[Enter] Apply", "[ESC] Cancel edit"]
    } else {
        &["[ESC] Save & back", "[Enter/arrows] Change value"]
    };
    render_footer(frame, app, layout[2], hints);
}
