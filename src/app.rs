use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::curriculum::{self, LEVELS};
use crate::engine::progress::{self, LevelProgress, LevelSummary, WordFilter, WordStatus};
use crate::engine::selector;
use crate::event::AppEvent;
use crate::keyboard::model::KeyboardModel;
use crate::session::drill::{DrillKind, DrillSession, Verdict};
use crate::session::flashcards::FlashcardSession;
use crate::session::input::Keystroke;
use crate::session::quiz::QuizSession;
use crate::session::result::{self, PracticeMode, PracticeResult};
use crate::speech::{Speaker, SpeechEvent};
use crate::store::VocabStore;
use crate::store::json_store::JsonStore;
use crate::store::schema::{HistoryData, MasteryKind, SCHEMA_VERSION, UserWordProgress, Word};
use crate::store::sync::ProgressCache;
use crate::store::worker::{StoreReply, StoreRequest, StoreWorker};
use crate::ui::line_input::{InputResult, LineInput, TextField};
use crate::ui::theme::Theme;
use crate::user::UserSession;

const STATUS_TTL: Duration = Duration::from_secs(4);
const KEY_HIGHLIGHT: Duration = Duration::from_millis(150);
pub const SETTINGS_FIELDS: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Login,
    Dashboard,
    LevelDetail,
    Flashcards,
    Drill,
    Quiz,
    QuizResult,
    WordList,
    Settings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelAction {
    Flashcards,
    Writing,
    Listening,
    Quiz,
    Words,
}

impl LevelAction {
    pub const ALL: [LevelAction; 5] = [
        Self::Flashcards,
        Self::Writing,
        Self::Listening,
        Self::Quiz,
        Self::Words,
    ];

    pub fn key(self) -> char {
        match self {
            Self::Flashcards => 'f',
            Self::Writing => 'w',
            Self::Listening => 'l',
            Self::Quiz => 'q',
            Self::Words => 'v',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Flashcards => "Flashcards",
            Self::Writing => "Writing",
            Self::Listening => "Listening",
            Self::Quiz => "Quiz",
            Self::Words => "Word list",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Flashcards => "Flip cards and sort them into known and unknown",
            Self::Writing => "See the meaning, type the Korean",
            Self::Listening => "Hear the word, type what you heard",
            Self::Quiz => "Mixed questions on everything not yet mastered",
            Self::Words => "Browse the level and reset words",
        }
    }

    pub fn from_key(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == ch)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub at: Instant,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub session: Option<UserSession>,
    pub cache: Option<ProgressCache>,
    worker: StoreWorker,
    next_request_id: u64,
    next_batch_floor: u64,
    pending_dashboard: Option<u64>,
    pending_level: Option<u64>,
    pending_start_level: Option<String>,
    pub loading: bool,
    pub all_words: Vec<Word>,
    level_words: HashMap<String, Vec<Word>>,
    pub level_summaries: Vec<LevelSummary>,
    pub level_selected: usize,
    pub current_level: Option<String>,
    pub level_action_selected: usize,
    pub flashcards: Option<FlashcardSession>,
    pub drill: Option<DrillSession>,
    pub quiz: Option<QuizSession>,
    pub last_result: Option<PracticeResult>,
    pub history: Vec<PracticeResult>,
    history_store: Option<JsonStore>,
    pub word_filter: WordFilter,
    pub word_page: usize,
    pub word_page_size: usize,
    pub word_selected: usize,
    pub word_confirm_reset: bool,
    pub settings_selected: usize,
    pub settings_edit: Option<(TextField, LineInput)>,
    settings_return: AppScreen,
    pub login_input: LineInput,
    pub login_error: Option<String>,
    pub speaker: Speaker,
    pub status: Option<StatusMessage>,
    pub depressed_keys: HashSet<char>,
    pub last_key_time: Option<Instant>,
    pub keyboard_model: KeyboardModel,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    /// `store` moves to the worker thread; its replies come back as
    /// `AppEvent::Store` on `events`.
    pub fn new(
        config: Config,
        store: Box<dyn VocabStore>,
        history_store: Option<JsonStore>,
        events: mpsc::Sender<AppEvent>,
    ) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let worker = StoreWorker::spawn(store, move |reply| {
            if events.send(AppEvent::Store(reply)).is_err() {
                tracing::debug!("ui gone; dropping store reply");
            }
        });

        let history = history_store
            .as_ref()
            .map(|s| s.load_history().results)
            .unwrap_or_default();

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let speaker = Speaker::new(config.speech());
        let login_input = LineInput::new(config.default_user.as_deref().unwrap_or("")).with_max_len(36);

        let mut app = Self {
            screen: AppScreen::Login,
            config,
            theme,
            session: None,
            cache: None,
            worker,
            next_request_id: 1,
            next_batch_floor: 1,
            pending_dashboard: None,
            pending_level: None,
            pending_start_level: None,
            loading: false,
            all_words: Vec::new(),
            level_words: HashMap::new(),
            level_summaries: Vec::new(),
            level_selected: 0,
            current_level: None,
            level_action_selected: 0,
            flashcards: None,
            drill: None,
            quiz: None,
            last_result: None,
            history,
            history_store,
            word_filter: WordFilter::All,
            word_page: 1,
            word_page_size: progress::PAGE_SIZES[1],
            word_selected: 0,
            word_confirm_reset: false,
            settings_selected: 0,
            settings_edit: None,
            settings_return: AppScreen::Login,
            login_input,
            login_error: None,
            speaker,
            status: None,
            depressed_keys: HashSet::new(),
            last_key_time: None,
            keyboard_model: KeyboardModel::dubeolsik(),
            should_quit: false,
            rng,
        };
        app.refresh_summaries();

        app.pending_start_level = app.config.default_level.clone();
        if let Some(name) = app.config.default_user.clone() {
            app.login(&name);
        }
        app
    }

    // --- session lifecycle ---

    pub fn submit_login(&mut self) {
        let name = self.login_input.value().to_string();
        self.login(&name);
    }

    pub fn login(&mut self, name: &str) {
        match UserSession::login(name) {
            Ok(session) => {
                let cache = ProgressCache::new(&session.user_id, self.config.sync_retry())
                    .with_first_batch(self.next_batch_floor);
                self.cache = Some(cache);
                self.session = Some(session);
                self.login_error = None;
                self.level_selected = 0;
                self.screen = AppScreen::Dashboard;
                self.load_dashboard();
            }
            Err(err) => {
                tracing::debug!(error = %err, "login rejected");
                self.login_error = Some(err.to_string());
            }
        }
    }

    /// Hand every unsynced write to the worker and drop the user's state.
    pub fn logout(&mut self) {
        self.leave_practice();
        self.flush_all();
        if let Some(session) = self.session.take() {
            tracing::info!(user_id = %session.user_id, "signed out");
        }
        self.all_words.clear();
        self.level_words.clear();
        self.current_level = None;
        self.pending_dashboard = None;
        self.pending_level = None;
        self.loading = false;
        self.refresh_summaries();
        self.login_input = LineInput::new("").with_max_len(36);
        self.screen = AppScreen::Login;
    }

    pub fn quit(&mut self) {
        self.leave_practice();
        self.flush_all();
        self.speaker.stop();
        self.should_quit = true;
    }

    fn flush_all(&mut self) {
        let Some(mut cache) = self.cache.take() else {
            return;
        };
        let rows = cache.take_unsynced();
        let batch_id = cache.next_batch_id();
        self.next_batch_floor = batch_id + 1;
        if !rows.is_empty() {
            tracing::info!(rows = rows.len(), "sending unsynced progress before sign-out");
            self.worker.send(StoreRequest::Upsert { batch_id, rows });
        }
    }

    // --- store plumbing ---

    fn next_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn load_dashboard(&mut self) {
        let Some(user_id) = self.session.as_ref().map(|s| s.user_id.clone()) else {
            return;
        };
        let request_id = self.next_request_id();
        self.pending_dashboard = Some(request_id);
        self.loading = true;
        self.worker.send(StoreRequest::LoadDashboard {
            request_id,
            user_id,
        });
    }

    pub fn load_level(&mut self) {
        let (Some(user_id), Some(level)) = (
            self.session.as_ref().map(|s| s.user_id.clone()),
            self.current_level.clone(),
        ) else {
            return;
        };
        let request_id = self.next_request_id();
        self.pending_level = Some(request_id);
        self.loading = true;
        self.worker.send(StoreRequest::LoadLevel {
            request_id,
            user_id,
            level,
        });
    }

    pub fn flush(&mut self) {
        self.flush_at(Instant::now());
    }

    /// Send queued progress writes, one batch at a time.
    fn flush_at(&mut self, now: Instant) {
        if let Some(cache) = self.cache.as_mut()
            && let Some((batch_id, rows)) = cache.begin_flush(now)
        {
            tracing::debug!(batch_id, rows = rows.len(), "flushing progress");
            self.worker.send(StoreRequest::Upsert { batch_id, rows });
        }
    }

    pub fn handle_store_reply(&mut self, reply: StoreReply) {
        match reply {
            StoreReply::Dashboard { request_id, result } => {
                if self.pending_dashboard != Some(request_id) {
                    tracing::debug!(request_id, "ignoring stale dashboard reply");
                    return;
                }
                self.pending_dashboard = None;
                self.loading = self.pending_level.is_some();
                match result {
                    Ok((words, rows)) => {
                        tracing::info!(words = words.len(), rows = rows.len(), "dashboard loaded");
                        self.all_words = words;
                        self.level_words.clear();
                        if let Some(cache) = self.cache.as_mut() {
                            cache.replace_rows(rows);
                        }
                        if let Some(level) = self.pending_start_level.take() {
                            self.open_level(&level);
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "failed to load dashboard");
                        self.set_error(format!("Could not load progress: {err}  [r] retry"));
                    }
                }
                self.refresh_summaries();
            }
            StoreReply::Level {
                request_id,
                level,
                result,
            } => {
                if self.pending_level != Some(request_id) {
                    tracing::debug!(request_id, %level, "ignoring stale level reply");
                    return;
                }
                self.pending_level = None;
                self.loading = self.pending_dashboard.is_some();
                match result {
                    Ok((words, rows)) => {
                        tracing::debug!(%level, words = words.len(), "level loaded");
                        self.level_words.insert(level, words);
                        if let Some(cache) = self.cache.as_mut() {
                            cache.replace_rows(rows);
                        }
                    }
                    Err(err) => {
                        tracing::error!(%level, error = %err, "failed to load level");
                        self.set_error(format!("Could not load level {level}: {err}  [r] retry"));
                    }
                }
                self.refresh_summaries();
            }
            StoreReply::Upserted { batch_id, result } => {
                let Some(cache) = self.cache.as_mut() else {
                    if let Err(err) = result {
                        tracing::error!(batch_id, error = %err, "final progress write failed");
                    }
                    return;
                };
                let failed = result.as_ref().err().cloned();
                cache.finish_flush(batch_id, result, Instant::now());
                if let Some(err) = failed {
                    let retry = self.config.sync_retry_secs;
                    self.set_error(format!("Saving progress failed ({err}); retrying in {retry}s"));
                }
                self.flush();
            }
        }
    }

    pub fn pending_sync(&self) -> usize {
        self.cache.as_ref().map_or(0, ProgressCache::pending_count)
    }

    fn rows(&self) -> Vec<UserWordProgress> {
        self.cache.as_ref().map(ProgressCache::rows).unwrap_or_default()
    }

    pub fn refresh_summaries(&mut self) {
        let rows = self.rows();
        self.level_summaries = progress::summarize_levels(&LEVELS, &self.all_words, &rows);
    }

    // --- levels ---

    pub fn words_for_level(&self, level: &str) -> Vec<Word> {
        match self.level_words.get(level) {
            Some(words) => words.clone(),
            None => self
                .all_words
                .iter()
                .filter(|w| w.level == level)
                .cloned()
                .collect(),
        }
    }

    pub fn current_level_words(&self) -> Vec<Word> {
        self.current_level
            .as_deref()
            .map(|level| self.words_for_level(level))
            .unwrap_or_default()
    }

    pub fn level_next(&mut self) {
        if !self.level_summaries.is_empty() {
            self.level_selected = (self.level_selected + 1) % self.level_summaries.len();
        }
    }

    pub fn level_prev(&mut self) {
        if !self.level_summaries.is_empty() {
            self.level_selected = self
                .level_selected
                .checked_sub(1)
                .unwrap_or(self.level_summaries.len() - 1);
        }
    }

    pub fn open_selected_level(&mut self) {
        if let Some(tag) = self.level_summaries.get(self.level_selected).map(|s| s.level) {
            self.open_level(tag);
        }
    }

    pub fn open_level(&mut self, level: &str) {
        let Some(info) = curriculum::find(level) else {
            self.set_error(format!("Unknown level {level}"));
            return;
        };
        if let Some(idx) = curriculum::position(info.tag) {
            self.level_selected = idx;
        }
        self.current_level = Some(info.tag.to_string());
        self.level_action_selected = 0;
        self.screen = AppScreen::LevelDetail;
        self.load_level();
    }

    pub fn level_summary(&self) -> Option<&LevelSummary> {
        let level = self.current_level.as_deref()?;
        self.level_summaries.iter().find(|s| s.level == level)
    }

    pub fn mastery_progress(&self, kind: MasteryKind) -> LevelProgress {
        progress::mastery_progress(&self.current_level_words(), &self.rows(), kind)
    }

    pub fn flashcard_progress(&self) -> LevelProgress {
        progress::flashcard_progress(&self.current_level_words(), &self.rows())
    }

    pub fn level_action_next(&mut self) {
        self.level_action_selected = (self.level_action_selected + 1) % LevelAction::ALL.len();
    }

    pub fn level_action_prev(&mut self) {
        self.level_action_selected = self
            .level_action_selected
            .checked_sub(1)
            .unwrap_or(LevelAction::ALL.len() - 1);
    }

    pub fn run_selected_action(&mut self) {
        let action = LevelAction::ALL[self.level_action_selected % LevelAction::ALL.len()];
        self.run_level_action(action);
    }

    pub fn run_level_action(&mut self, action: LevelAction) {
        match action {
            LevelAction::Flashcards => self.start_flashcards(),
            LevelAction::Writing => self.start_drill(DrillKind::Writing),
            LevelAction::Listening => self.start_drill(DrillKind::Listening),
            LevelAction::Quiz => self.start_quiz(),
            LevelAction::Words => self.open_word_list(),
        }
    }

    /// Close whatever practice is running and return to the level screen.
    pub fn go_to_level_detail(&mut self) {
        self.leave_practice();
        self.refresh_summaries();
        self.screen = AppScreen::LevelDetail;
    }

    pub fn go_to_dashboard(&mut self) {
        self.leave_practice();
        self.current_level = None;
        self.refresh_summaries();
        self.screen = AppScreen::Dashboard;
    }

    fn leave_practice(&mut self) {
        self.speaker.stop();
        if let Some(drill) = self.drill.take() {
            let answered = drill.correct_count + drill.incorrect_count;
            if answered > 0 {
                let mode = match drill.kind {
                    DrillKind::Writing => PracticeMode::Writing,
                    DrillKind::Listening => PracticeMode::Listening,
                };
                self.record_result(PracticeResult {
                    mode,
                    level: self.current_level.clone().unwrap_or_default(),
                    correct: drill.correct_count,
                    incorrect: drill.incorrect_count,
                    questions: answered,
                    timestamp: chrono::Utc::now(),
                });
            }
        }
        self.flashcards = None;
        self.quiz = None;
        self.word_confirm_reset = false;
    }

    fn record_result(&mut self, result: PracticeResult) {
        result::push_capped(&mut self.history, result);
        if let Some(store) = &self.history_store {
            let data = HistoryData {
                schema_version: SCHEMA_VERSION,
                results: self.history.clone(),
            };
            if let Err(err) = store.save_history(&data) {
                tracing::error!(error = %err, "failed to save practice history");
            }
        }
    }

    // --- flashcards ---

    pub fn start_flashcards(&mut self) {
        let words = self.current_level_words();
        let deck = selector::flashcard_deck(&words, &self.rows(), &mut self.rng);
        self.flashcards = Some(FlashcardSession::new(deck, self.config.hangul_first));
        self.screen = AppScreen::Flashcards;
    }

    pub fn flashcard_flip(&mut self) {
        if let Some(cards) = self.flashcards.as_mut() {
            cards.flip();
        }
    }

    pub fn flashcard_know(&mut self) {
        let Some(id) = self.flashcards.as_mut().and_then(FlashcardSession::know) else {
            return;
        };
        if let Some(cache) = self.cache.as_mut() {
            cache.set_visibility(&id, false);
        }
        self.flush();
    }

    pub fn flashcard_dont_know(&mut self) {
        let Some(id) = self.flashcards.as_mut().and_then(FlashcardSession::dont_know) else {
            return;
        };
        if let Some(cache) = self.cache.as_mut() {
            cache.set_visibility(&id, true);
        }
        self.flush();
    }

    pub fn flashcard_toggle_side(&mut self) {
        if let Some(cards) = self.flashcards.as_mut() {
            cards.toggle_hangul_first();
            self.config.hangul_first = cards.hangul_first;
        }
    }

    /// Make every word of the level visible again and reshuffle.
    pub fn flashcard_reset(&mut self) {
        let words = self.current_level_words();
        if let Some(cache) = self.cache.as_mut() {
            cache.reset_visibility(words.iter().map(|w| &w.id));
        }
        self.flush();
        let deck = selector::flashcard_deck(&words, &self.rows(), &mut self.rng);
        if let Some(cards) = self.flashcards.as_mut() {
            cards.reset(deck);
        }
        self.set_info("Flashcards reset");
    }

    pub fn flashcard_speak(&mut self) {
        let text = self
            .flashcards
            .as_ref()
            .and_then(|c| c.current())
            .map(|w| w.hangul.clone());
        if let Some(text) = text {
            self.speak(&text);
        }
    }

    // --- drills ---

    pub fn start_drill(&mut self, kind: DrillKind) {
        let words = self.current_level_words();
        self.drill = Some(DrillSession::new(kind, words, &mut self.rng));
        self.screen = AppScreen::Drill;
        self.announce_drill_word();
    }

    /// Listening drills read each new word out loud.
    fn announce_drill_word(&mut self) {
        let text = self
            .drill
            .as_ref()
            .filter(|d| d.kind == DrillKind::Listening)
            .and_then(|d| d.current_word())
            .map(|w| w.hangul.clone());
        if let Some(text) = text {
            self.speak(&text);
        }
    }

    pub fn drill_key(&mut self, key: Keystroke) {
        let now = Instant::now();
        let advance = self.config.drill_advance();
        let Some(drill) = self.drill.as_mut() else {
            return;
        };
        if drill.feedback.is_some() {
            if key == Keystroke::Return {
                self.drill_next();
            }
            return;
        }
        if let Some(verdict) = drill.keystroke(key, now, advance) {
            self.apply_verdict(verdict);
        }
    }

    pub fn drill_next(&mut self) {
        if let Some(drill) = self.drill.as_mut() {
            drill.next_word(&mut self.rng);
        }
        self.announce_drill_word();
    }

    pub fn drill_replay(&mut self) {
        let text = self
            .drill
            .as_ref()
            .and_then(|d| d.current_word())
            .map(|w| w.hangul.clone());
        if let Some(text) = text {
            self.speak(&text);
        }
    }

    /// Correct answers set the mastery flag right away and queue the write.
    fn apply_verdict(&mut self, verdict: Verdict) {
        if !verdict.correct {
            tracing::debug!(word = %verdict.word.hangul, kind = verdict.kind.label(), "incorrect answer");
            return;
        }
        let changed = self
            .cache
            .as_mut()
            .is_some_and(|cache| cache.mark_mastered(&verdict.word.id, verdict.kind));
        if changed {
            tracing::info!(word = %verdict.word.hangul, kind = verdict.kind.label(), "mastered");
            self.flush();
        }
        self.speak(&verdict.word.hangul);
    }

    // --- quiz ---

    pub fn start_quiz(&mut self) {
        let Some(level) = self.current_level.clone() else {
            return;
        };
        let words = self.current_level_words();
        let questions =
            selector::build_quiz(&words, &self.rows(), self.config.quiz_size, &mut self.rng);
        tracing::debug!(%level, questions = questions.len(), "quiz built");
        self.quiz = Some(QuizSession::new(&level, questions));
        self.screen = AppScreen::Quiz;
        self.after_quiz_advance();
    }

    pub fn quiz_key(&mut self, key: Keystroke) {
        let now = Instant::now();
        let advance = self.config.quiz_advance();
        let Some(quiz) = self.quiz.as_mut() else {
            return;
        };
        if quiz.feedback.is_some() {
            if key == Keystroke::Return {
                self.quiz_next();
            }
            return;
        }
        if let Some(verdict) = quiz.keystroke(key, now, advance) {
            self.apply_verdict(verdict);
        }
    }

    pub fn quiz_move_selection(&mut self, delta: isize) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.move_selection(delta);
        }
    }

    /// Pick a multiple-choice option by number and submit it.
    pub fn quiz_choose(&mut self, index: usize) {
        let now = Instant::now();
        let advance = self.config.quiz_advance();
        let Some(quiz) = self.quiz.as_mut() else {
            return;
        };
        let options = quiz.current().map_or(0, |q| q.options.len());
        if quiz.feedback.is_some() || index >= options {
            return;
        }
        quiz.selected_option = index;
        if let Some(verdict) = quiz.submit(now, advance) {
            self.apply_verdict(verdict);
        }
    }

    pub fn quiz_next(&mut self) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.next();
        }
        self.after_quiz_advance();
    }

    pub fn quiz_replay(&mut self) {
        let text = self
            .quiz
            .as_ref()
            .and_then(|q| q.current())
            .filter(|q| q.kind == MasteryKind::Listening)
            .map(|q| q.word.hangul.clone());
        if let Some(text) = text {
            self.speak(&text);
        }
    }

    fn after_quiz_advance(&mut self) {
        if self.quiz.as_ref().is_some_and(QuizSession::is_completed) {
            self.finish_quiz();
        } else {
            self.quiz_replay();
        }
    }

    fn finish_quiz(&mut self) {
        let Some(quiz) = self.quiz.take() else {
            return;
        };
        let result = quiz.result();
        tracing::info!(
            level = %result.level,
            correct = result.correct,
            incorrect = result.incorrect,
            "quiz finished"
        );
        if result.questions > 0 {
            self.record_result(result.clone());
        }
        self.last_result = Some(result);
        self.refresh_summaries();
        self.screen = AppScreen::QuizResult;
    }

    /// Best earlier quiz on the same level, for comparison on the results screen.
    pub fn best_quiz_result(&self) -> Option<&PracticeResult> {
        let level = self.last_result.as_ref()?.level.as_str();
        self.history
            .iter()
            .filter(|r| r.mode == PracticeMode::Quiz && r.level == level)
            .max_by(|a, b| a.accuracy().total_cmp(&b.accuracy()))
    }

    // --- word list ---

    pub fn open_word_list(&mut self) {
        self.word_filter = WordFilter::All;
        self.word_page = 1;
        self.word_selected = 0;
        self.word_confirm_reset = false;
        self.screen = AppScreen::WordList;
    }

    pub fn word_statuses(&self) -> Vec<WordStatus> {
        progress::word_statuses(&self.current_level_words(), &self.rows())
    }

    fn word_page_len(&self) -> (usize, usize) {
        let statuses = self.word_statuses();
        let page = progress::paginate(&statuses, self.word_filter, self.word_page, self.word_page_size);
        (page.items.len(), page.total_pages)
    }

    pub fn word_list_move(&mut self, delta: isize) {
        let (len, _) = self.word_page_len();
        if len == 0 {
            self.word_selected = 0;
            return;
        }
        self.word_selected = (self.word_selected as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    pub fn word_list_page(&mut self, delta: isize) {
        let (_, total_pages) = self.word_page_len();
        self.word_page = (self.word_page as isize + delta).clamp(1, total_pages as isize) as usize;
        self.word_selected = 0;
    }

    pub fn word_list_cycle_filter(&mut self) {
        self.word_filter = self.word_filter.next();
        self.word_page = 1;
        self.word_selected = 0;
    }

    pub fn word_list_cycle_page_size(&mut self) {
        let sizes = progress::PAGE_SIZES;
        let idx = sizes.iter().position(|&s| s == self.word_page_size).unwrap_or(0);
        self.word_page_size = sizes[(idx + 1) % sizes.len()];
        self.word_page = 1;
        self.word_selected = 0;
    }

    pub fn selected_word(&self) -> Option<Word> {
        let statuses = self.word_statuses();
        let page = progress::paginate(&statuses, self.word_filter, self.word_page, self.word_page_size);
        page.items.get(self.word_selected).map(|s| s.word.clone())
    }

    pub fn request_word_reset(&mut self) {
        self.word_confirm_reset = self.selected_word().is_some();
    }

    pub fn cancel_word_reset(&mut self) {
        self.word_confirm_reset = false;
    }

    /// Clear all three mastery flags of the selected word.
    pub fn confirm_word_reset(&mut self) {
        self.word_confirm_reset = false;
        let Some(word) = self.selected_word() else {
            return;
        };
        if let Some(cache) = self.cache.as_mut() {
            cache.reset_mastery(&word.id);
        }
        self.flush();
        self.refresh_summaries();
        self.word_list_move(0);
        self.set_info(format!("Reset progress for {}", word.hangul));
    }

    pub fn word_list_speak(&mut self) {
        if let Some(word) = self.selected_word() {
            self.speak(&word.hangul);
        }
    }

    // --- settings ---

    pub fn go_to_settings(&mut self) {
        if self.screen != AppScreen::Settings {
            self.settings_return = self.screen;
        }
        self.settings_selected = 0;
        self.settings_edit = None;
        self.screen = AppScreen::Settings;
    }

    pub fn leave_settings(&mut self) {
        self.settings_edit = None;
        self.save_config();
        self.speaker = Speaker::new(self.config.speech());
        self.screen = self.settings_return;
    }

    fn save_config(&mut self) {
        if let Err(err) = self.config.save() {
            tracing::error!(error = %err, "failed to save config");
            self.set_error(format!("Could not save settings: {err}"));
        }
    }

    pub fn settings_fields(&self) -> Vec<(&'static str, String)> {
        let on_off = |b: bool| if b { "On" } else { "Off" }.to_string();
        let url = if self.config.supabase_url.is_empty() {
            "(not set)".to_string()
        } else {
            self.config.supabase_url.clone()
        };
        vec![
            ("Theme", self.config.theme.clone()),
            ("Quiz size", self.config.quiz_size.to_string()),
            ("Show Korean first", on_off(self.config.hangul_first)),
            ("On-screen keyboard", on_off(self.config.show_keyboard)),
            ("Speech", on_off(self.config.speech_enabled)),
            ("Speech command", self.config.speech_command.clone()),
            ("Supabase URL (restart)", url),
        ]
    }

    pub fn settings_next(&mut self) {
        self.settings_selected = (self.settings_selected + 1) % SETTINGS_FIELDS;
    }

    pub fn settings_prev(&mut self) {
        self.settings_selected = self
            .settings_selected
            .checked_sub(1)
            .unwrap_or(SETTINGS_FIELDS - 1);
    }

    pub fn settings_cycle_forward(&mut self) {
        self.settings_cycle(true);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.settings_cycle(false);
    }

    fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => {
                let themes = Theme::available_themes();
                if let Some(idx) = themes.iter().position(|t| *t == self.config.theme) {
                    let next = if forward {
                        (idx + 1) % themes.len()
                    } else {
                        idx.checked_sub(1).unwrap_or(themes.len() - 1)
                    };
                    self.config.theme = themes[next].clone();
                } else if let Some(first) = themes.first() {
                    self.config.theme = first.clone();
                }
                if let Some(new_theme) = Theme::load(&self.config.theme) {
                    let theme: &'static Theme = Box::leak(Box::new(new_theme));
                    self.theme = theme;
                }
            }
            1 => {
                if forward {
                    self.config.cycle_quiz_size();
                } else {
                    for _ in 1..crate::config::QUIZ_SIZES.len() {
                        self.config.cycle_quiz_size();
                    }
                }
            }
            2 => self.config.hangul_first = !self.config.hangul_first,
            3 => self.config.show_keyboard = !self.config.show_keyboard,
            4 => {
                self.config.speech_enabled = !self.config.speech_enabled;
                self.speaker.set_enabled(self.config.speech_enabled);
            }
            5 | 6 => self.settings_start_edit(),
            _ => {}
        }
    }

    pub fn settings_start_edit(&mut self) {
        self.settings_edit = match self.settings_selected {
            5 => Some((
                TextField::SpeechCommand,
                LineInput::new(&self.config.speech_command),
            )),
            6 => Some((
                TextField::SupabaseUrl,
                LineInput::new(&self.config.supabase_url),
            )),
            _ => None,
        };
    }

    pub fn settings_edit_key(&mut self, key: crossterm::event::KeyEvent) {
        let Some((field, input)) = self.settings_edit.as_mut() else {
            return;
        };
        match input.handle(key) {
            InputResult::Continue => {}
            InputResult::Cancel => self.settings_edit = None,
            InputResult::Submit => {
                let value = input.value().trim().to_string();
                match field {
                    TextField::SpeechCommand if !value.is_empty() => {
                        self.config.speech_command = value;
                    }
                    TextField::SpeechCommand => {}
                    TextField::SupabaseUrl => self.config.supabase_url = value,
                }
                self.settings_edit = None;
            }
        }
    }

    // --- speech, status, ticks ---

    pub fn speak(&mut self, text: &str) {
        if let Err(err) = self.speaker.speak(text) {
            tracing::warn!(error = %err, "speech failed to start");
            self.set_error(format!("Speech unavailable: {err}"));
        }
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind: StatusKind::Info,
            at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind: StatusKind::Error,
            at: Instant::now(),
        });
    }

    /// Periodic housekeeping: feedback auto-advance, speech completion,
    /// sync retries and expiring transient UI state.
    pub fn tick(&mut self, now: Instant) {
        if self.drill.as_mut().is_some_and(|d| d.tick(now, &mut self.rng)) {
            self.announce_drill_word();
        }
        if self.quiz.as_mut().is_some_and(|q| q.tick(now)) {
            self.after_quiz_advance();
        }

        // Playback problems after a successful start are logged only.
        match self.speaker.poll(now) {
            Some(SpeechEvent::Failed { text, error }) => {
                tracing::warn!(%text, %error, "speech failed");
            }
            Some(SpeechEvent::TimedOut { text }) => {
                tracing::warn!(%text, "speech cut off after timeout");
            }
            Some(SpeechEvent::Ended { text }) => tracing::debug!(%text, "speech ended"),
            None => {}
        }

        self.flush_at(now);

        if self
            .status
            .as_ref()
            .is_some_and(|s| now.duration_since(s.at) > STATUS_TTL)
        {
            self.status = None;
        }
        if self
            .last_key_time
            .is_some_and(|t| now.duration_since(t) > KEY_HIGHLIGHT)
        {
            self.depressed_keys.clear();
            self.last_key_time = None;
        }
    }

    pub fn shift_latched(&self) -> bool {
        match self.screen {
            AppScreen::Drill => self.drill.as_ref().is_some_and(|d| d.input.shift_latched),
            AppScreen::Quiz => self.quiz.as_ref().is_some_and(|q| q.input.shift_latched),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoreError, StoreResult};
    use std::sync::{Arc, Mutex};

    /// In-memory store whose writes can be made to fail.
    #[derive(Clone, Default)]
    struct MemoryStore {
        words: Vec<Word>,
        rows: Arc<Mutex<Vec<UserWordProgress>>>,
        fail_writes: Arc<Mutex<bool>>,
    }

    impl VocabStore for MemoryStore {
        fn fetch_words(&mut self, level: &str) -> StoreResult<Vec<Word>> {
            Ok(self.words.iter().filter(|w| w.level == level).cloned().collect())
        }

        fn fetch_all_words(&mut self) -> StoreResult<Vec<Word>> {
            Ok(self.words.clone())
        }

        fn fetch_progress(
            &mut self,
            user_id: &str,
            word_ids: Option<&[crate::store::schema::WordId]>,
        ) -> StoreResult<Vec<UserWordProgress>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.user_id == user_id)
                .filter(|r| word_ids.is_none_or(|ids| ids.contains(&r.word_id)))
                .cloned()
                .collect())
        }

        fn upsert_progress(&mut self, rows: &[UserWordProgress]) -> StoreResult<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(StoreError::Status {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            let mut stored = self.rows.lock().unwrap();
            for row in rows {
                stored.retain(|r| !(r.user_id == row.user_id && r.word_id == row.word_id));
                stored.push(row.clone());
            }
            Ok(())
        }
    }

    fn word(n: u32, hangul: &str, translation: &str) -> Word {
        Word {
            id: crate::store::schema::WordId::new(format!("00000000-0000-4000-8000-{n:012}")),
            hangul: hangul.into(),
            translation: translation.into(),
            level: "1A".into(),
            unit: 1,
            example_context: None,
            example_context_translation: None,
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.speech_enabled = false;
        config.seed = Some(7);
        config.drill_advance_ms = 0;
        config
    }

    fn app_with(store: MemoryStore) -> (App, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let app = App::new(test_config(), Box::new(store), None, tx);
        (app, rx)
    }

    /// Deliver store replies until none arrive for a short while.
    fn pump(app: &mut App, rx: &mpsc::Receiver<AppEvent>) {
        while let Ok(event) = rx.recv_timeout(Duration::from_millis(200)) {
            if let AppEvent::Store(reply) = event {
                app.handle_store_reply(reply);
            }
        }
    }

    fn type_answer(app: &mut App, jamo: &str) {
        for ch in jamo.chars() {
            app.drill_key(Keystroke::Jamo(ch));
        }
        app.drill_key(Keystroke::Return);
    }

    #[test]
    fn test_login_loads_dashboard() {
        let store = MemoryStore {
            words: vec![word(1, "물", "water"), word(2, "불", "fire")],
            ..Default::default()
        };
        let (mut app, rx) = app_with(store);
        app.login("Mina");
        assert_eq!(app.screen, AppScreen::Dashboard);
        assert!(app.loading);
        pump(&mut app, &rx);
        assert!(!app.loading);
        assert_eq!(app.level_summaries.len(), 12);
        assert_eq!(app.level_summaries[0].progress.to_string(), "0/2");
    }

    #[test]
    fn test_invalid_login_stays_on_login() {
        let (mut app, _rx) = app_with(MemoryStore::default());
        app.login("   ");
        assert_eq!(app.screen, AppScreen::Login);
        assert!(app.login_error.is_some());
        assert!(app.session.is_none());
    }

    #[test]
    fn test_correct_writing_answer_is_persisted() {
        let store = MemoryStore {
            words: vec![word(1, "물", "water")],
            ..Default::default()
        };
        let rows = store.rows.clone();
        let (mut app, rx) = app_with(store);
        app.login("mina");
        pump(&mut app, &rx);
        app.open_level("1a");
        pump(&mut app, &rx);
        assert_eq!(app.current_level.as_deref(), Some("1A"));

        app.start_drill(DrillKind::Writing);
        type_answer(&mut app, "ㅁㅜㄹ");
        assert!(app.cache.as_ref().unwrap().row(&word(1, "", "").id).unwrap().writing);
        pump(&mut app, &rx);
        assert_eq!(app.pending_sync(), 0);
        let stored = rows.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].writing && !stored[0].meaning);
    }

    #[test]
    fn test_failed_write_keeps_local_progress_and_retries() {
        let store = MemoryStore {
            words: vec![word(1, "물", "water")],
            ..Default::default()
        };
        let rows = store.rows.clone();
        let fail = store.fail_writes.clone();
        let (mut app, rx) = app_with(store);
        app.login("mina");
        pump(&mut app, &rx);
        app.open_level("1A");
        pump(&mut app, &rx);

        *fail.lock().unwrap() = true;
        app.start_drill(DrillKind::Listening);
        type_answer(&mut app, "ㅁㅜㄹ");
        pump(&mut app, &rx);
        assert_eq!(app.pending_sync(), 1);
        assert!(rows.lock().unwrap().is_empty());
        assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Error));
        assert_eq!(app.mastery_progress(MasteryKind::Listening).known, 1);

        *fail.lock().unwrap() = false;
        let later = Instant::now() + Duration::from_secs(60);
        app.tick(later);
        pump(&mut app, &rx);
        assert_eq!(app.pending_sync(), 0);
        assert_eq!(rows.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_flashcard_know_then_reset() {
        let store = MemoryStore {
            words: vec![word(1, "물", "water"), word(2, "불", "fire")],
            ..Default::default()
        };
        let (mut app, rx) = app_with(store);
        app.login("mina");
        pump(&mut app, &rx);
        app.open_level("1A");
        app.start_flashcards();
        app.flashcard_know();
        app.flashcard_know();
        assert!(app.flashcards.as_ref().unwrap().is_finished());
        assert_eq!(app.flashcard_progress().to_string(), "2/2");

        app.flashcard_reset();
        assert_eq!(app.flashcards.as_ref().unwrap().remaining(), 2);
        assert_eq!(app.flashcard_progress().known, 0);
        pump(&mut app, &rx);
    }

    #[test]
    fn test_quiz_with_nothing_to_ask_goes_to_results() {
        let learned = word(1, "물", "water");
        let mut row = UserWordProgress::new("mina", learned.id.clone());
        row.writing = true;
        row.listening = true;
        row.meaning = true;
        let store = MemoryStore {
            words: vec![learned],
            rows: Arc::new(Mutex::new(vec![row])),
            ..Default::default()
        };
        let (mut app, rx) = app_with(store);
        app.login("mina");
        pump(&mut app, &rx);
        app.open_level("1A");
        pump(&mut app, &rx);
        app.start_quiz();
        assert_eq!(app.screen, AppScreen::QuizResult);
        assert_eq!(app.last_result.as_ref().unwrap().questions, 0);
    }

    #[test]
    fn test_word_reset_clears_mastery() {
        let w = word(1, "물", "water");
        let mut row = UserWordProgress::new("mina", w.id.clone());
        row.writing = true;
        row.listening = true;
        row.meaning = true;
        let store = MemoryStore {
            words: vec![w],
            rows: Arc::new(Mutex::new(vec![row])),
            ..Default::default()
        };
        let (mut app, rx) = app_with(store);
        app.login("mina");
        pump(&mut app, &rx);
        app.open_level("1A");
        pump(&mut app, &rx);
        assert_eq!(app.level_summary().unwrap().progress.to_string(), "1/1");

        app.open_word_list();
        app.request_word_reset();
        assert!(app.word_confirm_reset);
        app.confirm_word_reset();
        assert_eq!(app.level_summary().unwrap().progress.to_string(), "0/1");
        pump(&mut app, &rx);
        assert_eq!(app.pending_sync(), 0);
    }

    #[test]
    fn test_logout_hands_off_unsynced_rows() {
        let store = MemoryStore {
            words: vec![word(1, "물", "water")],
            ..Default::default()
        };
        let rows = store.rows.clone();
        let fail = store.fail_writes.clone();
        let (mut app, rx) = app_with(store);
        app.login("mina");
        pump(&mut app, &rx);
        app.open_level("1A");
        pump(&mut app, &rx);

        *fail.lock().unwrap() = true;
        app.start_drill(DrillKind::Writing);
        type_answer(&mut app, "ㅁㅜㄹ");
        pump(&mut app, &rx);
        assert_eq!(app.pending_sync(), 1);

        *fail.lock().unwrap() = false;
        app.logout();
        assert_eq!(app.screen, AppScreen::Login);
        assert!(app.cache.is_none());
        pump(&mut app, &rx);
        assert_eq!(rows.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_shift_latch_follows_the_active_drill() {
        let store = MemoryStore {
            words: vec![word(1, "쓰다", "to write")],
            ..Default::default()
        };
        let (mut app, rx) = app_with(store);
        app.login("mina");
        pump(&mut app, &rx);
        app.open_level("1A");
        pump(&mut app, &rx);
        assert!(!app.shift_latched());

        app.start_drill(DrillKind::Writing);
        app.drill_key(Keystroke::ShiftToggle);
        assert!(app.shift_latched());
        app.drill_key(Keystroke::Jamo('ㅅ'));
        assert!(!app.shift_latched());
        assert_eq!(app.drill.as_ref().unwrap().input.text(), "ㅆ");

        app.drill_key(Keystroke::ShiftToggle);
        app.go_to_level_detail();
        assert!(!app.shift_latched());
    }

    fn speaking_app(command: &str) -> App {
        let mut config = test_config();
        config.speech_enabled = true;
        config.speech_command = command.to_string();
        let (tx, _rx) = mpsc::channel();
        App::new(config, Box::new(MemoryStore::default()), None, tx)
    }

    #[test]
    fn test_speech_exit_failure_is_not_shown() {
        let mut app = speaking_app("false");
        app.speak("물");
        assert!(app.speaker.is_speaking());
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.speaker.is_speaking() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            app.tick(Instant::now());
        }
        assert!(!app.speaker.is_speaking());
        assert!(app.status.is_none());
    }

    #[test]
    fn test_missing_speech_command_is_shown() {
        let mut app = speaking_app("hanmadi-no-such-tts-binary");
        app.speak("물");
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.starts_with("Speech unavailable"));
    }

    #[test]
    fn test_level_action_keys() {
        assert_eq!(LevelAction::from_key('q'), Some(LevelAction::Quiz));
        assert_eq!(LevelAction::from_key('v'), Some(LevelAction::Words));
        assert_eq!(LevelAction::from_key('z'), None);
    }
}
