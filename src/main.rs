pub mod ui;

use std::{
    error::Error,
    fs::{File, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use itertools::Itertools;
use rand::thread_rng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wordrush::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    history::{report_final_score, HistoryDb},
    runtime::{CrosstermEventSource, EventSource, FixedTicker, PlayEvent, Runner, Ticker},
    Action, GameKind, Outcome, Rules, Session, SessionEvent, SessionSummary, Vocabulary,
    WordrushError,
};

const RECENT_GAMES: usize = 5;

/// vocabulary mini-games in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Timed vocabulary mini-games: pick synonyms as they fly by, answer only on green, or swipe to the antonym."
)]
pub struct Cli {
    /// mini-game to play
    #[clap(short = 'g', long, value_enum)]
    game: Option<GameKind>,

    /// prompt word to practise (picked at random when omitted)
    #[clap(short = 'w', long)]
    word: Option<String>,

    /// JSON vocabulary file to use instead of the built-in lists
    #[clap(short = 'v', long)]
    vocab: Option<PathBuf>,

    /// number of lives to start with
    #[clap(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=3))]
    lives: Option<u8>,

    /// seed for dealing words, for a repeatable game
    #[clap(long)]
    seed: Option<u64>,

    /// print recent games and exit
    #[clap(long)]
    history: bool,
}

/// Effective settings: CLI flags layered over the saved config
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub game: GameKind,
    pub word: Option<String>,
    pub vocabulary_path: Option<PathBuf>,
    pub lives: u8,
    pub seed: Option<u64>,
    pub show_history: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            game: cli.game.unwrap_or(config.game),
            word: cli.word.clone(),
            vocabulary_path: cli.vocab.clone().or_else(|| config.vocabulary_path.clone()),
            lives: cli.lives.unwrap_or(config.lives),
            seed: cli.seed,
            show_history: config.show_history,
        }
    }

    fn rules(&self) -> Rules {
        Rules::for_game(self.game).with_lives(self.lives)
    }
}

impl From<&Settings> for Config {
    fn from(s: &Settings) -> Self {
        Self {
            game: s.game,
            vocabulary_path: s.vocabulary_path.clone(),
            lives: s.lives,
            show_history: s.show_history,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Playing,
    GameOver,
}

/// What the player picked last and how it went, shown during feedback
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub outcome: Outcome,
    pub chosen: Option<String>,
    pub correct_answer: String,
    pub score_delta: i32,
}

#[derive(Debug)]
enum ExitType {
    Restart,
    New,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub settings: Settings,
    pub vocabulary: Vocabulary,
    pub session: Session,
    pub state: AppState,
    pub feedback: Option<Feedback>,
    pub history: Option<HistoryDb>,
    pub recent: Vec<SessionSummary>,
    pub best_score: Option<u32>,
}

impl App {
    pub fn new(settings: Settings, history: Option<HistoryDb>) -> wordrush::Result<Self> {
        let rules = settings.rules();
        let vocabulary = Vocabulary::load(rules.association, settings.vocabulary_path.as_deref());
        let session = start_session(&settings, &vocabulary, settings.word.as_deref())?;

        let mut app = Self {
            settings,
            vocabulary,
            session,
            state: AppState::Playing,
            feedback: None,
            history,
            recent: Vec::new(),
            best_score: None,
        };
        app.refresh_history();
        Ok(app)
    }

    /// Start over, on the same prompt word when one is given
    pub fn reset(&mut self, word: Option<String>) -> wordrush::Result<()> {
        self.session.abandon();
        self.session = start_session(&self.settings, &self.vocabulary, word.as_deref())?;
        self.state = AppState::Playing;
        self.feedback = None;
        Ok(())
    }

    pub fn apply(&mut self, action: Action) {
        for event in self.session.update(action) {
            match event {
                SessionEvent::RoundResolved {
                    outcome,
                    correct_answer,
                    score_delta,
                    ..
                } => {
                    self.feedback = Some(Feedback {
                        outcome,
                        chosen: self.session.round().chosen.clone(),
                        correct_answer,
                        score_delta,
                    });
                }
                SessionEvent::RoundStarted { .. } => self.feedback = None,
                SessionEvent::GameOver(summary) => {
                    if let Some(db) = self.history.as_mut() {
                        report_final_score(db, &summary);
                    }
                    self.refresh_history();
                    self.state = AppState::GameOver;
                }
                _ => {}
            }
        }
    }

    fn on_tick(&mut self, secs: u32) {
        for _ in 0..secs {
            self.apply(Action::Tick);
        }
    }

    fn choose(&mut self, index: usize) {
        if let Some(word) = self.session.round().options.get(index).cloned() {
            self.apply(Action::Submit(word));
        }
    }

    fn refresh_history(&mut self) {
        let Some(db) = self.history.as_ref() else {
            return;
        };
        match (db.recent(RECENT_GAMES), db.best_score(self.settings.game)) {
            (Ok(recent), Ok(best)) => {
                self.recent = recent;
                self.best_score = best;
            }
            (Err(e), _) | (_, Err(e)) => warn!(error = %e, "could not read game history"),
        }
    }

    fn swiping(&self) -> bool {
        self.session.rules().kind == GameKind::SwipeMatch
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<ExitType> {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Some(ExitType::Quit);
        }

        match self.state {
            AppState::Playing => match key.code {
                KeyCode::Char('p') => {
                    let action = if self.session.is_paused() {
                        Action::Resume
                    } else {
                        Action::Pause
                    };
                    self.apply(action);
                }
                KeyCode::Char('f') => self.apply(Action::Freeze),
                KeyCode::Enter => self.apply(Action::Advance),
                KeyCode::Char(c @ '1'..='9') => {
                    self.choose(c as usize - '1' as usize);
                }
                KeyCode::Left if self.swiping() => self.choose(0),
                KeyCode::Right if self.swiping() => self.choose(1),
                _ => {}
            },
            AppState::GameOver => match key.code {
                KeyCode::Char('r') => return Some(ExitType::Restart),
                KeyCode::Char('n') => return Some(ExitType::New),
                _ => {}
            },
        }
        None
    }

    fn handle(&mut self, event: PlayEvent) -> Option<ExitType> {
        match event {
            PlayEvent::Tick(secs) => {
                self.on_tick(secs);
                None
            }
            PlayEvent::Resize => None,
            PlayEvent::Focus(false) => {
                self.apply(Action::Pause);
                None
            }
            PlayEvent::Focus(true) => None,
            PlayEvent::Key(key) => self.handle_key(key),
        }
    }
}

fn start_session(
    settings: &Settings,
    vocabulary: &Vocabulary,
    word: Option<&str>,
) -> wordrush::Result<Session> {
    let needed = settings.rules().distractors_per_round;
    let requested = word.and_then(|w| match vocabulary.pick(w) {
        Some(entry) if entry.incorrect.len() >= needed => Some(entry),
        Some(entry) => {
            warn!(
                word = w,
                needed,
                found = entry.incorrect.len(),
                "word has too few distractors for this game, picking one at random"
            );
            None
        }
        None => {
            warn!(word = w, vocabulary = %vocabulary.name, "word not in vocabulary, picking one at random");
            None
        }
    });
    let entry = match requested {
        Some(entry) => entry,
        None => vocabulary
            .random_entry(&mut thread_rng(), needed)
            .ok_or_else(|| WordrushError::EmptyVocabulary(vocabulary.name.clone()))?,
    };

    match settings.seed {
        Some(seed) => Session::with_seed(settings.rules(), entry, seed),
        None => Session::new(settings.rules(), entry),
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    if let Err(e) = install_subscriber(file) {
        eprintln!("wordrush: logging disabled: {e}");
    }
}

fn install_subscriber(file: File) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
}

fn print_history(db: &HistoryDb) -> wordrush::Result<()> {
    let recent = db.recent(20)?;
    if recent.is_empty() {
        println!("no games played yet");
        return Ok(());
    }

    let rows = recent
        .iter()
        .map(|s| {
            format!(
                "{}  {:<13} {:<10} score {:>4}  rounds {:>3}  accuracy {:>3}%  ({})",
                s.finished_at.format("%Y-%m-%d %H:%M"),
                s.game.to_string(),
                s.prompt,
                s.score,
                s.rounds_completed,
                s.accuracy(),
                s.end_reason,
            )
        })
        .join("\n");
    println!("{rows}");

    let games = recent.iter().map(|s| s.game).unique().collect::<Vec<_>>();
    for game in games {
        if let (Some(best), Some(average)) = (db.best_score(game)?, db.average_score(game)?) {
            println!("{:<13} best {best:>4}  average {average:>6.1}", game.to_string());
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let store = FileConfigStore::new();
    let settings = Settings::resolve(&cli, &store.load());
    if let Err(e) = store.save(&Config::from(&settings)) {
        warn!(error = %e, "could not save config");
    }

    let history = match HistoryDb::new() {
        Ok(db) => Some(db),
        Err(e) => {
            warn!(error = %e, "game history unavailable");
            None
        }
    };

    if cli.history {
        return match history {
            Some(db) => Ok(print_history(&db)?),
            None => Err("game history unavailable".into()),
        };
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(settings, history)?;
    info!(game = %app.settings.game, prompt = app.session.prompt(), "starting game");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let result = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        match app.handle(runner.step()) {
            Some(ExitType::Quit) => break,
            Some(ExitType::Restart) => {
                let word = app.session.prompt().to_string();
                app.reset(Some(word))?;
            }
            Some(ExitType::New) => app.reset(None)?,
            None => {}
        }
    }

    if app.session.abandon().is_some() {
        info!("game abandoned");
    }
    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
