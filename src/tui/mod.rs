//! TUI module - Terminal front end with ratatui

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};
use std::io::{stdout, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::db::{KeyValueStore, StorageError};
use crate::exercises::{Catalog, Category, CategoryFilter, Exercise};
use crate::images::{ImageHandle, ImageProbe, Recovery, Resolver, recover};
use crate::store::{Committed, MAX_NAME_LEN, SaveOutcome, Workout, WorkoutId, WorkoutStore};
use crate::timer::{RestTimer, TICK, TimerEvent, TimerStatus};
use crate::training::{QuickStart, TrainingSession, quick_start};

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Create,
    Workouts,
    Train,
    Favorites,
}

impl Screen {
    fn all() -> [Screen; 5] {
        [Screen::Home, Screen::Create, Screen::Workouts, Screen::Train, Screen::Favorites]
    }

    fn key(&self) -> char {
        match self {
            Screen::Home => 'h',
            Screen::Create => '1',
            Screen::Workouts => '2',
            Screen::Train => '3',
            Screen::Favorites => '4',
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Screen::Home => "Início",
            Screen::Create => "Criar",
            Screen::Workouts => "Meus Treinos",
            Screen::Train => "Treinar",
            Screen::Favorites => "Favoritos",
        }
    }
}

/// Pending input or confirmation; it owns the keyboard until answered
#[derive(Debug, Clone, PartialEq)]
enum Prompt {
    Name(String),
    ConfirmReplace(String),
    ConfirmDelete(WorkoutId),
    ConfirmClearFavorites,
    /// Drop the draft, then start editing `edit` if set
    ConfirmDiscard { edit: Option<WorkoutId> },
}

/// What the Train screen shows in place of the exercise image
#[derive(Debug, Clone, PartialEq, Eq)]
enum ImageStatus {
    Checking,
    Ready(String),
    /// Nothing loaded; the image is hidden behind this label
    Placeholder(String),
}

/// Image of the exercise under the training cursor
#[derive(Debug)]
struct ExerciseImage {
    seq: u64,
    handle: ImageHandle,
    status: ImageStatus,
}

#[derive(Debug)]
struct ImageUpdate {
    seq: u64,
    handle: ImageHandle,
    status: ImageStatus,
}

/// App state for TUI
pub struct App<S: KeyValueStore> {
    store: WorkoutStore<S>,
    catalog: Catalog,
    resolver: Resolver,
    probe: Arc<dyn ImageProbe>,
    retry_delay: Duration,
    screen: Screen,
    filter: CategoryFilter,
    catalog_cursor: usize,
    list_cursor: usize,
    prompt: Option<Prompt>,
    session: Option<TrainingSession>,
    image: Option<ExerciseImage>,
    image_seq: u64,
    image_task: Option<JoinHandle<()>>,
    image_tx: mpsc::UnboundedSender<ImageUpdate>,
    image_rx: mpsc::UnboundedReceiver<ImageUpdate>,
    timer: RestTimer,
    last_tick: Instant,
    message: Option<String>,
    should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: WorkoutStore<S>, catalog: Catalog, config: &Config) -> Self {
        let (image_tx, image_rx) = mpsc::unbounded_channel();
        Self {
            store,
            catalog,
            resolver: config.resolver(),
            probe: Arc::new(config.probe()),
            retry_delay: config.retry_delay,
            screen: Screen::Home,
            filter: CategoryFilter::All,
            catalog_cursor: 0,
            list_cursor: 0,
            prompt: None,
            session: None,
            image: None,
            image_seq: 0,
            image_task: None,
            image_tx,
            image_rx,
            timer: RestTimer::new(),
            last_tick: Instant::now(),
            message: None,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
            self.tick_timer();
            self.poll_images();
        }

        restore_terminal()?;
        Ok(())
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.handle_key(key.code);
        }
        Ok(())
    }

    fn tick_timer(&mut self) {
        if !self.timer.is_active() || self.last_tick.elapsed() < TICK {
            return;
        }
        self.last_tick = Instant::now();
        if let Some(TimerEvent::Finished) = self.timer.tick() {
            self.message = Some("Descanso concluído! Continue treinando.".to_string());
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        if let Some(prompt) = self.prompt.take() {
            self.handle_prompt(prompt, code);
            return;
        }

        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('h') => self.open_screen(Screen::Home),
            KeyCode::Char('1') => self.open_create(),
            KeyCode::Char('2') => self.open_screen(Screen::Workouts),
            KeyCode::Char('3') => self.open_train(),
            KeyCode::Char('4') => self.open_screen(Screen::Favorites),
            KeyCode::Char('g') => match quick_start(&self.store) {
                QuickStart::Train(_) => self.open_train(),
                QuickStart::ChooseWorkout => self.open_screen(Screen::Workouts),
            },
            _ => match self.screen {
                Screen::Home => self.home_key(code),
                Screen::Create => self.create_key(code),
                Screen::Workouts => self.workouts_key(code),
                Screen::Train => self.train_key(code),
                Screen::Favorites => self.favorites_key(code),
            },
        }
    }

    fn open_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.list_cursor = 0;
    }

    fn open_create(&mut self) {
        if !self.store.is_composing() {
            self.store.begin_create();
        }
        self.screen = Screen::Create;
    }

    fn open_train(&mut self) {
        let current_id = self.store.current().map(|w| w.id.clone());
        let stale = match (&self.session, &current_id) {
            (Some(session), Some(id)) => &session.workout().id != id,
            _ => true,
        };
        if stale {
            match TrainingSession::begin(&mut self.store) {
                Some(committed) => {
                    let Committed { value, storage_error } = committed;
                    self.session = Some(value);
                    self.report(None, storage_error);
                    self.exercise_changed();
                }
                None => {
                    self.message = Some("Nenhum treino disponível. Crie um primeiro!".to_string());
                    self.open_create();
                    return;
                }
            }
        }
        self.screen = Screen::Train;
    }

    fn start_training(&mut self, workout: Workout) {
        self.session = Some(TrainingSession::new(workout));
        self.exercise_changed();
        self.screen = Screen::Train;
    }

    fn end_training(&mut self) {
        self.session = None;
        self.exercise_changed();
    }

    /// The exercise under the training cursor changed
    fn exercise_changed(&mut self) {
        if let Some(exercise) = self.session.as_ref().and_then(|s| s.current()) {
            self.timer.prepare(exercise.rest_seconds);
        }
        self.show_image();
    }

    /// Resolve the current exercise image and check it in the background,
    /// walking the fallbacks when it doesn't load
    fn show_image(&mut self) {
        if let Some(task) = self.image_task.take() {
            task.abort();
        }
        let Some(raw) = self.session.as_ref().and_then(|s| s.current()).map(|e| e.image_ref.clone()) else {
            self.image = None;
            return;
        };

        self.image_seq += 1;
        let seq = self.image_seq;
        let src = self.resolver.resolve(Some(raw.as_str()));
        let handle = ImageHandle::new(src.clone());

        // nowhere to probe from; show the path as resolved
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.image = Some(ExerciseImage { seq, handle, status: ImageStatus::Ready(src) });
            return;
        };

        self.image = Some(ExerciseImage {
            seq,
            handle: handle.clone(),
            status: ImageStatus::Checking,
        });
        let probe = Arc::clone(&self.probe);
        let resolver = self.resolver.clone();
        let retry_delay = self.retry_delay;
        let tx = self.image_tx.clone();
        self.image_task = Some(runtime.spawn(async move {
            let mut handle = handle;
            let status = if probe.probe(handle.src()).await {
                ImageStatus::Ready(handle.src().to_string())
            } else {
                match recover(&resolver, &mut handle, Some(raw.as_str()), probe.as_ref(), retry_delay).await {
                    Recovery::Recovered(found) => ImageStatus::Ready(found),
                    Recovery::Placeholder(label) => ImageStatus::Placeholder(label),
                    Recovery::Skipped => ImageStatus::Ready(handle.src().to_string()),
                }
            };
            // receiver only goes away with the app
            let _ = tx.send(ImageUpdate { seq, handle, status });
        }));
    }

    /// Apply finished image checks; results for exercises no longer shown are dropped
    fn poll_images(&mut self) {
        while let Ok(update) = self.image_rx.try_recv() {
            if let Some(image) = self.image.as_mut()
                && image.seq == update.seq
            {
                image.handle = update.handle;
                image.status = update.status;
            }
        }
    }

    /// Show `text`, with a storage warning when the write didn't reach storage
    fn report(&mut self, text: Option<String>, storage_error: Option<StorageError>) {
        self.message = match (text, storage_error) {
            (Some(text), None) => Some(text),
            (Some(text), Some(e)) => Some(format!("{} (armazenamento indisponível: {})", text, e)),
            (None, Some(e)) => Some(format!("Armazenamento indisponível: {}", e)),
            (None, None) => self.message.take(),
        };
    }

    fn load(&mut self, id: &WorkoutId) {
        match self.store.load_workout(id) {
            Ok(committed) => {
                let Committed { value, storage_error } = committed;
                self.report(Some(format!("Treino \"{}\" carregado!", value.name)), storage_error);
                self.start_training(value);
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    // --- Home ---

    fn home_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.list_cursor = self.list_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.list_cursor + 1 < self.store.recent().len() {
                    self.list_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.store.recent().get(self.list_cursor).map(|w| w.id.clone()) {
                    self.load(&id);
                }
            }
            _ => {}
        }
    }

    // --- Create ---

    fn visible_exercises(&self) -> Vec<&Exercise> {
        self.catalog.filter(self.filter)
    }

    fn cycle_filter(&mut self, forward: bool) {
        let mut filters = vec![CategoryFilter::All];
        filters.extend(Category::all().iter().map(|c| CategoryFilter::Only(*c)));
        let pos = filters.iter().position(|f| *f == self.filter).unwrap_or(0);
        let len = filters.len();
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        self.filter = filters[next];
        self.catalog_cursor = 0;
    }

    fn create_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.catalog_cursor = self.catalog_cursor.saturating_sub(1),
            KeyCode::Down => {
                let len = self.visible_exercises().len();
                if self.catalog_cursor + 1 < len {
                    self.catalog_cursor += 1;
                }
            }
            KeyCode::Left => self.cycle_filter(false),
            KeyCode::Right => self.cycle_filter(true),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let exercise = self.visible_exercises().get(self.catalog_cursor).map(|e| (*e).clone());
                if let Some(exercise) = exercise {
                    self.store.toggle_selection(&exercise);
                }
            }
            KeyCode::Char('x') => {
                let len = self.store.draft().map_or(0, |d| d.selection.len());
                if len > 0 {
                    self.store.remove_selected(len - 1);
                }
            }
            KeyCode::Char('n') => {
                let name = self.store.draft().map(|d| d.name.clone()).unwrap_or_default();
                self.prompt = Some(Prompt::Name(name));
            }
            KeyCode::Esc | KeyCode::Char('c') => {
                if self.has_unsaved_selection() {
                    self.prompt = Some(Prompt::ConfirmDiscard { edit: None });
                } else {
                    self.store.cancel_edit();
                    self.open_screen(Screen::Workouts);
                }
            }
            _ => {}
        }
    }

    fn has_unsaved_selection(&self) -> bool {
        self.store.draft().is_some_and(|d| !d.selection.is_empty())
    }

    fn save(&mut self, name: String) {
        self.store.set_pending_name(&name);
        match self.store.save_workout(&name) {
            Ok(SaveOutcome::Saved(committed)) => self.after_save(committed),
            Ok(SaveOutcome::NameConflict { name, .. }) => {
                self.message = Some(format!("Já existe um treino chamado \"{}\". Substituir? (y/n)", name));
                self.prompt = Some(Prompt::ConfirmReplace(name));
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn after_save(&mut self, committed: Committed<Workout>) {
        let Committed { value, storage_error } = committed;
        self.report(Some(format!("Treino \"{}\" salvo!", value.name)), storage_error);
        self.start_training(value);
    }

    // --- Workouts ---

    fn selected_workout_id(&self) -> Option<WorkoutId> {
        self.store.workouts().get(self.list_cursor).map(|w| w.id.clone())
    }

    fn workouts_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.list_cursor = self.list_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.list_cursor + 1 < self.store.workouts().len() {
                    self.list_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_workout_id() {
                    self.load(&id);
                }
            }
            KeyCode::Char('e') => {
                let Some(id) = self.selected_workout_id() else { return };
                let resuming = self.store.draft().and_then(|d| d.editing.as_ref()) == Some(&id);
                if resuming {
                    self.screen = Screen::Create;
                } else if self.has_unsaved_selection() {
                    self.prompt = Some(Prompt::ConfirmDiscard { edit: Some(id) });
                } else {
                    self.edit(&id);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_workout_id() {
                    self.prompt = Some(Prompt::ConfirmDelete(id));
                }
            }
            _ => {}
        }
    }

    fn edit(&mut self, id: &WorkoutId) {
        match self.store.begin_edit(id) {
            Ok(()) => {
                self.message = Some("Editando treino...".to_string());
                self.screen = Screen::Create;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    // --- Train ---

    fn train_key(&mut self, code: KeyCode) {
        let Some(session) = self.session.as_mut() else { return };
        let last = session.workout().exercises.len().saturating_sub(1);
        let moved = match code {
            KeyCode::Left => session.prev(),
            KeyCode::Right => session.next(),
            KeyCode::Home => session.jump(0),
            KeyCode::End => session.jump(last),
            KeyCode::Enter | KeyCode::Char('c') => {
                let Some(done) = session.complete(&mut self.store) else {
                    self.message = Some("Nenhum exercício para concluir!".to_string());
                    return;
                };
                let text = match done.rest_seconds {
                    Some(rest) => {
                        self.timer.start(rest);
                        self.last_tick = Instant::now();
                        self.show_image();
                        format!("{} concluído! Descanso de {}s iniciado", done.exercise.name, rest)
                    }
                    None => "Treino concluído! Parabéns!".to_string(),
                };
                self.report(Some(text), done.storage_error);
                false
            }
            KeyCode::Char('t') => {
                let Some(rest) = session.current().map(|e| e.rest_seconds) else { return };
                self.timer.start(rest);
                self.last_tick = Instant::now();
                self.message = Some(format!("Descanso de {}s iniciado", rest));
                false
            }
            KeyCode::Char('p') => {
                self.timer.toggle_pause();
                self.last_tick = Instant::now();
                false
            }
            KeyCode::Char('r') => {
                self.timer.reset();
                false
            }
            KeyCode::Char('s') => {
                self.timer.skip();
                self.message = Some("Descanso pulado!".to_string());
                false
            }
            _ => false,
        };
        if moved {
            self.exercise_changed();
        }
    }

    // --- Favorites ---

    fn favorites_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.list_cursor = self.list_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.list_cursor + 1 < self.store.favorites().len() {
                    self.list_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('a') => {
                let Some(exercise) = self.store.favorites().get(self.list_cursor).cloned() else {
                    return;
                };
                match self.store.select_favorite(&exercise.id) {
                    Some(true) => {
                        self.message = Some(format!("{} adicionado à seleção!", exercise.name));
                        self.screen = Screen::Create;
                    }
                    _ => self.message = Some("Exercício já está selecionado!".to_string()),
                }
            }
            KeyCode::Char('x') => {
                if !self.store.favorites().is_empty() {
                    self.prompt = Some(Prompt::ConfirmClearFavorites);
                }
            }
            _ => {}
        }
    }

    // --- Prompts ---

    fn handle_prompt(&mut self, prompt: Prompt, code: KeyCode) {
        match prompt {
            Prompt::Name(mut name) => match code {
                KeyCode::Enter => self.save(name),
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    name.pop();
                    self.prompt = Some(Prompt::Name(name));
                }
                KeyCode::Char(c) => {
                    if name.chars().count() < MAX_NAME_LEN {
                        name.push(c);
                    }
                    self.prompt = Some(Prompt::Name(name));
                }
                _ => self.prompt = Some(Prompt::Name(name)),
            },
            Prompt::ConfirmReplace(name) => {
                if code == KeyCode::Char('y') {
                    match self.store.confirm_replace(&name) {
                        Ok(committed) => self.after_save(committed),
                        Err(e) => self.message = Some(e.to_string()),
                    }
                } else {
                    self.message = None;
                }
            }
            Prompt::ConfirmDelete(id) => {
                if code == KeyCode::Char('y') {
                    let removed = self.store.delete_workout(&id);
                    if self.session.as_ref().is_some_and(|s| s.workout().id == id) {
                        self.end_training();
                    }
                    self.list_cursor = self.list_cursor.min(self.store.workouts().len().saturating_sub(1));
                    let text = removed.value.then(|| "Treino excluído!".to_string());
                    self.report(text, removed.storage_error);
                }
            }
            Prompt::ConfirmClearFavorites => {
                if code == KeyCode::Char('y') {
                    let cleared = self.store.clear_favorites();
                    self.list_cursor = 0;
                    self.report(Some("Favoritos limpos!".to_string()), cleared.storage_error);
                }
            }
            Prompt::ConfirmDiscard { edit } => {
                if code == KeyCode::Char('y') {
                    self.store.cancel_edit();
                    match edit {
                        Some(id) => self.edit(&id),
                        None => self.open_screen(Screen::Workouts),
                    }
                }
            }
        }
    }

    // --- Rendering ---

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let mut spans = vec![Span::styled("NextTreino ", Style::default().fg(Color::Cyan).bold())];
        for screen in Screen::all() {
            let label = format!(" {}:{} ", screen.key(), screen.title());
            let style = if screen == self.screen {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(label, style));
        }
        let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        match self.screen {
            Screen::Home => self.render_home(frame, chunks[1]),
            Screen::Create => self.render_create(frame, chunks[1]),
            Screen::Workouts => self.render_workouts(frame, chunks[1]),
            Screen::Train => self.render_train(frame, chunks[1]),
            Screen::Favorites => self.render_favorites(frame, chunks[1]),
        }

        // Footer
        let footer = Paragraph::new(self.footer_text())
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn footer_text(&self) -> String {
        match &self.prompt {
            Some(Prompt::Name(name)) => {
                return format!("Nome do treino: {}_  ({}/{})", name, name.chars().count(), MAX_NAME_LEN);
            }
            Some(Prompt::ConfirmReplace(name)) => return format!("Substituir \"{}\"? y/n", name),
            Some(Prompt::ConfirmDelete(_)) => return "Excluir este treino? y/n".to_string(),
            Some(Prompt::ConfirmClearFavorites) => return "Remover todos os favoritos? y/n".to_string(),
            Some(Prompt::ConfirmDiscard { .. }) => {
                return "Descartar a seleção atual? Ela será perdida. y/n".to_string();
            }
            None => {}
        }
        if let Some(message) = &self.message {
            return message.clone();
        }
        let keys = match self.screen {
            Screen::Home => "enter: treinar recente | g: início rápido",
            Screen::Create => "←/→: categoria | espaço: selecionar | x: remover | n: salvar | c: cancelar",
            Screen::Workouts => "enter: treinar | e: editar | d: excluir | g: início rápido",
            Screen::Train => {
                "←/→: exercício | home/end: primeiro/último | enter: concluir | t: descanso | p: pausa | r: reiniciar | s: pular"
            }
            Screen::Favorites => "a: adicionar à seleção | x: limpar",
        };
        format!("q: sair | {}", keys)
    }

    fn highlight(selected: bool) -> Style {
        if selected {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        }
    }

    fn render_home(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(5)])
            .split(area);

        let current = match self.store.current() {
            Some(w) => vec![
                Line::from(Span::styled(w.name.clone(), Style::default().bold())),
                Line::from(format!("{} exercícios | g: treinar", w.exercises.len())),
            ],
            None => vec![Line::from("Nenhum treino selecionado. Crie um treino em 1:Criar.")],
        };
        let card = Paragraph::new(current).block(Block::default().borders(Borders::ALL).title("Treino atual"));
        frame.render_widget(card, rows[0]);

        let recent: Vec<Row> = self
            .store
            .recent()
            .iter()
            .enumerate()
            .map(|(i, w)| {
                Row::new(vec![
                    Cell::from(w.name.clone()),
                    Cell::from(format!("{} exercícios", w.exercises.len())),
                    Cell::from(w.created_at.format("%d/%m/%Y").to_string()),
                ])
                .style(Self::highlight(i == self.list_cursor))
            })
            .collect();
        let table = Table::new(recent, [Constraint::Min(20), Constraint::Length(14), Constraint::Length(12)])
            .block(Block::default().borders(Borders::ALL).title("Treinos recentes"));
        frame.render_widget(table, rows[1]);
    }

    fn render_create(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let draft = self.store.draft();
        let rows: Vec<Row> = self
            .visible_exercises()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let mark = if draft.is_some_and(|d| d.is_selected(&e.id)) { "[x]" } else { "[ ]" };
                Row::new(vec![
                    Cell::from(mark),
                    Cell::from(e.name.clone()),
                    Cell::from(e.muscle_group.clone()),
                    Cell::from(e.sets_scheme.clone()),
                    Cell::from(e.rest_spec.clone()),
                ])
                .style(Self::highlight(i == self.catalog_cursor))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Length(18),
                Constraint::Length(8),
                Constraint::Length(7),
            ],
        )
        .header(Row::new(vec!["", "Exercício", "Músculo", "Séries", "Desc."]).style(Style::default().bold()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Exercícios - {}", self.filter.label())),
        );
        frame.render_widget(table, columns[0]);

        let selected: Vec<Line> = match draft {
            Some(d) if !d.selection.is_empty() => d
                .selection
                .iter()
                .map(|e| Line::from(format!("• {} ({} • {})", e.name, e.muscle_group, e.sets_scheme)))
                .collect(),
            _ => vec![Line::from("Selecione exercícios para criar seu treino")],
        };
        let count = draft.map_or(0, |d| d.selection.len());
        let title = match draft.and_then(|d| d.editing.as_ref()) {
            Some(_) => format!("Editando ({})", count),
            None => format!("Selecionados ({})", count),
        };
        let list = Paragraph::new(selected)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(list, columns[1]);
    }

    fn render_workouts(&self, frame: &mut Frame, area: Rect) {
        let current = self.store.current().map(|w| &w.id);
        let rows: Vec<Row> = self
            .store
            .workouts()
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let mark = if Some(&w.id) == current { "▶" } else { "" };
                Row::new(vec![
                    Cell::from(mark),
                    Cell::from(w.name.clone()),
                    Cell::from(format!("{} exercícios", w.exercises.len())),
                    Cell::from(w.created_at.format("%d/%m/%Y").to_string()),
                    Cell::from(w.last_used.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default()),
                ])
                .style(Self::highlight(i == self.list_cursor))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(2),
                Constraint::Min(20),
                Constraint::Length(14),
                Constraint::Length(12),
                Constraint::Length(12),
            ],
        )
        .header(Row::new(vec!["", "Treino", "Exercícios", "Criado em", "Último uso"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Meus Treinos"));
        frame.render_widget(table, area);
    }

    fn image_line(&self) -> Line<'static> {
        match self.image.as_ref().map(|i| &i.status) {
            Some(ImageStatus::Ready(src)) => Line::from(format!("Imagem: {}", src)),
            Some(ImageStatus::Placeholder(label)) => Line::from(Span::styled(
                format!("[{}] imagem indisponível", label),
                Style::default().fg(Color::DarkGray),
            )),
            Some(ImageStatus::Checking) => Line::from("Imagem: carregando..."),
            None => Line::from(""),
        }
    }

    fn render_train(&self, frame: &mut Frame, area: Rect) {
        let Some(session) = &self.session else {
            let empty = Paragraph::new("Nenhum treino carregado")
                .block(Block::default().borders(Borders::ALL).title("Treinar"));
            frame.render_widget(empty, area);
            return;
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(columns[1]);

        let title = format!("{} - {}", session.workout().name, session.position_label());
        let lines: Vec<Line> = match session.current() {
            Some(e) => vec![
                Line::from(Span::styled(e.name.clone(), Style::default().bold())),
                Line::from(format!("Músculo: {}", e.muscle_group)),
                Line::from(format!("Séries: {}", e.sets_scheme)),
                Line::from(format!("Descanso: {}", e.rest_spec)),
                Line::from(format!("Intensidade: {}", e.intensity)),
                self.image_line(),
                Line::from(""),
                Line::from(e.description.clone()),
            ],
            None => vec![Line::from("Treino sem exercícios")],
        };
        let details = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(details, columns[0]);

        let status = match self.timer.status() {
            TimerStatus::Running => "em andamento",
            TimerStatus::Paused => "pausado",
            TimerStatus::Finished => "concluído",
            TimerStatus::Idle => "parado",
        };
        let timer = Paragraph::new(vec![
            Line::from(Span::styled(self.timer.display(), Style::default().fg(Color::Yellow).bold())),
            Line::from(status),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Descanso"));
        frame.render_widget(timer, side[0]);

        let exercises: Vec<Line> = session
            .workout()
            .exercises
            .iter()
            .enumerate()
            .map(|(i, e)| Line::styled(format!("{}. {}", i + 1, e.name), Self::highlight(i == session.index())))
            .collect();
        let list = Paragraph::new(exercises).block(Block::default().borders(Borders::ALL).title("Exercícios"));
        frame.render_widget(list, side[1]);
    }

    fn render_favorites(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .store
            .favorites()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                Row::new(vec![
                    Cell::from(e.name.clone()),
                    Cell::from(e.muscle_group.clone()),
                    Cell::from(e.sets_scheme.clone()),
                ])
                .style(Self::highlight(i == self.list_cursor))
            })
            .collect();

        let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(20), Constraint::Length(10)])
            .header(Row::new(vec!["Exercício", "Músculo", "Séries"]).style(Style::default().bold()))
            .block(Block::default().borders(Borders::ALL).title("Favoritos"));
        frame.render_widget(table, area);
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
