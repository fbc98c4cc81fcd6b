//! Application controller: owns all state and turns input into transitions

use crate::config::UserConfig;
use crate::dataset::ImageResolver;
use crate::domain::{Dataset, Favorites, Mode, Navigator, Step};
use crate::error::{ArchflashError, Result};
use crate::file_opener::open_image;
use crate::gesture::{CellMetrics, GestureInterpreter, Intent, MotionHint};
use crate::image_loader::SyncImageManager;
use crate::tui::{
    card_area, handle_card_key, handle_selection_key, position_of_mode, render_card,
    render_help_overlay, render_notice, render_selection, render_welcome_overlay, selection_cards,
    selection_hit, Face, KeyAction, Screen, SelectionCard, ViewState,
};
use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::layout::{Position, Rect};
use ratatui::Frame;
use std::path::PathBuf;

pub const DECK_FINISHED: &str = "You finished the deck! Back to the selection.";
pub const EMPTY_SELECTION: &str = "No cards found for this selection.";

/// Startup choices that don't belong to the domain state
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub show_welcome: bool,
    pub seed: Option<u64>,
    /// Where `UserConfig` is persisted; `None` keeps it in memory
    pub config_path: Option<PathBuf>,
    pub cell_metrics: CellMetrics,
}

pub struct App {
    dataset: Dataset,
    dataset_error: Option<String>,
    resolver: ImageResolver,
    favorites: Favorites,
    navigator: Navigator,
    images: SyncImageManager,
    gestures: GestureInterpreter,
    cell_metrics: CellMetrics,
    rng: StdRng,
    user_config: UserConfig,
    config_path: Option<PathBuf>,
    cards: Vec<SelectionCard>,
    cursor: usize,
    screen: Screen,
    view_state: ViewState,
    face: Face,
    scroll_suppressed: bool,
    should_quit: bool,
}

impl App {
    /// A failed dataset load still yields an app: the selection screen
    /// explains the failure instead of offering decks.
    pub fn new(
        dataset: Result<Dataset>,
        resolver: ImageResolver,
        favorites: Favorites,
        images: SyncImageManager,
        user_config: UserConfig,
        options: AppOptions,
    ) -> Self {
        let (dataset, dataset_error) = match dataset {
            Ok(dataset) => (dataset, None),
            Err(e) => {
                tracing::error!(error = %e, "dataset unavailable");
                (Dataset::default(), Some(e.to_string()))
            }
        };

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let view_state = if options.show_welcome || !user_config.welcome_shown {
            ViewState::Welcome
        } else {
            ViewState::Main
        };

        let mut app = Self {
            dataset,
            dataset_error,
            resolver,
            favorites,
            navigator: Navigator::new(),
            images,
            gestures: GestureInterpreter::new(),
            cell_metrics: options.cell_metrics,
            rng,
            user_config,
            config_path: options.config_path,
            cards: Vec::new(),
            cursor: 0,
            screen: Screen::Selection,
            view_state,
            face: Face::Front,
            scroll_suppressed: false,
            should_quit: false,
        };

        app.refresh_cards();
        if let Some(last) = app.user_config.last_mode.as_deref() {
            if let Ok(mode) = last.parse::<Mode>() {
                app.cursor = position_of_mode(&app.cards, &mode).unwrap_or(0);
            }
        }
        app
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cards(&self) -> &[SelectionCard] {
        &self.cards
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn user_config(&self) -> &UserConfig {
        &self.user_config
    }

    /// Selection cards depend on the dataset and the favorites count
    fn refresh_cards(&mut self) {
        self.cards = if self.dataset_error.is_some() {
            Vec::new()
        } else {
            selection_cards(&self.dataset, self.favorites.len())
        };
        self.cursor = self.cursor.min(self.cards.len().saturating_sub(1));
    }

    fn save_config(&self) {
        if let Some(path) = &self.config_path {
            if let Err(e) = self.user_config.save_to(path) {
                tracing::warn!(error = %e, "failed to save user config");
            }
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.view_state = ViewState::Notice(message.into());
    }

    /// Logs a navigation error the UI has no use for
    fn ignore(&self, error: ArchflashError) {
        debug_assert!(
            !matches!(error, ArchflashError::NoActiveSession),
            "card action without an active session"
        );
        tracing::warn!(error = %error, "ignored navigation error");
    }

    /// Starts a session for `mode` and switches to the card screen
    pub fn start(&mut self, mode: &Mode) {
        let started = self
            .navigator
            .start(&self.dataset, mode, &self.favorites, &mut self.rng)
            .map(|_| ());
        match started {
            Ok(()) => {
                self.screen = Screen::Card;
                self.images.reset();
                self.on_card_changed();

                if let Some(index) = position_of_mode(&self.cards, mode) {
                    self.cursor = index;
                }
                self.user_config.last_mode = Some(mode.to_string());
                self.save_config();
            }
            Err(ArchflashError::EmptySelection) => {
                tracing::info!(mode = %mode, "empty selection");
                self.notify(EMPTY_SELECTION);
            }
            Err(e) => self.ignore(e),
        }
    }

    fn end_session(&mut self) {
        self.navigator.end();
        tracing::debug!(cached = self.images.cache_size(), "images cached at session end");
        self.images.reset();
        self.gestures.leave();
        self.face = Face::Front;
        self.screen = Screen::Selection;
        self.refresh_cards();
    }

    /// Front face, then the current image ahead of the upcoming ones
    fn on_card_changed(&mut self) {
        self.face = Face::Front;
        match self.navigator.current() {
            Ok(card) => {
                let location = self.resolver.resolve(&card.image);
                self.images.request(&location);
            }
            Err(e) => return self.ignore(e),
        }
        match self.navigator.upcoming_images() {
            Ok(upcoming) => {
                let locations: Vec<_> = upcoming
                    .into_iter()
                    .map(|image| self.resolver.resolve(image))
                    .collect();
                self.images.prefetch(&locations);
            }
            Err(e) => self.ignore(e),
        }
    }

    fn next_card(&mut self) {
        match self.navigator.advance() {
            Ok(Step::CardChanged) => self.on_card_changed(),
            Ok(Step::SessionComplete) => {
                self.end_session();
                self.notify(DECK_FINISHED);
            }
            Ok(Step::Unchanged) => {}
            Err(e) => self.ignore(e),
        }
    }

    fn previous_card(&mut self) {
        match self.navigator.retreat() {
            Ok(Step::CardChanged) => self.on_card_changed(),
            Ok(_) => {}
            Err(e) => self.ignore(e),
        }
    }

    fn toggle_favorite(&mut self) {
        match self.navigator.toggle_favorite(&mut self.favorites) {
            Ok(_) => self.refresh_cards(),
            Err(e) => self.ignore(e),
        }
    }

    fn open_current(&mut self) {
        let location = match self.navigator.current() {
            Ok(card) => self.resolver.resolve(&card.image),
            Err(e) => return self.ignore(e),
        };
        if let Err(e) = open_image(&location) {
            tracing::warn!(%location, error = %e, "failed to open image");
            self.notify(format!("Could not open image: {}", e));
        }
    }

    fn activate(&mut self, index: usize) {
        let Some(card) = self.cards.get(index) else {
            return;
        };
        if !card.enabled {
            tracing::debug!(title = %card.title, "disabled selection card");
            return;
        }
        let mode = card.mode.clone();
        self.start(&mode);
    }

    fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Next => self.next_card(),
            Intent::Previous => self.previous_card(),
            Intent::Flip => self.face = self.face.flipped(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.view_state {
            ViewState::Welcome => {
                self.view_state = ViewState::Main;
                self.user_config.welcome_shown = true;
                self.save_config();
                return;
            }
            ViewState::Help | ViewState::Notice(_) => {
                self.view_state = ViewState::Main;
                return;
            }
            ViewState::Main => {}
        }

        match self.screen {
            Screen::Selection => match handle_selection_key(key) {
                KeyAction::Up => self.cursor = self.cursor.saturating_sub(1),
                KeyAction::Down => {
                    if self.cursor + 1 < self.cards.len() {
                        self.cursor += 1;
                    }
                }
                KeyAction::Select => self.activate(self.cursor),
                KeyAction::Help => self.view_state = ViewState::Help,
                KeyAction::Quit => self.should_quit = true,
                _ => {}
            },
            Screen::Card => match handle_card_key(key) {
                KeyAction::Next => self.next_card(),
                KeyAction::Previous => self.previous_card(),
                KeyAction::Flip => self.face = self.face.flipped(),
                KeyAction::ToggleFavorite => self.toggle_favorite(),
                KeyAction::Open => self.open_current(),
                KeyAction::Back => self.end_session(),
                KeyAction::Help => self.view_state = ViewState::Help,
                KeyAction::Quit => self.should_quit = true,
                _ => {}
            },
        }
    }

    /// `area` is the full terminal area the last frame was drawn into
    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if self.view_state != ViewState::Main {
            if matches!(mouse.kind, MouseEventKind::Down(_)) {
                self.view_state = ViewState::Main;
            }
            return;
        }

        match self.screen {
            Screen::Selection => self.handle_selection_mouse(mouse, area),
            Screen::Card => self.handle_card_mouse(mouse, area),
        }
    }

    fn handle_selection_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) =
                    selection_hit(area, self.cards.len(), self.cursor, mouse.column, mouse.row)
                {
                    if index == self.cursor {
                        self.activate(index);
                    } else {
                        self.cursor = index;
                    }
                }
            }
            MouseEventKind::ScrollUp => self.cursor = self.cursor.saturating_sub(1),
            MouseEventKind::ScrollDown => {
                if self.cursor + 1 < self.cards.len() {
                    self.cursor += 1;
                }
            }
            _ => {}
        }
    }

    fn handle_card_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        let inside = card_area(area).contains(Position::new(mouse.column, mouse.row));
        let point = self.cell_metrics.to_point(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => self.gestures.press(point),
            MouseEventKind::Drag(MouseButton::Left) => {
                if !inside {
                    self.gestures.leave();
                    self.scroll_suppressed = false;
                } else {
                    self.scroll_suppressed =
                        self.gestures.motion(point) == MotionHint::SuppressScroll;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.scroll_suppressed = false;
                if let Some(intent) = self.gestures.release(point) {
                    self.apply_intent(intent);
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                if self.scroll_suppressed {
                    tracing::trace!("scroll suppressed during horizontal drag");
                }
            }
            _ => {}
        }
    }

    /// The terminal lost focus: any drag in progress is abandoned
    pub fn handle_focus_lost(&mut self) {
        self.gestures.leave();
        self.scroll_suppressed = false;
    }

    pub fn handle_resize(&mut self) {
        self.cell_metrics = CellMetrics::detect();
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::Selection => render_selection(
                frame,
                &self.cards,
                self.cursor,
                self.dataset_error.as_deref(),
            ),
            Screen::Card => {
                let resolver = &self.resolver;
                match self
                    .navigator
                    .view(&self.favorites, |image| resolver.resolve(image).to_string())
                {
                    Ok(view) => {
                        let location = resolver.resolve(&view.image);
                        let state = self.images.request(&location);
                        render_card(frame, &view, self.face, state);
                    }
                    Err(e) => {
                        self.ignore(e);
                        self.screen = Screen::Selection;
                    }
                }
            }
        }

        match &self.view_state {
            ViewState::Main => {}
            ViewState::Help => render_help_overlay(frame),
            ViewState::Welcome => render_welcome_overlay(frame),
            ViewState::Notice(message) => render_notice(frame, message),
        }
    }
}
