use super::{build_session, CardRecord, Dataset, Favorites, ImageRef, Mode, SessionStack};
use crate::error::{ArchflashError, Result};
use rand::Rng;

/// How many upcoming images are prefetched after each move
pub const PRELOAD_AHEAD: usize = 3;

/// Outcome of a navigation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Position moved; render the new card
    CardChanged,
    /// `advance` was called on the last card
    SessionComplete,
    /// Nothing happened (`retreat` on the first card)
    Unchanged,
}

/// One running session: the shuffled stack and the position in it
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    stack: SessionStack,
    position: usize,
    mode: Mode,
}

impl Session {
    /// Wraps an already built stack. An empty stack is refused.
    pub fn new(stack: SessionStack, mode: Mode) -> Result<Self> {
        if stack.is_empty() {
            return Err(ArchflashError::EmptySelection);
        }
        Ok(Self {
            stack,
            position: 0,
            mode,
        })
    }

    pub fn current(&self) -> &CardRecord {
        &self.stack[self.position]
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn cards(&self) -> &[CardRecord] {
        &self.stack
    }

    /// The next cards after the current one, at most [`PRELOAD_AHEAD`]
    pub fn upcoming(&self) -> &[CardRecord] {
        let start = (self.position + 1).min(self.stack.len());
        let end = (self.position + 1 + PRELOAD_AHEAD).min(self.stack.len());
        &self.stack[start..end]
    }

    fn advance(&mut self) -> Step {
        if self.position + 1 < self.stack.len() {
            self.position += 1;
            Step::CardChanged
        } else {
            Step::SessionComplete
        }
    }

    fn retreat(&mut self) -> Step {
        if self.position > 0 {
            self.position -= 1;
            Step::CardChanged
        } else {
            Step::Unchanged
        }
    }
}

/// Renderable snapshot of the current card
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub name: String,
    pub category: String,
    pub image: ImageRef,
    pub image_url: String,
    /// 1-based position
    pub display_index: usize,
    pub total: usize,
    pub percentage: f64,
    pub is_favorite: bool,
}

/// Owns the active session, if any, and moves through it
#[derive(Debug, Default)]
pub struct Navigator {
    session: Option<Session>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and activates a new session, replacing any previous one.
    ///
    /// On [`ArchflashError::EmptySelection`] the navigator is left untouched.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        dataset: &Dataset,
        mode: &Mode,
        favorites: &Favorites,
        rng: &mut R,
    ) -> Result<&Session> {
        let stack = build_session(dataset, mode, favorites, rng)?;
        let session = Session::new(stack, mode.clone())?;
        tracing::info!(mode = %mode, cards = session.len(), "session started");
        Ok(&*self.session.insert(session))
    }

    /// Activates a prepared session
    pub fn resume(&mut self, session: Session) -> &Session {
        &*self.session.insert(session)
    }

    /// Tears down the active session
    pub fn end(&mut self) -> Option<Session> {
        let ended = self.session.take();
        if let Some(session) = &ended {
            tracing::info!(mode = %session.mode(), at = session.position() + 1, "session ended");
        }
        ended
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn active(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(ArchflashError::NoActiveSession)
    }

    fn active_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(ArchflashError::NoActiveSession)
    }

    pub fn current(&self) -> Result<&CardRecord> {
        Ok(self.active()?.current())
    }

    pub fn position(&self) -> Result<usize> {
        Ok(self.active()?.position())
    }

    /// Moves to the next card, or reports that the stack is exhausted
    pub fn advance(&mut self) -> Result<Step> {
        Ok(self.active_mut()?.advance())
    }

    /// Moves to the previous card; a no-op on the first card
    pub fn retreat(&mut self) -> Result<Step> {
        Ok(self.active_mut()?.retreat())
    }

    /// Flips the current image's favorite membership and returns the new state
    pub fn toggle_favorite(&self, favorites: &mut Favorites) -> Result<bool> {
        let image = &self.active()?.current().image;
        let now_favorite = favorites.toggle(image);
        tracing::info!(image = %image, favorite = now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    /// Images to prefetch after the latest move
    pub fn upcoming_images(&self) -> Result<Vec<&ImageRef>> {
        Ok(self.active()?.upcoming().iter().map(|c| &c.image).collect())
    }

    /// Snapshot for rendering; `resolve` turns an image ref into a fetchable URL
    pub fn view<F>(&self, favorites: &Favorites, resolve: F) -> Result<CardView>
    where
        F: Fn(&ImageRef) -> String,
    {
        let session = self.active()?;
        let card = session.current();
        let display_index = session.position() + 1;
        let total = session.len();

        Ok(CardView {
            name: card.name.clone(),
            category: card.category.clone(),
            image: card.image.clone(),
            image_url: resolve(&card.image),
            display_index,
            total,
            percentage: display_index as f64 / total as f64 * 100.0,
            is_favorite: favorites.contains(&card.image),
        })
    }
}
