// Background image loading with an LRU cache and prefetching

use crate::dataset::ImageLocation;
use crate::error::{ArchflashError, Result};
use crate::preview::{decode_image, load_image, CardImage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};

/// Maximum number of cached images
const CACHE_SIZE: usize = 16;
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Prefetches allowed in flight at once; foreground loads are not counted
const PREFETCH_SLOTS: usize = 3;
const PREFETCH_QUEUE: usize = 32;

/// Loading state of one image
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(CardImage),
    Error(String),
}

/// One image to load; prefetches carry no response channel
struct LoadJob {
    location: ImageLocation,
    response_tx: Option<oneshot::Sender<LoadState>>,
}

/// LRU-like cache keyed by resolved location
#[derive(Debug)]
struct ImageCache {
    cache: HashMap<ImageLocation, CardImage>,
    /// Most recent at the end
    access_order: Vec<ImageLocation>,
    max_size: usize,
}

impl ImageCache {
    fn new(max_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            access_order: Vec::new(),
            max_size,
        }
    }

    fn get(&mut self, location: &ImageLocation) -> Option<CardImage> {
        let image = self.cache.get(location)?.clone();
        self.access_order.retain(|l| l != location);
        self.access_order.push(location.clone());
        Some(image)
    }

    fn insert(&mut self, location: ImageLocation, image: CardImage) {
        if self.cache.contains_key(&location) {
            self.access_order.retain(|l| l != &location);
        } else if self.cache.len() >= self.max_size && !self.access_order.is_empty() {
            let oldest = self.access_order.remove(0);
            self.cache.remove(&oldest);
        }

        self.cache.insert(location.clone(), image);
        self.access_order.push(location);
    }

    fn contains(&self, location: &ImageLocation) -> bool {
        self.cache.contains_key(location)
    }

    fn len(&self) -> usize {
        self.cache.len()
    }
}

/// The cache is never held across an await, so a plain mutex is enough and
/// the UI thread can read it without entering the runtime.
fn lock(cache: &Mutex<ImageCache>) -> MutexGuard<'_, ImageCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to the background loader.
///
/// Foreground loads go through an unbounded channel that the dispatcher
/// always drains first, and each one runs as its own task, so the image on
/// screen never waits behind prefetches.
#[derive(Clone)]
pub struct ImageLoader {
    foreground_tx: mpsc::UnboundedSender<LoadJob>,
    prefetch_tx: mpsc::Sender<LoadJob>,
    cache: Arc<Mutex<ImageCache>>,
}

impl ImageLoader {
    /// Spawns the dispatcher; must be called inside a tokio runtime
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ArchflashError::ImageLoad(format!("HTTP client setup failed: {}", e)))?;

        let (foreground_tx, foreground_rx) = mpsc::unbounded_channel();
        let (prefetch_tx, prefetch_rx) = mpsc::channel(PREFETCH_QUEUE);
        let cache = Arc::new(Mutex::new(ImageCache::new(CACHE_SIZE)));

        let dispatcher_cache = Arc::clone(&cache);
        tokio::spawn(async move {
            Self::dispatch(foreground_rx, prefetch_rx, dispatcher_cache, client).await;
        });

        Ok(Self {
            foreground_tx,
            prefetch_tx,
            cache,
        })
    }

    /// Runs until every handle is dropped
    async fn dispatch(
        mut foreground_rx: mpsc::UnboundedReceiver<LoadJob>,
        mut prefetch_rx: mpsc::Receiver<LoadJob>,
        cache: Arc<Mutex<ImageCache>>,
        client: reqwest::Client,
    ) {
        let slots = Arc::new(Semaphore::new(PREFETCH_SLOTS));
        let mut slot: Option<OwnedSemaphorePermit> = None;

        loop {
            tokio::select! {
                biased;

                job = foreground_rx.recv() => match job {
                    Some(job) => {
                        tokio::spawn(Self::run(job, Arc::clone(&cache), client.clone(), None));
                    }
                    None => break,
                },

                permit = Arc::clone(&slots).acquire_owned(), if slot.is_none() => match permit {
                    Ok(permit) => slot = Some(permit),
                    Err(_) => break,
                },

                job = prefetch_rx.recv(), if slot.is_some() => match job {
                    Some(job) => {
                        let permit = slot.take();
                        tokio::spawn(Self::run(job, Arc::clone(&cache), client.clone(), permit));
                    }
                    None => break,
                },
            }
        }
        tracing::debug!("image loader stopped");
    }

    /// Loads one job; `_slot` is released when the load finishes
    async fn run(
        job: LoadJob,
        cache: Arc<Mutex<ImageCache>>,
        client: reqwest::Client,
        _slot: Option<OwnedSemaphorePermit>,
    ) {
        let LoadJob {
            location,
            response_tx,
        } = job;

        let cached = lock(&cache).get(&location);
        let state = match cached {
            Some(image) => LoadState::Ready(image),
            None => match Self::fetch(&client, location.clone()).await {
                Ok(image) => {
                    lock(&cache).insert(location.clone(), image.clone());
                    tracing::debug!(%location, "image cached");
                    LoadState::Ready(image)
                }
                Err(e) => {
                    if response_tx.is_some() {
                        tracing::warn!(%location, error = %e, "image load failed");
                    } else {
                        tracing::debug!(%location, error = %e, "prefetch failed");
                    }
                    LoadState::Error(e.to_string())
                }
            },
        };

        if let Some(tx) = response_tx {
            let _ = tx.send(state);
        }
    }

    /// Reads or downloads the image and decodes it off the async threads
    async fn fetch(client: &reqwest::Client, location: ImageLocation) -> Result<CardImage> {
        let decoded = match location {
            ImageLocation::Path(path) => {
                tokio::task::spawn_blocking(move || load_image(&path).map(CardImage::from_image))
                    .await
            }
            ImageLocation::Url(url) => {
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| ArchflashError::ImageLoad(format!("{}: {}", url, e)))?;
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| ArchflashError::ImageLoad(format!("{}: {}", url, e)))?;
                tokio::task::spawn_blocking(move || decode_image(&bytes).map(CardImage::from_image))
                    .await
            }
        };

        decoded.map_err(|e| ArchflashError::ImageLoad(format!("Task panicked: {}", e)))?
    }

    /// Starts a foreground load and returns where its result will arrive.
    /// Never blocks; a closed receiver means the loader is gone.
    pub fn load(&self, location: &ImageLocation) -> oneshot::Receiver<LoadState> {
        let (response_tx, response_rx) = oneshot::channel();
        let job = LoadJob {
            location: location.clone(),
            response_tx: Some(response_tx),
        };
        if self.foreground_tx.send(job).is_err() {
            tracing::warn!(%location, "image loader stopped, load dropped");
        }
        response_rx
    }

    /// Queues a silent load that only warms the cache
    pub fn prefetch(&self, location: &ImageLocation) {
        if self.is_cached(location) {
            return;
        }
        let job = LoadJob {
            location: location.clone(),
            response_tx: None,
        };
        if let Err(e) = self.prefetch_tx.try_send(job) {
            tracing::debug!(%location, error = %e, "prefetch skipped");
        }
    }

    pub fn get_cached(&self, location: &ImageLocation) -> Option<CardImage> {
        lock(&self.cache).get(location)
    }

    pub fn is_cached(&self, location: &ImageLocation) -> bool {
        lock(&self.cache).contains(location)
    }

    pub fn cache_size(&self) -> usize {
        lock(&self.cache).len()
    }
}

/// Polling front end for the synchronous TUI loop. Owns the runtime the
/// loader runs on. No method waits on the runtime.
pub struct SyncImageManager {
    loader: ImageLoader,
    runtime: tokio::runtime::Runtime,
    current_state: LoadState,
    current: Option<ImageLocation>,
    receiver: Option<oneshot::Receiver<LoadState>>,
}

impl SyncImageManager {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let loader = {
            let _guard = runtime.enter();
            ImageLoader::new()?
        };

        Ok(Self {
            loader,
            runtime,
            current_state: LoadState::Loading,
            current: None,
            receiver: None,
        })
    }

    /// Runtime shared with other startup work such as the dataset fetch
    pub fn runtime(&self) -> &tokio::runtime::Runtime {
        &self.runtime
    }

    /// Returns the state of `location`, starting a load when it changes
    pub fn request(&mut self, location: &ImageLocation) -> &LoadState {
        if self.current.as_ref() != Some(location) {
            self.current = Some(location.clone());
            self.receiver = None;

            if let Some(cached) = self.loader.get_cached(location) {
                self.current_state = LoadState::Ready(cached);
                return &self.current_state;
            }

            self.current_state = LoadState::Loading;
            self.receiver = Some(self.loader.load(location));
        }

        if matches!(self.current_state, LoadState::Loading) {
            if let Some(rx) = self.receiver.as_mut() {
                match rx.try_recv() {
                    Ok(state) => {
                        self.current_state = state;
                        self.receiver = None;
                    }
                    Err(oneshot::error::TryRecvError::Empty) => {}
                    Err(oneshot::error::TryRecvError::Closed) => {
                        self.current_state =
                            LoadState::Error("Image channel closed".to_string());
                        self.receiver = None;
                    }
                }
            }
        }

        &self.current_state
    }

    /// Warms the cache for upcoming cards. Results are never cancelled.
    pub fn prefetch(&self, locations: &[ImageLocation]) {
        for location in locations {
            self.loader.prefetch(location);
        }
    }

    /// Forgets the current image, e.g. when leaving a session
    pub fn reset(&mut self) {
        self.current = None;
        self.current_state = LoadState::Loading;
        self.receiver = None;
    }

    pub fn cache_size(&self) -> usize {
        self.loader.cache_size()
    }
}
