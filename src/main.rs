use archflash::app::{App, AppOptions};
use archflash::cli::{AppConfig, Args};
use archflash::config::UserConfig;
use archflash::dataset::{fetch_dataset, CacheBuster, ImageResolver};
use archflash::domain::{Favorites, JsonFileStore, KeyValueStore, MemoryStore};
use archflash::gesture::CellMetrics;
use archflash::image_loader::SyncImageManager;
use archflash::logging::{init_logging, LogConfig};

use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::{io, time::Duration};

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let config: AppConfig = args.into();

    let log_config = LogConfig::from_verbosity(config.verbosity).with_log_file(config.log_file.clone());
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }
    tracing::info!(source = %config.source, version = env!("CARGO_PKG_VERSION"), "starting");

    run_app_with_config(&config)
}

/// Loads everything the app needs, then runs the TUI
pub fn run_app_with_config(config: &AppConfig) -> io::Result<()> {
    let images = SyncImageManager::new().map_err(io::Error::other)?;

    let buster = CacheBuster::now();
    let dataset = images
        .runtime()
        .block_on(fetch_dataset(&config.source, buster));
    let resolver = ImageResolver::for_source(&config.source, buster);

    let store: Box<dyn KeyValueStore> = match config
        .store_path
        .clone()
        .or_else(JsonFileStore::default_path)
    {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => {
            tracing::warn!("no data directory; favorites will not persist");
            Box::new(MemoryStore::unavailable())
        }
    };
    let favorites = Favorites::load(store);

    let user_config = UserConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load user config");
        UserConfig::default()
    });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        dataset,
        resolver,
        favorites,
        images,
        user_config,
        AppOptions {
            show_welcome: config.show_welcome,
            seed: config.seed,
            config_path: UserConfig::config_path(),
            cell_metrics: CellMetrics::detect(),
        },
    );
    if let Some(mode) = &config.mode {
        app.start(mode);
    }

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| app.draw(frame))?;

        // Poll so loading images keep getting redrawn
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                app.handle_mouse(mouse, Rect::new(0, 0, size.width, size.height));
            }
            Event::FocusLost => app.handle_focus_lost(),
            Event::Resize(_, _) => app.handle_resize(),
            _ => {}
        }
    }

    Ok(())
}
