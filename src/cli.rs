// CLI module for argument parsing and configuration

use crate::dataset::DatasetSource;
use crate::domain::Mode;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Archflash - architecture flashcards in your terminal
///
/// Pick a style period, swipe through shuffled photos of its buildings and
/// flip each card to check your guess.
#[derive(Parser, Debug, Clone)]
#[command(name = "archflash")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Dataset JSON: a local file or an http(s):// URL
    #[arg(default_value = "data.json")]
    pub dataset: String,

    /// Start a session right away: "all", "favorites" or a category id
    /// ("category:<id>" for ids that clash with the built-in modes)
    #[arg(short = 'm', long = "mode")]
    pub mode: Option<String>,

    /// Seed for the shuffle, for reproducible decks
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// File that stores favorites (defaults to the user data directory)
    #[arg(long = "store")]
    pub store: Option<PathBuf>,

    /// Show the welcome screen even if it was dismissed before
    #[arg(short = 'w', long = "welcome", action = ArgAction::SetTrue)]
    pub show_welcome: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Write logs here instead of the user data directory
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    pub fn source(&self) -> DatasetSource {
        match self.dataset.parse() {
            Ok(source) => source,
            Err(never) => match never {},
        }
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if self.dataset.trim().is_empty() {
            return Err("Dataset path cannot be empty".to_string());
        }

        if let DatasetSource::File(path) = self.source() {
            if !path.exists() {
                return Err(format!("Dataset file does not exist: {}", path.display()));
            }
            if !path.is_file() {
                return Err(format!("Dataset path is not a file: {}", path.display()));
            }
        }

        if let Some(ref mode) = self.mode {
            if mode.trim().is_empty() {
                return Err("Mode cannot be empty. Use 'all', 'favorites' or a category id".to_string());
            }
        }

        Ok(())
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: DatasetSource,
    pub mode: Option<Mode>,
    pub seed: Option<u64>,
    pub store_path: Option<PathBuf>,
    pub show_welcome: bool,
    pub verbosity: u8,
    pub log_file: Option<PathBuf>,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig {
            source: args.source(),
            mode: args.mode.as_deref().map(|m| match m.parse() {
                Ok(mode) => mode,
                Err(never) => match never {},
            }),
            seed: args.seed,
            store_path: args.store,
            show_welcome: args.show_welcome,
            verbosity: args.verbose,
            log_file: args.log_file,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: DatasetSource::File(PathBuf::from("data.json")),
            mode: None,
            seed: None,
            store_path: None,
            show_welcome: false,
            verbosity: 0,
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args_for(dataset: &str) -> Args {
        Args {
            dataset: dataset.to_string(),
            mode: None,
            seed: None,
            store: None,
            show_welcome: false,
            verbose: 0,
            log_file: None,
        }
    }

    mod args_tests {
        use super::*;

        #[test]
        fn test_parse_defaults() {
            let args = Args::try_parse_from(["archflash"]).unwrap();
            assert_eq!(args.dataset, "data.json");
            assert!(args.mode.is_none());
            assert!(args.seed.is_none());
            assert!(!args.show_welcome);
            assert_eq!(args.verbose, 0);
        }

        #[test]
        fn test_parse_all_flags() {
            let args = Args::try_parse_from([
                "archflash",
                "https://example.org/data.json",
                "--mode",
                "favs",
                "--seed",
                "7",
                "--store",
                "/tmp/store.json",
                "--welcome",
                "-vv",
                "--log-file",
                "/tmp/archflash.log",
            ])
            .unwrap();

            assert_eq!(args.mode.as_deref(), Some("favs"));
            assert_eq!(args.seed, Some(7));
            assert_eq!(args.store, Some(PathBuf::from("/tmp/store.json")));
            assert!(args.show_welcome);
            assert_eq!(args.verbose, 2);
            assert_eq!(args.log_file, Some(PathBuf::from("/tmp/archflash.log")));
        }

        #[test]
        fn test_parse_rejects_bad_seed() {
            assert!(Args::try_parse_from(["archflash", "--seed", "abc"]).is_err());
        }

        #[test]
        fn test_validate_missing_dataset_file() {
            let result = args_for("/nonexistent/path/12345/data.json").validate();
            assert!(result.is_err());
            assert!(result.unwrap_err().contains("does not exist"));
        }

        #[test]
        fn test_validate_directory_is_not_a_dataset() {
            let temp_dir = TempDir::new().unwrap();
            let result = args_for(temp_dir.path().to_str().unwrap()).validate();
            assert!(result.unwrap_err().contains("not a file"));
        }

        #[test]
        fn test_validate_remote_dataset_skips_file_checks() {
            assert!(args_for("https://example.org/data.json").validate().is_ok());
        }

        #[test]
        fn test_validate_empty_mode() {
            let mut args = args_for("https://example.org/data.json");
            args.mode = Some("  ".to_string());

            let result = args.validate();
            assert!(result.unwrap_err().contains("Mode cannot be empty"));
        }

        #[test]
        fn test_validate_success() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("data.json");
            fs::write(&path, "{}").unwrap();

            let mut args = args_for(path.to_str().unwrap());
            args.mode = Some("g1".to_string());
            assert!(args.validate().is_ok());
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_app_config_from_args() {
            let mut args = args_for("https://example.org/data.json");
            args.mode = Some("favorites".to_string());
            args.seed = Some(3);
            args.verbose = 1;

            let config: AppConfig = args.into();

            assert!(config.source.is_remote());
            assert_eq!(config.mode, Some(Mode::Favorites));
            assert_eq!(config.seed, Some(3));
            assert_eq!(config.verbosity, 1);
        }

        #[test]
        fn test_app_config_category_mode() {
            let mut args = args_for("data.json");
            args.mode = Some("r1".to_string());

            let config: AppConfig = args.into();
            assert_eq!(config.mode, Some(Mode::Category("r1".to_string())));
            assert_eq!(config.source, DatasetSource::File(PathBuf::from("data.json")));
        }

        #[test]
        fn test_app_config_tagged_category_mode() {
            let mut args = args_for("data.json");
            args.mode = Some("category:all".to_string());

            let config: AppConfig = args.into();
            assert_eq!(config.mode, Some(Mode::Category("all".to_string())));
        }

        #[test]
        fn test_app_config_default() {
            let config = AppConfig::default();

            assert_eq!(config.source, DatasetSource::File(PathBuf::from("data.json")));
            assert!(config.mode.is_none());
            assert!(config.store_path.is_none());
            assert!(!config.show_welcome);
        }
    }
}
