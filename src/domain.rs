pub mod favorites;
pub mod navigation;
pub mod session;

pub use favorites::{Favorites, JsonFileStore, KeyValueStore, MemoryStore, FAVORITES_KEY};
pub use navigation::{CardView, Navigator, Session, Step, PRELOAD_AHEAD};
pub use session::{build_session, fisher_yates, SessionStack};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Identifier of one image, compared on its canonical form.
///
/// Canonicalization trims whitespace, turns `\` into `/`, drops any
/// `?query` or `#fragment` suffix and strips leading `./` segments, so
/// `./img/a.jpg?v=1` and `img/a.jpg` name the same image. The string as
/// written in the dataset is kept for fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ImageRef {
    key: String,
    raw: String,
}

impl ImageRef {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref().trim();
        Self {
            key: canonicalize(raw),
            raw: raw.to_string(),
        }
    }

    /// Canonical form: the identity used for favorites
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The reference as written, query and fragment included
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

fn canonicalize(raw: &str) -> String {
    let mut s = raw.trim().replace('\\', "/");
    if let Some(cut) = s.find(|c: char| c == '?' || c == '#') {
        s.truncate(cut);
    }
    let mut rest = s.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.to_string()
}

impl PartialEq for ImageRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ImageRef {}

impl Hash for ImageRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ImageRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ImageRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl From<String> for ImageRef {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for ImageRef {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Serializes the canonical form
impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        image.key
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub buildings: Vec<Building>,
}

impl Category {
    /// Number of images across all buildings of this category
    pub fn image_count(&self) -> usize {
        self.buildings.iter().map(|b| b.images.len()).sum()
    }
}

/// The full image catalog, immutable once loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Dataset {
    pub fn image_count(&self) -> usize {
        self.categories.iter().map(Category::image_count).sum()
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// One flashcard: the building, its category and the image shown
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardRecord {
    pub name: String,
    pub category: String,
    pub image: ImageRef,
}

/// Prefix that marks a category id, so ids like `all` stay reachable
const CATEGORY_PREFIX: &str = "category:";

/// Which images populate a session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mode {
    All,
    Favorites,
    Category(String),
}

impl FromStr for Mode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix(CATEGORY_PREFIX) {
            return Ok(Mode::Category(id.to_string()));
        }
        Ok(match s {
            "all" => Mode::All,
            "favorites" | "favs" => Mode::Favorites,
            id => Mode::Category(id.to_string()),
        })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::All => f.write_str("all"),
            Mode::Favorites => f.write_str("favorites"),
            Mode::Category(id) => write!(f, "{}{}", CATEGORY_PREFIX, id),
        }
    }
}
