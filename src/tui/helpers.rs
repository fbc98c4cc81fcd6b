// Selection deck building and small display helpers

use crate::domain::{Dataset, Mode};

pub const ALL_CATEGORIES_ICON: &str = "🌎";
pub const FAVORITES_ICON: &str = "❤️";
const DEFAULT_CATEGORY_ICON: &str = "📐";

/// Keyword → icon, checked in order against the upper-cased category name
const CATEGORY_ICONS: [(&str, &str); 6] = [
    ("ELLEN", "🏛️"),
    ("ROMAN", "🦅"),
    ("IMPERIALE", "👑"),
    ("BIZANTINA", "🕌"),
    ("GOTICO", "⛪"),
    ("MEDIOEVO", "🏰"),
];

pub const FAVORITES_HINT: &str = "Press f while viewing cards to save them here";

/// Picks an icon for a category by keyword
pub fn category_icon(name: &str) -> &'static str {
    let upper = name.to_uppercase();
    CATEGORY_ICONS
        .iter()
        .find(|(keyword, _)| upper.contains(keyword))
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_CATEGORY_ICON)
}

/// One entry of the selection screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCard {
    pub title: String,
    pub subtitle: String,
    pub icon: &'static str,
    pub mode: Mode,
    /// Disabled cards cannot start a session
    pub enabled: bool,
}

/// Builds the selection deck: all categories, favorites, then one card per
/// category in dataset order
pub fn selection_cards(dataset: &Dataset, favorites_count: usize) -> Vec<SelectionCard> {
    let mut cards = Vec::with_capacity(dataset.categories.len() + 2);

    cards.push(SelectionCard {
        title: "All Categories".to_string(),
        subtitle: format!("{} Total Images", dataset.image_count()),
        icon: ALL_CATEGORIES_ICON,
        mode: Mode::All,
        enabled: true,
    });

    cards.push(SelectionCard {
        title: "Your Favorites".to_string(),
        subtitle: if favorites_count == 0 {
            "No saved images".to_string()
        } else {
            format!("{} Saved Images", favorites_count)
        },
        icon: FAVORITES_ICON,
        mode: Mode::Favorites,
        enabled: favorites_count > 0,
    });

    cards.extend(dataset.categories.iter().map(|category| SelectionCard {
        title: category.name.clone(),
        subtitle: format!("{} Images", category.image_count()),
        icon: category_icon(&category.name),
        mode: Mode::Category(category.id.clone()),
        enabled: true,
    }));

    cards
}

/// Index of the card for `mode`, if present
pub fn position_of_mode(cards: &[SelectionCard], mode: &Mode) -> Option<usize> {
    cards.iter().position(|c| &c.mode == mode)
}

/// Progress ratio in `0.0..=1.0` for a 1-based display index
pub fn calculate_progress(display_index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (display_index.min(total)) as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Building, Category, ImageRef};

    fn dataset() -> Dataset {
        Dataset {
            categories: vec![
                Category {
                    id: "gt".to_string(),
                    name: "Architettura Gotica".to_string(),
                    buildings: vec![Building {
                        name: "Duomo".to_string(),
                        images: vec![ImageRef::new("a.jpg"), ImageRef::new("b.jpg")],
                    }],
                },
                Category {
                    id: "rm".to_string(),
                    name: "Romanico".to_string(),
                    buildings: vec![],
                },
            ],
        }
    }

    mod icon_tests {
        use super::*;

        #[test]
        fn test_category_icon_keywords() {
            assert_eq!(category_icon("Arte Ellenistica"), "🏛️");
            assert_eq!(category_icon("Romanico"), "🦅");
            assert_eq!(category_icon("Roma Imperiale"), "👑");
            assert_eq!(category_icon("Arte bizantina"), "🕌");
            assert_eq!(category_icon("Gotico internazionale"), "⛪");
            assert_eq!(category_icon("Alto Medioevo"), "🏰");
        }

        #[test]
        fn test_category_icon_fallback() {
            assert_eq!(category_icon("Brutalism"), "📐");
            assert_eq!(category_icon(""), "📐");
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_selection_order_and_subtitles() {
            let cards = selection_cards(&dataset(), 3);

            let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
            assert_eq!(
                titles,
                vec!["All Categories", "Your Favorites", "Architettura Gotica", "Romanico"]
            );
            assert_eq!(cards[0].subtitle, "2 Total Images");
            assert_eq!(cards[1].subtitle, "3 Saved Images");
            assert_eq!(cards[2].subtitle, "2 Images");
            assert_eq!(cards[3].subtitle, "0 Images");
            assert_eq!(cards[2].mode, Mode::Category("gt".to_string()));
            assert!(cards.iter().all(|c| c.enabled));
        }

        #[test]
        fn test_empty_favorites_card_is_disabled() {
            let cards = selection_cards(&dataset(), 0);
            assert_eq!(cards[1].subtitle, "No saved images");
            assert!(!cards[1].enabled);
        }

        #[test]
        fn test_empty_dataset_still_offers_fixed_cards() {
            let cards = selection_cards(&Dataset::default(), 0);
            assert_eq!(cards.len(), 2);
            assert_eq!(cards[0].subtitle, "0 Total Images");
        }

        #[test]
        fn test_position_of_mode() {
            let cards = selection_cards(&dataset(), 0);
            assert_eq!(position_of_mode(&cards, &Mode::Category("rm".into())), Some(3));
            assert_eq!(position_of_mode(&cards, &Mode::Category("zz".into())), None);
        }
    }

    mod progress_tests {
        use super::*;

        #[test]
        fn test_calculate_progress() {
            assert_eq!(calculate_progress(0, 0), 0.0);
            assert_eq!(calculate_progress(1, 4), 0.25);
            assert_eq!(calculate_progress(4, 4), 1.0);
            assert_eq!(calculate_progress(9, 4), 1.0);
        }
    }
}
