use super::{CardRecord, Dataset, Favorites, Mode};
use crate::error::{ArchflashError, Result};
use rand::Rng;

/// Shuffled cards of one session, never empty once built
pub type SessionStack = Vec<CardRecord>;

/// Builds a shuffled session stack for `mode`.
///
/// Cards are collected in dataset order (categories, then buildings, then
/// images) and then shuffled with [`fisher_yates`].
///
/// # Errors
/// Returns [`ArchflashError::EmptySelection`] when nothing matches `mode`.
pub fn build_session<R: Rng + ?Sized>(
    dataset: &Dataset,
    mode: &Mode,
    favorites: &Favorites,
    rng: &mut R,
) -> Result<SessionStack> {
    let mut stack = collect_cards(dataset, mode, favorites);

    if stack.is_empty() {
        return Err(ArchflashError::EmptySelection);
    }

    fisher_yates(&mut stack, rng);
    Ok(stack)
}

fn collect_cards(dataset: &Dataset, mode: &Mode, favorites: &Favorites) -> SessionStack {
    let mut stack = Vec::new();

    for category in &dataset.categories {
        if let Mode::Category(id) = mode {
            if &category.id != id {
                continue;
            }
        }

        for building in &category.buildings {
            for image in &building.images {
                if *mode == Mode::Favorites && !favorites.contains(image) {
                    continue;
                }

                stack.push(CardRecord {
                    name: building.name.clone(),
                    category: category.name.clone(),
                    image: image.clone(),
                });
            }
        }
    }

    stack
}

/// Uniform in-place shuffle: every one of the n! orderings is equally likely.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tests::sample_dataset;
    use crate::domain::{ImageRef, MemoryStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn no_favorites() -> Favorites {
        Favorites::load(Box::new(MemoryStore::default()))
    }

    fn favorites_of(images: &[&str]) -> Favorites {
        let mut favorites = no_favorites();
        for image in images {
            favorites.toggle(&ImageRef::new(image));
        }
        favorites
    }

    fn sorted_images(stack: &SessionStack) -> Vec<String> {
        let mut images: Vec<String> = stack.iter().map(|c| c.image.to_string()).collect();
        images.sort();
        images
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_all_mode_includes_every_image() {
            let mut rng = StdRng::seed_from_u64(1);
            let stack =
                build_session(&sample_dataset(), &Mode::All, &no_favorites(), &mut rng).unwrap();

            assert_eq!(
                sorted_images(&stack),
                vec!["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg", "f.jpg"]
            );
        }

        #[test]
        fn test_category_mode_includes_only_that_category() {
            let mut rng = StdRng::seed_from_u64(2);
            let mode = Mode::Category("r1".to_string());
            let stack = build_session(&sample_dataset(), &mode, &no_favorites(), &mut rng).unwrap();

            assert_eq!(sorted_images(&stack), vec!["d.jpg", "e.jpg", "f.jpg"]);
            assert!(stack.iter().all(|c| c.category == "Roman"));
            assert!(stack.iter().all(|c| c.name == "Pantheon"));
        }

        #[test]
        fn test_unknown_category_is_empty_selection() {
            let mut rng = StdRng::seed_from_u64(3);
            let mode = Mode::Category("nope".to_string());
            let result = build_session(&sample_dataset(), &mode, &no_favorites(), &mut rng);

            assert!(matches!(result, Err(ArchflashError::EmptySelection)));
        }

        #[test]
        fn test_favorites_mode_filters_by_membership() {
            let mut rng = StdRng::seed_from_u64(4);
            let favorites = favorites_of(&["c.jpg", "e.jpg", "not-in-dataset.jpg"]);
            let stack =
                build_session(&sample_dataset(), &Mode::Favorites, &favorites, &mut rng).unwrap();

            assert_eq!(sorted_images(&stack), vec!["c.jpg", "e.jpg"]);
        }

        #[test]
        fn test_favorites_mode_matches_canonical_refs() {
            let mut rng = StdRng::seed_from_u64(5);
            let favorites = favorites_of(&["./a.jpg?v=1700000000"]);
            let stack =
                build_session(&sample_dataset(), &Mode::Favorites, &favorites, &mut rng).unwrap();

            assert_eq!(sorted_images(&stack), vec!["a.jpg"]);
        }

        #[test]
        fn test_empty_favorites_is_empty_selection() {
            let mut rng = StdRng::seed_from_u64(6);
            let result =
                build_session(&sample_dataset(), &Mode::Favorites, &no_favorites(), &mut rng);

            assert!(matches!(result, Err(ArchflashError::EmptySelection)));
        }

        #[test]
        fn test_empty_dataset_is_empty_selection() {
            let mut rng = StdRng::seed_from_u64(7);
            let result = build_session(&Dataset::default(), &Mode::All, &no_favorites(), &mut rng);

            assert!(matches!(result, Err(ArchflashError::EmptySelection)));
        }

        #[test]
        fn test_collect_preserves_traversal_order() {
            let cards = collect_cards(&sample_dataset(), &Mode::All, &no_favorites());
            let images: Vec<&str> = cards.iter().map(|c| c.image.as_str()).collect();

            assert_eq!(images, vec!["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg", "f.jpg"]);
            assert_eq!(cards[2].name, "Notre-Dame");
            assert_eq!(cards[2].category, "Gothic");
        }

        #[test]
        fn test_cards_carry_owning_building_and_category() {
            let mut rng = StdRng::seed_from_u64(8);
            let stack =
                build_session(&sample_dataset(), &Mode::All, &no_favorites(), &mut rng).unwrap();

            for card in &stack {
                let expected = match card.image.as_str() {
                    "a.jpg" | "b.jpg" => ("Duomo", "Gothic"),
                    "c.jpg" => ("Notre-Dame", "Gothic"),
                    _ => ("Pantheon", "Roman"),
                };
                assert_eq!((card.name.as_str(), card.category.as_str()), expected);
            }
        }
    }

    mod shuffle_tests {
        use super::*;

        #[test]
        fn test_shuffle_is_a_permutation() {
            let mut rng = StdRng::seed_from_u64(42);
            let mut items: Vec<u32> = (0..100).collect();
            fisher_yates(&mut items, &mut rng);

            assert_eq!(items.len(), 100);
            let mut sorted = items.clone();
            sorted.sort();
            assert_eq!(sorted, (0..100).collect::<Vec<_>>());
        }

        #[test]
        fn test_shuffle_handles_trivial_slices() {
            let mut rng = StdRng::seed_from_u64(0);
            let mut empty: Vec<u8> = vec![];
            fisher_yates(&mut empty, &mut rng);
            assert!(empty.is_empty());

            let mut single = vec![7];
            fisher_yates(&mut single, &mut rng);
            assert_eq!(single, vec![7]);
        }

        #[test]
        fn test_shuffle_reaches_every_ordering_of_three() {
            let mut rng = StdRng::seed_from_u64(9);
            let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();

            for _ in 0..6000 {
                let mut items = vec![0u8, 1, 2];
                fisher_yates(&mut items, &mut rng);
                *seen.entry(items).or_default() += 1;
            }

            assert_eq!(seen.len(), 6);
            // Each ordering expects 1000 hits; allow generous noise
            for count in seen.values() {
                assert!((850..=1150).contains(count), "biased count {}", count);
            }
        }

        #[test]
        fn test_shuffle_has_no_positional_bias() {
            // Chi-square over (element, position) cells
            const N: usize = 8;
            const TRIALS: usize = 40_000;
            let mut rng = StdRng::seed_from_u64(1234);
            let mut counts = [[0usize; N]; N];

            for _ in 0..TRIALS {
                let mut items: Vec<usize> = (0..N).collect();
                fisher_yates(&mut items, &mut rng);
                for (position, &element) in items.iter().enumerate() {
                    counts[element][position] += 1;
                }
            }

            let expected = TRIALS as f64 / N as f64;
            let chi_square: f64 = counts
                .iter()
                .flatten()
                .map(|&observed| {
                    let diff = observed as f64 - expected;
                    diff * diff / expected
                })
                .sum();

            // Permutation cells are correlated: the raw sum is n/(n-1) times a
            // chi-square with (n-1)^2 = 49 dof. Critical value at p = 0.001 is 85.4
            let statistic = chi_square * (N - 1) as f64 / N as f64;
            assert!(statistic < 85.4, "chi-square too large: {}", statistic);
        }

        #[test]
        fn test_seeded_builds_are_reproducible() {
            let dataset = sample_dataset();
            let first = build_session(
                &dataset,
                &Mode::All,
                &no_favorites(),
                &mut StdRng::seed_from_u64(77),
            )
            .unwrap();
            let second = build_session(
                &dataset,
                &Mode::All,
                &no_favorites(),
                &mut StdRng::seed_from_u64(77),
            )
            .unwrap();

            assert_eq!(first, second);
        }
    }
}
