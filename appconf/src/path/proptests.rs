//! Property-based tests for path handling.

use super::normalize::{normalize_against, resolve_components};
use super::resolver::OptionPathResolver;
use proptest::prelude::*;
use std::path::{Component, Path, PathBuf};

// Strategy for generating path-like strings
fn path_component_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,20}"
}

// Components mixed with "." and ".."
fn messy_component_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => path_component_strategy(),
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
    ]
}

fn absolute_path_strategy() -> impl Strategy<Value = PathBuf> {
    prop::collection::vec(messy_component_strategy(), 1..10).prop_map(|parts| {
        let mut path = PathBuf::from("/");
        for part in parts {
            path.push(part);
        }
        path
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Folding is idempotent
    #[test]
    fn resolve_components_idempotent(path in absolute_path_strategy()) {
        let once = resolve_components(&path);
        prop_assert_eq!(resolve_components(&once), once);
    }

    // Folded absolute paths stay absolute and contain no "." or ".."
    #[test]
    fn folded_paths_are_clean(path in absolute_path_strategy()) {
        let folded = resolve_components(&path);
        prop_assert!(folded.is_absolute());
        prop_assert!(folded
            .components()
            .all(|c| !matches!(c, Component::CurDir | Component::ParentDir)));
    }

    // Plain relative paths land under the base
    #[test]
    fn relative_paths_land_under_base(parts in prop::collection::vec(path_component_strategy(), 1..6)) {
        let relative: PathBuf = parts.iter().collect();
        let normalized = normalize_against(&relative, Path::new("/srv/app")).unwrap();
        prop_assert!(normalized.starts_with("/srv/app"));
        prop_assert_eq!(normalized, Path::new("/srv/app").join(&relative));
    }

    // Joining onto a base keeps order and count
    #[test]
    fn apply_base_dir_preserves_order(values in prop::collection::vec(path_component_strategy(), 0..12)) {
        let joined = OptionPathResolver::apply_base_dir(Some(Path::new("/data")), &values);
        prop_assert_eq!(joined.len(), values.len());
        for (path, value) in joined.iter().zip(&values) {
            prop_assert_eq!(path, &Path::new("/data").join(value));
        }
    }
}
