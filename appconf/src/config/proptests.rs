//! Property-based tests for configuration building.

use super::builder::AppConfigBuilder;
use super::environment::EnvironmentOverrides;
use super::profile::AppProfile;
use crate::config::attributes::Attributes;
use crate::path::{BaseDirectories, OptionPathResolver};
use crate::schema::{OptionSpec, OptionType, Schema};
use crate::value::{Options, Value};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// Strategy for relative path segments
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

// A schema whose options form one chain: level_0 <- level_1 <- ... <- level_n
fn chain_schema(depth: usize) -> Schema {
    let mut specs = vec![OptionSpec::new("data_dir", OptionType::Path)];
    for level in 0..depth {
        let parent = if level == 0 {
            "data_dir".to_string()
        } else {
            format!("level_{}", level - 1)
        };
        specs.push(
            OptionSpec::new(format!("level_{level}"), OptionType::Path)
                .with_default(format!("d{level}"))
                .resolves_against(parent),
        );
    }
    Schema::new("prop", specs).unwrap()
}

fn seeded(schema: &Schema, raw: &Options) -> Attributes {
    let dirs = BaseDirectories::resolve(
        Path::new("/srv/prop"),
        &Options::new(),
        None,
        None,
        super::profile::Layout::Source,
    )
    .unwrap();
    let mut merged = schema.defaults().clone();
    merged.extend(raw.clone());
    let mut attributes = Attributes::seeded(&dirs, None);
    attributes.materialize(&merged).unwrap();
    attributes
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    // Every option in a chain is resolved exactly once, whatever the order
    #[test]
    fn chain_options_resolved_once(depth in 1usize..24, order in prop::collection::vec(any::<prop::sample::Index>(), 1..48)) {
        let schema = chain_schema(depth);
        let listify = BTreeSet::new();
        let mut attributes = seeded(&schema, &Options::new());
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        for index in &order {
            let level = index.index(depth);
            resolver.resolve_option(&format!("level_{level}"), &mut attributes).unwrap();
        }
        for level in 0..depth {
            resolver.resolve_option(&format!("level_{level}"), &mut attributes).unwrap();
        }

        prop_assert_eq!(resolver.resolutions(), depth);
        let deepest = attributes.get(&format!("level_{}", depth - 1)).and_then(Value::as_path).unwrap();
        prop_assert_eq!(deepest.components().count(), Path::new("/srv/prop/database").components().count() + depth);
    }

    // List options keep element order and count
    #[test]
    fn list_resolution_preserves_order(items in prop::collection::vec(segment_strategy(), 0..16)) {
        let schema = Schema::new("prop", vec![
            OptionSpec::new("data_dir", OptionType::Path),
            OptionSpec::new("tool_config_file", OptionType::List).resolves_against("data_dir"),
        ]).unwrap();
        let mut raw = Options::new();
        raw.insert("tool_config_file".into(), Value::from(items.clone()));
        let listify = BTreeSet::new();
        let mut attributes = seeded(&schema, &raw);
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        resolver.resolve_option("tool_config_file", &mut attributes).unwrap();

        let resolved = attributes.get("tool_config_file").unwrap().listify_strings();
        prop_assert_eq!(resolved.len(), items.len());
        for (path, item) in resolved.iter().zip(&items) {
            prop_assert_eq!(PathBuf::from(path), Path::new("/srv/prop/database").join(item));
        }
    }

    // An override variable always wins; a plain variable only fills unset options
    #[test]
    fn override_variables_win(
        existing in prop::option::of(segment_strategy()),
        plain in prop::option::of(segment_strategy()),
        forced in prop::option::of(segment_strategy()),
    ) {
        let schema = Schema::new("prop", vec![OptionSpec::new("brand", OptionType::Str)]).unwrap();
        let mut kwargs = Options::new();
        if let Some(value) = &existing {
            kwargs.insert("brand".into(), Value::from(value.as_str()));
        }
        let mut vars = Vec::new();
        if let Some(value) = &plain {
            vars.push(("PROP_CONFIG_BRAND".to_string(), value.clone()));
        }
        if let Some(value) = &forced {
            vars.push(("PROP_CONFIG_OVERRIDE_BRAND".to_string(), value.clone()));
        }

        EnvironmentOverrides::apply_from(vars, "PROP", &schema, &mut kwargs);

        let expected = forced.or(existing).or(plain);
        prop_assert_eq!(kwargs.get("brand").and_then(Value::as_str), expected.as_deref());
    }

    // Building twice from the same inputs gives the same attributes
    #[test]
    fn build_is_deterministic(workers in 0i64..64, name in segment_strategy()) {
        let schema = std::sync::Arc::new(Schema::new("prop", vec![
            OptionSpec::new("data_dir", OptionType::Path),
            OptionSpec::new("workers", OptionType::Int).with_default(1i64),
            OptionSpec::new("file_path", OptionType::Path).with_default("objects").resolves_against("data_dir"),
        ]).unwrap());

        let build = || {
            AppConfigBuilder::new(schema.clone())
                .with_profile(AppProfile::default())
                .with_root("/srv/prop")
                .with_option("workers", workers.to_string())
                .with_option("file_path", name.as_str())
                .build()
                .unwrap()
        };
        let first = build();
        let second = build();

        prop_assert_eq!(first.attributes(), second.attributes());
        prop_assert_eq!(first.int_value("workers"), Some(workers));
    }
}
