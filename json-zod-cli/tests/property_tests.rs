//! Property-based tests for json-zod-cli.
//!
//! Properties tested:
//! - Property 1: Base Properties Overlay Extensions
//! - Property 2: Extends Precedence Mirrors Base Precedence
//! - Property 3: Documents Without Extends Keep Their Properties
//! - Property 4: Merge Is Total
//! - Property 5: Traversal Completeness
//! - Property 6: Output Tree Mirrors Input Tree
//! - Property 7: Config Override Precedence

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use json_zod_cli::{
    config::{CliArgs, Config, ConfigManager},
    merge::{merge_properties, MergePrecedence},
    walker::TreeWalker,
};

// =============================================================================
// Generators for property tests
// =============================================================================

/// Property maps over a small key alphabet so overlaps are common.
fn arb_properties() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::vec(("[a-f]", any::<i32>()), 0..8).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(key, n)| (key, json!({ "type": "integer", "const": n })))
            .collect()
    })
}

/// Arbitrary JSON values, including objects that look like schemas.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(
                (
                    prop_oneof![
                        Just("properties".to_string()),
                        Just("extends".to_string()),
                        Just("$ref".to_string()),
                        "[a-z]{1,4}",
                    ],
                    inner,
                ),
                0..4,
            )
            .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

/// Relative directory paths, some of which pass through `node_modules`.
fn arb_dir() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            4 => "[a-z]{1,5}",
            1 => Just("node_modules".to_string()),
        ],
        0..4,
    )
}

fn schema(extends: Option<&Map<String, Value>>, own: &Map<String, Value>) -> Value {
    let mut doc = json!({ "title": "T", "properties": own });
    if let Some(extends) = extends {
        doc["extends"] = json!({ "properties": extends });
    }
    doc
}

fn merged_properties(doc: &Value, precedence: MergePrecedence) -> Map<String, Value> {
    merge_properties(doc, precedence).unwrap()["properties"]
        .as_object()
        .unwrap()
        .clone()
}

fn is_mergeable(doc: &Value) -> bool {
    let is_section = |v: Option<&Value>| matches!(v, None | Some(Value::Null | Value::Object(_)));

    match doc {
        // Any shape of `extends` is tolerated
        Value::Object(object) => is_section(object.get("properties")),
        _ => false,
    }
}

// =============================================================================
// Property 1: Base Properties Overlay Extensions
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// With the default precedence the merged mapping is the extension
    /// mapping overlaid by the document's own properties.
    #[test]
    fn prop_base_overlays_extensions(
        extends in arb_properties(),
        own in arb_properties(),
    ) {
        let merged = merged_properties(&schema(Some(&extends), &own), MergePrecedence::Base);

        let expected_keys: HashSet<&String> = extends.keys().chain(own.keys()).collect();
        prop_assert_eq!(merged.len(), expected_keys.len());

        for (key, value) in &merged {
            let expected = own.get(key).or_else(|| extends.get(key));
            prop_assert_eq!(Some(value), expected, "wrong value for {}", key);
        }

        // Extension keys keep their order at the front
        let leading: Vec<&String> = merged.keys().take(extends.len()).collect();
        let extension_keys: Vec<&String> = extends.keys().collect();
        prop_assert_eq!(leading, extension_keys);
    }
}

// =============================================================================
// Property 2: Extends Precedence Mirrors Base Precedence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_extends_precedence_keeps_extension_values(
        extends in arb_properties(),
        own in arb_properties(),
    ) {
        let doc = schema(Some(&extends), &own);
        let base = merged_properties(&doc, MergePrecedence::Base);
        let ext = merged_properties(&doc, MergePrecedence::Extends);

        let base_keys: Vec<&String> = base.keys().collect();
        let ext_keys: Vec<&String> = ext.keys().collect();
        prop_assert_eq!(base_keys, ext_keys);

        for (key, value) in &ext {
            let expected = extends.get(key).or_else(|| own.get(key));
            prop_assert_eq!(Some(value), expected);
        }
    }
}

// =============================================================================
// Property 3: Documents Without Extends Keep Their Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_no_extends_is_identity(
        own in arb_properties(),
        precedence in prop_oneof![Just(MergePrecedence::Base), Just(MergePrecedence::Extends)],
    ) {
        let doc = schema(None, &own);
        let merged = merge_properties(&doc, precedence).unwrap();

        prop_assert_eq!(merged, doc);
    }

    #[test]
    fn prop_other_keys_untouched(
        extends in arb_properties(),
        own in arb_properties(),
    ) {
        let doc = schema(Some(&extends), &own);
        let merged = merge_properties(&doc, MergePrecedence::Base).unwrap();

        prop_assert_eq!(&merged["title"], &doc["title"]);
        prop_assert_eq!(&merged["extends"], &doc["extends"]);
    }
}

// =============================================================================
// Property 4: Merge Is Total
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Merging never panics, and fails exactly when the document or its own
    /// `properties` is malformed.
    #[test]
    fn prop_merge_is_total(doc in arb_json()) {
        let result = merge_properties(&doc, MergePrecedence::Base);

        prop_assert_eq!(result.is_ok(), is_mergeable(&doc));
        if let Ok(merged) = result {
            prop_assert!(merged["properties"].is_object());
        }
    }
}

// =============================================================================
// Property 5: Traversal Completeness
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Every schema file outside `node_modules` is visited exactly once, and
    /// nothing else is.
    #[test]
    fn prop_traversal_completeness(
        files in prop::collection::vec((arb_dir(), "[a-z]{1,6}", any::<bool>()), 1..12),
    ) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("in");
        fs::create_dir_all(&root).unwrap();

        let mut expected = HashSet::new();
        for (segments, stem, is_schema) in &files {
            let parent: PathBuf = segments.iter().collect();
            let file_name = if *is_schema {
                format!("{stem}.json")
            } else {
                format!("{stem}.txt")
            };
            let path = root.join(&parent).join(&file_name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "{}").unwrap();

            if *is_schema && !segments.iter().any(|s| s == "node_modules") {
                expected.insert(path);
            }
        }

        let tasks = TreeWalker::new(&root, dir.path().join("zod")).tasks().unwrap();
        let found: HashSet<PathBuf> = tasks.iter().map(|t| t.schema_path.clone()).collect();

        prop_assert_eq!(tasks.len(), found.len(), "a schema was visited twice");
        prop_assert_eq!(found, expected);
    }
}

// =============================================================================
// Property 6: Output Tree Mirrors Input Tree
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_output_mirrors_input(
        segments in prop::collection::vec("[a-z]{1,5}", 0..4),
        stem in "[a-z][a-z0-9_]{0,8}",
    ) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("in");
        let out = dir.path().join("zod");
        let parent: PathBuf = segments.iter().collect();

        fs::create_dir_all(root.join(&parent)).unwrap();
        fs::write(root.join(&parent).join(format!("{stem}.json")), "{}").unwrap();

        let tasks = TreeWalker::new(&root, &out).tasks().unwrap();
        prop_assert_eq!(tasks.len(), 1);

        let task = &tasks[0];
        prop_assert_eq!(&task.name, &stem);
        prop_assert_eq!(
            task.output_path("ts"),
            out.join(&parent).join(format!("{stem}.ts"))
        );
        prop_assert!(task.output_path("ts").starts_with(Path::new(&out)));
    }
}

// =============================================================================
// Property 7: Config Override Precedence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Command-line values replace file values; absent flags keep them.
    #[test]
    fn prop_cli_overrides_config(
        file_dir in "[a-z]{1,8}",
        cli_dir in prop::option::of("[a-z]{1,8}"),
        file_prune in any::<bool>(),
        cli_prune in prop::option::of(any::<bool>()),
    ) {
        let mut config = Config::default();
        config.output.dir = PathBuf::from(&file_dir);
        config.output.prune = file_prune;

        let args = CliArgs {
            output: cli_dir.clone().map(PathBuf::from),
            prune: cli_prune,
            precedence: None,
        };
        let merged = ConfigManager::merge_cli_args(config, &args);

        prop_assert_eq!(merged.output.dir, PathBuf::from(cli_dir.unwrap_or(file_dir)));
        prop_assert_eq!(merged.output.prune, cli_prune.unwrap_or(file_prune));
        prop_assert_eq!(merged.merge.precedence, MergePrecedence::Base);
    }
}
