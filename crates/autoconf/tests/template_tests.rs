//! Template validation and correlation tests

use autoconf::template::{build_configs, is_valid_template};
use autoconf::{CheckConfig, ConfigData, FillPolicy, NamespacePath, TemplateLayout};
use serde_json::json;

const REQUIRED: [&str; 3] = ["instances", "check_names", "init_configs"];
const EXTRAS: [&str; 4] = ["README", "owner", "instances.bak", "checks"];

/// Every subset of `items`, by bitmask.
fn subsets<'a>(items: &[&'a str]) -> Vec<Vec<&'a str>> {
    (0..(1u32 << items.len()))
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, item)| *item)
                .collect()
        })
        .collect()
}

#[test]
fn test_validator_over_all_small_sets() {
    let layout = TemplateLayout::default();
    let universe: Vec<&str> = REQUIRED
        .iter()
        .chain(EXTRAS.iter())
        .copied()
        .collect();

    for children in subsets(&universe) {
        let has_all = REQUIRED.iter().all(|r| children.contains(r));
        let expected = children.len() >= 3 && has_all;
        assert_eq!(
            is_valid_template(&children, &layout),
            expected,
            "unexpected verdict for {children:?}"
        );
    }
}

#[test]
fn test_validator_rejects_fewer_than_three() {
    let layout = TemplateLayout::default();
    for children in subsets(&REQUIRED).into_iter().filter(|s| s.len() < 3) {
        assert!(!is_valid_template(&children, &layout), "{children:?}");
    }
}

fn doc(value: serde_json::Value) -> ConfigData {
    value.as_object().cloned().expect("object literal")
}

#[test]
fn test_zip_with_short_init_configs() {
    let source = NamespacePath::parse("/templates/cache");
    let names = vec!["a".to_string(), "b".to_string()];
    let i1 = doc(json!({"min_collection_interval": 30}));
    let n1 = doc(json!({"host": "10.0.0.1"}));
    let n2 = doc(json!({"host": "10.0.0.2"}));

    let configs =
        build_configs(&source, &names, &[i1.clone()], &[n1.clone(), n2.clone()], FillPolicy::Empty);

    // Missing init configs are filled with an empty document.
    assert_eq!(
        configs,
        vec![
            CheckConfig::new(source.clone(), "a", i1, n1),
            CheckConfig::new(source.clone(), "b", ConfigData::new(), n2),
        ]
    );
}

#[test]
fn test_zip_with_short_init_configs_repeat_last() {
    let source = NamespacePath::parse("/templates/cache");
    let names = vec!["a".to_string(), "b".to_string()];
    let i1 = doc(json!({"min_collection_interval": 30}));
    let n1 = doc(json!({"host": "10.0.0.1"}));
    let n2 = doc(json!({"host": "10.0.0.2"}));

    let configs = build_configs(
        &source,
        &names,
        &[i1.clone()],
        &[n1.clone(), n2.clone()],
        FillPolicy::RepeatLast,
    );

    assert_eq!(configs[1], CheckConfig::new(source.clone(), "b", i1, n2));
}
