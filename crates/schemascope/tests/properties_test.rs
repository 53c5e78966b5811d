//! Property tests over randomly generated class hierarchies.

use std::collections::HashSet;

use proptest::{prelude::*, sample::Index};
use schemascope::{
    Schema,
    description::{ClassDeclaration, SchemaDescription},
    geometry::Bounds,
    identifier::{Id, PanelId},
    links::{LinkPair, PanelSnapshot},
    structure::{EdgeKind, NodeKind},
};

/// One generated class: a parent choice and `(label, range choice)` attributes.
type ClassSeed = (Index, Vec<(u8, Index)>);

fn class_seeds() -> impl Strategy<Value = Vec<ClassSeed>> {
    prop::collection::vec(
        (
            any::<Index>(),
            prop::collection::vec((0u8..6, any::<Index>()), 0..4),
        ),
        1..12,
    )
}

fn class_name(index: usize) -> String {
    format!("C{index}")
}

/// Builds a description whose parents always precede their children, so the
/// hierarchy is a forest by construction.
fn description_from(seeds: &[ClassSeed]) -> SchemaDescription {
    let count = seeds.len();
    let mut description = SchemaDescription::default();
    for (i, (parent, attributes)) in seeds.iter().enumerate() {
        let mut class = ClassDeclaration::new();
        let parent = parent.index(i + 1);
        if parent < i {
            class = class.with_parent(&class_name(parent));
        }
        for (label, range) in attributes {
            let range = range.index(count + 1);
            let range = if range == count {
                "string".to_string()
            } else {
                class_name(range)
            };
            class = class.with_attribute(&format!("attr{label}"), &range);
        }
        description = description.with_class(&class_name(i), class);
    }
    description
}

fn snapshot(name: &str, min_x: f32, schema: &Schema, picks: &[Index]) -> PanelSnapshot {
    let classes = schema.index().members(NodeKind::Class);
    let mut snapshot =
        PanelSnapshot::new(PanelId::new(name), Bounds::new(min_x, 0.0, min_x + 300.0, 2000.0))
            .with_expanded(classes.iter().copied());
    for (row, pick) in picks.iter().enumerate() {
        let top = row as f32 * 30.0;
        snapshot.push_item(
            classes[pick.index(classes.len())],
            Bounds::new(min_x + 20.0, top, min_x + 220.0, top + 20.0),
        );
    }
    snapshot
}

fn summary(pairs: &[LinkPair]) -> Vec<String> {
    let mut summary: Vec<String> = pairs
        .iter()
        .map(|pair| {
            format!(
                "{}@{} {} {}@{} {:?} {}",
                pair.source().node(),
                pair.source().panel(),
                pair.direction(),
                pair.target().node(),
                pair.target().panel(),
                pair.label(),
                pair.strategy(),
            )
        })
        .collect();
    summary.sort();
    summary
}

proptest! {
    #[test]
    fn test_class_hierarchy_is_a_forest(seeds in class_seeds()) {
        let schema = Schema::build(&description_from(&seeds)).unwrap();
        let index = schema.index();

        let mut seen = HashSet::new();
        for &root in index.roots(NodeKind::Class) {
            prop_assert!(seen.insert(root));
            for descendant in index.descendants(root).unwrap() {
                prop_assert!(seen.insert(descendant), "{descendant} reached twice");
            }
        }
        prop_assert_eq!(seen.len(), seeds.len());
    }

    #[test]
    fn test_resolved_labels_are_unique(seeds in class_seeds()) {
        let schema = Schema::build(&description_from(&seeds)).unwrap();

        for i in 0..seeds.len() {
            let id = Id::new(&class_name(i));
            let relationships = schema.relationships(id).unwrap();

            let mut labels = HashSet::new();
            for edge in relationships.outgoing_of_kind(EdgeKind::Property) {
                prop_assert_eq!(edge.source(), id);
                prop_assert!(
                    labels.insert(edge.label().unwrap_or_default()),
                    "label {:?} resolved twice on {}", edge.label(), id
                );
            }
            prop_assert!(relationships.outgoing_of_kind(EdgeKind::Inheritance).count() <= 1);
        }
    }

    #[test]
    fn test_link_layout_is_deterministic_and_order_free(
        seeds in class_seeds(),
        left_picks in prop::collection::vec(any::<Index>(), 0..8),
        right_picks in prop::collection::vec(any::<Index>(), 0..8),
    ) {
        let schema = Schema::build(&description_from(&seeds)).unwrap();
        let left = snapshot("left", 0.0, &schema, &left_picks);
        let right = snapshot("right", 400.0, &schema, &right_picks);
        let engine = schema.link_engine();

        let first = engine.compute_links(&left, &right);
        let second = engine.compute_links(&left, &right);
        prop_assert_eq!(&first, &second);

        let swapped = engine.compute_links(&right, &left);
        prop_assert_eq!(summary(&first), summary(&swapped));

        for pair in &first {
            prop_assert!(pair.curve().start().x().is_finite());
            if pair.is_self_loop() {
                prop_assert_eq!(pair.source().node(), pair.target().node());
            }
        }
    }
}
