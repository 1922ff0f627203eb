use proptest::prelude::*;
use tracelink_core::{Identifier, SpecificationItem, link};

fn identifier() -> impl Strategy<Value = Identifier> {
    (
        "[a-z]{1,6}",
        "[A-Za-z][A-Za-z0-9._-]{0,12}",
        0..=tracelink_core::MAX_REVISION,
    )
        .prop_map(|(artifact_type, name, revision)| {
            Identifier::new(artifact_type, name, revision).expect("strategy yields valid ids")
        })
}

/// Small pools so that generated items actually reference each other.
fn pooled_identifier() -> impl Strategy<Value = Identifier> {
    (
        prop::sample::select(vec!["req", "dsn", "impl"]),
        prop::sample::select(vec!["a", "b", "c"]),
        0u32..3,
    )
        .prop_map(|(artifact_type, name, revision)| {
            Identifier::new(artifact_type, name, revision).expect("valid")
        })
}

fn items() -> impl Strategy<Value = Vec<SpecificationItem>> {
    let item = (
        pooled_identifier(),
        prop::collection::vec(prop::sample::select(vec!["req", "dsn", "impl"]), 0..3),
        prop::collection::vec((pooled_identifier(), any::<bool>()), 0..4),
    )
        .prop_map(|(id, needs, covers)| {
            let mut builder = SpecificationItem::builder();
            builder.id(id);
            for artifact_type in needs {
                builder.needs(artifact_type);
            }
            for (covered, wildcard) in covers {
                builder.covers(if wildcard {
                    covered.to_wildcard()
                } else {
                    covered
                });
            }
            builder.build().expect("valid item")
        });
    prop::collection::vec(item, 0..12)
}

proptest! {
    #[test]
    fn prop_parse_inverts_display(id in identifier()) {
        prop_assert_eq!(Identifier::parse(&id.to_string()), Ok(id));
    }

    #[test]
    fn prop_ordering_is_total(a in identifier(), b in identifier(), c in identifier()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        prop_assert_eq!(a == b, a.cmp(&b).is_eq());
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
        prop_assert!(a < a.to_wildcard());
    }

    #[test]
    fn prop_sorting_is_idempotent(mut ids in prop::collection::vec(identifier(), 0..20)) {
        ids.sort();
        let once = ids.clone();
        ids.sort();
        prop_assert_eq!(ids, once);
    }

    #[test]
    fn prop_linking_is_deterministic(input in items()) {
        let first = link(input.clone());
        let second = link(input);
        prop_assert_eq!(first.defect_ids(), second.defect_ids());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_every_resolved_edge_has_a_counterpart(input in items()) {
        let trace = link(input);
        let outgoing: usize = trace.items().iter().map(|i| i.count_outgoing_links()).sum();
        let incoming: usize = trace.items().iter().map(|i| i.count_incoming_links()).sum();
        let orphaned: usize = trace
            .items()
            .iter()
            .flat_map(|i| i.links())
            .filter(|l| l.is_outgoing() && l.other().is_none())
            .count();
        prop_assert_eq!(outgoing, incoming + orphaned);
        prop_assert_eq!(trace.count_defects(), trace.items().iter().filter(|i| i.is_defect()).count());
    }
}
