use dcc_core::prelude::*;

struct Fixture {
    hierarchy: QualifierHierarchy,
}

impl Fixture {
    fn new() -> Self {
        Self {
            hierarchy: QualifierHierarchy::new(Catalog::standard()),
        }
    }

    fn q(&self, text: &str) -> Qualifier {
        self.hierarchy.catalog().parse_qualifier(text).unwrap()
    }

    fn leaf(&self, text: &str) -> AnnotatedType {
        AnnotatedType::leaf(Some(self.q(text)))
    }

    fn inference(&self) -> EntityInference<'_> {
        EntityInference::new(&self.hierarchy, &AnalysisConfig::default()).unwrap()
    }
}

fn class_ref(name: &str) -> AnnotatedType {
    AnnotatedType::declared(name, None, vec![])
}

#[test]
fn test_container_takes_most_sensitive_member() {
    let fx = Fixture::new();
    let mut graph = DeclarationGraph::new();
    let customer = graph
        .insert(
            Declaration::new("Customer", None)
                .with_member(Member::field("taxId", fx.leaf("HighlyConfidential")))
                .with_member(Member::method("getEmail", Some(fx.leaf("Confidential")))),
        )
        .unwrap();

    let inferred = fx.inference().resolve_entity_qualifier(&graph, customer).unwrap();
    assert_eq!(inferred, fx.q("HighlyConfidential"));
}

#[test]
fn test_polymorphic_return_excluded() {
    let fx = Fixture::new();
    let mut graph = DeclarationGraph::new();
    let boxed = graph
        .insert(
            Declaration::new("Box", None)
                .with_member(Member::method("get", Some(AnnotatedType::leaf(Some(fx.hierarchy.poly())))))
                .with_member(Member::method("size", Some(AnnotatedType::leaf(None)))),
        )
        .unwrap();

    let inferred = fx.inference().resolve_entity_qualifier(&graph, boxed).unwrap();
    assert_eq!(inferred, fx.q("Public"));
}

#[test]
fn test_mutually_referencing_declarations() {
    let fx = Fixture::new();
    let mut graph = DeclarationGraph::new();
    let a = graph
        .insert(Declaration::new("A", None).with_member(Member::field("b", class_ref("B"))))
        .unwrap();
    let b = graph
        .insert(Declaration::new("B", None).with_member(Member::field("a", class_ref("A"))))
        .unwrap();

    let mut inference = fx.inference();
    let public = fx.q("Public");
    let inferred_a = inference.resolve_entity_qualifier(&graph, a).unwrap();
    assert!(fx.hierarchy.is_subtype(&public, &inferred_a));
    assert_eq!(inferred_a, public);
    assert_eq!(inference.resolve_entity_qualifier(&graph, b).unwrap(), public);
    assert_eq!(inference.stats().reentrant_hits, 1);
}

#[test]
fn test_cycle_with_sensitive_member_propagates() {
    let fx = Fixture::new();
    let mut graph = DeclarationGraph::new();
    graph
        .insert(Declaration::new("Order", None).with_member(Member::field("owner", class_ref("User"))))
        .unwrap();
    graph
        .insert(
            Declaration::new("User", None)
                .with_member(Member::field("orders", AnnotatedType::declared("List", None, vec![class_ref("Order")])))
                .with_member(Member::field("password", fx.leaf("Restricted"))),
        )
        .unwrap();

    let inferred = fx.inference().infer_all(&graph).unwrap();
    assert_eq!(inferred["Order"], fx.q("Restricted"));
    assert_eq!(inferred["User"], fx.q("Restricted"));
}

#[test]
fn test_nested_generic_array_field() {
    let fx = Fixture::new();
    let mut graph = DeclarationGraph::new();
    let entries = AnnotatedType::declared(
        "Map",
        None,
        vec![
            AnnotatedType::leaf(None),
            AnnotatedType::array(None, fx.leaf("Critical[settlement]")),
        ],
    );
    let ledger = graph
        .insert(Declaration::new("Ledger", None).with_member(Member::field("entries", entries)))
        .unwrap();

    let inferred = fx.inference().resolve_entity_qualifier(&graph, ledger).unwrap();
    assert_eq!(fx.hierarchy.catalog().describe(&inferred), "Critical[settlement]");
}

#[test]
fn test_repeated_declaration_name_rejected() {
    let fx = Fixture::new();
    let mut graph = DeclarationGraph::new();
    let key = graph
        .insert(Declaration::new("Keyring", None).with_member(Member::field("key", fx.leaf("Critical"))))
        .unwrap();

    assert!(matches!(
        graph.insert(Declaration::new("Keyring", None)),
        Err(ClassificationError::DuplicateDeclaration { .. })
    ));
    assert_eq!(fx.inference().resolve_entity_qualifier(&graph, key).unwrap(), fx.q("Critical"));
}

#[test]
fn test_resolver_cases() {
    let fx = Fixture::new();
    let h = &fx.hierarchy;
    let resolver = ClassificationPolymorphism::new(h);

    let poly_ty = AnnotatedType::leaf(Some(h.poly()));
    let subst = Substitution::new().bind(h.poly(), fx.q("HighlyConfidential"));
    assert_eq!(resolver.resolve(&poly_ty, &subst).unwrap().qualifier, Some(fx.q("HighlyConfidential")));

    let use_ty = AnnotatedType::leaf(Some(h.poly_use()));
    let to_poly = Substitution::new().bind(h.poly_use(), h.poly());
    assert_eq!(resolver.resolve(&use_ty, &to_poly).unwrap().qualifier, Some(h.poly()));

    let to_concrete = Substitution::new().bind(h.poly_use(), fx.q("Confidential"));
    assert_eq!(resolver.resolve(&use_ty, &to_concrete).unwrap(), use_ty);
}

#[test]
fn test_resolved_return_feeds_inference() {
    let fx = Fixture::new();
    let h = &fx.hierarchy;
    let resolver = ClassificationPolymorphism::new(h);
    let subst = Substitution::new().bind(h.poly(), fx.q("Restricted"));
    let generic_return = AnnotatedType::declared("Optional", None, vec![AnnotatedType::leaf(Some(h.poly()))]);

    let resolved = resolver.resolve_nested(&generic_return, &subst).unwrap();
    let mut graph = DeclarationGraph::new();
    let id = graph
        .insert(Declaration::new("Lookup", None).with_member(Member::method("find", Some(resolved))))
        .unwrap();

    assert_eq!(fx.inference().resolve_entity_qualifier(&graph, id).unwrap(), fx.q("Restricted"));
}

#[test]
fn test_alias_qualifiers_are_canonical() {
    let fx = Fixture::new();
    assert_eq!(fx.q("AnyConfidentiality"), fx.q("Critical"));
    assert_eq!(fx.q("NonConfidential"), fx.q("Public"));
}

#[test]
fn test_configured_alias_and_capacity() {
    let config =
        AnalysisConfig::from_toml_str("cache_capacity = 2\n[aliases]\nPii = \"HighlyConfidential\"").unwrap();
    let hierarchy = QualifierHierarchy::new(config.catalog().unwrap());
    let pii = hierarchy.catalog().parse_qualifier("Pii").unwrap();

    let mut graph = DeclarationGraph::new();
    for name in ["A", "B", "C"] {
        let field = Member::field("x", AnnotatedType::leaf(Some(pii.clone())));
        graph.insert(Declaration::new(name, None).with_member(field)).unwrap();
    }

    let mut inference = EntityInference::new(&hierarchy, &config).unwrap();
    let inferred = inference.infer_all(&graph).unwrap();
    assert!(inferred.values().all(|q| *q == pii));
    assert_eq!(inference.stats().evictions, 1);
}
