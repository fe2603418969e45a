use pretty_assertions::assert_eq;

use crate::{
    config::{FragmentMode, TypegenConfig},
    error::TypegenError,
    fragments::FragmentError,
    ir::FragmentReference,
    tests::testkit::{project, project_default, try_project},
};

static NODE_SCHEMA: &str = r#"
type Query {
  me: User
  node: Node
}

interface Node {
  id: ID!
}

type User implements Node {
  id: ID!
  name: String
}

type Post implements Node {
  id: ID!
}
"#;

#[test]
fn shared_fragment_is_registered_once_and_referenced_everywhere() {
    let projected = project(
        "type Query { a: String }",
        &[
            "fragment F on Query { a } query One { ...F ...F }",
            "query Two { ...F } fragment F on Query { a }",
        ],
        TypegenConfig::default(),
    );

    assert_eq!(projected.documents.registry.len(), 1);
    assert_eq!(projected.documents.fragments.len(), 1);

    let reference = FragmentReference {
        fragment: "F".to_string(),
        output_name: "FFragment".to_string(),
        type_condition: "Query".to_string(),
        pinned_type: None,
    };
    for operation in &projected.documents.operations {
        assert_eq!(operation.fragment_references, vec![reference.clone()]);
    }

    insta::assert_snapshot!(projected.result_type("One"), @"{ __typename?: 'Query' } & FragmentRef<'F'>");
    assert_eq!(projected.result_type("One"), projected.result_type("Two"));
    insta::assert_snapshot!(projected.materialized("One"), @"{ __typename?: 'Query'; a?: Maybe<string> }");
}

#[test]
fn conflicting_fragments_fail_registration() {
    let result = try_project(
        "type Query { a: String b: String }",
        &["fragment F on Query { a }", "fragment F on Query { b }"],
        TypegenConfig::default(),
    );

    assert!(matches!(
        result,
        Err(TypegenError::FragmentError(FragmentError::DuplicatedFragment { fragment_name }))
            if fragment_name == "F"
    ));
}

#[test]
fn interface_fragment_on_concrete_parent_is_pinned() {
    let projected = project_default(
        NODE_SCHEMA,
        r#"
        fragment NodeId on Node { id }
        query Q { me { ...NodeId name } node { ...NodeId } }
        "#,
    );

    insta::assert_snapshot!(
        projected.result_type("Q"),
        @"{ __typename?: 'Query' } & { me?: Maybe<{ __typename?: 'User' } & Pick<User, 'name'> & FragmentRef<'NodeId', 'User'>>; node?: Maybe<{ __typename?: ('User' | 'Post') } & FragmentRef<'NodeId'>> }"
    );

    let fragment = &projected.documents.fragments["NodeId"];
    assert_eq!(fragment.output_name, "NodeIdFragment");
    insta::assert_snapshot!(fragment.shape, @"{ __typename?: ('User' | 'Post') } & Pick<Node, 'id'>");
    assert_eq!(
        fragment
            .variants
            .iter()
            .map(|(type_name, variant)| (type_name.as_str(), variant.output_name.as_str()))
            .collect::<Vec<_>>(),
        vec![
            ("User", "NodeId_User_Fragment"),
            ("Post", "NodeId_Post_Fragment")
        ]
    );
    insta::assert_snapshot!(fragment.variants["User"].shape, @"{ __typename?: 'User' } & Pick<User, 'id'>");

    let pinned = &projected.documents.operations[0].fragment_references;
    assert_eq!(
        pinned
            .iter()
            .map(|reference| reference.output_name.as_str())
            .collect::<Vec<_>>(),
        vec!["NodeId_User_Fragment", "NodeIdFragment"]
    );
}

#[test]
fn inline_mode_substitutes_shapes_and_mask_mode_keeps_references() {
    let source = r#"
        fragment NodeId on Node { id }
        query Q { me { ...NodeId name } node { ...NodeId } }
    "#;

    let inline = project_default(NODE_SCHEMA, source);
    insta::assert_snapshot!(
        inline.materialized("Q"),
        @"{ __typename?: 'Query'; me?: Maybe<{ __typename?: 'User'; name?: Maybe<string>; id: string }>; node?: Maybe<{ __typename?: ('User' | 'Post'); id: string }> }"
    );

    let masked = project(
        NODE_SCHEMA,
        &[source],
        TypegenConfig {
            inline_fragment_types: FragmentMode::Mask,
            ..Default::default()
        },
    );
    insta::assert_snapshot!(
        masked.materialized("Q"),
        @"{ __typename?: 'Query'; me?: Maybe<{ __typename?: 'User'; name?: Maybe<string> } & FragmentRef<'NodeId', 'User'>>; node?: Maybe<{ __typename?: ('User' | 'Post') } & FragmentRef<'NodeId'>> }"
    );
}

#[test]
fn combine_mode_intersects_fragment_type_names() {
    let projected = project(
        NODE_SCHEMA,
        &[r#"
        fragment NodeId on Node { id }
        query Q { me { ...NodeId name } node { ...NodeId } }
        "#],
        TypegenConfig {
            inline_fragment_types: FragmentMode::Combine,
            ..Default::default()
        },
    );

    insta::assert_snapshot!(
        projected.materialized("Q"),
        @"{ __typename?: 'Query'; me?: Maybe<{ __typename?: 'User'; name?: Maybe<string> } & NodeId_User_Fragment>; node?: Maybe<{ __typename?: ('User' | 'Post') } & NodeIdFragment> }"
    );
}

#[test]
fn link_field_shared_with_an_inlined_fragment_is_merged() {
    let projected = project_default(
        "type Query { me: User } type User { id: ID! name: String friends: [User!]! }",
        r#"
        fragment F on User { friends { id } }
        query Q { me { friends { name } ...F } }
        "#,
    );

    insta::assert_snapshot!(
        projected.materialized("Q"),
        @"{ __typename?: 'Query'; me?: Maybe<{ __typename?: 'User'; friends: Array<{ __typename?: 'User'; name?: Maybe<string>; id: string }> }> }"
    );
}

#[test]
fn pinned_variants_keep_the_separator_without_a_suffix() {
    let projected = project(
        NODE_SCHEMA,
        &["fragment NodeId on Node { id } query Q { me { ...NodeId } }"],
        TypegenConfig {
            omit_operation_suffix: true,
            ..Default::default()
        },
    );

    let fragment = &projected.documents.fragments["NodeId"];
    assert_eq!(fragment.output_name, "NodeId");
    assert_eq!(fragment.variants["User"].output_name, "NodeId_User_");
    assert_eq!(
        projected.documents.operations[0].fragment_references[0].output_name,
        "NodeId_User_"
    );
}

#[test]
fn concrete_fragment_on_abstract_parent_becomes_a_branch() {
    let projected = project_default(
        NODE_SCHEMA,
        r#"
        fragment UserName on User { name }
        query Q { node { id ...UserName } }
        "#,
    );

    insta::assert_snapshot!(
        projected.result_type("Q"),
        @"{ __typename?: 'Query' } & { node?: Maybe<{ __typename?: ('User' | 'Post') } & Pick<Node, 'id'> & ({ __typename?: 'User' } & FragmentRef<'UserName'> | {})> }"
    );
}

#[test]
fn indirect_cycles_project_and_materialize_finitely() {
    let projected = project_default(
        "type Query { a: String b: String c: String }",
        r#"
        fragment A on Query { a ...C }
        fragment B on Query { b ...A }
        fragment C on Query { c ...B }
        query Q { ...A }
        "#,
    );

    assert_eq!(
        projected.documents.fragments.keys().collect::<Vec<_>>(),
        vec!["B", "C", "A"]
    );
    insta::assert_snapshot!(
        projected.documents.fragments["A"].shape,
        @"{ __typename?: 'Query' } & Pick<Query, 'a'> & FragmentRef<'C'>"
    );
    insta::assert_snapshot!(
        projected.materialized("Q"),
        @"{ __typename?: 'Query'; a?: Maybe<string>; c?: Maybe<string>; b?: Maybe<string> } & FragmentRef<'A'>"
    );
}

#[test]
fn fragment_suffix_follows_operation_suffix_policy() {
    let projected = project(
        "type Query { a: String }",
        &["fragment QueryFieldsFragment on Query { a } query Q { ...QueryFieldsFragment }"],
        TypegenConfig {
            dedupe_operation_suffix: true,
            types_prefix: "I".to_string(),
            ..Default::default()
        },
    );

    assert_eq!(
        projected.documents.fragments["QueryFieldsFragment"].output_name,
        "QueryFieldsFragment"
    );
    assert_eq!(projected.documents.operations[0].result_type_name, "IQQuery");
}
