use pretty_assertions::assert_eq;

use crate::{
    config::{DeferHandling, TypegenConfig},
    schema::OperationKind,
    tests::testkit::{project, project_default},
};

static SCHEMA: &str = r#"
scalar DateTime
enum Role { ADMIN USER }
input UserFilter { name: String }

type Query {
  users(first: Int, filter: UserFilter, ids: [ID!]!): [User]
  me: User
}

type Mutation {
  like(id: ID!): Int
}

type User {
  id: ID!
  name: String
  createdAt: DateTime
}
"#;

#[test]
fn variables_follow_nullability_and_defaults() {
    let projected = project_default(
        SCHEMA,
        r#"
        query Users($first: Int = 10, $filter: UserFilter, $ids: [ID!]!, $since: DateTime!, $role: Role) {
          users(first: $first, filter: $filter, ids: $ids) { id }
        }
        "#,
    );

    let operation = &projected.documents.operations[0];
    assert_eq!(operation.result_type_name, "UsersQuery");
    assert_eq!(operation.variables_type_name, "UsersQueryVariables");
    insta::assert_snapshot!(
        operation.variables_type,
        @"{ first?: Maybe<number>; filter?: Maybe<UserFilter>; ids: Array<string>; since: any; role?: Maybe<Role> }"
    );
}

#[test]
fn defaulted_non_null_variable_is_optional() {
    let projected = project_default(SCHEMA, "query Me($id: ID! = 1) { me { id } }");

    insta::assert_snapshot!(projected.documents.operations[0].variables_type, @"{ id?: string }");
}

#[test]
fn operation_kinds_pick_their_root_and_suffix() {
    let projected = project_default(SCHEMA, "mutation Like { like(id: 1) }");

    let operation = &projected.documents.operations[0];
    assert_eq!(operation.operation_kind, OperationKind::Mutation);
    assert_eq!(operation.result_type_name, "LikeMutation");
    assert_eq!(operation.variables_type_name, "LikeMutationVariables");
    insta::assert_snapshot!(operation.result_type, @"{ __typename?: 'Mutation' } & Pick<Mutation, 'like'>");
    insta::assert_snapshot!(operation.variables_type, @"{}");
}

#[test]
fn anonymous_operations_are_numbered_across_the_batch() {
    let projected = project(
        SCHEMA,
        &["{ me { id } } query Named { me { id } }", "{ me { name } }"],
        TypegenConfig::default(),
    );

    assert_eq!(
        projected
            .documents
            .operations
            .iter()
            .map(|operation| operation.result_type_name.as_str())
            .collect::<Vec<_>>(),
        vec!["Unnamed_1_Query", "NamedQuery", "Unnamed_2_Query"]
    );
}

#[test]
fn suffix_policies() {
    let source = "query GetUserQuery { me { id } } query GetUser { me { id } }";

    let names = |config: TypegenConfig| {
        project(SCHEMA, &[source], config)
            .documents
            .operations
            .iter()
            .map(|operation| {
                (
                    operation.result_type_name.clone(),
                    operation.variables_type_name.clone(),
                )
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(
        names(TypegenConfig::default()),
        vec![
            (
                "GetUserQueryQuery".to_string(),
                "GetUserQueryQueryVariables".to_string()
            ),
            ("GetUserQuery".to_string(), "GetUserQueryVariables".to_string()),
        ]
    );
    assert_eq!(
        names(TypegenConfig {
            dedupe_operation_suffix: true,
            ..Default::default()
        }),
        vec![
            ("GetUserQuery".to_string(), "GetUserQueryVariables".to_string()),
            ("GetUserQuery".to_string(), "GetUserQueryVariables".to_string()),
        ]
    );
    assert_eq!(
        names(TypegenConfig {
            omit_operation_suffix: true,
            ..Default::default()
        }),
        vec![
            ("GetUserQuery".to_string(), "GetUserQueryVariables".to_string()),
            ("GetUser".to_string(), "GetUserVariables".to_string()),
        ]
    );
}

#[test]
fn deferred_fragments_are_flattened_by_default() {
    let source = "query Me { me { id ... @defer { name } } }";

    let flattened = project_default(SCHEMA, source);
    insta::assert_snapshot!(
        flattened.result_type("Me"),
        @"{ __typename?: 'Query' } & { me?: Maybe<{ __typename?: 'User' } & Pick<User, 'id' | 'name'>> }"
    );

    let incremental = project(
        SCHEMA,
        &[source],
        TypegenConfig {
            defer_handling: DeferHandling::Incremental,
            ..Default::default()
        },
    );
    insta::assert_snapshot!(
        incremental.result_type("Me"),
        @"{ __typename?: 'Query' } & { me?: Maybe<{ __typename?: 'User' } & Pick<User, 'id'> & Incremental<{ __typename?: 'User' } & Pick<User, 'name'>>> }"
    );
    insta::assert_snapshot!(
        incremental.materialized("Me"),
        @"{ __typename?: 'Query'; me?: Maybe<{ __typename?: 'User'; id: string } & Incremental<{ __typename?: 'User'; name?: Maybe<string> }>> }"
    );
}

#[test]
fn custom_scalar_fields_use_the_default_scalar_type() {
    let projected = project(
        SCHEMA,
        &["query Me { me { createdAt } }"],
        TypegenConfig {
            default_scalar_type: "unknown".to_string(),
            ..Default::default()
        },
    );

    insta::assert_snapshot!(
        projected.materialized("Me"),
        @"{ __typename?: 'Query'; me?: Maybe<{ __typename?: 'User'; createdAt?: Maybe<unknown> }> }"
    );
}
