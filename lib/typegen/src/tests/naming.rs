use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::{
    config::{NamingConventionConfig, NamingConventionMap, TypegenConfig},
    naming::{NamingFunction, NamingPolicy},
    operations::project_documents,
    parse_document, parse_schema,
    tests::testkit::{init_logger, project},
};

static SCHEMA: &str = r#"
enum user_role { ADMIN_USER }
type Query { role: user_role profile: user_profile }
type user_profile { role: user_role }
"#;

fn result_names(config: TypegenConfig) -> Vec<String> {
    project(
        SCHEMA,
        &["query get_profile { profile { role } kind: role }"],
        config,
    )
    .documents
    .operations
    .iter()
    .flat_map(|operation| {
        [
            operation.result_type_name.clone(),
            operation.result_type.to_string(),
        ]
    })
    .collect()
}

#[test]
fn pascal_case_keeps_underscore_segments_by_default() {
    assert_eq!(
        result_names(TypegenConfig::default()),
        vec![
            "Get_ProfileQuery".to_string(),
            concat!(
                "{ __typename?: 'Query' } & { kind?: Maybe<User_Role> } & ",
                "{ profile?: Maybe<{ __typename?: 'user_profile' } & Pick<user_profile, 'role'>> }"
            )
            .to_string(),
        ]
    );
}

#[test]
fn keep_leaves_names_untouched() {
    let names = result_names(TypegenConfig {
        naming_convention: Some(NamingConventionConfig::Convention("keep".to_string())),
        ..Default::default()
    });

    assert_eq!(names[0], "get_profileQuery");
    assert!(names[1].contains("kind?: Maybe<user_role>"));
}

#[test]
fn per_kind_map_with_transform_underscore() {
    let names = result_names(TypegenConfig {
        naming_convention: Some(NamingConventionConfig::PerKind(NamingConventionMap {
            type_names: Some("change-case-all#pascalCase".to_string()),
            enum_values: Some("keep".to_string()),
            transform_underscore: Some(true),
        })),
        types_prefix: "T".to_string(),
        ..Default::default()
    });

    assert_eq!(names[0], "TGetProfileQuery");
    assert!(names[1].contains("kind?: Maybe<TUserRole>"));
}

#[test]
fn custom_function_is_resolved_once_and_applied_everywhere() {
    init_logger();
    let schema = parse_schema(SCHEMA).unwrap();
    let policy = NamingPolicy::Custom(NamingFunction::Custom(Arc::new(|name: &str| {
        name.to_uppercase()
    })));
    let config = TypegenConfig::default()
        .resolve_with_naming(&schema, policy)
        .unwrap();
    let documents = vec![parse_document("query get_profile { kind: role }").unwrap()];
    let projected = project_documents(&schema, &documents, &config).unwrap();

    assert_eq!(projected.operations[0].result_type_name, "GET_PROFILEQUERY");
    insta::assert_snapshot!(
        projected.operations[0].result_type,
        @"{ __typename?: 'Query' } & { kind?: Maybe<USER_ROLE> }"
    );
}
