//! Registration SQL ordering tests
//!
//! Dependency rows must be registered in a fixed order: the extension's own
//! grant and registration first, then its dependencies in reverse of the
//! declared list.

mod common;

use brokkr_core::types::ExtensionDescriptor;
use brokkr_extensions::RegistrationSqlBuilder;
use common::statements;

#[test]
fn test_two_dependencies_register_in_reverse() {
    let descriptor = ExtensionDescriptor::new("manufacturing")
        .with_description("Work orders")
        .with_location("/private-extensions")
        .with_load_order(120)
        .with_dependencies(["d1", "d2"]);

    let sql = RegistrationSqlBuilder::new().build(&descriptor);
    let lines = statements(&sql);

    assert_eq!(
        lines,
        vec![
            "do $$ plv8.elog(NOTICE, \"About to register extension manufacturing\"); $$ language plv8;",
            "select xt.grant_role_ext('ADMIN', 'manufacturing');",
            "select xt.register_extension('manufacturing', 'Work orders', '/private-extensions', '', 120);",
            "select xt.register_extension_dependency('manufacturing', 'd2');",
            "select xt.grant_role_ext('ADMIN', 'd2');",
            "select xt.register_extension_dependency('manufacturing', 'd1');",
            "select xt.grant_role_ext('ADMIN', 'd1');",
        ]
    );
}

#[test]
fn test_dependency_statement_kinds_alternate() {
    let descriptor = ExtensionDescriptor::new("crm").with_dependencies(["a", "b", "c"]);
    let sql = RegistrationSqlBuilder::new().build(&descriptor);

    let order: Vec<String> = statements(&sql)
        .into_iter()
        .skip(1)
        .map(|line| {
            let call = line
                .trim_start_matches("select xt.")
                .split('(')
                .next()
                .unwrap();
            let target = line.rsplit('\'').nth(1).unwrap();
            format!("{}:{}", call, target)
        })
        .collect();

    assert_eq!(
        order,
        vec![
            "grant_role_ext:crm",
            "register_extension:",
            "register_extension_dependency:c",
            "grant_role_ext:c",
            "register_extension_dependency:b",
            "grant_role_ext:b",
            "register_extension_dependency:a",
            "grant_role_ext:a",
        ]
    );
}
