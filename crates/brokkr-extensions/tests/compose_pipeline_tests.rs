//! Compose pipeline integration tests
//!
//! Tests manifest-to-bundle composition including:
//! - Plain concatenation in manifest order
//! - Foundation and frozen manifest inclusion
//! - Preamble ordering (wipe, js init, registration)
//! - Fail-fast behavior on bad fragments

mod common;

use brokkr_core::config::TerminatorPolicy;
use brokkr_core::Error;
use brokkr_extensions::composer::JS_INIT_SQL;
use brokkr_extensions::{
    ComposeOptions, ExtensionComposer, ManifestResolver, ResolveOptions, ScriptCompiler,
};
use common::*;

fn composer(tree: &SourceTree) -> ExtensionComposer {
    ExtensionComposer::new(
        ManifestResolver::default(),
        ScriptCompiler::default(),
        tree.path("app/delete_system_orms.sql"),
    )
}

#[tokio::test]
async fn test_bundle_is_ordered_concatenation() {
    let tree = SourceTree::new();
    let manifest = tree.extension(
        "crm/database/source",
        None,
        &["tables.sql", "functions.sql", "views.sql"],
    );

    let sql = composer(&tree)
        .build_extension(&manifest, &ResolveOptions::default(), &ComposeOptions::default())
        .await
        .unwrap();

    let expected: String = ["tables.sql", "functions.sql", "views.sql"]
        .iter()
        .map(|f| format!("\n{}select '{}';", notice(f), f))
        .collect();
    assert_eq!(sql, expected);
}

#[tokio::test]
async fn test_foundation_scripts_come_first() {
    let tree = SourceTree::new();
    tree.extension(
        "inventory/foundation-database",
        Some("xtmfg"),
        &["itemsite.sql", "invhist.sql"],
    );
    let manifest = tree.extension("inventory/database/source", None, &["mobile.sql"]);

    let resolver = ManifestResolver::default();
    let resolved = resolver
        .resolve(
            &manifest,
            &ResolveOptions {
                use_foundation_scripts: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        resolved.scripts,
        vec![
            camino::Utf8PathBuf::from("../../foundation-database/itemsite.sql"),
            "../../foundation-database/invhist.sql".into(),
            "mobile.sql".into(),
        ]
    );
    assert_eq!(resolved.default_schema.as_deref(), Some("xtmfg"));

    let sql = composer(&tree)
        .build_extension(
            &manifest,
            &ResolveOptions {
                use_foundation_scripts: true,
                ..Default::default()
            },
            &ComposeOptions::default(),
        )
        .await
        .unwrap();

    let itemsite = sql.find("select 'itemsite.sql';").unwrap();
    let invhist = sql.find("select 'invhist.sql';").unwrap();
    let mobile = sql.find("select 'mobile.sql';").unwrap();
    assert!(itemsite < invhist && invhist < mobile);
}

#[tokio::test]
async fn test_own_default_schema_wins_over_foundation() {
    let tree = SourceTree::new();
    tree.extension("inventory/foundation-database", Some("xtmfg"), &["a.sql"]);
    let manifest = tree.extension("inventory/database/source", Some("xm"), &["b.sql"]);

    let resolved = ManifestResolver::default()
        .resolve(
            &manifest,
            &ResolveOptions {
                use_foundation_scripts: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(resolved.default_schema.as_deref(), Some("xm"));
}

#[tokio::test]
async fn test_frozen_and_foundation_combined() {
    let tree = SourceTree::new();
    tree.extension("inventory/foundation-database", None, &["base.sql"]);
    tree.write(
        "inventory/foundation-database/frozen_manifest.js",
        r#"{"databaseScripts": [["seed.sql"]]}"#,
    );
    tree.write("inventory/foundation-database/seed.sql", "select 'seed';");
    let manifest = tree.extension("inventory/database/source", None, &["own.sql"]);

    let resolved = ManifestResolver::default()
        .resolve(
            &manifest,
            &ResolveOptions {
                use_foundation_scripts: true,
                use_frozen_scripts: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let scripts: Vec<&str> = resolved.scripts.iter().map(|p| p.as_str()).collect();
    assert_eq!(
        scripts,
        vec![
            "../../foundation-database/seed.sql",
            "../../foundation-database/base.sql",
            "own.sql",
        ]
    );
}

#[tokio::test]
async fn test_missing_foundation_manifest() {
    let tree = SourceTree::new();
    let manifest = tree.extension("inventory/database/source", None, &["own.sql"]);

    let err = ManifestResolver::default()
        .resolve(
            &manifest,
            &ResolveOptions {
                use_foundation_scripts: true,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::ManifestNotFound { ref path } if path.ends_with("foundation-database/manifest.js"))
    );
}

#[tokio::test]
async fn test_full_preamble_order() {
    let tree = SourceTree::new();
    tree.write("app/delete_system_orms.sql", "delete from xt.orm;\n");
    tree.write(
        "crm/package.json",
        r#"{"name": "crm", "description": "CRM", "dependencies": ["sales"]}"#,
    );
    let manifest = tree.extension("crm/database/source", None, &["tables.sql"]);

    let sql = composer(&tree)
        .build_extension(
            &manifest,
            &ResolveOptions {
                extension_root: Some(tree.path("crm")),
                ..Default::default()
            },
            &ComposeOptions {
                register_extension: true,
                extension_location: "/core-extensions".to_string(),
                run_js_init: true,
                wipe_views: true,
            },
        )
        .await
        .unwrap();

    let wipe = "delete from xt.orm;\n";
    assert!(sql.starts_with(wipe));
    let rest = &sql[wipe.len()..];
    assert!(rest.starts_with(JS_INIT_SQL));
    let rest = &rest[JS_INIT_SQL.len()..];
    let script_start = rest.find("\ndo $$ BEGIN").unwrap();
    let registration = &rest[..script_start];
    assert!(registration.contains("select xt.register_extension('crm', 'CRM', '/core-extensions', '', 9999);"));
    assert!(registration.contains("select xt.register_extension_dependency('crm', 'sales');"));
    assert_eq!(
        &rest[script_start..],
        format!("\n{}select 'tables.sql';", notice("tables.sql"))
    );
}

#[tokio::test]
async fn test_descriptor_only_extension_registers() {
    let tree = SourceTree::new();
    tree.write("oauth2/package.json", r#"{"name": "oauth2"}"#);

    let sql = composer(&tree)
        .build_extension(
            &tree.path("oauth2/database/source/manifest.js"),
            &ResolveOptions {
                extension_root: Some(tree.path("oauth2")),
                ..Default::default()
            },
            &ComposeOptions {
                register_extension: true,
                extension_location: "/private-extensions".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(sql.ends_with("select xt.register_extension('oauth2', '', '/private-extensions', '', 9999);\n"));
}

#[tokio::test]
async fn test_unterminated_fragment_aborts_composition() {
    let tree = SourceTree::new();
    let manifest = tree.extension("crm/database/source", None, &["a.sql", "b.sql", "c.sql"]);
    tree.write("crm/database/source/b.sql", "select 'b'\n\n");

    let err = composer(&tree)
        .build_extension(&manifest, &ResolveOptions::default(), &ComposeOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ScriptFormat { ref path } if path.ends_with("b.sql")));
}

#[tokio::test]
async fn test_unterminated_fragment_warn_only_continues() {
    let tree = SourceTree::new();
    let manifest = tree.extension("crm/database/source", None, &["a.sql", "b.sql"]);
    tree.write("crm/database/source/a.sql", "select 'a'");

    let composer = ExtensionComposer::new(
        ManifestResolver::default(),
        ScriptCompiler::default().with_terminator_policy(TerminatorPolicy::WarnOnly),
        tree.path("app/delete_system_orms.sql"),
    );
    let sql = composer
        .build_extension(&manifest, &ResolveOptions::default(), &ComposeOptions::default())
        .await
        .unwrap();

    assert!(sql.contains("select 'a'\ndo $$"));
    assert!(sql.ends_with("select 'b.sql';"));
}

#[tokio::test]
async fn test_mixed_formats_compile_through_registry() {
    let tree = SourceTree::new();
    tree.write(
        "crm/database/source/detail.mql",
        "-- Group: crm\n-- Name: detail\n-- Notes: account detail\nSELECT * FROM crmacct;\n",
    );
    tree.write("crm/database/source/tables.sql", "create table crmx (id int);");
    tree.write(
        "crm/database/source/manifest.js",
        r#"{"defaultSchema": "xt", "databaseScripts": ["tables.sql", "detail.mql"]}"#,
    );

    let sql = composer(&tree)
        .build_extension(
            &tree.path("crm/database/source/manifest.js"),
            &ResolveOptions::default(),
            &ComposeOptions::default(),
        )
        .await
        .unwrap();

    let lines = statements(&sql);
    assert_eq!(lines[0], notice("tables.sql").trim());
    assert_eq!(lines[1], "create table crmx (id int);");
    assert_eq!(lines[2], notice("detail.mql").trim());
    assert!(lines[3].starts_with("select saveMetasql('crm', 'detail', $$account detail$$"));
    assert!(sql.ends_with(", true, 'xt', 0);"));
}
