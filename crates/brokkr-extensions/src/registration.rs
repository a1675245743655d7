//! Registration SQL
//!
//! Records an extension and its dependencies in the `xt` bookkeeping tables
//! and grants the admin role access to each of them.

use brokkr_core::types::ExtensionDescriptor;

const PLACEHOLDER: &str = "%@";

const NOTICE_TEMPLATE: &str =
    "do $$ plv8.elog(NOTICE, \"About to register extension %@\"); $$ language plv8;\n";
const GRANT_TEMPLATE: &str = "select xt.grant_role_ext('ADMIN', '%@');\n";
const REGISTER_TEMPLATE: &str = "select xt.register_extension('%@', '%@', '%@', '', %@);\n";
const DEPENDENCY_TEMPLATE: &str = "select xt.register_extension_dependency('%@', '%@');\n";

/// Substitute each `%@` in `template` with the next argument, in order.
///
/// Arguments are inserted verbatim: nothing is quoted or escaped, so this is
/// not safe for untrusted input. Placeholders beyond the last argument are
/// left in place and surplus arguments are ignored.
pub fn fill_placeholders(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(index) = rest.find(PLACEHOLDER) {
        out.push_str(&rest[..index]);
        match args.next() {
            Some(arg) => out.push_str(arg),
            None => out.push_str(PLACEHOLDER),
        }
        rest = &rest[index + PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    out
}

/// Builds registration SQL for an extension descriptor
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationSqlBuilder;

impl RegistrationSqlBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Registration SQL for `descriptor`.
    ///
    /// Statement order: notice, own grant, own registration, then each
    /// dependency's registration and grant with the dependency list reversed.
    pub fn build(&self, descriptor: &ExtensionDescriptor) -> String {
        let name = descriptor.name.as_str();
        let load_order = descriptor.load_order.to_string();

        let mut sql = fill_placeholders(NOTICE_TEMPLATE, &[name]);
        sql.push_str(&fill_placeholders(GRANT_TEMPLATE, &[name]));
        sql.push_str(&fill_placeholders(
            REGISTER_TEMPLATE,
            &[
                name,
                descriptor.description.as_str(),
                descriptor.location.as_str(),
                load_order.as_str(),
            ],
        ));

        for dependency in descriptor.dependencies.iter().rev() {
            sql.push_str(&fill_placeholders(DEPENDENCY_TEMPLATE, &[name, dependency.as_str()]));
            sql.push_str(&fill_placeholders(GRANT_TEMPLATE, &[dependency.as_str()]));
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_placeholders_in_order() {
        assert_eq!(
            fill_placeholders("select f('%@', %@);", &["a", "1"]),
            "select f('a', 1);"
        );
    }

    #[test]
    fn test_fill_placeholders_does_not_escape() {
        assert_eq!(
            fill_placeholders("'%@'", &["O'Brien"]),
            "'O'Brien'"
        );
    }

    #[test]
    fn test_fill_placeholders_argument_mismatch() {
        assert_eq!(fill_placeholders("%@ %@", &["x"]), "x %@");
        assert_eq!(fill_placeholders("%@", &["x", "y"]), "x");
        assert_eq!(fill_placeholders("no placeholders", &["x"]), "no placeholders");
    }

    #[test]
    fn test_build_without_dependencies() {
        let descriptor = ExtensionDescriptor::new("crm")
            .with_description("CRM")
            .with_location("/core-extensions")
            .with_load_order(10);

        let sql = RegistrationSqlBuilder::new().build(&descriptor);

        assert_eq!(
            sql,
            "do $$ plv8.elog(NOTICE, \"About to register extension crm\"); $$ language plv8;\n\
             select xt.grant_role_ext('ADMIN', 'crm');\n\
             select xt.register_extension('crm', 'CRM', '/core-extensions', '', 10);\n"
        );
    }

    #[test]
    fn test_default_load_order() {
        let sql = RegistrationSqlBuilder::new().build(&ExtensionDescriptor::new("oauth2"));
        assert!(sql.contains("select xt.register_extension('oauth2', '', '', '', 9999);"));
    }
}
