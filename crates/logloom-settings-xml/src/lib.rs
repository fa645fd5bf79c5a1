//! Translates an XML logging-settings document into the flat, ordered
//! key/value directives consumed by a "configure logger from key-value
//! settings" engine.
//!
//! Recognized sections are direct children of the document root (the root's
//! own name is not interpreted), visited in a fixed order:
//!
//! | Section        | Entry       | Emitted key                          |
//! |----------------|-------------|--------------------------------------|
//! | `using`        | `add`       | `using:<name>`                       |
//! | `enrich`       | `enricher`  | `enrich:<name>`                      |
//! | `properties`   | `property`  | `enrich:with-property:<name>`        |
//! | `writeTo`      | `sink`      | `write-to:<name>[.<arg>]`            |
//! | `auditTo`      | `sink`      | `audit-to:<name>[.<arg>]`            |
//! | `minimumLevel` | `override`  | `minimum-level[:override:<name>]`    |
//!
//! Entries without a usable identifying attribute are skipped silently.
//! Property and sink-argument values pass through environment-variable
//! placeholder expansion (`%NAME%`, `$NAME`, `${NAME}`); unresolved
//! placeholders stay literal. A missing settings file contributes nothing
//! and is only noted on the diagnostic channel; a malformed one is fatal.

mod expand;

pub use logloom_core::{
    DiagnosticSink, Directive, DirectiveConsumer, LoadError, NullDiagnostics, TracingDiagnostics,
};

use std::io::ErrorKind;
use std::path::Path;

use roxmltree::{Document, Node};

use crate::expand::expand_env_vars;

/// Translate the settings file at `path` into ordered directives.
///
/// A missing file is not an error: it yields an empty sequence and an
/// informational note on the default `tracing`-backed diagnostic channel.
pub fn translate_file(path: &Path) -> Result<Vec<Directive>, LoadError> {
    translate_file_with(path, &TracingDiagnostics)
}

/// Same as [`translate_file`], reporting through an explicit sink.
pub fn translate_file_with(
    path: &Path,
    diag: &dyn DiagnosticSink,
) -> Result<Vec<Directive>, LoadError> {
    // read_to_string scopes the handle: it is released whether or not
    // parsing below succeeds.
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            diag.info(&format!(
                "settings file {} does not exist, ignoring",
                path.display()
            ));
            return Ok(Vec::new());
        }
        Err(e) => {
            diag.error(&format!("cannot load settings from {}: {e}", path.display()));
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    translate_str(&text).map_err(|e| {
        diag.error(&format!("cannot load settings from {}: {e}", path.display()));
        e
    })
}

/// Translate an in-memory settings document.
pub fn translate_str(xml: &str) -> Result<Vec<Directive>, LoadError> {
    let doc = Document::parse(xml).map_err(|e| LoadError::Xml(format!("{e}")))?;
    let root = doc.root_element();

    let mut out = Vec::new();
    read_using(root, &mut out);
    read_enrichers(root, &mut out);
    read_properties(root, &mut out);
    read_sinks(root, "writeTo", "write-to", &mut out);
    read_sinks(root, "auditTo", "audit-to", &mut out);
    read_minimum_level(root, &mut out);
    Ok(out)
}

/// Load `path` and hand the full ordered sequence to `consumer`.
///
/// Either the whole file's directives are handed over, or none are: the
/// consumer is not reached on the fatal path.
pub fn configure_from_file(
    path: &Path,
    consumer: &mut dyn DirectiveConsumer,
) -> Result<(), LoadError> {
    let directives = translate_file(path)?;
    consumer.apply(&directives);
    Ok(())
}

/// First direct child element of `root` with the exact tag `name`.
/// Sections nested anywhere deeper are invisible.
fn child_section<'a, 'i>(root: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    root.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// An attribute counts as usable only when present and non-empty.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// `<using><add name="X"/></using>` → `("using:X", "X")`.
fn read_using(root: Node, out: &mut Vec<Directive>) {
    let Some(section) = child_section(root, "using") else {
        return;
    };
    for add in section
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "add")
    {
        if let Some(name) = present(add.attribute("name")) {
            out.push(Directive::new(format!("using:{name}"), name));
        }
    }
}

fn read_enrichers(root: Node, out: &mut Vec<Directive>) {
    let Some(section) = child_section(root, "enrich") else {
        return;
    };
    for enricher in section
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "enricher")
    {
        if let Some(name) = present(enricher.attribute("name")) {
            out.push(Directive::new(format!("enrich:{name}"), ""));
        }
    }
}

/// `<properties><property name="N" value="V"/></properties>` →
/// `("enrich:with-property:N", expand(V))`. A property without a name is
/// skipped even when it carries a value.
fn read_properties(root: Node, out: &mut Vec<Directive>) {
    let Some(section) = child_section(root, "properties") else {
        return;
    };
    for property in section
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "property")
    {
        let Some(name) = present(property.attribute("name")) else {
            continue;
        };
        let value = property.attribute("value").unwrap_or("");
        out.push(Directive::new(
            format!("enrich:with-property:{name}"),
            expand_env_vars(value),
        ));
    }
}

/// Shared shape of `writeTo` and `auditTo`: named sinks with optional
/// `arg` children.
fn read_sinks(root: Node, section_name: &str, prefix: &str, out: &mut Vec<Directive>) {
    let Some(section) = child_section(root, section_name) else {
        return;
    };
    for sink in section
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "sink")
    {
        let Some(name) = present(sink.attribute("name")) else {
            continue;
        };
        let args: Vec<Node> = sink
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "arg")
            .collect();
        if args.is_empty() {
            // Bare pair marks the sink as configured with no parameters,
            // distinct from the sink not appearing at all.
            out.push(Directive::new(format!("{prefix}:{name}"), ""));
            continue;
        }
        for arg in args {
            let Some(arg_name) = present(arg.attribute("name")) else {
                continue;
            };
            let value = arg.attribute("value").unwrap_or("");
            out.push(Directive::new(
                format!("{prefix}:{name}.{arg_name}"),
                expand_env_vars(value),
            ));
        }
    }
}

/// `<minimumLevel default="L"><override name="N" level="L"/></minimumLevel>`
/// → `("minimum-level", L)` plus one `minimum-level:override:N` pair per
/// override. Level strings are relayed verbatim, never env-expanded.
fn read_minimum_level(root: Node, out: &mut Vec<Directive>) {
    let Some(section) = child_section(root, "minimumLevel") else {
        return;
    };
    // An attribute-less element is skipped wholesale, overrides included.
    if section.attributes().next().is_none() {
        return;
    }
    if let Some(level) = present(section.attribute("default")) {
        out.push(Directive::new("minimum-level", level));
    }
    for item in section
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "override")
    {
        let Some(name) = present(item.attribute("name")) else {
            continue;
        };
        let level = item.attribute("level").unwrap_or("");
        out.push(Directive::new(
            format!("minimum-level:override:{name}"),
            level,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(xml: &str) -> Vec<(String, String)> {
        translate_str(xml)
            .expect("well-formed document")
            .into_iter()
            .map(|d| (d.key, d.value))
            .collect()
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn using_entries_carry_their_name_as_value() {
        let got = pairs(r#"<logging><using><add name="X"/></using></logging>"#);
        assert_eq!(got, vec![pair("using:X", "X")]);
    }

    #[test]
    fn enrichers_emit_empty_values() {
        let got = pairs(r#"<logging><enrich><enricher name="WithThreadId"/></enrich></logging>"#);
        assert_eq!(got, vec![pair("enrich:WithThreadId", "")]);
    }

    #[test]
    fn properties_become_with_property_directives() {
        let got = pairs(
            r#"<logging><properties><property name="App" value="Sample"/></properties></logging>"#,
        );
        assert_eq!(got, vec![pair("enrich:with-property:App", "Sample")]);
    }

    #[test]
    fn property_values_are_env_expanded() {
        std::env::set_var("LOGLOOM_TEST_PROP", "from-env");
        let got = pairs(
            r#"<logging><properties><property name="App" value="%LOGLOOM_TEST_PROP%"/></properties></logging>"#,
        );
        assert_eq!(got, vec![pair("enrich:with-property:App", "from-env")]);
    }

    #[test]
    fn sink_with_args_emits_one_pair_per_arg_and_no_bare_pair() {
        let got = pairs(
            r#"<logging><writeTo><sink name="File"><arg name="path" value="out.txt"/></sink></writeTo></logging>"#,
        );
        assert_eq!(got, vec![pair("write-to:File.path", "out.txt")]);
    }

    #[test]
    fn sink_without_args_emits_a_single_bare_pair() {
        let got = pairs(r#"<logging><writeTo><sink name="Console"/></writeTo></logging>"#);
        assert_eq!(got, vec![pair("write-to:Console", "")]);
    }

    #[test]
    fn audit_sinks_use_the_audit_to_prefix() {
        let got = pairs(
            r#"<logging><auditTo><sink name="Ledger"><arg name="path" value="audit.txt"/></sink></auditTo></logging>"#,
        );
        assert_eq!(got, vec![pair("audit-to:Ledger.path", "audit.txt")]);
    }

    #[test]
    fn minimum_level_emits_default_and_overrides() {
        let got = pairs(
            r#"<logging><minimumLevel default="Information"><override name="Microsoft" level="Warning"/></minimumLevel></logging>"#,
        );
        assert_eq!(
            got,
            vec![
                pair("minimum-level", "Information"),
                pair("minimum-level:override:Microsoft", "Warning"),
            ]
        );
    }

    #[test]
    fn minimum_level_without_attributes_is_skipped_entirely() {
        let got = pairs(
            r#"<logging><minimumLevel><override name="Microsoft" level="Warning"/></minimumLevel></logging>"#,
        );
        assert!(got.is_empty(), "got: {got:?}");
    }

    #[test]
    fn entries_without_a_name_contribute_nothing() {
        let got = pairs(
            r#"<logging>
                <using><add/></using>
                <enrich><enricher name=""/></enrich>
                <properties><property value="orphan"/></properties>
                <writeTo><sink/></writeTo>
            </logging>"#,
        );
        assert!(got.is_empty(), "got: {got:?}");
    }

    #[test]
    fn sink_args_without_names_are_dropped_without_a_bare_pair() {
        let got = pairs(
            r#"<logging><writeTo><sink name="File"><arg value="out.txt"/></sink></writeTo></logging>"#,
        );
        assert!(got.is_empty(), "got: {got:?}");
    }

    #[test]
    fn sections_nested_below_the_root_are_invisible() {
        let got = pairs(
            r#"<logging><extras><writeTo><sink name="Console"/></writeTo></extras></logging>"#,
        );
        assert!(got.is_empty(), "got: {got:?}");
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let got = pairs(
            r#"<logging><filters><filter name="X"/></filters><using><add name="Y"/></using></logging>"#,
        );
        assert_eq!(got, vec![pair("using:Y", "Y")]);
    }

    #[test]
    fn sections_emit_in_fixed_order_and_entries_in_document_order() {
        let got = pairs(
            r#"<logging>
                <minimumLevel default="Debug"/>
                <writeTo>
                    <sink name="Console"/>
                    <sink name="File"><arg name="path" value="a.txt"/><arg name="shared" value="true"/></sink>
                </writeTo>
                <using><add name="First"/><add name="Second"/></using>
                <properties><property name="App" value="Demo"/></properties>
                <enrich><enricher name="WithMachineName"/></enrich>
                <auditTo><sink name="Ledger"/></auditTo>
            </logging>"#,
        );
        assert_eq!(
            got,
            vec![
                pair("using:First", "First"),
                pair("using:Second", "Second"),
                pair("enrich:WithMachineName", ""),
                pair("enrich:with-property:App", "Demo"),
                pair("write-to:Console", ""),
                pair("write-to:File.path", "a.txt"),
                pair("write-to:File.shared", "true"),
                pair("audit-to:Ledger", ""),
                pair("minimum-level", "Debug"),
            ]
        );
    }

    #[test]
    fn only_the_first_occurrence_of_a_section_is_read() {
        let got = pairs(
            r#"<logging><using><add name="A"/></using><using><add name="B"/></using></logging>"#,
        );
        assert_eq!(got, vec![pair("using:A", "A")]);
    }

    #[test]
    fn malformed_documents_are_fatal() {
        let err = translate_str("<logging><using></logging>").expect_err("mismatched tags");
        assert!(matches!(err, LoadError::Xml(_)), "got: {err:?}");
    }
}
