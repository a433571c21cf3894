use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::info;
use widl_ast::AstGroup;
use widl_common::{Diagnostic, DiagnosticSink, Identifier};
use widl_compiler::{IdlCompiler, build_ast_groups};
use widl_ir::{Database, IdlTypeFactory, IrMap, RefByIdFactory};

/// Compiles the given AST group files into a database written to `output`.
/// Returns the recoverable diagnostics the compiler reported.
pub fn compile(group_paths: &[impl AsRef<Path>], output: &Path) -> Result<Vec<Diagnostic>> {
    let mut groups = Vec::with_capacity(group_paths.len());
    for path in group_paths {
        let path = path.as_ref();
        groups.push(
            AstGroup::read_from_file(path)
                .with_context(|| format!("failed to load AST group {}", path.display()))?,
        );
    }

    let mut ir_map = IrMap::new();
    let mut refs = RefByIdFactory::new();
    let mut types = IdlTypeFactory::new();
    build_ast_groups(&groups, &mut ir_map, &mut refs, &mut types)
        .context("failed to build IRs from AST groups")?;

    let mut sink = DiagnosticSink::new();
    let database = IdlCompiler::new(ir_map, refs, types, &mut sink)
        .build_database()
        .context("compilation failed")?;
    database
        .write_to_file(output)
        .with_context(|| format!("failed to write database {}", output.display()))?;
    info!(output = %output.display(), "wrote database");
    Ok(sink.diagnostics().to_vec())
}

/// Looks up `identifier` in the database at `path` and describes it.
pub fn query(path: &Path, identifier: &str) -> Result<String> {
    let database = Database::read_from_file(path)
        .with_context(|| format!("failed to load database {}", path.display()))?;
    let identifier = Identifier::from(identifier);
    let Some(definition) = database.find(&identifier) else {
        bail!("no definition named {identifier}");
    };
    Ok(format!("{} {}", definition.kind_name(), definition.identifier()))
}

/// Summarizes per-kind definition counts of the database at `path`.
pub fn stats(path: &Path) -> Result<String> {
    let database = Database::read_from_file(path)
        .with_context(|| format!("failed to load database {}", path.display()))?;
    let rows = [
        ("interfaces", database.interfaces().count()),
        ("interface mixins", database.interface_mixins().count()),
        ("namespaces", database.namespaces().count()),
        ("dictionaries", database.dictionaries().count()),
        ("enumerations", database.enumerations().count()),
        ("typedefs", database.typedefs().count()),
        ("callback functions", database.callback_functions().count()),
        ("callback interfaces", database.callback_interfaces().count()),
        ("sync iterators", database.sync_iterators().count()),
        ("async iterators", database.async_iterators().count()),
        ("unions", database.unions().count()),
        ("observable arrays", database.observable_arrays().count()),
        ("stubs", database.stubs().count()),
    ];
    let mut out = String::new();
    for (label, count) in rows {
        out.push_str(&format!("{label}: {count}\n"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use widl_ast::{AstNode, PropertyValue};

    #[test]
    fn compile_then_query_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let group_path = dir.path().join("core.json");
        let db_path = dir.path().join("web_idl_database.bin");

        let interface = AstNode::new("Interface")
            .with_name("Gadget")
            .with_str("FILENAME", "gadget.idl")
            .with_property("LINENO", PropertyValue::Integer(1));
        let mut group = AstGroup::new("core", false);
        group.files = vec![AstNode::new("File").with_child(interface)];
        group.write_to_file(&group_path).unwrap();

        let diagnostics = compile(&[&group_path], &db_path).unwrap();
        assert!(diagnostics.is_empty());

        assert_eq!(query(&db_path, "Gadget").unwrap(), "interface Gadget");
        assert!(query(&db_path, "Widget").is_err());
        assert!(stats(&db_path).unwrap().contains("interfaces: 1"));
    }
}
