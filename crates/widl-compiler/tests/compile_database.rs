//! End-to-end scenarios: AST groups through the IR builder and the phased
//! compiler into a queryable database.

use widl_ast::{AstGroup, AstNode, PropertyValue};
use widl_common::{CompileError, DiagnosticSink, Identifier};
use widl_compiler::{IdlCompiler, build_ast_groups};
use widl_ir::{
    Database, DefinitionRef, IdlTypeFactory, IrMap, RefByIdFactory, UnionUsage,
};

fn located(node: AstNode, filepath: &str, line: i64) -> AstNode {
    node.with_str("FILENAME", filepath)
        .with_property("LINENO", PropertyValue::Integer(line))
}

fn ty(body: AstNode) -> AstNode {
    AstNode::new("Type").with_child(body)
}

fn primitive(name: &str) -> AstNode {
    AstNode::new("PrimitiveType").with_name(name)
}

fn dom_string() -> AstNode {
    AstNode::new("StringType").with_name("DOMString")
}

fn typeref(name: &str) -> AstNode {
    AstNode::new("Typeref").with_name(name)
}

fn ext_attrs(attributes: impl IntoIterator<Item = AstNode>) -> AstNode {
    AstNode::new("ExtAttributes").with_children(attributes)
}

fn ext_attr(key: &str) -> AstNode {
    AstNode::new("ExtAttribute").with_name(key)
}

fn ext_attr_value(key: &str, value: &str) -> AstNode {
    ext_attr(key).with_str("VALUE", value)
}

fn attribute(name: &str, type_body: AstNode) -> AstNode {
    AstNode::new("Attribute")
        .with_name(name)
        .with_child(ty(type_body))
}

fn operation(name: &str, arguments: Vec<AstNode>, return_body: AstNode) -> AstNode {
    AstNode::new("Operation")
        .with_name(name)
        .with_child(AstNode::new("Arguments").with_children(arguments))
        .with_child(ty(return_body))
}

fn argument(name: &str, type_body: AstNode) -> AstNode {
    AstNode::new("Argument")
        .with_name(name)
        .with_child(ty(type_body))
}

fn compile(files: Vec<AstNode>) -> (Database, DiagnosticSink) {
    try_compile(files).expect("compilation should succeed")
}

fn try_compile(files: Vec<AstNode>) -> Result<(Database, DiagnosticSink), CompileError> {
    let mut group = AstGroup::new("core", false);
    group.files = vec![AstNode::new("File").with_children(files)];

    let mut ir_map = IrMap::new();
    let mut refs = RefByIdFactory::new();
    let mut types = IdlTypeFactory::new();
    build_ast_groups(&[group], &mut ir_map, &mut refs, &mut types)?;
    let mut sink = DiagnosticSink::new();
    let database = IdlCompiler::new(ir_map, refs, types, &mut sink).build_database()?;
    Ok((database, sink))
}

#[test]
fn pair_iterable_synthesizes_a_sync_iterator() {
    let interface = located(
        AstNode::new("Interface").with_name("Gadget").with_child(
            AstNode::new("Iterable")
                .with_child(ty(dom_string()))
                .with_child(ty(primitive("long"))),
        ),
        "gadget.idl",
        1,
    );
    // The callback the synthesized forEach references, as iterator.idl
    // defines it in a real corpus.
    let for_each_callback = located(
        AstNode::new("Callback")
            .with_name("ForEachIteratorCallback")
            .with_child(AstNode::new("Arguments"))
            .with_child(ty(AstNode::new("Undefined"))),
        "iterator.idl",
        1,
    );
    let (database, sink) = compile(vec![interface, for_each_callback]);
    assert!(sink.is_empty());

    let gadget = database
        .interface(&Identifier::from("Gadget"))
        .expect("interface registered");
    let iterable = gadget.iterable().expect("iterable declaration kept");
    assert!(iterable.is_pair_iterator());
    let names: Vec<&str> = iterable
        .operations
        .iter()
        .map(|op| op.parts.identifier.as_str())
        .collect();
    assert_eq!(names, vec!["forEach", "entries", "keys", "values"]);

    let iterator_id = gadget.sync_iterator().expect("sync iterator linked");
    let DefinitionRef::SyncIterator(iterator) = database.resolve(iterator_id) else {
        panic!("sync iterator reference resolves to the synthesized definition");
    };
    assert_eq!(iterator.identifier().as_str(), "SyncIterator_Gadget");
    assert_eq!(iterator.host().as_str(), "Gadget");
    assert_eq!(iterator.operations().len(), 1);
    let next = &iterator.operations()[0];
    assert_eq!(next.parts.identifier.as_str(), "next");
    assert!(next.parts.extended_attributes.contains("RaisesException"));
    assert_eq!(iterator.operation_groups().len(), 1);
}

#[test]
fn declared_members_shadow_optional_maplike_operations() {
    let interface = located(
        AstNode::new("Interface")
            .with_name("Cache")
            .with_child(
                AstNode::new("Maplike")
                    .with_child(ty(dom_string()))
                    .with_child(ty(primitive("long"))),
            )
            .with_child(operation("clear", Vec::new(), AstNode::new("Undefined"))),
        "cache.idl",
        1,
    );
    let for_each_callback = located(
        AstNode::new("Callback")
            .with_name("ForEachIteratorCallback")
            .with_child(AstNode::new("Arguments"))
            .with_child(ty(AstNode::new("Undefined"))),
        "iterator.idl",
        1,
    );
    let (database, sink) = compile(vec![interface, for_each_callback]);
    assert!(sink.is_empty());

    let cache = database
        .interface(&Identifier::from("Cache"))
        .expect("interface registered");
    let maplike = cache.maplike().expect("maplike declaration kept");
    let names: Vec<&str> = maplike
        .operations
        .iter()
        .map(|op| op.parts.identifier.as_str())
        .collect();
    assert!(names.contains(&"set"));
    assert!(names.contains(&"delete"));
    assert!(!names.contains(&"clear"));
    assert_eq!(maplike.operations.len(), maplike.operation_groups.len());
    assert_eq!(cache.operations().len(), 1);
    assert_eq!(cache.operations()[0].parts.identifier.as_str(), "clear");
}

#[test]
fn partial_definitions_merge_into_the_base() {
    let base = located(
        AstNode::new("Interface")
            .with_name("Storage")
            .with_child(attribute("length", primitive("unsigned long"))),
        "storage.idl",
        1,
    );
    let partial = located(
        AstNode::new("Interface")
            .with_name("Storage")
            .with_bool("PARTIAL")
            .with_child(operation("clear", Vec::new(), AstNode::new("Undefined"))),
        "storage_extras.idl",
        3,
    );
    let (database, sink) = compile(vec![base, partial]);
    assert!(sink.is_empty());

    let storage = database
        .interface(&Identifier::from("Storage"))
        .expect("merged interface registered");
    assert_eq!(storage.attributes().len(), 1);
    assert_eq!(storage.operations().len(), 1);
    let clear = &storage.operations()[0];
    assert_eq!(clear.parts.identifier.as_str(), "clear");
    assert!(clear.parts.code_generator_info.defined_in_partial());
    assert!(!storage.attributes()[0].parts.code_generator_info.defined_in_partial());
    assert_eq!(storage.debug_info().all_locations().len(), 2);
}

#[test]
fn a_partial_without_its_base_is_fatal() {
    let orphan = located(
        AstNode::new("Interface")
            .with_name("Orphan")
            .with_bool("PARTIAL"),
        "orphan.idl",
        1,
    );
    let error = try_compile(vec![orphan]).unwrap_err();
    assert!(matches!(
        error,
        CompileError::PartialWithoutNonPartial { .. }
    ));
}

#[test]
fn mixin_members_record_their_owner() {
    let navigator = located(
        AstNode::new("Interface").with_name("Navigator"),
        "navigator.idl",
        1,
    );
    let mixin = located(
        AstNode::new("Interface")
            .with_name("NavigatorID")
            .with_bool("MIXIN")
            .with_child(attribute("userAgent", dom_string())),
        "navigator_id.idl",
        1,
    );
    let includes = located(
        AstNode::new("Includes")
            .with_name("Navigator")
            .with_str("REFERENCE", "NavigatorID"),
        "navigator_id.idl",
        12,
    );
    let (database, sink) = compile(vec![navigator, mixin, includes]);
    assert!(sink.is_empty());

    let navigator = database
        .interface(&Identifier::from("Navigator"))
        .expect("target interface registered");
    assert_eq!(navigator.attributes().len(), 1);
    let user_agent = &navigator.attributes()[0];
    assert!(user_agent.parts.code_generator_info.defined_in_mixin());
    let owner = user_agent.owner_mixin.expect("member backlinks its mixin");
    assert_eq!(
        database.resolve(owner).identifier().as_str(),
        "NavigatorID"
    );
    assert!(
        database
            .interface_mixins()
            .any(|m| m.identifier().as_str() == "NavigatorID")
    );
}

#[test]
fn an_includes_of_an_unknown_mixin_is_fatal() {
    let host = located(AstNode::new("Interface").with_name("Host"), "host.idl", 1);
    let includes = located(
        AstNode::new("Includes")
            .with_name("Host")
            .with_str("REFERENCE", "Vanished"),
        "host.idl",
        2,
    );
    let error = try_compile(vec![host, includes]).unwrap_err();
    assert!(matches!(error, CompileError::MissingMixin { .. }));
}

#[test]
fn legacy_factory_functions_get_call_with_and_raises_exception() {
    let audio_element = located(
        AstNode::new("Interface")
            .with_name("HTMLAudioElement")
            .with_child(ext_attrs([
                ext_attr("LegacyFactoryFunction").with_child(
                    AstNode::new("Call").with_name("Audio").with_child(
                        AstNode::new("Arguments").with_child(
                            argument("src", dom_string()).with_bool("OPTIONAL"),
                        ),
                    ),
                ),
                ext_attr_value("NamedConstructor_CallWith", "Document"),
                ext_attr("NamedConstructor_RaisesException"),
            ])),
        "html_audio_element.idl",
        1,
    );
    let (database, sink) = compile(vec![audio_element]);
    assert!(sink.is_empty());

    let interface = database
        .interface(&Identifier::from("HTMLAudioElement"))
        .expect("interface registered");
    assert_eq!(interface.legacy_factory_functions().len(), 1);
    let audio = &interface.legacy_factory_functions()[0];
    assert_eq!(audio.parts.identifier.as_str(), "Audio");
    assert_eq!(audio.arguments.len(), 1);
    assert_eq!(
        audio.parts.extended_attributes.value_of("CallWith"),
        Some("Document")
    );
    assert!(audio.parts.extended_attributes.contains("RaisesException"));
    assert_eq!(interface.legacy_factory_function_groups().len(), 1);
    assert_eq!(
        interface.legacy_factory_function_groups()[0]
            .identifier
            .as_str(),
        "Audio"
    );
}

#[test]
fn html_constructor_interfaces_get_a_synthesized_constructor() {
    let element = located(
        AstNode::new("Interface")
            .with_name("HTMLDetailsElement")
            .with_child(ext_attrs([ext_attr("HTMLConstructor")])),
        "html_details_element.idl",
        1,
    );
    let (database, sink) = compile(vec![element]);
    assert!(sink.is_empty());

    let interface = database
        .interface(&Identifier::from("HTMLDetailsElement"))
        .expect("interface registered");
    assert_eq!(interface.constructors().len(), 1);
    let constructor = &interface.constructors()[0];
    assert!(constructor.arguments.is_empty());
    assert!(
        constructor
            .parts
            .extended_attributes
            .contains("HTMLConstructor")
    );
    assert_eq!(interface.constructor_groups().len(), 1);
}

#[test]
fn identical_unions_share_one_definition() {
    let union_type = || {
        AstNode::new("UnionType")
            .with_child(ty(primitive("long")))
            .with_child(ty(dom_string()))
    };
    let interface = located(
        AstNode::new("Interface")
            .with_name("Mixer")
            .with_child(operation(
                "accept",
                vec![argument("input", union_type())],
                AstNode::new("Undefined"),
            ))
            .with_child(operation("produce", Vec::new(), union_type())),
        "mixer.idl",
        1,
    );
    let (database, sink) = compile(vec![interface]);
    assert!(sink.is_empty());

    let unions: Vec<_> = database.unions().collect();
    assert_eq!(unions.len(), 1);
    let union = unions[0];
    assert_eq!(union.instances().len(), 2);
    assert!(union.usage().contains(UnionUsage::INPUT));
    assert!(union.usage().contains(UnionUsage::OUTPUT));
    assert_eq!(union.components().len(), 1);
}

#[test]
fn contained_unions_register_as_sub_unions() {
    let narrow = || {
        AstNode::new("UnionType")
            .with_child(ty(primitive("long")))
            .with_child(ty(dom_string()))
    };
    let wide = || narrow().with_child(ty(primitive("double")));
    let interface = located(
        AstNode::new("Interface")
            .with_name("Mixer")
            .with_child(attribute("narrow", narrow()))
            .with_child(attribute("wide", wide())),
        "mixer.idl",
        1,
    );
    let (database, sink) = compile(vec![interface]);
    assert!(sink.is_empty());

    let wide = database
        .unions()
        .find(|union| union.token().member_names.len() == 3)
        .expect("three-member union registered");
    let narrow = database
        .unions()
        .find(|union| union.token().member_names.len() == 2)
        .expect("two-member union registered");
    assert_eq!(wide.sub_unions(), &[narrow.identifier().clone()]);
    assert!(narrow.sub_unions().is_empty());
}

#[test]
fn unresolved_references_become_stubs() {
    let interface = located(
        AstNode::new("Interface")
            .with_name("Consumer")
            .with_child(attribute("source", typeref("Vanished"))),
        "consumer.idl",
        1,
    );
    let (database, sink) = compile(vec![interface]);

    assert_eq!(sink.diagnostics().len(), 1);
    assert!(sink.diagnostics()[0].to_string().contains("Vanished"));
    let stub = database
        .find(&Identifier::from("Vanished"))
        .expect("stub registered under the unresolved name");
    assert_eq!(stub.kind_name(), "stub");
    assert_eq!(database.stubs().count(), 1);
}

#[test]
fn overload_groups_share_any_of_extended_attributes() {
    let interface = located(
        AstNode::new("Interface")
            .with_name("Gauge")
            .with_child(
                operation("measure", Vec::new(), AstNode::new("Undefined"))
                    .with_child(ext_attrs([ext_attr("SecureContext")])),
            )
            .with_child(operation(
                "measure",
                vec![argument("scale", primitive("double"))],
                AstNode::new("Undefined"),
            )),
        "gauge.idl",
        1,
    );
    let (database, sink) = compile(vec![interface]);
    assert!(sink.is_empty());

    let interface = database
        .interface(&Identifier::from("Gauge"))
        .expect("interface registered");
    assert_eq!(interface.operations().len(), 2);
    assert_eq!(interface.operation_groups().len(), 1);
    let group = &interface.operation_groups()[0];
    assert_eq!(group.members.len(), 2);
    assert!(group.extended_attributes.contains("SecureContext"));
}

#[test]
fn exposed_constructs_collect_on_the_global_interface() {
    let window = located(
        AstNode::new("Interface")
            .with_name("Window")
            .with_child(ext_attrs([
                ext_attr_value("Global", "Window"),
                ext_attr_value("Exposed", "Window"),
            ])),
        "window.idl",
        1,
    );
    let gadget = located(
        AstNode::new("Interface")
            .with_name("Gadget")
            .with_child(ext_attrs([ext_attr_value("Exposed", "Window")])),
        "gadget.idl",
        1,
    );
    let (database, sink) = compile(vec![window, gadget]);
    assert!(sink.is_empty());

    let window = database
        .interface(&Identifier::from("Window"))
        .expect("global interface registered");
    let exposed: Vec<&str> = window
        .exposed_constructs()
        .iter()
        .map(|&id| database.resolve(id).identifier().as_str())
        .collect();
    assert_eq!(exposed, vec!["Gadget", "Window"]);
}

#[test]
fn property_handlers_fall_back_through_the_inheritance_chain() {
    let named_getter = operation("", vec![argument("name", dom_string())], AstNode::new("Any"))
        .with_bool("GETTER");
    let base = located(
        AstNode::new("Interface").with_name("Base").with_child(named_getter),
        "base.idl",
        1,
    );
    let derived = located(
        AstNode::new("Interface").with_name("Derived").with_child(located(
            AstNode::new("Inherit").with_name("Base"),
            "derived.idl",
            1,
        )),
        "derived.idl",
        1,
    );
    let (database, sink) = compile(vec![base, derived]);
    assert!(sink.is_empty());

    let derived = database
        .interface(&Identifier::from("Derived"))
        .expect("derived interface registered");
    let properties = derived
        .indexed_and_named_properties()
        .expect("inherited handlers resolved");
    let named_getter = properties.named_getter.as_ref().expect("named getter found");
    assert_eq!(named_getter.interface.as_str(), "Base");
    assert_eq!(named_getter.operation, 0);
    assert!(properties.has_named_properties());
    assert!(!properties.has_indexed_properties());
    assert!(properties.is_named_property_enumerable());

    let base = database
        .interface(&Identifier::from("Base"))
        .expect("base interface registered");
    let own = base.indexed_and_named_properties().expect("own handlers kept");
    assert_eq!(own.named_getter.as_ref().map(|accessor| accessor.interface.as_str()), Some("Base"));
}

#[test]
fn named_property_enumerability_honors_legacy_and_getter_attributes() {
    let named_getter =
        || operation("", vec![argument("name", dom_string())], AstNode::new("Any")).with_bool("GETTER");
    let legacy = located(
        AstNode::new("Interface")
            .with_name("Legacy")
            .with_child(ext_attrs([ext_attr("LegacyUnenumerableNamedProperties")]))
            .with_child(named_getter()),
        "legacy.idl",
        1,
    );
    let derived = located(
        AstNode::new("Interface").with_name("Derived").with_child(located(
            AstNode::new("Inherit").with_name("Legacy"),
            "derived.idl",
            1,
        )),
        "derived.idl",
        1,
    );
    let quiet = located(
        AstNode::new("Interface")
            .with_name("Quiet")
            .with_child(named_getter().with_child(ext_attrs([ext_attr("NotEnumerable")]))),
        "quiet.idl",
        1,
    );
    let (database, sink) = compile(vec![legacy, derived, quiet]);
    assert!(sink.is_empty());

    for name in ["Legacy", "Derived", "Quiet"] {
        let interface = database
            .interface(&Identifier::from(name))
            .expect("interface registered");
        let properties = interface
            .indexed_and_named_properties()
            .expect("handlers resolved");
        assert!(
            !properties.is_named_property_enumerable(),
            "{name} must not enumerate named properties"
        );
    }
}

#[test]
fn inheritance_assigns_preorder_tags() {
    let event_target = located(
        AstNode::new("Interface").with_name("EventTarget"),
        "event_target.idl",
        1,
    );
    let node = located(
        AstNode::new("Interface")
            .with_name("Node")
            .with_child(located(
                AstNode::new("Inherit").with_name("EventTarget"),
                "node.idl",
                1,
            )),
        "node.idl",
        1,
    );
    let (database, sink) = compile(vec![event_target, node]);
    assert!(sink.is_empty());

    let event_target = database
        .interface(&Identifier::from("EventTarget"))
        .expect("root interface registered");
    let node = database
        .interface(&Identifier::from("Node"))
        .expect("derived interface registered");
    assert_eq!(event_target.tag(), Some(256));
    assert_eq!(node.tag(), Some(257));
    assert_eq!(event_target.max_subclass_tag(), Some(257));
    assert_eq!(node.max_subclass_tag(), Some(257));
    assert_eq!(event_target.deriveds().len(), 1);
    assert_eq!(
        database
            .resolve(event_target.deriveds()[0])
            .identifier()
            .as_str(),
        "Node"
    );
}

#[test]
fn legacy_unforgeable_members_copy_down_the_chain() {
    let base = located(
        AstNode::new("Interface").with_name("Location").with_child(
            attribute("href", dom_string())
                .with_child(ext_attrs([ext_attr("LegacyUnforgeable")])),
        ),
        "location.idl",
        1,
    );
    let derived = located(
        AstNode::new("Interface")
            .with_name("WorkerLocation")
            .with_child(located(
                AstNode::new("Inherit").with_name("Location"),
                "worker_location.idl",
                1,
            )),
        "worker_location.idl",
        1,
    );
    let (database, sink) = compile(vec![base, derived]);
    assert!(sink.is_empty());

    let derived = database
        .interface(&Identifier::from("WorkerLocation"))
        .expect("derived interface registered");
    assert_eq!(derived.attributes().len(), 1);
    assert_eq!(derived.attributes()[0].parts.identifier.as_str(), "href");
}

#[test]
fn dictionaries_keep_sorted_members_and_resolve_types() {
    let dictionary = located(
        AstNode::new("Dictionary")
            .with_name("ScrollOptions")
            .with_child(
                AstNode::new("Key")
                    .with_name("behavior")
                    .with_child(ty(typeref("ScrollBehavior"))),
            )
            .with_child(
                AstNode::new("Key")
                    .with_name("anchor")
                    .with_child(ty(dom_string())),
            ),
        "scroll_options.idl",
        1,
    );
    let enumeration = located(
        AstNode::new("Enum")
            .with_name("ScrollBehavior")
            .with_child(AstNode::new("EnumItem").with_name("auto"))
            .with_child(AstNode::new("EnumItem").with_name("smooth")),
        "scroll_options.idl",
        8,
    );
    let (database, sink) = compile(vec![dictionary, enumeration]);
    assert!(sink.is_empty());

    let dictionary = database
        .dictionary(&Identifier::from("ScrollOptions"))
        .expect("dictionary registered");
    let names: Vec<&str> = dictionary
        .own_members()
        .iter()
        .map(|member| member.parts.identifier.as_str())
        .collect();
    assert_eq!(names, vec!["anchor", "behavior"]);
    assert!(
        database
            .find(&Identifier::from("ScrollBehavior"))
            .is_some_and(|definition| definition.kind_name() == "enum")
    );
    assert!(database.stubs().count() == 0);
}
