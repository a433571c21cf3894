//! Translates AST groups into phase-0 IRs.
//!
//! The builder dispatches on the generic node classes the external parser
//! produces and registers one `DefinitionIr` per top-level definition. All
//! types go through the shared `IdlTypeFactory` and all cross-definition
//! links through the shared `RefByIdFactory`.

use tracing::debug;
use widl_ast::{AstGroup, AstNode};
use widl_common::{CompileError, Component, DebugInfo, Identifier, Location};
use widl_ir::{
    Argument, AsyncIterable, Attribute, CallbackFunctionIr, CallbackInterfaceIr, CompositionParts,
    Constant, Constructor, DefinitionIr, DictionaryIr, DictionaryMember, EnumerationIr, Exposure,
    ExtendedAttribute, ExtendedAttributes, IdlTypeFactory, IncludesIr, InterfaceIr, IrMap,
    Iterable, LiteralConstant, Maplike, NamespaceIr, Operation, Optionality, RefByIdFactory, RefId,
    Setlike, TypeId, TypeOptions, TypedefIr,
};

/// Builds phase-0 IRs from every AST group and registers them into the IR
/// map.
pub fn build_ast_groups(
    groups: &[AstGroup],
    ir_map: &mut IrMap,
    refs: &mut RefByIdFactory,
    types: &mut IdlTypeFactory,
) -> Result<(), CompileError> {
    for group in groups {
        let mut builder = IrBuilder {
            component: Component::new(group.component.clone()),
            for_testing: group.for_testing,
            types,
            refs,
        };
        for file_node in &group.files {
            assert_eq!(file_node.class(), "File");
            for top_level_node in file_node.children() {
                let ir = builder.build_top_level_def(top_level_node);
                debug!(identifier = %ir.identifier(), kind = ?ir.kind(), "built definition");
                ir_map.add(ir)?;
            }
        }
    }
    Ok(())
}

enum Member {
    Attribute(Attribute),
    Constant(Constant),
    Constructor(Constructor),
    Operation(Operation),
}

struct IrBuilder<'a> {
    component: Component,
    for_testing: bool,
    types: &'a mut IdlTypeFactory,
    refs: &'a mut RefByIdFactory,
}

/// The parser spells buffer source types as plain identifiers; they are
/// built-in, not references.
const BUFFER_SOURCE_TYPES: &[&str] = &[
    "ArrayBuffer",
    "ArrayBufferView",
    "DataView",
    "Int8Array",
    "Int16Array",
    "Int32Array",
    "BigInt64Array",
    "Uint8Array",
    "Uint16Array",
    "Uint32Array",
    "BigUint64Array",
    "Uint8ClampedArray",
    "Float32Array",
    "Float64Array",
];

fn node_debug_info(node: &AstNode) -> DebugInfo {
    DebugInfo::new(Location::new(
        node.str_property("FILENAME").unwrap_or(""),
        node.integer_property("LINENO").map(|line| line as u32),
        node.integer_property("POSITION").map(|pos| pos as u32),
    ))
}

/// Takes the first node of the class out of the list, if present.
fn take_node<'n>(nodes: &mut Vec<&'n AstNode>, class: &str) -> Option<&'n AstNode> {
    let position = nodes.iter().position(|node| node.class() == class)?;
    Some(nodes.remove(position))
}

fn parse_integer_literal(text: &str) -> i64 {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else if rest.len() > 1 && rest.starts_with('0') {
        i64::from_str_radix(&rest[1..], 8)
    } else {
        rest.parse()
    };
    let value = value.unwrap_or_else(|_| panic!("invalid integer literal: {text}"));
    if negative { -value } else { value }
}

impl IrBuilder<'_> {
    fn build_top_level_def(&mut self, node: &AstNode) -> DefinitionIr {
        let mut ir = match node.class() {
            "Callback" => self.build_callback_function(node),
            "Dictionary" => self.build_dictionary(node),
            "Enum" => self.build_enumeration(node),
            "Includes" => self.build_includes(node),
            "Interface" => self.build_interface(node),
            "Namespace" => self.build_namespace(node),
            "Typedef" => self.build_typedef(node),
            class => panic!("unsupported top-level definition class: {class}"),
        };
        if let Some(parts) = ir.parts_mut() {
            parts.code_generator_info.set_for_testing(self.for_testing);
        }
        ir
    }

    fn parts(
        &self,
        identifier: Identifier,
        node: &AstNode,
        extended_attributes: ExtendedAttributes,
    ) -> CompositionParts {
        CompositionParts::new(
            identifier,
            self.component.clone(),
            node_debug_info(node),
            extended_attributes,
        )
    }

    // Top-level definitions

    fn build_interface(&mut self, node: &AstNode) -> DefinitionIr {
        if node.bool_property("CALLBACK") {
            return self.build_callback_interface(node);
        }

        let identifier = Identifier::from(node.name());
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let inherited = take_node(&mut child_nodes, "Inherit")
            .map(|inherit| self.build_inheritance(inherit));
        let stringifier_members =
            take_node(&mut child_nodes, "Stringifier").map(|n| self.build_stringifier(n));
        let async_iterable = take_node(&mut child_nodes, "AsyncIterable")
            .map(|n| self.build_async_iterable(n, &identifier));
        let iterable =
            take_node(&mut child_nodes, "Iterable").map(|n| self.build_iterable(n, &identifier));
        let maplike =
            take_node(&mut child_nodes, "Maplike").map(|n| self.build_maplike(n, &identifier));
        let setlike =
            take_node(&mut child_nodes, "Setlike").map(|n| self.build_setlike(n, &identifier));
        let extended_attributes = take_node(&mut child_nodes, "ExtAttributes")
            .map(|n| self.build_extended_attributes(n))
            .unwrap_or_default();

        let mut ir = InterfaceIr::new(
            self.parts(identifier.clone(), node, extended_attributes),
            node.bool_property("PARTIAL"),
            node.bool_property("MIXIN"),
        );
        ir.inherited = inherited;
        ir.iterable = iterable;
        ir.async_iterable = async_iterable;
        ir.maplike = maplike;
        ir.setlike = setlike;

        for child in child_nodes {
            match self.build_interface_member(child, None, Some(&identifier)) {
                Member::Attribute(attribute) => ir.attributes.push(attribute),
                Member::Constant(constant) => ir.constants.push(constant),
                Member::Constructor(constructor) => ir.constructors.push(constructor),
                Member::Operation(operation) => ir.operations.push(operation),
            }
        }
        if let Some((operation, attribute)) = stringifier_members {
            ir.operations.push(operation);
            if let Some(attribute) = attribute {
                ir.attributes.push(attribute);
            }
        }
        ir.legacy_factory_functions = self.build_legacy_factory_functions(node);

        DefinitionIr::Interface(ir)
    }

    fn build_namespace(&mut self, node: &AstNode) -> DefinitionIr {
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let extended_attributes = take_node(&mut child_nodes, "ExtAttributes")
            .map(|n| self.build_extended_attributes(n))
            .unwrap_or_default();

        let mut ir = NamespaceIr::new(
            self.parts(Identifier::from(node.name()), node, extended_attributes),
            node.bool_property("PARTIAL"),
        );
        for child in child_nodes {
            match self.build_interface_member(child, None, None) {
                Member::Attribute(mut attribute) => {
                    attribute.is_static = true;
                    ir.attributes.push(attribute);
                }
                Member::Constant(constant) => ir.constants.push(constant),
                Member::Operation(mut operation) => {
                    operation.is_static = true;
                    ir.operations.push(operation);
                }
                Member::Constructor(_) => panic!("constructor in namespace {}", node.name()),
            }
        }
        DefinitionIr::Namespace(ir)
    }

    fn build_dictionary(&mut self, node: &AstNode) -> DefinitionIr {
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let inherited = take_node(&mut child_nodes, "Inherit")
            .map(|inherit| self.build_inheritance(inherit));
        let extended_attributes = take_node(&mut child_nodes, "ExtAttributes")
            .map(|n| self.build_extended_attributes(n))
            .unwrap_or_default();

        let mut ir = DictionaryIr::new(
            self.parts(Identifier::from(node.name()), node, extended_attributes),
            node.bool_property("PARTIAL"),
        );
        ir.inherited = inherited;
        ir.own_members = child_nodes
            .into_iter()
            .map(|child| self.build_dictionary_member(child))
            .collect();
        DefinitionIr::Dictionary(ir)
    }

    fn build_dictionary_member(&mut self, node: &AstNode) -> DictionaryMember {
        assert_eq!(node.class(), "Key");
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let is_required = node.bool_property("REQUIRED");
        let idl_type = {
            let type_node = take_node(&mut child_nodes, "Type")
                .unwrap_or_else(|| panic!("dictionary member {} has no type", node.name()));
            self.build_type(type_node, !is_required, false, None)
        };
        let default_value = take_node(&mut child_nodes, "Default")
            .map(|default| self.build_literal_constant(default));
        let extended_attributes = take_node(&mut child_nodes, "ExtAttributes")
            .map(|n| self.build_extended_attributes(n))
            .unwrap_or_default();
        assert!(child_nodes.is_empty());

        DictionaryMember {
            parts: self.parts(Identifier::from(node.name()), node, extended_attributes),
            idl_type,
            default_value,
            is_required,
        }
    }

    fn build_callback_interface(&mut self, node: &AstNode) -> DefinitionIr {
        assert!(node.bool_property("CALLBACK"));
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let extended_attributes = take_node(&mut child_nodes, "ExtAttributes")
            .map(|n| self.build_extended_attributes(n))
            .unwrap_or_default();

        let mut ir = CallbackInterfaceIr::new(self.parts(
            Identifier::from(node.name()),
            node,
            extended_attributes,
        ));
        for child in child_nodes {
            match self.build_interface_member(child, None, None) {
                Member::Constant(constant) => ir.constants.push(constant),
                Member::Operation(operation) => ir.operations.push(operation),
                _ => panic!("unsupported callback interface member in {}", node.name()),
            }
        }
        DefinitionIr::CallbackInterface(ir)
    }

    fn build_callback_function(&mut self, node: &AstNode) -> DefinitionIr {
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let arguments = take_node(&mut child_nodes, "Arguments")
            .map(|n| self.build_arguments(n))
            .unwrap_or_default();
        let return_type = {
            let type_node = take_node(&mut child_nodes, "Type")
                .unwrap_or_else(|| panic!("callback {} has no return type", node.name()));
            self.build_type(type_node, false, false, None)
        };
        let extended_attributes = take_node(&mut child_nodes, "ExtAttributes")
            .map(|n| self.build_extended_attributes(n))
            .unwrap_or_default();
        assert!(child_nodes.is_empty());

        DefinitionIr::CallbackFunction(CallbackFunctionIr::new(
            self.parts(Identifier::from(node.name()), node, extended_attributes),
            arguments,
            return_type,
        ))
    }

    fn build_enumeration(&mut self, node: &AstNode) -> DefinitionIr {
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let extended_attributes = take_node(&mut child_nodes, "ExtAttributes")
            .map(|n| self.build_extended_attributes(n))
            .unwrap_or_default();
        let values = child_nodes
            .into_iter()
            .map(|child| {
                assert_eq!(child.class(), "EnumItem");
                child.name().to_string()
            })
            .collect();
        DefinitionIr::Enumeration(EnumerationIr::new(
            self.parts(Identifier::from(node.name()), node, extended_attributes),
            values,
        ))
    }

    fn build_typedef(&mut self, node: &AstNode) -> DefinitionIr {
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let type_node = take_node(&mut child_nodes, "Type")
            .unwrap_or_else(|| panic!("typedef {} has no type", node.name()));
        let idl_type = self.build_type(type_node, false, false, None);
        assert!(child_nodes.is_empty());

        DefinitionIr::Typedef(TypedefIr::new(
            self.parts(Identifier::from(node.name()), node, ExtendedAttributes::default()),
            idl_type,
        ))
    }

    fn build_includes(&mut self, node: &AstNode) -> DefinitionIr {
        DefinitionIr::Includes(IncludesIr::new(
            Identifier::from(node.name()),
            Identifier::from(
                node.str_property("REFERENCE")
                    .unwrap_or_else(|| panic!("includes on {} names no mixin", node.name())),
            ),
            self.component.clone(),
            node_debug_info(node),
        ))
    }

    // Members

    fn build_interface_member(
        &mut self,
        node: &AstNode,
        fallback_extended_attributes: Option<&ExtendedAttributes>,
        interface_identifier: Option<&Identifier>,
    ) -> Member {
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let take_ext_attrs = |builder: &IrBuilder<'_>, nodes: &mut Vec<&AstNode>| {
            take_node(nodes, "ExtAttributes")
                .map(|n| builder.build_extended_attributes(n))
                .or_else(|| fallback_extended_attributes.cloned())
                .unwrap_or_default()
        };

        match node.class() {
            "Attribute" => {
                let type_node = take_node(&mut child_nodes, "Type")
                    .unwrap_or_else(|| panic!("attribute {} has no type", node.name()));
                let idl_type = self.build_type(type_node, false, false, None);
                let extended_attributes = take_ext_attrs(self, &mut child_nodes);
                assert!(child_nodes.is_empty());
                Member::Attribute(Attribute {
                    parts: self.parts(Identifier::from(node.name()), node, extended_attributes),
                    idl_type,
                    is_static: node.bool_property("STATIC"),
                    is_readonly: node.bool_property("READONLY"),
                    does_inherit_getter: node.bool_property("INHERIT"),
                    owner_mixin: None,
                })
            }
            "Const" => {
                let value = take_node(&mut child_nodes, "Value")
                    .map(|n| self.build_literal_constant(n))
                    .unwrap_or_else(|| panic!("constant {} has no value", node.name()));
                let extended_attributes = take_ext_attrs(self, &mut child_nodes);
                // The parser emits the constant's type body directly, with
                // no 'Type' wrapper node.
                assert_eq!(child_nodes.len(), 1);
                let idl_type = self.build_type_internal(child_nodes, false, None);
                Member::Constant(Constant {
                    parts: self.parts(Identifier::from(node.name()), node, extended_attributes),
                    idl_type,
                    value,
                })
            }
            "Constructor" => {
                let interface_identifier = interface_identifier
                    .unwrap_or_else(|| panic!("constructor outside an interface"));
                let arguments = take_node(&mut child_nodes, "Arguments")
                    .map(|n| self.build_arguments(n))
                    .unwrap_or_default();
                let extended_attributes = take_ext_attrs(self, &mut child_nodes);
                assert!(child_nodes.is_empty());
                let return_type = self
                    .types
                    .reference_type(interface_identifier.clone(), TypeOptions::default());
                Member::Constructor(Constructor {
                    parts: self.parts(Identifier::default(), node, extended_attributes),
                    arguments,
                    return_type,
                })
            }
            "Operation" => {
                let arguments = take_node(&mut child_nodes, "Arguments")
                    .map(|n| self.build_arguments(n))
                    .unwrap_or_default();
                let type_node = take_node(&mut child_nodes, "Type")
                    .unwrap_or_else(|| panic!("operation {} has no return type", node.name()));
                let return_type = self.build_type(type_node, false, false, None);
                let extended_attributes = take_ext_attrs(self, &mut child_nodes);
                assert!(child_nodes.is_empty());
                let mut operation = self.new_operation(
                    Identifier::from(node.name()),
                    arguments,
                    return_type,
                    extended_attributes,
                    node,
                );
                operation.is_static = node.bool_property("STATIC");
                operation.is_getter = node.bool_property("GETTER");
                operation.is_setter = node.bool_property("SETTER");
                operation.is_deleter = node.bool_property("DELETER");
                Member::Operation(operation)
            }
            class => panic!("unsupported member class: {class}"),
        }
    }

    /// The three stringifier forms: bare `stringifier;`, an operation, or
    /// an attribute. The bare and attribute forms synthesize an unnamed
    /// operation.
    fn build_stringifier(&mut self, node: &AstNode) -> (Operation, Option<Attribute>) {
        assert_eq!(node.class(), "Stringifier");
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let extended_attributes =
            take_node(&mut child_nodes, "ExtAttributes").map(|n| self.build_extended_attributes(n));
        assert!(child_nodes.len() <= 1);

        let member = child_nodes
            .first()
            .map(|child| self.build_interface_member(child, extended_attributes.as_ref(), None));

        let (mut operation, attribute) = match member {
            Some(Member::Operation(operation)) => (operation, None),
            Some(Member::Attribute(attribute)) => {
                let return_type = self.types.simple_type("DOMString", TypeOptions::default());
                let operation = self.new_operation(
                    Identifier::default(),
                    Vec::new(),
                    return_type,
                    ExtendedAttributes::default(),
                    node,
                );
                (operation, Some(attribute))
            }
            Some(_) => panic!("unsupported stringifier member"),
            None => {
                let return_type = self.types.simple_type("DOMString", TypeOptions::default());
                let operation = self.new_operation(
                    Identifier::default(),
                    Vec::new(),
                    return_type,
                    extended_attributes.unwrap_or_default(),
                    node,
                );
                (operation, None)
            }
        };
        operation.is_stringifier = true;
        if let Some(attribute) = &attribute {
            operation.stringifier_attribute = Some(attribute.parts.identifier.clone());
        }
        (operation, attribute)
    }

    fn build_legacy_factory_functions(&mut self, node: &AstNode) -> Vec<Constructor> {
        let Some(ext_attrs_node) = node
            .children()
            .iter()
            .find(|child| child.class() == "ExtAttributes")
        else {
            return Vec::new();
        };

        let mut factory_functions = Vec::new();
        for ext_attr in ext_attrs_node.children() {
            if ext_attr.name() != "LegacyFactoryFunction" {
                continue;
            }
            let call_node = &ext_attr.children()[0];
            assert_eq!(call_node.class(), "Call");
            let mut child_nodes: Vec<&AstNode> = call_node.children().iter().collect();
            let arguments = take_node(&mut child_nodes, "Arguments")
                .map(|n| self.build_arguments(n))
                .unwrap_or_default();
            assert!(child_nodes.is_empty());
            let return_type = self
                .types
                .reference_type(Identifier::from(node.name()), TypeOptions::default());
            factory_functions.push(Constructor {
                parts: self.parts(
                    Identifier::from(call_node.name()),
                    node,
                    ExtendedAttributes::default(),
                ),
                arguments,
                return_type,
            });
        }
        factory_functions
    }

    // Iteration declarations

    fn build_iterable(&mut self, node: &AstNode, interface_identifier: &Identifier) -> Iterable {
        assert_eq!(node.class(), "Iterable");
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let extended_attributes =
            take_node(&mut child_nodes, "ExtAttributes").map(|n| self.build_extended_attributes(n));
        let types: Vec<TypeId> = child_nodes
            .into_iter()
            .map(|child| self.build_type(child, false, false, None))
            .collect();

        let (key_type, value_type, operations) = match types.as_slice() {
            // A value iterable reuses the indexed-property machinery; it
            // synthesizes no operations of its own.
            [value_type] => (None, *value_type, Vec::new()),
            [key_type, value_type] => {
                let mut iter_ops = self.create_iterable_operations(
                    node,
                    interface_identifier,
                    extended_attributes.as_ref(),
                );
                iter_ops[1].is_iterator = true;
                (Some(*key_type), *value_type, iter_ops.into())
            }
            _ => panic!("iterable on {interface_identifier} declares too many types"),
        };
        Iterable {
            key_type,
            value_type,
            operations,
            operation_groups: Vec::new(),
            extended_attributes: extended_attributes.unwrap_or_default(),
            exposure: Exposure::default(),
            debug_info: node_debug_info(node),
        }
    }

    fn build_async_iterable(
        &mut self,
        node: &AstNode,
        interface_identifier: &Identifier,
    ) -> AsyncIterable {
        assert_eq!(node.class(), "AsyncIterable");
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let arguments = take_node(&mut child_nodes, "Arguments")
            .map(|n| self.build_arguments(n))
            .unwrap_or_default();
        let extended_attributes =
            take_node(&mut child_nodes, "ExtAttributes").map(|n| self.build_extended_attributes(n));
        let types: Vec<TypeId> = child_nodes
            .into_iter()
            .map(|child| self.build_type(child, false, false, None))
            .collect();

        let (key_type, value_type, operations) = match types.as_slice() {
            [value_type] => {
                let mut operations = self.create_async_iterable_operations(
                    node,
                    interface_identifier,
                    &["values"],
                    &arguments,
                    extended_attributes.as_ref(),
                );
                operations[0].is_async_iterator = true;
                (None, *value_type, operations)
            }
            [key_type, value_type] => {
                let mut operations = self.create_async_iterable_operations(
                    node,
                    interface_identifier,
                    &["entries", "keys", "values"],
                    &arguments,
                    extended_attributes.as_ref(),
                );
                operations[0].is_async_iterator = true;
                (Some(*key_type), *value_type, operations)
            }
            _ => panic!("async iterable on {interface_identifier} declares too many types"),
        };
        AsyncIterable {
            key_type,
            value_type,
            arguments,
            operations,
            operation_groups: Vec::new(),
            extended_attributes: extended_attributes.unwrap_or_default(),
            exposure: Exposure::default(),
            debug_info: node_debug_info(node),
        }
    }

    fn build_maplike(&mut self, node: &AstNode, interface_identifier: &Identifier) -> Maplike {
        assert_eq!(node.class(), "Maplike");
        let types: Vec<TypeId> = node
            .children()
            .iter()
            .map(|child| self.build_type(child, false, false, None))
            .collect();
        let [key_type, value_type] = types.as_slice() else {
            panic!("maplike on {interface_identifier} must declare key and value types");
        };
        let (key_type, value_type) = (*key_type, *value_type);
        let is_readonly = node.bool_property("READONLY");

        let attributes = vec![self.synth_size_attribute(node)];
        let mut iter_ops = self.create_iterable_operations(node, interface_identifier, None);
        iter_ops[1].is_iterator = true;
        let mut operations: Vec<Operation> = iter_ops.into();

        let key_argument = vec![self.synth_argument("key", key_type, 0)];
        operations.push(self.synth_operation(
            "get",
            key_argument.clone(),
            "any",
            node,
            "getForBinding",
            &["ScriptState"],
        ));
        operations.push(self.synth_operation(
            "has",
            key_argument.clone(),
            "boolean",
            node,
            "hasForBinding",
            &["ScriptState"],
        ));
        if !is_readonly {
            let set_arguments = vec![
                self.synth_argument("key", key_type, 0),
                self.synth_argument("value", value_type, 1),
            ];
            let set_return = self
                .types
                .reference_type(interface_identifier.clone(), TypeOptions::default());
            let mut set = self.synth_operation_with_return(
                "set",
                set_arguments,
                set_return,
                node,
                "setForBinding",
                &["ScriptState"],
            );
            let mut delete = self.synth_operation(
                "delete",
                key_argument,
                "boolean",
                node,
                "deleteForBinding",
                &["ScriptState"],
            );
            let mut clear = self.synth_operation(
                "clear",
                Vec::new(),
                "undefined",
                node,
                "clearForBinding",
                &["ScriptState"],
            );
            for op in [&mut set, &mut delete, &mut clear] {
                op.is_optionally_defined = true;
            }
            operations.extend([set, delete, clear]);
        }

        Maplike {
            key_type,
            value_type,
            is_readonly,
            attributes,
            operations,
            operation_groups: Vec::new(),
            extended_attributes: ExtendedAttributes::default(),
            exposure: Exposure::default(),
            debug_info: node_debug_info(node),
        }
    }

    fn build_setlike(&mut self, node: &AstNode, interface_identifier: &Identifier) -> Setlike {
        assert_eq!(node.class(), "Setlike");
        let types: Vec<TypeId> = node
            .children()
            .iter()
            .map(|child| self.build_type(child, false, false, None))
            .collect();
        let [value_type] = types.as_slice() else {
            panic!("setlike on {interface_identifier} must declare one value type");
        };
        let value_type = *value_type;
        let is_readonly = node.bool_property("READONLY");

        let attributes = vec![self.synth_size_attribute(node)];
        let mut iter_ops = self.create_iterable_operations(node, interface_identifier, None);
        iter_ops[3].is_iterator = true;
        let mut operations: Vec<Operation> = iter_ops.into();

        let value_argument = vec![self.synth_argument("value", value_type, 0)];
        operations.push(self.synth_operation(
            "has",
            value_argument.clone(),
            "boolean",
            node,
            "hasForBinding",
            &["ScriptState"],
        ));
        if !is_readonly {
            let add_return = self
                .types
                .reference_type(interface_identifier.clone(), TypeOptions::default());
            let mut add = self.synth_operation_with_return(
                "add",
                value_argument.clone(),
                add_return,
                node,
                "addForBinding",
                &["ScriptState"],
            );
            let mut delete = self.synth_operation(
                "delete",
                value_argument,
                "boolean",
                node,
                "deleteForBinding",
                &["ScriptState"],
            );
            let mut clear = self.synth_operation(
                "clear",
                Vec::new(),
                "undefined",
                node,
                "clearForBinding",
                &["ScriptState"],
            );
            for op in [&mut add, &mut delete, &mut clear] {
                op.is_optionally_defined = true;
            }
            operations.extend([add, delete, clear]);
        }

        Setlike {
            value_type,
            is_readonly,
            attributes,
            operations,
            operation_groups: Vec::new(),
            extended_attributes: ExtendedAttributes::default(),
            exposure: Exposure::default(),
            debug_info: node_debug_info(node),
        }
    }

    /// The synthesized iteration methods, in the order `forEach`,
    /// `entries`, `keys`, `values`.
    fn create_iterable_operations(
        &mut self,
        node: &AstNode,
        interface_identifier: &Identifier,
        base_extended_attributes: Option<&ExtendedAttributes>,
    ) -> [Operation; 4] {
        let iterator_identifier = Identifier::from(format!("SyncIterator_{interface_identifier}"));

        let callback_type = self.types.reference_type(
            Identifier::from("ForEachIteratorCallback"),
            TypeOptions::default(),
        );
        let this_arg_type = self.types.simple_type(
            "any",
            TypeOptions {
                is_optional: true,
                ..TypeOptions::default()
            },
        );
        let for_each_arguments = vec![
            Argument {
                identifier: Identifier::from("callback"),
                idl_type: callback_type,
                optionality: Optionality::Required,
                default_value: None,
                index: 0,
            },
            Argument {
                identifier: Identifier::from("thisArg"),
                idl_type: this_arg_type,
                optionality: Optionality::Optional,
                default_value: Some(LiteralConstant::null()),
                index: 1,
            },
        ];
        let undefined = self.types.simple_type("undefined", TypeOptions::default());
        let for_each = {
            let mut extended_attributes = base_extended_attributes.cloned().unwrap_or_default();
            extended_attributes.append(ExtendedAttribute::with_values(
                "CallWith",
                vec!["ScriptState".to_string(), "ThisValue".to_string()],
            ));
            extended_attributes.append(ExtendedAttribute::no_args("RaisesException"));
            extended_attributes
                .append(ExtendedAttribute::with_value("ImplementedAs", "forEachForBinding"));
            self.new_operation(
                Identifier::from("forEach"),
                for_each_arguments,
                undefined,
                extended_attributes,
                node,
            )
        };

        let iterator_op = |builder: &mut Self, name: &str, implemented_as: &str| {
            let return_type = builder
                .types
                .reference_type(iterator_identifier.clone(), TypeOptions::default());
            builder.synth_operation_with_return(
                name,
                Vec::new(),
                return_type,
                node,
                implemented_as,
                &["ScriptState"],
            )
        };
        let entries = iterator_op(self, "entries", "entriesForBinding");
        let keys = iterator_op(self, "keys", "keysForBinding");
        let values = iterator_op(self, "values", "valuesForBinding");

        [for_each, entries, keys, values]
    }

    /// The synthesized async iteration methods. Each takes a copy of the
    /// declaration's argument list.
    fn create_async_iterable_operations(
        &mut self,
        node: &AstNode,
        interface_identifier: &Identifier,
        names: &[&str],
        arguments: &[Argument],
        base_extended_attributes: Option<&ExtendedAttributes>,
    ) -> Vec<Operation> {
        let iterator_identifier = Identifier::from(format!("AsyncIterator_{interface_identifier}"));
        names
            .iter()
            .copied()
            .map(|name| {
                let return_type = self
                    .types
                    .reference_type(iterator_identifier.clone(), TypeOptions::default());
                let mut extended_attributes =
                    base_extended_attributes.cloned().unwrap_or_default();
                extended_attributes
                    .append(ExtendedAttribute::with_value("CallWith", "ScriptState"));
                extended_attributes.append(ExtendedAttribute::no_args("RaisesException"));
                extended_attributes.append(ExtendedAttribute::with_value(
                    "ImplementedAs",
                    &format!("{name}ForBinding"),
                ));
                self.new_operation(
                    Identifier::from(name),
                    arguments.to_vec(),
                    return_type,
                    extended_attributes,
                    node,
                )
            })
            .collect()
    }

    fn synth_size_attribute(&mut self, node: &AstNode) -> Attribute {
        let idl_type = self.types.simple_type("unsigned long", TypeOptions::default());
        Attribute {
            parts: self.parts(Identifier::from("size"), node, ExtendedAttributes::default()),
            idl_type,
            is_static: false,
            is_readonly: true,
            does_inherit_getter: false,
            owner_mixin: None,
        }
    }

    fn synth_argument(&self, identifier: &str, idl_type: TypeId, index: usize) -> Argument {
        Argument {
            identifier: Identifier::from(identifier),
            idl_type,
            optionality: Optionality::Required,
            default_value: None,
            index,
        }
    }

    /// Builds a synthesized operation whose return type is a simple type.
    fn synth_operation(
        &mut self,
        name: &str,
        arguments: Vec<Argument>,
        return_type_name: &str,
        node: &AstNode,
        implemented_as: &str,
        call_with: &[&str],
    ) -> Operation {
        let return_type = self
            .types
            .simple_type(return_type_name, TypeOptions::default());
        self.synth_operation_with_return(
            name,
            arguments,
            return_type,
            node,
            implemented_as,
            call_with,
        )
    }

    fn synth_operation_with_return(
        &mut self,
        name: &str,
        arguments: Vec<Argument>,
        return_type: TypeId,
        node: &AstNode,
        implemented_as: &str,
        call_with: &[&str],
    ) -> Operation {
        let mut extended_attributes = ExtendedAttributes::default();
        match call_with {
            [] => {}
            [single] => {
                extended_attributes.append(ExtendedAttribute::with_value("CallWith", *single));
            }
            many => extended_attributes.append(ExtendedAttribute::with_values(
                "CallWith",
                many.iter().map(|s| s.to_string()).collect(),
            )),
        }
        extended_attributes.append(ExtendedAttribute::no_args("RaisesException"));
        extended_attributes
            .append(ExtendedAttribute::with_value("ImplementedAs", implemented_as));
        self.new_operation(
            Identifier::from(name),
            arguments,
            return_type,
            extended_attributes,
            node,
        )
    }

    fn new_operation(
        &self,
        identifier: Identifier,
        arguments: Vec<Argument>,
        return_type: TypeId,
        extended_attributes: ExtendedAttributes,
        node: &AstNode,
    ) -> Operation {
        Operation {
            parts: self.parts(identifier, node, extended_attributes),
            arguments,
            return_type,
            is_static: false,
            is_getter: false,
            is_setter: false,
            is_deleter: false,
            is_stringifier: false,
            is_iterator: false,
            is_async_iterator: false,
            is_optionally_defined: false,
            stringifier_attribute: None,
            owner_mixin: None,
        }
    }

    // Arguments, types, literals, extended attributes

    fn build_arguments(&mut self, node: &AstNode) -> Vec<Argument> {
        assert_eq!(node.class(), "Arguments");
        node.children()
            .iter()
            .enumerate()
            .map(|(index, child)| self.build_argument(child, index))
            .collect()
    }

    fn build_argument(&mut self, node: &AstNode, index: usize) -> Argument {
        assert_eq!(node.class(), "Argument");
        let mut child_nodes: Vec<&AstNode> = node.children().iter().collect();
        let is_optional = node.bool_property("OPTIONAL");
        // A variadic argument is spelled as a nested argument named "...".
        let is_variadic = child_nodes
            .iter()
            .position(|child| child.class() == "Argument" && child.name() == "...")
            .map(|position| {
                child_nodes.remove(position);
            })
            .is_some();
        // The parser may place extended attributes on the argument; they
        // belong to the type.
        let extended_attributes =
            take_node(&mut child_nodes, "ExtAttributes").map(|n| self.build_extended_attributes(n));
        let type_node = take_node(&mut child_nodes, "Type")
            .unwrap_or_else(|| panic!("argument {} has no type", node.name()));
        let idl_type = self.build_type(type_node, is_optional, is_variadic, extended_attributes);
        let default_value =
            take_node(&mut child_nodes, "Default").map(|n| self.build_literal_constant(n));
        assert!(child_nodes.is_empty());

        Argument {
            identifier: Identifier::from(node.name()),
            idl_type,
            optionality: if is_variadic {
                Optionality::Variadic
            } else if is_optional {
                Optionality::Optional
            } else {
                Optionality::Required
            },
            default_value,
            index,
        }
    }

    fn build_type(
        &mut self,
        node: &AstNode,
        is_optional: bool,
        is_variadic: bool,
        extended_attributes: Option<ExtendedAttributes>,
    ) -> TypeId {
        assert_eq!(node.class(), "Type");
        assert!(!(is_optional && is_variadic));
        let mut idl_type = self.build_type_internal(
            node.children().iter().collect(),
            is_optional,
            extended_attributes,
        );
        if node.bool_property("NULLABLE") {
            idl_type = self.types.nullable_type(
                idl_type,
                TypeOptions {
                    is_optional,
                    debug_info: Some(node_debug_info(node)),
                    ..TypeOptions::default()
                },
            );
        }
        if is_variadic {
            idl_type = self.types.variadic_type(
                idl_type,
                TypeOptions {
                    debug_info: Some(node_debug_info(node)),
                    ..TypeOptions::default()
                },
            );
        }
        idl_type
    }

    fn build_type_internal(
        &mut self,
        nodes: Vec<&AstNode>,
        is_optional: bool,
        extended_attributes: Option<ExtendedAttributes>,
    ) -> TypeId {
        let mut type_nodes = nodes;
        let taken = take_node(&mut type_nodes, "ExtAttributes")
            .map(|n| self.build_extended_attributes(n));
        let extended_attributes = match (extended_attributes, taken) {
            (Some(mut outer), Some(inner)) => {
                for attribute in inner.iter() {
                    outer.append(attribute.clone());
                }
                outer
            }
            (outer, inner) => outer.or(inner).unwrap_or_default(),
        };
        assert_eq!(type_nodes.len(), 1);
        let body = type_nodes[0];

        let options = |extended_attributes: ExtendedAttributes, node: &AstNode| TypeOptions {
            is_optional,
            extended_attributes,
            debug_info: Some(node_debug_info(node)),
        };

        if BUFFER_SOURCE_TYPES.contains(&body.name()) {
            let name = body.name().to_string();
            return self.types.simple_type(name, options(extended_attributes, body));
        }

        match body.class() {
            "Any" | "Undefined" | "PrimitiveType" | "StringType" => {
                let mut name = if body.name().is_empty() {
                    body.class().to_ascii_lowercase()
                } else {
                    body.name().to_string()
                };
                if body.bool_property("UNRESTRICTED") {
                    name = format!("unrestricted {name}");
                }
                self.types.simple_type(name, options(extended_attributes, body))
            }
            "Typeref" => self
                .types
                .reference_type(Identifier::from(body.name()), options(extended_attributes, body)),
            "Sequence" => {
                let element = self.build_type(&body.children()[0], false, false, None);
                self.types.sequence_type(element, options(extended_attributes, body))
            }
            "FrozenArray" => {
                let element = self.build_type(&body.children()[0], false, false, None);
                self.types
                    .frozen_array_type(element, options(extended_attributes, body))
            }
            "ObservableArray" => {
                let element = self.build_type(&body.children()[0], false, false, None);
                self.types
                    .observable_array_type(element, options(extended_attributes, body))
            }
            "Promise" => {
                let result = self.build_type(&body.children()[0], false, false, None);
                self.types.promise_type(result, options(extended_attributes, body))
            }
            "Record" => {
                // The parser emits the key's type body directly, with no
                // 'Type' wrapper node.
                let children = body.children();
                let key = self.build_type_internal(vec![&children[0]], false, None);
                let value = self.build_type(&children[1], false, false, None);
                self.types
                    .record_type(key, value, options(extended_attributes, body))
            }
            "UnionType" => {
                let members = body
                    .children()
                    .iter()
                    .map(|child| self.build_type(child, false, false, None))
                    .collect();
                self.types.union_type(members, options(extended_attributes, body))
            }
            class => panic!("unsupported type body class: {class}"),
        }
    }

    fn build_extended_attributes(&self, node: &AstNode) -> ExtendedAttributes {
        assert_eq!(node.class(), "ExtAttributes");
        let mut attributes = ExtendedAttributes::default();
        for child in node.children() {
            attributes.append(self.build_extended_attribute(child));
        }
        attributes
    }

    fn build_extended_attribute(&self, node: &AstNode) -> ExtendedAttribute {
        let key = node.name();
        if let Some(child) = node.children().first() {
            match child.class() {
                "Arguments" => {
                    let arguments = child
                        .children()
                        .iter()
                        .map(|argument| {
                            assert_eq!(argument.class(), "Argument");
                            let type_node = &argument.children()[0];
                            assert_eq!(type_node.class(), "Type");
                            let body = &type_node.children()[0];
                            (body.name().to_string(), argument.name().to_string())
                        })
                        .collect();
                    return ExtendedAttribute::with_arguments(key, arguments);
                }
                "Call" => {
                    // An extended attribute cannot represent a full
                    // argument list; the arguments are discarded.
                    return ExtendedAttribute::with_named_arguments(key, child.name(), Vec::new());
                }
                class => panic!("unsupported extended attribute child: {class}"),
            }
        }
        match node.get_property("VALUE") {
            Some(value) => match value.as_list() {
                Some(values) => ExtendedAttribute::with_values(key, values.to_vec()),
                None => ExtendedAttribute::with_value(
                    key,
                    value.as_str().unwrap_or_else(|| {
                        panic!("extended attribute [{key}] has a non-string value")
                    }),
                ),
            },
            None => ExtendedAttribute::no_args(key),
        }
    }

    fn build_literal_constant(&self, node: &AstNode) -> LiteralConstant {
        assert!(node.children().is_empty());
        let type_token = node
            .str_property("TYPE")
            .unwrap_or_else(|| panic!("literal without a TYPE token"));
        match type_token {
            "NULL" => LiteralConstant::null(),
            "boolean" => {
                let value = node
                    .get_property("VALUE")
                    .and_then(widl_ast::PropertyValue::as_bool)
                    .unwrap_or_else(|| panic!("boolean literal without a boolean value"));
                LiteralConstant::boolean(value)
            }
            "integer" => {
                let literal = node
                    .str_property("VALUE")
                    .unwrap_or_else(|| panic!("integer literal without a value"));
                LiteralConstant::integer(parse_integer_literal(literal), literal)
            }
            "float" => {
                let literal = node
                    .str_property("VALUE")
                    .unwrap_or_else(|| panic!("float literal without a value"));
                let value = literal
                    .parse()
                    .unwrap_or_else(|_| panic!("invalid float literal: {literal}"));
                LiteralConstant::floating_point(value, literal)
            }
            "DOMString" => {
                let value = node
                    .str_property("VALUE")
                    .unwrap_or_else(|| panic!("string literal without a value"));
                LiteralConstant::string(value)
            }
            "sequence" => LiteralConstant::empty_sequence(),
            "dictionary" => LiteralConstant::empty_dictionary(),
            token => panic!("unknown literal type: {token}"),
        }
    }

    fn build_inheritance(&mut self, node: &AstNode) -> RefId {
        assert_eq!(node.class(), "Inherit");
        self.refs
            .create(Identifier::from(node.name()), node_debug_info(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_literals_accept_all_three_radixes() {
        assert_eq!(parse_integer_literal("42"), 42);
        assert_eq!(parse_integer_literal("0xFF"), 255);
        assert_eq!(parse_integer_literal("0755"), 493);
        assert_eq!(parse_integer_literal("-8"), -8);
        assert_eq!(parse_integer_literal("0"), 0);
    }
}
