//! The phased compiler turning definition IRs into a queryable database.
//!
//! Compilation is a fixed sequence of phases over the `IrMap`. Each phase
//! clones the IRs it touches out of the newest phase, transforms them, and
//! registers the results into a fresh phase, so every intermediate state
//! stays inspectable. The final phases freeze the IRs into public objects,
//! resolve every reference, and group union and observable array types
//! into shared definition objects.

use crate::name_styles;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::{debug, info};
use widl_common::{
    CompileError, Component, DebugInfo, Diagnostic, DiagnosticSink, Identifier,
};
use widl_ir::{
    Argument, AsyncIterable, AsyncIterator, Attribute, CallbackFunction, CallbackInterface,
    CompositionParts, Constructor, Database, DatabaseBody, DefinitionCategory, DefinitionIr,
    Dictionary, DictionaryIr, DictionaryUsage, Enumeration, Exposure, ExtendedAttribute,
    ExtendedAttributes, IdlTypeFactory, IdlTypeKind, IndexedAndNamedProperties, Interface,
    InterfaceIr, IrKind, IrMap,
    IteratorIr, LegacyWindowAlias, Namespace, NamespaceIr, ObservableArray, Operation,
    Optionality, OverloadGroupIr, RefByIdFactory, RefTarget, ResolvedReference,
    SecureContextMode, StubUserDefinedType, SyncIterator, TypeId, TypeOptions, Typedef, Union,
    UnionToken, UnionUsage,
};

/// Extended attributes that apply to a whole overload group as soon as any
/// overload carries them.
const GROUP_ANY_OF: [&str; 10] = [
    "CrossOrigin",
    "CrossOriginIsolated",
    "Custom",
    "IsolatedContext",
    "LegacyLenientThis",
    "LegacyUnforgeable",
    "NotEnumerable",
    "PerWorldBindings",
    "SecureContext",
    "Unscopable",
];

/// Common view of the function-likes an overload group indexes into.
trait OverloadMember {
    fn extended_attributes(&self) -> &ExtendedAttributes;
    fn arguments(&self) -> &[Argument];
    fn exposure(&self) -> &Exposure;
}

impl OverloadMember for Operation {
    fn extended_attributes(&self) -> &ExtendedAttributes {
        &self.parts.extended_attributes
    }

    fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    fn exposure(&self) -> &Exposure {
        &self.parts.exposure
    }
}

impl OverloadMember for Constructor {
    fn extended_attributes(&self) -> &ExtendedAttributes {
        &self.parts.extended_attributes
    }

    fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    fn exposure(&self) -> &Exposure {
        &self.parts.exposure
    }
}

/// Applies the exposure-related extended attributes of a construct to its
/// `Exposure`.
fn apply_exposure_from_extended_attributes(
    attributes: &ExtendedAttributes,
    exposure: &mut Exposure,
) {
    for attribute in attributes.get_list_of("Exposed") {
        if attribute.has_arguments() {
            for (global_name, feature) in attribute.arguments() {
                exposure.add_global_name_and_feature(global_name, Some(feature.as_str()));
            }
        } else {
            for global_name in attribute.values() {
                exposure.add_global_name_and_feature(global_name, None);
            }
        }
    }
    for feature in attributes.values_of("RuntimeEnabled") {
        exposure.add_runtime_enabled_feature(feature);
    }
    for feature in attributes.values_of("ContextEnabled") {
        exposure.add_context_enabled_feature(feature);
    }
    if attributes.contains("CrossOriginIsolated") {
        exposure.set_only_in_coi_contexts(true);
    }
    for feature in attributes.values_of("CrossOriginIsolatedOrRuntimeEnabled") {
        exposure.add_only_in_coi_contexts_or_runtime_enabled_feature(feature);
    }
    if attributes.contains("InjectionMitigated") {
        exposure.set_only_in_injection_mitigated_contexts(true);
    }
    if attributes.contains("IsolatedContext") {
        exposure.set_only_in_isolated_contexts(true);
    }
    if let Some(attribute) = attributes.get("SecureContext") {
        if attribute.values().is_empty() {
            exposure.set_only_in_secure_contexts(SecureContextMode::Always);
        } else {
            exposure.set_only_in_secure_contexts(SecureContextMode::Conditional(
                attribute
                    .values()
                    .iter()
                    .map(|value| Identifier::from(value.as_str()))
                    .collect(),
            ));
        }
    }
}

/// The header declaring the implementation class of a definition: next to
/// the IDL file, named after `[ImplementedAs]` when present and after the
/// IDL file otherwise.
fn blink_header(parts: &CompositionParts) -> String {
    let filepath = parts.debug_info.location().filepath.clone();
    let path = Path::new(&filepath);
    let basename = match parts.code_generator_info.receiver_implemented_as() {
        Some(class_name) => name_styles::header_basename(class_name),
        None => format!(
            "{}.h",
            path.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default()
        ),
    };
    match path.parent().and_then(|parent| parent.to_str()) {
        Some(dir) if !dir.is_empty() => format!("{dir}/{basename}"),
        _ => basename,
    }
}

fn partial_without_base(kind: &'static str, parts: &CompositionParts) -> CompileError {
    CompileError::PartialWithoutNonPartial {
        kind,
        identifier: parts.identifier.clone(),
        locations: parts.debug_info.all_locations().to_vec(),
    }
}

/// Folds a partial or mixin fragment into the primary interface IR.
/// Components only merge between fragments of the same flavor, so mixin
/// members keep their own component tags.
fn merge_interface_fragment(base: &mut InterfaceIr, donor: InterfaceIr) {
    if base.is_mixin == donor.is_mixin {
        base.parts.add_components(&donor.parts.components);
    }
    base.parts
        .debug_info
        .add_locations(donor.parts.debug_info.all_locations());
    if let Some(headers) = donor.parts.code_generator_info.blink_headers() {
        base.parts.code_generator_info.add_blink_headers(headers);
    }
    base.attributes.extend(donor.attributes);
    base.constants.extend(donor.constants);
    base.constructors.extend(donor.constructors);
    base.legacy_factory_functions
        .extend(donor.legacy_factory_functions);
    base.operations.extend(donor.operations);
    if base.iterable.is_none() {
        base.iterable = donor.iterable;
    }
    if base.async_iterable.is_none() {
        base.async_iterable = donor.async_iterable;
    }
    if base.maplike.is_none() {
        base.maplike = donor.maplike;
    }
    if base.setlike.is_none() {
        base.setlike = donor.setlike;
    }
}

fn merge_namespace_fragment(base: &mut NamespaceIr, donor: NamespaceIr) {
    base.parts.add_components(&donor.parts.components);
    base.parts
        .debug_info
        .add_locations(donor.parts.debug_info.all_locations());
    if let Some(headers) = donor.parts.code_generator_info.blink_headers() {
        base.parts.code_generator_info.add_blink_headers(headers);
    }
    base.attributes.extend(donor.attributes);
    base.constants.extend(donor.constants);
    base.operations.extend(donor.operations);
}

fn merge_dictionary_fragment(base: &mut DictionaryIr, donor: DictionaryIr) {
    base.parts.add_components(&donor.parts.components);
    base.parts
        .debug_info
        .add_locations(donor.parts.debug_info.all_locations());
    base.own_members.extend(donor.own_members);
}

/// Groups function-likes by identifier and staticness, preserving member
/// order. Unnamed function-likes are special operations and never overload
/// by name; constructors group under the empty identifier instead.
fn group_function_likes(keys: &[(Identifier, bool)], skip_unnamed: bool) -> Vec<OverloadGroupIr> {
    let mut groups: IndexMap<(Identifier, bool), Vec<usize>> = IndexMap::new();
    for (index, (identifier, is_static)) in keys.iter().enumerate() {
        if skip_unnamed && identifier.is_empty() {
            continue;
        }
        groups
            .entry((identifier.clone(), *is_static))
            .or_default()
            .push(index);
    }
    groups
        .into_iter()
        .map(|((identifier, is_static), members)| {
            let mut group = OverloadGroupIr::new(identifier, is_static);
            group.members = members;
            group
        })
        .collect()
}

fn operation_overload_groups(operations: &[Operation]) -> Vec<OverloadGroupIr> {
    let keys: Vec<(Identifier, bool)> = operations
        .iter()
        .map(|operation| (operation.parts.identifier.clone(), operation.is_static))
        .collect();
    group_function_likes(&keys, true)
}

fn constructor_overload_groups(constructors: &[Constructor]) -> Vec<OverloadGroupIr> {
    let keys: Vec<(Identifier, bool)> = constructors
        .iter()
        .map(|constructor| (constructor.parts.identifier.clone(), true))
        .collect();
    group_function_likes(&keys, false)
}

/// The argument counts a call site may pass to one function-like.
fn argument_count_candidates(arguments: &[Argument]) -> Vec<usize> {
    let mut counts = Vec::new();
    let mut all_optional = true;
    for (index, argument) in arguments.iter().enumerate().rev() {
        counts.push(index + 1);
        if matches!(argument.optionality, Optionality::Required) {
            all_optional = false;
            break;
        }
    }
    if all_optional {
        counts.push(0);
    }
    counts
}

/// Aggregates member extended attributes onto the overload group: any-of
/// keys are unioned, `Affects` must agree across every overload, and
/// `[NoAllocDirectCall]` overloads must not collide with plain overloads
/// on any argument count.
fn aggregate_group_extended_attributes<M: OverloadMember>(
    owner: &Identifier,
    group: &mut OverloadGroupIr,
    members: &[&M],
) -> Result<(), CompileError> {
    for key in GROUP_ANY_OF {
        if members
            .iter()
            .any(|member| member.extended_attributes().contains(key))
        {
            group
                .extended_attributes
                .append(ExtendedAttribute::no_args(key));
        }
    }

    let mut affects: Option<Option<&str>> = None;
    for member in members {
        let value = member.extended_attributes().value_of("Affects");
        match affects {
            None => affects = Some(value),
            Some(previous) if previous == value => {}
            Some(_) => {
                return Err(CompileError::InconsistentOverloadAttribute {
                    key: "Affects",
                    owner: owner.clone(),
                    group: group.identifier.clone(),
                });
            }
        }
    }
    if let Some(Some(value)) = affects {
        group
            .extended_attributes
            .append(ExtendedAttribute::with_value("Affects", value));
    }

    let mut nadc_counts: FxHashSet<usize> = FxHashSet::default();
    let mut plain_counts: FxHashSet<usize> = FxHashSet::default();
    for member in members {
        let counts = argument_count_candidates(member.arguments());
        if member.extended_attributes().contains("NoAllocDirectCall") {
            nadc_counts.extend(counts);
        } else {
            plain_counts.extend(counts);
        }
    }
    if nadc_counts.intersection(&plain_counts).next().is_some() {
        return Err(CompileError::InconsistentOverloadAttribute {
            key: "NoAllocDirectCall",
            owner: owner.clone(),
            group: group.identifier.clone(),
        });
    }
    if !nadc_counts.is_empty() {
        group
            .extended_attributes
            .append(ExtendedAttribute::no_args("NoAllocDirectCall"));
    }
    Ok(())
}

fn propagate_group_attributes<M: OverloadMember>(
    owner: &Identifier,
    groups: &mut [OverloadGroupIr],
    members: &[M],
) -> Result<(), CompileError> {
    for group in groups.iter_mut() {
        let views: Vec<&M> = group.members.iter().map(|&index| &members[index]).collect();
        aggregate_group_extended_attributes(owner, group, &views)?;
    }
    Ok(())
}

/// Computes the group exposure as the weakest condition under which any
/// overload is exposed: an unrestricted overload on an axis leaves the
/// whole group unrestricted on that axis.
fn aggregate_group_exposure(group: &mut OverloadGroupIr, exposures: &[&Exposure]) {
    if exposures
        .iter()
        .all(|exposure| !exposure.global_names_and_features().is_empty())
    {
        for exposure in exposures {
            for entry in exposure.global_names_and_features() {
                group.exposure.add_global_name_and_feature(
                    &entry.global_name,
                    entry.feature.as_ref().map(|feature| feature.as_str()),
                );
            }
        }
    }
    if exposures
        .iter()
        .all(|exposure| !exposure.runtime_enabled_features().is_empty())
    {
        for exposure in exposures {
            for feature in exposure.runtime_enabled_features() {
                group.exposure.add_runtime_enabled_feature(feature.as_str());
            }
        }
    }
    if exposures
        .iter()
        .all(|exposure| !exposure.context_enabled_features().is_empty())
    {
        for exposure in exposures {
            for feature in exposure.context_enabled_features() {
                group.exposure.add_context_enabled_feature(feature.as_str());
            }
        }
    }
    group
        .exposure
        .set_only_in_coi_contexts(exposures.iter().all(|exposure| exposure.only_in_coi_contexts()));
    let mut coi_or_runtime: BTreeSet<&Identifier> = BTreeSet::new();
    for exposure in exposures {
        coi_or_runtime.extend(exposure.only_in_coi_contexts_or_runtime_enabled_features());
    }
    for feature in coi_or_runtime {
        group
            .exposure
            .add_only_in_coi_contexts_or_runtime_enabled_feature(feature.as_str());
    }
    group.exposure.set_only_in_injection_mitigated_contexts(
        exposures
            .iter()
            .all(|exposure| exposure.only_in_injection_mitigated_contexts()),
    );
    group.exposure.set_only_in_isolated_contexts(
        exposures
            .iter()
            .all(|exposure| exposure.only_in_isolated_contexts()),
    );

    let modes: Vec<&SecureContextMode> = exposures
        .iter()
        .map(|exposure| exposure.only_in_secure_contexts())
        .collect();
    if modes.iter().any(|mode| {
        matches!(
            mode,
            SecureContextMode::Unspecified | SecureContextMode::Never
        )
    }) {
        // An unrestricted overload makes the whole group explicitly
        // unrestricted.
        group
            .exposure
            .set_only_in_secure_contexts(SecureContextMode::Never);
    } else if modes
        .iter()
        .all(|mode| matches!(mode, SecureContextMode::Always))
    {
        group
            .exposure
            .set_only_in_secure_contexts(SecureContextMode::Always);
    } else {
        // Every overload is restricted; the group is gated on the flags
        // common to all conditionally restricted overloads. `Always`
        // restricts under every flag set.
        let mut intersection: Option<BTreeSet<Identifier>> = None;
        for mode in &modes {
            if let SecureContextMode::Conditional(flags) = mode {
                let set: BTreeSet<Identifier> = flags.iter().cloned().collect();
                intersection = Some(match intersection {
                    None => set,
                    Some(previous) => previous.intersection(&set).cloned().collect(),
                });
            }
        }
        let flags: Vec<Identifier> = intersection.unwrap_or_default().into_iter().collect();
        group
            .exposure
            .set_only_in_secure_contexts(if flags.is_empty() {
                SecureContextMode::Always
            } else {
                SecureContextMode::Conditional(flags)
            });
    }
}

fn calculate_group_exposures_of<M: OverloadMember>(
    groups: &mut [OverloadGroupIr],
    members: &[M],
) {
    for group in groups.iter_mut() {
        let exposures: Vec<&Exposure> = group
            .members
            .iter()
            .map(|&index| members[index].exposure())
            .collect();
        aggregate_group_exposure(group, &exposures);
    }
}

/// Tags every type composing `root` (union members and typedef targets
/// included) with the owning definition's component and for-testing flag.
fn tag_composing_types(
    types: &IdlTypeFactory,
    owners: &mut FxHashMap<TypeId, Vec<(Component, bool)>>,
    root: TypeId,
    component: &Component,
    for_testing: bool,
) {
    let _ = types.apply_to_all_composing_elements(root, &mut |id| {
        owners
            .entry(id)
            .or_default()
            .push((component.clone(), for_testing));
        ControlFlow::Continue(())
    });
}

/// Walks types to find which dictionaries and unions are used as inputs
/// (converted from script values) and outputs (converted to script
/// values). References are still identifier-keyed at this point, so
/// typedefs and dictionaries resolve through the side maps.
struct UsageCollector<'a> {
    types: &'a IdlTypeFactory,
    refs: &'a RefByIdFactory,
    typedefs: &'a FxHashMap<Identifier, TypeId>,
    dictionaries: &'a IndexMap<Identifier, DictionaryIr>,
    dictionary_usage: FxHashMap<Identifier, DictionaryUsage>,
    union_inputs: FxHashSet<TypeId>,
    union_outputs: FxHashSet<TypeId>,
}

impl UsageCollector<'_> {
    fn visit_type(&mut self, id: TypeId, usage: DictionaryUsage) {
        match self.types.kind(id) {
            IdlTypeKind::Simple { .. } => {}
            IdlTypeKind::Reference { identifier, .. } => {
                if let Some(&aliased) = self.typedefs.get(identifier) {
                    self.visit_type(aliased, usage);
                } else if self.dictionaries.contains_key(identifier) {
                    self.visit_dictionary(identifier.clone(), usage);
                }
            }
            IdlTypeKind::Sequence { element }
            | IdlTypeKind::FrozenArray { element }
            | IdlTypeKind::ObservableArray { element, .. }
            | IdlTypeKind::Variadic { element } => self.visit_type(*element, usage),
            IdlTypeKind::Nullable { inner } => self.visit_type(*inner, usage),
            IdlTypeKind::Record { value, .. } => self.visit_type(*value, usage),
            // A promise resolution value always converts to a script
            // value, whichever direction the promise itself flows.
            IdlTypeKind::Promise { result } => {
                self.visit_type(*result, usage | DictionaryUsage::OUTPUT)
            }
            IdlTypeKind::Union { members, .. } => {
                if usage.contains(DictionaryUsage::INPUT) {
                    self.union_inputs.insert(id);
                }
                if usage.contains(DictionaryUsage::OUTPUT) {
                    self.union_outputs.insert(id);
                }
                for member in members.clone() {
                    self.visit_type(member, usage);
                }
            }
        }
    }

    fn visit_dictionary(&mut self, identifier: Identifier, mut usage: DictionaryUsage) {
        let Some(dictionary) = self.dictionaries.get(&identifier) else {
            return;
        };
        if dictionary
            .parts
            .extended_attributes
            .contains("ConvertibleToObject")
        {
            usage |= DictionaryUsage::OUTPUT;
        }
        let recorded = self.dictionary_usage.entry(identifier).or_default();
        if recorded.contains(usage) {
            // Already walked with at least this usage; dictionaries may
            // reference themselves through their members.
            return;
        }
        *recorded |= usage;
        let members: Vec<TypeId> = dictionary
            .own_members
            .iter()
            .map(|member| member.idl_type)
            .collect();
        let inherited = dictionary
            .inherited
            .map(|parent| self.refs.identifier(parent).clone());
        for member in members {
            self.visit_type(member, usage);
        }
        if let Some(parent) = inherited {
            self.visit_dictionary(parent, usage);
        }
    }
}

/// Compiles the IRs built from all AST groups into a `Database`.
///
/// Unresolvable references are reported to the `DiagnosticSink` and
/// replaced by stubs; inconsistent source IDL aborts with a
/// `CompileError`.
pub struct IdlCompiler<'a> {
    ir_map: IrMap,
    refs: RefByIdFactory,
    types: IdlTypeFactory,
    sink: &'a mut DiagnosticSink,
    body: DatabaseBody,
    union_inputs: FxHashSet<TypeId>,
    union_outputs: FxHashSet<TypeId>,
}

impl<'a> IdlCompiler<'a> {
    pub fn new(
        ir_map: IrMap,
        refs: RefByIdFactory,
        types: IdlTypeFactory,
        sink: &'a mut DiagnosticSink,
    ) -> Self {
        IdlCompiler {
            ir_map,
            refs,
            types,
            sink,
            body: DatabaseBody::default(),
            union_inputs: FxHashSet::default(),
            union_outputs: FxHashSet::default(),
        }
    }

    pub fn build_database(mut self) -> Result<Database, CompileError> {
        self.record_defined_in_partial_and_mixin()?;
        self.propagate_extended_attributes_per_fragment()?;
        self.determine_blink_headers()?;
        self.merge_partial_interface_likes()?;
        self.merge_partial_dictionaries()?;
        self.set_owner_mixins_of_mixin_members()?;
        self.merge_interface_mixins()?;
        self.process_interface_inheritances()?;
        self.supplement_missing_html_constructors()?;
        self.copy_legacy_factory_function_extended_attributes()?;
        self.create_iterator_definitions()?;
        self.group_overloaded_functions()?;
        self.propagate_extended_attributes_to_overload_groups()?;
        self.calculate_group_exposures()?;
        self.fill_exposed_constructs()?;
        self.calculate_dictionary_and_union_usages()?;
        self.create_public_objects();
        self.resolve_references_to_definitions();
        self.resolve_references_to_idl_types();
        self.create_public_unions();
        self.create_public_observable_arrays();
        info!(
            interfaces = self.body.interfaces.len(),
            unions = self.body.unions.len(),
            stubs = self.body.stubs.len(),
            phases = self.ir_map.current_phase() + 1,
            "compiled database"
        );
        Ok(Database::new(self.body, self.types, self.refs))
    }

    fn collect_irs(&self, kinds: &[IrKind]) -> Vec<DefinitionIr> {
        kinds
            .iter()
            .flat_map(|&kind| self.ir_map.irs_of_kind(kind))
            .collect()
    }

    fn collect_interface_map(&self, kind: IrKind) -> IndexMap<Identifier, InterfaceIr> {
        self.ir_map
            .irs_of_kind(kind)
            .into_iter()
            .map(|ir| {
                let DefinitionIr::Interface(ir) = ir else {
                    unreachable!()
                };
                (ir.identifier().clone(), ir)
            })
            .collect()
    }

    /// Stamps every member with whether it was declared in a partial or a
    /// mixin, which must be known after the fragments are merged away.
    fn record_defined_in_partial_and_mixin(&mut self) -> Result<(), CompileError> {
        let irs = self.collect_irs(&[
            IrKind::Interface,
            IrKind::PartialInterface,
            IrKind::InterfaceMixin,
            IrKind::PartialInterfaceMixin,
            IrKind::Namespace,
            IrKind::PartialNamespace,
            IrKind::Dictionary,
            IrKind::PartialDictionary,
        ]);
        self.ir_map.move_to_new_phase();
        for mut ir in irs {
            match &mut ir {
                DefinitionIr::Interface(interface) => {
                    let in_partial = interface.is_partial
                        || interface
                            .parts
                            .extended_attributes
                            .contains("LegacyTreatAsPartialInterface");
                    let in_mixin = interface.is_mixin;
                    interface.for_each_member_parts_mut(|parts| {
                        parts.code_generator_info.set_defined_in_partial(in_partial);
                        parts.code_generator_info.set_defined_in_mixin(in_mixin);
                    });
                }
                DefinitionIr::Namespace(namespace) => {
                    let in_partial = namespace.is_partial;
                    namespace.for_each_member_parts_mut(|parts| {
                        parts.code_generator_info.set_defined_in_partial(in_partial);
                    });
                }
                DefinitionIr::Dictionary(dictionary) => {
                    let in_partial = dictionary.is_partial;
                    dictionary.for_each_member_parts_mut(|parts| {
                        parts.code_generator_info.set_defined_in_partial(in_partial);
                    });
                }
                _ => unreachable!(),
            }
            self.ir_map.add(ir)?;
        }
        Ok(())
    }

    /// Applies each fragment's extended attributes before the fragments
    /// merge: `[ImplementedAs]` lands in code generator info, and the
    /// exposure-related attributes build the `Exposure` of the fragment
    /// and, for partials and mixins, of every member.
    fn propagate_extended_attributes_per_fragment(&mut self) -> Result<(), CompileError> {
        let irs = self.collect_irs(&[
            IrKind::CallbackInterface,
            IrKind::Dictionary,
            IrKind::PartialDictionary,
            IrKind::Interface,
            IrKind::PartialInterface,
            IrKind::InterfaceMixin,
            IrKind::PartialInterfaceMixin,
            IrKind::Namespace,
            IrKind::PartialNamespace,
        ]);
        self.ir_map.move_to_new_phase();
        for mut ir in irs {
            let attributes = ir
                .parts()
                .map(|parts| parts.extended_attributes.clone())
                .unwrap_or_default();
            let receiver_implemented_as =
                attributes.value_of("ImplementedAs").map(str::to_string);
            let propagate_to_members = match &ir {
                DefinitionIr::Interface(interface) => interface.is_partial || interface.is_mixin,
                DefinitionIr::Namespace(namespace) => namespace.is_partial,
                DefinitionIr::Dictionary(dictionary) => dictionary.is_partial,
                _ => false,
            };
            if let Some(parts) = ir.parts_mut() {
                if let Some(class_name) = &receiver_implemented_as {
                    parts
                        .code_generator_info
                        .set_receiver_implemented_as(class_name.clone());
                }
                apply_exposure_from_extended_attributes(&attributes, &mut parts.exposure);
            }
            let member_pass = |parts: &mut CompositionParts| {
                if let Some(class_name) = &receiver_implemented_as {
                    parts
                        .code_generator_info
                        .set_receiver_implemented_as(class_name.clone());
                }
                if propagate_to_members {
                    apply_exposure_from_extended_attributes(&attributes, &mut parts.exposure);
                }
                if let Some(property_name) = parts.extended_attributes.value_of("ImplementedAs") {
                    let property_name = property_name.to_string();
                    parts
                        .code_generator_info
                        .set_property_implemented_as(property_name);
                }
                apply_exposure_from_extended_attributes(
                    &parts.extended_attributes,
                    &mut parts.exposure,
                );
            };
            match &mut ir {
                DefinitionIr::Interface(interface) => {
                    interface.for_each_member_parts_mut(member_pass);
                    if let Some(iterable) = &mut interface.iterable {
                        apply_exposure_from_extended_attributes(
                            &iterable.extended_attributes,
                            &mut iterable.exposure,
                        );
                    }
                    if let Some(async_iterable) = &mut interface.async_iterable {
                        apply_exposure_from_extended_attributes(
                            &async_iterable.extended_attributes,
                            &mut async_iterable.exposure,
                        );
                    }
                    if let Some(maplike) = &mut interface.maplike {
                        apply_exposure_from_extended_attributes(
                            &maplike.extended_attributes,
                            &mut maplike.exposure,
                        );
                    }
                    if let Some(setlike) = &mut interface.setlike {
                        apply_exposure_from_extended_attributes(
                            &setlike.extended_attributes,
                            &mut setlike.exposure,
                        );
                    }
                }
                DefinitionIr::Namespace(namespace) => {
                    namespace.for_each_member_parts_mut(member_pass);
                }
                DefinitionIr::Dictionary(dictionary) => {
                    dictionary.for_each_member_parts_mut(member_pass);
                }
                DefinitionIr::CallbackInterface(callback_interface) => {
                    callback_interface.for_each_member_parts_mut(member_pass);
                }
                _ => unreachable!(),
            }
            self.ir_map.add(ir)?;
        }
        Ok(())
    }

    /// Records the implementation header of each fragment. Non-partial
    /// mixins are skipped; their members inherit the header of whichever
    /// interface includes them.
    fn determine_blink_headers(&mut self) -> Result<(), CompileError> {
        let irs = self.collect_irs(&[
            IrKind::Interface,
            IrKind::PartialInterface,
            IrKind::InterfaceMixin,
            IrKind::PartialInterfaceMixin,
            IrKind::Namespace,
            IrKind::PartialNamespace,
        ]);
        self.ir_map.move_to_new_phase();
        for mut ir in irs {
            let is_plain_mixin = matches!(
                &ir,
                DefinitionIr::Interface(interface) if interface.is_mixin && !interface.is_partial
            );
            if !is_plain_mixin {
                if let Some(parts) = ir.parts_mut() {
                    let header = blink_header(parts);
                    parts.code_generator_info.set_blink_headers(vec![header]);
                }
            }
            self.ir_map.add(ir)?;
        }
        Ok(())
    }

    fn merge_partial_interface_likes(&mut self) -> Result<(), CompileError> {
        let mut interfaces = self.collect_interface_map(IrKind::Interface);
        let mut mixins = self.collect_interface_map(IrKind::InterfaceMixin);
        let partial_interfaces = self.ir_map.irs_of_kind(IrKind::PartialInterface);
        let partial_mixins = self.ir_map.irs_of_kind(IrKind::PartialInterfaceMixin);
        let mut namespaces: IndexMap<Identifier, NamespaceIr> = self
            .ir_map
            .irs_of_kind(IrKind::Namespace)
            .into_iter()
            .map(|ir| {
                let DefinitionIr::Namespace(ir) = ir else {
                    unreachable!()
                };
                (ir.identifier().clone(), ir)
            })
            .collect();
        let partial_namespaces = self.ir_map.irs_of_kind(IrKind::PartialNamespace);

        self.ir_map.move_to_new_phase();
        for ir in partial_interfaces {
            let DefinitionIr::Interface(partial) = ir else {
                unreachable!()
            };
            let Some(base) = interfaces.get_mut(partial.identifier()) else {
                return Err(partial_without_base("partial interface", &partial.parts));
            };
            merge_interface_fragment(base, partial);
        }
        for ir in partial_mixins {
            let DefinitionIr::Interface(partial) = ir else {
                unreachable!()
            };
            let Some(base) = mixins.get_mut(partial.identifier()) else {
                return Err(partial_without_base(
                    "partial interface mixin",
                    &partial.parts,
                ));
            };
            merge_interface_fragment(base, partial);
        }
        for ir in partial_namespaces {
            let DefinitionIr::Namespace(partial) = ir else {
                unreachable!()
            };
            let Some(base) = namespaces.get_mut(partial.identifier()) else {
                return Err(partial_without_base("partial namespace", &partial.parts));
            };
            merge_namespace_fragment(base, partial);
        }
        for (_, interface) in interfaces {
            self.ir_map.add(DefinitionIr::Interface(interface))?;
        }
        for (_, mixin) in mixins {
            self.ir_map.add(DefinitionIr::Interface(mixin))?;
        }
        for (_, namespace) in namespaces {
            self.ir_map.add(DefinitionIr::Namespace(namespace))?;
        }
        Ok(())
    }

    fn merge_partial_dictionaries(&mut self) -> Result<(), CompileError> {
        let mut dictionaries: IndexMap<Identifier, DictionaryIr> = self
            .ir_map
            .irs_of_kind(IrKind::Dictionary)
            .into_iter()
            .map(|ir| {
                let DefinitionIr::Dictionary(ir) = ir else {
                    unreachable!()
                };
                (ir.identifier().clone(), ir)
            })
            .collect();
        let partials = self.ir_map.irs_of_kind(IrKind::PartialDictionary);
        self.ir_map.move_to_new_phase();
        for ir in partials {
            let DefinitionIr::Dictionary(partial) = ir else {
                unreachable!()
            };
            let Some(base) = dictionaries.get_mut(partial.identifier()) else {
                return Err(partial_without_base("partial dictionary", &partial.parts));
            };
            merge_dictionary_fragment(base, partial);
        }
        for (_, dictionary) in dictionaries {
            self.ir_map.add(DefinitionIr::Dictionary(dictionary))?;
        }
        Ok(())
    }

    /// Backlinks every mixin member to its mixin, so code generators can
    /// still tell merged members apart after the mixin is folded in.
    fn set_owner_mixins_of_mixin_members(&mut self) -> Result<(), CompileError> {
        let mixins = self.ir_map.irs_of_kind(IrKind::InterfaceMixin);
        self.ir_map.move_to_new_phase();
        for ir in mixins {
            let DefinitionIr::Interface(mut mixin) = ir else {
                unreachable!()
            };
            let owner = self
                .refs
                .create(mixin.identifier().clone(), mixin.parts.debug_info.clone());
            for attribute in &mut mixin.attributes {
                attribute.owner_mixin = Some(owner);
            }
            for operation in &mut mixin.operations {
                operation.owner_mixin = Some(owner);
            }
            self.ir_map.add(DefinitionIr::Interface(mixin))?;
        }
        Ok(())
    }

    fn merge_interface_mixins(&mut self) -> Result<(), CompileError> {
        let mut interfaces = self.collect_interface_map(IrKind::Interface);
        let mixins = self.collect_interface_map(IrKind::InterfaceMixin);
        let includes = self.ir_map.irs_of_kind(IrKind::Includes);
        self.ir_map.move_to_new_phase();
        for ir in includes {
            let DefinitionIr::Includes(includes) = ir else {
                unreachable!()
            };
            let Some(interface) = interfaces.get_mut(&includes.interface) else {
                self.sink.report(Diagnostic::new(
                    format!(
                        "includes statement for unknown interface {}",
                        includes.interface
                    ),
                    Some(includes.debug_info.location().clone()),
                ));
                continue;
            };
            let Some(mixin) = mixins.get(&includes.mixin) else {
                return Err(CompileError::MissingMixin {
                    interface: includes.interface.clone(),
                    mixin: includes.mixin.clone(),
                    location: includes.debug_info.location().clone(),
                });
            };
            merge_interface_fragment(interface, mixin.clone());
        }
        for (_, interface) in interfaces {
            self.ir_map.add(DefinitionIr::Interface(interface))?;
        }
        Ok(())
    }

    /// Walks inheritance chains: pulls chain-scoped extended attributes
    /// into code generator info, copies `[LegacyUnforgeable]` members down
    /// from ancestors, records subclass sets, and assigns class tags per
    /// inheritance tree.
    fn process_interface_inheritances(&mut self) -> Result<(), CompileError> {
        let mut interfaces = self.collect_interface_map(IrKind::Interface);

        let parent_of: FxHashMap<Identifier, Identifier> = interfaces
            .iter()
            .filter_map(|(identifier, interface)| {
                interface
                    .inherited
                    .map(|parent| (identifier.clone(), self.refs.identifier(parent).clone()))
            })
            .collect();
        let chain_of = |identifier: &Identifier| -> Vec<Identifier> {
            let mut chain = vec![identifier.clone()];
            let mut current = identifier.clone();
            while let Some(parent) = parent_of.get(&current) {
                if chain.contains(parent) {
                    break;
                }
                chain.push(parent.clone());
                current = parent.clone();
            }
            chain
        };

        let identifiers: Vec<Identifier> = interfaces.keys().cloned().collect();
        let mut chain_flags: FxHashMap<Identifier, (bool, bool)> = FxHashMap::default();
        let mut unforgeable: FxHashMap<Identifier, (Vec<Attribute>, Vec<Operation>)> =
            FxHashMap::default();
        let mut subclasses: FxHashMap<Identifier, BTreeSet<Identifier>> = FxHashMap::default();
        let mut direct_subclasses: FxHashMap<Identifier, BTreeSet<Identifier>> =
            FxHashMap::default();
        for identifier in &identifiers {
            let chain = chain_of(identifier);
            let is_active_script_wrappable = chain
                .iter()
                .filter_map(|ancestor| interfaces.get(ancestor))
                .any(|interface| {
                    interface
                        .parts
                        .extended_attributes
                        .contains("ActiveScriptWrappable")
                });
            let has_legacy_unenumerable = chain
                .iter()
                .filter_map(|ancestor| interfaces.get(ancestor))
                .any(|interface| {
                    interface
                        .parts
                        .extended_attributes
                        .contains("LegacyUnenumerableNamedProperties")
                });
            chain_flags.insert(
                identifier.clone(),
                (is_active_script_wrappable, has_legacy_unenumerable),
            );
            let mut attributes = Vec::new();
            let mut operations = Vec::new();
            for ancestor in chain.iter().skip(1).filter_map(|id| interfaces.get(id)) {
                attributes.extend(
                    ancestor
                        .attributes
                        .iter()
                        .filter(|attribute| {
                            attribute
                                .parts
                                .extended_attributes
                                .contains("LegacyUnforgeable")
                        })
                        .cloned(),
                );
                operations.extend(
                    ancestor
                        .operations
                        .iter()
                        .filter(|operation| {
                            operation
                                .parts
                                .extended_attributes
                                .contains("LegacyUnforgeable")
                        })
                        .cloned(),
                );
            }
            unforgeable.insert(identifier.clone(), (attributes, operations));
            if let Some(parent) = chain.get(1) {
                direct_subclasses
                    .entry(parent.clone())
                    .or_default()
                    .insert(identifier.clone());
            }
            for ancestor in chain.iter().skip(1) {
                subclasses
                    .entry(ancestor.clone())
                    .or_default()
                    .insert(identifier.clone());
            }
        }

        for (identifier, interface) in interfaces.iter_mut() {
            let (is_active_script_wrappable, has_legacy_unenumerable) =
                chain_flags.get(identifier).copied().unwrap_or_default();
            interface
                .parts
                .code_generator_info
                .set_is_active_script_wrappable(is_active_script_wrappable);
            interface
                .parts
                .code_generator_info
                .set_is_legacy_unenumerable_named_properties(has_legacy_unenumerable);
            let (attributes, operations) =
                unforgeable.remove(identifier).unwrap_or_default();
            interface.attributes.extend(attributes);
            interface.operations.extend(operations);
            if let Some(set) = subclasses.get(identifier) {
                interface.deriveds = set
                    .iter()
                    .map(|subclass| {
                        self.refs
                            .create(subclass.clone(), interface.parts.debug_info.clone())
                    })
                    .collect();
            }
            if let Some(set) = direct_subclasses.get(identifier) {
                interface.direct_subclasses = set.iter().cloned().collect();
            }
        }

        // Tags are preorder per inheritance tree; an interface inheriting
        // an unresolvable parent stays untagged.
        fn assign_tags(
            interfaces: &mut IndexMap<Identifier, InterfaceIr>,
            identifier: &Identifier,
            next_tag: &mut u32,
        ) {
            let Some(interface) = interfaces.get_mut(identifier) else {
                return;
            };
            interface.tag = Some(*next_tag);
            *next_tag += 1;
            let children = interface.direct_subclasses.clone();
            for child in &children {
                assign_tags(interfaces, child, next_tag);
            }
            if let Some(interface) = interfaces.get_mut(identifier) {
                interface.max_subclass_tag = Some(*next_tag - 1);
            }
        }
        let roots: Vec<Identifier> = interfaces
            .iter()
            .filter(|(_, interface)| interface.inherited.is_none())
            .map(|(identifier, _)| identifier.clone())
            .collect();
        let mut next_tag = 256u32;
        for root in &roots {
            assign_tags(&mut interfaces, root, &mut next_tag);
        }

        self.ir_map.move_to_new_phase();
        for (_, interface) in interfaces {
            self.ir_map.add(DefinitionIr::Interface(interface))?;
        }
        Ok(())
    }

    /// An `[HTMLConstructor]` interface with no explicit constructor still
    /// gets one, since custom element upgrades call it.
    fn supplement_missing_html_constructors(&mut self) -> Result<(), CompileError> {
        let irs = self.ir_map.irs_of_kind(IrKind::Interface);
        self.ir_map.move_to_new_phase();
        for ir in irs {
            let DefinitionIr::Interface(mut interface) = ir else {
                unreachable!()
            };
            if interface.constructors.is_empty()
                && interface
                    .parts
                    .extended_attributes
                    .contains("HTMLConstructor")
            {
                let return_type = self
                    .types
                    .reference_type(interface.identifier().clone(), TypeOptions::default());
                let parts = CompositionParts::new(
                    Identifier::default(),
                    interface.parts.components[0].clone(),
                    interface.parts.debug_info.clone(),
                    ExtendedAttributes::new(vec![ExtendedAttribute::no_args("HTMLConstructor")]),
                );
                interface.constructors.push(Constructor {
                    parts,
                    arguments: Vec::new(),
                    return_type,
                });
            }
            self.ir_map.add(DefinitionIr::Interface(interface))?;
        }
        Ok(())
    }

    /// `[NamedConstructor_CallWith]` and `[NamedConstructor_RaisesException]`
    /// on the interface describe its legacy factory functions; copy them
    /// onto each one as plain `CallWith` / `RaisesException`.
    fn copy_legacy_factory_function_extended_attributes(&mut self) -> Result<(), CompileError> {
        let irs = self.ir_map.irs_of_kind(IrKind::Interface);
        self.ir_map.move_to_new_phase();
        for ir in irs {
            let DefinitionIr::Interface(mut interface) = ir else {
                unreachable!()
            };
            let call_with: Vec<String> = interface
                .parts
                .extended_attributes
                .values_of("NamedConstructor_CallWith")
                .to_vec();
            let raises_exception = interface
                .parts
                .extended_attributes
                .contains("NamedConstructor_RaisesException");
            for function in &mut interface.legacy_factory_functions {
                match call_with.as_slice() {
                    [] => {}
                    [value] => function
                        .parts
                        .extended_attributes
                        .append(ExtendedAttribute::with_value("CallWith", value)),
                    values => function
                        .parts
                        .extended_attributes
                        .append(ExtendedAttribute::with_values("CallWith", values.to_vec())),
                }
                if raises_exception {
                    function
                        .parts
                        .extended_attributes
                        .append(ExtendedAttribute::no_args("RaisesException"));
                }
            }
            self.ir_map.add(DefinitionIr::Interface(interface))?;
        }
        Ok(())
    }

    /// Synthesizes `SyncIterator_X` / `AsyncIterator_X` definitions for
    /// interfaces with iteration declarations and links them back through
    /// references.
    fn create_iterator_definitions(&mut self) -> Result<(), CompileError> {
        let irs = self.ir_map.irs_of_kind(IrKind::Interface);
        self.ir_map.move_to_new_phase();
        for ir in irs {
            let DefinitionIr::Interface(mut interface) = ir else {
                unreachable!()
            };
            if let Some(declaration) = interface.async_iterable.clone() {
                let iterator = self.build_async_iterator(&interface, &declaration);
                let identifier = iterator.parts.identifier.clone();
                let debug_info = iterator.parts.debug_info.clone();
                debug!(host = %interface.identifier(), iterator = %identifier, "synthesized async iterator");
                self.ir_map.add(DefinitionIr::AsyncIterator(iterator))?;
                interface.async_iterator = Some(self.refs.create(identifier, debug_info));
            }
            let sync_source = match (&interface.iterable, &interface.maplike, &interface.setlike)
            {
                (Some(iterable), _, _) if iterable.is_pair_iterator() => Some((
                    iterable.key_type,
                    iterable.value_type,
                    iterable.debug_info.clone(),
                )),
                (_, Some(maplike), _) => Some((
                    Some(maplike.key_type),
                    maplike.value_type,
                    maplike.debug_info.clone(),
                )),
                (_, _, Some(setlike)) => {
                    Some((None, setlike.value_type, setlike.debug_info.clone()))
                }
                _ => None,
            };
            if let Some((key_type, value_type, debug_info)) = sync_source {
                let iterator =
                    self.build_sync_iterator(&interface, key_type, value_type, debug_info);
                let identifier = iterator.parts.identifier.clone();
                let debug_info = iterator.parts.debug_info.clone();
                debug!(host = %interface.identifier(), iterator = %identifier, "synthesized sync iterator");
                self.ir_map.add(DefinitionIr::SyncIterator(iterator))?;
                interface.sync_iterator = Some(self.refs.create(identifier, debug_info));
            }
            self.ir_map.add(DefinitionIr::Interface(interface))?;
        }
        Ok(())
    }

    fn iterator_operation(
        &self,
        name: &str,
        arguments: Vec<Argument>,
        return_type: TypeId,
        owner_parts: &CompositionParts,
        implemented_as: Option<&str>,
    ) -> Operation {
        let mut extended_attributes = ExtendedAttributes::default();
        extended_attributes.append(ExtendedAttribute::with_value("CallWith", "ScriptState"));
        extended_attributes.append(ExtendedAttribute::no_args("RaisesException"));
        if let Some(class_name) = implemented_as {
            extended_attributes.append(ExtendedAttribute::with_value("ImplementedAs", class_name));
        }
        Operation {
            parts: CompositionParts::new(
                Identifier::from(name),
                owner_parts.components[0].clone(),
                owner_parts.debug_info.clone(),
                extended_attributes,
            ),
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

    /// A `Promise<object>` whose bindings-side representation is a plain
    /// v8 promise rather than a wrapper type.
    fn v8_promise_of_object(&mut self) -> TypeId {
        let result = self.types.simple_type("object", TypeOptions::default());
        let options = TypeOptions {
            extended_attributes: ExtendedAttributes::new(vec![ExtendedAttribute::no_args(
                "IDLTypeImplementedAsV8Promise",
            )]),
            ..TypeOptions::default()
        };
        self.types.promise_type(result, options)
    }

    fn build_sync_iterator(
        &mut self,
        interface: &InterfaceIr,
        key_type: Option<TypeId>,
        value_type: TypeId,
        debug_info: DebugInfo,
    ) -> IteratorIr {
        let identifier = Identifier::from(format!("SyncIterator_{}", interface.identifier()));
        let mut parts = CompositionParts::new(
            identifier,
            interface.parts.components[0].clone(),
            debug_info,
            ExtendedAttributes::default(),
        );
        parts
            .code_generator_info
            .set_for_testing(interface.parts.code_generator_info.for_testing());
        let result_type = self.types.simple_type("object", TypeOptions::default());
        let next = self.iterator_operation("next", Vec::new(), result_type, &parts, None);
        IteratorIr {
            parts,
            host: interface.identifier().clone(),
            is_async: false,
            key_type,
            value_type,
            operations: vec![next],
            operation_groups: Vec::new(),
        }
    }

    fn build_async_iterator(
        &mut self,
        interface: &InterfaceIr,
        declaration: &AsyncIterable,
    ) -> IteratorIr {
        let identifier = Identifier::from(format!("AsyncIterator_{}", interface.identifier()));
        let mut parts = CompositionParts::new(
            identifier,
            interface.parts.components[0].clone(),
            declaration.debug_info.clone(),
            ExtendedAttributes::default(),
        );
        parts
            .code_generator_info
            .set_for_testing(interface.parts.code_generator_info.for_testing());
        let next_type = self.v8_promise_of_object();
        let mut operations =
            vec![self.iterator_operation("next", Vec::new(), next_type, &parts, None)];
        if declaration
            .extended_attributes
            .contains("HasAsyncIteratorReturnAlgorithm")
        {
            let value_type = self.types.simple_type(
                "any",
                TypeOptions {
                    is_optional: true,
                    ..TypeOptions::default()
                },
            );
            let argument = Argument {
                identifier: Identifier::from("value"),
                idl_type: value_type,
                optionality: Optionality::Optional,
                default_value: None,
                index: 0,
            };
            let return_type = self.v8_promise_of_object();
            operations.push(self.iterator_operation(
                "return",
                vec![argument],
                return_type,
                &parts,
                Some("returnForBinding"),
            ));
        }
        IteratorIr {
            parts,
            host: interface.identifier().clone(),
            is_async: true,
            key_type: declaration.key_type,
            value_type: declaration.value_type,
            operations,
            operation_groups: Vec::new(),
        }
    }

    fn group_overloaded_functions(&mut self) -> Result<(), CompileError> {
        let irs = self.collect_irs(&[
            IrKind::AsyncIterator,
            IrKind::CallbackInterface,
            IrKind::Interface,
            IrKind::Namespace,
            IrKind::SyncIterator,
        ]);
        self.ir_map.move_to_new_phase();
        for mut ir in irs {
            match &mut ir {
                DefinitionIr::Interface(interface) => {
                    interface.operation_groups = operation_overload_groups(&interface.operations);
                    interface.constructor_groups =
                        constructor_overload_groups(&interface.constructors);
                    interface.legacy_factory_function_groups =
                        constructor_overload_groups(&interface.legacy_factory_functions);
                    if let Some(iterable) = &mut interface.iterable {
                        iterable.operation_groups =
                            operation_overload_groups(&iterable.operations);
                    }
                    if let Some(async_iterable) = &mut interface.async_iterable {
                        async_iterable.operation_groups =
                            operation_overload_groups(&async_iterable.operations);
                    }
                    // An author-declared member shadows the synthesized
                    // mutating operation of the same identifier.
                    if let Some(mut maplike) = interface.maplike.take() {
                        maplike.operations.retain(|operation| {
                            !operation.is_optionally_defined
                                || !interface.has_member_named(operation.parts.identifier.as_str())
                        });
                        maplike.operation_groups = operation_overload_groups(&maplike.operations);
                        interface.maplike = Some(maplike);
                    }
                    if let Some(mut setlike) = interface.setlike.take() {
                        setlike.operations.retain(|operation| {
                            !operation.is_optionally_defined
                                || !interface.has_member_named(operation.parts.identifier.as_str())
                        });
                        setlike.operation_groups = operation_overload_groups(&setlike.operations);
                        interface.setlike = Some(setlike);
                    }
                }
                DefinitionIr::Namespace(namespace) => {
                    namespace.operation_groups = operation_overload_groups(&namespace.operations);
                }
                DefinitionIr::CallbackInterface(callback_interface) => {
                    callback_interface.operation_groups =
                        operation_overload_groups(&callback_interface.operations);
                }
                DefinitionIr::SyncIterator(iterator) | DefinitionIr::AsyncIterator(iterator) => {
                    iterator.operation_groups = operation_overload_groups(&iterator.operations);
                }
                _ => unreachable!(),
            }
            self.ir_map.add(ir)?;
        }
        Ok(())
    }

    fn propagate_extended_attributes_to_overload_groups(&mut self) -> Result<(), CompileError> {
        let irs = self.collect_irs(&[
            IrKind::AsyncIterator,
            IrKind::CallbackInterface,
            IrKind::Interface,
            IrKind::Namespace,
            IrKind::SyncIterator,
        ]);
        self.ir_map.move_to_new_phase();
        for mut ir in irs {
            let owner = ir.identifier().clone();
            match &mut ir {
                DefinitionIr::Interface(interface) => {
                    propagate_group_attributes(
                        &owner,
                        &mut interface.operation_groups,
                        &interface.operations,
                    )?;
                    propagate_group_attributes(
                        &owner,
                        &mut interface.constructor_groups,
                        &interface.constructors,
                    )?;
                    propagate_group_attributes(
                        &owner,
                        &mut interface.legacy_factory_function_groups,
                        &interface.legacy_factory_functions,
                    )?;
                    if let Some(iterable) = &mut interface.iterable {
                        propagate_group_attributes(
                            &owner,
                            &mut iterable.operation_groups,
                            &iterable.operations,
                        )?;
                    }
                    if let Some(async_iterable) = &mut interface.async_iterable {
                        propagate_group_attributes(
                            &owner,
                            &mut async_iterable.operation_groups,
                            &async_iterable.operations,
                        )?;
                    }
                    if let Some(maplike) = &mut interface.maplike {
                        propagate_group_attributes(
                            &owner,
                            &mut maplike.operation_groups,
                            &maplike.operations,
                        )?;
                    }
                    if let Some(setlike) = &mut interface.setlike {
                        propagate_group_attributes(
                            &owner,
                            &mut setlike.operation_groups,
                            &setlike.operations,
                        )?;
                    }
                }
                DefinitionIr::Namespace(namespace) => {
                    propagate_group_attributes(
                        &owner,
                        &mut namespace.operation_groups,
                        &namespace.operations,
                    )?;
                }
                DefinitionIr::CallbackInterface(callback_interface) => {
                    propagate_group_attributes(
                        &owner,
                        &mut callback_interface.operation_groups,
                        &callback_interface.operations,
                    )?;
                }
                DefinitionIr::SyncIterator(iterator) | DefinitionIr::AsyncIterator(iterator) => {
                    propagate_group_attributes(
                        &owner,
                        &mut iterator.operation_groups,
                        &iterator.operations,
                    )?;
                }
                _ => unreachable!(),
            }
            self.ir_map.add(ir)?;
        }
        Ok(())
    }

    fn calculate_group_exposures(&mut self) -> Result<(), CompileError> {
        let irs = self.collect_irs(&[
            IrKind::AsyncIterator,
            IrKind::CallbackInterface,
            IrKind::Interface,
            IrKind::Namespace,
            IrKind::SyncIterator,
        ]);
        self.ir_map.move_to_new_phase();
        for mut ir in irs {
            match &mut ir {
                DefinitionIr::Interface(interface) => {
                    calculate_group_exposures_of(
                        &mut interface.operation_groups,
                        &interface.operations,
                    );
                    calculate_group_exposures_of(
                        &mut interface.constructor_groups,
                        &interface.constructors,
                    );
                    calculate_group_exposures_of(
                        &mut interface.legacy_factory_function_groups,
                        &interface.legacy_factory_functions,
                    );
                    if let Some(iterable) = &mut interface.iterable {
                        calculate_group_exposures_of(
                            &mut iterable.operation_groups,
                            &iterable.operations,
                        );
                    }
                    if let Some(async_iterable) = &mut interface.async_iterable {
                        calculate_group_exposures_of(
                            &mut async_iterable.operation_groups,
                            &async_iterable.operations,
                        );
                    }
                    if let Some(maplike) = &mut interface.maplike {
                        calculate_group_exposures_of(
                            &mut maplike.operation_groups,
                            &maplike.operations,
                        );
                    }
                    if let Some(setlike) = &mut interface.setlike {
                        calculate_group_exposures_of(
                            &mut setlike.operation_groups,
                            &setlike.operations,
                        );
                    }
                }
                DefinitionIr::Namespace(namespace) => {
                    calculate_group_exposures_of(
                        &mut namespace.operation_groups,
                        &namespace.operations,
                    );
                }
                DefinitionIr::CallbackInterface(callback_interface) => {
                    calculate_group_exposures_of(
                        &mut callback_interface.operation_groups,
                        &callback_interface.operations,
                    );
                }
                DefinitionIr::SyncIterator(iterator) | DefinitionIr::AsyncIterator(iterator) => {
                    calculate_group_exposures_of(
                        &mut iterator.operation_groups,
                        &iterator.operations,
                    );
                }
                _ => unreachable!(),
            }
            self.ir_map.add(ir)?;
        }
        Ok(())
    }

    /// Fills in, for each `[Global]` interface, the constructs exposed on
    /// it, plus the `[LegacyWindowAlias]` entries of the `Window` global.
    fn fill_exposed_constructs(&mut self) -> Result<(), CompileError> {
        let mut exposed_map: IndexMap<String, Vec<Identifier>> = IndexMap::new();
        let mut aliases: Vec<LegacyWindowAlias> = Vec::new();
        for kind in [
            IrKind::CallbackInterface,
            IrKind::Interface,
            IrKind::Namespace,
        ] {
            for ir in self.ir_map.irs_of_kind(kind) {
                let Some(parts) = ir.parts() else { continue };
                for entry in parts.exposure.global_names_and_features() {
                    exposed_map
                        .entry(entry.global_name.clone())
                        .or_default()
                        .push(ir.identifier().clone());
                }
                for alias_name in parts.extended_attributes.values_of("LegacyWindowAlias") {
                    let original = self
                        .refs
                        .create(ir.identifier().clone(), parts.debug_info.clone());
                    let mut extended_attributes = ExtendedAttributes::default();
                    let mut exposure = Exposure::new();
                    if parts
                        .extended_attributes
                        .contains("LegacyWindowAlias_Measure")
                    {
                        extended_attributes.append(
                            match parts
                                .extended_attributes
                                .value_of("LegacyWindowAlias_Measure")
                            {
                                Some(value) => ExtendedAttribute::with_value("Measure", value),
                                None => ExtendedAttribute::no_args("Measure"),
                            },
                        );
                    }
                    if let Some(value) = parts
                        .extended_attributes
                        .value_of("LegacyWindowAlias_MeasureAs")
                    {
                        extended_attributes
                            .append(ExtendedAttribute::with_value("MeasureAs", value));
                    }
                    if let Some(feature) = parts
                        .extended_attributes
                        .value_of("LegacyWindowAlias_RuntimeEnabled")
                    {
                        extended_attributes
                            .append(ExtendedAttribute::with_value("RuntimeEnabled", feature));
                        exposure.add_runtime_enabled_feature(feature);
                    }
                    aliases.push(LegacyWindowAlias {
                        identifier: Identifier::from(alias_name.as_str()),
                        original,
                        extended_attributes,
                        exposure,
                    });
                }
            }
        }
        aliases.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        let irs = self.ir_map.irs_of_kind(IrKind::Interface);
        self.ir_map.move_to_new_phase();
        for ir in irs {
            let DefinitionIr::Interface(mut interface) = ir else {
                unreachable!()
            };
            let globals: Vec<String> = interface
                .parts
                .extended_attributes
                .values_of("Global")
                .to_vec();
            let targets: Vec<String> = interface
                .parts
                .extended_attributes
                .values_of("TargetOfExposed")
                .to_vec();
            if !globals.is_empty() || !targets.is_empty() {
                let mut constructs: BTreeSet<Identifier> = BTreeSet::new();
                for global_name in globals.iter().chain(targets.iter()) {
                    if let Some(exposed) = exposed_map.get(global_name) {
                        constructs.extend(exposed.iter().cloned());
                    }
                }
                if !globals.is_empty() {
                    // [Exposed=*] constructs show up on every global.
                    if let Some(exposed) = exposed_map.get("*") {
                        constructs.extend(exposed.iter().cloned());
                    }
                }
                interface.exposed_constructs = constructs
                    .into_iter()
                    .map(|construct| {
                        self.refs
                            .create(construct, interface.parts.debug_info.clone())
                    })
                    .collect();
                if interface.identifier().as_str() == "Window" {
                    interface.legacy_window_aliases = aliases.clone();
                }
            }
            self.ir_map.add(DefinitionIr::Interface(interface))?;
        }
        Ok(())
    }

    /// Determines how each dictionary and union flows across the bindings
    /// boundary by walking every type position of the corpus.
    fn calculate_dictionary_and_union_usages(&mut self) -> Result<(), CompileError> {
        let typedefs: FxHashMap<Identifier, TypeId> = self
            .ir_map
            .irs_of_kind(IrKind::Typedef)
            .into_iter()
            .map(|ir| {
                let DefinitionIr::Typedef(ir) = ir else {
                    unreachable!()
                };
                (ir.parts.identifier.clone(), ir.idl_type)
            })
            .collect();
        let dictionaries: IndexMap<Identifier, DictionaryIr> = self
            .ir_map
            .irs_of_kind(IrKind::Dictionary)
            .into_iter()
            .map(|ir| {
                let DefinitionIr::Dictionary(ir) = ir else {
                    unreachable!()
                };
                (ir.identifier().clone(), ir)
            })
            .collect();
        let mut collector = UsageCollector {
            types: &self.types,
            refs: &self.refs,
            typedefs: &typedefs,
            dictionaries: &dictionaries,
            dictionary_usage: FxHashMap::default(),
            union_inputs: FxHashSet::default(),
            union_outputs: FxHashSet::default(),
        };
        let both = DictionaryUsage::INPUT | DictionaryUsage::OUTPUT;

        for ir in self.ir_map.irs_of_kind(IrKind::Interface) {
            let DefinitionIr::Interface(interface) = ir else {
                unreachable!()
            };
            for function in interface
                .constructors
                .iter()
                .chain(&interface.legacy_factory_functions)
            {
                collector.visit_type(function.return_type, DictionaryUsage::OUTPUT);
                for argument in &function.arguments {
                    collector.visit_type(argument.idl_type, DictionaryUsage::INPUT);
                }
            }
            for operation in &interface.operations {
                collector.visit_type(operation.return_type, DictionaryUsage::OUTPUT);
                for argument in &operation.arguments {
                    collector.visit_type(argument.idl_type, DictionaryUsage::INPUT);
                }
            }
            for attribute in &interface.attributes {
                collector.visit_type(attribute.idl_type, both);
            }
            if let Some(iterable) = &interface.iterable {
                if let Some(key_type) = iterable.key_type {
                    collector.visit_type(key_type, both);
                }
                collector.visit_type(iterable.value_type, both);
            }
            if let Some(async_iterable) = &interface.async_iterable {
                if let Some(key_type) = async_iterable.key_type {
                    collector.visit_type(key_type, both);
                }
                collector.visit_type(async_iterable.value_type, both);
                for argument in &async_iterable.arguments {
                    collector.visit_type(argument.idl_type, DictionaryUsage::INPUT);
                }
            }
            if let Some(maplike) = &interface.maplike {
                collector.visit_type(maplike.key_type, both);
                collector.visit_type(maplike.value_type, both);
            }
            if let Some(setlike) = &interface.setlike {
                collector.visit_type(setlike.value_type, both);
            }
        }
        for ir in self.ir_map.irs_of_kind(IrKind::Namespace) {
            let DefinitionIr::Namespace(namespace) = ir else {
                unreachable!()
            };
            for operation in &namespace.operations {
                collector.visit_type(operation.return_type, DictionaryUsage::OUTPUT);
                for argument in &operation.arguments {
                    collector.visit_type(argument.idl_type, DictionaryUsage::INPUT);
                }
            }
            for attribute in &namespace.attributes {
                collector.visit_type(attribute.idl_type, both);
            }
        }
        // Callback directions invert: the platform passes arguments to
        // script and receives the return value from it.
        for ir in self.ir_map.irs_of_kind(IrKind::CallbackInterface) {
            let DefinitionIr::CallbackInterface(callback_interface) = ir else {
                unreachable!()
            };
            for operation in &callback_interface.operations {
                collector.visit_type(operation.return_type, DictionaryUsage::INPUT);
                for argument in &operation.arguments {
                    collector.visit_type(argument.idl_type, DictionaryUsage::OUTPUT);
                }
            }
        }
        for ir in self.ir_map.irs_of_kind(IrKind::CallbackFunction) {
            let DefinitionIr::CallbackFunction(callback_function) = ir else {
                unreachable!()
            };
            collector.visit_type(callback_function.return_type, DictionaryUsage::INPUT);
            for argument in &callback_function.arguments {
                collector.visit_type(argument.idl_type, DictionaryUsage::OUTPUT);
            }
        }
        // A dictionary nothing refers to is presumed to be built by Blink
        // and handed to script.
        let unreferenced: Vec<Identifier> = dictionaries
            .keys()
            .filter(|identifier| !collector.dictionary_usage.contains_key(*identifier))
            .cloned()
            .collect();
        for identifier in unreferenced {
            collector.visit_dictionary(identifier, DictionaryUsage::OUTPUT);
        }

        let UsageCollector {
            dictionary_usage,
            union_inputs,
            union_outputs,
            ..
        } = collector;
        self.union_inputs = union_inputs;
        self.union_outputs = union_outputs;

        let irs = self.ir_map.irs_of_kind(IrKind::Dictionary);
        self.ir_map.move_to_new_phase();
        for ir in irs {
            let DefinitionIr::Dictionary(mut dictionary) = ir else {
                unreachable!()
            };
            let usage = dictionary_usage
                .get(dictionary.identifier())
                .copied()
                .unwrap_or_default();
            dictionary.usage = if usage.is_empty() {
                DictionaryUsage::OUTPUT
            } else {
                usage
            };
            self.ir_map.add(DefinitionIr::Dictionary(dictionary))?;
        }
        Ok(())
    }

    /// Freezes the final IRs into the immutable public objects the
    /// database serves.
    fn create_public_objects(&mut self) {
        for ir in self.ir_map.irs_of_kind(IrKind::Interface) {
            let DefinitionIr::Interface(ir) = ir else {
                unreachable!()
            };
            self.body
                .interfaces
                .insert(ir.identifier().clone(), Interface::new(ir, &self.types));
        }
        for ir in self.ir_map.irs_of_kind(IrKind::InterfaceMixin) {
            let DefinitionIr::Interface(ir) = ir else {
                unreachable!()
            };
            self.body
                .interface_mixins
                .insert(ir.identifier().clone(), Interface::new(ir, &self.types));
        }
        for ir in self.ir_map.irs_of_kind(IrKind::Namespace) {
            let DefinitionIr::Namespace(ir) = ir else {
                unreachable!()
            };
            self.body
                .namespaces
                .insert(ir.identifier().clone(), Namespace::new(ir));
        }
        for ir in self.ir_map.irs_of_kind(IrKind::Dictionary) {
            let DefinitionIr::Dictionary(ir) = ir else {
                unreachable!()
            };
            self.body
                .dictionaries
                .insert(ir.identifier().clone(), Dictionary::new(ir));
        }
        for ir in self.ir_map.irs_of_kind(IrKind::Enumeration) {
            let DefinitionIr::Enumeration(ir) = ir else {
                unreachable!()
            };
            self.body
                .enumerations
                .insert(ir.identifier().clone(), Enumeration::new(ir));
        }
        for ir in self.ir_map.irs_of_kind(IrKind::Typedef) {
            let DefinitionIr::Typedef(ir) = ir else {
                unreachable!()
            };
            self.body
                .typedefs
                .insert(ir.identifier().clone(), Typedef::new(ir));
        }
        for ir in self.ir_map.irs_of_kind(IrKind::CallbackFunction) {
            let DefinitionIr::CallbackFunction(ir) = ir else {
                unreachable!()
            };
            self.body
                .callback_functions
                .insert(ir.identifier().clone(), CallbackFunction::new(ir));
        }
        for ir in self.ir_map.irs_of_kind(IrKind::CallbackInterface) {
            let DefinitionIr::CallbackInterface(ir) = ir else {
                unreachable!()
            };
            self.body
                .callback_interfaces
                .insert(ir.identifier().clone(), CallbackInterface::new(ir));
        }
        for ir in self.ir_map.irs_of_kind(IrKind::SyncIterator) {
            let DefinitionIr::SyncIterator(ir) = ir else {
                unreachable!()
            };
            self.body
                .sync_iterators
                .insert(ir.identifier().clone(), SyncIterator::new(ir));
        }
        for ir in self.ir_map.irs_of_kind(IrKind::AsyncIterator) {
            let DefinitionIr::AsyncIterator(ir) = ir else {
                unreachable!()
            };
            self.body
                .async_iterators
                .insert(ir.identifier().clone(), AsyncIterator::new(ir));
        }
        self.resolve_property_handlers();
    }

    /// Resolves indexed and named property handlers through the
    /// inheritance chain: each handler slot takes its nearest declaration,
    /// and the named enumerability predicate honors
    /// `[LegacyUnenumerableNamedProperties]` anywhere on the chain and
    /// `[NotEnumerable]` on the resolved getter.
    fn resolve_property_handlers(&mut self) {
        let identifiers: Vec<Identifier> = self.body.interfaces.keys().cloned().collect();
        for identifier in identifiers {
            let mut chain = Vec::new();
            let mut current = identifier.clone();
            loop {
                if chain.contains(&current) {
                    break;
                }
                chain.push(current.clone());
                let Some(interface) = self.body.interfaces.get(&current) else {
                    break;
                };
                let Some(inherited) = interface.inherited() else {
                    break;
                };
                current = self.refs.identifier(inherited).clone();
            }

            let mut merged = IndexedAndNamedProperties::default();
            let mut unenumerable = false;
            for ancestor in &chain {
                let Some(interface) = self.body.interfaces.get(ancestor) else {
                    continue;
                };
                unenumerable |= interface
                    .extended_attributes()
                    .contains("LegacyUnenumerableNamedProperties");
                let Some(own) = interface.indexed_and_named_properties() else {
                    continue;
                };
                for (slot, declared) in [
                    (&mut merged.indexed_getter, &own.indexed_getter),
                    (&mut merged.indexed_setter, &own.indexed_setter),
                    (&mut merged.named_getter, &own.named_getter),
                    (&mut merged.named_setter, &own.named_setter),
                    (&mut merged.named_deleter, &own.named_deleter),
                ] {
                    if slot.is_none() {
                        *slot = declared.clone();
                    }
                }
            }
            let getter_not_enumerable = merged.named_getter.as_ref().is_some_and(|accessor| {
                self.body
                    .interfaces
                    .get(&accessor.interface)
                    .and_then(|interface| interface.operations().get(accessor.operation))
                    .is_some_and(|operation| {
                        operation.parts.extended_attributes.contains("NotEnumerable")
                    })
            });
            merged.named_property_enumerable = !unenumerable && !getter_not_enumerable;
            if let Some(interface) = self.body.interfaces.get_mut(&identifier) {
                interface.set_indexed_and_named_properties((!merged.is_empty()).then_some(merged));
            }
        }
    }

    fn is_defined(&self, identifier: &Identifier) -> bool {
        let body = &self.body;
        body.interfaces.contains_key(identifier)
            || body.interface_mixins.contains_key(identifier)
            || body.namespaces.contains_key(identifier)
            || body.dictionaries.contains_key(identifier)
            || body.enumerations.contains_key(identifier)
            || body.typedefs.contains_key(identifier)
            || body.callback_functions.contains_key(identifier)
            || body.callback_interfaces.contains_key(identifier)
            || body.sync_iterators.contains_key(identifier)
            || body.async_iterators.contains_key(identifier)
    }

    fn report_unresolved(&mut self, identifier: &Identifier, debug_info: DebugInfo) {
        self.sink.report(Diagnostic::new(
            format!("unresolved reference to {identifier}"),
            Some(debug_info.location().clone()),
        ));
        self.body
            .stubs
            .entry(identifier.clone())
            .or_insert_with(|| StubUserDefinedType {
                identifier: identifier.clone(),
                debug_info,
            });
    }

    /// Binds every `RefId` to its definition, substituting a stub (and a
    /// diagnostic) when the identifier names nothing.
    fn resolve_references_to_definitions(&mut self) {
        let mut ids = Vec::new();
        self.refs.for_each(|id| ids.push(id));
        for id in ids {
            let identifier = self.refs.identifier(id).clone();
            if self.is_defined(&identifier) {
                self.refs.set_target(id, RefTarget::Definition(identifier));
            } else {
                let debug_info = self.refs.debug_info(id).clone();
                self.report_unresolved(&identifier, debug_info);
                self.refs.set_target(id, RefTarget::Stub(identifier));
            }
        }
    }

    fn definition_category(&self, identifier: &Identifier) -> Option<DefinitionCategory> {
        let body = &self.body;
        if body.interfaces.contains_key(identifier) || body.interface_mixins.contains_key(identifier)
        {
            Some(DefinitionCategory::Interface)
        } else if body.callback_interfaces.contains_key(identifier) {
            Some(DefinitionCategory::CallbackInterface)
        } else if body.dictionaries.contains_key(identifier) {
            Some(DefinitionCategory::Dictionary)
        } else if body.enumerations.contains_key(identifier) {
            Some(DefinitionCategory::Enumeration)
        } else if body.namespaces.contains_key(identifier) {
            Some(DefinitionCategory::Namespace)
        } else if let Some(callback_function) = body.callback_functions.get(identifier) {
            Some(DefinitionCategory::CallbackFunction {
                legacy_treat_non_object_as_null: callback_function
                    .legacy_treat_non_object_as_null(),
            })
        } else if body.sync_iterators.contains_key(identifier) {
            Some(DefinitionCategory::SyncIterator)
        } else if body.async_iterators.contains_key(identifier) {
            Some(DefinitionCategory::AsyncIterator)
        } else if body.stubs.contains_key(identifier) {
            Some(DefinitionCategory::Stub)
        } else {
            None
        }
    }

    /// Resolves every reference-kind type node. Typedefs resolve to the
    /// aliased type; anything else resolves to the named definition's
    /// category.
    fn resolve_references_to_idl_types(&mut self) {
        let mut ids = Vec::new();
        self.types.for_each_reference(|id| ids.push(id));
        for id in ids {
            let IdlTypeKind::Reference { identifier, .. } = self.types.kind(id) else {
                unreachable!()
            };
            let identifier = identifier.clone();
            let resolution = if let Some(typedef) = self.body.typedefs.get(&identifier) {
                ResolvedReference::Typedef {
                    identifier: identifier.clone(),
                    aliased: typedef.idl_type(),
                }
            } else if let Some(category) = self.definition_category(&identifier) {
                ResolvedReference::Definition {
                    identifier: identifier.clone(),
                    category,
                }
            } else {
                let debug_info = self.types.debug_info(id).cloned().unwrap_or_default();
                self.report_unresolved(&identifier, debug_info);
                ResolvedReference::Definition {
                    identifier: identifier.clone(),
                    category: DefinitionCategory::Stub,
                }
            };
            self.types.set_reference_target(id, resolution);
        }
    }

    /// Maps every type node to the components and for-testing flags of
    /// the definitions whose members mention it.
    fn collect_type_owners(&self) -> FxHashMap<TypeId, Vec<(Component, bool)>> {
        let mut owners: FxHashMap<TypeId, Vec<(Component, bool)>> = FxHashMap::default();
        let types = &self.types;
        let tag_function = |owners: &mut FxHashMap<TypeId, Vec<(Component, bool)>>,
                            arguments: &[Argument],
                            return_type: TypeId,
                            component: &Component,
                            for_testing: bool| {
            tag_composing_types(types, owners, return_type, component, for_testing);
            for argument in arguments {
                tag_composing_types(types, owners, argument.idl_type, component, for_testing);
            }
        };
        for interface in self
            .body
            .interfaces
            .values()
            .chain(self.body.interface_mixins.values())
        {
            let component = &interface.components()[0];
            let for_testing = interface.code_generator_info().for_testing();
            for attribute in interface.attributes() {
                tag_composing_types(types, &mut owners, attribute.idl_type, component, for_testing);
            }
            for constant in interface.constants() {
                tag_composing_types(types, &mut owners, constant.idl_type, component, for_testing);
            }
            for operation in interface.operations() {
                tag_function(
                    &mut owners,
                    &operation.arguments,
                    operation.return_type,
                    component,
                    for_testing,
                );
            }
            for constructor in interface
                .constructors()
                .iter()
                .chain(interface.legacy_factory_functions())
            {
                tag_function(
                    &mut owners,
                    &constructor.arguments,
                    constructor.return_type,
                    component,
                    for_testing,
                );
            }
            let mut declaration_types: Vec<TypeId> = Vec::new();
            if let Some(iterable) = interface.iterable() {
                declaration_types.extend(iterable.key_type);
                declaration_types.push(iterable.value_type);
            }
            if let Some(async_iterable) = interface.async_iterable() {
                declaration_types.extend(async_iterable.key_type);
                declaration_types.push(async_iterable.value_type);
                declaration_types.extend(
                    async_iterable
                        .arguments
                        .iter()
                        .map(|argument| argument.idl_type),
                );
            }
            if let Some(maplike) = interface.maplike() {
                declaration_types.push(maplike.key_type);
                declaration_types.push(maplike.value_type);
            }
            if let Some(setlike) = interface.setlike() {
                declaration_types.push(setlike.value_type);
            }
            for id in declaration_types {
                tag_composing_types(types, &mut owners, id, component, for_testing);
            }
        }
        for namespace in self.body.namespaces.values() {
            let component = &namespace.parts().components[0];
            let for_testing = namespace.parts().code_generator_info.for_testing();
            for attribute in namespace.attributes() {
                tag_composing_types(types, &mut owners, attribute.idl_type, component, for_testing);
            }
            for constant in namespace.constants() {
                tag_composing_types(types, &mut owners, constant.idl_type, component, for_testing);
            }
            for operation in namespace.operations() {
                tag_function(
                    &mut owners,
                    &operation.arguments,
                    operation.return_type,
                    component,
                    for_testing,
                );
            }
        }
        for dictionary in self.body.dictionaries.values() {
            let component = &dictionary.parts().components[0];
            let for_testing = dictionary.parts().code_generator_info.for_testing();
            for member in dictionary.own_members() {
                tag_composing_types(types, &mut owners, member.idl_type, component, for_testing);
            }
        }
        for typedef in self.body.typedefs.values() {
            let component = &typedef.parts().components[0];
            let for_testing = typedef.parts().code_generator_info.for_testing();
            tag_composing_types(types, &mut owners, typedef.idl_type(), component, for_testing);
        }
        for callback_function in self.body.callback_functions.values() {
            let component = &callback_function.parts().components[0];
            let for_testing = callback_function.parts().code_generator_info.for_testing();
            tag_function(
                &mut owners,
                callback_function.arguments(),
                callback_function.return_type(),
                component,
                for_testing,
            );
        }
        for callback_interface in self.body.callback_interfaces.values() {
            let component = &callback_interface.parts().components[0];
            let for_testing = callback_interface.parts().code_generator_info.for_testing();
            for operation in callback_interface.operations() {
                tag_function(
                    &mut owners,
                    &operation.arguments,
                    operation.return_type,
                    component,
                    for_testing,
                );
            }
        }
        owners
    }

    /// Groups every union type node by its flattened member-name set and
    /// registers one shared definition object per group.
    fn create_public_unions(&mut self) {
        let mut union_ids = Vec::new();
        self.types.for_each(|id| {
            if matches!(self.types.kind(id), IdlTypeKind::Union { .. }) {
                union_ids.push(id);
            }
        });

        let mut groups: IndexMap<UnionToken, Vec<TypeId>> = IndexMap::new();
        for id in union_ids {
            let (mut member_names, includes_null) = self.types.flattened_union_member_names(id);
            member_names.sort();
            member_names.dedup();
            let token = UnionToken {
                member_names,
                includes_null,
            };
            groups.entry(token).or_default().push(id);
        }

        let owners = self.collect_type_owners();
        let index_of: FxHashMap<TypeId, usize> = groups
            .values()
            .enumerate()
            .flat_map(|(index, ids)| ids.iter().map(move |&id| (id, index)))
            .collect();
        let mut unions: Vec<Union> = groups
            .iter()
            .map(|(token, ids)| Union::new(token.clone(), ids[0]))
            .collect();
        for (index, ids) in groups.values().enumerate() {
            for &id in ids {
                unions[index].add_instance(id);
                if self.union_inputs.contains(&id) {
                    unions[index].add_usage(UnionUsage::INPUT);
                }
                if self.union_outputs.contains(&id) {
                    unions[index].add_usage(UnionUsage::OUTPUT);
                }
                for (component, for_testing) in owners.get(&id).map(Vec::as_slice).unwrap_or(&[])
                {
                    unions[index].add_component(component.clone());
                    unions[index].merge_for_testing(*for_testing);
                }
            }
        }
        for typedef in self.body.typedefs.values() {
            let unwrapped = self.types.unwrap(typedef.idl_type());
            if let Some(&index) = index_of.get(&unwrapped) {
                unions[index].add_typedef_name(typedef.identifier().clone());
            }
        }
        // Unions whose member set is a strict subset of another's are
        // recorded as sub-unions of the larger one.
        for i in 0..unions.len() {
            for j in 0..unions.len() {
                if i != j && unions[i].token().contains(unions[j].token()) {
                    let sub_union = unions[j].identifier().clone();
                    unions[i].add_sub_union(sub_union);
                }
            }
        }
        for union in unions {
            for id in union.instances().to_vec() {
                self.types.set_union_definition(id, union.identifier().clone());
            }
            self.body.unions.insert(union.identifier().clone(), union);
        }
    }

    /// Groups observable array type nodes by element type and registers
    /// one shared definition object per element type.
    fn create_public_observable_arrays(&mut self) {
        let mut array_ids = Vec::new();
        self.types.for_each(|id| {
            if matches!(self.types.kind(id), IdlTypeKind::ObservableArray { .. }) {
                array_ids.push(id);
            }
        });

        let mut groups: IndexMap<String, (TypeId, Vec<TypeId>)> = IndexMap::new();
        for id in array_ids {
            let IdlTypeKind::ObservableArray { element, .. } = self.types.kind(id) else {
                unreachable!()
            };
            let element = *element;
            let element_name = self.types.type_name(element);
            groups
                .entry(element_name)
                .or_insert_with(|| (element, Vec::new()))
                .1
                .push(id);
        }

        let owners = self.collect_type_owners();
        for (element_name, (element, instances)) in groups {
            let mut array = ObservableArray::new(&element_name, element);
            for &id in &instances {
                array.add_instance(id);
                for (component, for_testing) in owners.get(&id).map(Vec::as_slice).unwrap_or(&[])
                {
                    array.add_component(component.clone());
                    array.merge_for_testing(*for_testing);
                }
            }
            for &id in &instances {
                self.types
                    .set_observable_array_definition(id, array.identifier().clone());
            }
            self.body
                .observable_arrays
                .insert(array.identifier().clone(), array);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use widl_common::Location;

    fn extended(attributes: Vec<ExtendedAttribute>) -> ExtendedAttributes {
        ExtendedAttributes::new(attributes)
    }

    fn operation(
        name: &str,
        arguments: Vec<Argument>,
        attributes: Vec<ExtendedAttribute>,
    ) -> Operation {
        let mut types = IdlTypeFactory::new();
        let return_type = types.simple_type("undefined", TypeOptions::default());
        Operation {
            parts: CompositionParts::new(
                Identifier::from(name),
                Component::new("core"),
                DebugInfo::new(Location::new("test.idl", Some(1), None)),
                extended(attributes),
            ),
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

    fn argument(index: usize, optionality: Optionality) -> Argument {
        let mut types = IdlTypeFactory::new();
        Argument {
            identifier: Identifier::from("arg"),
            idl_type: types.simple_type("long", TypeOptions::default()),
            optionality,
            default_value: None,
            index,
        }
    }

    #[test]
    fn argument_counts_stop_at_the_last_required_argument() {
        let arguments = vec![
            argument(0, Optionality::Required),
            argument(1, Optionality::Optional),
            argument(2, Optionality::Optional),
        ];
        let mut counts = argument_count_candidates(&arguments);
        counts.sort_unstable();
        assert_eq!(counts, vec![1, 2, 3]);

        let arguments = vec![argument(0, Optionality::Optional)];
        let mut counts = argument_count_candidates(&arguments);
        counts.sort_unstable();
        assert_eq!(counts, vec![0, 1]);
    }

    #[test]
    fn any_of_attributes_cover_the_whole_group() {
        let operations = vec![
            operation("measure", Vec::new(), vec![ExtendedAttribute::no_args(
                "SecureContext",
            )]),
            operation("measure", Vec::new(), Vec::new()),
        ];
        let mut groups = operation_overload_groups(&operations);
        assert_eq!(groups.len(), 1);
        propagate_group_attributes(&Identifier::from("Gauge"), &mut groups, &operations).unwrap();
        assert!(groups[0].extended_attributes.contains("SecureContext"));
    }

    #[test]
    fn disagreeing_affects_values_are_fatal() {
        let operations = vec![
            operation("load", Vec::new(), vec![ExtendedAttribute::with_value(
                "Affects",
                "Nothing",
            )]),
            operation("load", Vec::new(), Vec::new()),
        ];
        let mut groups = operation_overload_groups(&operations);
        let error = propagate_group_attributes(&Identifier::from("Loader"), &mut groups, &operations)
            .unwrap_err();
        assert!(matches!(
            error,
            CompileError::InconsistentOverloadAttribute { key: "Affects", .. }
        ));
    }

    #[test]
    fn nadc_overloads_must_not_share_argument_counts() {
        let operations = vec![
            operation(
                "fire",
                vec![argument(0, Optionality::Required)],
                vec![ExtendedAttribute::no_args("NoAllocDirectCall")],
            ),
            operation("fire", vec![argument(0, Optionality::Required)], Vec::new()),
        ];
        let mut groups = operation_overload_groups(&operations);
        let error = propagate_group_attributes(&Identifier::from("Gun"), &mut groups, &operations)
            .unwrap_err();
        assert!(matches!(
            error,
            CompileError::InconsistentOverloadAttribute {
                key: "NoAllocDirectCall",
                ..
            }
        ));
    }

    #[test]
    fn group_secure_context_is_the_intersection_of_conditions() {
        let mut a = Exposure::new();
        a.set_only_in_secure_contexts(SecureContextMode::Conditional(vec![
            Identifier::from("FeatureA"),
            Identifier::from("FeatureB"),
        ]));
        let mut b = Exposure::new();
        b.set_only_in_secure_contexts(SecureContextMode::Conditional(vec![Identifier::from(
            "FeatureB",
        )]));
        let mut group = OverloadGroupIr::new(Identifier::from("open"), false);
        aggregate_group_exposure(&mut group, &[&a, &b]);
        assert_eq!(
            group.exposure.only_in_secure_contexts(),
            &SecureContextMode::Conditional(vec![Identifier::from("FeatureB")])
        );

        // An unrestricted overload makes the whole group explicitly
        // unrestricted.
        let unrestricted = Exposure::new();
        let mut group = OverloadGroupIr::new(Identifier::from("open"), false);
        aggregate_group_exposure(&mut group, &[&a, &unrestricted]);
        assert_eq!(
            group.exposure.only_in_secure_contexts(),
            &SecureContextMode::Never
        );
    }

    #[test]
    fn exposed_extended_attributes_build_the_exposure() {
        let attributes = extended(vec![
            ExtendedAttribute::with_values(
                "Exposed",
                vec!["Window".to_string(), "Worker".to_string()],
            ),
            ExtendedAttribute::with_value("RuntimeEnabled", "CoolFeature"),
        ]);
        let mut exposure = Exposure::new();
        apply_exposure_from_extended_attributes(&attributes, &mut exposure);
        assert_eq!(exposure.global_names_and_features().len(), 2);
        assert_eq!(
            exposure.runtime_enabled_features(),
            &[Identifier::from("CoolFeature")]
        );
    }

    #[test]
    fn blink_header_prefers_implemented_as() {
        let mut parts = CompositionParts::new(
            Identifier::from("Element"),
            Component::new("core"),
            DebugInfo::new(Location::new("third_party/dom/element.idl", Some(1), None)),
            ExtendedAttributes::default(),
        );
        assert_eq!(blink_header(&parts), "third_party/dom/element.h");
        parts
            .code_generator_info
            .set_receiver_implemented_as("HTMLElementImpl");
        assert_eq!(blink_header(&parts), "third_party/dom/html_element_impl.h");
    }
}
