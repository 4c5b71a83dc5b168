//! Introspection over compiled schema classes and their instances
//!
//! The main entry point is [`build_referable_attribute_map`], which produces a
//! map like `{"Allele": ["location"], ...}` listing, for every class, the
//! properties that may hold either an inlined object or a CURIE reference to
//! one.
//!
//! Class and instance predicates are answered through two capability traits,
//! [`SchemaType`] and [`Introspect`]. Types outside this crate can implement
//! them with the defaults, which answer "no" to every question.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::compiler::SchemaCompiler;
use crate::config::LoaderConfig;
use crate::error::Result;
use crate::instance::{ArrayValue, Instance, LiteralValue, SchemaObject};
use crate::types::{
    CURIE_SUFFIX, ReferableAttributeMap, SchemaClass, SchemaFragment, SchemaRegistry,
};

/// Property holding an object's stable identifier
pub const ID_PROPERTY: &str = "_id";

/// Capability of a type to present itself as a compiled schema class
pub trait SchemaType {
    /// The compiled class, when this is one
    fn as_schema_class(&self) -> Option<&SchemaClass> {
        None
    }
}

impl SchemaType for SchemaClass {
    fn as_schema_class(&self) -> Option<&SchemaClass> {
        Some(self)
    }
}

impl SchemaType for Value {}
impl SchemaType for str {}
impl SchemaType for String {}

/// Capability of a runtime value to answer the instance predicates
pub trait Introspect {
    /// The object instance, when this is one
    fn as_schema_object(&self) -> Option<&SchemaObject> {
        None
    }

    /// The literal wrapper, when this is one
    fn as_literal(&self) -> Option<&LiteralValue> {
        None
    }

    /// Name of the runtime type
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The value's `type` attribute, when it has one that is a string
    fn type_attribute(&self) -> Option<&str> {
        None
    }
}

impl Introspect for SchemaObject {
    fn as_schema_object(&self) -> Option<&SchemaObject> {
        Some(self)
    }

    fn type_name(&self) -> &str {
        self.class_name()
    }

    fn type_attribute(&self) -> Option<&str> {
        match self.get("type")? {
            Instance::Literal(literal) => literal.value().as_str(),
            _ => None,
        }
    }
}

impl Introspect for LiteralValue {
    fn as_literal(&self) -> Option<&LiteralValue> {
        Some(self)
    }

    fn type_name(&self) -> &str {
        LiteralValue::type_name(self)
    }
}

impl Introspect for ArrayValue {
    fn type_name(&self) -> &str {
        "array"
    }

    fn type_attribute(&self) -> Option<&str> {
        Some("array")
    }
}

impl Introspect for Instance {
    fn as_schema_object(&self) -> Option<&SchemaObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    fn as_literal(&self) -> Option<&LiteralValue> {
        match self {
            Self::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    fn type_name(&self) -> &str {
        match self {
            Self::Object(object) => Introspect::type_name(object),
            Self::Array(array) => Introspect::type_name(array),
            Self::Literal(literal) => Introspect::type_name(literal),
        }
    }

    fn type_attribute(&self) -> Option<&str> {
        match self {
            Self::Object(object) => object.type_attribute(),
            Self::Array(array) => array.type_attribute(),
            Self::Literal(literal) => literal.type_attribute(),
        }
    }
}

impl Introspect for Value {}
impl Introspect for str {}
impl Introspect for String {}
impl Introspect for bool {}
impl Introspect for i64 {}
impl Introspect for u64 {}
impl Introspect for f64 {}

/// Load a JSON-Schema document and compile one class per named definition
///
/// `path` is a filesystem path or a `file://` URI. Definition names are kept
/// exactly as written.
///
/// # Errors
///
/// Returns the compiler's error for unreadable files, malformed JSON,
/// malformed definitions and unresolved local references, and
/// `SchemaError::Config` for URIs that are not `file://`.
pub fn load_schema_classes(path: impl AsRef<Path>) -> Result<SchemaRegistry> {
    SchemaCompiler::new(LoaderConfig::default())?.compile_location(path)
}

/// Map each class to its referable attributes, omitting classes with none
#[must_use]
pub fn build_referable_attribute_map(registry: &SchemaRegistry) -> ReferableAttributeMap {
    let map: ReferableAttributeMap = registry
        .iter()
        .filter_map(|(name, class)| {
            get_referable_attributes(class)
                .filter(|attributes| !attributes.is_empty())
                .map(|attributes| (name.to_string(), attributes))
        })
        .collect();
    debug!(
        classes = registry.len(),
        referable = map.len(),
        "built referable attribute map"
    );
    map
}

/// Properties of a class that may be inlined objects or CURIE references
///
/// Returns `None` when `class` is not a compiled schema class, which is
/// distinct from `Some(vec![])` for a class without referable properties.
#[must_use]
pub fn get_referable_attributes<C: SchemaType + ?Sized>(class: &C) -> Option<Vec<String>> {
    let class = class.as_schema_class()?;
    Some(
        class
            .properties()
            .iter()
            .filter(|(_, fragment)| is_referable(fragment))
            .map(|(name, _)| name.clone())
            .collect(),
    )
}

/// Whether a property fragment allows an object or a CURIE, directly or as array items
///
/// A `oneOf` union is referable when at least one branch references a
/// `.../CURIE` target and at least one branch does not. A branch without a
/// `$ref` counts as one that does not.
#[must_use]
pub fn is_referable(fragment: &Value) -> bool {
    if let Some(branches) = fragment.union_branches() {
        let any_curie = branches.iter().any(SchemaFragment::is_curie_reference);
        let any_other = branches.iter().any(|branch| !branch.is_curie_reference());
        return any_curie && any_other;
    }

    if fragment.declared_type() == Some("array") {
        return fragment.items().is_some_and(is_referable);
    }

    false
}

/// Whether `class` is a compiled schema class
#[must_use]
pub fn is_schema_class<C: SchemaType + ?Sized>(class: &C) -> bool {
    class.as_schema_class().is_some()
}

/// Whether `value` is an object instance of a compiled class
#[must_use]
pub fn is_schema_instance<V: Introspect + ?Sized>(value: &V) -> bool {
    value.as_schema_object().is_some()
}

/// Whether the runtime type name of `value` ends with `/CURIE`
#[must_use]
pub fn is_curie<V: Introspect + ?Sized>(value: &V) -> bool {
    value.type_name().ends_with(CURIE_SUFFIX)
}

/// Whether `value` is a schema instance with an `_id` property present
///
/// Presence is what counts: an `_id` of `""`, `0`, `false` or `null` still
/// makes the object identifiable.
#[must_use]
pub fn is_identifiable<V: Introspect + ?Sized>(value: &V) -> bool {
    value
        .as_schema_object()
        .is_some_and(|object| object.contains(ID_PROPERTY))
}

/// Whether `value` is a literal wrapper
#[must_use]
pub fn is_literal<V: Introspect + ?Sized>(value: &V) -> bool {
    value.as_literal().is_some()
}

/// Whether `value` has a `type` attribute equal to `"array"`
#[must_use]
pub fn is_array<V: Introspect + ?Sized>(value: &V) -> bool {
    value.type_attribute() == Some("array")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mixed_union() -> Value {
        json!({"oneOf": [
            {"$ref": "#/definitions/Foo/CURIE"},
            {"$ref": "#/definitions/Foo"}
        ]})
    }

    #[test]
    fn test_union_of_curie_and_object_is_referable() {
        assert!(is_referable(&mixed_union()));
    }

    #[test]
    fn test_union_of_curies_is_not_referable() {
        let fragment = json!({"oneOf": [
            {"$ref": "#/definitions/Foo/CURIE"},
            {"$ref": "#/definitions/Bar/CURIE"}
        ]});
        assert!(!is_referable(&fragment));
    }

    #[test]
    fn test_union_without_curie_is_not_referable() {
        let fragment = json!({"oneOf": [
            {"$ref": "#/definitions/Foo"},
            {"$ref": "#/definitions/Bar"}
        ]});
        assert!(!is_referable(&fragment));
    }

    #[test]
    fn test_branch_without_ref_counts_as_non_curie() {
        let fragment = json!({"oneOf": [
            {"$ref": "#/definitions/CURIE"},
            {"type": "string"}
        ]});
        assert!(is_referable(&fragment));
    }

    #[test]
    fn test_fragment_type_is_not_an_instance_type_attribute() {
        let fragment = json!({"type": "array", "items": mixed_union()});
        assert_eq!(fragment.declared_type(), Some("array"));
        assert_eq!(Introspect::type_attribute(&fragment), None);
        assert!(is_referable(&fragment));
        assert!(!is_array(&fragment));
    }

    #[test]
    fn test_union_shapes_that_are_never_referable() {
        assert!(!is_referable(&json!({"oneOf": []})));
        assert!(!is_referable(&json!({"oneOf": "#/definitions/CURIE"})));
        assert!(!is_referable(&json!({"oneOf": [{"$ref": "#/definitions/CURIE"}]})));
    }

    #[test]
    fn test_union_takes_precedence_over_type() {
        let fragment = json!({
            "type": "array",
            "items": mixed_union(),
            "oneOf": [{"$ref": "#/definitions/Foo"}]
        });
        assert!(!is_referable(&fragment));
    }

    #[test]
    fn test_arrays_follow_their_items() {
        assert!(is_referable(&json!({"type": "array", "items": mixed_union()})));
        assert!(!is_referable(
            &json!({"type": "array", "items": {"$ref": "#/definitions/Foo"}})
        ));
        assert!(is_referable(&json!({
            "type": "array",
            "items": {"type": "array", "items": mixed_union()}
        })));
        assert!(!is_referable(&json!({"type": "array"})));
    }

    #[test]
    fn test_other_fragments_are_not_referable() {
        assert!(!is_referable(&json!({"type": "string"})));
        assert!(!is_referable(&json!({"$ref": "#/definitions/CURIE"})));
        assert!(!is_referable(&json!({"type": ["array", "null"], "items": mixed_union()})));
        assert!(!is_referable(&json!(null)));
        assert!(!is_referable(&json!([mixed_union()])));
    }

    #[test]
    fn test_referable_attributes_follow_declaration_order() -> Result<()> {
        let class = SchemaClass::from_definition(
            "Haplotype",
            &json!({"properties": {
                "members": {"type": "array", "items": mixed_union()},
                "type": {"type": "string"},
                "location": mixed_union()
            }}),
        )?;
        assert_eq!(
            get_referable_attributes(&class),
            Some(vec!["members".to_string(), "location".to_string()])
        );
        Ok(())
    }

    #[test]
    fn test_non_schema_class_is_not_applicable() -> Result<()> {
        assert_eq!(get_referable_attributes(&json!({"properties": {}})), None);
        assert_eq!(get_referable_attributes("Allele"), None);

        let empty = SchemaClass::from_definition("Text", &json!({"type": "object"}))?;
        assert_eq!(get_referable_attributes(&empty), Some(vec![]));
        Ok(())
    }

    #[test]
    fn test_map_omits_classes_without_referable_attributes() -> Result<()> {
        let registry: SchemaRegistry = vec![
            SchemaClass::from_definition("Allele", &json!({"properties": {"location": mixed_union()}}))?,
            SchemaClass::from_definition("Text", &json!({"properties": {"definition": {"type": "string"}}}))?,
            SchemaClass::from_definition("CURIE", &json!({"type": "string"}))?,
        ]
        .into_iter()
        .collect();

        let map = build_referable_attribute_map(&registry);
        let expected: ReferableAttributeMap =
            [("Allele".to_string(), vec!["location".to_string()])].into_iter().collect();
        assert_eq!(map, expected);
        assert_eq!(build_referable_attribute_map(&registry), map);
        Ok(())
    }

    #[test]
    fn test_class_predicate() -> Result<()> {
        let class = SchemaClass::from_definition("Allele", &json!({}))?;
        assert!(is_schema_class(&class));
        assert!(!is_schema_class(&json!({})));
        assert!(!is_schema_class("Allele"));
        Ok(())
    }

    #[test]
    fn test_predicates_on_plain_values() {
        let plain = json!({"_id": "ga4gh:VA.1", "type": "array"});
        assert!(!is_schema_instance(&plain));
        assert!(!is_identifiable(&plain));
        assert!(!is_literal(&plain));
        assert!(!is_array(&plain));
        assert!(!is_curie(&plain));

        assert!(!is_curie("ga4gh:SQ.abc/CURIE"));
        assert!(!is_identifiable(&0_i64));
        assert!(!is_array(&true));
    }

    #[test]
    fn test_curie_predicate_is_suffix_exact() {
        assert!(is_curie(&LiteralValue::new("#/definitions/CURIE", json!("ga4gh:SQ.1"))));
        assert!(!is_curie(&LiteralValue::new("#/definitions/curie", json!("ga4gh:SQ.1"))));
        assert!(!is_curie(&LiteralValue::new("#/definitions/CURIE/x", json!("ga4gh:SQ.1"))));
        assert!(!is_curie(&LiteralValue::new("CURIE", json!("ga4gh:SQ.1"))));
    }

    #[test]
    fn test_literal_and_array_predicates() {
        let literal = LiteralValue::new("string", json!("x"));
        assert!(is_literal(&literal));
        assert!(!is_array(&literal));
        assert!(!is_schema_instance(&literal));

        let array = ArrayValue::default();
        assert!(is_array(&array));
        assert!(!is_literal(&array));
        assert!(is_array(&Instance::Array(array)));
        assert!(is_literal(&Instance::Literal(literal)));
    }
}
