//! Runtime instances of compiled schema classes
//!
//! A [`SchemaObject`] is what a compiled class produces from JSON data. Each
//! property value is wrapped according to the property's sub-schema: nested
//! objects for references to other classes, [`ArrayValue`] for arrays and
//! [`LiteralValue`] for everything else. A value given in CURIE form keeps the
//! CURIE reference as its type name, which is what `is_curie` looks at.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::types::{CURIE_SUFFIX, SchemaClass, SchemaFragment, SchemaRegistry};

/// Type name given to literals whose fragment declares no type
pub const ANONYMOUS_TYPE: &str = "<anonymous>";

/// Bound on `$ref` and `oneOf` hops followed for a single value
const MAX_REFERENCE_DEPTH: usize = 64;

/// A value produced by instantiating a schema class
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    /// Object instance of a compiled class
    Object(SchemaObject),
    /// Array of wrapped items
    Array(ArrayValue),
    /// Wrapped scalar (or otherwise untyped) value
    Literal(LiteralValue),
}

impl Instance {
    /// Convert back to plain JSON
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Object(object) => object.to_json(),
            Self::Array(array) => array.to_json(),
            Self::Literal(literal) => literal.value().clone(),
        }
    }
}

/// Object instance of a compiled class
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaObject {
    class_name: String,
    properties: IndexMap<String, Instance>,
}

impl SchemaObject {
    /// Name of the class this object was built from
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Value of a property that was supplied
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.properties.get(name)
    }

    /// Whether a property was supplied, whatever its value
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Supplied properties in input order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Instance)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Convert back to plain JSON
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

/// Array of wrapped items
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayValue {
    items: Vec<Instance>,
}

impl ArrayValue {
    /// Wrapped items in order
    #[must_use]
    pub fn items(&self) -> &[Instance] {
        &self.items
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the array is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert back to plain JSON
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.items.iter().map(Instance::to_json).collect())
    }
}

/// Scalar wrapper carrying the name of the type it was built as
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralValue {
    type_name: String,
    value: Value,
}

impl LiteralValue {
    /// Wrap a value under the given type name
    #[must_use]
    pub fn new(type_name: impl Into<String>, value: Value) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }

    /// Type name: a `$ref` target, a JSON-Schema type, or [`ANONYMOUS_TYPE`]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The wrapped value
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl SchemaRegistry {
    /// Build an instance of `class_name` from JSON object data
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownClass` for a class not in the registry,
    /// `SchemaError::MissingProperty` when a required property is absent, and
    /// `SchemaError::InvalidInstance` when the data does not fit the class.
    pub fn instantiate(&self, class_name: &str, data: &Value) -> Result<SchemaObject> {
        let class = self
            .get(class_name)
            .ok_or_else(|| SchemaError::UnknownClass(class_name.to_string()))?;
        self.build_object(class, data)
    }

    fn build_object(&self, class: &SchemaClass, data: &Value) -> Result<SchemaObject> {
        let Value::Object(fields) = data else {
            return Err(SchemaError::invalid_instance(
                class.name(),
                format!("expected an object, found {}", json_kind(data)),
            ));
        };

        if let Some(missing) = class
            .required()
            .iter()
            .find(|required| !fields.contains_key(required.as_str()))
        {
            return Err(SchemaError::MissingProperty {
                class: class.name().to_string(),
                property: missing.clone(),
            });
        }

        let mut properties = IndexMap::with_capacity(fields.len());
        for (name, value) in fields {
            let wrapped = match class.prop_info(name) {
                Some(fragment) => self.wrap(class.name(), fragment, value)?,
                None if class.allows_additional_properties() => {
                    Instance::Literal(LiteralValue::new(ANONYMOUS_TYPE, value.clone()))
                }
                None => {
                    return Err(SchemaError::invalid_instance(
                        class.name(),
                        format!("unknown property '{name}'"),
                    ));
                }
            };
            properties.insert(name.clone(), wrapped);
        }

        Ok(SchemaObject {
            class_name: class.name().to_string(),
            properties,
        })
    }

    fn wrap(&self, owner: &str, fragment: &Value, value: &Value) -> Result<Instance> {
        self.wrap_at(owner, fragment, value, 0)
    }

    fn wrap_at(
        &self,
        owner: &str,
        fragment: &Value,
        value: &Value,
        depth: usize,
    ) -> Result<Instance> {
        if depth > MAX_REFERENCE_DEPTH {
            return Err(SchemaError::invalid_instance(
                owner,
                "schema references nest too deeply",
            ));
        }

        if let Some(branches) = fragment.union_branches() {
            return self.wrap_union(owner, branches, value, depth);
        }

        if let Some(reference) = fragment.reference() {
            return self.wrap_reference(owner, reference, value, depth);
        }

        if fragment.declared_type() == Some("array") {
            let Value::Array(entries) = value else {
                return Err(SchemaError::invalid_instance(
                    owner,
                    format!("expected an array, found {}", json_kind(value)),
                ));
            };
            let items = match fragment.items() {
                Some(item_fragment) => entries
                    .iter()
                    .map(|entry| self.wrap_at(owner, item_fragment, entry, depth + 1))
                    .collect::<Result<Vec<_>>>()?,
                None => entries
                    .iter()
                    .map(|entry| {
                        Instance::Literal(LiteralValue::new(ANONYMOUS_TYPE, entry.clone()))
                    })
                    .collect(),
            };
            return Ok(Instance::Array(ArrayValue { items }));
        }

        if value.is_object() && describes_object(fragment) {
            let class = SchemaClass::from_definition(ANONYMOUS_TYPE, fragment)?;
            return self.build_object(&class, value).map(Instance::Object);
        }

        let type_name = fragment.declared_type().unwrap_or(ANONYMOUS_TYPE);
        Ok(Instance::Literal(LiteralValue::new(type_name, value.clone())))
    }

    fn wrap_reference(
        &self,
        owner: &str,
        reference: &str,
        value: &Value,
        depth: usize,
    ) -> Result<Instance> {
        let fits = match self.resolve_reference(reference) {
            Some(target) => {
                if target.is_union() {
                    return self.wrap_at(owner, target.definition(), value, depth + 1);
                }
                if value.is_object() && target.is_object_type() {
                    return self.build_object(target, value).map(Instance::Object);
                }
                if value.is_array() && target.definition().declared_type() == Some("array") {
                    return self.wrap_at(owner, target.definition(), value, depth + 1);
                }
                self.accepts(target.definition(), value, depth + 1)
            }
            None => !reference.ends_with(CURIE_SUFFIX) || is_scalar(value),
        };

        // Scalars of another JSON type are kept, e.g. `_id: null`.
        if !fits && !is_scalar(value) {
            return Err(SchemaError::invalid_instance(
                owner,
                format!("{} value does not fit {reference}", json_kind(value)),
            ));
        }
        Ok(Instance::Literal(LiteralValue::new(reference, value.clone())))
    }

    /// Wrap with the first branch of a `oneOf` that accepts the value
    ///
    /// Only branches whose shape fits the value's JSON kind are tried, in
    /// order. A value no branch fits is rejected.
    fn wrap_union(
        &self,
        owner: &str,
        branches: &[Value],
        value: &Value,
        depth: usize,
    ) -> Result<Instance> {
        if branches.is_empty() {
            return Ok(Instance::Literal(LiteralValue::new(
                ANONYMOUS_TYPE,
                value.clone(),
            )));
        }

        let mut last_error = None;
        for branch in branches
            .iter()
            .filter(|branch| self.accepts(branch, value, depth + 1))
        {
            match self.wrap_at(owner, branch, value, depth + 1) {
                Ok(instance) => return Ok(instance),
                Err(err) => last_error = Some(err),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SchemaError::invalid_instance(
                owner,
                format!("{} value fits no oneOf branch", json_kind(value)),
            )
        }))
    }

    /// Whether `value` has a JSON kind `fragment` can describe
    fn accepts(&self, fragment: &Value, value: &Value, depth: usize) -> bool {
        if depth > MAX_REFERENCE_DEPTH {
            return false;
        }
        if let Some(branches) = fragment.union_branches() {
            return branches.is_empty()
                || branches
                    .iter()
                    .any(|branch| self.accepts(branch, value, depth + 1));
        }
        if let Some(reference) = fragment.reference() {
            return match self.resolve_reference(reference) {
                Some(target) => self.accepts(target.definition(), value, depth + 1),
                None if reference.ends_with(CURIE_SUFFIX) => value.is_string(),
                None => true,
            };
        }
        shape_fits(fragment, value)
    }
}

/// Kind check of `value` against a fragment's own `type` and `properties`
fn shape_fits(fragment: &Value, value: &Value) -> bool {
    match fragment.declared_type() {
        Some("object") => value.is_object(),
        Some("array") => value.is_array(),
        Some("string") => value.is_string(),
        Some("integer") => value.is_i64() || value.is_u64(),
        Some("number") => value.is_number(),
        Some("boolean") => value.is_boolean(),
        Some("null") => value.is_null(),
        Some(_) => true,
        None => !describes_object(fragment) || value.is_object(),
    }
}

fn describes_object(fragment: &Value) -> bool {
    fragment.declared_type() == Some("object") || fragment.get("properties").is_some()
}

fn is_scalar(value: &Value) -> bool {
    !(value.is_object() || value.is_array())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
