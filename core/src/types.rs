//! Type definitions for compiled schema classes

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Result, SchemaError};

/// Suffix marking a `$ref` or type name as the CURIE alternative of a type
pub const CURIE_SUFFIX: &str = "/CURIE";

/// A raw JSON-Schema fragment constraining one property
pub type PropertySchema = Value;

/// Class name to referable property names, in registry order
pub type ReferableAttributeMap = IndexMap<String, Vec<String>>;

/// Try-get accessors over a JSON-Schema fragment
///
/// Every accessor answers `None` when the fragment does not have the shape
/// asked about, including when the fragment is not a JSON object at all.
pub trait SchemaFragment {
    /// Branches of a `oneOf` union
    ///
    /// `Some(&[])` when `oneOf` is present but is not an array.
    fn union_branches(&self) -> Option<&[Value]>;

    /// Target of a `$ref`
    fn reference(&self) -> Option<&str>;

    /// Value of `type` when it is a single string
    fn declared_type(&self) -> Option<&str>;

    /// The `items` sub-schema of an array fragment
    fn items(&self) -> Option<&Value>;

    /// Whether the fragment is a `$ref` to a CURIE alternative
    fn is_curie_reference(&self) -> bool {
        self.reference()
            .is_some_and(|reference| reference.ends_with(CURIE_SUFFIX))
    }
}

impl SchemaFragment for Value {
    fn union_branches(&self) -> Option<&[Value]> {
        match self.get("oneOf")? {
            Value::Array(branches) => Some(branches.as_slice()),
            _ => Some(&[]),
        }
    }

    fn reference(&self) -> Option<&str> {
        self.get("$ref").and_then(Value::as_str)
    }

    fn declared_type(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }

    fn items(&self) -> Option<&Value> {
        self.get("items")
    }
}

/// A class compiled from one named schema definition
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaClass {
    name: String,
    properties: IndexMap<String, PropertySchema>,
    required: Vec<String>,
    additional_properties: bool,
    definition: Value,
}

impl SchemaClass {
    /// Compile a class from a definition body
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidDefinition` if the definition is not an
    /// object, or its `properties` / `required` sections are malformed.
    pub fn from_definition(name: impl Into<String>, definition: &Value) -> Result<Self> {
        let name = name.into();
        let Value::Object(body) = definition else {
            return Err(SchemaError::invalid_definition(
                name,
                "definition must be a JSON object",
            ));
        };

        let properties = match body.get("properties") {
            None => IndexMap::new(),
            Some(Value::Object(props)) => props
                .iter()
                .map(|(prop, fragment)| (prop.clone(), fragment.clone()))
                .collect(),
            Some(_) => {
                return Err(SchemaError::invalid_definition(
                    name,
                    "'properties' must be an object",
                ));
            }
        };

        let required = match body.get("required") {
            None => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| {
                    entry.as_str().map(str::to_string).ok_or_else(|| {
                        SchemaError::invalid_definition(
                            name.clone(),
                            "'required' entries must be strings",
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(SchemaError::invalid_definition(
                    name,
                    "'required' must be an array",
                ));
            }
        };

        let additional_properties = !matches!(
            body.get("additionalProperties"),
            Some(Value::Bool(false))
        );

        Ok(Self {
            name,
            properties,
            required,
            additional_properties,
            definition: definition.clone(),
        })
    }

    /// Definition name, exactly as written in the document
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared property names in declaration order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Declared properties with their fragments
    #[must_use]
    pub fn properties(&self) -> &IndexMap<String, PropertySchema> {
        &self.properties
    }

    /// Sub-schema of one declared property
    #[must_use]
    pub fn prop_info(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    /// Names listed in `required`
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// False only when the definition sets `additionalProperties: false`
    #[must_use]
    pub fn allows_additional_properties(&self) -> bool {
        self.additional_properties
    }

    /// Whether instances of this class are JSON objects
    #[must_use]
    pub fn is_object_type(&self) -> bool {
        self.definition.declared_type() == Some("object") || !self.properties.is_empty()
    }

    /// Whether the definition is itself a `oneOf` union of other definitions
    #[must_use]
    pub fn is_union(&self) -> bool {
        self.definition.union_branches().is_some()
    }

    /// The raw definition body
    #[must_use]
    pub fn definition(&self) -> &Value {
        &self.definition
    }
}

/// Ordered registry of compiled classes keyed by definition name
///
/// Built once by the compiler and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    classes: IndexMap<String, SchemaClass>,
}

impl SchemaRegistry {
    /// Look up a class by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaClass> {
        self.classes.get(name)
    }

    /// Whether a class with this name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Class names in registry order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Iterate `(name, class)` pairs in registry order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaClass)> {
        self.classes.iter().map(|(name, class)| (name.as_str(), class))
    }

    /// Number of classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the registry holds no classes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class targeted by a local definition reference such as `#/definitions/Allele`
    ///
    /// Only the last path segment is matched against class names, so
    /// `#/$defs/Allele` resolves the same way. The segment is percent-decoded
    /// and unescaped as a JSON pointer token first.
    #[must_use]
    pub fn resolve_reference(&self, reference: &str) -> Option<&SchemaClass> {
        let pointer = reference.strip_prefix('#')?;
        let (section, token) = pointer.rsplit_once('/')?;
        if section.is_empty() {
            return None;
        }
        let token = urlencoding::decode(token).ok()?;
        self.get(&token.replace("~1", "/").replace("~0", "~"))
    }
}

impl FromIterator<SchemaClass> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = SchemaClass>>(iter: I) -> Self {
        Self {
            classes: iter
                .into_iter()
                .map(|class| (class.name.clone(), class))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SchemaRegistry {
    type Item = (&'a String, &'a SchemaClass);
    type IntoIter = indexmap::map::Iter<'a, String, SchemaClass>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.iter()
    }
}
