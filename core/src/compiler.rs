//! JSON-Schema document compiler
//!
//! Turns a JSON-Schema document into a [`SchemaRegistry`] with one
//! [`SchemaClass`] per named definition.

use std::borrow::Cow;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::config::LoaderConfig;
use crate::error::{Result, SchemaError};
use crate::types::{CURIE_SUFFIX, SchemaClass, SchemaRegistry};

/// Name of the shared CURIE definition in GA4GH schemas
const CURIE_DEFINITION: &str = "CURIE";

/// Keywords whose values are instance data, not sub-schemas
const DATA_KEYWORDS: [&str; 4] = ["const", "default", "enum", "examples"];

/// Keywords whose values map arbitrary names to sub-schemas
const NAMED_SCHEMA_KEYWORDS: [&str; 4] =
    ["$defs", "definitions", "patternProperties", "properties"];

/// Compiles JSON-Schema documents into class registries
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    config: LoaderConfig,
}

impl SchemaCompiler {
    /// Create a compiler with a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Config` if the configuration is invalid.
    pub fn new(config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Compile the document stored at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file is too large or unreadable, or if
    /// compiling its contents fails.
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<SchemaRegistry> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        if size > self.config.max_file_size_bytes {
            return Err(SchemaError::config(format!(
                "schema file {} is {size} bytes, limit is {}",
                path.display(),
                self.config.max_file_size_bytes
            )));
        }

        debug!(path = %path.display(), size, "loading schema document");
        let content = std::fs::read_to_string(path)?;
        self.compile_str(&content)
    }

    /// Compile the document at a filesystem path or `file://` URI
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Config` for URIs with another scheme, otherwise
    /// see [`SchemaCompiler::compile_file`].
    pub fn compile_location(&self, location: impl AsRef<Path>) -> Result<SchemaRegistry> {
        let path = local_path(location.as_ref())?;
        self.compile_file(path)
    }

    /// Compile a document given as JSON text
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON, otherwise see
    /// [`SchemaCompiler::compile_value`].
    pub fn compile_str(&self, content: &str) -> Result<SchemaRegistry> {
        let document: Value = serde_json::from_str(content)?;
        self.compile_value(&document)
    }

    /// Compile an already parsed document
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no definitions section, a
    /// definition is malformed, or a local `$ref` does not resolve.
    pub fn compile_value(&self, document: &Value) -> Result<SchemaRegistry> {
        if !document.is_object() {
            return Err(SchemaError::parse("schema document must be a JSON object"));
        }
        let (section, definitions) = self.definitions(document)?;

        if self.config.resolve_references {
            let resolver = ReferenceResolver {
                document,
                has_curie_definition: definitions.contains_key(CURIE_DEFINITION),
            };
            resolver.check(document, &mut String::new())?;
        }

        let registry = definitions
            .iter()
            .map(|(name, definition)| SchemaClass::from_definition(name.as_str(), definition))
            .collect::<Result<SchemaRegistry>>()?;

        info!(section, classes = registry.len(), "compiled schema classes");
        Ok(registry)
    }

    fn definitions<'s, 'a>(
        &'s self,
        document: &'a Value,
    ) -> Result<(&'s str, &'a Map<String, Value>)> {
        for key in &self.config.definitions_keys {
            if let Some(section) = document.get(key.as_str()) {
                return match section {
                    Value::Object(definitions) => Ok((key.as_str(), definitions)),
                    _ => Err(SchemaError::parse_at(
                        "definitions section must be an object",
                        format!("/{}", escape_pointer_token(key)),
                    )),
                };
            }
        }
        Err(SchemaError::MissingDefinitions {
            searched: self.config.definitions_keys.join(", "),
        })
    }
}

/// Checks that every local `$ref` in a document points at something
struct ReferenceResolver<'a> {
    document: &'a Value,
    has_curie_definition: bool,
}

impl ReferenceResolver<'_> {
    fn check(&self, node: &Value, location: &mut String) -> Result<()> {
        self.check_node(node, location, false)
    }

    /// `named` is set when `node` maps names to sub-schemas, so none of its
    /// keys are keywords
    fn check_node(&self, node: &Value, location: &mut String, named: bool) -> Result<()> {
        match node {
            Value::Object(map) => {
                if !named && let Some(Value::String(reference)) = map.get("$ref") {
                    self.resolve(reference, location)?;
                }
                for (key, child) in map {
                    if !named && DATA_KEYWORDS.contains(&key.as_str()) {
                        continue;
                    }
                    let child_named = !named && NAMED_SCHEMA_KEYWORDS.contains(&key.as_str());
                    let len = location.len();
                    location.push('/');
                    location.push_str(&escape_pointer_token(key));
                    self.check_node(child, location, child_named)?;
                    location.truncate(len);
                }
                Ok(())
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    let len = location.len();
                    location.push('/');
                    location.push_str(&index.to_string());
                    self.check_node(child, location, false)?;
                    location.truncate(len);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn resolve(&self, reference: &str, location: &str) -> Result<()> {
        let Some(pointer) = reference.strip_prefix('#') else {
            debug!(reference, location, "leaving non-local reference unresolved");
            return Ok(());
        };

        let resolved = pointer.is_empty()
            || (pointer.starts_with('/')
                && urlencoding::decode(pointer)
                    .is_ok_and(|decoded| self.document.pointer(&decoded).is_some()))
            || (self.has_curie_definition && reference.ends_with(CURIE_SUFFIX));

        if resolved {
            Ok(())
        } else {
            Err(SchemaError::UnresolvedReference {
                reference: reference.to_string(),
                location: if location.is_empty() {
                    "/".to_string()
                } else {
                    location.to_string()
                },
            })
        }
    }
}

/// Filesystem path named by `location`, which may be a `file://` URI
fn local_path(location: &Path) -> Result<Cow<'_, Path>> {
    let Some(text) = location.to_str().filter(|text| has_uri_scheme(text)) else {
        return Ok(Cow::Borrowed(location));
    };
    let uri = Url::parse(text)
        .map_err(|err| SchemaError::config(format!("invalid schema URI {text}: {err}")))?;
    if uri.scheme() != "file" {
        return Err(SchemaError::config(format!(
            "cannot load schema from {text}: only file URIs are supported"
        )));
    }
    uri.to_file_path()
        .map(Cow::Owned)
        .map_err(|()| SchemaError::config(format!("{text} does not name a local file")))
}

fn has_uri_scheme(text: &str) -> bool {
    text.split_once("://").is_some_and(|(scheme, _)| {
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
