//! # Constraint Tree
//!
//! A schema document is compiled once into a tree of [`SchemaNode`]s. Each
//! node is a flat list of [`Constraint`]s; subschemas (`items`, `properties`,
//! `allOf`, `if`/`then`, ...) nest further nodes. The tree is interpreted by
//! the evaluator in [`crate::structural`].
//!
//! Only the draft-07 keywords the note schema needs are understood.
//! Annotation keywords are skipped; any other keyword fails compilation so
//! that a typo in the schema file cannot silently disable a check.

use std::fmt;

use regex::Regex;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Keywords that carry no validation semantics.
const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "default",
    "examples",
    "definitions",
];

/// The schema document could not be compiled.
#[derive(Error, Debug)]
#[error("at {pointer}: {reason}")]
pub struct CompileError {
    /// JSON Pointer into the schema document.
    pub pointer: String,
    /// What is wrong at that location.
    pub reason: String,
}

impl CompileError {
    fn new(pointer: &str, reason: impl Into<String>) -> Self {
        Self {
            pointer: if pointer.is_empty() { "/".to_string() } else { pointer.to_string() },
            reason: reason.into(),
        }
    }
}

/// JSON value kinds named by the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "null" => Self::Null,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "string" => Self::String,
            "array" => Self::Array,
            "object" => Self::Object,
            _ => return None,
        })
    }

    /// Keyword spelling of this type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether `value` is an instance of this type.
    ///
    /// `integer` accepts any number without a fractional part, so `1.0`
    /// is an integer. Booleans are never numbers.
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Null, Value::Null)
            | (Self::Boolean, Value::Bool(_))
            | (Self::Number, Value::Number(_))
            | (Self::String, Value::String(_))
            | (Self::Array, Value::Array(_))
            | (Self::Object, Value::Object(_)) => true,
            (Self::Integer, Value::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happens to object members not named in `properties`.
#[derive(Debug)]
pub enum Additional {
    /// `additionalProperties: false`.
    Forbidden,
    /// `additionalProperties: <schema>`.
    Schema(Box<SchemaNode>),
}

/// A single compiled keyword.
#[derive(Debug)]
pub enum Constraint {
    /// The `false` schema: nothing is valid.
    Never,
    Type(Vec<JsonType>),
    Enum(Vec<Value>),
    Const(Value),
    Pattern { source: String, regex: Regex },
    MinLength(u64),
    MaxLength(u64),
    Minimum(Number),
    Maximum(Number),
    MinItems(u64),
    MaxItems(u64),
    UniqueItems,
    Items(Box<SchemaNode>),
    Required(Vec<String>),
    Properties(Vec<(String, SchemaNode)>),
    AdditionalProperties {
        /// Member names covered by the sibling `properties` keyword.
        declared: Vec<String>,
        rule: Additional,
    },
    AllOf(Vec<SchemaNode>),
    AnyOf(Vec<SchemaNode>),
    OneOf(Vec<SchemaNode>),
    Not(Box<SchemaNode>),
    /// `if` / `then` / `else`. Without `if`, `then` and `else` are ignored.
    Conditional {
        condition: Box<SchemaNode>,
        then: Option<Box<SchemaNode>>,
        otherwise: Option<Box<SchemaNode>>,
    },
}

/// A compiled (sub)schema.
#[derive(Debug, Default)]
pub struct SchemaNode {
    pub(crate) constraints: Vec<Constraint>,
}

impl SchemaNode {
    /// Compile a schema document.
    pub fn compile(schema: &Value) -> Result<Self, CompileError> {
        compile_at(schema, "")
    }

    /// The compiled constraints of this node, in keyword order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}

fn compile_at(schema: &Value, pointer: &str) -> Result<SchemaNode, CompileError> {
    match schema {
        Value::Bool(true) => Ok(SchemaNode::default()),
        Value::Bool(false) => Ok(SchemaNode {
            constraints: vec![Constraint::Never],
        }),
        Value::Object(obj) => compile_object(obj, pointer),
        other => Err(CompileError::new(
            pointer,
            format!("a schema must be an object or a boolean, found {other}"),
        )),
    }
}

fn compile_object(obj: &Map<String, Value>, pointer: &str) -> Result<SchemaNode, CompileError> {
    let mut constraints = Vec::new();
    let at = |keyword: &str| format!("{pointer}/{keyword}");

    for (keyword, arg) in obj {
        let here = at(keyword);
        let constraint = match keyword.as_str() {
            "type" => Constraint::Type(compile_types(arg, &here)?),
            "enum" => match arg {
                Value::Array(values) => Constraint::Enum(values.clone()),
                _ => return Err(CompileError::new(&here, "'enum' must be an array")),
            },
            "const" => Constraint::Const(arg.clone()),
            "pattern" => {
                let source = arg
                    .as_str()
                    .ok_or_else(|| CompileError::new(&here, "'pattern' must be a string"))?;
                let regex = Regex::new(source).map_err(|e| {
                    CompileError::new(&here, format!("invalid regular expression: {e}"))
                })?;
                Constraint::Pattern {
                    source: source.to_string(),
                    regex,
                }
            }
            "minLength" => Constraint::MinLength(count(arg, &here)?),
            "maxLength" => Constraint::MaxLength(count(arg, &here)?),
            "minItems" => Constraint::MinItems(count(arg, &here)?),
            "maxItems" => Constraint::MaxItems(count(arg, &here)?),
            "minimum" => Constraint::Minimum(number(arg, &here)?),
            "maximum" => Constraint::Maximum(number(arg, &here)?),
            "uniqueItems" => match arg {
                Value::Bool(true) => Constraint::UniqueItems,
                Value::Bool(false) => continue,
                _ => return Err(CompileError::new(&here, "'uniqueItems' must be a boolean")),
            },
            "items" => Constraint::Items(Box::new(compile_at(arg, &here)?)),
            "required" => Constraint::Required(string_list(arg, &here)?),
            "properties" => {
                let props = arg
                    .as_object()
                    .ok_or_else(|| CompileError::new(&here, "'properties' must be an object"))?;
                let mut compiled = Vec::with_capacity(props.len());
                for (name, sub) in props {
                    compiled.push((name.clone(), compile_at(sub, &format!("{here}/{name}"))?));
                }
                Constraint::Properties(compiled)
            }
            "additionalProperties" => {
                let rule = match arg {
                    Value::Bool(true) => continue,
                    Value::Bool(false) => Additional::Forbidden,
                    other => Additional::Schema(Box::new(compile_at(other, &here)?)),
                };
                let declared = obj
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| props.keys().cloned().collect())
                    .unwrap_or_default();
                Constraint::AdditionalProperties { declared, rule }
            }
            "allOf" => Constraint::AllOf(subschemas(arg, &here)?),
            "anyOf" => Constraint::AnyOf(subschemas(arg, &here)?),
            "oneOf" => Constraint::OneOf(subschemas(arg, &here)?),
            "not" => Constraint::Not(Box::new(compile_at(arg, &here)?)),
            "if" => {
                let branch = |name: &str| -> Result<Option<Box<SchemaNode>>, CompileError> {
                    obj.get(name)
                        .map(|s| compile_at(s, &at(name)).map(Box::new))
                        .transpose()
                };
                Constraint::Conditional {
                    condition: Box::new(compile_at(arg, &here)?),
                    then: branch("then")?,
                    otherwise: branch("else")?,
                }
            }
            "then" | "else" => continue,
            k if ANNOTATION_KEYWORDS.contains(&k) => continue,
            other => {
                return Err(CompileError::new(
                    &here,
                    format!("unsupported keyword '{other}'"),
                ))
            }
        };
        constraints.push(constraint);
    }

    Ok(SchemaNode { constraints })
}

fn compile_types(arg: &Value, pointer: &str) -> Result<Vec<JsonType>, CompileError> {
    let lookup = |name: &str| {
        JsonType::from_name(name)
            .ok_or_else(|| CompileError::new(pointer, format!("unknown type '{name}'")))
    };
    match arg {
        Value::String(name) => Ok(vec![lookup(name.as_str())?]),
        Value::Array(names) => names
            .iter()
            .map(|n| {
                n.as_str()
                    .ok_or_else(|| CompileError::new(pointer, "type names must be strings"))
                    .and_then(lookup)
            })
            .collect(),
        _ => Err(CompileError::new(pointer, "'type' must be a string or an array")),
    }
}

fn count(arg: &Value, pointer: &str) -> Result<u64, CompileError> {
    arg.as_u64()
        .ok_or_else(|| CompileError::new(pointer, "expected a non-negative integer"))
}

fn number(arg: &Value, pointer: &str) -> Result<Number, CompileError> {
    match arg {
        Value::Number(n) => Ok(n.clone()),
        _ => Err(CompileError::new(pointer, "expected a number")),
    }
}

fn string_list(arg: &Value, pointer: &str) -> Result<Vec<String>, CompileError> {
    arg.as_array()
        .ok_or_else(|| CompileError::new(pointer, "expected an array of strings"))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| CompileError::new(pointer, "expected an array of strings"))
        })
        .collect()
}

fn subschemas(arg: &Value, pointer: &str) -> Result<Vec<SchemaNode>, CompileError> {
    let list = arg
        .as_array()
        .ok_or_else(|| CompileError::new(pointer, "expected an array of schemas"))?;
    list.iter()
        .enumerate()
        .map(|(i, s)| compile_at(s, &format!("{pointer}/{i}")))
        .collect()
}
