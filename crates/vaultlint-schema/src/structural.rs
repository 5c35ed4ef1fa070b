//! # Structural Validation
//!
//! Recursive interpreter for the constraint tree built by [`crate::node`].
//! Evaluation never short-circuits: every violation in the instance is
//! collected in one pass.
//!
//! Each [`Violation`] carries the path to the offending value. Paths render
//! dotted (`tags.0`) or as `(root)` for violations of the record itself.

use std::fmt;

use serde_json::{Map, Value};

use crate::node::{Additional, Constraint, JsonType, SchemaNode};

/// One step into an instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathSegment {
    /// Object member name.
    Key(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Location of a value inside a metadata record.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The record itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// True for the record itself.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path segments from the root.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// A single structural violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Where in the record the violation was found.
    pub path: FieldPath,
    /// Human-readable description naming the offending value.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A borrowed value under evaluation.
///
/// A record is evaluated as an object without first being wrapped in a
/// [`Value`], so the root variant borrows the member map directly.
#[derive(Debug, Clone, Copy)]
enum Instance<'a> {
    Value(&'a Value),
    Object(&'a Map<String, Value>),
}

impl<'a> Instance<'a> {
    fn as_value(self) -> Option<&'a Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Object(_) => None,
        }
    }

    fn as_object(self) -> Option<&'a Map<String, Value>> {
        match self {
            Self::Value(v) => v.as_object(),
            Self::Object(obj) => Some(obj),
        }
    }

    fn as_str(self) -> Option<&'a str> {
        self.as_value().and_then(Value::as_str)
    }

    fn as_array(self) -> Option<&'a Vec<Value>> {
        self.as_value().and_then(Value::as_array)
    }

    fn as_f64(self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    fn is_type(self, ty: JsonType) -> bool {
        match self {
            Self::Value(v) => ty.matches(v),
            Self::Object(_) => ty == JsonType::Object,
        }
    }

    fn equals(self, other: &Value) -> bool {
        match (self, other) {
            (Self::Value(v), _) => json_eq(v, other),
            (Self::Object(a), Value::Object(b)) => map_eq(a, b),
            (Self::Object(_), _) => false,
        }
    }
}

impl fmt::Display for Instance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Object(obj) => {
                let rendered = serde_json::to_string(obj).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

impl SchemaNode {
    /// Evaluate `instance`, appending every violation to `out`.
    pub fn evaluate(&self, instance: &Value, path: &mut FieldPath, out: &mut Vec<Violation>) {
        self.evaluate_instance(Instance::Value(instance), path, out);
    }

    /// Whether `instance` satisfies this node.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.accepts(Instance::Value(instance))
    }

    /// Evaluate a whole value and return its violations ordered by path.
    ///
    /// The sort is stable, so violations at the same path keep the order
    /// in which the constraints produced them.
    pub fn violations(&self, instance: &Value) -> Vec<Violation> {
        self.sorted_violations(Instance::Value(instance))
    }

    /// [`SchemaNode::violations`] for a record, evaluated as an object in
    /// place.
    pub fn record_violations(&self, record: &Map<String, Value>) -> Vec<Violation> {
        self.sorted_violations(Instance::Object(record))
    }

    fn sorted_violations(&self, instance: Instance<'_>) -> Vec<Violation> {
        let mut out = Vec::new();
        self.evaluate_instance(instance, &mut FieldPath::root(), &mut out);
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }

    fn evaluate_instance(
        &self,
        instance: Instance<'_>,
        path: &mut FieldPath,
        out: &mut Vec<Violation>,
    ) {
        for constraint in &self.constraints {
            evaluate_constraint(constraint, instance, path, out);
        }
    }

    fn accepts(&self, instance: Instance<'_>) -> bool {
        let mut scratch = Vec::new();
        self.evaluate_instance(instance, &mut FieldPath::root(), &mut scratch);
        scratch.is_empty()
    }
}

fn evaluate_constraint(
    constraint: &Constraint,
    instance: Instance<'_>,
    path: &mut FieldPath,
    out: &mut Vec<Violation>,
) {
    match constraint {
        Constraint::Never => push(out, path, format!("False schema does not allow {instance}")),
        Constraint::Type(types) => {
            if !types.iter().any(|t| instance.is_type(*t)) {
                push(out, path, type_message(instance, types));
            }
        }
        Constraint::Enum(options) => {
            if !options.iter().any(|o| instance.equals(o)) {
                push(
                    out,
                    path,
                    format!("{instance} is not one of {}", Value::Array(options.clone())),
                );
            }
        }
        Constraint::Const(expected) => {
            if !instance.equals(expected) {
                push(out, path, format!("{expected} was expected"));
            }
        }
        Constraint::Pattern { source, regex } => {
            if let Some(s) = instance.as_str() {
                if !regex.is_match(s) {
                    push(
                        out,
                        path,
                        format!("{instance} does not match {}", Value::String(source.clone())),
                    );
                }
            }
        }
        Constraint::MinLength(limit) => {
            if let Some(s) = instance.as_str() {
                if (s.chars().count() as u64) < *limit {
                    push(
                        out,
                        path,
                        format!("{instance} is shorter than {limit} character{}", plural(*limit)),
                    );
                }
            }
        }
        Constraint::MaxLength(limit) => {
            if let Some(s) = instance.as_str() {
                if (s.chars().count() as u64) > *limit {
                    push(
                        out,
                        path,
                        format!("{instance} is longer than {limit} character{}", plural(*limit)),
                    );
                }
            }
        }
        Constraint::Minimum(limit) => {
            if let (Some(v), Some(l)) = (instance.as_f64(), limit.as_f64()) {
                if v < l {
                    push(out, path, format!("{instance} is less than the minimum of {limit}"));
                }
            }
        }
        Constraint::Maximum(limit) => {
            if let (Some(v), Some(l)) = (instance.as_f64(), limit.as_f64()) {
                if v > l {
                    push(out, path, format!("{instance} is greater than the maximum of {limit}"));
                }
            }
        }
        Constraint::MinItems(limit) => {
            if let Some(items) = instance.as_array() {
                if (items.len() as u64) < *limit {
                    push(
                        out,
                        path,
                        format!("{instance} has less than {limit} item{}", plural(*limit)),
                    );
                }
            }
        }
        Constraint::MaxItems(limit) => {
            if let Some(items) = instance.as_array() {
                if (items.len() as u64) > *limit {
                    push(
                        out,
                        path,
                        format!("{instance} has more than {limit} item{}", plural(*limit)),
                    );
                }
            }
        }
        Constraint::UniqueItems => {
            if let Some(items) = instance.as_array() {
                let duplicated = items
                    .iter()
                    .enumerate()
                    .any(|(i, a)| items[i + 1..].iter().any(|b| json_eq(a, b)));
                if duplicated {
                    push(out, path, format!("{instance} has non-unique elements"));
                }
            }
        }
        Constraint::Required(names) => {
            if let Some(obj) = instance.as_object() {
                for name in names.iter().filter(|n| !obj.contains_key(n.as_str())) {
                    push(
                        out,
                        path,
                        format!("{} is a required property", Value::String(name.clone())),
                    );
                }
            }
        }
        Constraint::AdditionalProperties { declared, rule } => {
            if let Some(obj) = instance.as_object() {
                let mut extras: Vec<&String> = obj
                    .keys()
                    .filter(|k| !declared.iter().any(|d| d == *k))
                    .collect();
                extras.sort();
                match rule {
                    Additional::Forbidden if !extras.is_empty() => {
                        let listed = extras
                            .iter()
                            .map(|k| format!("'{k}'"))
                            .collect::<Vec<_>>()
                            .join(", ");
                        let verb = if extras.len() == 1 { "was" } else { "were" };
                        push(
                            out,
                            path,
                            format!(
                                "Additional properties are not allowed ({listed} {verb} unexpected)"
                            ),
                        );
                    }
                    Additional::Forbidden => {}
                    Additional::Schema(node) => {
                        for key in extras {
                            path.push(PathSegment::Key(key.clone()));
                            node.evaluate(&obj[key.as_str()], path, out);
                            path.pop();
                        }
                    }
                }
            }
        }
        Constraint::Items(node) => {
            if let Some(items) = instance.as_array() {
                for (i, item) in items.iter().enumerate() {
                    path.push(PathSegment::Index(i));
                    node.evaluate(item, path, out);
                    path.pop();
                }
            }
        }
        Constraint::Properties(props) => {
            if let Some(obj) = instance.as_object() {
                for (name, node) in props {
                    if let Some(member) = obj.get(name) {
                        path.push(PathSegment::Key(name.clone()));
                        node.evaluate(member, path, out);
                        path.pop();
                    }
                }
            }
        }
        Constraint::AllOf(nodes) => {
            for node in nodes {
                node.evaluate_instance(instance, path, out);
            }
        }
        Constraint::AnyOf(nodes) => {
            if !nodes.iter().any(|n| n.accepts(instance)) {
                let message = "is not valid under any of the schemas listed in the 'anyOf' keyword";
                push(out, path, format!("{instance} {message}"));
            }
        }
        Constraint::OneOf(nodes) => {
            let message = match nodes.iter().filter(|n| n.accepts(instance)).count() {
                1 => return,
                0 => "is not valid under any of the schemas listed in the 'oneOf' keyword",
                _ => "is valid under more than one of the schemas listed in the 'oneOf' keyword",
            };
            push(out, path, format!("{instance} {message}"));
        }
        Constraint::Not(node) => {
            if node.accepts(instance) {
                push(
                    out,
                    path,
                    format!("{instance} is valid under the schema listed in the 'not' keyword"),
                );
            }
        }
        Constraint::Conditional {
            condition,
            then,
            otherwise,
        } => {
            let branch = if condition.accepts(instance) { then } else { otherwise };
            if let Some(node) = branch {
                node.evaluate_instance(instance, path, out);
            }
        }
    }
}

fn push(out: &mut Vec<Violation>, path: &FieldPath, message: String) {
    out.push(Violation {
        path: path.clone(),
        message,
    });
}

fn type_message(instance: Instance<'_>, types: &[JsonType]) -> String {
    match types {
        [single] => format!("{instance} is not of type \"{single}\""),
        many => {
            let names = many
                .iter()
                .map(|t| format!("\"{t}\""))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{instance} is not of types {names}")
        }
    }
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// JSON equality where numbers compare by value (`1` equals `1.0`).
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_eq(a, b))
        }
        (Value::Object(x), Value::Object(y)) => map_eq(x, y),
        _ => a == b,
    }
}

fn map_eq(x: &Map<String, Value>, y: &Map<String, Value>) -> bool {
    x.len() == y.len() && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| json_eq(v, w)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violations(schema: Value, instance: Value) -> Vec<String> {
        SchemaNode::compile(&schema)
            .unwrap()
            .violations(&instance)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn required_reports_at_root() {
        let errs = violations(json!({"required": ["type"]}), json!({}));
        assert_eq!(errs, vec!["(root): \"type\" is a required property"]);
    }

    #[test]
    fn enum_names_offending_value() {
        let errs = violations(
            json!({"properties": {"status": {"enum": ["draft", "stale"]}}}),
            json!({"status": "invalid-status"}),
        );
        assert_eq!(
            errs,
            vec!["status: \"invalid-status\" is not one of [\"draft\",\"stale\"]"]
        );
    }

    #[test]
    fn array_item_paths_are_dotted() {
        let errs = violations(
            json!({"properties": {"tags": {"items": {"enum": ["plan"]}}}}),
            json!({"tags": ["plan", "bogus"]}),
        );
        assert_eq!(errs.len(), 1);
        assert!(errs[0].starts_with("tags.1: \"bogus\""));
    }

    #[test]
    fn pattern_is_a_search() {
        let node = SchemaNode::compile(&json!({"pattern": "b+"})).unwrap();
        assert!(node.is_valid(&json!("abbbc")));
        assert!(!node.is_valid(&json!("ac")));
        // Non-strings are not subject to pattern.
        assert!(node.is_valid(&json!(5)));
    }

    #[test]
    fn additional_properties_lists_every_extra() {
        let errs = violations(
            json!({"properties": {"a": {}}, "additionalProperties": false}),
            json!({"a": 1, "x": 2, "y": 3}),
        );
        assert_eq!(
            errs,
            vec!["(root): Additional properties are not allowed ('x', 'y' were unexpected)"]
        );
    }

    #[test]
    fn additional_properties_are_listed_by_name() {
        let errs = violations(
            json!({"properties": {"a": {}}, "additionalProperties": false}),
            json!({"a": 1, "zeta": 1, "alpha": 2}),
        );
        assert_eq!(
            errs,
            vec!["(root): Additional properties are not allowed ('alpha', 'zeta' were unexpected)"]
        );
    }

    #[test]
    fn record_is_evaluated_in_place() {
        let node = SchemaNode::compile(&json!({
            "type": "object",
            "required": ["type"],
            "properties": {"status": {"enum": ["draft"]}},
            "additionalProperties": false,
            "not": {"const": {"status": "draft"}}
        }))
        .unwrap();
        let record = json!({"status": "draft", "extra": true});
        let Value::Object(map) = &record else {
            unreachable!()
        };
        let from_record: Vec<String> =
            node.record_violations(map).iter().map(ToString::to_string).collect();
        let from_value: Vec<String> =
            node.violations(&record).iter().map(ToString::to_string).collect();
        assert_eq!(from_record, from_value);
        assert_eq!(
            from_record,
            vec![
                "(root): \"type\" is a required property",
                "(root): Additional properties are not allowed ('extra' was unexpected)",
            ]
        );

        let matching = json!({"status": "draft"});
        let Value::Object(map) = &matching else {
            unreachable!()
        };
        let errs: Vec<String> =
            node.record_violations(map).iter().map(ToString::to_string).collect();
        assert_eq!(errs.len(), 2);
        assert_eq!(
            errs[1],
            "(root): {\"status\":\"draft\"} is valid under the schema listed in the 'not' keyword"
        );
    }

    #[test]
    fn additional_properties_schema_applies_to_extras_only() {
        let errs = violations(
            json!({"properties": {"a": {}}, "additionalProperties": {"type": "integer"}}),
            json!({"a": "text", "b": 1, "c": "nope"}),
        );
        assert_eq!(errs, vec!["c: \"nope\" is not of type \"integer\""]);
    }

    #[test]
    fn conditional_applies_then_only_when_if_holds() {
        let schema = json!({
            "if": {"properties": {"type": {"const": "plan"}}, "required": ["type"]},
            "then": {"required": ["title"]},
            "else": {"required": ["body"]}
        });
        let node = SchemaNode::compile(&schema).unwrap();
        assert!(!node.is_valid(&json!({"type": "plan"})));
        assert!(node.is_valid(&json!({"type": "plan", "title": "x"})));
        assert!(!node.is_valid(&json!({"type": "concept"})));
        assert!(node.is_valid(&json!({"type": "concept", "body": "x"})));
    }

    #[test]
    fn one_of_distinguishes_none_and_many() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"type": "number"}]});
        let none = violations(schema.clone(), json!("x"));
        assert!(none[0].contains("not valid under any"));
        let many = violations(schema, json!(3));
        assert!(many[0].contains("more than one"));
    }

    #[test]
    fn any_of_accepts_either_branch() {
        let node = SchemaNode::compile(&json!({
            "anyOf": [{"type": "integer"}, {"type": "string", "pattern": "^\\[\\[.+\\]\\]$"}]
        }))
        .unwrap();
        assert!(node.is_valid(&json!(456)));
        assert!(node.is_valid(&json!("[[PR 123]]")));
        assert!(!node.is_valid(&json!("PR 123")));
    }

    #[test]
    fn no_short_circuit_collects_all() {
        let errs = violations(
            json!({
                "required": ["a", "b"],
                "properties": {"c": {"type": "integer", "minimum": 1}}
            }),
            json!({"c": "zero"}),
        );
        assert_eq!(errs.len(), 3);
    }

    #[test]
    fn output_is_sorted_by_path() {
        let errs = violations(
            json!({
                "properties": {
                    "z": {"type": "string"},
                    "a": {"type": "string"}
                },
                "required": ["m"]
            }),
            json!({"z": 1, "a": 2}),
        );
        let paths: Vec<&str> = errs.iter().map(|e| e.split(':').next().unwrap()).collect();
        assert_eq!(paths, vec!["(root)", "a", "z"]);
    }

    #[test]
    fn bounds_and_lengths() {
        let node = SchemaNode::compile(&json!({
            "properties": {
                "revision": {"type": "integer", "minimum": 1, "maximum": 10},
                "tags": {"type": "array", "minItems": 1, "maxItems": 2, "uniqueItems": true},
                "title": {"type": "string", "minLength": 1, "maxLength": 3}
            }
        }))
        .unwrap();
        assert!(node.is_valid(&json!({"revision": 1, "tags": ["a"], "title": "abc"})));
        assert!(!node.is_valid(&json!({"revision": 0})));
        assert!(!node.is_valid(&json!({"revision": 11})));
        assert!(!node.is_valid(&json!({"tags": []})));
        assert!(!node.is_valid(&json!({"tags": ["a", "b", "c"]})));
        assert!(!node.is_valid(&json!({"tags": ["a", "a"]})));
        assert!(!node.is_valid(&json!({"title": ""})));
        assert!(!node.is_valid(&json!({"title": "abcd"})));
    }

    #[test]
    fn enum_compares_numbers_by_value() {
        let node = SchemaNode::compile(&json!({"enum": [1, 2]})).unwrap();
        assert!(node.is_valid(&json!(1.0)));
        assert!(!node.is_valid(&json!(true)));
    }

    #[test]
    fn false_schema_rejects_everything() {
        let errs = violations(json!({"properties": {"x": false}}), json!({"x": null}));
        assert_eq!(errs, vec!["x: False schema does not allow null"]);
    }

    #[test]
    fn not_rejects_matching_values() {
        let node = SchemaNode::compile(&json!({"not": {"const": "archived"}})).unwrap();
        assert!(node.is_valid(&json!("draft")));
        assert!(!node.is_valid(&json!("archived")));
    }

    #[test]
    fn multi_type_message_lists_types() {
        let errs = violations(json!({"type": ["integer", "array"]}), json!("x"));
        assert_eq!(errs, vec!["(root): \"x\" is not of types \"integer\", \"array\""]);
    }

    #[test]
    fn root_path_display() {
        assert_eq!(FieldPath::root().to_string(), "(root)");
        assert!(FieldPath::root().is_root());
    }
}
