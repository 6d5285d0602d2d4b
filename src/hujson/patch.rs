use super::{Kind, Value};
use serde::{Deserialize, Serialize};

/// A JSON Patch (RFC 6902) operation. Only the mutating subset is supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Add {
        path: String,
        value: serde_json::Value,
    },
    Remove {
        path: String,
    },
    Replace {
        path: String,
        value: serde_json::Value,
    },
}

impl Operation {
    pub fn path(&self) -> &str {
        match self {
            Operation::Add { path, .. }
            | Operation::Remove { path }
            | Operation::Replace { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("invalid JSON pointer {0:?}")]
    InvalidPointer(String),
    #[error("no value at {0:?}")]
    NotFound(String),
    #[error("{0:?} does not address a member of an object or array")]
    NotContainer(String),
    #[error("invalid array index {index:?} in {path:?}")]
    BadIndex { path: String, index: String },
}

/// Applies `ops` in order. Comments and layout around replaced values are kept;
/// inserted values are laid out one entry per line.
pub fn patch(root: &mut Value, ops: &[Operation]) -> Result<(), PatchError> {
    for op in ops {
        apply(root, op)?;
    }
    Ok(())
}

fn apply(root: &mut Value, op: &Operation) -> Result<(), PatchError> {
    let path = op.path();
    let tokens = pointer(path)?;
    let Some((last, parents)) = tokens.split_last() else {
        return match op {
            Operation::Add { value, .. } | Operation::Replace { value, .. } => {
                root.kind = Value::from_json(value).kind;
                Ok(())
            }
            Operation::Remove { .. } => Err(PatchError::NotContainer(path.to_string())),
        };
    };
    let parent = resolve(root, parents, path)?;

    match (&mut parent.kind, op) {
        (Kind::Object(obj), Operation::Add { value, .. }) => match obj.get_mut(last) {
            Some(member) => member.value.kind = Value::from_json(value).kind,
            None => obj.push(last, Value::from_json(value)),
        },
        (Kind::Object(obj), Operation::Replace { value, .. }) => {
            let member = obj
                .get_mut(last)
                .ok_or_else(|| PatchError::NotFound(path.to_string()))?;
            member.value.kind = Value::from_json(value).kind;
        }
        (Kind::Object(obj), Operation::Remove { .. }) => {
            obj.remove(last)
                .ok_or_else(|| PatchError::NotFound(path.to_string()))?;
        }
        (Kind::Array(arr), Operation::Add { value, .. }) => {
            let at = if last == "-" {
                arr.elements.len()
            } else {
                index(last, arr.elements.len() + 1, path)?
            };
            let mut element = Value::from_json(value);
            element.before = "\n".into();
            arr.elements.insert(at, element);
        }
        (Kind::Array(arr), Operation::Replace { value, .. }) => {
            let at = index(last, arr.elements.len(), path)?;
            arr.elements[at].kind = Value::from_json(value).kind;
        }
        (Kind::Array(arr), Operation::Remove { .. }) => {
            let at = index(last, arr.elements.len(), path)?;
            arr.elements.remove(at);
            if arr.elements.is_empty() {
                arr.trailing_comma = false;
            }
        }
        (Kind::Literal(_), _) => return Err(PatchError::NotContainer(path.to_string())),
    }
    Ok(())
}

fn resolve<'v>(root: &'v mut Value, tokens: &[String], path: &str) -> Result<&'v mut Value, PatchError> {
    let mut current = root;
    for token in tokens {
        current = match &mut current.kind {
            Kind::Object(obj) => {
                &mut obj
                    .get_mut(token)
                    .ok_or_else(|| PatchError::NotFound(path.to_string()))?
                    .value
            }
            Kind::Array(arr) => {
                let at = index(token, arr.elements.len(), path)?;
                &mut arr.elements[at]
            }
            Kind::Literal(_) => return Err(PatchError::NotFound(path.to_string())),
        };
    }
    Ok(current)
}

/// Splits an RFC 6901 pointer into unescaped reference tokens.
fn pointer(path: &str) -> Result<Vec<String>, PatchError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| PatchError::InvalidPointer(path.to_string()))?;
    rest.split('/')
        .map(|token| {
            let mut out = String::with_capacity(token.len());
            let mut chars = token.chars();
            while let Some(c) = chars.next() {
                match c {
                    '~' => match chars.next() {
                        Some('0') => out.push('~'),
                        Some('1') => out.push('/'),
                        _ => return Err(PatchError::InvalidPointer(path.to_string())),
                    },
                    c => out.push(c),
                }
            }
            Ok(out)
        })
        .collect()
}

// `bound` is exclusive.
fn index(token: &str, bound: usize, path: &str) -> Result<usize, PatchError> {
    let bad = || PatchError::BadIndex {
        path: path.to_string(),
        index: token.to_string(),
    };
    if token.is_empty()
        || !token.bytes().all(|b| b.is_ascii_digit())
        || (token.len() > 1 && token.starts_with('0'))
    {
        return Err(bad());
    }
    match token.parse::<usize>() {
        Ok(i) if i < bound => Ok(i),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hujson::parse;
    use serde_json::json;

    fn ops(raw: serde_json::Value) -> Vec<Operation> {
        serde_json::from_value(raw).expect("valid patch document")
    }

    #[test]
    fn deserializes_rfc6902_documents() {
        let parsed = ops(json!([
            {"op": "add", "path": "/a", "value": 1},
            {"op": "replace", "path": "/b", "value": {"c": "d"}},
            {"op": "remove", "path": "/e"},
        ]));
        assert_eq!(parsed[2], Operation::Remove { path: "/e".into() });
    }

    #[test]
    fn replace_swaps_the_whole_value_and_keeps_surrounding_comments() {
        let mut doc = parse("{\n  // hosts\n  \"hosts\": {\"old\": \"1\"}, // tail\n  \"acls\": [],\n}")
            .expect("parse");
        patch(
            &mut doc,
            &ops(json!([{"op": "replace", "path": "/hosts", "value": {"new": "2"}}])),
        )
        .expect("patch");
        assert_eq!(doc.to_json(), json!({"hosts": {"new": "2"}, "acls": []}));
        let text = doc.format();
        assert!(text.contains("// hosts"));
        assert!(text.contains("// tail"));
    }

    #[test]
    fn add_appends_missing_member_and_overwrites_existing() {
        let mut doc = parse("{\"a\": 1}").expect("parse");
        patch(
            &mut doc,
            &ops(json!([
                {"op": "add", "path": "/b", "value": [true]},
                {"op": "add", "path": "/a", "value": 2},
            ])),
        )
        .expect("patch");
        assert_eq!(doc.to_json(), json!({"a": 2, "b": [true]}));
        assert_eq!(doc.format(), "{\n\t\"a\": 2,\n\t\"b\": [\n\t\ttrue,\n\t],\n}\n");
    }

    #[test]
    fn array_operations_follow_indices() {
        let mut doc = parse("{\"l\": [1, 2, 3]}").expect("parse");
        patch(
            &mut doc,
            &ops(json!([
                {"op": "add", "path": "/l/0", "value": 0},
                {"op": "add", "path": "/l/-", "value": 4},
                {"op": "replace", "path": "/l/2", "value": 20},
                {"op": "remove", "path": "/l/3"},
            ])),
        )
        .expect("patch");
        assert_eq!(doc.to_json(), json!({"l": [0, 1, 20, 4]}));
    }

    #[test]
    fn pointer_escapes_are_decoded() {
        let mut doc = parse(r#"{"a/b": {"c~d": 1}}"#).expect("parse");
        patch(
            &mut doc,
            &ops(json!([{"op": "replace", "path": "/a~1b/c~0d", "value": 2}])),
        )
        .expect("patch");
        assert_eq!(doc.to_json(), json!({"a/b": {"c~d": 2}}));
    }

    #[test]
    fn reports_bad_targets() {
        let base = parse(r#"{"a": 1, "l": [1]}"#).expect("parse");
        let cases = [
            (json!({"op": "replace", "path": "/missing", "value": 1}), PatchError::NotFound("/missing".into())),
            (json!({"op": "remove", "path": "/missing"}), PatchError::NotFound("/missing".into())),
            (json!({"op": "add", "path": "/x/y", "value": 1}), PatchError::NotFound("/x/y".into())),
            (json!({"op": "add", "path": "/a/b", "value": 1}), PatchError::NotContainer("/a/b".into())),
            (json!({"op": "add", "path": "hosts", "value": 1}), PatchError::InvalidPointer("hosts".into())),
            (json!({"op": "add", "path": "/a~2", "value": 1}), PatchError::InvalidPointer("/a~2".into())),
            (
                json!({"op": "replace", "path": "/l/01", "value": 1}),
                PatchError::BadIndex { path: "/l/01".into(), index: "01".into() },
            ),
            (
                json!({"op": "add", "path": "/l/3", "value": 1}),
                PatchError::BadIndex { path: "/l/3".into(), index: "3".into() },
            ),
            (json!({"op": "remove", "path": ""}), PatchError::NotContainer("".into())),
        ];
        for (op, expected) in cases {
            let mut doc = base.clone();
            let op: Operation = serde_json::from_value(op).expect("operation");
            assert_eq!(patch(&mut doc, &[op]), Err(expected));
        }
    }

    #[test]
    fn add_on_non_object_root_fails() {
        let mut doc = parse("[]").expect("parse");
        let err = patch(
            &mut doc,
            &ops(json!([{"op": "add", "path": "/hosts", "value": {}}])),
        )
        .expect_err("array root");
        assert_eq!(err, PatchError::BadIndex { path: "/hosts".into(), index: "hosts".into() });

        let mut doc = parse("null").expect("parse");
        let err = patch(
            &mut doc,
            &ops(json!([{"op": "add", "path": "/hosts", "value": {}}])),
        )
        .expect_err("literal root");
        assert_eq!(err, PatchError::NotContainer("/hosts".into()));
    }
}
