//! Equality filters
//!
//! A [`Filter`] is a conjunction of "field equals literal" clauses. It renders
//! to a MongoDB filter document and can also be evaluated directly against a
//! document, which is what [`crate::MemoryStore`] does.

use bson::{doc, Bson, Document as BsonDocument};

/// Conjunction of field-equals-value clauses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Bson)>,
}

impl Filter {
    /// Create an empty filter (matches every document)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter with a single equality clause
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new().and_eq(field, value)
    }

    /// Add another equality clause
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    /// Get the clauses in insertion order
    pub fn clauses(&self) -> &[(String, Bson)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render as a MongoDB filter document.
    ///
    /// Repeated fields cannot share one document, so they are spelled out
    /// with `$and`.
    pub fn to_document(&self) -> BsonDocument {
        let mut rendered = BsonDocument::new();
        for (field, value) in &self.clauses {
            if rendered.contains_key(field) {
                let clauses: Vec<Bson> = self
                    .clauses
                    .iter()
                    .map(|(f, v)| Bson::Document(doc! { f.as_str(): v.clone() }))
                    .collect();
                return doc! { "$and": clauses };
            }
            rendered.insert(field.clone(), value.clone());
        }
        rendered
    }

    /// Evaluate the filter against a document
    pub fn matches(&self, document: &BsonDocument) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| match lookup(document, field) {
                Some(actual) => values_equal(actual, expected),
                None => matches!(expected, Bson::Null),
            })
    }
}

/// Resolve a dotted path (`a.b.c`) inside a document
fn lookup<'a>(document: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Equality the way the server applies it: numbers compare by value across
/// BSON number types, and an array field matches if any element matches.
fn values_equal(actual: &Bson, expected: &Bson) -> bool {
    if let Some(equal) = numbers_equal(actual, expected) {
        return equal;
    }
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Bson::Array(items), expected) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, expected))
        }
        _ => false,
    }
}

/// Numeric equality, or `None` if either side is not a number.
///
/// Integer pairs compare exactly as `i64`. A double only equals an integer
/// when it is whole and converts back to the same `i64`.
fn numbers_equal(actual: &Bson, expected: &Bson) -> Option<bool> {
    match (actual, expected) {
        (Bson::Double(a), Bson::Double(b)) => Some(a == b),
        (Bson::Double(d), other) | (other, Bson::Double(d)) => {
            as_integer(other).map(|i| double_equals_integer(*d, i))
        }
        _ => Some(as_integer(actual)? == as_integer(expected)?),
    }
}

fn as_integer(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        _ => None,
    }
}

fn double_equals_integer(d: f64, i: i64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    d.fract() == 0.0 && d >= i64::MIN as f64 && d < i64::MAX as f64 && d as i64 == i
}
