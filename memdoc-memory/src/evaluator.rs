//! Query expression evaluation for in-memory document filtering.
//!
//! This module provides the evaluation engine for query expressions and the
//! value ordering shared by `$group` and `$sort`.

use std::{cmp::Ordering, collections::HashMap};
use bson::{Bson, Document, datetime::DateTime};

use memdoc_core::{
    error::DocumentStoreError,
    path::get_path,
    query::{Expr, FieldOp, QueryVisitor},
};

/// Type-erased, comparable representation of BSON values.
///
/// Numbers compare by value across types, so `Int32(1)`, `Int64(1)` and
/// `Double(1.0)` are equal. Integers stay exact; NaN equals itself and sorts
/// below every other number.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(DateTime),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Any other BSON type, compared structurally.
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Int(i64::from(*value)),
            Bson::Int64(value) => Comparable::Int(*value),
            Bson::Double(value) => Comparable::Float(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> Comparable<'a> {
    /// Position of the value's type in the cross-type sort order.
    fn rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Int(_) | Comparable::Float(_) => 1,
            Comparable::String(_) => 2,
            Comparable::Map(_) => 3,
            Comparable::Array(_) => 4,
            Comparable::Bool(_) => 5,
            Comparable::DateTime(_) => 6,
            Comparable::Other(_) => 7,
        }
    }

    /// Total order used for sorting and grouping.
    ///
    /// Values of different types order by type: null, numbers, strings,
    /// documents, arrays, booleans, dates, then everything else.
    pub(crate) fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Ordering::Equal,
            (Comparable::String(a), Comparable::String(b)) => a.cmp(b),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.cmp(b),
            (Comparable::Array(a), Comparable::Array(b)) => {
                for (left, right) in a.iter().zip(b.iter()) {
                    match left.total_cmp(right) {
                        Ordering::Equal => continue,
                        ordering => return ordering,
                    }
                }
                a.len().cmp(&b.len())
            },
            (Comparable::Map(a), Comparable::Map(b)) => {
                let mut left = a.iter().collect::<Vec<_>>();
                let mut right = b.iter().collect::<Vec<_>>();
                left.sort_by(|x, y| x.0.cmp(y.0));
                right.sort_by(|x, y| x.0.cmp(y.0));

                for ((lk, lv), (rk, rv)) in left.iter().zip(right.iter()) {
                    match lk.cmp(rk).then_with(|| lv.total_cmp(rv)) {
                        Ordering::Equal => continue,
                        ordering => return ordering,
                    }
                }
                left.len().cmp(&right.len())
            },
            (Comparable::Other(a), Comparable::Other(b)) => a.to_string().cmp(&b.to_string()),
            _ => self
                .number_cmp(other)
                .unwrap_or_else(|| self.rank().cmp(&other.rank())),
        }
    }

    /// Orders two numbers, or returns `None` if either side is not one.
    fn number_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Int(a), Comparable::Int(b)) => Some(a.cmp(b)),
            (Comparable::Float(a), Comparable::Float(b)) => Some(float_cmp(*a, *b)),
            (Comparable::Int(a), Comparable::Float(b)) => Some(int_float_cmp(*a, *b)),
            (Comparable::Float(a), Comparable::Int(b)) => Some(int_float_cmp(*b, *a).reverse()),
            _ => None,
        }
    }
}

fn float_cmp(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison of an integer with a float.
fn int_float_cmp(int: i64, float: f64) -> Ordering {
    // 2^63, the first float above i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return Ordering::Greater;
    }
    if float >= LIMIT {
        return Ordering::Less;
    }
    if float < -LIMIT {
        return Ordering::Greater;
    }

    let whole = float.trunc();
    int.cmp(&(whole as i64))
        .then_with(|| 0.0_f64.partial_cmp(&(float - whole)).unwrap_or(Ordering::Equal))
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => self.number_cmp(other) == Some(Ordering::Equal),
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => self.number_cmp(other),
        }
    }
}

/// Orders two optional values, treating a missing value like null.
pub(crate) fn compare_values(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    let left = left.map(Comparable::from).unwrap_or(Comparable::Null);
    let right = right.map(Comparable::from).unwrap_or(Comparable::Null);

    left.total_cmp(&right)
}

/// Equality with numeric normalization.
pub(crate) fn values_equal(left: &Bson, right: &Bson) -> bool {
    Comparable::from(left) == Comparable::from(right)
}

/// Evaluates filter expressions against one stored document.
///
/// The stored body never contains the identity key, so lookups of the
/// identity field resolve to the key itself.
pub(crate) struct DocumentEvaluator<'a> {
    key: &'a str,
    body: &'a Document,
    identity_field: &'a str,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(key: &'a str, body: &'a Document, identity_field: &'a str) -> Self {
        Self { key, body, identity_field }
    }

    /// Returns whether the document satisfies `expr`.
    pub fn matches(&mut self, expr: &Expr) -> bool {
        self.visit_expr(expr).unwrap_or(false)
    }

    fn resolve(&self, field: &str) -> Option<Comparable<'a>> {
        if field == self.identity_field {
            return Some(Comparable::String(self.key));
        }

        get_path(self.body, field).map(Comparable::from)
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(self.resolve(field).is_some() == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.resolve(field) else {
            return Ok(false);
        };

        match op {
            FieldOp::Eq => Ok(field_value == Comparable::from(value)),
            FieldOp::Gte | FieldOp::Lte => {
                match field_value.partial_cmp(&Comparable::from(value)) {
                    Some(ordering) => Ok(match op {
                        FieldOp::Gte => ordering != Ordering::Less,
                        _ => ordering != Ordering::Greater,
                    }),
                    None => Ok(false),
                }
            },
            FieldOp::In => match (field_value, Comparable::from(value)) {
                (Comparable::Array(array), Comparable::Array(values)) => Ok(
                    array
                        .iter()
                        .any(|item| values.contains(item))
                ),
                _ => Ok(false),
            },
        }
    }
}
