//! Query parsing and the filter expression tree.
//!
//! Queries arrive as plain documents in the shape a document database driver
//! accepts:
//!
//! ```ignore
//! use bson::doc;
//!
//! let query = doc! {
//!     "difficulty": "Beginner",
//!     "schedule_details.days": { "$in": ["Monday", "Friday"] },
//!     "max_participants": { "$gte": 10 },
//! };
//! ```
//!
//! [`Query::parse`] turns such a document into an [`Expr`] tree that backends
//! evaluate through a [`QueryVisitor`]. Each top-level field becomes one clause
//! and clauses are AND-ed together.
//!
//! # Supported operators
//!
//! - Literal values: equality
//! - `$in`: the field is an array sharing at least one element with the list
//! - `$gte`, `$lte`: inclusive bounds
//! - `$exists`: presence (or absence) of the field
//!
//! Anything else is reported through [`ParseOptions::unsupported`], which
//! either ignores the clause with a warning or rejects the query, depending on
//! `strict_operators`.

use bson::{Bson, Document};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Settings that control how query, update and pipeline documents are interpreted.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions<'a> {
    /// Field under which the identity key is exposed to callers.
    pub identity_field: &'a str,
    /// Reject unknown operators and stages instead of ignoring them.
    pub strict_operators: bool,
}

impl<'a> ParseOptions<'a> {
    pub fn new(identity_field: &'a str, strict_operators: bool) -> Self {
        Self { identity_field, strict_operators }
    }

    /// Handles an operator or stage this layer does not implement.
    ///
    /// In strict mode `err` is returned as is. Otherwise it is logged and the
    /// offending clause is skipped, so a typo in an operator name silently
    /// widens the result set.
    pub fn unsupported(&self, err: DocumentStoreError) -> DocumentStoreResult<()> {
        if self.strict_operators {
            return Err(err);
        }

        tracing::warn!(error = %err, "ignoring unsupported operator");
        Ok(())
    }
}

impl Default for ParseOptions<'static> {
    fn default() -> Self {
        Self { identity_field: DEFAULT_IDENTITY_FIELD, strict_operators: false }
    }
}

/// The identity field used when none is configured.
pub const DEFAULT_IDENTITY_FIELD: &str = "_id";

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Field is present and equal to the value.
    Eq,
    /// Field is an array with at least one element contained in the value array.
    In,
    /// Field is present and greater than or equal to the value.
    Gte,
    /// Field is present and less than or equal to the value.
    Lte,
}

/// A filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions. An empty list matches everything.
    And(Vec<Expr>),
    /// Checks whether a field is present.
    Exists(String, bool),
    /// Field comparison expression.
    Field {
        /// The dotted field path to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: impl Into<String>, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field: field.into(), op, value }
    }

    /// Returns `true` if this expression matches every document.
    pub fn is_empty(&self) -> bool {
        matches!(self, Expr::And(exprs) if exprs.iter().all(Expr::is_empty))
    }
}

/// A parsed query.
///
/// A literal string equality on the identity field is lifted out of the
/// expression tree into [`Query::key`], so backends can resolve it with a
/// direct keyed lookup instead of a scan. Everything else stays in
/// [`Query::expr`].
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    key: Option<String>,
    expr: Expr,
}

impl Query {
    /// Returns a query that matches every document.
    pub fn all() -> Self {
        Self { key: None, expr: Expr::And(Vec::new()) }
    }

    /// Parses a query document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidQuery`] when an operator is given a
    /// value of the wrong shape (for example `$in` with a non-array), or when
    /// an unknown operator is used and `strict_operators` is set.
    pub fn parse(document: &Document, options: &ParseOptions<'_>) -> DocumentStoreResult<Self> {
        let mut key = None;
        let mut clauses = Vec::with_capacity(document.len());

        for (field, value) in document {
            if field.starts_with('$') {
                options.unsupported(DocumentStoreError::InvalidQuery(format!(
                    "unsupported top-level operator `{field}`"
                )))?;
                continue;
            }

            if field == options.identity_field && key.is_none() {
                if let Bson::String(id) = value {
                    key = Some(id.clone());
                    continue;
                }
            }

            match value {
                Bson::Document(operators) if is_operator_document(operators) => {
                    clauses.extend(parse_operators(field, operators, options)?);
                }
                _ => clauses.push(Expr::field(field.as_str(), FieldOp::Eq, value.clone())),
            }
        }

        Ok(Self { key, expr: Expr::And(clauses) })
    }

    /// The identity key this query pins, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The remaining filter clauses.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Returns `true` if the query matches every document.
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.expr.is_empty()
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

fn is_operator_document(document: &Document) -> bool {
    document
        .keys()
        .next()
        .is_some_and(|key| key.starts_with('$'))
}

fn parse_operators(
    field: &str,
    operators: &Document,
    options: &ParseOptions<'_>,
) -> DocumentStoreResult<Vec<Expr>> {
    let mut exprs = Vec::with_capacity(operators.len());

    for (op, value) in operators {
        match op.as_str() {
            "$in" => match value {
                Bson::Array(_) => exprs.push(Expr::field(field, FieldOp::In, value.clone())),
                _ => {
                    return Err(DocumentStoreError::InvalidQuery(format!(
                        "`$in` on `{field}` requires an array"
                    )));
                }
            },
            "$gte" => exprs.push(Expr::field(field, FieldOp::Gte, value.clone())),
            "$lte" => exprs.push(Expr::field(field, FieldOp::Lte, value.clone())),
            "$exists" => exprs.push(Expr::Exists(field.to_string(), truthiness(field, value)?)),
            other => options.unsupported(DocumentStoreError::InvalidQuery(format!(
                "unsupported operator `{other}` on `{field}`"
            )))?,
        }
    }

    Ok(exprs)
}

fn truthiness(field: &str, value: &Bson) -> DocumentStoreResult<bool> {
    match value {
        Bson::Boolean(flag) => Ok(*flag),
        Bson::Int32(n) => Ok(*n != 0),
        Bson::Int64(n) => Ok(*n != 0),
        _ => Err(DocumentStoreError::InvalidQuery(format!(
            "`$exists` on `{field}` requires a boolean"
        ))),
    }
}

/// Visitor over [`Expr`] trees.
///
/// Backends implement this to evaluate or translate filters.
pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}
