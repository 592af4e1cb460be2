use crate::config::QueryConfig;
use crate::errors::DbError;
use crate::logger::QUERY_TARGET;
use crate::store::{CmpOp, PredicateBuilder};
use bson::{Bson, Document};

use super::parse::parse_filter;
use super::types::FilterNode;

// Stand-in for an escaped backslash while single backslashes are stripped.
const BACKSLASH_SENTINEL: &str = "\u{FFFF}";

/// Turns filter documents into predicates of a store's [`PredicateBuilder`].
pub struct QueryCompiler<'a, B: PredicateBuilder> {
    builder: &'a B,
    config: QueryConfig,
}

impl<'a, B: PredicateBuilder> QueryCompiler<'a, B> {
    pub fn new(builder: &'a B) -> Self {
        Self { builder, config: QueryConfig::default() }
    }

    #[must_use]
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// Compile a filter document. `None` and `{}` match every document.
    ///
    /// # Errors
    /// - `Regex` when a `$regex` pattern does not compile.
    /// - `QueryError` for unsupported negations.
    /// - `EmptyFilter` when a non-empty filter produces no clauses at all.
    pub fn compile(&self, filter: Option<&Document>) -> Result<B::Predicate, DbError> {
        let Some(filter) = filter.filter(|f| !f.is_empty()) else {
            return Ok(self.match_all());
        };
        let clauses = parse_filter(filter)?;
        log::debug!(target: QUERY_TARGET, "compiling {filter} into {} clause(s)", clauses.len());
        let mut compiled = None;
        for clause in &clauses {
            if let Some(p) = self.compile_node(clause)? {
                compiled = Some(self.conjoin(compiled, p));
            }
        }
        let predicate = compiled.ok_or(DbError::EmptyFilter)?;
        log::debug!(target: QUERY_TARGET, "compiled predicate: {predicate:?}");
        Ok(predicate)
    }

    /// Compile one parsed node. Groups whose members all vanish produce `None`.
    ///
    /// # Errors
    /// Same as [`Self::compile`], minus `EmptyFilter`.
    pub fn compile_node(&self, node: &FilterNode) -> Result<Option<B::Predicate>, DbError> {
        let b = self.builder;
        Ok(match node {
            FilterNode::FieldEquals { path, value } => Some(b.or(
                b.equals(path, value),
                b.any_of(path, std::slice::from_ref(value)),
            )),
            FilterNode::Comparison { path, op, value } => Some(b.compare(path, *op, value)),
            FilterNode::Regex { path, pattern } => {
                Some(b.matches(path, &unescape_pattern(pattern))?)
            }
            FilterNode::Negation(_) => return self.compile_node(&node.clone().fold_negations()?),
            FilterNode::And(children) => {
                let mut acc = None;
                for child in children {
                    if let Some(p) = self.compile_node(child)? {
                        acc = Some(self.conjoin(acc, p));
                    }
                }
                acc
            }
            FilterNode::Or(children) => {
                let mut acc = None;
                for child in children {
                    if let Some(p) = self.compile_node(child)? {
                        acc = Some(match acc {
                            None => p,
                            Some(prev) => b.or(prev, p),
                        });
                    }
                }
                acc
            }
            FilterNode::In { path, values, alternatives } => {
                let mut acc = b.any_of(path, values);
                for alt in alternatives {
                    if let Some(p) = self.compile_node(alt)? {
                        acc = b.or(acc, p);
                    }
                }
                Some(acc)
            }
            FilterNode::All { path, values } => Some(b.all_of(path, values)),
            FilterNode::MatchAll => Some(self.match_all()),
        })
    }

    /// `id_field != sentinel`, which holds for every stored document.
    pub fn match_all(&self) -> B::Predicate {
        self.builder.compare(
            &self.config.id_field,
            CmpOp::Ne,
            &Bson::String(self.config.match_all_sentinel.clone()),
        )
    }

    fn conjoin(&self, acc: Option<B::Predicate>, next: B::Predicate) -> B::Predicate {
        match acc {
            None => next,
            Some(prev) => self.builder.and(prev, next),
        }
    }
}

/// Compile with the default configuration.
///
/// # Errors
/// See [`QueryCompiler::compile`].
pub fn compile<B: PredicateBuilder>(
    builder: &B,
    filter: Option<&Document>,
) -> Result<B::Predicate, DbError> {
    QueryCompiler::new(builder).compile(filter)
}

/// Undo the pattern escaping used by stored filters.
///
/// Triple and double backslashes each stand for one literal backslash; any other single
/// backslash is dropped.
#[must_use]
pub fn unescape_pattern(raw: &str) -> String {
    raw.replace("\\\\\\", BACKSLASH_SENTINEL)
        .replace("\\\\", BACKSLASH_SENTINEL)
        .replace('\\', "")
        .replace(BACKSLASH_SENTINEL, "\\")
}
