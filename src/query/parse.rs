use crate::errors::DbError;
use crate::logger::QUERY_TARGET;
use crate::store::CmpOp;
use crate::utils::json::parse_json_to_bson_document;
use bson::{Bson, Document};

use super::types::{Context, FilterNode};

/// Parse a filter document into its top-level clauses, negations already folded.
///
/// Clauses are returned in document order and are meant to be AND-ed. An empty document
/// yields no clauses.
///
/// # Errors
/// Returns `QueryError` for `$not` applied to anything but comparisons, and for malformed
/// `$not` values.
pub fn parse_filter(filter: &Document) -> Result<Vec<FilterNode>, DbError> {
    parse_entries(filter, &Context::root(filter))?
        .into_iter()
        .map(FilterNode::fold_negations)
        .collect()
}

/// Parse a JSON filter into a single conjunctive tree.
///
/// # Errors
/// Returns an error if the JSON is not an object or the filter is malformed.
pub fn parse_filter_json(json: &str) -> Result<FilterNode, DbError> {
    let doc = parse_json_to_bson_document(json)?;
    if doc.is_empty() {
        return Ok(FilterNode::MatchAll);
    }
    Ok(FilterNode::conjoin(parse_filter(&doc)?))
}

/// A sub-document is an operator map when any of its keys is an operator.
fn is_operator_map(doc: &Document) -> bool {
    doc.keys().any(|k| k.starts_with('$'))
}

/// `$and`/`$or` members and `$in` alternatives are parsed as independent filters.
fn parse_member(member: &Document) -> Result<FilterNode, DbError> {
    if member.is_empty() {
        return Ok(FilterNode::MatchAll);
    }
    Ok(FilterNode::conjoin(parse_entries(member, &Context::root(member))?))
}

fn parse_entries(filter: &Document, ctx: &Context) -> Result<Vec<FilterNode>, DbError> {
    let mut nodes = Vec::with_capacity(filter.len());
    // a scalar field becomes the implicit path of the operators after it
    let mut ctx = ctx.clone();
    for (key, value) in filter {
        log::trace!(target: QUERY_TARGET, "clause {key}: {value} (path '{}')", ctx.path);
        if let Some(op) = comparison_operator(key) {
            nodes.push(FilterNode::Comparison { path: ctx.path.clone(), op, value: value.clone() });
            continue;
        }
        if ctx.negated && key != "$not" {
            let base = ctx.negation_base.as_deref().unwrap_or(&ctx.path);
            return Err(DbError::QueryError(format!(
                "{key} is not supported under $not on '{base}'"
            )));
        }
        match key.as_str() {
            "$not" => match value {
                Bson::Document(inner) => {
                    let children = parse_entries(inner, &ctx.negate())?;
                    if !children.is_empty() {
                        nodes.push(FilterNode::Negation(Box::new(FilterNode::And(children))));
                    }
                }
                Bson::Array(_) => {
                    return Err(DbError::QueryError(format!(
                        "$not on '{}' expects an operator document or a scalar",
                        ctx.path
                    )));
                }
                scalar => nodes.push(FilterNode::Comparison {
                    path: ctx.path.clone(),
                    op: CmpOp::Ne,
                    value: scalar.clone(),
                }),
            },
            "$regex" => match value {
                Bson::String(pattern) => nodes.push(FilterNode::Regex {
                    path: ctx.path.clone(),
                    pattern: pattern.clone(),
                }),
                other => log::debug!(target: QUERY_TARGET, "ignoring non-string $regex {other}"),
            },
            "$and" | "$or" => {
                let Bson::Array(members) = value else {
                    log::debug!(target: QUERY_TARGET, "ignoring {key} without a list: {value}");
                    continue;
                };
                let groups = members
                    .iter()
                    .filter_map(Bson::as_document)
                    .map(parse_member)
                    .collect::<Result<Vec<_>, _>>()?;
                nodes.push(if key == "$and" {
                    FilterNode::And(groups)
                } else {
                    FilterNode::Or(groups)
                });
            }
            "$in" => {
                let Bson::Array(values) = value else {
                    log::debug!(target: QUERY_TARGET, "ignoring $in without a list: {value}");
                    continue;
                };
                let alternatives = values
                    .iter()
                    .map(|v| {
                        let mut member = Document::new();
                        member.insert(ctx.path.clone(), v.clone());
                        parse_member(&member)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                nodes.push(FilterNode::In {
                    path: ctx.path.clone(),
                    values: values.clone(),
                    alternatives,
                });
            }
            "$all" => match value {
                Bson::Array(values) => {
                    nodes.push(FilterNode::All { path: ctx.path.clone(), values: values.clone() });
                }
                other => log::debug!(target: QUERY_TARGET, "ignoring $all without a list: {other}"),
            },
            unknown if unknown.starts_with('$') => {
                log::debug!(target: QUERY_TARGET, "ignoring unsupported operator {unknown}");
            }
            field => match value {
                Bson::Document(inner) if is_operator_map(inner) => {
                    nodes.extend(parse_entries(inner, &ctx.at(field))?);
                }
                Bson::Document(_) | Bson::Array(_) => nodes.push(FilterNode::FieldEquals {
                    path: field.to_string(),
                    value: value.clone(),
                }),
                scalar => {
                    nodes.push(FilterNode::FieldEquals {
                        path: field.to_string(),
                        value: scalar.clone(),
                    });
                    ctx = ctx.at(field);
                }
            },
        }
    }
    Ok(nodes)
}

fn comparison_operator(key: &str) -> Option<CmpOp> {
    match key {
        "$eq" | "$ne" | "$gt" | "$gte" | "$lt" | "$lte" => CmpOp::from_operator(key),
        _ => None,
    }
}
