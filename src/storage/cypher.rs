//! Cypher rendering helpers.
//!
//! Pieces a Cypher-speaking backend needs: the reserved property that holds
//! an entity's id, parameter maps for `SET` / `CREATE`, and `WHERE`
//! fragments for match conditions. Nothing here talks to a database.
//!
//! Type and property names are restricted to ASCII alphanumerics and `_`,
//! so they are spliced into the query text directly. Values always travel
//! as parameters.

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use crate::matching::{LinkMatchClause, LinkMatchCond, NodeMatchClause, NodeMatchCond, PropMatchClause};
use crate::model::{Id, PropMap, PropNameSet, PropValue, Type};
use crate::{Error, Result};

/// Property that stores an entity's id in the graph.
pub const SLN_ID_PROP_NAME: &str = "slnID";

// ============================================================================
// Values and parameter maps
// ============================================================================

/// Render a property value as a Cypher parameter.
///
/// Dates become `YYYY-MM-DD` strings (the zero date becomes `null`),
/// timestamps RFC 3339, bytes a list of integers, and complex numbers a
/// `[re, im]` pair.
pub fn prop_value_to_json(value: &PropValue) -> Value {
    match value {
        PropValue::Bool(v) => Value::from(*v),
        PropValue::Int(v) => Value::from(*v),
        PropValue::Int8(v) => Value::from(*v),
        PropValue::Int16(v) => Value::from(*v),
        PropValue::Int32(v) => Value::from(*v),
        PropValue::Int64(v) => Value::from(*v),
        PropValue::Uint(v) | PropValue::Uintptr(v) => Value::from(*v),
        PropValue::Uint8(v) => Value::from(*v),
        PropValue::Uint16(v) => Value::from(*v),
        PropValue::Uint32(v) => Value::from(*v),
        PropValue::Uint64(v) => Value::from(*v),
        PropValue::Float32(v) => Value::from(*v),
        PropValue::Float64(v) => Value::from(*v),
        PropValue::Complex64(c) => Value::from(vec![c.re, c.im]),
        PropValue::Complex128(c) => Value::from(vec![c.re, c.im]),
        PropValue::Bytes(b) => Value::from(b.clone()),
        PropValue::String(s) => Value::from(s.as_str()),
        PropValue::Time(t) => Value::from(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        PropValue::Date(d) => d
            .to_datetime()
            .map_or(Value::Null, |t| Value::from(t.format("%Y-%m-%d").to_string())),
    }
}

/// Build `{name: {...}}` from an id, properties to set, and property names
/// to remove (rendered as `null`).
///
/// An invalid or missing id is skipped. With nothing to render the result
/// is `{name: null}`. Fails with `InvalidParameterName` if `name` is empty.
pub fn parameter_map(
    name: &str,
    id: Option<&Id>,
    props: Option<&PropMap>,
    remove: Option<&PropNameSet>,
) -> Result<Map<String, Value>> {
    if name.is_empty() {
        return Err(Error::InvalidParameterName);
    }
    let id = id.filter(|id| id.is_valid());
    let n = usize::from(id.is_some())
        + props.map_or(0, |p| p.len())
        + remove.map_or(0, |r| r.len());

    let mut out = Map::new();
    if n == 0 {
        out.insert(name.to_string(), Value::Null);
        return Ok(out);
    }
    let mut inner = Map::new();
    if let Some(id) = id {
        inner.insert(SLN_ID_PROP_NAME.to_string(), Value::from(id.to_string()));
    }
    for (k, v) in props.into_iter().flatten() {
        inner.insert(k.to_string(), prop_value_to_json(v));
    }
    for k in remove.into_iter().flatten() {
        inner.insert(k.to_string(), Value::Null);
    }
    out.insert(name.to_string(), Value::Object(inner));
    Ok(out)
}

// ============================================================================
// WHERE fragments
// ============================================================================

/// A boolean Cypher expression and the parameters it references.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CypherPredicate {
    pub clause: String,
    pub params: Map<String, Value>,
}

/// Parameter keys are `<prefix>_c<i>[_from|_to]_slnID` for ids and
/// `<prefix>_c<i>[_from|_to]_p_<name>` for property values. Property names
/// cannot start with `sln`, so the two never collide.
struct PredicateWriter<'a> {
    prefix: &'a str,
    params: Map<String, Value>,
}

impl PredicateWriter<'_> {
    fn param(&mut self, key: String, value: Value) -> String {
        let key = format!("{}_{key}", self.prefix);
        let placeholder = format!("${key}");
        self.params.insert(key, value);
        placeholder
    }

    fn id(&mut self, var: &str, tag: &str, id: &Id, out: &mut Vec<String>) {
        let p = self.param(format!("{tag}_{SLN_ID_PROP_NAME}"), Value::from(id.to_string()));
        out.push(format!("{var}.{SLN_ID_PROP_NAME} = {p}"));
    }

    fn props(&mut self, var: &str, tag: &str, pmc: &PropMatchClause, out: &mut Vec<String>) {
        let mut equal: Vec<_> = pmc.equal().iter().collect();
        equal.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in equal {
            let p = self.param(format!("{tag}_p_{name}"), prop_value_to_json(value));
            out.push(format!("{var}.{name} = {p}"));
        }
        let mut present: Vec<_> = pmc.present().iter().collect();
        present.sort();
        out.extend(present.into_iter().map(|name| format!("{var}.{name} IS NOT NULL")));
        let mut absent: Vec<_> = pmc.absent().iter().collect();
        absent.sort();
        out.extend(absent.into_iter().map(|name| format!("{var}.{name} IS NULL")));
    }

    fn node(&mut self, var: &str, tag: &str, nmc: &NodeMatchClause, out: &mut Vec<String>) {
        if let Some(id) = nmc.id() {
            self.id(var, tag, id, out);
        }
        if let Some(typ) = nmc.typ() {
            out.push(format!("{var}:{typ}"));
        }
        if let Some(pmc) = nmc.prop_clause() {
            self.props(var, tag, pmc, out);
        }
    }

    fn link(&mut self, vars: [&str; 3], tag: &str, lmc: &LinkMatchClause, out: &mut Vec<String>) {
        let [var, from, to] = vars;
        if let Some(id) = lmc.id() {
            self.id(var, tag, id, out);
        }
        if let Some(typ) = lmc.typ() {
            out.push(link_type_test(var, typ));
        }
        if let Some(pmc) = lmc.prop_clause() {
            self.props(var, tag, pmc, out);
        }
        if let Some(nmc) = lmc.from_clause() {
            self.node(from, &format!("{tag}_from"), nmc, out);
        }
        if let Some(nmc) = lmc.to_clause() {
            self.node(to, &format!("{tag}_to"), nmc, out);
        }
    }
}

fn link_type_test(var: &str, typ: &Type) -> String {
    format!("type({var}) = '{typ}'")
}

/// OR of the conjunctions, `true` for an absent condition, `false` for an
/// empty one.
fn disjunction(conjunctions: Vec<Vec<String>>) -> String {
    if conjunctions.is_empty() {
        return "false".to_string();
    }
    conjunctions
        .into_iter()
        .map(|c| {
            if c.is_empty() {
                "true".to_string()
            } else {
                format!("({})", c.join(" AND "))
            }
        })
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Render `cond` on node variable `var`. Parameter keys start with `prefix`.
pub fn node_match_where(var: &str, prefix: &str, cond: Option<&NodeMatchCond>) -> CypherPredicate {
    let Some(cond) = cond else {
        return CypherPredicate {
            clause: "true".to_string(),
            params: Map::new(),
        };
    };
    let mut w = PredicateWriter {
        prefix,
        params: Map::new(),
    };
    let conjunctions = cond
        .clauses()
        .iter()
        .enumerate()
        .map(|(i, nmc)| {
            let mut out = Vec::new();
            w.node(var, &format!("c{i}"), nmc, &mut out);
            out
        })
        .collect();
    CypherPredicate {
        clause: disjunction(conjunctions),
        params: w.params,
    }
}

/// Render `cond` on the pattern `(from)-[var]->(to)`. Parameter keys start
/// with `prefix`.
pub fn link_match_where(
    var: &str,
    from: &str,
    to: &str,
    prefix: &str,
    cond: Option<&LinkMatchCond>,
) -> CypherPredicate {
    let Some(cond) = cond else {
        return CypherPredicate {
            clause: "true".to_string(),
            params: Map::new(),
        };
    };
    let mut w = PredicateWriter {
        prefix,
        params: Map::new(),
    };
    let conjunctions = cond
        .clauses()
        .iter()
        .enumerate()
        .map(|(i, lmc)| {
            let mut out = Vec::new();
            w.link([var, from, to], &format!("c{i}"), lmc, &mut out);
            out
        })
        .collect();
    CypherPredicate {
        clause: disjunction(conjunctions),
        params: w.params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Complex64, Date, PropName};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn name(s: &str) -> PropName {
        PropName::new(s).unwrap()
    }

    fn person_id() -> Id {
        Id::new(&Type::new("Person").unwrap(), Date::from_ymd(2023, 3, 12), 0)
    }

    #[test]
    fn test_prop_value_to_json() {
        assert_eq!(prop_value_to_json(&PropValue::Int8(-3)), json!(-3));
        assert_eq!(prop_value_to_json(&PropValue::Bytes(vec![1, 2])), json!([1, 2]));
        assert_eq!(
            prop_value_to_json(&PropValue::Complex64(Complex64::new(1.0, -2.0))),
            json!([1.0, -2.0])
        );
        assert_eq!(
            prop_value_to_json(&PropValue::Date(Date::from_ymd(2023, 3, 12))),
            json!("2023-03-12")
        );
        assert_eq!(prop_value_to_json(&PropValue::Date(Date::default())), Value::Null);
        let t = Utc.with_ymd_and_hms(2023, 3, 12, 8, 30, 0).unwrap();
        assert_eq!(prop_value_to_json(&PropValue::Time(t)), json!("2023-03-12T08:30:00Z"));
    }

    #[test]
    fn test_parameter_map() {
        let mut props = PropMap::new();
        props.set_prop(name("age"), 30i64).unwrap();
        let mut remove = PropNameSet::new();
        remove.add([name("nick")]).unwrap();

        let id = person_id();
        let m = parameter_map("p", Some(&id), Some(&props), Some(&remove)).unwrap();
        assert_eq!(
            Value::Object(m),
            json!({"p": {"slnID": id.to_string(), "age": 30, "nick": null}})
        );
    }

    #[test]
    fn test_parameter_map_empty() {
        let m = parameter_map("p", Some(&Id::default()), None, None).unwrap();
        assert_eq!(Value::Object(m), json!({"p": null}));
        assert_eq!(parameter_map("", None, None, None), Err(Error::InvalidParameterName));
    }

    #[test]
    fn test_node_match_where() {
        assert_eq!(node_match_where("n", "m", None).clause, "true");
        assert_eq!(node_match_where("n", "m", Some(&NodeMatchCond::new())).clause, "false");

        let cond: NodeMatchCond = vec![
            NodeMatchClause::new().with_type(Type::new("Person").unwrap()).with_prop_clause(
                PropMatchClause::new()
                    .with_equal(name("age"), 30i64)
                    .unwrap()
                    .with_absent([name("nick")])
                    .unwrap(),
            ),
            NodeMatchClause::new(),
        ]
        .into();
        let pred = node_match_where("n", "m", Some(&cond));
        assert_eq!(pred.clause, "(n:Person AND n.age = $m_c0_p_age AND n.nick IS NULL) OR true");
        assert_eq!(Value::Object(pred.params), json!({"m_c0_p_age": 30}));
    }

    #[test]
    fn test_link_match_where() {
        let id = person_id();
        let cond: LinkMatchCond = vec![LinkMatchClause::new()
            .with_type(Type::new("Knows").unwrap())
            .with_from(NodeMatchClause::new().with_id(id.clone()))]
        .into();
        let pred = link_match_where("r", "a", "b", "m", Some(&cond));
        assert_eq!(pred.clause, "(type(r) = 'Knows' AND a.slnID = $m_c0_from_slnID)");
        assert_eq!(Value::Object(pred.params), json!({"m_c0_from_slnID": id.to_string()}));
    }

    #[test]
    fn test_ids_and_props_named_like_ids_get_distinct_params() {
        let id = person_id();
        let cond: NodeMatchCond = vec![NodeMatchClause::new()
            .with_id(id.clone())
            .with_prop_clause(PropMatchClause::new().with_equal(name("id"), 5i64).unwrap())]
        .into();
        let pred = node_match_where("n", "m", Some(&cond));
        assert_eq!(pred.clause, "(n.slnID = $m_c0_slnID AND n.id = $m_c0_p_id)");
        assert_eq!(
            Value::Object(pred.params),
            json!({"m_c0_slnID": id.to_string(), "m_c0_p_id": 5})
        );

        let cond: LinkMatchCond = vec![LinkMatchClause::new()
            .with_prop_clause(PropMatchClause::new().with_equal(name("from_slnID"), 1i64).unwrap())
            .with_from(NodeMatchClause::new().with_id(id.clone()))]
        .into();
        let pred = link_match_where("r", "a", "b", "m", Some(&cond));
        assert_eq!(pred.clause, "(r.from_slnID = $m_c0_p_from_slnID AND a.slnID = $m_c0_from_slnID)");
        assert_eq!(pred.params.len(), 2);
    }
}
