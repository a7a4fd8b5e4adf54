use std::cmp::Ordering;

use agora_api::{
    Condition, FetchQuery, GroupOperator, Operator, OrderBy, OrderType, Record, WhereGroup,
    ID_FIELD,
};
use serde_json::Value;

pub trait QueryExt {
    fn matches(&self, r: &Record) -> bool;
}

impl QueryExt for Condition {
    fn matches(&self, r: &Record) -> bool {
        let field = r.get(&self.field).unwrap_or(&Value::Null);
        self.values.iter().any(|v| match self.operator {
            Operator::EqualTo => values_equal(field, v),
            Operator::Contains => match (field, v) {
                (Value::String(haystack), Value::String(needle)) => haystack
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
                _ => false,
            },
        })
    }
}

impl QueryExt for WhereGroup {
    fn matches(&self, r: &Record) -> bool {
        let mut results = self
            .conditions
            .iter()
            .map(|c| c.matches(r))
            .chain(self.sub_groups.iter().map(|g| g.matches(r)));
        match self.operator {
            GroupOperator::And => results.all(|m| m),
            GroupOperator::Or => results.any(|m| m),
        }
    }
}

impl QueryExt for FetchQuery {
    fn matches(&self, r: &Record) -> bool {
        self.where_.iter().all(|c| c.matches(r)) && self.where_groups.iter().all(|g| g.matches(r))
    }
}

// Numbers compare by value, so that `3` finds `3.0`
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

fn rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order on json values: null, then booleans, numbers, strings. Arrays
/// and objects all compare equal among themselves.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(_), Value::Number(_)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Stable: records equal on every key keep their order
pub fn sort(records: &mut [Record], order: &[OrderBy]) {
    records.sort_by(|a, b| {
        order
            .iter()
            .map(|o| {
                let ord = compare_values(
                    a.get(&o.field).unwrap_or(&Value::Null),
                    b.get(&o.field).unwrap_or(&Value::Null),
                );
                match o.order {
                    OrderType::Asc => ord,
                    OrderType::Desc => ord.reverse(),
                }
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Keeps only the requested fields, all of them if none is listed. The id is
/// always kept.
pub fn project(r: &Record, fields: &[String]) -> Record {
    if fields.is_empty() {
        return r.clone();
    }
    r.iter()
        .filter(|(k, _)| *k == ID_FIELD || fields.iter().any(|f| f == *k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
