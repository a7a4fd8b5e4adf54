use serde_json::Value;

use crate::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Operator {
    EqualTo,
    /// Case-insensitive substring match, only meaningful on string fields
    Contains,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    /// The condition holds if the field matches any of these values
    pub values: Vec<Value>,
}

impl Condition {
    pub fn equal_to(field: &str, value: impl Into<Value>) -> Condition {
        Condition {
            field: String::from(field),
            operator: Operator::EqualTo,
            values: vec![value.into()],
        }
    }

    pub fn contains(field: &str, needle: &str) -> Condition {
        Condition {
            field: String::from(field),
            operator: Operator::Contains,
            values: vec![Value::String(String::from(needle))],
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.field)?;
        for v in &self.values {
            if let Value::String(s) = v {
                crate::validate_string(s)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum GroupOperator {
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct WhereGroup {
    pub operator: GroupOperator,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub sub_groups: Vec<WhereGroup>,
}

impl WhereGroup {
    pub fn any(conditions: Vec<Condition>) -> WhereGroup {
        WhereGroup {
            operator: GroupOperator::Or,
            conditions,
            sub_groups: Vec::new(),
        }
    }

    pub fn all(conditions: Vec<Condition>) -> WhereGroup {
        WhereGroup {
            operator: GroupOperator::And,
            conditions,
            sub_groups: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        for c in &self.conditions {
            c.validate()?;
        }
        for g in &self.sub_groups {
            g.validate()?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum OrderType {
    Asc,
    Desc,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct OrderBy {
    pub field: String,
    pub order: OrderType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Paging {
    pub limit: usize,
    pub offset: usize,
}

/// Parameters of a `RecordStore::fetch_records` call.
///
/// `where_` conditions must all hold, and so must every where-group.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct FetchQuery {
    pub fields: Vec<String>,
    #[serde(rename = "where", default)]
    pub where_: Vec<Condition>,
    #[serde(default)]
    pub where_groups: Vec<WhereGroup>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    pub paging: Option<Paging>,
}

impl FetchQuery {
    pub fn new(fields: &[&str]) -> FetchQuery {
        FetchQuery {
            fields: fields.iter().map(|f| String::from(*f)).collect(),
            ..FetchQuery::default()
        }
    }

    pub fn filter(mut self, c: Condition) -> FetchQuery {
        self.where_.push(c);
        self
    }

    pub fn group(mut self, g: WhereGroup) -> FetchQuery {
        self.where_groups.push(g);
        self
    }

    pub fn order(mut self, field: &str, order: OrderType) -> FetchQuery {
        self.order_by.push(OrderBy {
            field: String::from(field),
            order,
        });
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> FetchQuery {
        self.paging = Some(Paging { limit, offset });
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        for f in &self.fields {
            crate::validate_string(f)?;
        }
        for c in &self.where_ {
            c.validate()?;
        }
        for g in &self.where_groups {
            g.validate()?;
        }
        for o in &self.order_by {
            crate::validate_string(&o.field)?;
        }
        Ok(())
    }
}
