//! Clause types and their query string fragments.
//!
//! Each [`Clause`] renders to exactly one fragment. Values are encoded when
//! the clause is created, so rendering only concatenates.

use std::{fmt, str::FromStr};

use crate::{
    encoding::{encode_component, query_pair},
    error::PrestError,
};

/// Response format requested from the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Renderer {
    #[default]
    Json,
    Xml,
}

impl Renderer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Renderer::Json => "json",
            Renderer::Xml => "xml",
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Renderer {
    type Err = PrestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Renderer::Json),
            "xml" => Ok(Renderer::Xml),
            other => Err(PrestError::InvalidArgument(format!(
                "unknown renderer `{other}`, expected `json` or `xml`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Outer => "outer",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinKind {
    type Err = PrestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "right" => Ok(JoinKind::Right),
            "outer" => Ok(JoinKind::Outer),
            other => Err(PrestError::InvalidArgument(format!(
                "unknown join type `{other}`"
            ))),
        }
    }
}

/// Server-side aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Sum,
    Avg,
    Max,
    Min,
    StdDev,
    Variance,
}

impl AggregateFn {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Max => "max",
            AggregateFn::Min => "min",
            AggregateFn::StdDev => "stddev",
            AggregateFn::Variance => "variance",
        }
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateFn {
    type Err = PrestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregateFn::Sum),
            "avg" => Ok(AggregateFn::Avg),
            "max" => Ok(AggregateFn::Max),
            "min" => Ok(AggregateFn::Min),
            "stddev" => Ok(AggregateFn::StdDev),
            "variance" => Ok(AggregateFn::Variance),
            other => Err(PrestError::InvalidArgument(format!(
                "unknown aggregate function `{other}`"
            ))),
        }
    }
}

/// `fn:field`, collected separately and rendered as the trailing `_select`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub func: AggregateFn,
    pub field: String,
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.func, self.field)
    }
}

/// Comparison operators accepted in `field=$op.value` filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    NotIn,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "$eq",
            FilterOp::Ne => "$ne",
            FilterOp::Gt => "$gt",
            FilterOp::Gte => "$gte",
            FilterOp::Lt => "$lt",
            FilterOp::Lte => "$lte",
            FilterOp::Like => "$like",
            FilterOp::ILike => "$ilike",
            FilterOp::In => "$in",
            FilterOp::NotIn => "$nin",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = PrestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('$').to_ascii_lowercase().as_str() {
            "eq" => Ok(FilterOp::Eq),
            "ne" => Ok(FilterOp::Ne),
            "gt" => Ok(FilterOp::Gt),
            "gte" => Ok(FilterOp::Gte),
            "lt" => Ok(FilterOp::Lt),
            "lte" => Ok(FilterOp::Lte),
            "like" => Ok(FilterOp::Like),
            "ilike" => Ok(FilterOp::ILike),
            "in" => Ok(FilterOp::In),
            "nin" => Ok(FilterOp::NotIn),
            other => Err(PrestError::InvalidArgument(format!(
                "unknown filter operator `{other}`"
            ))),
        }
    }
}

/// One query string fragment contributed by one builder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Page(u64),
    PageSize(u64),
    Select(Vec<String>),
    Count(String),
    CountFirst(bool),
    Renderer(Renderer),
    Distinct(bool),
    Order(Vec<String>),
    GroupBy(Vec<String>),
    /// `field=value`, value already encoded.
    Equal {
        field: String,
        value: String,
    },
    /// `field=$op.value`, value already encoded.
    Operator {
        field: String,
        op: FilterOp,
        value: String,
    },
    /// `field=$null` or `field=$notnull`.
    Null {
        field: String,
        negated: bool,
    },
    Join {
        kind: JoinKind,
        table: String,
        local_field: String,
        op: String,
        foreign_field: String,
    },
    Jsonb {
        field: String,
        json_field: String,
        value: String,
    },
    TextSearch {
        field: String,
        language: Option<String>,
        query: String,
    },
    Having {
        func: AggregateFn,
        field: String,
        condition: String,
        value: String,
    },
}

impl Clause {
    pub(crate) fn equal(field: impl Into<String>, value: impl fmt::Display) -> Self {
        Clause::Equal {
            field: field.into(),
            value: encode_component(value),
        }
    }

    pub(crate) fn operator(field: impl Into<String>, op: FilterOp, value: impl fmt::Display) -> Self {
        Clause::Operator {
            field: field.into(),
            op,
            value: encode_component(value),
        }
    }

    /// The rendered `key=value` (or positional) fragment.
    pub fn fragment(&self) -> String {
        match self {
            Clause::Page(n) => query_pair("_page", n),
            Clause::PageSize(n) => query_pair("_page_size", n),
            Clause::Select(fields) => query_pair("_select", fields.join(",")),
            Clause::Count(field) => query_pair("_count", field),
            Clause::CountFirst(flag) => query_pair("_count_first", flag),
            Clause::Renderer(renderer) => query_pair("_renderer", renderer),
            Clause::Distinct(flag) => query_pair("_distinct", flag),
            Clause::Order(fields) => query_pair("_order", fields.join(",")),
            Clause::GroupBy(fields) => query_pair("_groupby", fields.join(",")),
            Clause::Equal {
                field,
                value,
            } => format!("{field}={value}"),
            Clause::Operator {
                field,
                op,
                value,
            } => format!("{field}={op}.{value}"),
            Clause::Null {
                field,
                negated,
            } => {
                let op = if *negated { "$notnull" } else { "$null" };
                format!("{field}={op}")
            }
            Clause::Join {
                kind,
                table,
                local_field,
                op,
                foreign_field,
            } => format!("_join={kind}:{table}:{local_field}:{op}:{foreign_field}"),
            Clause::Jsonb {
                field,
                json_field,
                value,
            } => format!("{field}->>{json_field}:jsonb={value}"),
            Clause::TextSearch {
                field,
                language,
                query,
            } => match language {
                Some(lang) => format!("{field}${lang}:tsquery={query}"),
                None => format!("{field}:tsquery={query}"),
            },
            Clause::Having {
                func,
                field,
                condition,
                value,
            } => format!("having:{func}:{field}:{condition}:{value}"),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}
