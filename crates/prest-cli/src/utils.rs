use std::{
    fmt::Display,
    sync::atomic::{AtomicBool, Ordering},
};

use nu_ansi_term::Color;
use prest_client::{AggregateFn, FilterOp, JoinKind};

pub static COLOR: AtomicBool = AtomicBool::new(true);

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if COLOR.load(Ordering::Relaxed) {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// `--eq field=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualFilter {
    pub field: String,
    pub value: String,
}

/// `--filter field:op:value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

/// `--range field:start:end`, either bound may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFilter {
    pub field: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// `--join kind:table:local:op:foreign`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinArg {
    pub kind: JoinKind,
    pub table: String,
    pub local_field: String,
    pub op: String,
    pub foreign_field: String,
}

/// `--agg fn:field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateArg {
    pub func: AggregateFn,
    pub field: String,
}

fn non_empty(part: &str, what: &str, input: &str) -> Result<String, String> {
    if part.is_empty() {
        Err(format!("missing {what} in `{input}`"))
    } else {
        Ok(part.to_string())
    }
}

pub fn parse_equal(input: &str) -> Result<EqualFilter, String> {
    let (field, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected `field=value`, got `{input}`"))?;

    Ok(EqualFilter {
        field: non_empty(field, "field", input)?,
        value: value.to_string(),
    })
}

pub fn parse_operator(input: &str) -> Result<OperatorFilter, String> {
    let mut parts = input.splitn(3, ':');
    let (Some(field), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected `field:op:value`, got `{input}`"));
    };

    Ok(OperatorFilter {
        field: non_empty(field, "field", input)?,
        op: op.parse().map_err(|e| format!("{e}"))?,
        value: value.to_string(),
    })
}

pub fn parse_range(input: &str) -> Result<RangeFilter, String> {
    let parts = input.split(':').collect::<Vec<_>>();
    let [field, start, end] = parts[..] else {
        return Err(format!("expected `field:start:end`, got `{input}`"));
    };

    let bound = |s: &str| (!s.is_empty()).then(|| s.to_string());
    let range = RangeFilter {
        field: non_empty(field, "field", input)?,
        start: bound(start),
        end: bound(end),
    };

    if range.start.is_none() && range.end.is_none() {
        return Err(format!("range `{input}` has no bounds"));
    }
    Ok(range)
}

pub fn parse_join(input: &str) -> Result<JoinArg, String> {
    let parts = input.split(':').collect::<Vec<_>>();
    let [kind, table, local_field, op, foreign_field] = parts[..] else {
        return Err(format!(
            "expected `kind:table:local_field:op:foreign_field`, got `{input}`"
        ));
    };

    Ok(JoinArg {
        kind: kind.parse().map_err(|e| format!("{e}"))?,
        table: non_empty(table, "table", input)?,
        local_field: non_empty(local_field, "local field", input)?,
        op: non_empty(op, "operator", input)?,
        foreign_field: non_empty(foreign_field, "foreign field", input)?,
    })
}

pub fn parse_aggregate(input: &str) -> Result<AggregateArg, String> {
    let (func, field) = input
        .split_once(':')
        .ok_or_else(|| format!("expected `function:field`, got `{input}`"))?;

    Ok(AggregateArg {
        func: func.parse().map_err(|e| format!("{e}"))?,
        field: non_empty(field, "field", input)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_equal() {
        assert_eq!(
            parse_equal("category_name=Foot=ball").unwrap(),
            EqualFilter {
                field: "category_name".into(),
                value: "Foot=ball".into(),
            }
        );
        assert!(parse_equal("no_separator").is_err());
        assert!(parse_equal("=value").is_err());
    }

    #[test]
    fn test_parse_operator() {
        let filter = parse_operator("created_at:$gte:2024-01-01T10:00").unwrap();
        assert_eq!(filter.field, "created_at");
        assert_eq!(filter.op, FilterOp::Gte);
        assert_eq!(filter.value, "2024-01-01T10:00");

        assert!(parse_operator("price:$between:1").is_err());
        assert!(parse_operator("price:$gt").is_err());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_range("category_id:5:").unwrap(),
            RangeFilter {
                field: "category_id".into(),
                start: Some("5".into()),
                end: None,
            }
        );
        assert_eq!(parse_range("category_id::10").unwrap().end.as_deref(), Some("10"));
        assert!(parse_range("category_id::").is_err());
        assert!(parse_range("category_id:5").is_err());
    }

    #[test]
    fn test_parse_join() {
        let join =
            parse_join("inner:products:categories.category_id:$eq:products.category_id").unwrap();
        assert_eq!(join.kind, JoinKind::Inner);
        assert_eq!(join.table, "products");
        assert_eq!(join.local_field, "categories.category_id");
        assert_eq!(join.op, "$eq");
        assert_eq!(join.foreign_field, "products.category_id");

        assert!(parse_join("cross:products:a:$eq:b").is_err());
        assert!(parse_join("inner:products:a:$eq").is_err());
    }

    #[test]
    fn test_parse_aggregate() {
        assert_eq!(
            parse_aggregate("stddev:price").unwrap(),
            AggregateArg {
                func: AggregateFn::StdDev,
                field: "price".into(),
            }
        );
        assert!(parse_aggregate("median:price").is_err());
        assert!(parse_aggregate("sum:").is_err());
    }

    #[test]
    fn test_colored_plain_when_disabled() {
        COLOR.store(false, Ordering::Relaxed);
        assert_eq!(Colored(Color::Red, "error").to_string(), "error");
        COLOR.store(true, Ordering::Relaxed);
    }
}
