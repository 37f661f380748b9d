use std::io::Read;

use prest_client::{Client, QueryBuilder};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    cli::{Commands, QueryArgs},
    error::{CliError, CliResult},
};

/// Reads a JSON document from `data`, or from stdin when it is `-`.
pub fn read_data(data: &str) -> CliResult<Value> {
    if data == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|source| {
                CliError::Io {
                    action: "reading request body from stdin".to_string(),
                    source,
                }
            })?;
        parse_data(&buffer)
    } else {
        parse_data(data)
    }
}

fn parse_data(data: &str) -> CliResult<Value> {
    serde_json::from_str(data).map_err(CliError::InvalidData)
}

pub fn apply_query(query: QueryBuilder, args: QueryArgs) -> QueryBuilder {
    let mut query = query;

    if let Some(page) = args.page {
        query = query.page(page);
    }
    if let Some(size) = args.page_size {
        query = query.page_size(size);
    }
    if !args.select.is_empty() {
        query = query.select(args.select);
    }
    if let Some(field) = args.count {
        query = query.count(field);
    }
    if args.distinct {
        query = query.distinct(true);
    }
    if let Some(renderer) = args.renderer {
        query = query.renderer(renderer);
    }
    if !args.order.is_empty() {
        query = query.order(args.order);
    }
    if !args.group_by.is_empty() {
        query = query.group_by(args.group_by);
    }
    for filter in args.equal {
        query = query.filter_equal(filter.field, filter.value);
    }
    for filter in args.filter {
        query = query.filter(filter.field, filter.op, filter.value);
    }
    for range in args.range {
        query = query.filter_range(range.field, range.start, range.end);
    }
    for field in args.null {
        query = query.filter_null(field);
    }
    for field in args.not_null {
        query = query.filter_not_null(field);
    }
    for join in args.join {
        query = query.join(
            join.kind,
            join.table,
            join.local_field,
            join.op,
            join.foreign_field,
        );
    }
    for agg in args.aggregate {
        query = query.aggregate(agg.func, agg.field);
    }

    query
}

/// Builds the request for `command`, then prints it (dry run) or sends it
/// and prints the response.
pub fn run_command(client: &Client, command: Commands) -> CliResult<()> {
    let (query, args) = match command {
        Commands::List {
            table,
            query,
        } => (client.table(&table)?.list(), query),
        Commands::Show {
            table,
            query,
        } => (client.table(&table)?.show(), query),
        Commands::Insert {
            table,
            data,
            query,
        } => {
            let row = read_data(&data)?;
            (client.table(&table)?.insert(&row)?, query)
        }
        Commands::BatchInsert {
            table,
            data,
            query,
        } => {
            let Value::Array(rows) = read_data(&data)? else {
                return Err(CliError::InvalidInput(
                    "batch-insert expects a JSON array of rows".to_string(),
                ));
            };
            (client.table(&table)?.batch_insert(&rows)?, query)
        }
        Commands::Update {
            table,
            data,
            query,
        } => {
            let changes = read_data(&data)?;
            (client.table(&table)?.update(&changes)?, query)
        }
        Commands::Delete {
            table,
            query,
        } => (client.table(&table)?.delete(), query),
    };

    let dry_run = args.dry_run;
    let query = apply_query(query, args);

    if dry_run {
        info!("{} {}", query.method(), query.url());
        if let Some(body) = query.body() {
            info!("{body}");
        }
        return Ok(());
    }

    debug!("sending {} {}", query.method(), query.url());
    let output = query.execute()?;
    println!("{output}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use prest_client::{AggregateFn, FilterOp, JoinKind, Method, Renderer};
    use serde_json::json;

    use super::*;
    use crate::utils::{AggregateArg, EqualFilter, JoinArg, OperatorFilter, RangeFilter};

    const BASE: &str = "http://localhost:3000/db/public/categories";

    #[test]
    fn test_apply_query_empty() {
        let query = apply_query(QueryBuilder::new(BASE, Method::Get), QueryArgs::default());
        assert_eq!(query.url(), BASE);
    }

    #[test]
    fn test_apply_query_fixed_order() {
        let args = QueryArgs {
            page: Some(2),
            page_size: Some(10),
            select: vec!["id".into(), "name".into()],
            renderer: Some(Renderer::Xml),
            order: vec!["-id".into()],
            equal: vec![EqualFilter {
                field: "name".into(),
                value: "a b".into(),
            }],
            filter: vec![OperatorFilter {
                field: "price".into(),
                op: FilterOp::Gt,
                value: "10".into(),
            }],
            range: vec![RangeFilter {
                field: "id".into(),
                start: Some("1".into()),
                end: None,
            }],
            null: vec!["deleted_at".into()],
            join: vec![JoinArg {
                kind: JoinKind::Left,
                table: "products".into(),
                local_field: "categories.id".into(),
                op: "$eq".into(),
                foreign_field: "products.category_id".into(),
            }],
            aggregate: vec![AggregateArg {
                func: AggregateFn::Max,
                field: "price".into(),
            }],
            ..QueryArgs::default()
        };

        let query = apply_query(QueryBuilder::new(BASE, Method::Get), args);

        assert_eq!(query.output_format(), Renderer::Xml);
        assert_eq!(
            query.url(),
            format!(
                "{BASE}?_page=2&_page_size=10&_select=id%2Cname&_renderer=xml&_order=-id\
                 &name=a%20b&price=$gt.10&id=$gte.1&deleted_at=$null\
                 &_join=left:products:categories.id:$eq:products.category_id\
                 &_select=max:price"
            )
        );
    }

    #[test]
    fn test_parse_data() {
        assert_eq!(
            parse_data(r#"{"category_name":"Cricketer"}"#).unwrap(),
            json!({"category_name": "Cricketer"})
        );
        assert!(matches!(
            parse_data("{not json").unwrap_err(),
            CliError::InvalidData(_)
        ));
    }

    #[test]
    fn test_read_data_inline() {
        assert_eq!(read_data("[1, 2]").unwrap(), json!([1, 2]));
    }
}
