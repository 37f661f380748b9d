//! The chainable query builder.

use std::{fmt, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    encoding::encode_component,
    error::{PrestError, Result},
    method::Method,
    query::{
        clause::{Aggregate, AggregateFn, Clause, FilterOp, JoinKind, Renderer},
        output::QueryOutput,
    },
    transport::{HttpRequest, Transport},
};

/// Transport and credentials a builder needs to execute.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) authorization: Arc<str>,
}

/// Accumulates clauses for one request against one resource path.
///
/// Obtained from a [`Table`](crate::Table) entry point, chained, and
/// consumed by [`QueryBuilder::execute`].
///
/// # Example
///
/// ```no_run
/// use prest_client::{Client, ClientOptions};
///
/// let client = Client::new(ClientOptions::new(
///     "http://localhost:3000",
///     "prest",
///     "prest",
///     "prest",
/// ))?;
///
/// let rows = client
///     .table("categories")?
///     .list()
///     .page(1)
///     .page_size(10)
///     .order(["-category_id"])
///     .execute()?;
/// # Ok::<(), prest_client::PrestError>(())
/// ```
pub struct QueryBuilder {
    base_url: String,
    method: Method,
    body: Option<Value>,
    renderer: Renderer,
    clauses: Vec<Clause>,
    aggregates: Vec<Aggregate>,
    dispatcher: Option<Dispatcher>,
}

impl QueryBuilder {
    /// Creates a builder that is not attached to any client.
    ///
    /// It renders URLs like any other builder, but executing it fails with
    /// [`PrestError::NotInitialized`].
    pub fn new(base_url: impl Into<String>, method: Method) -> Self {
        Self {
            base_url: base_url.into(),
            method,
            body: None,
            renderer: Renderer::default(),
            clauses: vec![],
            aggregates: vec![],
            dispatcher: None,
        }
    }

    pub(crate) fn dispatched(
        base_url: String,
        method: Method,
        body: Option<Value>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            body,
            dispatcher: Some(dispatcher),
            ..Self::new(base_url, method)
        }
    }

    /// Sets the JSON payload sent with POST and PUT requests.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn push(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Page number to retrieve (`_page`).
    pub fn page(self, page: u64) -> Self {
        self.push(Clause::Page(page))
    }

    /// Number of rows per page (`_page_size`).
    pub fn page_size(self, size: u64) -> Self {
        self.push(Clause::PageSize(size))
    }

    /// Restricts the returned fields (`_select`).
    pub fn select<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Clause::Select(collect_fields(fields)))
    }

    /// Counts the rows of `field` (`_count`).
    pub fn count(self, field: impl Into<String>) -> Self {
        self.push(Clause::Count(field.into()))
    }

    /// Counts all rows (`_count=*`).
    pub fn count_all(self) -> Self {
        self.count("*")
    }

    pub fn count_first(self, count_first: bool) -> Self {
        self.push(Clause::CountFirst(count_first))
    }

    /// Sets the response format and how the body is decoded on execution.
    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self.push(Clause::Renderer(renderer))
    }

    pub fn distinct(self, distinct: bool) -> Self {
        self.push(Clause::Distinct(distinct))
    }

    /// Orders by the given fields; a `-` prefix sorts descending. Earlier
    /// fields take priority.
    pub fn order<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Clause::Order(collect_fields(fields)))
    }

    pub fn group_by<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Clause::GroupBy(collect_fields(fields)))
    }

    /// `field=value`
    pub fn filter_equal(self, field: impl Into<String>, value: impl fmt::Display) -> Self {
        self.push(Clause::equal(field, value))
    }

    /// `field=$op.value` for any supported operator.
    pub fn filter(self, field: impl Into<String>, op: FilterOp, value: impl fmt::Display) -> Self {
        self.push(Clause::operator(field, op, value))
    }

    /// Inclusive range filter. Emits a `$gte` fragment for `start` and a
    /// `$lte` fragment for `end`, in that order; with neither bound the
    /// builder is returned unchanged.
    pub fn filter_range<T: fmt::Display>(
        self,
        field: impl Into<String>,
        start: Option<T>,
        end: Option<T>,
    ) -> Self {
        let field = field.into();
        let mut query = self;
        if let Some(start) = start {
            query = query.push(Clause::operator(field.clone(), FilterOp::Gte, start));
        }
        if let Some(end) = end {
            query = query.push(Clause::operator(field, FilterOp::Lte, end));
        }
        query
    }

    /// `field=$in.v1,v2,...`
    pub fn filter_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        let value = values
            .into_iter()
            .map(encode_component)
            .collect::<Vec<_>>()
            .join(",");
        self.push(Clause::Operator {
            field: field.into(),
            op: FilterOp::In,
            value,
        })
    }

    /// `field=$null`
    pub fn filter_null(self, field: impl Into<String>) -> Self {
        self.push(Clause::Null {
            field: field.into(),
            negated: false,
        })
    }

    /// `field=$notnull`
    pub fn filter_not_null(self, field: impl Into<String>) -> Self {
        self.push(Clause::Null {
            field: field.into(),
            negated: true,
        })
    }

    /// Joins another table (`_join=kind:table:local:op:foreign`).
    pub fn join(
        self,
        kind: JoinKind,
        table: impl Into<String>,
        local_field: impl Into<String>,
        op: impl Into<String>,
        foreign_field: impl Into<String>,
    ) -> Self {
        self.push(Clause::Join {
            kind,
            table: table.into(),
            local_field: local_field.into(),
            op: op.into(),
            foreign_field: foreign_field.into(),
        })
    }

    /// Filters on a key of a JSONB column (`field->>json_field:jsonb=value`).
    pub fn jsonb_filter(
        self,
        field: impl Into<String>,
        json_field: impl Into<String>,
        value: impl fmt::Display,
    ) -> Self {
        self.push(Clause::Jsonb {
            field: field.into(),
            json_field: json_field.into(),
            value: encode_component(value),
        })
    }

    /// Full-text search with tsquery syntax, optionally in a given language.
    pub fn text_search(
        self,
        field: impl Into<String>,
        query: impl fmt::Display,
        language: Option<&str>,
    ) -> Self {
        self.push(Clause::TextSearch {
            field: field.into(),
            language: language.map(str::to_string),
            query: encode_component(query),
        })
    }

    /// `having:fn:field:condition:value`
    pub fn having(
        self,
        func: AggregateFn,
        field: impl Into<String>,
        condition: impl Into<String>,
        value: impl fmt::Display,
    ) -> Self {
        self.push(Clause::Having {
            func,
            field: field.into(),
            condition: condition.into(),
            value: encode_component(value),
        })
    }

    /// Adds `func:field` to the trailing aggregate `_select`.
    pub fn aggregate(mut self, func: AggregateFn, field: impl Into<String>) -> Self {
        self.aggregates.push(Aggregate {
            func,
            field: field.into(),
        });
        self
    }

    pub fn sum(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateFn::Sum, field)
    }

    pub fn avg(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateFn::Avg, field)
    }

    pub fn max(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateFn::Max, field)
    }

    pub fn min(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateFn::Min, field)
    }

    pub fn std_dev(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateFn::StdDev, field)
    }

    pub fn variance(self, field: impl Into<String>) -> Self {
        self.aggregate(AggregateFn::Variance, field)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn output_format(&self) -> Renderer {
        self.renderer
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn aggregates(&self) -> &[Aggregate] {
        &self.aggregates
    }

    /// Renders the request URL: the base path, then every clause fragment in
    /// call order, then the aggregate `_select` if any aggregates were added.
    pub fn url(&self) -> String {
        let mut url = self.base_url.clone();
        let mut separator = '?';

        for clause in &self.clauses {
            url.push(separator);
            url.push_str(&clause.fragment());
            separator = '&';
        }

        if !self.aggregates.is_empty() {
            let functions = self
                .aggregates
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            url.push(separator);
            url.push_str("_select=");
            url.push_str(&functions.join(","));
        }

        url
    }

    /// Sends the request and decodes the response.
    ///
    /// The builder is consumed; a query runs exactly once and is never
    /// retried.
    pub fn execute(self) -> Result<QueryOutput> {
        let url = self.url();
        let QueryBuilder {
            method,
            body,
            renderer,
            dispatcher,
            ..
        } = self;

        let dispatcher = dispatcher.ok_or_else(|| {
            PrestError::NotInitialized(format!(
                "no transport configured for {method} {url}"
            ))
        })?;

        debug!(%method, %url, "executing query");

        let request = HttpRequest {
            method,
            url,
            authorization: Some(dispatcher.authorization.to_string()),
            body: if method.has_body() { body } else { None },
        };

        let response = dispatcher.transport.send(&request)?;

        if !response.is_success() {
            warn!(
                status = response.status,
                url = %request.url,
                "request failed: {}",
                response.status_text
            );
            return Err(PrestError::RequestFailed {
                message: response.status_text,
                status: Some(response.status),
            });
        }

        QueryOutput::decode(renderer, response.body)
    }

    /// Executes the query and deserializes the JSON output into `T`.
    pub fn fetch<T: DeserializeOwned>(self) -> Result<T> {
        self.execute()?.deserialize()
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("method", &self.method)
            .field("url", &self.url())
            .field("body", &self.body)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

fn collect_fields<I, S>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fields.into_iter().map(Into::into).collect()
}
