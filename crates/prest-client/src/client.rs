use std::{fmt, sync::Arc};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::ClientOptions,
    error::{PrestError, Result},
    method::Method,
    query::{builder::Dispatcher, QueryBuilder},
    table::TableRef,
    transport::{Transport, TransportConfig, UreqTransport},
};

/// `Basic base64(user:password)`
pub fn basic_auth(user_name: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user_name}:{password}")))
}

/// Entry point to a pREST gateway.
///
/// Construction validates the options and builds the authorization header
/// once; the returned client is ready to use. Cloning is cheap and clones
/// share the transport.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    database: String,
    dispatcher: Dispatcher,
}

impl Client {
    /// Creates a client using the default `ureq` transport.
    pub fn new(options: ClientOptions) -> Result<Self> {
        Self::with_transport(options, UreqTransport::default())
    }

    /// Creates a client whose default transport uses `config`.
    pub fn with_config(options: ClientOptions, config: &TransportConfig) -> Result<Self> {
        Self::with_transport(options, UreqTransport::new(config))
    }

    pub fn with_transport<T: Transport + 'static>(options: ClientOptions, transport: T) -> Result<Self> {
        Self::with_shared_transport(options, Arc::new(transport))
    }

    pub fn with_shared_transport(
        options: ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        options.validate()?;

        let base_url = options.base_url.trim_end_matches('/').to_string();
        debug!(%base_url, database = %options.database, "client ready");

        Ok(Self {
            base_url,
            database: options.database,
            dispatcher: Dispatcher {
                transport,
                authorization: Arc::from(basic_auth(&options.user_name, &options.password)),
            },
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Addresses a table, `"table"` or `"schema.table"`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use prest_client::{Client, ClientOptions};
    ///
    /// let client = Client::new(ClientOptions::from_env())?;
    ///
    /// // GET /{database}/public/categories?category_name=Footballer
    /// let rows = client
    ///     .table("categories")?
    ///     .list()
    ///     .filter_equal("category_name", "Footballer")
    ///     .execute()?;
    ///
    /// // GET /{database}/public lists the tables of the schema
    /// let tables = client.table("public.")?.list().execute()?;
    /// # Ok::<(), prest_client::PrestError>(())
    /// ```
    pub fn table(&self, identifier: &str) -> Result<Table<'_>> {
        Ok(Table {
            client: self,
            table: TableRef::resolve(identifier)?,
        })
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

/// Operations on one table. Each call returns a fresh [`QueryBuilder`].
#[derive(Debug, Clone)]
pub struct Table<'a> {
    client: &'a Client,
    table: TableRef,
}

impl Table<'_> {
    pub fn table_ref(&self) -> &TableRef {
        &self.table
    }

    pub fn schema(&self) -> &str {
        self.table.schema()
    }

    pub fn name(&self) -> &str {
        self.table.table()
    }

    fn query(&self, prefix: Option<&str>, method: Method, body: Option<Value>) -> QueryBuilder {
        let url = format!(
            "{}{}",
            self.client.base_url,
            self.table.path(prefix, &self.client.database)
        );
        QueryBuilder::dispatched(url, method, body, self.client.dispatcher.clone())
    }

    /// `GET /{database}/{schema}/{table}`
    pub fn list(&self) -> QueryBuilder {
        self.query(None, Method::Get, None)
    }

    /// `GET /show/{database}/{schema}/{table}`, the table structure.
    pub fn show(&self) -> QueryBuilder {
        self.query(Some("show"), Method::Get, None)
    }

    /// `POST /{database}/{schema}/{table}` with `row` as JSON.
    pub fn insert<T: Serialize + ?Sized>(&self, row: &T) -> Result<QueryBuilder> {
        Ok(self.query(None, Method::Post, Some(to_body(row)?)))
    }

    /// `POST /batch/{database}/{schema}/{table}` with `rows` as a JSON array.
    pub fn batch_insert<T: Serialize>(&self, rows: &[T]) -> Result<QueryBuilder> {
        Ok(self.query(Some("batch"), Method::Post, Some(to_body(rows)?)))
    }

    /// `PUT /{database}/{schema}/{table}`; narrow it down with filters.
    pub fn update<T: Serialize + ?Sized>(&self, changes: &T) -> Result<QueryBuilder> {
        Ok(self.query(None, Method::Put, Some(to_body(changes)?)))
    }

    /// `DELETE /{database}/{schema}/{table}`; narrow it down with filters.
    pub fn delete(&self) -> QueryBuilder {
        self.query(None, Method::Delete, None)
    }
}

fn to_body<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| PrestError::InvalidArgument(format!("request body is not serializable: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{query::QueryOutput, test_utils::StubTransport};

    fn client(stub: &Arc<StubTransport>) -> Client {
        Client::with_shared_transport(
            ClientOptions::new("http://localhost:3000/", "user", "pass", "db"),
            stub.clone(),
        )
        .unwrap()
    }

    #[test]
    fn test_basic_auth() {
        assert_eq!(basic_auth("user", "pass"), "Basic dXNlcjpwYXNz");
        assert_eq!(basic_auth("", ""), "Basic Og==");
    }

    #[test]
    fn test_new_rejects_missing_database() {
        let stub = StubTransport::ok("[]");
        let err = Client::with_shared_transport(
            ClientOptions::new("http://localhost:3000", "u", "p", ""),
            stub,
        )
        .unwrap_err();
        assert!(matches!(err, PrestError::InvalidArgument(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let stub = StubTransport::ok("[]");
        let client = client(&stub);
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.database(), "db");
    }

    #[test]
    fn test_table_rejects_empty_identifier() {
        let stub = StubTransport::ok("[]");
        let err = client(&stub).table("").unwrap_err();
        assert!(matches!(err, PrestError::InvalidArgument(_)));
    }

    #[test]
    fn test_entry_point_paths_and_methods() {
        let stub = StubTransport::ok("[]");
        let client = client(&stub);
        let table = client.table("shop.products").unwrap();
        let row = json!({"name": "pen"});

        let cases = [
            (table.list(), Method::Get, "http://localhost:3000/db/shop/products"),
            (table.show(), Method::Get, "http://localhost:3000/show/db/shop/products"),
            (
                table.insert(&row).unwrap(),
                Method::Post,
                "http://localhost:3000/db/shop/products",
            ),
            (
                table.batch_insert(&[row.clone(), row.clone()]).unwrap(),
                Method::Post,
                "http://localhost:3000/batch/db/shop/products",
            ),
            (
                table.update(&row).unwrap(),
                Method::Put,
                "http://localhost:3000/db/shop/products",
            ),
            (table.delete(), Method::Delete, "http://localhost:3000/db/shop/products"),
        ];

        for (query, method, url) in cases {
            assert_eq!(query.method(), method);
            assert_eq!(query.url(), url);
        }
    }

    #[test]
    fn test_table_accessors() {
        let stub = StubTransport::ok("[]");
        let client = client(&stub);
        let table = client.table("products").unwrap();
        assert_eq!(table.schema(), "public");
        assert_eq!(table.name(), "products");
        assert_eq!(table.table_ref().to_string(), "public.products");
    }

    #[test]
    fn test_schema_wide_list() {
        let stub = StubTransport::ok(r#"[{"name":"categories"}]"#);
        let client = client(&stub);
        client.table("public.").unwrap().list().execute().unwrap();
        assert_eq!(stub.requests()[0].url, "http://localhost:3000/db/public");
    }

    #[test]
    fn test_insert_carries_body() {
        let stub = StubTransport::status(201, "Created", r#"{"category_id":69}"#);
        let client = client(&stub);
        let row = json!({"category_id": 69, "category_name": "Cricketer"});

        let output = client
            .table("categories")
            .unwrap()
            .insert(&row)
            .unwrap()
            .execute()
            .unwrap();

        assert_eq!(output, QueryOutput::Json(json!({"category_id": 69})));
        let request = &stub.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, Some(row));
        assert_eq!(request.authorization.as_deref(), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn test_batch_insert_body_is_array() {
        #[derive(Serialize)]
        struct Category<'a> {
            category_name: &'a str,
        }

        let stub = StubTransport::ok("[]");
        let client = client(&stub);
        client
            .table("categories")
            .unwrap()
            .batch_insert(&[
                Category {
                    category_name: "A",
                },
                Category {
                    category_name: "B",
                },
            ])
            .unwrap()
            .execute()
            .unwrap();

        assert_eq!(
            stub.requests()[0].body,
            Some(json!([{"category_name": "A"}, {"category_name": "B"}]))
        );
    }

    #[test]
    fn test_update_with_filter() {
        let stub = StubTransport::ok("{}");
        let client = client(&stub);
        client
            .table("categories")
            .unwrap()
            .update(&json!({"description": "Updated"}))
            .unwrap()
            .filter_equal("category_id", 12311)
            .execute()
            .unwrap();

        let request = &stub.requests()[0];
        assert_eq!(request.method, Method::Put);
        assert_eq!(
            request.url,
            "http://localhost:3000/db/public/categories?category_id=12311"
        );
    }

    #[test]
    fn test_concurrent_queries_share_client() {
        let stub = StubTransport::ok("[]");
        let client = client(&stub);

        std::thread::scope(|scope| {
            for page in 0..4u64 {
                let client = client.clone();
                scope.spawn(move || {
                    client
                        .table("categories")
                        .unwrap()
                        .list()
                        .page(page)
                        .execute()
                        .unwrap();
                });
            }
        });

        let mut urls = stub
            .requests()
            .into_iter()
            .map(|r| r.url)
            .collect::<Vec<_>>();
        urls.sort();
        assert_eq!(urls.len(), 4);
        assert_eq!(urls[0], "http://localhost:3000/db/public/categories?_page=0");
    }

    #[test]
    fn test_debug_hides_credentials() {
        let stub = StubTransport::ok("[]");
        let debug = format!("{:?}", client(&stub));
        assert!(!debug.contains("dXNlcjpwYXNz"));
    }
}
