//! `MetadataSource` backed by the scylla driver.

use super::{
    cql_value_to_text, Category, DetailRow, EntityPath, KeyspaceMetadata, MetadataSource, UserType,
};
use crate::config::ConnectionConfig;
use crate::error::{CqlTuiError, DriverError, Result};
use ::scylla::{QueryResult, Session, SessionBuilder};
use async_trait::async_trait;
use tracing::{debug, info};

/// Live session against a cluster, bound to one keyspace.
pub struct ScyllaSource {
    session: Session,
    keyspace: String,
    row_limit: u32,
}

impl ScyllaSource {
    /// Open a session and resolve the keyspace to explore.
    ///
    /// Credentials are applied only when both username and password are set.
    pub async fn connect(conn: &ConnectionConfig, row_limit: u32) -> Result<Self> {
        info!(addresses = ?conn.addresses, "opening session");
        let mut builder = SessionBuilder::new().known_nodes(&conn.addresses);
        if let Some((user, pass)) = conn.credentials() {
            debug!(%user, "using password authentication");
            builder = builder.user(user, pass);
        }
        let session = builder
            .build()
            .await
            .map_err(CqlTuiError::connection_from)?;

        let keyspace = match conn.keyspace.as_deref().filter(|k| !k.is_empty()) {
            Some(ks) => ks.to_string(),
            None => resolve_keyspace(&session).await?,
        };
        info!(%keyspace, "session ready");

        Ok(Self {
            session,
            keyspace,
            row_limit: row_limit.max(1),
        })
    }

    async fn names(&self, cql: &str) -> std::result::Result<Vec<String>, DriverError> {
        let result = self
            .session
            .query_unpaged(cql, (self.keyspace.clone(),))
            .await?;
        let mut names = Vec::new();
        for row in result.rows_typed::<(String,)>()? {
            let (name,) = row?;
            names.push(name);
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn user_types(&self) -> std::result::Result<Vec<UserType>, DriverError> {
        let result = self
            .session
            .query_unpaged(
                "SELECT type_name, field_names FROM system_schema.types WHERE keyspace_name = ?",
                (self.keyspace.clone(),),
            )
            .await?;
        let mut types = Vec::new();
        for row in result.rows_typed::<(String, Option<Vec<String>>)>()? {
            let (name, fields) = row?;
            types.push(UserType {
                name,
                fields: fields.unwrap_or_default(),
            });
        }
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn snapshot(&self) -> std::result::Result<KeyspaceMetadata, DriverError> {
        Ok(KeyspaceMetadata {
            keyspace: self.keyspace.clone(),
            tables: self
                .names("SELECT table_name FROM system_schema.tables WHERE keyspace_name = ?")
                .await?,
            functions: self
                .names("SELECT function_name FROM system_schema.functions WHERE keyspace_name = ?")
                .await?,
            aggregates: self
                .names(
                    "SELECT aggregate_name FROM system_schema.aggregates WHERE keyspace_name = ?",
                )
                .await?,
            materialized_views: self
                .names("SELECT view_name FROM system_schema.views WHERE keyspace_name = ?")
                .await?,
            user_types: self.user_types().await?,
        })
    }

    async fn rows(&self, entity: &EntityPath) -> std::result::Result<Vec<DetailRow>, DriverError> {
        let result = match entity.category {
            Category::Tables | Category::Views => {
                let cql = format!(
                    "SELECT * FROM {}.{} LIMIT {}",
                    quote_ident(&self.keyspace),
                    quote_ident(&entity.name),
                    self.row_limit
                );
                self.session.query_unpaged(cql, ()).await
            }
            Category::Functions | Category::Aggregates | Category::UserTypes => {
                let cql = schema_row_query(entity.category);
                self.session
                    .query_unpaged(cql, (self.keyspace.clone(), entity.name.clone()))
                    .await
            }
        }?;

        Ok(result_to_rows(result))
    }
}

#[async_trait]
impl MetadataSource for ScyllaSource {
    fn keyspace(&self) -> &str {
        &self.keyspace
    }

    async fn fetch_keyspace_metadata(&self) -> Result<KeyspaceMetadata> {
        debug!(keyspace = %self.keyspace, "fetching keyspace metadata");
        self.snapshot()
            .await
            .map_err(|e| CqlTuiError::metadata_from(&self.keyspace, e))
    }

    async fn fetch_rows(&self, entity: &EntityPath) -> Result<Vec<DetailRow>> {
        debug!(%entity, "fetching rows");
        self.rows(entity)
            .await
            .map_err(|e| CqlTuiError::details_from(entity, e))
    }
}

/// Pick the first non-system keyspace when none was requested.
async fn resolve_keyspace(session: &Session) -> Result<String> {
    let result = session
        .query_unpaged("SELECT keyspace_name FROM system_schema.keyspaces", ())
        .await
        .map_err(CqlTuiError::connection_from)?;
    let mut names = Vec::new();
    for row in result
        .rows_typed::<(String,)>()
        .map_err(CqlTuiError::connection_from)?
    {
        let (name,) = row.map_err(CqlTuiError::connection_from)?;
        names.push(name);
    }
    pick_user_keyspace(names)
        .ok_or_else(|| CqlTuiError::connection("no user keyspace found; pass --keyspace"))
}

fn pick_user_keyspace(mut names: Vec<String>) -> Option<String> {
    names.sort();
    names.into_iter().find(|n| !n.starts_with("system"))
}

fn schema_row_query(category: Category) -> &'static str {
    match category {
        Category::Functions => {
            "SELECT * FROM system_schema.functions WHERE keyspace_name = ? AND function_name = ?"
        }
        Category::Aggregates => {
            "SELECT * FROM system_schema.aggregates WHERE keyspace_name = ? AND aggregate_name = ?"
        }
        _ => "SELECT * FROM system_schema.types WHERE keyspace_name = ? AND type_name = ?",
    }
}

/// Double-quote a CQL identifier, escaping embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Flatten a result set into (name, text) pairs.
///
/// A single row uses bare column names; several rows prefix each name with `[i]`.
fn result_to_rows(result: QueryResult) -> Vec<DetailRow> {
    let specs = result.col_specs().to_owned();
    let rows = result.rows_or_empty();
    let many = rows.len() > 1;
    let mut out = Vec::with_capacity(rows.len() * specs.len());
    for (i, row) in rows.iter().enumerate() {
        for (spec, value) in specs.iter().zip(row.columns.iter()) {
            out.push(DetailRow::new(
                column_label(many, i, &spec.name),
                value
                    .as_ref()
                    .map_or_else(|| "null".to_string(), cql_value_to_text),
            ));
        }
    }
    out
}

fn column_label(many: bool, index: usize, column: &str) -> String {
    if many {
        format!("[{index}] {column}")
    } else {
        column.to_string()
    }
}
