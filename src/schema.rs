//! Schema inspection by sampling.
//!
//! Neo4j has no declared schema, so the inspector derives one: it lists
//! labels and relationship types, then samples stored instances of each
//! to infer property names and value types. The result is a bounded,
//! deterministically-ordered JSON document suitable for feeding back to
//! a language model.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::{json, Map, Value as JsonValue};

use crate::config::Settings;
use crate::error::AppError;
use crate::graph::{ConnectionManager, CypherExecutor, Params, Routing};
use crate::shape::{shape, Payload, Shaped};

pub struct SchemaInspector {
    manager: Arc<ConnectionManager>,
    default_sample_size: u32,
    budget: Option<usize>,
}

impl SchemaInspector {
    pub fn new(manager: Arc<ConnectionManager>, settings: &Settings) -> Self {
        Self {
            manager,
            default_sample_size: settings.schema_sample_size,
            budget: settings.response_budget(),
        }
    }

    /// Builds the schema description, sampling up to `sample_size`
    /// instances per label and relationship type (zero or unset falls
    /// back to the configured default).
    ///
    /// Entries are ordered label-then-type, each group alphabetically,
    /// so repeated calls against an unchanged database yield identical
    /// output.
    pub async fn describe(&self, sample_size: Option<u32>) -> Result<Shaped, AppError> {
        let sample_size = match sample_size {
            None | Some(0) => self.default_sample_size,
            Some(n) => n,
        };
        let executor = self.manager.acquire().await?;

        let mut entries = Vec::new();

        for label in self.list_strings(&executor, LABELS_QUERY, "label").await? {
            let count = self.count_label(&executor, &label).await?;
            let properties = self.label_properties(&executor, &label, sample_size).await?;
            entries.push(json!({
                "kind": "node",
                "label": label,
                "count": count,
                "properties": properties,
            }));
        }

        for rel_type in self
            .list_strings(&executor, REL_TYPES_QUERY, "relationshipType")
            .await?
        {
            let (connections, properties) = self
                .relationship_shape(&executor, &rel_type, sample_size)
                .await?;
            entries.push(json!({
                "kind": "relationship",
                "type": rel_type,
                "connections": connections,
                "properties": properties,
            }));
        }

        tracing::debug!(entries = entries.len(), sample_size, "Schema described");

        let mut meta = Map::new();
        meta.insert("sample_size".to_string(), json!(sample_size));
        shape(&Payload { rows: entries, meta }, self.budget)
    }

    /// Runs a single-column query and returns its values sorted.
    async fn list_strings(
        &self,
        executor: &Arc<dyn CypherExecutor>,
        cypher: &str,
        column: &str,
    ) -> Result<Vec<String>, AppError> {
        let outcome = executor
            .execute(cypher, Params::new(), Routing::Read)
            .await?;
        let mut values = Vec::with_capacity(outcome.rows.len());
        for row in &outcome.rows {
            if let Some(value) = row.get_opt::<String>(column)? {
                values.push(value);
            }
        }
        values.sort();
        Ok(values)
    }

    async fn count_label(
        &self,
        executor: &Arc<dyn CypherExecutor>,
        label: &str,
    ) -> Result<u64, AppError> {
        let cypher = format!("MATCH (n:{}) RETURN count(n) AS count", quote_ident(label));
        let outcome = executor
            .execute(&cypher, Params::new(), Routing::Read)
            .await?;
        match outcome.rows.first() {
            Some(row) => Ok(row.get_opt::<u64>("count")?.unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Samples nodes of one label and merges observed property types.
    async fn label_properties(
        &self,
        executor: &Arc<dyn CypherExecutor>,
        label: &str,
        sample_size: u32,
    ) -> Result<JsonValue, AppError> {
        let cypher = format!(
            "MATCH (n:{}) WITH n LIMIT $sample_size RETURN properties(n) AS props",
            quote_ident(label)
        );
        let mut params = Params::new();
        params.insert("sample_size".to_string(), json!(sample_size));
        let outcome = executor.execute(&cypher, params, Routing::Read).await?;

        let mut merged: BTreeMap<String, BTreeSet<&'static str>> = BTreeMap::new();
        for row in &outcome.rows {
            if let Some(props) = row.get_opt::<Map<String, JsonValue>>("props")? {
                merge_properties(&mut merged, &props);
            }
        }
        Ok(render_properties(&merged))
    }

    /// Samples relationships of one type: distinct endpoint label pairs
    /// plus merged property types.
    async fn relationship_shape(
        &self,
        executor: &Arc<dyn CypherExecutor>,
        rel_type: &str,
        sample_size: u32,
    ) -> Result<(Vec<JsonValue>, JsonValue), AppError> {
        let cypher = format!(
            "MATCH (a)-[r:{}]->(b) \
             WITH labels(a) AS from_labels, labels(b) AS to_labels, properties(r) AS props \
             LIMIT $sample_size \
             RETURN from_labels, to_labels, props",
            quote_ident(rel_type)
        );
        let mut params = Params::new();
        params.insert("sample_size".to_string(), json!(sample_size));
        let outcome = executor.execute(&cypher, params, Routing::Read).await?;

        let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
        let mut merged: BTreeMap<String, BTreeSet<&'static str>> = BTreeMap::new();
        for row in &outcome.rows {
            let from = row.get_opt::<Vec<String>>("from_labels")?.unwrap_or_default();
            let to = row.get_opt::<Vec<String>>("to_labels")?.unwrap_or_default();
            // Multi-label endpoints render as one colon-joined name.
            pairs.insert((from.join(":"), to.join(":")));
            if let Some(props) = row.get_opt::<Map<String, JsonValue>>("props")? {
                merge_properties(&mut merged, &props);
            }
        }

        let connections = pairs
            .into_iter()
            .map(|(from, to)| json!({"from": from, "to": to}))
            .collect();
        Ok((connections, render_properties(&merged)))
    }
}

const LABELS_QUERY: &str = "CALL db.labels() YIELD label RETURN label";
const REL_TYPES_QUERY: &str =
    "CALL db.relationshipTypes() YIELD relationshipType RETURN relationshipType";

/// Quotes an identifier for safe interpolation into Cypher. Backticks
/// inside the name are doubled, per the Cypher escaping rule.
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn merge_properties(
    merged: &mut BTreeMap<String, BTreeSet<&'static str>>,
    props: &Map<String, JsonValue>,
) {
    for (key, value) in props {
        merged
            .entry(key.clone())
            .or_default()
            .insert(value_type_name(value));
    }
}

/// The driver decodes property values to JSON before we see them, so
/// type names are inferred from the JSON shape. Neo4j integers and
/// floats stay distinct because the decoder preserves the distinction.
fn value_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "NULL",
        JsonValue::Bool(_) => "BOOLEAN",
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => "INTEGER",
        JsonValue::Number(_) => "FLOAT",
        JsonValue::String(_) => "STRING",
        JsonValue::Array(_) => "LIST",
        JsonValue::Object(_) => "MAP",
    }
}

/// Renders `{property: "TYPE"}`, joining multiple observed types with
/// `" | "` in a fixed alphabetical order.
fn render_properties(merged: &BTreeMap<String, BTreeSet<&'static str>>) -> JsonValue {
    let mut out = Map::new();
    for (key, types) in merged {
        let rendered = types.iter().copied().collect::<Vec<_>>().join(" | ");
        out.insert(key.clone(), JsonValue::String(rendered));
    }
    JsonValue::Object(out)
}
