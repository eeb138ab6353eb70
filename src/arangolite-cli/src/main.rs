use anyhow::Result;
use arangolite_rs::*;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

mod telemetry;

const DEMO_DATABASE: &str = "arangolite_demo";
const GRAPH: &str = "social";

#[derive(Debug, Deserialize)]
struct Person {
    #[serde(rename = "_key")]
    key: String,
    name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = telemetry::init_telemetry(Path::new("./logs"))?;

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&config_path).unwrap_or_else(|_| {
        tracing::warn!("Failed to load {}, using defaults", config_path);
        Config::default()
    });

    tracing::info!("arangolite starting");
    tracing::info!("  Server URL: {}", config.url);
    tracing::info!("  Default database: {}", config.database_name);
    tracing::info!("  Authenticated: {}", config.credentials().is_some());

    let client = Client::new(config)?;
    let version = client.version().await?;
    tracing::info!("Connected to {} {}", version.server, version.version);

    let databases = client.list_databases().await?;
    tracing::info!("databases={:?}", databases);

    if !databases.iter().any(|db| db == DEMO_DATABASE) {
        client
            .create_database(&CreateDatabaseOptions {
                name: DEMO_DATABASE.to_string(),
                users: Vec::new(),
            })
            .await?;
    }

    let outcome = run(&client).await;

    // Cleanup runs whether or not the walk succeeded
    if let Err(e) = client.drop_database(DEMO_DATABASE).await {
        tracing::error!("cleanup failed: {}", e);
    }

    outcome
}

async fn run(client: &Client) -> Result<()> {
    let db = DEMO_DATABASE;

    client
        .create_collection(
            db,
            &CreateCollectionOptions {
                name: "notes".to_string(),
                ..CreateCollectionOptions::default()
            },
        )
        .await?;
    let collections = client.list_collections(db, true).await?;
    tracing::info!("collections={:?}", collections.iter().map(|c| &c.name).collect::<Vec<_>>());

    // Documents with optimistic concurrency
    let created = client
        .create_document(db, "notes", &json!({"text": "hello"}), None)
        .await?;
    tracing::info!("created document {} rev={}", created.id, created.rev);

    let rev = client.document_revision(db, "notes", &created.key, None).await?;
    tracing::info!("HEAD revision={:?}", rev);

    let updated = client
        .update_document(
            db,
            "notes",
            &created.key,
            &json!({"text": "hello again"}),
            Some(&UpdateDocumentOptions {
                if_match: Some(created.rev.clone()),
                ..UpdateDocumentOptions::default()
            }),
        )
        .await?;
    tracing::info!("updated rev {} -> {}", created.rev, updated.rev);

    let stale = client
        .delete_document(
            db,
            "notes",
            &created.key,
            Some(&DeleteDocumentOptions {
                if_match: Some(created.rev.clone()),
                ..DeleteDocumentOptions::default()
            }),
        )
        .await;
    match stale {
        Err(e) => tracing::info!("stale delete rejected as expected: status={} errorNum={:?}", e.status(), e.error_num()),
        Ok(_) => tracing::warn!("stale delete unexpectedly succeeded"),
    }
    client.delete_document(db, "notes", &created.key, None).await?;

    // Graph, vertices and edges
    let (graph, _) = client
        .create_graph(
            db,
            &CreateGraphOptions {
                name: GRAPH.to_string(),
                edge_definitions: vec![EdgeDefinition {
                    collection: "knows".to_string(),
                    from: vec!["people".to_string()],
                    to: vec!["people".to_string()],
                }],
                orphan_collections: Vec::new(),
            },
        )
        .await?;
    tracing::info!("created graph {}", graph.name);

    for (key, name) in [("ann", "Ann"), ("bob", "Bob")] {
        client
            .create_vertex(db, GRAPH, "people", &json!({"_key": key, "name": name}), None)
            .await?;
    }

    let (person, _) = client
        .get_vertex::<Person>(db, GRAPH, "people", "ann", None)
        .await?;
    if let Some(person) = person {
        tracing::info!("vertex {} is {}", person.key, person.name);
    }

    let (edge, _) = client
        .create_edge(
            db,
            GRAPH,
            "knows",
            &json!({"_from": "people/ann", "_to": "people/bob", "since": 2020}),
            Some(&CreateEdgeOptions {
                wait_for_sync: Some(true),
            }),
        )
        .await?;

    let (modified, _) = client
        .modify_edge(db, GRAPH, "knows", &edge.key, &json!({"since": 2021}), None)
        .await?;
    let (current, _) = client
        .get_edge::<serde_json::Value>(db, GRAPH, "knows", &edge.key, None)
        .await?;
    tracing::info!("edge rev={} body={:?}", modified.rev, current);

    client.remove_edge(db, GRAPH, "knows", &edge.key, None).await?;
    client.remove_vertex(db, GRAPH, "people", "bob", None).await?;

    let (removed, _) = client.drop_graph(db, GRAPH, Some(true)).await?;
    tracing::info!("graph removed={}", removed);
    Ok(())
}
