use futures_util::StreamExt;
use serde_json::Value;
use sql_bricks::bricks::Raw;
use sql_bricks::prelude::*;

use crate::args::{RunConfig, Shape};

pub(crate) fn row_json(row: &CustomDbRow) -> Value {
    Value::Object(
        row.iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect(),
    )
}

fn rows_json(rows: &[CustomDbRow]) -> Value {
    Value::Array(rows.iter().map(row_json).collect())
}

/// Execute `stmt` and shape the result as JSON.
pub(crate) async fn materialize<Q: Queryable>(
    stmt: Statement<Q, Raw>,
    shape: Shape,
) -> Result<Value, SqlBricksError> {
    Ok(match shape {
        Shape::Rows => rows_json(&stmt.rows().await?),
        Shape::Row => row_json(&stmt.row().await?),
        Shape::Col => Value::Array(stmt.col().await?.iter().map(RowValues::to_json).collect()),
        Shape::Val => stmt.val().await?.to_json(),
        Shape::Stream => {
            let (sink, rows) = row_channel(16);
            let (_, collected) = tokio::join!(stmt.stream_into(sink), rows.collect_rows());
            rows_json(&collected?)
        }
    })
}

fn print(output: &Value, shape: Shape) {
    match (shape, output) {
        (Shape::Stream, Value::Array(rows)) => {
            for row in rows {
                println!("{row}");
            }
        }
        _ => println!("{output:#}"),
    }
}

pub(crate) async fn run(config: &RunConfig) -> Result<(), SqlBricksError> {
    let options = ConfigOptions::default()
        .max_connections(config.pool_size)
        .stream_capacity(config.stream_capacity);
    let pool = Config::configure_with(&config.url, options).await?;
    let sql = config.sql.clone();
    let shape = config.shape;

    if config.transaction {
        let output = pool
            .transaction(move |conn: &mut DbConnection| {
                Box::pin(async move { materialize(conn.raw(sql, Vec::new()), shape).await })
            })
            .await?;
        print(&output, shape);
    } else if shape == Shape::Stream {
        // print rows as they arrive instead of collecting them
        let mut rows = pool.raw(sql, Vec::new()).stream();
        while let Some(row) = rows.next().await {
            println!("{}", row_json(&row?));
        }
    } else {
        let output = materialize(pool.raw(sql, Vec::new()), shape).await?;
        print(&output, shape);
    }

    tracing::debug!(state = ?pool.state(), "finished");
    pool.shutdown().await?;
    Ok(())
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use serde_json::json;

    use super::*;

    async fn fruit() -> Config {
        let config = Config::configure("sqlite::memory:").await.unwrap();
        config
            .run(|conn: &mut DbConnection| {
                Box::pin(async move {
                    conn.execute_batch(
                        "CREATE TABLE item (title TEXT, price INTEGER);
                         INSERT INTO item VALUES ('apple', 10), ('orange', 20);",
                    )
                    .await
                })
            })
            .await
            .unwrap();
        config
    }

    #[tokio::test]
    async fn shapes_render_as_json() {
        let config = fruit().await;

        let rows = materialize(config.raw("SELECT title, price FROM item", Vec::new()), Shape::Rows)
            .await
            .unwrap();
        assert_eq!(
            rows,
            json!([{"title": "apple", "price": 10}, {"title": "orange", "price": 20}])
        );

        let col = materialize(config.raw("SELECT title FROM item", Vec::new()), Shape::Col)
            .await
            .unwrap();
        assert_eq!(col, json!(["apple", "orange"]));

        let val = materialize(
            config.raw("SELECT price FROM item WHERE title = $1", vec!["orange".into()]),
            Shape::Val,
        )
        .await
        .unwrap();
        assert_eq!(val, json!(20));

        let streamed = materialize(config.raw("SELECT title FROM item", Vec::new()), Shape::Stream)
            .await
            .unwrap();
        assert_eq!(streamed, json!([{"title": "apple"}, {"title": "orange"}]));
    }

    #[tokio::test]
    async fn row_shape_rejects_multiple_rows() {
        let config = fruit().await;
        let err = materialize(config.raw("SELECT title FROM item", Vec::new()), Shape::Row)
            .await
            .unwrap_err();
        assert!(matches!(err, SqlBricksError::MultipleRows(2)));
    }
}
