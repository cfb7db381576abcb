//! LanceDB-backed vector backend (feature `lance`).
//!
//! Drop-in search accelerator with the same result semantics as the
//! flat backend. Persistence of the index artifacts stays with
//! `SemanticIndex`; the Lance table is a rebuildable cache.

use crate::backend::VectorBackend;
use crate::flat::cosine_similarity;
use arrow_array::{Array, FixedSizeListArray, RecordBatch, RecordBatchIterator, UInt32Array};
use arrow_schema::{DataType, Field, Schema};
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Table;
use staffdesk_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;

const TABLE_NAME: &str = "chunks";

/// Vector backend over a local LanceDB table.
pub struct LanceBackend {
    table: Table,
    embedding_dim: usize,
    // Kept alongside the table so scoring and tie-breaking match the
    // flat backend exactly.
    vectors: Vec<Vec<f32>>,
}

impl LanceBackend {
    /// Create or reset a LanceDB table under `db_path`.
    pub fn new(db_path: &Path, embedding_dim: usize) -> AppResult<Self> {
        let table = block_on(async {
            std::fs::create_dir_all(db_path)?;

            let uri = db_path.to_string_lossy().to_string();
            let conn = lancedb::connect(&uri)
                .execute()
                .await
                .map_err(|e| AppError::Index(format!("Failed to connect to LanceDB: {}", e)))?;

            let existing = conn
                .table_names()
                .execute()
                .await
                .map_err(|e| AppError::Index(format!("Failed to list tables: {}", e)))?;
            if existing.contains(&TABLE_NAME.to_string()) {
                conn.drop_table(TABLE_NAME)
                    .await
                    .map_err(|e| AppError::Index(format!("Failed to drop table: {}", e)))?;
            }

            let schema = create_schema(embedding_dim);
            let empty = RecordBatch::new_empty(schema.clone());
            conn.create_table(TABLE_NAME, RecordBatchIterator::new(vec![Ok(empty)], schema))
                .execute()
                .await
                .map_err(|e| AppError::Index(format!("Failed to create table: {}", e)))
        })?;

        tracing::debug!("Initialized LanceDB backend at {:?}", db_path);

        Ok(Self {
            table,
            embedding_dim,
            vectors: Vec::new(),
        })
    }

    fn vectors_to_batch(&self, start: usize, vectors: &[Vec<f32>]) -> AppResult<RecordBatch> {
        let schema = create_schema(self.embedding_dim);

        let positions: Vec<u32> = (start..start + vectors.len()).map(|p| p as u32).collect();
        let position_array = UInt32Array::from(positions);

        let flat: Vec<f32> = vectors.iter().flatten().copied().collect();
        let values = arrow_array::Float32Array::from(flat);
        let embedding_array = FixedSizeListArray::new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            self.embedding_dim as i32,
            Arc::new(values),
            None,
        );

        RecordBatch::try_new(schema, vec![Arc::new(position_array), Arc::new(embedding_array)])
            .map_err(|e| AppError::Index(format!("Failed to create RecordBatch: {}", e)))
    }
}

impl VectorBackend for LanceBackend {
    fn name(&self) -> &str {
        "lance"
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimensions(&self) -> Option<usize> {
        if self.vectors.is_empty() {
            None
        } else {
            Some(self.embedding_dim)
        }
    }

    fn add(&mut self, vectors: Vec<Vec<f32>>) -> AppResult<()> {
        if vectors.is_empty() {
            return Ok(());
        }
        for vector in &vectors {
            if vector.len() != self.embedding_dim {
                return Err(AppError::Index(format!(
                    "Vector dimension mismatch: expected {}, got {}",
                    self.embedding_dim,
                    vector.len()
                )));
            }
        }

        let batch = self.vectors_to_batch(self.vectors.len(), &vectors)?;
        block_on(async {
            self.table
                .add(RecordBatchIterator::new(
                    vec![Ok(batch.clone())],
                    batch.schema(),
                ))
                .execute()
                .await
                .map_err(|e| AppError::Index(format!("Failed to add vectors: {}", e)))
        })?;

        self.vectors.extend(vectors);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>> {
        if k == 0 {
            return Err(AppError::InvalidArgument(
                "search requires k > 0".to_string(),
            ));
        }
        if query.len() != self.embedding_dim {
            return Err(AppError::Index(format!(
                "Query dimension mismatch: expected {}, got {}",
                self.embedding_dim,
                query.len()
            )));
        }

        let query_vec = query.to_vec();
        let batches = block_on(async {
            use futures::TryStreamExt;

            self.table
                .query()
                .nearest_to(query_vec)
                .map_err(|e| AppError::Index(format!("Failed to create query: {}", e)))?
                .limit(k)
                .execute()
                .await
                .map_err(|e| AppError::Index(format!("Failed to execute search: {}", e)))?
                .try_collect::<Vec<_>>()
                .await
                .map_err(|e| AppError::Index(format!("Failed to collect results: {}", e)))
        })?;

        let mut scored = Vec::new();
        for batch in &batches {
            let positions = batch
                .column(0)
                .as_any()
                .downcast_ref::<UInt32Array>()
                .ok_or_else(|| AppError::Index("Invalid position column".to_string()))?;
            for row in 0..batch.num_rows() {
                let position = positions.value(row) as usize;
                let embedding = self
                    .vectors
                    .get(position)
                    .ok_or_else(|| AppError::Index(format!("Unknown position {}", position)))?;
                scored.push((position, cosine_similarity(query, embedding)));
            }
        }

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }
}

fn create_schema(embedding_dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("position", DataType::UInt32, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                embedding_dim as i32,
            ),
            false,
        ),
    ]))
}

/// Bridge the sync `VectorBackend` trait onto LanceDB's async API.
fn block_on<F, T>(fut: F) -> AppResult<T>
where
    F: std::future::Future<Output = AppResult<T>>,
{
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(fut))
}
