use std::sync::Arc;

use common::core::point_payload::{extract_text, has_embedded_vector};
use common::core::qdrant_point::PointIdentifier;
use common::helper::error_chain_fmt;
use tracing::info;

use crate::domain::entities::stored_point::{PendingEmbedding, PointUpdate};
use crate::ports::embeddings_port::{EmbeddingsPort, EmbeddingsPortError};
use crate::ports::point_store_port::{PointStorePort, PointStorePortError};

/// Parameters for one reindex run.
#[derive(Debug, Clone)]
pub struct ReindexCollectionRequest {
    /// Number of points per embedding/upsert batch. Must be at least 1.
    pub batch_size: u32,
    /// Maximum number of points to scan, 0 meaning the whole collection.
    pub limit: u32,
    /// Runs the full pipeline but skips the writes.
    pub dry_run: bool,
}

/// Counters reported after a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Points scanned from the collection.
    pub scanned: usize,
    /// Points selected for re-embedding.
    pub pending: usize,
    /// Batches that went through the pipeline.
    pub batches: usize,
    /// Points actually written. Stays at 0 on a dry run.
    pub upserted: usize,
}

/// Scans a collection for points whose payload carries no embedded vector,
/// recomputes their embeddings from the extractable text and writes them back.
///
/// Each batch is embedded and upserted before the next one is touched, so an
/// aborted run leaves only complete batches behind.
pub struct ReindexCollectionUseCase {
    point_store: Arc<dyn PointStorePort>,
    embeddings: Arc<dyn EmbeddingsPort>,
}

impl ReindexCollectionUseCase {
    pub fn new(point_store: Arc<dyn PointStorePort>, embeddings: Arc<dyn EmbeddingsPort>) -> Self {
        Self {
            point_store,
            embeddings,
        }
    }

    #[tracing::instrument(name = "Reindexing collection", skip(self))]
    pub async fn execute(
        &self,
        request: ReindexCollectionRequest,
    ) -> Result<RunSummary, ReindexCollectionError> {
        let scan_limit = request.limit as usize;

        let mut points = Vec::new();
        let mut offset: Option<PointIdentifier> = None;
        loop {
            let page = self
                .point_store
                .scroll_page(offset.clone(), request.batch_size)
                .await?;

            for record in page.records {
                points.push(record.normalize());
                if scan_limit != 0 && points.len() >= scan_limit {
                    break;
                }
            }
            if scan_limit != 0 && points.len() >= scan_limit {
                break;
            }

            match page.next_offset {
                Some(next_offset) => offset = Some(next_offset),
                None => break,
            }
        }
        let scanned = points.len();
        info!("Collected {} points to inspect", scanned);

        // Vectors stored outside the payload are invisible to the payload
        // heuristic: such points are recomputed rather than skipped.
        let mut pending: Vec<PendingEmbedding> = Vec::new();
        for point in points {
            if has_embedded_vector(&point.payload) {
                continue;
            }
            let Some(text) = extract_text(&point.payload) else {
                continue;
            };
            pending.push(PendingEmbedding {
                id: point.id,
                text,
                payload: point.payload,
            });
        }
        info!("Need to compute embeddings for {} points", pending.len());

        let nb_pending = pending.len();
        let mut processed = 0_usize;
        let mut upserted = 0_usize;
        let mut batches = 0_usize;

        for batch in pending.chunks(request.batch_size as usize) {
            info!(
                "Computing embeddings for batch {}..{}",
                processed + 1,
                processed + batch.len()
            );

            let texts: Vec<String> = batch.iter().map(|point| point.text.clone()).collect();
            let vectors = self.embeddings.embed_batch(texts).await?;
            if vectors.len() != batch.len() {
                return Err(ReindexCollectionError::EmbeddingsCountMismatch {
                    expected: batch.len(),
                    actual: vectors.len(),
                });
            }

            let updates: Vec<PointUpdate> = batch
                .iter()
                .zip(vectors)
                .map(|(point, vector)| PointUpdate {
                    id: point.id.clone(),
                    vector,
                    payload: point.payload.clone(),
                })
                .collect();
            info!("Prepared {} points to upsert", updates.len());

            let nb_updates = updates.len();
            if request.dry_run {
                info!("Dry run: skipping upsert");
            } else {
                self.point_store.upsert_batch(updates).await?;
                info!("Upserted {} points", nb_updates);
                upserted += nb_updates;
            }
            processed += nb_updates;
            batches += 1;
        }

        info!("Done. Processed {} points.", processed);

        Ok(RunSummary {
            scanned,
            pending: nb_pending,
            batches,
            upserted,
        })
    }
}

#[derive(thiserror::Error)]
pub enum ReindexCollectionError {
    #[error(transparent)]
    PointStoreError(#[from] PointStorePortError),
    #[error(transparent)]
    EmbeddingsError(#[from] EmbeddingsPortError),
    #[error("Expected {expected} embeddings for the batch, got {actual}")]
    EmbeddingsCountMismatch { expected: usize, actual: usize },
}

impl std::fmt::Debug for ReindexCollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
