//! Per-request flat vector index over transcript segments.
//!
//! The index is rebuilt from scratch for every question and discarded with
//! the request. Exhaustive search over a few hundred segments is cheap and
//! avoids any cache-invalidation story for changing transcripts.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::transcript::TranscriptSegment;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A retrieved segment with its distance to the query.
#[derive(Debug, Clone)]
pub struct ScoredSegment {
    /// The matched segment.
    pub segment: TranscriptSegment,
    /// Euclidean distance to the query embedding (lower is better).
    pub distance: f32,
}

/// Flat nearest-neighbor index over segment embeddings.
pub struct SegmentIndex {
    segments: Vec<TranscriptSegment>,
    embeddings: Vec<Vec<f32>>,
    embedder: Arc<dyn Embedder>,
}

impl SegmentIndex {
    /// Build an index over the given segments.
    ///
    /// Every segment's text is embedded with the shared embedder. An empty
    /// segment list yields an index that matches nothing.
    #[instrument(skip(embedder, segments), fields(count = segments.len()))]
    pub async fn build(
        embedder: Arc<dyn Embedder>,
        segments: Vec<TranscriptSegment>,
    ) -> Result<Self> {
        let texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        debug!("Indexed {} segments", segments.len());

        Ok(Self {
            segments,
            embeddings,
            embedder,
        })
    }

    /// Number of indexed segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the index contains no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Return the `k` nearest segments to the query text, best match first.
    ///
    /// The query is embedded as-is. `k` is clamped to the segment count; an
    /// empty index returns an empty result rather than failing.
    #[instrument(skip(self, text))]
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredSegment>> {
        if self.segments.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(text).await?;

        let mut results: Vec<ScoredSegment> = self
            .segments
            .iter()
            .zip(self.embeddings.iter())
            .map(|(segment, embedding)| ScoredSegment {
                segment: segment.clone(),
                distance: l2_distance(&query_embedding, embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k.min(self.segments.len()));

        Ok(results)
    }
}

/// Compute the Euclidean (L2) distance between two vectors.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::MAX;
    }

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SporreError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Deterministic embedder mapping known texts to fixed vectors.
    struct FixedEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl FixedEmbedder {
        fn new(entries: &[(&str, Vec<f32>)]) -> Self {
            Self {
                vectors: entries
                    .iter()
                    .map(|(t, v)| (t.to_string(), v.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| SporreError::Embedding(format!("no vector for {:?}", text)))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn seg(text: &str) -> TranscriptSegment {
        TranscriptSegment::new(0.0, 1.0, text)
    }

    #[test]
    fn test_l2_distance() {
        assert_eq!(l2_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(l2_distance(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(l2_distance(&[1.0], &[1.0, 2.0]), f32::MAX);
    }

    #[tokio::test]
    async fn test_exact_match_is_top_result() {
        let embedder = Arc::new(FixedEmbedder::new(&[
            ("The sky is blue", vec![1.0, 0.0, 0.0]),
            ("Water boils at 100C", vec![0.0, 1.0, 0.0]),
        ]));

        let index = SegmentIndex::build(
            embedder,
            vec![seg("The sky is blue"), seg("Water boils at 100C")],
        )
        .await
        .unwrap();

        let results = index.query("The sky is blue", 3).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].segment.text, "The sky is blue");
        assert!(results[0].distance.abs() < 1e-6);
        assert!(results[0].distance <= results[1].distance);
    }

    #[tokio::test]
    async fn test_k_clamped_to_segment_count() {
        let embedder = Arc::new(FixedEmbedder::new(&[("only", vec![1.0, 0.0, 0.0])]));
        let index = SegmentIndex::build(embedder, vec![seg("only")]).await.unwrap();

        let results = index.query("only", 3).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_index_returns_no_matches() {
        let embedder = Arc::new(FixedEmbedder::new(&[("q", vec![0.0, 0.0, 0.0])]));
        let index = SegmentIndex::build(embedder, Vec::new()).await.unwrap();

        assert!(index.is_empty());
        let results = index.query("q", 3).await.unwrap();
        assert!(results.is_empty());
    }
}
