use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// Brute-force flat vector index over squared Euclidean distance.
///
/// Vectors are stored contiguously; a vector's ordinal is its 0-based
/// insertion position and is the only handle callers ever get. The
/// persisted form carries `dimensions`, which the synchronizer checks
/// against the configured gateway width on every load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    dimensions: usize,
    values: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            values: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.values.len() / self.dimensions
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends vectors at the end of the index. All-or-nothing: widths are
    /// validated before the first row is copied in, so a mismatch anywhere
    /// in the batch leaves the index untouched.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), StoreError> {
        for vector in vectors {
            if vector.len() != self.dimensions {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: vector.len(),
                });
            }
        }

        for vector in vectors {
            self.values.extend_from_slice(vector);
        }
        Ok(())
    }

    /// Returns the `min(k, len)` nearest vectors as parallel
    /// (distances, ordinals) lists, ascending by squared L2 distance.
    /// Ties keep insertion order. An empty index returns empty lists.
    pub fn search(&self, query: &[f32], k: usize) -> Result<(Vec<f32>, Vec<i64>), StoreError> {
        if query.len() != self.dimensions {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut ranked: Vec<(f32, i64)> = self
            .values
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(ordinal, vector)| {
                let distance = vector
                    .iter()
                    .zip(query)
                    .map(|(stored, probe)| (stored - probe) * (stored - probe))
                    .sum::<f32>();
                (distance, ordinal as i64)
            })
            .collect();

        // Stable sort so equal distances keep ascending ordinals.
        ranked.sort_by(|left, right| left.0.total_cmp(&right.0));
        ranked.truncate(k);

        Ok(ranked.into_iter().unzip())
    }
}

#[cfg(test)]
mod tests {
    use super::FlatIndex;
    use crate::error::StoreError;

    #[test]
    fn empty_index_returns_empty_results() {
        let index = FlatIndex::new(4);
        let (distances, ordinals) = index.search(&[0.0; 4], 10).unwrap();
        assert!(distances.is_empty());
        assert!(ordinals.is_empty());
    }

    #[test]
    fn search_orders_by_ascending_distance() {
        let mut index = FlatIndex::new(2);
        index
            .add(&[vec![10.0, 0.0], vec![1.0, 0.0], vec![5.0, 0.0]])
            .unwrap();

        let (distances, ordinals) = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(ordinals, vec![1, 2, 0]);
        assert!(distances[0] <= distances[1] && distances[1] <= distances[2]);
    }

    #[test]
    fn equal_distances_keep_insertion_order() {
        let mut index = FlatIndex::new(2);
        index
            .add(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0]])
            .unwrap();

        let (_, ordinals) = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }

    #[test]
    fn results_are_capped_at_index_size() {
        let mut index = FlatIndex::new(2);
        index.add(&[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();

        let (distances, ordinals) = index.search(&[0.0, 0.0], 50).unwrap();
        assert_eq!(distances.len(), 2);
        assert_eq!(ordinals.len(), 2);
    }

    #[test]
    fn mismatched_vector_width_is_rejected_without_partial_append() {
        let mut index = FlatIndex::new(3);
        let result = index.add(&[vec![1.0, 2.0, 3.0], vec![1.0, 2.0]]);
        assert!(matches!(
            result,
            Err(StoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn mismatched_query_width_is_rejected() {
        let mut index = FlatIndex::new(3);
        index.add(&[vec![0.0, 0.0, 0.0]]).unwrap();
        assert!(index.search(&[0.0, 0.0], 1).is_err());
    }

    #[test]
    fn serialized_index_round_trips() {
        let mut index = FlatIndex::new(2);
        index.add(&[vec![0.5, -0.5]]).unwrap();

        let encoded = serde_json::to_vec(&index).unwrap();
        let decoded: FlatIndex = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), 2);
        assert_eq!(decoded.len(), 1);
    }
}
