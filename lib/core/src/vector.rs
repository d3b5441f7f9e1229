use serde::{Deserialize, Serialize};

/// A dense embedding vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Cosine similarity in [-1, 1].
    /// Mismatched dimensions and zero-length vectors compare as 0.0.
    #[inline]
    pub fn cosine_similarity(&self, other: &Vector) -> f32 {
        crate::simd::cosine_simd(&self.data, &other.data)
    }

    /// Largest cosine similarity between `self` and any of `others`,
    /// or `None` when `others` is empty.
    pub fn max_cosine<'a, I>(&self, others: I) -> Option<f32>
    where
        I: IntoIterator<Item = &'a Vector>,
    {
        others
            .into_iter()
            .map(|other| self.cosine_similarity(other))
            .fold(None, |best, sim| match best {
                Some(b) if b >= sim => Some(b),
                _ => Some(sim),
            })
    }

    /// Scale to unit length in place. Zero vectors are left untouched.
    #[inline]
    pub fn normalize(&mut self) {
        let norm = crate::simd::norm_simd(&self.data);
        if norm > f32::EPSILON {
            let inv_norm = 1.0 / norm;
            for x in &mut self.data {
                *x *= inv_norm;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let v1 = Vector::new(vec![1.0, 0.0]);
        let v2 = Vector::new(vec![1.0, 0.0]);
        assert!((v1.cosine_similarity(&v2) - 1.0).abs() < 1e-6);

        let v3 = Vector::new(vec![1.0, 0.0]);
        let v4 = Vector::new(vec![0.0, 1.0]);
        assert!((v3.cosine_similarity(&v4) - 0.0).abs() < 1e-6);

        let v5 = Vector::new(vec![-2.0, 0.0]);
        assert!((v1.cosine_similarity(&v5) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        let zero = Vector::new(vec![0.0, 0.0]);
        let unit = Vector::new(vec![1.0, 0.0]);
        assert_eq!(zero.cosine_similarity(&unit), 0.0);

        let short = Vector::new(vec![1.0]);
        assert_eq!(short.cosine_similarity(&unit), 0.0);
    }

    #[test]
    fn test_max_cosine() {
        let probe = Vector::new(vec![1.0, 0.0]);
        let others = vec![
            Vector::new(vec![0.0, 1.0]),
            Vector::new(vec![1.0, 1.0]),
            Vector::new(vec![3.0, 0.0]),
        ];
        let best = probe.max_cosine(&others).unwrap();
        assert!((best - 1.0).abs() < 1e-6);

        let none: Vec<Vector> = Vec::new();
        assert!(probe.max_cosine(&none).is_none());
    }

    #[test]
    fn test_normalize() {
        let v = Vector::new(vec![3.0, 4.0]).normalized();
        assert!((v.as_slice()[0] - 0.6).abs() < 1e-6);
        assert!((v.as_slice()[1] - 0.8).abs() < 1e-6);

        let mut zero = Vector::new(vec![0.0, 0.0]);
        zero.normalize();
        assert_eq!(zero.as_slice(), &[0.0, 0.0]);
    }
}
