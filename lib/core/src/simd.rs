// Dot product, norm and cosine kernels for token embeddings.
// Contextual embeddings are a few hundred floats wide, so the wide paths
// pay off; short vectors stay on the scalar loop.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

#[cfg(target_arch = "x86_64")]
const MIN_DIM_AVX: usize = 32;

#[cfg(target_arch = "aarch64")]
const MIN_DIM_NEON: usize = 16;

/// Dot product of two equal-length slices; 0.0 when lengths differ
#[inline]
pub fn dot_product_simd(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if a.len() >= MIN_DIM_AVX
            && is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
        {
            return unsafe { dot_product_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if a.len() >= MIN_DIM_NEON && std::arch::is_aarch64_feature_detected!("neon") {
            return unsafe { dot_product_neon(a, b) };
        }
    }

    dot_product_scalar(a, b)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn dot_product_avx2(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;

    let mut acc_lo = _mm256_setzero_ps();
    let mut acc_hi = _mm256_setzero_ps();

    while i + 16 <= dim {
        let xa = _mm256_loadu_ps(a.as_ptr().add(i));
        let xb = _mm256_loadu_ps(b.as_ptr().add(i));
        let ya = _mm256_loadu_ps(a.as_ptr().add(i + 8));
        let yb = _mm256_loadu_ps(b.as_ptr().add(i + 8));

        acc_lo = _mm256_fmadd_ps(xa, xb, acc_lo);
        acc_hi = _mm256_fmadd_ps(ya, yb, acc_hi);

        i += 16;
    }

    let acc = _mm256_add_ps(acc_lo, acc_hi);
    let upper = _mm256_extractf128_ps(acc, 1);
    let lower = _mm256_castps256_ps128(acc);
    let mut quad = _mm_add_ps(upper, lower);
    quad = _mm_hadd_ps(quad, quad);
    quad = _mm_hadd_ps(quad, quad);

    let mut dot = _mm_cvtss_f32(quad);
    while i < dim {
        dot += a[i] * b[i];
        i += 1;
    }
    dot
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn dot_product_neon(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;

    let mut acc_lo = vdupq_n_f32(0.0);
    let mut acc_hi = vdupq_n_f32(0.0);

    while i + 8 <= dim {
        acc_lo = vfmaq_f32(acc_lo, vld1q_f32(a.as_ptr().add(i)), vld1q_f32(b.as_ptr().add(i)));
        acc_hi = vfmaq_f32(
            acc_hi,
            vld1q_f32(a.as_ptr().add(i + 4)),
            vld1q_f32(b.as_ptr().add(i + 4)),
        );
        i += 8;
    }

    let mut dot = vaddvq_f32(vaddq_f32(acc_lo, acc_hi));
    while i < dim {
        dot += a[i] * b[i];
        i += 1;
    }
    dot
}

/// Two independent accumulators so the adds can overlap.
#[inline]
fn dot_product_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut even = 0.0f32;
    let mut odd = 0.0f32;

    let pairs_a = a.chunks_exact(2);
    let tail = pairs_a.remainder();
    for (pa, pb) in pairs_a.zip(b.chunks_exact(2)) {
        even += pa[0] * pb[0];
        odd += pa[1] * pb[1];
    }
    if let (Some(x), Some(y)) = (tail.first(), b.last()) {
        even += x * y;
    }

    even + odd
}

/// Euclidean length
#[inline]
pub fn norm_simd(v: &[f32]) -> f32 {
    dot_product_simd(v, v).sqrt()
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors
#[inline]
pub fn cosine_simd(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let norm_a = norm_simd(a);
    let norm_b = norm_simd(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product_simd(a, b) / (norm_a * norm_b)
}
