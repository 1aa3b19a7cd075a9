use crate::error::{Result, StegoError};
use crate::sample::Sample;
use serde::Serialize;

/// Peak signal-to-noise ratio of `modified` against `original`, in dB
///
/// `10 * log10(PEAK^2 / MSE)` with `PEAK` the largest magnitude of the
/// sample type. Identical buffers (including empty ones) give `+inf`.
pub fn compute_psnr<S: Sample>(original: &[S], modified: &[S]) -> Result<f64> {
    if original.len() != modified.len() {
        return Err(StegoError::LengthMismatch {
            original: original.len(),
            modified: modified.len(),
        });
    }
    let squared_error: f64 = original
        .iter()
        .zip(modified)
        .map(|(a, b)| {
            let diff = a.to_f64() - b.to_f64();
            diff * diff
        })
        .sum();
    if squared_error == 0.0 {
        return Ok(f64::INFINITY);
    }
    let mse = squared_error / original.len() as f64;
    Ok(10.0 * (S::PEAK * S::PEAK / mse).log10())
}

/// Human-facing grade of a PSNR value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityGrade {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityGrade {
    pub fn from_psnr(psnr_db: f64) -> Self {
        if psnr_db >= 50.0 {
            Self::Excellent
        } else if psnr_db >= 40.0 {
            Self::Good
        } else if psnr_db >= 30.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        };
        write!(f, "{}", label)
    }
}

/// 0-100 score shown next to the grade: `min(100, psnr * 1.5)`
pub fn quality_score(psnr_db: f64) -> f64 {
    if psnr_db.is_nan() {
        return 0.0;
    }
    (psnr_db * 1.5).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_infinite() {
        let samples: Vec<i16> = (0..100).map(|i| i * 3).collect();
        assert_eq!(compute_psnr(&samples, &samples).unwrap(), f64::INFINITY);
        assert_eq!(compute_psnr::<i16>(&[], &[]).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_known_value() {
        // every sample off by one: MSE = 1
        let original = vec![100i16; 64];
        let modified = vec![101i16; 64];
        let psnr = compute_psnr(&original, &modified).unwrap();
        let expected = 20.0 * 32767f64.log10();
        assert!((psnr - expected).abs() < 1e-9);
    }

    #[test]
    fn test_more_noise_lowers_psnr() {
        let original = vec![0i16; 1000];
        let small: Vec<i16> = original.iter().map(|s| s + 1).collect();
        let large: Vec<i16> = original.iter().map(|s| s + 15).collect();
        assert!(
            compute_psnr(&original, &small).unwrap() > compute_psnr(&original, &large).unwrap()
        );
    }

    #[test]
    fn test_length_mismatch() {
        let a = vec![0i16; 3];
        let b = vec![0i16; 4];
        assert!(matches!(
            compute_psnr(&a, &b),
            Err(StegoError::LengthMismatch {
                original: 3,
                modified: 4
            })
        ));
    }

    #[test]
    fn test_peak_follows_sample_type() {
        let psnr8 = compute_psnr(&[0i8; 8], &[1i8; 8]).unwrap();
        let psnr16 = compute_psnr(&[0i16; 8], &[1i16; 8]).unwrap();
        assert!(psnr16 > psnr8);
    }

    #[test]
    fn test_grades() {
        assert_eq!(QualityGrade::from_psnr(f64::INFINITY), QualityGrade::Excellent);
        assert_eq!(QualityGrade::from_psnr(50.0), QualityGrade::Excellent);
        assert_eq!(QualityGrade::from_psnr(45.2), QualityGrade::Good);
        assert_eq!(QualityGrade::from_psnr(30.0), QualityGrade::Fair);
        assert_eq!(QualityGrade::from_psnr(12.0), QualityGrade::Poor);
        assert_eq!(QualityGrade::Good.to_string(), "Good");
    }

    #[test]
    fn test_score_is_capped() {
        assert_eq!(quality_score(40.0), 60.0);
        assert_eq!(quality_score(90.0), 100.0);
        assert_eq!(quality_score(f64::INFINITY), 100.0);
    }
}
