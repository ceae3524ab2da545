//! Rate-alignment primitives
//!
//! `up` is piecewise-linear interpolation with flat extension past the last
//! native sample (numpy `interp` semantics). `down` is Fourier-domain
//! resampling (scipy `signal.resample` semantics): the decimation happens in
//! the spectrum, so it band-limits correctly instead of aliasing.

use std::fmt;
use std::str::FromStr;

use rustfft::{num_complex::Complex, FftPlanner};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unrecognized resampling method '{0}' (expected 'up' or 'down')")]
pub struct UnknownMethodError(pub String);

/// Strategy for reconciling the 10 Hz and 100 Hz streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplingMethod {
    /// Interpolate the low-rate stream up to the high-rate length
    Up,
    /// Resample the high-rate stream down to the low-rate length
    Down,
}

impl FromStr for ResamplingMethod {
    type Err = UnknownMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(ResamplingMethod::Up),
            "down" => Ok(ResamplingMethod::Down),
            other => Err(UnknownMethodError(other.to_string())),
        }
    }
}

impl fmt::Display for ResamplingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResamplingMethod::Up => "up",
            ResamplingMethod::Down => "down",
        })
    }
}

/// Piecewise-linear upsample of `samples` onto `target_len` integer
/// positions.
///
/// Native sample `k` sits at position `k * target_len / samples.len()`;
/// evaluation past the last native position holds its value.
pub fn interpolate_to_len(samples: &[f64], target_len: usize) -> Vec<f64> {
    if samples.is_empty() || target_len == 0 {
        return Vec::new();
    }
    if samples.len() == 1 {
        return vec![samples[0]; target_len];
    }

    let step = target_len as f64 / samples.len() as f64;
    let last = samples.len() - 1;

    (0..target_len)
        .map(|t| {
            let pos = t as f64 / step;
            let k = pos.floor() as usize;
            if k >= last {
                samples[last]
            } else {
                let frac = pos - k as f64;
                samples[k] + (samples[k + 1] - samples[k]) * frac
            }
        })
        .collect()
}

/// Fourier-domain resample of `samples` to `target_len` points.
///
/// The spectrum is truncated (or zero-padded) to the target length, the
/// split Nyquist bins are folded for an even truncation, and amplitudes
/// scale by `target_len / samples.len()` so a constant stays a constant.
pub fn fourier_resample(samples: &[f64], target_len: usize) -> Vec<f64> {
    let n = samples.len();
    let m = target_len;
    if n == 0 || m == 0 {
        return Vec::new();
    }
    if m == n {
        return samples.to_vec();
    }

    let mut planner = FftPlanner::new();

    let mut spectrum: Vec<Complex<f64>> =
        samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    planner.plan_fft_forward(n).process(&mut spectrum);

    // Keep the `keep` lowest-frequency bins: positive half (incl. the
    // Nyquist slot) at the front, negative half at the tail.
    let keep = m.min(n);
    let nyq = keep / 2 + 1;
    let mut resized = vec![Complex::new(0.0, 0.0); m];
    resized[..nyq].copy_from_slice(&spectrum[..nyq]);
    if keep > 2 {
        let neg = keep - nyq;
        resized[m - neg..].copy_from_slice(&spectrum[n - neg..]);
    }

    if keep % 2 == 0 {
        let half = keep / 2;
        if m < n {
            // Fold the aliased Nyquist pair into the single remaining bin
            resized[half] = spectrum[half] + spectrum[n - half];
        } else {
            // Split the Nyquist bin across its two new positions
            resized[half] = spectrum[half] * 0.5;
            resized[m - half] = resized[half];
        }
    }

    planner.plan_fft_inverse(m).process(&mut resized);

    // rustfft is unnormalized: 1/m for the inverse and the m/n amplitude
    // scale collapse to 1/n.
    let scale = 1.0 / n as f64;
    resized.iter().map(|c| c.re * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!(
                (a - e).abs() < tol,
                "index {}: {} vs {} (tol {})",
                i,
                a,
                e,
                tol
            );
        }
    }

    #[test]
    fn unknown_method_token_is_rejected() {
        assert!("sideways".parse::<ResamplingMethod>().is_err());
        assert_eq!("up".parse::<ResamplingMethod>().unwrap(), ResamplingMethod::Up);
        assert_eq!(
            "down".parse::<ResamplingMethod>().unwrap(),
            ResamplingMethod::Down
        );
    }

    #[test]
    fn interpolation_hits_native_samples_on_the_grid() {
        let out = interpolate_to_len(&[0.0, 1.0, 2.0, 3.0], 8);
        // step = 2: native samples land on even positions, midpoints between
        // them, and the tail extends flat past the last native position
        assert_close(&out, &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.0], 1e-12);
    }

    #[test]
    fn interpolation_of_a_constant_is_the_constant() {
        let out = interpolate_to_len(&[4.25; 60], 600);
        assert_eq!(out.len(), 600);
        assert!(out.iter().all(|&v| v == 4.25));
    }

    #[test]
    fn fourier_resample_of_a_constant_is_the_constant() {
        let out = fourier_resample(&[2.5; 200], 20);
        assert_eq!(out.len(), 20);
        assert_close(&out, &[2.5; 20], 1e-9);
    }

    #[test]
    fn fourier_resample_is_identity_at_equal_length() {
        let samples = vec![1.0, -2.0, 3.0, 0.5];
        assert_eq!(fourier_resample(&samples, 4), samples);
    }

    #[test]
    fn fourier_resample_preserves_low_frequency_content() {
        // A 3-cycle cosine over the window survives 100 -> 20 resampling
        // untouched: bin 3 is well below the new Nyquist bin 10.
        let n = 100;
        let m = 20;
        let samples: Vec<f64> = (0..n)
            .map(|t| (2.0 * std::f64::consts::PI * 3.0 * t as f64 / n as f64).cos())
            .collect();

        let out = fourier_resample(&samples, m);
        let expected: Vec<f64> = (0..m)
            .map(|t| (2.0 * std::f64::consts::PI * 3.0 * t as f64 / m as f64).cos())
            .collect();
        assert_close(&out, &expected, 1e-9);
    }

    #[test]
    fn fourier_resample_removes_above_nyquist_content_without_aliasing() {
        // A tone right at bin 40 cannot be represented in 20 samples; a
        // band-limited resampler must null it rather than fold it down.
        let n = 100;
        let samples: Vec<f64> = (0..n)
            .map(|t| (2.0 * std::f64::consts::PI * 40.0 * t as f64 / n as f64).sin())
            .collect();

        let out = fourier_resample(&samples, 20);
        for v in out {
            assert!(v.abs() < 1e-9, "aliased residual {}", v);
        }
    }
}
