/// Root-mean-square level of one frame of normalized mono samples.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// RMS expressed in dBFS, clamped to -100 for digital silence. Used only
/// for diagnostics; endpoint decisions compare raw RMS.
pub fn rms_to_dbfs(rms: f32) -> f32 {
    if rms <= 1e-10 {
        return -100.0;
    }
    20.0 * rms.log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_SIZE: usize = 1024;

    #[test]
    fn silence_is_zero() {
        let silence = vec![0.0f32; FRAME_SIZE];
        assert_eq!(rms(&silence), 0.0);
        assert!(rms_to_dbfs(rms(&silence)) <= -100.0);
    }

    #[test]
    fn full_scale_square_is_unity() {
        let full: Vec<f32> = (0..FRAME_SIZE)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        assert!((rms(&full) - 1.0).abs() < 1e-6);
        assert!(rms_to_dbfs(rms(&full)).abs() < 0.01);
    }

    #[test]
    fn sine_rms_is_amplitude_over_sqrt_two() {
        let sine: Vec<f32> = (0..FRAME_SIZE)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / FRAME_SIZE as f32;
                phase.sin() * 0.5
            })
            .collect();
        assert!((rms(&sine) - 0.3536).abs() < 0.01);
    }

    #[test]
    fn empty_frame_is_zero() {
        assert_eq!(rms(&[]), 0.0);
    }
}
