//! Radix-2 Cooley-Tukey FFT with a precomputed twiddle table.

use std::f64::consts::PI;

/// Forward FFT plan for a fixed power-of-two size.
pub(crate) struct Fft {
    size: usize,
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl Fft {
    /// Plans an FFT of `size` points. Returns `None` unless `size` is a power of two.
    pub fn new(size: usize) -> Option<Self> {
        if size < 2 || !size.is_power_of_two() {
            return None;
        }
        let half = size / 2;
        let (cos, sin) = (0..half)
            .map(|k| {
                let angle = -2.0 * PI * k as f64 / size as f64;
                (angle.cos(), angle.sin())
            })
            .unzip();
        Some(Self { size, cos, sin })
    }

    /// Transforms `real` + `imag` in place. Both must have the planned size.
    pub fn process(&self, real: &mut [f64], imag: &mut [f64]) {
        let n = self.size;
        debug_assert_eq!(real.len(), n);
        debug_assert_eq!(imag.len(), n);

        let mut j = 0usize;
        for i in 0..n - 1 {
            if i < j {
                real.swap(i, j);
                imag.swap(i, j);
            }
            let mut k = n >> 1;
            while k <= j {
                j -= k;
                k >>= 1;
            }
            j += k;
        }

        let mut len = 2;
        while len <= n {
            let half = len >> 1;
            let stride = n / len;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let (w_r, w_i) = (self.cos[k * stride], self.sin[k * stride]);
                    let u = start + k;
                    let v = u + half;

                    let t_r = w_r * real[v] - w_i * imag[v];
                    let t_i = w_r * imag[v] + w_i * real[v];

                    real[v] = real[u] - t_r;
                    imag[v] = imag[u] - t_i;
                    real[u] += t_r;
                    imag[u] += t_i;
                }
            }
            len <<= 1;
        }
    }

    /// Writes `|X[k]|^2` for `k` in `0..=size/2` into `power`, where `X` is the
    /// transform of `frame`. `real`/`imag` are scratch buffers of length `size`.
    pub fn power_spectrum(
        &self,
        frame: &[f64],
        real: &mut [f64],
        imag: &mut [f64],
        power: &mut [f64],
    ) {
        real.copy_from_slice(frame);
        imag.fill(0.0);
        self.process(real, imag);
        for (k, p) in power.iter_mut().enumerate().take(self.size / 2 + 1) {
            *p = real[k] * real[k] + imag[k] * imag[k];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two() {
        assert!(Fft::new(0).is_none());
        assert!(Fft::new(1).is_none());
        assert!(Fft::new(400).is_none());
        assert!(Fft::new(512).is_some());
    }

    #[test]
    fn impulse_is_flat() {
        let fft = Fft::new(8).unwrap();
        let mut real = vec![0.0; 8];
        let mut imag = vec![0.0; 8];
        real[0] = 1.0;

        fft.process(&mut real, &mut imag);

        for (&r, &i) in real.iter().zip(&imag) {
            assert!((r - 1.0).abs() < 1e-12);
            assert!(i.abs() < 1e-12);
        }
    }

    #[test]
    fn matches_naive_dft() {
        let n = 16;
        let fft = Fft::new(n).unwrap();
        let input: Vec<f64> = (0..n).map(|i| ((i * 7 % 5) as f64) - 2.0).collect();
        let mut real = input.clone();
        let mut imag = vec![0.0; n];
        fft.process(&mut real, &mut imag);

        for k in 0..n {
            let (mut re, mut im) = (0.0, 0.0);
            for (t, &x) in input.iter().enumerate() {
                let angle = -2.0 * PI * (k * t) as f64 / n as f64;
                re += x * angle.cos();
                im += x * angle.sin();
            }
            assert!((real[k] - re).abs() < 1e-9, "bin {k}: {} != {}", real[k], re);
            assert!((imag[k] - im).abs() < 1e-9, "bin {k}: {} != {}", imag[k], im);
        }
    }

    #[test]
    fn power_spectrum_of_cosine_peaks_at_its_bin() {
        let n = 64;
        let fft = Fft::new(n).unwrap();
        let frame: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 4.0 * i as f64 / n as f64).cos())
            .collect();
        let mut real = vec![0.0; n];
        let mut imag = vec![0.0; n];
        let mut power = vec![0.0; n / 2 + 1];
        fft.power_spectrum(&frame, &mut real, &mut imag, &mut power);

        // A unit cosine puts n/2 amplitude in its bin: power = (n/2)^2.
        assert!((power[4] - 1024.0).abs() < 1e-6);
        for (k, &p) in power.iter().enumerate() {
            if k != 4 {
                assert!(p < 1e-9, "bin {k} = {p}");
            }
        }
    }
}
