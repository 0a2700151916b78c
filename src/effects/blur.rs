use crate::foundation::{
    error::{PadError, PadResult},
    raster::Raster,
};

/// Kernel radius covering three standard deviations.
pub fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Gaussian blur of a premultiplied raster with standard deviation `sigma` pixels.
pub fn blur_raster(src: &Raster, sigma: f32) -> PadResult<Raster> {
    let radius = radius_for_sigma(sigma);
    if radius == 0 {
        return Ok(src.clone());
    }
    let data = blur_rgba8_premul(&src.data, src.width, src.height, radius, sigma)?;
    Raster::from_premul(src.width, src.height, data)
}

/// Separable Gaussian blur in Q16 fixed point. Samples beyond the edge clamp to the border.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> PadResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| PadError::validation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(PadError::validation(
            "blur expects a buffer of width*height*4 bytes",
        ));
    }
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    convolve(src, &mut tmp, width, height, &kernel, Axis::X);
    convolve(&tmp, &mut out, width, height, &kernel, Axis::Y);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> PadResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PadError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(PadError::validation("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();

    // Rounding drift goes into the center tap so the kernel sums to exactly 1.0.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + 65536 - acc).clamp(0, 65536) as u32;

    Ok(weights)
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

fn convolve(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], axis: Axis) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (i64::from(width), i64::from(height));
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i64 - radius;
                let (sx, sy) = match axis {
                    Axis::X => ((x + d).clamp(0, w - 1), y),
                    Axis::Y => (x, (y + d).clamp(0, h - 1)),
                };
                let idx = ((sy * w + sx) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out_idx + c] = q16_to_u8(*a);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
