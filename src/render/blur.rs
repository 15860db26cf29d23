use crate::foundation::error::{WeatherscapeError, WeatherscapeResult};

/// Kernel radius covering three standard deviations.
pub fn radius_for_sigma(sigma: f64) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Separable gaussian blur over a premultiplied RGBA8 buffer. Edges clamp.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    sigma: f64,
) -> WeatherscapeResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| WeatherscapeError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(WeatherscapeError::render(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    let radius = radius_for_sigma(sigma);
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma);
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];
    // Horizontal then vertical; `(len, step)` describe one line along the blurred axis.
    blur_pass(src, &mut tmp, (width, 1), (height, width), &kernel);
    blur_pass(&tmp, &mut out, (height, width), (width, 1), &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f64) -> Vec<u32> {
    let r = radius as i32;
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + 65536 - acc).clamp(0, 65536) as u32;
    weights
}

/// One blur pass. `along = (len, step)` walks pixels on a line, `across` walks lines.
fn blur_pass(src: &[u8], dst: &mut [u8], along: (u32, u32), across: (u32, u32), k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let (len, step) = (i64::from(along.0), i64::from(along.1));
    let (lines, line_step) = (i64::from(across.0), i64::from(across.1));
    for line in 0..lines {
        let base = line * line_step;
        for i in 0..len {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let si = (i + ki as i64 - radius).clamp(0, len - 1);
                let idx = ((base + si * step) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((base + i * step) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = (((acc[c] + 32768) >> 16).min(255)) as u8;
            }
        }
    }
}

/// Source-over for premultiplied RGBA8 pixels.
pub fn premul_over_px(dst: &mut [u8], src: &[u8]) {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return;
    }
    let inv = 255 - sa;
    for c in 0..4 {
        let d = (u16::from(dst[c]) * inv + 127) / 255;
        dst[c] = (u16::from(src[c]) + d).min(255) as u8;
    }
}

pub fn premul_over_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        premul_over_px(d, s);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
