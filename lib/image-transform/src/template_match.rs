//! "I Spy": find the best match of a template inside the source image and
//! outline it.
//!
//! Scoring is the normalized correlation coefficient summed over the three
//! colour planes. The best position is always reported, however low its
//! score: there is no rejection threshold and no rotation or scale search.

use crate::{PixelBuffer, TransformError, TransformResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Row-major score map, one entry per template position.
    pub scores: Vec<f64>,
    pub width: u32,
    pub height: u32,

    /// Top-left corner of the best match.
    pub location: (u32, u32),
    pub score: f64,
}

impl MatchResult {
    /// Score of the template placed at `(x, y)`, `None` outside the score map.
    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.scores.get((y * self.width + x) as usize).copied()
    }
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct TemplateMatchConfig {
    #[derivative(Default(value = "[0, 255, 0]"))]
    color: [u8; 3],
}

impl TemplateMatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of `image` with an unfilled rectangle around the best match.
    pub fn apply(
        &self,
        image: &PixelBuffer,
        template: &PixelBuffer,
    ) -> TransformResult<PixelBuffer> {
        let result = match_template(image, template)?;
        let (x, y) = result.location;
        log::debug!("template match at ({x}, {y}) score {:.4}", result.score);

        let mut out = image.to_rgb();
        let rect = Rect::at(x as i32, y as i32).of_size(template.width(), template.height());
        draw_hollow_rect_mut(&mut out, rect, Rgb(self.color));

        Ok(PixelBuffer::Rgb(out))
    }
}

pub fn match_template(image: &PixelBuffer, template: &PixelBuffer) -> TransformResult<MatchResult> {
    let (iw, ih) = image.dimensions();
    let (tw, th) = template.dimensions();

    if tw == 0 || th == 0 {
        return Err(TransformError::InvalidParameter(
            "template image is empty".to_string(),
        ));
    }

    if tw > iw || th > ih {
        return Err(TransformError::InvalidParameter(format!(
            "template {tw}x{th} does not fit inside source {iw}x{ih}"
        )));
    }

    let source = image.to_rgb();
    let templ = template.to_rgb();
    let (out_w, out_h) = (iw - tw + 1, ih - th + 1);
    let n = (tw * th) as f64;

    let mut t_mean = [0f64; 3];
    for p in templ.pixels() {
        for c in 0..3 {
            t_mean[c] += p[c] as f64;
        }
    }
    t_mean.iter_mut().for_each(|m| *m /= n);

    let t_var: f64 = templ
        .pixels()
        .map(|p| {
            (0..3)
                .map(|c| {
                    let d = p[c] as f64 - t_mean[c];
                    d * d
                })
                .sum::<f64>()
        })
        .sum();

    let sums = WindowSums::new(&source);
    let mut scores = vec![0f64; (out_w * out_h) as usize];
    scores
        .par_chunks_mut(out_w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, score) in row.iter_mut().enumerate() {
                let (x, y) = (x as u32, y as u32);
                *score = window_score(&source, &templ, &sums, x, y, &t_mean, t_var, n);
            }
        });

    let (mut best, mut best_score) = (0usize, f64::NEG_INFINITY);
    for (i, &s) in scores.iter().enumerate() {
        if s > best_score {
            best = i;
            best_score = s;
        }
    }

    let location = (best as u32 % out_w, best as u32 / out_w);
    Ok(MatchResult {
        scores,
        width: out_w,
        height: out_h,
        location,
        score: best_score,
    })
}

/// Per-channel summed-area tables of the source and of its squares, so the
/// window sums cost four lookups each.
struct WindowSums {
    stride: usize,
    sum: [Vec<u64>; 3],
    sum_sq: [Vec<u64>; 3],
}

impl WindowSums {
    fn new(image: &RgbImage) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let stride = width + 1;
        let mut sum: [Vec<u64>; 3] = std::array::from_fn(|_| vec![0; stride * (height + 1)]);
        let mut sum_sq: [Vec<u64>; 3] = std::array::from_fn(|_| vec![0; stride * (height + 1)]);

        for y in 0..height {
            let mut row_sum = [0u64; 3];
            let mut row_sum_sq = [0u64; 3];
            for x in 0..width {
                let p = image.get_pixel(x as u32, y as u32);
                let idx = (y + 1) * stride + (x + 1);
                for c in 0..3 {
                    let v = p[c] as u64;
                    row_sum[c] += v;
                    row_sum_sq[c] += v * v;
                    sum[c][idx] = sum[c][idx - stride] + row_sum[c];
                    sum_sq[c][idx] = sum_sq[c][idx - stride] + row_sum_sq[c];
                }
            }
        }

        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    /// `(sum, sum of squares)` of channel `c` over the `w`x`h` window at `(x, y)`.
    fn window(&self, c: usize, x: u32, y: u32, w: u32, h: u32) -> (f64, f64) {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        let area = |table: &[u64]| {
            let total = table[y1 * self.stride + x1] + table[y0 * self.stride + x0];
            (total - table[y0 * self.stride + x1] - table[y1 * self.stride + x0]) as f64
        };

        (area(&self.sum[c]), area(&self.sum_sq[c]))
    }
}

#[allow(clippy::too_many_arguments)]
fn window_score(
    source: &RgbImage,
    templ: &RgbImage,
    sums: &WindowSums,
    x: u32,
    y: u32,
    t_mean: &[f64; 3],
    t_var: f64,
    n: f64,
) -> f64 {
    let mut cross = [0f64; 3];
    for (tx, ty, tp) in templ.enumerate_pixels() {
        let ip = source.get_pixel(x + tx, y + ty);
        for c in 0..3 {
            cross[c] += ip[c] as f64 * tp[c] as f64;
        }
    }

    // sum((I - mean_I) * (T - mean_T)) = sum(I * T) - mean_T * sum(I)
    let mut coeff = 0.0;
    let mut i_var = 0.0;
    for c in 0..3 {
        let (sum_i, sum_i_sq) = sums.window(c, x, y, templ.width(), templ.height());
        coeff += cross[c] - t_mean[c] * sum_i;
        i_var += sum_i_sq - sum_i * sum_i / n;
    }

    let denom = (i_var.max(0.0) * t_var).sqrt();
    if denom > 1e-9 { coeff / denom } else { 0.0 }
}
