use image::imageops::FilterType;
use image::DynamicImage;
use rten_tensor::NdTensor;

/// Resize to the network input size and convert to RGB
pub fn resize(img: &DynamicImage, width: u32, height: u32) -> image::RgbImage {
    img.resize_exact(width, height, FilterType::Triangle).to_rgb8()
}

/// Pack images into a `N x 3 x H x W` tensor with channel values in `[0, 1]`.
///
/// All images must share the same dimensions.
pub fn to_tensor(images: &[image::RgbImage]) -> NdTensor<f32, 4> {
    let (width, height) = images.first().map(|img| img.dimensions()).unwrap_or((0, 0));
    let (w, h) = (width as usize, height as usize);

    let mut data = vec![0.0f32; images.len() * 3 * h * w];
    for (n, img) in images.iter().enumerate() {
        for (x, y, pixel) in img.enumerate_pixels() {
            for c in 0..3 {
                let idx = ((n * 3 + c) * h + y as usize) * w + x as usize;
                data[idx] = pixel[c] as f32 / 255.0;
            }
        }
    }

    NdTensor::from_data([images.len(), 3, h, w], data)
}

/// Turn raw scores into a probability distribution.
///
/// Scores that already form a distribution are returned unchanged, anything
/// else goes through a softmax.
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    let sum: f32 = scores.iter().sum();
    let is_distribution = scores.iter().all(|s| (0.0..=1.0).contains(s)) && (sum - 1.0).abs() < 1e-3;
    if is_distribution {
        return scores.to_vec();
    }

    let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Index and value of the largest entry, first one on ties.
pub fn top1(probs: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &p) in probs.iter().enumerate() {
        match best {
            Some((_, current)) if p <= current => {}
            _ => best = Some((idx, p)),
        }
    }
    best
}
