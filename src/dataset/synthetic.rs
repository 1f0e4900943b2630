use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::path::Path;

use crate::models::DatasetEntry;

/// Write a small labeled dataset of solid-colour images to `root`.
///
/// Each class gets `per_class` PNGs of `size` x `size` pixels filled with its
/// colour and a darker square placed along the diagonal, so images of one
/// class are not all identical. Returns the entries in the order written.
pub fn write_dataset(
    root: &Path,
    classes: &[(&str, [u8; 3])],
    per_class: usize,
    size: u32,
) -> anyhow::Result<Vec<DatasetEntry>> {
    if size == 0 {
        anyhow::bail!("synthetic image size must be non-zero");
    }

    let mut entries = Vec::new();

    for (label, color) in classes {
        let dir = root.join(label);
        std::fs::create_dir_all(&dir)?;

        for i in 0..per_class {
            let path = dir.join(format!("{:03}.png", i));
            render(*color, size, i)
                .save(&path)
                .map_err(|e| anyhow::anyhow!("Failed to save synthetic image: {}", e))?;
            entries.push(DatasetEntry {
                label: label.to_string(),
                path,
            });
        }
    }

    Ok(entries)
}

fn render(color: [u8; 3], size: u32, index: usize) -> RgbImage {
    let mut img = RgbImage::from_pixel(size, size, Rgb(color));

    let inner = (size / 3).max(1);
    let offset = (index as u32 * 3) % (size - inner + 1);
    let shade = Rgb([color[0] / 2, color[1] / 2, color[2] / 2]);
    draw_filled_rect_mut(
        &mut img,
        Rect::at(offset as i32, offset as i32).of_size(inner, inner),
        shade,
    );

    img
}
