use anyhow::Result;
use image::DynamicImage;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::classifier::Classifier;
use crate::dataset::Dataset;
use crate::distortion::{distort_image, image_frame, DistortionConfig};
use crate::models::DatasetEntry;

/// Lower edges of buckets `3..=10`. Anything below the first edge is bucket 2.
const BUCKET_EDGES: [f64; 8] = [0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

/// IoU range an evaluated image falls into.
///
/// Keys run from 2 to 10: key 2 covers `[0, 0.2)`, key `k` in `3..=9`
/// covers `[(k-1)/10, k/10)` and key 10 covers `[0.9, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BucketKey(u8);

impl BucketKey {
    pub const COUNT: usize = 9;
    pub const LOWEST: BucketKey = BucketKey(2);
    pub const HIGHEST: BucketKey = BucketKey(10);

    /// Bucket holding `iou`. Negative values and NaN go to the lowest bucket,
    /// values above one to the highest.
    pub fn from_iou(iou: f64) -> Self {
        let above = BUCKET_EDGES.iter().take_while(|&&edge| iou >= edge).count();
        BucketKey(2 + above as u8)
    }

    pub fn all() -> impl Iterator<Item = BucketKey> {
        (2..=10).map(BucketKey)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Lower and upper bound of the bucket's IoU range.
    pub fn range(&self) -> (f64, f64) {
        match self.0 {
            2 => (0.0, 0.2),
            k => ((k - 1) as f64 / 10.0, k as f64 / 10.0),
        }
    }

    fn index(&self) -> usize {
        (self.0 - 2) as usize
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub correct: usize,
    pub incorrect: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }
}

/// Correct/incorrect counters per IoU bucket for one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketStats {
    buckets: [Counts; BucketKey::COUNT],
    skipped: usize,
}

/// Serializable view of [`BucketStats`].
#[derive(Debug, Serialize)]
pub struct BucketReport {
    pub correct: BTreeMap<u8, usize>,
    pub incorrect: BTreeMap<u8, usize>,
    pub skipped: usize,
}

impl BucketStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one classified image in `key`.
    pub fn record(&mut self, key: BucketKey, correct: bool) {
        let counts = &mut self.buckets[key.index()];
        if correct {
            counts.correct += 1;
        } else {
            counts.incorrect += 1;
        }
    }

    /// Count an image that could not be loaded or classified.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn counts(&self, key: BucketKey) -> Counts {
        self.buckets[key.index()]
    }

    pub fn correct(&self, key: BucketKey) -> usize {
        self.counts(key).correct
    }

    pub fn incorrect(&self, key: BucketKey) -> usize {
        self.counts(key).incorrect
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn total_correct(&self) -> usize {
        self.buckets.iter().map(|c| c.correct).sum()
    }

    pub fn total_incorrect(&self) -> usize {
        self.buckets.iter().map(|c| c.incorrect).sum()
    }

    /// Number of classified images, skipped ones excluded.
    pub fn total(&self) -> usize {
        self.total_correct() + self.total_incorrect()
    }

    /// Fraction of correct predictions in `key`, `None` for an empty bucket.
    pub fn accuracy(&self, key: BucketKey) -> Option<f64> {
        let counts = self.counts(key);
        if counts.total() == 0 {
            return None;
        }
        Some(counts.correct as f64 / counts.total() as f64)
    }

    /// Add the counters of `other` to this one.
    pub fn merge(&mut self, other: &BucketStats) {
        for (mine, theirs) in self.buckets.iter_mut().zip(other.buckets.iter()) {
            mine.correct += theirs.correct;
            mine.incorrect += theirs.incorrect;
        }
        self.skipped += other.skipped;
    }

    pub fn report(&self) -> BucketReport {
        BucketReport {
            correct: BucketKey::all().map(|k| (k.value(), self.correct(k))).collect(),
            incorrect: BucketKey::all().map(|k| (k.value(), self.incorrect(k))).collect(),
            skipped: self.skipped,
        }
    }

    /// Per-bucket accuracy table
    pub fn summary(&self) -> String {
        let mut out = String::from("IoU range     correct  incorrect  accuracy\n");
        for key in BucketKey::all() {
            let (low, high) = key.range();
            let accuracy = match self.accuracy(key) {
                Some(acc) => format!("{:.3}", acc),
                None => "-".to_string(),
            };
            out.push_str(&format!(
                "[{:.1}, {:.1}{}  {:>7}  {:>9}  {:>8}\n",
                low,
                high,
                if key == BucketKey::HIGHEST { "]" } else { ")" },
                self.correct(key),
                self.incorrect(key),
                accuracy
            ));
        }
        out.push_str(&format!("skipped: {}", self.skipped));
        out
    }
}

impl fmt::Display for BucketStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |counts: &BTreeMap<u8, usize>| {
            counts
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let report = self.report();
        writeln!(f, "correct:   {{{}}}", join(&report.correct))?;
        write!(f, "incorrect: {{{}}}", join(&report.incorrect))
    }
}

/// Bucket and correctness of one successfully classified image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub iou: f64,
    pub key: BucketKey,
    pub correct: bool,
}

/// Load, distort and classify a single entry.
pub fn evaluate_entry<R: Rng + ?Sized>(
    dataset: &dyn Dataset,
    classifier: &dyn Classifier,
    distortion: &DistortionConfig,
    entry: &DatasetEntry,
    rng: &mut R,
) -> Result<Outcome> {
    let image: DynamicImage = dataset.load(entry)?;
    let (iou, distorted) = distort_image(&image, &image_frame(&image), distortion, rng);
    debug!("Processing file: {}, IoU: {:.4}", entry.file_name(), iou);

    let prediction = classifier.classify(&distorted)?;
    debug!(
        "Prediction: {} ({:.3}), Actual: {}",
        prediction.label, prediction.confidence, entry.label
    );

    Ok(Outcome {
        iou,
        key: BucketKey::from_iou(iou),
        correct: prediction.is_correct(&entry.label),
    })
}

fn tally(stats: &mut BucketStats, entry: &DatasetEntry, outcome: Result<Outcome>) {
    match outcome {
        Ok(outcome) => {
            debug!(
                "{} -> bucket {} (IoU {:.4}, correct: {})",
                entry.file_name(),
                outcome.key,
                outcome.iou,
                outcome.correct
            );
            stats.record(outcome.key, outcome.correct);
        }
        Err(e) => {
            warn!("Skipping image {}: {}", entry.path.display(), e);
            stats.skip();
        }
    }
}

/// Run the robustness evaluation over every entry of `dataset`, one image at
/// a time.
///
/// Images that fail to load or classify are logged and counted as skipped;
/// only a failure to enumerate the dataset is returned as an error.
pub fn evaluate<R: Rng + ?Sized>(
    dataset: &dyn Dataset,
    classifier: &dyn Classifier,
    distortion: &DistortionConfig,
    rng: &mut R,
) -> Result<BucketStats> {
    let entries = dataset.entries()?;
    info!("Evaluating {} images with the {} classifier", entries.len(), classifier.name());

    let mut stats = BucketStats::new();
    for entry in &entries {
        let outcome = evaluate_entry(dataset, classifier, distortion, entry, rng);
        tally(&mut stats, entry, outcome);
    }

    info!("Finished: {} classified, {} skipped", stats.total(), stats.skipped());
    Ok(stats)
}

/// Seed for the image at `index`, so a run does not depend on which worker
/// picks which image.
fn image_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Like [`evaluate`], spread over `workers` threads.
///
/// Each image gets its own RNG derived from `seed` and its position in the
/// dataset, so the result is the same for any worker count. Workers keep
/// their own partial counters, merged once all of them are done.
pub fn evaluate_parallel(
    dataset: &dyn Dataset,
    classifier: &dyn Classifier,
    distortion: &DistortionConfig,
    workers: usize,
    seed: u64,
) -> Result<BucketStats> {
    let entries = dataset.entries()?;
    let workers = workers.max(1);
    info!(
        "Evaluating {} images with the {} classifier on {} workers",
        entries.len(),
        classifier.name(),
        workers
    );

    let next = AtomicUsize::new(0);

    let partials = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let (entries, next) = (&entries, &next);
                scope.spawn(move || {
                    let mut partial = BucketStats::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(entry) = entries.get(index) else {
                            break;
                        };
                        let mut rng = StdRng::seed_from_u64(image_seed(seed, index));
                        let outcome = evaluate_entry(dataset, classifier, distortion, entry, &mut rng);
                        tally(&mut partial, entry, outcome);
                    }
                    partial
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| anyhow::anyhow!("evaluation worker panicked"))
            })
            .collect::<Result<Vec<BucketStats>>>()
    })?;

    let mut stats = BucketStats::new();
    for partial in &partials {
        stats.merge(partial);
    }

    info!("Finished: {} classified, {} skipped", stats.total(), stats.skipped());
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges_are_half_open() {
        assert_eq!(BucketKey::from_iou(0.0).value(), 2);
        assert_eq!(BucketKey::from_iou(0.199_999).value(), 2);
        assert_eq!(BucketKey::from_iou(0.2).value(), 3);
        assert_eq!(BucketKey::from_iou(0.3).value(), 4);
        assert_eq!(BucketKey::from_iou(0.899_999).value(), 9);
        assert_eq!(BucketKey::from_iou(0.9).value(), 10);
        assert_eq!(BucketKey::from_iou(1.0).value(), 10);
    }

    #[test]
    fn out_of_range_values_are_clamped_to_end_buckets() {
        assert_eq!(BucketKey::from_iou(-1.0), BucketKey::LOWEST);
        assert_eq!(BucketKey::from_iou(f64::NAN), BucketKey::LOWEST);
        assert_eq!(BucketKey::from_iou(1.5), BucketKey::HIGHEST);
    }

    #[test]
    fn ranges_cover_unit_interval() {
        let keys: Vec<_> = BucketKey::all().collect();
        assert_eq!(keys.len(), BucketKey::COUNT);
        assert_eq!(keys[0].range().0, 0.0);
        for pair in keys.windows(2) {
            assert_eq!(pair[0].range().1, pair[1].range().0);
        }
        assert_eq!(keys[8].range().1, 1.0);
    }

    #[test]
    fn merge_adds_counters() {
        let mut a = BucketStats::new();
        a.record(BucketKey::from_iou(0.95), true);
        a.skip();
        let mut b = BucketStats::new();
        b.record(BucketKey::from_iou(0.95), false);
        b.record(BucketKey::from_iou(0.1), true);

        a.merge(&b);
        assert_eq!(a.counts(BucketKey::HIGHEST), Counts { correct: 1, incorrect: 1 });
        assert_eq!(a.correct(BucketKey::LOWEST), 1);
        assert_eq!(a.total(), 3);
        assert_eq!(a.skipped(), 1);
        assert_eq!(a.accuracy(BucketKey::HIGHEST), Some(0.5));
        assert_eq!(a.accuracy(BucketKey::from_iou(0.5)), None);
    }

    #[test]
    fn display_lists_both_mappings() {
        let mut stats = BucketStats::new();
        stats.record(BucketKey::from_iou(0.35), true);
        let text = stats.to_string();
        assert!(text.starts_with("correct:   {2: 0, 3: 0, 4: 1,"));
        assert!(text.contains("incorrect: {2: 0,"));
    }
}
