//! Delivery-speed buckets and review scores per bucket.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::data::OrderLine;

/// Coarse delivery-speed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeliveryBucket {
    #[serde(rename = "1-3 days")]
    Fast,
    #[serde(rename = "4-7 days")]
    Standard,
    #[serde(rename = "8+ days")]
    Slow,
    Unknown,
}

impl DeliveryBucket {
    /// Buckets with a known speed, in display order.
    pub const KNOWN: [DeliveryBucket; 3] = [Self::Fast, Self::Standard, Self::Slow];

    /// Same-day deliveries land in the fastest bucket.
    pub fn from_days(days: Option<i64>) -> Self {
        match days {
            Some(d) if d < 0 => Self::Unknown,
            Some(0..=3) => Self::Fast,
            Some(4..=7) => Self::Standard,
            Some(_) => Self::Slow,
            None => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fast => "1-3 days",
            Self::Standard => "4-7 days",
            Self::Slow => "8+ days",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DeliveryBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A reviewed order line reduced to its bucket and score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SatisfactionPoint {
    pub bucket: DeliveryBucket,
    pub review_score: u8,
}

/// Mean review score of one known bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketScore {
    pub bucket: DeliveryBucket,
    pub mean_score: Option<f64>,
    pub reviews: usize,
}

/// Pair every line that has a review with its delivery bucket.
///
/// Lines whose order has no review are skipped. Multi-item orders contribute
/// one point per line.
pub fn delivery_satisfaction(
    records: &[OrderLine],
    review_scores: &HashMap<String, u8>,
) -> Vec<SatisfactionPoint> {
    records
        .iter()
        .filter_map(|line| {
            let score = *review_scores.get(&line.order_id)?;
            Some(SatisfactionPoint {
                bucket: DeliveryBucket::from_days(line.delivery_days()),
                review_score: score,
            })
        })
        .collect()
}

/// Mean score per known bucket, always in `1-3`, `4-7`, `8+` order.
/// `Unknown` points are ignored.
pub fn bucket_mean_scores(points: &[SatisfactionPoint]) -> Vec<BucketScore> {
    DeliveryBucket::KNOWN
        .iter()
        .map(|&bucket| {
            let scores: Vec<f64> = points
                .iter()
                .filter(|p| p.bucket == bucket)
                .map(|p| f64::from(p.review_score))
                .collect();
            BucketScore {
                bucket,
                mean_score: mean(&scores),
                reviews: scores.len(),
            }
        })
        .collect()
}

/// Mean review score across every point, `Unknown` bucket included.
pub fn average_review_score(points: &[SatisfactionPoint]) -> Option<f64> {
    let scores: Vec<f64> = points.iter().map(|p| f64::from(p.review_score)).collect();
    mean(&scores)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
