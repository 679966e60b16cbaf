//! Percentile clipping and 8-bit rescaling of the mask channel.

use num_traits::ToPrimitive;

use crate::error::{Error, Result};
use crate::plane::{Plane, PlaneData};

macro_rules! dispatch_samples {
    ($plane:expr, $values:ident => $body:expr) => {
        match $plane.data() {
            PlaneData::U8($values) => $body,
            PlaneData::I8($values) => $body,
            PlaneData::U16($values) => $body,
            PlaneData::I16($values) => $body,
            PlaneData::U32($values) => $body,
            PlaneData::I32($values) => $body,
            PlaneData::F32($values) => $body,
            PlaneData::F64($values) => $body,
        }
    };
}

/// Clips `plane` at its percentile threshold and rescales it to the full 8-bit range.
pub fn normalize(plane: &Plane, percentile: f64) -> Result<Plane> {
    let threshold = find_threshold(plane, percentile)?;
    Ok(clip_and_rescale(plane, threshold))
}

/// Intensity above which the brightest `percentile / 100` percent of positive pixels lie.
///
/// `percentile` is in percent and is divided by 100 once more, so `0.01` keeps the
/// brightest 0.0001 fraction. The result is the `index`-th largest positive value with
/// `index = floor(percentile / 100 * positive_count)`; an index of 0 picks the maximum.
pub fn find_threshold(plane: &Plane, percentile: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&percentile) {
        return Err(Error::InvalidPercentile(percentile));
    }

    let mut positive: Vec<f64> = dispatch_samples!(plane, values => positive_samples(values));
    if positive.is_empty() {
        return Err(Error::EmptyImage);
    }

    let index = (percentile / 100.0 * positive.len() as f64).floor() as usize;
    positive.sort_unstable_by(f64::total_cmp);

    Ok(positive[positive.len() - index.max(1)])
}

/// Sets every pixel above `threshold` to `threshold`, then maps min..max onto 0..255.
///
/// A constant image maps to all zeros. The affine map is applied in `f32` and rounded
/// half to even, matching OpenCV's min-max normalize into an 8-bit destination.
pub fn clip_and_rescale(plane: &Plane, threshold: f64) -> Plane {
    let pixels = dispatch_samples!(plane, values => clip_rescale_samples(values, threshold));
    Plane::new(plane.width(), plane.height(), PlaneData::U8(pixels))
}

fn positive_samples<T: ToPrimitive + Copy>(values: &[T]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| v.to_f64())
        .filter(|v| *v > 0.0)
        .collect()
}

fn clip_rescale_samples<T: ToPrimitive + Copy>(values: &[T], threshold: f64) -> Vec<u8> {
    let clip = |v: &T| {
        let v = v.to_f64().unwrap_or(0.0);
        if v > threshold { threshold } else { v }
    };

    let (min, max) = values
        .iter()
        .map(clip)
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let scale = 255.0 * if max - min > f64::EPSILON {
        1.0 / (max - min)
    } else {
        0.0
    };
    let shift = -min * scale;
    let (scale, shift) = (scale as f32, shift as f32);

    values
        .iter()
        .map(|v| {
            let v = clip(v) as f32;
            (v * scale + shift).round_ties_even().clamp(0.0, 255.0) as u8
        })
        .collect()
}
