//! OHLCV aggregation into coarser time buckets
//!
//! Used to build intervals the provider does not serve directly, such as
//! four-hour candles from hourly data.

use candle_charts_shared::{Candle, Interval};
use std::collections::HashMap;

/// Start of the bucket containing `time`, floored toward negative infinity
pub fn bucket_start(time: i64, bucket_seconds: i64) -> i64 {
    time.div_euclid(bucket_seconds) * bucket_seconds
}

/// Collapses candles into buckets of `bucket_seconds`.
///
/// The first candle in a bucket seeds it; later candles raise `high`, lower
/// `low`, replace `close` and add `volume`. Buckets are emitted in the order
/// they are first seen, which is ascending for ascending input. A
/// non-positive bucket size returns the input unchanged.
pub fn aggregate(candles: &[Candle], bucket_seconds: i64) -> Vec<Candle> {
    if bucket_seconds <= 0 {
        log::warn!("ignoring aggregation into non-positive bucket of {bucket_seconds}s");
        return candles.to_vec();
    }

    let mut buckets: Vec<Candle> = Vec::new();
    let mut index_by_key: HashMap<i64, usize> = HashMap::new();

    for candle in candles {
        let key = bucket_start(candle.time, bucket_seconds);
        match index_by_key.get(&key) {
            Some(&index) => {
                let bucket = &mut buckets[index];
                bucket.high = bucket.high.max(candle.high);
                bucket.low = bucket.low.min(candle.low);
                bucket.close = candle.close;
                bucket.volume = bucket.volume.saturating_add(candle.volume);
            }
            None => {
                index_by_key.insert(key, buckets.len());
                buckets.push(Candle { time: key, ..*candle });
            }
        }
    }

    buckets
}

/// Aggregates provider candles into `target` when it is a derived interval;
/// otherwise returns them as-is.
pub fn aggregate_to_interval(candles: Vec<Candle>, target: Interval) -> Vec<Candle> {
    if target.is_derived() {
        aggregate(&candles, target.seconds())
    } else {
        candles
    }
}
