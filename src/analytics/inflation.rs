//! Basket-proxy "inflation" index.
//!
//! Each day's value is the plain mean of every price observed that day, across
//! all products and stores. It is a trend proxy only: a day where cheap items
//! happen to be reported more often reads as cheaper, so it must not be read
//! as a cost-of-living index.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{InflationPoint, InflationSeries, PriceObservation, Window};
use crate::math::round2;

/// Daily mean prices inside `window` and the change from first to last day.
///
/// Days without observations are left out. `change_percent` is computed on the
/// rounded daily means and is `0.0` with fewer than two days or a zero first
/// value.
pub fn inflation_series(observations: &[PriceObservation], window: &Window) -> InflationSeries {
    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for obs in observations.iter().filter(|o| window.contains(o.date)) {
        let slot = by_day.entry(obs.date).or_insert((0.0, 0));
        slot.0 += obs.price;
        slot.1 += 1;
    }

    let points: Vec<InflationPoint> = by_day
        .into_iter()
        .map(|(date, (sum, count))| InflationPoint {
            date,
            average_price: round2(sum / count as f64),
        })
        .collect();

    let change_percent = change_percent(&points);
    InflationSeries {
        points,
        change_percent,
    }
}

fn change_percent(points: &[InflationPoint]) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if points.len() < 2 || first.average_price == 0.0 {
        return 0.0;
    }
    round2((last.average_price - first.average_price) / first.average_price * 100.0)
}
