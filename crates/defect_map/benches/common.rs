use std::time::Duration;

use criterion::{Criterion, Throughput};
use defect_map::prelude::{Category, MeasurementKey, MeasurementStore, Subtype};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

#[allow(dead_code)]
pub const FACE_COUNTS: [usize; 4] = [1_000, 10_000, 100_000, 1_000_000];

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Deterministic pseudo-measurements in `[0, 20)` for every key.
pub fn synthetic_store(face_count: usize) -> MeasurementStore {
    let mut store = MeasurementStore::with_face_count(face_count);
    for (k, key) in MeasurementKey::all().enumerate() {
        let values: Vec<f64> = (0..face_count)
            .map(|i| ((i * 7919 + k * 104_729) % 20_000) as f64 / 1000.0)
            .collect();
        store.insert(key, values).expect("consistent face count");
    }
    store
}

pub fn radii(subtype: Subtype) -> MeasurementKey {
    MeasurementKey::new(Category::Radii, subtype)
}
