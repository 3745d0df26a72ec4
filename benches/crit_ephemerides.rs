/*
 * Almagest
 * Copyright (C) 2021-onward Christopher Rabotin <christopher.rabotin@gmail.com> et al. (cf. AUTHORS.md)
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * Documentation: https://nyxspace.com/
 */

use almagest::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
    let almanac = Almanac::new();
    let time = AstroTime::from_civil(2023, 6, 21, 0, 0, 0.0);

    c.bench_function("helio_vector mars", |b| {
        b.iter(|| almanac.helio_vector(black_box(Body::Mars), black_box(time)))
    });

    c.bench_function("geo moon", |b| {
        b.iter(|| almanac.geo_moon(black_box(time)))
    });

    c.bench_function("pluto cached query", |b| {
        // First call populates the segment; subsequent calls hit the cache.
        let _ = almanac.calc_pluto(time, true);
        b.iter(|| almanac.calc_pluto(black_box(time), true))
    });

    c.bench_function("moon phase search", |b| {
        b.iter(|| almanac.search_moon_phase(black_box(180.0), time, 40.0))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
