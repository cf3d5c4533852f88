//! Unit tests for expo-exposure.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use expo_core::{AgendaClock, AgentId, Coord, LonLat, Tick, TravelMode};
use expo_schedule::{
    ActivityDescriptor, ActivityKind, ActivityScheduler, BufferMethod, Schedule, TimestepGrid,
    Timing, resample,
};
use expo_spatial::{GridExtent, LonLatIdentity, StraightLineRouter};

use crate::{
    ActivityAggregator, DayType, DayValues, ExposureDataset, ExposureError, ExposureResult,
    ExposureSample, ExposureSampler, Grid, QualityRule, RasterCube, RasterCubeBuilder,
    SampledSlice, Stats, WeeklyCombiner, WeeklyVariable, day_grid, load_cube_reader,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const AGENT: AgentId = AgentId(3);

fn day_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

fn hourly() -> Vec<NaiveDateTime> {
    (0..24).map(|h| day_start() + Duration::hours(h)).collect()
}

fn clock() -> AgendaClock {
    AgendaClock::minutes(day_start())
}

/// 20 × 20 grid of 10 m cells, upper-left corner (0, 200).
fn extent() -> GridExtent {
    GridExtent::new(0.0, 200.0, 10.0, 10.0, 20, 20).unwrap()
}

fn centre() -> Coord {
    Coord::new(105.0, 105.0)
}

fn vars(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn hour_grid() -> TimestepGrid {
    TimestepGrid::uniform(Tick(0), 60, 24).unwrap()
}

fn single(desc: ActivityDescriptor) -> Schedule {
    ActivityScheduler::new(AGENT, Tick(0), Tick(1440)).then(desc).build().unwrap()
}

fn sample_all(dataset: &dyn ExposureDataset, schedule: &Schedule, variables: &[String]) -> Vec<SampledSlice> {
    let sampler = ExposureSampler::new(dataset, &StraightLineRouter, &LonLatIdentity, clock());
    let slices = resample(schedule, &hour_grid()).unwrap();
    sampler.sample_schedule(schedule, &slices, variables).unwrap()
}

/// Cube where one layer holds `cells` and every other cell is no-data.
fn sparse_cube(variable: &str, cells: &[((usize, usize), f32)]) -> RasterCube {
    let mut b = RasterCubeBuilder::new(extent());
    for &t in &hourly() {
        b.layer(variable, t, Grid::filled(20, 20, f32::NAN));
        for &((r, c), v) in cells {
            b.cell(variable, t, r, c, v).unwrap();
        }
    }
    b.build().unwrap()
}

// ── Dataset ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dataset {
    use super::*;

    #[test]
    fn latest_timestep_at_or_before() {
        let ts = [day_start() + Duration::hours(3), day_start(), day_start() + Duration::hours(1)];
        let cube = RasterCube::uniform(extent(), &["x"], &ts, 1.0);
        assert_eq!(cube.timesteps()[0], day_start(), "timesteps sorted on load");

        let at = |h: i64, m: i64| day_start() + Duration::hours(h) + Duration::minutes(m);
        assert_eq!(cube.nearest_timestep_at_or_before(at(2, 30)), Some(at(1, 0)));
        assert_eq!(cube.nearest_timestep_at_or_before(at(3, 0)), Some(at(3, 0)));
        assert_eq!(cube.nearest_timestep_at_or_before(at(23, 0)), Some(at(3, 0)));
        assert_eq!(cube.nearest_timestep_at_or_before(day_start() - Duration::minutes(1)), None);
    }

    #[test]
    fn resolution_from_first_two_timesteps() {
        let cube = RasterCube::uniform(extent(), &["x"], &hourly(), 1.0);
        assert_eq!(cube.resolution(), Duration::hours(1));
        let one = RasterCube::uniform(extent(), &["x"], &[day_start()], 1.0);
        assert_eq!(one.resolution(), Duration::hours(1));
    }

    #[test]
    fn read_unknown_variable_and_timestep() {
        let cube = RasterCube::uniform(extent(), &["x"], &hourly(), 1.0);
        assert!(matches!(cube.read("y", day_start()), Err(ExposureError::UnknownVariable(_))));
        let off = day_start() + Duration::minutes(30);
        assert!(matches!(cube.read("x", off), Err(ExposureError::NoTimestep(_))));
    }

    #[test]
    fn window_truncates_at_grid_edge() {
        let g = Grid::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let w = g.window(expo_spatial::CellWindow { row_off: 1, col_off: 1, rows: 2, cols: 2 });
        assert_eq!(w.shape(), (1, 2));
        assert_eq!(w.values(), &[5.0, 6.0]);
    }

    #[test]
    fn cells_outside_grid_are_none() {
        let mut g = Grid::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(g.get(1, 2), Some(6.0));
        // (0, 3) would alias (1, 0) in row-major order.
        assert_eq!(g.get(0, 3), None);
        assert_eq!(g.get(2, 0), None);
        assert!(g.get_mut(usize::MAX, 0).is_none());
        *g.get_mut(0, 1).unwrap() = 9.0;
        assert_eq!(g.get(0, 1), Some(9.0));
    }

    #[test]
    fn cell_into_smaller_layer_is_rejected() {
        let mut b = RasterCubeBuilder::new(extent());
        b.layer("x", day_start(), Grid::filled(2, 2, 0.0));
        assert!(matches!(b.cell("x", day_start(), 5, 5, 1.0), Err(ExposureError::InvalidCube(_))));
        assert!(b.cell("x", day_start(), 1, 1, 1.0).is_ok());
    }

    #[test]
    fn csv_cells_not_listed_are_missing() {
        let data = "\
variable,timestep,row,col,value
NO2,2020-07-01 00:00:00,0,0,21.5
NO2,2020-07-01 01:00:00,0,1,22.0
noise,2020-07-01 00:00:00,1,1,60000
";
        let cube = load_cube_reader(data.as_bytes(), extent()).unwrap();
        assert_eq!(cube.variables(), &["NO2".to_string(), "noise".to_string()]);
        assert_eq!(cube.timesteps().len(), 2);

        let g = cube.read("NO2", day_start()).unwrap();
        assert_eq!(g.get(0, 0), Some(21.5));
        assert!(g.get(0, 1).is_some_and(f32::is_nan));
        // Layer never mentioned in the file is all no-data.
        let late = cube.read("noise", day_start() + Duration::hours(1)).unwrap();
        assert!(late.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn csv_cell_outside_extent_rejected() {
        let data = "variable,timestep,row,col,value\nNO2,2020-07-01 00:00:00,20,0,1\n";
        assert!(matches!(load_cube_reader(data.as_bytes(), extent()), Err(ExposureError::InvalidCube(_))));
    }

    #[test]
    fn csv_bad_timestamp_rejected() {
        let data = "variable,timestep,row,col,value\nNO2,yesterday,0,0,1\n";
        assert!(load_cube_reader(data.as_bytes(), extent()).is_err());
    }

    #[test]
    fn day_grid_follows_dataset_resolution() {
        let g = day_grid(&clock(), Duration::hours(1), Tick(0), Tick(1440)).unwrap();
        assert_eq!(g, hour_grid());

        let g = day_grid(&clock(), Duration::hours(7), Tick(0), Tick(1440)).unwrap();
        assert_eq!(g.len(), 4);
        assert_eq!(g.windows()[3].len(), 180);
        assert_eq!(g.end(), Tick(1440));
    }
}

// ── Sampler ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sampler {
    use super::*;

    #[test]
    fn quality_rule_drops_sentinels_and_floors() {
        let q = QualityRule::default();
        assert_eq!(q.correct(f32::NAN), None);
        assert_eq!(q.correct(-10.5), None);
        assert_eq!(q.correct(-10.0), Some(0.0));
        assert_eq!(q.correct(-3.0), Some(0.0));
        assert_eq!(q.correct(4.5), Some(4.5));
    }

    #[test]
    fn mean_ignores_missing_cells() {
        // r = 1 cross around cell (9, 10): (8,10) (9,9) (9,10) (9,11) (10,10).
        let cube = sparse_cube("x", &[((9, 10), 2.0), ((8, 10), 4.0), ((9, 9), -50.0)]);
        let sampler = ExposureSampler::new(&cube, &StraightLineRouter, &LonLatIdentity, clock());
        let ctx = expo_spatial::SpatialContextResolver::new(extent()).buffer(centre(), 10.0).unwrap();

        let mean = sampler.sample(&ctx, BufferMethod::Mean, "x", day_start()).unwrap();
        assert_eq!(mean, ExposureSample::Value(3.0));
        let sum = sampler.sample(&ctx, BufferMethod::Sum, "x", day_start()).unwrap();
        assert_eq!(sum, ExposureSample::Value(6.0));
    }

    #[test]
    fn masked_out_cells_never_count() {
        // (8, 9) is in the 3×3 window but outside the cross mask.
        let cube = sparse_cube("x", &[((8, 9), 100.0), ((9, 10), 1.0)]);
        let sampler = ExposureSampler::new(&cube, &StraightLineRouter, &LonLatIdentity, clock());
        let ctx = expo_spatial::SpatialContextResolver::new(extent()).buffer(centre(), 10.0).unwrap();
        let mean = sampler.sample(&ctx, BufferMethod::Mean, "x", day_start()).unwrap();
        assert_eq!(mean, ExposureSample::Value(1.0));
    }

    #[test]
    fn sum_over_no_valid_cells_is_missing() {
        let cube = sparse_cube("x", &[]);
        let sampler = ExposureSampler::new(&cube, &StraightLineRouter, &LonLatIdentity, clock());
        let ctx = expo_spatial::SpatialContextResolver::new(extent()).buffer(centre(), 30.0).unwrap();
        for method in [BufferMethod::Sum, BufferMethod::Mean] {
            let s = sampler.sample(&ctx, method, "x", day_start()).unwrap();
            assert_eq!(s, ExposureSample::Missing);
        }
    }

    #[test]
    fn slice_start_floored_to_hour_then_previous_timestep() {
        let two_hourly: Vec<_> = (0..12).map(|h| day_start() + Duration::hours(2 * h)).collect();
        let cube = RasterCube::uniform(extent(), &["x"], &two_hourly, 1.0);
        let sampler = ExposureSampler::new(&cube, &StraightLineRouter, &LonLatIdentity, clock());
        assert_eq!(sampler.timestep_for(Tick(150)).unwrap(), day_start() + Duration::hours(2));
        assert_eq!(sampler.timestep_for(Tick(90)).unwrap(), day_start());
        assert_eq!(sampler.timestep_for(Tick(239)).unwrap(), day_start() + Duration::hours(2));
    }

    #[test]
    fn no_timestep_before_slice_is_an_error() {
        let cube = RasterCube::uniform(extent(), &["x"], &[day_start() + Duration::hours(5)], 1.0);
        let sampler = ExposureSampler::new(&cube, &StraightLineRouter, &LonLatIdentity, clock());
        assert!(matches!(sampler.timestep_for(Tick(0)), Err(ExposureError::NoTimestep(_))));
    }

    /// Dataset whose layers are smaller than its declared extent.
    struct Truncated {
        extent:    GridExtent,
        timesteps: Vec<NaiveDateTime>,
        variables: Vec<String>,
        grid:      Grid,
    }

    impl ExposureDataset for Truncated {
        fn extent(&self) -> &GridExtent {
            &self.extent
        }
        fn timesteps(&self) -> &[NaiveDateTime] {
            &self.timesteps
        }
        fn variables(&self) -> &[String] {
            &self.variables
        }
        fn read(&self, _variable: &str, _timestep: NaiveDateTime) -> ExposureResult<&Grid> {
            Ok(&self.grid)
        }
    }

    #[test]
    fn shape_disagreement_is_a_computation_error() {
        let ds = Truncated {
            extent:    extent(),
            timesteps: vec![day_start()],
            variables: vars(&["x"]),
            grid:      Grid::filled(10, 10, 1.0),
        };
        let sampler = ExposureSampler::new(&ds, &StraightLineRouter, &LonLatIdentity, clock());
        // Window rows 8..11, cols 9..12 runs past the 10 × 10 layer.
        let ctx = expo_spatial::SpatialContextResolver::new(extent()).buffer(centre(), 10.0).unwrap();
        let err = sampler.sample(&ctx, BufferMethod::Mean, "x", day_start()).unwrap_err();
        assert!(matches!(err, ExposureError::ShapeMismatch { expected: (3, 3), actual: (2, 1), .. }));
    }

    #[test]
    fn unknown_travel_mode_is_out_of_band() {
        let cube = RasterCube::uniform(extent(), &["x", "y"], &hourly(), 5.0);
        let schedule = single(ActivityDescriptor::commute(
            ActivityKind::CommuteHomeToWork,
            LonLat::new(50.0, 150.0),
            LonLat::new(150.0, 50.0),
            TravelMode::Unknown,
            1440,
        ));
        let sampled = sample_all(&cube, &schedule, &vars(&["x", "y"]));
        assert_eq!(sampled.len(), 24);
        for s in &sampled {
            assert_eq!(s.values, vec![ExposureSample::OutOfBand; 2]);
            assert_eq!(s.values[0].persisted(), Some(ExposureSample::OUT_OF_BAND_MARKER));
            assert_eq!(s.values[0].value(), None);
        }
    }

    #[test]
    fn routed_commute_is_sampled() {
        // LonLatIdentity: the dataset is "gridded in degrees" so route
        // vertices map straight onto grid coordinates.
        let cube = RasterCube::uniform(extent(), &["x"], &hourly(), 8.0);
        let schedule = single(ActivityDescriptor::commute(
            ActivityKind::CommuteHomeToWork,
            LonLat::new(15.0, 185.0),
            LonLat::new(185.0, 15.0),
            TravelMode::Car,
            1440,
        ));
        let sampled = sample_all(&cube, &schedule, &vars(&["x"]));
        assert!(sampled.iter().all(|s| s.values == vec![ExposureSample::Value(8.0)]));
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod aggregate {
    use super::*;

    #[test]
    fn uniform_raster_home_day_is_the_raster_value() {
        let cube = RasterCube::uniform(extent(), &["x"], &hourly(), 5.0);
        let schedule = single(ActivityDescriptor::point(ActivityKind::Home, centre(), Timing::FillsRemaining));
        let sampled = sample_all(&cube, &schedule, &vars(&["x"]));

        let agg = ActivityAggregator::from_clock(&clock());
        let acts = agg.activities(&schedule, &sampled, 1);
        assert_eq!(acts.len(), 1);
        assert_eq!(acts[0].values, vec![Some(5.0)]);
        assert_eq!(agg.daily(AGENT, &sampled, 1).values, vec![Some(5.0)]);
    }

    #[test]
    fn buffer_over_no_data_is_missing_all_the_way_up() {
        let cube = sparse_cube("x", &[]);
        let schedule = single(ActivityDescriptor::buffer(ActivityKind::Home, centre(), 50.0, Timing::FillsRemaining));
        let sampled = sample_all(&cube, &schedule, &vars(&["x"]));

        let agg = ActivityAggregator::from_clock(&clock());
        assert_eq!(agg.activities(&schedule, &sampled, 1)[0].values, vec![None]);
        assert_eq!(agg.daily(AGENT, &sampled, 1).values, vec![None]);
    }

    #[test]
    fn weights_by_slice_duration() {
        // 06:00-18:00 on a raster that is 10 before noon and 20 after.
        let mut b = RasterCubeBuilder::new(extent());
        for (h, &t) in hourly().iter().enumerate() {
            b.layer("x", t, Grid::filled(20, 20, if h < 12 { 10.0 } else { 20.0 }));
        }
        let cube = b.build().unwrap();

        let schedule = ActivityScheduler::new(AGENT, Tick(0), Tick(1440))
            .then(ActivityDescriptor::point(ActivityKind::Home, centre(), Timing::Fixed(390)))
            .then(ActivityDescriptor::point(ActivityKind::Work, centre(), Timing::Fixed(720)))
            .then(ActivityDescriptor::point(ActivityKind::Home, centre(), Timing::FillsRemaining))
            .build()
            .unwrap();
        let sampled = sample_all(&cube, &schedule, &vars(&["x"]));
        let agg = ActivityAggregator::new(1440);
        let acts = agg.activities(&schedule, &sampled, 1);

        // Work runs 06:30-18:30: 330 min at 10, 390 min at 20.
        let expected = (330.0 * 10.0 + 390.0 * 20.0) / 720.0;
        assert!((acts[1].values[0].unwrap() - expected).abs() < 1e-9);
        assert_eq!(acts.iter().map(|a| a.ordinal).collect::<Vec<_>>(), vec![0, 1, 2]);
        // Day: 12 h at 10 and 12 h at 20.
        assert!((agg.daily(AGENT, &sampled, 1).values[0].unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn missing_is_scoped_to_its_own_aggregate() {
        // Variable "y" is missing only in the first hour.
        let mut b = RasterCubeBuilder::new(extent());
        for (h, &t) in hourly().iter().enumerate() {
            b.layer("x", t, Grid::filled(20, 20, 1.0));
            b.layer("y", t, Grid::filled(20, 20, if h == 0 { f32::NAN } else { 2.0 }));
        }
        let cube = b.build().unwrap();

        let schedule = ActivityScheduler::new(AGENT, Tick(0), Tick(1440))
            .then(ActivityDescriptor::point(ActivityKind::Home, centre(), Timing::Fixed(60)))
            .then(ActivityDescriptor::point(ActivityKind::Home, centre(), Timing::FillsRemaining))
            .build()
            .unwrap();
        let sampled = sample_all(&cube, &schedule, &vars(&["x", "y"]));
        let agg = ActivityAggregator::new(1440);

        let acts = agg.activities(&schedule, &sampled, 2);
        assert_eq!(acts[0].values, vec![Some(1.0), None]);
        assert_eq!(acts[1].values, vec![Some(1.0), Some(2.0)]);
        assert_eq!(agg.daily(AGENT, &sampled, 2).values, vec![Some(1.0), None]);
    }
}

// ── Weekly ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod weekly {
    use super::*;

    fn day(values: &[(u32, Vec<Option<f64>>)]) -> DayValues {
        values.iter().map(|(a, v)| (AgentId(*a), v.clone())).collect()
    }

    fn workweek(variable: WeeklyVariable) -> WeeklyCombiner {
        WeeklyCombiner::new(
            vec![DayType::new("workday", 5.0), DayType::new("weekend", 2.0)],
            vec![variable],
        )
        .unwrap()
    }

    #[test]
    fn five_workdays_and_two_weekend_days() {
        let c = workweek(WeeklyVariable::linear("no2"));
        let out = c
            .combine(&[&day(&[(1, vec![Some(10.0)])]), &day(&[(1, vec![Some(20.0)])])])
            .unwrap();
        let v = out[&AgentId(1)][0].unwrap();
        assert!((v - 90.0 / 7.0).abs() < 1e-12);
        assert!((v - 12.857_142_857).abs() < 1e-8);
    }

    #[test]
    fn decibel_applied_once_to_the_linear_average() {
        let c = WeeklyCombiner::new(
            vec![DayType::new("a", 1.0), DayType::new("b", 1.0)],
            vec![WeeklyVariable::decibel("noise")],
        )
        .unwrap();
        let out = c
            .combine(&[&day(&[(1, vec![Some(10.0)])]), &day(&[(1, vec![Some(1000.0)])])])
            .unwrap();
        let db = out[&AgentId(1)][0].unwrap();
        assert!((db - 10.0 * 505.0f64.log10()).abs() < 1e-12);
        // Not the mean of per-day decibels (20 dB).
        assert!((db - 20.0).abs() > 1.0);
    }

    #[test]
    fn non_positive_linear_noise_has_no_decibel_value() {
        let c = workweek(WeeklyVariable::decibel("noise"));
        let out = c
            .combine(&[&day(&[(1, vec![Some(0.0)])]), &day(&[(1, vec![Some(0.0)])])])
            .unwrap();
        assert_eq!(out[&AgentId(1)], vec![None]);
    }

    #[test]
    fn any_missing_day_makes_the_week_missing() {
        let c = workweek(WeeklyVariable::linear("no2"));
        let out = c
            .combine(&[
                &day(&[(1, vec![Some(10.0)]), (2, vec![Some(1.0)])]),
                &day(&[(1, vec![None])]),
            ])
            .unwrap();
        assert_eq!(out[&AgentId(1)], vec![None]);
        // Agent 2 has no weekend value at all.
        assert_eq!(out[&AgentId(2)], vec![None]);
    }

    #[test]
    fn population_statistics_over_present_realisations() {
        let s = Stats::of(&[Some(1.0), None, Some(3.0)]).unwrap();
        assert_eq!((s.mean, s.var, s.std, s.min, s.max), (2.0, 1.0, 1.0, 1.0, 3.0));
        assert!(Stats::of(&[None, None]).is_none());
    }

    #[test]
    fn summarise_keeps_each_realisation() {
        let c = workweek(WeeklyVariable::linear("no2"));
        let r1 = day(&[(1, vec![Some(2.0)]), (2, vec![None])]);
        let r2 = day(&[(1, vec![Some(4.0)]), (2, vec![None])]);
        let tables = c.summarise(&[r1, r2]);
        assert_eq!(tables.len(), 1);
        let recs = &tables[0].records;
        assert_eq!(recs[0].agent, AgentId(1));
        assert_eq!(recs[0].realisations, vec![Some(2.0), Some(4.0)]);
        assert_eq!(recs[0].stats.unwrap().mean, 3.0);
        assert_eq!(recs[1].realisations, vec![None, None]);
        assert!(recs[1].stats.is_none());
    }

    #[test]
    fn variables_matched_by_position() {
        let c = WeeklyCombiner::new(vec![DayType::new("d", 1.0)], WeeklyVariable::defaults()).unwrap();
        let out = c.combine(&[&day(&[(1, vec![Some(1.0), Some(2.0), Some(100.0)])])]).unwrap();
        let v = &out[&AgentId(1)];
        assert_eq!(&v[..2], &[Some(1.0), Some(2.0)]);
        assert!((v[2].unwrap() - 20.0).abs() < 1e-12);

        let err = c.combine(&[&day(&[(1, vec![Some(1.0)])])]).unwrap_err();
        assert!(matches!(err, ExposureError::VariableCount { expected: 3, actual: 1, .. }));
    }

    #[test]
    fn invalid_weights_rejected() {
        let v = WeeklyVariable::defaults();
        assert!(WeeklyCombiner::new(vec![], v.clone()).is_err());
        assert!(WeeklyCombiner::new(vec![DayType::new("d", 0.0)], v.clone()).is_err());
        assert!(WeeklyCombiner::new(vec![DayType::new("d", -1.0)], v).is_err());
    }
}
