//! Unit tests for expo-schedule.

use expo_core::{AgentId, AgentRng, Coord, LonLat, Tick, TravelMode};

use crate::{
    ActivityDescriptor, ActivityGroup, ActivityKind, ActivityScheduler, BufferMethod, Footprint,
    Schedule, ScheduleError, TimeSlice, Timing, TimestepGrid, resample,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const AGENT: AgentId = AgentId(7);

fn home(timing: Timing) -> ActivityDescriptor {
    ActivityDescriptor::point(ActivityKind::Home, Coord::new(100.0, 200.0), timing)
}

fn schedule_of(durations: &[u64], span: u64) -> Schedule {
    let mut s = ActivityScheduler::new(AGENT, Tick(0), Tick(span));
    for &d in durations {
        s.push(home(Timing::Fixed(d)));
    }
    s.build().unwrap()
}

fn assert_partition(slices: &[TimeSlice], start: Tick, end: Tick) {
    assert_eq!(slices.first().unwrap().start, start);
    assert_eq!(slices.last().unwrap().end, end);
    for pair in slices.windows(2) {
        assert_eq!(pair[0].end, pair[1].start, "gap or overlap between slices");
    }
    assert!(slices.iter().all(|s| s.end > s.start), "empty slice emitted");
    let total: u64 = slices.iter().map(TimeSlice::duration).sum();
    assert_eq!(total, end - start);
}

// ── Activity types ────────────────────────────────────────────────────────────

#[cfg(test)]
mod activity {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ActivityKind::Home.code(), 1);
        assert_eq!(ActivityKind::Work.code(), 2);
        assert_eq!(ActivityKind::CommuteHomeToWork.code(), 3);
        assert_eq!(ActivityKind::CommuteWorkToHome.code(), 4);
        assert_eq!(ActivityKind::Leisure.code(), 5);
        assert_eq!(ActivityGroup::Route.code(), 3);
        assert_eq!(BufferMethod::Sum.code(), 1);
        assert_eq!(BufferMethod::Mean.code(), 2);
    }

    #[test]
    fn footprint_group_and_mode() {
        let route = Footprint::Route {
            from: LonLat::new(5.0, 52.0),
            to:   LonLat::new(5.1, 52.1),
            mode: TravelMode::Bike,
        };
        assert_eq!(route.group(), ActivityGroup::Route);
        assert_eq!(route.travel_mode(), Some(TravelMode::Bike));

        let buf = ActivityDescriptor::buffer(ActivityKind::Home, Coord::new(0.0, 0.0), 50.0, Timing::FillsRemaining);
        assert_eq!(buf.footprint.group(), ActivityGroup::Buffer);
        assert_eq!(buf.footprint.travel_mode(), None);
    }

    #[test]
    fn compute_end_rules() {
        assert_eq!(Timing::Fixed(30).compute_end(Tick(10), Tick(100)), Tick(40));
        assert_eq!(Timing::Travel(5).compute_end(Tick(10), Tick(100)), Tick(15));
        assert_eq!(Timing::FillsRemaining.compute_end(Tick(10), Tick(100)), Tick(100));
    }
}

// ── ActivityScheduler ─────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler {
    use super::*;

    #[test]
    fn activities_are_contiguous_and_fill_agenda() {
        let s = ActivityScheduler::new(AGENT, Tick(0), Tick(1440))
            .then(home(Timing::Fixed(480)))
            .then(ActivityDescriptor::commute(
                ActivityKind::CommuteHomeToWork,
                LonLat::new(5.0, 52.0),
                LonLat::new(5.1, 52.0),
                TravelMode::Car,
                25,
            ))
            .then(home(Timing::FillsRemaining))
            .build()
            .unwrap();

        let acts = s.activities();
        assert_eq!(acts.len(), 3);
        assert_eq!((acts[0].start, acts[0].end), (Tick(0), Tick(480)));
        assert_eq!((acts[1].start, acts[1].end), (Tick(480), Tick(505)));
        assert_eq!((acts[2].start, acts[2].end), (Tick(505), Tick(1440)));
        assert_eq!(acts.iter().map(|a| a.ordinal).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(acts.iter().map(|a| a.duration()).sum::<u64>(), s.span());
    }

    #[test]
    fn short_schedule_is_imbalanced() {
        let err = ActivityScheduler::new(AGENT, Tick(0), Tick(1440))
            .then(home(Timing::Fixed(600)))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Imbalance { expected: 1440, actual: 600, .. }
        ));
    }

    #[test]
    fn overlong_activity_overruns() {
        let err = ActivityScheduler::new(AGENT, Tick(0), Tick(100))
            .then(home(Timing::Fixed(60)))
            .then(home(Timing::Fixed(60)))
            .build()
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Overrun { ordinal: 1, .. }));
    }

    #[test]
    fn zero_duration_activity_rejected() {
        let err = ActivityScheduler::new(AGENT, Tick(0), Tick(100))
            .then(home(Timing::Fixed(100)))
            .then(home(Timing::FillsRemaining))
            .build()
            .unwrap_err();
        assert!(matches!(err, ScheduleError::EmptyActivity { ordinal: 1, .. }));
    }

    #[test]
    fn empty_agenda_rejected() {
        let err = ActivityScheduler::new(AGENT, Tick(10), Tick(10)).build().unwrap_err();
        assert!(matches!(err, ScheduleError::EmptyAgenda { .. }));
    }

    #[test]
    fn random_durations_always_sum_to_span() {
        for seed in 0..50u64 {
            let mut rng = AgentRng::new(seed, 0, AGENT);
            let mut s = ActivityScheduler::new(AGENT, Tick(0), Tick(1440));
            let mut used = 0u64;
            while used < 1200 {
                let d = rng.gen_range(1..=240u64);
                s.push(home(Timing::Fixed(d)));
                used += d;
            }
            s.push(home(Timing::FillsRemaining));
            match s.build() {
                Ok(schedule) => {
                    let total: u64 = schedule.activities().iter().map(|a| a.duration()).sum();
                    assert_eq!(total, 1440);
                }
                // Fixed activities overshot the agenda: must be reported, never truncated.
                Err(e) => assert!(matches!(e, ScheduleError::Overrun { .. } | ScheduleError::EmptyActivity { .. })),
            }
        }
    }
}

// ── TimestepGrid ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod grid {
    use super::*;

    #[test]
    fn uniform_hourly_day() {
        let g = TimestepGrid::uniform(Tick(0), 60, 24).unwrap();
        assert_eq!(g.len(), 24);
        assert_eq!(g.start(), Tick(0));
        assert_eq!(g.end(), Tick(1440));
        assert!(g.windows()[3].contains(Tick(180)));
        assert!(!g.windows()[3].contains(Tick(240)));
    }

    #[test]
    fn boundaries_must_increase() {
        assert!(TimestepGrid::from_boundaries(&[Tick(0), Tick(60), Tick(60)]).is_err());
        assert!(TimestepGrid::from_boundaries(&[Tick(0)]).is_err());
        let g = TimestepGrid::from_boundaries(&[Tick(0), Tick(30), Tick(90)]).unwrap();
        assert_eq!(g.windows()[1].len(), 60);
    }

    #[test]
    fn degenerate_uniform_rejected() {
        assert!(matches!(TimestepGrid::uniform(Tick(0), 0, 24), Err(ScheduleError::InvalidGrid(_))));
        assert!(matches!(TimestepGrid::uniform(Tick(0), 60, 0), Err(ScheduleError::InvalidGrid(_))));
    }
}

// ── resample ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod resampler {
    use super::*;

    /// Clock starts at 23:00; windows are 23:00–00:00 and 00:00–01:00.
    /// The middle activity runs 23:30–00:30.
    #[test]
    fn activity_crossing_midnight_splits_in_two() {
        let schedule = schedule_of(&[30, 60, 30], 120);
        let grid = TimestepGrid::uniform(Tick(0), 60, 2).unwrap();
        let slices = resample(&schedule, &grid).unwrap();

        let middle: Vec<_> = slices.iter().filter(|s| s.activity == 1).collect();
        assert_eq!(middle.len(), 2);
        assert_eq!(middle[0].duration(), 30);
        assert_eq!(middle[1].duration(), 30);
        assert_eq!(middle[0].end, Tick(60));
        assert_partition(&slices, Tick(0), Tick(120));
    }

    #[test]
    fn aligned_boundaries_advance_both_cursors() {
        let schedule = schedule_of(&[60, 60], 120);
        let grid = TimestepGrid::uniform(Tick(0), 60, 2).unwrap();
        let slices = resample(&schedule, &grid).unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0], TimeSlice { agent: AGENT, activity: 0, start: Tick(0), end: Tick(60) });
        assert_eq!(slices[1], TimeSlice { agent: AGENT, activity: 1, start: Tick(60), end: Tick(120) });
    }

    #[test]
    fn single_day_long_activity_yields_one_slice_per_window() {
        let schedule = schedule_of(&[1440], 1440);
        let grid = TimestepGrid::uniform(Tick(0), 60, 24).unwrap();
        let slices = resample(&schedule, &grid).unwrap();
        assert_eq!(slices.len(), 24);
        assert!(slices.iter().all(|s| s.activity == 0 && s.duration() == 60));
    }

    #[test]
    fn many_short_activities_inside_one_window() {
        let schedule = schedule_of(&[10, 10, 10, 30], 60);
        let grid = TimestepGrid::uniform(Tick(0), 60, 1).unwrap();
        let slices = resample(&schedule, &grid).unwrap();
        assert_eq!(slices.len(), 4);
        assert_partition(&slices, Tick(0), Tick(60));
    }

    #[test]
    fn span_mismatch_is_reported() {
        let schedule = schedule_of(&[120], 120);
        let grid = TimestepGrid::uniform(Tick(0), 60, 3).unwrap();
        let err = resample(&schedule, &grid).unwrap_err();
        assert!(matches!(err, ScheduleError::SpanMismatch { .. }));
        assert!(err.is_partition_failure());
    }

    #[test]
    fn random_schedules_partition_exactly() {
        let grid = TimestepGrid::uniform(Tick(0), 60, 24).unwrap();
        for seed in 0..200u64 {
            let mut rng = AgentRng::new(seed, 1, AGENT);
            let mut durations = Vec::new();
            let mut left = 1440u64;
            while left > 0 {
                let d = rng.gen_range(1..=left.min(300));
                durations.push(d);
                left -= d;
            }
            let schedule = schedule_of(&durations, 1440);
            let slices = resample(&schedule, &grid).unwrap();
            assert_partition(&slices, Tick(0), Tick(1440));

            // Every slice stays inside one window and one activity.
            for s in &slices {
                assert_eq!(s.start.0 / 60, (s.end.0 - 1) / 60);
                let act = &schedule.activities()[s.activity as usize];
                assert!(act.start <= s.start && s.end <= act.end);
            }
            // Ordinals never go backwards.
            assert!(slices.windows(2).all(|p| p[0].activity <= p[1].activity));
        }
    }
}
