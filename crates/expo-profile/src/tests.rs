//! Unit tests for expo-profile.

use chrono::NaiveDate;

use expo_core::{AgendaClock, AgentId, AgentRng, Coord, LocationId, LonLat, Tick, TravelMode, ZoneId};
use expo_schedule::{ActivityKind, BufferMethod, Footprint};
use expo_spatial::StraightLineRouter;

use crate::{
    CommuterWorkday, DayKind, HomemakerBuffer, LocationRecord, LocationRegistry, OdTable,
    OriginDestinationSelector, Profile, ProfileContext, ProfileError, ProfileKind,
    load_locations_reader, load_od_reader,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn clock() -> AgendaClock {
    AgendaClock::minutes(NaiveDate::from_ymd_opt(2020, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
}

fn record(id: u32, zone: u32, x: f64, y: f64, lon: f64, lat: f64) -> LocationRecord {
    LocationRecord {
        id:         LocationId(id),
        zone:       ZoneId(zone),
        projected:  Coord::new(x, y),
        geographic: LonLat::new(lon, lat),
    }
}

/// Home in zone 1; work 5 km north in zone 2 and 2 km north in zone 1.
fn registry() -> LocationRegistry {
    LocationRegistry::new(
        vec![record(10, 1, 0.0, 0.0, 5.0, 52.0)],
        vec![
            record(100, 2, 0.0, 5_000.0, 5.0, 52.045),
            record(101, 1, 0.0, 2_000.0, 5.0, 52.018),
        ],
    )
}

fn context<'a>(registry: &'a LocationRegistry, od: Option<&'a dyn OriginDestinationSelector>) -> ProfileContext<'a> {
    ProfileContext {
        registry,
        od,
        router: &StraightLineRouter,
        clock: clock(),
        agenda_start: Tick(0),
        agenda_end: Tick(1440),
        leisure_radius: 100.0,
    }
}

fn one_to_two() -> OdTable {
    OdTable::from_rows([(ZoneId(1), vec![(ZoneId(2), 1.0)])]).unwrap()
}

// ── Registry and OD table ─────────────────────────────────────────────────────

#[cfg(test)]
mod inputs {
    use super::*;

    #[test]
    fn registry_csv() {
        let data = "id,zone,x,y,lon,lat\n0,3511,136942.1,455871.3,5.12142,52.090737\n1,3512,1,2,3,4\n";
        let recs = load_locations_reader(data.as_bytes()).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].zone, ZoneId(3511));
        assert_eq!(recs[0].agent(), AgentId(0));
        assert_eq!(recs[1].geographic, LonLat::new(3.0, 4.0));
    }

    #[test]
    fn work_indexed_by_zone() {
        let r = registry();
        assert_eq!(r.work_in_zone(ZoneId(2)).len(), 1);
        assert_eq!(r.work_in_zone(ZoneId(1))[0].id, LocationId(101));
        assert!(r.work_in_zone(ZoneId(99)).is_empty());
    }

    #[test]
    fn od_rows_are_normalised_weights() {
        let data = "origin,1,2,3\n1,1,3,\n2,,,5\n";
        let od = load_od_reader(data.as_bytes()).unwrap();
        assert_eq!(od.len(), 2);

        let mut rng = AgentRng::new(42, 0, AgentId(0));
        let draws: Vec<ZoneId> = (0..4_000).filter_map(|_| od.obtain(ZoneId(1), &mut rng)).collect();
        assert_eq!(draws.len(), 4_000);
        assert!(!draws.contains(&ZoneId(3)), "empty cell must be dropped");
        let twos = draws.iter().filter(|&&z| z == ZoneId(2)).count() as f64 / 4_000.0;
        assert!((twos - 0.75).abs() < 0.05, "{twos}");

        assert!((0..50).all(|_| od.obtain(ZoneId(2), &mut rng) == Some(ZoneId(3))));
    }

    #[test]
    fn unknown_origin_has_no_destination() {
        let mut rng = AgentRng::new(1, 0, AgentId(0));
        assert_eq!(one_to_two().obtain(ZoneId(7), &mut rng), None);
    }

    #[test]
    fn zero_weight_row_behaves_as_unknown() {
        let od = OdTable::from_rows([(ZoneId(1), vec![(ZoneId(2), 0.0)])]).unwrap();
        assert!(od.is_empty());
        assert!(OdTable::from_rows([(ZoneId(1), vec![(ZoneId(2), -1.0)])]).is_err());
    }

    #[test]
    fn garbage_od_cell_rejected() {
        assert!(load_od_reader("o,1\n1,abc\n".as_bytes()).is_err());
    }
}

// ── Profiles ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod profiles {
    use super::*;

    #[test]
    fn kinds_round_trip_through_names() {
        for kind in ProfileKind::ALL {
            assert_eq!(kind.as_str().parse::<ProfileKind>().unwrap(), kind);
            assert_eq!(kind.instantiate().name(), kind.as_str());
        }
        assert!(matches!("nope".parse::<ProfileKind>(), Err(ProfileError::UnknownProfile(_))));
    }

    #[test]
    fn variable_sets_follow_day_kind() {
        assert_eq!(HomemakerBuffer::new(DayKind::Workday).variables()[0], "NO2_hour_weekday");
        assert_eq!(HomemakerBuffer::new(DayKind::Weekend).variables()[1], "PM25_hour_weekend");
        assert_eq!(CommuterWorkday::default().variables()[2], "noise");
    }

    #[test]
    fn homemaker_schedule_shape() {
        let reg = registry();
        let ctx = context(&reg, None);
        let home = reg.homes()[0];
        for seed in 0..100 {
            let mut rng = AgentRng::new(seed, 1, home.agent());
            let s = HomemakerBuffer::new(DayKind::Workday).build(&home, &ctx, &mut rng).unwrap();
            let acts = s.activities();
            assert_eq!(acts.len(), 3);
            assert!((480..1260).contains(&acts[0].end.0));
            assert_eq!(acts[1].kind, ActivityKind::Leisure);
            assert_eq!(acts[1].duration(), 120);
            assert_eq!(acts[2].end, Tick(1440));
            match acts[1].footprint {
                Footprint::Buffer { radius, method, .. } => {
                    assert_eq!(radius, 100.0);
                    assert_eq!(method, BufferMethod::Mean);
                }
                other => panic!("leisure footprint {other:?}"),
            }
        }
    }

    #[test]
    fn commuter_follows_od_destination() {
        let reg = registry();
        let od = one_to_two();
        let ctx = context(&reg, Some(&od));
        let home = reg.homes()[0];
        let mut rng = AgentRng::new(9, 1, home.agent());

        let s = CommuterWorkday::default().build(&home, &ctx, &mut rng).unwrap();
        let acts = s.activities();
        let kinds: Vec<_> = acts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActivityKind::Home,
                ActivityKind::CommuteHomeToWork,
                ActivityKind::Work,
                ActivityKind::CommuteWorkToHome,
                ActivityKind::Home,
            ]
        );
        assert!((390..450).contains(&acts[0].end.0));
        assert_eq!(acts[1].duration(), acts[3].duration());
        assert_eq!(acts[2].duration(), 480);
        match acts[2].footprint {
            Footprint::Buffer { at, .. } => assert_eq!(at, Coord::new(0.0, 5_000.0)),
            other => panic!("work footprint {other:?}"),
        }
        // 5 km lies in the bike/car band.
        let mode = acts[1].footprint.travel_mode().unwrap();
        assert!(matches!(mode, TravelMode::Bike | TravelMode::Car), "{mode}");
    }

    #[test]
    fn commuter_without_od_works_in_home_zone() {
        let reg = registry();
        let ctx = context(&reg, None);
        let home = reg.homes()[0];
        let mut rng = AgentRng::new(3, 1, home.agent());
        let choice = CommuterWorkday::default().draw_work(&home, &ctx, &mut rng).unwrap();
        assert_eq!(choice.work.id, LocationId(101));
        assert!(choice.trip.minutes > 0.0 && choice.trip.minutes < 150.0);
    }

    #[test]
    fn commuter_without_any_work_fails() {
        let reg = LocationRegistry::new(registry().homes().to_vec(), vec![]);
        let ctx = context(&reg, None);
        let home = reg.homes()[0];
        let mut rng = AgentRng::new(3, 1, home.agent());
        let err = CommuterWorkday::default().build(&home, &ctx, &mut rng).unwrap_err();
        assert!(matches!(err, ProfileError::NoSuitableWork { attempts: 41, .. }));
    }

    #[test]
    fn work_too_close_is_rejected() {
        // Only candidate is 10 m away: below the 25 m minimum.
        let reg = LocationRegistry::new(
            registry().homes().to_vec(),
            vec![record(200, 1, 0.0, 10.0, 5.0, 52.0001)],
        );
        let ctx = context(&reg, None);
        let home = reg.homes()[0];
        let mut rng = AgentRng::new(3, 1, home.agent());
        assert!(CommuterWorkday::default().draw_work(&home, &ctx, &mut rng).is_err());
    }

    #[test]
    fn mode_bands() {
        let mut rng = AgentRng::new(5, 0, AgentId(1));
        for _ in 0..100 {
            assert!(matches!(CommuterWorkday::draw_mode(500.0, &mut rng), TravelMode::Foot | TravelMode::Bike));
            assert!(matches!(CommuterWorkday::draw_mode(1_000.0, &mut rng), TravelMode::Bike | TravelMode::Car));
            assert!(matches!(CommuterWorkday::draw_mode(10_000.0, &mut rng), TravelMode::Car | TravelMode::Train));
        }
    }

    #[test]
    fn same_seed_same_schedule() {
        let reg = registry();
        let od = one_to_two();
        let ctx = context(&reg, Some(&od));
        let home = reg.homes()[0];
        let build = || {
            let mut rng = AgentRng::new(77, 2, home.agent());
            CommuterWorkday::default().build(&home, &ctx, &mut rng).unwrap()
        };
        let (a, b) = (build(), build());
        assert_eq!(a.activities(), b.activities());
    }
}
