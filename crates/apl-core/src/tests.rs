//! Unit tests for apl-core primitives.

#[cfg(test)]
mod ids {
    use crate::AgentId;

    #[test]
    fn ordering_follows_allocation() {
        let mut ids = vec![AgentId(3), AgentId(0), AgentId(2)];
        ids.sort();
        assert_eq!(ids, vec![AgentId(0), AgentId(2), AgentId(3)]);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::Tick;

    #[test]
    fn display() {
        assert_eq!(Tick(12).to_string(), "T12");
    }
}

#[cfg(test)]
mod payload {
    use crate::Payload;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    #[test]
    fn downcast_to_concrete_type() {
        let p = Payload::new(Ping(3));
        assert!(p.is::<Ping>());
        assert_eq!(p.downcast_ref::<Ping>(), Some(&Ping(3)));
        assert_eq!(p.downcast_ref::<u32>(), None);
    }

    #[test]
    fn identity_survives_clone_only() {
        let a = Payload::new(Ping(1));
        let b = a.clone();
        let c = Payload::new(Ping(1));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn debug_names_the_type() {
        let p = Payload::new(Ping(1));
        assert!(format!("{p:?}").contains("Ping"));
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_shuffle() {
        let mut a: Vec<u32> = (0..50).collect();
        let mut b = a.clone();
        SimRng::new(7).shuffle(&mut a);
        SimRng::new(7).shuffle(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut v: Vec<u32> = (0..100).collect();
        SimRng::new(99).shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<_>>());
    }
}

#[cfg(test)]
mod config {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use crate::{AplError, EngineConfig, Tick};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn zero_threads_rejected() {
        let cfg = EngineConfig { num_threads: Some(0), ..EngineConfig::default() };
        assert!(matches!(cfg.validate(), Err(AplError::Config(_))));
    }

    #[test]
    fn end_tick_follows_budget() {
        assert_eq!(EngineConfig::new(2, 10).end_tick(), Some(Tick(10)));
        assert_eq!(EngineConfig::default().end_tick(), None);
    }

    #[test]
    fn overrides_apply_on_top() {
        let cfg = EngineConfig::new(1, 5)
            .with_overrides(lookup(&[
                ("APL_THREADS", "4"),
                ("APL_SEED", " 17 "),
                ("APL_TIMELOG", "/tmp/times.csv"),
            ]))
            .unwrap();
        assert_eq!(cfg.num_threads, Some(4));
        assert_eq!(cfg.seed, Some(17));
        assert_eq!(cfg.total_ticks, Some(5));
        assert_eq!(cfg.time_log, Some(PathBuf::from("/tmp/times.csv")));
    }

    #[test]
    fn zero_ticks_means_unbounded() {
        let cfg = EngineConfig::new(1, 5)
            .with_overrides(lookup(&[("APL_TICKS", "0")]))
            .unwrap();
        assert_eq!(cfg.total_ticks, None);
    }

    #[test]
    fn bad_number_is_parse_error() {
        let err = EngineConfig::default()
            .with_overrides(lookup(&[("APL_SEED", "abc")]))
            .unwrap_err();
        assert!(matches!(err, AplError::Parse(_)));
    }

    #[test]
    fn zero_threads_override_rejected() {
        let err = EngineConfig::default()
            .with_overrides(lookup(&[("APL_THREADS", "0")]))
            .unwrap_err();
        assert!(matches!(err, AplError::Config(_)));
    }
}
