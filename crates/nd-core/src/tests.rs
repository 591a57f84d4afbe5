//! Unit tests for nd-core primitives.

#[cfg(test)]
mod ids {
    use crate::{FeatureId, InfoId, UserId};

    #[test]
    fn index_cast() {
        assert_eq!(UserId(42).index(), 42);
        assert_eq!(InfoId(7).index(), 7);
    }

    #[test]
    fn ordering() {
        assert!(UserId(0) < UserId(1));
        assert!(InfoId(100) > InfoId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(UserId::INVALID.0, u32::MAX);
        assert_eq!(InfoId::INVALID.0, u32::MAX);
        assert_eq!(FeatureId::INVALID.0, u16::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(UserId(7).to_string(), "UserId(7)");
    }
}

#[cfg(test)]
mod rng {
    use crate::{SimRng, UserId, UserRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = UserRng::new(12345, UserId(0));
        let mut r2 = UserRng::new(12345, UserId(0));
        for _ in 0..100 {
            let a = r1.gen_range(0u64..u64::MAX);
            let b = r2.gen_range(0u64..u64::MAX);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_users_differ() {
        let mut r0 = UserRng::new(1, UserId(0));
        let mut r1 = UserRng::new(1, UserId(1));
        let a = r0.gen_range(0u64..u64::MAX);
        let b = r1.gen_range(0u64..u64::MAX);
        assert_ne!(a, b, "seeds for adjacent users should diverge");
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = UserRng::new(0, UserId(0));
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }

    #[test]
    fn choose_from_empty_is_none() {
        let mut rng = UserRng::new(0, UserId(0));
        let empty: [u32; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }

    #[test]
    fn child_streams_diverge() {
        let mut root = SimRng::new(99);
        let mut a = root.child(1);
        let mut b = root.child(2);
        let x = a.gen_range(0u64..u64::MAX);
        let y = b.gen_range(0u64..u64::MAX);
        assert_ne!(x, y);
    }
}

#[cfg(test)]
mod config {
    use crate::{CountingMode, SimConfig};

    #[test]
    fn with_seed_defaults() {
        let cfg = SimConfig::with_seed(42);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.counting, CountingMode::Unique);
        assert!(cfg.max_iterations.is_none());
    }
}
