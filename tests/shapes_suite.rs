use morph_cloud::particles::{ParticleParams, ParticleTable};
use morph_cloud::shapes::{self, ShapeError, ShapeKind};
use std::f32::consts::{FRAC_PI_2, TAU};

fn table(n: usize, seed: u64) -> ParticleTable {
    ParticleTable::build(n, &mut fastrand::Rng::with_seed(seed))
}

fn len(p: glam::Vec3) -> f32 {
    p.length()
}

#[test]
fn params_stay_within_their_ranges() {
    let t = table(5_000, 1);
    assert_eq!(t.len(), 5_000);
    for p in t.params() {
        assert!((0.0..TAU).contains(&p.t), "t out of range: {}", p.t);
        assert!((0.0..1.0).contains(&p.u));
        assert!((0.0..1.0).contains(&p.v));
        assert!(p.sign == 1.0 || p.sign == -1.0);
        assert!((-1.0..1.0).contains(&p.offset));
    }
}

#[test]
fn same_seed_builds_the_same_table() {
    assert_eq!(table(256, 9).params(), table(256, 9).params());
    assert_ne!(table(256, 9).params(), table(256, 10).params());
}

#[test]
fn sphere_and_fireworks_points_lie_on_their_shell() {
    let t = table(2_000, 2);
    let mut rng = fastrand::Rng::with_seed(0);
    for scale in [0.5f32, 1.0, 3.0] {
        let r_fw = 35.0 * scale * 0.8;
        let r_sp = 25.0 * scale * 0.8;
        for p in t.params() {
            let fw = shapes::sample(ShapeKind::Fireworks, scale, p, &mut rng).position;
            let sp = shapes::sample(ShapeKind::Sphere, scale, p, &mut rng).position;
            assert!((len(fw) - r_fw).abs() < 1e-3 * r_fw, "fireworks |p|={} r={}", len(fw), r_fw);
            assert!((len(sp) - r_sp).abs() < 1e-3 * r_sp);
        }
    }
    for p in t.params() {
        let start = shapes::sphere(60.0, p);
        assert!((len(start) - 60.0).abs() < 0.06);
    }
}

#[test]
fn samplers_are_deterministic_for_stable_params() {
    let t = table(500, 3);
    let mut rng_a = fastrand::Rng::with_seed(11);
    let mut rng_b = fastrand::Rng::with_seed(99);
    for kind in [
        ShapeKind::Sphere,
        ShapeKind::Heart,
        ShapeKind::Flower,
        ShapeKind::Saturn,
        ShapeKind::Fireworks,
    ] {
        for p in t.params() {
            let a = shapes::sample(kind, 1.3, p, &mut rng_a);
            let b = shapes::sample(kind, 1.3, p, &mut rng_b);
            assert_eq!(a, b, "{kind} differs between evaluations");
            assert!(a.color.is_none(), "{kind} should not carry its own color");
        }
    }
}

#[test]
fn milky_way_is_reproducible_with_the_same_seed() {
    let t = table(500, 4);
    let mut rng_a = fastrand::Rng::with_seed(5);
    let mut rng_b = fastrand::Rng::with_seed(5);
    for p in t.params() {
        let a = shapes::sample(ShapeKind::MilkyWay, 1.0, p, &mut rng_a);
        let b = shapes::sample(ShapeKind::MilkyWay, 1.0, p, &mut rng_b);
        assert_eq!(a, b);
        assert!(a.color.is_some());
    }
}

#[test]
fn heart_matches_the_closed_form_curve() {
    let p = ParticleParams {
        t: FRAC_PI_2,
        u: 0.3,
        v: 0.7,
        sign: 1.0,
        offset: 0.5,
    };
    let s = 2.0 * 0.8;
    let h = shapes::heart(2.0, &p);
    // sin(π/2)=1 -> x=16; y = 0 + 5 - 0 - 1 = 4.
    assert!((h.x - 16.0 * s).abs() < 1e-4);
    assert!((h.y - 4.0 * s).abs() < 1e-4);
    assert!((h.z - 0.5 * 4.0 * s).abs() < 1e-4);
}

#[test]
fn flower_radius_stays_inside_petal_envelope() {
    let t = table(3_000, 5);
    let scale = 1.5;
    let s = scale * 0.8;
    for p in t.params() {
        let f = shapes::flower(scale, p);
        let r = (f.x * f.x + f.y * f.y).sqrt();
        let envelope = (8.0 * s + 18.0 * s * (2.5 * p.t).cos().abs()) + 1e-3;
        assert!(r >= 0.0 && r <= 26.0 * s + 1e-3, "r={r}");
        assert!(r <= envelope, "r={r} envelope={envelope}");
        assert!(f.z >= 0.0 && f.z <= 5.0 * s + 1e-3);
    }
}

#[test]
fn saturn_splits_into_planet_and_tilted_ring() {
    let t = table(4_000, 6);
    let scale = 1.0;
    let s = scale * 0.8;
    let (mut planet, mut ring) = (0usize, 0usize);
    for p in t.params() {
        let q = shapes::saturn(scale, p);
        if p.v < 0.5 {
            planet += 1;
            assert!((len(q) - 10.0 * s).abs() < 1e-3);
        } else {
            ring += 1;
            // Rotation about x keeps y²+z², so the in-plane radius is recoverable.
            let py = p.offset * 1.5;
            let radius = (q.length_squared() - py * py).max(0.0).sqrt();
            assert!(radius >= 14.0 * s - 1e-3 && radius <= 26.0 * s + 1e-3, "ring radius {radius}");
        }
    }
    assert!(planet > 1_500 && ring > 1_500);
}

#[test]
fn milky_way_bulge_share_converges_to_fifteen_percent() {
    let t = table(20_000, 7);
    let bulge = t.params().iter().filter(|p| p.u < 0.15).count();
    let share = bulge as f32 / t.len() as f32;
    assert!((share - 0.15).abs() < 0.015, "bulge share {share}");
}

#[test]
fn milky_way_colors_follow_population() {
    let t = table(2_000, 8);
    let mut rng = fastrand::Rng::with_seed(3);
    for p in t.params() {
        let sample = shapes::milky_way(1.0, p, &mut rng);
        let c = sample.color.expect("galaxy carries color");
        if p.u < 0.15 {
            assert_eq!((c.x, c.y), (1.0, 0.9));
            assert!((0.6..=1.0).contains(&c.z));
            assert!(len(sample.position) <= 6.0 * 0.8 * 0.6 + 1e-3);
        } else {
            assert!(c.x >= 0.149 && c.x <= 0.551, "r={}", c.x);
            assert!(c.y >= 0.049 && c.y <= 0.551, "g={}", c.y);
            assert!(c.z >= 0.549 && c.z <= 1.051, "b={}", c.z);
        }
    }
}

#[test]
fn shape_names_parse_with_aliases() {
    assert_eq!("heart".parse::<ShapeKind>(), Ok(ShapeKind::Heart));
    assert_eq!("Milky Way".parse::<ShapeKind>(), Ok(ShapeKind::MilkyWay));
    assert_eq!("milky-way".parse::<ShapeKind>(), Ok(ShapeKind::MilkyWay));
    assert_eq!(" GALAXY ".parse::<ShapeKind>(), Ok(ShapeKind::MilkyWay));
    assert_eq!(
        "pyramid".parse::<ShapeKind>(),
        Err(ShapeError::InvalidShapeKind("pyramid".to_string()))
    );
    assert_eq!(ShapeKind::resolve("pyramid"), ShapeKind::Fireworks);
    assert_eq!(ShapeKind::resolve("saturn"), ShapeKind::Saturn);
}

#[test]
fn shape_cycle_visits_every_kind() {
    let mut k = ShapeKind::Fireworks;
    let mut seen = Vec::new();
    for _ in 0..ShapeKind::all().len() {
        seen.push(k);
        k = k.next();
    }
    assert_eq!(k, ShapeKind::Fireworks);
    assert_eq!(seen, ShapeKind::all().to_vec());
    assert_eq!(ShapeKind::Fireworks.prev(), ShapeKind::Sphere);
    assert_eq!(ShapeKind::MilkyWay.label(), "MILKY WAY");
}

#[test]
fn only_the_galaxy_brings_its_own_color() {
    let p = table(1, 12).params()[0];
    let mut rng = fastrand::Rng::with_seed(1);
    for kind in ShapeKind::all() {
        let sample = shapes::sample(kind, 1.0, &p, &mut rng);
        assert_eq!(sample.color.is_some(), kind.has_intrinsic_color(), "{kind}");
    }
}
