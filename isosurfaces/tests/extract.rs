use isosurfaces::{
    Error, Settings, ThreadPool, Tree, extract_isoline, extract_isosurface,
    extract_segments,
};
use nalgebra::{Vector2, Vector3};

fn circle(p: &Vector2<f64>) -> f64 {
    p.norm_squared() - 1.0
}

fn sphere(p: &Vector3<f64>) -> f64 {
    p.norm_squared() - 1.0
}

fn square(s: f64) -> (Vector2<f64>, Vector2<f64>) {
    (Vector2::new(-s, -s), Vector2::new(s, s))
}

fn cube(s: f64) -> (Vector3<f64>, Vector3<f64>) {
    (Vector3::new(-s, -s, -s), Vector3::new(s, s, s))
}

#[test]
fn test_circle() {
    let (lo, hi) = square(2.0);
    let lines = extract_isoline(&circle, lo, hi, &Settings::default()).unwrap();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(line.len() > 100);
    assert_eq!(line.first(), line.last());
    for p in line {
        let v = circle(p);
        assert!(v.abs() < 0.05, "invalid vertex at {p:?}: {v}");
    }
}

#[test]
fn test_circle_small_budget() {
    let (lo, hi) = square(2.0);
    let settings = Settings {
        min_depth: 4,
        max_cells: 500,
        ..Settings::default()
    };
    let lines = extract_isoline(&circle, lo, hi, &settings).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].first(), lines[0].last());
    for p in &lines[0] {
        let v = circle(p);
        assert!(v.abs() < 0.05, "invalid vertex at {p:?}: {v}");
    }
}

#[test]
fn test_cubic() {
    // An oval plus a branch that leaves the region through its top and bottom
    let f = |p: &Vector2<f64>| p.y * p.y - p.x.powi(3) + p.x - 0.3;
    let (lo, hi) = square(2.0);
    let lines = extract_isoline(&f, lo, hi, &Settings::default()).unwrap();
    assert_eq!(lines.len(), 2);

    let open = &lines[0];
    assert_ne!(open.first(), open.last());
    for p in [open[0], open[open.len() - 1]] {
        assert!((p.y.abs() - 2.0).abs() < 1e-9, "open end at {p:?}");
    }

    let closed = &lines[1];
    assert_eq!(closed.first(), closed.last());
    assert!(closed.iter().all(|p| p.x < 0.5));
}

#[test]
fn test_sphere() {
    let (lo, hi) = cube(2.0);
    let settings = Settings {
        min_depth: 3,
        max_cells: 4000,
        ..Settings::default()
    };
    let tris = extract_isosurface(&sphere, lo, hi, &settings).unwrap();
    assert!(!tris.is_empty());
    for t in &tris {
        for p in t {
            let n = p.norm();
            assert!((n - 1.0).abs() < 0.1, "invalid vertex at {p:?}: {n}");
        }
    }

    // The surface is reached from every direction
    for axis in 0..3 {
        assert!(tris.iter().flatten().any(|p| p[axis] > 0.9));
        assert!(tris.iter().flatten().any(|p| p[axis] < -0.9));
    }
}

#[test]
fn test_sphere_default_budget() {
    let (lo, hi) = cube(2.0);
    let settings = Settings {
        min_depth: 3,
        ..Settings::default()
    };
    let tris = extract_isosurface(&sphere, lo, hi, &settings).unwrap();
    assert!(!tris.is_empty());
    for p in tris.iter().flatten() {
        let v = sphere(p);
        assert!(v.abs() < 0.1, "invalid vertex at {p:?}: {v}");
    }
}

#[test]
fn test_no_crossing() {
    let (lo, hi) = square(2.0);
    let f = |p: &Vector2<f64>| p.norm_squared() + 1.0;
    let settings = Settings::default();
    assert!(extract_segments(&f, lo, hi, &settings).unwrap().is_empty());
    assert!(extract_isoline(&f, lo, hi, &settings).unwrap().is_empty());

    // Too small for the tree to see
    let center = Vector3::new(0.3, 0.3, 0.3);
    let f = |p: &Vector3<f64>| (p - center).norm() - 0.01;
    let settings = Settings {
        min_depth: 2,
        ..Settings::default()
    };
    let (lo, hi) = cube(1.3);
    assert!(extract_isosurface(&f, lo, hi, &settings).unwrap().is_empty());
}

#[test]
fn test_undefined() {
    let (lo, hi) = square(1.0);
    let nan = |_: &Vector2<f64>| f64::NAN;
    let lines = extract_isoline(&nan, lo, hi, &Settings::default()).unwrap();
    assert!(lines.is_empty());

    let settings = Settings {
        min_depth: 0,
        ..Settings::default()
    };
    let tree = Tree::build(&nan, lo, hi, &settings).unwrap();
    assert_eq!(tree.len(), 1);
    assert!(extract_isoline(&nan, lo, hi, &settings).unwrap().is_empty());

    // Only defined for x >= 0, crossing zero at x = 0.5
    let f = |p: &Vector2<f64>| p.x.sqrt() - 0.5f64.sqrt();
    let lines = extract_isoline(&f, lo, hi, &Settings::default()).unwrap();
    assert_eq!(lines.len(), 1);
    for p in &lines[0] {
        assert!((p.x - 0.5).abs() < 1e-2, "invalid vertex at {p:?}");
    }
}

#[test]
fn test_deterministic() {
    let (lo, hi) = cube(1.5);
    let f = |p: &Vector3<f64>| {
        p.x * p.x + 2.0 * p.y * p.y + (p.z * 2.0).sin() - 0.8
    };
    let settings = Settings {
        min_depth: 2,
        max_cells: 1500,
        ..Settings::default()
    };
    let a = extract_isosurface(&f, lo, hi, &settings).unwrap();
    let b = extract_isosurface(&f, lo, hi, &settings).unwrap();
    assert_eq!(a, b);

    let pool = ThreadPool::Global;
    let settings = Settings {
        threads: Some(&pool),
        ..settings
    };
    let c = extract_isosurface(&f, lo, hi, &settings).unwrap();
    assert_eq!(a, c);
}

#[test]
fn test_budget() {
    let (lo, hi) = square(2.0);
    for (min_depth, max_cells) in [(0, 1), (2, 10), (3, 100), (4, 1000)] {
        let settings = Settings {
            min_depth,
            max_cells,
            ..Settings::default()
        };
        let tree = Tree::build(&circle, lo, hi, &settings).unwrap();
        let limit = max_cells.max(4usize.pow(min_depth as u32));
        assert!(tree.leaf_count() <= limit);
        assert!(tree.leaves().all(|c| tree[c].depth() >= min_depth));
    }
}

#[test]
fn test_errors() {
    let settings = Settings::default();
    assert_eq!(
        extract_isoline(
            &circle,
            Vector2::new(0.0, 1.0),
            Vector2::new(1.0, 0.0),
            &settings
        ),
        Err(Error::BadBounds {
            axis: 1,
            min: 1.0,
            max: 0.0
        })
    );
    let (lo, _) = cube(1.0);
    assert!(matches!(
        extract_isosurface(&sphere, lo, lo, &Settings::default()),
        Err(Error::BadTolerance { axis: 0, .. })
    ));
}

#[test]
fn test_tol_below_spacing() {
    // Finer than the gap between adjacent floats near x = 1e6
    let f = |p: &Vector2<f64>| p.x - 1e6 - 0.3;
    let settings = Settings {
        min_depth: 1,
        max_cells: 20,
        tol: Some(Vector2::new(1e-12, 1e-12)),
        threads: None,
    };
    let lo = Vector2::new(1e6, 0.0);
    let hi = Vector2::new(1e6 + 1.0, 1.0);
    let lines = extract_isoline(&f, lo, hi, &settings).unwrap();
    assert!(!lines.is_empty());
    for p in lines.iter().flatten() {
        assert!((p.x - (1e6 + 0.3)).abs() < 1e-9, "invalid vertex at {p:?}");
        assert!(p.y >= 0.0 && p.y <= 1.0);
    }
}
