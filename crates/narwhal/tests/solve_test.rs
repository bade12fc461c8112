use narwhal::{Point, Rect, Router, RouterConfig, polyline_length};

fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

/// Samples the polyline and reports whether any sample lies strictly inside `r`'s pixels.
fn enters_interior(points: &[Point], r: Rect) -> bool {
    let (x0, x1) = (f64::from(r.x), f64::from(r.right() - 1));
    let (y0, y1) = (f64::from(r.y), f64::from(r.bottom() - 1));
    points.windows(2).any(|w| {
        (0..=1000).any(|i| {
            let t = f64::from(i) / 1000.0;
            let x = f64::from(w[0].x) + t * f64::from(w[1].x - w[0].x);
            let y = f64::from(w[0].y) + t * f64::from(w[1].y - w[0].y);
            x > x0 && x < x1 && y > y0 && y < y1
        })
    })
}

#[test]
fn unobstructed_paths_are_straight_lines() {
    let mut router = Router::new();
    let a = router.add_path(p(0, 0), p(30, 40), ());
    let b = router.add_path(p(100, 100), p(160, 180), ());
    let outcome = router.solve();
    assert_eq!(outcome.updated, vec![a, b]);
    assert!(outcome.unresolved.is_empty());

    assert_eq!(router.points(a).unwrap(), &[p(0, 0), p(30, 40)]);
    let len = polyline_length(router.points(b).unwrap());
    assert!((len - 100.0).abs() < 1e-9, "length: got {len}");
}

#[test]
fn single_obstacle_is_passed_over_its_top_edge_at_spacing_distance() {
    let obstacle = Rect::new(10, 10, 50, 50);
    let mut router = Router::new();
    router.add_obstacle(obstacle);
    let id = router.add_path(p(0, 30), p(100, 30), ());
    router.solve();

    let points = router.points(id).unwrap();
    assert_eq!(points, &[p(0, 30), p(0, 0), p(69, 0), p(100, 30)]);
    assert!(!enters_interior(points, obstacle));

    let rectilinear = router.rectilinear_points(id).unwrap();
    assert_eq!(
        rectilinear,
        vec![p(0, 30), p(0, 0), p(69, 0), p(69, 30), p(100, 30)]
    );
    let len = polyline_length(&rectilinear);
    assert!((len - (100.0 + 2.0 * 30.0)).abs() < 1e-9, "length: got {len}");
}

#[test]
fn equal_length_detours_prefer_the_route_above() {
    let obstacle = Rect::new(10, 10, 50, 51);
    let mut router = Router::new();
    router.add_obstacle(obstacle);
    let id = router.add_path(p(0, 35), p(100, 35), ());
    router.solve();

    let points = router.points(id).unwrap();
    assert_eq!(points.len(), 4);
    assert!(points[1..3].iter().all(|q| q.y < obstacle.y));
    assert!(!enters_interior(points, obstacle));
}

#[test]
fn an_obstacle_containing_the_start_is_ignored_for_that_path() {
    let mut router = Router::new();
    router.add_obstacle(Rect::new(-20, -20, 40, 40));
    let id = router.add_path(p(0, 0), p(80, 0), ());
    router.solve();
    assert_eq!(router.points(id).unwrap(), &[p(0, 0), p(80, 0)]);
}

#[test]
fn paths_sharing_a_corner_are_spread_apart_by_the_spacing() {
    let obstacle = Rect::new(10, 10, 50, 50);
    let mut router = Router::new();
    router.add_obstacle(obstacle);
    let lower = router.add_path(p(0, 30), p(100, 30), ());
    let upper = router.add_path(p(0, 25), p(100, 25), ());
    router.solve();

    let lower_points = router.points(lower).unwrap();
    let upper_points = router.points(upper).unwrap();
    assert_eq!(lower_points, &[p(0, 30), p(0, 0), p(69, 0), p(100, 30)]);
    assert_eq!(upper_points, &[p(0, 25), p(-10, -10), p(79, -10), p(100, 25)]);

    let spacing = router.spacing() as i32;
    for i in 1..3 {
        let (a, b) = (lower_points[i], upper_points[i]);
        assert!((a.x - b.x).abs() >= spacing && (a.y - b.y).abs() >= spacing);
    }
    assert!(!enters_interior(lower_points, obstacle));
    assert!(!enters_interior(upper_points, obstacle));
}

#[test]
fn removing_the_middle_obstacle_of_a_corridor_gives_a_shorter_straighter_route() {
    let left = Rect::new(40, 60, 30, 30);
    let middle = Rect::new(110, 20, 40, 80);
    let right = Rect::new(190, 60, 30, 30);
    let mut router = Router::new();
    for r in [left, middle, right] {
        router.add_obstacle(r);
    }
    let id = router.add_path(p(0, 50), p(260, 50), ());
    router.solve();

    let around = router.points(id).unwrap().to_vec();
    assert_eq!(around, vec![p(0, 50), p(100, 10), p(159, 10), p(260, 50)]);
    for r in [left, middle, right] {
        assert!(!enters_interior(&around, r));
    }

    assert!(router.remove_obstacle(middle).unwrap());
    let outcome = router.solve();
    assert_eq!(outcome.updated, vec![id]);

    let through = router.points(id).unwrap();
    assert_eq!(through, &[p(0, 50), p(260, 50)]);
    assert!(polyline_length(through) < polyline_length(&around));
    assert!(through.len() < around.len());
}

#[test]
fn an_enclosed_start_is_reported_unresolved_and_retried_later() {
    let ring = [
        Rect::new(0, 0, 100, 20),
        Rect::new(0, 80, 100, 20),
        Rect::new(0, 0, 20, 100),
        Rect::new(80, 0, 20, 100),
    ];
    let mut router = Router::new();
    for r in ring {
        router.add_obstacle(r);
    }
    let id = router.add_path(p(50, 50), p(200, 50), ());
    let outcome = router.solve();

    assert_eq!(outcome.unresolved, vec![id]);
    assert!(!router.is_resolved(id).unwrap());
    assert!(router.is_dirty(id).unwrap());
    assert_eq!(router.points(id).unwrap(), &[p(50, 50), p(200, 50)]);

    router.remove_obstacle(ring[3]).unwrap();
    let outcome = router.solve();
    assert!(outcome.unresolved.is_empty());
    assert!(router.is_resolved(id).unwrap());
    assert!(!router.is_dirty(id).unwrap());
}

#[test]
fn bend_points_split_a_path_into_independently_routed_pieces() {
    let mut router = Router::new();
    let id = router.add_path(p(0, 0), p(200, 0), ());
    router.set_bend_points(id, Some(vec![p(100, 100)])).unwrap();
    let outcome = router.solve();
    assert_eq!(outcome.updated, vec![id]);
    assert_eq!(router.points(id).unwrap(), &[p(0, 0), p(100, 100), p(200, 0)]);

    router.set_bend_points(id, None).unwrap();
    assert!(router.is_dirty(id).unwrap());
    router.solve();
    assert_eq!(router.points(id).unwrap(), &[p(0, 0), p(200, 0)]);
}

#[test]
fn constrained_pieces_route_around_obstacles_on_their_own() {
    let obstacle = Rect::new(10, 10, 50, 50);
    let mut router = Router::new();
    router.add_obstacle(obstacle);
    let id = router.add_path(p(0, 30), p(100, 200), ());
    router.set_bend_points(id, Some(vec![p(100, 30)])).unwrap();
    router.solve();

    let points = router.points(id).unwrap();
    assert_eq!(points, &[p(0, 30), p(0, 0), p(69, 0), p(100, 30), p(100, 200)]);
    assert!(!enters_interior(points, obstacle));
}

#[test]
fn a_path_with_identical_endpoints_is_a_single_point_pair() {
    let mut router = Router::new();
    router.add_obstacle(Rect::new(10, 10, 50, 50));
    let id = router.add_path(p(5, 5), p(5, 5), ());
    router.solve();
    assert_eq!(router.points(id).unwrap(), &[p(5, 5), p(5, 5)]);
}

#[test]
fn unbounded_threshold_finds_the_same_route() {
    let config = RouterConfig {
        threshold: narwhal::ThresholdPolicy::Unbounded,
        ..Default::default()
    };
    let mut router: Router = Router::with_config(config);
    router.add_obstacle(Rect::new(10, 10, 50, 50));
    let id = router.add_path(p(0, 30), p(100, 30), ());
    router.solve();
    assert_eq!(router.points(id).unwrap(), &[p(0, 30), p(0, 0), p(69, 0), p(100, 30)]);
}
