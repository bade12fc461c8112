use narwhal::{Error, MAX_SPACING, Point, Rect, Router, RouterConfig};

fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

fn cuts_any(points: &[Point], r: Rect) -> bool {
    points.windows(2).any(|w| r.cuts_interior(w[0], w[1]))
}

fn routed_around_one_obstacle() -> (Router, narwhal::PathId) {
    let mut router = Router::new();
    router.add_obstacle(Rect::new(10, 10, 50, 50));
    let id = router.add_path(p(0, 30), p(100, 30), ());
    router.solve();
    (router, id)
}

#[test]
fn solving_twice_without_edits_reports_nothing() {
    let (mut router, id) = routed_around_one_obstacle();
    assert!(!router.is_dirty(id).unwrap());
    let before = router.points(id).unwrap().to_vec();
    assert!(router.solve().is_empty());
    assert_eq!(router.points(id).unwrap(), before.as_slice());
}

#[test]
fn adding_then_removing_an_obstacle_restores_the_route() {
    let (mut router, id) = routed_around_one_obstacle();
    let original = router.points(id).unwrap().to_vec();

    let intruder = Rect::new(20, -5, 20, 10);
    assert!(router.add_obstacle(intruder));
    assert!(router.is_dirty(id).unwrap());
    let outcome = router.solve();
    assert_eq!(outcome.updated, vec![id]);
    let detour = router.points(id).unwrap();
    assert_eq!(detour, &[p(0, 30), p(0, 0), p(49, -15), p(69, 0), p(100, 30)]);
    assert!(!cuts_any(detour, intruder), "route crosses the new box: {detour:?}");
    assert!(!cuts_any(detour, Rect::new(10, 10, 50, 50)), "{detour:?}");

    router.remove_obstacle(intruder).unwrap();
    router.solve();
    assert_eq!(router.points(id).unwrap(), original.as_slice());
}

#[test]
fn a_far_away_obstacle_dirties_nothing() {
    let (mut router, id) = routed_around_one_obstacle();
    assert!(!router.add_obstacle(Rect::new(500, 500, 10, 10)));
    assert!(!router.is_dirty(id).unwrap());
    assert!(router.solve().updated.is_empty());
    assert_eq!(router.obstacle_count(), 2);
}

#[test]
fn updating_an_obstacle_to_identical_bounds_is_a_no_op() {
    let (mut router, id) = routed_around_one_obstacle();
    let r = Rect::new(10, 10, 50, 50);
    assert!(!router.update_obstacle(r, r).unwrap());
    assert!(!router.is_dirty(id).unwrap());
}

#[test]
fn moving_the_obstacle_out_of_the_way_straightens_the_route() {
    let (mut router, id) = routed_around_one_obstacle();
    assert!(router
        .update_obstacle(Rect::new(10, 10, 50, 50), Rect::new(10, 100, 50, 50))
        .unwrap());
    router.solve();
    assert_eq!(router.points(id).unwrap(), &[p(0, 30), p(100, 30)]);
}

#[test]
fn moving_an_endpoint_dirties_only_that_path() {
    let mut router = Router::new();
    let a = router.add_path(p(0, 0), p(50, 0), ());
    let b = router.add_path(p(0, 100), p(50, 100), ());
    router.solve();

    router.set_end_point(a, p(60, 10)).unwrap();
    assert!(router.is_dirty(a).unwrap());
    assert!(!router.is_dirty(b).unwrap());

    let outcome = router.solve();
    assert_eq!(outcome.updated, vec![a]);
    assert_eq!(router.end_point(a).unwrap(), p(60, 10));
}

#[test]
fn resetting_an_endpoint_to_its_current_value_keeps_the_path_clean() {
    let (mut router, id) = routed_around_one_obstacle();
    router.set_start_point(id, p(0, 30)).unwrap();
    assert!(!router.is_dirty(id).unwrap());
}

#[test]
fn removed_paths_and_unknown_obstacles_are_errors() {
    let (mut router, id) = routed_around_one_obstacle();
    router.remove_path(id).unwrap();
    assert!(matches!(router.points(id), Err(Error::UnknownPath { .. })));
    assert!(matches!(
        router.set_bend_points(id, None),
        Err(Error::UnknownPath { .. })
    ));
    assert!(matches!(
        router.remove_obstacle(Rect::new(0, 0, 1, 1)),
        Err(Error::UnknownObstacle { .. })
    ));
    assert_eq!(router.paths().count(), 0);
}

#[test]
fn spacing_changes_take_effect_without_dirtying() {
    let (mut router, id) = routed_around_one_obstacle();
    router.set_spacing(4).unwrap();
    assert!(!router.is_dirty(id).unwrap());
    let outcome = router.solve();
    assert_eq!(outcome.updated, vec![id]);
    assert_eq!(router.points(id).unwrap(), &[p(0, 30), p(6, 6), p(63, 6), p(100, 30)]);
}

#[test]
fn oversized_spacing_is_rejected_and_the_largest_allowed_one_still_solves() {
    let (mut router, id) = routed_around_one_obstacle();
    assert!(matches!(
        router.set_spacing(u32::MAX),
        Err(Error::InvalidSpacing { .. })
    ));
    assert_eq!(router.spacing(), 10);

    router.set_spacing(MAX_SPACING).unwrap();
    router.add_obstacle(Rect::new(70, -20, 20, 20));
    router.add_path(p(0, 40), p(100, 40), ());
    router.solve();
    let points = router.points(id).unwrap();
    assert_eq!(points.first(), Some(&p(0, 30)));
    assert_eq!(points.last(), Some(&p(100, 30)));
}

#[test]
fn unvalidated_huge_spacing_is_capped_during_solve() {
    let config = RouterConfig {
        spacing: u32::MAX,
        ..Default::default()
    };
    let mut router: Router = Router::with_config(config);
    router.add_obstacle(Rect::new(10, 10, 50, 50));
    router.add_obstacle(Rect::new(70, -20, 20, 20));
    let a = router.add_path(p(0, 30), p(100, 30), ());
    let b = router.add_path(p(0, 40), p(100, 40), ());
    router.solve();
    assert_eq!(router.points(a).unwrap().first(), Some(&p(0, 30)));
    assert_eq!(router.points(b).unwrap().last(), Some(&p(100, 40)));
}

#[test]
fn disabling_grown_rerouting_keeps_the_taut_corners() {
    let config = RouterConfig {
        reroute_grown_intersections: false,
        ..Default::default()
    };
    let mut router: Router = Router::with_config(config);
    router.add_obstacle(Rect::new(10, 10, 50, 50));
    let id = router.add_path(p(0, 30), p(100, 30), ());
    router.add_obstacle(Rect::new(20, -5, 20, 10));
    router.solve();
    assert_eq!(router.points(id).unwrap(), &[p(0, 30), p(0, 0), p(69, 0), p(100, 30)]);
}

#[test]
fn path_payloads_travel_with_their_ids() {
    let mut router: Router<&str> = Router::new();
    let id = router.add_path(p(0, 0), p(10, 0), "wire");
    assert_eq!(router.data(id), Some(&"wire"));
    if let Some(data) = router.data_mut(id) {
        *data = "cable";
    }
    assert_eq!(router.remove_path(id).unwrap(), "cable");
}
