//! The hero scene must look the same on landscape and portrait screens: a
//! point's pixel offset from the centre depends only on the short side.

use portfolio_motion::effects::hero::{
    Camera, HeroScene, Projection, Vec3, CAMERA_DISTANCE, FOV_DEGREES,
};
use portfolio_motion::motion::Vec2;
use proptest::prelude::*;

fn approx_eq2(a: (f64, f64), b: (f64, f64), eps: f64) -> bool {
    (a.0 - b.0).abs() < eps && (a.1 - b.1).abs() < eps
}

fn pixels(projection: &Projection, view: Vec3) -> Option<(f64, f64)> {
    projection.project(view, 0.05).map(|p| projection.to_pixels(&p))
}

#[test]
fn wide_and_tall_viewports_agree() {
    let wide = Projection::new(1920.0, 1080.0, FOV_DEGREES);
    let tall = Projection::new(1080.0, 1920.0, FOV_DEGREES);

    let samples = [
        Vec3::new(0.0, 0.0, -CAMERA_DISTANCE),
        Vec3::new(1.0, 0.0, -CAMERA_DISTANCE),
        Vec3::new(0.0, 1.0, -CAMERA_DISTANCE),
        Vec3::new(-1.4, 0.8, -4.0),
        Vec3::new(0.6, -1.2, -9.0),
    ];

    for view in samples {
        let p1 = pixels(&wide, view).unwrap();
        let p2 = pixels(&tall, view).unwrap();
        // f32 clip coordinates lose a little precision at 1920px.
        assert!(approx_eq2(p1, p2, 1e-3), "p1={:?} p2={:?}", p1, p2);
    }
}

#[test]
fn point_size_ignores_aspect() {
    let wide = Projection::new(1920.0, 1080.0, FOV_DEGREES);
    let tall = Projection::new(1080.0, 1920.0, FOV_DEGREES);
    let view = Vec3::new(0.3, 0.2, -5.0);
    let a = wide.project(view, 0.1).unwrap();
    let b = tall.project(view, 0.1).unwrap();
    assert!((a.size_px - b.size_px).abs() < 1e-4);
}

#[test]
fn resize_matches_fresh_projection() {
    let mut p = Projection::new(800.0, 600.0, FOV_DEGREES);
    p.resize(600.0, 800.0);
    assert_eq!(p, Projection::new(600.0, 800.0, FOV_DEGREES));
}

#[test]
fn resting_scene_stays_on_screen() {
    let mut scene = HeroScene::new(7, 1.0);
    let projection = Projection::new(1280.0, 720.0, FOV_DEGREES);
    let vertices = scene.frame(0.0, Vec2::new(0.0, 0.0));
    assert_eq!(vertices.len(), scene.len());

    // The knot sits at the origin, well inside the short side.
    let camera = Camera::new(Vec3::new(0.0, 0.0, CAMERA_DISTANCE));
    let centre = pixels(&projection, camera.view(Vec3::default())).unwrap();
    assert!(approx_eq2(centre, (0.0, 0.0), 1e-6));
}

proptest! {
    #[test]
    fn pixel_offsets_swap_with_orientation(
        w in 200.0f64..4000.0,
        h in 200.0f64..4000.0,
        x in -2.0f64..2.0,
        y in -2.0f64..2.0,
        z in -20.0f64..-1.0,
    ) {
        let a = Projection::new(w, h, FOV_DEGREES);
        let b = Projection::new(h, w, FOV_DEGREES);
        let view = Vec3::new(x, y, z);
        let p1 = pixels(&a, view).unwrap();
        let p2 = pixels(&b, view).unwrap();
        prop_assert!(approx_eq2(p1, p2, 1e-2), "p1={:?} p2={:?}", p1, p2);
    }
}
