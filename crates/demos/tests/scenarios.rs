use glam::Vec3;
use scenekit_controls::Action;
use scenekit_demos::{
    BasicDemo, CameraSwitchDemo, Demo, DemoKind, FrameLoop, ObjectCountDemo, ObjectTransformDemo,
    grid_positions,
};
use scenekit_render::{CameraKind, DebugTextRenderer, RenderSettings};

fn settings() -> RenderSettings {
    RenderSettings::default()
}

fn node_signature(demo: &dyn Demo) -> Vec<(Option<String>, &'static str)> {
    demo.context()
        .scene
        .iter()
        .map(|n| (n.name().map(str::to_string), n.kind.kind_name()))
        .collect()
}

#[test]
fn grid_size_and_bounds_for_many_planes() {
    for w in [5.0, 12.5, 60.0, 99.9, 180.0] {
        for h in [5.0, 20.0, 40.0, 77.0, 180.0] {
            let grid = grid_positions(w, h);
            let expected = (h / 5.0).floor() as usize * (w / 5.0).floor() as usize;
            assert_eq!(grid.len(), expected, "{w} x {h}");
            for p in grid {
                assert!(p.x >= -w / 2.0 && p.x <= w / 2.0);
                assert!(p.z >= -h / 2.0 && p.z <= h / 2.0);
            }
        }
    }
}

#[test]
fn sphere_height_stays_above_floor_for_any_speed() {
    for speed in [0.0, 0.01, 0.03, 0.25, 0.5] {
        let mut demo = BasicDemo::new(settings()).unwrap();
        demo.controls_mut().bouncing_speed = speed;
        for _ in 0..500 {
            demo.step().unwrap();
            let y = demo
                .context()
                .scene
                .node(demo.sphere())
                .unwrap()
                .transform
                .position
                .y;
            assert!(y >= 2.0);
        }
    }
}

#[test]
fn camera_toggle_parity() {
    let mut demo = CameraSwitchDemo::new(settings()).unwrap();
    let start = demo.context().camera.position;
    for n in 1..=9u32 {
        demo.invoke(Action::SwitchCamera).unwrap();
        let camera = demo.context().camera;
        let expected = if n % 2 == 1 {
            CameraKind::Orthographic
        } else {
            CameraKind::Perspective
        };
        assert_eq!(camera.kind(), expected);
        assert_eq!(camera.position.x.to_bits(), start.x.to_bits());
        assert_eq!(camera.position.y.to_bits(), start.y.to_bits());
        assert_eq!(camera.position.z.to_bits(), start.z.to_bits());
    }
}

#[test]
fn add_then_remove_restores_node_count() {
    for n in 1..=3 {
        let mut demo = ObjectCountDemo::new(settings(), n as u64).unwrap();
        let initial = demo.context().scene.len();
        for _ in 0..n {
            demo.invoke(Action::AddCube).unwrap();
        }
        assert_eq!(demo.context().scene.len(), initial + n);
        for _ in 0..n {
            demo.invoke(Action::RemoveCube).unwrap();
        }
        assert_eq!(demo.context().scene.len(), initial);
    }
}

#[test]
fn lights_survive_any_action_order() {
    let mut demo = ObjectCountDemo::new(settings(), 17).unwrap();
    let script = [
        Action::RemoveCube,
        Action::AddCube,
        Action::RemoveCube,
        Action::RemoveCube,
        Action::AddCube,
        Action::AddCube,
        Action::RemoveCube,
        Action::RemoveCube,
        Action::RemoveCube,
        Action::RemoveCube,
    ];
    for action in script {
        demo.invoke(action).unwrap();
        assert_eq!(demo.context().scene.lights().count(), 2);
    }
    assert_eq!(demo.context().scene.len(), 3);
}

#[test]
fn direct_binding_is_exact_and_idempotent() {
    let mut demo = ObjectTransformDemo::new(settings()).unwrap();
    let values = [-9.75_f32, -0.1, 0.0, 0.3, 3.25, 19.9];
    for v in values {
        {
            let c = demo.controls_mut();
            c.position_x = v;
            c.position_y = v;
            c.rotation_z = v;
            c.scale_y = v;
        }
        demo.step().unwrap();
        let t = demo.context().scene.node(demo.cube()).unwrap().transform;
        assert_eq!(t.position.x, v);
        assert_eq!(t.position.y, v);
        assert_eq!(t.rotation.z, v);
        assert_eq!(t.scale.y, v);

        demo.step().unwrap();
        let again = demo.context().scene.node(demo.cube()).unwrap().transform;
        assert_eq!(again, t);
    }
}

#[test]
fn objects_demo_end_to_end() {
    let mut demo = DemoKind::Objects.build(settings(), 2024).unwrap();
    let before = node_signature(demo.as_ref());
    assert_eq!(before.len(), 3);

    demo.invoke(Action::AddCube).unwrap();
    assert_eq!(demo.context().scene.len(), 4);
    assert!(demo.context().scene.last().unwrap().is_mesh());

    demo.invoke(Action::RemoveCube).unwrap();
    assert_eq!(node_signature(demo.as_ref()), before);
}

#[test]
fn headless_run_renders_every_frame() {
    for kind in DemoKind::ALL {
        let mut demo = kind.build(settings(), 1).unwrap();
        let mut renderer = DebugTextRenderer::new();
        let mut frames = Vec::new();
        FrameLoop::default()
            .run(demo.as_mut(), &mut renderer, 3, |i, out| frames.push((i, out)))
            .unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames[2].1.contains("=== Frame 3"));
    }
}

#[test]
fn marker_tracks_target_through_the_loop() {
    let mut demo = CameraSwitchDemo::new(settings()).unwrap();
    let mut renderer = DebugTextRenderer::new();
    FrameLoop::default()
        .run(&mut demo, &mut renderer, 25, |_, _| {})
        .unwrap();
    let marker = demo.context().scene.node(demo.marker()).unwrap();
    assert_eq!(marker.transform.position, demo.context().camera.target());
    assert_eq!(marker.transform.position.y, 10.0);
    assert_ne!(marker.transform.position, Vec3::ZERO);
}
