//! Cross-module scenarios that exercise `core::Space` together with the
//! transient graph, rules engine, and session store rather than any one
//! module in isolation.

use wincore::core::geometry::{Point, Rect, Size};
use wincore::core::ids::OutputId;
use wincore::core::output_set::{Dpms, Output, Transform};
use wincore::core::rules_engine::{Policy, PropertyKey, PropertyOverride, PropertyValue, Rule};
use wincore::core::session::{SerMaxMode, SerRect, SessionRecord};
use wincore::core::space::{RemoveReason, Space};
use wincore::core::window::{Window, WindowKind};

fn output(x: i32, w: i32) -> Output {
    Output {
        id: OutputId::for_test(1),
        position: Point::new(x, 0),
        size: Size::new(w, 1024),
        scale: 1.0,
        refresh_rate_mhz: 60_000,
        dpms: Dpms { on: true },
        transform: Transform::Normal,
        enabled: true,
    }
}

fn adopt_at(space: &mut Space, x: i32, y: i32, w: i32, h: i32) -> wincore::core::ids::WindowId {
    let id = space.allocate_id();
    let window = Window::new(id, WindowKind::Internal, Rect::new(Point::new(x, y), Size::new(w, h)));
    space.adopt(window)
}

#[test]
fn adopt_then_remove_without_remnant_leaves_every_subsystem_untouched() {
    let mut space = Space::new();
    let survivor = adopt_at(&mut space, 0, 0, 100, 100);
    space.activate(survivor, true);

    let transient = adopt_at(&mut space, 10, 10, 50, 50);
    space.transients.add_child(survivor, transient).unwrap();
    space.focus_chain.update(space.current_desktop(), transient, wincore::core::focus_chain::Reason::MakeFirst);

    space.remove(transient, RemoveReason::Destroy, false);

    assert!(space.get(transient).is_none());
    assert_eq!(space.transients.parent_of(transient), None);
    assert!(!space.focus_chain.chain(space.current_desktop()).contains(&transient));
    // The surviving window's own state is unaffected by its child's removal.
    assert_eq!(space.active_window(), Some(survivor));
    assert_eq!(space.transients.children_of(survivor), &[] as &[wincore::core::ids::WindowId]);
}

#[test]
fn closing_a_transient_parent_detaches_rather_than_orphans_the_child() {
    let mut space = Space::new();
    let parent = adopt_at(&mut space, 0, 0, 300, 300);
    let child = adopt_at(&mut space, 50, 50, 100, 100);
    space.transients.add_child(parent, child).unwrap();

    space.remove(parent, RemoveReason::Destroy, false);

    assert!(space.get(child).is_some());
    assert_eq!(space.transients.parent_of(child), None);
}

#[test]
fn rule_forced_fullscreen_exempt_property_is_left_to_the_default_elsewhere() {
    // Only the ruled property is affected; an unrelated property for the
    // same window still falls through to its caller-supplied default.
    let mut space = Space::new();
    space.rules.set_rules(vec![Rule {
        matcher: Default::default(),
        overrides: vec![PropertyOverride {
            property: PropertyKey::SkipTaskbar,
            policy: Policy::Force,
            value: PropertyValue::Bool(true),
        }],
    }]);

    let info = wincore::core::rules_engine::WindowMatchInfo::default();
    let skip_taskbar = space.rules.check_property(&info, PropertyKey::SkipTaskbar, PropertyValue::Bool(false));
    let skip_pager = space.rules.check_property(&info, PropertyKey::SkipPager, PropertyValue::Bool(false));

    assert_eq!(skip_taskbar, PropertyValue::Bool(true));
    assert_eq!(skip_pager, PropertyValue::Bool(false));
}

#[test]
fn session_record_survives_a_save_close_restore_round_trip() {
    let mut space = Space::new();
    let out = output(0, 1280);
    let w = adopt_at(&mut space, 100, 100, 400, 300);
    space.maximize(w, wincore::core::window::MaxMode::Full, &out);

    let snapshot = space.get(w).unwrap();
    let saved = SessionRecord {
        session_id: "session-1".into(),
        window_role: "main".into(),
        resource_name: "editor".into(),
        resource_class: "editor".into(),
        client_machine: "localhost".into(),
        frame_geometry: SerRect::from(snapshot.common.frame_geometry),
        restore_geometry: SerRect::from(snapshot.common.restore_geometry),
        desktop: space.current_desktop(),
        on_all_desktops: false,
        max_mode: SerMaxMode::from(snapshot.common.max_mode),
        fullscreen: snapshot.common.fullscreen,
        minimized: snapshot.common.minimized,
        keep_above: snapshot.common.keep_above,
        keep_below: snapshot.common.keep_below,
        skip_taskbar: snapshot.common.skip_taskbar,
        skip_pager: snapshot.common.skip_pager,
        skip_switcher: snapshot.common.skip_switcher,
        no_border: snapshot.common.no_border,
        window_type: "normal".into(),
        shortcut: None,
        active: space.active_window() == Some(w),
        stacking_index: 0,
        opacity: 1.0,
    };

    // Client closes; a fresh space is built from a restored session record.
    space.remove(w, RemoveReason::Destroy, false);
    assert!(space.get(w).is_none());

    let mut restored = Space::new();
    restored.sessions.load(vec![saved.clone()]);
    let record = restored.sessions.take_session_info("session-1", "main", "editor").unwrap();
    assert_eq!(record, saved);

    let restored_id = restored.allocate_id();
    let restored_window = Window::new(
        restored_id,
        WindowKind::Internal,
        Rect::from(record.frame_geometry),
    );
    let restored_id = restored.adopt(restored_window);
    assert_eq!(restored.get(restored_id).unwrap().common.frame_geometry, Rect::from(saved.frame_geometry));
    // Consumed: a second restore of the same client does not match again.
    assert!(restored.sessions.take_session_info("session-1", "main", "editor").is_none());
}
