// Headless checks of the passthrough signal between the view and the shell.
// A bare App with a hand-spawned window entity; no winit, no renderer.

use bevy::prelude::*;
use bevy::window::{Cursor, PrimaryWindow};
use desktop_mate::mate::{ControlMode, Mate};
use desktop_mate::menu::ContextMenu;
use desktop_mate::pointer::Pointer;
use desktop_mate::shell::{Passthrough, SetIgnoreMouseEvents, ShellPlugin};
use desktop_mate::variant::Variant;
use desktop_mate::view::{track_interactivity, CursorAt, Interactivity, DEFAULT_BOUNDS};

fn shell_app(passthrough: Passthrough, hit_test: bool) -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins(ShellPlugin { passthrough: passthrough.enabled })
        .insert_resource(passthrough);
    let window = app
        .world_mut()
        .spawn((
            Window {
                cursor: Cursor {
                    hit_test,
                    ..default()
                },
                ..default()
            },
            PrimaryWindow,
        ))
        .id();
    (app, window)
}

fn hit_test(app: &App, window: Entity) -> bool {
    app.world().get::<Window>(window).map(|w| w.cursor.hit_test).unwrap_or_default()
}

#[test]
fn last_request_in_a_frame_wins() {
    let (mut app, window) = shell_app(Passthrough::new(true, true), true);
    app.world_mut().send_event(SetIgnoreMouseEvents::INTERACTIVE);
    app.world_mut().send_event(SetIgnoreMouseEvents::CLICK_THROUGH);
    app.update();
    assert!(!hit_test(&app, window));
    assert!(app.world().resource::<Passthrough>().forwarding());

    app.world_mut().send_event(SetIgnoreMouseEvents::INTERACTIVE);
    app.update();
    assert!(hit_test(&app, window));
}

#[test]
fn forwarding_without_a_global_cursor_keeps_the_window_clickable() {
    let (mut app, window) = shell_app(Passthrough::new(true, false), true);
    app.world_mut().send_event(SetIgnoreMouseEvents::CLICK_THROUGH);
    app.update();
    assert!(hit_test(&app, window));
    assert!(!app.world().resource::<Passthrough>().forwarding());

    // plain ignore without forwarding is still honored
    app.world_mut().send_event(SetIgnoreMouseEvents {
        ignore: true,
        forward: false,
    });
    app.update();
    assert!(!hit_test(&app, window));
}

#[test]
fn global_cursor_is_polled_while_the_window_is_interactive() {
    let (mut app, window) = shell_app(Passthrough::new(true, true), false);
    app.world_mut().send_event(SetIgnoreMouseEvents {
        ignore: false,
        forward: true,
    });
    app.update();
    assert!(hit_test(&app, window));
    let passthrough = app.world().resource::<Passthrough>();
    assert!(!passthrough.forwarding());
    assert!(passthrough.polls_cursor());

    assert!(!Passthrough::new(true, false).polls_cursor());
    assert!(!Passthrough::new(false, true).polls_cursor());
}

#[test]
fn disabled_passthrough_drops_requests() {
    let (mut app, window) = shell_app(Passthrough::new(false, true), true);
    app.world_mut().send_event(SetIgnoreMouseEvents::CLICK_THROUGH);
    app.update();
    assert!(hit_test(&app, window));
}

#[test]
fn requests_after_the_window_closed_are_ignored() {
    let (mut app, window) = shell_app(Passthrough::new(true, true), true);
    app.world_mut().despawn(window);
    app.world_mut().send_event(SetIgnoreMouseEvents::CLICK_THROUGH);
    app.update();
    assert!(app.world().get_entity(window).is_none());
}

#[test]
fn hovering_the_character_makes_the_window_clickable() {
    let (mut app, window) = shell_app(Passthrough::new(true, true), false);
    let mate = Mate::new(Variant::pet(), ControlMode::Menu, DEFAULT_BOUNDS);
    let center = mate.state.center();
    app.insert_resource(mate)
        .init_resource::<Time>()
        .init_resource::<ButtonInput<MouseButton>>()
        .init_resource::<Pointer>()
        .init_resource::<ContextMenu>()
        .init_resource::<Interactivity>()
        .insert_resource(CursorAt(Some(Vec2::new(900.0, 500.0))))
        .add_systems(Update, track_interactivity);

    app.update();
    assert!(!hit_test(&app, window));
    assert!(!app.world().resource::<Interactivity>().over);

    app.insert_resource(CursorAt(Some(center)));
    app.update();
    assert!(hit_test(&app, window));

    app.insert_resource(CursorAt(Some(center + Vec2::new(60.0, 0.0))));
    app.update();
    assert!(!hit_test(&app, window));
}
