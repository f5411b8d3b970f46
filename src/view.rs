//! The character view: owns the mate, turns input into state changes,
//! advances it once per frame, redraws, and tells the shell when the cursor
//! is over something clickable.

use crate::controls::{bar_rects, control_buttons, keyboard, spawn_control_bar, ControlButton};
use crate::draw::{draw, Canvas};
use crate::mate::{Action, ControlMode, Mate};
use crate::menu::{fit_menu, menu_buttons, refresh_labels, sync_menu, ContextMenu};
use crate::paint::{paint, setup_paint};
use crate::pointer::Pointer;
use crate::shell::{ForwardedCursor, Passthrough, SetIgnoreMouseEvents};
use crate::variant::{Species, Variant};
use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow};
use std::time::Duration;

/// Canvas size assumed until the window reports its own.
pub const DEFAULT_BOUNDS: Vec2 = Vec2::new(1280.0, 720.0);
/// Delay after a release before the hover region is evaluated again.
pub const RELEASE_RECHECK: Duration = Duration::from_millis(50);

pub struct ViewPlugin {
    pub species: Species,
    pub mode: ControlMode,
}

impl Plugin for ViewPlugin {
    fn build(&self, app: &mut App) {
        let variant = Variant::for_species(self.species);
        app.insert_resource(Mate::new(variant, self.mode, DEFAULT_BOUNDS))
            .init_resource::<Pointer>()
            .init_resource::<ContextMenu>()
            .init_resource::<Canvas>()
            .init_resource::<CursorAt>()
            .init_resource::<Interactivity>()
            .add_systems(Startup, (setup_camera, setup_paint))
            .add_systems(
                Update,
                (
                    sync_bounds,
                    sample_cursor,
                    pointer_input,
                    keyboard.run_if(in_menu_mode),
                    menu_buttons,
                    control_buttons,
                    refresh_labels,
                    sync_menu,
                    fit_menu,
                    tick_tasks,
                    redraw,
                    advance_frame,
                    track_interactivity,
                    cursor_feedback,
                    paint,
                )
                    .chain(),
            );

        if self.mode == ControlMode::Timed {
            app.add_systems(Startup, spawn_control_bar);
        }
        info!("{:?} mate, {:?} controls", self.species, self.mode);
    }
}

/// Cursor in canvas pixels for this frame, forwarded or from the window.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct CursorAt(pub Option<Vec2>);

#[derive(Resource, Default, Debug)]
pub struct Interactivity {
    /// The cursor is over the character, the menu or the control bar (or a drag is on).
    pub over: bool,
    sent: Option<bool>,
    recheck: Option<Timer>,
}

impl Interactivity {
    pub fn recheck_after_release(&mut self) {
        self.recheck = Some(Timer::new(RELEASE_RECHECK, TimerMode::Once));
    }
}

pub fn in_menu_mode(mate: Res<Mate>) -> bool {
    mate.mode == ControlMode::Menu
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

pub fn sync_bounds(
    windows: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
    mut mate: ResMut<Mate>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    if size.min_element() <= 0.0 || size == mate.state.bounds {
        return;
    }
    debug!("canvas resized to {}x{}", size.x, size.y);
    mate.state.set_bounds(size);
}

pub fn sample_cursor(
    forwarded: Res<ForwardedCursor>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cursor: ResMut<CursorAt>,
) {
    let at = forwarded
        .0
        .or_else(|| windows.get_single().ok().and_then(Window::cursor_position));
    if cursor.0 != at {
        cursor.0 = at;
    }
}

#[allow(clippy::too_many_arguments)]
pub fn pointer_input(
    time: Res<Time>,
    buttons: Res<ButtonInput<MouseButton>>,
    cursor: Res<CursorAt>,
    ui: Query<&Interaction>,
    mut mate: ResMut<Mate>,
    mut pointer: ResMut<Pointer>,
    mut menu: ResMut<ContextMenu>,
    mut interactivity: ResMut<Interactivity>,
) {
    let released = buttons.just_released(MouseButton::Left);
    let Some(at) = cursor.0 else {
        if released && pointer.release(&mut mate) {
            interactivity.recheck_after_release();
        }
        return;
    };

    let over_ui = ui.iter().any(|i| *i != Interaction::None);
    if buttons.just_pressed(MouseButton::Left) && !over_ui {
        if !menu.contains(at) {
            menu.close();
        }
        let press = pointer.press(&mut mate, at, time.elapsed_seconds_f64() * 1000.0);
        if press.double_click {
            mate.perform(Action::Talk);
        }
    }

    if pointer.held() && pointer.motion(&mut mate, at) && menu.is_open() {
        menu.close();
    }

    if released && pointer.release(&mut mate) {
        interactivity.recheck_after_release();
    }

    if buttons.just_pressed(MouseButton::Right)
        && mate.mode == ControlMode::Menu
        && mate.state.hit(at)
        && pointer.secondary_press()
    {
        menu.open(at);
    }
}

pub fn tick_tasks(time: Res<Time>, mut mate: ResMut<Mate>) {
    mate.tick(time.delta());
}

pub fn redraw(time: Res<Time>, mut mate: ResMut<Mate>, mut canvas: ResMut<Canvas>) {
    draw(&mut mate, time.elapsed_seconds_f64() * 1000.0, &mut canvas);
}

pub fn advance_frame(mut mate: ResMut<Mate>) {
    let report = mate.frame();
    if report.landed {
        debug!("landed at y={}", mate.state.pos.y);
    }
    if report.bounced {
        debug!("bounced at x={}", mate.state.pos.x);
    }
    if report.talk_ended {
        debug!("finished talking");
    }
}

/// Whether `at` is over something that has to receive clicks.
pub fn interactive_at(at: Vec2, mate: &Mate, menu: &ContextMenu, bar: &[Rect]) -> bool {
    mate.state.hit(at) || menu.contains(at) || bar.iter().any(|r| r.contains(at))
}

#[allow(clippy::too_many_arguments)]
pub fn track_interactivity(
    time: Res<Time>,
    buttons: Res<ButtonInput<MouseButton>>,
    passthrough: Res<Passthrough>,
    cursor: Res<CursorAt>,
    mate: Res<Mate>,
    pointer: Res<Pointer>,
    menu: Res<ContextMenu>,
    bar: Query<(&Node, &GlobalTransform), With<ControlButton>>,
    mut state: ResMut<Interactivity>,
    mut signals: EventWriter<SetIgnoreMouseEvents>,
) {
    let rects = bar_rects(&bar);
    let region = cursor
        .0
        .is_some_and(|at| interactive_at(at, &mate, &menu, &rects));
    let button_down = buttons.get_pressed().next().is_some();

    if pointer.held() {
        state.over = true;
        state.recheck = None;
    } else if let Some(timer) = state.recheck.as_mut() {
        // waits past the delay for as long as any button is down
        if timer.tick(time.delta()).finished() && !button_down {
            state.recheck = None;
            state.over = region;
        }
    } else if state.over != region {
        state.over = region;
    }

    if passthrough.enabled && state.sent != Some(state.over) {
        let over = state.over;
        let edge = if over { "entered" } else { "left" };
        debug!("pointer {} interactive region", edge);
        signals.send(SetIgnoreMouseEvents {
            ignore: !over,
            forward: true,
        });
        state.sent = Some(over);
    }
}

pub fn cursor_feedback(
    cursor: Res<CursorAt>,
    mate: Res<Mate>,
    pointer: Res<Pointer>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };
    let icon = if pointer.held() {
        CursorIcon::Grabbing
    } else if cursor.0.is_some_and(|at| mate.state.hit(at)) {
        CursorIcon::Grab
    } else {
        CursorIcon::Default
    };
    if window.cursor.icon != icon {
        window.cursor.icon = icon;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_covers_character_and_bar() {
        let mate = Mate::new(Variant::pet(), ControlMode::Timed, DEFAULT_BOUNDS);
        let menu = ContextMenu::default();
        let bar = [Rect::new(600.0, 650.0, 700.0, 690.0)];
        assert!(interactive_at(mate.state.center(), &mate, &menu, &bar));
        assert!(interactive_at(Vec2::new(650.0, 670.0), &mate, &menu, &bar));
        assert!(!interactive_at(Vec2::new(900.0, 100.0), &mate, &menu, &bar));
    }
}
