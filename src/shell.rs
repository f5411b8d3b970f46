//! Host window: one borderless, transparent, always-on-top full-screen
//! surface, and the mouse-passthrough switch the view drives through
//! [`SetIgnoreMouseEvents`].

use bevy::prelude::*;
use bevy::window::{Cursor, ExitCondition, PrimaryWindow, WindowLevel, WindowMode};
use bevy::winit::WinitWindows;

pub const TITLE: &str = "desktop-mate";

/// Inbound signal from the view. Fire-and-forget; the last one in a frame wins.
#[derive(Event, Clone, Copy, PartialEq, Eq, Debug)]
pub struct SetIgnoreMouseEvents {
    pub ignore: bool,
    /// Keep reporting the cursor to the view while clicks pass through.
    pub forward: bool,
}

impl SetIgnoreMouseEvents {
    pub const CLICK_THROUGH: Self = Self {
        ignore: true,
        forward: true,
    };
    pub const INTERACTIVE: Self = Self {
        ignore: false,
        forward: false,
    };
}

/// How one request lands on the window.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Resolved {
    pub hit_test: bool,
    pub forwarding: bool,
    /// Forwarding was asked for but this platform cannot read the global cursor.
    pub degraded: bool,
}

/// Without a global cursor reading a click-through window could never notice the
/// cursor coming back, so forwarding requests keep the window interactive.
pub fn resolve(req: SetIgnoreMouseEvents, can_forward: bool) -> Resolved {
    if req.ignore && req.forward && !can_forward {
        return Resolved {
            hit_test: true,
            forwarding: false,
            degraded: true,
        };
    }
    Resolved {
        hit_test: !req.ignore,
        forwarding: req.ignore && req.forward,
        degraded: false,
    }
}

#[derive(Resource, Debug)]
pub struct Passthrough {
    pub enabled: bool,
    pub can_forward: bool,
    forwarding: bool,
    warned: bool,
}

impl Passthrough {
    pub fn new(enabled: bool, can_forward: bool) -> Self {
        Self {
            enabled,
            can_forward,
            forwarding: enabled && can_forward,
            warned: false,
        }
    }

    pub fn forwarding(&self) -> bool {
        self.forwarding
    }

    /// The global cursor keeps being polled while the window is interactive, so the
    /// view reads one cursor source on both sides of the hit-test switch.
    pub fn polls_cursor(&self) -> bool {
        self.enabled && self.can_forward
    }
}

/// Cursor position in window logical pixels, polled from the platform whenever
/// passthrough is on and the platform has one.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct ForwardedCursor(pub Option<Vec2>);

pub fn primary_window(passthrough: bool) -> Window {
    let start = if passthrough {
        SetIgnoreMouseEvents::CLICK_THROUGH
    } else {
        SetIgnoreMouseEvents::INTERACTIVE
    };
    Window {
        title: TITLE.into(),
        name: Some(TITLE.into()),
        mode: WindowMode::BorderlessFullscreen,
        resizable: false,
        decorations: false,
        transparent: true,
        window_level: WindowLevel::AlwaysOnTop,
        cursor: Cursor {
            hit_test: resolve(start, global_cursor::AVAILABLE).hit_test,
            ..default()
        },
        ..default()
    }
}

pub fn window_plugin(passthrough: bool) -> WindowPlugin {
    WindowPlugin {
        primary_window: Some(primary_window(passthrough)),
        exit_condition: ExitCondition::OnAllClosed,
        close_when_requested: true,
    }
}

pub struct ShellPlugin {
    pub passthrough: bool,
}

impl Plugin for ShellPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SetIgnoreMouseEvents>()
            .insert_resource(Passthrough::new(self.passthrough, global_cursor::AVAILABLE))
            .init_resource::<ForwardedCursor>()
            .add_systems(PreUpdate, (finalize_surface, forward_cursor))
            .add_systems(PostUpdate, apply_ignore_mouse_events);
    }
}

/// Platform window flags that bevy does not expose, set once the native window exists.
fn finalize_surface(
    mut done: Local<bool>,
    windows: Query<Entity, With<PrimaryWindow>>,
    winit_windows: Option<NonSend<WinitWindows>>,
) {
    if *done {
        return;
    }
    let Ok(entity) = windows.get_single() else {
        return;
    };
    let Some(winit_windows) = winit_windows else {
        return;
    };
    let Some(raw) = winit_windows.get_window(entity) else {
        return;
    };

    #[cfg(target_os = "windows")]
    {
        use winit::platform::windows::WindowExtWindows;
        raw.set_skip_taskbar(true);
    }
    #[cfg(target_os = "macos")]
    {
        use winit::platform::macos::WindowExtMacOS;
        raw.set_has_shadow(false);
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let _ = raw;
        warn!("taskbar and shadow flags are not available on this platform");
    }

    info!("surface ready");
    *done = true;
}

fn forward_cursor(
    passthrough: Res<Passthrough>,
    mut forwarded: ResMut<ForwardedCursor>,
    windows: Query<Entity, With<PrimaryWindow>>,
    winit_windows: Option<NonSend<WinitWindows>>,
) {
    forwarded.0 = None;
    if !passthrough.polls_cursor() {
        return;
    }
    let (Ok(entity), Some(winit_windows)) = (windows.get_single(), winit_windows) else {
        return;
    };
    let Some(raw) = winit_windows.get_window(entity) else {
        return;
    };
    let (Some(screen), Ok(origin)) = (global_cursor::screen_cursor(), raw.outer_position()) else {
        return;
    };
    let physical = screen - IVec2::new(origin.x, origin.y);
    forwarded.0 = Some(physical.as_vec2() / raw.scale_factor() as f32);
}

/// Last write wins; signals that arrive after the window is gone are dropped.
pub fn apply_ignore_mouse_events(
    mut requests: EventReader<SetIgnoreMouseEvents>,
    mut passthrough: ResMut<Passthrough>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Some(req) = requests.read().last().copied() else {
        return;
    };
    if !passthrough.enabled {
        return;
    }
    let Ok(mut window) = windows.get_single_mut() else {
        debug!("ignore-mouse-events {:?} dropped, no window", req);
        return;
    };

    let resolved = resolve(req, passthrough.can_forward);
    if resolved.degraded && !passthrough.warned {
        warn!("cursor forwarding is not supported here, the window stays clickable");
        passthrough.warned = true;
    }
    passthrough.forwarding = resolved.forwarding;
    if window.cursor.hit_test != resolved.hit_test {
        debug!(
            "hit test {} (ignore={}, forward={})",
            resolved.hit_test, req.ignore, req.forward
        );
        window.cursor.hit_test = resolved.hit_test;
    }
}

/// Global cursor position in physical screen pixels.
mod global_cursor {
    use bevy::math::IVec2;

    #[cfg(target_os = "windows")]
    pub const AVAILABLE: bool = true;
    #[cfg(not(target_os = "windows"))]
    pub const AVAILABLE: bool = false;

    #[cfg(target_os = "windows")]
    pub fn screen_cursor() -> Option<IVec2> {
        use windows::Win32::Foundation::POINT;
        use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

        let mut point = POINT::default();
        // SAFETY: GetCursorPos only writes into the POINT we pass.
        unsafe { GetCursorPos(&mut point) }.ok()?;
        Some(IVec2::new(point.x, point.y))
    }

    #[cfg(not(target_os = "windows"))]
    pub fn screen_cursor() -> Option<IVec2> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_without_forward_is_plain_click_through() {
        let r = resolve(
            SetIgnoreMouseEvents {
                ignore: true,
                forward: false,
            },
            false,
        );
        assert_eq!(
            r,
            Resolved {
                hit_test: false,
                forwarding: false,
                degraded: false
            }
        );
    }

    #[test]
    fn forwarding_needs_a_global_cursor() {
        let with = resolve(SetIgnoreMouseEvents::CLICK_THROUGH, true);
        assert!(!with.hit_test && with.forwarding && !with.degraded);
        let without = resolve(SetIgnoreMouseEvents::CLICK_THROUGH, false);
        assert!(without.hit_test && !without.forwarding && without.degraded);
    }

    #[test]
    fn interactive_request_always_hit_tests() {
        for can_forward in [true, false] {
            assert!(resolve(SetIgnoreMouseEvents::INTERACTIVE, can_forward).hit_test);
        }
    }

    #[test]
    fn window_is_an_overlay() {
        let w = primary_window(false);
        assert!(w.transparent);
        assert!(!w.decorations);
        assert!(!w.resizable);
        assert_eq!(w.window_level, WindowLevel::AlwaysOnTop);
        assert!(matches!(w.mode, WindowMode::BorderlessFullscreen));
        assert!(w.cursor.hit_test);
    }
}
