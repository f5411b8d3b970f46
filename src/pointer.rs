//! Primary-button grip on the character: pending press, drag and double-click.

use crate::mate::{ControlMode, Mate};
use bevy::prelude::*;

/// Motion past this many pixels from the press point turns a pending press into a drag.
pub const DRAG_THRESHOLD: f32 = 5.0;
pub const DOUBLE_CLICK_MS: f64 = 500.0;
pub const DOUBLE_CLICK_SLOP: f32 = 6.0;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum Grip {
    #[default]
    Free,
    /// Pressed on the character but not moved far enough yet.
    Pending { press: Vec2, offset: Vec2 },
    /// `offset` is the cursor position relative to the character's top-left.
    Dragging { offset: Vec2 },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Press {
    /// The press landed on the character.
    pub grabbed: bool,
    /// Second press on the character within the double-click window.
    pub double_click: bool,
}

#[derive(Resource, Default, Debug)]
pub struct Pointer {
    pub grip: Grip,
    /// A drag happened since the last press on the character. Suppresses the
    /// context menu until the next press.
    pub has_dragged: bool,
    last_press: Option<(Vec2, f64)>,
}

impl Pointer {
    pub fn press(&mut self, mate: &mut Mate, at: Vec2, now_ms: f64) -> Press {
        let repeat = self.last_press.is_some_and(|(p, t)| {
            now_ms - t <= DOUBLE_CLICK_MS && p.distance(at) <= DOUBLE_CLICK_SLOP
        });
        self.last_press = if repeat { None } else { Some((at, now_ms)) };

        if !mate.state.hit(at) {
            return Press::default();
        }

        self.has_dragged = false;
        let offset = at - mate.state.pos;
        self.grip = match mate.mode {
            ControlMode::Menu => Grip::Pending { press: at, offset },
            ControlMode::Timed => {
                mate.begin_drag();
                Grip::Dragging { offset }
            }
        };
        Press {
            grabbed: true,
            double_click: repeat,
        }
    }

    /// Secondary press on the character. Returns whether the context menu may
    /// open: not while a drag is still held, and afterwards the press consumes
    /// `has_dragged`.
    pub fn secondary_press(&mut self) -> bool {
        if self.held() && self.has_dragged {
            return false;
        }
        self.has_dragged = false;
        true
    }

    /// Returns whether the character moved.
    pub fn motion(&mut self, mate: &mut Mate, at: Vec2) -> bool {
        match self.grip {
            Grip::Free => false,
            Grip::Pending { press, offset } => {
                if at.distance(press) <= DRAG_THRESHOLD {
                    return false;
                }
                debug!("drag started");
                mate.begin_drag();
                self.has_dragged = true;
                self.grip = Grip::Dragging { offset };
                mate.state.move_to(at - offset);
                true
            }
            Grip::Dragging { offset } => {
                mate.state.move_to(at - offset);
                true
            }
        }
    }

    /// Returns whether anything was held.
    pub fn release(&mut self, mate: &mut Mate) -> bool {
        let held = self.held();
        self.grip = Grip::Free;
        if held {
            mate.end_drag();
        }
        held
    }

    pub fn held(&self) -> bool {
        self.grip != Grip::Free
    }

    pub fn dragging(&self) -> bool {
        matches!(self.grip, Grip::Dragging { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mate::Action;
    use crate::state::Behavior;
    use crate::variant::Variant;

    fn mate(mode: ControlMode) -> Mate {
        Mate::new(Variant::human(), mode, Vec2::new(1280.0, 720.0))
    }

    #[test]
    fn pending_press_promotes_after_threshold() {
        let mut m = mate(ControlMode::Menu);
        let mut p = Pointer::default();
        let at = m.state.center();
        assert!(p.press(&mut m, at, 0.0).grabbed);
        assert!(!m.state.dragging);

        assert!(!p.motion(&mut m, at + Vec2::new(3.0, 4.0)));
        assert!(!p.dragging());
        assert!(p.motion(&mut m, at + Vec2::new(6.0, 0.0)));
        assert!(p.dragging());
        assert!(p.has_dragged);
        assert_eq!(m.state.center(), at + Vec2::new(6.0, 0.0));

        assert!(p.release(&mut m));
        assert!(!m.state.dragging);
        assert!(!p.release(&mut m));
    }

    #[test]
    fn drag_keeps_the_grab_offset_and_clamps() {
        let mut m = mate(ControlMode::Menu);
        let mut p = Pointer::default();
        let at = m.state.pos + Vec2::new(30.0, 40.0);
        p.press(&mut m, at, 0.0);
        p.motion(&mut m, Vec2::new(500.0, 300.0));
        assert_eq!(m.state.pos, Vec2::new(470.0, 260.0));
        p.motion(&mut m, Vec2::new(-100.0, 5000.0));
        assert_eq!(m.state.pos, Vec2::new(0.0, 720.0 - 80.0));
    }

    #[test]
    fn timed_mode_drags_immediately() {
        let mut m = mate(ControlMode::Timed);
        m.perform(Action::Walk);
        let mut p = Pointer::default();
        let at = m.state.center();
        p.press(&mut m, at, 0.0);
        assert!(p.dragging());
        assert!(m.state.dragging);
        assert_eq!(m.state.behavior, Behavior::Idle);
    }

    #[test]
    fn miss_leaves_the_grip_free() {
        let mut m = mate(ControlMode::Menu);
        let mut p = Pointer::default();
        let at = m.state.center() + Vec2::new(40.0, 0.0);
        let press = p.press(&mut m, at, 0.0);
        assert!(!press.grabbed);
        assert!(!p.held());
    }

    #[test]
    fn new_press_clears_has_dragged() {
        let mut m = mate(ControlMode::Menu);
        let mut p = Pointer::default();
        let at = m.state.center();
        p.press(&mut m, at, 0.0);
        p.motion(&mut m, at + Vec2::new(20.0, 0.0));
        p.release(&mut m);
        assert!(p.has_dragged);
        let at = m.state.center();
        p.press(&mut m, at, 5000.0);
        assert!(!p.has_dragged);
    }

    #[test]
    fn secondary_press_is_refused_only_mid_drag() {
        let mut m = mate(ControlMode::Menu);
        let mut p = Pointer::default();
        let at = m.state.center();
        p.press(&mut m, at, 0.0);
        p.motion(&mut m, at + Vec2::new(30.0, 0.0));
        assert!(!p.secondary_press());
        assert!(p.has_dragged);

        p.release(&mut m);
        assert!(p.secondary_press());
        assert!(!p.has_dragged);
    }

    #[test]
    fn double_click_needs_time_and_place() {
        let mut m = mate(ControlMode::Menu);
        let mut p = Pointer::default();
        let at = m.state.center();
        assert!(!p.press(&mut m, at, 0.0).double_click);
        p.release(&mut m);
        assert!(p.press(&mut m, at + Vec2::new(2.0, 2.0), 300.0).double_click);
        p.release(&mut m);
        // a third quick press starts a new pair
        assert!(!p.press(&mut m, at, 400.0).double_click);
        p.release(&mut m);
        assert!(!p.press(&mut m, at, 1000.0).double_click);
        p.release(&mut m);
        assert!(!p.press(&mut m, at + Vec2::new(10.0, 0.0), 1100.0).double_click);
    }
}
