//! Display list for one frame of the character, in canvas coordinates
//! (origin top-left, y down). Figures only describe shapes; `paint` turns
//! the list into meshes.

use crate::mate::Mate;
use crate::state::CharacterState;
use crate::variant::{BubbleStyle, Palette};
use bevy::prelude::*;
use std::f32::consts::TAU;

// Curve flattening
const TURN_SEGMENTS: f32 = 48.0;
const MIN_SEGMENTS: usize = 6;
const CURVE_SEGMENTS: usize = 16;

// Speech bubble
const BUBBLE_HEIGHT: f32 = 30.0;
const BUBBLE_RADIUS: f32 = 15.0;
const BUBBLE_PADDING: f32 = 20.0;
const BUBBLE_BORDER: f32 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Ellipse {
        center: Vec2,
        radii: Vec2,
        /// Clockwise on screen, radians.
        rotation: f32,
        color: Color,
    },
    Rect {
        center: Vec2,
        size: Vec2,
        color: Color,
    },
    /// Open polyline. Closed outlines repeat their first point.
    Stroke {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
    },
    /// Convex, filled.
    Polygon { points: Vec<Vec2>, color: Color },
    /// Centered on `at`.
    Text {
        at: Vec2,
        text: &'static str,
        font_size: f32,
        color: Color,
    },
}

impl Shape {
    pub fn color(&self) -> Color {
        match self {
            Shape::Ellipse { color, .. }
            | Shape::Rect { color, .. }
            | Shape::Stroke { color, .. }
            | Shape::Polygon { color, .. }
            | Shape::Text { color, .. } => *color,
        }
    }
}

#[derive(Resource, Default, Debug)]
pub struct Canvas {
    size: Vec2,
    shapes: Vec<Shape>,
}

impl Canvas {
    /// Drop the previous frame and set the drawing area in logical pixels.
    pub fn begin(&mut self, size: Vec2) {
        self.size = size;
        self.shapes.clear();
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Color) {
        self.shapes.push(Shape::Ellipse {
            center,
            radii,
            rotation,
            color,
        });
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.fill_ellipse(center, Vec2::splat(radius), 0.0, color);
    }

    pub fn stroke_ellipse(
        &mut self,
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        width: f32,
        color: Color,
    ) {
        let points = arc_points(center, radii, rotation, 0.0, TAU);
        self.stroke(points, width, color);
    }

    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        self.stroke_ellipse(center, Vec2::splat(radius), 0.0, width, color);
    }

    /// Arc from `start` to `end`; angle 0 points right and angles grow clockwise on screen.
    pub fn stroke_arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        width: f32,
        color: Color,
    ) {
        let points = arc_points(center, Vec2::splat(radius), 0.0, start, end);
        self.stroke(points, width, color);
    }

    /// Circle segment between `start` and `end`, closed by its chord.
    pub fn fill_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color) {
        let points = arc_points(center, Vec2::splat(radius), 0.0, start, end);
        self.shapes.push(Shape::Polygon { points, color });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.stroke(vec![from, to], width, color);
    }

    pub fn quadratic(&mut self, from: Vec2, ctrl: Vec2, to: Vec2, width: f32, color: Color) {
        let points = (0..=CURVE_SEGMENTS)
            .map(|i| {
                let t = i as f32 / CURVE_SEGMENTS as f32;
                let u = 1.0 - t;
                from * (u * u) + ctrl * (2.0 * u * t) + to * (t * t)
            })
            .collect();
        self.stroke(points, width, color);
    }

    pub fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        self.shapes.push(Shape::Polygon {
            points: vec![a, b, c],
            color,
        });
    }

    pub fn fill_rect(&mut self, center: Vec2, size: Vec2, color: Color) {
        self.shapes.push(Shape::Rect { center, size, color });
    }

    /// Two overlapping rectangles plus four corner discs.
    pub fn fill_round_rect(&mut self, center: Vec2, size: Vec2, radius: f32, color: Color) {
        let r = radius.min(size.min_element() / 2.0).max(0.0);
        self.fill_rect(center, Vec2::new(size.x, size.y - 2.0 * r), color);
        self.fill_rect(center, Vec2::new(size.x - 2.0 * r, size.y), color);
        if r <= 0.0 {
            return;
        }
        let inner = size / 2.0 - Vec2::splat(r);
        for corner in [
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ] {
            self.fill_circle(center + inner * corner, r, color);
        }
    }

    pub fn stroke_round_rect(
        &mut self,
        center: Vec2,
        size: Vec2,
        radius: f32,
        width: f32,
        color: Color,
    ) {
        let r = radius.min(size.min_element() / 2.0).max(0.0);
        let inner = size / 2.0 - Vec2::splat(r);
        let q = TAU / 4.0;
        // corners clockwise from top-right; the straight edges join consecutive arcs
        let corners = [
            (Vec2::new(inner.x, -inner.y), -q),
            (Vec2::new(inner.x, inner.y), 0.0),
            (Vec2::new(-inner.x, inner.y), q),
            (Vec2::new(-inner.x, -inner.y), 2.0 * q),
        ];
        let mut points = Vec::new();
        for (offset, start) in corners {
            points.extend(arc_points(center + offset, Vec2::splat(r), 0.0, start, start + q));
        }
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
        self.stroke(points, width, color);
    }

    pub fn text(&mut self, at: Vec2, text: &'static str, font_size: f32, color: Color) {
        self.shapes.push(Shape::Text {
            at,
            text,
            font_size,
            color,
        });
    }

    fn stroke(&mut self, points: Vec<Vec2>, width: f32, color: Color) {
        self.shapes.push(Shape::Stroke { points, width, color });
    }
}

/// Points along an (optionally rotated) elliptical arc, both ends included.
pub fn arc_points(center: Vec2, radii: Vec2, rotation: f32, start: f32, end: f32) -> Vec<Vec2> {
    let sweep = end - start;
    let n = ((sweep.abs() / TAU * TURN_SEGMENTS).ceil() as usize).max(MIN_SEGMENTS);
    let (sin, cos) = rotation.sin_cos();
    (0..=n)
        .map(|i| {
            let t = start + sweep * i as f32 / n as f32;
            let p = Vec2::new(radii.x * t.cos(), radii.y * t.sin());
            center + Vec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
        })
        .collect()
}

/// Everything a figure painter reads for one frame.
pub struct Pose<'a> {
    pub state: &'a CharacterState,
    pub palette: &'a Palette,
    pub bubble: &'a BubbleStyle,
    /// Current speech bubble line, only while talking.
    pub message: Option<&'static str>,
    /// Wall clock for the free-running wiggles (mouth, paws, ponytails).
    pub now_ms: f64,
}

impl Pose<'_> {
    fn wave(&self, rate: f64) -> f32 {
        (self.now_ms * rate).sin() as f32
    }
}

/// Rebuild `canvas` from the mate's current state.
///
/// The only write is the cosmetic pupil swing, refreshed while the eyes are open.
pub fn draw(mate: &mut Mate, now_ms: f64, canvas: &mut Canvas) {
    canvas.begin(mate.state.bounds);

    let st = &mut mate.state;
    if !st.blinking {
        st.eye_offset = (now_ms * 0.003).sin() as f32 * mate.variant.eye_swing;
    }
    let message = if st.talking() {
        let lines = mate.variant.messages(st.look);
        lines.get(st.message_index(lines.len())).copied()
    } else {
        None
    };

    let pose = Pose {
        state: &mate.state,
        palette: mate.variant.palette(mate.state.look),
        bubble: &mate.variant.bubble,
        message,
        now_ms,
    };
    (mate.variant.figure)(&pose, canvas);
}

fn speech_bubble(pose: &Pose, anchor: Vec2, canvas: &mut Canvas) {
    let Some(message) = pose.message else {
        return;
    };
    let style = pose.bubble;
    let at = anchor + style.offset;
    let size = Vec2::new(
        message.chars().count() as f32 * style.char_width + BUBBLE_PADDING,
        BUBBLE_HEIGHT,
    );

    canvas.fill_round_rect(at, size, BUBBLE_RADIUS, Color::WHITE);
    canvas.stroke_round_rect(at, size, BUBBLE_RADIUS, BUBBLE_BORDER, style.outline);
    canvas.triangle(
        at + Vec2::new(-20.0, 10.0),
        anchor + style.tail_tip,
        at + Vec2::new(-15.0, 15.0),
        Color::WHITE,
    );
    canvas.text(at, message, style.font_size, pose.palette.ink);
}

pub mod figure {
    use super::{speech_bubble, Canvas, Pose};
    use crate::state::{tint::hex, Behavior, Look};
    use bevy::prelude::*;
    use std::f32::consts::{PI, TAU};

    fn shadow() -> Color {
        Color::srgba(0.0, 0.0, 0.0, 0.2)
    }

    fn outline() -> Color {
        hex(0x333333)
    }

    fn blush(alpha: f32) -> Color {
        Color::srgba_u8(255, 182, 193, 255).with_alpha(alpha)
    }

    const SIDES: [f32; 2] = [-1.0, 1.0];

    pub fn human(pose: &Pose, canvas: &mut Canvas) {
        let st = pose.state;
        let palette = pose.palette;
        let size = st.size;
        let c = st.center();
        let walking = st.behavior == Behavior::Walking;
        let cycle = st.walk_cycle;
        let by = c.y + if walking { cycle.sin() * 2.0 } else { 0.0 };

        canvas.fill_ellipse(
            Vec2::new(c.x, c.y + size / 2.0 + 8.0),
            Vec2::new(size / 3.0, size / 10.0),
            0.0,
            shadow(),
        );

        let shirt = Vec2::new(c.x, by + 8.0);
        let shirt_radii = Vec2::new(size / 3.0, size / 2.5);
        canvas.fill_ellipse(shirt, shirt_radii, 0.0, st.tint);
        canvas.stroke_ellipse(shirt, shirt_radii, 0.0, 1.5, outline());

        let arm_swing = if walking { (cycle + PI).sin() * 0.3 } else { 0.0 };
        for side in SIDES {
            canvas.line(
                Vec2::new(c.x + side * size / 4.0, by - 5.0),
                Vec2::new(c.x + side * (size / 3.0 - arm_swing * 10.0), by + 15.0),
                8.0,
                palette.skin,
            );
        }

        let leg_swing = if walking { cycle.sin() * 0.4 } else { 0.0 };
        for side in SIDES {
            let hip = c.x + side * 8.0;
            let foot = hip - side * leg_swing * 8.0;
            canvas.line(
                Vec2::new(hip, by + size / 3.0),
                Vec2::new(foot, by + size / 2.0 + 5.0),
                10.0,
                palette.legs,
            );
            canvas.fill_ellipse(
                Vec2::new(foot, by + size / 2.0 + 8.0),
                Vec2::new(6.0, 4.0),
                0.0,
                hex(0x8B4513),
            );
        }

        let head = Vec2::new(c.x, by - 20.0);
        let head_r = size / 3.5;
        canvas.fill_circle(head, head_r, palette.skin);
        canvas.stroke_circle(head, head_r, 1.5, outline());
        canvas.fill_arc(head, head_r, PI, TAU, st.hair);
        if st.look == Look::Girl {
            let bounce = pose.wave(0.01) * 2.0;
            for side in SIDES {
                let ponytail = Vec2::new(c.x + side * size / 4.0, by - 15.0 + bounce);
                canvas.fill_circle(ponytail, 6.0, st.hair);
            }
        }

        if st.blinking {
            for side in SIDES {
                let eye = Vec2::new(c.x + side * 6.0, by - 22.0);
                canvas.stroke_arc(eye, 4.0, 0.0, PI, 2.0, outline());
            }
        } else {
            for side in SIDES {
                let eye = Vec2::new(c.x + side * 6.0, by - 22.0);
                let pupil = eye + Vec2::X * st.eye_offset;
                canvas.fill_ellipse(eye, Vec2::new(4.0, 6.0), 0.0, Color::WHITE);
                canvas.fill_circle(pupil, 2.0, palette.ink);
                canvas.fill_circle(pupil + Vec2::new(1.0, -1.0), 1.0, Color::WHITE);
            }
            if st.look == Look::Girl {
                for side in SIDES {
                    canvas.line(
                        Vec2::new(c.x + side * 8.0, by - 25.0),
                        Vec2::new(c.x + side * 9.0, by - 27.0),
                        1.0,
                        outline(),
                    );
                    canvas.line(
                        Vec2::new(c.x + side * 4.0, by - 26.0),
                        Vec2::new(c.x + side * 4.0, by - 28.0),
                        1.0,
                        outline(),
                    );
                }
            }
        }

        canvas.fill_ellipse(Vec2::new(c.x, by - 18.0), Vec2::new(1.5, 1.0), 0.0, hex(0xFFB6C1));

        let mouth = Vec2::new(c.x, by - 14.0);
        let lips = hex(0xFF69B4);
        if st.talking() {
            canvas.stroke_circle(mouth, 2.0 + pose.wave(0.3), 2.0, lips);
        } else if st.behavior == Behavior::Jumping {
            canvas.stroke_circle(mouth, 2.0, 2.0, lips);
        } else {
            canvas.stroke_arc(mouth, 4.0, 0.0, PI, 2.0, lips);
        }

        if st.happiness > 0.0 {
            for side in SIDES {
                let cheek = Vec2::new(c.x + side * 12.0, by - 18.0);
                canvas.fill_circle(cheek, 3.0, blush(st.happiness));
            }
        }

        speech_bubble(pose, Vec2::new(c.x, by), canvas);
    }

    pub fn pet(pose: &Pose, canvas: &mut Canvas) {
        let st = pose.state;
        let palette = pose.palette;
        let size = st.size;
        let c = st.center();
        let body = st.tint;

        canvas.fill_ellipse(
            Vec2::new(c.x, c.y + size / 2.0 + 5.0),
            Vec2::new(size / 3.0, size / 8.0),
            0.0,
            shadow(),
        );

        let root = Vec2::new(c.x - size / 2.0 + 5.0, c.y + 5.0);
        let wag = st.tail_wag.sin() * 15.0;
        canvas.quadratic(
            root,
            root + Vec2::new(-20.0 + wag, -20.0),
            root + Vec2::new(-15.0 + wag, -35.0),
            8.0,
            body,
        );

        let torso = Vec2::new(c.x, c.y + 5.0);
        let torso_radii = Vec2::new(size / 2.2, size / 2.5);
        canvas.fill_ellipse(torso, torso_radii, 0.0, body);
        canvas.stroke_ellipse(torso, torso_radii, 0.0, 2.0, outline());

        let head = Vec2::new(c.x, c.y - 10.0);
        canvas.fill_circle(head, size / 2.8, body);
        canvas.stroke_circle(head, size / 2.8, 2.0, outline());

        let ear_y = c.y - 25.0 + st.ear_bounce.sin() * 2.0;
        for side in SIDES {
            let ear = Vec2::new(c.x + side * 15.0, ear_y);
            canvas.fill_ellipse(ear, Vec2::new(8.0, 12.0), side * 0.3, body);
            canvas.stroke_ellipse(ear, Vec2::new(8.0, 12.0), side * 0.3, 2.0, outline());
        }
        for side in SIDES {
            let ear = Vec2::new(c.x + side * 15.0, ear_y);
            canvas.fill_ellipse(ear, Vec2::new(4.0, 6.0), side * 0.3, hex(0xFFB6C1));
        }

        if st.blinking {
            for side in SIDES {
                let eye = Vec2::new(c.x + side * 8.0, c.y - 15.0);
                canvas.stroke_arc(eye, 6.0, 0.0, PI, 2.0, palette.ink);
            }
        } else {
            for side in SIDES {
                let eye = Vec2::new(c.x + side * 8.0, c.y - 15.0);
                canvas.fill_ellipse(eye, Vec2::new(6.0, 8.0), 0.0, Color::WHITE);
            }
            for side in SIDES {
                let pupil = Vec2::new(c.x + side * 8.0 + st.eye_offset, c.y - 15.0);
                canvas.fill_circle(pupil, 3.0, palette.ink);
                canvas.fill_circle(pupil + Vec2::new(1.0, -1.0), 1.0, Color::WHITE);
            }
        }

        canvas.fill_ellipse(Vec2::new(c.x, c.y - 8.0), Vec2::new(3.0, 2.0), 0.0, hex(0xFF69B4));

        let mouth = Vec2::new(c.x, c.y - 3.0);
        if st.talking() {
            canvas.stroke_circle(mouth, 3.0 + pose.wave(0.3) * 2.0, 2.0, palette.ink);
        } else if st.behavior == Behavior::Jumping {
            canvas.stroke_circle(mouth, 3.0, 2.0, palette.ink);
        } else {
            canvas.stroke_arc(mouth, 5.0, 0.0, PI, 2.0, palette.ink);
        }

        if st.behavior == Behavior::Walking {
            let step = pose.wave(0.02) * 4.0;
            for side in SIDES {
                let paw = Vec2::new(c.x + side * 12.0, c.y + size / 2.5 - side * step);
                canvas.fill_ellipse(paw, Vec2::new(4.0, 8.0), 0.0, palette.legs);
            }
        }

        if st.happiness > 0.0 {
            let cheeks = hex(0xFF69B4).with_alpha(st.happiness);
            for side in SIDES {
                canvas.fill_circle(Vec2::new(c.x + side * 16.0, c.y - 6.0), 3.0, cheeks);
            }
        }

        speech_bubble(pose, c, canvas);
    }
}
