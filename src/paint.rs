//! Paints the canvas display list with pooled 2D meshes.
//!
//! Every primitive becomes a stamp of one of a few meshes: a unit circle
//! (ellipses, round caps), a unit square (rectangles, stroke segments) or a
//! cached convex fan (polygons). Stamps are painted back to front by raising
//! z a little per stamp.

use crate::draw::{Canvas, Shape};
use bevy::prelude::*;
use bevy::render::mesh::Indices;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::PrimitiveTopology;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};
use bevy::utils::HashMap;

const Z_STEP: f32 = 0.01;
/// Strokes at least this wide get round joins and caps.
const ROUND_CAP_WIDTH: f32 = 3.0;
/// Fan vertices are snapped to quarter pixels so equal shapes share a mesh.
const FAN_QUANTUM: f32 = 4.0;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outline {
    Circle,
    Square,
    /// Counter-clockwise vertices relative to the stamp position, in quarter pixels.
    Fan(Vec<IVec2>),
}

/// One filled primitive in world space (origin at the window center, y up).
#[derive(Clone, Debug, PartialEq)]
pub struct Stamp {
    pub outline: Outline,
    pub at: Vec2,
    pub scale: Vec2,
    /// Counter-clockwise, radians.
    pub rotation: f32,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Caption {
    pub at: Vec2,
    pub text: &'static str,
    pub font_size: f32,
    pub color: Color,
}

#[derive(Debug, Default)]
pub struct Frame {
    pub stamps: Vec<Stamp>,
    pub captions: Vec<Caption>,
}

fn to_world(p: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(p.x - size.x / 2.0, size.y / 2.0 - p.y)
}

/// Expand the display list into stamps. Pure, so it can be checked without a renderer.
pub fn layout(canvas: &Canvas) -> Frame {
    let size = canvas.size();
    let mut frame = Frame::default();

    for shape in canvas.shapes() {
        match shape {
            Shape::Ellipse {
                center,
                radii,
                rotation,
                color,
            } => frame.stamps.push(Stamp {
                outline: Outline::Circle,
                at: to_world(*center, size),
                scale: *radii,
                rotation: -rotation,
                color: *color,
            }),
            Shape::Rect { center, size: extent, color } => {
                if extent.x > 0.0 && extent.y > 0.0 {
                    frame.stamps.push(Stamp {
                        outline: Outline::Square,
                        at: to_world(*center, size),
                        scale: *extent,
                        rotation: 0.0,
                        color: *color,
                    });
                }
            }
            Shape::Stroke { points, width, color } => {
                let world: Vec<Vec2> = points.iter().map(|p| to_world(*p, size)).collect();
                stroke(&world, *width, *color, &mut frame.stamps);
            }
            Shape::Polygon { points, color } => {
                let world: Vec<Vec2> = points.iter().map(|p| to_world(*p, size)).collect();
                if let Some(stamp) = fan(&world, *color) {
                    frame.stamps.push(stamp);
                }
            }
            Shape::Text {
                at,
                text,
                font_size,
                color,
            } => frame.captions.push(Caption {
                at: to_world(*at, size),
                text: *text,
                font_size: *font_size,
                color: *color,
            }),
        }
    }
    frame
}

fn stroke(points: &[Vec2], width: f32, color: Color, out: &mut Vec<Stamp>) {
    for pair in points.windows(2) {
        let d = pair[1] - pair[0];
        let len = d.length();
        if len <= f32::EPSILON {
            continue;
        }
        out.push(Stamp {
            outline: Outline::Square,
            at: (pair[0] + pair[1]) / 2.0,
            scale: Vec2::new(len, width),
            rotation: d.y.atan2(d.x),
            color,
        });
    }

    if width >= ROUND_CAP_WIDTH {
        for p in points {
            out.push(Stamp {
                outline: Outline::Circle,
                at: *p,
                scale: Vec2::splat(width / 2.0),
                rotation: 0.0,
                color,
            });
        }
    }
}

fn fan(points: &[Vec2], color: Color) -> Option<Stamp> {
    if points.len() < 3 {
        return None;
    }
    let at = points.iter().copied().sum::<Vec2>() / points.len() as f32;
    let mut verts: Vec<IVec2> = points
        .iter()
        .map(|p| ((*p - at) * FAN_QUANTUM).round().as_ivec2())
        .collect();
    if signed_area(&verts) < 0 {
        verts.reverse();
    }
    Some(Stamp {
        outline: Outline::Fan(verts),
        at,
        scale: Vec2::ONE,
        rotation: 0.0,
        color,
    })
}

/// Twice the signed area; positive for counter-clockwise (y up).
fn signed_area(verts: &[IVec2]) -> i64 {
    let n = verts.len();
    (0..n)
        .map(|i| {
            let a = verts[i];
            let b = verts[(i + 1) % n];
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        })
        .sum()
}

fn fan_mesh(verts: &[IVec2]) -> Mesh {
    let positions: Vec<[f32; 3]> = verts
        .iter()
        .map(|v| [v.x as f32 / FAN_QUANTUM, v.y as f32 / FAN_QUANTUM, 0.0])
        .collect();
    let indices: Vec<u32> = (1..verts.len().saturating_sub(1) as u32)
        .flat_map(|i| [0, i, i + 1])
        .collect();
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_indices(Indices::U32(indices))
}

fn color_key(color: Color) -> [u8; 4] {
    let c = color.to_srgba();
    [c.red, c.green, c.blue, c.alpha].map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Shared meshes, materials and the entity pool.
#[derive(Resource)]
pub struct PaintKit {
    circle: Handle<Mesh>,
    square: Handle<Mesh>,
    fans: HashMap<Vec<IVec2>, Handle<Mesh>>,
    materials: HashMap<[u8; 4], Handle<ColorMaterial>>,
    brushes: Vec<Entity>,
    caption: Option<Entity>,
}

impl PaintKit {
    fn mesh(&mut self, outline: &Outline, meshes: &mut Assets<Mesh>) -> Handle<Mesh> {
        match outline {
            Outline::Circle => self.circle.clone(),
            Outline::Square => self.square.clone(),
            Outline::Fan(verts) => self
                .fans
                .entry(verts.clone())
                .or_insert_with(|| meshes.add(fan_mesh(verts)))
                .clone(),
        }
    }

    fn material(
        &mut self,
        color: Color,
        materials: &mut Assets<ColorMaterial>,
    ) -> Handle<ColorMaterial> {
        self.materials
            .entry(color_key(color))
            .or_insert_with(|| materials.add(ColorMaterial::from(color)))
            .clone()
    }
}

#[derive(Component)]
pub struct Brush;

#[derive(Component)]
pub struct CaptionSlot;

pub fn setup_paint(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(PaintKit {
        circle: meshes.add(Circle::new(1.0)),
        square: meshes.add(Rectangle::new(1.0, 1.0)),
        fans: HashMap::default(),
        materials: HashMap::default(),
        brushes: Vec::new(),
        caption: None,
    });
}

fn stamp_transform(stamp: &Stamp, z: f32) -> Transform {
    Transform {
        translation: stamp.at.extend(z),
        rotation: Quat::from_rotation_z(stamp.rotation),
        scale: stamp.scale.extend(1.0),
    }
}

/// Push the current canvas into the pooled entities. Unused brushes are hidden.
#[allow(clippy::type_complexity)]
pub fn paint(
    mut commands: Commands,
    canvas: Res<Canvas>,
    kit: Option<ResMut<PaintKit>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut brushes: Query<
        (
            &mut Mesh2dHandle,
            &mut Handle<ColorMaterial>,
            &mut Transform,
            &mut Visibility,
        ),
        (With<Brush>, Without<CaptionSlot>),
    >,
    mut captions: Query<
        (&mut Text, &mut Transform, &mut Visibility),
        (With<CaptionSlot>, Without<Brush>),
    >,
) {
    let Some(mut kit) = kit else {
        return;
    };
    let frame = layout(&canvas);

    for (i, stamp) in frame.stamps.iter().enumerate() {
        let mesh = kit.mesh(&stamp.outline, &mut meshes);
        let material = kit.material(stamp.color, &mut materials);
        let transform = stamp_transform(stamp, i as f32 * Z_STEP);

        if let Some(&entity) = kit.brushes.get(i) {
            let Ok((mut m, mut mat, mut t, mut vis)) = brushes.get_mut(entity) else {
                continue;
            };
            if m.0 != mesh {
                m.0 = mesh;
            }
            if *mat != material {
                *mat = material;
            }
            *t = transform;
            *vis = Visibility::Visible;
        } else {
            let entity = commands
                .spawn((
                    MaterialMesh2dBundle {
                        mesh: Mesh2dHandle(mesh),
                        material,
                        transform,
                        ..default()
                    },
                    Brush,
                ))
                .id();
            kit.brushes.push(entity);
        }
    }

    for &entity in kit.brushes.iter().skip(frame.stamps.len()) {
        if let Ok((_, _, _, mut vis)) = brushes.get_mut(entity) {
            *vis = Visibility::Hidden;
        }
    }

    let top = frame.stamps.len() as f32 * Z_STEP + Z_STEP;
    let Some(caption) = frame.captions.first() else {
        if let Some(entity) = kit.caption {
            if let Ok((_, _, mut vis)) = captions.get_mut(entity) {
                *vis = Visibility::Hidden;
            }
        }
        return;
    };

    let style = TextStyle {
        font_size: caption.font_size,
        color: caption.color,
        ..default()
    };
    let transform = Transform::from_translation(caption.at.extend(top));
    match kit.caption.map(|e| captions.get_mut(e)) {
        Some(Ok((mut text, mut t, mut vis))) => {
            let stale = text
                .sections
                .first()
                .map_or(true, |s| s.value != caption.text || s.style.font_size != style.font_size);
            if stale {
                *text = Text::from_section(caption.text, style).with_justify(JustifyText::Center);
            }
            *t = transform;
            *vis = Visibility::Visible;
        }
        Some(Err(_)) => {}
        None => {
            let entity = commands
                .spawn((
                    Text2dBundle {
                        text: Text::from_section(caption.text, style)
                            .with_justify(JustifyText::Center),
                        transform,
                        ..default()
                    },
                    CaptionSlot,
                ))
                .id();
            kit.caption = Some(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        let mut c = Canvas::default();
        c.begin(Vec2::new(800.0, 600.0));
        c
    }

    #[test]
    fn canvas_points_map_to_centered_y_up() {
        let mut c = canvas();
        c.fill_ellipse(Vec2::new(0.0, 0.0), Vec2::new(3.0, 2.0), 0.5, Color::WHITE);
        let frame = layout(&c);
        let stamp = &frame.stamps[0];
        assert_eq!(stamp.outline, Outline::Circle);
        assert_eq!(stamp.at, Vec2::new(-400.0, 300.0));
        assert_eq!(stamp.scale, Vec2::new(3.0, 2.0));
        assert_eq!(stamp.rotation, -0.5);
    }

    #[test]
    fn wide_strokes_get_round_caps() {
        let mut c = canvas();
        c.line(Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0), 8.0, Color::WHITE);
        c.line(Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0), 2.0, Color::WHITE);
        let frame = layout(&c);
        let squares = frame.stamps.iter().filter(|s| s.outline == Outline::Square).count();
        let caps = frame.stamps.iter().filter(|s| s.outline == Outline::Circle).count();
        assert_eq!((squares, caps), (2, 2));
        assert_eq!(frame.stamps[0].scale, Vec2::new(10.0, 8.0));
        assert_eq!(frame.stamps[0].at, Vec2::new(-295.0, 200.0));
    }

    #[test]
    fn polygons_become_counter_clockwise_fans() {
        let mut c = canvas();
        c.triangle(Vec2::new(0.0, 0.0), Vec2::new(0.0, 10.0), Vec2::new(10.0, 0.0), Color::WHITE);
        let frame = layout(&c);
        let Outline::Fan(verts) = &frame.stamps[0].outline else {
            panic!("expected a fan");
        };
        assert_eq!(verts.len(), 3);
        assert!(signed_area(verts) > 0);
    }

    #[test]
    fn identical_polygons_share_a_key() {
        let mut c = canvas();
        let (start, end) = (std::f32::consts::PI, std::f32::consts::TAU);
        c.fill_arc(Vec2::new(100.0, 100.0), 20.0, start, end, Color::WHITE);
        c.fill_arc(Vec2::new(300.0, 50.0), 20.0, start, end, Color::BLACK);
        let frame = layout(&c);
        assert_eq!(frame.stamps[0].outline, frame.stamps[1].outline);
    }

    #[test]
    fn degenerate_shapes_are_skipped() {
        let mut c = canvas();
        c.fill_rect(Vec2::ZERO, Vec2::new(10.0, 0.0), Color::WHITE);
        c.line(Vec2::ONE, Vec2::ONE, 1.0, Color::WHITE);
        assert!(layout(&c).stamps.is_empty());
    }

    #[test]
    fn text_becomes_a_caption() {
        let mut c = canvas();
        c.text(Vec2::new(400.0, 300.0), "Woof!", 14.0, Color::BLACK);
        let frame = layout(&c);
        assert!(frame.stamps.is_empty());
        assert_eq!(frame.captions[0].at, Vec2::ZERO);
        assert_eq!(frame.captions[0].text, "Woof!");
    }

    #[test]
    fn colors_quantize_to_bytes() {
        assert_eq!(color_key(Color::srgba(1.0, 0.0, 0.0, 0.2)), [255, 0, 0, 51]);
        assert_eq!(color_key(Color::WHITE), [255; 4]);
    }
}
