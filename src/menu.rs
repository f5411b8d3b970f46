//! Right-click context menu: open at the cursor, shifted back on screen once
//! measured, closed on selection or on a press elsewhere.

use crate::controls::button_background;
use crate::mate::{Action, Mate};
use crate::state::{Behavior, Look};
use bevy::prelude::*;

const MENU_WIDTH: f32 = 140.0;
const ENTRY_HEIGHT: f32 = 28.0;
const FONT_SIZE: f32 = 14.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuEntry {
    Walk,
    Jump,
    Talk,
    Dance,
    Switch,
}

impl MenuEntry {
    pub fn for_mate(mate: &Mate) -> Vec<MenuEntry> {
        let mut entries = vec![MenuEntry::Walk, MenuEntry::Jump, MenuEntry::Talk, MenuEntry::Dance];
        if mate.variant.can_switch() {
            entries.push(MenuEntry::Switch);
        }
        entries
    }

    pub fn action(self) -> Action {
        match self {
            MenuEntry::Walk => Action::Walk,
            MenuEntry::Jump => Action::Jump,
            MenuEntry::Talk => Action::Talk,
            MenuEntry::Dance => Action::Dance,
            MenuEntry::Switch => Action::SwitchLook,
        }
    }

    pub fn label(self, mate: &Mate) -> &'static str {
        let st = &mate.state;
        match self {
            MenuEntry::Walk if st.behavior == Behavior::Walking => "Stop Walk",
            MenuEntry::Walk => "Walk",
            MenuEntry::Jump => "Jump",
            MenuEntry::Talk if st.talking() => "Stop Talk",
            MenuEntry::Talk => "Talk",
            MenuEntry::Dance if mate.dancing() => "Stop Dance",
            MenuEntry::Dance => "Dance",
            MenuEntry::Switch => match st.look {
                Look::Boy => "Switch to Girl",
                Look::Girl => "Switch to Boy",
            },
        }
    }
}

/// Top-left for a menu of `size` opened at `anchor` so it stays inside `bounds`.
pub fn fit_on_screen(anchor: Vec2, size: Vec2, bounds: Vec2) -> Vec2 {
    let mut at = anchor;
    if at.x + size.x > bounds.x {
        at.x -= size.x;
    }
    if at.y + size.y > bounds.y {
        at.y -= size.y;
    }
    at
}

#[derive(Resource, Default, Debug)]
pub struct ContextMenu {
    anchor: Option<Vec2>,
    rect: Option<Rect>,
    generation: u32,
    root: Option<(Entity, u32)>,
}

impl ContextMenu {
    pub fn open(&mut self, at: Vec2) {
        debug!("menu opened at {:?}", at);
        self.anchor = Some(at);
        self.rect = None;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn close(&mut self) {
        self.anchor = None;
        self.rect = None;
    }

    pub fn is_open(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.rect.is_some_and(|r| r.contains(point))
    }
}

#[derive(Component)]
pub struct MenuRoot;

#[derive(Component, Clone, Copy)]
pub struct MenuItem(pub MenuEntry);

#[derive(Component, Clone, Copy)]
pub struct MenuLabel(pub MenuEntry);

/// Spawn, respawn or despawn the menu UI to match [`ContextMenu`].
pub fn sync_menu(mut commands: Commands, mut menu: ResMut<ContextMenu>, mate: Res<Mate>) {
    let wanted = menu.anchor.map(|at| (at, menu.generation));
    match (menu.root, wanted) {
        (Some((_, spawned)), Some((_, generation))) if spawned == generation => {}
        (root, wanted) => {
            if let Some((entity, _)) = root {
                commands.entity(entity).despawn_recursive();
            }
            menu.root = wanted
                .map(|(at, generation)| (spawn_menu(&mut commands, at, &mate), generation));
        }
    }
}

fn spawn_menu(commands: &mut Commands, at: Vec2, mate: &Mate) -> Entity {
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    left: Val::Px(at.x),
                    top: Val::Px(at.y),
                    width: Val::Px(MENU_WIDTH),
                    flex_direction: FlexDirection::Column,
                    padding: UiRect::all(Val::Px(4.0)),
                    ..default()
                },
                background_color: BackgroundColor(Color::srgba(0.1, 0.1, 0.1, 0.9)),
                z_index: ZIndex::Global(10),
                ..default()
            },
            MenuRoot,
        ))
        .with_children(|parent| {
            for entry in MenuEntry::for_mate(mate) {
                parent
                    .spawn((
                        ButtonBundle {
                            style: Style {
                                width: Val::Percent(100.0),
                                height: Val::Px(ENTRY_HEIGHT),
                                justify_content: JustifyContent::Start,
                                align_items: AlignItems::Center,
                                padding: UiRect::horizontal(Val::Px(8.0)),
                                ..default()
                            },
                            background_color: button_background(Interaction::None),
                            ..default()
                        },
                        MenuItem(entry),
                    ))
                    .with_children(|button| {
                        button.spawn((
                            TextBundle::from_section(
                                entry.label(mate),
                                TextStyle {
                                    font_size: FONT_SIZE,
                                    color: Color::WHITE,
                                    ..default()
                                },
                            ),
                            MenuLabel(entry),
                        ));
                    });
            }
        })
        .id()
}

/// Once the menu has a layout size, move it back inside the window and record its rectangle.
pub fn fit_menu(
    mut menu: ResMut<ContextMenu>,
    mate: Res<Mate>,
    mut roots: Query<(&Node, &mut Style), With<MenuRoot>>,
) {
    if menu.rect.is_some() {
        return;
    }
    let (Some(anchor), Some((entity, _))) = (menu.anchor, menu.root) else {
        return;
    };
    let Ok((node, mut style)) = roots.get_mut(entity) else {
        return;
    };
    let size = node.size();
    if size == Vec2::ZERO {
        return;
    }

    let at = fit_on_screen(anchor, size, mate.state.bounds);
    style.left = Val::Px(at.x);
    style.top = Val::Px(at.y);
    menu.rect = Some(Rect::from_corners(at, at + size));
}

pub fn refresh_labels(mate: Res<Mate>, mut labels: Query<(&MenuLabel, &mut Text)>) {
    for (label, mut text) in &mut labels {
        let wanted = label.0.label(&mate);
        let Some(section) = text.sections.first() else {
            continue;
        };
        if section.value != wanted {
            text.sections[0].value = wanted.to_string();
        }
    }
}

pub fn menu_buttons(
    mut mate: ResMut<Mate>,
    mut menu: ResMut<ContextMenu>,
    mut buttons: Query<(&Interaction, &MenuItem, &mut BackgroundColor), Changed<Interaction>>,
) {
    for (interaction, item, mut background) in &mut buttons {
        *background = button_background(*interaction);
        if *interaction == Interaction::Pressed {
            mate.perform(item.0.action());
            menu.close();
        }
    }
}
