use bevy::prelude::*;

use crate::drive::{ActiveSession, SpeedTelemetry};

const PANEL_BG: Color = Color::srgba(0.0, 0.0, 0.0, 0.4);
const TEXT_COLOR: Color = Color::srgb(0.95, 0.95, 0.95);
const LABEL_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.6);

#[derive(Component)]
pub struct SpeedReadout;

#[derive(Component)]
pub struct CarNameLabel;

pub(crate) fn px(val: f32) -> Val {
    Val::Px(val)
}

pub(crate) fn text_font(size: f32) -> TextFont {
    TextFont {
        font_size: size,
        ..default()
    }
}

fn panel_style() -> Node {
    Node {
        flex_direction: FlexDirection::Column,
        padding: UiRect::all(px(16.0)),
        ..default()
    }
}

pub fn setup_hud(mut commands: Commands, session: Res<ActiveSession>) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: px(24.0),
            right: px(24.0),
            bottom: px(24.0),
            flex_direction: FlexDirection::Row,
            justify_content: JustifyContent::SpaceBetween,
            align_items: AlignItems::FlexEnd,
            ..default()
        })
        .with_children(|row| {
            row.spawn((panel_style(), BackgroundColor(PANEL_BG)))
                .with_children(|panel| {
                    panel.spawn((Text::new("MODE"), text_font(12.0), TextColor(LABEL_COLOR)));
                    panel.spawn((
                        Text::new("Open World"),
                        text_font(20.0),
                        TextColor(TEXT_COLOR),
                    ));
                    panel.spawn((
                        Text::new(session.0.active_entry().name.clone()),
                        text_font(14.0),
                        TextColor(LABEL_COLOR),
                        CarNameLabel,
                    ));
                });

            row.spawn((
                Node {
                    align_items: AlignItems::FlexEnd,
                    ..panel_style()
                },
                BackgroundColor(PANEL_BG),
            ))
            .with_children(|panel| {
                panel.spawn((Text::new("SPEED"), text_font(12.0), TextColor(LABEL_COLOR)));
                panel.spawn((
                    Text::new("0"),
                    text_font(36.0),
                    TextColor(TEXT_COLOR),
                    SpeedReadout,
                ));
            });
        });

    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            top: px(24.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        })
        .with_children(|bar| {
            bar.spawn((
                Node {
                    padding: UiRect::axes(px(16.0), px(8.0)),
                    ..default()
                },
                BackgroundColor(PANEL_BG),
            ))
            .with_children(|hint| {
                hint.spawn((
                    Text::new(
                        "WASD / Arrow keys to drive • Space to brake • G for garage • Explore the world",
                    ),
                    text_font(14.0),
                    TextColor(LABEL_COLOR),
                ));
            });
        });
}

pub fn update_speed_readout(
    telemetry: Res<SpeedTelemetry>,
    mut readout_query: Query<&mut Text, With<SpeedReadout>>,
) {
    if !telemetry.is_changed() {
        return;
    }
    for mut text in &mut readout_query {
        text.0 = telemetry.latest.rounded().to_string();
    }
}

pub fn update_car_label(
    session: Res<ActiveSession>,
    mut label_query: Query<&mut Text, (With<CarNameLabel>, Without<SpeedReadout>)>,
) {
    let name = &session.0.active_entry().name;
    for mut text in &mut label_query {
        if text.0 != *name {
            text.0 = name.clone();
        }
    }
}
