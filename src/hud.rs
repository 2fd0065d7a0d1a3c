//! egui overlay: backpack contents, the current unlock target, and debug hex labels.

use bevy::prelude::*;
use bevy_egui::egui;

use crate::GameState;
use crate::inventory::Backpack;
use crate::player::FollowCamera;
use crate::territory::tile::{HexState, HexTile};
use crate::territory::{HexFace, HexGrid, PaymentController};

/// HUD windows and debug labels.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, draw_hud).add_systems(
            Update,
            draw_hex_labels.run_if(in_state(GameState::Debugging)),
        );
    }
}

/// `"Wood 3/10"` per cost entry, in payment order.
fn cost_lines(tile: &HexTile) -> Vec<String> {
    tile.unlock_cost
        .iter()
        .map(|(&kind, &cost)| format!("{} {}/{}", kind.display_name(), tile.paid(kind), cost))
        .collect()
}

fn draw_hud(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    backpack: Res<Backpack>,
    grid: Option<Res<HexGrid>>,
    controller: Option<Res<PaymentController>>,
    mut ready: Local<bool>,
) {
    if !*ready {
        *ready = true;
        return;
    }
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let ctx = ctx.get_mut();

    egui::Window::new("Backpack")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            for (kind, count) in backpack.iter() {
                ui.label(format!("{}: {count}", kind.display_name()));
            }
        });

    let Some(grid) = grid else {
        return;
    };
    let owned = grid
        .get_all_hexes()
        .filter(|(_, tile, _)| tile.state == HexState::Unlocked)
        .count();
    let target = controller
        .and_then(|c| c.current_target())
        .and_then(|coord| grid.get_tile(coord));

    egui::Window::new("Territory")
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.label(format!("Owned hexes: {owned} / {}", grid.len()));
            let Some(tile) = target else {
                ui.label("Walk to a highlighted hex to claim it");
                return;
            };
            ui.separator();
            ui.label(format!("Unlocking {}", tile.coord));
            for line in cost_lines(tile) {
                ui.label(line);
            }
            ui.add(egui::ProgressBar::new(tile.progress()).show_percentage());
        });
}

/// Draws each revealed face's coordinate and state as a screen-projected label.
fn draw_hex_labels(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    camera_q: Query<(&Camera, &GlobalTransform), With<FollowCamera>>,
    faces: Query<(&GlobalTransform, &HexFace)>,
    grid: Option<Res<HexGrid>>,
    mut ready: Local<bool>,
) {
    if !*ready {
        *ready = true;
        return;
    }
    let Some(grid) = grid else {
        return;
    };
    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };

    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());

    for (face_gt, face) in &faces {
        let (Some(tile), Some(visual)) = (grid.get_tile(face.coord), grid.get_visual(face.coord))
        else {
            continue;
        };
        if !visual.revealed {
            continue;
        }
        if let Ok(viewport) = camera.world_to_viewport(cam_gt, face_gt.translation()) {
            painter.text(
                egui::pos2(viewport.x, viewport.y),
                egui::Align2::CENTER_CENTER,
                format!("{} {:?}", face.coord, tile.state),
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );
        }
    }
}
