//! Hex territory game binary.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use hex_territory::gathering::{GatherConfig, GatherPlugin};
use hex_territory::hud::HudPlugin;
use hex_territory::player::{PlayerConfig, PlayerPlugin};
use hex_territory::territory::{TerritoryConfig, TerritoryPlugin};
use hex_territory::{GameState, PlayerPos};

#[cfg(feature = "native")]
mod cli {
    use std::path::{Path, PathBuf};

    use clap::Parser;

    use hex_territory::editor::MapEditor;
    use hex_territory::territory::{
        HexGrid, MapFileError, NullVisuals, TerritoryConfig, generate_procedural,
    };

    /// Hex territory exploration game.
    #[derive(Parser, Debug)]
    #[command(version, about)]
    struct Cli {
        /// Authored map file (JSON) to play instead of a procedural grid.
        #[arg(long)]
        map: Option<String>,
        /// Half-width of the procedural grid.
        #[arg(long)]
        radius: Option<i32>,
        /// Merge the procedural grid into this map file and exit. Hexes already
        /// in the file keep their authored values; a missing file is created.
        #[arg(long, value_name = "FILE")]
        export_map: Option<PathBuf>,
    }

    fn export(cfg: &TerritoryConfig, path: &Path) -> Result<(usize, usize), MapFileError> {
        let mut grid = HexGrid::new(cfg.grid.metrics(), NullVisuals);
        generate_procedural(&cfg.grid, &mut grid);
        let mut editor = MapEditor::open_or_new(path, cfg.grid.metrics())?;
        let added = editor.sync_from_grid(&grid);
        editor.save(path)?;
        Ok((added, editor.map().hexes.len()))
    }

    /// Territory settings from the command line. `None` when the run is complete
    /// without opening a window.
    pub fn territory_config() -> Option<TerritoryConfig> {
        let cli = Cli::parse();
        let mut cfg = TerritoryConfig::default();
        if let Some(radius) = cli.radius {
            cfg.grid.radius = radius;
        }
        cfg.map_path = cli.map;

        let path = cli.export_map?;
        match export(&cfg, &path) {
            Ok((added, total)) => {
                println!("added {added} hexes to {} ({total} total)", path.display());
            }
            Err(err) => {
                eprintln!("export failed: {err}");
                std::process::exit(1);
            }
        }
        None
    }
}

#[cfg(feature = "native")]
fn territory_config() -> Option<TerritoryConfig> {
    cli::territory_config()
}

#[cfg(not(feature = "native"))]
fn territory_config() -> Option<TerritoryConfig> {
    Some(TerritoryConfig::default())
}

fn main() {
    let Some(territory) = territory_config() else {
        return;
    };

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Territory".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<GameState>()
    .register_type::<PlayerPos>()
    .init_state::<GameState>()
    .init_resource::<PlayerPos>()
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(TerritoryPlugin(territory))
    .add_plugins(PlayerPlugin(PlayerConfig::default()))
    .add_plugins(GatherPlugin(GatherConfig::default()))
    .add_plugins(HudPlugin)
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    #[cfg(feature = "native")]
    app.add_plugins(bevy::remote::RemotePlugin::default())
        .add_plugins(bevy::remote::http::RemoteHttpPlugin::default());

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            GameState::Running => GameState::Debugging,
            GameState::Debugging => GameState::Running,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
