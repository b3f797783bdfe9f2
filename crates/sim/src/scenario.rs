//! The skirmish the simulator plays out.
use ai_core::{AgentId, OccupantView, Position};
use anyhow::Result;
use runtime::{RuntimeHandle, SpawnRequest};
use tracing::info;

const HORDE: u32 = 1;
const GARRISON: u32 = 2;

fn at(x: f32, y: f32) -> Position {
    Position::new(0, x, y, 0.0)
}

/// Spawns two factions, starts the fights and seats two riders.
pub async fn setup(handle: &RuntimeHandle) -> Result<Vec<AgentId>> {
    let spawn = move |template: u32, x: f32, y: f32, faction: u32| {
        handle.spawn_with(SpawnRequest::new(template, at(x, y)).with_faction(faction))
    };

    let warlord = spawn(2, 0.0, 0.0, HORDE).await?;
    let acolyte = spawn(3, -12.0, 4.0, HORDE).await?;
    let bowman = spawn(4, -20.0, -6.0, HORDE).await?;
    let sentry = spawn(5, 30.0, 0.0, GARRISON).await?;
    let grunts = [
        spawn(1, 4.0, 2.0, GARRISON).await?,
        spawn(1, 6.0, -3.0, GARRISON).await?,
        spawn(1, 15.0, 8.0, GARRISON).await?,
    ];
    let peasant = spawn(8, 40.0, 40.0, GARRISON).await?;
    let gryphon = spawn(9, 60.0, -20.0, GARRISON).await?;
    let totem = handle
        .spawn_with(
            SpawnRequest::new(7, at(-10.0, 6.0))
                .with_owner(acolyte)
                .with_faction(HORDE),
        )
        .await?;
    let engine = handle.spawn(6, at(50.0, 0.0)).await?;

    handle.enter_combat(warlord, grunts[0]).await?;
    handle.enter_combat(grunts[0], warlord).await?;
    handle.enter_combat(acolyte, grunts[1]).await?;
    handle.enter_combat(bowman, grunts[2]).await?;
    handle.enter_combat(sentry, bowman).await?;
    handle.enter_combat(totem, grunts[2]).await?;

    for (seat, level) in [(0u8, 80u8), (1, 62)] {
        let rider = OccupantView {
            id: AgentId(10_000 + u32::from(seat)),
            seat,
            is_player: true,
            alive: true,
            level,
        };
        handle.board(engine, rider).await?;
    }

    info!("scenario ready: warlord={warlord} acolyte={acolyte} engine={engine}");

    let mut agents = vec![warlord, acolyte, bowman, sentry, peasant, gryphon, totem, engine];
    agents.extend(grunts);
    Ok(agents)
}
