//! Plain-text frame rendering.
//!
//! One character per viewport cell. Darkness wins: anything outside the
//! torch radius renders as blank space, monsters included. The avatar is
//! always drawn since the torch is centered on it.

use torchlit_core::{MonsterKind, TerrainKind};
use torchlit_world::query::Frame;

const DARKNESS: char = ' ';
const AVATAR: char = '@';

/// Renders a frame as viewport rows followed by a status line.
pub(crate) fn render(frame: &Frame) -> String {
    let width = frame.viewport.width() as usize;
    let height = frame.viewport.height() as usize;
    let origin = frame.viewport.origin();

    let mut rows = vec![vec![DARKNESS; width]; height];
    for cell in &frame.cells {
        if !cell.lit {
            continue;
        }
        let col = (cell.pos.x() - origin.x()) as usize;
        let row = (origin.y() + frame.viewport.height() - 1 - cell.pos.y()) as usize;
        rows[row][col] = terrain_glyph(cell.kind);
    }

    for monster in &frame.monsters {
        if let Some((row, col)) = viewport_slot(frame, monster.pos.x(), monster.pos.y()) {
            if rows[row][col] != DARKNESS {
                rows[row][col] = monster_glyph(monster.kind);
            }
        }
    }

    if let Some((row, col)) = viewport_slot(frame, frame.avatar.pos.x(), frame.avatar.pos.y()) {
        rows[row][col] = AVATAR;
    }

    let mut out = String::with_capacity((width + 1) * (height + 1));
    for row in rows {
        out.extend(row);
        out.push('\n');
    }
    out.push_str(&format!(
        "hp {}  torch {:.1}  monsters {}",
        frame.avatar.hit_points,
        frame.avatar.torch_radius,
        frame.monsters.len()
    ));
    out
}

fn viewport_slot(frame: &Frame, x: u32, y: u32) -> Option<(usize, usize)> {
    let origin = frame.viewport.origin();
    if x < origin.x()
        || y < origin.y()
        || x >= origin.x() + frame.viewport.width()
        || y >= origin.y() + frame.viewport.height()
    {
        return None;
    }
    let col = (x - origin.x()) as usize;
    let row = (origin.y() + frame.viewport.height() - 1 - y) as usize;
    Some((row, col))
}

fn terrain_glyph(kind: TerrainKind) -> char {
    match kind {
        TerrainKind::Path => '.',
        TerrainKind::Lava => '~',
        TerrainKind::Water => 'w',
        TerrainKind::Bush => '"',
        TerrainKind::Tombstone => 't',
        TerrainKind::Grass => ',',
        TerrainKind::Rock => 'o',
        TerrainKind::StoneWall | TerrainKind::StoneWallFront => '#',
        TerrainKind::Crate => 'c',
    }
}

fn monster_glyph(kind: MonsterKind) -> char {
    match kind {
        MonsterKind::Skeleton => 'S',
        MonsterKind::Zombie => 'Z',
        MonsterKind::Bat => 'B',
        MonsterKind::Gork => 'G',
        MonsterKind::Tornado => 'T',
        MonsterKind::Ninja => 'N',
        MonsterKind::Invalid => '?',
    }
}
