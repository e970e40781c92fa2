//! Plain-text rendering of world views for the CLI.

use std::fmt::Write;

use beltline_core::belt::Side;
use beltline_core::fixed::fixed64_to_f64;
use beltline_core::item::Item;
use beltline_core::query::{BuildingPhase, WorldSummary};
use beltline_core::world::WorldState;

/// One character per item kind; `.` for an empty slot.
pub fn glyph(item: Option<Item>) -> char {
    match item {
        None => '.',
        Some(Item::IronOre) => 'i',
        Some(Item::CopperOre) => 'c',
        Some(Item::IronPlate) => 'I',
        Some(Item::CopperPlate) => 'C',
        Some(Item::Gear) => 'g',
        Some(Item::Wire) => 'w',
        Some(Item::Science) => 'S',
    }
}

pub fn render_lane(slots: &[Option<Item>]) -> String {
    slots.iter().map(|&s| glyph(s)).collect()
}

pub fn render_summary(summary: &WorldSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "tick {}  spm {:.2}  speed {:.2}x  buildings {}  lost {}  {}",
        summary.tick,
        fixed64_to_f64(summary.science_per_minute),
        fixed64_to_f64(summary.speed),
        summary.building_count,
        summary.lost_to_space,
        if summary.running { "running" } else { "paused" },
    );
    let produced: Vec<String> = summary
        .produced
        .iter()
        .filter(|&(_, n)| n > 0)
        .map(|(item, n)| format!("{item}={n}"))
        .collect();
    if !produced.is_empty() {
        let _ = writeln!(out, "produced {}", produced.join(" "));
    }
    out
}

/// Summary, both lanes, and one line per building.
pub fn render_world(world: &WorldState) -> String {
    let mut out = render_summary(&world.summary());
    let _ = writeln!(out, "L |{}|", render_lane(&world.lane_view(Side::Left)));
    let _ = writeln!(out, "R |{}|", render_lane(&world.lane_view(Side::Right)));
    for view in world.building_views() {
        let phase = match view.phase {
            BuildingPhase::Idle => "idle",
            BuildingPhase::Collecting => "collecting",
            BuildingPhase::Processing => "processing",
            BuildingPhase::Delivering => "delivering",
            BuildingPhase::Stalled => "stalled",
        };
        let _ = writeln!(
            out,
            "  {:>2}{} {:<18} {:<10} {:>3}/{:<3} made {}",
            view.slot,
            if view.side == Side::Left { 'L' } else { 'R' },
            view.kind.to_string(),
            phase,
            view.progress,
            view.cycle_time,
            view.total_produced,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use beltline_core::item::BuildingKind;
    use beltline_core::test_utils::{place_with_cycle, two_ore_world};

    #[test]
    fn lane_glyphs() {
        let lane = [None, Some(Item::IronOre), Some(Item::Science), None];
        assert_eq!(render_lane(&lane), ".iS.");
    }

    #[test]
    fn fresh_world_renders_empty_lanes() {
        let w = two_ore_world();
        let text = render_world(&w);
        assert!(text.starts_with("tick 0"));
        assert!(text.contains(&format!("L |{}|", ".".repeat(40))));
        assert!(!text.contains("produced"));
    }

    #[test]
    fn buildings_are_listed() {
        let mut w = two_ore_world();
        place_with_cycle(&mut w, BuildingKind::Miner, Side::Left, 0, 2);
        w.advance(2);
        let text = render_world(&w);
        assert!(text.contains("miner"));
        assert!(text.contains("produced iron_ore=1"));
    }
}
