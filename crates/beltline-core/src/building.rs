//! Building production state machine.
//!
//! Every recipe follows the same three-phase cycle:
//!
//! 1. **Collecting** -- pull missing inputs from the belt at the building's
//!    slot, one item per tick, home lane first.
//! 2. **Processing** -- once every input is held, accumulate progress until
//!    it reaches the building's cycle time. No inputs are collected.
//! 3. **Delivering** -- place the finished output on the home lane at the
//!    building's slot. An occupied slot stalls the building: it keeps the
//!    output and retries every tick without further progress.
//!
//! Delivery is attempted before anything else. A building holding an
//! undelivered output does nothing else that tick.

use crate::belt::Belts;
use crate::engine::TickReport;
use crate::id::BuildingId;
use crate::item::{Item, Recipe};
use crate::world::{Building, Resource};

/// Run one tick of `building`'s state machine against the shared belts.
pub(crate) fn run_building(
    id: BuildingId,
    building: &mut Building,
    belts: &mut Belts,
    resources: &[Resource],
    report: &mut TickReport,
) {
    match building.kind.recipe() {
        Recipe::Extract => run_extractor(id, building, belts, resources, report),
        Recipe::Convert(pairs) => run_converter(id, building, belts, pairs, report),
        Recipe::Combine { inputs, output } => {
            run_combiner(id, building, belts, inputs, output, report)
        }
        Recipe::Consume(item) => run_consumer(building, belts, item, report),
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Try to hand `item` off to the home lane. Never overwrites an occupied
/// slot. Returns whether the item left the building.
fn deliver(
    id: BuildingId,
    building: &mut Building,
    belts: &mut Belts,
    item: Item,
    report: &mut TickReport,
) -> bool {
    if belts.lane_mut(building.side).try_insert(building.slot, item) {
        building.total_produced += 1;
        report.delivered.increment(item);
        true
    } else {
        report.stalled.push(id);
        false
    }
}

// ---------------------------------------------------------------------------
// Miner
// ---------------------------------------------------------------------------

/// Miners need no input. Without a resource under them they never move.
/// A finished cycle that cannot deliver pins progress at the threshold, so
/// the delivery is retried every tick without re-timing.
fn run_extractor(
    id: BuildingId,
    building: &mut Building,
    belts: &mut Belts,
    resources: &[Resource],
    report: &mut TickReport,
) {
    let Some(resource) = resources.iter().find(|r| r.slot == building.slot) else {
        return;
    };

    building.progress += 1;
    if building.progress < building.cycle_time {
        return;
    }

    if deliver(id, building, belts, resource.ore, report) {
        building.progress = 0;
    } else {
        building.progress = building.cycle_time;
    }
}

// ---------------------------------------------------------------------------
// Single-input converters (furnace, gear and wire assemblers)
// ---------------------------------------------------------------------------

fn run_converter(
    id: BuildingId,
    building: &mut Building,
    belts: &mut Belts,
    pairs: &[(Item, Item)],
    report: &mut TickReport,
) {
    // Finished output in hand: only try to deliver.
    if let Some(&(_, output)) = pairs.iter().find(|&&(_, out)| building.held.contains(out)) {
        if deliver(id, building, belts, output, report) {
            building.held.remove(output);
        }
        return;
    }

    // Input in hand: process.
    if let Some(&(input, output)) = pairs.iter().find(|&&(inp, _)| building.held.contains(inp)) {
        building.progress += 1;
        if building.progress >= building.cycle_time {
            building.held.remove(input);
            building.held.insert(output);
            building.progress = 0;
        }
        return;
    }

    // Empty hand: collect.
    let accepts = |item: Item| pairs.iter().any(|&(inp, _)| inp == item);
    if let Some(item) = belts.pull(building.side, building.slot, accepts) {
        building.held.insert(item);
        building.progress = 0;
    }
}

// ---------------------------------------------------------------------------
// Multi-input combiner (science assembler)
// ---------------------------------------------------------------------------

/// Inputs are acquired strictly in recipe order, one per tick: only the
/// first missing input is looked for. Processing starts in the same tick
/// the last input arrives, consuming the inputs.
fn run_combiner(
    id: BuildingId,
    building: &mut Building,
    belts: &mut Belts,
    inputs: &[Item],
    output: Item,
    report: &mut TickReport,
) {
    if building.held.contains(output) {
        if deliver(id, building, belts, output, report) {
            building.held.remove(output);
        }
        return;
    }

    if building.progress > 0 {
        building.progress += 1;
        if building.progress >= building.cycle_time {
            building.held.insert(output);
            building.progress = 0;
        }
        return;
    }

    if let Some(&missing) = inputs.iter().find(|&&item| !building.held.contains(item))
        && let Some(item) = belts.pull(building.side, building.slot, |item| item == missing)
    {
        building.held.insert(item);
    }

    if inputs.iter().all(|&item| building.held.contains(item)) {
        for &item in inputs {
            building.held.remove(item);
        }
        building.progress = 1;
    }
}

// ---------------------------------------------------------------------------
// Consumer (lab)
// ---------------------------------------------------------------------------

/// Labs hold one input while processing and emit nothing on the belt. Each
/// completion counts toward the tick's science sample.
fn run_consumer(building: &mut Building, belts: &mut Belts, input: Item, report: &mut TickReport) {
    if building.progress > 0 {
        building.progress += 1;
        if building.progress >= building.cycle_time {
            building.held.remove(input);
            building.progress = 0;
            building.total_produced += 1;
            report.science_consumed += 1;
        }
        return;
    }

    if let Some(item) = belts.pull(building.side, building.slot, |item| item == input) {
        building.held.insert(item);
        building.progress = 1;
    }
}
