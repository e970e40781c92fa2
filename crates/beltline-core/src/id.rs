use slotmap::new_key_type;

new_key_type! {
    /// Identifies a placed building. Stable across ticks, moves and snapshots.
    pub struct BuildingId;
}
