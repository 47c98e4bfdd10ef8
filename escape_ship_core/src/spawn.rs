//! Random placement of collectible items across the ship's rooms.
//!
//! Keys are distributed first, one per eligible room, so that every key
//! lives in a different place each session. Rooms are then filled with
//! regular items by chance, and a final pass tops up any item type that
//! still has fewer copies on the deck than the quest requires.

use std::{
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use log::{debug, info, warn};
use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};
use serde::{Deserialize, Serialize};

use crate::{
    ItemName, RoomBounds, WorldPoint,
    catalog::{ItemCatalog, ItemTypeDefinition},
    error::ConfigError,
};

/// Answers whether a point on the deck is blocked by scenery.
pub trait OccupancyOracle {
    fn is_obstructed(&self, point: WorldPoint) -> bool;
}

/// An oracle for a deck with nothing on it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFloor;

impl OccupancyOracle for OpenFloor {
    fn is_obstructed(&self, _point: WorldPoint) -> bool {
        false
    }
}

/// A room items can be spawned into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomArea {
    pub name: String,
    pub bounds: RoomBounds,
    #[serde(default)]
    pub min_items: u32,
    #[serde(default = "default_max_items")]
    pub max_items: u32,
    /// Probability in `[0, 1]` that the room receives filler items at all.
    #[serde(default = "default_spawn_chance")]
    pub spawn_chance: f32,
    #[serde(default)]
    pub can_have_keys: bool,
}

fn default_max_items() -> u32 {
    2
}

fn default_spawn_chance() -> f32 {
    0.5
}

impl RoomArea {
    pub fn new(name: impl Into<String>, bounds: RoomBounds) -> Self {
        RoomArea {
            name: name.into(),
            bounds,
            min_items: 0,
            max_items: default_max_items(),
            spawn_chance: default_spawn_chance(),
            can_have_keys: false,
        }
    }

    pub fn with_items(mut self, min_items: u32, max_items: u32, spawn_chance: f32) -> Self {
        self.min_items = min_items;
        self.max_items = max_items;
        self.spawn_chance = spawn_chance;
        self
    }

    pub fn allow_keys(mut self) -> Self {
        self.can_have_keys = true;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_items > self.max_items {
            return Err(ConfigError::InvalidItemRange {
                room: self.name.clone(),
                min: self.min_items,
                max: self.max_items,
            });
        }
        if !(0.0..=1.0).contains(&self.spawn_chance) {
            return Err(ConfigError::InvalidSpawnChance {
                room: self.name.clone(),
                chance: self.spawn_chance,
            });
        }
        if !self.bounds.is_valid() {
            return Err(ConfigError::InvalidBounds(self.name.clone()));
        }
        Ok(())
    }
}

/// Tuning for position sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Height above the floor at which items rest.
    pub ground_offset: f32,
    /// Random points tried per item before falling back to the room centre.
    pub max_attempts: u32,
    /// Minimum planar distance between two placements.
    pub item_spacing: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        SpawnSettings {
            ground_offset: 0.5,
            max_attempts: 30,
            item_spacing: 1.5,
        }
    }
}

/// Handle of a spawned item instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlacementId(pub u32);

/// One spawned item instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: PlacementId,
    pub item: ItemName,
    pub room: String,
    pub position: WorldPoint,
}

/// Which room each key was assigned to this session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAssignment {
    rooms: BTreeMap<ItemName, String>,
}

impl KeyAssignment {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.rooms.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rooms.iter().map(|(k, r)| (k.as_str(), r.as_str()))
    }

    fn assign(&mut self, key: &str, room: &str) {
        self.rooms.insert(key.to_string(), room.to_string());
    }
}

/// Everything the allocator produced for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnPlan {
    pub assignment: KeyAssignment,
    pub placements: Vec<Placement>,
    /// Rooms that received unassigned keys during the shortfall pass.
    fallback_rooms: BTreeMap<ItemName, String>,
}

impl SpawnPlan {
    /// Where a key can be found: its assigned room, or the room the
    /// fallback pass put it in.
    pub fn key_location(&self, key: &str) -> Option<&str> {
        self.assignment
            .get(key)
            .or_else(|| self.fallback_rooms.get(key).map(String::as_str))
    }

    pub fn count_of(&self, item: &str) -> usize {
        self.placements.iter().filter(|p| p.item == item).count()
    }

    pub fn placements_in<'a>(&'a self, room: &'a str) -> impl Iterator<Item = &'a Placement> {
        self.placements.iter().filter(move |p| p.room == room)
    }

    pub fn get(&self, id: PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    /// Removes a placement, e.g. when the player picks it up.
    pub fn take(&mut self, id: PlacementId) -> Option<Placement> {
        let index = self.placements.iter().position(|p| p.id == id)?;
        Some(self.placements.remove(index))
    }
}

/// Assigns keys to rooms and scatters items for a session.
#[derive(Debug, Clone)]
pub struct SpawnAllocator {
    catalog: Rc<ItemCatalog>,
    rooms: Vec<RoomArea>,
    settings: SpawnSettings,
    plan: SpawnPlan,
}

impl SpawnAllocator {
    pub fn new(catalog: Rc<ItemCatalog>, rooms: Vec<RoomArea>, settings: SpawnSettings) -> Self {
        if rooms.is_empty() {
            warn!("Spawn allocator created without rooms; nothing will be placed.");
        }
        SpawnAllocator {
            catalog,
            rooms,
            settings,
            plan: SpawnPlan::default(),
        }
    }

    pub fn rooms(&self) -> &[RoomArea] {
        &self.rooms
    }

    pub fn plan(&self) -> &SpawnPlan {
        &self.plan
    }

    pub fn plan_mut(&mut self) -> &mut SpawnPlan {
        &mut self.plan
    }

    pub fn key_location(&self, key: &str) -> Option<&str> {
        self.plan.key_location(key)
    }

    /// Drops the current plan. `allocate` calls this itself.
    pub fn clear(&mut self) {
        self.plan = SpawnPlan::default();
    }

    /// Computes a fresh plan, replacing any previous one.
    pub fn allocate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        oracle: &dyn OccupancyOracle,
    ) -> &SpawnPlan {
        self.clear();
        if self.rooms.is_empty() {
            warn!("No rooms configured; skipping item spawn.");
            return &self.plan;
        }

        let spawnable: Vec<&ItemTypeDefinition> =
            self.catalog.iter().filter(|item| item.spawnable).collect();
        let (keys, regular): (Vec<&ItemTypeDefinition>, Vec<&ItemTypeDefinition>) = spawnable
            .iter()
            .copied()
            .partition(|item| self.catalog.is_key_item(&item.name));

        let assignment = assign_keys(&keys, &self.rooms, rng);
        let mut builder = PlanBuilder::new(&self.settings, oracle);

        // Filler pass: each room rolls for a handful of items.
        for room in &self.rooms {
            let chance = f64::from(room.spawn_chance.clamp(0.0, 1.0));
            if !rng.random_bool(chance) {
                continue;
            }
            let (lo, hi) = (
                room.min_items.min(room.max_items),
                room.min_items.max(room.max_items),
            );
            let count = rng.random_range(lo..=hi);
            for _ in 0..count {
                let available: Vec<&ItemTypeDefinition> = regular
                    .iter()
                    .copied()
                    .chain(keys.iter().copied().filter(|key| {
                        assignment.get(&key.name) == Some(room.name.as_str())
                            && builder.spawned(&key.name) < key.required_amount
                    }))
                    .collect();
                let Some(item) = available.choose(rng) else {
                    break;
                };
                builder.place(&item.name, room, rng);
            }
        }

        // Shortfall pass: guarantee every requirement can be met.
        let mut fallback_rooms = BTreeMap::new();
        for item in &spawnable {
            let missing = item.required_amount.saturating_sub(builder.spawned(&item.name));
            if missing == 0 {
                continue;
            }
            // All copies of a key share one room.
            let key_room = if self.catalog.is_key_item(&item.name) {
                let room = match assignment.get(&item.name) {
                    Some(name) => self.room_named(name),
                    None => {
                        let room = fallback_key_room(&self.rooms, rng);
                        if let Some(room) = room {
                            fallback_rooms.insert(item.name.clone(), room.name.clone());
                        }
                        room
                    }
                };
                Some(room)
            } else {
                None
            };
            for _ in 0..missing {
                let room = match key_room {
                    Some(room) => room,
                    None => self.rooms.choose(rng),
                };
                match room {
                    Some(room) => builder.place(&item.name, room, rng),
                    None => warn!("No room available for {}", item.name),
                }
            }
        }

        self.plan = SpawnPlan {
            assignment,
            placements: builder.placements,
            fallback_rooms,
        };
        info!(
            "Spawned {} items; {} keys assigned to rooms",
            self.plan.placements.len(),
            self.plan.assignment.len()
        );
        &self.plan
    }

    fn room_named(&self, name: &str) -> Option<&RoomArea> {
        self.rooms.iter().find(|room| room.name == name)
    }
}

/// Shuffles the key-eligible rooms and pairs them with keys in order.
fn assign_keys<R: Rng + ?Sized>(
    keys: &[&ItemTypeDefinition],
    rooms: &[RoomArea],
    rng: &mut R,
) -> KeyAssignment {
    let mut eligible: Vec<&RoomArea> = rooms.iter().filter(|room| room.can_have_keys).collect();
    eligible.shuffle(rng);

    if keys.len() > eligible.len() {
        warn!(
            "{} keys but only {} rooms can hold keys; {} keys left unassigned",
            keys.len(),
            eligible.len(),
            keys.len() - eligible.len()
        );
    }

    let mut assignment = KeyAssignment::default();
    for (key, room) in keys.iter().zip(eligible) {
        debug!("Key {} assigned to {}", key.name, room.name);
        assignment.assign(&key.name, &room.name);
    }
    assignment
}

/// Prefers a key-eligible room, then any room.
fn fallback_key_room<'a, R: Rng + ?Sized>(rooms: &'a [RoomArea], rng: &mut R) -> Option<&'a RoomArea> {
    let eligible: Vec<&RoomArea> = rooms.iter().filter(|room| room.can_have_keys).collect();
    match eligible.choose(rng) {
        Some(room) => Some(*room),
        None => rooms.choose(rng),
    }
}

/// Accumulates placements while tracking per-item counts.
struct PlanBuilder<'a> {
    settings: &'a SpawnSettings,
    oracle: &'a dyn OccupancyOracle,
    placements: Vec<Placement>,
    counts: HashMap<ItemName, u32>,
}

impl<'a> PlanBuilder<'a> {
    fn new(settings: &'a SpawnSettings, oracle: &'a dyn OccupancyOracle) -> Self {
        PlanBuilder {
            settings,
            oracle,
            placements: Vec::new(),
            counts: HashMap::new(),
        }
    }

    fn spawned(&self, item: &str) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    fn place<R: Rng + ?Sized>(&mut self, item: &str, room: &RoomArea, rng: &mut R) {
        let position = self.sample_position(room, rng);
        let id = PlacementId(self.placements.len() as u32);
        debug!("Spawned {} in {} at {:?}", item, room.name, position);
        self.placements.push(Placement {
            id,
            item: item.to_string(),
            room: room.name.clone(),
            position,
        });
        *self.counts.entry(item.to_string()).or_insert(0) += 1;
    }

    /// Rejection-samples a free point, falling back to the room centre.
    fn sample_position<R: Rng + ?Sized>(&self, room: &RoomArea, rng: &mut R) -> WorldPoint {
        let bounds = room.bounds.normalized();
        let height = self.settings.ground_offset;
        for _ in 0..self.settings.max_attempts {
            let candidate = WorldPoint::new(
                rng.random_range(bounds.min_x..=bounds.max_x),
                height,
                rng.random_range(bounds.min_z..=bounds.max_z),
            );
            if self.oracle.is_obstructed(candidate) {
                continue;
            }
            let crowded = self
                .placements
                .iter()
                .any(|p| p.position.planar_distance(&candidate) < self.settings.item_spacing);
            if !crowded {
                return candidate;
            }
        }
        debug!("No free spot in {}; using its centre", room.name);
        bounds.center(height)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::catalog::{ItemCategory, ItemFunction};

    fn catalog(items: Vec<ItemTypeDefinition>) -> Rc<ItemCatalog> {
        Rc::new(ItemCatalog::new(items).unwrap())
    }

    fn key(name: &str) -> ItemTypeDefinition {
        ItemTypeDefinition::new(name, 1, ItemCategory::Key, ItemFunction::OpenDoor)
    }

    fn coin(required: u32) -> ItemTypeDefinition {
        ItemTypeDefinition::new("GoldCoin", required, ItemCategory::Treasure, ItemFunction::Currency)
    }

    fn room(name: &str, x: f32) -> RoomArea {
        RoomArea::new(name, RoomBounds::new(x, x + 4.0, 0.0, 4.0))
    }

    struct Blocked;

    impl OccupancyOracle for Blocked {
        fn is_obstructed(&self, _point: WorldPoint) -> bool {
            true
        }
    }

    #[test]
    fn keys_get_distinct_eligible_rooms() {
        let catalog = catalog(vec![key("RoomKey"), key("LifeboatKey"), coin(2)]);
        let rooms = vec![
            room("A", 0.0).allow_keys(),
            room("B", 10.0).allow_keys(),
            room("Galley", 20.0),
        ];
        let mut allocator = SpawnAllocator::new(catalog, rooms, SpawnSettings::default());
        let mut rng = StdRng::seed_from_u64(7);
        let plan = allocator.allocate(&mut rng, &OpenFloor);

        let a = plan.assignment.get("RoomKey").unwrap();
        let b = plan.assignment.get("LifeboatKey").unwrap();
        assert_ne!(a, b);
        assert!(["A", "B"].contains(&a) && ["A", "B"].contains(&b));
        // Keys only ever appear in their own room.
        for placement in &plan.placements {
            if let Some(room) = plan.assignment.get(&placement.item) {
                assert_eq!(placement.room, room);
            }
        }
    }

    #[test]
    fn surplus_keys_stay_unassigned_but_spawn() {
        let catalog = catalog(vec![key("RedKey"), key("BlueKey"), key("GreenKey")]);
        let rooms = vec![room("A", 0.0).allow_keys(), room("B", 10.0)];
        let mut allocator = SpawnAllocator::new(catalog, rooms, SpawnSettings::default());
        let mut rng = StdRng::seed_from_u64(3);
        let plan = allocator.allocate(&mut rng, &OpenFloor);

        assert_eq!(plan.assignment.len(), 1);
        for name in ["RedKey", "BlueKey", "GreenKey"] {
            assert!(plan.count_of(name) >= 1, "{name} was not spawned");
            assert!(plan.key_location(name).is_some());
        }
    }

    #[test]
    fn copies_of_an_unassigned_key_share_one_room() {
        let stacked_key = |name: &str| {
            ItemTypeDefinition::new(name, 3, ItemCategory::Key, ItemFunction::OpenDoor).stackable()
        };
        for seed in 0..20 {
            let catalog = catalog(vec![stacked_key("RedKey"), stacked_key("BlueKey"), stacked_key("GreenKey")]);
            let rooms = vec![
                room("A", 0.0).allow_keys(),
                room("B", 10.0).allow_keys(),
                room("C", 20.0),
                room("D", 30.0),
            ];
            let mut allocator = SpawnAllocator::new(catalog, rooms, SpawnSettings::default());
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = allocator.allocate(&mut rng, &OpenFloor);

            assert_eq!(plan.assignment.len(), 2);
            for name in ["RedKey", "BlueKey", "GreenKey"] {
                let location = plan.key_location(name).unwrap();
                let copies: Vec<&Placement> =
                    plan.placements.iter().filter(|p| p.item == name).collect();
                assert_eq!(copies.len(), 3, "seed {seed}: {name}");
                assert!(
                    copies.iter().all(|p| p.room == location),
                    "seed {seed}: {name} split across rooms"
                );
            }
        }
    }

    #[test]
    fn shortfall_is_topped_up() {
        let catalog = catalog(vec![coin(5)]);
        let rooms = vec![room("A", 0.0).with_items(0, 0, 0.0)];
        let mut allocator = SpawnAllocator::new(catalog, rooms, SpawnSettings::default());
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(allocator.allocate(&mut rng, &OpenFloor).count_of("GoldCoin"), 5);
    }

    #[test]
    fn exhausted_budget_falls_back_to_centre() {
        let catalog = catalog(vec![coin(1)]);
        let rooms = vec![room("A", 0.0).with_items(0, 0, 0.0)];
        let settings = SpawnSettings {
            ground_offset: 0.25,
            ..SpawnSettings::default()
        };
        let mut allocator = SpawnAllocator::new(catalog, rooms, settings);
        let mut rng = StdRng::seed_from_u64(1);
        let plan = allocator.allocate(&mut rng, &Blocked);
        assert_eq!(plan.placements[0].position, WorldPoint::new(2.0, 0.25, 2.0));
    }

    #[test]
    fn rewards_are_never_spawned() {
        let gun = ItemTypeDefinition::new("MatchlockGun", 1, ItemCategory::Weapon, ItemFunction::DefendSelf)
            .not_spawnable();
        let catalog = catalog(vec![gun, coin(1)]);
        let rooms = vec![room("A", 0.0).with_items(3, 3, 1.0)];
        let mut allocator = SpawnAllocator::new(catalog, rooms, SpawnSettings::default());
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(allocator.allocate(&mut rng, &OpenFloor).count_of("MatchlockGun"), 0);
    }

    #[test]
    fn reallocation_replaces_the_previous_plan() {
        let catalog = catalog(vec![key("RoomKey"), coin(2)]);
        let rooms = vec![room("A", 0.0).allow_keys().with_items(1, 3, 1.0)];
        let mut allocator = SpawnAllocator::new(catalog, rooms, SpawnSettings::default());
        let mut rng = StdRng::seed_from_u64(9);
        let first = allocator.allocate(&mut rng, &OpenFloor).placements.len();
        let second = allocator.allocate(&mut rng, &OpenFloor).placements.len();
        assert!(second <= 1 + 3 + 2);
        assert!(first <= 1 + 3 + 2);
        assert_eq!(allocator.plan().count_of("RoomKey"), 1);
    }

    #[test]
    fn no_rooms_means_an_empty_plan() {
        let catalog = catalog(vec![coin(2)]);
        let mut allocator = SpawnAllocator::new(catalog, vec![], SpawnSettings::default());
        let mut rng = StdRng::seed_from_u64(2);
        assert!(allocator.allocate(&mut rng, &OpenFloor).placements.is_empty());
    }

    #[test]
    fn invalid_rooms_are_rejected() {
        let inverted = RoomArea::new("Hold", RoomBounds::new(4.0, 0.0, 0.0, 1.0));
        assert!(matches!(inverted.validate(), Err(ConfigError::InvalidBounds(_))));
        let greedy = room("A", 0.0).with_items(3, 1, 0.5);
        assert!(matches!(greedy.validate(), Err(ConfigError::InvalidItemRange { .. })));
        let lucky = room("A", 0.0).with_items(0, 1, 1.5);
        assert!(matches!(lucky.validate(), Err(ConfigError::InvalidSpawnChance { .. })));
    }
}
