//! Property tests for the ECS world: id issuance, attach/detach symmetry,
//! destruction cascade, and query correctness against a brute-force model.

use std::collections::{BTreeMap, BTreeSet};

use carapace_core::{Component, ComponentType, EntityId, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

struct Position {
    x: f32,
}
impl Component for Position {
    const TYPE: ComponentType = ComponentType::new("position");
}

struct Health {
    hp: i32,
}
impl Component for Health {
    const TYPE: ComponentType = ComponentType::new("health");
}

struct Sprite;
impl Component for Sprite {
    const TYPE: ComponentType = ComponentType::new("sprite");
}

const KINDS: [ComponentType; 3] = [Position::TYPE, Health::TYPE, Sprite::TYPE];

fn world() -> World {
    let mut world = World::default();
    world.register_kind::<Position>().unwrap();
    world.register_kind::<Health>().unwrap();
    world.register_kind::<Sprite>().unwrap();
    world
}

fn attach(world: &mut World, id: EntityId, kind: ComponentType, value: i32) {
    let result = match kind.as_str() {
        "position" => world.register_component(id, Position { x: value as f32 }),
        "health" => world.register_component(id, Health { hp: value }),
        _ => world.register_component(id, Sprite),
    };
    result.unwrap();
}

#[test]
fn test_ids_strictly_increasing_across_churn() {
    let mut world = world();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut issued: Vec<EntityId> = Vec::new();
    let mut alive: Vec<EntityId> = Vec::new();

    for _ in 0..500 {
        if alive.is_empty() || rng.gen_bool(0.6) {
            let id = world.create_entity().id();
            issued.push(id);
            alive.push(id);
        } else {
            let victim = alive.swap_remove(rng.gen_range(0..alive.len()));
            world.destroy_entity(victim);
        }
    }

    assert!(issued.windows(2).all(|pair| pair[0] < pair[1]));
    let unique: BTreeSet<_> = issued.iter().collect();
    assert_eq!(unique.len(), issued.len());
    assert_eq!(world.entity_count(), alive.len());
}

#[test]
fn test_attach_detach_symmetry() {
    let mut world = world();
    let mut entity = world.create_entity();
    entity.add_component(Health { hp: 3 }).unwrap();
    entity.remove_component(Health::TYPE);

    assert!(!entity.has_component(Health::TYPE));
    assert!(entity.get_component::<Health>().is_none());
    assert!(!entity.component_types().contains(&Health::TYPE));
}

#[test]
fn test_last_write_wins_on_same_kind() {
    let mut world = world();
    let mut entity = world.create_entity();
    entity.add_component(Position { x: 1.0 }).unwrap();
    entity.add_component(Position { x: 2.0 }).unwrap();
    let id = entity.id();

    let position = world.get_component::<Position>(id).unwrap();
    assert!((position.x - 2.0).abs() < f32::EPSILON);
    assert_eq!(world.storage::<Position>().unwrap().len(), 1);
    assert_eq!(world.component_types(id), vec![Position::TYPE]);
}

#[test]
fn test_destruction_cascade() {
    let mut world = world();
    let survivor = world.create_entity().id();
    attach(&mut world, survivor, Health::TYPE, 1);

    let id = world.create_entity().id();
    for (n, kind) in KINDS.iter().enumerate() {
        attach(&mut world, id, *kind, n as i32);
    }

    world.destroy_entity(id);
    for kind in KINDS {
        assert!(!world.has_component(id, kind));
    }
    assert!(world.storage::<Position>().unwrap().is_empty());
    assert!(world.storage::<Sprite>().unwrap().is_empty());
    assert_eq!(world.storage::<Health>().unwrap().len(), 1);
    assert!(world.component_types(id).is_empty());

    world.destroy_entity(id);
    assert_eq!(world.entity_ids(), vec![survivor]);
    assert_eq!(world.get_component::<Health>(survivor).unwrap().hp, 1);
}

#[test]
fn test_query_matches_brute_force_model() {
    let mut world = world();
    let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
    let mut model: BTreeMap<EntityId, BTreeSet<ComponentType>> = BTreeMap::new();

    for step in 0..2_000 {
        let roll = rng.gen_range(0..100);
        let ids: Vec<EntityId> = model.keys().copied().collect();

        if ids.is_empty() || roll < 15 {
            let id = world.create_entity().id();
            model.insert(id, BTreeSet::new());
        } else if roll < 25 {
            let id = ids[rng.gen_range(0..ids.len())];
            world.destroy_entity(id);
            model.remove(&id);
        } else if roll < 70 {
            let id = ids[rng.gen_range(0..ids.len())];
            let kind = KINDS[rng.gen_range(0..KINDS.len())];
            attach(&mut world, id, kind, step);
            model.get_mut(&id).unwrap().insert(kind);
        } else {
            let id = ids[rng.gen_range(0..ids.len())];
            let kind = KINDS[rng.gen_range(0..KINDS.len())];
            world.unregister_component(id, kind);
            model.get_mut(&id).unwrap().remove(&kind);
        }

        if step % 50 == 0 {
            for mask in 0u8..8 {
                let required: Vec<ComponentType> = KINDS
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| mask & (1 << bit) != 0)
                    .map(|(_, kind)| *kind)
                    .collect();

                let expected: Vec<EntityId> = model
                    .iter()
                    .filter(|(_, kinds)| required.iter().all(|k| kinds.contains(k)))
                    .map(|(id, _)| *id)
                    .collect();

                assert_eq!(
                    world.get_entities_with_components(&required),
                    expected,
                    "query {required:?} diverged at step {step}"
                );
            }
        }
    }

    for (id, kinds) in &model {
        assert_eq!(world.component_types(*id), kinds.iter().copied().collect::<Vec<_>>());
    }
}

#[test]
fn test_owner_back_reference() {
    let mut world = world();
    let first = world.create_entity().id();
    let second = world.create_entity().id();
    world.register_component(first, Health { hp: 1 }).unwrap();
    world.register_component(second, Health { hp: 2 }).unwrap();

    for attached in world.storage::<Health>().unwrap().iter() {
        let expected = if attached.hp == 1 { first } else { second };
        assert_eq!(attached.entity(), expected);
    }
}

fn stored(world: &World, id: EntityId, kind: ComponentType) -> bool {
    match kind.as_str() {
        "position" => world.get_component::<Position>(id).is_some(),
        "health" => world.get_component::<Health>(id).is_some(),
        _ => world.get_component::<Sprite>(id).is_some(),
    }
}

#[test]
fn test_index_and_stores_agree_under_public_mutation() {
    let mut world = world();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut issued: Vec<EntityId> = Vec::new();

    for step in 0..1_500 {
        let roll = rng.gen_range(0..100);
        let kind = KINDS[rng.gen_range(0..KINDS.len())];
        let target = (!issued.is_empty()).then(|| issued[rng.gen_range(0..issued.len())]);

        match (roll, target) {
            (_, None) | (0..=14, _) => issued.push(world.create_entity().id()),
            (15..=24, Some(id)) => world.destroy_entity(id),
            (25..=59, Some(id)) => {
                let result = match kind.as_str() {
                    "position" => world.register_component(id, Position { x: 0.0 }),
                    "health" => world.register_component(id, Health { hp: step }),
                    _ => world.register_component(id, Sprite),
                };
                if world.contains_entity(id) {
                    assert!(result.is_ok());
                } else {
                    assert_eq!(result, Err(carapace_core::EcsError::EntityNotAlive(id)));
                }
            }
            (60..=74, Some(id)) => {
                let taken = match kind.as_str() {
                    "position" => world.take_component::<Position>(id).is_some(),
                    "health" => world.take_component::<Health>(id).is_some(),
                    _ => world.take_component::<Sprite>(id).is_some(),
                };
                assert!(!taken || !stored(&world, id, kind));
            }
            (75..=89, Some(id)) => {
                if let Some(mut entity) = world.entity(id) {
                    entity.remove_component(kind);
                }
            }
            (_, Some(id)) => {
                if let Some(health) = world.get_component_mut::<Health>(id) {
                    health.hp += 1;
                }
            }
        }

        for &id in &issued {
            let alive = world.contains_entity(id);
            for kind in KINDS {
                let indexed = world.has_component(id, kind);
                assert_eq!(indexed, stored(&world, id, kind), "{id} {kind} at step {step}");
                assert_eq!(
                    indexed,
                    world.get_entities_with_components(&[kind]).contains(&id),
                    "{id} {kind} query at step {step}"
                );
                assert!(alive || !indexed, "dead {id} still carries {kind}");
            }
        }
    }
}
