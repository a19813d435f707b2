//! Supply spawning and pickups.
//!
//! At most one supply spawns per tick, and only while the map holds fewer
//! than the cap. The cap is checked before any random draw, so a full map
//! consumes no randomness. The kind is drawn from
//! [`SupplyKind::SPAWN_TABLE`]; the position is sampled inside the spawn
//! margin until it clears every obstacle or the attempt budget runs out.
//!
//! Pickups run agent by agent in roster order. A living agent collects every
//! supply strictly within the pickup radius, so when two agents stand on the
//! same supply the earlier one gets it.

use rand::{Rng, RngCore};
use tracing::debug;

use crate::config::{SimConfig, SupplyConfig};
use crate::entity::{Agent, Supply, SupplyKind, WeaponKind};
use crate::events::TickEvent;
use crate::world::{sample_point, WorldState};

use super::Resolver;

/// Spawns supplies and hands them to agents.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplySystem {
    config: SupplyConfig,
    agent_radius: f32,
    pickup_radius: f32,
}

impl SupplySystem {
    /// Creates the system from the configuration.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            config: config.supply.clone(),
            agent_radius: config.agent_radius,
            pickup_radius: config.pickup_radius,
        }
    }

    /// Rolls for a new supply and places it if the roll succeeds.
    pub fn maybe_spawn(
        &self,
        world: &mut WorldState,
        rng: &mut dyn RngCore,
        events: &mut Vec<TickEvent>,
    ) -> Option<Supply> {
        if world.supplies.len() >= self.config.max_supplies {
            return None;
        }
        if rng.gen::<f64>() >= self.config.spawn_chance {
            return None;
        }

        let table = &SupplyKind::SPAWN_TABLE;
        let kind = table[rng.gen_range(0..table.len())];
        let margin = self.config.spawn_margin;

        for _ in 0..self.config.spawn_attempts {
            let position = sample_point(rng, margin, world.width(), world.height());
            if world.blocked(position, self.agent_radius) {
                continue;
            }
            let supply = Supply { position, kind };
            world.supplies.push(supply);
            debug!(%kind, x = position.x, y = position.y, "Supply spawned");
            events.push(TickEvent::SupplySpawned { kind, position });
            return Some(supply);
        }

        debug!(%kind, attempts = self.config.spawn_attempts, "No free spot for supply");
        None
    }

    /// Lets every living agent collect the supplies within reach.
    pub fn resolve_pickups(&self, world: &mut WorldState, events: &mut Vec<TickEvent>) {
        let mut supplies = std::mem::take(&mut world.supplies);

        for agent in world.agents_mut().iter_mut().filter(|a| a.is_alive()) {
            supplies.retain(|s| {
                if agent.distance_to(s.position) >= self.pickup_radius {
                    return true;
                }
                self.grant(agent, s.kind);
                debug!(agent = %agent.name, kind = %s.kind, "Supply picked up");
                events.push(TickEvent::SupplyPicked {
                    agent: agent.id,
                    kind: s.kind,
                });
                false
            });
        }

        world.supplies = supplies;
    }

    fn grant(&self, agent: &mut Agent, kind: SupplyKind) {
        let c = &self.config;
        match kind {
            SupplyKind::Health => agent.heal(c.heal_amount),
            SupplyKind::AmmoShotgun => agent.ammo.add(WeaponKind::Shotgun, c.shotgun_ammo),
            SupplyKind::AmmoSniper => agent.ammo.add(WeaponKind::Sniper, c.sniper_ammo),
            SupplyKind::AmmoRocket => agent.ammo.add(WeaponKind::Rocket, c.rocket_ammo),
            SupplyKind::WeaponShotgun => agent.weapon = WeaponKind::Shotgun,
            SupplyKind::WeaponSniper => agent.weapon = WeaponKind::Sniper,
            SupplyKind::WeaponRocket => agent.weapon = WeaponKind::Rocket,
        }
    }
}

impl Resolver for SupplySystem {
    fn name(&self) -> &'static str {
        "pickup"
    }

    fn resolve(&self, world: &mut WorldState, _rng: &mut dyn RngCore, events: &mut Vec<TickEvent>) {
        self.resolve_pickups(world, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn system_with_chance(chance: f64) -> SupplySystem {
        let mut config = SimConfig::default();
        config.supply.spawn_chance = chance;
        SupplySystem::from_config(&config)
    }

    mod spawn_tests {
        use super::*;

        #[test]
        fn certain_spawn_lands_inside_margin() {
            let system = system_with_chance(1.0);
            let mut world = WorldState::new(100.0, 100.0);
            let mut rng = ChaCha8Rng::seed_from_u64(4);
            let mut events = Vec::new();

            for _ in 0..8 {
                let s = system.maybe_spawn(&mut world, &mut rng, &mut events).unwrap();
                assert!((10.0..=90.0).contains(&s.position.x));
                assert!((10.0..=90.0).contains(&s.position.y));
            }
            assert_eq!(world.supplies.len(), 8);
            assert_eq!(events.len(), 8);
        }

        #[test]
        fn cap_blocks_spawn_even_on_success() {
            let system = system_with_chance(1.0);
            let mut world = WorldState::new(100.0, 100.0);
            for _ in 0..8 {
                world.supplies.push(Supply {
                    position: Vec2::new(50.0, 50.0),
                    kind: SupplyKind::Health,
                });
            }
            let mut rng = ChaCha8Rng::seed_from_u64(4);
            let before = rng.clone();

            assert!(system.maybe_spawn(&mut world, &mut rng, &mut Vec::new()).is_none());
            assert_eq!(world.supplies.len(), 8);
            assert_eq!(rng, before);
        }

        #[test]
        fn negative_margin_spawns_stay_on_the_map() {
            let mut config = SimConfig::default();
            config.supply.spawn_chance = 1.0;
            config.supply.spawn_margin = -50.0;
            let system = SupplySystem::from_config(&config);
            let mut world = WorldState::new(100.0, 100.0);
            let mut rng = ChaCha8Rng::seed_from_u64(4);

            for _ in 0..8 {
                let s = system.maybe_spawn(&mut world, &mut rng, &mut Vec::new()).unwrap();
                assert!(crate::geometry::in_map(s.position, 100.0, 100.0));
            }
        }

        #[test]
        fn zero_chance_never_spawns() {
            let system = system_with_chance(0.0);
            let mut world = WorldState::new(100.0, 100.0);
            let mut rng = ChaCha8Rng::seed_from_u64(4);
            for _ in 0..200 {
                system.maybe_spawn(&mut world, &mut rng, &mut Vec::new());
            }
            assert!(world.supplies.is_empty());
        }

        #[test]
        fn fully_walled_map_skips_spawn() {
            let system = system_with_chance(1.0);
            let mut world = WorldState::new(100.0, 100.0);
            world.add_obstacle(Rect::new(0.0, 0.0, 100.0, 100.0));
            let mut rng = ChaCha8Rng::seed_from_u64(4);

            assert!(system.maybe_spawn(&mut world, &mut rng, &mut Vec::new()).is_none());
            assert!(world.supplies.is_empty());
        }
    }

    mod pickup_tests {
        use super::*;

        fn world_with_supply(kind: SupplyKind) -> WorldState {
            let mut world = WorldState::new(100.0, 100.0);
            for name in ["a", "b"] {
                let id = world.spawn_agent(name, None, 100);
                world.agent_mut(id).unwrap().position = Vec2::new(50.0, 50.0);
            }
            world.supplies.push(Supply {
                position: Vec2::new(52.0, 50.0),
                kind,
            });
            world
        }

        #[test]
        fn health_caps_at_max() {
            let mut world = world_with_supply(SupplyKind::Health);
            world.agents_mut()[0].set_health(90);
            system_with_chance(0.0).resolve_pickups(&mut world, &mut Vec::new());

            assert_eq!(world.agents()[0].health(), 100);
            assert!(world.supplies.is_empty());
        }

        #[test]
        fn first_agent_in_order_wins() {
            let mut world = world_with_supply(SupplyKind::AmmoRocket);
            let mut events = Vec::new();
            system_with_chance(0.0).resolve_pickups(&mut world, &mut events);

            assert_eq!(world.agents()[0].ammo.rocket, 2);
            assert_eq!(world.agents()[1].ammo.rocket, 0);
            assert_eq!(events.len(), 1);
        }

        #[test]
        fn weapon_pickup_switches_without_ammo() {
            let mut world = world_with_supply(SupplyKind::WeaponSniper);
            system_with_chance(0.0).resolve_pickups(&mut world, &mut Vec::new());

            let a = &world.agents()[0];
            assert_eq!(a.weapon, WeaponKind::Sniper);
            assert_eq!(a.ammo.sniper, 0);
        }

        #[test]
        fn dead_agents_and_far_supplies_are_skipped() {
            let mut world = world_with_supply(SupplyKind::AmmoShotgun);
            world.agents_mut()[0].set_health(0);
            world.agents_mut()[1].position = Vec2::new(48.0, 50.0); // exactly 4 away

            system_with_chance(0.0).resolve_pickups(&mut world, &mut Vec::new());

            assert_eq!(world.supplies.len(), 1);
        }
    }
}
