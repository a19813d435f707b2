//! Firing, bullet flight and hit resolution.
//!
//! The `CombatResolver` handles:
//! - `shoot` actions: spawning bullets from the weapon table, cooldown and ammo
//! - bullet flight: advancing and pruning bullets that leave the map
//! - collisions: obstacles absorb bullets, agents take direct or splash damage
//!
//! # Hit rules
//!
//! Bullets are resolved in firing order. A bullet inside an obstacle's raw
//! footprint is removed; a rocket detonates there first. Otherwise the first
//! living agent in roster order that is not the shooter, not on the shooter's
//! team, and strictly within the hit radius takes the hit. Rockets deal splash
//! damage only, so the struck agent is hurt once, by the splash.
//!
//! Splash damage reaches every living agent within the radius, including the
//! shooter and its team.
//!
//! # Kill credit
//!
//! Each transition from alive to dead credits one kill to the bullet's owner,
//! even if the owner has died since firing, and one death to the victim.

use rand::RngCore;
use tracing::debug;

use crate::config::{SimConfig, WeaponSpec, WeaponTable};
use crate::entity::{same_team, AgentId, Bullet, WeaponKind};
use crate::events::TickEvent;
use crate::world::WorldState;

use super::Resolver;

/// Splash damage at `distance` from the blast centre.
///
/// Falls off linearly from `base` at the centre to 0 at `radius`, rounded
/// down. Outside the radius, or with no radius, the result is 0.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::splash_damage;
///
/// assert_eq!(splash_damage(20, 0.0, 8.0), 20);
/// assert_eq!(splash_damage(20, 4.0, 8.0), 10);
/// assert_eq!(splash_damage(20, 8.0, 8.0), 0);
/// assert_eq!(splash_damage(25, 4.0, 8.0), 12);
/// ```
#[must_use]
pub fn splash_damage(base: i32, distance: f32, radius: f32) -> i32 {
    if radius <= 0.0 || distance > radius {
        return 0;
    }
    // Damage values are small; the product fits comfortably in f32/i32.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let dmg = (base as f32 * (1.0 - distance / radius)).floor() as i32;
    dmg.max(0)
}

/// Resolver for weapons and projectiles.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatResolver {
    weapons: WeaponTable,
    hit_radius: f32,
}

impl CombatResolver {
    /// Creates a resolver from the configuration.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            weapons: config.weapons.clone(),
            hit_radius: config.hit_radius,
        }
    }

    /// Fires the agent's weapon if its cooldown has elapsed.
    ///
    /// A non-normal weapon with no ammo fires a normal round instead; the held
    /// weapon does not change. Returns the number of bullets spawned.
    pub fn fire(&self, world: &mut WorldState, id: AgentId, events: &mut Vec<TickEvent>) -> usize {
        let Some(agent) = world.agent_mut(id) else {
            return 0;
        };
        if !agent.is_alive() || agent.cooldown > 0 {
            return 0;
        }

        let held = agent.weapon;
        let kind = if agent.ammo.try_consume(held) {
            held
        } else {
            WeaponKind::Normal
        };
        let spec: &WeaponSpec = self.weapons.spec(kind);
        agent.cooldown = spec.cooldown;

        let (origin, heading) = (agent.position, agent.heading());
        let bullets: Vec<Bullet> = spec
            .spread
            .iter()
            .map(|offset| Bullet {
                position: origin,
                direction: glam::Vec2::from_angle(heading + offset),
                speed: spec.speed,
                owner: id,
                damage: spec.damage,
                kind,
                splash_radius: spec.splash_radius,
                active: true,
            })
            .collect();

        let count = bullets.len();
        world.bullets.extend(bullets);
        events.push(TickEvent::Fired {
            agent: id,
            weapon: kind,
            bullets: count,
        });
        count
    }

    /// Advances every bullet and drops those that left the map.
    pub fn advance_bullets(world: &mut WorldState) {
        let (w, h) = (world.width(), world.height());
        for bullet in &mut world.bullets {
            bullet.advance(w, h);
        }
        world.bullets.retain(|b| b.active);
    }

    /// Resolves obstacle and agent collisions for every bullet, in order.
    pub fn resolve_collisions(&self, world: &mut WorldState, events: &mut Vec<TickEvent>) {
        let bullets = std::mem::take(&mut world.bullets);
        let mut survivors = Vec::with_capacity(bullets.len());

        for bullet in bullets {
            if !bullet.active {
                continue;
            }

            if world.obstacles().iter().any(|o| o.rect.contains(bullet.position)) {
                if bullet.is_explosive() {
                    Self::detonate(world, &bullet, events);
                }
                continue;
            }

            let owner_team = world.agent(bullet.owner).and_then(|o| o.team);
            let target = world.agents().iter().position(|a| {
                a.id != bullet.owner
                    && a.is_alive()
                    && !same_team(owner_team, a.team)
                    && a.distance_to(bullet.position) < self.hit_radius
            });

            match target {
                Some(_) if bullet.is_explosive() => Self::detonate(world, &bullet, events),
                Some(index) => {
                    let victim = &mut world.agents_mut()[index];
                    let killed = victim.apply_damage(bullet.damage);
                    let target = victim.id;
                    events.push(TickEvent::Hit {
                        shooter: bullet.owner,
                        target,
                        damage: bullet.damage,
                    });
                    if killed {
                        Self::credit_kill(world, bullet.owner, target, events);
                    }
                }
                None => survivors.push(bullet),
            }
        }

        world.bullets = survivors;
    }

    /// Applies splash damage around the bullet's position.
    fn detonate(world: &mut WorldState, bullet: &Bullet, events: &mut Vec<TickEvent>) {
        let center = bullet.position;
        let mut victims = Vec::new();
        let mut killed = Vec::new();

        for agent in world.agents_mut().iter_mut().filter(|a| a.is_alive()) {
            let dmg = splash_damage(bullet.damage, agent.distance_to(center), bullet.splash_radius);
            if dmg > 0 {
                if agent.apply_damage(dmg) {
                    killed.push(agent.id);
                }
                victims.push((agent.id, dmg));
            }
        }

        events.push(TickEvent::Splash {
            shooter: bullet.owner,
            center,
            victims,
        });
        for victim in killed {
            Self::credit_kill(world, bullet.owner, victim, events);
        }
    }

    fn credit_kill(
        world: &mut WorldState,
        killer: AgentId,
        victim: AgentId,
        events: &mut Vec<TickEvent>,
    ) {
        if let Some(owner) = world.agent_mut(killer) {
            owner.kills += 1;
        }
        if let Some(dead) = world.agent_mut(victim) {
            dead.deaths += 1;
        }
        debug!(%killer, %victim, turn = world.turn(), "Agent killed");
        events.push(TickEvent::Kill { killer, victim });
    }
}

impl Resolver for CombatResolver {
    fn name(&self) -> &'static str {
        "combat"
    }

    fn resolve(&self, world: &mut WorldState, _rng: &mut dyn RngCore, events: &mut Vec<TickEvent>) {
        Self::advance_bullets(world);
        self.resolve_collisions(world, events);
    }
}
