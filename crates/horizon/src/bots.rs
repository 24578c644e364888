//! Simulated bot connections.
//!
//! Each bot owns a controller, a pawn and a player state, joins the red or
//! blue team alternately and orbits the world origin so spatial relevancy
//! changes from tick to tick.

use horizon_relevancy::{
    ClassHierarchy, ClassId, ConnectionId, ObjectDescriptor, ObjectId, RoutingContext, TeamTag, Vec3,
};
use std::f64::consts::TAU;
use tracing::{debug, info};

const TEAMS: [&str; 2] = ["red", "blue"];

#[derive(Debug, Clone)]
struct Bot {
    controller: ObjectId,
    pawn: ObjectId,
    player_state: ObjectId,
    connection: ConnectionId,
    radius: f64,
    angle: f64,
}

impl Bot {
    fn position(&self) -> Vec3 {
        Vec3::new(self.radius * self.angle.cos(), self.radius * self.angle.sin(), 0.0)
    }
}

/// Orbiting bots driving the router like real players would.
#[derive(Debug, Default)]
pub struct BotSwarm {
    bots: Vec<Bot>,
    speed: f64,
}

struct BotClasses {
    controller: ClassId,
    pawn: ClassId,
    player_state: ClassId,
}

impl BotClasses {
    fn resolve(hierarchy: &ClassHierarchy) -> Result<Self, String> {
        let find = |name: &str| {
            hierarchy
                .find(name)
                .ok_or_else(|| format!("Bot class '{name}' is not registered"))
        };
        Ok(Self {
            controller: find("PlayerController")?,
            pawn: find("Pawn")?,
            player_state: find("PlayerState")?,
        })
    }
}

impl BotSwarm {
    /// Spawns `count` bots spread over radii up to `extent`.
    pub fn spawn(
        router: &mut RoutingContext,
        hierarchy: &ClassHierarchy,
        count: usize,
        extent: f64,
        speed: f64,
    ) -> Result<Self, String> {
        if count == 0 {
            return Ok(Self { bots: Vec::new(), speed });
        }

        let classes = BotClasses::resolve(hierarchy)?;
        let mut bots = Vec::with_capacity(count);
        for index in 0..count {
            let bot = Bot {
                controller: ObjectId::new(),
                pawn: ObjectId::new(),
                player_state: ObjectId::new(),
                connection: ConnectionId::new(),
                radius: extent * (index + 1) as f64 / count as f64,
                angle: TAU * index as f64 / count as f64,
            };
            let position = bot.position();

            router.add_object(
                ObjectDescriptor::new(classes.controller)
                    .with_id(bot.controller)
                    .controller()
                    .at(position),
            );
            router.add_connection(bot.connection, Some(bot.controller));
            router.add_object(
                ObjectDescriptor::new(classes.pawn)
                    .with_id(bot.pawn)
                    .with_owner(bot.controller)
                    .at(position),
            );
            router.add_object(
                ObjectDescriptor::new(classes.player_state)
                    .with_id(bot.player_state)
                    .with_owner(bot.controller),
            );
            router.set_team(bot.controller, TeamTag::new(TEAMS[index % TEAMS.len()]));

            debug!("Bot {} joined on connection {}", index, bot.connection);
            bots.push(bot);
        }

        info!("🤖 Spawned {} bots within {:.0} units of the origin", count, extent);
        Ok(Self { bots, speed })
    }

    /// Advances every bot along its orbit by `dt` seconds.
    pub fn step(&mut self, router: &mut RoutingContext, dt: f64) {
        for bot in &mut self.bots {
            bot.angle = (bot.angle + self.speed * dt / bot.radius) % TAU;
            let position = bot.position();
            router.set_object_position(bot.pawn, position);
            router.set_object_position(bot.controller, position);
        }
    }

    /// Disconnects every bot and removes its objects.
    pub fn despawn(&mut self, router: &mut RoutingContext) {
        for bot in self.bots.drain(..) {
            router.remove_connection(bot.connection);
            router.remove_object(bot.pawn);
            router.remove_object(bot.player_state);
            router.remove_object(bot.controller);
        }
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.bots.iter().map(|bot| bot.connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_relevancy::{engine_base_classes, RelevancyConfig, RouteTarget};

    fn router() -> (ClassHierarchy, RoutingContext) {
        let hierarchy = ClassHierarchy::from_descriptors(engine_base_classes()).unwrap();
        let router = RoutingContext::new(&hierarchy, RelevancyConfig::default()).unwrap();
        (hierarchy, router)
    }

    #[test]
    fn test_bots_join_alternating_teams() {
        let (hierarchy, mut router) = router();
        let swarm = BotSwarm::spawn(&mut router, &hierarchy, 4, 10000.0, 600.0).unwrap();
        router.prepare_for_replication();

        assert_eq!(swarm.len(), 4);
        assert_eq!(router.connection_count(), 4);
        assert_eq!(router.teams().members(&TeamTag::new("red")).len(), 2);
        assert_eq!(router.teams().members(&TeamTag::new("blue")).len(), 2);

        for connection in swarm.connections() {
            let relevant = router.gather(connection);
            assert_eq!(relevant.always_relevant.len(), 4, "every player state is global");
            assert_eq!(relevant.owner.len(), 1, "own controller");
        }
    }

    #[test]
    fn test_step_moves_pawns() {
        let (hierarchy, mut router) = router();
        let mut swarm = BotSwarm::spawn(&mut router, &hierarchy, 1, 10000.0, 1000.0).unwrap();
        let pawn = swarm.bots[0].pawn;
        let before = router.object(pawn).unwrap().position;

        swarm.step(&mut router, 1.0);
        let after = router.object(pawn).unwrap().position;
        assert!(before.distance_squared(after) > 0.0);
        assert_eq!(
            router.route_of(pawn),
            Some(RouteTarget::Spatial(horizon_relevancy::SpatialMode::Dynamic))
        );
    }

    #[test]
    fn test_despawn_clears_router() {
        let (hierarchy, mut router) = router();
        let mut swarm = BotSwarm::spawn(&mut router, &hierarchy, 3, 5000.0, 600.0).unwrap();
        router.prepare_for_replication();

        swarm.despawn(&mut router);
        assert!(swarm.is_empty());
        assert_eq!(router.connection_count(), 0);
        assert_eq!(router.object_count(), 0);
        assert_eq!(router.teams().team_count(), 0);
    }

    #[test]
    fn test_zero_bots_needs_no_classes() {
        let (_, mut router) = router();
        let hierarchy = ClassHierarchy::new();
        let swarm = BotSwarm::spawn(&mut router, &hierarchy, 0, 5000.0, 600.0).unwrap();
        assert!(swarm.is_empty());
    }
}
