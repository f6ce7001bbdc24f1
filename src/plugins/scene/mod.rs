//! Scene / game-state director.
//!
//! Gameplay never switches states itself. It writes a [`SceneRequest`]; the
//! director is the single consumer that turns requests into state changes and
//! restart broadcasts.
//!
//! Restart works off an explicit registry instead of scanning the world:
//! spawners call [`Resettables::register`], and every feature plugin resets its
//! own components for registered entities when it sees [`SceneReset`].

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::common::state::GameState;

#[derive(Message, Clone, Debug, PartialEq, Eq)]
pub enum SceneRequest {
    ActivateGameOver,
    RestartCurrentScene,
    LoadScene(String),
}

/// Broadcast: every registered entity should return to its spawn-time state.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct SceneReset;

/// Entities that take part in a restart.
#[derive(Resource, Debug, Default)]
pub struct Resettables {
    entities: Vec<Entity>,
}

impl Resettables {
    pub fn register(&mut self, e: Entity) {
        if !self.entities.contains(&e) {
            self.entities.push(e);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Where a registered entity goes back to on restart.
#[derive(Component, Debug, Clone, Copy)]
pub struct SpawnPoint(pub Vec2);

#[derive(Resource, Debug, Clone)]
pub struct ActiveScene {
    pub name: String,
    pub restarts: u32,
}

impl Default for ActiveScene {
    fn default() -> Self {
        Self {
            name: "arena".into(),
            restarts: 0,
        }
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneSet {
    /// Director consumes requests.
    Direct,
    /// Feature plugins react to `SceneReset`.
    Reset,
}

pub fn plugin(app: &mut App) {
    app.add_message::<SceneRequest>()
        .add_message::<SceneReset>()
        .init_resource::<Resettables>()
        .init_resource::<ActiveScene>();

    app.configure_sets(Update, (SceneSet::Direct, SceneSet::Reset).chain());

    app.add_systems(
        Update,
        (restart_key, handle_scene_requests).chain().in_set(SceneSet::Direct),
    );
    app.add_systems(Update, restore_spawn_points.in_set(SceneSet::Reset));
}

/// `R` restarts from the game-over screen.
fn restart_key(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    state: Res<State<GameState>>,
    mut requests: MessageWriter<SceneRequest>,
) {
    let Some(keys) = keys else { return; };
    if *state.get() == GameState::GameOver && keys.just_pressed(KeyCode::KeyR) {
        requests.write(SceneRequest::RestartCurrentScene);
    }
}

pub fn handle_scene_requests(
    mut requests: MessageReader<SceneRequest>,
    mut next: ResMut<NextState<GameState>>,
    mut active: ResMut<ActiveScene>,
    mut resets: MessageWriter<SceneReset>,
) {
    // Several entities may ask in the same frame; one reset is enough.
    let mut reset = false;
    for req in requests.read() {
        match req {
            SceneRequest::ActivateGameOver => {
                info!("game over");
                next.set(GameState::GameOver);
            }
            SceneRequest::RestartCurrentScene => {
                reset = true;
            }
            SceneRequest::LoadScene(name) => {
                info!("loading scene `{name}`");
                active.name = name.clone();
                reset = true;
            }
        }
    }
    if reset {
        active.restarts += 1;
        info!("restarting `{}` (#{})", active.name, active.restarts);
        resets.write(SceneReset);
        next.set(GameState::InGame);
    }
}

pub fn restore_spawn_points(
    mut resets: MessageReader<SceneReset>,
    registry: Res<Resettables>,
    mut q: Query<(&SpawnPoint, &mut Transform)>,
) {
    if resets.read().count() == 0 {
        return;
    }
    for e in registry.iter() {
        if let Ok((spawn, mut tf)) = q.get_mut(e) {
            tf.translation.x = spawn.0.x;
            tf.translation.y = spawn.0.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::{drain_messages, ensure_messages, run_system_once};

    fn director_world() -> World {
        let mut world = World::new();
        world.init_resource::<NextState<GameState>>();
        world.init_resource::<ActiveScene>();
        ensure_messages::<SceneRequest>(&mut world);
        ensure_messages::<SceneReset>(&mut world);
        world
    }

    #[test]
    fn game_over_request_sets_next_state() {
        let mut world = director_world();
        world.write_message(SceneRequest::ActivateGameOver);
        run_system_once(&mut world, handle_scene_requests);

        assert!(matches!(
            *world.resource::<NextState<GameState>>(),
            NextState::Pending(GameState::GameOver)
        ));
        assert!(drain_messages::<SceneReset>(&mut world).is_empty());
    }

    #[test]
    fn duplicate_restarts_broadcast_one_reset() {
        let mut world = director_world();
        world.write_message(SceneRequest::RestartCurrentScene);
        world.write_message(SceneRequest::LoadScene("caves".into()));
        run_system_once(&mut world, handle_scene_requests);

        assert_eq!(drain_messages::<SceneReset>(&mut world).len(), 1);
        let active = world.resource::<ActiveScene>();
        assert_eq!(active.name, "caves");
        assert_eq!(active.restarts, 1);
    }

    #[test]
    fn registry_ignores_duplicates() {
        let mut reg = Resettables::default();
        let e = World::new().spawn_empty().id();
        reg.register(e);
        reg.register(e);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec![e]);
    }

    #[test]
    fn reset_moves_registered_entities_home() {
        let mut world = World::new();
        ensure_messages::<SceneReset>(&mut world);
        let e = world
            .spawn((SpawnPoint(Vec2::new(10.0, 20.0)), Transform::from_xyz(-300.0, 5.0, 1.0)))
            .id();
        let stray = world
            .spawn((SpawnPoint(Vec2::ZERO), Transform::from_xyz(50.0, 50.0, 1.0)))
            .id();
        let mut reg = Resettables::default();
        reg.register(e);
        world.insert_resource(reg);
        world.write_message(SceneReset);

        run_system_once(&mut world, restore_spawn_points);

        let tf = world.get::<Transform>(e).unwrap();
        assert_eq!(tf.translation, Vec3::new(10.0, 20.0, 1.0));
        assert_eq!(world.get::<Transform>(stray).unwrap().translation.x, 50.0);
    }
}
