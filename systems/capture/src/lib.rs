#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Radius-based capture at a landing point.
//!
//! The collaborator only knows how to capture from an actor standing right
//! next to its target. The resolver stages the actor beside the matched
//! entity, runs the collaborator's capture as that actor, and puts
//! everything back afterwards.

use wildlife_sync_core::{
    host::{ActorHost, EntityRegistry},
    ActorPose, AreaName, EntityId, EntitySnapshot, Facing, HostError, InputMode, SessionContext,
    ThrowVariant, WorldPoint, TILE_SIZE,
};

/// Catch radius for mouse input, in tiles.
pub const MOUSE_RADIUS_TILES: f32 = 0.3;

/// Catch radius for gamepad input, in tiles.
pub const GAMEPAD_RADIUS_TILES: f32 = 0.7;

/// Multiplier applied to the radius of boosted throws.
pub const BOOSTED_RADIUS_FACTOR: f32 = 2.5;

/// Distance between the staged actor and the matched entity, in pixels.
pub const BACKOFF_DISTANCE: f32 = 1.5 * TILE_SIZE;

/// Capture radii and staging distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureConfig {
    mouse_radius: f32,
    gamepad_radius: f32,
    boosted_factor: f32,
    backoff_distance: f32,
}

impl CaptureConfig {
    /// Creates a configuration from pixel radii.
    #[must_use]
    pub const fn new(
        mouse_radius: f32,
        gamepad_radius: f32,
        boosted_factor: f32,
        backoff_distance: f32,
    ) -> Self {
        Self {
            mouse_radius,
            gamepad_radius,
            boosted_factor,
            backoff_distance,
        }
    }

    /// Catch radius in pixels for an input mode and throw variant.
    #[must_use]
    pub fn radius(&self, input_mode: InputMode, variant: ThrowVariant) -> f32 {
        let base = match input_mode {
            InputMode::Mouse => self.mouse_radius,
            InputMode::Gamepad => self.gamepad_radius,
        };
        match variant {
            ThrowVariant::Standard => base,
            ThrowVariant::Boosted => base * self.boosted_factor,
        }
    }

    /// Distance the staged actor keeps from the entity.
    #[must_use]
    pub const fn backoff_distance(&self) -> f32 {
        self.backoff_distance
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::new(
            MOUSE_RADIUS_TILES * TILE_SIZE,
            GAMEPAD_RADIUS_TILES * TILE_SIZE,
            BOOSTED_RADIUS_FACTOR,
            BACKOFF_DISTANCE,
        )
    }
}

/// Resolves captures at landing points.
#[derive(Debug, Default)]
pub struct CaptureResolver {
    config: CaptureConfig,
}

impl CaptureResolver {
    /// Creates a resolver with the provided configuration.
    #[must_use]
    pub const fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Configuration the resolver runs with.
    #[must_use]
    pub const fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// First live entity of `area`, in registry order, within `radius` of `point`.
    #[must_use]
    pub fn find_target<R>(
        registry: &R,
        area: &AreaName,
        point: WorldPoint,
        radius: f32,
    ) -> Option<EntitySnapshot>
    where
        R: EntityRegistry + ?Sized,
    {
        registry.entities().into_iter().find(|entity| {
            !entity.released
                && entity.area.as_ref().is_some_and(|other| other.matches(area))
                && entity.position.distance(point) <= radius
        })
    }

    /// Attempts a capture at `point` on behalf of the session's actor.
    ///
    /// Returns the captured entity, or `None` when nothing is in range. The
    /// actor's pose and the current-actor slot are restored on every path.
    pub fn resolve<H>(
        &self,
        ctx: &SessionContext,
        area: &AreaName,
        point: WorldPoint,
        variant: ThrowVariant,
        host: &mut H,
    ) -> Result<Option<EntityId>, HostError>
    where
        H: EntityRegistry + ActorHost + ?Sized,
    {
        let radius = self.config.radius(ctx.input_mode, variant);
        let Some(target) = Self::find_target(&*host, area, point, radius) else {
            log::debug!("no entity of '{area}' within {radius:.1}px of {point:?}");
            return Ok(None);
        };

        let peer = ctx.peer;
        let saved = host.actor_pose(peer).ok_or(HostError::MissingActor(peer))?;
        let facing = Facing::toward_tile(saved.standing_point(), target.position.tile());
        let (dx, dy) = facing.backoff(self.config.backoff_distance);
        let staged = ActorPose {
            position: target.position.offset(dx, dy),
            facing,
        };

        host.set_actor_pose(peer, staged);
        let previous = host.replace_current_actor(peer);
        let result = host.try_capture(peer);
        let _ = host.replace_current_actor(previous);
        host.set_actor_pose(peer, saved);

        match result {
            Ok(()) => {
                log::info!(
                    "{peer} captured {:?} ('{}') in '{area}'",
                    target.id,
                    target.key
                );
                Ok(Some(target.id))
            }
            Err(error) => {
                log::warn!(
                    "capture of {:?} ('{}') by {peer} in '{area}' failed: {error}",
                    target.id,
                    target.key
                );
                Err(error)
            }
        }
    }
}
