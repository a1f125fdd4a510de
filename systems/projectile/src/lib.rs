#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Short ballistic flights of thrown consumables.
//!
//! Each local session owns at most one flight. A flight is accepted, waits
//! for its launch delay, then counts down its fixed duration before landing
//! exactly once.

use std::collections::HashMap;

use wildlife_sync_core::{
    ActorPose, AreaName, PeerId, SessionContext, SessionId, ThrowVariant, TileCoord, WorldPoint,
};

/// Ticks between launch and landing.
pub const FLIGHT_TICKS: u32 = 48;

/// Downward acceleration in pixels per tick squared.
pub const GRAVITY: f32 = 0.2;

/// Vertical offset from the actor's standing point to the release point.
pub const RELEASE_OFFSET_Y: f32 = -32.0;

/// Ticks between acceptance and launch, leaving one frame to show the new facing.
pub const LAUNCH_DELAY_TICKS: u32 = 1;

/// Trajectory tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightConfig {
    ticks: u32,
    gravity: f32,
    release_offset_y: f32,
    launch_delay: u32,
}

impl FlightConfig {
    /// Creates a new flight configuration. Durations below one tick are raised to one.
    #[must_use]
    pub const fn new(ticks: u32, gravity: f32, release_offset_y: f32, launch_delay: u32) -> Self {
        Self {
            ticks: if ticks == 0 { 1 } else { ticks },
            gravity,
            release_offset_y,
            launch_delay,
        }
    }

    /// Ticks between launch and landing.
    #[must_use]
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Downward acceleration.
    #[must_use]
    pub const fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Ticks between acceptance and launch.
    #[must_use]
    pub const fn launch_delay(&self) -> u32 {
        self.launch_delay
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self::new(FLIGHT_TICKS, GRAVITY, RELEASE_OFFSET_Y, LAUNCH_DELAY_TICKS)
    }
}

/// Everything needed to start a flight.
#[derive(Clone, Debug, PartialEq)]
pub struct ThrowRequest {
    /// Area the throw happens in.
    pub area: AreaName,
    /// Pose of the throwing actor at acceptance.
    pub actor: ActorPose,
    /// Tile the consumable is aimed at.
    pub target: TileCoord,
    /// Kind of consumable thrown.
    pub variant: ThrowVariant,
}

/// Result of a throw attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrowOutcome {
    /// A new flight was created.
    Accepted {
        /// Ticks until the flight lands, launch delay included.
        ticks_until_landing: u32,
    },
    /// The session already has a live flight; nothing changed and no item is consumed.
    AlreadyInFlight,
    /// The target tile is off the map or not water; nothing was thrown.
    NotWater,
}

/// Live flight owned by one session.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightState {
    /// Session that threw.
    pub owner: SessionId,
    /// Peer controlling the owning session.
    pub peer: PeerId,
    /// Throw that started the flight.
    pub request: ThrowRequest,
    /// Release point.
    pub start: WorldPoint,
    /// Landing point.
    pub landing: WorldPoint,
    /// Initial velocity in pixels per tick.
    pub velocity: (f32, f32),
    /// Constant acceleration in pixels per tick squared.
    pub acceleration: (f32, f32),
    /// Ticks left before launch.
    pub launch_in: u32,
    /// Ticks left in the air after launch.
    pub ticks_remaining: u32,
    total_ticks: u32,
}

impl FlightState {
    /// Position after `elapsed` ticks of flight, evaluated in closed form.
    #[must_use]
    pub fn position_at(&self, elapsed: u32) -> WorldPoint {
        let t = elapsed.min(self.total_ticks) as f32;
        WorldPoint::new(
            self.start.x() + self.velocity.0 * t + 0.5 * self.acceleration.0 * t * t,
            self.start.y() + self.velocity.1 * t + 0.5 * self.acceleration.1 * t * t,
        )
    }

    /// Current position of the projectile.
    #[must_use]
    pub fn position(&self) -> WorldPoint {
        self.position_at(self.total_ticks - self.ticks_remaining)
    }

    /// Whether the launch delay has elapsed.
    #[must_use]
    pub const fn launched(&self) -> bool {
        self.launch_in == 0
    }
}

/// Flight that has just landed.
#[derive(Clone, Debug, PartialEq)]
pub struct Landing {
    /// Session that threw.
    pub session: SessionId,
    /// Peer controlling the session.
    pub peer: PeerId,
    /// Area the flight happened in.
    pub area: AreaName,
    /// Landing point.
    pub point: WorldPoint,
    /// Targeted tile.
    pub tile: TileCoord,
    /// Pose of the actor recorded at acceptance.
    pub actor: ActorPose,
    /// Kind of consumable thrown.
    pub variant: ThrowVariant,
}

/// Per-session flight simulator.
#[derive(Debug, Default)]
pub struct ProjectileSimulator {
    config: FlightConfig,
    flights: HashMap<SessionId, FlightState>,
}

impl ProjectileSimulator {
    /// Creates a simulator with the provided trajectory configuration.
    #[must_use]
    pub fn new(config: FlightConfig) -> Self {
        Self {
            config,
            flights: HashMap::new(),
        }
    }

    /// Starts a flight for the session unless one is already live.
    pub fn throw(&mut self, ctx: &SessionContext, request: ThrowRequest) -> ThrowOutcome {
        if self.flights.contains_key(&ctx.session) {
            log::debug!(
                "throw by {} in '{}' rejected: session {} already has a flight",
                ctx.peer,
                request.area,
                ctx.session.get()
            );
            return ThrowOutcome::AlreadyInFlight;
        }

        let ticks = self.config.ticks;
        let duration = ticks as f32;
        let gravity = self.config.gravity;
        let start = request
            .actor
            .standing_point()
            .offset(0.0, self.config.release_offset_y);
        let landing = request.target.center();
        let dx = landing.x() - start.x();
        let dy = landing.y() - start.y();
        let velocity = (
            dx / duration,
            (dy - 0.5 * gravity * duration * duration) / duration,
        );

        log::debug!(
            "{} throws {:?} toward {:?} in '{}'",
            ctx.peer,
            request.variant,
            request.target,
            request.area
        );
        let _ = self.flights.insert(
            ctx.session,
            FlightState {
                owner: ctx.session,
                peer: ctx.peer,
                request,
                start,
                landing,
                velocity,
                acceleration: (0.0, gravity),
                launch_in: self.config.launch_delay,
                ticks_remaining: ticks,
                total_ticks: ticks,
            },
        );

        ThrowOutcome::Accepted {
            ticks_until_landing: self.config.launch_delay + ticks,
        }
    }

    /// Whether the session's flag is taken.
    #[must_use]
    pub fn is_in_flight(&self, session: SessionId) -> bool {
        self.flights.contains_key(&session)
    }

    /// Live flight of the session.
    #[must_use]
    pub fn flight(&self, session: SessionId) -> Option<&FlightState> {
        self.flights.get(&session)
    }

    /// Sessions with a live flight, in ascending order.
    #[must_use]
    pub fn sessions(&self) -> Vec<SessionId> {
        let mut sessions: Vec<SessionId> = self.flights.keys().copied().collect();
        sessions.sort();
        sessions
    }

    /// Advances the session's flight by one tick.
    ///
    /// When the flight lands, `resolve` receives the landing exactly once and
    /// the session's flag is cleared whatever `resolve` returns.
    pub fn advance<T, F>(&mut self, session: SessionId, resolve: F) -> Option<T>
    where
        F: FnOnce(&Landing) -> T,
    {
        let flight = self.flights.get_mut(&session)?;
        if flight.launch_in > 0 {
            flight.launch_in -= 1;
            if flight.launch_in == 0 {
                log::trace!("session {} launched", session.get());
            }
            return None;
        }

        flight.ticks_remaining = flight.ticks_remaining.saturating_sub(1);
        if flight.ticks_remaining > 0 {
            return None;
        }

        let flight = self.flights.remove(&session)?;
        let landing = Landing {
            session,
            peer: flight.peer,
            area: flight.request.area,
            point: flight.landing,
            tile: flight.request.target,
            actor: flight.request.actor,
            variant: flight.request.variant,
        };
        log::debug!("flight of {} landed at {:?}", landing.peer, landing.tile);
        Some(resolve(&landing))
    }

    /// Advances the session's flight, returning the landing when it happens.
    pub fn tick(&mut self, session: SessionId) -> Option<Landing> {
        self.advance(session, Landing::clone)
    }
}
