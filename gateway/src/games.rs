//! In-memory game registry
//!
//! Each browser game is an independent [`GameSession`] keyed by UUID. The
//! dataset is loaded once and shared read-only. Games idle longer than the
//! TTL are swept, and the registry never holds more than `max_games`.

use chrono::{DateTime, Duration, Utc};
use round_engine::{Country, GameSession, Region, RoundEngine};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::{GatewayConfig, DEFAULT_GAME_TTL_SECS, DEFAULT_MAX_GAMES};

/// Longest sweep period, even for long TTLs
const MAX_SWEEP_SECS: u64 = 60;

pub struct GameRecord {
    pub session: GameSession,
    pub created_at: DateTime<Utc>,
    /// Last create, guess, or round change
    pub last_active: DateTime<Utc>,
}

impl GameRecord {
    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_active >= ttl
    }
}

/// Registry bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameLimits {
    pub ttl: Duration,
    pub max_games: usize,
}

impl GameLimits {
    pub fn new(ttl_secs: u64, max_games: usize) -> Self {
        // chrono::Duration::seconds panics past ~292 million years
        let ttl_secs = ttl_secs.min(i32::MAX as u64) as i64;
        Self {
            ttl: Duration::seconds(ttl_secs),
            max_games: max_games.max(1),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.game_ttl_secs, config.max_games)
    }

    /// How often the background sweeper runs
    pub fn sweep_period(&self) -> std::time::Duration {
        let secs = self.ttl.num_seconds().clamp(1, MAX_SWEEP_SECS as i64) as u64;
        std::time::Duration::from_secs(secs)
    }
}

impl Default for GameLimits {
    fn default() -> Self {
        Self::new(DEFAULT_GAME_TTL_SECS, DEFAULT_MAX_GAMES)
    }
}

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    pub countries: Arc<[Country]>,
    pub games: Arc<RwLock<HashMap<Uuid, GameRecord>>>,
    pub limits: GameLimits,
}

impl AppState {
    pub fn new(countries: Vec<Country>) -> Self {
        Self {
            countries: countries.into(),
            games: Arc::new(RwLock::new(HashMap::new())),
            limits: GameLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: GameLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Start a session in `region` and register it
    ///
    /// Expired games are dropped first; at the cap, the least recently
    /// active game makes room.
    pub async fn create_game(&self, region: Region) -> round_engine::Result<Uuid> {
        let mut session = GameSession::new(self.countries.clone(), RoundEngine::new());
        session.start(region)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let record = GameRecord {
            session,
            created_at: now,
            last_active: now,
        };

        let mut games = self.games.write().await;
        let expired = expire(&mut games, now, self.limits.ttl);
        let evicted = make_room(&mut games, self.limits.max_games);
        if expired + evicted > 0 {
            tracing::debug!("Dropped {} expired and {} idle games", expired, evicted);
        }
        games.insert(id, record);

        Ok(id)
    }

    /// Drop games idle past the TTL, returning how many were removed
    pub async fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut games = self.games.write().await;
        expire(&mut games, now, self.limits.ttl)
    }

    pub async fn game_count(&self) -> usize {
        self.games.read().await.len()
    }

    /// Periodically prune expired games for the life of the process
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let period = self.limits.sweep_period();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let removed = state.prune(Utc::now()).await;
                if removed > 0 {
                    tracing::info!("Swept {} expired games", removed);
                }
            }
        })
    }
}

fn expire(games: &mut HashMap<Uuid, GameRecord>, now: DateTime<Utc>, ttl: Duration) -> usize {
    let before = games.len();
    games.retain(|_, record| !record.is_expired(now, ttl));
    before - games.len()
}

/// Evict least recently active games until one more fits under `max_games`
fn make_room(games: &mut HashMap<Uuid, GameRecord>, max_games: usize) -> usize {
    let mut evicted = 0;
    while games.len() >= max_games {
        let oldest = games
            .iter()
            .min_by_key(|(_, record)| record.last_active)
            .map(|(id, _)| *id);
        match oldest {
            Some(id) => {
                games.remove(&id);
                evicted += 1;
            }
            None => break,
        }
    }
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;
    use round_engine::GameError;

    fn state() -> AppState {
        AppState::new(vec![
            Country::new("France", "Europe", 46.2, 2.2),
            Country::new("Australia", "Oceania", -25.3, 133.8),
        ])
    }

    async fn backdate(state: &AppState, id: Uuid, secs: i64) {
        let mut games = state.games.write().await;
        let record = games.get_mut(&id).unwrap();
        record.last_active = Utc::now() - Duration::seconds(secs);
    }

    #[tokio::test]
    async fn test_create_game_registers_session() {
        let state = state();
        let id = state.create_game(Region::Continent("Oceania".into())).await.unwrap();

        let games = state.games.read().await;
        let record = games.get(&id).unwrap();
        assert_eq!(record.session.candidates(), vec!["Australia"]);
        assert_eq!(
            record.session.engine().target().map(|c| c.name.as_str()),
            Some("Australia")
        );
        assert_eq!(record.created_at, record.last_active);
    }

    #[tokio::test]
    async fn test_empty_region_not_registered() {
        let state = state();
        let err = state
            .create_game(Region::Continent("Asia".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::EmptyPool(_)));
        assert_eq!(state.game_count().await, 0);
    }

    #[tokio::test]
    async fn test_games_are_independent() {
        let state = state();
        let a = state.create_game(Region::World).await.unwrap();
        let b = state.create_game(Region::Continent("Europe".into())).await.unwrap();
        assert_ne!(a, b);

        let mut games = state.games.write().await;
        games.get_mut(&b).unwrap().session.submit("France").unwrap();
        assert_eq!(games[&b].session.history().len(), 1);
        assert!(games[&a].session.history().is_empty());
    }

    #[tokio::test]
    async fn test_prune_drops_idle_games() {
        let state = state().with_limits(GameLimits::new(600, 100));
        let idle = state.create_game(Region::World).await.unwrap();
        let fresh = state.create_game(Region::World).await.unwrap();
        backdate(&state, idle, 601).await;

        assert_eq!(state.prune(Utc::now()).await, 1);
        let games = state.games.read().await;
        assert!(!games.contains_key(&idle));
        assert!(games.contains_key(&fresh));
    }

    #[tokio::test]
    async fn test_create_game_expires_idle_games() {
        let state = state().with_limits(GameLimits::new(600, 100));
        let idle = state.create_game(Region::World).await.unwrap();
        backdate(&state, idle, 3600).await;

        state.create_game(Region::World).await.unwrap();
        assert_eq!(state.game_count().await, 1);
        assert!(!state.games.read().await.contains_key(&idle));
    }

    #[tokio::test]
    async fn test_cap_evicts_least_recently_active() {
        let state = state().with_limits(GameLimits::new(3600, 3));
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(state.create_game(Region::World).await.unwrap());
        }
        backdate(&state, ids[0], 30).await;
        backdate(&state, ids[1], 60).await;
        backdate(&state, ids[2], 10).await;

        let newest = state.create_game(Region::World).await.unwrap();
        let games = state.games.read().await;
        assert_eq!(games.len(), 3);
        assert!(!games.contains_key(&ids[1]));
        assert!(games.contains_key(&ids[0]));
        assert!(games.contains_key(&newest));
    }

    #[tokio::test]
    async fn test_registry_stays_bounded() {
        let state = state().with_limits(GameLimits::new(3600, 50));
        for _ in 0..500 {
            state.create_game(Region::World).await.unwrap();
        }
        assert_eq!(state.game_count().await, 50);
    }

    #[tokio::test]
    async fn test_touch_keeps_game_alive() {
        let state = state().with_limits(GameLimits::new(600, 100));
        let id = state.create_game(Region::World).await.unwrap();
        backdate(&state, id, 601).await;

        state.games.write().await.get_mut(&id).unwrap().touch();
        assert_eq!(state.prune(Utc::now()).await, 0);
    }

    #[test]
    fn test_limits() {
        let limits = GameLimits::new(3600, 0);
        assert_eq!(limits.max_games, 1);
        assert_eq!(limits.sweep_period(), std::time::Duration::from_secs(60));
        assert_eq!(
            GameLimits::new(5, 10).sweep_period(),
            std::time::Duration::from_secs(5)
        );
        assert_eq!(GameLimits::new(u64::MAX, 10).ttl, Duration::seconds(i32::MAX as i64));
    }
}
