//! Play session adapter
//!
//! Front-ends (terminal, HTTP) talk to a [`GameSession`] rather than the
//! engine directly. The session owns the guess history and the raw-input
//! policy; grading stays in [`RoundEngine`].

use crate::{Country, GuessResult, Region, Result, RoundEngine};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// One rendered history line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessEntry {
    pub result: GuessResult,
    pub text: String,
    /// Correct answers are displayed emphasized
    pub emphasized: bool,
}

impl GuessEntry {
    pub fn new(result: GuessResult) -> Self {
        let text = render(&result);
        let emphasized = result.is_correct();
        Self {
            result,
            text,
            emphasized,
        }
    }
}

impl fmt::Display for GuessEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn render(result: &GuessResult) -> String {
    match result {
        GuessResult::Correct { name } => format!("Correct! It was {}", name),
        GuessResult::Incomplete {
            name,
            continent_match,
            distance_km,
            direction,
        } => format!(
            "{} - Continent: {}, Distance: {} km, Direction: {}",
            name,
            if *continent_match { "yes" } else { "no" },
            distance_km,
            direction
        ),
    }
}

/// A single player's game: the engine plus its append-only history
#[derive(Debug)]
pub struct GameSession<R = StdRng> {
    countries: Arc<[Country]>,
    engine: RoundEngine<R>,
    history: Vec<GuessEntry>,
}

impl<R: Rng> GameSession<R> {
    pub fn new(countries: Arc<[Country]>, engine: RoundEngine<R>) -> Self {
        Self {
            countries,
            engine,
            history: Vec::new(),
        }
    }

    /// Start a round in `region`, discarding the previous round and history
    ///
    /// On error the previous round and history are kept.
    pub fn start(&mut self, region: Region) -> Result<()> {
        self.engine.start_round(&self.countries, &region)?;
        self.history.clear();
        info!("New round in {} ({} candidates)", region, self.engine.pool().len());
        Ok(())
    }

    /// Start over in the current region (World if none yet)
    pub fn restart(&mut self) -> Result<()> {
        let region = self.engine.region().cloned().unwrap_or_default();
        self.start(region)
    }

    /// Submit raw player input
    ///
    /// Empty input and names outside the pool are ignored and return
    /// `Ok(None)` without touching the history.
    pub fn submit(&mut self, raw: &str) -> Result<Option<&GuessEntry>> {
        let name = raw.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let Some(result) = self.engine.evaluate(name)? else {
            return Ok(None);
        };

        self.history.push(GuessEntry::new(result));
        Ok(self.history.last())
    }

    pub fn history(&self) -> &[GuessEntry] {
        &self.history
    }

    /// Whether the latest guess was correct
    pub fn is_solved(&self) -> bool {
        self.history.last().is_some_and(|e| e.result.is_correct())
    }

    pub fn candidates(&self) -> Vec<&str> {
        self.engine.candidate_names()
    }

    pub fn region(&self) -> Option<&Region> {
        self.engine.region()
    }

    pub fn engine(&self) -> &RoundEngine<R> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{first_pick_engine, sample_countries};
    use crate::{Compass, GameError};
    use rand::rngs::mock::StepRng;

    fn session() -> GameSession<StepRng> {
        let mut session = GameSession::new(sample_countries().into(), first_pick_engine());
        session.start(Region::World).unwrap();
        session
    }

    #[test]
    fn test_incomplete_line() {
        let mut session = session();
        let entry = session.submit("Germany").unwrap().unwrap();
        assert_eq!(
            entry.text,
            "Germany - Continent: yes, Distance: 818 km, Direction: SW"
        );
        assert!(!entry.emphasized);
    }

    #[test]
    fn test_correct_line_emphasized() {
        let mut session = session();
        let entry = session.submit("  France ").unwrap().unwrap().clone();
        assert_eq!(entry.to_string(), "Correct! It was France");
        assert!(entry.emphasized);
        assert!(session.is_solved());
    }

    #[test]
    fn test_ignored_input_leaves_history() {
        let mut session = session();
        session.submit("Japan").unwrap();

        assert!(session.submit("").unwrap().is_none());
        assert!(session.submit("   ").unwrap().is_none());
        assert!(session.submit("Narnia").unwrap().is_none());
        assert!(session.submit("france").unwrap().is_none());
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_solved());
    }

    #[test]
    fn test_history_is_ordered() {
        let mut session = session();
        session.submit("Japan").unwrap();
        session.submit("Brazil").unwrap();
        session.submit("France").unwrap();

        let names: Vec<&str> = session
            .history()
            .iter()
            .map(|e| match &e.result {
                GuessResult::Correct { name } | GuessResult::Incomplete { name, .. } => {
                    name.as_str()
                }
            })
            .collect();
        assert_eq!(names, vec!["Japan", "Brazil", "France"]);
    }

    #[test]
    fn test_region_change_clears_history() {
        let mut session = session();
        session.submit("Germany").unwrap();

        session.start(Region::Continent("Asia".into())).unwrap();
        assert!(session.history().is_empty());
        assert_eq!(session.candidates(), vec!["Japan"]);
        assert_eq!(session.region(), Some(&Region::Continent("Asia".into())));
    }

    #[test]
    fn test_failed_region_change_keeps_game() {
        let mut session = session();
        session.submit("Germany").unwrap();

        let err = session.start(Region::Continent("Oceania".into())).unwrap_err();
        assert!(matches!(err, GameError::EmptyPool(_)));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.region(), Some(&Region::World));
    }

    #[test]
    fn test_restart_keeps_region() {
        let mut session = session();
        session.start(Region::Continent("Europe".into())).unwrap();
        session.submit("Germany").unwrap();

        session.restart().unwrap();
        assert!(session.history().is_empty());
        assert_eq!(session.candidates(), vec!["France", "Germany"]);
    }

    #[test]
    fn test_submit_before_start() {
        let mut session = GameSession::new(sample_countries().into(), first_pick_engine());
        assert!(matches!(
            session.submit("France"),
            Err(GameError::NoActiveRound)
        ));
        session.restart().unwrap();
        assert_eq!(session.region(), Some(&Region::World));
    }

    #[test]
    fn test_entry_json() {
        let entry = GuessEntry::new(GuessResult::Incomplete {
            name: "Japan".into(),
            continent_match: false,
            distance_km: 9712,
            direction: Compass::NW,
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["result"]["kind"], "incomplete");
        assert_eq!(value["emphasized"], false);
        assert_eq!(
            value["text"],
            "Japan - Continent: no, Distance: 9712 km, Direction: NW"
        );
    }
}
