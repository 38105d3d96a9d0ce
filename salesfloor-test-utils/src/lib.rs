//! Sales Floor Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for entity types
//! - A scripted quote upstream
//! - Fixtures for common floor scenarios

pub use salesfloor_storage::InMemoryFloorStore;

pub use salesfloor_core::{
    new_entity_id, Agent, Break, BreakSchedule, BreakType, Disposition, EntityId, Message,
    MessageAuthor, PassUp, Period, Quote, QuoteSource, RebuttalValue, Rebuttals, TieBreak,
    Timestamp, UpstreamError,
};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// SCRIPTED QUOTE UPSTREAM
// ============================================================================

/// Quote upstream that replays a queue of canned outcomes.
///
/// Once the script runs out every call fails with `Unavailable`.
#[derive(Debug, Default)]
pub struct ScriptedQuoteSource {
    script: Mutex<VecDeque<Result<Quote, UpstreamError>>>,
    calls: AtomicUsize,
}

impl ScriptedQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn then_ok(self, quote: Quote) -> Self {
        self.push(Ok(quote));
        self
    }

    /// Queue a failure.
    pub fn then_err(self, err: UpstreamError) -> Self {
        self.push(Err(err));
        self
    }

    pub fn push(&self, outcome: Result<Quote, UpstreamError>) {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(outcome);
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for ScriptedQuoteSource {
    async fn fetch(&self, _symbol: &str, _now: Timestamp) -> Result<Quote, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| {
                Err(UpstreamError::Unavailable {
                    reason: "script exhausted".to_string(),
                })
            })
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating sales floor entity types.

    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate a Timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_break_type() -> impl Strategy<Value = BreakType> {
        prop::sample::select(BreakType::ALL.to_vec())
    }

    pub fn arb_disposition() -> impl Strategy<Value = Disposition> {
        prop::sample::select(Disposition::ALL.to_vec())
    }

    pub fn arb_period() -> impl Strategy<Value = Period> {
        prop_oneof![
            Just(Period::Daily),
            Just(Period::Weekly),
            Just(Period::Monthly),
        ]
    }

    pub fn arb_tie_break() -> impl Strategy<Value = TieBreak> {
        prop_oneof![
            Just(TieBreak::Full),
            Just(TieBreak::Total),
            Just(TieBreak::Temperature),
        ]
    }

    /// A trimmed, non-empty agent name.
    pub fn arb_agent_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{2,11}"
    }

    pub fn arb_agent() -> impl Strategy<Value = Agent> {
        (arb_uuid(), arb_agent_name(), arb_timestamp()).prop_map(|(id, name, at)| Agent {
            id,
            name,
            custom_script: None,
            created_at: at,
            updated_at: at,
        })
    }

    pub fn arb_rebuttal_value() -> impl Strategy<Value = RebuttalValue> {
        prop_oneof![
            any::<bool>().prop_map(RebuttalValue::Bool),
            any::<i64>().prop_map(RebuttalValue::Integer),
            "[a-z ]{0,16}".prop_map(RebuttalValue::Text),
            Just(RebuttalValue::Null),
        ]
    }

    pub fn arb_rebuttals() -> impl Strategy<Value = Rebuttals> {
        prop::collection::btree_map("[a-z]{1,8}", arb_rebuttal_value(), 0..4)
    }

    /// A pass-up for `agent_id` dated at an arbitrary timestamp.
    pub fn arb_pass_up_for(agent_id: EntityId) -> impl Strategy<Value = PassUp> {
        (
            arb_uuid(),
            "[A-Z]{1,5}",
            arb_disposition(),
            arb_rebuttals(),
            any::<bool>(),
            arb_timestamp(),
        )
            .prop_map(move |(id, ticker, disposition, rebuttals, sms, date)| PassUp {
                id,
                agent_id,
                ticker,
                ticker_price: None,
                lead_name: "Lead".to_string(),
                interested_in: "calls".to_string(),
                agreed_to_sms: sms,
                disposition,
                rebuttals,
                notes: None,
                date,
                created_at: date,
                updated_at: date,
            })
    }

    /// Agents plus a batch of pass-ups attributed to them.
    pub fn arb_floor(max_agents: usize) -> impl Strategy<Value = (Vec<Agent>, Vec<PassUp>)> {
        prop::collection::vec(arb_agent(), 1..=max_agents.max(1)).prop_flat_map(|agents| {
            let ids: Vec<EntityId> = agents.iter().map(|a| a.id).collect();
            let pass_ups = prop::collection::vec(
                (prop::sample::select(ids), arb_disposition()),
                0..40,
            );
            (Just(agents), pass_ups).prop_map(|(agents, picks)| {
                let now = Utc::now();
                let pass_ups = picks
                    .into_iter()
                    .map(|(agent_id, disposition)| fixtures::pass_up(agent_id, disposition, now))
                    .collect();
                (agents, pass_ups)
            })
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common floor scenarios.

    use super::*;

    pub fn agent(name: &str) -> Agent {
        let now = Utc::now();
        Agent {
            id: new_entity_id(),
            name: name.to_string(),
            custom_script: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn pass_up(agent_id: EntityId, disposition: Disposition, date: Timestamp) -> PassUp {
        PassUp {
            id: new_entity_id(),
            agent_id,
            ticker: "QTZM".to_string(),
            ticker_price: Some("4.20".to_string()),
            lead_name: "Jordan Lee".to_string(),
            interested_in: "covered calls".to_string(),
            agreed_to_sms: false,
            disposition,
            rebuttals: BTreeMap::new(),
            notes: None,
            date,
            created_at: date,
            updated_at: date,
        }
    }

    pub fn closed_break(
        agent_id: EntityId,
        break_type: BreakType,
        start: Timestamp,
        minutes: i64,
    ) -> Break {
        Break {
            id: new_entity_id(),
            agent_id,
            break_type,
            start_time: start,
            end_time: Some(start + chrono::TimeDelta::minutes(minutes)),
            missed: None,
        }
    }

    /// A fresh quote as the upstream would produce it.
    pub fn quote(symbol: &str, price: f64, previous_close: f64, at: Timestamp) -> Quote {
        let change = salesfloor_core::round_cents(price - previous_close);
        let change_percent = if previous_close != 0.0 {
            salesfloor_core::round_cents(change / previous_close * 100.0)
        } else {
            0.0
        };
        Quote {
            symbol: symbol.to_string(),
            price,
            change,
            change_percent,
            previous_close,
            timestamp: at,
            stale: false,
        }
    }

    /// An in-memory store seeded with the named agents.
    pub async fn store_with_agents(names: &[&str]) -> (InMemoryFloorStore, Vec<Agent>) {
        use salesfloor_storage::FloorStore;

        let store = InMemoryFloorStore::new();
        let mut agents = Vec::with_capacity(names.len());
        for name in names {
            if let Ok(agent) = store.agent_upsert_by_name(&agent(name)).await {
                agents.push(agent);
            }
        }
        (store, agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_source_replays_then_fails() {
        let now = Utc::now();
        let source = ScriptedQuoteSource::new()
            .then_ok(fixtures::quote("QTZM", 5.0, 4.0, now))
            .then_err(UpstreamError::BadStatus { status: 502 });

        assert!(source.fetch("QTZM", now).await.is_ok());
        assert!(matches!(
            source.fetch("QTZM", now).await,
            Err(UpstreamError::BadStatus { status: 502 })
        ));
        assert!(matches!(
            source.fetch("QTZM", now).await,
            Err(UpstreamError::Unavailable { .. })
        ));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_store_with_agents() {
        let (_store, agents) = fixtures::store_with_agents(&["Neon", "Argon"]).await;
        assert_eq!(agents.len(), 2);
    }
}
