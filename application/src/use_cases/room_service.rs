//! Room service
//!
//! The transport-agnostic surface the UI/session layer calls: join a room,
//! submit a profile, start the negotiation, observe it by push or poll.
//!
//! All mutations to one room are serialized through a per-invite-code lock;
//! independent rooms progress concurrently. The orchestrator run is spawned
//! exactly once per session — the state machine's `ready → discussing`
//! transition is the only spawn point, so a repeated start can never race a
//! second run into existence.

use crate::agent::NegotiationAgent;
use crate::config::{DeliverySettings, NegotiationSettings};
use crate::ports::dish_analyzer::{AnalysisError, DishAnalyzer};
use crate::ports::place_lookup::PlaceLookup;
use crate::ports::text_generator::TextGenerator;
use crate::ports::transcript_log::{LogError, TranscriptLog, TranscriptPage};
use crate::stream::SessionFeed;
use crate::use_cases::recommend::RecommendationResolver;
use crate::use_cases::run_negotiation::NegotiationRun;
use council_domain::{
    InviteCode, LogEntry, Participant, Room, RoomError, RoomStatus, RoomStatusSummary, RoomStore,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Failures reported by the session surface.
///
/// Validation, authorization, and protocol errors are synchronous and leave
/// no trace in session state; `PreconditionNotMet` carries the current
/// status so the caller can resynchronize.
#[derive(Error, Debug)]
pub enum SessionApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("precondition not met: session is {current}")]
    PreconditionNotMet { current: RoomStatus },

    #[error("profile submission failed: {0}")]
    Analysis(#[from] AnalysisError),
}

fn map_room_error(err: RoomError, current: RoomStatus) -> SessionApiError {
    match err {
        RoomError::Full { max } => {
            SessionApiError::InvalidInput(format!("room is full ({} participants)", max))
        }
        RoomError::WrongState { current, .. } => SessionApiError::PreconditionNotMet { current },
        RoomError::AlreadyReady(_) => SessionApiError::PreconditionNotMet { current },
        RoomError::UnknownParticipant(id) => {
            SessionApiError::NotAuthorized(format!("participant {} is not in the room", id))
        }
        RoomError::NotAuthorizer => SessionApiError::NotAuthorized(
            "only the first-joined participant may start the discussion".to_string(),
        ),
    }
}

/// Coordinates rooms, profiles, negotiation runs, and transcript delivery.
pub struct RoomService {
    store: Arc<dyn RoomStore>,
    log: Arc<dyn TranscriptLog>,
    generator: Arc<dyn TextGenerator>,
    places: Arc<dyn PlaceLookup>,
    analyzer: Arc<dyn DishAnalyzer>,
    negotiation: NegotiationSettings,
    delivery: DeliverySettings,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RoomService {
    pub fn new(
        store: Arc<dyn RoomStore>,
        log: Arc<dyn TranscriptLog>,
        generator: Arc<dyn TextGenerator>,
        places: Arc<dyn PlaceLookup>,
        analyzer: Arc<dyn DishAnalyzer>,
    ) -> Self {
        Self {
            store,
            log,
            generator,
            places,
            analyzer,
            negotiation: NegotiationSettings::default(),
            delivery: DeliverySettings::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_settings(
        mut self,
        negotiation: NegotiationSettings,
        delivery: DeliverySettings,
    ) -> Self {
        self.negotiation = negotiation;
        self.delivery = delivery;
        self
    }

    /// Join (or create) the room behind an invite code.
    ///
    /// A code pointing at a discussing or completed session names a spent
    /// room: it is torn down and a fresh one created, because invite codes
    /// are reusable identifiers across independent sessions.
    pub async fn join_session(
        &self,
        code: &str,
        participant_id: &str,
        display_name: &str,
    ) -> Result<RoomStatusSummary, SessionApiError> {
        let code = parse_code(code)?;
        if participant_id.trim().is_empty() {
            return Err(SessionApiError::InvalidInput(
                "participant id must not be empty".to_string(),
            ));
        }
        let display_name = if display_name.trim().is_empty() {
            "Guest"
        } else {
            display_name.trim()
        };

        let lock = self.session_lock(&code).await;
        let _guard = lock.lock().await;

        let participant = Participant::new(participant_id, display_name);
        let room = match self.store.get(&code).await {
            None => {
                info!(session = %code, participant = participant_id, "creating room");
                Room::create(code.clone(), participant, self.negotiation.max_participants)
            }
            Some(existing) if existing.status().requires_recreate() => {
                info!(
                    session = %code,
                    status = %existing.status(),
                    "invite code reused; tearing down spent room"
                );
                self.store.delete(&code).await;
                self.log.remove(&code).await;
                Room::create(code.clone(), participant, self.negotiation.max_participants)
            }
            Some(mut existing) => {
                existing
                    .join(participant)
                    .map_err(|e| map_room_error(e, existing.status()))?;
                existing
            }
        };

        let summary = room.summary_for(participant_id);
        self.store.put(room).await;
        Ok(summary)
    }

    /// Analyze a participant's dish list and mark them ready.
    ///
    /// Analysis failures (including an empty dish list) surface only to the
    /// submitting participant; the room is untouched.
    pub async fn submit_profile(
        &self,
        code: &str,
        participant_id: &str,
        dishes: &[String],
    ) -> Result<RoomStatusSummary, SessionApiError> {
        let code = parse_code(code)?;

        // The upstream call happens outside the room lock: a slow analysis
        // must not serialize unrelated joins.
        if self.store.get(&code).await.is_none() {
            return Err(SessionApiError::SessionNotFound(code.to_string()));
        }
        let profile = self.analyzer.analyze(participant_id, dishes).await?;

        let lock = self.session_lock(&code).await;
        let _guard = lock.lock().await;

        let mut room = self
            .store
            .get(&code)
            .await
            .ok_or_else(|| SessionApiError::SessionNotFound(code.to_string()))?;
        room.mark_ready(participant_id, profile)
            .map_err(|e| map_room_error(e, room.status()))?;

        let summary = room.summary_for(participant_id);
        info!(
            session = %code,
            participant = participant_id,
            ready = summary.ready_count,
            total = summary.participant_count,
            "profile submitted"
        );
        self.store.put(room).await;
        Ok(summary)
    }

    /// Start the negotiation. Authorizer-only, from `ready` only.
    ///
    /// On success the orchestrator task is spawned; calling this again
    /// finds the room `discussing` and fails the precondition check, so at
    /// most one run ever exists per session.
    pub async fn start_session(
        &self,
        code: &str,
        participant_id: &str,
    ) -> Result<(), SessionApiError> {
        let code = parse_code(code)?;
        let lock = self.session_lock(&code).await;
        let _guard = lock.lock().await;

        let mut room = self
            .store
            .get(&code)
            .await
            .ok_or_else(|| SessionApiError::SessionNotFound(code.to_string()))?;
        room.begin_discussion(participant_id)
            .map_err(|e| map_room_error(e, room.status()))?;

        let agents: Vec<NegotiationAgent> = room
            .ready_profiles()
            .into_iter()
            .map(|(p, profile)| {
                NegotiationAgent::new(
                    &p.id,
                    &p.display_name,
                    profile.clone(),
                    Arc::clone(&self.generator),
                    self.negotiation.memory_cap,
                )
            })
            .collect();

        self.store.put(room).await;
        self.log.init_session(&code).await;
        info!(session = %code, agents = agents.len(), "negotiation starting");

        self.spawn_run(code, agents, Arc::clone(&lock));
        Ok(())
    }

    fn spawn_run(&self, code: InviteCode, agents: Vec<NegotiationAgent>, lock: Arc<Mutex<()>>) {
        let store = Arc::clone(&self.store);
        let log = Arc::clone(&self.log);
        let resolver = RecommendationResolver::new(
            Arc::clone(&self.places),
            Arc::clone(&self.generator),
            self.negotiation.city.clone(),
        );
        let settings = self.negotiation.clone();

        tokio::spawn(async move {
            let mut run = NegotiationRun::new(agents, settings);
            let recommendation = match run.run(&code, log.as_ref(), &resolver).await {
                Ok(recommendation) => recommendation,
                Err(e) => {
                    // Only reachable through a torn-down log; nothing to
                    // deliver to, so leave the room for the TTL sweep.
                    error!(session = %code, error = %e, "negotiation run aborted");
                    return;
                }
            };

            let _guard = lock.lock().await;
            match store.get(&code).await {
                Some(mut room) => {
                    if let Err(e) = room.complete(recommendation) {
                        warn!(session = %code, error = %e, "could not complete room");
                    } else {
                        store.put(room).await;
                    }
                }
                None => warn!(session = %code, "room disappeared during negotiation"),
            }
            if let Err(e) = log.append(&code, LogEntry::Completed).await {
                warn!(session = %code, error = %e, "could not append completion marker");
            }
        });
    }

    /// Poll for entries at `from_offset` and later, plus current status.
    ///
    /// Clients typically re-invoke this every 500ms-2s and stop once the
    /// page status reads completed.
    pub async fn poll_transcript(
        &self,
        code: &str,
        from_offset: u64,
    ) -> Result<TranscriptPage, SessionApiError> {
        let code = parse_code(code)?;
        self.log
            .read_from(&code, from_offset)
            .await
            .map_err(|e| match e {
                LogError::SessionNotFound(session) => SessionApiError::SessionNotFound(session),
            })
    }

    /// Open the push feed for a session that is discussing or completed.
    ///
    /// The feed replays the whole log before tailing it, so reconnecting
    /// mid-run (or after completion) delivers the same entries in the same
    /// order as the live run did.
    pub async fn stream_transcript(&self, code: &str) -> Result<SessionFeed, SessionApiError> {
        let code = parse_code(code)?;
        let room = self
            .store
            .get(&code)
            .await
            .ok_or_else(|| SessionApiError::SessionNotFound(code.to_string()))?;
        if !matches!(room.status(), RoomStatus::Discussing | RoomStatus::Completed) {
            return Err(SessionApiError::PreconditionNotMet {
                current: room.status(),
            });
        }

        let subscription = self.log.subscribe(&code).await.map_err(|e| match e {
            LogError::SessionNotFound(session) => SessionApiError::SessionNotFound(session),
        })?;
        Ok(SessionFeed::new(subscription, self.delivery.heartbeat()))
    }

    /// Current status summary from the caller's point of view.
    pub async fn session_status(
        &self,
        code: &str,
        participant_id: &str,
    ) -> Result<RoomStatusSummary, SessionApiError> {
        let code = parse_code(code)?;
        self.store
            .get(&code)
            .await
            .map(|room| room.summary_for(participant_id))
            .ok_or_else(|| SessionApiError::SessionNotFound(code.to_string()))
    }

    /// Evict rooms and logs idle past the configured TTL.
    pub async fn sweep_expired(&self) -> usize {
        let ttl = self.delivery.session_ttl_ms();
        let rooms = self.store.sweep_idle(ttl).await;
        let logs = self.log.sweep_idle(ttl).await;
        if rooms + logs > 0 {
            info!(rooms, logs, "swept expired sessions");
        }
        rooms + logs
    }

    async fn session_lock(&self, code: &InviteCode) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(
            locks
                .entry(code.as_str().to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

fn parse_code(raw: &str) -> Result<InviteCode, SessionApiError> {
    InviteCode::parse(raw).map_err(|e| SessionApiError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::place_lookup::{LookupError, Venue};
    use crate::ports::text_generator::{GenerationError, Message};
    use crate::ports::transcript_log::TranscriptSubscription;
    use crate::stream::FeedEvent;
    use async_trait::async_trait;
    use council_domain::{
        CuisinePreference, FeedStatus, PriceTier, Recommendation, SequencedEntry, TasteProfile,
        TasteVector,
    };
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::broadcast;

    // ==================== test doubles ====================

    struct MemStore(StdMutex<HashMap<String, Room>>);

    impl MemStore {
        fn new() -> Self {
            Self(StdMutex::new(HashMap::new()))
        }
    }

    #[async_trait]
    impl RoomStore for MemStore {
        async fn get(&self, code: &InviteCode) -> Option<Room> {
            self.0.lock().unwrap().get(code.as_str()).cloned()
        }

        async fn put(&self, room: Room) {
            self.0
                .lock()
                .unwrap()
                .insert(room.invite_code().as_str().to_string(), room);
        }

        async fn delete(&self, code: &InviteCode) -> bool {
            self.0.lock().unwrap().remove(code.as_str()).is_some()
        }

        async fn sweep_idle(&self, _ttl_ms: u64) -> usize {
            0
        }
    }

    struct LogState {
        entries: Vec<SequencedEntry>,
        status: FeedStatus,
        recommendation: Option<Recommendation>,
        tx: broadcast::Sender<SequencedEntry>,
    }

    struct MemLog(StdMutex<HashMap<String, LogState>>);

    impl MemLog {
        fn new() -> Self {
            Self(StdMutex::new(HashMap::new()))
        }
    }

    #[async_trait]
    impl TranscriptLog for MemLog {
        async fn init_session(&self, code: &InviteCode) {
            let (tx, _) = broadcast::channel(64);
            self.0.lock().unwrap().insert(
                code.as_str().to_string(),
                LogState {
                    entries: Vec::new(),
                    status: FeedStatus::Ongoing,
                    recommendation: None,
                    tx,
                },
            );
        }

        async fn append(&self, code: &InviteCode, entry: LogEntry) -> Result<u64, LogError> {
            let mut sessions = self.0.lock().unwrap();
            let state = sessions
                .get_mut(code.as_str())
                .ok_or_else(|| LogError::SessionNotFound(code.to_string()))?;
            match &entry {
                LogEntry::Recommendation(rec) => state.recommendation = Some(rec.clone()),
                LogEntry::Completed => state.status = FeedStatus::Completed,
                _ => {}
            }
            let offset = state.entries.len() as u64;
            let sequenced = SequencedEntry::new(offset, entry);
            state.entries.push(sequenced.clone());
            let _ = state.tx.send(sequenced);
            Ok(offset)
        }

        async fn read_from(
            &self,
            code: &InviteCode,
            from_offset: u64,
        ) -> Result<TranscriptPage, LogError> {
            let sessions = self.0.lock().unwrap();
            let state = sessions
                .get(code.as_str())
                .ok_or_else(|| LogError::SessionNotFound(code.to_string()))?;
            Ok(TranscriptPage {
                entries: state
                    .entries
                    .iter()
                    .skip(from_offset as usize)
                    .cloned()
                    .collect(),
                total: state.entries.len() as u64,
                status: state.status,
                recommendation: state.recommendation.clone(),
            })
        }

        async fn subscribe(&self, code: &InviteCode) -> Result<TranscriptSubscription, LogError> {
            let sessions = self.0.lock().unwrap();
            let state = sessions
                .get(code.as_str())
                .ok_or_else(|| LogError::SessionNotFound(code.to_string()))?;
            Ok(TranscriptSubscription {
                snapshot: state.entries.clone(),
                live: state.tx.subscribe(),
            })
        }

        async fn remove(&self, code: &InviteCode) {
            self.0.lock().unwrap().remove(code.as_str());
        }

        async fn sweep_idle(&self, _ttl_ms: u64) -> usize {
            0
        }
    }

    struct CannedGenerator;

    #[async_trait]
    impl crate::ports::text_generator::TextGenerator for CannedGenerator {
        async fn generate(&self, _messages: &[Message]) -> Result<String, GenerationError> {
            Ok("works for me".to_string())
        }
    }

    struct DeadGenerator;

    #[async_trait]
    impl crate::ports::text_generator::TextGenerator for DeadGenerator {
        async fn generate(&self, _messages: &[Message]) -> Result<String, GenerationError> {
            Err(GenerationError::Transport("down".into()))
        }
    }

    struct NotFoundLookup;

    #[async_trait]
    impl PlaceLookup for NotFoundLookup {
        async fn lookup(&self, _query: &str, _city: &str) -> Result<Option<Venue>, LookupError> {
            Ok(None)
        }
    }

    /// Analyzer that reads the first "dish" as the cuisine name.
    struct KeywordAnalyzer;

    #[async_trait]
    impl DishAnalyzer for KeywordAnalyzer {
        async fn analyze(
            &self,
            _participant_id: &str,
            dishes: &[String],
        ) -> Result<TasteProfile, AnalysisError> {
            if dishes.is_empty() {
                return Err(AnalysisError::EmptyInput);
            }
            Ok(TasteProfile::new(
                TasteVector::default(),
                vec![CuisinePreference::new(dishes[0].clone(), 0.9)],
                PriceTier::Moderate,
            ))
        }
    }

    // ==================== helpers ====================

    fn fast_settings() -> NegotiationSettings {
        NegotiationSettings {
            max_rounds: 2,
            turn_timeout_secs: 2,
            turn_retries: 0,
            ..NegotiationSettings::default()
        }
    }

    fn service(generator: Arc<dyn TextGenerator>) -> RoomService {
        RoomService::new(
            Arc::new(MemStore::new()),
            Arc::new(MemLog::new()),
            generator,
            Arc::new(NotFoundLookup),
            Arc::new(KeywordAnalyzer),
        )
        .with_settings(
            fast_settings(),
            DeliverySettings {
                heartbeat_secs: 30,
                ..DeliverySettings::default()
            },
        )
    }

    fn dishes(name: &str) -> Vec<String> {
        vec![name.to_string()]
    }

    async fn wait_completed(service: &RoomService, code: &str) -> TranscriptPage {
        for _ in 0..200 {
            if let Ok(page) = service.poll_transcript(code, 0).await {
                if page.status.is_completed() {
                    return page;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("session {} never completed", code);
    }

    // ==================== tests ====================

    #[tokio::test]
    async fn malformed_invite_code_is_rejected() {
        let service = service(Arc::new(CannedGenerator));
        let err = service.join_session("12ab", "p1", "Ming").await.unwrap_err();
        assert!(matches!(err, SessionApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn non_authorizer_start_is_rejected_without_mutation() {
        let service = service(Arc::new(CannedGenerator));
        service.join_session("123456", "p1", "Ming").await.unwrap();
        service.join_session("123456", "p2", "Wei").await.unwrap();
        service
            .submit_profile("123456", "p1", &dishes("Sichuan"))
            .await
            .unwrap();
        service
            .submit_profile("123456", "p2", &dishes("Sichuan"))
            .await
            .unwrap();

        for _ in 0..2 {
            let err = service.start_session("123456", "p2").await.unwrap_err();
            assert!(matches!(err, SessionApiError::NotAuthorized(_)));
        }
        let status = service.session_status("123456", "p1").await.unwrap();
        assert_eq!(status.status, RoomStatus::Ready);
    }

    #[tokio::test]
    async fn start_before_ready_reports_current_state() {
        let service = service(Arc::new(CannedGenerator));
        service.join_session("123456", "p1", "Ming").await.unwrap();

        let err = service.start_session("123456", "p1").await.unwrap_err();
        assert!(matches!(
            err,
            SessionApiError::PreconditionNotMet {
                current: RoomStatus::Waiting
            }
        ));
    }

    #[tokio::test]
    async fn second_start_does_not_spawn_a_second_run() {
        let service = service(Arc::new(CannedGenerator));
        service.join_session("123456", "p1", "Ming").await.unwrap();
        service
            .submit_profile("123456", "p1", &dishes("Sichuan"))
            .await
            .unwrap();

        service.start_session("123456", "p1").await.unwrap();
        let err = service.start_session("123456", "p1").await.unwrap_err();
        assert!(matches!(
            err,
            SessionApiError::PreconditionNotMet {
                current: RoomStatus::Discussing
            }
        ));

        let page = wait_completed(&service, "123456").await;
        let openings = page
            .entries
            .iter()
            .filter_map(|e| e.entry.as_turn())
            .filter(|t| t.kind == council_domain::TurnKind::Opening)
            .count();
        assert_eq!(openings, 1);
    }

    #[tokio::test]
    async fn joining_a_ready_room_reverts_to_waiting() {
        let service = service(Arc::new(CannedGenerator));
        service.join_session("123456", "p1", "Ming").await.unwrap();
        service
            .submit_profile("123456", "p1", &dishes("Sichuan"))
            .await
            .unwrap();
        assert_eq!(
            service.session_status("123456", "p1").await.unwrap().status,
            RoomStatus::Ready
        );

        let summary = service.join_session("123456", "p2", "Wei").await.unwrap();
        assert_eq!(summary.status, RoomStatus::Waiting);
        assert_eq!(summary.participant_count, 2);
    }

    #[tokio::test]
    async fn empty_dish_list_fails_submission_only() {
        let service = service(Arc::new(CannedGenerator));
        service.join_session("123456", "p1", "Ming").await.unwrap();

        let err = service.submit_profile("123456", "p1", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            SessionApiError::Analysis(AnalysisError::EmptyInput)
        ));
        let status = service.session_status("123456", "p1").await.unwrap();
        assert_eq!(status.ready_count, 0);
    }

    #[tokio::test]
    async fn duplicate_profile_submission_is_rejected() {
        let service = service(Arc::new(CannedGenerator));
        service.join_session("123456", "p1", "Ming").await.unwrap();
        service.join_session("123456", "p2", "Wei").await.unwrap();
        service
            .submit_profile("123456", "p1", &dishes("Sichuan"))
            .await
            .unwrap();

        let err = service
            .submit_profile("123456", "p1", &dishes("Cantonese"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionApiError::PreconditionNotMet { .. }));
        // The original profile is still the attached one
        let status = service.session_status("123456", "p1").await.unwrap();
        assert_eq!(status.ready_count, 1);
    }

    #[tokio::test]
    async fn dead_collaborators_still_complete_with_communal_outcome() {
        // Three disjoint cuisines, no venue lookup, no text generation
        let service = service(Arc::new(DeadGenerator));
        service.join_session("888888", "p1", "Ming").await.unwrap();
        service.join_session("888888", "p2", "Wei").await.unwrap();
        service.join_session("888888", "p3", "Jun").await.unwrap();
        service
            .submit_profile("888888", "p1", &dishes("Sichuan"))
            .await
            .unwrap();
        service
            .submit_profile("888888", "p2", &dishes("Cantonese"))
            .await
            .unwrap();
        service
            .submit_profile("888888", "p3", &dishes("Japanese"))
            .await
            .unwrap();
        service.start_session("888888", "p1").await.unwrap();

        let page = wait_completed(&service, "888888").await;
        let rec = page.recommendation.expect("completed without an outcome");
        assert_eq!(rec.venue_name, "Harbor Hot Pot");

        let status = service.session_status("888888", "p1").await.unwrap();
        assert_eq!(status.status, RoomStatus::Completed);
    }

    #[tokio::test]
    async fn replay_matches_push_delivery_and_cursor_drains() {
        let service = service(Arc::new(CannedGenerator));
        service.join_session("666666", "p1", "Ming").await.unwrap();
        service.join_session("666666", "p2", "Wei").await.unwrap();
        service
            .submit_profile("666666", "p1", &dishes("Sichuan"))
            .await
            .unwrap();
        service
            .submit_profile("666666", "p2", &dishes("Sichuan"))
            .await
            .unwrap();
        service.start_session("666666", "p1").await.unwrap();

        // Live push path, opened right after start
        let mut feed = service.stream_transcript("666666").await.unwrap();
        let mut pushed = Vec::new();
        while let Some(event) = feed.next_event().await {
            if let FeedEvent::Entry(entry) = event {
                pushed.push(entry);
            }
        }

        // Durable log replay from offset 0 reproduces the same sequence
        let page = service.poll_transcript("666666", 0).await.unwrap();
        assert_eq!(page.entries, pushed);
        assert!(page.status.is_completed());

        // Cursor at the end: nothing new, still completed
        let empty = service.poll_transcript("666666", page.total).await.unwrap();
        assert!(empty.entries.is_empty());
        assert!(empty.status.is_completed());

        // 1 opening + 2 rounds x 2 agents = 5 turns
        let turns = page.entries.iter().filter(|e| e.entry.as_turn().is_some()).count();
        assert_eq!(turns, 5);
    }

    #[tokio::test]
    async fn spent_invite_code_is_torn_down_and_recreated() {
        let service = service(Arc::new(CannedGenerator));
        service.join_session("123456", "p1", "Ming").await.unwrap();
        service
            .submit_profile("123456", "p1", &dishes("Sichuan"))
            .await
            .unwrap();
        service.start_session("123456", "p1").await.unwrap();
        wait_completed(&service, "123456").await;

        // Same code, new session: fresh room, old transcript gone
        let summary = service.join_session("123456", "p9", "Hana").await.unwrap();
        assert_eq!(summary.status, RoomStatus::Waiting);
        assert_eq!(summary.participant_count, 1);
        assert!(summary.is_authorizer);
        assert!(matches!(
            service.poll_transcript("123456", 0).await,
            Err(SessionApiError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn streaming_a_waiting_room_is_a_precondition_error() {
        let service = service(Arc::new(CannedGenerator));
        service.join_session("123456", "p1", "Ming").await.unwrap();

        let err = service.stream_transcript("123456").await.unwrap_err();
        assert!(matches!(
            err,
            SessionApiError::PreconditionNotMet {
                current: RoomStatus::Waiting
            }
        ));
    }

    #[tokio::test]
    async fn unknown_session_reports_not_found() {
        let service = service(Arc::new(CannedGenerator));
        assert!(matches!(
            service.session_status("999999", "p1").await.unwrap_err(),
            SessionApiError::SessionNotFound(_)
        ));
        assert!(matches!(
            service.submit_profile("999999", "p1", &dishes("Thai")).await.unwrap_err(),
            SessionApiError::SessionNotFound(_)
        ));
    }
}
