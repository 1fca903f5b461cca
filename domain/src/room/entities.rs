//! Room domain entities
//!
//! A [`Room`] tracks one negotiation session per invite code through its
//! lifecycle. Transitions only move forward; reusing an invite code after
//! completion is handled by tearing the room down and creating a fresh one,
//! never by rewinding status.

use super::error::RoomError;
use crate::core::invite::InviteCode;
use crate::taste::entities::TasteProfile;
use crate::transcript::entities::Recommendation;
use crate::util::now_ms;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Participants are joining; not everyone has submitted a profile
    Waiting,
    /// Every current participant is ready; the authorizer may start
    Ready,
    /// The negotiation run is active
    Discussing,
    /// Terminal: the run finished and a recommendation is attached
    Completed,
}

impl RoomStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Ready => "ready",
            RoomStatus::Discussing => "discussing",
            RoomStatus::Completed => "completed",
        }
    }

    /// Whether a fresh room must replace this one when its invite code is
    /// requested again. Running and finished sessions are never joined.
    pub fn requires_recreate(self) -> bool {
        matches!(self, RoomStatus::Discussing | RoomStatus::Completed)
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One participant in a room (Entity)
///
/// Created on join with `ready = false`; flipped to ready exactly once when
/// a profile is attached; never removed mid-session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<TasteProfile>,
    pub ready: bool,
    pub joined_at_ms: u64,
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            profile: None,
            ready: false,
            joined_at_ms: now_ms(),
        }
    }
}

/// Point-in-time view of a room for status polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomStatusSummary {
    pub invite_code: InviteCode,
    pub status: RoomStatus,
    pub participant_count: usize,
    pub ready_count: usize,
    pub is_authorizer: bool,
}

/// A negotiation session keyed by invite code (Entity)
///
/// Participants are kept in join order; the first entrant is the authorizer,
/// the only participant permitted to start the discussion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    id: String,
    invite_code: InviteCode,
    participants: Vec<Participant>,
    status: RoomStatus,
    max_participants: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendation: Option<Recommendation>,
}

impl Room {
    /// Create a room with its first participant (the authorizer).
    pub fn create(invite_code: InviteCode, creator: Participant, max_participants: usize) -> Self {
        let id = format!("room-{}-{}", invite_code, now_ms());
        Self {
            id,
            invite_code,
            participants: vec![creator],
            status: RoomStatus::Waiting,
            max_participants,
            started_at_ms: None,
            completed_at_ms: None,
            recommendation: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn invite_code(&self) -> &InviteCode {
        &self.invite_code
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn completed_at_ms(&self) -> Option<u64> {
        self.completed_at_ms
    }

    pub fn recommendation(&self) -> Option<&Recommendation> {
        self.recommendation.as_ref()
    }

    /// The first-joined participant, uniquely permitted to start.
    pub fn authorizer(&self) -> &Participant {
        // A room always has its creator
        &self.participants[0]
    }

    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    /// Add a participant.
    ///
    /// Re-joining with a known id is a no-op. A successful join always puts
    /// the room back into `Waiting`: the new entrant has no profile yet, so
    /// the "all ready" invariant no longer holds even if it did before.
    pub fn join(&mut self, participant: Participant) -> Result<(), RoomError> {
        match self.status {
            RoomStatus::Waiting | RoomStatus::Ready => {}
            current => {
                return Err(RoomError::WrongState {
                    expected: RoomStatus::Waiting,
                    current,
                });
            }
        }

        if self.participant(&participant.id).is_some() {
            return Ok(());
        }
        if self.participants.len() >= self.max_participants {
            return Err(RoomError::Full {
                max: self.max_participants,
            });
        }

        self.participants.push(participant);
        self.status = RoomStatus::Waiting;
        Ok(())
    }

    /// Attach a profile and flip the participant to ready, exactly once.
    ///
    /// When this makes every participant ready, the room becomes `Ready`.
    pub fn mark_ready(
        &mut self,
        participant_id: &str,
        profile: TasteProfile,
    ) -> Result<(), RoomError> {
        match self.status {
            RoomStatus::Waiting | RoomStatus::Ready => {}
            current => {
                return Err(RoomError::WrongState {
                    expected: RoomStatus::Waiting,
                    current,
                });
            }
        }

        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| RoomError::UnknownParticipant(participant_id.to_string()))?;

        if participant.ready {
            return Err(RoomError::AlreadyReady(participant_id.to_string()));
        }

        participant.profile = Some(profile);
        participant.ready = true;

        if self.participants.iter().all(|p| p.ready) {
            self.status = RoomStatus::Ready;
        }
        Ok(())
    }

    /// Enter `Discussing`. Only the authorizer may trigger this, and only
    /// from `Ready`; any other caller or state is rejected without mutation.
    pub fn begin_discussion(&mut self, participant_id: &str) -> Result<(), RoomError> {
        if self.status != RoomStatus::Ready {
            return Err(RoomError::WrongState {
                expected: RoomStatus::Ready,
                current: self.status,
            });
        }
        if self.authorizer().id != participant_id {
            return Err(RoomError::NotAuthorizer);
        }

        self.status = RoomStatus::Discussing;
        self.started_at_ms = Some(now_ms());
        Ok(())
    }

    /// Enter the terminal `Completed` state, attaching the outcome.
    pub fn complete(&mut self, recommendation: Recommendation) -> Result<(), RoomError> {
        if self.status != RoomStatus::Discussing {
            return Err(RoomError::WrongState {
                expected: RoomStatus::Discussing,
                current: self.status,
            });
        }

        self.status = RoomStatus::Completed;
        self.completed_at_ms = Some(now_ms());
        self.recommendation = Some(recommendation);
        Ok(())
    }

    /// Profiles of all ready participants, in join order.
    pub fn ready_profiles(&self) -> Vec<(&Participant, &TasteProfile)> {
        self.participants
            .iter()
            .filter_map(|p| p.profile.as_ref().map(|profile| (p, profile)))
            .collect()
    }

    pub fn summary_for(&self, participant_id: &str) -> RoomStatusSummary {
        RoomStatusSummary {
            invite_code: self.invite_code.clone(),
            status: self.status,
            participant_count: self.participants.len(),
            ready_count: self.participants.iter().filter(|p| p.ready).count(),
            is_authorizer: self.authorizer().id == participant_id,
        }
    }

    /// Milliseconds since the room last made lifecycle progress.
    pub fn idle_ms(&self, now: u64) -> u64 {
        let last = self
            .completed_at_ms
            .or(self.started_at_ms)
            .unwrap_or_else(|| {
                self.participants
                    .iter()
                    .map(|p| p.joined_at_ms)
                    .max()
                    .unwrap_or(0)
            });
        now.saturating_sub(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taste::entities::{PriceTier, TasteProfile, TasteVector};

    fn test_profile() -> TasteProfile {
        TasteProfile::new(TasteVector::default(), vec![], PriceTier::Moderate)
    }

    fn test_room() -> Room {
        Room::create(
            InviteCode::parse("123456").unwrap(),
            Participant::new("p1", "Ming"),
            8,
        )
    }

    #[test]
    fn test_creator_is_authorizer() {
        let room = test_room();
        assert_eq!(room.authorizer().id, "p1");
        assert_eq!(room.status(), RoomStatus::Waiting);
    }

    #[test]
    fn test_all_ready_transitions_to_ready() {
        let mut room = test_room();
        room.join(Participant::new("p2", "Wei")).unwrap();

        room.mark_ready("p1", test_profile()).unwrap();
        assert_eq!(room.status(), RoomStatus::Waiting);

        room.mark_ready("p2", test_profile()).unwrap();
        assert_eq!(room.status(), RoomStatus::Ready);
    }

    #[test]
    fn test_join_reverts_ready_to_waiting() {
        let mut room = test_room();
        room.mark_ready("p1", test_profile()).unwrap();
        assert_eq!(room.status(), RoomStatus::Ready);

        room.join(Participant::new("p2", "Wei")).unwrap();
        assert_eq!(room.status(), RoomStatus::Waiting);
    }

    #[test]
    fn test_rejoin_is_noop() {
        let mut room = test_room();
        room.join(Participant::new("p1", "Ming")).unwrap();
        assert_eq!(room.participants().len(), 1);
    }

    #[test]
    fn test_join_full_room_rejected() {
        let mut room = Room::create(
            InviteCode::parse("123456").unwrap(),
            Participant::new("p1", "Ming"),
            2,
        );
        room.join(Participant::new("p2", "Wei")).unwrap();
        let err = room.join(Participant::new("p3", "Jun")).unwrap_err();
        assert_eq!(err, RoomError::Full { max: 2 });
        assert_eq!(room.participants().len(), 2);
    }

    #[test]
    fn test_duplicate_ready_rejected_without_mutation() {
        let mut room = test_room();
        let first = test_profile();
        room.mark_ready("p1", first.clone()).unwrap();

        let second = test_profile().with_supplement("changed my mind");
        let err = room.mark_ready("p1", second).unwrap_err();
        assert_eq!(err, RoomError::AlreadyReady("p1".to_string()));
        assert_eq!(room.participant("p1").unwrap().profile, Some(first));
    }

    #[test]
    fn test_non_authorizer_cannot_start() {
        let mut room = test_room();
        room.join(Participant::new("p2", "Wei")).unwrap();
        room.mark_ready("p1", test_profile()).unwrap();
        room.mark_ready("p2", test_profile()).unwrap();

        // Rejected twice in a row: a bad actor never succeeds
        assert_eq!(
            room.begin_discussion("p2").unwrap_err(),
            RoomError::NotAuthorizer
        );
        assert_eq!(
            room.begin_discussion("p2").unwrap_err(),
            RoomError::NotAuthorizer
        );
        assert_eq!(room.status(), RoomStatus::Ready);
    }

    #[test]
    fn test_start_before_ready_rejected() {
        let mut room = test_room();
        let err = room.begin_discussion("p1").unwrap_err();
        assert!(matches!(
            err,
            RoomError::WrongState {
                current: RoomStatus::Waiting,
                ..
            }
        ));
    }

    #[test]
    fn test_start_twice_rejected() {
        let mut room = test_room();
        room.mark_ready("p1", test_profile()).unwrap();
        room.begin_discussion("p1").unwrap();

        let err = room.begin_discussion("p1").unwrap_err();
        assert!(matches!(
            err,
            RoomError::WrongState {
                current: RoomStatus::Discussing,
                ..
            }
        ));
    }

    #[test]
    fn test_complete_only_from_discussing() {
        use crate::transcript::entities::{Recommendation, RecommendationSource};

        let mut room = test_room();
        let rec = Recommendation::new(
            "Harbor Hot Pot",
            "Hot pot",
            "flexible for everyone",
            RecommendationSource::RuleBased,
        );
        assert!(room.complete(rec.clone()).is_err());

        room.mark_ready("p1", test_profile()).unwrap();
        room.begin_discussion("p1").unwrap();
        room.complete(rec).unwrap();

        assert_eq!(room.status(), RoomStatus::Completed);
        assert!(room.recommendation().is_some());
        assert!(room.completed_at_ms().is_some());
    }

    #[test]
    fn test_join_while_discussing_rejected() {
        let mut room = test_room();
        room.mark_ready("p1", test_profile()).unwrap();
        room.begin_discussion("p1").unwrap();

        assert!(room.join(Participant::new("p2", "Wei")).is_err());
        assert!(room.status().requires_recreate());
    }

    #[test]
    fn test_summary_counts() {
        let mut room = test_room();
        room.join(Participant::new("p2", "Wei")).unwrap();
        room.mark_ready("p2", test_profile()).unwrap();

        let summary = room.summary_for("p2");
        assert_eq!(summary.participant_count, 2);
        assert_eq!(summary.ready_count, 1);
        assert!(!summary.is_authorizer);
        assert!(room.summary_for("p1").is_authorizer);
    }
}
