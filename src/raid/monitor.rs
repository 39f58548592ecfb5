use std::collections::{BTreeMap, VecDeque};

use parking_lot::Mutex;

use super::allow::AllowLists;
use super::session::{AssistLimits, RaidSession, Violation};
use crate::alliance::AllianceRegistry;
use crate::config::GuardConfig;
use crate::host::{HostWorld, PunitiveEffect};
use crate::id::{PlayerId, StructureId};
use crate::time::ServerTime;

/// Minimum spacing between two rounds of raid notices.
pub const NOTICE_SPACING_MILLIS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    Idle,
    Running,
}

/// One player checked against one session's territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    pub structure: StructureId,
    pub player: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreachOutcome {
    /// The monitor was idle; stale state was cleared and the loop started.
    MonitorStarted,
    /// A new session was added to a running monitor.
    SessionOpened,
    /// The structure was already tracked; allow-lists were re-unioned.
    SessionExtended,
    /// Nothing tracked: the structure no longer resolves, or the breach did
    /// not qualify for monitoring.
    Ignored,
}

/// What one call to [`RaidMonitor::poll`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub processed: usize,
    /// Units skipped because host data was missing this tick.
    pub skipped: usize,
    /// Host calls that failed while enforcing.
    pub faults: usize,
    pub penalized: Vec<(PlayerId, Violation)>,
    /// Sessions dropped because their siege ended.
    pub dropped: Vec<StructureId>,
    pub sweep_completed: bool,
    /// The last session ended and the monitor went idle.
    pub stopped: bool,
}

#[derive(Debug, Default)]
struct MonitorInner {
    state: MonitorState,
    sessions: BTreeMap<StructureId, RaidSession>,
    /// Pending units of the current sweep.
    sweep: VecDeque<WorkUnit>,
    /// Whether violations found in the current sweep are announced.
    sweep_notify: bool,
    last_notice: Option<ServerTime>,
}

/// Raid session table plus the cooperative sweep over it.
///
/// A sweep is one pass over every connected player × live session. The host
/// drives it through [`poll`](Self::poll) with a per-tick unit budget, so a
/// large roster spreads over several ticks. Host calls are never made while
/// the session lock is held.
#[derive(Debug)]
pub struct RaidMonitor {
    limits: AssistLimits,
    include_alliances: bool,
    effect: PunitiveEffect,
    inner: Mutex<MonitorInner>,
}

impl RaidMonitor {
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            limits: AssistLimits::from(config),
            include_alliances: config.alliances,
            effect: PunitiveEffect::default(),
            inner: Mutex::new(MonitorInner::default()),
        }
    }

    pub fn with_effect(mut self, effect: PunitiveEffect) -> Self {
        self.effect = effect;
        self
    }

    pub fn limits(&self) -> AssistLimits {
        self.limits
    }

    // -- Breach -------------------------------------------------------------

    /// Open or extend the session for `structure`.
    pub fn on_siege_breached(
        &self,
        host: &dyn HostWorld,
        alliances: &AllianceRegistry,
        attacker: PlayerId,
        structure: StructureId,
    ) -> BreachOutcome {
        let Some(owner) = host.structure_owner(structure) else {
            tracing::warn!("breach on structure {structure} ignored: owner not found");
            return BreachOutcome::Ignored;
        };
        let lists = AllowLists::compute(host, alliances, self.include_alliances, owner, attacker);
        let now = host.server_time();

        let mut inner = self.inner.lock();
        let state = inner.state;
        let outcome = match state {
            MonitorState::Idle => {
                inner.sessions.clear();
                inner.sweep.clear();
                inner.sweep_notify = false;
                inner.state = MonitorState::Running;
                tracing::info!("starting raid monitor");
                BreachOutcome::MonitorStarted
            }
            MonitorState::Running if inner.sessions.contains_key(&structure) => {
                BreachOutcome::SessionExtended
            }
            MonitorState::Running => BreachOutcome::SessionOpened,
        };

        match inner.sessions.get_mut(&structure) {
            Some(session) => {
                session.extend(lists);
                tracing::info!(
                    "raid on structure {structure} extended by attacker {attacker} ({} allowed)",
                    session.allowed.len()
                );
            }
            None => {
                let session = RaidSession::new(structure, owner, lists, now);
                tracing::info!(
                    "raid on structure {structure} opened by attacker {attacker} ({} allies, {} raiders)",
                    session.allowed_allies.len(),
                    session.allowed_raiders.len()
                );
                inner.sessions.insert(structure, session);
            }
        }
        outcome
    }

    // -- Sweep --------------------------------------------------------------

    /// Process up to `budget` work units. Returns early when a sweep finishes
    /// so each sweep starts on a fresh tick.
    pub fn poll(&self, host: &dyn HostWorld, budget: usize) -> PollReport {
        let mut report = PollReport::default();
        let now = host.server_time();

        for _ in 0..budget.max(1) {
            let needs_sweep = {
                let inner = self.inner.lock();
                if inner.state == MonitorState::Idle {
                    break;
                }
                inner.sweep.is_empty()
            };
            if needs_sweep && !self.begin_sweep(host, now, &mut report) {
                break;
            }

            let (unit, notify, last) = {
                let mut inner = self.inner.lock();
                let Some(unit) = inner.sweep.pop_front() else {
                    report.sweep_completed = true;
                    break;
                };
                (unit, inner.sweep_notify, inner.sweep.is_empty())
            };

            self.process(host, unit, notify, &mut report);

            if last {
                let mut inner = self.inner.lock();
                if inner.sweep_notify {
                    inner.last_notice = Some(now);
                    inner.sweep_notify = false;
                }
                report.sweep_completed = true;
                break;
            }
        }
        report
    }

    /// Drop ended sessions and queue the next sweep. Returns `false` when the
    /// monitor went idle.
    fn begin_sweep(&self, host: &dyn HostWorld, now: ServerTime, report: &mut PollReport) -> bool {
        let tracked: Vec<StructureId> = self.inner.lock().sessions.keys().copied().collect();
        let ended: Vec<StructureId> = tracked
            .into_iter()
            .filter(|structure| !host.is_structure_under_siege(*structure))
            .collect();
        let players = host.connected_players();

        let mut inner = self.inner.lock();
        for structure in ended {
            if inner.sessions.remove(&structure).is_some() {
                tracing::info!("raid on structure {structure} ended");
                report.dropped.push(structure);
            }
        }
        if inner.sessions.is_empty() {
            inner.state = MonitorState::Idle;
            inner.sweep.clear();
            inner.sweep_notify = false;
            report.stopped = true;
            tracing::info!("stopping raid monitor");
            return false;
        }

        let structures: Vec<StructureId> = inner.sessions.keys().copied().collect();
        inner.sweep = players
            .iter()
            .flat_map(|player| {
                structures.iter().map(move |structure| WorkUnit {
                    structure: *structure,
                    player: *player,
                })
            })
            .collect();
        inner.sweep_notify = inner
            .last_notice
            .is_none_or(|last| now.millis_since(last) >= NOTICE_SPACING_MILLIS);
        true
    }

    fn process(&self, host: &dyn HostWorld, unit: WorkUnit, notify: bool, report: &mut PollReport) {
        let Some(position) = host.position(unit.player) else {
            report.skipped += 1;
            return;
        };
        let inside = host.is_in_territory(position, unit.structure);

        let violation = {
            let mut inner = self.inner.lock();
            let Some(session) = inner.sessions.get_mut(&unit.structure) else {
                report.skipped += 1;
                return;
            };
            session.observe(unit.player, inside, &self.limits)
        };
        report.processed += 1;

        if let Some(violation) = violation {
            self.enforce(host, unit, violation, notify, report);
        }
    }

    fn enforce(
        &self,
        host: &dyn HostWorld,
        unit: WorkUnit,
        violation: Violation,
        notify: bool,
        report: &mut PollReport,
    ) {
        let player = unit.player;
        if !host.has_punitive_effect(player) {
            if let Err(err) = host.apply_punitive_effect(player, &self.effect) {
                tracing::warn!("could not punish player {player} at structure {}: {err}", unit.structure);
                report.faults += 1;
                return;
            }
            tracing::info!(
                "punished player {player} in territory of structure {}: {violation:?}",
                unit.structure
            );
        }
        report.penalized.push((player, violation));

        if notify {
            if let Err(err) = host.send_message(player, violation.message()) {
                tracing::warn!("could not notify player {player}: {err}");
                report.faults += 1;
            }
        }
    }

    // -- Queries ------------------------------------------------------------

    pub fn state(&self) -> MonitorState {
        self.inner.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == MonitorState::Running
    }

    pub fn session(&self, structure: StructureId) -> Option<RaidSession> {
        self.inner.lock().sessions.get(&structure).cloned()
    }

    pub fn sessions(&self) -> Vec<RaidSession> {
        self.inner.lock().sessions.values().cloned().collect()
    }

    /// Units still queued in the current sweep.
    pub fn pending_units(&self) -> usize {
        self.inner.lock().sweep.len()
    }

    /// The raid `player` fights in as a raider, if any.
    pub fn raid_of(&self, player: PlayerId) -> Option<StructureId> {
        self.inner
            .lock()
            .sessions
            .values()
            .find(|s| s.allowed_raiders.contains(&player))
            .map(|s| s.structure)
    }

    /// The defending roster of a tracked raid.
    pub fn defenders_of(&self, structure: StructureId) -> Option<Vec<PlayerId>> {
        self.inner
            .lock()
            .sessions
            .get(&structure)
            .map(|s| s.allowed_allies.clone())
    }

    /// `target` takes part in a raid that `attacker` is not allowed in.
    pub fn interference(&self, target: PlayerId, attacker: PlayerId) -> bool {
        self.inner
            .lock()
            .sessions
            .values()
            .any(|s| s.is_allowed(target) && !s.is_allowed(attacker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Position;
    use crate::testutil::{FakeHost, Territory};

    struct Raid {
        host: FakeHost,
        alliances: AllianceRegistry,
        monitor: RaidMonitor,
        castle: StructureId,
        territory: Territory,
        owner: PlayerId,
        mate: PlayerId,
        raider: PlayerId,
        stranger: PlayerId,
    }

    fn raid(config: GuardConfig) -> Raid {
        let host = FakeHost::new();
        let home = host.add_clan(10, "Home");
        let away = host.add_clan(20, "Away");
        let owner = host.add_player(1, "Owner", Some(home));
        let mate = host.add_player(2, "Mate", Some(home));
        let raider = host.add_player(3, "Raider", Some(away));
        let stranger = host.add_player(4, "Stranger", None);
        let territory = Territory::new((0, 0), (10, 10));
        let castle = host.add_structure(100, owner, territory);
        for p in [owner, mate, raider, stranger] {
            host.place(p, Position::new(50, 50));
        }
        Raid {
            alliances: AllianceRegistry::in_memory(&config),
            monitor: RaidMonitor::new(&config),
            host,
            castle,
            territory,
            owner,
            mate,
            raider,
            stranger,
        }
    }

    impl Raid {
        fn breach(&self) -> BreachOutcome {
            self.monitor
                .on_siege_breached(&self.host, &self.alliances, self.raider, self.castle)
        }

        fn tick(&self) -> PollReport {
            self.monitor.poll(&self.host, 64)
        }
    }

    #[test]
    fn breach_starts_then_extends() {
        let r = raid(GuardConfig::default());
        assert_eq!(r.monitor.state(), MonitorState::Idle);
        assert_eq!(r.breach(), BreachOutcome::MonitorStarted);
        assert_eq!(r.breach(), BreachOutcome::SessionExtended);
        assert!(r.monitor.is_running());
        let session = r.monitor.session(r.castle).unwrap();
        assert_eq!(session.allowed_allies, vec![r.owner, r.mate]);
        assert_eq!(session.allowed_raiders, vec![r.raider]);
    }

    #[test]
    fn repeated_breach_never_shrinks_allow_lists() {
        let r = raid(GuardConfig::default());
        r.breach();
        let before = r.monitor.session(r.castle).unwrap();
        r.host.set_clan(r.mate, None);
        r.breach();
        let after = r.monitor.session(r.castle).unwrap();
        assert!(before.allowed.is_subset(&after.allowed));
        assert!(after.is_allowed(r.mate));
    }

    #[test]
    fn intruder_is_punished_once_while_present() {
        let r = raid(GuardConfig::default());
        r.breach();
        r.host.place(r.stranger, r.territory.inside());
        for _ in 0..5 {
            r.tick();
            r.host.advance_secs(1);
        }
        assert_eq!(r.host.effect_applications(r.stranger), 1);
        assert_eq!(
            r.host.messages_for(r.stranger),
            vec![Violation::NotAllowed.message().to_string()]
        );
        assert_eq!(r.host.effect_applications(r.raider), 0);
    }

    #[test]
    fn notices_are_spaced() {
        let r = raid(GuardConfig::default());
        r.breach();
        r.host.place(r.stranger, r.territory.inside());
        r.tick();
        r.host.advance_secs(5);
        r.tick();
        assert_eq!(r.host.messages_for(r.stranger).len(), 1);
        r.host.advance_secs(5);
        r.tick();
        assert_eq!(r.host.messages_for(r.stranger).len(), 2);
    }

    #[test]
    fn expired_effect_is_reapplied() {
        let r = raid(GuardConfig::default());
        r.breach();
        r.host.place(r.stranger, r.territory.inside());
        r.tick();
        r.host.expire_effect(r.stranger);
        r.tick();
        assert_eq!(r.host.effect_applications(r.stranger), 2);
    }

    #[test]
    fn locked_ally_keeps_slot_after_leaving() {
        let r = raid(GuardConfig {
            limit_assists: true,
            alliance_assists: 1,
            lock_participants: true,
            ..GuardConfig::default()
        });
        r.breach();
        r.host.place(r.owner, r.territory.inside());
        r.tick();
        r.host.place(r.owner, Position::new(50, 50));
        r.tick();
        let session = r.monitor.session(r.castle).unwrap();
        assert_eq!(session.active_allies, vec![r.owner]);

        r.host.place(r.mate, r.territory.inside());
        let report = r.tick();
        assert_eq!(report.penalized, vec![(r.mate, Violation::AllyCapReached)]);
    }

    #[test]
    fn missing_position_skips_unit_only() {
        let r = raid(GuardConfig::default());
        r.breach();
        r.host.unplace(r.owner);
        r.host.place(r.stranger, r.territory.inside());
        let report = r.tick();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.processed, 3);
        assert_eq!(r.host.effect_applications(r.stranger), 1);
    }

    #[test]
    fn host_fault_does_not_abort_the_sweep() {
        let r = raid(GuardConfig::default());
        let other = r.host.add_player(5, "Other", None);
        r.breach();
        r.host.fail_effects_for(r.stranger);
        r.host.place(r.stranger, r.territory.inside());
        r.host.place(other, r.territory.inside());
        let report = r.tick();
        assert_eq!(report.faults, 1);
        assert!(report.sweep_completed);
        assert_eq!(r.host.effect_applications(other), 1);
    }

    #[test]
    fn budget_spreads_sweep_over_ticks() {
        let r = raid(GuardConfig::default());
        r.breach();
        let first = r.monitor.poll(&r.host, 3);
        assert_eq!(first.processed, 3);
        assert!(!first.sweep_completed);
        assert_eq!(r.monitor.pending_units(), 1);
        let second = r.monitor.poll(&r.host, 3);
        assert_eq!(second.processed, 1);
        assert!(second.sweep_completed);
    }

    #[test]
    fn siege_end_drops_session_and_stops() {
        let r = raid(GuardConfig::default());
        r.breach();
        r.tick();
        r.host.set_sieged(r.castle, false);
        let report = r.tick();
        assert_eq!(report.dropped, vec![r.castle]);
        assert!(report.stopped);
        assert_eq!(r.monitor.state(), MonitorState::Idle);

        // Only a new breach restarts the loop.
        assert_eq!(r.tick(), PollReport::default());
        r.host.set_sieged(r.castle, true);
        assert_eq!(r.breach(), BreachOutcome::MonitorStarted);
    }

    #[test]
    fn second_siege_gets_its_own_session() {
        let r = raid(GuardConfig::default());
        let keep = r
            .host
            .add_structure(200, r.stranger, Territory::new((20, 20), (30, 30)));
        assert_eq!(r.breach(), BreachOutcome::MonitorStarted);
        assert_eq!(
            r.monitor
                .on_siege_breached(&r.host, &r.alliances, r.raider, keep),
            BreachOutcome::SessionOpened
        );
        assert_eq!(r.tick().processed, 8);

        r.host.set_sieged(r.castle, false);
        let report = r.tick();
        assert_eq!(report.dropped, vec![r.castle]);
        assert!(!report.stopped);
        assert_eq!(report.processed, 4);
        assert!(r.monitor.is_running());
        assert_eq!(r.monitor.raid_of(r.raider), Some(keep));
    }

    #[test]
    fn gate_queries() {
        let r = raid(GuardConfig::default());
        r.breach();
        assert_eq!(r.monitor.raid_of(r.raider), Some(r.castle));
        assert_eq!(r.monitor.raid_of(r.owner), None);
        assert_eq!(r.monitor.defenders_of(r.castle), Some(vec![r.owner, r.mate]));
        assert!(r.monitor.interference(r.raider, r.stranger));
        assert!(!r.monitor.interference(r.raider, r.owner));
        assert!(!r.monitor.interference(r.stranger, r.owner));
    }
}
