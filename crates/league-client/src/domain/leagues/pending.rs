use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use league_core::{GatePending, LeagueAction};
use serde::{Deserialize, Serialize};

/// Every write the client can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingKind {
    Approve,
    CreateLeague,
    Action(LeagueAction),
}

impl fmt::Display for PendingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "Approve"),
            Self::CreateLeague => write!(f, "Create League"),
            Self::Action(action) => write!(f, "{}", action.label()),
        }
    }
}

impl From<LeagueAction> for PendingKind {
    fn from(action: LeagueAction) -> Self {
        PendingKind::Action(action)
    }
}

/// One in-flight flag per write kind.
#[derive(Debug, Default)]
pub struct PendingFlags {
    approve: AtomicBool,
    create_league: AtomicBool,
    start_early: AtomicBool,
    join: AtomicBool,
    settle: AtomicBool,
    claim: AtomicBool,
    refund: AtomicBool,
}

impl PendingFlags {
    fn flag(&self, kind: PendingKind) -> &AtomicBool {
        match kind {
            PendingKind::Approve => &self.approve,
            PendingKind::CreateLeague => &self.create_league,
            PendingKind::Action(LeagueAction::StartEarly) => &self.start_early,
            PendingKind::Action(LeagueAction::Join) => &self.join,
            PendingKind::Action(LeagueAction::Settle) => &self.settle,
            PendingKind::Action(LeagueAction::Claim) => &self.claim,
            PendingKind::Action(LeagueAction::Refund) => &self.refund,
        }
    }

    pub fn is_pending(&self, kind: PendingKind) -> bool {
        self.flag(kind).load(Ordering::SeqCst)
    }

    /// Set the flag for `kind`, or `None` when it is already set.
    /// The flag clears when the guard drops, whatever the outcome.
    pub fn acquire(&self, kind: PendingKind) -> Option<PendingGuard<'_>> {
        let flag = self.flag(kind);
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| PendingGuard { flag })
    }

    /// Like `acquire`, but also refuse while any of `conflicts` is in flight.
    /// Returns the kind that blocked. The own flag is set before the
    /// conflicts are read, so two conflicting kinds never both get through.
    pub fn acquire_excluding(
        &self,
        kind: PendingKind,
        conflicts: &[PendingKind],
    ) -> Result<PendingGuard<'_>, PendingKind> {
        let guard = self.acquire(kind).ok_or(kind)?;
        match conflicts.iter().find(|other| self.is_pending(**other)) {
            Some(other) => Err(*other),
            None => Ok(guard),
        }
    }

    /// Gate view of the flags: approve, and whichever write `execute` runs.
    pub fn gate_pending(&self, execute: PendingKind) -> GatePending {
        GatePending {
            approve: self.is_pending(PendingKind::Approve),
            execute: execute != PendingKind::Approve && self.is_pending(execute),
        }
    }
}

pub struct PendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_excludes_same_kind_only() {
        let flags = PendingFlags::default();
        let join = flags.acquire(LeagueAction::Join.into()).unwrap();

        assert!(flags.acquire(LeagueAction::Join.into()).is_none());
        assert!(flags.acquire(PendingKind::Approve).is_some());
        assert!(flags.is_pending(PendingKind::Action(LeagueAction::Join)));

        drop(join);
        assert!(!flags.is_pending(PendingKind::Action(LeagueAction::Join)));
        assert!(flags.acquire(LeagueAction::Join.into()).is_some());
    }

    #[test]
    fn test_acquire_excluding_blocks_conflicts() {
        let flags = PendingFlags::default();
        let join = PendingKind::Action(LeagueAction::Join);
        let approve = flags.acquire(PendingKind::Approve).unwrap();

        assert_eq!(
            flags.acquire_excluding(join, &[PendingKind::Approve]).err(),
            Some(PendingKind::Approve)
        );
        // a refused attempt leaves its own flag clear
        assert!(!flags.is_pending(join));

        drop(approve);
        let _join = flags.acquire_excluding(join, &[PendingKind::Approve]).unwrap();
        assert_eq!(
            flags
                .acquire_excluding(PendingKind::Approve, &[PendingKind::CreateLeague, join])
                .err(),
            Some(join)
        );
        assert!(!flags.is_pending(PendingKind::Approve));
    }

    #[test]
    fn test_gate_pending() {
        let flags = PendingFlags::default();
        let _approve = flags.acquire(PendingKind::Approve).unwrap();
        let pending = flags.gate_pending(PendingKind::CreateLeague);
        assert!(pending.approve);
        assert!(!pending.execute);
        assert!(pending.any());
    }
}
