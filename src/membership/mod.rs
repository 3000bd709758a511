//! Team membership reconciliation.
//!
//! Given the membership the dashboard loaded and the membership the user submitted,
//! [`diff`] computes the additions, removals and role changes between them, and
//! [`apply`] issues the resulting mutations one at a time against the upstream.
//! The upstream has no atomic role change, so a role change is a removal followed
//! later by a re-addition.

use std::collections::HashMap;
use std::future::Future;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Member, MemberRole};

/// A member whose role differs between the two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleChange {
    pub user_id: String,
    pub from: MemberRole,
    pub to: MemberRole,
}

/// Changes needed to move a team from one membership to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MembershipDiff {
    /// In `desired` order
    pub to_add: Vec<Member>,
    /// In `previous` order
    pub to_remove: Vec<Member>,
    /// In `desired` order
    pub to_update_role: Vec<RoleChange>,
}

/// Compare two member lists by `user_id`.
///
/// Both lists are treated as sets; neither is deduplicated.
pub fn diff(previous: &[Member], desired: &[Member]) -> MembershipDiff {
    let previous_by_id: HashMap<&str, &Member> =
        previous.iter().map(|m| (m.user_id.as_str(), m)).collect();
    let desired_by_id: HashMap<&str, &Member> =
        desired.iter().map(|m| (m.user_id.as_str(), m)).collect();

    let mut result = MembershipDiff::default();

    for member in desired {
        match previous_by_id.get(member.user_id.as_str()) {
            None => result.to_add.push(member.clone()),
            Some(before) if before.role != member.role => {
                result.to_update_role.push(RoleChange {
                    user_id: member.user_id.clone(),
                    from: before.role,
                    to: member.role,
                })
            }
            Some(_) => {}
        }
    }

    result.to_remove = previous
        .iter()
        .filter(|m| !desired_by_id.contains_key(m.user_id.as_str()))
        .cloned()
        .collect();

    result
}

/// Direction of a single member mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOp {
    Add,
    Remove,
}

/// One upstream call in a reconciliation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberMutation {
    pub op: MutationOp,
    pub user_id: String,
    pub role: MemberRole,
    /// Part of a remove-then-add role change
    pub role_change: bool,
}

impl MemberMutation {
    fn add(user_id: &str, role: MemberRole, role_change: bool) -> Self {
        Self {
            op: MutationOp::Add,
            user_id: user_id.to_string(),
            role,
            role_change,
        }
    }

    fn remove(user_id: &str, role: MemberRole, role_change: bool) -> Self {
        Self {
            op: MutationOp::Remove,
            user_id: user_id.to_string(),
            role,
            role_change,
        }
    }
}

impl MembershipDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty() && self.to_update_role.is_empty()
    }

    /// Order the diff into upstream calls: removals, role-change removals,
    /// additions, then role-change re-additions.
    pub fn plan(&self) -> Vec<MemberMutation> {
        let removals = self
            .to_remove
            .iter()
            .map(|m| MemberMutation::remove(&m.user_id, m.role, false));
        let role_removals = self
            .to_update_role
            .iter()
            .map(|c| MemberMutation::remove(&c.user_id, c.from, true));
        let additions = self
            .to_add
            .iter()
            .map(|m| MemberMutation::add(&m.user_id, m.role, false));
        let role_additions = self
            .to_update_role
            .iter()
            .map(|c| MemberMutation::add(&c.user_id, c.to, true));

        removals
            .chain(role_removals)
            .chain(additions)
            .chain(role_additions)
            .collect()
    }
}

/// Upstream operations the reconciler needs.
pub trait MembershipApi {
    fn member_add(
        &self,
        team_id: &str,
        member: &Member,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn member_delete(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Reconciliation stopped at a failed call. Nothing already applied is undone.
#[derive(Debug)]
pub struct ReconcileFailure {
    pub applied: Vec<MemberMutation>,
    pub failed: MemberMutation,
    pub error: AppError,
    pub pending: Vec<MemberMutation>,
}

impl ReconcileFailure {
    /// Error carrying the applied/failed/pending log for the dashboard.
    pub fn into_app_error(self) -> AppError {
        let message = format!(
            "Membership update stopped after {} of {} changes: {}",
            self.applied.len(),
            self.applied.len() + 1 + self.pending.len(),
            self.error.message()
        );
        let log = serde_json::json!({
            "applied": self.applied,
            "failed": {
                "mutation": self.failed,
                "error": self.error.message(),
            },
            "pending": self.pending,
        });
        AppError::PartialReconcile { message, log }
    }
}

/// Issue the plan for `diff` sequentially, stopping at the first failure.
pub async fn apply<A: MembershipApi>(
    api: &A,
    team_id: &str,
    diff: &MembershipDiff,
) -> Result<Vec<MemberMutation>, ReconcileFailure> {
    let mut plan = diff.plan().into_iter();
    let mut applied = Vec::new();

    while let Some(mutation) = plan.next() {
        let result = match mutation.op {
            MutationOp::Remove => api.member_delete(team_id, &mutation.user_id).await,
            MutationOp::Add => {
                let member = Member::new(mutation.user_id.clone(), mutation.role);
                api.member_add(team_id, &member).await
            }
        };

        match result {
            Ok(()) => {
                tracing::debug!(
                    "Team {}: {:?} {} ({})",
                    team_id,
                    mutation.op,
                    mutation.user_id,
                    mutation.role
                );
                applied.push(mutation);
            }
            Err(error) => {
                tracing::warn!(
                    "Team {}: {:?} {} failed after {} applied changes",
                    team_id,
                    mutation.op,
                    mutation.user_id,
                    applied.len()
                );
                return Err(ReconcileFailure {
                    applied,
                    failed: mutation,
                    error,
                    pending: plan.collect(),
                });
            }
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn admin(id: &str) -> Member {
        Member::new(id, MemberRole::Admin)
    }

    fn user(id: &str) -> Member {
        Member::new(id, MemberRole::User)
    }

    #[test]
    fn test_mixed_changes() {
        let previous = vec![user("A"), admin("B")];
        let desired = vec![user("B"), admin("C")];

        let result = diff(&previous, &desired);
        assert_eq!(result.to_remove, vec![user("A")]);
        assert_eq!(result.to_add, vec![admin("C")]);
        assert_eq!(
            result.to_update_role,
            vec![RoleChange {
                user_id: "B".into(),
                from: MemberRole::Admin,
                to: MemberRole::User,
            }]
        );
    }

    #[test]
    fn test_identical_sets_in_any_order_are_empty() {
        let previous = vec![user("A"), admin("B"), user("C")];
        let shuffled = vec![user("C"), user("A"), admin("B")];

        assert!(diff(&previous, &previous).is_empty());
        assert!(diff(&previous, &shuffled).is_empty());
        assert!(diff(&[], &[]).is_empty());
        assert!(diff(&previous, &shuffled).plan().is_empty());
    }

    #[test]
    fn test_disjoint_sets() {
        let previous = vec![user("A"), admin("B")];
        let desired = vec![admin("C"), user("D")];

        let result = diff(&previous, &desired);
        assert_eq!(result.to_remove, previous);
        assert_eq!(result.to_add, desired);
        assert!(result.to_update_role.is_empty());
    }

    #[test]
    fn test_output_order_follows_inputs() {
        let previous = vec![user("Z"), user("Y"), admin("K2"), admin("K1")];
        let desired = vec![user("K1"), admin("N2"), user("K2"), admin("N1")];

        let result = diff(&previous, &desired);
        let ids = |ms: &[Member]| ms.iter().map(|m| m.user_id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&result.to_remove), vec!["Z", "Y"]);
        assert_eq!(ids(&result.to_add), vec!["N2", "N1"]);
        let changed: Vec<_> = result
            .to_update_role
            .iter()
            .map(|c| c.user_id.as_str())
            .collect();
        assert_eq!(changed, vec!["K1", "K2"]);
    }

    #[test]
    fn test_completeness_and_disjointness() {
        let previous = vec![user("A"), admin("B"), user("C"), admin("D")];
        let desired = vec![admin("A"), admin("B"), user("E"), admin("D")];

        let result = diff(&previous, &desired);

        // Everything in desired that is not unchanged gets (re)added.
        let mut added: Vec<Member> = result.to_add.clone();
        added.extend(
            result
                .to_update_role
                .iter()
                .map(|c| Member::new(c.user_id.clone(), c.to)),
        );
        let mut expected_added: Vec<Member> = desired
            .iter()
            .filter(|m| !previous.contains(m))
            .cloned()
            .collect();
        added.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        expected_added.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        assert_eq!(added, expected_added);

        // Everything in previous that is not unchanged gets removed.
        let mut removed: Vec<Member> = result.to_remove.clone();
        removed.extend(
            result
                .to_update_role
                .iter()
                .map(|c| Member::new(c.user_id.clone(), c.from)),
        );
        let mut expected_removed: Vec<Member> = previous
            .iter()
            .filter(|m| !desired.contains(m))
            .cloned()
            .collect();
        removed.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        expected_removed.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        assert_eq!(removed, expected_removed);

        for m in &result.to_add {
            assert!(!result.to_remove.iter().any(|r| r.user_id == m.user_id));
            assert!(!previous.iter().any(|p| p.user_id == m.user_id));
        }
        for m in &result.to_remove {
            assert!(!desired.iter().any(|d| d.user_id == m.user_id));
        }
    }

    #[test]
    fn test_plan_order() {
        let previous = vec![user("A"), admin("B")];
        let desired = vec![user("B"), admin("C")];

        let plan = diff(&previous, &desired).plan();
        assert_eq!(
            plan,
            vec![
                MemberMutation::remove("A", MemberRole::User, false),
                MemberMutation::remove("B", MemberRole::Admin, true),
                MemberMutation::add("C", MemberRole::Admin, false),
                MemberMutation::add("B", MemberRole::User, true),
            ]
        );
    }

    /// Records calls and fails on the configured call index.
    struct RecordingApi {
        calls: Mutex<Vec<String>>,
        fail_at: Option<usize>,
    }

    impl RecordingApi {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_at,
            }
        }

        fn record(&self, call: String) -> Result<(), AppError> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(call);
            if self.fail_at == Some(index) {
                Err(AppError::UpstreamStatus {
                    status: 400,
                    body: "rejected".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl MembershipApi for RecordingApi {
        async fn member_add(&self, team_id: &str, member: &Member) -> Result<(), AppError> {
            self.record(format!("add {} {} {}", team_id, member.user_id, member.role))
        }

        async fn member_delete(&self, team_id: &str, user_id: &str) -> Result<(), AppError> {
            self.record(format!("delete {} {}", team_id, user_id))
        }
    }

    #[tokio::test]
    async fn test_apply_issues_calls_in_plan_order() {
        let api = RecordingApi::new(None);
        let d = diff(&[user("A"), admin("B")], &[user("B"), admin("C")]);

        let applied = apply(&api, "t1", &d).await.unwrap();
        assert_eq!(applied.len(), 4);
        assert_eq!(
            *api.calls.lock().unwrap(),
            vec![
                "delete t1 A",
                "delete t1 B",
                "add t1 C admin",
                "add t1 B user",
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_stops_at_first_failure() {
        let api = RecordingApi::new(Some(2));
        let d = diff(&[user("A"), admin("B")], &[user("B"), admin("C")]);

        let failure = apply(&api, "t1", &d).await.unwrap_err();
        assert_eq!(failure.applied.len(), 2);
        assert_eq!(failure.failed.user_id, "C");
        assert_eq!(failure.pending.len(), 1);
        assert_eq!(failure.pending[0].user_id, "B");
        assert_eq!(api.calls.lock().unwrap().len(), 3);

        let err = failure.into_app_error();
        match err {
            AppError::PartialReconcile { message, log } => {
                assert!(message.contains("after 2 of 4"));
                assert_eq!(log["applied"].as_array().unwrap().len(), 2);
                assert_eq!(log["failed"]["mutation"]["op"], "add");
                assert_eq!(log["pending"][0]["role_change"], true);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_apply_empty_diff_makes_no_calls() {
        let api = RecordingApi::new(Some(0));
        let applied = apply(&api, "t1", &MembershipDiff::default()).await.unwrap();
        assert!(applied.is_empty());
        assert!(api.calls.lock().unwrap().is_empty());
    }
}
