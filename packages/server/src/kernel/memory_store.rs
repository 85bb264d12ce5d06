//! In-process review store.
//!
//! Mirrors the PostgreSQL semantics closely enough for the activities to be
//! exercised without a database:
//! - each pull request id has its own async mutex; a transaction holds the
//!   guard from the first locking read (or insert) until commit/drop, and the
//!   mutex is forgotten once nobody holds or waits for it
//! - writes are staged inside the transaction and only applied on commit, so
//!   dropping a transaction is a full rollback
//! - team creation checks every uniqueness constraint before mutating

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::common::Resource;
use crate::domains::pull_requests::{NewPullRequest, PullRequest, PullRequestShort};
use crate::domains::teams::Team;
use crate::domains::users::User;
use crate::kernel::{BaseReviewStore, BaseStoreTx, StoreError};

#[derive(Default)]
struct Tables {
    teams: BTreeMap<String, ()>,
    users: BTreeMap<String, User>,
    /// Keyed by id; the `u64` is the insertion sequence, used to break
    /// `created_at` ties when listing newest first.
    pull_requests: HashMap<String, (u64, PullRequest)>,
    next_seq: u64,
}

type RowLocks = Arc<std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>>;

/// Held row lock. Dropping it unlocks the row and prunes the row's mutex
/// when no other transaction holds or awaits it.
struct RowGuard {
    pull_request_id: String,
    row_locks: RowLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RowGuard {
    fn drop(&mut self) {
        // Release our reference first so only the map's copy remains
        drop(self.guard.take());

        let mut locks = self.row_locks.lock().unwrap_or_else(PoisonError::into_inner);
        let unused = locks
            .get(&self.pull_request_id)
            .is_some_and(|row| Arc::strong_count(row) == 1);
        if unused {
            locks.remove(&self.pull_request_id);
        }
    }
}

#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    row_locks: RowLocks,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed state of a pull request, bypassing row locks.
    pub async fn snapshot(&self, pull_request_id: &str) -> Option<PullRequest> {
        let tables = self.tables.read().await;
        tables
            .pull_requests
            .get(pull_request_id)
            .map(|(_, pr)| pr.clone())
    }
}

#[async_trait]
impl BaseReviewStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn BaseStoreTx>, StoreError> {
        Ok(Box::new(MemoryTx {
            tables: self.tables.clone(),
            row_locks: self.row_locks.clone(),
            held: HashMap::new(),
            staged: HashMap::new(),
        }))
    }

    async fn create_team(&self, team: &Team) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        if tables.teams.contains_key(&team.team_name) {
            return Err(StoreError::AlreadyExists(Resource::Team));
        }
        let mut seen = std::collections::HashSet::new();
        for member in &team.members {
            if tables.users.contains_key(&member.user_id) || !seen.insert(&member.user_id) {
                return Err(StoreError::AlreadyExists(Resource::User));
            }
        }

        tables.teams.insert(team.team_name.clone(), ());
        for member in &team.members {
            tables.users.insert(
                member.user_id.clone(),
                User::from_member(member, &team.team_name),
            );
        }
        Ok(())
    }

    async fn get_team(&self, team_name: &str) -> Result<Team, StoreError> {
        let tables = self.tables.read().await;
        if !tables.teams.contains_key(team_name) {
            return Err(StoreError::NotFound);
        }

        // BTreeMap iteration is already ordered by user_id
        let members = tables
            .users
            .values()
            .filter(|user| user.team_name == team_name)
            .map(User::as_member)
            .collect();
        Ok(Team::new(team_name, members))
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(user_id).ok_or(StoreError::NotFound)?;
        user.is_active = is_active;
        Ok(user.clone())
    }

    async fn list_prs_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, StoreError> {
        let tables = self.tables.read().await;
        let mut assigned: Vec<&(u64, PullRequest)> = tables
            .pull_requests
            .values()
            .filter(|(_, pr)| pr.has_reviewer(user_id))
            .collect();
        assigned.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        Ok(assigned.into_iter().map(|(_, pr)| pr.summary()).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct MemoryTx {
    tables: Arc<RwLock<Tables>>,
    row_locks: RowLocks,
    held: HashMap<String, RowGuard>,
    staged: HashMap<String, PullRequest>,
}

impl MemoryTx {
    /// Acquire the row lock for `pull_request_id` unless this transaction
    /// already holds it.
    async fn lock_row(&mut self, pull_request_id: &str) {
        if self.held.contains_key(pull_request_id) {
            return;
        }
        let row = {
            let mut locks = self.row_locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks
                .entry(pull_request_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let guard = row.lock_owned().await;
        self.held.insert(
            pull_request_id.to_string(),
            RowGuard {
                pull_request_id: pull_request_id.to_string(),
                row_locks: self.row_locks.clone(),
                guard: Some(guard),
            },
        );
    }

    async fn current(&self, pull_request_id: &str) -> Option<PullRequest> {
        if let Some(pr) = self.staged.get(pull_request_id) {
            return Some(pr.clone());
        }
        let tables = self.tables.read().await;
        tables
            .pull_requests
            .get(pull_request_id)
            .map(|(_, pr)| pr.clone())
    }
}

#[async_trait]
impl BaseStoreTx for MemoryTx {
    async fn get_user(&mut self, user_id: &str) -> Result<User, StoreError> {
        let tables = self.tables.read().await;
        tables.users.get(user_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_team_members(&mut self, team_name: &str) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|user| user.team_name == team_name)
            .cloned()
            .collect())
    }

    async fn insert_pull_request(&mut self, pr: &NewPullRequest) -> Result<PullRequest, StoreError> {
        // Holding the id's lock makes concurrent inserts of one id behave like
        // a unique index: the loser sees the winner's committed row.
        self.lock_row(&pr.pull_request_id).await;

        if self.current(&pr.pull_request_id).await.is_some() {
            return Err(StoreError::AlreadyExists(Resource::PullRequest));
        }
        {
            let tables = self.tables.read().await;
            if !tables.users.contains_key(&pr.author_id) {
                return Err(StoreError::NotFound);
            }
        }

        let created = pr.clone().into_open(Utc::now());
        self.staged
            .insert(created.pull_request_id.clone(), created.clone());
        Ok(created)
    }

    async fn get_pull_request_for_update(
        &mut self,
        pull_request_id: &str,
    ) -> Result<PullRequest, StoreError> {
        self.lock_row(pull_request_id).await;
        self.current(pull_request_id)
            .await
            .ok_or(StoreError::NotFound)
    }

    async fn update_pull_request(&mut self, pr: &PullRequest) -> Result<PullRequest, StoreError> {
        self.lock_row(&pr.pull_request_id).await;
        let mut row = self
            .current(&pr.pull_request_id)
            .await
            .ok_or(StoreError::NotFound)?;

        // Same columns the SQL UPDATE touches
        row.status = pr.status;
        row.assigned_reviewers = pr.assigned_reviewers.clone();
        row.merged_at = pr.merged_at;

        self.staged.insert(row.pull_request_id.clone(), row.clone());
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx {
            tables,
            held,
            staged,
            ..
        } = *self;

        {
            let mut tables = tables.write().await;
            for (id, pr) in staged {
                let seq = match tables.pull_requests.get(&id) {
                    Some((seq, _)) => *seq,
                    None => {
                        tables.next_seq += 1;
                        tables.next_seq
                    }
                };
                tables.pull_requests.insert(id, (seq, pr));
            }
        }

        // Row locks are released only once the writes are visible
        drop(held);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::teams::TeamMember;
    use std::time::Duration;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_team(&Team::new(
                "backend",
                vec![
                    TeamMember::new("u1", "Alice", true),
                    TeamMember::new("u2", "Bob", true),
                ],
            ))
            .await
            .unwrap();
        store
    }

    fn new_pr(id: &str) -> NewPullRequest {
        NewPullRequest {
            pull_request_id: id.to_string(),
            pull_request_name: "Add search".to_string(),
            author_id: "u1".to_string(),
            assigned_reviewers: vec!["u2".to_string()],
        }
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_no_trace() {
        let store = seeded().await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_pull_request(&new_pr("pr-1")).await.unwrap();
        drop(tx);

        assert!(store.snapshot("pr-1").await.is_none());
        let mut tx = store.begin().await.unwrap();
        assert!(matches!(
            tx.get_pull_request_for_update("pr-1").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn committed_insert_is_visible() {
        let store = seeded().await;

        let mut tx = store.begin().await.unwrap();
        let created = tx.insert_pull_request(&new_pr("pr-1")).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.snapshot("pr-1").await, Some(created));
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = seeded().await;
        let mut tx = store.begin().await.unwrap();
        tx.insert_pull_request(&new_pr("pr-1")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(matches!(
            tx.insert_pull_request(&new_pr("pr-1")).await,
            Err(StoreError::AlreadyExists(Resource::PullRequest))
        ));
    }

    #[tokio::test]
    async fn insert_with_unknown_author_is_not_found() {
        let store = seeded().await;
        let mut pr = new_pr("pr-1");
        pr.author_id = "ghost".to_string();

        let mut tx = store.begin().await.unwrap();
        assert!(matches!(
            tx.insert_pull_request(&pr).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn locked_row_blocks_second_transaction_until_commit() {
        let store = seeded().await;
        let mut tx = store.begin().await.unwrap();
        tx.insert_pull_request(&new_pr("pr-1")).await.unwrap();
        tx.commit().await.unwrap();

        let mut first = store.begin().await.unwrap();
        first.get_pull_request_for_update("pr-1").await.unwrap();

        let contender = store.clone();
        let waiter = tokio::spawn(async move {
            let mut second = contender.begin().await.unwrap();
            second.get_pull_request_for_update("pr-1").await.unwrap()
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        let mut pr = first.get_pull_request_for_update("pr-1").await.unwrap();
        pr.mark_merged(Utc::now());
        first.update_pull_request(&pr).await.unwrap();
        first.commit().await.unwrap();

        let seen = waiter.await.unwrap();
        assert!(seen.is_merged());
    }

    #[tokio::test]
    async fn different_rows_do_not_contend() {
        let store = seeded().await;
        let mut tx = store.begin().await.unwrap();
        tx.insert_pull_request(&new_pr("pr-1")).await.unwrap();
        tx.insert_pull_request(&new_pr("pr-2")).await.unwrap();
        tx.commit().await.unwrap();

        let mut first = store.begin().await.unwrap();
        first.get_pull_request_for_update("pr-1").await.unwrap();

        let mut second = store.begin().await.unwrap();
        let locked = tokio::time::timeout(
            Duration::from_secs(1),
            second.get_pull_request_for_update("pr-2"),
        )
        .await;
        assert!(locked.is_ok());
    }

    fn row_lock_count(store: &MemoryStore) -> usize {
        store.row_locks.lock().unwrap().len()
    }

    #[tokio::test]
    async fn released_row_locks_are_pruned() {
        let store = seeded().await;

        for i in 0..100 {
            let mut tx = store.begin().await.unwrap();
            let missing = tx.get_pull_request_for_update(&format!("ghost-{}", i)).await;
            assert!(matches!(missing, Err(StoreError::NotFound)));
        }
        assert_eq!(row_lock_count(&store), 0);

        let mut tx = store.begin().await.unwrap();
        tx.insert_pull_request(&new_pr("pr-1")).await.unwrap();
        assert_eq!(row_lock_count(&store), 1);
        tx.commit().await.unwrap();
        assert_eq!(row_lock_count(&store), 0);
    }

    #[tokio::test]
    async fn waiting_transaction_keeps_row_lock_alive() {
        let store = seeded().await;
        let mut tx = store.begin().await.unwrap();
        tx.insert_pull_request(&new_pr("pr-1")).await.unwrap();
        tx.commit().await.unwrap();

        let mut first = store.begin().await.unwrap();
        first.get_pull_request_for_update("pr-1").await.unwrap();

        let contender = store.clone();
        let waiter = tokio::spawn(async move {
            let mut second = contender.begin().await.unwrap();
            let pr = second.get_pull_request_for_update("pr-1").await.unwrap();
            second.commit().await.unwrap();
            pr
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The waiter still needs the same mutex after the first releases it
        drop(first);
        assert_eq!(waiter.await.unwrap().pull_request_id, "pr-1");
        assert_eq!(row_lock_count(&store), 0);
    }

    #[tokio::test]
    async fn create_team_is_all_or_nothing() {
        let store = seeded().await;

        let err = store
            .create_team(&Team::new(
                "frontend",
                vec![
                    TeamMember::new("u3", "Carol", true),
                    TeamMember::new("u2", "Bob", true),
                ],
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(Resource::User)));
        assert!(matches!(
            store.get_team("frontend").await,
            Err(StoreError::NotFound)
        ));
        let mut tx = store.begin().await.unwrap();
        assert!(matches!(tx.get_user("u3").await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn duplicate_team_name_is_rejected() {
        let store = seeded().await;
        let err = store
            .create_team(&Team::new("backend", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(Resource::Team)));
    }
}
