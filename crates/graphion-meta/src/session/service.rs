//! Session operations.
//!
//! The session table is the single source of truth for which clients are
//! connected and which queries they run. Front-ends hold possibly-stale
//! snapshots and reconcile them through [`SessionService::update_sessions`];
//! kill signals travel the other way as persisted `Killing` markers that
//! each heartbeat re-asserts until the owning front-end confirms them.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use graphion_protocol::{
    CreateSessionRequest, ExecutionPlanId, QueryDesc, QueryStatus, Session, SessionId,
    UpdateSessionsResponse,
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::user::UserDirectory;

use super::clock::SessionIdGenerator;
use super::error::{SessionError, SessionResult};
use super::repository::SessionRepository;

/// Service implementing the session and query lifecycle operations.
///
/// One process-wide reader/writer lock serializes every table mutation;
/// pure reads share it. The store is the only state carried between calls.
pub struct SessionService {
    repo: SessionRepository,
    users: Arc<dyn UserDirectory>,
    clock: SessionIdGenerator,
    lock: RwLock<()>,
}

impl SessionService {
    /// Create a new session service.
    pub fn new(repo: SessionRepository, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            repo,
            users,
            clock: SessionIdGenerator::new(),
            lock: RwLock::new(()),
        }
    }

    /// Open a session for `user` connected to `graph_addr` from `client_ip`.
    ///
    /// The user must exist in the directory; nothing is written before that
    /// check passes.
    #[instrument(skip(self, request), fields(user = %request.user))]
    pub async fn create_session(&self, request: CreateSessionRequest) -> SessionResult<Session> {
        let _guard = self.lock.write().await;

        if !self.users.user_exists(&request.user).await? {
            return Err(SessionError::UserNotFound(request.user));
        }

        let session_id = self.clock.next_id();
        let session = Session {
            session_id,
            create_time: session_id,
            update_time: session_id,
            user_name: request.user,
            graph_addr: request.graph_addr,
            client_ip: request.client_ip,
            queries: HashMap::new(),
        };

        self.repo.put(&session).await?;
        info!(session_id, user = %session.user_name, "created session");
        Ok(session)
    }

    /// Reconcile a batch of client-observed session snapshots.
    ///
    /// Each snapshot is handled independently:
    /// - a session missing server-side was killed; its id is reported back
    ///   and nothing is written for it;
    /// - queries the server marked `Killing` are re-asserted into the
    ///   snapshot and reported, so a kill cannot be lost to an unreliable
    ///   heartbeat channel;
    /// - a snapshot older than the persisted record is dropped (the
    ///   `update_time` guard), keeping out-of-order delivery from
    ///   regressing state.
    ///
    /// Surviving snapshots are persisted in one batched write. If that
    /// write fails the error is returned and no results are reported;
    /// reconciliation is idempotent, so callers retry the whole batch.
    #[instrument(skip(self, sessions), fields(count = sessions.len()))]
    pub async fn update_sessions(
        &self,
        sessions: Vec<Session>,
    ) -> SessionResult<UpdateSessionsResponse> {
        let _guard = self.lock.write().await;

        let mut staged: Vec<Session> = Vec::new();
        let mut killed_queries: HashMap<SessionId, HashMap<ExecutionPlanId, QueryDesc>> =
            HashMap::new();
        let mut killed_sessions: Vec<SessionId> = Vec::new();

        for mut snapshot in sessions {
            let session_id = snapshot.session_id;
            let persisted = match self.repo.get(session_id).await {
                Ok(persisted) => persisted,
                Err(err) if err.is_not_found() => {
                    // Removed server-side since the client last saw it.
                    debug!(session_id, "heartbeat for killed session");
                    killed_sessions.push(session_id);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let killed_in_session = merge_kill_markers(&persisted, &mut snapshot);
            if !killed_in_session.is_empty() {
                killed_queries.insert(session_id, killed_in_session);
            }

            if persisted.update_time > snapshot.update_time {
                debug!(
                    session_id,
                    new_update_time = snapshot.update_time,
                    old_update_time = persisted.update_time,
                    "dropping stale heartbeat"
                );
                continue;
            }

            staged.push(snapshot);
        }

        self.repo.put_batch(&staged).await?;

        Ok(UpdateSessionsResponse {
            killed_queries,
            killed_sessions,
        })
    }

    /// Every session in the table, in store scan order.
    pub async fn list_sessions(&self) -> SessionResult<Vec<Session>> {
        let _guard = self.lock.read().await;
        Ok(self.repo.list().await?)
    }

    /// Point lookup by session id.
    pub async fn get_session(&self, session_id: SessionId) -> SessionResult<Session> {
        let _guard = self.lock.read().await;
        self.repo.get(session_id).await.map_err(|err| {
            if err.is_not_found() {
                SessionError::SessionNotFound(session_id)
            } else {
                err.into()
            }
        })
    }

    /// Remove a batch of sessions, best-effort per id.
    ///
    /// A missing session is a normal outcome (someone else already removed
    /// it) and a failed remove is logged and skipped; the returned ids are
    /// exactly those actually removed. This call never fails as a whole.
    #[instrument(skip(self, session_ids), fields(count = session_ids.len()))]
    pub async fn remove_sessions(
        &self,
        session_ids: Vec<SessionId>,
    ) -> SessionResult<Vec<SessionId>> {
        let _guard = self.lock.write().await;

        let mut removed = Vec::new();
        for session_id in session_ids {
            if let Err(err) = self.repo.get(session_id).await {
                debug!(session_id, %err, "skipping remove");
                continue;
            }

            if let Err(err) = self.repo.remove(session_id).await {
                warn!(session_id, %err, "failed to remove session");
                continue;
            }

            removed.push(session_id);
        }

        info!(removed = removed.len(), "removed sessions");
        Ok(removed)
    }

    /// Mark the named execution plans for killing, fail-fast.
    ///
    /// Every named session and plan must exist; the first miss aborts the
    /// request with nothing staged for that session. Sessions that pass
    /// validation are persisted together in one batched write, which
    /// [`SessionService::update_sessions`] later propagates to the owning
    /// front-ends.
    #[instrument(skip(self, kill_queries), fields(sessions = kill_queries.len()))]
    pub async fn kill_queries(
        &self,
        kill_queries: BTreeMap<SessionId, BTreeSet<ExecutionPlanId>>,
    ) -> SessionResult<()> {
        let _guard = self.lock.write().await;

        let mut staged: Vec<Session> = Vec::new();
        for (session_id, plan_ids) in kill_queries {
            let mut session = self.repo.get(session_id).await.map_err(|err| {
                if err.is_not_found() {
                    SessionError::SessionNotFound(session_id)
                } else {
                    SessionError::from(err)
                }
            })?;

            for plan_id in plan_ids {
                let query = session.queries.get_mut(&plan_id).ok_or(
                    SessionError::QueryNotFound {
                        session_id,
                        plan_id,
                    },
                )?;
                query.status = QueryStatus::Killing;
            }

            staged.push(session);
        }

        self.repo.put_batch(&staged).await?;
        info!(sessions = staged.len(), "marked queries for killing");
        Ok(())
    }
}

/// Re-assert persisted kill markers into a heartbeat snapshot.
///
/// For every query the store has as `Killing` that the snapshot still
/// reports un-killed, flip the snapshot entry in place and collect the
/// persisted descriptor. Persisted queries absent from the snapshot already
/// finished client-side and are ignored; a snapshot that itself reports
/// `Killing` has confirmed the signal, so it is not reported again.
fn merge_kill_markers(
    persisted: &Session,
    snapshot: &mut Session,
) -> HashMap<ExecutionPlanId, QueryDesc> {
    let mut killed = HashMap::new();
    for (plan_id, saved) in &persisted.queries {
        if saved.status != QueryStatus::Killing {
            continue;
        }
        if let Some(submitted) = snapshot.queries.get_mut(plan_id) {
            if submitted.status != QueryStatus::Killing {
                submitted.status = QueryStatus::Killing;
                killed.insert(*plan_id, saved.clone());
            }
        }
    }
    killed
}
