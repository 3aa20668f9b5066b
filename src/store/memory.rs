//! In-process store. Nothing survives a restart.

use super::UserStore;
use crate::error::AppError;
use crate::model::{User, UserDraft};
use crate::query::{ListQuery, UserFilter};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    seq: i64,
}

#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn count(&self, filter: &UserFilter) -> Result<u64, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().filter(|u| filter.matches(u)).count() as u64)
    }

    async fn find_page(&self, query: &ListQuery) -> Result<Vec<User>, AppError> {
        let inner = self.inner.read().await;
        let mut matched: Vec<&User> = inner.users.values().filter(|u| query.filter.matches(u)).collect();
        matched.sort_by(|a, b| query.compare(a, b));
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(offset)
            .take(query.per_page as usize)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, draft: &UserDraft) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        inner.seq += 1;
        let user = draft.clone().into_user(inner.seq);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn replace(&self, id: i64, draft: &UserDraft) -> Result<Option<User>, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.users.get_mut(&id).map(|slot| {
            *slot = draft.clone().into_user(id);
            slot.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }

    async fn import(&self, users: &[User]) -> Result<u64, AppError> {
        let mut inner = self.inner.write().await;
        inner.users = users.iter().map(|u| (u.id, u.clone())).collect();
        let max_id = inner.users.keys().next_back().copied().unwrap_or(0);
        inner.seq = inner.seq.max(max_id);
        Ok(inner.users.len() as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
