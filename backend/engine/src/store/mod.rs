use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Achievement, GameSession, Reward, Task, User, Word, WordFilter};

pub mod memory;

pub use memory::InMemoryStore;

/// Abstract document store consumed by the engine: find-by-id, insert and
/// update-by-id over the mutable collections, list-active over the two
/// catalogs (catalog order is insertion order), plus filtered lookup and
/// uniform random sampling over the word pool.
///
/// Failures at this boundary are opaque adapter errors; the engine wraps
/// them into its typed taxonomy.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // Words
    async fn insert_word(&self, word: Word) -> Result<()>;
    async fn find_word(&self, id: &str) -> Result<Option<Word>>;
    async fn update_word(&self, word: &Word) -> Result<()>;
    async fn find_words(&self, filter: &WordFilter, limit: Option<usize>) -> Result<Vec<Word>>;
    /// Uniform sample without replacement; returns the whole matching pool
    /// when it is smaller than `count`.
    async fn sample_words(&self, filter: &WordFilter, count: usize) -> Result<Vec<Word>>;

    // Users
    async fn insert_user(&self, user: User) -> Result<()>;
    async fn find_user(&self, id: &str) -> Result<Option<User>>;
    async fn update_user(&self, user: &User) -> Result<()>;

    // Game sessions
    async fn insert_session(&self, session: GameSession) -> Result<()>;
    async fn find_session(&self, id: &str) -> Result<Option<GameSession>>;
    async fn update_session(&self, session: &GameSession) -> Result<()>;
    async fn find_active_session_for_user(&self, user_id: &str) -> Result<Option<GameSession>>;

    // Achievement catalog
    async fn insert_achievement(&self, achievement: Achievement) -> Result<()>;
    async fn update_achievement(&self, achievement: &Achievement) -> Result<()>;
    async fn list_active_achievements(&self) -> Result<Vec<Achievement>>;

    // Reward catalog
    async fn insert_reward(&self, reward: Reward) -> Result<()>;
    async fn update_reward(&self, reward: &Reward) -> Result<()>;
    async fn list_active_rewards(&self) -> Result<Vec<Reward>>;

    // Tasks
    async fn insert_task(&self, task: Task) -> Result<()>;
    async fn find_task(&self, id: &str) -> Result<Option<Task>>;
    async fn update_task(&self, task: &Task) -> Result<()>;
    async fn list_active_tasks(&self) -> Result<Vec<Task>>;
}
