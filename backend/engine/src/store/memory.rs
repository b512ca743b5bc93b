use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use crate::models::{
    Achievement, GameSession, Reward, SessionStatus, Task, User, Word, WordFilter,
};
use crate::store::DocumentStore;

/// Reference store backing the tests: plain maps behind async RwLocks.
/// Catalogs keep insertion order in a Vec; everything else is keyed by id.
#[derive(Default)]
pub struct InMemoryStore {
    words: RwLock<BTreeMap<String, Word>>,
    users: RwLock<BTreeMap<String, User>>,
    sessions: RwLock<BTreeMap<String, GameSession>>,
    achievements: RwLock<Vec<Achievement>>,
    rewards: RwLock<Vec<Reward>>,
    tasks: RwLock<BTreeMap<String, Task>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_word(&self, word: Word) -> Result<()> {
        let mut words = self.words.write().await;
        if words.contains_key(&word.id) {
            return Err(anyhow!("duplicate word id {}", word.id));
        }
        words.insert(word.id.clone(), word);
        Ok(())
    }

    async fn find_word(&self, id: &str) -> Result<Option<Word>> {
        Ok(self.words.read().await.get(id).cloned())
    }

    async fn update_word(&self, word: &Word) -> Result<()> {
        let mut words = self.words.write().await;
        match words.get_mut(&word.id) {
            Some(existing) => {
                *existing = word.clone();
                Ok(())
            }
            None => Err(anyhow!("word {} does not exist", word.id)),
        }
    }

    async fn find_words(&self, filter: &WordFilter, limit: Option<usize>) -> Result<Vec<Word>> {
        let words = self.words.read().await;
        let mut matching: Vec<Word> = words
            .values()
            .filter(|word| filter.matches(word))
            .cloned()
            .collect();
        if let Some(limit) = limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn sample_words(&self, filter: &WordFilter, count: usize) -> Result<Vec<Word>> {
        let words = self.words.read().await;
        let mut matching: Vec<Word> = words
            .values()
            .filter(|word| filter.matches(word))
            .cloned()
            .collect();
        // Shuffle-and-truncate draws a uniform sample without replacement
        let mut rng = rand::rng();
        matching.shuffle(&mut rng);
        matching.truncate(count);
        Ok(matching)
    }

    async fn insert_user(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(anyhow!("duplicate user id {}", user.id));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(anyhow!("user {} does not exist", user.id)),
        }
    }

    async fn insert_session(&self, session: GameSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(anyhow!("duplicate session id {}", session.id));
        }
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn find_session(&self, id: &str) -> Result<Option<GameSession>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn update_session(&self, session: &GameSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(existing) => {
                *existing = session.clone();
                Ok(())
            }
            None => Err(anyhow!("session {} does not exist", session.id)),
        }
    }

    async fn find_active_session_for_user(&self, user_id: &str) -> Result<Option<GameSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|session| session.user_id == user_id && session.status == SessionStatus::Active)
            .cloned())
    }

    async fn insert_achievement(&self, achievement: Achievement) -> Result<()> {
        let mut achievements = self.achievements.write().await;
        if achievements.iter().any(|a| a.id == achievement.id) {
            return Err(anyhow!("duplicate achievement id {}", achievement.id));
        }
        achievements.push(achievement);
        Ok(())
    }

    async fn update_achievement(&self, achievement: &Achievement) -> Result<()> {
        let mut achievements = self.achievements.write().await;
        match achievements.iter_mut().find(|a| a.id == achievement.id) {
            Some(existing) => {
                *existing = achievement.clone();
                Ok(())
            }
            None => Err(anyhow!("achievement {} does not exist", achievement.id)),
        }
    }

    async fn list_active_achievements(&self) -> Result<Vec<Achievement>> {
        let achievements = self.achievements.read().await;
        Ok(achievements
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect())
    }

    async fn insert_reward(&self, reward: Reward) -> Result<()> {
        let mut rewards = self.rewards.write().await;
        if rewards.iter().any(|r| r.id == reward.id) {
            return Err(anyhow!("duplicate reward id {}", reward.id));
        }
        rewards.push(reward);
        Ok(())
    }

    async fn update_reward(&self, reward: &Reward) -> Result<()> {
        let mut rewards = self.rewards.write().await;
        match rewards.iter_mut().find(|r| r.id == reward.id) {
            Some(existing) => {
                *existing = reward.clone();
                Ok(())
            }
            None => Err(anyhow!("reward {} does not exist", reward.id)),
        }
    }

    async fn list_active_rewards(&self) -> Result<Vec<Reward>> {
        let rewards = self.rewards.read().await;
        Ok(rewards.iter().filter(|r| r.is_active).cloned().collect())
    }

    async fn insert_task(&self, task: Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(anyhow!("duplicate task id {}", task.id));
        }
        tasks.insert(task.id.clone(), task);
        Ok(())
    }

    async fn find_task(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(())
            }
            None => Err(anyhow!("task {} does not exist", task.id)),
        }
    }

    async fn list_active_tasks(&self) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.values().filter(|t| t.is_active).cloned().collect())
    }
}
