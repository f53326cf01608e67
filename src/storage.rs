use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ContactMessage, NewContactMessage, NewUser, User};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_: PoisonError<T>) -> Self {
        StorageError::Poisoned
    }
}

// Все операции хранилища. None означает "записи нет", а не ошибку
pub trait Storage: Send + Sync {
    fn get_user(&self, id: &str) -> Result<Option<User>, StorageError>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;
    fn create_user(&self, user: NewUser) -> Result<User, StorageError>;

    fn create_contact_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, StorageError>;
    fn get_contact_messages(&self) -> Result<Vec<ContactMessage>, StorageError>;
    fn get_contact_message(&self, id: &str) -> Result<Option<ContactMessage>, StorageError>;
    fn mark_message_as_read(&self, id: &str) -> Result<Option<ContactMessage>, StorageError>;
}

// Векторы хранят порядок вставки, он же разрешает равные created_at
#[derive(Default)]
struct Inner {
    users: Vec<User>,
    messages: Vec<ContactMessage>,
    // id сообщения -> позиция в messages
    message_index: HashMap<String, usize>,
    last_created_at: Option<DateTime<Utc>>,
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// Хранилище в памяти, данные теряются при перезапуске
pub struct MemStorage {
    inner: RwLock<Inner>,
    clock: Clock,
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::with_clock(Utc::now)
    }
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    // Источник времени для created_at
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            inner: RwLock::default(),
            clock: Box::new(clock),
        }
    }
}

impl Storage for MemStorage {
    fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        let inner = self.inner.read()?;
        Ok(inner.users.iter().find(|user| user.id == id).cloned())
    }

    // Линейный поиск, при дубликатах возвращается самый ранний
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let inner = self.inner.read()?;
        Ok(inner.users.iter().find(|user| user.username == username).cloned())
    }

    fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: user.username,
            password: user.password,
        };

        let mut inner = self.inner.write()?;
        inner.users.push(user.clone());
        Ok(user)
    }

    fn create_contact_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, StorageError> {
        let mut inner = self.inner.write()?;

        // created_at не убывает, даже если системные часы откатились назад
        let now = (self.clock)();
        let created_at = match inner.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        inner.last_created_at = Some(created_at);

        let message = ContactMessage {
            id: Uuid::new_v4().to_string(),
            name: message.name,
            email: message.email,
            subject: message.subject.filter(|subject| !subject.is_empty()),
            message: message.message,
            created_at,
            is_read: false,
        };

        let position = inner.messages.len();
        inner.message_index.insert(message.id.clone(), position);
        inner.messages.push(message.clone());
        Ok(message)
    }

    // Сначала самые новые; при равном created_at позже вставленное идёт первым
    fn get_contact_messages(&self) -> Result<Vec<ContactMessage>, StorageError> {
        let inner = self.inner.read()?;
        let mut messages: Vec<ContactMessage> = inner.messages.iter().rev().cloned().collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    fn get_contact_message(&self, id: &str) -> Result<Option<ContactMessage>, StorageError> {
        let inner = self.inner.read()?;
        Ok(inner
            .message_index
            .get(id)
            .and_then(|&position| inner.messages.get(position))
            .cloned())
    }

    fn mark_message_as_read(&self, id: &str) -> Result<Option<ContactMessage>, StorageError> {
        let mut inner = self.inner.write()?;
        let Some(&position) = inner.message_index.get(id) else {
            return Ok(None);
        };

        Ok(inner.messages.get_mut(position).map(|message| {
            message.is_read = true;
            message.clone()
        }))
    }
}
