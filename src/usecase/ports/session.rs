use parking_lot::RwLock;

pub trait SessionStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct InMemorySession {
    token: RwLock<Option<String>>,
}

impl InMemorySession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }
}

impl SessionStore for InMemorySession {
    fn access_token(&self) -> Option<String> {
        self.token.read().clone().filter(|token| !token.is_empty())
    }
}
