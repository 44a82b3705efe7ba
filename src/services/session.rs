use crate::models::user::User;
use parking_lot::Mutex;
use std::sync::Arc;

/// Local snapshot of the signed-in user's non-sensitive profile. It is a
/// display cache only; the session cookie is the source of truth.
pub trait ProfileCache: Send + Sync {
    fn load(&self) -> Option<User>;
    fn store(&self, user: &User);
    fn clear(&self);
}

/// Reacts to the server declaring the session invalid.
pub trait SessionObserver: Send + Sync {
    fn on_unauthorized(&self);
}

impl<F> SessionObserver for F
where
    F: Fn() + Send + Sync,
{
    fn on_unauthorized(&self) {
        self();
    }
}

#[derive(Debug, Default)]
pub struct MemoryProfileCache {
    user: Mutex<Option<User>>,
}

impl ProfileCache for MemoryProfileCache {
    fn load(&self) -> Option<User> {
        self.user.lock().clone()
    }

    fn store(&self, user: &User) {
        *self.user.lock() = Some(user.clone());
    }

    fn clear(&self) {
        self.user.lock().take();
    }
}

/// Profile snapshot persisted under `localStorage["user"]`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageProfileCache;

#[cfg(target_arch = "wasm32")]
impl LocalStorageProfileCache {
    const KEY: &'static str = "user";
}

#[cfg(target_arch = "wasm32")]
impl ProfileCache for LocalStorageProfileCache {
    fn load(&self) -> Option<User> {
        use gloo_storage::Storage;
        gloo_storage::LocalStorage::get(Self::KEY).ok()
    }

    fn store(&self, user: &User) {
        use gloo_storage::Storage;
        if let Err(e) = gloo_storage::LocalStorage::set(Self::KEY, user) {
            tracing::warn!(error = ?e, "Failed to cache user profile");
        }
    }

    fn clear(&self) {
        use gloo_storage::Storage;
        gloo_storage::LocalStorage::delete(Self::KEY);
    }
}

/// Sends the browser to the login page.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    path: String,
}

#[cfg(target_arch = "wasm32")]
impl LoginRedirect {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LoginRedirect {
    fn default() -> Self {
        Self::new(crate::config::Config::LOGIN_PATH)
    }
}

#[cfg(target_arch = "wasm32")]
impl SessionObserver for LoginRedirect {
    fn on_unauthorized(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.location().set_href(&self.path) {
            tracing::warn!(error = ?e, "Failed to redirect to login");
        }
    }
}

/// Profile cache and unauthorized hook shared by every service of a client.
#[derive(Clone)]
pub struct Session {
    cache: Arc<dyn ProfileCache>,
    observer: Arc<dyn SessionObserver>,
}

impl Session {
    pub fn new(cache: Arc<dyn ProfileCache>, observer: Arc<dyn SessionObserver>) -> Self {
        Self { cache, observer }
    }

    pub fn current_user(&self) -> Option<User> {
        self.cache.load()
    }

    pub fn remember(&self, user: &User) {
        self.cache.store(user);
    }

    /// Called when the server rejects the session cookie.
    pub fn invalidate(&self) {
        tracing::warn!("Session is no longer valid, clearing cached profile");
        self.end();
    }

    /// Drops the cached profile and fires the unauthorized hook.
    pub fn end(&self) {
        self.cache.clear();
        self.observer.on_unauthorized();
    }
}

impl Default for Session {
    #[cfg(not(target_arch = "wasm32"))]
    fn default() -> Self {
        Self::new(Arc::new(MemoryProfileCache::default()), Arc::new(|| {}))
    }

    #[cfg(target_arch = "wasm32")]
    fn default() -> Self {
        Self::new(
            Arc::new(LocalStorageProfileCache),
            Arc::new(LoginRedirect::default()),
        )
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("signed_in", &self.cache.load().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn student() -> User {
        User {
            id: Some("64b7f0c2a1b2c3d4e5f60718".into()),
            name: "Ana".into(),
            email: "ana@uni.edu".into(),
            role: Some(Role::Student),
            ..User::default()
        }
    }

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryProfileCache::default();
        assert!(cache.load().is_none());

        cache.store(&student());
        assert_eq!(cache.load(), Some(student()));

        cache.clear();
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_invalidate_clears_and_notifies() {
        let redirects = Arc::new(AtomicUsize::new(0));
        let counter = redirects.clone();
        let session = Session::new(
            Arc::new(MemoryProfileCache::default()),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        session.remember(&student());
        session.invalidate();

        assert!(session.current_user().is_none());
        assert_eq!(redirects.load(Ordering::SeqCst), 1);
    }
}
