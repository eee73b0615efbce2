use std::sync::Mutex;
use std::sync::MutexGuard;

/// Lock a mutex, taking the inner value even if a previous holder panicked.
///
/// Every value guarded this way (cached geometry, recorded test calls) stays
/// valid after a panic mid-update, so poisoning carries no information.
pub fn mutex_lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("recovering from poisoned mutex");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lock_returns_value() {
        let lock = Mutex::new(5);
        assert_eq!(*mutex_lock_or_recover(&lock), 5);
    }

    #[test]
    fn test_lock_recovers_after_panic() {
        let lock = Arc::new(Mutex::new(vec![1, 2]));
        let poisoner = Arc::clone(&lock);

        let _ = std::thread::spawn(move || {
            let mut guard = poisoner.lock().unwrap();
            guard.push(3);
            panic!("poison the lock");
        })
        .join();

        assert!(lock.is_poisoned());
        assert_eq!(*mutex_lock_or_recover(&lock), vec![1, 2, 3]);
    }
}
