//! Bulk modification state.
//!
//! Inside a bulk modification mutations apply immediately but listeners are
//! not notified; ending the bulk modification successfully notifies them
//! once. There is no rollback: an unsuccessful end keeps the mutations and
//! skips the notification.

use super::StoreInner;
use crate::error::{Result, StoreError};

impl StoreInner {
    pub(super) fn begin_bulk(&mut self) -> Result<()> {
        if self.in_bulk {
            return Err(StoreError::illegal("bulk modification already in progress"));
        }
        self.in_bulk = true;
        Ok(())
    }

    /// Leave bulk mode. Returns whether listeners should be notified.
    pub(super) fn end_bulk(&mut self, successful: bool) -> Result<bool> {
        if !self.in_bulk {
            return Err(StoreError::illegal("no bulk modification in progress"));
        }
        self.in_bulk = false;
        if !successful {
            log::debug!("bulk modification ended unsuccessfully, skipping notification");
        }
        Ok(successful)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_nested_begin_is_rejected() {
        let mut inner = StoreInner::new_with_config(&Config::default());
        inner.begin_bulk().unwrap();
        assert!(matches!(inner.begin_bulk(), Err(StoreError::IllegalState(_))));
        assert!(inner.in_bulk);
    }

    #[test]
    fn test_end_without_begin_is_rejected() {
        let mut inner = StoreInner::new_with_config(&Config::default());
        assert!(matches!(inner.end_bulk(true), Err(StoreError::IllegalState(_))));
    }

    #[test]
    fn test_end_reports_notification() {
        let mut inner = StoreInner::new_with_config(&Config::default());
        inner.begin_bulk().unwrap();
        assert!(inner.end_bulk(true).unwrap());
        assert!(!inner.in_bulk);

        inner.begin_bulk().unwrap();
        assert!(!inner.end_bulk(false).unwrap());
    }
}
