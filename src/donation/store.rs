use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::donation::form::DonationForm;
use crate::donation::preview::PreviewRegistry;

/// Live donation forms, one per session token.
///
/// Forms untouched for longer than `idle` are dropped, which also releases
/// their image previews.
pub struct FormStore {
    forms: HashMap<String, (Instant, DonationForm)>,
    previews: PreviewRegistry,
    idle: Duration,
}

impl FormStore {
    pub fn new(previews: PreviewRegistry, idle: Duration) -> Self {
        Self {
            forms: HashMap::new(),
            previews,
            idle,
        }
    }

    /// The form for `token`, created empty on first use.
    pub fn form_mut(&mut self, token: &str, owner: &str) -> &mut DonationForm {
        self.clear_stale();
        let previews = self.previews.clone();
        let entry = self
            .forms
            .entry(token.to_string())
            .or_insert_with(|| (Instant::now(), DonationForm::new(owner, previews)));
        entry.0 = Instant::now();
        &mut entry.1
    }

    /// The existing form for `token`, if the session still has one.
    pub fn get_mut(&mut self, token: &str) -> Option<&mut DonationForm> {
        let entry = self.forms.get_mut(token)?;
        entry.0 = Instant::now();
        Some(&mut entry.1)
    }

    pub fn remove(&mut self, token: &str) -> Option<DonationForm> {
        self.forms.remove(token).map(|(_, form)| form)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    fn clear_stale(&mut self) {
        let Some(cutoff) = Instant::now().checked_sub(self.idle) else {
            return;
        };
        let before = self.forms.len();
        self.forms.retain(|_, (t, _)| *t > cutoff);
        let evicted = before - self.forms.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle donation forms", evicted);
        }
    }
}
