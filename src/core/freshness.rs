//! Stale-response guard for pricing and cost-of-living fetches.
//!
//! Fetches are not cancelled. Each one is tagged with the fingerprint of the
//! selection that started it, and its result is dropped on arrival if the
//! selection has moved on.

use super::types::ProgramPricing;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RequestFingerprint {
    pub program_id: Option<i64>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl RequestFingerprint {
    /// City and state compare case-insensitively, as the data service
    /// looks them up.
    pub fn new(program_id: Option<i64>, city: Option<&str>, state: Option<&str>) -> Self {
        let normalize = |value: Option<&str>| {
            value
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
        };
        Self {
            program_id,
            city: normalize(city),
            state: normalize(state),
        }
    }

    pub fn for_program(pricing: &ProgramPricing) -> Self {
        Self::new(
            pricing.program_id,
            pricing.city.as_deref(),
            pricing.state.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchGuard {
    current: Option<RequestFingerprint>,
}

impl FetchGuard {
    /// Records a new selection; results tagged with any earlier fingerprint
    /// become stale.
    pub fn select(&mut self, fingerprint: RequestFingerprint) -> RequestFingerprint {
        self.current = Some(fingerprint.clone());
        fingerprint
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn is_current(&self, fingerprint: &RequestFingerprint) -> bool {
        self.current.as_ref() == Some(fingerprint)
    }

    /// Passes `value` through only when it belongs to the current selection.
    pub fn accept<T>(&self, fingerprint: &RequestFingerprint, value: T) -> Option<T> {
        self.is_current(fingerprint).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::LocationCostRecord;

    #[test]
    fn late_result_for_previous_program_is_discarded() {
        let mut guard = FetchGuard::default();
        let first = guard.select(RequestFingerprint::new(Some(1), Some("Austin"), Some("TX")));
        let second = guard.select(RequestFingerprint::new(Some(2), Some("Denver"), Some("CO")));

        let late = LocationCostRecord {
            rent_small: Some(1_400.0),
            ..LocationCostRecord::default()
        };
        assert!(guard.accept(&first, late.clone()).is_none());
        assert_eq!(guard.accept(&second, late.clone()), Some(late));
    }

    #[test]
    fn fingerprint_ignores_case_and_whitespace() {
        let pricing = ProgramPricing {
            program_id: Some(7),
            city: Some(" Boston ".to_string()),
            state: Some("ma".to_string()),
            ..ProgramPricing::default()
        };
        assert_eq!(
            RequestFingerprint::for_program(&pricing),
            RequestFingerprint::new(Some(7), Some("boston"), Some("MA"))
        );
    }

    #[test]
    fn nothing_is_current_before_first_selection() {
        let mut guard = FetchGuard::default();
        let fingerprint = RequestFingerprint::default();
        assert!(!guard.is_current(&fingerprint));
        guard.select(fingerprint.clone());
        assert!(guard.is_current(&fingerprint));
        guard.clear();
        assert_eq!(guard.accept(&fingerprint, 1), None);
    }
}
