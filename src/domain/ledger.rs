use std::collections::HashSet;

/// Condition ids redeemed during this run. Entries are never removed.
///
/// Owned by the redeem loop and only touched through `&mut self`; a multi-worker variant
/// must keep `add` as the single check-and-set point.
#[derive(Debug, Default)]
pub struct RedemptionLedger {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl RedemptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, condition_id: &str) -> bool {
        self.seen.contains(condition_id)
    }

    /// Records a redeemed condition. Returns `false` if it was already recorded.
    pub fn add(&mut self, condition_id: &str) -> bool {
        if !self.seen.insert(condition_id.to_string()) {
            return false;
        }
        self.order.push(condition_id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Recorded ids in redemption order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
