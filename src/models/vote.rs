use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::role::Seat;

/// 一轮白天的公开投票记录。0 = 弃票。封盘后不可改动。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteRecord {
    pub round: u32,
    pub public_votes: HashMap<Seat, Seat>,
    pub sealed: bool,
}

impl VoteRecord {
    pub fn new(round: u32) -> Self {
        VoteRecord {
            round,
            public_votes: HashMap::new(),
            sealed: false,
        }
    }

    pub fn has_voted(&self, seat: Seat) -> bool {
        self.public_votes.contains_key(&seat)
    }

    pub fn insert(&mut self, voter: Seat, target: Seat) {
        self.public_votes.insert(voter, target);
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }
}
