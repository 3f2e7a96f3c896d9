//! Information-set abstraction.
//!
//! Maps an action log to a compact key from one player's point of view. Only
//! that player's equity buckets appear. Each betting action contributes its
//! two-letter token followed by `.`, prefixed by `*` when the viewpoint
//! player took it. A fold token carries no trailing dot.
//!
//! The flop and turn carry a pending bucket: it is emitted once both discard
//! decisions are in, and is replaced by the post-discard bucket if the
//! viewpoint player exchanged a card.
//!
//! Example, player 0 on the flop after both players stood pat:
//! `H2.CL.*CK.H3.`

use crate::action::Action;
use crate::history::{LogEntry, Street};

/// Number of equity buckets; equity in `[k/4, (k+1)/4)` lands in bucket `k`.
pub const BUCKETS: usize = 4;

pub fn bucket(equity: f64) -> usize {
    if !(equity > 0.0) {
        return 0;
    }
    ((equity * BUCKETS as f64) as usize).min(BUCKETS - 1)
}

fn bucket_token(equity: f64) -> String {
    format!("H{}", bucket(equity))
}

#[derive(Default)]
struct DiscardSection {
    open: bool,
    pending: String,
    decisions: usize,
    discards: usize,
}

impl DiscardSection {
    fn open(&mut self, pending: String) {
        *self = DiscardSection {
            open: true,
            pending,
            decisions: 0,
            discards: 0,
        };
    }

    /// Both players have decided once every discard has been followed by a
    /// reveal and two stand-or-discard decisions are in.
    fn complete(&self) -> bool {
        self.open && self.decisions == self.discards + 2
    }
}

pub fn infoset_key(log: &[LogEntry], viewpoint: usize) -> String {
    let mut key = String::new();
    let mut section = DiscardSection::default();

    for entry in log {
        let mut terminal_fold = false;
        match entry {
            LogEntry::Hands { equity, .. } => {
                key.push_str(&bucket_token(equity[viewpoint]));
            }
            LogEntry::Board { street, equity, .. } => match street {
                Street::Flop | Street::Turn => section.open(bucket_token(equity[viewpoint])),
                _ => key.push_str(&bucket_token(equity[viewpoint])),
            },
            LogEntry::Discard { .. } => {
                section.decisions += 1;
                section.discards += 1;
            }
            LogEntry::Reveal { player, equity, .. } => {
                section.decisions += 1;
                if *player == viewpoint {
                    section.pending = bucket_token(*equity);
                }
            }
            LogEntry::StandPat { .. } => section.decisions += 1,
            LogEntry::Act { player, action } => {
                if *player == viewpoint {
                    key.push('*');
                }
                key.push_str(action.shorthand());
                terminal_fold = *action == Action::Fold;
            }
        }

        if section.complete() {
            key.push_str(&section.pending);
            section = DiscardSection::default();
        }
        if !section.open && !terminal_fold {
            key.push('.');
        }
    }
    key
}
