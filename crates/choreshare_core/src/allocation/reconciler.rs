//! Computes the load delta persisted after a run.
//!
//! The lower-loaded user is carried forward by `higher - lower`; the
//! higher-loaded user gets `0`. Equal loads persist `(0, 0)`.

use crate::model::chore::UserSlot;
use crate::model::load::{CumulativeLoads, LoadDelta};

pub fn reconcile(final_loads: CumulativeLoads) -> LoadDelta {
    let CumulativeLoads { user1, user2 } = final_loads;
    if user1 < user2 {
        LoadDelta::carry_to(UserSlot::One, user2 - user1)
    } else if user2 < user1 {
        LoadDelta::carry_to(UserSlot::Two, user1 - user2)
    } else {
        LoadDelta::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::reconcile;
    use crate::model::load::{CumulativeLoads, LoadDelta};

    #[test]
    fn lower_loaded_user_receives_the_gap() {
        assert_eq!(
            reconcile(CumulativeLoads::new(0.25, 1.0)),
            LoadDelta {
                user1: 0.75,
                user2: 0.0
            }
        );
        assert_eq!(
            reconcile(CumulativeLoads::new(2.0, 0.5)),
            LoadDelta {
                user1: 0.0,
                user2: 1.5
            }
        );
    }

    #[test]
    fn equal_loads_persist_nothing() {
        assert_eq!(reconcile(CumulativeLoads::new(0.5, 0.5)), LoadDelta::NONE);
    }
}
