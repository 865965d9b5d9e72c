use std::collections::HashSet;

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::db::Question;

/// Picks a question not in `previous` uniformly at random.
///
/// `None` means the quiz is over: every candidate was already asked.
pub fn pick_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &[i64],
    rng: &mut R,
) -> Option<Question> {
    let previous: HashSet<i64> = previous.iter().copied().collect();
    candidates
        .into_iter()
        .filter(|question| !previous.contains(&question.id))
        .choose(rng)
}
