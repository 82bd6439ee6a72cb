use std::cmp::Reverse;

use super::Match;

/// Settles overlaps between candidates, rightmost wins.
///
/// Candidates are visited by descending end. One is accepted only when it
/// ends strictly before the most recently accepted one starts; anything
/// else is dropped whole, never trimmed. Among candidates with the same end
/// the longest is visited first. The result is ordered by position.
pub fn resolve(mut matches: Vec<Match>) -> Vec<Match> {
    matches.sort_by(|a, b| {
        (Reverse(a.span.to), a.span.from, a.kind.name(), &a.text).cmp(&(
            Reverse(b.span.to),
            b.span.from,
            b.kind.name(),
            &b.text,
        ))
    });

    let mut accepted: Vec<Match> = Vec::with_capacity(matches.len());
    for candidate in matches {
        let fits = accepted
            .last()
            .is_none_or(|last| candidate.span.to < last.span.from);
        if fits {
            accepted.push(candidate);
        }
    }
    accepted.reverse();
    accepted
}
