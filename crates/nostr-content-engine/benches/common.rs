/// A note with `lines` lines mixing links, tags, references and filler.
pub fn generate_note(lines: usize) -> String {
    let npub = "npub180cvv07tjdrrgpa0j7j7tmnyl2yr6yr7l8j4s3evf6u64th6gkwsyjh6w6";
    (0..lines)
        .map(|i| match i % 4 {
            0 => format!("line {i} with #tag{i} and https://example.com/post/{i}"),
            1 => format!("cc nostr:{npub} about example.org/{i}"),
            2 => format!("picture https://cdn.example.com/{i}.png ok"),
            _ => "plain filler text that matches nothing at all".to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Input built to stress candidate scanning: long runs of near-miss
/// domains, hashes and bech32-looking words.
pub fn generate_adversarial(len: usize) -> String {
    let unit = "a.b.c.d.e.f.g.h.i.j##x#y#z npub1qqqqqqqqqqqq http://. ";
    unit.repeat(len / unit.len() + 1)
}
