use lvai_kernel::SAFE_ALPHABET;
use lvai_kernel::safe_nanoid;
use std::collections::HashSet;

#[test]
fn entity_ids_use_the_unambiguous_alphabet() {
    let id = safe_nanoid!();
    assert_eq!(id.len(), 12);
    assert!(id.chars().all(|ch| SAFE_ALPHABET.contains(&ch)), "unexpected character in {id}");
    assert!(!id.contains(['0', '1', 'I', 'O', 'l']));
}

#[test]
fn ids_do_not_collide_in_a_batch() {
    let ids: HashSet<String> = (0..1_000).map(|_| safe_nanoid!()).collect();
    assert_eq!(ids.len(), 1_000);
    assert_eq!(safe_nanoid!(20).len(), 20);
}
