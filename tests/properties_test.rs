//! Property tests: fullness under learning and text round trips

use proptest::prelude::*;

use guesstree::domain::{CodecOptions, DomainError, KnowledgeBase};

/// One teaching step: the answers to follow and what to learn at the leaf.
#[derive(Debug, Clone)]
struct Lesson {
    path: Vec<bool>,
    question: String,
    subject: String,
}

fn lesson() -> impl Strategy<Value = Lesson> {
    (
        prop::collection::vec(any::<bool>(), 0..12),
        "[a-z ]{0,12}",
        "[a-e]{1,3}",
    )
        .prop_map(|(path, question, subject)| Lesson {
            path,
            question,
            subject,
        })
}

/// Apply a lesson; returns whether the base learned something.
fn teach(kb: &mut KnowledgeBase, lesson: &Lesson) -> Result<bool, DomainError> {
    let mut cursor = kb.cursor();
    for &answer in &lesson.path {
        cursor.advance(answer);
    }
    while !cursor.is_leaf() {
        cursor.advance(true);
    }
    match cursor.learn(&lesson.question, &lesson.subject) {
        Ok(()) => Ok(true),
        Err(DomainError::DuplicateLeaf(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

fn assert_full(kb: &KnowledgeBase) {
    let mut nodes = 0;
    let mut leaves = 0;
    for (id, _) in kb.iter() {
        nodes += 1;
        match kb.children(id) {
            None => {
                leaves += 1;
                assert_eq!(kb.find_leaf(kb.text(id)), Some(id));
            }
            Some((yes, no)) => {
                assert_eq!(kb.parent(yes), Some(id));
                assert_eq!(kb.parent(no), Some(id));
            }
        }
    }
    assert_eq!(nodes, kb.tree_size());
    assert_eq!(leaves, kb.leaf_count());
    assert_eq!(nodes, 2 * leaves - 1);
}

proptest! {
    #[test]
    fn given_any_lessons_when_learning_then_tree_stays_full(
        lessons in prop::collection::vec(lesson(), 0..40)
    ) {
        let mut kb = KnowledgeBase::new("root").unwrap();
        for lesson in &lessons {
            let size = kb.tree_size();
            let before = kb.to_text(&CodecOptions::default());

            let learned = teach(&mut kb, lesson).unwrap();

            if learned {
                prop_assert_eq!(kb.tree_size(), size + 2);
            } else {
                prop_assert_eq!(kb.tree_size(), size);
                prop_assert_eq!(kb.to_text(&CodecOptions::default()), before);
            }
            assert_full(&kb);
        }
    }

    #[test]
    fn given_any_learned_base_when_round_tripping_then_isomorphic(
        lessons in prop::collection::vec(lesson(), 0..40),
        compact in any::<bool>(),
    ) {
        let mut kb = KnowledgeBase::new("root").unwrap();
        for lesson in &lessons {
            teach(&mut kb, lesson).unwrap();
        }
        let options = CodecOptions { compact, ..CodecOptions::default() };

        let text = kb.to_text(&options);
        let again = KnowledgeBase::parse(&text).unwrap();

        prop_assert_eq!(again.to_text(&options), text);
        prop_assert_eq!(again.tree_size(), kb.tree_size());
        prop_assert_eq!(
            again.subjects().collect::<Vec<_>>(),
            kb.subjects().collect::<Vec<_>>()
        );
        assert_full(&again);
    }
}
