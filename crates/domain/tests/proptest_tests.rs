//! Property-based tests for the composer aggregate
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::{
    entities::{CharacterBudget, Composer, ComposerLimits, MediaItem},
    errors::DomainError,
    value_objects::{MediaKind, ReplyPolicy, Sentiment},
};
use proptest::prelude::*;

fn photos(n: usize) -> Vec<MediaItem> {
    (0..n)
        .map(|i| MediaItem::new(format!("blob:{i}"), "p.png", "image/png", MediaKind::Image))
        .collect()
}

// ============================================================================
// Block Collection Property Tests
// ============================================================================

mod block_collection_tests {
    use super::*;

    proptest! {
        #[test]
        fn block_count_never_exceeds_ceiling(
            max_blocks in 1usize..15,
            attempts in 0usize..40
        ) {
            let limits = ComposerLimits { max_blocks, ..ComposerLimits::default() };
            let mut composer = Composer::new(limits);

            for _ in 0..attempts {
                let before = composer.blocks().len();
                match composer.add_block() {
                    Ok(_) => prop_assert_eq!(composer.blocks().len(), before + 1),
                    Err(err) => {
                        prop_assert_eq!(err, DomainError::BlockLimitReached { max: max_blocks });
                        prop_assert_eq!(composer.blocks().len(), before);
                    },
                }
                prop_assert!(composer.blocks().len() <= max_blocks);
            }
        }

        #[test]
        fn collection_always_keeps_one_block(
            extra in 0usize..9,
            deletes in proptest::collection::vec(0usize..10, 0..20)
        ) {
            let mut composer = Composer::default();
            for _ in 0..extra {
                composer.add_block().unwrap();
            }

            for pick in deletes {
                let ids: Vec<_> = composer.blocks().iter().map(|b| b.id()).collect();
                let id = ids[pick % ids.len()];
                let result = composer.delete_block(id);
                if ids.len() == 1 {
                    prop_assert_eq!(result.unwrap_err(), DomainError::LastBlock);
                }
                prop_assert!(!composer.blocks().is_empty());
            }
        }

        #[test]
        fn reset_is_idempotent(
            texts in proptest::collection::vec(".{0,40}", 1..5),
            verified in any::<bool>()
        ) {
            let mut composer = Composer::default();
            for text in &texts {
                let id = composer.add_block().unwrap();
                composer.update_block_text(id, text.clone()).unwrap();
            }
            if verified {
                composer.set_reply_policy(ReplyPolicy::Verified);
                composer.set_sentiment(Some(Sentiment::Bullish));
            }

            composer.reset();
            let first_texts: Vec<String> =
                composer.blocks().iter().map(|b| b.text().to_string()).collect();
            let first_policy = composer.reply_policy();
            composer.reset();

            prop_assert_eq!(composer.blocks().len(), 1);
            prop_assert_eq!(first_texts, vec![String::new()]);
            prop_assert!(!composer.has_content());
            prop_assert_eq!(composer.reply_policy(), first_policy);
            prop_assert!(composer.sentiment().is_none());
        }
    }
}

// ============================================================================
// Character Accounting Property Tests
// ============================================================================

mod character_tests {
    use super::*;

    proptest! {
        #[test]
        fn remaining_is_exact_difference(
            length in 0usize..1000,
            max in 0usize..600,
            threshold in 0usize..50
        ) {
            let budget = CharacterBudget::compute(length, max, threshold);
            prop_assert_eq!(budget.remaining, max as i64 - length as i64);
            prop_assert_eq!(budget.is_over_limit, length > max);
            prop_assert_eq!(
                budget.is_near_limit,
                length <= max && max - length <= threshold
            );
            prop_assert!((0.0..=1.0).contains(&budget.ratio));
        }

        #[test]
        fn block_text_counts_chars_not_bytes(text in "\\PC{0,300}") {
            let mut composer = Composer::default();
            let id = composer.blocks()[0].id();
            composer.update_block_text(id, text.clone()).unwrap();

            let budget = composer.block_budget(id).unwrap();
            prop_assert_eq!(budget.length, text.chars().count());
        }

        #[test]
        fn can_post_matches_definition(
            lengths in proptest::collection::vec(0usize..350, 1..5),
            whitespace_only in any::<bool>()
        ) {
            let mut composer = Composer::default();
            let first = composer.blocks()[0].id();
            let mut ids = vec![first];
            for _ in 1..lengths.len() {
                ids.push(composer.add_block().unwrap());
            }
            let fill = if whitespace_only { " " } else { "a" };
            for (id, len) in ids.iter().zip(&lengths) {
                composer.update_block_text(*id, fill.repeat(*len)).unwrap();
            }

            let within = lengths.iter().all(|l| *l <= 280);
            let content = !whitespace_only && lengths.iter().any(|l| *l > 0);
            prop_assert_eq!(composer.can_post(), within && content);
            prop_assert_eq!(composer.metrics().can_post, within && content);
        }
    }
}

// ============================================================================
// Media Ceiling Property Tests
// ============================================================================

mod media_tests {
    use super::*;

    proptest! {
        #[test]
        fn media_never_exceeds_ceiling(
            batches in proptest::collection::vec(1usize..6, 1..6)
        ) {
            let mut composer = Composer::default();
            let id = composer.blocks()[0].id();

            for batch in batches {
                let before: Vec<_> =
                    composer.blocks()[0].media().iter().map(|m| m.id).collect();
                match composer.add_media(id, photos(batch)) {
                    Ok(overflow) => {
                        let after = composer.blocks()[0].media().len();
                        prop_assert_eq!(after + overflow.len(), before.len() + batch);
                    },
                    Err(err) => {
                        prop_assert_eq!(err, DomainError::MediaLimitReached { max: 4 });
                        let after: Vec<_> =
                            composer.blocks()[0].media().iter().map(|m| m.id).collect();
                        prop_assert_eq!(after, before);
                    },
                }
                prop_assert!(composer.blocks()[0].media().len() <= 4);
            }
        }
    }
}
