use evalgrade_core::agreement::{Aggregator, SubCategory};
use evalgrade_core::normalize::normalize;
use evalgrade_core::verdict::reconcile::reconcile;
use evalgrade_core::verdict::{parse_verdict, ParseOutcome};
use evalgrade_core::{Aspect, Label};
use proptest::prelude::*;

fn label() -> impl Strategy<Value = Label> {
    prop_oneof![
        Just(Label::Yes),
        Just(Label::No),
        Just(Label::CouldBeBetter),
        Just(Label::NotApplicable),
        Just(Label::Error),
        Just(Label::ErrorParsing),
    ]
}

fn sub_category() -> impl Strategy<Value = SubCategory> {
    (0..SubCategory::ALL.len()).prop_map(|i| SubCategory::ALL[i])
}

fn counts(agg: &Aggregator) -> Vec<(SubCategory, usize, usize, Vec<(String, usize)>)> {
    agg.summaries()
        .map(|(sub, s)| {
            let buckets = s.buckets.iter().map(|(k, b)| (k.clone(), b.count)).collect();
            (sub, s.agree, s.disagree, buckets)
        })
        .collect()
}

proptest! {
    #[test]
    fn normalize_is_idempotent(s in "\\PC*") {
        let once = normalize(&s);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(!once.chars().any(char::is_whitespace));
    }

    #[test]
    fn aggregation_ignores_order(
        rows in prop::collection::vec((sub_category(), label(), label(), "[a-z ]{0,12}"), 0..40),
        seed in any::<u64>(),
    ) {
        let mut forward = Aggregator::new();
        for (sub, human, model, reason) in &rows {
            forward.accumulate(*sub, human, model, reason);
        }

        let mut shuffled = rows.clone();
        let n = shuffled.len();
        if n > 1 {
            let mut state = seed;
            for i in (1..n).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let j = (state >> 33) as usize % (i + 1);
                shuffled.swap(i, j);
            }
        }
        let mut backward = Aggregator::new();
        for (sub, human, model, reason) in shuffled.iter().rev() {
            backward.accumulate(*sub, human, model, reason);
        }

        prop_assert_eq!(counts(&forward), counts(&backward));
    }

    #[test]
    fn reconcile_matches_human_length(
        human in prop::collection::vec(label(), 1..8),
        model in prop::collection::vec(label(), 0..8),
        reasons in prop::collection::vec("[a-z]{0,5}", 0..8),
    ) {
        let n = human.len();
        let r = reconcile(human, model, reasons, 1);
        prop_assert_eq!(r.human.len(), n);
        prop_assert_eq!(r.model.len(), n);
        prop_assert_eq!(r.reasoning.len(), n);
    }

    #[test]
    fn parsing_never_panics(raw in "\\PC{0,200}") {
        let outcome = parse_verdict(&raw, Aspect::Relevance);
        if let ParseOutcome::Failed { raw: kept } = &outcome {
            prop_assert_eq!(kept, &raw);
            prop_assert_eq!(outcome.into_verdict().scores, vec![Label::ErrorParsing]);
        }
    }
}
