//! History store and context assembly integration tests

use std::sync::Arc;

use tutor_gateway::{ContextAssembler, ContextConfig, Exchange, HistoryStore, Subject};

fn exchange(n: usize) -> Exchange {
    Exchange::new(format!("question {n}"), format!("answer {n}"))
}

#[test]
fn test_retention_bound_keeps_newest() {
    for max in [1, 3, 10, 50] {
        let store = HistoryStore::new(max);
        for n in 0..max + 5 {
            store.append(Subject::MathPhysics, exchange(n));
        }

        let snapshot = store.recent(Subject::MathPhysics, usize::MAX);
        assert_eq!(snapshot.len(), max, "max_entries = {max}");

        let first = snapshot.iter().next().unwrap();
        assert_eq!(first.question, format!("question {}", 5), "max_entries = {max}");
        assert_eq!(snapshot.last().unwrap().question, format!("question {}", max + 4));
    }
}

#[test]
fn test_chemistry_three_appends_read_back_in_order() {
    let store = HistoryStore::default();
    store.append(Subject::Chemistry, Exchange::new("What is H2O?", "Water"));
    store.append(Subject::Chemistry, Exchange::new("What is NaCl?", "Table salt"));
    store.append(Subject::Chemistry, Exchange::new("What is CO2?", "Carbon dioxide"));

    let snapshot = store.recent(Subject::Chemistry, 2);
    let questions: Vec<&str> = snapshot.iter().map(|e| e.question.as_str()).collect();
    assert_eq!(questions, ["What is NaCl?", "What is CO2?"]);

    assert!(store.recent(Subject::MathPhysics, 10).is_empty());
}

#[test]
fn test_concurrent_appends_respect_bound() {
    let store = Arc::new(HistoryStore::new(20));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for n in 0..25 {
                    store.append(Subject::Chemistry, exchange(t * 100 + n));
                    let _ = store.recent(Subject::Chemistry, 5);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(Subject::Chemistry), 20);
    assert!(store.is_empty(Subject::MathPhysics));
}

#[test]
fn test_concurrent_appends_lose_no_updates() {
    let store = Arc::new(HistoryStore::new(100));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for n in 0..20 {
                    store.append(Subject::MathPhysics, exchange(t * 100 + n));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = store.recent(Subject::MathPhysics, usize::MAX);
    assert_eq!(snapshot.len(), 80);

    let mut ids: Vec<_> = snapshot.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 80);
}

#[tokio::test]
async fn test_concurrent_subjects_do_not_interfere() {
    let store = Arc::new(HistoryStore::new(50));

    let tasks = Subject::ALL.into_iter().map(|subject| {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for n in 0..30 {
                store.append(subject, exchange(n));
            }
        })
    });

    for result in futures::future::join_all(tasks).await {
        result.unwrap();
    }

    for subject in Subject::ALL {
        assert_eq!(store.len(subject), 30, "{subject}");
    }
}

#[test]
fn test_context_uses_default_exchange_count() {
    let store = Arc::new(HistoryStore::default());
    for n in 0..6 {
        store.append(Subject::MathPhysics, exchange(n));
    }

    let assembler = ContextAssembler::new(ContextConfig::default(), store);
    let context = assembler
        .build_default(Subject::MathPhysics, "and question 6?")
        .unwrap();

    assert_eq!(context.turns.len(), 3);
    assert_eq!(context.turns[0].question, "question 3");
    assert!(context.format_prompt().ends_with("Student's message: and question 6?"));
}

#[test]
fn test_context_stays_under_ceiling_for_long_answers() {
    let store = Arc::new(HistoryStore::default());
    for n in 0..3 {
        store.append(
            Subject::Chemistry,
            Exchange::new(format!("question {n}"), "x".repeat(1_000)),
        );
    }

    let config = ContextConfig {
        max_exchanges: 3,
        max_chars: 300,
        answer_preview_chars: 1_000,
    };
    let assembler = ContextAssembler::new(config, store);
    let context = assembler.build_default(Subject::Chemistry, "next?").unwrap();

    let prompt = context.format_prompt();
    assert_eq!(context.chars, prompt.chars().count());
    assert!(prompt.chars().count() <= 300 || context.turns.is_empty());
    assert_eq!(context.question, "next?");
}

#[test]
fn test_formatted_context_respects_ceiling() {
    for ceiling in [80, 120, 200, 400] {
        let store = Arc::new(HistoryStore::default());
        for n in 0..5 {
            store.append(Subject::Chemistry, exchange(n));
        }

        let config = ContextConfig {
            max_exchanges: 5,
            max_chars: ceiling,
            ..ContextConfig::default()
        };
        let assembler = ContextAssembler::new(config, store);
        let context = assembler
            .build_default(Subject::Chemistry, "newest question")
            .unwrap();

        let sent = context.format_prompt().chars().count();
        assert_eq!(context.chars, sent, "ceiling {ceiling}");
        assert_eq!(context.turns.len() + context.dropped, 5, "ceiling {ceiling}");
        if !context.turns.is_empty() {
            assert!(sent <= ceiling, "ceiling {ceiling}: sent {sent} chars");
            assert_eq!(context.turns.last().unwrap().question, "question 4");
        }
    }
}
