//! Property tests for the progress engine invariants.

use proptest::prelude::*;
use studyquest_core::events::{celebrations, Celebration};
use studyquest_core::progress::{level_for, SUB_TOPIC_XP};
use studyquest_core::syllabus::{Chapter, SubTopic, Subject};
use studyquest_core::{Command, ProgressEngine, ProgressRecord, Syllabus, SyllabusIndex};

fn chapter(id: &str, xp: u64, subs: &[&str]) -> Chapter {
    Chapter {
        chapter_id: id.into(),
        name: String::new(),
        xp_reward: xp,
        subtopics: subs
            .iter()
            .map(|s| SubTopic {
                sub_topic_id: (*s).into(),
                name: String::new(),
            })
            .collect(),
    }
}

fn index() -> SyllabusIndex {
    let syllabus = Syllabus {
        subjects: vec![Subject {
            subject_id: "s".into(),
            name: String::new(),
            chapters: vec![
                chapter("c1", 100, &["A", "B", "C"]),
                chapter("c2", 250, &["D", "E"]),
                chapter("c3", 40, &[]),
                chapter("c4", 480, &[]),
            ],
        }],
    };
    SyllabusIndex::build(&syllabus, &[]).unwrap()
}

const SUB_TOPICS: [&str; 5] = ["A", "B", "C", "D", "E"];
const PLAIN_CHAPTERS: [&str; 2] = ["c3", "c4"];

#[derive(Debug, Clone)]
enum Op {
    Toggle(usize),
    Complete(usize),
    Uncomplete(usize),
    Reconcile(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..SUB_TOPICS.len()).prop_map(Op::Toggle),
        (0..PLAIN_CHAPTERS.len()).prop_map(Op::Complete),
        (0..PLAIN_CHAPTERS.len()).prop_map(Op::Uncomplete),
        (0..2usize).prop_map(Op::Reconcile),
    ]
}

fn to_command(op: &Op, index: &SyllabusIndex) -> Command {
    match op {
        Op::Toggle(i) => Command::ToggleSubTopic {
            sub_topic_id: SUB_TOPICS[*i].into(),
        },
        Op::Complete(i) => Command::CompleteChapter {
            chapter_id: PLAIN_CHAPTERS[*i].into(),
            xp_reward: index.xp_reward(PLAIN_CHAPTERS[*i]).unwrap(),
        },
        Op::Uncomplete(i) => Command::UncompleteChapter {
            chapter_id: PLAIN_CHAPTERS[*i].into(),
            xp_reward: index.xp_reward(PLAIN_CHAPTERS[*i]).unwrap(),
        },
        Op::Reconcile(i) => Command::ReconcileChapter {
            chapter_id: ["c1", "c2"][*i].into(),
        },
    }
}

fn expected_xp(record: &ProgressRecord, index: &SyllabusIndex) -> u64 {
    let subs = record.completed_sub_topic_ids.len() as u64 * SUB_TOPIC_XP;
    let chapters: u64 = record
        .completed_chapter_ids
        .iter()
        .map(|id| index.xp_reward(id).unwrap())
        .sum();
    subs + chapters
}

proptest! {
    #[test]
    fn invariants_hold_after_every_operation(ops in prop::collection::vec(op(), 0..60)) {
        let index = index();
        let engine = ProgressEngine::new(&index);
        let mut record = ProgressRecord::default();

        for op in &ops {
            record = engine.apply(&record, to_command(op, &index)).record;

            prop_assert_eq!(record.level, level_for(record.experience));
            prop_assert!(record.level >= 1);
            prop_assert_eq!(record.experience, expected_xp(&record, &index));

            for id in ["c1", "c2"] {
                let chapter = index.chapter(id).unwrap();
                let all_done = chapter
                    .sub_topic_ids()
                    .all(|s| record.is_sub_topic_completed(s));
                prop_assert_eq!(record.is_chapter_completed(id), all_done);
            }
        }
    }

    #[test]
    fn complete_then_uncomplete_round_trips(
        ops in prop::collection::vec(op(), 0..30),
        xp_reward in 0u64..2_000,
    ) {
        let index = index();
        let engine = ProgressEngine::new(&index);
        let mut record = ProgressRecord::default();
        for op in &ops {
            record = engine.apply(&record, to_command(op, &index)).record;
        }

        let done = engine.apply(&record, Command::CompleteChapter {
            chapter_id: "fresh".into(),
            xp_reward,
        });
        let undone = engine.apply(&done.record, Command::UncompleteChapter {
            chapter_id: "fresh".into(),
            xp_reward,
        });
        prop_assert_eq!(undone.record.experience, record.experience);
        prop_assert_eq!(&undone.record.completed_chapter_ids, &record.completed_chapter_ids);
        prop_assert_eq!(undone.record.level, record.level);
    }

    #[test]
    fn uncompleting_more_than_earned_clamps_at_zero(
        start in 0u64..1_000,
        reward in 0u64..5_000,
    ) {
        let index = index();
        let engine = ProgressEngine::new(&index);
        let mut record = ProgressRecord::default();
        record = engine.apply(&record, Command::CompleteChapter {
            chapter_id: "seed".into(),
            xp_reward: start,
        }).record;
        record.completed_chapter_ids.insert("big".into());

        let t = engine.apply(&record, Command::UncompleteChapter {
            chapter_id: "big".into(),
            xp_reward: reward,
        });
        prop_assert_eq!(t.record.experience, start.saturating_sub(reward));
        prop_assert!(t.record.level >= 1);
    }

    #[test]
    fn cascade_fires_once_in_any_order(order in Just(vec![0usize, 1, 2]).prop_shuffle()) {
        let index = index();
        let engine = ProgressEngine::new(&index);
        let mut record = ProgressRecord::default();
        let mut majors = 0;

        for i in order {
            let t = engine.apply(&record, Command::ToggleSubTopic {
                sub_topic_id: SUB_TOPICS[i].into(),
            });
            majors += celebrations(&t.events)
                .iter()
                .filter(|c| **c == Celebration::Major)
                .count();
            record = t.record;
        }
        prop_assert!(record.is_chapter_completed("c1"));
        prop_assert_eq!(record.experience, 3 * SUB_TOPIC_XP + 100);
        prop_assert_eq!(majors, 1);

        let again = engine.apply(&record, Command::ReconcileChapter { chapter_id: "c1".into() });
        prop_assert!(again.events.is_empty());
        prop_assert_eq!(again.record, record);
    }
}
