use super::*;
use proptest::prelude::*;

const TABLE: EventTable = &[
    ("refs", &[HookEventKind::Push, HookEventKind::Branch, HookEventKind::Tag]),
    ("pr:opened", &[HookEventKind::PullRequest]),
    ("pr:merged", &[HookEventKind::PullRequest]),
    ("comment", &[HookEventKind::PullRequestComment, HookEventKind::IssueComment]),
];

#[test]
fn one_flag_expands_to_several_vendor_names() {
    let events = HookEvents {
        pull_request: true,
        ..Default::default()
    };
    assert_eq!(map_events(TABLE, &events), vec!["pr:opened", "pr:merged"]);
}

#[test]
fn several_flags_collapse_onto_one_vendor_name() {
    let events = HookEvents {
        push: true,
        branch: true,
        tag: true,
        ..Default::default()
    };
    assert_eq!(map_events(TABLE, &events), vec!["refs"]);
}

#[test]
fn unmapped_flags_produce_nothing() {
    let events = HookEvents {
        issue: true,
        ..Default::default()
    };
    assert!(map_events(TABLE, &events).is_empty());
}

#[test]
fn native_events_come_first_and_are_not_duplicated() {
    let input = HookInput {
        events: HookEvents {
            push: true,
            pull_request_comment: true,
            ..Default::default()
        },
        native_events: vec!["comment".into(), "custom".into(), "custom".into()],
        ..Default::default()
    };
    assert_eq!(
        input.resolve_events(TABLE),
        vec!["comment".to_string(), "custom".into(), "refs".into()]
    );
}

#[test]
fn unknown_is_the_default_state() {
    assert_eq!(State::default(), State::Unknown);
}

fn arb_events() -> impl Strategy<Value = HookEvents> {
    any::<[bool; 7]>().prop_map(|f| HookEvents {
        push: f[0],
        pull_request: f[1],
        pull_request_comment: f[2],
        issue: f[3],
        issue_comment: f[4],
        branch: f[5],
        tag: f[6],
    })
}

proptest! {
    #[test]
    fn mapped_events_are_unique(events in arb_events()) {
        let mapped = map_events(TABLE, &events);
        let unique: std::collections::HashSet<_> = mapped.iter().collect();
        prop_assert_eq!(unique.len(), mapped.len());
    }

    #[test]
    fn resolved_events_contain_every_native_event(
        events in arb_events(),
        native in proptest::collection::vec("[a-z:]{1,12}", 0..5),
    ) {
        let input = HookInput { events, native_events: native.clone(), ..Default::default() };
        let resolved = input.resolve_events(TABLE);
        for event in &native {
            prop_assert!(resolved.contains(event));
        }
        for event in map_events(TABLE, &events) {
            prop_assert_eq!(resolved.iter().filter(|e| e.as_str() == event).count(), 1);
        }
    }
}
