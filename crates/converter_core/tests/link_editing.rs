use std::sync::Once;

use converter_core::{update, AppState, LinkSet, Msg, OutputFormat, ResizePolicy, MAX_LINKS};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(converter_logging::initialize_for_tests);
}

fn set_count(state: AppState, raw: &str) -> AppState {
    update(state, Msg::LinkCountChanged(raw.to_string())).0
}

fn edit(state: AppState, index: usize, value: &str) -> AppState {
    update(
        state,
        Msg::LinkEdited {
            index,
            value: value.to_string(),
        },
    )
    .0
}

#[test]
fn starts_with_one_empty_link_and_mp3() {
    init_logging();
    let view = AppState::new().view();

    assert_eq!(view.link_count, 1);
    assert_eq!(view.links, vec![String::new()]);
    assert_eq!(view.format, OutputFormat::Mp3);
    assert!(view.submit_enabled);
}

#[test]
fn resizing_yields_exactly_n_empty_entries() {
    init_logging();
    let mut state = AppState::new();
    for n in 1..=25usize {
        state = set_count(state, &n.to_string());
        let view = state.view();
        assert_eq!(view.link_count, n);
        assert_eq!(view.links.len(), n);
        assert!(view.links.iter().all(String::is_empty));
    }
}

#[test]
fn invalid_counts_become_one() {
    init_logging();
    for raw in ["0", "-1", "-100", "", "abc", "   "] {
        let state = set_count(AppState::new(), "4");
        let state = set_count(state, raw);
        assert_eq!(state.view().link_count, 1, "input {raw:?}");
        assert_eq!(state.links().entries(), [String::new()]);
    }
}

#[test]
fn huge_counts_are_clamped_instead_of_allocated() {
    init_logging();
    for raw in ["18446744073709551615", "99999999999999", "1000"] {
        let state = set_count(AppState::new(), raw);
        assert_eq!(state.view().link_count, MAX_LINKS, "input {raw:?}");
        assert!(state.links().entries().iter().all(String::is_empty));
    }
}

#[test]
fn editing_one_link_leaves_others_untouched() {
    init_logging();
    let state = set_count(AppState::new(), "4");
    let state = edit(state, 0, "https://youtube.com/a");
    let state = edit(state, 2, "https://youtube.com/c");
    let state = edit(state, 0, "https://youtube.com/a2");
    let state = edit(state, 3, "not a url");

    assert_eq!(
        state.links().entries(),
        [
            "https://youtube.com/a2".to_string(),
            String::new(),
            "https://youtube.com/c".to_string(),
            "not a url".to_string(),
        ]
    );
}

#[test]
fn out_of_range_edit_is_ignored() {
    init_logging();
    let mut state = set_count(AppState::new(), "2");
    assert!(state.consume_dirty());
    let before = state.clone();

    let (mut next, effects) = update(
        state,
        Msg::LinkEdited {
            index: 2,
            value: "https://youtube.com/x".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
    assert_eq!(next, before);
}

#[test]
fn shrinking_discards_all_entries() {
    init_logging();
    let state = set_count(AppState::new(), "3");
    let state = edit(state, 0, "x");
    let state = edit(state, 1, "y");
    let state = edit(state, 2, "z");

    let state = set_count(state, "1");
    assert_eq!(state.links().entries(), [String::new()]);
}

#[test]
fn growing_discards_entries_by_default() {
    init_logging();
    let state = set_count(AppState::new(), "2");
    let state = edit(state, 0, "x");

    let state = set_count(state, "3");
    assert_eq!(state.view().links, vec![String::new(); 3]);
}

#[test]
fn preserve_policy_keeps_overlapping_entries() {
    init_logging();
    let state = AppState::with_resize_policy(ResizePolicy::Preserve);
    let state = set_count(state, "3");
    let state = edit(state, 0, "x");
    let state = edit(state, 1, "y");
    let state = edit(state, 2, "z");

    let state = set_count(state, "4");
    assert_eq!(state.view().links, vec!["x", "y", "z", ""]);

    let state = set_count(state, "1");
    assert_eq!(state.view().links, vec!["x"]);
}

#[test]
fn format_selection_replaces_previous_choice() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::FormatSelected(OutputFormat::Mp4));
    assert!(effects.is_empty());
    assert_eq!(state.format(), OutputFormat::Mp4);

    let (state, _) = update(state, Msg::FormatSelected(OutputFormat::Mp3));
    assert_eq!(state.format(), OutputFormat::Mp3);
}

#[test]
fn format_parses_case_insensitively() {
    assert_eq!("mp3".parse::<OutputFormat>(), Ok(OutputFormat::Mp3));
    assert_eq!(" MP4 ".parse::<OutputFormat>(), Ok(OutputFormat::Mp4));
    assert!("wav".parse::<OutputFormat>().is_err());
    assert_eq!(OutputFormat::Mp4.to_string(), "mp4");
}

#[test]
fn link_set_rejects_out_of_range_index() {
    let mut links = LinkSet::new();
    assert!(links.set(0, "a"));
    assert!(!links.set(1, "b"));
    assert_eq!(links.get(0), Some("a"));
    assert_eq!(links.get(1), None);
    assert_eq!(links.count(), 1);
}
