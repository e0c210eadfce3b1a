use crate::{parse_link_count, AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::LinkCountChanged(raw) => {
            state.set_link_count(parse_link_count(&raw));
            Vec::new()
        }
        Msg::LinkEdited { index, value } => {
            // Out-of-range edits cannot come from the form; drop them silently.
            state.set_link(index, value);
            Vec::new()
        }
        Msg::FormatSelected(format) => {
            state.set_format(format);
            Vec::new()
        }
        Msg::SubmitClicked => {
            if !state.submission().accepts_submit() {
                return (state, Vec::new());
            }
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = state.expiring_success() {
                effects.push(Effect::CancelSuccessExpiry {
                    submission_id: previous,
                });
            }
            let submission_id = state.begin_submission();
            effects.push(Effect::SubmitBatch {
                submission_id,
                links: state.links().snapshot(),
                format: state.format(),
            });
            effects
        }
        Msg::TransferProgress {
            submission_id,
            bytes,
        } => {
            state.apply_progress(submission_id, bytes);
            Vec::new()
        }
        Msg::BatchSucceeded {
            submission_id,
            archive,
        } => {
            if state.complete_success(submission_id, archive) {
                vec![Effect::ScheduleSuccessExpiry {
                    submission_id,
                    after: state.success_window(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::BatchFailed {
            submission_id,
            failure,
        } => {
            if state.complete_failure(submission_id, failure.clone()) {
                vec![Effect::ReportFailure {
                    submission_id,
                    failure,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::FailureReported { submission_id } => {
            state.acknowledge_failure(submission_id);
            Vec::new()
        }
        Msg::SuccessExpired { submission_id } => {
            state.expire_success(submission_id);
            Vec::new()
        }
    };

    (state, effects)
}
