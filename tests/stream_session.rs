use std::convert::Infallible;

use bytes::Bytes;
use futures::stream;

use webforge::core::session::PhaseUpdate;
use webforge::core::{GenerationSession, Phase, SessionError, SessionState};

fn chunked(parts: &[&str]) -> impl stream::Stream<Item = Result<Bytes, Infallible>> + Unpin {
    let owned: Vec<Result<Bytes, Infallible>> = parts
        .iter()
        .map(|part| Ok(Bytes::copy_from_slice(part.as_bytes())))
        .collect();
    stream::iter(owned)
}

async fn drive_collect(
    parts: &[&str],
) -> (
    Result<webforge::Completion, SessionError>,
    Vec<PhaseUpdate>,
) {
    let mut updates = Vec::new();
    let outcome = GenerationSession::drive(chunked(parts), |update| {
        updates.push(update.clone());
    })
    .await;
    (outcome, updates)
}

#[tokio::test]
async fn session_resolves_scenario_split_mid_record() {
    // The transport splits a record across chunk boundaries; the decoder
    // must reassemble it transparently.
    let (outcome, updates) = drive_collect(&[
        "{\"phase\":\"planning\",\"mess",
        "age\":\"Planning...\"}\n{\"phase\":\"coding\",",
        "\"message\":\"Writing code...\"}\n",
        "{\"phase\":\"complete\",\"message\":\"Done\",",
        "\"project_path\":\"/out/todo-app-1/\",\"project_name\":\"Todo App\"}\n",
    ])
    .await;

    let completion = outcome.unwrap();
    assert_eq!(completion.project_name, "Todo App");
    assert_eq!(completion.folder, "todo-app-1");

    let phases: Vec<Phase> = updates.iter().map(|u| u.phase).collect();
    assert_eq!(phases, vec![Phase::Planning, Phase::Coding, Phase::Complete]);
    assert_eq!(updates.last().unwrap().progress, 1.0);
    assert_eq!(updates.last().unwrap().state, SessionState::Complete);
}

#[tokio::test]
async fn non_protocol_lines_are_skipped() {
    // A diagnostic line and an out-of-set phase tag must not advance or
    // terminate the session.
    let (outcome, updates) = drive_collect(&[
        "{\"phase\":\"planning\",\"message\":\"Planning...\"}\n",
        "INFO: compiling step 3\n",
        "{\"phase\":\"workspace\",\"message\":\"Setting up workspace...\"}\n",
        "{\"phase\":\"complete\",\"message\":\"Done\",\"project_path\":\"/out/x/\",\"project_name\":\"X\"}\n",
    ])
    .await;

    assert!(outcome.is_ok());
    let phases: Vec<Phase> = updates.iter().map(|u| u.phase).collect();
    assert_eq!(phases, vec![Phase::Planning, Phase::Complete]);
}

#[tokio::test]
async fn complete_without_project_path_is_not_a_completion() {
    let (outcome, updates) = drive_collect(&[
        "{\"phase\":\"coding\",\"message\":\"Writing code...\"}\n",
        "{\"phase\":\"complete\",\"message\":\"Done\",\"project_name\":\"Nameless\"}\n",
    ])
    .await;

    // The malformed completion is skipped and the stream then ends with no
    // terminal event.
    assert!(matches!(outcome, Err(SessionError::IncompleteStream)));
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].state, SessionState::Coding);
}

#[tokio::test]
async fn completion_path_without_folder_segment_is_skipped() {
    let (outcome, _) = drive_collect(&[
        "{\"phase\":\"complete\",\"message\":\"Done\",\"project_path\":\"///\",\"project_name\":\"X\"}\n",
    ])
    .await;
    assert!(matches!(outcome, Err(SessionError::IncompleteStream)));
}

#[tokio::test]
async fn producer_error_fails_the_session() {
    let (outcome, updates) = drive_collect(&[
        "{\"phase\":\"planning\",\"message\":\"Planning...\"}\n",
        "{\"phase\":\"error\",\"message\":\"model quota exceeded\"}\n",
    ])
    .await;

    match outcome {
        Err(SessionError::Producer(message)) => assert_eq!(message, "model quota exceeded"),
        other => panic!("expected producer error, got {:?}", other.map(|c| c.folder)),
    }
    // The failure still surfaced as an ordered phase update, with progress
    // kept from the last known phase.
    assert_eq!(updates.last().unwrap().state, SessionState::Failed);
    assert_eq!(updates.last().unwrap().progress, 0.25);
}

#[tokio::test]
async fn silent_stream_end_is_incomplete() {
    let (outcome, updates) = drive_collect(&[
        "{\"phase\":\"planning\",\"message\":\"Planning...\"}\n",
        "{\"phase\":\"coding\",\"message\":\"Writing code...\"}\n",
    ])
    .await;
    assert!(matches!(outcome, Err(SessionError::IncompleteStream)));
    assert_eq!(updates.len(), 2);
}

#[tokio::test]
async fn truncated_final_record_is_not_emitted() {
    // A complete event missing its line terminator cannot be told apart
    // from a mid-transmission cut.
    let (outcome, _) = drive_collect(&[
        "{\"phase\":\"planning\",\"message\":\"Planning...\"}\n",
        "{\"phase\":\"complete\",\"message\":\"Done\",\"project_path\":\"/out/x/\",\"project_name\":\"X\"}",
    ])
    .await;
    assert!(matches!(outcome, Err(SessionError::IncompleteStream)));
}

#[tokio::test]
async fn chunk_read_error_is_transport_failure() {
    let parts: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(
            b"{\"phase\":\"planning\",\"message\":\"Planning...\"}\n",
        )),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        )),
    ];
    let outcome = GenerationSession::drive(stream::iter(parts), |_| {}).await;
    match outcome {
        Err(SessionError::Transport(reason)) => {
            assert!(reason.contains("connection reset"));
        }
        other => panic!("expected transport error, got {:?}", other.map(|c| c.folder)),
    }
}

#[tokio::test]
async fn same_phase_refreshes_are_relayed_in_order() {
    let (outcome, updates) = drive_collect(&[
        "{\"phase\":\"coding\",\"message\":\"Writing code (1/3)...\"}\n",
        "{\"phase\":\"coding\",\"message\":\"Writing code (2/3)...\"}\n",
        "{\"phase\":\"coding\",\"message\":\"Writing code (3/3)...\"}\n",
        "{\"phase\":\"complete\",\"message\":\"Done\",\"project_path\":\"/out/x/\",\"project_name\":\"X\"}\n",
    ])
    .await;

    assert!(outcome.is_ok());
    let messages: Vec<&str> = updates.iter().map(|u| u.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Writing code (1/3)...",
            "Writing code (2/3)...",
            "Writing code (3/3)...",
            "Done"
        ]
    );
    // Refreshes keep the coding fraction until the terminal transition.
    assert_eq!(updates[1].progress, 0.75);
    assert_eq!(updates[2].progress, 0.75);
}
