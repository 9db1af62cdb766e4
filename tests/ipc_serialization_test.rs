use luno::domain::{DefinitionRequestState, RequestPhase};
use luno::ipc::{IpcCmd, IpcResp};

#[test]
fn test_ipccmd_wire_format() {
    let search = IpcCmd::SearchWord {
        word: "run".to_string(),
    };
    assert_eq!(
        serde_json::to_string(&search).unwrap(),
        r#"{"SearchWord":{"word":"run"}}"#
    );
    assert_eq!(serde_json::to_string(&IpcCmd::Status).unwrap(), r#""Status""#);

    let menu: IpcCmd =
        serde_json::from_str(r#"{"ContextMenu":{"selection":" Run "}}"#).unwrap();
    match menu {
        IpcCmd::ContextMenu { selection } => assert_eq!(selection, " Run "),
        _ => panic!("Expected ContextMenu command"),
    }
}

#[test]
fn test_unknown_command_is_rejected() {
    assert!(serde_json::from_str::<IpcCmd>(r#""Toggle""#).is_err());
    assert!(serde_json::from_str::<IpcCmd>(r#"{"SearchWord":{}}"#).is_err());
}

#[test]
fn test_response_with_loading_state() {
    let state = DefinitionRequestState::loading("run");
    let json = serde_json::to_string(&state).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["loading"], true);
    assert_eq!(value["requestedWord"], "run");

    let resp: IpcResp = serde_json::from_str(
        &serde_json::to_string(&IpcResp::ok(json)).unwrap(),
    )
    .unwrap();
    assert!(resp.ok);
    assert_eq!(resp.request_state().unwrap().phase(), RequestPhase::Loading);
}

#[test]
fn test_status_null_has_no_state() {
    let resp = IpcResp::ok("null");
    assert!(resp.request_state().is_none());
}
