//! Frame types for the newline-delimited JSON protocol spoken with the
//! host adapter.

use serde::{Deserialize, Serialize};

use crate::host::{ConflictPolicy, DownloadId, DownloadRecord, TransferState};

/// Reply to a command we sent, matched by `seq`. Only the fields relevant
/// to the original command are populated.
#[derive(Debug, Deserialize)]
pub struct Reply {
    pub seq: u64,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub id: Option<DownloadId>,
    #[serde(default)]
    pub record: Option<DownloadRecord>,
}

/// Frames the host adapter sends us.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WireEvent {
    /// Primary capture hook fired. `wants_suggestion` is set when the host
    /// holds the filename open for a suggest frame from us.
    NameDetermining {
        record: DownloadRecord,
        #[serde(default)]
        wants_suggestion: bool,
    },
    /// Backup capture hook fired.
    Created { record: DownloadRecord },
    /// Transfer state changed.
    Changed { id: DownloadId, state: TransferState },
    Reply(Reply),
}

/// Frames we send to the host adapter.
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum WireCommand {
    Cancel {
        seq: u64,
        id: DownloadId,
    },
    Erase {
        seq: u64,
        id: DownloadId,
    },
    Pause {
        seq: u64,
        id: DownloadId,
    },
    Download {
        seq: u64,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        conflict: ConflictPolicy,
    },
    Search {
        seq: u64,
        id: DownloadId,
    },
    /// Filename reply for a pending determination. Correlated by download id
    /// rather than seq: the host's hook waits on exactly one per download.
    Suggest {
        id: DownloadId,
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        conflict: ConflictPolicy,
        cancel: bool,
    },
    Notify {
        title: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_determining_event() {
        let ev: WireEvent = serde_json::from_str(
            r#"{"event":"name_determining","record":{"id":7,"url":"https://a/f.bin"},"wants_suggestion":true}"#,
        )
        .unwrap();
        match ev {
            WireEvent::NameDetermining {
                record,
                wants_suggestion,
            } => {
                assert_eq!(record.id, 7);
                assert!(wants_suggestion);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn wants_suggestion_defaults_off() {
        let ev: WireEvent = serde_json::from_str(
            r#"{"event":"name_determining","record":{"id":7,"url":"https://a/f.bin"}}"#,
        )
        .unwrap();
        match ev {
            WireEvent::NameDetermining {
                wants_suggestion, ..
            } => assert!(!wants_suggestion),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn parses_reply_with_id() {
        let ev: WireEvent =
            serde_json::from_str(r#"{"event":"reply","seq":3,"ok":true,"id":42}"#).unwrap();
        match ev {
            WireEvent::Reply(reply) => {
                assert_eq!(reply.seq, 3);
                assert!(reply.ok);
                assert_eq!(reply.id, Some(42));
                assert!(reply.record.is_none());
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn parses_changed_event() {
        let ev: WireEvent =
            serde_json::from_str(r#"{"event":"changed","id":9,"state":"interrupted"}"#).unwrap();
        match ev {
            WireEvent::Changed { id, state } => {
                assert_eq!(id, 9);
                assert_eq!(state, TransferState::Interrupted);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn cancel_command_shape() {
        let json = serde_json::to_string(&WireCommand::Cancel { seq: 1, id: 5 }).unwrap();
        assert_eq!(json, r#"{"cmd":"cancel","seq":1,"id":5}"#);
    }

    #[test]
    fn download_command_omits_missing_filename() {
        let json = serde_json::to_string(&WireCommand::Download {
            seq: 2,
            url: "https://a/f.bin".into(),
            filename: None,
            conflict: ConflictPolicy::Uniquify,
        })
        .unwrap();
        assert!(!json.contains("filename"));
        assert!(json.contains(r#""conflict":"uniquify""#));
    }

    #[test]
    fn suggest_command_shape() {
        let json = serde_json::to_string(&WireCommand::Suggest {
            id: 7,
            filename: Some("report.pdf".into()),
            conflict: ConflictPolicy::Uniquify,
            cancel: true,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"cmd":"suggest","id":7,"filename":"report.pdf","conflict":"uniquify","cancel":true}"#
        );
    }
}
