use serde::{Deserialize, Deserializer, Serialize};

use attendance_domain::notification::NotificationMessage;
use attendance_domain::session::Session;
use attendance_domain::shared::RequestId;
use attendance_domain::sign_in::Reply;

/// Messages the agent understands, keyed by their `action` tag
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action")]
pub enum AgentRequest {
    /// `session` is kept as sent. Labels that name no window are still
    /// answered by the gate, so a sign-in is never dropped here.
    #[serde(rename = "signIn")]
    SignIn {
        #[serde(default, deserialize_with = "session_label")]
        session: String,
    },
    #[serde(rename = "testPush")]
    TestPush,
    /// Unsolicited push event delivered by the host
    #[serde(rename = "push")]
    Push,
}

impl AgentRequest {
    pub const ACTIONS: [&'static str; 3] = ["signIn", "testPush", "push"];

    pub fn action(&self) -> &'static str {
        match self {
            AgentRequest::SignIn { .. } => "signIn",
            AgentRequest::TestPush => "testPush",
            AgentRequest::Push => "push",
        }
    }

    /// Only sign-in requests are ever answered
    pub fn expects_reply(&self) -> bool {
        matches!(self, AgentRequest::SignIn { .. })
    }
}

impl From<Session> for AgentRequest {
    fn from(session: Session) -> Self {
        AgentRequest::SignIn {
            session: session.as_str().to_string(),
        }
    }
}

/// Any JSON value is accepted; non-strings are kept as their JSON text
fn session_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(label) => label,
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Caller-chosen correlation id, echoed on the reply
    pub id: Option<RequestId>,
    pub request: AgentRequest,
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Message has no action tag")]
    MissingAction,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid payload for {action}: {source}")]
    InvalidPayload {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode one inbound protocol line.
///
/// Unknown tags are reported as `UnknownAction` rather than folded into a
/// generic parse error so the dispatcher can log them for what they are.
pub fn decode_line(line: &str) -> Result<InboundMessage, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(line).map_err(ProtocolError::Malformed)?;

    let action = value
        .get("action")
        .and_then(|a| a.as_str())
        .ok_or(ProtocolError::MissingAction)?
        .to_string();

    if !AgentRequest::ACTIONS.contains(&action.as_str()) {
        return Err(ProtocolError::UnknownAction(action));
    }

    let id = value
        .get("id")
        .and_then(|id| id.as_str())
        .map(RequestId::from_string);

    let request = serde_json::from_value(value)
        .map_err(|source| ProtocolError::InvalidPayload { action, source })?;

    Ok(InboundMessage { id, request })
}

/// One outbound protocol line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Reply {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(flatten)]
        reply: Reply,
    },
    Notification {
        event: &'static str,
        #[serde(flatten)]
        message: NotificationMessage,
    },
}

impl OutboundMessage {
    pub fn reply(id: Option<&RequestId>, reply: Reply) -> Self {
        OutboundMessage::Reply {
            id: id.map(|id| id.as_str().to_string()),
            reply,
        }
    }

    pub fn notification(message: NotificationMessage) -> Self {
        OutboundMessage::Notification {
            event: "notification",
            message,
        }
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_sign_in_with_id() {
        let msg = decode_line(r#"{"id":"42","action":"signIn","session":"morning"}"#).unwrap();
        assert_eq!(msg.id, Some(RequestId::from_string("42")));
        assert_eq!(msg.request, AgentRequest::from(Session::Morning));
        assert!(msg.request.expects_reply());
    }

    #[test]
    fn test_decode_push_variants() {
        let test_push = decode_line(r#"{"action":"testPush"}"#).unwrap();
        assert_eq!(test_push.request, AgentRequest::TestPush);
        assert!(test_push.id.is_none());
        assert!(!test_push.request.expects_reply());

        let push = decode_line(r#"{"action":"push"}"#).unwrap();
        assert_eq!(push.request.action(), "push");
    }

    #[test]
    fn test_unknown_action_is_explicit() {
        let err = decode_line(r#"{"action":"signOut"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownAction(a) if a == "signOut"));
    }

    #[test]
    fn test_unrecognised_session_still_decodes_as_sign_in() {
        let cases = [
            (r#"{"action":"signIn","session":"evening"}"#, "evening"),
            (r#"{"action":"signIn","session":"Morning"}"#, "Morning"),
            (r#"{"action":"signIn","session":3}"#, "3"),
            (r#"{"action":"signIn","session":null}"#, "null"),
            (r#"{"action":"signIn"}"#, ""),
        ];

        for (line, label) in cases {
            let msg = decode_line(line).unwrap();
            assert_eq!(
                msg.request,
                AgentRequest::SignIn {
                    session: label.to_string()
                },
                "line: {line}"
            );
            assert!(msg.request.expects_reply());
        }
    }

    #[test]
    fn test_malformed_and_untagged() {
        assert!(matches!(
            decode_line("not json").unwrap_err(),
            ProtocolError::Malformed(_)
        ));
        assert!(matches!(
            decode_line(r#"{"session":"night"}"#).unwrap_err(),
            ProtocolError::MissingAction
        ));
    }

    #[test]
    fn test_outbound_shapes() {
        let reply = OutboundMessage::reply(
            Some(&RequestId::from_string("7")),
            Reply::failure("You have already signed in for the morning session."),
        );
        let json: serde_json::Value = serde_json::from_str(&reply.to_line().unwrap()).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["success"], false);
        assert_eq!(
            json["message"],
            "You have already signed in for the morning session."
        );

        let note = OutboundMessage::notification(NotificationMessage::test_push());
        let json: serde_json::Value = serde_json::from_str(&note.to_line().unwrap()).unwrap();
        assert_eq!(json["event"], "notification");
        assert_eq!(json["title"], "Ghetto Attendance");
        assert_eq!(json["body"], "This is a test push notification!");
    }
}
